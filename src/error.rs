use thiserror::Error;

/// Failures surfaced by the settings library.
///
/// Malformed submission entries are deliberately not represented here:
/// they are skipped (and logged) rather than failing the whole submission.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Entity-type or bundle metadata could not be loaded. Fatal to the
    /// form build; no partial form is rendered.
    #[error("entity metadata unavailable: {reason}")]
    MetadataUnavailable { reason: String },

    /// The config store failed while committing a submission. Nothing from
    /// the failed submission is persisted.
    #[error("config store write failed: {0}")]
    StoreWrite(String),

    /// An entity-type or bundle identifier that cannot form a settings key.
    #[error("invalid settings key component {component:?}: {reason}")]
    InvalidKey {
        component: String,
        reason: &'static str,
    },
}

impl SettingsError {
    pub fn metadata(reason: impl Into<String>) -> Self {
        SettingsError::MetadataUnavailable {
            reason: reason.into(),
        }
    }
}

impl From<rusqlite::Error> for SettingsError {
    fn from(err: rusqlite::Error) -> Self {
        SettingsError::StoreWrite(err.to_string())
    }
}

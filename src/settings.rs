//! Language settings values and the composite settings key.
//!
//! A `LanguageSettings` record exists (logically) for every bundle of every
//! translatable entity type; bundles with nothing stored fall back to
//! `LanguageSettings::default()`. Records are persisted under a
//! `SettingsKey`, whose canonical string form is `"{entity_type}.{bundle}"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Sentinel langcode meaning "use the site's default language".
pub const SITE_DEFAULT_LANGCODE: &str = "site_default";

/// Separator between the entity-type and bundle parts of a settings key.
pub const KEY_SEPARATOR: char = '.';

/// Per (entity type, bundle) content language settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageSettings {
    /// A language identifier, or [`SITE_DEFAULT_LANGCODE`].
    pub langcode: String,
    /// Whether a language selector is shown on content edit forms.
    pub language_show: bool,
}

impl LanguageSettings {
    pub fn new(langcode: impl Into<String>, language_show: bool) -> Self {
        Self {
            langcode: langcode.into(),
            language_show,
        }
    }

    /// True when nothing differs from the site-wide defaults.
    pub fn is_default(&self) -> bool {
        !self.language_show && self.langcode == SITE_DEFAULT_LANGCODE
    }
}

impl Default for LanguageSettings {
    fn default() -> Self {
        Self {
            langcode: SITE_DEFAULT_LANGCODE.to_string(),
            language_show: false,
        }
    }
}

/// Composite key identifying one (entity type, bundle) settings record.
///
/// Identifiers are validated at construction to be non-empty and free of
/// the separator character, so the string form parses back unambiguously.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SettingsKey {
    entity_type: String,
    bundle: String,
}

impl SettingsKey {
    pub fn new(
        entity_type: impl Into<String>,
        bundle: impl Into<String>,
    ) -> Result<Self, SettingsError> {
        let entity_type = entity_type.into();
        let bundle = bundle.into();
        validate_component(&entity_type)?;
        validate_component(&bundle)?;
        Ok(Self {
            entity_type,
            bundle,
        })
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn bundle(&self) -> &str {
        &self.bundle
    }
}

fn validate_component(component: &str) -> Result<(), SettingsError> {
    if component.is_empty() {
        return Err(SettingsError::InvalidKey {
            component: component.to_string(),
            reason: "must not be empty",
        });
    }
    if component.contains(KEY_SEPARATOR) {
        return Err(SettingsError::InvalidKey {
            component: component.to_string(),
            reason: "must not contain the key separator",
        });
    }
    Ok(())
}

impl fmt::Display for SettingsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.entity_type, KEY_SEPARATOR, self.bundle)
    }
}

impl FromStr for SettingsKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(KEY_SEPARATOR) {
            Some((entity_type, bundle)) => SettingsKey::new(entity_type, bundle),
            None => Err(SettingsError::InvalidKey {
                component: s.to_string(),
                reason: "missing key separator",
            }),
        }
    }
}

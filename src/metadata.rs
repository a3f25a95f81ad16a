//! Entity-type and bundle metadata.
//!
//! The form builder consumes metadata through the [`EntityMetadata`] trait;
//! the service binds it to an [`EntityRegistry`], which carries a built-in
//! default set and can be loaded from a JSON file instead. The registry is
//! read-only once constructed.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Descriptor for one entity type, as supplied by the host metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityTypeDescriptor {
    /// Machine identifier (e.g., "node").
    pub id: String,

    /// Human-readable label. Falls back to the id when unset.
    #[serde(default)]
    pub label: Option<String>,

    /// Whether content of this type supports multiple language variants.
    #[serde(default)]
    pub translatable: bool,

    /// Override for the word used to describe this type's bundles
    /// (e.g., "Content type"). Falls back to the effective label.
    #[serde(default)]
    pub bundle_label: Option<String>,
}

impl EntityTypeDescriptor {
    /// The display label, defaulting to the identifier.
    pub fn effective_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    pub fn effective_bundle_label(&self) -> &str {
        self.bundle_label.as_deref().unwrap_or(self.effective_label())
    }
}

/// Metadata for one bundle of an entity type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleInfo {
    pub label: String,
}

/// Source of entity-type and bundle metadata.
///
/// Failures map to [`SettingsError::MetadataUnavailable`] and abort the
/// form build; no partial form is rendered.
pub trait EntityMetadata: Send + Sync {
    fn definitions(&self) -> Result<Vec<EntityTypeDescriptor>, SettingsError>;

    /// Bundle info keyed by entity type id, then bundle id. Entity types
    /// with no bundles may be absent entirely.
    fn all_bundle_info(&self)
        -> Result<BTreeMap<String, BTreeMap<String, BundleInfo>>, SettingsError>;
}

/// In-memory registry of entity types and their bundles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRegistry {
    entity_types: Vec<EntityTypeDescriptor>,
    #[serde(default)]
    bundles: BTreeMap<String, BTreeMap<String, BundleInfo>>,
}

impl EntityRegistry {
    pub fn new(
        entity_types: Vec<EntityTypeDescriptor>,
        bundles: BTreeMap<String, BTreeMap<String, BundleInfo>>,
    ) -> Self {
        Self {
            entity_types,
            bundles,
        }
    }

    /// Load a registry from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::metadata(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            SettingsError::metadata(format!("cannot parse {}: {}", path.display(), e))
        })
    }

    pub fn get(&self, id: &str) -> Option<&EntityTypeDescriptor> {
        self.entity_types.iter().find(|t| t.id == id)
    }
}

impl Default for EntityRegistry {
    /// The built-in registry used when no registry file is configured.
    fn default() -> Self {
        let mut bundles = BTreeMap::new();
        bundles.insert(
            "node".to_string(),
            BTreeMap::from([
                (
                    "article".to_string(),
                    BundleInfo {
                        label: "Article".to_string(),
                    },
                ),
                (
                    "page".to_string(),
                    BundleInfo {
                        label: "Basic page".to_string(),
                    },
                ),
            ]),
        );
        bundles.insert(
            "taxonomy_term".to_string(),
            BTreeMap::from([(
                "tags".to_string(),
                BundleInfo {
                    label: "Tags".to_string(),
                },
            )]),
        );

        Self {
            entity_types: vec![
                EntityTypeDescriptor {
                    id: "node".to_string(),
                    label: Some("Content".to_string()),
                    translatable: true,
                    bundle_label: Some("Content type".to_string()),
                },
                EntityTypeDescriptor {
                    id: "taxonomy_term".to_string(),
                    label: Some("Taxonomy term".to_string()),
                    translatable: true,
                    bundle_label: Some("Vocabulary".to_string()),
                },
                EntityTypeDescriptor {
                    id: "menu_link".to_string(),
                    label: Some("Menu link".to_string()),
                    translatable: false,
                    bundle_label: None,
                },
            ],
            bundles,
        }
    }
}

impl EntityMetadata for EntityRegistry {
    fn definitions(&self) -> Result<Vec<EntityTypeDescriptor>, SettingsError> {
        Ok(self.entity_types.clone())
    }

    fn all_bundle_info(
        &self,
    ) -> Result<BTreeMap<String, BTreeMap<String, BundleInfo>>, SettingsError> {
        Ok(self.bundles.clone())
    }
}

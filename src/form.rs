//! Settings form assembly.
//!
//! `build_settings_form` turns entity-type metadata plus the current store
//! contents into a declarative [`FormDescriptor`]: one checkbox toggle per
//! translatable entity type, and per type a conditionally-visible section
//! with one editable row per bundle. The descriptor is pure data; rendering
//! (HTML or JSON) lives in the web layer.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::SettingsError;
use crate::metadata::EntityMetadata;
use crate::settings::{LanguageSettings, SettingsKey};

/// Name of the top-level toggle control group.
pub const TOGGLE_GROUP_NAME: &str = "entity_types";

/// Declarative description of the content language settings form.
#[derive(Debug, Clone, Serialize)]
pub struct FormDescriptor {
    pub toggle: ToggleGroup,
    /// One section per translatable entity type, in toggle order.
    pub sections: Vec<EntityTypeSection>,
}

/// Multi-select toggle listing the translatable entity types.
#[derive(Debug, Clone, Serialize)]
pub struct ToggleGroup {
    pub name: String,
    pub title: String,
    pub options: Vec<ToggleOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToggleOption {
    pub entity_type: String,
    pub label: String,
    /// Seeded from whether any bundle of this type has custom settings.
    /// It drives only the initial checked state; stored data is not gated.
    pub checked: bool,
}

/// Per-entity-type sub-section, visible only while its toggle is checked.
#[derive(Debug, Clone, Serialize)]
pub struct EntityTypeSection {
    pub entity_type: String,
    pub title: String,
    /// The word describing this type's bundles ("Content type", ...).
    pub bundle_label: String,
    /// Name of the toggle option this section's visibility is bound to.
    pub visible_when: String,
    pub rows: Vec<BundleRow>,
}

/// One editable language-configuration row.
#[derive(Debug, Clone, Serialize)]
pub struct BundleRow {
    pub bundle: String,
    pub label: String,
    pub settings: LanguageSettings,
}

/// Assemble the settings form from metadata and the current store contents.
///
/// Entity types absent from the bundle info are treated as having zero
/// bundles: they keep their toggle entry and render an empty section.
pub fn build_settings_form(
    metadata: &dyn EntityMetadata,
    current: &BTreeMap<SettingsKey, LanguageSettings>,
) -> Result<FormDescriptor, SettingsError> {
    let definitions = metadata.definitions()?;
    let bundle_info = metadata.all_bundle_info()?;

    let mut translatable: Vec<_> = definitions
        .into_iter()
        .filter(|t| t.translatable)
        .collect();
    translatable.sort_by(|a, b| {
        a.effective_label()
            .cmp(b.effective_label())
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut options = Vec::with_capacity(translatable.len());
    let mut sections = Vec::with_capacity(translatable.len());

    static EMPTY: BTreeMap<String, crate::metadata::BundleInfo> = BTreeMap::new();

    for entity_type in &translatable {
        let bundles = bundle_info.get(&entity_type.id).unwrap_or(&EMPTY);

        let mut has_custom = false;
        let mut rows = Vec::with_capacity(bundles.len());
        for (bundle_id, info) in bundles {
            let key = SettingsKey::new(&entity_type.id, bundle_id)?;
            let settings = current.get(&key).cloned().unwrap_or_default();
            if !settings.is_default() {
                has_custom = true;
            }
            rows.push(BundleRow {
                bundle: bundle_id.clone(),
                label: info.label.clone(),
                settings,
            });
        }

        options.push(ToggleOption {
            entity_type: entity_type.id.clone(),
            label: entity_type.effective_label().to_string(),
            checked: has_custom,
        });
        sections.push(EntityTypeSection {
            entity_type: entity_type.id.clone(),
            title: entity_type.effective_label().to_string(),
            bundle_label: entity_type.effective_bundle_label().to_string(),
            visible_when: format!("{}[{}]", TOGGLE_GROUP_NAME, entity_type.id),
            rows,
        });
    }

    Ok(FormDescriptor {
        toggle: ToggleGroup {
            name: TOGGLE_GROUP_NAME.to_string(),
            title: "Custom language settings".to_string(),
            options,
        },
        sections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{BundleInfo, EntityRegistry, EntityTypeDescriptor};
    use crate::settings::SITE_DEFAULT_LANGCODE;
    use proptest::prelude::*;

    // ==================== Test Helpers ====================

    fn descriptor(id: &str, label: Option<&str>, translatable: bool) -> EntityTypeDescriptor {
        EntityTypeDescriptor {
            id: id.to_string(),
            label: label.map(String::from),
            translatable,
            bundle_label: None,
        }
    }

    fn bundles_for(
        entries: &[(&str, &[(&str, &str)])],
    ) -> BTreeMap<String, BTreeMap<String, BundleInfo>> {
        entries
            .iter()
            .map(|(entity_type, bundles)| {
                (
                    entity_type.to_string(),
                    bundles
                        .iter()
                        .map(|(id, label)| {
                            (
                                id.to_string(),
                                BundleInfo {
                                    label: label.to_string(),
                                },
                            )
                        })
                        .collect(),
                )
            })
            .collect()
    }

    fn key(entity_type: &str, bundle: &str) -> SettingsKey {
        SettingsKey::new(entity_type, bundle).expect("valid key")
    }

    // ==================== Toggle List Tests ====================

    #[test]
    fn test_only_translatable_types_appear() {
        let registry = EntityRegistry::new(
            vec![
                descriptor("article", Some("Article"), true),
                descriptor("menu_link", Some("Menu link"), false),
            ],
            bundles_for(&[("article", &[("page", "Page")])]),
        );

        let form = build_settings_form(&registry, &BTreeMap::new()).expect("build");

        assert_eq!(form.toggle.options.len(), 1);
        assert_eq!(form.toggle.options[0].entity_type, "article");
        assert_eq!(form.sections.len(), 1);
    }

    #[test]
    fn test_types_sorted_by_label() {
        let registry = EntityRegistry::new(
            vec![
                descriptor("node", Some("Content"), true),
                descriptor("block_content", Some("Custom block"), true),
                descriptor("comment", Some("Comment"), true),
            ],
            BTreeMap::new(),
        );

        let form = build_settings_form(&registry, &BTreeMap::new()).expect("build");

        let labels: Vec<&str> = form.toggle.options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Comment", "Content", "Custom block"]);
    }

    #[test]
    fn test_label_falls_back_to_id() {
        let registry = EntityRegistry::new(vec![descriptor("comment", None, true)], BTreeMap::new());

        let form = build_settings_form(&registry, &BTreeMap::new()).expect("build");
        assert_eq!(form.toggle.options[0].label, "comment");
    }

    #[test]
    fn test_sections_follow_toggle_order() {
        let registry = EntityRegistry::new(
            vec![
                descriptor("b_type", Some("Zeta"), true),
                descriptor("a_type", Some("Alpha"), true),
            ],
            BTreeMap::new(),
        );

        let form = build_settings_form(&registry, &BTreeMap::new()).expect("build");

        assert_eq!(form.sections[0].entity_type, "a_type");
        assert_eq!(form.sections[1].entity_type, "b_type");
        assert_eq!(form.sections[0].visible_when, "entity_types[a_type]");
    }

    // ==================== Custom-Settings Flag Tests ====================

    #[test]
    fn test_unchecked_without_custom_settings() {
        let registry = EntityRegistry::new(
            vec![descriptor("node", Some("Content"), true)],
            bundles_for(&[("node", &[("article", "Article")])]),
        );

        let form = build_settings_form(&registry, &BTreeMap::new()).expect("build");
        assert!(!form.toggle.options[0].checked);
    }

    #[test]
    fn test_checked_when_langcode_customized() {
        let registry = EntityRegistry::new(
            vec![descriptor("node", Some("Content"), true)],
            bundles_for(&[("node", &[("article", "Article"), ("page", "Page")])]),
        );
        let current =
            BTreeMap::from([(key("node", "article"), LanguageSettings::new("fr", false))]);

        let form = build_settings_form(&registry, &current).expect("build");
        assert!(form.toggle.options[0].checked);
    }

    #[test]
    fn test_checked_when_language_show_set() {
        let registry = EntityRegistry::new(
            vec![descriptor("node", Some("Content"), true)],
            bundles_for(&[("node", &[("article", "Article")])]),
        );
        let current = BTreeMap::from([(
            key("node", "article"),
            LanguageSettings::new(SITE_DEFAULT_LANGCODE, true),
        )]);

        let form = build_settings_form(&registry, &current).expect("build");
        assert!(form.toggle.options[0].checked);
    }

    #[test]
    fn test_stored_defaults_do_not_set_flag() {
        // A record that merely re-states the defaults is not "custom".
        let registry = EntityRegistry::new(
            vec![descriptor("node", Some("Content"), true)],
            bundles_for(&[("node", &[("article", "Article")])]),
        );
        let current = BTreeMap::from([(key("node", "article"), LanguageSettings::default())]);

        let form = build_settings_form(&registry, &current).expect("build");
        assert!(!form.toggle.options[0].checked);
    }

    // ==================== Row Prefill Tests ====================

    #[test]
    fn test_rows_default_when_nothing_stored() {
        let registry = EntityRegistry::new(
            vec![descriptor("article", Some("Article"), true)],
            bundles_for(&[("article", &[("page", "Page")])]),
        );

        let form = build_settings_form(&registry, &BTreeMap::new()).expect("build");

        let row = &form.sections[0].rows[0];
        assert_eq!(row.bundle, "page");
        assert_eq!(row.settings.langcode, SITE_DEFAULT_LANGCODE);
        assert!(!row.settings.language_show);
    }

    #[test]
    fn test_rows_prefilled_from_store() {
        let registry = EntityRegistry::new(
            vec![descriptor("node", Some("Content"), true)],
            bundles_for(&[("node", &[("article", "Article"), ("page", "Page")])]),
        );
        let current =
            BTreeMap::from([(key("node", "page"), LanguageSettings::new("es", true))]);

        let form = build_settings_form(&registry, &current).expect("build");

        let rows = &form.sections[0].rows;
        let page = rows.iter().find(|r| r.bundle == "page").expect("page row");
        assert_eq!(page.settings.langcode, "es");
        assert!(page.settings.language_show);
        let article = rows.iter().find(|r| r.bundle == "article").expect("article");
        assert!(article.settings.is_default());
    }

    // ==================== Edge Case Tests ====================

    #[test]
    fn test_type_with_no_bundle_info_gets_empty_section() {
        let registry = EntityRegistry::new(
            vec![descriptor("user", Some("User"), true)],
            BTreeMap::new(),
        );

        let form = build_settings_form(&registry, &BTreeMap::new()).expect("build");

        assert_eq!(form.toggle.options.len(), 1);
        assert!(form.sections[0].rows.is_empty());
    }

    #[test]
    fn test_empty_metadata_builds_empty_form() {
        let registry = EntityRegistry::new(Vec::new(), BTreeMap::new());
        let form = build_settings_form(&registry, &BTreeMap::new()).expect("build");
        assert!(form.toggle.options.is_empty());
        assert!(form.sections.is_empty());
    }

    #[test]
    fn test_descriptor_serializes_to_json() {
        let registry = EntityRegistry::default();
        let form = build_settings_form(&registry, &BTreeMap::new()).expect("build");

        let json = serde_json::to_value(&form).expect("serialize");
        assert!(json["toggle"]["options"].is_array());
        assert_eq!(json["toggle"]["name"], "entity_types");
    }

    // ==================== Properties ====================

    proptest! {
        #[test]
        fn prop_toggle_contains_exactly_translatable_types(
            flags in proptest::collection::vec(any::<bool>(), 0..8)
        ) {
            let types: Vec<_> = flags
                .iter()
                .enumerate()
                .map(|(i, &translatable)| {
                    let label = format!("Label {i}");
                    descriptor(&format!("type_{i}"), Some(label.as_str()), translatable)
                })
                .collect();
            let expected: Vec<String> = types
                .iter()
                .filter(|t| t.translatable)
                .map(|t| t.id.clone())
                .collect();

            let registry = EntityRegistry::new(types, BTreeMap::new());
            let form = build_settings_form(&registry, &BTreeMap::new()).expect("build");

            let mut actual: Vec<String> = form
                .toggle
                .options
                .iter()
                .map(|o| o.entity_type.clone())
                .collect();
            actual.sort();
            let mut expected_sorted = expected;
            expected_sorted.sort();
            prop_assert_eq!(actual, expected_sorted);
        }

        #[test]
        fn prop_options_sorted_by_label(
            labels in proptest::collection::vec("[A-Za-z]{1,8}", 1..8)
        ) {
            let types: Vec<_> = labels
                .iter()
                .enumerate()
                .map(|(i, label)| descriptor(&format!("t{i}"), Some(label.as_str()), true))
                .collect();
            let registry = EntityRegistry::new(types, BTreeMap::new());
            let form = build_settings_form(&registry, &BTreeMap::new()).expect("build");

            let rendered: Vec<&str> =
                form.toggle.options.iter().map(|o| o.label.as_str()).collect();
            let mut sorted = rendered.clone();
            sorted.sort();
            prop_assert_eq!(rendered, sorted);
        }
    }
}

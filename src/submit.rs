//! Settings submission handling.
//!
//! A submitted form arrives as loosely-typed nested values keyed by entity
//! type, then bundle, with the editable fields under the fixed
//! `settings.language` sub-path. `apply_submission` extracts exactly
//! `langcode` and `language_show` for each pair, stages one store write per
//! pair, and commits them with a single save. Pairs with missing or
//! malformed fields are skipped with a warning instead of failing the
//! submission.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::SettingsError;
use crate::settings::{LanguageSettings, SettingsKey};
use crate::store::ConfigStore;

/// Submitted form values, as delivered by the web layer.
///
/// Only the `settings` subtree matters here; other controls on the page
/// (the visibility toggles) influence rendering, not persistence.
#[derive(Debug, Clone, Default)]
pub struct SubmittedValues {
    settings: Map<String, Value>,
}

impl SubmittedValues {
    /// Build from a JSON body of the shape
    /// `{"settings": {entity_type: {bundle: {"settings": {"language": {...}}}}}}`.
    pub fn from_json(body: &Value) -> Self {
        let settings = body
            .get("settings")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Self { settings }
    }

    /// Build from urlencoded pairs with bracketed names, e.g.
    /// `settings[node][article][settings][language][langcode]=fr`.
    ///
    /// Pairs that do not parse as bracket paths under `settings` are
    /// ignored. Later pairs overwrite earlier ones, which lets a hidden
    /// `0` input precede its checkbox.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut root = Value::Object(Map::new());
        for (name, value) in pairs {
            let path = parse_bracket_path(name);
            if path.is_empty() {
                continue;
            }
            insert_path(&mut root, &path, Value::String(value.to_string()));
        }
        Self::from_json(&root)
    }

    /// Test/builder convenience: set one bundle's language fields.
    pub fn insert(&mut self, entity_type: &str, bundle: &str, langcode: &str, language_show: bool) {
        let language = Value::Object(Map::from_iter([
            ("langcode".to_string(), Value::String(langcode.to_string())),
            ("language_show".to_string(), Value::Bool(language_show)),
        ]));
        let inner = Value::Object(Map::from_iter([(
            "settings".to_string(),
            Value::Object(Map::from_iter([("language".to_string(), language)])),
        )]));

        let entry = self
            .settings
            .entry(entity_type.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(bundles) = entry {
            bundles.insert(bundle.to_string(), inner);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}

/// Persist every (entity type, bundle) pair present in the submission.
///
/// All writes for the submission are committed as a single save; on store
/// failure nothing from this submission is durable and the error is
/// returned. Returns the committed records keyed by settings key.
pub fn apply_submission(
    submitted: &SubmittedValues,
    store: &dyn ConfigStore,
) -> Result<BTreeMap<SettingsKey, LanguageSettings>, SettingsError> {
    let mut committed = BTreeMap::new();

    for (entity_type, bundles) in &submitted.settings {
        let Some(bundles) = bundles.as_object() else {
            warn!(entity_type = %entity_type, "Skipping submission entry with non-object bundle map");
            continue;
        };
        for (bundle, value) in bundles {
            let Some(settings) = extract_language_settings(value) else {
                warn!(
                    entity_type = %entity_type,
                    bundle = %bundle,
                    "Skipping submission pair with missing or malformed language fields"
                );
                continue;
            };
            let key = match SettingsKey::new(entity_type, bundle) {
                Ok(key) => key,
                Err(e) => {
                    warn!(entity_type = %entity_type, bundle = %bundle, error = %e, "Skipping unkeyable submission pair");
                    continue;
                }
            };
            store.set(&key, settings.clone())?;
            committed.insert(key, settings);
        }
    }

    store.save()?;
    debug!(records = committed.len(), "Committed language settings");
    Ok(committed)
}

/// Pull `{langcode, language_show}` out of one bundle's submitted value,
/// which nests them under `settings.language`. Returns `None` when either
/// field is absent or has an unusable type.
fn extract_language_settings(value: &Value) -> Option<LanguageSettings> {
    let language = value.get("settings")?.get("language")?;
    let langcode = language.get("langcode")?.as_str()?;
    if langcode.is_empty() {
        return None;
    }
    let language_show = parse_bool(language.get("language_show")?)?;
    Some(LanguageSettings::new(langcode, language_show))
}

/// Checkbox values arrive as strings from urlencoded bodies and as booleans
/// from JSON; accept both.
fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.as_str() {
            "1" | "true" | "on" => Some(true),
            "0" | "false" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Split a bracketed field name (`a[b][c]`) into path segments. Returns an
/// empty path for names that do not follow the bracket syntax.
fn parse_bracket_path(name: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let Some(open) = name.find('[') else {
        if name.is_empty() {
            return segments;
        }
        segments.push(name.to_string());
        return segments;
    };

    let root = &name[..open];
    if root.is_empty() {
        return Vec::new();
    }
    segments.push(root.to_string());

    let mut rest = &name[open..];
    while let Some(stripped) = rest.strip_prefix('[') {
        let Some(close) = stripped.find(']') else {
            return Vec::new();
        };
        let segment = &stripped[..close];
        if segment.is_empty() {
            return Vec::new();
        }
        segments.push(segment.to_string());
        rest = &stripped[close + 1..];
    }
    if !rest.is_empty() {
        return Vec::new();
    }
    segments
}

fn insert_path(root: &mut Value, path: &[String], value: Value) {
    let mut node = root;
    for segment in &path[..path.len() - 1] {
        let map = match node {
            Value::Object(map) => map,
            // A scalar already sits where an object is needed; the later
            // pair wins, mirroring last-writer semantics.
            other => {
                *other = Value::Object(Map::new());
                match other {
                    Value::Object(map) => map,
                    _ => unreachable!(),
                }
            }
        };
        node = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if let Value::Object(map) = node {
        map.insert(path[path.len() - 1].clone(), value);
    }
}

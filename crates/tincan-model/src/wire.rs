//! The versioned serialization contract shared by every entity, plus the small
//! helpers the implementations use to read and write wire objects.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{ModelError, ModelResult};
use crate::lang::LanguageMap;
use crate::version::Version;

/// Free-form extension map keyed by IRI.
pub type Extensions = BTreeMap<String, Value>;

/// Render to, and rebuild from, the wire shape of a given version.
///
/// `as_version` is pure and never emits `null`: absent fields are left out of
/// the rendered object entirely.
pub trait WireEntity: Sized {
    fn as_version(&self, version: Version) -> ModelResult<Value>;

    fn from_wire(wire: &Value, version: Version) -> ModelResult<Self>;

    fn from_json_str(text: &str, version: Version) -> ModelResult<Self> {
        let wire: Value = serde_json::from_str(text)?;
        Self::from_wire(&wire, version)
    }
}

/// Rename legacy keys to their canonical names before an entity is built.
///
/// Each entry is `(legacy, canonical)`; a canonical key already present wins
/// over its legacy alias.
pub fn normalize_keys(object: &Map<String, Value>, aliases: &[(&str, &str)]) -> Map<String, Value> {
    let mut normalized = object.clone();
    for (legacy, canonical) in aliases {
        if let Some(value) = normalized.remove(*legacy) {
            if !normalized.contains_key(*canonical) {
                normalized.insert((*canonical).to_string(), value);
            }
        }
    }
    normalized
}

pub(crate) fn expect_object<'a>(
    wire: &'a Value,
    entity: &'static str,
) -> ModelResult<&'a Map<String, Value>> {
    wire.as_object()
        .ok_or_else(|| ModelError::invalid(entity, "expected a JSON object"))
}

pub(crate) fn opt_string(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

pub(crate) fn opt_language_map(
    object: &Map<String, Value>,
    key: &str,
    entity: &'static str,
) -> ModelResult<Option<LanguageMap>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|err| ModelError::invalid(entity, format!("{key}: {err}"))),
    }
}

pub(crate) fn opt_extensions(object: &Map<String, Value>, key: &str) -> Option<Extensions> {
    object
        .get(key)
        .and_then(Value::as_object)
        .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}

pub(crate) fn render_opt<T: WireEntity>(
    value: &Option<T>,
    version: Version,
) -> ModelResult<Option<Value>> {
    value.as_ref().map(|value| value.as_version(version)).transpose()
}

pub(crate) fn parse_opt<T: WireEntity>(
    object: &Map<String, Value>,
    key: &str,
    version: Version,
) -> ModelResult<Option<T>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::from_wire(value, version).map(Some),
    }
}

/// Builder for wire objects that silently drops absent values.
#[derive(Debug, Default)]
pub(crate) struct WireObject {
    inner: Map<String, Value>,
}

impl WireObject {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.inner.insert(key.to_string(), value.into());
        self
    }

    pub(crate) fn with_opt<V: Into<Value>>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.inner.insert(key.to_string(), value.into());
        }
        self
    }

    pub(crate) fn with_language_map(self, key: &str, value: Option<&LanguageMap>) -> Self {
        self.with_opt(key, value.map(language_map_value))
    }

    pub(crate) fn with_extensions(self, key: &str, value: Option<&Extensions>) -> Self {
        self.with_opt(
            key,
            value.map(|map| {
                Value::Object(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            }),
        )
    }

    pub(crate) fn build(self) -> Value {
        Value::Object(self.inner)
    }
}

fn language_map_value(map: &LanguageMap) -> Value {
    Value::Object(
        map.iter()
            .map(|(lang, text)| (lang.clone(), Value::String(text.clone())))
            .collect(),
    )
}

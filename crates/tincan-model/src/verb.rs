use std::fmt;

use serde_json::Value;

use crate::canonical::Vocabulary;
use crate::error::{ModelError, ModelResult};
use crate::lang::{LanguageMap, language_value, undetermined};
use crate::version::Version;
use crate::wire::{WireEntity, WireObject, expect_object, opt_language_map, opt_string};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verb {
    pub id: String,
    pub display: Option<LanguageMap>,
}

impl Verb {
    /// Build from a bare name or an IRI.
    ///
    /// Short names from the legacy vocabulary are canonicalized to their long
    /// IRI, and the input is kept as the `und` display text.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: Vocabulary::Verb.to_long(&name),
            display: Some(undetermined(name)),
        }
    }

    /// Build from an identifier and an optional display map. A known id with
    /// no display gets its short name as `und` display text.
    pub fn with_display(id: impl Into<String>, display: Option<LanguageMap>) -> Self {
        let id = Vocabulary::Verb.to_long(&id.into());
        let display = display.or_else(|| Vocabulary::Verb.short_form(&id).map(undetermined));
        Self { id, display }
    }

    pub fn display_text(&self, lang: Option<&str>) -> &str {
        match &self.display {
            Some(display) => language_value(display, lang),
            None => &self.id,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_text(None))
    }
}

impl WireEntity for Verb {
    fn as_version(&self, version: Version) -> ModelResult<Value> {
        if version.is_legacy() {
            return Ok(WireObject::new()
                .with("id", Vocabulary::Verb.to_short(&self.id))
                .build());
        }
        Ok(WireObject::new()
            .with("id", self.id.clone())
            .with_language_map("display", self.display.as_ref())
            .build())
    }

    fn from_wire(wire: &Value, _version: Version) -> ModelResult<Self> {
        if let Value::String(name) = wire {
            return Ok(Self::new(name.clone()));
        }
        let object = expect_object(wire, "Verb")?;
        let id = opt_string(object, "id").ok_or_else(|| ModelError::invalid("Verb", "missing id"))?;
        let display = opt_language_map(object, "display", "Verb")?;
        Ok(Self::with_display(id, display))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn verb_from_short_name_expected_long_id_and_und_display() {
        let verb = Verb::new("completed");
        assert_eq!(verb.id, "http://adlnet.gov/expapi/verbs/completed");
        assert_eq!(verb.display, Some(undetermined("completed")));
    }

    #[test]
    fn verb_legacy_rendering_expected_short_id_only() {
        let verb = Verb::new("completed");
        assert_eq!(verb.as_version(Version::V0_9).unwrap(), json!({"id": "completed"}));
        assert_eq!(
            verb.as_version(Version::V1_0_3).unwrap(),
            json!({
                "id": "http://adlnet.gov/expapi/verbs/completed",
                "display": {"und": "completed"}
            })
        );
    }

    #[test]
    fn verb_every_short_form_expected_exact_legacy_round_trip() {
        for short in Vocabulary::Verb.short_forms() {
            let verb = Verb::new(short);
            assert_eq!(verb.as_version(Version::V0_9).unwrap(), json!({"id": short}));
            let long = Vocabulary::Verb.to_long(short);
            let from_long = Verb::with_display(long.clone(), None);
            assert_eq!(from_long.as_version(Version::V1_0_0).unwrap()["id"], json!(long));
        }
    }

    #[test]
    fn verb_known_id_without_display_expected_synthesized_display() {
        let verb = Verb::with_display("http://adlnet.gov/expapi/verbs/passed", None);
        assert_eq!(verb.display, Some(undetermined("passed")));
        assert_eq!(verb.to_string(), "passed");
    }

    #[test]
    fn verb_unknown_id_expected_pass_through_and_no_display() {
        let verb = Verb::with_display("http://example.com/verbs/juggled", None);
        assert_eq!(verb.display, None);
        assert_eq!(
            verb.as_version(Version::V0_9).unwrap(),
            json!({"id": "http://example.com/verbs/juggled"})
        );
    }

    #[test]
    fn verb_legacy_wire_expected_reconstructed_long_form() {
        let verb = Verb::from_wire(&json!({"id": "attempted"}), Version::V0_9).unwrap();
        assert_eq!(verb.id, "http://adlnet.gov/expapi/verbs/attempted");
        assert_eq!(verb.display, Some(undetermined("attempted")));
    }
}

use serde_json::Value;

use crate::agent::Actor;
use crate::context::Context;
use crate::error::{ModelError, ModelResult};
use crate::object::StatementObject;
use crate::result::StatementResult;
use crate::verb::Verb;
use crate::version::Version;
use crate::wire::{
    WireEntity, WireObject, expect_object, normalize_keys, opt_string, parse_opt, render_opt,
};

const SUBSTATEMENT_ALIASES: &[(&str, &str)] = &[("target", "object")];

/// A statement nested as the object of another statement. It is never
/// stamped and carries no id of its own.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubStatement {
    pub actor: Option<Actor>,
    pub verb: Option<Verb>,
    pub object: Option<StatementObject>,
    pub result: Option<StatementResult>,
    pub context: Option<Context>,
    pub timestamp: Option<String>,
}

impl SubStatement {
    pub fn display_text(&self, lang: Option<&str>) -> String {
        format!(
            "{} {} {}",
            self.actor.as_ref().map(ToString::to_string).unwrap_or_default(),
            self.verb.as_ref().map(|verb| verb.display_text(lang)).unwrap_or(""),
            self.object
                .as_ref()
                .map(|object| object.display_text(lang))
                .unwrap_or_default()
        )
    }
}

impl WireEntity for SubStatement {
    fn as_version(&self, version: Version) -> ModelResult<Value> {
        if version.is_legacy() {
            return Err(ModelError::NotRepresentable {
                entity: "SubStatement",
                version: version.to_string(),
            });
        }
        Ok(WireObject::new()
            .with("objectType", "SubStatement")
            .with_opt("actor", render_opt(&self.actor, version)?)
            .with_opt("verb", render_opt(&self.verb, version)?)
            .with_opt("object", render_opt(&self.object, version)?)
            .with_opt("result", render_opt(&self.result, version)?)
            .with_opt("context", render_opt(&self.context, version)?)
            .with_opt("timestamp", self.timestamp.clone())
            .build())
    }

    fn from_wire(wire: &Value, version: Version) -> ModelResult<Self> {
        let object = normalize_keys(expect_object(wire, "SubStatement")?, SUBSTATEMENT_ALIASES);
        let target = match object.get("object") {
            None | Some(Value::Null) => None,
            Some(value) => {
                let target = StatementObject::from_wire(value, version)?;
                if matches!(target, StatementObject::SubStatement(_)) {
                    return Err(ModelError::invalid(
                        "SubStatement",
                        "a sub-statement cannot nest another sub-statement",
                    ));
                }
                Some(target)
            }
        };
        Ok(Self {
            actor: parse_opt(&object, "actor", version)?,
            verb: parse_opt(&object, "verb", version)?,
            object: target,
            result: parse_opt(&object, "result", version)?,
            context: parse_opt(&object, "context", version)?,
            timestamp: opt_string(&object, "timestamp"),
        })
    }
}

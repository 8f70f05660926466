use std::fmt;

use serde_json::Value;

use crate::error::{ModelError, ModelResult};
use crate::version::Version;
use crate::wire::{WireEntity, WireObject, expect_object, opt_string};

/// Pointer to another statement by id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatementRef {
    pub id: Option<String>,
}

impl StatementRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()) }
    }

    pub fn object_type(version: Version) -> &'static str {
        if version.is_legacy() {
            "Statement"
        } else {
            "StatementRef"
        }
    }
}

impl fmt::Display for StatementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id.as_deref().unwrap_or(""))
    }
}

impl WireEntity for StatementRef {
    fn as_version(&self, version: Version) -> ModelResult<Value> {
        Ok(WireObject::new()
            .with("objectType", Self::object_type(version))
            .with_opt("id", self.id.clone())
            .build())
    }

    fn from_wire(wire: &Value, _version: Version) -> ModelResult<Self> {
        let object = expect_object(wire, "StatementRef")?;
        match object.get("objectType").and_then(Value::as_str) {
            None | Some("StatementRef") | Some("Statement") => Ok(Self {
                id: opt_string(object, "id"),
            }),
            Some(other) => Err(ModelError::UnknownObjectType(other.to_string())),
        }
    }
}

use serde_json::Value;

use crate::error::ModelResult;
use crate::version::Version;
use crate::wire::{Extensions, WireEntity, WireObject, expect_object, opt_extensions};

/// What a store reports about itself.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct About {
    pub version: Vec<String>,
    pub extensions: Option<Extensions>,
}

impl About {
    pub fn supports(&self, version: Version) -> bool {
        self.version.iter().any(|token| token == version.as_str())
    }
}

impl WireEntity for About {
    fn as_version(&self, _version: Version) -> ModelResult<Value> {
        Ok(WireObject::new()
            .with("version", self.version.clone())
            .with_extensions("extensions", self.extensions.as_ref())
            .build())
    }

    fn from_wire(wire: &Value, _version: Version) -> ModelResult<Self> {
        let object = expect_object(wire, "About")?;
        let version = match object.get("version") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Some(Value::String(single)) => vec![single.clone()],
            _ => Vec::new(),
        };
        Ok(Self {
            version,
            extensions: opt_extensions(object, "extensions"),
        })
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ModelError, ModelResult};
use crate::version::Version;
use crate::wire::{Extensions, WireEntity};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaled: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Outcome of a statement. Its shape is the same in every version.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion: Option<bool>,
    /// ISO-8601 duration, see [`crate::duration`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Extensions>,
}

impl WireEntity for Score {
    fn as_version(&self, _version: Version) -> ModelResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn from_wire(wire: &Value, _version: Version) -> ModelResult<Self> {
        serde_json::from_value(wire.clone()).map_err(|err| ModelError::invalid("Score", err.to_string()))
    }
}

impl WireEntity for StatementResult {
    fn as_version(&self, _version: Version) -> ModelResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn from_wire(wire: &Value, _version: Version) -> ModelResult<Self> {
        serde_json::from_value(wire.clone())
            .map_err(|err| ModelError::invalid("Result", err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn result_absent_fields_expected_omitted() {
        let result = StatementResult {
            score: Some(Score {
                scaled: Some(0.9),
                raw: Some(90.0),
                ..Score::default()
            }),
            completion: Some(true),
            ..StatementResult::default()
        };
        let wire = result.as_version(Version::V1_0_3).unwrap();
        assert_eq!(
            wire,
            json!({"score": {"scaled": 0.9, "raw": 90.0}, "completion": true})
        );
        assert_eq!(StatementResult::from_wire(&wire, Version::V0_95).unwrap(), result);
    }

    #[test]
    fn result_wrong_field_type_expected_invalid_shape() {
        let error = StatementResult::from_wire(&json!({"success": "yes"}), Version::V1_0_3)
            .unwrap_err();
        assert!(matches!(error, ModelError::InvalidShape { entity: "Result", .. }));
    }
}

use serde_json::Value;

use crate::error::ModelResult;
use crate::statement::Statement;
use crate::version::Version;
use crate::wire::{WireEntity, WireObject, expect_object, opt_string};

/// One page of a statement query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatementsResult {
    pub statements: Vec<Statement>,
    /// Continuation URL for the next page, relative or absolute.
    pub more: Option<String>,
    /// Entries that could not be rebuilt and were kept as id-only
    /// statements. Never rendered.
    pub degraded: usize,
}

impl StatementsResult {
    pub fn has_more(&self) -> bool {
        self.more.as_deref().is_some_and(|more| !more.is_empty())
    }
}

impl WireEntity for StatementsResult {
    fn as_version(&self, version: Version) -> ModelResult<Value> {
        let statements = self
            .statements
            .iter()
            .map(|statement| statement.as_version(version))
            .collect::<ModelResult<Vec<_>>>()?;
        Ok(WireObject::new()
            .with("statements", statements)
            .with_opt("more", self.more.clone())
            .build())
    }

    fn from_wire(wire: &Value, version: Version) -> ModelResult<Self> {
        let object = expect_object(wire, "StatementsResult")?;
        let mut degraded = 0;
        let statements = match object.get("statements") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    Statement::from_wire(item, version).unwrap_or_else(|_| {
                        degraded += 1;
                        Statement::id_only(item.get("id").and_then(Value::as_str).map(str::to_string))
                    })
                })
                .collect(),
            _ => Vec::new(),
        };
        Ok(Self {
            statements,
            more: opt_string(object, "more").filter(|more| !more.is_empty()),
            degraded,
        })
    }
}

use std::fmt;

use serde_json::Value;

use crate::activity::Activity;
use crate::agent::{Actor, Agent, Group};
use crate::error::{ModelError, ModelResult};
use crate::statement_ref::StatementRef;
use crate::substatement::SubStatement;
use crate::version::Version;
use crate::wire::{WireEntity, expect_object};

/// The target of a statement, selected on the wire by `objectType`.
#[derive(Clone, Debug, PartialEq)]
pub enum StatementObject {
    Activity(Activity),
    Actor(Actor),
    StatementRef(StatementRef),
    SubStatement(Box<SubStatement>),
}

impl StatementObject {
    pub fn as_activity(&self) -> Option<&Activity> {
        match self {
            Self::Activity(activity) => Some(activity),
            _ => None,
        }
    }

    pub fn display_text(&self, lang: Option<&str>) -> String {
        match self {
            Self::Activity(activity) => activity.display_text(lang),
            Self::Actor(actor) => actor.to_string(),
            Self::StatementRef(reference) => reference.to_string(),
            Self::SubStatement(sub) => sub.display_text(lang),
        }
    }
}

impl From<Activity> for StatementObject {
    fn from(activity: Activity) -> Self {
        Self::Activity(activity)
    }
}

impl From<Actor> for StatementObject {
    fn from(actor: Actor) -> Self {
        Self::Actor(actor)
    }
}

impl From<Agent> for StatementObject {
    fn from(agent: Agent) -> Self {
        Self::Actor(Actor::Agent(agent))
    }
}

impl From<Group> for StatementObject {
    fn from(group: Group) -> Self {
        Self::Actor(Actor::Group(group))
    }
}

impl From<StatementRef> for StatementObject {
    fn from(reference: StatementRef) -> Self {
        Self::StatementRef(reference)
    }
}

impl From<SubStatement> for StatementObject {
    fn from(sub: SubStatement) -> Self {
        Self::SubStatement(Box::new(sub))
    }
}

impl fmt::Display for StatementObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text(None))
    }
}

impl WireEntity for StatementObject {
    fn as_version(&self, version: Version) -> ModelResult<Value> {
        match self {
            Self::Activity(activity) => activity.as_version(version),
            Self::Actor(actor) => actor.as_version(version),
            Self::StatementRef(reference) => reference.as_version(version),
            Self::SubStatement(sub) => sub.as_version(version),
        }
    }

    fn from_wire(wire: &Value, version: Version) -> ModelResult<Self> {
        let object = expect_object(wire, "StatementObject")?;
        match object.get("objectType").and_then(Value::as_str) {
            None | Some("Activity") => Ok(Self::Activity(Activity::from_wire(wire, version)?)),
            Some("Agent") | Some("Person") | Some("Group") => {
                Ok(Self::Actor(Actor::from_wire(wire, version)?))
            }
            Some("StatementRef") | Some("Statement") => {
                Ok(Self::StatementRef(StatementRef::from_wire(wire, version)?))
            }
            Some("SubStatement") => Ok(Self::SubStatement(Box::new(SubStatement::from_wire(
                wire, version,
            )?))),
            Some(other) => Err(ModelError::UnknownObjectType(other.to_string())),
        }
    }
}

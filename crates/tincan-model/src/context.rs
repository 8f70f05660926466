use serde_json::{Map, Value};

use crate::activity::Activity;
use crate::agent::Actor;
use crate::error::ModelResult;
use crate::statement_ref::StatementRef;
use crate::version::Version;
use crate::wire::{Extensions, WireEntity, WireObject, expect_object, opt_extensions, opt_string};

/// Related activities grouped by their relationship to the statement.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContextActivities {
    pub parent: Vec<Activity>,
    pub grouping: Vec<Activity>,
    pub category: Vec<Activity>,
    pub other: Vec<Activity>,
}

impl ContextActivities {
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
            && self.grouping.is_empty()
            && self.category.is_empty()
            && self.other.is_empty()
    }
}

impl WireEntity for ContextActivities {
    fn as_version(&self, version: Version) -> ModelResult<Value> {
        let mut wire = WireObject::new();
        for (key, activities) in [
            ("parent", &self.parent),
            ("grouping", &self.grouping),
            ("other", &self.other),
            ("category", &self.category),
        ] {
            if activities.is_empty() {
                continue;
            }
            let rendered = activities
                .iter()
                .map(|activity| activity.as_version(version))
                .collect::<ModelResult<Vec<_>>>()?;
            wire = wire.with(key, rendered);
        }
        Ok(wire.build())
    }

    fn from_wire(wire: &Value, version: Version) -> ModelResult<Self> {
        let object = expect_object(wire, "ContextActivities")?;
        Ok(Self {
            parent: activity_list(object, "parent", version)?,
            grouping: activity_list(object, "grouping", version)?,
            category: activity_list(object, "category", version)?,
            other: activity_list(object, "other", version)?,
        })
    }
}

/// Accept a list, a single activity object, or a bare activity id.
fn activity_list(
    object: &Map<String, Value>,
    key: &str,
    version: Version,
) -> ModelResult<Vec<Activity>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| Activity::from_wire(item, version))
            .collect(),
        Some(single) => Ok(vec![Activity::from_wire(single, version)?]),
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Context {
    pub registration: Option<String>,
    pub instructor: Option<Actor>,
    pub team: Option<Actor>,
    pub context_activities: Option<ContextActivities>,
    pub revision: Option<String>,
    pub platform: Option<String>,
    pub language: Option<String>,
    pub statement: Option<StatementRef>,
    pub extensions: Option<Extensions>,
}

impl WireEntity for Context {
    fn as_version(&self, version: Version) -> ModelResult<Value> {
        let render = |actor: &Option<Actor>| actor.as_ref().map(|a| a.as_version(version)).transpose();
        let context_activities = self
            .context_activities
            .as_ref()
            .filter(|activities| !activities.is_empty())
            .map(|activities| activities.as_version(version))
            .transpose()?;
        let statement = self
            .statement
            .as_ref()
            .map(|statement| statement.as_version(version))
            .transpose()?;
        Ok(WireObject::new()
            .with_opt("registration", self.registration.clone())
            .with_opt("instructor", render(&self.instructor)?)
            .with_opt("team", render(&self.team)?)
            .with_opt("contextActivities", context_activities)
            .with_opt("revision", self.revision.clone())
            .with_opt("platform", self.platform.clone())
            .with_opt("language", self.language.clone())
            .with_opt("statement", statement)
            .with_extensions("extensions", self.extensions.as_ref())
            .build())
    }

    fn from_wire(wire: &Value, version: Version) -> ModelResult<Self> {
        let object = expect_object(wire, "Context")?;
        let actor = |key: &str| match object.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Actor::from_wire(value, version).map(Some),
        };
        let context_activities = match object.get("contextActivities") {
            None | Some(Value::Null) => None,
            Some(value) => Some(ContextActivities::from_wire(value, version)?),
        };
        let statement = match object.get("statement") {
            None | Some(Value::Null) => None,
            Some(value) => Some(StatementRef::from_wire(value, version)?),
        };
        Ok(Self {
            registration: opt_string(object, "registration"),
            instructor: actor("instructor")?,
            team: actor("team")?,
            context_activities,
            revision: opt_string(object, "revision"),
            platform: opt_string(object, "platform"),
            language: opt_string(object, "language"),
            statement,
            extensions: opt_extensions(object, "extensions"),
        })
    }
}

//! Statement query parameters and the per-version table deciding which of
//! them a store accepts.

use std::collections::BTreeMap;

use tincan_model::{Activity, Actor, Agent, Group, StatementObject, Verb, Version, VersionFamily, WireEntity};

use crate::error::{LrsError, LrsResult};

/// Accepted by every version.
pub const UNIVERSAL_PARAMETERS: &[&str] = &["verb", "registration", "since", "until", "limit", "ascending"];

const PRE_1_0_PARAMETERS: &[&str] = &[
    "actor",
    "instructor",
    "target",
    "object",
    "context",
    "authoritative",
    "sparse",
];

const V1_PARAMETERS: &[&str] = &[
    "agent",
    "activity",
    "related_activities",
    "related_agents",
    "format",
    "attachments",
];

/// Rendered as the JSON text of the entity.
const JSON_PARAMETERS: &[&str] = &["agent", "actor", "object", "instructor"];

/// Reduced to the bare identifier of the entity.
const ID_PARAMETERS: &[&str] = &["verb", "activity"];

/// Version-specific parameters on top of [`UNIVERSAL_PARAMETERS`].
pub fn supported_parameters(version: Version) -> &'static [&'static str] {
    match version.family() {
        VersionFamily::Pre1 => PRE_1_0_PARAMETERS,
        VersionFamily::V1 => V1_PARAMETERS,
    }
}

pub fn is_supported(parameter: &str, version: Version) -> bool {
    UNIVERSAL_PARAMETERS.contains(&parameter) || supported_parameters(version).contains(&parameter)
}

#[derive(Clone, Debug, PartialEq)]
pub enum QueryValue {
    Actor(Actor),
    Activity(Activity),
    Verb(Verb),
    Object(StatementObject),
    Text(String),
    Flag(bool),
    Number(u64),
}

impl From<Actor> for QueryValue {
    fn from(actor: Actor) -> Self {
        Self::Actor(actor)
    }
}

impl From<Agent> for QueryValue {
    fn from(agent: Agent) -> Self {
        Self::Actor(Actor::Agent(agent))
    }
}

impl From<Group> for QueryValue {
    fn from(group: Group) -> Self {
        Self::Actor(Actor::Group(group))
    }
}

impl From<Activity> for QueryValue {
    fn from(activity: Activity) -> Self {
        Self::Activity(activity)
    }
}

impl From<Verb> for QueryValue {
    fn from(verb: Verb) -> Self {
        Self::Verb(verb)
    }
}

impl From<StatementObject> for QueryValue {
    fn from(object: StatementObject) -> Self {
        Self::Object(object)
    }
}

impl From<String> for QueryValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for QueryValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<bool> for QueryValue {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

impl From<u64> for QueryValue {
    fn from(number: u64) -> Self {
        Self::Number(number)
    }
}

impl QueryValue {
    fn entity_json(&self, version: Version) -> LrsResult<String> {
        let wire = match self {
            Self::Actor(actor) => actor.as_version(version)?,
            Self::Activity(activity) => activity.as_version(version)?,
            Self::Verb(verb) => verb.as_version(version)?,
            Self::Object(object) => object.as_version(version)?,
            _ => return Ok(self.plain_text()),
        };
        Ok(wire.to_string())
    }

    fn identifier(&self) -> String {
        match self {
            Self::Verb(verb) => verb.id.clone(),
            Self::Activity(activity) => activity.id.clone().unwrap_or_default(),
            Self::Object(StatementObject::Activity(activity)) => {
                activity.id.clone().unwrap_or_default()
            }
            _ => self.plain_text(),
        }
    }

    fn plain_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Flag(flag) => flag.to_string(),
            Self::Number(number) => number.to_string(),
            Self::Verb(verb) => verb.id.clone(),
            Self::Activity(activity) => activity.id.clone().unwrap_or_default(),
            Self::Actor(actor) => actor.to_string(),
            Self::Object(object) => object.to_string(),
        }
    }
}

/// Filters for a statement query, keyed by parameter name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatementQuery {
    params: BTreeMap<String, QueryValue>,
}

impl StatementQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<QueryValue>) {
        self.params.insert(name.into(), value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&QueryValue> {
        self.params.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    pub fn wants_attachments(&self) -> bool {
        match self.params.get("attachments") {
            Some(QueryValue::Flag(flag)) => *flag,
            Some(QueryValue::Text(text)) => text == "true",
            _ => false,
        }
    }

    /// Check every name against `version`, then render the wire parameters.
    ///
    /// Nothing is rendered when any name is unsupported. `target` is sent as
    /// `object`.
    pub fn to_parameters(&self, version: Version) -> LrsResult<Vec<(String, String)>> {
        if let Some(parameter) = self.names().find(|name| !is_supported(name, version)) {
            return Err(LrsError::UnsupportedQueryParameter {
                parameter: parameter.to_string(),
                version: version.to_string(),
            });
        }

        let mut params = self.params.clone();
        if let Some(target) = params.remove("target") {
            params.insert("object".to_string(), target);
        }

        params
            .iter()
            .map(|(name, value)| {
                let rendered = if JSON_PARAMETERS.contains(&name.as_str()) {
                    value.entity_json(version)?
                } else if ID_PARAMETERS.contains(&name.as_str()) {
                    value.identifier()
                } else {
                    value.plain_text()
                };
                Ok::<_, LrsError>((name.clone(), rendered))
            })
            .collect()
    }
}

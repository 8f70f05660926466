use std::fmt;

use serde_json::{Map, Value};

use crate::error::{ModelError, ModelResult};
use crate::version::Version;
use crate::wire::{WireEntity, WireObject, expect_object, normalize_keys, opt_string};

const ACCOUNT_ALIASES: &[(&str, &str)] = &[
    ("accountName", "name"),
    ("accountServiceHomePage", "homePage"),
];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AgentAccount {
    pub name: Option<String>,
    pub home_page: Option<String>,
}

impl AgentAccount {
    pub fn new(name: impl Into<String>, home_page: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            home_page: Some(home_page.into()),
        }
    }
}

impl fmt::Display for AgentAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_none() && self.home_page.is_none() {
            return f.write_str("AgentAccount: unidentified");
        }
        write!(
            f,
            "{}:{}",
            self.name.as_deref().unwrap_or("-"),
            self.home_page.as_deref().unwrap_or("-")
        )
    }
}

impl WireEntity for AgentAccount {
    fn as_version(&self, version: Version) -> ModelResult<Value> {
        let (name_key, home_page_key) = if version.is_legacy() {
            ("accountName", "accountServiceHomePage")
        } else {
            ("name", "homePage")
        };
        Ok(WireObject::new()
            .with_opt(name_key, self.name.clone())
            .with_opt(home_page_key, self.home_page.clone())
            .build())
    }

    fn from_wire(wire: &Value, _version: Version) -> ModelResult<Self> {
        let object = normalize_keys(expect_object(wire, "AgentAccount")?, ACCOUNT_ALIASES);
        Ok(Self {
            name: opt_string(&object, "name"),
            home_page: opt_string(&object, "homePage"),
        })
    }
}

/// The single channel an agent is identified by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identifier {
    Mbox(String),
    MboxSha1Sum(String),
    OpenId(String),
    Account(AgentAccount),
}

impl Identifier {
    /// A mailbox identifier, prefixed with `mailto:` when missing.
    pub fn mbox(address: impl Into<String>) -> Self {
        let address = address.into();
        if address.contains("mailto:") {
            Self::Mbox(address)
        } else {
            Self::Mbox(format!("mailto:{address}"))
        }
    }

    fn write(&self, wire: WireObject, version: Version) -> ModelResult<WireObject> {
        Ok(match self {
            Self::Mbox(mbox) => wire.with("mbox", mbox.clone()),
            Self::MboxSha1Sum(sum) => wire.with("mbox_sha1sum", sum.clone()),
            Self::OpenId(openid) => wire.with("openid", openid.clone()),
            Self::Account(account) => wire.with("account", account.as_version(version)?),
        })
    }

    /// Pick the populated channel with the highest precedence.
    fn read(object: &Map<String, Value>, version: Version) -> ModelResult<Option<Self>> {
        if let Some(mbox) = first_string(object, "mbox") {
            return Ok(Some(Self::mbox(mbox)));
        }
        if let Some(sum) = first_string(object, "mbox_sha1sum") {
            return Ok(Some(Self::MboxSha1Sum(sum)));
        }
        if let Some(openid) = first_string(object, "openid") {
            return Ok(Some(Self::OpenId(openid)));
        }
        match object.get("account") {
            Some(Value::Array(items)) if !items.is_empty() => {
                Ok(Some(Self::Account(AgentAccount::from_wire(&items[0], version)?)))
            }
            Some(account @ Value::Object(_)) => {
                Ok(Some(Self::Account(AgentAccount::from_wire(account, version)?)))
            }
            _ => Ok(None),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Agent {
    pub name: Option<String>,
    pub identifier: Option<Identifier>,
    /// Set when a legacy multi-valued name had to be truncated on read.
    pub degraded: bool,
}

impl Agent {
    pub fn new(name: Option<String>, identifier: Option<Identifier>) -> Self {
        Self {
            name,
            identifier,
            degraded: false,
        }
    }

    pub fn with_mbox(address: impl Into<String>) -> Self {
        Self::new(None, Some(Identifier::mbox(address)))
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn write_fields(&self, object_type: &str, version: Version) -> ModelResult<WireObject> {
        let mut wire = WireObject::new().with("objectType", object_type);
        if let Some(identifier) = &self.identifier {
            wire = identifier.write(wire, version)?;
        }
        Ok(wire.with_opt("name", self.name.clone()))
    }

    fn read_fields(object: &Map<String, Value>, version: Version) -> ModelResult<Self> {
        let (name, degraded) = read_name(object);
        Ok(Self {
            name,
            identifier: Identifier::read(object, version)?,
            degraded,
        })
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            return f.write_str(name);
        }
        match &self.identifier {
            Some(Identifier::Mbox(mbox)) => f.write_str(&mbox.replace("mailto:", "")),
            Some(Identifier::MboxSha1Sum(sum)) => f.write_str(sum),
            Some(Identifier::OpenId(openid)) => f.write_str(openid),
            Some(Identifier::Account(account)) => write!(f, "{account}"),
            None => f.write_str("Agent: unidentified"),
        }
    }
}

impl WireEntity for Agent {
    fn as_version(&self, version: Version) -> ModelResult<Value> {
        Ok(self.write_fields("Agent", version)?.build())
    }

    fn from_wire(wire: &Value, version: Version) -> ModelResult<Self> {
        Self::read_fields(expect_object(wire, "Agent")?, version)
    }
}

/// An agent with an ordered list of members.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Group {
    pub agent: Agent,
    pub member: Vec<Agent>,
}

impl Group {
    pub fn new(agent: Agent, member: Vec<Agent>) -> Self {
        Self { agent, member }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.agent.to_string();
        if text == "Agent: unidentified" {
            f.write_str(&text)
        } else {
            write!(f, "Group: {text}")
        }
    }
}

impl WireEntity for Group {
    fn as_version(&self, version: Version) -> ModelResult<Value> {
        let mut wire = self.agent.write_fields("Group", version)?;
        if !self.member.is_empty() {
            let members = self
                .member
                .iter()
                .map(|member| member.as_version(version))
                .collect::<ModelResult<Vec<_>>>()?;
            wire = wire.with("member", members);
        }
        Ok(wire.build())
    }

    fn from_wire(wire: &Value, version: Version) -> ModelResult<Self> {
        let object = expect_object(wire, "Group")?;
        let member = match object.get("member") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| Agent::from_wire(item, version))
                .collect::<ModelResult<Vec<_>>>()?,
            _ => Vec::new(),
        };
        Ok(Self {
            agent: Agent::read_fields(object, version)?,
            member,
        })
    }
}

/// Either an individual or a group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Actor {
    Agent(Agent),
    Group(Group),
}

impl Actor {
    pub fn object_type(&self) -> &'static str {
        match self {
            Self::Agent(_) => "Agent",
            Self::Group(_) => "Group",
        }
    }

    pub fn agent(&self) -> &Agent {
        match self {
            Self::Agent(agent) => agent,
            Self::Group(group) => &group.agent,
        }
    }
}

impl From<Agent> for Actor {
    fn from(agent: Agent) -> Self {
        Self::Agent(agent)
    }
}

impl From<Group> for Actor {
    fn from(group: Group) -> Self {
        Self::Group(group)
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Agent(agent) => write!(f, "{agent}"),
            Self::Group(group) => write!(f, "{group}"),
        }
    }
}

impl WireEntity for Actor {
    fn as_version(&self, version: Version) -> ModelResult<Value> {
        match self {
            Self::Agent(agent) => agent.as_version(version),
            Self::Group(group) => group.as_version(version),
        }
    }

    fn from_wire(wire: &Value, version: Version) -> ModelResult<Self> {
        let object = expect_object(wire, "Actor")?;
        match object.get("objectType").and_then(Value::as_str) {
            None | Some("Agent") | Some("Person") => Ok(Self::Agent(Agent::from_wire(wire, version)?)),
            Some("Group") => Ok(Self::Group(Group::from_wire(wire, version)?)),
            Some(other) => Err(ModelError::UnknownObjectType(other.to_string())),
        }
    }
}

fn first_string(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::Array(items) => items.first().and_then(Value::as_str).map(str::to_string),
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        _ => None,
    }
}

/// Resolve `name` from the current field or from the legacy name parts.
fn read_name(object: &Map<String, Value>) -> (Option<String>, bool) {
    for (first_key, last_key) in [("firstName", "lastName"), ("givenName", "familyName")] {
        let first = name_part(object, first_key);
        let last = name_part(object, last_key);
        if first.is_none() && last.is_none() {
            continue;
        }
        let mut degraded = false;
        let mut parts = Vec::new();
        for (value, overflow) in [first, last].into_iter().flatten() {
            degraded |= overflow;
            parts.push(value);
        }
        return (Some(parts.join(" ")), degraded);
    }
    match object.get("name") {
        Some(Value::Array(items)) => (
            items.first().and_then(Value::as_str).map(str::to_string),
            items.len() > 1,
        ),
        Some(Value::String(name)) if !name.is_empty() => (Some(name.clone()), false),
        _ => (None, false),
    }
}

/// First value of a legacy name part and whether more values were dropped.
fn name_part(object: &Map<String, Value>, key: &str) -> Option<(String, bool)> {
    match object.get(key)? {
        Value::Array(items) => items
            .first()
            .and_then(Value::as_str)
            .map(|first| (first.to_string(), items.len() > 1)),
        Value::String(text) if !text.is_empty() => Some((text.clone(), false)),
        _ => None,
    }
}

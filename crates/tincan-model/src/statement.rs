use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::agent::Actor;
use crate::attachment::Attachment;
use crate::context::Context;
use crate::error::{ModelError, ModelResult};
use crate::object::StatementObject;
use crate::result::StatementResult;
use crate::verb::Verb;
use crate::version::Version;
use crate::wire::{
    WireEntity, WireObject, expect_object, normalize_keys, opt_string, parse_opt, render_opt,
};

const STATEMENT_ALIASES: &[(&str, &str)] = &[("target", "object")];

/// Current UTC instant with millisecond precision, e.g.
/// `2024-05-01T12:00:00.000Z`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Statement {
    pub id: Option<String>,
    pub actor: Option<Actor>,
    pub verb: Option<Verb>,
    pub object: Option<StatementObject>,
    pub result: Option<StatementResult>,
    pub context: Option<Context>,
    pub timestamp: Option<String>,
    pub stored: Option<String>,
    pub authority: Option<Actor>,
    pub attachments: Vec<Attachment>,
    pub version: Option<String>,
}

impl Statement {
    /// A stamped statement for `actor verb object`.
    pub fn new(
        actor: impl Into<Actor>,
        verb: Verb,
        object: impl Into<StatementObject>,
    ) -> Self {
        Self::builder().actor(actor).verb(verb).object(object).build()
    }

    pub fn builder() -> StatementBuilder {
        StatementBuilder::default()
    }

    /// Statement carrying nothing but its id, used when a stored statement
    /// cannot be rebuilt.
    pub fn id_only(id: Option<String>) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Assign an id and timestamp where missing. Existing values are kept.
    pub fn stamp(&mut self) {
        if self.id.is_none() {
            self.id = Some(Uuid::new_v4().to_string());
        }
        if self.timestamp.is_none() {
            self.timestamp = Some(timestamp_now());
        }
    }

    pub fn has_attachment_with_content(&self) -> bool {
        self.attachments.iter().any(Attachment::has_content)
    }

    /// Fill attachment bodies from `lookup`, keyed by `sha2` digest.
    pub fn attach_content<'a>(&mut self, lookup: impl Fn(&str) -> Option<&'a [u8]>) {
        for attachment in &mut self.attachments {
            let Some(digest) = attachment.sha2.clone() else {
                continue;
            };
            if let Some(content) = lookup(&digest) {
                attachment.set_content(content.to_vec());
            }
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.actor.as_ref().map(ToString::to_string).unwrap_or_default(),
            self.verb.as_ref().map(|verb| verb.display_text(None)).unwrap_or(""),
            self.object.as_ref().map(ToString::to_string).unwrap_or_default()
        )
    }
}

impl WireEntity for Statement {
    fn as_version(&self, version: Version) -> ModelResult<Value> {
        if !self.attachments.is_empty() && version.is_pre_1_0() {
            return Err(ModelError::NotRepresentable {
                entity: "Attachment",
                version: version.to_string(),
            });
        }
        let mut wire = WireObject::new()
            .with_opt("id", self.id.clone())
            .with_opt("actor", render_opt(&self.actor, version)?)
            .with_opt("verb", render_opt(&self.verb, version)?)
            .with_opt("object", render_opt(&self.object, version)?)
            .with_opt("result", render_opt(&self.result, version)?)
            .with_opt("context", render_opt(&self.context, version)?)
            .with_opt("timestamp", self.timestamp.clone())
            .with_opt("stored", self.stored.clone())
            .with_opt("authority", render_opt(&self.authority, version)?)
            .with_opt("version", self.version.clone());
        if !self.attachments.is_empty() {
            let attachments = self
                .attachments
                .iter()
                .map(|attachment| attachment.as_version(version))
                .collect::<ModelResult<Vec<_>>>()?;
            wire = wire.with("attachments", attachments);
        }
        Ok(wire.build())
    }

    /// Rebuild a stored statement. No id or timestamp is assigned.
    fn from_wire(wire: &Value, version: Version) -> ModelResult<Self> {
        let object = normalize_keys(expect_object(wire, "Statement")?, STATEMENT_ALIASES);
        let attachments = match object.get("attachments") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| Attachment::from_wire(item, version))
                .collect::<ModelResult<Vec<_>>>()?,
            _ => Vec::new(),
        };
        Ok(Self {
            id: opt_string(&object, "id"),
            actor: parse_opt(&object, "actor", version)?,
            verb: parse_opt(&object, "verb", version)?,
            object: parse_opt(&object, "object", version)?,
            result: parse_opt(&object, "result", version)?,
            context: parse_opt(&object, "context", version)?,
            timestamp: opt_string(&object, "timestamp"),
            stored: opt_string(&object, "stored"),
            authority: parse_opt(&object, "authority", version)?,
            attachments,
            version: opt_string(&object, "version"),
        })
    }
}

/// Assembles a [`Statement`], stamping it on `build` unless told not to.
#[derive(Clone, Debug)]
pub struct StatementBuilder {
    statement: Statement,
    stamp: bool,
}

impl Default for StatementBuilder {
    fn default() -> Self {
        Self {
            statement: Statement::default(),
            stamp: true,
        }
    }
}

impl StatementBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.statement.id = Some(id.into());
        self
    }

    pub fn actor(mut self, actor: impl Into<Actor>) -> Self {
        self.statement.actor = Some(actor.into());
        self
    }

    pub fn verb(mut self, verb: Verb) -> Self {
        self.statement.verb = Some(verb);
        self
    }

    pub fn object(mut self, object: impl Into<StatementObject>) -> Self {
        self.statement.object = Some(object.into());
        self
    }

    pub fn result(mut self, result: StatementResult) -> Self {
        self.statement.result = Some(result);
        self
    }

    pub fn context(mut self, context: Context) -> Self {
        self.statement.context = Some(context);
        self
    }

    pub fn timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.statement.timestamp = Some(timestamp.into());
        self
    }

    pub fn authority(mut self, authority: impl Into<Actor>) -> Self {
        self.statement.authority = Some(authority.into());
        self
    }

    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.statement.attachments.push(attachment);
        self
    }

    pub fn without_stamp(mut self) -> Self {
        self.stamp = false;
        self
    }

    pub fn build(self) -> Statement {
        let mut statement = self.statement;
        if self.stamp {
            statement.stamp();
        }
        statement
    }
}

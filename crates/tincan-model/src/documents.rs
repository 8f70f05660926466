//! Key-scoped documents held by a store: state, activity profiles and agent
//! profiles.

use serde_json::Value;

use crate::activity::Activity;
use crate::agent::Actor;

/// Body of a document.
#[derive(Clone, Debug, PartialEq)]
pub enum DocumentContents {
    Raw(Vec<u8>),
    Json(Value),
}

impl Default for DocumentContents {
    fn default() -> Self {
        Self::Raw(Vec::new())
    }
}

impl DocumentContents {
    /// Interpret a response body. JSON parsing is attempted only for a JSON
    /// content type, and a parse failure keeps the raw bytes.
    pub fn from_body(body: Vec<u8>, content_type: Option<&str>) -> Self {
        if body.is_empty() || !is_json_content_type(content_type) {
            return Self::Raw(body);
        }
        match serde_json::from_slice(&body) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Raw(body),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Raw(bytes) if bytes.is_empty())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Raw(bytes) => bytes.clone(),
            Self::Json(value) => value.to_string().into_bytes(),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    pub fn text(&self) -> String {
        match self {
            Self::Raw(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Self::Json(value) => value.to_string(),
        }
    }
}

impl From<Value> for DocumentContents {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Vec<u8>> for DocumentContents {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Raw(bytes)
    }
}

impl From<&str> for DocumentContents {
    fn from(text: &str) -> Self {
        Self::Raw(text.as_bytes().to_vec())
    }
}

pub fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|content_type| {
        content_type
            .split(';')
            .next()
            .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
    })
}

/// Fields shared by every document kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub id: String,
    pub contents: DocumentContents,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub updated: Option<String>,
}

impl Document {
    /// The value a read yields when the store has no document under `id`.
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty() && self.etag.is_none()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct State {
    pub document: Document,
    pub activity: Activity,
    pub agent: Actor,
    pub registration: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ActivityProfile {
    pub document: Document,
    pub activity: Activity,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AgentProfile {
    pub document: Document,
    pub agent: Actor,
}

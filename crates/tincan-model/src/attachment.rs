use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::ModelResult;
use crate::lang::LanguageMap;
use crate::version::Version;
use crate::wire::{WireEntity, WireObject, expect_object, opt_language_map, opt_string};

/// Hex SHA-256 of `content`, the key attachments are joined on in multipart
/// bodies.
pub fn content_digest(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attachment {
    pub usage_type: Option<String>,
    pub display: Option<LanguageMap>,
    pub description: Option<LanguageMap>,
    pub content_type: Option<String>,
    pub length: Option<u64>,
    pub sha2: Option<String>,
    pub file_url: Option<String>,
    /// Raw bytes; never part of the JSON rendering. Written only through
    /// `set_content` so `length` and `sha2` always describe it.
    content: Option<Vec<u8>>,
}

impl Attachment {
    pub fn new(usage_type: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            usage_type: Some(usage_type.into()),
            content_type: Some(content_type.into()),
            ..Self::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<Vec<u8>>) -> Self {
        self.set_content(content);
        self
    }

    /// Replace the content, recomputing `length` and `sha2`.
    pub fn set_content(&mut self, content: impl Into<Vec<u8>>) {
        let content = content.into();
        self.length = Some(content.len() as u64);
        self.sha2 = Some(content_digest(&content));
        self.content = Some(content);
    }

    pub fn content(&self) -> Option<&[u8]> {
        self.content.as_deref()
    }

    pub fn has_content(&self) -> bool {
        self.content().is_some_and(|content| !content.is_empty())
    }
}

impl WireEntity for Attachment {
    fn as_version(&self, _version: Version) -> ModelResult<Value> {
        let (length, sha2) = match self.content() {
            Some(content) => (Some(content.len() as u64), Some(content_digest(content))),
            None => (self.length, self.sha2.clone()),
        };
        Ok(WireObject::new()
            .with_opt("usageType", self.usage_type.clone())
            .with_language_map("display", self.display.as_ref())
            .with_language_map("description", self.description.as_ref())
            .with_opt("contentType", self.content_type.clone())
            .with_opt("length", length)
            .with_opt("sha2", sha2)
            .with_opt("fileUrl", self.file_url.clone())
            .build())
    }

    fn from_wire(wire: &Value, _version: Version) -> ModelResult<Self> {
        let object = expect_object(wire, "Attachment")?;
        Ok(Self {
            usage_type: opt_string(object, "usageType"),
            display: opt_language_map(object, "display", "Attachment")?,
            description: opt_language_map(object, "description", "Attachment")?,
            content_type: opt_string(object, "contentType"),
            length: object.get("length").and_then(Value::as_u64),
            sha2: opt_string(object, "sha2"),
            file_url: opt_string(object, "fileUrl"),
            content: None,
        })
    }
}

//! `multipart/mixed` bodies carrying a JSON document followed by attachment
//! bodies keyed by their SHA-256 digest.

use std::collections::BTreeMap;

use serde_json::Value;
use tincan_model::{Attachment, content_digest};
use uuid::Uuid;

use crate::error::{LrsError, LrsResult};

pub const HASH_HEADER: &str = "X-Experience-API-Hash";
pub const MULTIPART_MIXED: &str = "multipart/mixed";

const CRLF: &[u8] = b"\r\n";

/// Random hex boundary token.
pub fn new_boundary() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn content_type(boundary: &str) -> String {
    format!("{MULTIPART_MIXED}; boundary={boundary}")
}

/// Boundary declared by a `multipart/mixed` content type, if any.
pub fn boundary_of(content_type: &str) -> Option<&str> {
    let mut params = content_type.split(';');
    let essence = params.next()?.trim();
    if !essence.eq_ignore_ascii_case(MULTIPART_MIXED) {
        return None;
    }
    params
        .filter_map(|param| param.trim().split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
}

/// Build a body from `document` and every attachment that carries content.
pub fn encode(boundary: &str, document: &Value, attachments: &[&Attachment]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\nContent-Type: application/json\r\n\r\n").as_bytes());
    body.extend_from_slice(document.to_string().as_bytes());
    body.extend_from_slice(CRLF);

    for attachment in attachments {
        let Some(content) = attachment.content().filter(|c| !c.is_empty()) else {
            continue;
        };
        let headers = format!(
            "--{boundary}\r\nContent-Type: {}\r\nContent-Transfer-Encoding: binary\r\n{HASH_HEADER}: {}\r\n\r\n",
            attachment.content_type.as_deref().unwrap_or("application/octet-stream"),
            content_digest(content),
        );
        body.extend_from_slice(headers.as_bytes());
        body.extend_from_slice(content);
        body.extend_from_slice(CRLF);
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Part {
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Part {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Split `body` on `--boundary` delimiters.
///
/// Scanning stops at the closing `--boundary--`. A part with no delimiter after
/// it keeps the rest of the input as its body.
pub fn split(boundary: &str, body: &[u8]) -> Vec<Part> {
    let delimiter = format!("--{boundary}").into_bytes();
    let mut parts = Vec::new();
    let Some(mut start) = find(body, &delimiter, 0) else {
        return parts;
    };

    loop {
        let after = start + delimiter.len();
        if body[after..].starts_with(b"--") {
            break;
        }
        let region_start = skip_line_break(body, after);
        let next = find(body, &delimiter, region_start);
        let region = &body[region_start..next.unwrap_or(body.len())];

        let (raw_headers, mut payload) = if region.starts_with(CRLF) {
            (&region[..0], &region[CRLF.len()..])
        } else {
            match find(region, b"\r\n\r\n", 0) {
                Some(end) => (&region[..end], &region[end + 4..]),
                None => (region, &region[region.len()..]),
            }
        };
        if next.is_some() {
            payload = strip_line_break(payload);
        }
        parts.push(Part {
            headers: parse_headers(raw_headers),
            body: payload.to_vec(),
        });

        match next {
            Some(position) => start = position,
            None => break,
        }
    }
    parts
}

/// A decoded body: the leading JSON document and the attachment bodies by
/// digest.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Decoded {
    pub document: Value,
    pub attachments: BTreeMap<String, Vec<u8>>,
}

impl Decoded {
    pub fn content(&self, digest: &str) -> Option<&[u8]> {
        self.attachments.get(digest).map(Vec::as_slice)
    }
}

pub fn decode(boundary: &str, body: &[u8]) -> LrsResult<Decoded> {
    let mut parts = split(boundary, body).into_iter();
    let first = parts
        .next()
        .ok_or_else(|| LrsError::Parse("multipart body has no parts".to_string()))?;
    let document = serde_json::from_slice(&first.body)
        .map_err(|err| LrsError::Parse(format!("multipart document is not JSON: {err}")))?;

    let mut attachments = BTreeMap::new();
    for part in parts {
        match part.header(HASH_HEADER) {
            Some(digest) => {
                attachments.insert(digest.to_string(), part.body);
            }
            None => tracing::warn!("multipart segment without {HASH_HEADER} header ignored"),
        }
    }
    Ok(Decoded {
        document,
        attachments,
    })
}

fn parse_headers(raw: &[u8]) -> Vec<(String, String)> {
    String::from_utf8_lossy(raw)
        .split('\n')
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() || needle.is_empty() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|position| position + from)
}

fn skip_line_break(body: &[u8], at: usize) -> usize {
    if body[at..].starts_with(CRLF) {
        at + 2
    } else if body[at..].starts_with(b"\n") {
        at + 1
    } else {
        at
    }
}

fn strip_line_break(payload: &[u8]) -> &[u8] {
    payload
        .strip_suffix(CRLF)
        .or_else(|| payload.strip_suffix(b"\n"))
        .unwrap_or(payload)
}

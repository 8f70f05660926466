use std::collections::BTreeMap;

use serde_json::Value;
use url::Url;

use tincan_model::{About, Activity, Attachment, Statement, StatementsResult, WireEntity};

use super::{Lrs, parse_json};
use crate::dispatcher::LrsRequest;
use crate::error::{LrsError, LrsResult};
use crate::multipart;
use crate::query::StatementQuery;
use crate::transport::{HttpResponse, HttpTransport, Method};

/// Outcome of a statement write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatementWrite {
    Sent(HttpResponse),
    /// Not representable for the store version and tolerated by policy.
    Skipped { reason: String },
}

impl StatementWrite {
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            Self::Sent(response) => Some(response),
            Self::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Resolve a `more` continuation against the store endpoint.
///
/// Absolute URLs are used as given. A path starting with `/statements` is
/// placed under the endpoint path, any other absolute path under the server
/// root, and a relative reference under the endpoint.
pub fn resolve_more_url(endpoint: &Url, more: &str) -> LrsResult<Url> {
    if let Ok(url) = Url::parse(more) {
        return Ok(url);
    }
    let target = if more.starts_with("/statements") {
        format!("{}{more}", endpoint.path().trim_end_matches('/'))
    } else {
        more.to_string()
    };
    endpoint
        .join(&target)
        .map_err(|err| LrsError::InvalidInput(format!("invalid more url {more}: {err}")))
}

/// JSON document and attachment bodies of a statement response.
struct StatementBody {
    document: Value,
    attachments: BTreeMap<String, Vec<u8>>,
}

impl StatementBody {
    fn read(response: &HttpResponse) -> LrsResult<Self> {
        match response.content_type().and_then(multipart::boundary_of) {
            Some(boundary) => {
                let decoded = multipart::decode(boundary, &response.body)?;
                Ok(Self {
                    document: decoded.document,
                    attachments: decoded.attachments,
                })
            }
            None => Ok(Self {
                document: parse_json(&response.body)?,
                attachments: BTreeMap::new(),
            }),
        }
    }

    fn fill(&self, statement: &mut Statement) {
        if !self.attachments.is_empty() {
            statement.attach_content(|digest| self.attachments.get(digest).map(Vec::as_slice));
        }
    }
}

fn request_body(document: &Value, attachments: &[&Attachment]) -> (String, Vec<u8>) {
    if attachments.iter().any(|attachment| attachment.has_content()) {
        let boundary = multipart::new_boundary();
        let body = multipart::encode(&boundary, document, attachments);
        (multipart::content_type(&boundary), body)
    } else {
        ("application/json".to_string(), document.to_string().into_bytes())
    }
}

impl<T> Lrs<T>
where
    T: HttpTransport,
{
    pub async fn about(&self) -> LrsResult<About> {
        let response = self.send(LrsRequest::get("about")).await?;
        let document = parse_json(&response.body)?;
        About::from_wire(&document, self.version())
            .map_err(|err| LrsError::Parse(format!("about: {err}")))
    }

    /// PUT under the statement id when it has one, POST otherwise.
    pub async fn save_statement(&self, statement: &Statement) -> LrsResult<StatementWrite> {
        let document = match statement.as_version(self.version()) {
            Ok(document) => document,
            Err(err) => return self.tolerate(err),
        };

        let request = match &statement.id {
            Some(id) => LrsRequest::new(Method::Put, "statements").param("statementId", id.clone()),
            None => LrsRequest::new(Method::Post, "statements"),
        };
        let attachments: Vec<&Attachment> = statement.attachments.iter().collect();
        let (content_type, body) = request_body(&document, &attachments);
        let response = self.send(request.body(content_type, body)).await?;
        Ok(StatementWrite::Sent(response))
    }

    /// POST a batch. A statement the store version cannot represent skips
    /// the whole batch under the tolerance policy.
    pub async fn save_statements(&self, statements: &[Statement]) -> LrsResult<StatementWrite> {
        if statements.is_empty() {
            return Err(LrsError::InvalidInput("no statements".to_string()));
        }

        let mut documents = Vec::with_capacity(statements.len());
        for statement in statements {
            match statement.as_version(self.version()) {
                Ok(document) => documents.push(document),
                Err(err) => return self.tolerate(err),
            }
        }
        let attachments: Vec<&Attachment> = statements
            .iter()
            .flat_map(|statement| statement.attachments.iter())
            .collect();
        let (content_type, body) = request_body(&Value::Array(documents), &attachments);
        let response = self
            .send(LrsRequest::new(Method::Post, "statements").body(content_type, body))
            .await?;
        Ok(StatementWrite::Sent(response))
    }

    pub async fn retrieve_statement(&self, id: &str, attachments: bool) -> LrsResult<Statement> {
        let mut request = LrsRequest::get("statements").param("statementId", id);
        if attachments && !self.version().is_pre_1_0() {
            request = request.param("attachments", "true");
        }
        self.fetch_statement(request).await
    }

    pub async fn retrieve_voided_statement(
        &self,
        id: &str,
        attachments: bool,
    ) -> LrsResult<Statement> {
        let request = if self.version().is_pre_1_0() {
            LrsRequest::get("statements").param("statementId", id)
        } else {
            let request = LrsRequest::get("statements").param("voidedStatementId", id);
            if attachments {
                request.param("attachments", "true")
            } else {
                request
            }
        };
        self.fetch_statement(request).await
    }

    /// Parameters are checked against the store version before anything is
    /// sent.
    pub async fn query_statements(&self, query: &StatementQuery) -> LrsResult<StatementsResult> {
        let params = query.to_parameters(self.version())?;
        self.fetch_statements(LrsRequest::get("statements").params(params))
            .await
    }

    pub async fn more_statements(&self, more: &str) -> LrsResult<StatementsResult> {
        let url = resolve_more_url(self.endpoint(), more)?;
        tracing::debug!(more, resolved = %url, "following statement continuation");
        self.fetch_statements(LrsRequest::get(url.to_string())).await
    }

    /// An unknown activity yields a bare activity with the requested id.
    pub async fn retrieve_activity(&self, id: &str) -> LrsResult<Activity> {
        let response = self
            .send(LrsRequest::get("activities").param("activityId", id).ignore_404())
            .await?;
        if response.status == 404 {
            tracing::debug!(activity = id, "activity unknown to store");
            return Ok(Activity::new(id));
        }
        let document = parse_json(&response.body)?;
        Activity::from_wire(&document, self.version())
            .map_err(|err| LrsError::Parse(format!("activity: {err}")))
    }

    async fn fetch_statement(&self, request: LrsRequest) -> LrsResult<Statement> {
        let response = self.send(request).await?;
        let body = StatementBody::read(&response)?;
        let mut statement = Statement::from_wire(&body.document, self.version())
            .map_err(|err| LrsError::Parse(format!("statement: {err}")))?;
        body.fill(&mut statement);
        Ok(statement)
    }

    async fn fetch_statements(&self, request: LrsRequest) -> LrsResult<StatementsResult> {
        let response = self.send(request).await?;
        let body = StatementBody::read(&response)?;
        let mut result = StatementsResult::from_wire(&body.document, self.version())
            .map_err(|err| LrsError::Parse(format!("statements: {err}")))?;
        if result.degraded > 0 {
            tracing::warn!(
                degraded = result.degraded,
                "statements could not be rebuilt, keeping their ids only"
            );
        }
        for statement in &mut result.statements {
            body.fill(statement);
        }
        Ok(result)
    }
}

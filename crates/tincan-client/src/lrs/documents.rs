use tincan_model::documents::is_json_content_type;
use tincan_model::{Activity, ActivityProfile, Actor, AgentProfile, Document, DocumentContents, State};

use super::{Lrs, parse_json};
use crate::dispatcher::LrsRequest;
use crate::error::{LrsError, LrsResult};
use crate::transport::{HttpResponse, HttpTransport, Method};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// How a state or profile document is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveOptions {
    /// Defaults to `application/octet-stream`.
    pub content_type: Option<String>,
    /// ETag of the revision being replaced.
    pub etag: Option<String>,
    /// With `false`, a JSON document is merged into the stored one.
    pub overwrite_json: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            content_type: None,
            etag: None,
            overwrite_json: true,
        }
    }
}

impl SaveOptions {
    pub fn json() -> Self {
        Self {
            content_type: Some("application/json".to_string()),
            ..Self::default()
        }
    }

    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    pub fn merging(mut self) -> Self {
        self.overwrite_json = false;
        self
    }

    fn content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    fn method(&self) -> Method {
        if !self.overwrite_json && is_json_content_type(Some(self.content_type())) {
            Method::Post
        } else {
            Method::Put
        }
    }

    fn request(&self, resource: &str) -> LrsRequest {
        LrsRequest::new(self.method(), resource)
    }
}

fn activity_id(activity: &Activity) -> LrsResult<String> {
    activity
        .id
        .clone()
        .ok_or_else(|| LrsError::InvalidInput("activity has no id".to_string()))
}

fn read_document(id: &str, response: HttpResponse) -> Document {
    if response.status == 404 {
        tracing::debug!(document = id, "no stored document, returning empty");
        return Document::empty(id);
    }
    let content_type = response.content_type().map(str::to_string);
    let etag = response.etag().map(str::to_string);
    let updated = response.header("Last-Modified").map(str::to_string);
    let declared_json = !response.body.is_empty() && is_json_content_type(content_type.as_deref());
    let contents = DocumentContents::from_body(response.body, content_type.as_deref());
    if declared_json && contents.as_json().is_none() {
        tracing::warn!(document = id, "document declared JSON but did not parse, keeping raw text");
    }
    Document {
        id: id.to_string(),
        contents,
        content_type,
        etag,
        updated,
    }
}

fn read_ids(response: &HttpResponse) -> LrsResult<Vec<String>> {
    if response.status == 404 {
        return Ok(Vec::new());
    }
    let document = parse_json(&response.body)?;
    serde_json::from_value(document).map_err(|err| LrsError::Parse(format!("document ids: {err}")))
}

impl<T> Lrs<T>
where
    T: HttpTransport,
{
    fn state_request(
        &self,
        method: Method,
        activity: &Activity,
        agent: &Actor,
        registration: Option<&str>,
    ) -> LrsResult<LrsRequest> {
        let mut request = LrsRequest::new(method, "activities/state")
            .param("activityId", activity_id(activity)?)
            .params([self.agent_param(agent)?]);
        if let Some(registration) = self.registration_param(registration) {
            request = request.params([registration]);
        }
        Ok(request)
    }

    fn agent_profile_resource(&self) -> &'static str {
        if self.version().is_legacy() {
            "actors/profile"
        } else {
            "agents/profile"
        }
    }

    /// A missing document yields an empty one.
    pub async fn retrieve_state(
        &self,
        key: &str,
        activity: &Activity,
        agent: &Actor,
        registration: Option<&str>,
    ) -> LrsResult<State> {
        let request = self
            .state_request(Method::Get, activity, agent, registration)?
            .param("stateId", key)
            .ignore_404();
        let response = self.send(request).await?;
        Ok(State {
            document: read_document(key, response),
            activity: activity.clone(),
            agent: agent.clone(),
            registration: registration.map(str::to_string),
        })
    }

    pub async fn retrieve_state_ids(
        &self,
        activity: &Activity,
        agent: &Actor,
        registration: Option<&str>,
        since: Option<&str>,
    ) -> LrsResult<Vec<String>> {
        let mut request = self
            .state_request(Method::Get, activity, agent, registration)?
            .ignore_404();
        if let Some(since) = since {
            request = request.param("since", since);
        }
        read_ids(&self.send(request).await?)
    }

    /// State writes are conditional only when an ETag is given.
    pub async fn save_state(
        &self,
        key: &str,
        contents: &DocumentContents,
        activity: &Activity,
        agent: &Actor,
        registration: Option<&str>,
        options: &SaveOptions,
    ) -> LrsResult<HttpResponse> {
        let mut request = self
            .state_request(options.method(), activity, agent, registration)?
            .param("stateId", key)
            .body(options.content_type(), contents.to_bytes());
        if let Some(etag) = &options.etag {
            request = request.header("If-Match", etag.clone());
        }
        self.send(request).await
    }

    /// Without a key every state document for the activity and agent is
    /// cleared.
    pub async fn drop_state(
        &self,
        key: Option<&str>,
        activity: &Activity,
        agent: &Actor,
        registration: Option<&str>,
    ) -> LrsResult<HttpResponse> {
        let mut request = self.state_request(Method::Delete, activity, agent, registration)?;
        if let Some(key) = key {
            request = request.param("stateId", key);
        }
        self.send(request).await
    }

    pub async fn retrieve_activity_profile(
        &self,
        key: &str,
        activity: &Activity,
    ) -> LrsResult<ActivityProfile> {
        let request = LrsRequest::get("activities/profile")
            .param("profileId", key)
            .param("activityId", activity_id(activity)?)
            .ignore_404();
        let response = self.send(request).await?;
        Ok(ActivityProfile {
            document: read_document(key, response),
            activity: activity.clone(),
        })
    }

    pub async fn retrieve_activity_profile_ids(
        &self,
        activity: &Activity,
        since: Option<&str>,
    ) -> LrsResult<Vec<String>> {
        let mut request = LrsRequest::get("activities/profile")
            .param("activityId", activity_id(activity)?)
            .ignore_404();
        if let Some(since) = since {
            request = request.param("since", since);
        }
        read_ids(&self.send(request).await?)
    }

    /// Without an ETag the write only creates (`If-None-Match: *`).
    pub async fn save_activity_profile(
        &self,
        key: &str,
        contents: &DocumentContents,
        activity: &Activity,
        options: &SaveOptions,
    ) -> LrsResult<HttpResponse> {
        let request = options
            .request("activities/profile")
            .param("profileId", key)
            .param("activityId", activity_id(activity)?)
            .body(options.content_type(), contents.to_bytes());
        self.send(conditional(request, options)).await
    }

    pub async fn drop_activity_profile(&self, key: &str, activity: &Activity) -> LrsResult<HttpResponse> {
        let request = LrsRequest::new(Method::Delete, "activities/profile")
            .param("profileId", key)
            .param("activityId", activity_id(activity)?);
        self.send(request).await
    }

    pub async fn retrieve_agent_profile(&self, key: &str, agent: &Actor) -> LrsResult<AgentProfile> {
        let request = LrsRequest::get(self.agent_profile_resource())
            .param("profileId", key)
            .params([self.agent_param(agent)?])
            .ignore_404();
        let response = self.send(request).await?;
        Ok(AgentProfile {
            document: read_document(key, response),
            agent: agent.clone(),
        })
    }

    pub async fn retrieve_agent_profile_ids(
        &self,
        agent: &Actor,
        since: Option<&str>,
    ) -> LrsResult<Vec<String>> {
        let mut request = LrsRequest::get(self.agent_profile_resource())
            .params([self.agent_param(agent)?])
            .ignore_404();
        if let Some(since) = since {
            request = request.param("since", since);
        }
        read_ids(&self.send(request).await?)
    }

    /// Without an ETag the write only creates (`If-None-Match: *`).
    pub async fn save_agent_profile(
        &self,
        key: &str,
        contents: &DocumentContents,
        agent: &Actor,
        options: &SaveOptions,
    ) -> LrsResult<HttpResponse> {
        let request = options
            .request(self.agent_profile_resource())
            .param("profileId", key)
            .params([self.agent_param(agent)?])
            .body(options.content_type(), contents.to_bytes());
        self.send(conditional(request, options)).await
    }

    pub async fn drop_agent_profile(&self, key: &str, agent: &Actor) -> LrsResult<HttpResponse> {
        let request = LrsRequest::new(Method::Delete, self.agent_profile_resource())
            .param("profileId", key)
            .params([self.agent_param(agent)?]);
        self.send(request).await
    }
}

fn conditional(request: LrsRequest, options: &SaveOptions) -> LrsRequest {
    match &options.etag {
        Some(etag) => request.header("If-Match", etag.clone()),
        None => request.header("If-None-Match", "*"),
    }
}

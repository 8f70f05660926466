use url::Url;

use crate::config::StoreSettings;
use crate::error::{LrsError, LrsResult};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Method};

pub const VERSION_HEADER: &str = "X-Experience-API-Version";

/// A call against a store, before auth, version and extended parameters are
/// applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LrsRequest {
    pub method: Method,
    /// Path relative to the endpoint, or an absolute URL.
    pub resource: String,
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    /// Answer a `404` with the response instead of an error.
    pub ignore_404: bool,
}

impl LrsRequest {
    pub fn new(method: Method, resource: impl Into<String>) -> Self {
        Self {
            method,
            resource: resource.into(),
            params: Vec::new(),
            headers: Vec::new(),
            body: None,
            ignore_404: false,
        }
    }

    pub fn get(resource: impl Into<String>) -> Self {
        Self::new(Method::Get, resource)
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn params(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, content_type: impl Into<String>, body: Vec<u8>) -> Self {
        self.headers.push(("Content-Type".to_string(), content_type.into()));
        self.body = Some(body);
        self
    }

    pub fn ignore_404(mut self) -> Self {
        self.ignore_404 = true;
        self
    }
}

/// Sends requests to one store, applying its settings uniformly.
#[derive(Clone, Debug)]
pub struct Dispatcher<T> {
    transport: T,
    settings: StoreSettings,
}

impl<T> Dispatcher<T> {
    pub fn new(transport: T, settings: StoreSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn url(&self, request: &LrsRequest) -> LrsResult<Url> {
        let resource = request.resource.as_str();
        let mut url = if resource.starts_with("http://") || resource.starts_with("https://") {
            Url::parse(resource)
                .map_err(|err| LrsError::InvalidInput(format!("invalid url {resource}: {err}")))?
        } else {
            self.settings
                .endpoint
                .join(resource.trim_start_matches('/'))
                .map_err(|err| LrsError::InvalidInput(format!("invalid resource {resource}: {err}")))?
        };

        let mut names: Vec<String> = url.query_pairs().map(|(name, _)| name.into_owned()).collect();
        names.extend(request.params.iter().map(|(name, _)| name.clone()));
        let extended = self
            .settings
            .extended
            .iter()
            .filter(|(name, _)| !names.contains(name));

        let mut pairs: Vec<(&str, &str)> = request
            .params
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        pairs.extend(extended.map(|(name, value)| (name.as_str(), value.as_str())));
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    fn headers(&self, request: &LrsRequest) -> Vec<(String, String)> {
        let mut headers = request.headers.clone();
        if let Some(auth) = &self.settings.auth {
            headers.push(("Authorization".to_string(), auth.clone()));
        }
        if let Some(version) = self.settings.version.header_value() {
            headers.push((VERSION_HEADER.to_string(), version.to_string()));
        }
        headers
    }
}

impl<T> Dispatcher<T>
where
    T: HttpTransport,
{
    /// Complete one exchange. Any non-2xx status is an error, except a `404`
    /// on a request marked [`LrsRequest::ignore_404`].
    pub async fn send(&self, request: LrsRequest) -> LrsResult<HttpResponse> {
        let url = self.url(&request)?;
        let headers = self.headers(&request);
        tracing::debug!(
            method = request.method.as_str(),
            url = %url,
            version = %self.settings.version,
            "dispatching store request"
        );

        let response = self
            .transport
            .send(HttpRequest {
                method: request.method,
                url,
                headers,
                body: request.body,
            })
            .await?;

        if response.is_success() || (request.ignore_404 && response.status == 404) {
            return Ok(response);
        }
        tracing::debug!(status = response.status, "store request failed");
        Err(map_http_status(response))
    }
}

fn map_http_status(response: HttpResponse) -> LrsError {
    let body = response.text();
    LrsError::Http {
        status: response.status,
        reason: response.reason,
        body,
    }
}

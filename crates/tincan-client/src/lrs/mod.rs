//! A single remote store and every resource operation it supports.

mod documents;
mod statements;

use url::Url;

use tincan_model::{Actor, ModelError, Version, WireEntity};

use crate::config::{LrsConfig, StoreSettings};
use crate::dispatcher::{Dispatcher, LrsRequest};
use crate::error::{LrsError, LrsResult};
use crate::transport::{HttpResponse, HttpTransport, ReqwestTransport};

pub use documents::SaveOptions;
pub use statements::{StatementWrite, resolve_more_url};

/// Connection to one learning record store.
#[derive(Clone, Debug)]
pub struct Lrs<T = ReqwestTransport> {
    dispatcher: Dispatcher<T>,
}

impl<T> Lrs<T> {
    pub fn new(config: &LrsConfig, transport: T) -> LrsResult<Self> {
        let settings = config.resolve()?;
        tracing::debug!(
            endpoint = %settings.endpoint,
            version = %settings.version,
            "configured store"
        );
        Ok(Self {
            dispatcher: Dispatcher::new(transport, settings),
        })
    }

    pub fn settings(&self) -> &StoreSettings {
        self.dispatcher.settings()
    }

    pub fn version(&self) -> Version {
        self.settings().version
    }

    pub fn endpoint(&self) -> &Url {
        &self.settings().endpoint
    }

    pub fn allow_fail(&self) -> bool {
        self.settings().allow_fail
    }

    pub fn transport(&self) -> &T {
        self.dispatcher.transport()
    }

    /// Name and JSON text of an agent-valued parameter.
    fn agent_param(&self, agent: &Actor) -> LrsResult<(String, String)> {
        let name = if self.version().is_legacy() { "actor" } else { "agent" };
        Ok((name.to_string(), agent.as_version(self.version())?.to_string()))
    }

    fn registration_param(&self, registration: Option<&str>) -> Option<(String, String)> {
        let name = if self.version().is_legacy() {
            "registrationId"
        } else {
            "registration"
        };
        registration.map(|registration| (name.to_string(), registration.to_string()))
    }

    /// Apply the tolerance policy to an entity that cannot be rendered for
    /// this store.
    fn tolerate(&self, err: ModelError) -> LrsResult<StatementWrite> {
        if self.allow_fail() {
            tracing::warn!(
                version = %self.version(),
                error = %err,
                "statement not representable for store version, skipped"
            );
            return Ok(StatementWrite::Skipped {
                reason: err.to_string(),
            });
        }
        Err(LrsError::Serialization(err))
    }
}

impl Lrs<ReqwestTransport> {
    pub fn connect(config: &LrsConfig) -> LrsResult<Self> {
        Self::new(config, ReqwestTransport::new())
    }

    pub fn connect_from_env() -> LrsResult<Self> {
        Self::connect(&LrsConfig::from_env())
    }
}

impl<T> Lrs<T>
where
    T: HttpTransport,
{
    async fn send(&self, request: LrsRequest) -> LrsResult<HttpResponse> {
        self.dispatcher.send(request).await
    }
}

fn parse_json(body: &[u8]) -> LrsResult<serde_json::Value> {
    serde_json::from_slice(body).map_err(|err| LrsError::Parse(format!("invalid json body: {err}")))
}

//! Defaults and store settings carried on a launch URL's query string.

use std::collections::BTreeMap;

use url::Url;

use tincan_model::{Activity, Actor, Context, ContextActivities, Version, WireEntity};

use crate::config::LrsConfig;
use crate::error::{LrsError, LrsResult};

/// Keys never forwarded to the store as extended parameters.
pub const RESERVED_PARAMETERS: &[&str] = &[
    "statementId",
    "voidedStatementId",
    "verb",
    "object",
    "registration",
    "context",
    "actor",
    "since",
    "until",
    "limit",
    "authoritative",
    "sparse",
    "instructor",
    "ascending",
    "continueToken",
    "agent",
    "activityId",
    "stateId",
    "profileId",
    "activity_platform",
    "grouping",
    "Accept-Language",
];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LaunchParameters {
    pub actor: Option<Actor>,
    pub activity: Option<Activity>,
    pub registration: Option<String>,
    pub context: Option<Context>,
    /// Present when the launch names an endpoint.
    pub store: Option<LrsConfig>,
}

impl LaunchParameters {
    pub fn from_url(url: &str) -> LrsResult<Self> {
        let url = Url::parse(url)
            .map_err(|err| LrsError::InvalidInput(format!("invalid launch url {url}: {err}")))?;
        Ok(Self::from_pairs(url.query_pairs().into_owned()))
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut params: BTreeMap<String, String> = pairs.into_iter().collect();
        let mut launch = Self::default();

        if let Some(actor) = params.remove("actor") {
            match Actor::from_json_str(&actor, Version::LATEST) {
                Ok(actor) => launch.actor = Some(actor),
                Err(err) => tracing::warn!(error = %err, "ignoring unparseable launch actor"),
            }
        }
        if let Some(activity_id) = params.remove("activity_id") {
            launch.activity = Some(Activity::new(activity_id));
        }

        let platform = params.remove("activity_platform");
        let registration = params.remove("registration");
        let grouping = params.remove("grouping");
        if platform.is_some() || registration.is_some() || grouping.is_some() {
            launch.registration = registration.clone();
            launch.context = Some(Context {
                platform,
                registration,
                context_activities: grouping.map(|grouping| ContextActivities {
                    grouping: vec![Activity::new(grouping)],
                    ..ContextActivities::default()
                }),
                ..Context::default()
            });
        }

        if let Some(endpoint) = params.remove("endpoint") {
            let mut config = LrsConfig::new(endpoint).with_allow_fail(false);
            config.auth = params.remove("auth");
            config.extended = params
                .into_iter()
                .filter(|(key, _)| !RESERVED_PARAMETERS.contains(&key.as_str()))
                .collect();
            launch.store = Some(config);
        }
        launch
    }
}

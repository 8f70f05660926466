//! Facade over any number of stores with default actor, activity,
//! registration and context.

use futures::future::join_all;
use url::Url;

use tincan_model::{
    Activity, ActivityProfile, Actor, AgentProfile, Context, ContextActivities, DocumentContents,
    State, Statement, StatementRef, StatementsResult, VOIDED_VERB, Verb, VersionFamily,
};

use crate::error::{LrsError, LrsResult};
use crate::launch::LaunchParameters;
use crate::lrs::{Lrs, SaveOptions, StatementWrite};
use crate::query::StatementQuery;
use crate::transport::{HttpResponse, HttpTransport, ReqwestTransport};

/// What one store made of a write.
#[derive(Debug)]
pub struct StoreOutcome {
    pub endpoint: Url,
    pub result: LrsResult<StatementWrite>,
}

impl StoreOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Activity, agent and registration a state call applies to. Unset fields
/// fall back to the facade defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateScope {
    pub activity: Option<Activity>,
    pub agent: Option<Actor>,
    pub registration: Option<String>,
}

#[derive(Debug)]
pub struct TinCan<T = ReqwestTransport> {
    stores: Vec<Lrs<T>>,
    pub actor: Option<Actor>,
    pub activity: Option<Activity>,
    pub registration: Option<String>,
    pub context: Option<Context>,
}

impl<T> Default for TinCan<T> {
    fn default() -> Self {
        Self {
            stores: Vec::new(),
            actor: None,
            activity: None,
            registration: None,
            context: None,
        }
    }
}

impl<T> TinCan<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults and, when the launch names an endpoint, a store built over
    /// `transport`.
    pub fn from_launch(launch: LaunchParameters, transport: T) -> LrsResult<Self> {
        let mut tincan = Self {
            stores: Vec::new(),
            actor: launch.actor,
            activity: launch.activity,
            registration: launch.registration,
            context: launch.context,
        };
        if let Some(config) = launch.store {
            tracing::debug!(endpoint = ?config.endpoint, "adding store from launch parameters");
            tincan.add_store(Lrs::new(&config, transport)?);
        }
        Ok(tincan)
    }

    pub fn add_store(&mut self, lrs: Lrs<T>) {
        self.stores.push(lrs);
    }

    pub fn with_store(mut self, lrs: Lrs<T>) -> Self {
        self.add_store(lrs);
        self
    }

    pub fn with_actor(mut self, actor: impl Into<Actor>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_activity(mut self, activity: Activity) -> Self {
        self.activity = Some(activity);
        self
    }

    pub fn with_registration(mut self, registration: impl Into<String>) -> Self {
        self.registration = Some(registration.into());
        self
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    pub fn stores(&self) -> &[Lrs<T>] {
        &self.stores
    }

    /// Fill what the statement leaves unset from the facade defaults.
    pub fn prepare_statement(&self, mut statement: Statement) -> Statement {
        if statement.actor.is_none() {
            statement.actor = self.actor.clone();
        }
        if statement.object.is_none() {
            statement.object = self.activity.clone().map(Into::into);
        }
        let Some(defaults) = &self.context else {
            return statement;
        };
        let Some(context) = statement.context.as_mut() else {
            statement.context = Some(defaults.clone());
            return statement;
        };

        if context.registration.is_none() {
            context.registration = defaults.registration.clone();
        }
        if context.platform.is_none() {
            context.platform = defaults.platform.clone();
        }
        if let Some(default_activities) = &defaults.context_activities {
            match context.context_activities.as_mut() {
                None => context.context_activities = Some(default_activities.clone()),
                Some(activities) => fill_context_activities(activities, default_activities),
            }
        }
        statement
    }

    fn first_store(&self, operation: &str) -> Option<&Lrs<T>> {
        let store = self.stores.first();
        if store.is_none() {
            tracing::warn!(operation, "no stores configured");
        }
        store
    }

    fn state_scope(&self, scope: StateScope) -> LrsResult<(Activity, Actor, Option<String>)> {
        let activity = self.default_activity(scope.activity)?;
        let agent = self.default_agent(scope.agent)?;
        Ok((activity, agent, scope.registration.or_else(|| self.registration.clone())))
    }

    fn default_activity(&self, activity: Option<Activity>) -> LrsResult<Activity> {
        activity
            .or_else(|| self.activity.clone())
            .ok_or_else(|| LrsError::InvalidInput("no activity given or configured".to_string()))
    }

    fn default_agent(&self, agent: Option<Actor>) -> LrsResult<Actor> {
        agent
            .or_else(|| self.actor.clone())
            .ok_or_else(|| LrsError::InvalidInput("no agent given or configured".to_string()))
    }
}

fn fill_context_activities(target: &mut ContextActivities, defaults: &ContextActivities) {
    if target.grouping.is_empty() {
        target.grouping = defaults.grouping.clone();
    }
    if target.parent.is_empty() {
        target.parent = defaults.parent.clone();
    }
    if target.other.is_empty() {
        target.other = defaults.other.clone();
    }
}

impl<T> TinCan<T>
where
    T: HttpTransport,
{
    async fn fan_out<'a, F, Fut>(&'a self, write: F) -> Vec<StoreOutcome>
    where
        F: Fn(&'a Lrs<T>) -> Fut,
        Fut: std::future::Future<Output = LrsResult<StatementWrite>>,
    {
        if self.stores.is_empty() {
            tracing::warn!("no stores configured, nothing sent");
            return Vec::new();
        }
        let writes = self.stores.iter().map(|lrs| {
            let pending = write(lrs);
            async move {
                StoreOutcome {
                    endpoint: lrs.endpoint().clone(),
                    result: pending.await,
                }
            }
        });
        join_all(writes).await
    }

    /// Send to every store concurrently. One outcome per store, in store
    /// order.
    pub async fn send_statement(&self, statement: Statement) -> (Statement, Vec<StoreOutcome>) {
        let statement = self.prepare_statement(statement);
        let outcomes = self.fan_out(|lrs| lrs.save_statement(&statement)).await;
        (statement, outcomes)
    }

    pub async fn send_statements(
        &self,
        statements: Vec<Statement>,
    ) -> (Vec<Statement>, Vec<StoreOutcome>) {
        if statements.is_empty() {
            return (statements, Vec::new());
        }
        let statements: Vec<Statement> = statements
            .into_iter()
            .map(|statement| self.prepare_statement(statement))
            .collect();
        let outcomes = self.fan_out(|lrs| lrs.save_statements(&statements)).await;
        (statements, outcomes)
    }

    /// Void `id` on every store, as `actor` or the facade actor.
    pub async fn void_statement(
        &self,
        id: &str,
        actor: Option<Actor>,
    ) -> LrsResult<(Statement, Vec<StoreOutcome>)> {
        let actor = actor.or_else(|| self.actor.clone()).ok_or_else(|| {
            LrsError::InvalidInput("no actor specified, cannot void statement".to_string())
        })?;
        let verb = Verb::with_display(VOIDED_VERB, None);
        let voiding = Statement::new(actor, verb, StatementRef::new(id));
        let outcomes = self.fan_out(|lrs| lrs.save_statement(&voiding)).await;
        Ok((voiding, outcomes))
    }

    pub async fn get_statement(&self, id: &str, attachments: bool) -> LrsResult<Option<Statement>> {
        match self.first_store("get_statement") {
            Some(lrs) => lrs.retrieve_statement(id, attachments).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn get_voided_statement(&self, id: &str) -> LrsResult<Option<Statement>> {
        match self.first_store("get_voided_statement") {
            Some(lrs) => lrs.retrieve_voided_statement(id, false).await.map(Some),
            None => Ok(None),
        }
    }

    /// Query the first store, optionally filtering by the facade actor and
    /// activity. The facade registration applies unless the query names one.
    pub async fn get_statements(
        &self,
        mut query: StatementQuery,
        send_actor: bool,
        send_activity: bool,
    ) -> LrsResult<Option<StatementsResult>> {
        let Some(lrs) = self.first_store("get_statements") else {
            return Ok(None);
        };
        let pre_1_0 = lrs.version().family() == VersionFamily::Pre1;
        if let (true, Some(actor)) = (send_actor, &self.actor) {
            query.set(if pre_1_0 { "actor" } else { "agent" }, actor.clone());
        }
        if let (true, Some(activity)) = (send_activity, &self.activity) {
            query.set(if pre_1_0 { "target" } else { "activity" }, activity.clone());
        }
        if let (false, Some(registration)) = (query.contains("registration"), &self.registration) {
            query.set("registration", registration.clone());
        }
        lrs.query_statements(&query).await.map(Some)
    }

    pub async fn get_state(&self, key: &str, scope: StateScope) -> LrsResult<Option<State>> {
        let Some(lrs) = self.first_store("get_state") else {
            return Ok(None);
        };
        let (activity, agent, registration) = self.state_scope(scope)?;
        lrs.retrieve_state(key, &activity, &agent, registration.as_deref())
            .await
            .map(Some)
    }

    pub async fn set_state(
        &self,
        key: &str,
        contents: &DocumentContents,
        scope: StateScope,
        options: &SaveOptions,
    ) -> LrsResult<Option<HttpResponse>> {
        let Some(lrs) = self.first_store("set_state") else {
            return Ok(None);
        };
        let (activity, agent, registration) = self.state_scope(scope)?;
        lrs.save_state(key, contents, &activity, &agent, registration.as_deref(), options)
            .await
            .map(Some)
    }

    pub async fn delete_state(
        &self,
        key: Option<&str>,
        scope: StateScope,
    ) -> LrsResult<Option<HttpResponse>> {
        let Some(lrs) = self.first_store("delete_state") else {
            return Ok(None);
        };
        let (activity, agent, registration) = self.state_scope(scope)?;
        lrs.drop_state(key, &activity, &agent, registration.as_deref())
            .await
            .map(Some)
    }

    pub async fn get_activity_profile(
        &self,
        key: &str,
        activity: Option<Activity>,
    ) -> LrsResult<Option<ActivityProfile>> {
        let Some(lrs) = self.first_store("get_activity_profile") else {
            return Ok(None);
        };
        let activity = self.default_activity(activity)?;
        lrs.retrieve_activity_profile(key, &activity).await.map(Some)
    }

    pub async fn set_activity_profile(
        &self,
        key: &str,
        contents: &DocumentContents,
        activity: Option<Activity>,
        options: &SaveOptions,
    ) -> LrsResult<Option<HttpResponse>> {
        let Some(lrs) = self.first_store("set_activity_profile") else {
            return Ok(None);
        };
        let activity = self.default_activity(activity)?;
        lrs.save_activity_profile(key, contents, &activity, options)
            .await
            .map(Some)
    }

    pub async fn delete_activity_profile(
        &self,
        key: &str,
        activity: Option<Activity>,
    ) -> LrsResult<Option<HttpResponse>> {
        let Some(lrs) = self.first_store("delete_activity_profile") else {
            return Ok(None);
        };
        let activity = self.default_activity(activity)?;
        lrs.drop_activity_profile(key, &activity).await.map(Some)
    }

    pub async fn get_agent_profile(
        &self,
        key: &str,
        agent: Option<Actor>,
    ) -> LrsResult<Option<AgentProfile>> {
        let Some(lrs) = self.first_store("get_agent_profile") else {
            return Ok(None);
        };
        let agent = self.default_agent(agent)?;
        lrs.retrieve_agent_profile(key, &agent).await.map(Some)
    }

    pub async fn set_agent_profile(
        &self,
        key: &str,
        contents: &DocumentContents,
        agent: Option<Actor>,
        options: &SaveOptions,
    ) -> LrsResult<Option<HttpResponse>> {
        let Some(lrs) = self.first_store("set_agent_profile") else {
            return Ok(None);
        };
        let agent = self.default_agent(agent)?;
        lrs.save_agent_profile(key, contents, &agent, options)
            .await
            .map(Some)
    }

    pub async fn delete_agent_profile(
        &self,
        key: &str,
        agent: Option<Actor>,
    ) -> LrsResult<Option<HttpResponse>> {
        let Some(lrs) = self.first_store("delete_agent_profile") else {
            return Ok(None);
        };
        let agent = self.default_agent(agent)?;
        lrs.drop_agent_profile(key, &agent).await.map(Some)
    }
}

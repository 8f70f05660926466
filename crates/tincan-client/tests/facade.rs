use std::cell::RefCell;

use serde_json::Value;
use tincan_client::{
    HttpResponse, LaunchParameters, Lrs, LrsConfig, LrsError, LrsResult, MockTransport, StateScope,
    StatementQuery, TinCan, deliver,
};
use tincan_model::{Activity, Agent, Statement, Verb};

fn store(endpoint: &str, version: &str) -> (MockTransport, Lrs<MockTransport>) {
    let transport = MockTransport::new();
    let config = LrsConfig::new(endpoint).with_version(version);
    let lrs = Lrs::new(&config, transport.clone()).expect("valid config");
    (transport, lrs)
}

fn body_json(body: &Option<Vec<u8>>) -> Value {
    serde_json::from_slice(body.as_deref().unwrap_or_default()).expect("json body")
}

fn experienced() -> Statement {
    Statement::builder().verb(Verb::new("experienced")).build()
}

#[tokio::test(flavor = "current_thread")]
async fn send_statement_one_store_failing_expected_outcome_per_store() {
    let (first_transport, first) = store("https://primary.example.com/", "1.0.3");
    let (second_transport, second) = store("https://backup.example.com/", "1.0.0");
    first_transport.push_response(HttpResponse::new(500));

    let tincan = TinCan::new()
        .with_store(first)
        .with_store(second)
        .with_actor(Agent::with_mbox("learner@example.com"))
        .with_activity(Activity::new("http://example.com/course"));
    let (statement, outcomes) = tincan.send_statement(experienced()).await;

    assert!(statement.actor.is_some());
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].endpoint.host_str(), Some("primary.example.com"));
    assert_eq!(outcomes[0].result.as_ref().unwrap_err().status(), Some(500));
    assert!(outcomes[1].is_ok());
    assert_eq!(first_transport.requests().len(), 1);
    assert_eq!(second_transport.requests().len(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn send_statements_expected_prepared_batch() {
    let (transport, lrs) = store("https://lrs.example.com/", "1.0.3");
    let tincan = TinCan::new()
        .with_store(lrs)
        .with_actor(Agent::with_mbox("learner@example.com"))
        .with_activity(Activity::new("http://example.com/course"));

    let (statements, outcomes) = tincan.send_statements(vec![experienced(), experienced()]).await;
    assert_eq!(statements.len(), 2);
    assert_eq!(outcomes.len(), 1);
    let sent = body_json(&transport.last_request().unwrap().body);
    assert_eq!(sent[1]["object"]["id"], "http://example.com/course");
}

#[tokio::test(flavor = "current_thread")]
async fn void_statement_expected_statement_ref_object() {
    let (transport, lrs) = store("https://lrs.example.com/", "1.0.3");
    let tincan = TinCan::new()
        .with_store(lrs)
        .with_actor(Agent::with_mbox("learner@example.com"));

    let (voiding, outcomes) = tincan.void_statement("stmt-1", None).await.unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(voiding.id.is_some());
    let sent = body_json(&transport.last_request().unwrap().body);
    assert_eq!(sent["verb"]["id"], "http://adlnet.gov/expapi/verbs/voided");
    assert_eq!(sent["verb"]["display"]["und"], "voided");
    assert_eq!(sent["object"]["objectType"], "StatementRef");
    assert_eq!(sent["object"]["id"], "stmt-1");
}

#[tokio::test(flavor = "current_thread")]
async fn void_statement_without_actor_expected_input_error() {
    let (transport, lrs) = store("https://lrs.example.com/", "1.0.3");
    let tincan = TinCan::new().with_store(lrs);
    let error = tincan.void_statement("stmt-1", None).await.unwrap_err();
    assert!(matches!(error, LrsError::InvalidInput(_)));
    assert!(transport.requests().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn get_statements_pre_one_zero_expected_actor_and_target() {
    let (transport, lrs) = store("https://lrs.example.com/", "0.95");
    transport.push_response(HttpResponse::json(200, &serde_json::json!({ "statements": [] })));
    let tincan = TinCan::new()
        .with_store(lrs)
        .with_actor(Agent::with_mbox("learner@example.com"))
        .with_activity(Activity::new("http://example.com/course"))
        .with_registration("reg-1");

    tincan
        .get_statements(StatementQuery::new(), true, true)
        .await
        .unwrap()
        .expect("store configured");
    let sent = transport.last_request().unwrap();
    assert!(sent.query("actor").is_some());
    assert!(sent.query("object").is_some());
    assert_eq!(sent.query("agent"), None);
    assert_eq!(sent.query("registration").as_deref(), Some("reg-1"));
}

#[tokio::test(flavor = "current_thread")]
async fn get_statements_one_zero_expected_agent_and_activity() {
    let (transport, lrs) = store("https://lrs.example.com/", "1.0.3");
    transport.push_response(HttpResponse::json(200, &serde_json::json!({ "statements": [] })));
    let tincan = TinCan::new()
        .with_store(lrs)
        .with_actor(Agent::with_mbox("learner@example.com"))
        .with_activity(Activity::new("http://example.com/course"));

    tincan.get_statements(StatementQuery::new(), true, true).await.unwrap();
    let sent = transport.last_request().unwrap();
    assert!(sent.query("agent").is_some());
    assert_eq!(sent.query("activity").as_deref(), Some("http://example.com/course"));
}

#[tokio::test(flavor = "current_thread")]
async fn no_stores_expected_empty_outcomes_and_none_reads() {
    let tincan: TinCan<MockTransport> = TinCan::new().with_actor(Agent::with_mbox("learner@example.com"));
    let (_, outcomes) = tincan.send_statement(experienced()).await;
    assert!(outcomes.is_empty());
    assert!(tincan.get_statement("stmt-1", false).await.unwrap().is_none());
    assert!(tincan.get_state("bookmark", StateScope::default()).await.unwrap().is_none());
}

#[tokio::test(flavor = "current_thread")]
async fn get_state_expected_facade_defaults_used() {
    let (transport, lrs) = store("https://lrs.example.com/", "1.0.3");
    transport.push_response(HttpResponse::new(404));
    let tincan = TinCan::new()
        .with_store(lrs)
        .with_actor(Agent::with_mbox("learner@example.com"))
        .with_activity(Activity::new("http://example.com/course"))
        .with_registration("reg-1");

    let state = tincan
        .get_state("bookmark", StateScope::default())
        .await
        .unwrap()
        .expect("store configured");
    assert!(state.document.is_empty());
    let sent = transport.last_request().unwrap();
    assert_eq!(sent.query("activityId").as_deref(), Some("http://example.com/course"));
    assert_eq!(sent.query("registration").as_deref(), Some("reg-1"));
}

#[tokio::test(flavor = "current_thread")]
async fn launch_url_expected_defaults_and_store() {
    let url = "https://content.example.com/index.html?endpoint=https%3A%2F%2Flrs.example.com%2Fxapi%2F\
        &auth=Basic%20abc&actor=%7B%22mbox%22%3A%22mailto%3Alearner%40example.com%22%7D\
        &activity_id=http%3A%2F%2Fexample.com%2Fcourse&registration=reg-1\
        &grouping=http%3A%2F%2Fexample.com%2Fprogram&activity_platform=web&tenant=acme&stateId=skip";
    let launch = LaunchParameters::from_url(url).unwrap();

    let config = launch.store.clone().expect("endpoint present");
    assert_eq!(config.auth.as_deref(), Some("Basic abc"));
    assert!(!config.allow_fail);
    assert_eq!(config.extended.get("tenant").map(String::as_str), Some("acme"));
    assert!(!config.extended.contains_key("stateId"));

    let transport = MockTransport::new();
    let tincan = TinCan::from_launch(launch, transport.clone()).unwrap();
    assert_eq!(tincan.stores().len(), 1);
    assert_eq!(tincan.registration.as_deref(), Some("reg-1"));

    let (statement, _) = tincan.send_statement(experienced()).await;
    let context = statement.context.expect("launch context applied");
    assert_eq!(context.platform.as_deref(), Some("web"));
    let grouping = context.context_activities.expect("grouping").grouping;
    assert_eq!(grouping[0].id.as_deref(), Some("http://example.com/program"));

    let sent = transport.last_request().unwrap();
    assert_eq!(sent.header("Authorization"), Some("Basic abc"));
    assert_eq!(sent.query("tenant").as_deref(), Some("acme"));
}

async fn exercise_callback_delivery(lrs: &Lrs<MockTransport>) -> LrsResult<()> {
    let seen = RefCell::new(None);
    let returned = deliver(
        lrs.retrieve_activity_profile_ids(&Activity::new("http://example.com/course"), None),
        Some(|outcome: LrsResult<Vec<String>>| {
            *seen.borrow_mut() = Some(outcome.map(|ids| ids.len()));
        }),
    )
    .await?;
    assert!(returned.is_none());
    assert_eq!(seen.borrow().as_ref().map(|outcome| outcome.is_err()), Some(true));
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn callback_delivery_expected_error_not_raised() {
    let (transport, lrs) = store("https://lrs.example.com/", "1.0.3");
    transport.push_response(HttpResponse::new(500));
    exercise_callback_delivery(&lrs).await.unwrap();
}

#[tokio::test(flavor = "current_thread")]
async fn value_delivery_expected_error_raised() {
    let (transport, lrs) = store("https://lrs.example.com/", "1.0.3");
    transport.push_response(HttpResponse::new(500));
    let outcome = deliver(
        lrs.retrieve_activity_profile_ids(&Activity::new("http://example.com/course"), None),
        None::<fn(LrsResult<Vec<String>>)>,
    )
    .await;
    assert_eq!(outcome.unwrap_err().status(), Some(500));
}

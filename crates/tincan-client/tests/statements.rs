use serde_json::{Value, json};
use tincan_client::{
    LrsConfig, LrsError, LrsResult, HttpResponse, Lrs, Method, MockTransport, StatementQuery,
    StatementWrite, VERSION_HEADER, multipart,
};
use tincan_model::{
    Activity, Agent, Attachment, Statement, Verb, Version, WireEntity, content_digest,
};

fn store(config: LrsConfig) -> (MockTransport, Lrs<MockTransport>) {
    let transport = MockTransport::new();
    let lrs = Lrs::new(&config, transport.clone()).expect("valid config");
    (transport, lrs)
}

fn completed() -> Statement {
    Statement::new(
        Agent::with_mbox("learner@example.com"),
        Verb::new("completed"),
        Activity::new("http://example.com/course"),
    )
}

fn body_json(body: &Option<Vec<u8>>) -> Value {
    serde_json::from_slice(body.as_deref().unwrap_or_default()).expect("json body")
}

async fn exercise_save_and_retrieve(lrs: &Lrs<MockTransport>, transport: &MockTransport) -> LrsResult<()> {
    let statement = completed();
    let id = statement.id.clone().unwrap_or_default();
    let write = lrs.save_statement(&statement).await?;
    assert!(matches!(write, StatementWrite::Sent(_)));

    let sent = transport.last_request().expect("request recorded");
    assert_eq!(sent.method, Method::Put);
    assert_eq!(sent.query("statementId").as_deref(), Some(id.as_str()));
    assert_eq!(sent.header("Content-Type"), Some("application/json"));
    assert_eq!(body_json(&sent.body)["verb"]["id"], "http://adlnet.gov/expapi/verbs/completed");

    transport.push_response(HttpResponse::json(200, &statement.as_version(lrs.version())?));
    let fetched = lrs.retrieve_statement(&id, false).await?;
    assert_eq!(fetched.id, statement.id);
    assert_eq!(fetched.verb, statement.verb);
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn save_then_retrieve_statement_expected_put_by_id() {
    let (transport, lrs) = store(LrsConfig::new("https://lrs.example.com/xapi"));
    exercise_save_and_retrieve(&lrs, &transport).await.unwrap();
}

#[tokio::test(flavor = "current_thread")]
async fn save_statement_without_id_expected_post() {
    let (transport, lrs) = store(LrsConfig::new("https://lrs.example.com/"));
    let statement = Statement::builder()
        .actor(Agent::with_mbox("learner@example.com"))
        .verb(Verb::new("attempted"))
        .object(Activity::new("http://example.com/quiz"))
        .without_stamp()
        .build();
    lrs.save_statement(&statement).await.unwrap();

    let sent = transport.last_request().unwrap();
    assert_eq!(sent.method, Method::Post);
    assert_eq!(sent.query("statementId"), None);
}

#[tokio::test(flavor = "current_thread")]
async fn save_statement_with_content_expected_multipart_body() {
    let (transport, lrs) = store(LrsConfig::new("https://lrs.example.com/"));
    let mut statement = completed();
    statement
        .attachments
        .push(Attachment::new("http://example.com/usage/certificate", "text/plain").with_content("certified"));
    lrs.save_statement(&statement).await.unwrap();

    let sent = transport.last_request().unwrap();
    let content_type = sent.header("Content-Type").unwrap().to_string();
    let boundary = multipart::boundary_of(&content_type).expect("multipart content type");
    let decoded = multipart::decode(boundary, sent.body.as_deref().unwrap()).unwrap();
    assert_eq!(decoded.attachments.len(), 1);
    let digest = statement.attachments[0].sha2.clone().unwrap();
    assert_eq!(decoded.content(&digest), Some(&b"certified"[..]));
    assert!(decoded.document["attachments"][0].get("content").is_none());
}

#[tokio::test(flavor = "current_thread")]
async fn save_statement_cleared_digest_expected_hash_header_from_content() {
    let (transport, lrs) = store(LrsConfig::new("https://lrs.example.com/"));
    let mut attachment = Attachment::new("http://example.com/usage/certificate", "text/plain");
    attachment.set_content("certified");
    attachment.length = None;
    attachment.sha2 = None;
    let mut statement = completed();
    statement.attachments.push(attachment);
    lrs.save_statement(&statement).await.unwrap();

    let sent = transport.last_request().unwrap();
    let content_type = sent.header("Content-Type").unwrap().to_string();
    let boundary = multipart::boundary_of(&content_type).expect("multipart content type");
    let parts = multipart::split(boundary, sent.body.as_deref().unwrap());
    let digest = content_digest(b"certified");
    assert_eq!(parts[1].header(multipart::HASH_HEADER), Some(digest.as_str()));

    let decoded = multipart::decode(boundary, sent.body.as_deref().unwrap()).unwrap();
    assert_eq!(decoded.document["attachments"][0]["sha2"], digest);
    assert_eq!(decoded.document["attachments"][0]["length"], 9);
    assert_eq!(decoded.content(&digest), Some(&b"certified"[..]));
}

#[tokio::test(flavor = "current_thread")]
async fn save_statement_attachments_before_one_zero_expected_skipped_when_tolerated() {
    let (transport, lrs) = store(LrsConfig::new("https://lrs.example.com/").with_version("0.95"));
    let mut statement = completed();
    statement
        .attachments
        .push(Attachment::new("http://example.com/usage", "text/plain").with_content("x"));

    let write = lrs.save_statement(&statement).await.unwrap();
    assert!(write.is_skipped());
    assert!(transport.requests().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn save_statement_attachments_before_one_zero_expected_error_when_strict() {
    let (transport, lrs) = store(
        LrsConfig::new("https://lrs.example.com/")
            .with_version("0.95")
            .with_allow_fail(false),
    );
    let mut statement = completed();
    statement
        .attachments
        .push(Attachment::new("http://example.com/usage", "text/plain").with_content("x"));

    let error = lrs.save_statement(&statement).await.unwrap_err();
    assert!(matches!(error, LrsError::Serialization(_)));
    assert!(transport.requests().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn save_statements_empty_expected_input_error() {
    let (transport, lrs) = store(LrsConfig::new("https://lrs.example.com/"));
    let error = lrs.save_statements(&[]).await.unwrap_err();
    assert!(error.is_configuration());
    assert!(transport.requests().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn save_statements_expected_single_array_post() {
    let (transport, lrs) = store(LrsConfig::new("https://lrs.example.com/"));
    lrs.save_statements(&[completed(), completed()]).await.unwrap();

    let sent = transport.last_request().unwrap();
    assert_eq!(sent.method, Method::Post);
    assert_eq!(body_json(&sent.body).as_array().map(Vec::len), Some(2));
}

#[tokio::test(flavor = "current_thread")]
async fn retrieve_statement_multipart_expected_attachment_content_filled() {
    let (transport, lrs) = store(LrsConfig::new("https://lrs.example.com/"));
    let mut statement = completed();
    let attachment = Attachment::new("http://example.com/usage", "application/pdf").with_content(vec![0_u8, 159, 146, 150]);
    statement.attachments.push(attachment.clone());

    let boundary = multipart::new_boundary();
    let document = statement.as_version(Version::LATEST).unwrap();
    let body = multipart::encode(&boundary, &document, &[&attachment]);
    transport.push_response(
        HttpResponse::new(200)
            .with_header("Content-Type", multipart::content_type(&boundary))
            .with_body(body),
    );

    let fetched = lrs
        .retrieve_statement(statement.id.as_deref().unwrap(), true)
        .await
        .unwrap();
    assert_eq!(transport.last_request().unwrap().query("attachments").as_deref(), Some("true"));
    assert_eq!(fetched.attachments[0].content(), Some(&[0_u8, 159, 146, 150][..]));
}

#[tokio::test(flavor = "current_thread")]
async fn retrieve_voided_statement_expected_parameter_by_version() {
    let (transport, lrs) = store(LrsConfig::new("https://lrs.example.com/"));
    transport.push_response(HttpResponse::json(200, &completed().as_version(Version::LATEST).unwrap()));
    lrs.retrieve_voided_statement("abc", false).await.unwrap();
    assert_eq!(transport.last_request().unwrap().query("voidedStatementId").as_deref(), Some("abc"));

    let (transport, lrs) = store(LrsConfig::new("https://lrs.example.com/").with_version("0.95"));
    transport.push_response(HttpResponse::json(200, &completed().as_version(Version::V0_95).unwrap()));
    lrs.retrieve_voided_statement("abc", false).await.unwrap();
    let sent = transport.last_request().unwrap();
    assert_eq!(sent.query("statementId").as_deref(), Some("abc"));
    assert_eq!(sent.query("voidedStatementId"), None);
}

#[tokio::test(flavor = "current_thread")]
async fn query_statements_unsupported_parameter_expected_error_before_dispatch() {
    let (transport, lrs) = store(LrsConfig::new("https://lrs.example.com/").with_version("0.95"));
    let query = StatementQuery::new().with("agent", Agent::with_mbox("learner@example.com"));

    let error = lrs.query_statements(&query).await.unwrap_err();
    assert!(matches!(
        error,
        LrsError::UnsupportedQueryParameter { ref parameter, .. } if parameter == "agent"
    ));
    assert!(transport.requests().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn query_statements_supported_parameters_expected_rendered() {
    let (transport, lrs) = store(LrsConfig::new("https://lrs.example.com/"));
    transport.push_response(HttpResponse::json(
        200,
        &json!({ "statements": [completed().as_version(Version::LATEST).unwrap()], "more": "" }),
    ));
    let query = StatementQuery::new()
        .with("agent", Agent::with_mbox("learner@example.com"))
        .with("verb", Verb::new("completed"))
        .with("limit", 10_u64);

    let result = lrs.query_statements(&query).await.unwrap();
    assert_eq!(result.statements.len(), 1);
    assert!(!result.has_more());

    let sent = transport.last_request().unwrap();
    assert_eq!(sent.query("verb").as_deref(), Some("http://adlnet.gov/expapi/verbs/completed"));
    assert_eq!(sent.query("limit").as_deref(), Some("10"));
    let agent: Value = serde_json::from_str(&sent.query("agent").unwrap()).unwrap();
    assert_eq!(agent["mbox"], "mailto:learner@example.com");
}

#[tokio::test(flavor = "current_thread")]
async fn query_statements_multipart_page_expected_attachments_filled_per_statement() {
    let (transport, lrs) = store(LrsConfig::new("https://lrs.example.com/"));
    let first_attachment = Attachment::new("urn:usage", "text/plain").with_content("first body");
    let second_attachment =
        Attachment::new("urn:usage", "application/octet-stream").with_content(vec![1_u8, 2, 3]);
    let mut first = completed();
    first.attachments.push(first_attachment.clone());
    let mut second = completed();
    second.attachments.push(second_attachment.clone());

    let boundary = multipart::new_boundary();
    let document = json!({
        "statements": [
            first.as_version(Version::LATEST).unwrap(),
            second.as_version(Version::LATEST).unwrap(),
        ]
    });
    let body = multipart::encode(&boundary, &document, &[&first_attachment, &second_attachment]);
    transport.push_response(
        HttpResponse::new(200)
            .with_header("Content-Type", multipart::content_type(&boundary))
            .with_body(body),
    );

    let page = lrs
        .query_statements(&StatementQuery::new().with("attachments", true))
        .await
        .unwrap();
    assert_eq!(transport.last_request().unwrap().query("attachments").as_deref(), Some("true"));
    assert_eq!(page.statements.len(), 2);
    assert_eq!(page.statements[0].attachments[0].content(), Some(&b"first body"[..]));
    assert_eq!(page.statements[1].attachments[0].content(), Some(&[1_u8, 2, 3][..]));
}

#[tokio::test(flavor = "current_thread")]
async fn query_statements_unreadable_entry_expected_id_only_and_counted() {
    let (transport, lrs) = store(LrsConfig::new("https://lrs.example.com/"));
    transport.push_response(HttpResponse::json(
        200,
        &json!({
            "statements": [
                completed().as_version(Version::LATEST).unwrap(),
                {"id": "broken", "object": {"objectType": "Widget"}}
            ]
        }),
    ));

    let page = lrs.query_statements(&StatementQuery::new()).await.unwrap();
    assert_eq!(page.statements.len(), 2);
    assert_eq!(page.degraded, 1);
    assert_eq!(page.statements[1], Statement::id_only(Some("broken".to_string())));
}

#[tokio::test(flavor = "current_thread")]
async fn more_statements_server_path_expected_rerooted_on_endpoint() {
    let (transport, lrs) = store(LrsConfig::new("https://lrs.example.com/tenant/xapi/"));
    transport.push_response(HttpResponse::json(
        200,
        &json!({ "statements": [], "more": "/statements?more=page-2" }),
    ));
    let first = lrs.query_statements(&StatementQuery::new()).await.unwrap();
    let more = first.more.expect("continuation");

    transport.push_response(HttpResponse::json(200, &json!({ "statements": [] })));
    lrs.more_statements(&more).await.unwrap();
    let sent = transport.last_request().unwrap();
    assert_eq!(sent.url.path(), "/tenant/xapi/statements");
    assert_eq!(sent.query("more").as_deref(), Some("page-2"));
}

#[tokio::test(flavor = "current_thread")]
async fn retrieve_activity_not_found_expected_bare_activity() {
    let (transport, lrs) = store(LrsConfig::new("https://lrs.example.com/"));
    transport.push_response(HttpResponse::new(404));
    let activity = lrs.retrieve_activity("http://example.com/unknown").await.unwrap();
    assert_eq!(activity, Activity::new("http://example.com/unknown"));
}

#[tokio::test(flavor = "current_thread")]
async fn oldest_version_expected_short_verb_and_no_version_header() {
    let (transport, lrs) = store(LrsConfig::new("https://lrs.example.com/").with_version("0.9"));
    lrs.save_statement(&completed()).await.unwrap();

    let sent = transport.last_request().unwrap();
    assert_eq!(sent.header(VERSION_HEADER), None);
    assert_eq!(body_json(&sent.body)["verb"]["id"], "completed");
}

#[tokio::test(flavor = "current_thread")]
async fn about_expected_versions_listed() {
    let (transport, lrs) = store(LrsConfig::new("https://lrs.example.com/"));
    transport.push_response(HttpResponse::json(200, &json!({ "version": ["1.0.3", "1.0.0"] })));
    let about = lrs.about().await.unwrap();
    assert!(about.supports(Version::V1_0_3));
    assert!(!about.supports(Version::V0_95));
}

#[tokio::test(flavor = "current_thread")]
async fn server_error_expected_status_propagated() {
    let (transport, lrs) = store(LrsConfig::new("https://lrs.example.com/"));
    transport.push_response(HttpResponse::new(503).with_body("maintenance"));
    let error = lrs.save_statement(&completed()).await.unwrap_err();
    assert_eq!(error.status(), Some(503));
}

use serde_json::json;
use tincan_model::{
    Activity, ActivityDefinition, Actor, Agent, AgentAccount, Attachment, Context,
    ContextActivities, Group, Identifier, ModelResult, SUPPORTED_VERSIONS, Score, Statement,
    StatementObject, StatementRef, StatementResult, SubStatement, Verb, Version, Vocabulary,
    WireEntity, undetermined,
};

fn assert_round_trip<T>(entity: &T, version: Version) -> ModelResult<()>
where
    T: WireEntity + PartialEq + std::fmt::Debug,
{
    let wire = entity.as_version(version)?;
    let restored = T::from_wire(&wire, version)?;
    assert_eq!(&restored, entity, "round trip at {version}");
    Ok(())
}

fn full_statement() -> Statement {
    Statement::builder()
        .actor(Group::new(
            Agent::new(
                Some("Study group".to_string()),
                Some(Identifier::Account(AgentAccount::new("g-7", "https://lms.example.com"))),
            ),
            vec![Agent::with_mbox("a@example.com").named("A")],
        ))
        .verb(Verb::new("experienced"))
        .object(
            Activity::new("https://example.com/media/intro").with_definition(ActivityDefinition {
                name: Some(undetermined("Intro video")),
                ..ActivityDefinition::default().with_type("media")
            }),
        )
        .result(StatementResult {
            score: Some(Score {
                raw: Some(7.0),
                max: Some(10.0),
                ..Score::default()
            }),
            success: Some(true),
            duration: Some("PT4M30S".to_string()),
            ..StatementResult::default()
        })
        .context(Context {
            registration: Some("d3b1e7c4-52f1-4b71-8c4b-0a9c4f0b1a11".to_string()),
            platform: Some("web".to_string()),
            context_activities: Some(ContextActivities {
                grouping: vec![Activity::new("https://example.com/courses/1")],
                ..ContextActivities::default()
            }),
            ..Context::default()
        })
        .authority(Agent::with_mbox("lrs@example.com"))
        .build()
}

#[test]
fn statement_every_version_round_trip_expected_equal() -> ModelResult<()> {
    let statement = full_statement();
    for version in SUPPORTED_VERSIONS {
        assert_round_trip(&statement, version)?;
    }
    Ok(())
}

#[test]
fn statement_with_substatement_round_trip_expected_equal_after_legacy() -> ModelResult<()> {
    let statement = Statement::new(
        Agent::with_mbox("learner@example.com"),
        Verb::new("http://adlnet.gov/expapi/verbs/attempted"),
        SubStatement {
            actor: Some(Actor::Agent(Agent::with_mbox("learner@example.com"))),
            verb: Some(Verb::new("completed")),
            object: Some(StatementRef::new("0a1e2b3c-0000-4000-8000-000000000001").into()),
            ..SubStatement::default()
        },
    );
    for version in SUPPORTED_VERSIONS {
        if version.is_legacy() {
            assert!(statement.as_version(version).is_err());
            continue;
        }
        assert_round_trip(&statement, version)?;
    }
    Ok(())
}

#[test]
fn statement_with_attachment_round_trip_expected_metadata_kept() -> ModelResult<()> {
    let mut statement = full_statement();
    let mut attachment = Attachment::new("http://id.tincanapi.com/attachment/certificate", "text/plain");
    attachment.display = Some(undetermined("certificate"));
    attachment.set_content(b"certified".to_vec());
    statement.attachments.push(attachment);

    for version in SUPPORTED_VERSIONS {
        if version.is_pre_1_0() {
            assert!(statement.as_version(version).is_err(), "{version}");
            continue;
        }
        let wire = statement.as_version(version)?;
        let mut restored = Statement::from_wire(&wire, version)?;
        assert!(!restored.has_attachment_with_content());
        restored.attach_content(|_| Some(&b"certified"[..]));
        assert_eq!(restored, statement);
    }
    Ok(())
}

#[test]
fn verb_short_forms_expected_legacy_short_and_current_long() -> ModelResult<()> {
    for short in Vocabulary::Verb.short_forms() {
        let verb = Verb::new(short);
        assert_eq!(verb.as_version(Version::V0_9)?, json!({"id": short}));

        let long = Vocabulary::Verb.to_long(short);
        let from_long = Verb::with_display(long.clone(), None);
        for version in SUPPORTED_VERSIONS.into_iter().filter(|v| !v.is_legacy()) {
            assert_eq!(from_long.as_version(version)?["id"], json!(long));
        }
    }
    Ok(())
}

#[test]
fn verb_completed_example_expected_documented_shapes() -> ModelResult<()> {
    let verb = Verb::new("completed");
    assert_eq!(verb.id, "http://adlnet.gov/expapi/verbs/completed");
    assert_eq!(verb.display, Some(undetermined("completed")));
    assert_eq!(verb.as_version(Version::V0_9)?, json!({"id": "completed"}));
    assert_eq!(
        verb.as_version(Version::V1_0_3)?,
        json!({"id": "http://adlnet.gov/expapi/verbs/completed", "display": {"und": "completed"}})
    );
    Ok(())
}

#[test]
fn legacy_statement_document_expected_normalized_entities() -> ModelResult<()> {
    let wire = json!({
        "id": "4ca5b0f2-6c23-4b53-9a0f-8c0d4cb7d2ff",
        "actor": {
            "objectType": "Person",
            "name": ["Ada Lovelace"],
            "mbox": ["mailto:ada@example.com"],
            "account": [{"accountName": "ada", "accountServiceHomePage": "https://lms"}]
        },
        "verb": "completed",
        "target": {
            "id": "https://example.com/lessons/engines",
            "definition": {"type": "module", "moreInfo": "https://example.com/more"}
        },
        "context": {"statement": {"objectType": "Statement", "id": "prior"}}
    });
    let statement = Statement::from_wire(&wire, Version::V0_9)?;

    let actor = statement.actor.as_ref().map(Actor::agent);
    assert_eq!(actor.and_then(|agent| agent.name.as_deref()), Some("Ada Lovelace"));
    assert_eq!(
        actor.and_then(|agent| agent.identifier.clone()),
        Some(Identifier::Mbox("mailto:ada@example.com".to_string()))
    );

    let activity = statement.object.as_ref().and_then(StatementObject::as_activity);
    assert_eq!(
        activity
            .and_then(|activity| activity.definition.as_ref())
            .and_then(|definition| definition.activity_type.as_deref()),
        Some("http://adlnet.gov/expapi/activities/module")
    );

    let rendered = statement.as_version(Version::V0_9)?;
    assert_eq!(rendered["object"]["definition"], json!({"type": "module"}));
    assert_eq!(rendered["context"]["statement"]["objectType"], "Statement");
    assert!(statement.as_version(Version::V1_0_3)?["object"]["definition"]["moreInfo"].is_string());
    Ok(())
}

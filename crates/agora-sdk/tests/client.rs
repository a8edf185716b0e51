use agora_forms::{FieldDraft, FieldType, FormBuilder};
use agora_sdk::{AgoraClient, ClientError, ContentKind, ContentStatus, EventDraft, OpportunityPatch};
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn moderation(status: &str) -> Value {
    json!({
        "authorId": Uuid::nil(),
        "status": status,
        "featured": false,
        "createdAt": "2025-05-01T10:00:00Z",
        "updatedAt": "2025-05-01T10:00:00Z"
    })
}

fn event_json(id: Uuid) -> Value {
    let mut event = json!({
        "id": id,
        "title": "Rust meetup",
        "description": "Monthly meetup",
        "category": "meetup",
        "startDate": "2025-09-12T18:00:00Z",
        "endDate": "2025-09-12T21:00:00Z",
        "location": null,
        "tags": ["rust"],
        "formId": null,
        "registrationForm": null
    });
    if let (Some(event), Some(meta)) = (event.as_object_mut(), moderation("pending").as_object()) {
        event.extend(meta.clone());
    }
    event
}

#[tokio::test]
async fn test_create_event_sends_multipart_with_cookie() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path("/api/events"))
        .and(header("cookie", "token=session-jwt"))
        .and(body_string_contains("name=\"tags\""))
        .and(body_string_contains(r#"["rust"]"#))
        .and(body_string_contains("name=\"formSections\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "data": event_json(id),
            "error": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut form = FormBuilder::new("Registration", "");
    form.add_section("Personal Information", None);
    form.add_custom_field(0, FieldDraft::new("Full Name", FieldType::Text).required(true));

    let start = chrono::Utc::now();
    let draft = EventDraft::new("Rust meetup", "Monthly meetup", "meetup", start, start)
        .tags(["rust"])
        .registration_form(form.build());

    let client = AgoraClient::new(server.uri()).unwrap().with_token("session-jwt");
    let event = assert_ok!(client.create_event(&draft).await);
    assert_eq!(event.id, id);
    assert_eq!(event.moderation.status, ContentStatus::Pending);
    assert_eq!(event.tags, vec!["rust"]);
}

#[tokio::test]
async fn test_patch_opportunity_sends_only_changes() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    let mut body = json!({
        "id": id,
        "title": "Lead mentor",
        "description": "Guide newcomers",
        "category": "volunteer",
        "tags": [],
        "requirements": []
    });
    if let (Some(body), Some(meta)) = (body.as_object_mut(), moderation("approved").as_object()) {
        body.extend(meta.clone());
    }
    Mock::given(method("PATCH"))
        .and(path(format!("/api/opportunities/{id}")))
        .and(body_string_contains("name=\"title\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": body })))
        .mount(&server)
        .await;

    let client = AgoraClient::new(server.uri()).unwrap();
    let patch = OpportunityPatch {
        title: Some("Lead mentor".into()),
        ..Default::default()
    };
    let opp = assert_ok!(client.patch_opportunity(id, &patch).await);
    assert_eq!(opp.title, "Lead mentor");

    let requests = server.received_requests().await.unwrap();
    let sent = String::from_utf8_lossy(&requests[0].body).to_string();
    assert!(!sent.contains("name=\"description\""));
}

#[tokio::test]
async fn test_field_errors_surface() {
    let server = MockServer::start().await;
    let form_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path(format!("/api/forms/{form_id}/responses")))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "success": false,
            "data": null,
            "error": {
                "code": "VALIDATION_FAILED",
                "message": "1 field(s) failed validation",
                "details": [{ "fieldId": "field_1", "label": "Full Name", "message": "Full Name is required" }]
            }
        })))
        .mount(&server)
        .await;

    let client = AgoraClient::new(server.uri()).unwrap();
    let err = assert_err!(client.submit_response(form_id, &serde_json::Map::new()).await);
    match err {
        ClientError::Api { status, code, field_errors, .. } => {
            assert_eq!(status, 422);
            assert_eq!(code, "VALIDATION_FAILED");
            assert_eq!(field_errors.len(), 1);
            assert_eq!(field_errors[0].message, "Full Name is required");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_approve_body_and_review_query() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    let mut item = json!({ "kind": "project", "id": id, "title": "Mesh radio" });
    if let (Some(item), Some(meta)) = (item.as_object_mut(), moderation("rejected").as_object()) {
        item.extend(meta.clone());
    }

    Mock::given(method("POST"))
        .and(path("/api/admin/approve"))
        .and(body_json(json!({ "kind": "project", "id": id, "approved": false, "reason": "spam" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": item.clone() })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/review-contents"))
        .and(query_param("status", "rejected"))
        .and(query_param("kind", "project"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": [item] })))
        .mount(&server)
        .await;

    let client = AgoraClient::new(server.uri()).unwrap().with_token("admin-jwt");
    let reviewed = assert_ok!(client.approve(ContentKind::Project, id, false, Some("spam")).await);
    assert_eq!(reviewed.moderation.status, ContentStatus::Rejected);

    let queue = assert_ok!(
        client
            .review_contents(Some(ContentStatus::Rejected), Some(ContentKind::Project))
            .await
    );
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].kind, ContentKind::Project);
}

#[tokio::test]
async fn test_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "error": { "code": "NOT_FOUND", "message": "no record" }
        })))
        .mount(&server)
        .await;

    let client = AgoraClient::new(server.uri()).unwrap();
    let err = assert_err!(client.get_form(Uuid::new_v4()).await);
    assert!(err.is_not_found());
}

use super::{bearer, fields, researcher, service_with_cast};
use crate::models::{InviteRequest, Role};
use crate::services::StudyService;
use actix_web::http::{header, StatusCode};
use actix_web::test;
use serde_json::{json, Value};

// A study owned by "owner" with "editor" already on board
fn seeded() -> (StudyService, String) {
    let service = service_with_cast();
    let id = service
        .create_study(&researcher("owner"), fields("Team study"))
        .unwrap()
        .study
        .id;
    service
        .invite("owner", &id, &InviteRequest::by_user_id("editor", Role::Editor))
        .unwrap();
    (service, id)
}

#[actix_rt::test]
async fn editor_invite_is_capped_at_reviewer() {
    let (service, id) = seeded();
    let app = test_app!(service);
    let editor = bearer(&researcher("editor"));

    let as_owner = test::TestRequest::post()
        .uri(&format!("/api/studies/{}/collaborators", id))
        .insert_header((header::AUTHORIZATION, editor.clone()))
        .set_json(&json!({ "userId": "newcomer", "role": "OWNER" }))
        .to_request();
    let response = test::call_service(&app, as_owner).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(response).await;
    assert!(body["message"].as_str().unwrap().starts_with("Forbidden"));

    let as_viewer = test::TestRequest::post()
        .uri(&format!("/api/studies/{}/collaborators", id))
        .insert_header((header::AUTHORIZATION, editor))
        .set_json(&json!({ "userId": "newcomer", "role": "VIEWER" }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, as_viewer).await;
    assert_eq!(created["userId"], "newcomer");
    assert_eq!(created["role"], "VIEWER");
    assert!(created["addedAt"].is_string());
}

#[actix_rt::test]
async fn duplicate_invite_conflicts_and_email_invites_resolve() {
    let (service, id) = seeded();
    let app = test_app!(service);
    let owner = bearer(&researcher("owner"));

    let duplicate = test::TestRequest::post()
        .uri(&format!("/api/studies/{}/collaborators", id))
        .insert_header((header::AUTHORIZATION, owner.clone()))
        .set_json(&json!({ "userId": "editor", "role": "REVIEWER" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, duplicate).await.status(),
        StatusCode::CONFLICT
    );

    let by_email = test::TestRequest::post()
        .uri(&format!("/api/studies/{}/collaborators", id))
        .insert_header((header::AUTHORIZATION, owner.clone()))
        .set_json(&json!({ "email": "reviewer@lab.test", "role": "REVIEWER" }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, by_email).await;
    assert_eq!(created["userId"], "reviewer");

    let neither = test::TestRequest::post()
        .uri(&format!("/api/studies/{}/collaborators", id))
        .insert_header((header::AUTHORIZATION, owner))
        .set_json(&json!({ "role": "VIEWER" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, neither).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_rt::test]
async fn role_change_and_removal_round_trip() {
    let (service, id) = seeded();
    let app = test_app!(service);
    let owner = bearer(&researcher("owner"));

    let list = test::TestRequest::get()
        .uri(&format!("/api/studies/{}/collaborators", id))
        .insert_header((header::AUTHORIZATION, owner.clone()))
        .to_request();
    let collaborators: Value = test::call_and_read_body_json(&app, list).await;
    let editor_id = collaborators
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["userId"] == "editor")
        .map(|c| c["id"].as_str().unwrap().to_string())
        .unwrap();

    let demote = test::TestRequest::patch()
        .uri(&format!("/api/studies/{}/collaborators/{}", id, editor_id))
        .insert_header((header::AUTHORIZATION, owner.clone()))
        .set_json(&json!({ "role": "REVIEWER" }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, demote).await;
    assert_eq!(updated["role"], "REVIEWER");

    let remove = test::TestRequest::delete()
        .uri(&format!("/api/studies/{}/collaborators/{}", id, editor_id))
        .insert_header((header::AUTHORIZATION, owner.clone()))
        .to_request();
    assert_eq!(
        test::call_service(&app, remove).await.status(),
        StatusCode::NO_CONTENT
    );

    let missing = test::TestRequest::patch()
        .uri(&format!("/api/studies/{}/collaborators/{}", id, editor_id))
        .insert_header((header::AUTHORIZATION, owner.clone()))
        .set_json(&json!({ "role": "VIEWER" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, missing).await.status(),
        StatusCode::NOT_FOUND
    );

    let list = test::TestRequest::get()
        .uri(&format!("/api/studies/{}/collaborators", id))
        .insert_header((header::AUTHORIZATION, owner))
        .to_request();
    let collaborators: Value = test::call_and_read_body_json(&app, list).await;
    assert_eq!(collaborators.as_array().unwrap().len(), 1);
}

#[actix_rt::test]
async fn last_owner_is_protected() {
    let (service, id) = seeded();
    let owner_id = service
        .collaborators("owner", &id)
        .unwrap()
        .into_iter()
        .find(|c| c.role == Role::Owner)
        .unwrap()
        .id;
    let app = test_app!(service);

    let remove = test::TestRequest::delete()
        .uri(&format!("/api/studies/{}/collaborators/{}", id, owner_id))
        .insert_header((header::AUTHORIZATION, bearer(&researcher("owner"))))
        .to_request();
    let response = test::call_service(&app, remove).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("at least one owner"));
}

#[actix_rt::test]
async fn viewer_cannot_change_roles() {
    let (service, id) = seeded();
    let change = service
        .invite("owner", &id, &InviteRequest::by_user_id("viewer", Role::Viewer))
        .unwrap();
    let app = test_app!(service);

    let attempt = test::TestRequest::patch()
        .uri(&format!(
            "/api/studies/{}/collaborators/{}",
            id, change.collaborator.id
        ))
        .insert_header((header::AUTHORIZATION, bearer(&researcher("viewer"))))
        .set_json(&json!({ "role": "REVIEWER" }))
        .to_request();
    let response = test::call_service(&app, attempt).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(response).await;
    assert!(body["message"].as_str().unwrap().starts_with("Unauthorized"));
}

#[actix_rt::test]
async fn researchers_are_listed_for_invites() {
    let app = test_app!(service_with_cast());

    let request = test::TestRequest::get()
        .uri("/api/users/researchers")
        .insert_header((header::AUTHORIZATION, bearer(&researcher("owner"))))
        .to_request();
    let researchers: Value = test::call_and_read_body_json(&app, request).await;
    let researchers = researchers.as_array().unwrap();

    assert_eq!(researchers.len(), 5);
    assert!(researchers.iter().all(|r| r["email"].is_string()));
}

//! HTTP-level tests for `/tickets/{id}/assignees`.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, delete_anon, get_auth, post_json, post_json_anon, put_json};
use helpdesk_db::store::TicketStore;
use serde_json::json;

fn assignees_uri(ticket_id: i64) -> String {
    format!("/api/v1/tickets/{ticket_id}/assignees")
}

// ---------------------------------------------------------------------------
// Assign
// ---------------------------------------------------------------------------

#[tokio::test]
async fn assign_returns_201_with_record() {
    let app = common::build_test_app();
    let (admin, token) = app.login("Ada Admin", "admin").await;
    let tech = app.user("Tara Tech", "technician").await;
    let id = app.create_ticket(&token, "Wifi").await;

    let response = post_json(
        app.app(),
        &assignees_uri(id),
        &token,
        json!({ "user_id": tech.id, "is_primary": true, "work_notes": "bring a ladder" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["ticket_id"], id);
    assert_eq!(json["data"]["user_id"], tech.id);
    assert_eq!(json["data"]["is_primary"], true);
    assert_eq!(json["data"]["assigned_by"], admin.id);
    assert_eq!(json["data"]["work_notes"], "bring a ladder");
    assert!(json["data"]["completed_at"].is_null());
}

#[tokio::test]
async fn duplicate_assignment_returns_409_without_second_row() {
    let app = common::build_test_app();
    let (_, token) = app.login("Ada Admin", "admin").await;
    let tech = app.user("Tara Tech", "technician").await;
    let id = app.create_ticket(&token, "Wifi").await;
    app.assign(&token, id, tech.id, false).await;

    let response = post_json(
        app.app(),
        &assignees_uri(id),
        &token,
        json!({ "user_id": tech.id }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
    assert!(json["error"].as_str().unwrap().contains("already assigned"));

    assert_eq!(app.store.list_assignees(id).await.unwrap().len(), 1);
    let assigns = app
        .store
        .list_activity_for_ticket(id)
        .await
        .unwrap()
        .into_iter()
        .filter(|l| l.action == "technician_assign")
        .count();
    assert_eq!(assigns, 1);
}

#[tokio::test]
async fn mistyped_body_returns_400_bad_request_envelope() {
    let app = common::build_test_app();
    let (_, token) = app.login("Ada Admin", "admin").await;
    let id = app.create_ticket(&token, "Wifi").await;

    let response = post_json(
        app.app(),
        &assignees_uri(id),
        &token,
        json!({ "user_id": "not-a-number" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].as_str().unwrap().contains("user_id"));
    assert!(app.store.list_assignees(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_user_id_returns_400_bad_request_envelope() {
    let app = common::build_test_app();
    let (_, token) = app.login("Ada Admin", "admin").await;
    let id = app.create_ticket(&token, "Wifi").await;

    let response = post_json(app.app(), &assignees_uri(id), &token, json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn non_numeric_ticket_id_returns_400_bad_request_envelope() {
    let app = common::build_test_app();
    let (_, token) = app.login("Ada Admin", "admin").await;

    let response = get_auth(app.app(), "/api/v1/tickets/abc/assignees", &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn assigning_non_technician_returns_invalid_role_without_row() {
    let app = common::build_test_app();
    let (_, token) = app.login("Ada Admin", "admin").await;
    let employee = app.user("Erin Employee", "employee").await;
    let id = app.create_ticket(&token, "Wifi").await;

    let response = post_json(
        app.app(),
        &assignees_uri(id),
        &token,
        json!({ "user_id": employee.id }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_ROLE");
    assert!(app.store.list_assignees(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn assigning_deactivated_technician_is_rejected() {
    let app = common::build_test_app();
    let (_, token) = app.login("Ada Admin", "admin").await;
    let tech = app.user("Tara Tech", "technician").await;
    let id = app.create_ticket(&token, "Wifi").await;
    put_json(
        app.app(),
        &format!("/api/v1/users/{}/active", tech.id),
        &token,
        json!({ "is_active": false }),
    )
    .await;

    let response = post_json(
        app.app(),
        &assignees_uri(id),
        &token,
        json!({ "user_id": tech.id }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn technician_cannot_assign() {
    let app = common::build_test_app();
    let (_, admin) = app.login("Ada Admin", "admin").await;
    let (tech, tech_token) = app.login("Tara Tech", "technician").await;
    let id = app.create_ticket(&admin, "Wifi").await;
    app.assign(&admin, id, tech.id, true).await;
    let other = app.user("Tom Tech", "technician").await;

    let response = post_json(
        app.app(),
        &assignees_uri(id),
        &tech_token,
        json!({ "user_id": other.id }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(body_json(response).await["error"]
        .as_str()
        .unwrap()
        .contains("ASSIGN_TICKET"));
}

#[tokio::test]
async fn assign_without_token_returns_401() {
    let app = common::build_test_app();
    let response = post_json_anon(app.app(), &assignees_uri(1), json!({ "user_id": 2 })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn assign_to_missing_ticket_or_user_returns_404() {
    let app = common::build_test_app();
    let (_, token) = app.login("Ada Admin", "admin").await;
    let tech = app.user("Tara Tech", "technician").await;
    let id = app.create_ticket(&token, "Wifi").await;

    let response = post_json(
        app.app(),
        &assignees_uri(999_999),
        &token,
        json!({ "user_id": tech.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response =
        post_json(app.app(), &assignees_uri(id), &token, json!({ "user_id": 999_999 })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "User with id 999999 not found");
}

// ---------------------------------------------------------------------------
// Primary assignee
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_primary_demotes_old_and_list_is_primary_first() {
    let app = common::build_test_app();
    let (_, token) = app.login("Ada Admin", "admin").await;
    let first = app.user("Tara Tech", "technician").await;
    let second = app.user("Tom Tech", "technician").await;
    let id = app.create_ticket(&token, "Server room").await;
    app.assign(&token, id, first.id, true).await;
    app.assign(&token, id, second.id, true).await;

    let json = body_json(get_auth(app.app(), &assignees_uri(id), &token).await).await;
    let list = json["data"].as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["user_id"], second.id);
    assert_eq!(list[0]["is_primary"], true);
    assert_eq!(list[1]["user_id"], first.id);
    assert_eq!(list[1]["is_primary"], false);

    let ticket = app.store.find_ticket(id).await.unwrap().unwrap();
    assert_eq!(ticket.assigned_to, Some(second.id));

    let last = app.store.list_activity_for_ticket(id).await.unwrap().pop().unwrap();
    assert_eq!(last.details["demoted_user_id"], first.id);
}

#[tokio::test]
async fn non_primaries_list_in_assignment_order() {
    let app = common::build_test_app();
    let (_, token) = app.login("Ada Admin", "admin").await;
    let a = app.user("Ann Tech", "technician").await;
    let b = app.user("Bob Tech", "technician").await;
    let c = app.user("Cal Tech", "technician").await;
    let id = app.create_ticket(&token, "Floor 3").await;
    app.assign(&token, id, a.id, false).await;
    app.assign(&token, id, b.id, false).await;
    app.assign(&token, id, c.id, true).await;

    let json = body_json(get_auth(app.app(), &assignees_uri(id), &token).await).await;
    let order: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["user_id"].as_i64().unwrap())
        .collect();
    assert_eq!(order, vec![c.id, a.id, b.id]);
}

// ---------------------------------------------------------------------------
// Unassign
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unassign_removes_row_and_logs_name() {
    let app = common::build_test_app();
    let (_, token) = app.login("Ada Admin", "admin").await;
    let tech = app.user("Tara Tech", "technician").await;
    let id = app.create_ticket(&token, "Wifi").await;
    app.assign(&token, id, tech.id, true).await;

    let response = delete(app.app(), &format!("{}/{}", assignees_uri(id), tech.id), &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.store.list_assignees(id).await.unwrap().is_empty());
    let ticket = app.store.find_ticket(id).await.unwrap().unwrap();
    assert_eq!(ticket.assigned_to, None);

    let last = app.store.list_activity_for_ticket(id).await.unwrap().pop().unwrap();
    assert_eq!(last.action, "technician_remove");
    assert_eq!(last.details["technician_name"], "Tara Tech");
}

#[tokio::test]
async fn unassign_of_unassigned_pair_returns_404_without_log() {
    let app = common::build_test_app();
    let (_, token) = app.login("Ada Admin", "admin").await;
    let tech = app.user("Tara Tech", "technician").await;
    let id = app.create_ticket(&token, "Wifi").await;
    let before = app.store.list_activity_for_ticket(id).await.unwrap().len();

    let response = delete(app.app(), &format!("{}/{}", assignees_uri(id), tech.id), &token).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
    let after = app.store.list_activity_for_ticket(id).await.unwrap().len();
    assert_eq!(before, after);
}

#[tokio::test]
async fn unassign_without_token_returns_401() {
    let app = common::build_test_app();
    let response = delete_anon(app.app(), "/api/v1/tickets/1/assignees/2").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn technician_completes_own_assignment_once() {
    let app = common::build_test_app();
    let (_, admin) = app.login("Ada Admin", "admin").await;
    let (tech, tech_token) = app.login("Tara Tech", "technician").await;
    let id = app.create_ticket(&admin, "Toner").await;
    app.assign(&admin, id, tech.id, true).await;
    let uri = format!("{}/{}/complete", assignees_uri(id), tech.id);

    let response = put_json(
        app.app(),
        &uri,
        &tech_token,
        json!({ "work_notes": "replaced toner" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["completed_at"].is_string());
    assert_eq!(json["data"]["work_notes"], "replaced toner");

    let response = put_json(app.app(), &uri, &tech_token, json!({})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn technician_cannot_complete_colleagues_assignment() {
    let app = common::build_test_app();
    let (_, admin) = app.login("Ada Admin", "admin").await;
    let (tara, tara_token) = app.login("Tara Tech", "technician").await;
    let tom = app.user("Tom Tech", "technician").await;
    let id = app.create_ticket(&admin, "Toner").await;
    app.assign(&admin, id, tara.id, true).await;
    app.assign(&admin, id, tom.id, false).await;

    let response = put_json(
        app.app(),
        &format!("{}/{}/complete", assignees_uri(id), tom.id),
        &tara_token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // A manager may complete on Tom's behalf.
    let (_, manager) = app.login("Mona Manager", "manager").await;
    let response = put_json(
        app.app(),
        &format!("{}/{}/complete", assignees_uri(id), tom.id),
        &manager,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

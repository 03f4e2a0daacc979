//! Integration tests for `PgTicketStore` against a real database.
//!
//! Run with `DATABASE_URL` set and `--ignored`. Covers what the in-memory
//! store can only emulate:
//! - `uq_ticket_assignees_ticket_user` surfaces as `UniqueViolation`
//! - The activity entry and the mutation commit together or not at all
//! - `activity_logs` rejects UPDATE and DELETE
//! - `clock_timestamp()` keeps entries from one transaction in write order

use assert_matches::assert_matches;
use helpdesk_core::activity::{action_types, target_types};
use helpdesk_db::models::activity_log::NewActivityLog;
use helpdesk_db::models::ticket::{CreateTicket, StatusChange};
use helpdesk_db::models::ticket_assignee::CreateTicketAssignee;
use helpdesk_db::models::user::{CreateUser, User};
use helpdesk_db::store::{PgTicketStore, StoreError, TicketStore, UQ_TICKET_ASSIGNEE};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn user(store: &PgTicketStore, email: &str, role: &str) -> User {
    store
        .create_user(&CreateUser {
            full_name: email.to_string(),
            email: format!("{email}@example.com"),
            role: role.to_string(),
        })
        .await
        .unwrap()
}

async fn ticket(store: &PgTicketStore, creator: i64) -> i64 {
    let input = CreateTicket {
        title: "Printer jam".to_string(),
        description: String::new(),
        priority: "high".to_string(),
        created_by: creator,
        due_at: None,
    };
    let log = NewActivityLog::for_ticket(creator, 0, action_types::TICKET_CREATED, json!({}));
    store.create_ticket(&input, &log).await.unwrap().id
}

fn assign(ticket_id: i64, user_id: i64, is_primary: bool) -> CreateTicketAssignee {
    CreateTicketAssignee {
        ticket_id,
        user_id,
        is_primary,
        assigned_by: None,
        work_notes: None,
    }
}

fn assign_log(actor: i64, ticket_id: i64, tech: i64) -> NewActivityLog {
    NewActivityLog::on_ticket_target(
        actor,
        ticket_id,
        action_types::TECHNICIAN_ASSIGN,
        target_types::USER,
        tech,
        json!({}),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn duplicate_assignment_hits_unique_constraint(pool: PgPool) {
    let store = PgTicketStore::new(pool);
    let admin = user(&store, "admin", "admin").await;
    let tech = user(&store, "tech", "technician").await;
    let id = ticket(&store, admin.id).await;

    store
        .insert_assignee(&assign(id, tech.id, true), &assign_log(admin.id, id, tech.id))
        .await
        .unwrap();
    let err = store
        .insert_assignee(&assign(id, tech.id, true), &assign_log(admin.id, id, tech.id))
        .await
        .unwrap_err();

    assert_matches!(err, StoreError::UniqueViolation { ref constraint } if constraint == UQ_TICKET_ASSIGNEE);
    let assignees = store.list_assignees(id).await.unwrap();
    assert_eq!(assignees.len(), 1);
    // The demotion that preceded the failed insert was rolled back.
    assert!(assignees[0].is_primary);
    assert_eq!(store.list_activity_for_ticket(id).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn primary_swap_updates_projection(pool: PgPool) {
    let store = PgTicketStore::new(pool);
    let admin = user(&store, "admin", "admin").await;
    let first = user(&store, "first", "technician").await;
    let second = user(&store, "second", "technician").await;
    let id = ticket(&store, admin.id).await;

    for tech in [&first, &second] {
        store
            .insert_assignee(&assign(id, tech.id, true), &assign_log(admin.id, id, tech.id))
            .await
            .unwrap();
    }

    let assignees = store.list_assignees(id).await.unwrap();
    assert_eq!(assignees[0].user_id, second.id);
    assert!(assignees[0].is_primary);
    assert!(!assignees[1].is_primary);
    let ticket = store.find_ticket(id).await.unwrap().unwrap();
    assert_eq!(ticket.assigned_to, Some(second.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn failed_log_insert_rolls_back_status(pool: PgPool) {
    let store = PgTicketStore::new(pool);
    let admin = user(&store, "admin", "admin").await;
    let id = ticket(&store, admin.id).await;

    let change = StatusChange {
        expected_status: "new".to_string(),
        new_status: "open".to_string(),
        resolved_at: None,
        closed_at: None,
        latch_breach: false,
    };
    let bad = NewActivityLog::for_ticket(987_654, id, action_types::STATUS_CHANGED, json!({}));
    let err = store
        .change_ticket_status(id, &change, &[bad])
        .await
        .unwrap_err();

    assert_matches!(err, StoreError::ForeignKeyViolation { .. });
    assert_eq!(store.find_ticket(id).await.unwrap().unwrap().status, "new");
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn status_entries_keep_write_order(pool: PgPool) {
    let store = PgTicketStore::new(pool);
    let admin = user(&store, "admin", "admin").await;
    let id = ticket(&store, admin.id).await;

    let change = StatusChange {
        expected_status: "new".to_string(),
        new_status: "resolved".to_string(),
        resolved_at: Some(chrono::Utc::now()),
        closed_at: None,
        latch_breach: false,
    };
    let logs = [
        NewActivityLog::for_ticket(admin.id, id, action_types::STATUS_CHANGED, json!({})),
        NewActivityLog::for_ticket(admin.id, id, action_types::TICKET_RESOLVED, json!({})),
    ];
    store
        .change_ticket_status(id, &change, &logs)
        .await
        .unwrap()
        .unwrap();

    let trail: Vec<_> = store
        .list_activity_for_ticket(id)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.action)
        .collect();
    assert_eq!(trail, vec!["ticket_created", "status_changed", "ticket_resolved"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn activity_logs_are_append_only(pool: PgPool) {
    let store = PgTicketStore::new(pool.clone());
    let admin = user(&store, "admin", "admin").await;
    ticket(&store, admin.id).await;

    let update = sqlx::query("UPDATE activity_logs SET action = 'tampered'")
        .execute(&pool)
        .await;
    assert!(update.is_err());

    let delete = sqlx::query("DELETE FROM activity_logs").execute(&pool).await;
    assert!(delete.is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn deleted_ticket_keeps_trail(pool: PgPool) {
    let store = PgTicketStore::new(pool);
    let admin = user(&store, "admin", "admin").await;
    let id = ticket(&store, admin.id).await;

    let log = NewActivityLog::for_ticket(admin.id, id, action_types::TICKET_DELETED, json!({}));
    assert!(store.delete_ticket(id, &log).await.unwrap());

    assert!(store.find_ticket(id).await.unwrap().is_none());
    assert_eq!(store.list_activity_for_ticket(id).await.unwrap().len(), 2);
}

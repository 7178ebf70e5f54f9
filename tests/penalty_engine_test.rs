use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::Mutex;

use accountable::db::repository;
use accountable::models::{NewTaskRequest, NewUserRequest, TaskStatus, UpdateTaskRequest};
use accountable::services::{PenaltyService, TaskService};

async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

fn service(pool: &SqlitePool) -> PenaltyService {
    PenaltyService::new(pool.clone(), Arc::new(Mutex::new(())))
}

async fn seed_user(pool: &SqlitePool, name: &str) -> String {
    repository::insert_user(
        pool,
        NewUserRequest {
            name: name.to_string(),
            avatar: None,
        },
    )
    .await
    .expect("Failed to insert user")
    .id
}

async fn seed_task(pool: &SqlitePool, user_id: &str, title: &str, date: &str) -> String {
    repository::insert_task(
        pool,
        NewTaskRequest {
            user_id: user_id.to_string(),
            title: title.to_string(),
            description: None,
            date: date.to_string(),
            time: None,
            icon: None,
        },
    )
    .await
    .expect("Failed to insert task")
    .id
}

#[tokio::test]
async fn test_reconcile_charges_per_missed_task() {
    let pool = setup_test_db().await;
    let alice = seed_user(&pool, "Alice").await;

    // Default settings: 5 per missed task.
    seed_task(&pool, &alice, "Dishes", "2024-01-04").await;
    seed_task(&pool, &alice, "Laundry", "2024-01-04").await;
    seed_task(&pool, &alice, "Trash", "2024-01-04").await;

    let created = service(&pool)
        .reconcile_missed_task_penalties("2024-01-04")
        .await
        .expect("Reconcile failed");

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].from_user_id, alice);
    assert_eq!(created[0].amount, 15);
    assert_eq!(created[0].to_user_id, None);
    assert!(created[0].reason.contains("2024-01-04"));
    assert!(created[0].reason.contains("Dishes"));
    assert!(created[0].reason.contains("Trash"));
}

#[tokio::test]
async fn test_reconcile_is_idempotent() {
    let pool = setup_test_db().await;
    let alice = seed_user(&pool, "Alice").await;
    seed_task(&pool, &alice, "Dishes", "2024-01-04").await;
    seed_task(&pool, &alice, "Laundry", "2024-01-04").await;

    let svc = service(&pool);
    let first = svc
        .reconcile_missed_task_penalties("2024-01-04")
        .await
        .unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].amount, 10);

    let second = svc
        .reconcile_missed_task_penalties("2024-01-04")
        .await
        .unwrap();
    assert!(second.is_empty());

    let penalties = repository::fetch_penalties(&pool).await.unwrap();
    assert_eq!(penalties.len(), 1);
}

#[tokio::test]
async fn test_completed_tasks_are_not_charged() {
    let pool = setup_test_db().await;
    let alice = seed_user(&pool, "Alice").await;
    let bob = seed_user(&pool, "Bob").await;

    let done = seed_task(&pool, &alice, "Dishes", "2024-01-04").await;
    repository::update_task(
        &pool,
        &done,
        UpdateTaskRequest {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    seed_task(&pool, &bob, "Vacuum", "2024-01-04").await;

    let created = service(&pool)
        .reconcile_missed_task_penalties("2024-01-04")
        .await
        .unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].from_user_id, bob);
    assert_eq!(created[0].amount, 5);
}

#[tokio::test]
async fn test_orphaned_user_reference_is_skipped() {
    let pool = setup_test_db().await;
    // Keep one real user so the date still reconciles for them.
    let alice = seed_user(&pool, "Alice").await;
    seed_task(&pool, &alice, "Dishes", "2024-01-04").await;
    seed_task(&pool, "ghost-user", "Haunt", "2024-01-04").await;

    let created = service(&pool)
        .reconcile_missed_task_penalties("2024-01-04")
        .await
        .expect("Reconcile should not fail on a bad reference");

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].from_user_id, alice);
}

#[tokio::test]
async fn test_held_lock_makes_reconcile_a_noop() {
    let pool = setup_test_db().await;
    let alice = seed_user(&pool, "Alice").await;
    seed_task(&pool, &alice, "Dishes", "2024-01-04").await;

    let lock = Arc::new(Mutex::new(()));
    let svc = PenaltyService::new(pool.clone(), lock.clone());

    let guard = lock.lock().await;
    let created = svc
        .reconcile_missed_task_penalties("2024-01-04")
        .await
        .unwrap();
    assert!(created.is_empty());
    assert!(repository::fetch_penalties(&pool).await.unwrap().is_empty());
    drop(guard);

    let created = svc
        .reconcile_missed_task_penalties("2024-01-04")
        .await
        .unwrap();
    assert_eq!(created.len(), 1);
}

#[tokio::test]
async fn test_concurrent_reconciles_leave_one_penalty() {
    // One connection so every racing task sees the same in-memory database.
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    let alice = seed_user(&pool, "Alice").await;
    seed_task(&pool, &alice, "Dishes", "2024-01-04").await;

    // Separate locks simulate independent processes racing on one store.
    let mut handles = Vec::new();
    for _ in 0..4 {
        let svc = service(&pool);
        handles.push(tokio::spawn(async move {
            svc.reconcile_missed_task_penalties("2024-01-04").await
        }));
    }
    for handle in handles {
        handle.await.unwrap().expect("Reconcile failed");
    }

    let removed = service(&pool).cleanup_duplicates().await.unwrap();
    assert_eq!(removed, 0);

    let penalties = repository::fetch_penalties(&pool).await.unwrap();
    assert_eq!(penalties.len(), 1);
}

#[tokio::test]
async fn test_repeated_completion_update_awards_points_once() {
    let pool = setup_test_db().await;
    let alice = seed_user(&pool, "Alice").await;
    let task = seed_task(&pool, &alice, "Dishes", "2024-01-04").await;

    let tasks = TaskService::new(pool.clone());
    let complete = UpdateTaskRequest {
        status: Some(TaskStatus::Completed),
        ..Default::default()
    };
    tasks.update_task(&task, complete.clone()).await.unwrap().unwrap();
    // A client re-sending the same status must not award again.
    tasks.update_task(&task, complete).await.unwrap().unwrap();

    let user = repository::find_user_by_id(&pool, &alice)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.points, 10);
}

#[tokio::test]
async fn test_uncompleting_takes_the_award_back() {
    let pool = setup_test_db().await;
    let alice = seed_user(&pool, "Alice").await;
    let task = seed_task(&pool, &alice, "Dishes", "2024-01-04").await;
    let tasks = TaskService::new(pool.clone());

    let set = |status| UpdateTaskRequest {
        status: Some(status),
        ..Default::default()
    };
    async fn points(pool: &SqlitePool, id: &str) -> i64 {
        repository::find_user_by_id(pool, id)
            .await
            .unwrap()
            .unwrap()
            .points
    }

    tasks
        .update_task(&task, set(TaskStatus::Completed))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(points(&pool, &alice).await, 10);

    tasks
        .update_task(&task, set(TaskStatus::Pending))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(points(&pool, &alice).await, 0);

    // Toggling back nets a single award, however often the user flips.
    tasks
        .update_task(&task, set(TaskStatus::Completed))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(points(&pool, &alice).await, 10);

    tasks
        .update_task(&task, set(TaskStatus::Missed))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(points(&pool, &alice).await, -5);
}

#[tokio::test]
async fn test_penalty_summary_splits_owed_and_owed_to() {
    let pool = setup_test_db().await;
    let alice = seed_user(&pool, "Alice").await;
    let bob = seed_user(&pool, "Bob").await;

    sqlx::query(
        "INSERT INTO penalties (id, from_user_id, to_user_id, amount, reason, date, status, created_at)
         VALUES
           ('p1', ?1, NULL, 10, 'general', '2024-01-04', 'pending', '2024-01-05T00:00:00Z'),
           ('p2', ?1, ?2, 5, 'owed to Bob', '2024-01-05', 'pending', '2024-01-06T00:00:00Z'),
           ('p3', ?2, ?1, 20, 'resolved already', '2024-01-06', 'resolved', '2024-01-07T00:00:00Z')",
    )
    .bind(&alice)
    .bind(&bob)
    .execute(&pool)
    .await
    .unwrap();

    let summary = service(&pool).penalty_summary().await.unwrap();

    let alice_entry = &summary[&alice];
    assert_eq!(alice_entry.owed, 15);
    // The resolved penalty toward Alice does not count.
    assert_eq!(alice_entry.owed_to, 0);

    let bob_entry = &summary[&bob];
    assert_eq!(bob_entry.owed, 0);
    assert_eq!(bob_entry.owed_to, 5);
}

#[tokio::test]
async fn test_cleanup_converges_without_store_constraint() {
    // A store without the unique (user, date) index. Duplicates are
    // possible there and cleanup is the safety net.
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create database");
    sqlx::query(
        r#"
        CREATE TABLE penalties (
            id TEXT PRIMARY KEY,
            from_user_id TEXT NOT NULL,
            to_user_id TEXT,
            amount INTEGER NOT NULL,
            reason TEXT NOT NULL,
            date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await
    .expect("Failed to create penalties table");

    for i in 0..3 {
        sqlx::query(
            "INSERT INTO penalties (id, from_user_id, to_user_id, amount, reason, date, status, created_at)
             VALUES (?, 'alice', NULL, 10, 'dup', '2024-01-04', 'pending', ?)",
        )
        .bind(format!("p{i}"))
        .bind(format!("2024-01-05T00:00:0{i}Z"))
        .execute(&pool)
        .await
        .unwrap();
    }
    sqlx::query(
        "INSERT INTO penalties (id, from_user_id, to_user_id, amount, reason, date, status, created_at)
         VALUES ('other', 'bob', NULL, 5, 'single', '2024-01-04', 'pending', '2024-01-05T00:00:00Z')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let svc = service(&pool);
    let removed = svc.cleanup_duplicates().await.unwrap();
    assert_eq!(removed, 2);

    // Idempotent: a second pass finds nothing.
    assert_eq!(svc.cleanup_duplicates().await.unwrap(), 0);

    let penalties = repository::fetch_penalties(&pool).await.unwrap();
    assert_eq!(penalties.len(), 2);
    assert_eq!(
        penalties
            .iter()
            .filter(|p| p.from_user_id == "alice")
            .count(),
        1
    );
}

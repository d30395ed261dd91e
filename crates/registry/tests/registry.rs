use chrono::NaiveDate;
use migration::{Migrator, MigratorTrait};
use registry::{
    Actor, ActorRef, Label, LabelParent, LabelRef, PullOptions, PushOptions, Registry,
    RegistryError, Transaction,
};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend, Statement};

async fn registry_with_db() -> (Registry, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("connecting to the in-memory database");
    Migrator::up(&db, None).await.expect("installing the schema");
    let registry = Registry::builder().database(db.clone()).build();
    (registry, db)
}

async fn registry() -> Registry {
    registry_with_db().await.0
}

async fn count_rows(db: &DatabaseConnection, table: &str) -> i64 {
    let row = db
        .query_one(Statement::from_string(
            DbBackend::Sqlite,
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ))
        .await
        .expect("counting rows")
        .expect("count result");
    row.try_get("", "n").expect("count column")
}

fn march(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
}

#[tokio::test]
async fn replace_updates_non_key_fields() {
    let registry = registry().await;

    let mut alice = Actor::new("alice");
    alice.flags = 1;
    alice.headers = "v1".to_string();
    registry
        .push_actors(&[alice.clone()], &PushOptions::default())
        .await
        .unwrap();

    alice.flags = 2;
    alice.headers = "v2".to_string();
    registry
        .push_actors(&[alice], &PushOptions::default())
        .await
        .unwrap();

    let actors = registry.pull_actors(&PullOptions::default()).await.unwrap();
    assert_eq!(actors.len(), 1);
    assert_eq!(actors[0].flags, 2);
    assert_eq!(actors[0].headers, "v2");
}

#[tokio::test]
async fn append_only_keeps_first_pushed_fields() {
    let registry = registry().await;

    let mut alice = Actor::new("alice");
    alice.flags = 1;
    registry
        .push_actors(&[alice.clone()], &PushOptions::default())
        .await
        .unwrap();

    alice.flags = 9;
    registry
        .push_actors(&[alice], &PushOptions::append_only(100))
        .await
        .unwrap();

    let actors = registry.pull_actors(&PullOptions::default()).await.unwrap();
    assert_eq!(actors.len(), 1);
    assert_eq!(actors[0].flags, 1);
}

#[tokio::test]
async fn large_batches_are_chunked() {
    let registry = registry().await;

    let batch: Vec<Actor> = (0..5).map(|n| Actor::new(format!("actor-{n}"))).collect();
    registry
        .push_actors(&batch, &PushOptions::replace(2))
        .await
        .unwrap();

    let actors = registry.pull_actors(&PullOptions::default()).await.unwrap();
    assert_eq!(actors.len(), 5);
}

#[tokio::test]
async fn zero_batch_size_is_rejected() {
    let registry = registry().await;

    let result = registry
        .push_actors(&[Actor::new("alice")], &PushOptions::replace(0))
        .await;
    assert_eq!(result.unwrap_err(), RegistryError::InvalidBatchSize);
}

#[tokio::test]
async fn empty_names_are_rejected() {
    let registry = registry().await;

    let result = registry
        .push_actors(&[Actor::new("")], &PushOptions::default())
        .await;
    assert_eq!(result.unwrap_err(), RegistryError::EmptyName("actor"));

    let result = registry
        .push_labels(&[Label::new("", None)], &PushOptions::default())
        .await;
    assert_eq!(result.unwrap_err(), RegistryError::EmptyName("label"));
}

#[tokio::test]
async fn empty_named_ancestors_abort_the_whole_push() {
    let (registry, db) = registry_with_db().await;

    // The leaf label is fine; the empty name hides in its parent chain and
    // must still fail validation before anything is written.
    let mut batch = vec![Transaction::new(
        march(1),
        -10,
        Label::new("groceries", Some(Label::new("", None))),
        Actor::new("alice"),
        Actor::new("shop"),
        Vec::new(),
    )];
    let result = registry
        .push_transactions(&mut batch, &PushOptions::default())
        .await;
    assert_eq!(result.unwrap_err(), RegistryError::EmptyName("label"));

    assert_eq!(count_rows(&db, "labels").await, 0);
    assert_eq!(count_rows(&db, "actors").await, 0);
    assert_eq!(count_rows(&db, "transactions").await, 0);
}

#[tokio::test]
async fn label_chains_are_flattened_into_stored_rows() {
    let registry = registry().await;

    let mut chain = Label::new("level-0", None);
    for depth in 1..10 {
        chain = Label::new(format!("level-{depth}"), Some(chain));
    }
    let batch = vec![chain, Label::new("standalone", None)];
    registry
        .push_labels(&batch, &PushOptions::default())
        .await
        .unwrap();

    let labels = registry.pull_labels(&PullOptions::default()).await.unwrap();
    assert_eq!(labels.len(), 11);

    // Sorted by name: level-0 through level-9, then standalone.
    assert_eq!(labels[0].name, "level-0");
    assert!(labels[0].parent.is_none());
    assert_eq!(labels[10].name, "standalone");
    assert!(labels[10].parent.is_none());

    // Parents come back resolved one level deep; the grandparent stays a
    // name reference.
    let level_5 = &labels[5];
    assert_eq!(level_5.name, "level-5");
    let parent = level_5.parent.as_ref().and_then(LabelParent::node).unwrap();
    assert_eq!(parent.name, "level-4");
    assert_eq!(
        parent.parent,
        Some(LabelParent::Name("level-3".to_string()))
    );
}

#[tokio::test]
async fn mismatched_details_abort_the_whole_push() {
    let (registry, db) = registry_with_db().await;

    let mut batch = vec![Transaction::new(
        march(1),
        -100,
        Label::new("groceries", None),
        Actor::new("alice"),
        Actor::new("shop"),
        vec![
            (Label::new("fruit", None), 30),
            (Label::new("bread", None), 50),
        ],
    )];
    let result = registry
        .push_transactions(&mut batch, &PushOptions::default())
        .await;
    assert_eq!(
        result.unwrap_err(),
        RegistryError::DetailSumMismatch {
            expected: 100,
            actual: 80
        }
    );

    // Validation runs before any write: no transactions, no details, no
    // auto-created references.
    assert_eq!(count_rows(&db, "transactions").await, 0);
    assert_eq!(count_rows(&db, "details").await, 0);
    assert_eq!(count_rows(&db, "actors").await, 0);
    assert_eq!(count_rows(&db, "labels").await, 0);

    batch[0].details[1].amount = 70;
    registry
        .push_transactions(&mut batch, &PushOptions::default())
        .await
        .unwrap();

    let pulled = registry
        .pull_transactions(&PullOptions::default())
        .await
        .unwrap();
    assert_eq!(pulled.len(), 1);
    assert_eq!(pulled[0].details.len(), 2);
    let total: i64 = pulled[0].details.iter().map(|detail| detail.amount).sum();
    assert_eq!(total, 100);
}

#[tokio::test]
async fn negative_detail_amounts_abort_the_whole_push() {
    let (registry, db) = registry_with_db().await;

    let mut batch = vec![Transaction::new(
        march(1),
        100,
        Label::new("groceries", None),
        Actor::new("shop"),
        Actor::new("alice"),
        vec![
            (Label::new("discount", None), -50),
            (Label::new("bread", None), 150),
        ],
    )];
    let result = registry
        .push_transactions(&mut batch, &PushOptions::default())
        .await;
    assert_eq!(result.unwrap_err(), RegistryError::NegativeDetailAmount(-50));
    assert_eq!(count_rows(&db, "transactions").await, 0);
    assert_eq!(count_rows(&db, "details").await, 0);
}

#[tokio::test]
async fn bare_name_references_are_auto_created() {
    let registry = registry().await;

    let mut batch = vec![Transaction {
        uuid: None,
        date: march(2),
        amount: -40,
        label: LabelRef::Name("misc".to_string()),
        sender: ActorRef::Name("alice".to_string()),
        receiver: ActorRef::Name("shop".to_string()),
        flags: 0,
        headers: String::new(),
        details: Vec::new(),
    }];
    registry
        .push_transactions(&mut batch, &PushOptions::default())
        .await
        .unwrap();

    let actors = registry.pull_actors(&PullOptions::default()).await.unwrap();
    assert_eq!(actors.len(), 2);
    assert_eq!(actors[0].name, "alice");
    assert_eq!(actors[1].name, "shop");

    let labels = registry.pull_labels(&PullOptions::default()).await.unwrap();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].name, "misc");

    let pulled = registry
        .pull_transactions(&PullOptions::default())
        .await
        .unwrap();
    assert_eq!(pulled.len(), 1);
    assert!(pulled[0].sender.actor().is_some());
    assert!(pulled[0].receiver.actor().is_some());
    assert!(pulled[0].label.label().is_some());
}

#[tokio::test]
async fn dependencies_never_clobber_existing_rows() {
    let registry = registry().await;

    let mut shop = Actor::new("shop");
    shop.flags = 7;
    registry
        .push_actors(&[shop], &PushOptions::default())
        .await
        .unwrap();

    // The embedded record carries different metadata, but references are
    // written append-only and must leave the stored row alone.
    let mut batch = vec![Transaction::new(
        march(3),
        -10,
        Label::new("misc", None),
        Actor::new("alice"),
        Actor::new("shop"),
        Vec::new(),
    )];
    registry
        .push_transactions(&mut batch, &PushOptions::default())
        .await
        .unwrap();

    let actors = registry.pull_actors(&PullOptions::default()).await.unwrap();
    let stored = actors.iter().find(|actor| actor.name == "shop").unwrap();
    assert_eq!(stored.flags, 7);
}

#[tokio::test]
async fn replacing_a_transaction_preserves_date_and_amount() {
    let registry = registry().await;

    let mut batch = vec![Transaction::new(
        march(4),
        -500,
        Label::new("misc", None),
        Actor::new("alice"),
        Actor::new("shop"),
        Vec::new(),
    )];
    registry
        .push_transactions(&mut batch, &PushOptions::default())
        .await
        .unwrap();
    let uuid = batch[0].uuid;
    assert!(uuid.is_some());

    let mut rewrite = vec![Transaction {
        uuid,
        date: march(20),
        amount: -9999,
        label: LabelRef::Name("misc".to_string()),
        sender: ActorRef::Name("alice".to_string()),
        receiver: ActorRef::Name("shop".to_string()),
        flags: 5,
        headers: "revised".to_string(),
        details: Vec::new(),
    }];
    registry
        .push_transactions(&mut rewrite, &PushOptions::default())
        .await
        .unwrap();

    let pulled = registry
        .pull_transactions(&PullOptions::default())
        .await
        .unwrap();
    assert_eq!(pulled.len(), 1);
    assert_eq!(pulled[0].uuid, uuid);
    assert_eq!(pulled[0].date, march(4));
    assert_eq!(pulled[0].amount, -500);
    assert_eq!(pulled[0].flags, 5);
    assert_eq!(pulled[0].headers, "revised");
}

#[tokio::test]
async fn append_only_transactions_skip_existing_rows() {
    let registry = registry().await;

    let mut batch = vec![Transaction::new(
        march(5),
        -25,
        Label::new("misc", None),
        Actor::new("alice"),
        Actor::new("shop"),
        Vec::new(),
    )];
    registry
        .push_transactions(&mut batch, &PushOptions::default())
        .await
        .unwrap();

    batch[0].flags = 3;
    registry
        .push_transactions(&mut batch, &PushOptions::append_only(100))
        .await
        .unwrap();

    let pulled = registry
        .pull_transactions(&PullOptions::default())
        .await
        .unwrap();
    assert_eq!(pulled.len(), 1);
    assert_eq!(pulled[0].flags, 0);
}

#[tokio::test]
async fn pulls_are_ordered_and_paginated() {
    let registry = registry().await;

    // Pushed out of date order on purpose.
    for day in [3, 1, 4, 2] {
        let mut batch = vec![Transaction::new(
            march(day),
            -10,
            Label::new("misc", None),
            Actor::new("alice"),
            Actor::new("shop"),
            Vec::new(),
        )];
        registry
            .push_transactions(&mut batch, &PushOptions::default())
            .await
            .unwrap();
    }

    let first_page = registry
        .pull_transactions(&PullOptions { limit: 2, offset: 0 })
        .await
        .unwrap();
    assert_eq!(
        first_page.iter().map(|tx| tx.date).collect::<Vec<_>>(),
        vec![march(1), march(2)]
    );

    let second_page = registry
        .pull_transactions(&PullOptions { limit: 2, offset: 2 })
        .await
        .unwrap();
    assert_eq!(
        second_page.iter().map(|tx| tx.date).collect::<Vec<_>>(),
        vec![march(3), march(4)]
    );

    let everything = registry
        .pull_transactions(&PullOptions::default())
        .await
        .unwrap();
    assert_eq!(everything.len(), 4);
}

#[tokio::test]
async fn generated_uuids_are_assigned_back_to_the_caller() {
    let registry = registry().await;

    let mut batch = vec![
        Transaction::new(
            march(6),
            -10,
            Label::new("misc", None),
            Actor::new("alice"),
            Actor::new("shop"),
            Vec::new(),
        ),
        Transaction::new(
            march(7),
            -20,
            Label::new("misc", None),
            Actor::new("alice"),
            Actor::new("shop"),
            Vec::new(),
        ),
    ];
    registry
        .push_transactions(&mut batch, &PushOptions::default())
        .await
        .unwrap();

    assert!(batch.iter().all(|tx| tx.uuid.is_some()));
    assert_ne!(batch[0].uuid, batch[1].uuid);

    let pulled = registry
        .pull_transactions(&PullOptions::default())
        .await
        .unwrap();
    assert_eq!(pulled[0].uuid, batch[0].uuid);
    assert_eq!(pulled[1].uuid, batch[1].uuid);
}

#[tokio::test]
async fn detail_labels_and_ancestors_are_written_with_the_transaction() {
    let registry = registry().await;

    let food = Label::new("food", None);
    let mut batch = vec![Transaction::new(
        march(8),
        -80,
        Label::new("groceries", Some(food.clone())),
        Actor::new("alice"),
        Actor::new("shop"),
        vec![
            (Label::new("fruit", Some(food)), 30),
            (Label::new("bread", None), 50),
        ],
    )];
    registry
        .push_transactions(&mut batch, &PushOptions::default())
        .await
        .unwrap();

    let labels = registry.pull_labels(&PullOptions::default()).await.unwrap();
    let names: Vec<&str> = labels.iter().map(|label| label.name.as_str()).collect();
    assert_eq!(names, vec!["bread", "food", "fruit", "groceries"]);

    let pulled = registry
        .pull_transactions(&PullOptions::default())
        .await
        .unwrap();
    assert_eq!(pulled[0].details.len(), 2);
    assert!(pulled[0]
        .details
        .iter()
        .all(|detail| detail.label.label().is_some()));
}

#[tokio::test]
async fn uninstall_drops_every_table() {
    let (_registry, db) = registry_with_db().await;

    Migrator::down(&db, None).await.unwrap();

    let result = db
        .query_one(Statement::from_string(
            DbBackend::Sqlite,
            "SELECT COUNT(*) AS n FROM transactions".to_string(),
        ))
        .await;
    assert!(result.is_err());
}

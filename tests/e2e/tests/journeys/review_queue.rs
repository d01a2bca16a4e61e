//! Journey: create cards, pull them off the due queue, submit client-side
//! review results.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use serde_json::json;
use zidian_core::{
    apply_review, create_card, select_all_due, select_next_due, CardFields, CardState, CardUpdate,
    Error, NewCard,
};
use zidian_e2e_tests::{mocks::CardTemplate, TestDataFactory, TestDatabaseManager};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    TestDataFactory::date(y, m, d)
}

fn at(day: NaiveDate, hour: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_hms_opt(hour, 0, 0).unwrap())
}

#[test]
fn test_create_select_review_select() {
    let db = TestDatabaseManager::new_temp();
    let entry = TestDataFactory::create_entry(&db.storage, "你", "nǐ");
    let card = TestDataFactory::create_card(
        &db.storage,
        entry.id,
        &CardTemplate::new(date(2024, 1, 1), 2.5, 5.0).with_state(CardState::New),
    );

    let next = select_next_due(&db.storage, &at(date(2024, 1, 2), 9)).unwrap();
    assert_eq!(next.as_ref().map(|c| c.id), Some(card.id));

    let update = CardUpdate::from_json(&json!({
        "due": "2024-01-05",
        "stability": 3.0,
        "difficulty": 5.0,
        "elapsed_days": 1,
        "scheduled_days": 3,
        "reps": 1,
        "lapses": 0,
        "state": "learning",
        "last_review": "2024-01-02"
    }))
    .unwrap();
    let stored = apply_review(&db.storage, card.id, &update).unwrap();
    assert_eq!(stored.due, date(2024, 1, 5));
    assert_eq!(stored.state, CardState::Learning);

    assert!(select_next_due(&db.storage, &at(date(2024, 1, 2), 18)).unwrap().is_none());
    assert_eq!(
        select_next_due(&db.storage, &at(date(2024, 1, 5), 0)).unwrap().map(|c| c.id),
        Some(card.id)
    );
}

#[test]
fn test_json_card_reviewed_out_of_todays_queue() {
    let db = TestDatabaseManager::new_temp();
    let entry = TestDataFactory::create_entry(&db.storage, "你", "nǐ");

    let new_card = NewCard::from_json(&json!({
        "entry_id": entry.id,
        "due": "2024-01-01",
        "stability": 2.5,
        "difficulty": 5.0,
        "elapsed_days": 0,
        "scheduled_days": 1,
        "reps": 0,
        "lapses": 0,
        "state": "new"
    }))
    .unwrap();
    let card = create_card(&db.storage, &new_card).unwrap();
    assert!(card.id > 0);
    assert_eq!(card.last_review, None);

    let now = at(date(2024, 1, 2), 0);
    assert_eq!(select_next_due(&db.storage, &now).unwrap(), Some(card.clone()));

    let update = CardUpdate::from_json(&json!({
        "due": "2024-01-05",
        "stability": 3.1,
        "difficulty": 4.8,
        "elapsed_days": 1,
        "scheduled_days": 4,
        "reps": 1,
        "lapses": 0,
        "state": "review",
        "last_review": "2024-01-01"
    }))
    .unwrap();
    let stored = apply_review(&db.storage, card.id, &update).unwrap();
    assert_eq!(stored.state, CardState::Review);
    assert_eq!(stored.last_review, Some(date(2024, 1, 1)));
    assert_eq!(stored.stability, 3.1);
    assert_eq!(stored.difficulty, 4.8);

    assert_eq!(select_next_due(&db.storage, &now).unwrap(), None);
}

#[test]
fn test_far_future_due_never_enters_queue() {
    let db = TestDatabaseManager::new_temp();
    let entry = TestDataFactory::create_entry(&db.storage, "未来", "wèilái");
    let now = at(date(2024, 1, 2), 12);

    let far = NewCard::new(entry.id, CardFields::new_on(date(10000, 1, 1)));
    let err = create_card(&db.storage, &far).unwrap_err();
    assert!(matches!(err, Error::Validation(ref v) if v.has_field("due")));

    let ids = db.seed_due_cards(date(2024, 1, 1), 1);
    let mut fields = db.card(ids[0]).fields();
    fields.due = date(10000, 1, 1);
    assert!(apply_review(&db.storage, ids[0], &CardUpdate::from(fields)).is_err());

    assert_eq!(select_next_due(&db.storage, &now).unwrap().map(|c| c.id), Some(ids[0]));
    assert_eq!(db.card(ids[0]).due, date(2024, 1, 1));
}

#[test]
fn test_queue_drains_in_urgency_order() {
    let db = TestDatabaseManager::new_temp();
    let cards = TestDataFactory::create_mixed_queue(&db.storage);
    let now = at(date(2024, 1, 2), 12);

    // Push each selected card past the horizon and record the order
    let mut order = Vec::new();
    while let Some(card) = select_next_due(&db.storage, &now).unwrap() {
        order.push(card.id);
        let mut fields = card.fields();
        fields.due = date(2025, 1, 1);
        apply_review(&db.storage, card.id, &CardUpdate::from(fields)).unwrap();
    }

    let expected: Vec<i64> = [3, 2, 1, 0].iter().map(|&i| cards[i].id).collect();
    assert_eq!(order, expected);
    assert_eq!(db.card(cards[4].id).due, date(2024, 2, 1));
}

#[test]
fn test_due_boundary_uses_callers_calendar_day() {
    let db = TestDatabaseManager::new_temp();
    let ids = db.seed_due_cards(date(2024, 3, 10), 2);

    let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
    let late_utc = at(date(2024, 3, 9), 20);
    assert!(select_all_due(&db.storage, &late_utc).unwrap().is_empty());

    let due = select_all_due(&db.storage, &late_utc.with_timezone(&tokyo)).unwrap();
    assert_eq!(due.len(), 2);
    assert_eq!(
        select_next_due(&db.storage, &late_utc.with_timezone(&tokyo)).unwrap().map(|c| c.id),
        Some(ids[0])
    );
}

#[test]
fn test_rejected_update_leaves_card_untouched() {
    let db = TestDatabaseManager::new_temp();
    let ids = db.seed_due_cards(date(2024, 1, 1), 1);
    let before = db.card(ids[0]);

    let err = CardUpdate::from_json(&json!({
        "due": "2024-13-40",
        "stability": -2,
        "difficulty": 5,
        "elapsed_days": 0,
        "scheduled_days": 0,
        "reps": 0,
        "lapses": 0,
        "state": "archived"
    }))
    .unwrap_err();
    assert!(err.has_field("due"));
    assert!(err.has_field("stability"));
    assert!(err.has_field("state"));

    let missing = apply_review(&db.storage, ids[0] + 100, &CardUpdate::from(before.fields()));
    assert!(matches!(missing, Err(Error::NotFound { .. })));
    assert_eq!(db.card(ids[0]), before);
}

#[test]
fn test_queue_survives_reopening_database_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("queue.db");
    let now = at(date(2024, 1, 2), 12);

    let ids = TestDatabaseManager::new_at_path(path.clone()).seed_due_cards(date(2024, 1, 1), 3);

    let db = TestDatabaseManager::new_at_path(path);
    let mut due: Vec<i64> = select_all_due(&db.storage, &now)
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    due.sort();
    assert_eq!(due, ids);
}

#[test]
fn test_repeated_update_is_idempotent_and_persistent() {
    let mut db = TestDatabaseManager::new_temp();
    let ids = db.seed_due_cards(date(2024, 1, 1), 1);

    let fields = CardFields {
        due: date(2024, 1, 20),
        stability: 12.0,
        difficulty: 3.5,
        elapsed_days: 4,
        scheduled_days: 19,
        reps: 5,
        lapses: 1,
        state: CardState::Review,
        last_review: Some(date(2024, 1, 1)),
    };
    let update = CardUpdate::from(fields.clone());
    apply_review(&db.storage, ids[0], &update).unwrap();
    apply_review(&db.storage, ids[0], &update).unwrap();

    db.reopen();
    assert_eq!(db.card(ids[0]).fields(), fields);
}

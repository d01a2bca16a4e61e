//! Journey: grade cards and let the FSRS scheduler move them through
//! new -> learning -> review -> relearning.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use zidian_core::{
    apply_review, review_card, review_history, CardState, CardUpdate, Error, FsrsScheduler,
    Rating,
};
use zidian_e2e_tests::{mocks::CardTemplate, TestDataFactory, TestDatabaseManager};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    TestDataFactory::date(y, m, d)
}

fn morning(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_hms_opt(8, 0, 0).unwrap())
}

#[test]
fn test_card_lifecycle_through_all_states() {
    let db = TestDatabaseManager::new_temp();
    let scheduler = FsrsScheduler::default();
    let entry = TestDataFactory::create_entry(&db.storage, "朋友", "péngyou");
    let card = TestDataFactory::create_card(
        &db.storage,
        entry.id,
        &CardTemplate::new(date(2024, 1, 1), 0.0, 0.0).with_state(CardState::New),
    );

    // First sighting: stays in short-term learning, due again today
    let day1 = date(2024, 1, 1);
    let first = review_card(&db.storage, &scheduler, card.id, Rating::Good, &morning(day1)).unwrap();
    assert_eq!(first.card.state, CardState::Learning);
    assert_eq!(first.card.due, day1);
    assert_eq!(first.card.last_review, Some(day1));

    // Graduates to review with a real interval
    let second = review_card(&db.storage, &scheduler, card.id, Rating::Good, &morning(day1)).unwrap();
    assert_eq!(second.card.state, CardState::Review);
    assert!(second.card.scheduled_days >= 1);
    assert!(second.card.due > day1);

    // Forgotten on the due day: lapse into relearning
    let due = second.card.due;
    let lapse = review_card(&db.storage, &scheduler, card.id, Rating::Again, &morning(due)).unwrap();
    assert_eq!(lapse.card.state, CardState::Relearning);
    assert_eq!(lapse.card.lapses, 1);
    assert_eq!(lapse.card.due, due);
    assert!(lapse.card.stability < second.card.stability);

    assert_eq!(lapse.card.reps, 3);
    let history = review_history(&db.storage, card.id).unwrap();
    let ratings: Vec<Rating> = history.iter().map(|l| l.review_rating).collect();
    assert_eq!(ratings, vec![Rating::Good, Rating::Good, Rating::Again]);
}

#[test]
fn test_easier_ratings_schedule_further_out() {
    let db = TestDatabaseManager::new_temp();
    let scheduler = FsrsScheduler::default();
    let entry = TestDataFactory::create_entry(&db.storage, "电脑", "diànnǎo");
    let today = date(2024, 6, 1);

    let mut intervals = Vec::new();
    for rating in [Rating::Hard, Rating::Good, Rating::Easy] {
        let mut template = CardTemplate::new(today, 10.0, 5.0);
        template.state = CardState::Review;
        let card = TestDataFactory::create_card(&db.storage, entry.id, &template);

        // Last reviewed ten days ago
        let mut fields = card.fields();
        fields.last_review = Some(date(2024, 5, 22));
        apply_review(&db.storage, card.id, &CardUpdate::from(fields)).unwrap();

        let outcome = review_card(&db.storage, &scheduler, card.id, rating, &morning(today)).unwrap();
        assert_eq!(outcome.card.elapsed_days, 10);
        intervals.push(outcome.card.scheduled_days);
    }

    assert!(intervals[0] <= intervals[1]);
    assert!(intervals[1] < intervals[2]);
}

#[test]
fn test_reviewing_missing_card_fails_cleanly() {
    let db = TestDatabaseManager::new_temp();
    let scheduler = FsrsScheduler::default();
    let result = review_card(&db.storage, &scheduler, 42, Rating::Good, &morning(date(2024, 1, 1)));
    assert!(matches!(result, Err(Error::NotFound { kind: "Card", id: 42 })));
    assert!(db.is_empty());
}

//! Journey: build up the dictionary and attach cards to its entries.

use serde_json::json;
use zidian_core::{
    create_card, create_definition, create_example, find_cards_by_entry, get_entry, seed_sample,
    CardFields, Error, NewCard, NewDefinition, NewExample,
};
use zidian_e2e_tests::{TestDataFactory, TestDatabaseManager};

#[test]
fn test_seeded_sample_is_browsable() {
    let db = TestDatabaseManager::new_temp();
    db.seed_dictionary();

    let entries = db.storage.entries_by_word("你").unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].pinyin, "nǐ");

    let definitions = db.storage.definitions_by_entry(entries[0].id).unwrap();
    assert_eq!(definitions[0].definition, "称对方（一个人）");

    let examples = db.storage.examples_by_definition(definitions[0].id).unwrap();
    assert_eq!(examples[0].sentence, "你好，世界。");

    // Seeding twice does not duplicate
    assert!(!seed_sample(&db.storage).unwrap());
    assert_eq!(db.entry_count(), 1);
}

#[test]
fn test_building_an_entry_and_drilling_it() {
    let db = TestDatabaseManager::new_temp();
    let entry = TestDataFactory::create_entry(&db.storage, "吃", "chī");

    let definition = create_definition(
        &db.storage,
        &NewDefinition::from_json(&json!({
            "entry_id": entry.id,
            "part": "动",
            "definition": "把食物等放到嘴里经过咀嚼咽下去"
        }))
        .unwrap(),
    )
    .unwrap();
    create_example(
        &db.storage,
        &NewExample {
            definition_id: definition.id,
            sentence: "我们去吃饭吧。".to_string(),
        },
    )
    .unwrap();

    assert_eq!(get_entry(&db.storage, entry.id).unwrap(), entry);

    let new_card = NewCard::from_json(&json!({
        "entry_id": entry.id,
        "type": "cloze",
        "due": "2024-04-01T10:30:00+08:00",
        "stability": 0,
        "difficulty": 0,
        "elapsed_days": 0,
        "scheduled_days": 0,
        "reps": 0,
        "lapses": 0,
        "state": "new",
        "last_review": null
    }))
    .unwrap();
    let card = create_card(&db.storage, &new_card).unwrap();
    assert_eq!(card.due, TestDataFactory::date(2024, 4, 1));

    let cards = find_cards_by_entry(&db.storage, entry.id).unwrap();
    assert_eq!(cards, vec![card.clone()]);

    let json = serde_json::to_value(&card).unwrap();
    assert_eq!(json["type"], "cloze");
    assert_eq!(json["state"], "new");
    assert_eq!(json["version"], 1);
}

#[test]
fn test_orphans_are_rejected() {
    let db = TestDatabaseManager::new_temp();

    let card = create_card(
        &db.storage,
        &NewCard::new(77, CardFields::new_on(TestDataFactory::date(2024, 1, 1))),
    );
    assert!(matches!(card, Err(Error::NotFound { kind: "Entry", id: 77 })));

    let example = create_example(
        &db.storage,
        &NewExample {
            definition_id: 5,
            sentence: "孤儿。".to_string(),
        },
    );
    assert!(matches!(example, Err(Error::NotFound { kind: "Definition", .. })));
    assert!(db.is_empty());
}

#[test]
fn test_lookup_finds_only_matching_word() {
    let db = TestDatabaseManager::new_temp();
    let entries = TestDataFactory::create_entries(&db.storage, 4);
    assert_eq!(db.entry_count(), 4);

    let found = db.storage.entries_by_word("词2").unwrap();
    assert_eq!(found, vec![entries[2].clone()]);
    assert!(db.storage.entries_by_word("词9").unwrap().is_empty());
}

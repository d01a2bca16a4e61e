//! Review Update Transaction
//!
//! Creating cards, writing post-review snapshots and recording review events.
//! Validation always runs before anything touches the store.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::card::{Card, CardUpdate, NewCard, ReviewLog};
use crate::error::{Error, Result};
use crate::schedule::{Rating, Scheduler};
use crate::storage::{CardStore, ReplaceOutcome};

/// Card and log written by a scheduler-backed review
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewOutcome {
    pub card: Card,
    pub log: ReviewLog,
}

/// Validate and persist a new card for an existing entry
pub fn create_card<S: CardStore + ?Sized>(store: &S, new_card: &NewCard) -> Result<Card> {
    new_card.validate()?;
    if !store.entry_exists(new_card.entry_id)? {
        return Err(Error::entry_not_found(new_card.entry_id));
    }

    let card = store.insert_card(new_card)?;
    tracing::info!(
        card_id = card.id,
        entry_id = card.entry_id,
        due = %card.due,
        "Created card"
    );
    Ok(card)
}

/// Overwrite every scheduling field of `card_id` with `update`.
///
/// Repeating the same update leaves the card fields unchanged. Only the
/// store-managed `version` moves on.
pub fn apply_review<S: CardStore + ?Sized>(
    store: &S,
    card_id: i64,
    update: &CardUpdate,
) -> Result<Card> {
    update.fields.validate()?;

    match store.replace_card(card_id, &update.fields, update.expected_version)? {
        ReplaceOutcome::Replaced(card) => {
            tracing::info!(
                card_id,
                state = %card.state,
                due = %card.due,
                version = card.version,
                "Applied review update"
            );
            Ok(card)
        }
        ReplaceOutcome::Missing => Err(Error::card_not_found(card_id)),
        ReplaceOutcome::VersionMismatch { actual } => {
            let expected = update.expected_version.unwrap_or(actual);
            tracing::warn!(card_id, expected, actual, "Rejected stale card update");
            Err(Error::Conflict {
                id: card_id,
                expected,
                actual,
            })
        }
    }
}

/// Grade card `card_id`, let `scheduler` compute its next state, persist it
/// and append a review log.
///
/// The update carries the loaded version, so a concurrent write between the
/// read and the update surfaces as `Conflict` instead of being overwritten.
/// The log is appended after the card write and is not part of the same
/// statement.
pub fn review_card<S, Tz>(
    store: &S,
    scheduler: &dyn Scheduler,
    card_id: i64,
    rating: Rating,
    now: &DateTime<Tz>,
) -> Result<ReviewOutcome>
where
    S: CardStore + ?Sized,
    Tz: TimeZone,
{
    let card = store
        .get_card(card_id)?
        .ok_or_else(|| Error::card_not_found(card_id))?;

    let fields = scheduler.compute_next_state(&card, rating, now.date_naive());
    let update = CardUpdate {
        fields,
        expected_version: Some(card.version),
    };
    let card = apply_review(store, card_id, &update)?;
    let log = store.append_review_log(card_id, now.with_timezone(&Utc), rating)?;

    tracing::info!(
        card_id,
        rating = rating.name(),
        scheduled_days = card.scheduled_days,
        "Recorded review"
    );
    Ok(ReviewOutcome { card, log })
}

/// All cards drilling `entry_id`, oldest first
pub fn find_cards_by_entry<S: CardStore + ?Sized>(store: &S, entry_id: i64) -> Result<Vec<Card>> {
    Ok(store.cards_for_entry(entry_id)?)
}

/// Review history of a card; `NotFound` when the card does not exist
pub fn review_history<S: CardStore + ?Sized>(store: &S, card_id: i64) -> Result<Vec<ReviewLog>> {
    if store.get_card(card_id)?.is_none() {
        return Err(Error::card_not_found(card_id));
    }
    Ok(store.review_logs(card_id)?)
}

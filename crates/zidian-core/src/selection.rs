//! Due Selection
//!
//! Picks the single most urgent card to study next. Urgency is:
//! 1. earliest `due` date
//! 2. lowest `stability` (weakest memory first)
//! 3. highest `difficulty`
//! 4. lowest `id`, so the pick is deterministic

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::card::Card;
use crate::error::Result;
use crate::storage::CardStore;

/// Urgency ordering of two cards; `Less` means `a` should be studied first.
pub fn due_order(a: &Card, b: &Card) -> Ordering {
    a.due
        .cmp(&b.due)
        .then_with(|| a.stability.total_cmp(&b.stability))
        .then_with(|| b.difficulty.total_cmp(&a.difficulty))
        .then_with(|| a.id.cmp(&b.id))
}

/// Most urgent card due on the calendar date of `now`, in `now`'s own zone.
///
/// `Ok(None)` when nothing is due.
pub fn select_next_due<S, Tz>(store: &S, now: &DateTime<Tz>) -> Result<Option<Card>>
where
    S: CardStore + ?Sized,
    Tz: TimeZone,
{
    next_due_on(store, now.date_naive())
}

/// Most urgent card with `due <= today`
pub fn next_due_on<S: CardStore + ?Sized>(store: &S, today: NaiveDate) -> Result<Option<Card>> {
    let candidates = store.cards_due_on_or_before(today)?;
    let count = candidates.len();
    let next = candidates.into_iter().min_by(due_order);

    tracing::debug!(
        %today,
        candidates = count,
        selected = next.as_ref().map(|c| c.id),
        "Selected next due card"
    );
    Ok(next)
}

/// Every card due on the date of `now`, in store order
pub fn select_all_due<S, Tz>(store: &S, now: &DateTime<Tz>) -> Result<Vec<Card>>
where
    S: CardStore + ?Sized,
    Tz: TimeZone,
{
    let today = now.date_naive();
    let cards = store.cards_due_on_or_before(today)?;
    tracing::debug!(%today, count = cards.len(), "Listed due cards");
    Ok(cards)
}

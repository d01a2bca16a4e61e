//! API endpoint handlers

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::Local;
use serde_json::{json, Value};

use zidian_core::{
    apply_review, create_card as create_card_record, create_definition as insert_definition,
    create_entry as insert_entry, create_example as insert_example, find_cards_by_entry,
    get_entry as load_entry, review_card as grade_card, review_history, select_all_due,
    select_next_due, Card, CardUpdate, Definition, Entry, Example, NewCard, NewDefinition,
    NewEntry, NewExample, Rating, ReviewLog, ReviewOutcome, ValidationError,
};

use super::ApiError;
use crate::state::AppState;

type ApiResult<T> = Result<T, ApiError>;

const NOTHING_DUE: &str = "No cards are due for review.";

// ============================================================================
// CARDS
// ============================================================================

/// Most urgent due card, or a message when nothing is due
pub async fn next_due_card(State(state): State<AppState>) -> ApiResult<Response> {
    let now = Local::now();
    let next = state
        .blocking(move |storage, _| select_next_due(storage, &now))
        .await?;

    Ok(match next {
        Some(card) => Json(card).into_response(),
        None => Json(json!({ "message": NOTHING_DUE })).into_response(),
    })
}

/// Every due card, unordered
pub async fn list_due_cards(State(state): State<AppState>) -> ApiResult<Json<Vec<Card>>> {
    let now = Local::now();
    let cards = state
        .blocking(move |storage, _| select_all_due(storage, &now))
        .await?;
    Ok(Json(cards))
}

pub async fn create_card(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Card>)> {
    let Json(body) = payload?;
    let new_card = NewCard::from_json(&body)?;
    let card = state
        .blocking(move |storage, _| create_card_record(storage, &new_card))
        .await?;
    Ok((StatusCode::CREATED, Json(card)))
}

/// Full-replace update with a client-computed snapshot
pub async fn update_card(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Card>> {
    let Path(id) = path?;
    let Json(body) = payload?;
    let update = CardUpdate::from_json(&body)?;
    let card = state
        .blocking(move |storage, _| apply_review(storage, id, &update))
        .await?;
    Ok(Json(card))
}

pub async fn cards_for_entry(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<Card>>> {
    let Path(entry_id) = path?;
    let cards = state
        .blocking(move |storage, _| find_cards_by_entry(storage, entry_id))
        .await?;
    Ok(Json(cards))
}

/// Grade a card and let the server-side scheduler compute its next state
pub async fn review_card(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<ReviewOutcome>> {
    let Path(id) = path?;
    let Json(body) = payload?;
    let rating = body
        .get("rating")
        .and_then(|v| v.as_i64().or_else(|| v.as_str()?.trim().parse().ok()))
        .and_then(Rating::from_i64)
        .ok_or_else(|| ValidationError::single("rating", "must be an integer from 1 to 4"))?;

    let now = Local::now();
    let outcome = state
        .blocking(move |storage, scheduler| grade_card(storage, scheduler, id, rating, &now))
        .await?;
    Ok(Json(outcome))
}

pub async fn card_logs(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<ReviewLog>>> {
    let Path(id) = path?;
    let logs = state
        .blocking(move |storage, _| review_history(storage, id))
        .await?;
    Ok(Json(logs))
}

// ============================================================================
// DICTIONARY
// ============================================================================

pub async fn create_entry(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Entry>)> {
    let Json(body) = payload?;
    let input = NewEntry::from_json(&body)?;
    let entry = state
        .blocking(move |storage, _| insert_entry(storage, &input))
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn create_definition(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Definition>)> {
    let Json(body) = payload?;
    let input = NewDefinition::from_json(&body)?;
    let definition = state
        .blocking(move |storage, _| insert_definition(storage, &input))
        .await?;
    Ok((StatusCode::CREATED, Json(definition)))
}

pub async fn create_example(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Example>)> {
    let Json(body) = payload?;
    let input = NewExample::from_json(&body)?;
    let example = state
        .blocking(move |storage, _| insert_example(storage, &input))
        .await?;
    Ok((StatusCode::CREATED, Json(example)))
}

/// Entries whose headword matches exactly
pub async fn entries_by_word(
    State(state): State<AppState>,
    Path(word): Path<String>,
) -> ApiResult<Json<Vec<Entry>>> {
    let entries = state
        .blocking(move |storage, _| Ok(storage.entries_by_word(&word)?))
        .await?;
    Ok(Json(entries))
}

pub async fn get_entry(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Entry>> {
    let Path(id) = path?;
    let entry = state
        .blocking(move |storage, _| load_entry(storage, id))
        .await?;
    Ok(Json(entry))
}

pub async fn definitions_by_entry(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<Definition>>> {
    let Path(entry_id) = path?;
    let definitions = state
        .blocking(move |storage, _| Ok(storage.definitions_by_entry(entry_id)?))
        .await?;
    Ok(Json(definitions))
}

pub async fn examples_by_definition(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<Example>>> {
    let Path(definition_id) = path?;
    let examples = state
        .blocking(move |storage, _| Ok(storage.examples_by_definition(definition_id)?))
        .await?;
    Ok(Json(examples))
}

// ============================================================================
// HEALTH
// ============================================================================

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": zidian_core::VERSION,
    }))
}

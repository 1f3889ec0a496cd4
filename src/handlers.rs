use crate::errors::AppError;
use crate::models::{
    ChargeEntry, ChargeRequest, ChargeResponse, EffectSnapshot, EffectsQuery, HistoryQuery,
    HistoryResponse, ViewRequest,
};
use crate::state::AppState;
use crate::ui::render_index;
use crate::view::{EffectView, ViewId};
use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use chrono::{Local, NaiveDate};
use tracing::warn;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let view = state.views.issue_id();
    Html(render_index(&today_string(), state.charge_rate, view))
}

pub async fn log_charge(
    State(state): State<AppState>,
    Json(payload): Json<ChargeRequest>,
) -> Result<Json<ChargeResponse>, AppError> {
    let kwh = required_kwh(payload.kwh)?;
    let date = payload
        .date
        .as_deref()
        .map(str::trim)
        .filter(|date| !date.is_empty())
        .ok_or_else(|| AppError::bad_request("date is required"))?;

    let entry = ChargeEntry::new(sheet_date(date)?, kwh, state.charge_rate);
    if let Err(err) = state.client.log_charge(&entry).await {
        warn!("charge not logged: {err}");
        return Err(AppError::upstream("request failed, not logged", err));
    }

    let effects = match lookup(&state, payload.view).await {
        Some(view) => {
            let effects = view.celebrate().await;
            EffectSnapshot::new(view.is_active().await, &effects)
        }
        None => EffectSnapshot::default(),
    };

    Ok(Json(ChargeResponse {
        date: entry.date,
        kwh: entry.kwh,
        cost: entry.cost,
        effects,
    }))
}

pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, AppError> {
    let data = state
        .client
        .history(&query.start, &query.end)
        .await
        .map_err(|err| {
            warn!("history request failed: {err}");
            AppError::upstream("history request failed", err)
        })?;

    Ok(Json(HistoryResponse {
        start: query.start,
        end: query.end,
        data,
    }))
}

pub async fn get_effects(
    State(state): State<AppState>,
    Query(query): Query<EffectsQuery>,
) -> Json<EffectSnapshot> {
    let snapshot = match lookup(&state, query.view).await {
        Some(view) => snapshot(&view).await,
        None => EffectSnapshot::default(),
    };
    Json(snapshot)
}

pub async fn set_view(
    State(state): State<AppState>,
    Json(payload): Json<ViewRequest>,
) -> Json<EffectSnapshot> {
    if payload.active {
        let view = state.views.activate(payload.view).await;
        Json(snapshot(&view).await)
    } else {
        state.views.deactivate(payload.view).await;
        Json(EffectSnapshot::default())
    }
}

async fn lookup(state: &AppState, view: Option<ViewId>) -> Option<EffectView> {
    match view {
        Some(id) => state.views.get(id).await,
        None => None,
    }
}

async fn snapshot(view: &EffectView) -> EffectSnapshot {
    let effects = view.snapshot().await;
    EffectSnapshot::new(view.is_active().await, &effects)
}

/// Presence check only: a missing, zero or non-numeric amount is rejected.
fn required_kwh(kwh: Option<f64>) -> Result<f64, AppError> {
    kwh.filter(|kwh| kwh.is_finite() && *kwh != 0.0)
        .ok_or_else(|| AppError::bad_request("kwh is required"))
}

/// Converts a `YYYY-MM-DD` input into the sheet's `MM/DD/YYYY`.
fn sheet_date(input: &str) -> Result<String, AppError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(|date| date.format("%m/%d/%Y").to_string())
        .map_err(|_| AppError::bad_request("date must be YYYY-MM-DD"))
}

fn today_string() -> String {
    Local::now().date_naive().to_string()
}

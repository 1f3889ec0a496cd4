use crate::bolt::render_svg;
use crate::effects::EffectState;
use crate::view::ViewId;
use serde::{Deserialize, Serialize};

/// Body sent to the spreadsheet endpoint. `cost` is always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeEntry {
    pub date: String,
    pub kwh: f64,
    pub cost: f64,
}

impl ChargeEntry {
    pub fn new(date: String, kwh: f64, rate: f64) -> Self {
        Self {
            date,
            kwh,
            cost: round_cents(kwh * rate),
        }
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Deserialize)]
pub struct ChargeRequest {
    pub kwh: Option<f64>,
    /// `YYYY-MM-DD`, as produced by a date input.
    pub date: Option<String>,
    /// Page whose effects celebrate a successful log.
    pub view: Option<ViewId>,
}

#[derive(Debug, Serialize)]
pub struct ChargeResponse {
    pub date: String,
    pub kwh: f64,
    pub cost: f64,
    pub effects: EffectSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub start: String,
    pub end: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct ViewRequest {
    pub view: ViewId,
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct EffectsQuery {
    pub view: Option<ViewId>,
}

#[derive(Debug, Default, Serialize)]
pub struct EffectSnapshot {
    pub active: bool,
    pub strobe_active: bool,
    pub show_sparks: bool,
    pub bolt_visible: bool,
    pub confirmation_visible: bool,
    pub bolt_svg: Option<String>,
}

impl EffectSnapshot {
    pub fn new(active: bool, state: &EffectState) -> Self {
        Self {
            active,
            strobe_active: state.strobe_active,
            show_sparks: state.show_sparks,
            bolt_visible: state.bolt_visible,
            confirmation_visible: state.confirmation_visible,
            bolt_svg: state.bolt.as_ref().map(render_svg),
        }
    }
}

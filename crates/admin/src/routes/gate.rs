//! Pattern gate handlers.
//!
//! Every action is a form POST that updates the gate stored in the session
//! and redirects back to `GET /auth/gate`. Timed transitions fire lazily
//! when the gate is next loaded; pages in a timed phase reload themselves
//! when the deadline is due.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    error::AppError,
    filters,
    gate::{Color, Gate, GateEvent, Phase, Selection},
    middleware::{GATE_PATH, SessionContext},
    state::AppState,
};

use super::{Layout, Refresh};

/// Colour swatch for templates.
#[derive(Debug, Clone, Copy)]
pub struct ColorView {
    pub name: &'static str,
    pub hex: &'static str,
    /// Already picked in the current attempt.
    pub used: bool,
}

impl ColorView {
    const fn new(color: Color) -> Self {
        Self {
            name: color.as_str(),
            hex: color.hex(),
            used: false,
        }
    }
}

/// Gate page template.
#[derive(Template, WebTemplate)]
#[template(path = "gate.html")]
pub struct GateTemplate {
    pub layout: Layout,
    /// Phase name: welcome, pattern, input, rejected or authenticating.
    pub phase: &'static str,
    /// The challenge; only filled while it is on display.
    pub pattern: Vec<ColorView>,
    /// Colour buttons.
    pub palette: Vec<ColorView>,
    pub entered: usize,
    pub total: usize,
    /// Width of the progress bar, 0 to 100.
    pub progress_percent: usize,
    pub error: Option<&'static str>,
}

impl GateTemplate {
    fn new(gate: &Gate, now: DateTime<Utc>) -> Self {
        let phase = gate.phase();
        let (entered, total) = gate.progress();
        let used = gate.entered();

        let pattern = match phase {
            Phase::Pattern { .. } => gate
                .pattern()
                .colors()
                .iter()
                .copied()
                .map(ColorView::new)
                .collect(),
            _ => Vec::new(),
        };
        let palette = Color::ALL
            .into_iter()
            .map(|color| ColorView {
                used: used.contains(&color),
                ..ColorView::new(color)
            })
            .collect();

        Self {
            layout: Layout {
                title: "Admin Dashboard",
                show_nav: false,
                refresh: gate
                    .remaining(now)
                    .map(|remaining| Refresh::after(remaining, GATE_PATH)),
            },
            phase: phase.name(),
            pattern,
            palette,
            entered,
            total,
            progress_percent: if total == 0 { 0 } else { entered * 100 / total },
            error: gate.error_message(),
        }
    }
}

/// Form body for a colour selection.
#[derive(Debug, Deserialize)]
pub struct SelectForm {
    pub color: String,
}

/// Load the session's gate, creating one if needed, and fire any due
/// deadline.
///
/// Returns `None` once the gate has granted access; the grant has then
/// already been recorded in the session.
async fn current_gate(
    session: &SessionContext,
    state: &AppState,
    now: DateTime<Utc>,
) -> Result<Option<Gate>, AppError> {
    let stored = session.load_gate().await?;

    let (gate, event) = {
        let mut rng = rand::rng();
        let mut gate = stored.unwrap_or_else(|| Gate::new(&mut rng, state.gate_timings()));
        let event = gate.advance(now, &mut rng);
        (gate, event)
    };

    match event {
        Some(GateEvent::Granted) => {
            session.grant().await?;
            tracing::info!(failures = gate.failures(), "Pattern gate passed");
            return Ok(None);
        }
        Some(GateEvent::Reset) => tracing::debug!("Gate reset after failure"),
        Some(GateEvent::PatternHidden) => tracing::debug!("Pattern hidden"),
        None => {}
    }

    Ok(Some(gate))
}

/// Gate page handler.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: SessionContext,
) -> Result<Response, AppError> {
    if session.is_authenticated().await? {
        return Ok(Redirect::to("/").into_response());
    }

    let now = Utc::now();
    let Some(gate) = current_gate(&session, &state, now).await? else {
        return Ok(Redirect::to("/").into_response());
    };
    session.store_gate(&gate).await?;

    Ok(GateTemplate::new(&gate, now).into_response())
}

/// Reveal the pattern.
#[instrument(skip_all)]
pub async fn start(
    State(state): State<AppState>,
    session: SessionContext,
) -> Result<Redirect, AppError> {
    let now = Utc::now();
    if let Some(mut gate) = current_gate(&session, &state, now).await? {
        match gate.start(now) {
            Ok(()) => tracing::debug!(length = gate.pattern().len(), "Pattern revealed"),
            Err(e) => tracing::debug!(error = %e, "Start ignored"),
        }
        session.store_gate(&gate).await?;
    }
    Ok(Redirect::to(GATE_PATH))
}

/// Record one colour of the replay.
///
/// # Errors
///
/// Returns 400 if the colour is not one of the six.
#[instrument(skip(state, session))]
pub async fn select(
    State(state): State<AppState>,
    session: SessionContext,
    Form(form): Form<SelectForm>,
) -> Result<Redirect, AppError> {
    let color = form.color.parse::<Color>()?;

    let now = Utc::now();
    if let Some(mut gate) = current_gate(&session, &state, now).await? {
        match gate.select(color, now) {
            Ok(Selection::Accepted { entered, total }) => {
                tracing::debug!(entered, total, "Colour accepted");
            }
            Ok(Selection::Completed) => tracing::debug!("Pattern complete, authenticating"),
            Ok(Selection::Rejected) => {
                tracing::info!(failures = gate.failures(), "Wrong pattern entered");
            }
            Err(e) => tracing::debug!(error = %e, "Selection ignored"),
        }
        session.store_gate(&gate).await?;
    }
    Ok(Redirect::to(GATE_PATH))
}

/// Abandon the attempt and draw a new pattern.
#[instrument(skip_all)]
pub async fn reset(
    State(state): State<AppState>,
    session: SessionContext,
) -> Result<Redirect, AppError> {
    let now = Utc::now();
    if let Some(mut gate) = current_gate(&session, &state, now).await? {
        let outcome = {
            let mut rng = rand::rng();
            gate.new_pattern(&mut rng)
        };
        if let Err(e) = outcome {
            tracing::debug!(error = %e, "New pattern ignored");
        }
        session.store_gate(&gate).await?;
    }
    Ok(Redirect::to(GATE_PATH))
}

/// Clear the grant and return to the gate.
#[instrument(skip_all)]
pub async fn logout(session: SessionContext) -> Result<Redirect, AppError> {
    session.revoke().await?;
    tracing::info!("Admin logged out");
    Ok(Redirect::to(GATE_PATH))
}

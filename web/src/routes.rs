use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use eventplan_common::PlanRequest;
use eventplan_core::form::{parse_language, PlanForm};
use eventplan_core::{handle, Action, PlannerError, SessionHandle, SessionId};
use serde::Deserialize;

use crate::render::{self, Notice, PageView, Slot};
use crate::AppState;

pub const PLAN_FILE_NAME: &str = "event_budget_plan.txt";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MessageForm {
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ManualMessageForm {
    pub message: String,
    pub language: String,
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

pub async fn index(State(state): State<AppState>) -> Redirect {
    let (id, _) = state.sessions.create().await;
    Redirect::to(&session_path(&id))
}

/// Unknown or expired ids go back to `/` for a fresh session rather than
/// minting one on a plain GET.
pub async fn show(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    let Ok(id) = raw.parse::<SessionId>() else {
        return not_found("Unknown session");
    };
    let Some(session_handle) = state.sessions.get(&id).await else {
        return Redirect::to("/").into_response();
    };
    let session = session_handle.lock().await;
    Html(render::page(&session, &PageView::for_session(&session))).into_response()
}

pub async fn generate_plan(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Form(form): Form<PlanForm>,
) -> Response {
    let request = form.collect();
    apply(&state, &raw, Action::GeneratePlan(request.clone()), Slot::Plan, Some(request)).await
}

pub async fn step_send(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Form(form): Form<MessageForm>,
) -> Response {
    apply(&state, &raw, Action::SendStep { text: form.message }, Slot::Step, None).await
}

pub async fn step_reset(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    apply(&state, &raw, Action::ResetStep, Slot::Step, None).await
}

pub async fn manual_send(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Form(form): Form<ManualMessageForm>,
) -> Response {
    let action = Action::SendManual {
        text: form.message,
        language: parse_language(&form.language),
    };
    apply(&state, &raw, action, Slot::Manual, None).await
}

pub async fn manual_reset(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    apply(&state, &raw, Action::ResetManual, Slot::Manual, None).await
}

pub async fn download_plan(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    let Ok(id) = raw.parse::<SessionId>() else {
        return not_found("Unknown session");
    };
    let Some(session_handle) = state.sessions.get(&id).await else {
        return not_found("Unknown session");
    };
    let session = session_handle.lock().await;
    match session.plan() {
        Some(plan) => (
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{PLAN_FILE_NAME}\""),
                ),
            ],
            plan.to_string(),
        )
            .into_response(),
        None => not_found("No plan generated yet"),
    }
}

pub async fn end(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    if let Ok(id) = raw.parse::<SessionId>() {
        state.sessions.discard(&id).await;
    }
    Redirect::to("/").into_response()
}

/// Run one action against the session. Success redirects back to the page;
/// a failure re-renders it with the error inline and the session untouched.
async fn apply(
    state: &AppState,
    raw: &str,
    action: Action,
    slot: Slot,
    submitted: Option<PlanRequest>,
) -> Response {
    let (id, session_handle) = match open_session(state, raw).await {
        Ok(found) => found,
        Err(resp) => return resp,
    };
    let mut session = session_handle.lock().await;

    match handle(state.client.as_ref(), &mut session, action).await {
        Ok(_) => Redirect::to(&session_path(&id)).into_response(),
        Err(err) => {
            let status = match err {
                PlannerError::Generation(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let mut view = PageView::for_session(&session);
            if let Some(request) = submitted {
                view.form = request;
            }
            view.notice = Some(Notice { slot, message: err.to_string() });
            (status, Html(render::page(&session, &view))).into_response()
        }
    }
}

async fn open_session(
    state: &AppState,
    raw: &str,
) -> Result<(SessionId, SessionHandle), Response> {
    let id = raw.parse::<SessionId>().map_err(|_| not_found("Unknown session"))?;
    Ok((id, state.sessions.get_or_create(id).await))
}

fn session_path(id: &SessionId) -> String {
    format!("/s/{id}")
}

fn not_found(message: &'static str) -> Response {
    (StatusCode::NOT_FOUND, message).into_response()
}

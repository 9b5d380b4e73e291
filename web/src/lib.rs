//! Browser front-end for the planner: one page per session, form posts for every action.

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use eventplan_core::{ModelClient, SessionRegistry};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

pub mod render;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn ModelClient>,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            sessions: Arc::new(SessionRegistry::new()),
        }
    }

    pub fn with_session_idle_ttl(mut self, ttl: Duration) -> Self {
        self.sessions = Arc::new(SessionRegistry::with_idle_ttl(ttl));
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        .route("/s/{session}", get(routes::show))
        .route("/s/{session}/plan", post(routes::generate_plan))
        .route("/s/{session}/plan.txt", get(routes::download_plan))
        .route("/s/{session}/step/send", post(routes::step_send))
        .route("/s/{session}/step/reset", post(routes::step_reset))
        .route("/s/{session}/manual/send", post(routes::manual_send))
        .route("/s/{session}/manual/reset", post(routes::manual_reset))
        .route("/s/{session}/end", post(routes::end))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(listen: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .context("bind server listener failed")?;
    tracing::info!("eventplan listening on http://{listen}");
    axum::serve(listener, router(state))
        .await
        .context("server terminated with error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use eventplan_core::testing::ScriptedClient;
    use eventplan_core::SessionId;
    use tower::ServiceExt;

    const PLAN_FORM: &str = concat!(
        "event_type=Birthday&guest_count=50&location=Pune&budget=80000",
        "&preference=balanced&language=English"
    );

    fn app(client: ScriptedClient) -> (Router, AppState) {
        let state = AppState::new(Arc::new(client));
        (router(state.clone()), state)
    }

    async fn get_req(app: &Router, uri: &str) -> Response {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_form(app: &Router, uri: &str, body: &str) -> Response {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        app.clone().oneshot(req).await.unwrap()
    }

    async fn body_text(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(resp: &Response) -> String {
        resp.headers()[header::LOCATION].to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_index_creates_session() {
        let (app, state) = app(ScriptedClient::new());
        let resp = get_req(&app, "/").await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);

        let loc = location(&resp);
        let id: SessionId = loc.trim_start_matches("/s/").parse().unwrap();
        assert!(state.sessions.get(&id).await.is_some());

        let page = get_req(&app, &loc).await;
        assert_eq!(page.status(), StatusCode::OK);
        assert!(body_text(page).await.contains("Generate Plan"));
    }

    #[tokio::test]
    async fn test_plan_generation_and_download() {
        let (app, _) = app(ScriptedClient::new().reply("analysis").reply("Venue: ₹30000"));
        let id = SessionId::new();

        let resp = post_form(&app, &format!("/s/{id}/plan"), PLAN_FORM).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), format!("/s/{id}"));

        let download = get_req(&app, &format!("/s/{id}/plan.txt")).await;
        assert_eq!(download.status(), StatusCode::OK);
        assert_eq!(
            download.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"event_budget_plan.txt\""
        );
        let content_type = download.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/plain"));
        assert_eq!(body_text(download).await, "Venue: ₹30000");
    }

    #[tokio::test]
    async fn test_follow_up_failure_reported_inline() {
        let client = ScriptedClient::new().reply("a").reply("the plan").fail("quota exceeded");
        let (app, state) = app(client);
        let id = SessionId::new();
        post_form(&app, &format!("/s/{id}/plan"), PLAN_FORM).await;

        let resp = post_form(&app, &format!("/s/{id}/step/send"), "message=cheaper+venue%3F").await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let html = body_text(resp).await;
        assert!(html.contains("quota exceeded"));
        assert!(!html.contains("cheaper venue?"));

        let handle = state.sessions.get(&id).await.unwrap();
        assert_eq!(handle.lock().await.step.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_plan_keeps_submitted_values() {
        let (app, _) = app(ScriptedClient::new().fail("service unavailable"));
        let id = SessionId::new();

        let resp = post_form(&app, &format!("/s/{id}/plan"), PLAN_FORM).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let html = body_text(resp).await;
        assert!(html.contains("service unavailable"));
        assert!(html.contains("value=\"Pune\""));
        assert!(html.contains("<option value=\"Birthday\" selected>"));
    }

    #[tokio::test]
    async fn test_manual_chat_round_and_reset() {
        let (app, state) = app(ScriptedClient::new().reply("Namaskar!"));
        let id = SessionId::new();

        let uri = format!("/s/{id}/manual/send");
        let resp = post_form(&app, &uri, "language=Marathi&message=hello").await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let html = body_text(get_req(&app, &format!("/s/{id}")).await).await;
        assert!(html.contains("Namaskar!"));
        assert!(html.contains("<option value=\"Marathi\" selected>"));

        post_form(&app, &format!("/s/{id}/manual/reset"), "").await;
        let handle = state.sessions.get(&id).await.unwrap();
        assert!(handle.lock().await.manual.is_empty());
    }

    #[tokio::test]
    async fn test_blank_message_is_noop() {
        let (app, state) = app(ScriptedClient::new());
        let id = SessionId::new();
        let uri = format!("/s/{id}/manual/send");
        let resp = post_form(&app, &uri, "language=English&message=+++").await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let handle = state.sessions.get(&id).await.unwrap();
        assert!(handle.lock().await.manual.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_and_invalid_sessions() {
        let (app, state) = app(ScriptedClient::new());
        assert_eq!(get_req(&app, "/s/not-a-uuid").await.status(), StatusCode::NOT_FOUND);

        let id = SessionId::new();
        let download = format!("/s/{id}/plan.txt");
        assert_eq!(get_req(&app, &download).await.status(), StatusCode::NOT_FOUND);

        state.sessions.get_or_create(id).await;
        assert_eq!(get_req(&app, &download).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_end_discards_session() {
        let (app, state) = app(ScriptedClient::new());
        let (id, _) = state.sessions.create().await;
        let resp = post_form(&app, &format!("/s/{id}/end"), "").await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert!(state.sessions.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app(ScriptedClient::new());
        let resp = get_req(&app, "/health").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn test_unknown_session_page_redirects_without_creating() {
        let (app, state) = app(ScriptedClient::new());
        for _ in 0..20 {
            let resp = get_req(&app, &format!("/s/{}", SessionId::new())).await;
            assert_eq!(resp.status(), StatusCode::SEE_OTHER);
            assert_eq!(location(&resp), "/");
        }
        assert!(state.sessions.is_empty().await);
    }

    #[tokio::test]
    async fn test_abandoned_sessions_are_swept() {
        let state = AppState::new(Arc::new(ScriptedClient::new()))
            .with_session_idle_ttl(std::time::Duration::ZERO);
        let app = router(state.clone());
        for _ in 0..20 {
            get_req(&app, "/").await;
        }
        assert_eq!(state.sessions.len().await, 1);
    }
}

use crate::error::{AppError, ErrorKind};
use crate::models::view_types::View;
use crate::services::api_client::ApiClient;
use crate::services::session::SessionStore;
use tracing::{info, warn};

pub const CLASSIFY_FAILED_PROMPT: &str = "Failed to classify message. Please try again.";
pub const CLEAR_FAILED_PROMPT: &str = "Failed to clear history";

/// Sends the current message to the prediction service. `on_loading` gets the
/// view with the loading indicator up, before the request goes out.
///
/// Validation failures return before anything is sent. On success the stats
/// and history are refreshed; failures there are logged and otherwise ignored.
pub async fn classify(
    store: &SessionStore,
    api: &ApiClient,
    on_loading: impl FnOnce(View),
) -> Result<View, AppError> {
    let (view, request) = store.update(|session| match session.resolve_message() {
        Ok(message) => {
            let (session, ticket) = session.begin_classification();
            (session, Ok((message, ticket)))
        }
        Err(e) => (session, Err(e)),
    });
    let (message, ticket) = request?;
    on_loading(view);

    match api.predict(&message).await {
        Ok(result) => {
            info!(
                label = result.label.as_str(),
                confidence = result.confidence,
                "Message classified"
            );
            store.apply(|s| s.finish_classification(ticket, result));
        }
        Err(e) => {
            warn!("Classification failed: {}", e);
            store.apply(|s| s.fail_classification());
            return Err(user_prompt(e));
        }
    }

    Ok(refresh_dashboard(store, api).await)
}

fn user_prompt(err: AppError) -> AppError {
    match err.kind {
        ErrorKind::Server => {
            let message = format!("Error: {}", err.message);
            err.with_message(message)
        }
        _ => err.with_message(CLASSIFY_FAILED_PROMPT),
    }
}

pub async fn refresh_dashboard(store: &SessionStore, api: &ApiClient) -> View {
    let (stats, history) = futures::future::join(api.stats(), api.history()).await;

    match stats {
        Ok(stats) => {
            store.apply(|s| s.with_stats(stats));
        }
        Err(e) => warn!("Error loading stats: {}", e),
    }
    match history {
        Ok(history) => {
            store.apply(|s| s.with_history(history));
        }
        Err(e) => warn!("Error loading history: {}", e),
    }

    store.view()
}

pub async fn clear_history(store: &SessionStore, api: &ApiClient) -> Result<View, AppError> {
    if let Err(e) = api.clear().await {
        warn!("Error clearing history: {}", e);
        return Err(e.with_message(CLEAR_FAILED_PROMPT));
    }
    info!("History cleared");
    Ok(refresh_dashboard(store, api).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session_types::{InputMode, StagedImage};
    use crate::services::session::{EMPTY_TEXT_PROMPT, MISSING_EXTRACTION_PROMPT};
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_dashboard(server: &MockServer, history: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/api/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 1, "spam": 1, "ham": 0 })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "history": history })))
            .mount(server)
            .await;
    }

    fn image() -> StagedImage {
        StagedImage {
            file_name: "shot.png".to_string(),
            media_type: "image/png".to_string(),
            bytes: Arc::from(vec![0u8; 4]),
            width: 1,
            height: 1,
            preview: "data:image/png;base64,AAAA".to_string(),
        }
    }

    #[tokio::test]
    async fn empty_text_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/predict"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let store = SessionStore::new();
        store.apply(|s| s.set_draft("   "));
        let api = ApiClient::new(&server.uri()).unwrap();

        let mut loading_shown = false;
        let err = classify(&store, &api, |_| loading_shown = true).await.unwrap_err();
        assert_eq!(err.message, EMPTY_TEXT_PROMPT);
        assert!(!loading_shown);
        assert!(!store.read(|s| s.is_loading()));
    }

    #[tokio::test]
    async fn empty_extraction_blocks_submission() {
        let server = MockServer::start().await;
        let store = SessionStore::new();
        let (_, generation) = store.update(|s| s.select_mode(InputMode::Image).stage_and_extract(image()));
        store.apply(|s| s.complete_extraction(generation, Ok("  ".to_string())));
        let api = ApiClient::new(&server.uri()).unwrap();

        let err = classify(&store, &api, |_| {}).await.unwrap_err();
        assert_eq!(err.message, MISSING_EXTRACTION_PROMPT);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn spam_verdict_is_rendered_and_dashboard_refreshed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/predict"))
            .and(body_json(json!({ "message": "You won!" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "prediction": "spam", "confidence": 87.3 })))
            .expect(1)
            .mount(&server)
            .await;
        mount_dashboard(
            &server,
            json!([{ "message": "You won!", "prediction": "spam", "confidence": 87.3, "timestamp": "2024-05-01 10:00:00" }]),
        )
        .await;

        let store = SessionStore::new();
        store.apply(|s| s.set_draft("  You won!  "));
        let api = ApiClient::new(&server.uri()).unwrap();

        let mut loading_view = None;
        let view = classify(&store, &api, |v| loading_view = Some(v)).await.unwrap();

        assert!(loading_view.map(|v| v.loading).unwrap_or(false));
        assert!(!view.loading);
        let result = view.result.expect("result should be visible");
        assert_eq!(result.class_name, "result spam");
        assert_eq!(result.heading, "SPAM EMAIL DETECTED");
        assert_eq!(result.confidence_width, "87.3%");
        assert_eq!(result.confidence_label, "87.3% Confidence");
        assert_eq!(view.stats.total, 1);
        assert!(view.history_html.contains("badge spam"));
    }

    #[tokio::test]
    async fn image_mode_submits_extracted_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/predict"))
            .and(body_json(json!({ "message": "Meeting at 3pm" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "prediction": "ham", "confidence": 95.0 })))
            .expect(1)
            .mount(&server)
            .await;
        mount_dashboard(&server, json!([])).await;

        let store = SessionStore::new();
        let (_, generation) = store.update(|s| s.select_mode(InputMode::Image).stage_and_extract(image()));
        store.apply(|s| s.complete_extraction(generation, Ok("\nMeeting at 3pm\n".to_string())));
        let api = ApiClient::new(&server.uri()).unwrap();

        let view = classify(&store, &api, |_| {}).await.unwrap();
        assert_eq!(view.result.unwrap().heading, "SAFE EMAIL");
        assert_eq!(view.history_html.matches("<tr>").count(), 1);
        assert!(view.history_html.contains("No emails analyzed yet"));
    }

    #[tokio::test]
    async fn server_error_is_prefixed_and_clears_loading() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/predict"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "No message provided" })))
            .mount(&server)
            .await;

        let store = SessionStore::new();
        store.apply(|s| s.set_draft("hi"));
        let api = ApiClient::new(&server.uri()).unwrap();

        let err = classify(&store, &api, |_| {}).await.unwrap_err();
        assert_eq!(err.message, "Error: No message provided");
        assert!(!store.read(|s| s.is_loading()));
        assert!(store.read(|s| s.result().is_none()));
    }

    #[tokio::test]
    async fn network_failure_gives_generic_prompt() {
        let store = SessionStore::new();
        store.apply(|s| s.set_draft("hi"));
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();

        let err = classify(&store, &api, |_| {}).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Network);
        assert_eq!(err.message, CLASSIFY_FAILED_PROMPT);
        assert!(!store.read(|s| s.is_loading()));
    }

    #[tokio::test]
    async fn dashboard_failures_keep_previous_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/stats"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "db locked" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "history": [] })))
            .mount(&server)
            .await;

        let store = SessionStore::new();
        let api = ApiClient::new(&server.uri()).unwrap();
        let view = refresh_dashboard(&store, &api).await;
        assert_eq!(view.stats.total, 0);
        assert!(view.history_html.contains("No emails analyzed yet"));
    }

    #[tokio::test]
    async fn clear_failure_uses_clear_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/clear"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "disk full" })))
            .mount(&server)
            .await;

        let store = SessionStore::new();
        let api = ApiClient::new(&server.uri()).unwrap();
        let err = clear_history(&store, &api).await.unwrap_err();
        assert_eq!(err.message, CLEAR_FAILED_PROMPT);
    }
}

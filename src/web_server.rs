use anyhow::{Context, Result};
use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    serve, Router,
};
use futures::stream::{self, Stream, StreamExt};
use reqwest::Client;
use serde::Deserialize;
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{debug, info, instrument};

use crate::config::RelayConfig;
use crate::constants;
use crate::error::RelayError;
use crate::frame::{word_fragments, Frame};
use crate::llm_interaction::{complete_chat, ChatMessage};

// Shared application state. The relay keeps nothing between requests;
// this only carries configuration and a pooled HTTP client.
#[derive(Clone)]
struct AppState {
    config: Arc<RelayConfig>,
    http: Client,
}

#[derive(Deserialize, Debug)]
struct ChatRequest {
    #[serde(default)]
    messages: Option<Vec<ChatMessage>>,
}

/// Extracts the transcript from a request body. Blank bodies and missing or
/// empty message lists are client errors; anything that is not JSON is not.
pub fn parse_chat_request(body: &[u8]) -> Result<Vec<ChatMessage>, RelayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(RelayError::NoMessages);
    }
    let request: ChatRequest = serde_json::from_slice(body)?;
    match request.messages {
        Some(messages) if !messages.is_empty() => Ok(messages),
        _ => Err(RelayError::NoMessages),
    }
}

/// Re-emits a complete answer as text frames, one word per frame.
pub fn word_stream(
    answer: &str,
    delay: Duration,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
    let fragments = word_fragments(answer);
    stream::iter(fragments.into_iter().enumerate()).then(move |(index, fragment)| async move {
        if index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(Bytes::from(Frame::Text(fragment).encode()))
    })
}

#[instrument(skip(state, body), fields(bytes = body.len()))]
async fn chat_handler(State(state): State<AppState>, body: Bytes) -> Result<Response, RelayError> {
    let messages = parse_chat_request(&body)?;
    info!(turns = messages.len(), "Relaying conversation");

    // The provider answers in one piece; streaming starts only after it succeeded.
    let answer = complete_chat(&state.http, &state.config, messages).await?;
    debug!(words = answer.split(' ').count(), "Streaming answer");

    let body = Body::from_stream(word_stream(&answer, state.config.chunk_delay));
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response())
}

/// Builds the relay application router.
pub fn router(config: RelayConfig) -> Router {
    let static_dir = config.static_dir.clone();
    let state = AppState {
        config: Arc::new(config),
        http: Client::new(),
    };

    let mut app = Router::new()
        .route(constants::CHAT_ROUTE, post(chat_handler))
        .with_state(state);

    // Serve a prebuilt web client, if one was configured, for every other path.
    if let Some(dir) = static_dir {
        info!("Serving web client from {}", dir.display());
        let static_files_service = ServeDir::new(dir).not_found_service(tower::service_fn(
            |_req: Request| async {
                Ok::<_, Infallible>((StatusCode::NOT_FOUND, "Not Found").into_response())
            },
        ));
        app = app.fallback_service(static_files_service);
    }

    app.layer(TraceLayer::new_for_http()) // Add request logging
}

pub async fn start_web_server(addr: SocketAddr, config: RelayConfig) -> Result<()> {
    if config.api_key.is_none() {
        // Not fatal here: requests fail with a configuration error until a key is provided.
        tracing::warn!("OPENAI_API_KEY is not set; chat requests will fail");
    }
    let app = router(config);

    info!("StudyChef relay listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_blank_and_empty() {
        assert!(matches!(parse_chat_request(b""), Err(RelayError::NoMessages)));
        assert!(matches!(parse_chat_request(b"  \n"), Err(RelayError::NoMessages)));
        assert!(matches!(parse_chat_request(b"{}"), Err(RelayError::NoMessages)));
        assert!(matches!(
            parse_chat_request(br#"{"messages":null}"#),
            Err(RelayError::NoMessages)
        ));
        assert!(matches!(
            parse_chat_request(br#"{"messages":[]}"#),
            Err(RelayError::NoMessages)
        ));
    }

    #[test]
    fn test_parse_invalid_json_is_not_a_client_error() {
        assert!(matches!(
            parse_chat_request(b"{messages"),
            Err(RelayError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_parse_accepts_transcript() {
        let messages = parse_chat_request(
            br#"{"messages":[{"role":"assistant","content":"Hi"},{"role":"user","content":"Vegetarian"}]}"#,
        )
        .unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "Vegetarian");
    }

    #[tokio::test]
    async fn test_word_stream_frames_every_word() {
        let chunks: Vec<Bytes> = word_stream("Cook once eat twice", Duration::ZERO)
            .map(|chunk| chunk.unwrap())
            .collect()
            .await;
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0], Bytes::from("0:{\"content\":\"Cook \"}\n"));
        assert_eq!(chunks[3], Bytes::from("0:{\"content\":\"twice \"}\n"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_word_stream_paces_between_frames() {
        let start = tokio::time::Instant::now();
        let count = word_stream("a b c", Duration::from_millis(30)).count().await;
        assert_eq!(count, 3);
        // No pause before the first frame.
        assert_eq!(start.elapsed(), Duration::from_millis(60));
    }
}

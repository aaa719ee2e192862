//! HTTP/WebSocket Handlers

use axum::{
    Json,
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::StatusCode,
    response::Response,
};
use futures::{SinkExt, StreamExt, stream::SplitSink};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use mathsolver_core::{
    AgentError, AgentEvent, AgentStep, EventSink, RenderedMessage, SessionHandle, SessionId,
    TurnOutcome,
};

use crate::state::AppState;

/// Shown instead of the page when no key was supplied
pub const MISSING_KEY_MESSAGE: &str = "Please add your Groq API key to continue";

/// Static text for the intermediate-steps panel
pub const INTERMEDIATE_STEPS_PLACEHOLDER: &str =
    "Here are the intermediate steps to solve the problem...";

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub messages: Vec<RenderedMessage>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChatResponse {
    Warning {
        session_id: String,
        warning: String,
        messages: Vec<RenderedMessage>,
    },
    Answered {
        session_id: String,
        answer: String,
        steps: Vec<AgentStep>,
        intermediate_steps: &'static str,
        messages: Vec<RenderedMessage>,
    },
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

fn agent_error(err: &AgentError) -> ApiError {
    tracing::error!(retryable = err.is_retryable(), "Agent error: {}", err);
    api_error(StatusCode::BAD_GATEWAY, "AGENT_ERROR", err.user_message())
}

// ============================================================================
// Turn plumbing shared by the HTTP and WebSocket paths
// ============================================================================

/// The key must be present before anything else happens
fn require_api_key(api_key: Option<&str>) -> Result<&str, ApiError> {
    api_key
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "MISSING_API_KEY", MISSING_KEY_MESSAGE))
}

fn session_not_found(id: &SessionId) -> ApiError {
    api_error(StatusCode::NOT_FOUND, "SESSION_NOT_FOUND", format!("Unknown session: {id}"))
}

async fn resolve_session(
    state: &AppState,
    session_id: Option<&str>,
) -> Result<(SessionId, SessionHandle), ApiError> {
    match session_id {
        None => Ok(state.sessions.create().await),
        Some(id) => {
            let id = SessionId::from_string(id);
            let handle = state
                .sessions
                .get(&id)
                .await
                .ok_or_else(|| session_not_found(&id))?;
            Ok((id, handle))
        }
    }
}

/// Run one submission against a session
async fn run_turn(
    state: &AppState,
    request: &ChatRequest,
    events: EventSink,
) -> Result<ChatResponse, ApiError> {
    let api_key = require_api_key(request.api_key.as_deref())?;
    let (id, handle) = resolve_session(state, request.session_id.as_deref()).await?;

    // Held for the whole turn: one submission per session at a time
    let mut session = handle.lock().await;

    let agent = if request.question.trim().is_empty() {
        None
    } else {
        Some(state.build_agent(api_key).map_err(|e| agent_error(&e))?)
    };

    let outcome = match agent {
        Some(agent) => session.submit(&request.question, &agent, &events).await,
        None => Ok(TurnOutcome::Warning(
            mathsolver_core::session::EMPTY_QUESTION_WARNING.into(),
        )),
    }
    .map_err(|e| agent_error(&e))?;

    let messages = session.transcript.render();
    Ok(match outcome {
        TurnOutcome::Warning(warning) => ChatResponse::Warning {
            session_id: id.to_string(),
            warning,
            messages,
        },
        TurnOutcome::Answered(run) => {
            tracing::info!(session = %id, messages = messages.len(), "Turn complete");
            ChatResponse::Answered {
                session_id: id.to_string(),
                answer: run.answer,
                steps: run.steps,
                intermediate_steps: INTERMEDIATE_STEPS_PLACEHOLDER,
                messages,
            }
        }
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Start a session; the transcript comes back holding only the greeting
pub async fn create_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let (id, handle) = state.sessions.create().await;
    let messages = handle.lock().await.transcript.render();

    Json(SessionResponse {
        session_id: id.to_string(),
        messages,
    })
}

/// Render a session's transcript
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let (id, handle) = resolve_session(&state, Some(&id)).await?;
    let messages = handle.lock().await.transcript.render();

    Ok(Json(SessionResponse {
        session_id: id.to_string(),
        messages,
    }))
}

/// End a session; its transcript is discarded
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = SessionId::from_string(id);
    if state.sessions.remove(&id).await {
        tracing::info!(session = %id, "Session ended");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(&id))
    }
}

/// Main chat endpoint (non-streaming)
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    run_turn(&state, &payload, EventSink::none()).await.map(Json)
}

/// WebSocket chat that streams agent events while the turn runs
pub async fn chat_stream_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_stream(socket, state))
}

async fn send_json(sender: &mut SplitSink<WebSocket, Message>, value: &serde_json::Value) -> bool {
    sender
        .send(Message::Text(value.to_string().into()))
        .await
        .is_ok()
}

async fn handle_stream(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::error!("WebSocket error: {}", e);
                break;
            }
            _ => continue,
        };

        let request: ChatRequest = match serde_json::from_str(msg.as_str()) {
            Ok(r) => r,
            Err(e) => {
                let error = serde_json::json!({"type": "error", "error": e.to_string(), "code": "BAD_REQUEST"});
                if !send_json(&mut sender, &error).await {
                    break;
                }
                continue;
            }
        };

        let (tx, mut rx) = mpsc::unbounded_channel::<AgentEvent>();
        let turn = run_turn(&state, &request, EventSink::channel(tx));
        let forward = async {
            while let Some(event) = rx.recv().await {
                let frame = serde_json::json!({"type": "event", "event": event});
                if !send_json(&mut sender, &frame).await {
                    tracing::debug!("Client went away mid-turn");
                }
            }
        };
        let (result, ()) = tokio::join!(turn, forward);

        let frame = match result {
            Ok(ChatResponse::Warning { session_id, warning, messages }) => serde_json::json!({
                "type": "warning",
                "session_id": session_id,
                "warning": warning,
                "messages": messages,
            }),
            Ok(ChatResponse::Answered { session_id, answer, steps, intermediate_steps, messages }) => {
                serde_json::json!({
                    "type": "answer",
                    "session_id": session_id,
                    "answer": answer,
                    "steps": steps,
                    "intermediate_steps": intermediate_steps,
                    "messages": messages,
                })
            }
            Err((_, Json(err))) => serde_json::json!({
                "type": "error",
                "error": err.error,
                "code": err.code,
            }),
        };

        if !send_json(&mut sender, &frame).await {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use mathsolver_core::provider::Completion;
    use mathsolver_core::{
        GenerationOptions, LlmProvider, Message as ChatMessage, SessionStore, ToolError,
    };
    use mathsolver_tools::encyclopedia::EncyclopediaClient;
    use serde_json::{Value, json};
    use tokio::net::TcpStream;
    use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
    use tower::ServiceExt;

    use crate::state::ProviderFactory;

    struct ScriptedProvider {
        replies: Mutex<VecDeque<String>>,
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            _messages: &[ChatMessage],
            options: &GenerationOptions,
        ) -> mathsolver_core::Result<Completion> {
            let content = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| AgentError::ProviderUnavailable("script exhausted".into()))?;
            Ok(Completion {
                content,
                model: options.model.clone(),
                usage: None,
                finish_reason: None,
            })
        }
    }

    /// Hands out one shared scripted provider and counts constructions
    struct ScriptedFactory {
        provider: Arc<ScriptedProvider>,
        created: AtomicUsize,
    }

    impl ProviderFactory for ScriptedFactory {
        fn create(&self, _api_key: &str) -> mathsolver_core::Result<Arc<dyn LlmProvider>> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(self.provider.clone())
        }
    }

    struct Shelf;

    #[async_trait]
    impl EncyclopediaClient for Shelf {
        async fn lookup(&self, query: &str) -> Result<String, ToolError> {
            Ok(format!("Page: {query}\nSummary: about {query}"))
        }

        fn name(&self) -> &str {
            "shelf"
        }
    }

    fn state(replies: &[&str]) -> (AppState, Arc<ScriptedFactory>) {
        let factory = Arc::new(ScriptedFactory {
            provider: Arc::new(ScriptedProvider {
                replies: Mutex::new(replies.iter().map(|r| (*r).to_string()).collect()),
            }),
            created: AtomicUsize::new(0),
        });
        let state = AppState {
            sessions: Arc::new(SessionStore::new()),
            providers: factory.clone(),
            encyclopedia: Arc::new(Shelf),
            generation: GenerationOptions::default(),
            max_iterations: 15,
        };
        (state, factory)
    }

    async fn post(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn delete(app: axum::Router, uri: &str) -> StatusCode {
        app.oneshot(Request::delete(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

    async fn connect(state: AppState) -> Client {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, crate::router(state, "static")).await.unwrap();
        });

        let (client, _) = connect_async(format!("ws://{addr}/api/chat/stream"))
            .await
            .unwrap();
        client
    }

    async fn send_text(client: &mut Client, text: String) {
        client
            .send(tokio_tungstenite::tungstenite::Message::Text(text))
            .await
            .unwrap();
    }

    async fn next_frame(client: &mut Client) -> Value {
        loop {
            let msg = client.next().await.unwrap().unwrap();
            if let tokio_tungstenite::tungstenite::Message::Text(text) = msg {
                return serde_json::from_str(&text).unwrap();
            }
        }
    }

    #[tokio::test]
    async fn test_missing_key_halts_before_provider() {
        let (state, factory) = state(&[]);
        let app = crate::router(state.clone(), "static");

        for body in [
            json!({"question": "What is 2 + 2?"}),
            json!({"question": "What is 2 + 2?", "api_key": "   "}),
        ] {
            let (status, json) = post(app.clone(), "/api/chat", body).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(json["code"], "MISSING_API_KEY");
            assert_eq!(json["error"], MISSING_KEY_MESSAGE);
        }

        assert_eq!(factory.created.load(Ordering::SeqCst), 0);
        assert!(state.sessions.is_empty().await);
    }

    #[tokio::test]
    async fn test_blank_question_warns() {
        let (state, factory) = state(&[]);
        let app = crate::router(state, "static");

        let (status, json) =
            post(app, "/api/chat", json!({"question": "  ", "api_key": "gsk"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "warning");
        assert_eq!(json["warning"], "Please enter a question");
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert_eq!(factory.created.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_turns_grow_transcript() {
        let (state, _) = state(&[
            "Action: Calculator\nAction Input: 2 + 2",
            "```text\n2 + 2\n```",
            "Final Answer: 4",
            "Final Answer: Marie Curie was a physicist.",
        ]);
        let app = crate::router(state, "static");

        let (status, first) = post(
            app.clone(),
            "/api/chat",
            json!({"question": "What is 2 + 2?", "api_key": "gsk"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["status"], "answered");
        assert_eq!(first["answer"], "4");
        assert_eq!(first["steps"][0]["tool"], "Calculator");
        assert_eq!(first["steps"][0]["observation"], "Answer: 4");
        assert_eq!(first["intermediate_steps"], INTERMEDIATE_STEPS_PLACEHOLDER);
        assert_eq!(first["messages"].as_array().unwrap().len(), 3);

        let session_id = first["session_id"].as_str().unwrap().to_string();
        let (_, second) = post(
            app.clone(),
            "/api/chat",
            json!({"question": "Who was Marie Curie?", "api_key": "gsk", "session_id": session_id}),
        )
        .await;
        let messages = second["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[3]["role"], "user");
        assert_eq!(messages[4]["role"], "assistant");

        let (_, rendered) = get(app.clone(), &format!("/api/session/{session_id}")).await;
        let (_, again) = get(app, &format!("/api/session/{session_id}")).await;
        assert_eq!(rendered["messages"], second["messages"]);
        assert_eq!(rendered, again);
    }

    #[tokio::test]
    async fn test_agent_failure_is_bad_gateway() {
        let (state, _) = state(&[]);
        let app = crate::router(state, "static");

        let (status, json) = post(
            app,
            "/api/chat",
            json!({"question": "What is 2 + 2?", "api_key": "gsk"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["code"], "AGENT_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let (state, _) = state(&[]);
        let app = crate::router(state, "static");

        let (status, json) = post(
            app.clone(),
            "/api/chat",
            json!({"question": "hi", "api_key": "gsk", "session_id": "nope"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "SESSION_NOT_FOUND");

        let (status, _) = get(app, "/api/session/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_session_has_greeting() {
        let (state, _) = state(&[]);
        let app = crate::router(state, "static");

        let (status, json) = post(app, "/api/session", json!({})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["messages"][0]["role"], "assistant");
        assert_eq!(
            json["messages"][0]["content"],
            mathsolver_core::transcript::GREETING
        );
    }

    #[tokio::test]
    async fn test_delete_session_discards_transcript() {
        let (state, _) = state(&[]);
        let app = crate::router(state.clone(), "static");

        let (_, created) = post(app.clone(), "/api/session", json!({})).await;
        let uri = format!("/api/session/{}", created["session_id"].as_str().unwrap());

        assert_eq!(delete(app.clone(), &uri).await, StatusCode::NO_CONTENT);
        assert!(state.sessions.is_empty().await);
        assert_eq!(get(app.clone(), &uri).await.0, StatusCode::NOT_FOUND);
        assert_eq!(delete(app, &uri).await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stream_sends_events_then_one_final_frame() {
        let (state, _) = state(&[
            " I should use the calculator.\nAction: Calculator\nAction Input: 2 + 2",
            "```text\n2 + 2\n```",
            " I now know the final answer\nFinal Answer: 4",
        ]);
        let mut client = connect(state).await;

        send_text(&mut client, "not json".into()).await;
        let rejected = next_frame(&mut client).await;
        assert_eq!(rejected["type"], "error");
        assert_eq!(rejected["code"], "BAD_REQUEST");

        let question = json!({"question": "What is 2 + 2?", "api_key": "gsk"});
        send_text(&mut client, question.to_string()).await;

        let mut events = Vec::new();
        let last = loop {
            let frame = next_frame(&mut client).await;
            if frame["type"] == "event" {
                events.push(frame["event"]["kind"].as_str().unwrap().to_string());
            } else {
                break frame;
            }
        };

        assert_eq!(last["type"], "answer");
        assert_eq!(last["answer"], "4");
        assert_eq!(last["intermediate_steps"], INTERMEDIATE_STEPS_PLACEHOLDER);
        assert_eq!(last["messages"].as_array().unwrap().len(), 3);
        assert_eq!(events.first().map(String::as_str), Some("thought"));
        assert!(events.iter().any(|kind| kind == "tool_start"));
        assert!(events.iter().any(|kind| kind == "tool_end"));
        assert_eq!(events.last().map(String::as_str), Some("finish"));

        // The next frame belongs to the next request, not the finished turn
        let blank = json!({
            "question": " ",
            "api_key": "gsk",
            "session_id": last["session_id"],
        });
        send_text(&mut client, blank.to_string()).await;
        let warning = next_frame(&mut client).await;
        assert_eq!(warning["type"], "warning");
        assert_eq!(warning["messages"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_stream_reports_missing_key() {
        let (state, factory) = state(&[]);
        let mut client = connect(state).await;

        send_text(&mut client, json!({"question": "What is 2 + 2?"}).to_string()).await;
        let frame = next_frame(&mut client).await;

        assert_eq!(frame["type"], "error");
        assert_eq!(frame["code"], "MISSING_API_KEY");
        assert_eq!(factory.created.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_health() {
        let (state, _) = state(&[]);
        let (status, json) = get(crate::router(state, "static"), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(json.as_object().unwrap().len(), 2);
    }
}

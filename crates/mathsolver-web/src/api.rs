//! API Client

use serde::{Deserialize, Serialize};

/// Transcript entry for display
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// One tool call made while answering
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Step {
    pub tool: String,
    pub tool_input: String,
    pub observation: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub messages: Vec<ChatMessage>,
}

/// Body of a successful `/api/chat` call
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChatReply {
    Warning {
        session_id: String,
        warning: String,
        messages: Vec<ChatMessage>,
    },
    Answered {
        session_id: String,
        answer: String,
        steps: Vec<Step>,
        intermediate_steps: String,
        messages: Vec<ChatMessage>,
    },
}

// reqwest on wasm needs an absolute URL
fn url(path: &str) -> String {
    let origin = web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_else(|| "http://localhost:3000".into());
    format!("{origin}{path}")
}

async fn error_text(response: reqwest::Response) -> String {
    let data: serde_json::Value = response.json().await.unwrap_or_default();
    data["error"].as_str().unwrap_or("Request failed").to_string()
}

/// Start a session holding only the greeting
pub async fn create_session() -> Result<Session, String> {
    let response = reqwest::Client::new()
        .post(url("/api/session"))
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if response.status().is_success() {
        response.json().await.map_err(|e| e.to_string())
    } else {
        Err(error_text(response).await)
    }
}

/// Submit a question in a session
pub async fn send_chat(
    session_id: Option<&str>,
    question: &str,
    api_key: &str,
) -> Result<ChatReply, String> {
    let mut body = serde_json::json!({
        "question": question,
        "api_key": api_key,
    });

    if let Some(id) = session_id {
        body["session_id"] = serde_json::json!(id);
    }

    let response = reqwest::Client::new()
        .post(url("/api/chat"))
        .json(&body)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if response.status().is_success() {
        response.json().await.map_err(|e| e.to_string())
    } else {
        Err(error_text(response).await)
    }
}

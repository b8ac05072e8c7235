//! Wire types for the document service and the transport seam the
//! coordinator talks through.

pub mod fetch;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ClientError;

pub use fetch::FetchApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Error,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub status: Option<ApiStatus>,
    pub message: Option<String>,
    #[serde(default, deserialize_with = "opaque_id")]
    pub file_id: Option<String>,
    #[serde(default, deserialize_with = "opaque_id")]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub status: Option<ApiStatus>,
    pub message: Option<String>,
    pub assistant_response: Option<String>,
    #[serde(default)]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub hints: String,
    pub question: String,
    pub file_id: String,
    pub conversation_id: String,
}

/// What a successful upload hands back to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub file_id: String,
    /// Absent when the server kept the conversation the upload was sent with.
    pub conversation_id: Option<String>,
    pub message: Option<String>,
}

/// Transport for the two calls the page makes.
#[allow(async_fn_in_trait)]
pub trait DocQaApi<F> {
    async fn upload(&self, file: &F, conversation_id: Option<&str>) -> Result<UploadReceipt, ClientError>;

    /// Returns the assistant's answer text.
    async fn ask(&self, request: &ChatRequest) -> Result<String, ClientError>;
}

// Ids come back as numbers from some deployments and strings from others.
fn opaque_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Integer(i64),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.and_then(|raw| match raw {
        RawId::Text(s) if s.trim().is_empty() => None,
        RawId::Text(s) => Some(s),
        RawId::Integer(n) => Some(n.to_string()),
    }))
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

pub fn parse_upload_response(status: u16, body: &str) -> Result<UploadReceipt, ClientError> {
    let response: UploadResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(_) if !is_success(status) => return Err(http_failure("Upload", status)),
        Err(e) => return Err(ClientError::Decode(e.to_string())),
    };

    if !is_success(status) || response.status == Some(ApiStatus::Error) {
        return Err(ClientError::Server {
            status,
            message: response
                .message
                .unwrap_or_else(|| format!("Upload failed with status {status}")),
            errors: Vec::new(),
        });
    }

    let file_id = response
        .file_id
        .ok_or_else(|| ClientError::Decode("upload response has no file_id".to_string()))?;

    Ok(UploadReceipt {
        file_id,
        conversation_id: response.conversation_id,
        message: response.message,
    })
}

pub fn parse_chat_response(status: u16, body: &str) -> Result<String, ClientError> {
    let response: ChatResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(_) if !is_success(status) => return Err(http_failure("Chat", status)),
        Err(e) => return Err(ClientError::Decode(e.to_string())),
    };

    if !is_success(status) || response.status == Some(ApiStatus::Error) {
        return Err(ClientError::Server {
            status,
            message: response
                .message
                .unwrap_or_else(|| format!("Chat failed with status {status}")),
            errors: response.errors,
        });
    }

    response
        .assistant_response
        .ok_or_else(|| ClientError::Decode("chat response has no assistant_response".to_string()))
}

fn http_failure(what: &str, status: u16) -> ClientError {
    ClientError::Server {
        status,
        message: format!("{what} failed with status {status}"),
        errors: Vec::new(),
    }
}

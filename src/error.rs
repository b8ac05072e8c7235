use thiserror::Error;

/// Everything that can stop an upload or a question from completing.
///
/// Every variant ends up as a visible banner; `Display` is the banner text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    #[error("Please upload a file first.")]
    NoDocument,

    /// The request never produced a response. The detail is for logs only.
    #[error("Network error. Please try again.")]
    Transport(String),

    #[error("{}", server_message(.message, .errors))]
    Server {
        status: u16,
        message: String,
        errors: Vec<String>,
    },

    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

fn server_message(message: &str, errors: &[String]) -> String {
    if errors.is_empty() {
        message.to_string()
    } else {
        format!("{message}\nDetails: {}", errors.join(", "))
    }
}

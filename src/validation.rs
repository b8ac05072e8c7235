use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ClientError;
use crate::session::DocumentFile;

pub const MAX_QUESTION_LENGTH: usize = 1000;
pub const MAX_HINTS_LENGTH: usize = 500;
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf"];

// zero-width and bidi overrides, plus C0 controls other than tab/LF/CR, plus DEL
static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{202A}-\x{202E}\x{2066}-\x{2069}\x{200B}-\x{200D}\x{FEFF}]|[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]")
        .expect("unsafe character pattern is valid")
});

/// Checks the question and hints before anything goes over the wire.
pub fn validate_question(question: &str, hints: &str) -> Result<(), ClientError> {
    if question.trim().is_empty() {
        return Err(ClientError::Validation("Please enter a question.".to_string()));
    }
    if question.chars().count() > MAX_QUESTION_LENGTH {
        return Err(ClientError::Validation(format!(
            "Question must be less than {MAX_QUESTION_LENGTH} characters"
        )));
    }
    if hints.chars().count() > MAX_HINTS_LENGTH {
        return Err(ClientError::Validation(format!(
            "Hints must be less than {MAX_HINTS_LENGTH} characters"
        )));
    }
    if UNSAFE_CHARS.is_match(question) || UNSAFE_CHARS.is_match(hints) {
        return Err(ClientError::Validation(
            "Question or hints contain invisible or control characters".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_upload(file: &impl DocumentFile) -> Result<(), ClientError> {
    let name = file.file_name();
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    let allowed = extension
        .as_deref()
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext));
    if !allowed {
        return Err(ClientError::Validation(format!("File {name} is not a PDF")));
    }
    if file.byte_len() > MAX_FILE_SIZE {
        return Err(ClientError::Validation(format!(
            "File {name} is too large (max 10MB)"
        )));
    }
    Ok(())
}

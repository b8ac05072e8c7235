use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
    pub answered_at: DateTime<Utc>,
}

/// A question that has been sent and is waiting for its answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuestion {
    pub request: u64,
    pub question: String,
}

#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
    pending: Vec<PendingQuestion>,
}

impl Transcript {
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn pending(&self) -> &[PendingQuestion] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty() && self.pending.is_empty()
    }

    pub fn push_pending(&mut self, request: u64, question: String) {
        self.pending.push(PendingQuestion { request, question });
    }

    pub fn resolve_pending(&mut self, request: u64) -> Option<PendingQuestion> {
        let idx = self.pending.iter().position(|p| p.request == request)?;
        Some(self.pending.remove(idx))
    }

    pub fn push(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    pub fn clear(&mut self) {
        self.turns.clear();
        self.pending.clear();
    }
}

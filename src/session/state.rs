use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::feedback::Feedback;
use super::flight::{Debounce, FlightTrigger, UploadFlight};
use super::selection::{FileInputMirror, FileSelection, SelectionKey};
use super::transcript::{ChatTurn, Transcript};
use super::DocumentFile;
use crate::api::{ChatRequest, UploadReceipt};
use crate::error::ClientError;
use crate::validation::{validate_question, validate_upload};

/// Ids the page was opened with, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialSession {
    pub conversation_id: Option<String>,
    pub file_id: Option<String>,
}

impl InitialSession {
    pub fn new(conversation_id: Option<String>, file_id: Option<String>) -> Self {
        fn clean(id: Option<String>) -> Option<String> {
            id.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        Self {
            conversation_id: clean(conversation_id),
            file_id: clean(file_id),
        }
    }
}

/// Identifies one request and the session generation it was issued in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    request: u64,
}

impl Ticket {
    pub fn request(&self) -> u64 {
        self.request
    }
}

#[derive(Debug, Clone)]
pub struct UploadJob<F> {
    pub ticket: Ticket,
    pub key: SelectionKey,
    pub file: F,
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone)]
pub enum UploadStart<F> {
    Started(UploadJob<F>),
    Coalesced,
    UpToDate,
    NothingSelected,
    /// Refused locally; an error banner is already showing.
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskJob {
    pub ticket: Ticket,
    pub request: ChatRequest,
}

/// Everything one page session knows. All transitions go through here.
pub struct DocQaSession<F> {
    selection: FileSelection<F>,
    question: String,
    hints: String,
    file_id: Option<String>,
    /// Selection entry the current `file_id` was uploaded from.
    uploaded_from: Option<SelectionKey>,
    conversation_id: Option<String>,
    transcript: Transcript,
    feedback: Feedback,
    flight: UploadFlight,
    debounce: Debounce,
    generation: u64,
    next_request: u64,
}

impl<F> Default for DocQaSession<F> {
    fn default() -> Self {
        Self::from_initial(InitialSession::default())
    }
}

impl<F> DocQaSession<F> {
    pub fn from_initial(initial: InitialSession) -> Self {
        Self {
            selection: FileSelection::default(),
            question: String::new(),
            hints: String::new(),
            file_id: initial.file_id,
            uploaded_from: None,
            conversation_id: initial.conversation_id,
            transcript: Transcript::default(),
            feedback: Feedback::default(),
            flight: UploadFlight::default(),
            debounce: Debounce::default(),
            generation: 0,
            next_request: 0,
        }
    }

    pub fn attach_mirror(&mut self, mirror: Box<dyn FileInputMirror<F>>) {
        self.selection.attach_mirror(mirror);
    }

    pub fn selection(&self) -> &FileSelection<F> {
        &self.selection
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn hints(&self) -> &str {
        &self.hints
    }

    pub fn set_question(&mut self, question: String) {
        self.question = question;
    }

    pub fn set_hints(&mut self, hints: String) {
        self.hints = hints;
    }

    pub fn file_id(&self) -> Option<&str> {
        self.file_id.as_deref()
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn feedback(&self) -> &Feedback {
        &self.feedback
    }

    pub fn feedback_mut(&mut self) -> &mut Feedback {
        &mut self.feedback
    }

    pub fn is_loading(&self) -> bool {
        self.feedback.is_loading()
    }

    pub fn is_uploading(&self) -> bool {
        self.flight.is_running()
    }

    pub fn add_files(&mut self, files: impl IntoIterator<Item = F>) -> usize {
        self.selection.add(files)
    }

    /// Removing the entry the file id came from, or emptying the selection,
    /// drops the file id. The conversation id stays.
    pub fn remove_file(&mut self, index: usize) -> Option<F> {
        let removed_key = self.selection.entries().get(index).map(|e| e.key);
        let removed = self.selection.remove(index)?;
        if self.selection.is_empty() || (removed_key.is_some() && removed_key == self.uploaded_from) {
            self.forget_file();
        }
        Some(removed)
    }

    fn forget_file(&mut self) {
        self.file_id = None;
        self.uploaded_from = None;
    }

    pub fn arm_upload_debounce(&mut self) -> u64 {
        self.debounce.arm()
    }

    pub fn debounce_is_current(&self, token: u64) -> bool {
        self.debounce.is_current(token)
    }

    /// Both ids a question needs, or `NoDocument`.
    pub fn chat_context(&self) -> Result<(String, String), ClientError> {
        match (&self.file_id, &self.conversation_id) {
            (Some(file_id), Some(conversation_id)) => Ok((file_id.clone(), conversation_id.clone())),
            _ => Err(ClientError::NoDocument),
        }
    }

    pub fn is_stale(&self, ticket: Ticket) -> bool {
        ticket.generation != self.generation
    }

    /// Back to a blank page. Requests already out keep the overlay up until
    /// they return, but their results are dropped.
    pub fn clear(&mut self) {
        self.selection.clear();
        self.question.clear();
        self.hints.clear();
        self.forget_file();
        self.conversation_id = None;
        self.transcript.clear();
        self.feedback.clear_error();
        self.flight.reset();
        self.debounce.cancel();
        self.generation += 1;
        info!("session cleared, generation {}", self.generation);
    }

    fn next_ticket(&mut self) -> Ticket {
        self.next_request += 1;
        Ticket {
            generation: self.generation,
            request: self.next_request,
        }
    }

    pub fn begin_ask(&mut self) -> Option<AskJob> {
        if let Err(e) = validate_question(&self.question, &self.hints) {
            self.feedback.show_error(e.to_string());
            return None;
        }
        let (file_id, conversation_id) = match self.chat_context() {
            Ok(ids) => ids,
            Err(e) => {
                self.feedback.show_error(e.to_string());
                return None;
            }
        };

        let ticket = self.next_ticket();
        self.transcript.push_pending(ticket.request, self.question.clone());
        self.feedback.begin_loading();

        Some(AskJob {
            ticket,
            request: ChatRequest {
                hints: self.hints.clone(),
                question: self.question.clone(),
                file_id,
                conversation_id,
            },
        })
    }

    pub fn finish_ask(&mut self, job: AskJob, result: Result<String, ClientError>, now: DateTime<Utc>) {
        self.feedback.end_loading();
        self.transcript.resolve_pending(job.ticket.request);

        if self.is_stale(job.ticket) {
            debug!("dropping answer for request {} from a cleared session", job.ticket.request);
            return;
        }

        match result {
            Ok(answer) => self.transcript.push(ChatTurn {
                question: job.request.question,
                answer,
                answered_at: now,
            }),
            Err(e) => {
                warn!("question failed: {e:?}");
                self.feedback.show_error(e.to_string());
            }
        }
    }
}

impl<F: DocumentFile + Clone> DocQaSession<F> {
    /// Starts an upload of the first selected file if one is due.
    pub fn begin_upload(&mut self) -> UploadStart<F> {
        let Some(head) = self.selection.first() else {
            return UploadStart::NothingSelected;
        };
        let key = head.key;
        let file = head.file.clone();

        match self.flight.trigger(key) {
            FlightTrigger::Coalesced => return UploadStart::Coalesced,
            FlightTrigger::UpToDate => return UploadStart::UpToDate,
            FlightTrigger::Start => {}
        }

        if let Err(e) = validate_upload(&file) {
            self.flight.settle(key);
            self.forget_file();
            self.feedback.show_error(e.to_string());
            return UploadStart::Rejected;
        }

        let ticket = self.next_ticket();
        self.feedback.begin_loading();
        UploadStart::Started(UploadJob {
            ticket,
            key,
            file,
            conversation_id: self.conversation_id.clone(),
        })
    }

    /// Applies an upload result. Returns true when the selection moved on
    /// while the request was out and another upload check is due.
    pub fn finish_upload(&mut self, job: UploadJob<F>, result: Result<UploadReceipt, ClientError>) -> bool {
        self.feedback.end_loading();
        let coalesced = self.flight.settle(job.key);

        if self.is_stale(job.ticket) {
            debug!("dropping upload result for {} from a cleared session", job.file.file_name());
            return coalesced;
        }
        if self.selection.first().map(|e| e.key) != Some(job.key) {
            debug!("upload of {} superseded by a newer selection", job.file.file_name());
            return coalesced || !self.selection.is_empty();
        }

        match result {
            Ok(receipt) => {
                info!("uploaded {} as file {}", job.file.file_name(), receipt.file_id);
                self.flight.mark_uploaded(job.key);
                self.file_id = Some(receipt.file_id);
                self.uploaded_from = Some(job.key);
                self.conversation_id = receipt.conversation_id.or(job.conversation_id);
                self.transcript.clear();
                self.feedback
                    .show_success(receipt.message.unwrap_or_else(|| "File uploaded successfully".to_string()));
            }
            Err(e) => {
                warn!("upload of {} failed: {e:?}", job.file.file_name());
                self.forget_file();
                self.feedback.show_error(e.to_string());
            }
        }
        coalesced
    }
}

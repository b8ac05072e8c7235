//! Client-side state for one page session: the file selection, the
//! document and conversation ids, the transcript and the feedback shown
//! around them. Nothing in here touches the DOM.

pub mod feedback;
pub mod flight;
pub mod selection;
pub mod state;
pub mod transcript;

pub use feedback::{Banner, BannerId, BannerKind, Feedback};
pub use selection::{FileInputMirror, FileSelection, Selected, SelectionKey};
pub use state::{AskJob, DocQaSession, InitialSession, Ticket, UploadJob, UploadStart};
pub use transcript::{ChatTurn, PendingQuestion, Transcript};

/// The bits of a file handle the session needs.
pub trait DocumentFile {
    fn file_name(&self) -> String;
    fn byte_len(&self) -> u64;
}

impl DocumentFile for web_sys::File {
    fn file_name(&self) -> String {
        self.name()
    }

    fn byte_len(&self) -> u64 {
        self.size() as u64
    }
}

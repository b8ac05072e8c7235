//! Browser-side implementations of the coordinator seams.

use std::future::Future;
use std::time::Duration;

use leptos::html::Input;
use leptos::prelude::*;
use log::error;
use web_sys::{DataTransfer, File, FileList};

use crate::coordinator::{Scheduler, SessionStore};
use crate::session::{DocQaSession, FileInputMirror};

pub type SessionSignal = RwSignal<DocQaSession<File>, LocalStorage>;

impl<F: 'static> SessionStore for RwSignal<DocQaSession<F>, LocalStorage> {
    type File = F;

    fn apply<R>(&self, f: impl FnOnce(&mut DocQaSession<F>) -> R) -> Option<R> {
        self.try_update(f)
    }
}

/// `set_timeout` and `spawn_local` on the page's event loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    fn schedule(&self, delay: Duration, task: impl FnOnce() + 'static) {
        set_timeout(task, delay);
    }

    fn spawn(&self, task: impl Future<Output = ()> + 'static) {
        leptos::task::spawn_local(task);
    }
}

/// Rewrites the `<input type="file">` contents from the selection.
pub struct InputMirror {
    input: NodeRef<Input>,
}

impl InputMirror {
    pub fn new(input: NodeRef<Input>) -> Self {
        Self { input }
    }
}

impl FileInputMirror<File> for InputMirror {
    fn mirror(&mut self, files: &[&File]) {
        let Some(input) = self.input.get_untracked() else {
            return;
        };
        let transfer = match DataTransfer::new() {
            Ok(transfer) => transfer,
            Err(e) => {
                error!("could not create DataTransfer to sync file input: {e:?}");
                return;
            }
        };
        for file in files {
            if let Err(e) = transfer.items().add_with_file(file) {
                error!("could not add {} to file input: {e:?}", file.name());
            }
        }
        input.set_files(transfer.files().as_ref());
    }
}

pub fn files_from_list(list: &FileList) -> Vec<File> {
    (0..list.length()).filter_map(|i| list.get(i)).collect()
}

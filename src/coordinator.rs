//! Async flows that move a [`DocQaSession`] through upload and chat.
//!
//! The flows never hold a borrow of the session across an await: each
//! step takes what it needs through [`SessionStore::apply`], awaits the
//! network, then applies the result in a second step.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use log::{debug, info};

use crate::api::DocQaApi;
use crate::config::UPLOAD_DEBOUNCE;
use crate::session::{DocQaSession, DocumentFile, UploadStart};

/// Somewhere the session lives. `None` means it is gone (the page was torn
/// down) and the flow should stop.
pub trait SessionStore: Clone + 'static {
    type File;

    fn apply<R>(&self, f: impl FnOnce(&mut DocQaSession<Self::File>) -> R) -> Option<R>;
}

/// Timers and task spawning on the page's event loop.
pub trait Scheduler: Clone + 'static {
    fn schedule(&self, delay: Duration, task: impl FnOnce() + 'static);
    fn spawn(&self, task: impl Future<Output = ()> + 'static);
}

/// Queues the auto-dismissal of every banner shown since the last call.
pub fn schedule_dismissals<S, R>(store: &S, scheduler: &R)
where
    S: SessionStore,
    R: Scheduler,
{
    let expiring = store
        .apply(|s| s.feedback_mut().drain_expiring())
        .unwrap_or_default();
    for (id, ttl) in expiring {
        let store = store.clone();
        scheduler.schedule(ttl, move || {
            store.apply(|s| s.feedback_mut().dismiss(id));
        });
    }
}

/// Called after every picker, drop or remove event. Bursts of changes
/// inside the debounce window collapse into one upload check.
pub fn on_selection_changed<A, S, R>(api: A, store: S, scheduler: R)
where
    A: DocQaApi<S::File> + 'static,
    S: SessionStore,
    S::File: DocumentFile + Clone + 'static,
    R: Scheduler,
{
    let Some(token) = store.apply(|s| s.arm_upload_debounce()) else {
        return;
    };
    let timer = scheduler.clone();
    timer.schedule(UPLOAD_DEBOUNCE, move || {
        if store.apply(|s| s.debounce_is_current(token)) == Some(true) {
            scheduler.spawn(upload_selected(api, store, scheduler.clone()));
        }
    });
}

/// Uploads the first selected file if it has not been sent yet, then
/// repeats while the selection moved on during the request.
pub async fn upload_selected<A, S, R>(api: A, store: S, scheduler: R)
where
    A: DocQaApi<S::File>,
    S: SessionStore,
    S::File: DocumentFile + Clone,
    R: Scheduler,
{
    loop {
        let Some(start) = store.apply(|s| s.begin_upload()) else {
            return;
        };
        schedule_dismissals(&store, &scheduler);

        let job = match start {
            UploadStart::Started(job) => job,
            UploadStart::Coalesced => {
                debug!("upload already in flight, will re-check when it settles");
                return;
            }
            UploadStart::UpToDate | UploadStart::NothingSelected | UploadStart::Rejected => return,
        };

        info!("uploading {}", job.file.file_name());
        let result = api.upload(&job.file, job.conversation_id.as_deref()).await;
        let again = store.apply(|s| s.finish_upload(job, result)).unwrap_or(false);
        schedule_dismissals(&store, &scheduler);

        if !again {
            return;
        }
    }
}

/// Sends the question currently in the form.
pub async fn ask_assistant<A, S, R>(api: A, store: S, scheduler: R)
where
    A: DocQaApi<S::File>,
    S: SessionStore,
    R: Scheduler,
{
    let job = store.apply(|s| s.begin_ask()).flatten();
    schedule_dismissals(&store, &scheduler);
    let Some(job) = job else {
        return;
    };

    debug!("asking request {}", job.ticket.request());
    let result = api.ask(&job.request).await;
    store.apply(|s| s.finish_ask(job, result, Utc::now()));
    schedule_dismissals(&store, &scheduler);
}

pub fn clear_chat<S: SessionStore>(store: &S) {
    store.apply(|s| s.clear());
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use futures::executor::{LocalPool, LocalSpawner};
    use futures::task::LocalSpawnExt;

    use super::*;
    use crate::api::{ChatRequest, UploadReceipt};
    use crate::config::{ERROR_BANNER_TTL, SUCCESS_BANNER_TTL};
    use crate::error::ClientError;
    use crate::session::testing::TestFile;
    use crate::session::InitialSession;

    #[derive(Clone)]
    struct Store(Rc<RefCell<DocQaSession<TestFile>>>);

    impl Store {
        fn new(initial: InitialSession) -> Self {
            Store(Rc::new(RefCell::new(DocQaSession::from_initial(initial))))
        }

        fn read<R>(&self, f: impl FnOnce(&DocQaSession<TestFile>) -> R) -> R {
            f(&self.0.borrow())
        }
    }

    impl SessionStore for Store {
        type File = TestFile;

        fn apply<R>(&self, f: impl FnOnce(&mut DocQaSession<TestFile>) -> R) -> Option<R> {
            Some(f(&mut self.0.borrow_mut()))
        }
    }

    type Timer = (Duration, Box<dyn FnOnce()>);

    #[derive(Clone)]
    struct ManualScheduler {
        timers: Rc<RefCell<Vec<Timer>>>,
        spawner: LocalSpawner,
    }

    impl ManualScheduler {
        fn new(pool: &LocalPool) -> Self {
            Self {
                timers: Rc::default(),
                spawner: pool.spawner(),
            }
        }

        fn delays(&self) -> Vec<Duration> {
            self.timers.borrow().iter().map(|(d, _)| *d).collect()
        }

        /// Fires every timer queued so far, as if its delay elapsed.
        fn fire_all(&self) {
            let due: Vec<Timer> = self.timers.borrow_mut().drain(..).collect();
            for (_, task) in due {
                task();
            }
        }
    }

    impl Scheduler for ManualScheduler {
        fn schedule(&self, delay: Duration, task: impl FnOnce() + 'static) {
            self.timers.borrow_mut().push((delay, Box::new(task)));
        }

        fn spawn(&self, task: impl Future<Output = ()> + 'static) {
            self.spawner.spawn_local(task).expect("spawn on test pool");
        }
    }

    #[derive(Clone, Default)]
    struct MockApi {
        uploads: Rc<RefCell<Vec<(String, Option<String>)>>>,
        asks: Rc<RefCell<Vec<ChatRequest>>>,
        upload_replies: Rc<RefCell<VecDeque<Result<UploadReceipt, ClientError>>>>,
        ask_replies: Rc<RefCell<VecDeque<Result<String, ClientError>>>>,
        // overlay state observed while each request was out
        loading_seen: Rc<RefCell<Vec<bool>>>,
        probe: Rc<RefCell<Option<Store>>>,
    }

    impl MockApi {
        fn watching(store: &Store) -> Self {
            let api = MockApi::default();
            *api.probe.borrow_mut() = Some(store.clone());
            api
        }

        fn reply_upload(&self, reply: Result<UploadReceipt, ClientError>) {
            self.upload_replies.borrow_mut().push_back(reply);
        }

        fn reply_ask(&self, reply: Result<String, ClientError>) {
            self.ask_replies.borrow_mut().push_back(reply);
        }

        fn observe_overlay(&self) {
            if let Some(store) = self.probe.borrow().as_ref() {
                let loading = store.read(|s| s.is_loading());
                self.loading_seen.borrow_mut().push(loading);
            }
        }
    }

    impl DocQaApi<TestFile> for MockApi {
        async fn upload(&self, file: &TestFile, conversation_id: Option<&str>) -> Result<UploadReceipt, ClientError> {
            self.observe_overlay();
            self.uploads
                .borrow_mut()
                .push((file.name.clone(), conversation_id.map(str::to_string)));
            self.upload_replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ClientError::Transport("no reply queued".into())))
        }

        async fn ask(&self, request: &ChatRequest) -> Result<String, ClientError> {
            self.observe_overlay();
            self.asks.borrow_mut().push(request.clone());
            self.ask_replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ClientError::Transport("no reply queued".into())))
        }
    }

    fn uploaded(file_id: &str, conversation_id: &str) -> Result<UploadReceipt, ClientError> {
        Ok(UploadReceipt {
            file_id: file_id.into(),
            conversation_id: Some(conversation_id.into()),
            message: Some("File uploaded successfully".into()),
        })
    }

    fn ask(pool: &mut LocalPool, api: &MockApi, store: &Store, scheduler: &ManualScheduler, question: &str) {
        store.apply(|s| s.set_question(question.to_string()));
        pool.run_until(ask_assistant(api.clone(), store.clone(), scheduler.clone()));
    }

    #[test]
    fn empty_question_never_hits_the_network() {
        let mut pool = LocalPool::new();
        let scheduler = ManualScheduler::new(&pool);
        let store = Store::new(InitialSession::new(Some("C1".into()), Some("F1".into())));
        let api = MockApi::watching(&store);

        ask(&mut pool, &api, &store, &scheduler, "");

        assert!(api.asks.borrow().is_empty());
        assert_eq!(
            store.read(|s| s.feedback().error().map(|b| b.message.clone())),
            Some("Please enter a question.".to_string())
        );
    }

    #[test]
    fn question_before_upload_never_hits_the_network() {
        let mut pool = LocalPool::new();
        let scheduler = ManualScheduler::new(&pool);
        let store = Store::new(InitialSession::default());
        let api = MockApi::watching(&store);

        ask(&mut pool, &api, &store, &scheduler, "What is X?");

        assert!(api.asks.borrow().is_empty());
        assert_eq!(
            store.read(|s| s.feedback().error().map(|b| b.message.clone())),
            Some("Please upload a file first.".to_string())
        );
    }

    #[test]
    fn debounced_upload_then_questions_use_returned_ids() {
        let mut pool = LocalPool::new();
        let scheduler = ManualScheduler::new(&pool);
        let store = Store::new(InitialSession::new(Some("C0".into()), None));
        let api = MockApi::watching(&store);
        api.reply_upload(uploaded("F1", "C1"));

        // a burst of change events: only the last armed timer uploads
        store.apply(|s| s.add_files([TestFile::pdf("doc.pdf")]));
        on_selection_changed(api.clone(), store.clone(), scheduler.clone());
        on_selection_changed(api.clone(), store.clone(), scheduler.clone());
        assert_eq!(scheduler.delays(), vec![UPLOAD_DEBOUNCE, UPLOAD_DEBOUNCE]);
        scheduler.fire_all();
        pool.run_until_stalled();

        assert_eq!(
            *api.uploads.borrow(),
            vec![("doc.pdf".to_string(), Some("C0".to_string()))]
        );
        assert_eq!(store.read(|s| s.file_id().map(str::to_string)), Some("F1".into()));
        assert_eq!(scheduler.delays(), vec![SUCCESS_BANNER_TTL]);

        api.reply_ask(Ok("X is Y".into()));
        api.reply_ask(Ok("Z is W".into()));
        ask(&mut pool, &api, &store, &scheduler, "What is X?");
        ask(&mut pool, &api, &store, &scheduler, "And Z?");

        let asks = api.asks.borrow();
        assert_eq!(asks.len(), 2);
        for request in asks.iter() {
            assert_eq!(request.file_id, "F1");
            assert_eq!(request.conversation_id, "C1");
        }

        let turns = store.read(|s| {
            s.transcript()
                .turns()
                .iter()
                .map(|t| (t.question.clone(), t.answer.clone()))
                .collect::<Vec<_>>()
        });
        assert_eq!(
            turns,
            vec![
                ("What is X?".to_string(), "X is Y".to_string()),
                ("And Z?".to_string(), "Z is W".to_string()),
            ]
        );
    }

    #[test]
    fn failed_upload_shows_message_and_banner_expires() {
        let mut pool = LocalPool::new();
        let scheduler = ManualScheduler::new(&pool);
        let store = Store::new(InitialSession::new(Some("C0".into()), Some("F0".into())));
        let api = MockApi::watching(&store);
        api.reply_upload(Err(ClientError::Server {
            status: 200,
            message: "bad file".into(),
            errors: vec![],
        }));

        store.apply(|s| s.add_files([TestFile::pdf("doc.pdf")]));
        pool.run_until(upload_selected(api.clone(), store.clone(), scheduler.clone()));

        assert_eq!(store.read(|s| s.file_id().map(str::to_string)), None);
        assert_eq!(
            store.read(|s| s.feedback().error().map(|b| b.message.clone())),
            Some("bad file".to_string())
        );
        assert_eq!(scheduler.delays(), vec![ERROR_BANNER_TTL]);

        scheduler.fire_all();
        assert!(store.read(|s| s.feedback().error().is_none()));
    }

    #[test]
    fn repicking_after_a_failed_upload_sends_it_again() {
        let mut pool = LocalPool::new();
        let scheduler = ManualScheduler::new(&pool);
        let store = Store::new(InitialSession::new(Some("C0".into()), None));
        let api = MockApi::watching(&store);
        api.reply_upload(Err(ClientError::Transport("offline".into())));
        api.reply_upload(uploaded("F1", "C0"));

        store.apply(|s| s.add_files([TestFile::pdf("doc.pdf")]));
        on_selection_changed(api.clone(), store.clone(), scheduler.clone());
        scheduler.fire_all();
        pool.run_until_stalled();
        assert_eq!(api.uploads.borrow().len(), 1);
        assert_eq!(store.read(|s| s.file_id().map(str::to_string)), None);

        // nothing is retried until the user touches the selection again
        scheduler.fire_all();
        pool.run_until_stalled();
        assert_eq!(api.uploads.borrow().len(), 1);

        store.apply(|s| s.add_files([TestFile::pdf("doc.pdf")]));
        on_selection_changed(api.clone(), store.clone(), scheduler.clone());
        scheduler.fire_all();
        pool.run_until_stalled();

        assert_eq!(api.uploads.borrow().len(), 2);
        assert_eq!(api.uploads.borrow()[1].0, "doc.pdf");
        assert_eq!(store.read(|s| s.file_id().map(str::to_string)), Some("F1".into()));
    }

    #[test]
    fn overlay_is_up_only_while_requests_are_out() {
        let mut pool = LocalPool::new();
        let scheduler = ManualScheduler::new(&pool);
        let store = Store::new(InitialSession::default());
        let api = MockApi::watching(&store);
        api.reply_upload(uploaded("F1", "C1"));
        api.reply_ask(Err(ClientError::Transport("offline".into())));

        assert!(!store.read(|s| s.is_loading()));
        store.apply(|s| s.add_files([TestFile::pdf("doc.pdf")]));
        pool.run_until(upload_selected(api.clone(), store.clone(), scheduler.clone()));
        assert!(!store.read(|s| s.is_loading()));

        ask(&mut pool, &api, &store, &scheduler, "What is X?");
        assert!(!store.read(|s| s.is_loading()));

        assert_eq!(*api.loading_seen.borrow(), vec![true, true]);
    }

    #[test]
    fn stale_banner_timer_does_not_remove_newer_banner() {
        let mut pool = LocalPool::new();
        let scheduler = ManualScheduler::new(&pool);
        let store = Store::new(InitialSession::default());
        let api = MockApi::watching(&store);

        ask(&mut pool, &api, &store, &scheduler, "");
        let first_timers = scheduler.timers.borrow_mut().drain(..).collect::<Vec<_>>();
        ask(&mut pool, &api, &store, &scheduler, "What is X?");

        for (_, task) in first_timers {
            task();
        }
        assert_eq!(
            store.read(|s| s.feedback().error().map(|b| b.message.clone())),
            Some("Please upload a file first.".to_string())
        );
    }

    #[test]
    fn clear_chat_resets_the_page_and_cancels_pending_debounce() {
        let mut pool = LocalPool::new();
        let scheduler = ManualScheduler::new(&pool);
        let store = Store::new(InitialSession::new(Some("C0".into()), Some("F0".into())));
        let api = MockApi::watching(&store);
        api.reply_ask(Ok("X is Y".into()));
        ask(&mut pool, &api, &store, &scheduler, "What is X?");
        store.apply(|s| {
            s.set_hints("hint".into());
            s.add_files([TestFile::pdf("doc.pdf")]);
        });
        on_selection_changed(api.clone(), store.clone(), scheduler.clone());

        clear_chat(&store);
        scheduler.fire_all();
        pool.run_until_stalled();

        assert!(api.uploads.borrow().is_empty());
        store.read(|s| {
            assert_eq!(s.question(), "");
            assert_eq!(s.hints(), "");
            assert!(s.selection().is_empty());
            assert_eq!(s.file_id(), None);
            assert_eq!(s.conversation_id(), None);
            assert!(s.transcript().is_empty());
            assert!(s.feedback().error().is_none());
        });
    }

    #[test]
    fn selection_change_during_upload_uploads_new_head_afterwards() {
        let mut pool = LocalPool::new();
        let scheduler = ManualScheduler::new(&pool);
        let store = Store::new(InitialSession::default());
        let api = MockApi::watching(&store);
        api.reply_upload(uploaded("F2", "C2"));

        store.apply(|s| s.add_files([TestFile::pdf("a.pdf"), TestFile::pdf("b.pdf")]));
        let job = match store.apply(|s| s.begin_upload()).unwrap() {
            UploadStart::Started(job) => job,
            other => panic!("expected start, got {other:?}"),
        };
        // while a.pdf is out, the user removes it
        store.apply(|s| s.remove_file(0));
        pool.run_until(upload_selected(api.clone(), store.clone(), scheduler.clone()));
        assert!(api.uploads.borrow().is_empty());

        let again = store.apply(|s| s.finish_upload(job, uploaded("F1", "C1"))).unwrap();
        assert!(again);
        pool.run_until(upload_selected(api.clone(), store.clone(), scheduler.clone()));

        assert_eq!(api.uploads.borrow().len(), 1);
        assert_eq!(api.uploads.borrow()[0].0, "b.pdf");
        assert_eq!(store.read(|s| s.file_id().map(str::to_string)), Some("F2".into()));
    }
}

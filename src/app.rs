use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};

use chrono::{DateTime, Local};

use crate::client::{RecommendClient, RequestError};
use crate::form::FormState;
use crate::models::{RecommendationRecord, ResumeDraft};
use crate::view::{Resolution, ResultsView};

/// A finished request, tagged with the sequence number it was issued under.
#[derive(Debug)]
pub struct Completion {
    pub seq: u64,
    pub result: Result<Vec<RecommendationRecord>, RequestError>,
}

/// Starts a request in the background. The outcome comes back later as a
/// [`Completion`] through whatever channel the implementation owns.
pub trait Dispatch {
    fn dispatch(&self, seq: u64, draft: ResumeDraft);
}

pub struct TokioDispatcher {
    handle: tokio::runtime::Handle,
    client: Arc<RecommendClient>,
    tx: Sender<Completion>,
}

impl TokioDispatcher {
    pub fn new(
        handle: tokio::runtime::Handle,
        client: RecommendClient,
    ) -> (Self, Receiver<Completion>) {
        let (tx, rx) = channel();
        let dispatcher = Self {
            handle,
            client: Arc::new(client),
            tx,
        };
        (dispatcher, rx)
    }
}

impl Dispatch for TokioDispatcher {
    fn dispatch(&self, seq: u64, draft: ResumeDraft) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let result = client.fetch_recommendations(&draft).await;
            if tx.send(Completion { seq, result }).is_err() {
                tracing::debug!(seq, "ui gone before response arrived");
            }
        });
    }
}

pub struct App {
    pub form: FormState,
    pub results: ResultsView,
    dispatcher: Box<dyn Dispatch>,
    last_completed: Option<DateTime<Local>>,
}

impl App {
    pub fn new(form: FormState, dispatcher: Box<dyn Dispatch>) -> Self {
        Self {
            form,
            results: ResultsView::new(),
            dispatcher,
            last_completed: None,
        }
    }

    pub fn can_submit(&self) -> bool {
        self.form.is_valid() && !self.results.is_loading()
    }

    /// Sends the current draft. Does nothing when the form is empty or a
    /// request is already outstanding.
    pub fn submit(&mut self) -> bool {
        if !self.can_submit() {
            return false;
        }
        let seq = self.results.begin();
        tracing::info!(seq, "requesting recommendations");
        self.dispatcher.dispatch(seq, self.form.draft().clone());
        true
    }

    pub fn on_completion(&mut self, completion: Completion) {
        let Completion { seq, result } = completion;
        let outcome = match &result {
            Ok(records) => format!("{} record(s)", records.len()),
            Err(RequestError::Status { status, message }) => {
                format!("status {}: {}", status, message)
            }
            Err(e) => format!("error: {}", e),
        };
        match self.results.resolve(seq, result) {
            Resolution::Applied => {
                tracing::info!(seq, %outcome, "response applied");
                self.last_completed = Some(Local::now());
            }
            Resolution::Stale => {
                tracing::warn!(seq, %outcome, "discarding stale response");
            }
        }
    }

    pub fn last_completed(&self) -> Option<DateTime<Local>> {
        self.last_completed
    }

    pub fn open_detail(&mut self, index: usize) -> bool {
        self.results.open(index)
    }

    pub fn close_detail(&mut self) {
        self.results.close();
    }

    pub fn tick(&mut self) {
        self.results.tick();
    }
}

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;

use crate::domain::entities::record::{QueryResult, Record};
use crate::domain::predicate::FilterWarning;
use crate::error::FetchError;
use crate::usecase::services::local_engine::apply_compiled;
use crate::usecase::services::planner::ResolutionPlan;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub phase: FetchPhase,
    pub rows: Vec<Record>,
    pub total_count: usize,
    pub error: Option<String>,
    pub warnings: Vec<FilterWarning>,
}

/// Identifies one issued request. Only the most recent ticket may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied { total_count: usize },
    Failed(FetchError),
    Superseded,
}

/// Runs resolution plans and owns the displayed rows and row count.
///
/// Requests may overlap; issuing a new ticket cancels the fetch of every
/// older one still in flight, and results are applied in issue order
/// only ("last request wins").
#[derive(Debug)]
pub struct FetchOrchestrator {
    view: Mutex<ViewState>,
    latest: watch::Sender<u64>,
    timeout: Duration,
}

impl Default for FetchOrchestrator {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}

impl FetchOrchestrator {
    pub fn new(timeout: Duration) -> Self {
        let (latest, _) = watch::channel(0);
        Self {
            view: Mutex::new(ViewState::default()),
            latest,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn snapshot(&self) -> ViewState {
        self.lock_view().clone()
    }

    pub fn phase(&self) -> FetchPhase {
        self.lock_view().phase
    }

    pub fn total_count(&self) -> usize {
        self.lock_view().total_count
    }

    pub fn latest_ticket(&self) -> Ticket {
        Ticket(*self.latest.borrow())
    }

    /// Issues a ticket and enters `Loading`, clearing any previous error.
    pub fn begin(&self) -> Ticket {
        let mut view = self.lock_view();
        self.latest.send_modify(|latest| *latest += 1);
        view.phase = FetchPhase::Loading;
        view.error = None;
        Ticket(*self.latest.borrow())
    }

    pub async fn resolve(&self, plan: ResolutionPlan) -> Outcome {
        let ticket = self.begin();
        self.run(ticket, plan).await
    }

    pub async fn run(&self, ticket: Ticket, plan: ResolutionPlan) -> Outcome {
        match plan {
            ResolutionPlan::Local {
                records,
                compiled,
                window,
                paginate,
            } => {
                let result = apply_compiled(&records, &compiled, window, paginate);
                self.apply(ticket, Ok(result))
            }
            ResolutionPlan::Remote {
                url,
                source,
                warnings,
            } => {
                let mut latest = self.latest.subscribe();
                if *latest.borrow_and_update() != ticket.0 {
                    return Outcome::Superseded;
                }
                tracing::info!(%url, "fetching remote page");
                let fetch = tokio::time::timeout(self.timeout, source.fetch_page(&url));
                let result = tokio::select! {
                    result = fetch => result.unwrap_or(Err(FetchError::Timeout { after: self.timeout })),
                    () = superseded(&mut latest, ticket) => {
                        tracing::debug!(?ticket, "cancelled superseded request");
                        return Outcome::Superseded;
                    }
                };
                self.apply(
                    ticket,
                    result.map(|mut page| {
                        page.warnings = warnings;
                        page
                    }),
                )
            }
        }
    }

    fn apply(&self, ticket: Ticket, result: Result<QueryResult, FetchError>) -> Outcome {
        let mut view = self.lock_view();
        if *self.latest.borrow() != ticket.0 {
            tracing::debug!(?ticket, "discarding stale result");
            return Outcome::Superseded;
        }
        match result {
            Ok(page) => {
                view.phase = FetchPhase::Success;
                view.rows = page.rows;
                view.total_count = page.total_count;
                view.warnings = page.warnings;
                Outcome::Applied {
                    total_count: view.total_count,
                }
            }
            Err(err) => {
                // Previous rows stay on display next to the message.
                tracing::warn!(error = %err, "resolution failed");
                view.phase = FetchPhase::Error;
                view.error = Some(err.to_string());
                Outcome::Failed(err)
            }
        }
    }

    fn lock_view(&self) -> MutexGuard<'_, ViewState> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn superseded(latest: &mut watch::Receiver<u64>, ticket: Ticket) {
    while latest.changed().await.is_ok() {
        if *latest.borrow_and_update() != ticket.0 {
            return;
        }
    }
    std::future::pending::<()>().await
}

//! Download coordinator.
//!
//! Orchestrates one request at a time:
//! permission -> staging -> fetch -> publish -> cleanup -> outcome.
//!
//! `start` runs on the interactive thread and only claims the state machine
//! and spawns a worker task. The worker owns every later transition and
//! reports to the interactive thread through [`UiEvent`]s. The claim uses
//! `send_if_modified` on the phase channel, so two racing `start` calls
//! cannot both leave `Idle`.
//!
//! Cancellation is not supported. A cancel operation would have to be checked
//! between chunks and still end in `Cleaning`.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::download::progress::ProgressThrottle;
use crate::download::{DownloadOutcome, DownloadRequest, Phase};
use crate::error::{FailureReason, FetchError, PublishError};
use crate::fetch::Fetcher;
use crate::fs::{suggested_name, StagedFile, StagingArea};
use crate::permission::{PermissionGate, PermissionState, PUBLISH_CAPABILITIES};
use crate::publish::{PublishTarget, Publisher};
use crate::status::{StatusPump, UiEvent};

/// Collaborators injected into the coordinator.
#[derive(Clone)]
pub struct Dependencies {
    pub permissions: Arc<PermissionGate>,
    pub staging: Arc<StagingArea>,
    pub fetcher: Arc<dyn Fetcher>,
    pub publisher: Arc<Publisher>,
}

/// Handle to an accepted request.
pub struct DownloadTicket {
    handle: JoinHandle<DownloadOutcome>,
}

impl DownloadTicket {
    /// Wait for the terminal outcome.
    pub async fn wait(self) -> DownloadOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => DownloadOutcome::Failure(FailureReason::Fetch(FetchError::Other(format!(
                "worker task failed: {}",
                e
            )))),
        }
    }
}

/// Single-flight download pipeline.
#[derive(Clone)]
pub struct DownloadCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    deps: Dependencies,
    subdirectory: Option<String>,
    phase: watch::Sender<Phase>,
    ui: mpsc::UnboundedSender<UiEvent>,
}

impl DownloadCoordinator {
    /// Build a coordinator and the pump the interactive thread must drive.
    pub fn new(deps: Dependencies, subdirectory: Option<String>) -> (Self, StatusPump) {
        let (ui, rx) = mpsc::unbounded_channel();
        let (phase, _) = watch::channel(Phase::Idle);

        let coordinator = Self {
            inner: Arc::new(Inner {
                deps,
                subdirectory,
                phase,
                ui,
            }),
        };

        (coordinator, StatusPump::new(rx))
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.inner.phase.borrow().clone()
    }

    /// Watch phase transitions.
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.inner.phase.subscribe()
    }

    /// Accept a request and start its worker.
    ///
    /// Fails with `InvalidInput` for an empty locator (the phase is left
    /// untouched) and with `Busy` while another request is in flight. Must be
    /// called from within a Tokio runtime.
    pub fn start(&self, locator: &str) -> Result<DownloadTicket, FailureReason> {
        let request = DownloadRequest::new(locator)?;

        let claimed = self.inner.phase.send_if_modified(|phase| {
            if phase.accepts_start() {
                *phase = Phase::RequestingPermission;
                true
            } else {
                false
            }
        });

        if !claimed {
            tracing::debug!("Rejecting {}: coordinator busy", request.locator());
            return Err(FailureReason::Busy);
        }

        tracing::info!("Starting download: {}", request.locator());
        self.inner.notify(UiEvent::Busy(true));
        self.inner.notify(UiEvent::Phase(Phase::RequestingPermission));

        let inner = self.inner.clone();
        let handle = tokio::spawn(async move { inner.run(request).await });

        Ok(DownloadTicket { handle })
    }
}

impl Inner {
    fn notify(&self, event: UiEvent) {
        if self.ui.send(event).is_err() {
            tracing::debug!("Status pump dropped; event discarded");
        }
    }

    fn transition(&self, phase: Phase) {
        tracing::debug!("Phase -> {}", phase);
        self.phase.send_replace(phase.clone());
        self.notify(UiEvent::Phase(phase));
    }

    async fn run(&self, request: DownloadRequest) -> DownloadOutcome {
        let staged_dir = Mutex::new(None);
        let outcome = match AssertUnwindSafe(self.execute(&request, &staged_dir))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(panic) => {
                let message = panic_message(&*panic);
                tracing::error!("Worker for {} panicked: {}", request.locator(), message);
                self.cleanup_abandoned(&staged_dir).await;
                let reason = FetchError::Other(format!("worker panicked: {}", message));
                DownloadOutcome::Failure(reason.into())
            }
        };

        match &outcome {
            DownloadOutcome::Success(name) => {
                tracing::info!("Published {} as '{}'", request.locator(), name)
            }
            DownloadOutcome::Failure(reason) => {
                tracing::warn!("Download of {} failed: {}", request.locator(), reason)
            }
        }

        self.phase.send_replace(Phase::Done(outcome.clone()));
        self.notify(UiEvent::Finished(outcome.clone()));
        outcome
    }

    /// `staged_path` holds the staged file's path from allocation until
    /// cleanup, so a panic in between can still be cleaned up.
    async fn execute(
        &self,
        request: &DownloadRequest,
        staged_path: &Mutex<Option<PathBuf>>,
    ) -> DownloadOutcome {
        let permission = self.deps.permissions.ensure(PUBLISH_CAPABILITIES).await;
        if !permission.allows_write() {
            return DownloadOutcome::Failure(FailureReason::PermissionDenied);
        }

        self.transition(Phase::Fetching);
        let staged = match self
            .deps
            .staging
            .allocate(&suggested_name(request.locator()))
            .await
        {
            Ok(staged) => staged,
            Err(reason) => return DownloadOutcome::Failure(reason),
        };
        *lock_slot(staged_path) = Some(staged.path.clone());

        let (staged, outcome) = self.fetch_and_publish(request, staged, permission).await;

        lock_slot(staged_path).take();
        self.transition(Phase::Cleaning);
        if let Err(e) = self.deps.staging.cleanup(staged).await {
            tracing::warn!("Failed to remove staged file: {}", e);
        }

        outcome
    }

    /// Remove the staging left by a panicked worker, if any was allocated.
    async fn cleanup_abandoned(&self, staged_path: &Mutex<Option<PathBuf>>) {
        let Some(path) = lock_slot(staged_path).take() else {
            return;
        };

        self.transition(Phase::Cleaning);
        let staged = StagedFile {
            path,
            size_bytes: 0,
        };
        if let Err(e) = self.deps.staging.cleanup(staged).await {
            tracing::warn!("Failed to remove staged file: {}", e);
        }
    }

    /// Every path hands the staged file back so the caller can clean it up.
    async fn fetch_and_publish(
        &self,
        request: &DownloadRequest,
        staged: StagedFile,
        permission: PermissionState,
    ) -> (StagedFile, DownloadOutcome) {
        let throttle = Mutex::new(ProgressThrottle::default());
        let on_progress = |done: u64, total: Option<u64>| {
            let emit = throttle
                .lock()
                .map(|mut t| t.should_emit(done, total))
                .unwrap_or(true);
            if emit {
                self.notify(UiEvent::Progress { done, total });
            }
        };

        let fetched = match self
            .deps
            .fetcher
            .fetch(request.locator(), staged.dir(), &on_progress)
            .await
        {
            Ok(path) => path,
            Err(e) => return (staged, DownloadOutcome::Failure(FailureReason::Fetch(e))),
        };

        let staged = match self.deps.staging.settle(staged, fetched).await {
            Ok(staged) => staged,
            Err((staged, reason)) => return (staged, DownloadOutcome::Failure(reason)),
        };
        tracing::debug!(
            "Staged {} ({} bytes)",
            staged.path.display(),
            staged.size_bytes
        );

        self.transition(Phase::Publishing);
        let target = PublishTarget::for_staged(&staged, self.subdirectory.as_deref());
        let publisher = self.deps.publisher.clone();
        let staged_path = staged.path.clone();
        let staged_size = staged.size_bytes;

        let published = tokio::task::spawn_blocking(move || {
            let result = publisher.publish(&staged, &target, permission);
            (staged, result)
        })
        .await;

        match published {
            Ok((staged, Ok(name))) => (staged, DownloadOutcome::Success(name)),
            Ok((staged, Err(e))) => (staged, DownloadOutcome::Failure(FailureReason::Publish(e))),
            Err(e) => {
                let staged = StagedFile {
                    path: staged_path,
                    size_bytes: staged_size,
                };
                let reason = PublishError::CopyFailed {
                    reason: format!("publish task failed: {}", e),
                    partial_left: true,
                };
                (staged, DownloadOutcome::Failure(reason.into()))
            }
        }
    }
}

fn lock_slot<T>(slot: &Mutex<T>) -> MutexGuard<'_, T> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

//! Operation orchestrator - drives one export or import to its outcome
//!
//! A run moves through `Created → Submitted → Polling` and ends in exactly one
//! of `Succeeded`, `Failed` or `Aborted`. Every outcome is returned as an
//! [`OperationResult`]; nothing on this path panics or returns an error.

use super::progress::{emit, ProgressCallback, ProgressEvent};
use crate::adapters::dac::{RequestSubmitter, StatusPoller, Submission};
use crate::config::ServiceConfig;
use crate::domain::{
    AbortCause, OperationHandle, OperationKind, OperationRequest, OperationResult,
    StatusCredentials, StatusSnapshot,
};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Whether `run` waits for the service to finish
///
/// `NonBlocking` only applies to imports: an import returns
/// [`OperationResult::Submitted`] right after the service accepted it. Exports
/// are always tracked to a terminal status, whatever the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationMode {
    /// Poll until the service reports `Completed` or `Failed`
    #[default]
    Blocking,
    /// Return after submission (imports only)
    NonBlocking,
}

/// Timing of the polling loop
#[derive(Debug, Clone, PartialEq)]
pub struct PollSettings {
    /// Fixed delay between two status queries
    pub interval: Duration,
    /// Extra attempts for a status query that failed in transport
    pub max_retries: usize,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any retry delay
    pub max_delay: Duration,
    /// Growth factor between retry delays
    pub backoff_multiplier: f64,
}

impl PollSettings {
    /// Builds polling settings from the service section
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.poll_interval_seconds),
            max_retries: config.retry.max_retries,
            initial_delay: Duration::from_millis(config.retry.initial_delay_ms),
            max_delay: Duration::from_millis(config.retry.max_delay_ms),
            backoff_multiplier: config.retry.backoff_multiplier,
        }
    }

    /// Delay before retry number `attempt` (1-based)
    fn retry_delay(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as usize) as i32;
        let delay_ms =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        let capped = delay_ms.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self::from_config(&ServiceConfig::default())
    }
}

/// Lifecycle of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperationState {
    Created,
    Submitted,
    Polling,
    Succeeded,
    Failed,
    Aborted,
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationState::Created => "created",
            OperationState::Submitted => "submitted",
            OperationState::Polling => "polling",
            OperationState::Succeeded => "succeeded",
            OperationState::Failed => "failed",
            OperationState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Drives submit → poll → result for export and import requests
///
/// Runs share no mutable state; one orchestrator may serve any number of
/// sequential or concurrent runs.
///
/// # Example
///
/// ```rust,no_run
/// use sqlport::adapters::dac::DacClient;
/// use sqlport::config::load_config;
/// use sqlport::core::operation::{OperationMode, OperationOrchestrator, PollSettings};
/// use sqlport::domain::OperationKind;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config("sqlport.toml")?;
/// let client = Arc::new(DacClient::new(&config.service)?);
/// let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
///
/// let orchestrator = OperationOrchestrator::new(
///     client.clone(),
///     client,
///     PollSettings::from_config(&config.service),
///     shutdown_rx,
/// );
///
/// let request = config.operation_request(OperationKind::Export, None);
/// let result = orchestrator.run(&request, OperationMode::Blocking).await;
/// println!("{result}");
/// # Ok(())
/// # }
/// ```
pub struct OperationOrchestrator {
    submitter: Arc<dyn RequestSubmitter>,
    poller: Arc<dyn StatusPoller>,
    settings: PollSettings,
    shutdown: watch::Receiver<bool>,
    dry_run: bool,
    on_progress: Option<ProgressCallback>,
}

impl OperationOrchestrator {
    /// Creates an orchestrator
    ///
    /// Once `shutdown` turns `true`, polling stops with
    /// [`AbortCause::Cancelled`] without contacting the service again.
    pub fn new(
        submitter: Arc<dyn RequestSubmitter>,
        poller: Arc<dyn StatusPoller>,
        settings: PollSettings,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            submitter,
            poller,
            settings,
            shutdown,
            dry_run: false,
            on_progress: None,
        }
    }

    /// Builds requests without sending them
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Registers a progress callback
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    /// Runs one request to its outcome
    pub async fn run(&self, request: &OperationRequest, mode: OperationMode) -> OperationResult {
        let mut state = OperationState::Created;
        let kind = request.kind();

        tracing::info!(
            kind = %kind,
            database = %request.connection().database_name,
            dry_run = self.dry_run,
            "Starting operation"
        );

        // A raised shutdown must not start a remote operation
        if self.is_cancelled() {
            advance(&mut state, OperationState::Aborted);
            return self.abort(AbortCause::Cancelled);
        }

        let handle = match self.submitter.submit(request, self.dry_run).await {
            Ok(Submission::Preview(payload)) => return OperationResult::Preview(payload),
            Ok(Submission::Submitted(handle)) => handle,
            Err(err) => {
                advance(&mut state, OperationState::Aborted);
                return self.abort(AbortCause::Submission(err));
            }
        };

        advance(&mut state, OperationState::Submitted);
        emit(
            &self.on_progress,
            ProgressEvent::Submitted {
                handle: handle.clone(),
            },
        );

        if mode == OperationMode::NonBlocking && kind == OperationKind::Import {
            return OperationResult::Submitted(handle);
        }

        advance(&mut state, OperationState::Polling);
        let credentials = request.connection().status_credentials();
        let result = self.track(&handle, &credentials).await;

        match &result {
            OperationResult::Success(location) => {
                advance(&mut state, OperationState::Succeeded);
                emit(
                    &self.on_progress,
                    ProgressEvent::Succeeded {
                        handle,
                        location: location.clone(),
                    },
                );
            }
            OperationResult::Failure(message) => {
                advance(&mut state, OperationState::Failed);
                emit(
                    &self.on_progress,
                    ProgressEvent::Failed {
                        handle,
                        message: message.clone(),
                    },
                );
            }
            OperationResult::Aborted(cause) => {
                advance(&mut state, OperationState::Aborted);
                emit(
                    &self.on_progress,
                    ProgressEvent::Aborted {
                        cause: cause.clone(),
                    },
                );
            }
            OperationResult::Preview(_) | OperationResult::Submitted(_) => {}
        }

        result
    }

    /// Polls until a terminal status, a failed query or cancellation
    async fn track(
        &self,
        handle: &OperationHandle,
        credentials: &StatusCredentials,
    ) -> OperationResult {
        let mut last_status: Option<String> = None;

        loop {
            if self.is_cancelled() {
                return OperationResult::Aborted(AbortCause::Cancelled);
            }

            let snapshot = match self.poll_with_retry(handle, credentials).await {
                Ok(snapshot) => snapshot,
                Err(cause) => return OperationResult::Aborted(cause),
            };

            if last_status.as_deref() != Some(snapshot.status.as_str()) {
                emit(
                    &self.on_progress,
                    ProgressEvent::StatusChanged {
                        handle: handle.clone(),
                        status: snapshot.status.clone(),
                        error_message: snapshot.error_message.clone(),
                    },
                );
                last_status = Some(snapshot.status.clone());
            }

            if snapshot.is_failed() {
                let message = snapshot
                    .error_message
                    .unwrap_or_else(|| "Service reported failure without an error message".to_string());
                return OperationResult::Failure(message);
            }

            if snapshot.is_completed() {
                return OperationResult::Success(snapshot.result_location);
            }

            if self.wait_or_cancel(self.settings.interval).await {
                return OperationResult::Aborted(AbortCause::Cancelled);
            }
        }
    }

    /// One status query, retried with backoff on transport failures
    async fn poll_with_retry(
        &self,
        handle: &OperationHandle,
        credentials: &StatusCredentials,
    ) -> Result<StatusSnapshot, AbortCause> {
        let mut attempt = 0;

        loop {
            match self.poller.poll(handle, credentials).await {
                Ok(snapshot) => return Ok(snapshot),
                Err(err) => {
                    if !err.is_transient() || attempt >= self.settings.max_retries {
                        return Err(AbortCause::Poll(err));
                    }
                    attempt += 1;

                    let delay = self.settings.retry_delay(attempt);
                    crate::log_retry_attempt!(attempt, self.settings.max_retries, delay, err);

                    if self.wait_or_cancel(delay).await {
                        return Err(AbortCause::Cancelled);
                    }
                }
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Sleeps for `delay`; returns `true` if shutdown was signalled first
    ///
    /// A dropped sender can no longer signal, so the full delay is slept.
    async fn wait_or_cancel(&self, delay: Duration) -> bool {
        let mut shutdown = self.shutdown.clone();
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);

        loop {
            if *shutdown.borrow_and_update() {
                return true;
            }

            tokio::select! {
                _ = &mut sleep => return false,
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        (&mut sleep).await;
                        return false;
                    }
                }
            }
        }
    }

    fn abort(&self, cause: AbortCause) -> OperationResult {
        emit(
            &self.on_progress,
            ProgressEvent::Aborted {
                cause: cause.clone(),
            },
        );
        OperationResult::Aborted(cause)
    }
}

fn advance(state: &mut OperationState, next: OperationState) {
    tracing::debug!(from = %state, to = %next, "Operation state transition");
    *state = next;
}

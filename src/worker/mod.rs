//! Worker dispatch: after a room is created, the worker joins it as a
//! session participant. Jobs go through a bounded queue and each join is
//! retried with backoff; failures are logged, never propagated to callers.
//! Established sessions are owned by the dispatcher task and are told to
//! leave their rooms when the dispatcher shuts down.

#[cfg(feature = "livekit-worker")]
pub mod livekit;
pub mod session;

pub use session::{
    LoggingObserver, ParticipantInfo, SessionConnector, SessionError, SessionJoin,
    SessionObserver, SessionTask, TrackInfo,
};

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle, JoinSet};

use crate::auth::AccessTokenIssuer;
use crate::config::Config;

const MAX_RETRY_DELAY: Duration = Duration::from_secs(10);

/// A request for the worker to join a room
#[derive(Debug, Clone)]
pub struct WorkerJob {
    pub room: String,
}

/// Bounded retry with exponential backoff and jitter
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Delay before retrying after `attempt` failed attempts (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let delay = self
            .base_delay
            .saturating_mul(1u32 << exp)
            .min(self.max_delay);

        let jitter_ms = (delay.as_millis() / 4) as u64;
        if jitter_ms == 0 {
            return delay;
        }
        (delay + Duration::from_millis(rand::rng().random_range(0..=jitter_ms))).min(self.max_delay)
    }
}

/// Worker settings derived from the configuration
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub identity: String,
    pub signal_url: String,
    pub queue_capacity: usize,
    pub retry: RetryPolicy,
}

impl WorkerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            identity: config.worker_identity.clone(),
            signal_url: config.signal_url(),
            queue_capacity: config.worker_queue_capacity.max(1),
            retry: RetryPolicy {
                max_attempts: config.worker_max_attempts.max(1),
                base_delay: Duration::from_millis(config.worker_retry_base_ms),
                max_delay: MAX_RETRY_DELAY,
            },
        }
    }
}

/// Handle used by request handlers to submit worker jobs
#[derive(Clone)]
pub struct WorkerDispatcher {
    sender: Option<mpsc::Sender<WorkerJob>>,
}

impl WorkerDispatcher {
    /// Dispatcher that drops every job, used when no connector is available
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    fn channel(capacity: usize) -> (Self, mpsc::Receiver<WorkerJob>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { sender: Some(tx) }, rx)
    }

    /// Start the dispatcher task
    pub fn start(
        settings: WorkerSettings,
        issuer: AccessTokenIssuer,
        connector: Arc<dyn SessionConnector>,
        observer: Arc<dyn SessionObserver>,
    ) -> (Self, JoinHandle<()>) {
        let (dispatcher, rx) = Self::channel(settings.queue_capacity);
        let (stop_tx, stop_rx) = watch::channel(false);
        let joiner = Arc::new(Joiner {
            settings,
            issuer,
            connector,
            observer,
            stop: stop_rx,
        });
        let handle = tokio::spawn(run(rx, joiner, stop_tx));
        (dispatcher, handle)
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Queue a join for `room` without waiting. Returns whether it was queued.
    pub fn notify(&self, room: &str) -> bool {
        let Some(sender) = &self.sender else {
            tracing::debug!(room = %room, "Worker dispatch disabled, skipping join");
            return false;
        };

        match sender.try_send(WorkerJob {
            room: room.to_string(),
        }) {
            Ok(()) => {
                tracing::debug!(room = %room, "Worker join queued");
                true
            }
            Err(TrySendError::Full(job)) => {
                tracing::warn!(room = %job.room, "Worker queue full, dropping join");
                false
            }
            Err(TrySendError::Closed(job)) => {
                tracing::warn!(room = %job.room, "Worker dispatcher stopped, dropping join");
                false
            }
        }
    }
}

struct Joiner {
    settings: WorkerSettings,
    issuer: AccessTokenIssuer,
    connector: Arc<dyn SessionConnector>,
    observer: Arc<dyn SessionObserver>,
    stop: watch::Receiver<bool>,
}

impl Joiner {
    /// Join `room`, retrying per the policy. Returns the number of attempts
    /// used and the session's event loop.
    async fn join_with_retry(&self, room: &str) -> Result<(u32, SessionTask), SessionError> {
        let policy = &self.settings.retry;
        let mut attempt = 1;

        loop {
            match self.join_once(room).await {
                Ok(session) => return Ok((attempt, session)),
                Err(e) if attempt < policy.max_attempts => {
                    let delay = policy.delay_for(attempt);
                    tracing::warn!(
                        room = %room,
                        attempt,
                        retry_in_ms = delay.as_millis() as u64,
                        error = %e,
                        "Worker join failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn join_once(&self, room: &str) -> Result<SessionTask, SessionError> {
        let identity = &self.settings.identity;
        let token = self.issuer.participant_token(room, identity, identity)?;

        let join = SessionJoin {
            url: self.settings.signal_url.clone(),
            room: room.to_string(),
            identity: identity.clone(),
            token,
            stop: self.stop.clone(),
        };

        self.connector.join(join, self.observer.clone()).await
    }
}

type JobOutcome = (String, Result<(u32, SessionTask), SessionError>);

async fn run(mut rx: mpsc::Receiver<WorkerJob>, joiner: Arc<Joiner>, stop: watch::Sender<bool>) {
    let mut jobs: JoinSet<JobOutcome> = JoinSet::new();
    let mut sessions: JoinSet<String> = JoinSet::new();
    tracing::info!(identity = %joiner.settings.identity, "Worker dispatcher started");

    loop {
        tokio::select! {
            job = rx.recv() => match job {
                Some(job) => {
                    let joiner = joiner.clone();
                    jobs.spawn(async move {
                        let result = joiner.join_with_retry(&job.room).await;
                        (job.room, result)
                    });
                }
                None => break,
            },
            Some(outcome) = jobs.join_next(), if !jobs.is_empty() => {
                handle_outcome(outcome, &mut sessions);
            }
            Some(ended) = sessions.join_next(), if !sessions.is_empty() => log_session_end(ended),
        }
    }

    while let Some(outcome) = jobs.join_next().await {
        handle_outcome(outcome, &mut sessions);
    }

    // Queue closed and no join in flight: every live session leaves its room.
    stop.send_replace(true);
    while let Some(ended) = sessions.join_next().await {
        log_session_end(ended);
    }

    tracing::info!("Worker dispatcher stopped");
}

fn handle_outcome(outcome: Result<JobOutcome, JoinError>, sessions: &mut JoinSet<String>) {
    match outcome {
        Ok((room, Ok((attempts, session)))) => {
            tracing::info!(room = %room, attempts, "Worker joined room");
            sessions.spawn(async move {
                session.await;
                room
            });
        }
        Ok((room, Err(e))) => {
            tracing::error!(room = %room, error = %e, "Worker failed to join room, giving up");
        }
        Err(e) => {
            tracing::error!(error = %e, "Worker join task aborted");
        }
    }
}

fn log_session_end(ended: Result<String, JoinError>) {
    match ended {
        Ok(room) => tracing::info!(room = %room, "Worker session ended"),
        Err(e) => tracing::error!(error = %e, "Worker session task aborted"),
    }
}

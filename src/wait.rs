//! Wait handler: polls a submitted operation until it reaches a terminal
//! state, observing cancellation and a service-specific overall deadline.

use crate::cancel::CancelToken;
use crate::error::CliError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Verdict of a terminal predicate over one fetched resource snapshot.
#[derive(Debug)]
pub enum WaitState<T> {
    /// Not terminal yet; poll again after the interval.
    Pending,
    /// Success terminal. Carries the final resource.
    Succeeded(T),
    /// Failure terminal. Carries the remote failure message.
    Failed(String),
}

/// Polling cadence and overall deadline for one wait loop.
#[derive(Debug, Clone, Copy)]
pub struct WaitConfig {
    pub interval: Duration,
    pub deadline: Duration,
}

/// Polls are never tighter than this; services choose a few seconds.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

impl WaitConfig {
    /// Cadence with the interval clamped to the floor.
    pub fn new(interval: Duration, deadline: Duration) -> Self {
        Self {
            interval: interval.max(MIN_INTERVAL),
            deadline,
        }
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            deadline: Duration::from_secs(30 * 60),
        }
    }
}

/// Repeatedly fetch until `fetch` reports a terminal state.
///
/// `context` names the operation for error wrapping ("wait for volume
/// creation"). Cancellation is observed before every fetch and during every
/// sleep; the loop returns within one polling interval of the signal.
pub async fn wait_for_state<T, F, Fut>(
    cancel: &CancelToken,
    config: WaitConfig,
    context: &str,
    mut fetch: F,
) -> Result<T, CliError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<WaitState<T>, CliError>>,
{
    let started = Instant::now();
    loop {
        if cancel.is_cancelled() {
            return Err(CliError::Cancelled);
        }
        tracing::trace!(context, "polling resource state");
        match fetch().await? {
            WaitState::Succeeded(resource) => return Ok(resource),
            WaitState::Failed(message) => return Err(CliError::remote(context, message)),
            WaitState::Pending => {}
        }
        if started.elapsed() >= config.deadline {
            return Err(CliError::remote(
                context,
                format!(
                    "operation did not reach a terminal state within {}s",
                    config.deadline.as_secs()
                ),
            ));
        }
        tokio::select! {
            _ = cancel.cancelled() => return Err(CliError::Cancelled),
            _ = tokio::time::sleep(config.interval) => {}
        }
    }
}

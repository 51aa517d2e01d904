//! Client execution logic with reconnection support.

use std::time::Duration;

use crate::{
    config::ClientConfig,
    domain::{should_attempt_reconnect, should_exit_immediately},
    error::ClientError,
    session::run_client_session,
    ui::spawn_readline,
};

/// What to do after a session failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    /// Wait this long, then run attempt `attempt` (1-based) of `max_attempts`
    Retry { after: Duration, attempt: u32 },
    GiveUp,
}

/// Bounded reconnection with a fixed interval.
///
/// Counts consecutive failed sessions. A session that got as far as joining
/// its room resets the count before its own failure is counted.
#[derive(Debug, Clone)]
pub struct ReconnectSupervisor {
    max_attempts: u32,
    interval: Duration,
    failures: u32,
}

impl ReconnectSupervisor {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
            failures: 0,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Consecutive failures counted so far
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Record a failed session and decide whether to try again
    pub fn on_failure(&mut self, error: &ClientError) -> ReconnectDecision {
        if matches!(error, ClientError::ConnectionLost(_)) {
            self.failures = 0;
        }
        self.failures += 1;

        if should_attempt_reconnect(error, self.failures, self.max_attempts) {
            ReconnectDecision::Retry {
                after: self.interval,
                attempt: self.failures + 1,
            }
        } else {
            ReconnectDecision::GiveUp
        }
    }
}

/// Run the client, reconnecting after failed sessions
pub async fn run_client(config: ClientConfig) -> Result<(), ClientError> {
    let mut supervisor =
        ReconnectSupervisor::new(config.max_reconnect_attempts, config.reconnect_interval);
    let mut input = spawn_readline(config.kind);
    let mut attempt = 1;

    loop {
        tracing::info!(
            "Connecting to {} as {} in room '{}' (attempt {}/{})",
            config.url,
            config.kind,
            config.room,
            attempt,
            supervisor.max_attempts()
        );

        match run_client_session(&config, &mut input).await {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                // If the session ended normally (user exit), don't reconnect
                return Ok(());
            }
            Err(e) => {
                if should_exit_immediately(&e) {
                    return Err(e);
                }
                tracing::warn!("{}", e);

                match supervisor.on_failure(&e) {
                    ReconnectDecision::Retry {
                        after,
                        attempt: next,
                    } => {
                        tracing::info!(
                            "Reconnecting in {} seconds... (attempt {}/{})",
                            after.as_secs_f64(),
                            next,
                            supervisor.max_attempts()
                        );
                        attempt = next;
                        tokio::time::sleep(after).await;
                    }
                    ReconnectDecision::GiveUp => {
                        tracing::error!(
                            "Failed to reconnect after {} attempts. Exiting.",
                            supervisor.failures()
                        );
                        return Err(e);
                    }
                }
            }
        }
    }
}

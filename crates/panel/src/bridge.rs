use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use bus::{Bus, EvalError, Expression, PageCommand, PageEvent};
use core_types::{CounterStore, LoadId, RequestId};
use instrument::InstrumentConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("page runtime is gone")]
    Disconnected,
    #[error("no answer from the page within {0:?}")]
    Timeout(Duration),
    #[error("failed to load {page:?}: {message}")]
    Load { page: String, message: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReloadOptions {
    pub ignore_cache: bool,
    pub inject: InstrumentConfig,
}

impl Default for ReloadOptions {
    fn default() -> Self {
        Self {
            ignore_cache: true,
            inject: InstrumentConfig::default(),
        }
    }
}

/// What the host needs from whatever hosts the monitored page.
pub trait HostBridge {
    /// Reloads the page with instrumentation injected before its scripts.
    fn reload(&mut self, options: ReloadOptions) -> Result<LoadId, BridgeError>;
    /// Runs `expression` in the page and returns the store by value.
    fn evaluate(&mut self, expression: Expression) -> Result<CounterStore, EvalError>;
}

/// [`HostBridge`] over the bus to a page runtime thread.
///
/// Answers are matched on request id and load id; anything older is
/// dropped so a superseded result is never merged.
pub struct ChannelBridge {
    bus: Bus,
    next_request: RequestId,
    load_id: LoadId,
    timeout: Duration,
}

impl ChannelBridge {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(bus: Bus) -> Self {
        Self {
            bus,
            next_request: 0,
            load_id: LoadId::NONE,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Plain navigation, no instrumentation.
    pub fn navigate(&mut self, source: &str) -> Result<LoadId, BridgeError> {
        self.send(PageCommand::Navigate {
            source: source.to_string(),
        })?;
        self.wait_loaded()
    }

    pub fn shutdown(&self) {
        let _ = self.bus.cmd_tx.send(PageCommand::Shutdown);
    }

    fn send(&self, cmd: PageCommand) -> Result<(), BridgeError> {
        self.bus
            .cmd_tx
            .send(cmd)
            .map_err(|_| BridgeError::Disconnected)
    }

    fn recv(&self, deadline: Instant) -> Result<PageEvent, BridgeError> {
        let left = deadline.saturating_duration_since(Instant::now());
        self.bus.evt_rx.recv_timeout(left).map_err(|err| match err {
            RecvTimeoutError::Timeout => BridgeError::Timeout(self.timeout),
            RecvTimeoutError::Disconnected => BridgeError::Disconnected,
        })
    }

    fn wait_loaded(&mut self) -> Result<LoadId, BridgeError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match self.recv(deadline)? {
                PageEvent::Loaded {
                    load_id,
                    url,
                    instrumented,
                } if load_id > self.load_id => {
                    log::info!(target: "panel", "{load_id}: {url} (instrumented: {instrumented})");
                    self.load_id = load_id;
                    return Ok(load_id);
                }
                PageEvent::LoadFailed {
                    load_id,
                    source,
                    message,
                } if load_id > self.load_id => {
                    // Answers for the page that was replaced must not match.
                    self.load_id = load_id;
                    return Err(BridgeError::Load {
                        page: source,
                        message,
                    });
                }
                PageEvent::ScriptFailed { load_id, message } => {
                    log::warn!(target: "panel", "{load_id}: page script error: {message}");
                }
                other => log::warn!(target: "panel", "discarding stale {other:?}"),
            }
        }
    }
}

impl HostBridge for ChannelBridge {
    fn reload(&mut self, options: ReloadOptions) -> Result<LoadId, BridgeError> {
        self.send(PageCommand::Reload {
            ignore_cache: options.ignore_cache,
            inject: Some(options.inject),
        })?;
        self.wait_loaded()
    }

    fn evaluate(&mut self, expression: Expression) -> Result<CounterStore, EvalError> {
        self.next_request = self.next_request.wrapping_add(1);
        let current = self.next_request;
        self.send(PageCommand::Evaluate {
            request_id: current,
            expression,
        })
        .map_err(|err| EvalError::new(err.to_string()))?;

        let deadline = Instant::now() + self.timeout;
        loop {
            let event = self
                .recv(deadline)
                .map_err(|err| EvalError::new(err.to_string()))?;
            match event {
                PageEvent::Evaluated {
                    load_id,
                    request_id,
                    result,
                } if request_id == current && load_id == self.load_id => return result,
                PageEvent::ScriptFailed { load_id, message } => {
                    log::warn!(target: "panel", "{load_id}: page script error: {message}");
                }
                other => log::warn!(target: "panel", "discarding stale {other:?}"),
            }
        }
    }
}

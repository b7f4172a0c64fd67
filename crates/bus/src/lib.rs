//! Messages between the host panel and the page runtime.
//!
//! Everything here is owned data: page-side objects never cross the channel,
//! only commands going in and snapshots coming out.

mod action;

use std::sync::mpsc::{self, Receiver, Sender};

use core_types::{CounterStore, LoadId, RequestId};
use instrument::{InstrumentConfig, Probe};
use thiserror::Error;

pub use action::{Action, ListenerTarget};

#[derive(Debug)]
pub enum PageCommand {
    /// Load `source` without instrumentation.
    Navigate { source: String },
    /// Reload the current source; `inject` installs instrumentation before
    /// the page script runs.
    Reload {
        ignore_cache: bool,
        inject: Option<InstrumentConfig>,
    },
    Evaluate {
        request_id: RequestId,
        expression: Expression,
    },
    /// Run more page script in the current load.
    RunScript { actions: Vec<Action> },
    Shutdown,
}

#[derive(Debug)]
pub enum PageEvent {
    Loaded {
        load_id: LoadId,
        url: String,
        instrumented: bool,
    },
    /// The previous page is gone either way; `load_id` is the load that
    /// failed, so nothing from before it can be answered any more.
    LoadFailed {
        load_id: LoadId,
        source: String,
        message: String,
    },
    Evaluated {
        load_id: LoadId,
        request_id: RequestId,
        result: Result<CounterStore, EvalError>,
    },
    ScriptFailed {
        load_id: LoadId,
        message: String,
    },
}

/// What an evaluation runs: the listed probes, then a read of the agent data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expression {
    pub probes: Vec<Probe>,
}

impl Expression {
    pub fn report() -> Self {
        Self {
            probes: Probe::REPORT.to_vec(),
        }
    }

    /// Reads the current store without probing.
    pub fn data() -> Self {
        Self { probes: Vec::new() }
    }
}

/// Failure of an evaluation inside the page, carried back as its message.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EvalError {
    pub message: String,
}

impl EvalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn not_installed() -> Self {
        Self::new("instrumentation agent is not installed")
    }
}

/// Host side of the channel pair.
pub struct Bus {
    pub cmd_tx: Sender<PageCommand>,
    pub evt_rx: Receiver<PageEvent>,
}

/// Page-runtime side of the channel pair.
pub struct PageEnd {
    pub cmd_rx: Receiver<PageCommand>,
    pub evt_tx: Sender<PageEvent>,
}

pub fn connect() -> (Bus, PageEnd) {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (evt_tx, evt_rx) = mpsc::channel();
    (Bus { cmd_tx, evt_rx }, PageEnd { cmd_rx, evt_tx })
}

//! # panel
//!
//! The host side of an audit. A [`Panel`] drives a page through a
//! [`HostBridge`] and keeps the session totals in an [`Aggregator`]; the
//! page's own store only ever arrives here as a copy.

mod aggregator;
mod bridge;
mod report;

use bus::Expression;
use core_types::LoadId;

pub use aggregator::Aggregator;
pub use bridge::{BridgeError, ChannelBridge, HostBridge, ReloadOptions};
pub use report::{Report, ReportFormat};

/// Operator actions: reload, report, clear.
pub struct Panel<B: HostBridge> {
    bridge: B,
    aggregator: Aggregator,
    reload_options: ReloadOptions,
}

impl<B: HostBridge> Panel<B> {
    pub fn new(bridge: B, reload_options: ReloadOptions) -> Self {
        Self {
            bridge,
            aggregator: Aggregator::new(),
            reload_options,
        }
    }

    /// Commits the current store into the session, then reloads with
    /// instrumentation. The commit always happens before the reload.
    pub fn reload(&mut self) -> Result<LoadId, BridgeError> {
        self.aggregator.commit();
        self.bridge.reload(self.reload_options.clone())
    }

    /// Probes the page and returns current and merged views.
    pub fn report(&mut self) -> Report {
        let result = self.bridge.evaluate(Expression::report());
        let error = self.aggregator.accept(result);
        Report {
            current: self.aggregator.current().clone(),
            session: self.aggregator.merged(),
            error,
        }
    }

    pub fn clear_session(&mut self) {
        self.aggregator.clear_session();
        log::info!(target: "panel", "session cleared");
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }
}

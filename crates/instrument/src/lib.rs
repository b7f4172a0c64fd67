//! # instrument
//!
//! Everything that runs inside the monitored page: counting proxies for the
//! capability entry points, the listener-registration monitor, and the
//! on-demand DOM/storage probes. [`install`] wires them around a
//! [`web_api::Platform`] and returns the [`Agent`] that owns the load's
//! current store.

mod agent;
mod api;
mod config;
mod interceptor;
mod recorder;
mod storage;

pub mod listeners;
pub mod probes;

pub use agent::{Agent, Probe, install};
pub use api::{ApiId, UnknownApi};
pub use config::InstrumentConfig;
pub use listeners::{EVENT_RULES, EventRule, rule_for};
pub use probes::{CUSTOM_DATA_KEY, DoctypeClass, ELEMENTS, LEGACY_COMPAT};
pub use recorder::Recorder;
pub use storage::{StorageArea, StorageBaseline};

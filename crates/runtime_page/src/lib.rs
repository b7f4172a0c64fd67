//! The monitored page's execution context, on its own thread.
//!
//! The thread owns the page (DOM, platform, instrumentation agent) for its
//! whole life; the host only sees the owned values sent over the bus.

mod loader;
mod script;

use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use bus::{Action, EvalError, Expression, PageCommand, PageEnd, PageEvent};
use core_types::{CounterStore, LoadId};
use instrument::{Agent, InstrumentConfig, install};
use web_api::Window;
use web_api::sim::{self, ApiCallLog};

pub use loader::{FileLoader, LoadError, MemoryLoader, PageLoader, PageScript, PageSource};
pub use script::{ScriptError, run_action};

/// One load of the page.
struct LoadedPage {
    load_id: LoadId,
    window: Window,
    agent: Option<Agent>,
}

impl LoadedPage {
    fn evaluate(&self, expression: &Expression) -> Result<CounterStore, EvalError> {
        let agent = self.agent.as_ref().ok_or_else(EvalError::not_installed)?;
        agent.run(&self.window, &expression.probes);
        Ok(agent.data())
    }

    fn run_script(&mut self, actions: &[Action], evt_tx: &Sender<PageEvent>) {
        for action in actions {
            if let Err(err) = run_action(&mut self.window, action) {
                log::debug!(target: "runtime_page", "{}: {action:?} failed: {err}", self.load_id);
                let _ = evt_tx.send(PageEvent::ScriptFailed {
                    load_id: self.load_id,
                    message: err.to_string(),
                });
            }
        }
    }
}

struct PageRuntime<L> {
    loader: L,
    evt_tx: Sender<PageEvent>,
    source: Option<String>,
    last_load: LoadId,
    page: Option<LoadedPage>,
}

impl<L: PageLoader> PageRuntime<L> {
    fn load(&mut self, source: String, bypass_cache: bool, inject: Option<InstrumentConfig>) {
        let page = match self.loader.fetch(&source, bypass_cache) {
            Ok(page) => page,
            Err(err) => {
                log::warn!(target: "runtime_page", "load of {source} failed: {err}");
                self.fail_load(source, err.to_string());
                return;
            }
        };

        let load_id = self.begin_load();

        let raw = sim::platform(&page.url, &page.script.settings, &ApiCallLog::new());
        let (platform, agent) = match &inject {
            Some(config) => {
                let (platform, agent) = install(raw, config);
                (platform, Some(agent))
            }
            None => (raw, None),
        };
        let instrumented = agent.is_some();
        let document = html::parse_document(&page.html);
        let mut loaded = LoadedPage {
            load_id,
            window: Window::new(page.url.clone(), document, platform),
            agent,
        };
        loaded.run_script(&page.script.actions, &self.evt_tx);
        log::debug!(
            target: "runtime_page",
            "{load_id}: loaded {} (instrumented: {instrumented})",
            page.url
        );

        self.page = Some(loaded);
        self.source = Some(source);
        let _ = self.evt_tx.send(PageEvent::Loaded {
            load_id,
            url: page.url.to_string(),
            instrumented,
        });
    }

    /// Drops the previous load's agent and recorder and numbers the next load.
    fn begin_load(&mut self) -> LoadId {
        self.page = None;
        self.last_load = self.last_load.next();
        self.last_load
    }

    fn fail_load(&mut self, source: String, message: String) {
        let load_id = self.begin_load();
        let _ = self.evt_tx.send(PageEvent::LoadFailed {
            load_id,
            source,
            message,
        });
    }

    fn handle(&mut self, cmd: PageCommand) -> bool {
        match cmd {
            PageCommand::Navigate { source } => self.load(source, false, None),
            PageCommand::Reload {
                ignore_cache,
                inject,
            } => match self.source.clone() {
                Some(source) => self.load(source, ignore_cache, inject),
                None => self.fail_load(String::new(), "nothing to reload".to_string()),
            },
            PageCommand::Evaluate {
                request_id,
                expression,
            } => {
                let result = match &self.page {
                    Some(page) => page.evaluate(&expression),
                    None => Err(EvalError::not_installed()),
                };
                log::debug!(target: "runtime_page", "{}: evaluated request {request_id}", self.last_load);
                let _ = self.evt_tx.send(PageEvent::Evaluated {
                    load_id: self.last_load,
                    request_id,
                    result,
                });
            }
            PageCommand::RunScript { actions } => match &mut self.page {
                Some(page) => page.run_script(&actions, &self.evt_tx),
                None => {
                    let _ = self.evt_tx.send(PageEvent::ScriptFailed {
                        load_id: self.last_load,
                        message: "no page is loaded".to_string(),
                    });
                }
            },
            PageCommand::Shutdown => return false,
        }
        true
    }
}

/// Spawns the page thread. It exits on `Shutdown` or when the host hangs up.
pub fn start_page_runtime<L>(loader: L, page_end: PageEnd) -> JoinHandle<()>
where
    L: PageLoader + Send + 'static,
{
    thread::spawn(move || {
        let PageEnd { cmd_rx, evt_tx } = page_end;
        let mut runtime = PageRuntime {
            loader,
            evt_tx,
            source: None,
            last_load: LoadId::NONE,
            page: None,
        };

        while let Ok(cmd) = cmd_rx.recv() {
            if !runtime.handle(cmd) {
                break;
            }
        }
        log::debug!(target: "runtime_page", "page runtime stopped");
    })
}

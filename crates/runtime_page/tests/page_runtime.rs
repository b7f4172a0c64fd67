use std::sync::mpsc::Receiver;
use std::time::Duration;

use bus::{Action, Expression, PageCommand, PageEvent, connect};
use core_types::{Category, LoadId};
use instrument::InstrumentConfig;
use runtime_page::{
    LoadError, MemoryLoader, PageLoader, PageScript, PageSource, start_page_runtime,
};
use url::Url;

const WAIT: Duration = Duration::from_secs(5);

fn page(url: &str, html: &str, actions: Vec<Action>) -> PageSource {
    PageSource {
        url: Url::parse(url).expect("valid url"),
        html: html.to_string(),
        script: PageScript {
            actions,
            ..PageScript::default()
        },
    }
}

fn next_event(rx: &Receiver<PageEvent>) -> PageEvent {
    rx.recv_timeout(WAIT).expect("page runtime answered")
}

fn expect_loaded(rx: &Receiver<PageEvent>) -> (LoadId, bool) {
    loop {
        match next_event(rx) {
            PageEvent::Loaded {
                load_id,
                instrumented,
                ..
            } => return (load_id, instrumented),
            PageEvent::ScriptFailed { .. } => continue,
            other => panic!("unexpected event {other:?}"),
        }
    }
}

fn reload(inject: bool) -> PageCommand {
    PageCommand::Reload {
        ignore_cache: true,
        inject: inject.then(InstrumentConfig::default),
    }
}

#[test]
fn evaluation_needs_an_instrumented_load() {
    let mut loader = MemoryLoader::new();
    loader.insert("home", page("https://example.test/", "<p>", Vec::new()));
    let (bus, page_end) = connect();
    let handle = start_page_runtime(loader, page_end);

    bus.cmd_tx
        .send(PageCommand::Navigate { source: "home".into() })
        .expect("runtime alive");
    assert_eq!(expect_loaded(&bus.evt_rx), (LoadId(1), false));

    bus.cmd_tx
        .send(PageCommand::Evaluate {
            request_id: 1,
            expression: Expression::report(),
        })
        .expect("runtime alive");
    match next_event(&bus.evt_rx) {
        PageEvent::Evaluated { result, .. } => {
            let err = result.expect_err("no agent");
            assert_eq!(err.message, "instrumentation agent is not installed");
        }
        other => panic!("unexpected event {other:?}"),
    }

    bus.cmd_tx.send(PageCommand::Shutdown).expect("runtime alive");
    handle.join().expect("runtime exits cleanly");
}

#[test]
fn script_runs_after_injection_and_each_load_starts_empty() {
    let actions = vec![
        Action::GetCurrentPosition {
            options: Default::default(),
        },
        Action::GetContext {
            selector: "canvas".into(),
            context_id: "2d".into(),
            options: None,
        },
        Action::AppCacheUpdate,
    ];
    let mut loader = MemoryLoader::new();
    loader.insert(
        "app",
        page("https://example.test/app", "<!DOCTYPE html><canvas></canvas>", actions),
    );
    let (bus, page_end) = connect();
    let _handle = start_page_runtime(loader, page_end);

    bus.cmd_tx
        .send(PageCommand::Navigate { source: "app".into() })
        .expect("runtime alive");
    expect_loaded(&bus.evt_rx);

    bus.cmd_tx.send(reload(true)).expect("runtime alive");
    // applicationCache.update throws on an uncached page
    match next_event(&bus.evt_rx) {
        PageEvent::ScriptFailed { load_id, message } => {
            assert_eq!(load_id, LoadId(2));
            assert!(message.contains("InvalidStateError"), "{message}");
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(expect_loaded(&bus.evt_rx), (LoadId(2), true));

    bus.cmd_tx
        .send(PageCommand::Evaluate {
            request_id: 7,
            expression: Expression::report(),
        })
        .expect("runtime alive");
    let data = match next_event(&bus.evt_rx) {
        PageEvent::Evaluated {
            load_id,
            request_id,
            result,
        } => {
            assert_eq!((load_id, request_id), (LoadId(2), 7));
            result.expect("agent installed")
        }
        other => panic!("unexpected event {other:?}"),
    };
    assert_eq!(data.get(Category::Accessed, "navigator.geolocation.getCurrentPosition"), Some(1));
    assert_eq!(data.get(Category::Accessed, "HTMLCanvasElement.getContext(2d)"), Some(1));
    assert_eq!(data.get(Category::Accessed, "applicationCache.update"), Some(1));
    assert_eq!(data.get(Category::Doctypes, "HTML5"), Some(1));
    assert_eq!(data.get(Category::Elements, "canvas"), Some(1));

    bus.cmd_tx
        .send(PageCommand::RunScript {
            actions: vec![Action::MediaSource],
        })
        .expect("runtime alive");
    bus.cmd_tx.send(reload(true)).expect("runtime alive");
    assert_eq!(expect_loaded(&bus.evt_rx), (LoadId(3), true));
    bus.cmd_tx
        .send(PageCommand::Evaluate {
            request_id: 8,
            expression: Expression::data(),
        })
        .expect("runtime alive");
    match next_event(&bus.evt_rx) {
        PageEvent::Evaluated { result, .. } => {
            let data = result.expect("agent installed");
            assert_eq!(data.get(Category::Accessed, "MediaSource"), None);
            assert_eq!(
                data.get(Category::Accessed, "navigator.geolocation.getCurrentPosition"),
                Some(1)
            );
            assert!(data.elements.is_empty(), "no probes ran yet");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn unknown_page_reports_load_failure() {
    let (bus, page_end) = connect();
    let _handle = start_page_runtime(MemoryLoader::new(), page_end);
    bus.cmd_tx
        .send(PageCommand::Navigate { source: "missing".into() })
        .expect("runtime alive");
    match next_event(&bus.evt_rx) {
        PageEvent::LoadFailed {
            load_id,
            source,
            message,
        } => {
            assert_eq!(load_id, LoadId(1));
            assert_eq!(source, "missing");
            assert!(message.contains("missing"), "{message}");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

/// Serves `page` for the first `good` fetches, then fails.
struct FailsAfter {
    page: PageSource,
    good: usize,
}

impl PageLoader for FailsAfter {
    fn fetch(&mut self, source: &str, _bypass_cache: bool) -> Result<PageSource, LoadError> {
        if self.good == 0 {
            return Err(LoadError::Unknown(source.to_string()));
        }
        self.good -= 1;
        Ok(self.page.clone())
    }
}

#[test]
fn failed_reload_retires_the_previous_agent() {
    let loader = FailsAfter {
        page: page("https://example.test/", "<p>", vec![Action::MediaSource]),
        good: 2,
    };
    let (bus, page_end) = connect();
    let _handle = start_page_runtime(loader, page_end);

    bus.cmd_tx
        .send(PageCommand::Navigate { source: "home".into() })
        .expect("runtime alive");
    expect_loaded(&bus.evt_rx);
    bus.cmd_tx.send(reload(true)).expect("runtime alive");
    assert_eq!(expect_loaded(&bus.evt_rx), (LoadId(2), true));

    bus.cmd_tx.send(reload(true)).expect("runtime alive");
    match next_event(&bus.evt_rx) {
        PageEvent::LoadFailed { load_id, .. } => assert_eq!(load_id, LoadId(3)),
        other => panic!("unexpected event {other:?}"),
    }

    bus.cmd_tx
        .send(PageCommand::Evaluate {
            request_id: 1,
            expression: Expression::report(),
        })
        .expect("runtime alive");
    match next_event(&bus.evt_rx) {
        PageEvent::Evaluated {
            load_id, result, ..
        } => {
            assert_eq!(load_id, LoadId(3));
            let err = result.expect_err("no agent after a failed load");
            assert_eq!(err.message, "instrumentation agent is not installed");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn runtime_stops_when_host_hangs_up() {
    let (bus, page_end) = connect();
    let handle = start_page_runtime(MemoryLoader::new(), page_end);
    drop(bus);
    handle.join().expect("runtime exits cleanly");
}

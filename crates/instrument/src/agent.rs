use core_types::CounterStore;
use html::Node;
use web_api::{Platform, Window};

use crate::interceptor::{Tally, wrap_capabilities};
use crate::listeners::ListenerMonitor;
use crate::probes::{self, CompiledSelector, DoctypeClass};
use crate::storage::StorageBaseline;
use crate::{InstrumentConfig, Recorder};

/// On-demand scans an evaluation can ask for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Probe {
    WebStorage,
    Doctype,
    Elements,
    Attributes,
}

impl Probe {
    /// Order used by the report action.
    pub const REPORT: [Probe; 4] = [
        Probe::WebStorage,
        Probe::Doctype,
        Probe::Elements,
        Probe::Attributes,
    ];
}

/// The page-side namespace object of one injection: the current store plus
/// the probes that refresh it.
#[derive(Debug)]
pub struct Agent {
    recorder: Recorder,
    baseline: StorageBaseline,
    selectors: &'static [CompiledSelector],
}

impl Agent {
    pub const NAMESPACE: &'static str = "H5A";

    pub fn probe_web_storage(&self, platform: &Platform) {
        self.baseline.probe(platform, &self.recorder);
    }

    pub fn probe_doctype(&self, document: &Node) -> DoctypeClass {
        probes::probe_doctype(document, &self.recorder)
    }

    pub fn probe_elements(&self, document: &Node) {
        probes::probe_elements(document, &self.recorder);
    }

    pub fn probe_attributes(&self, document: &Node) {
        probes::probe_attributes(document, self.selectors, &self.recorder);
    }

    pub fn run(&self, window: &Window, probes: &[Probe]) {
        for probe in probes {
            match probe {
                Probe::WebStorage => self.probe_web_storage(window.platform()),
                Probe::Doctype => {
                    self.probe_doctype(window.document());
                }
                Probe::Elements => self.probe_elements(window.document()),
                Probe::Attributes => self.probe_attributes(window.document()),
            }
        }
    }

    /// By-value copy of the current store.
    pub fn data(&self) -> CounterStore {
        self.recorder.snapshot()
    }
}

/// Wraps `platform` for one page load.
///
/// Storage baselines are taken before anything else can touch storage, and
/// every load gets a fresh, empty recorder.
pub fn install(platform: Platform, config: &InstrumentConfig) -> (Platform, Agent) {
    let recorder = Recorder::new();
    let baseline = StorageBaseline::capture(&platform);
    let tally = Tally::new(recorder.clone(), config);

    let platform = wrap_capabilities(platform, &tally);
    let platform = Platform {
        events: Box::new(ListenerMonitor::new(platform.events, recorder.clone())),
        ..platform
    };
    log::debug!(
        target: "instrument",
        "{} installed, recording arguments for {:?}",
        Agent::NAMESPACE,
        config.record_arguments
    );

    let agent = Agent {
        recorder,
        baseline,
        selectors: probes::compiled_selectors(),
    };
    (platform, agent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Category;
    use web_api::sim::{self, ApiCallLog, SimSettings};
    use web_api::{EventTarget, ListenerOptions, PositionOptions};

    fn window(src: &str) -> (Window, Agent) {
        let url = url::Url::parse("https://example.test/").expect("valid url");
        let raw = sim::platform(&url, &SimSettings::default(), &ApiCallLog::new());
        let (platform, agent) = install(raw, &InstrumentConfig::default());
        (Window::new(url, html::parse_document(src), platform), agent)
    }

    #[test]
    fn fresh_install_starts_empty() {
        let (_, agent) = window("<p>");
        assert!(agent.data().is_empty());
    }

    #[test]
    fn report_probes_fill_markup_slices() {
        let (window, agent) = window("<!DOCTYPE html><article hidden><time></time></article>");
        agent.run(&window, &Probe::REPORT);
        let data = agent.data();
        assert_eq!(data.get(Category::Doctypes, "HTML5"), Some(1));
        assert_eq!(data.get(Category::Elements, "article"), Some(1));
        assert_eq!(data.get(Category::Elements, "time"), Some(1));
        assert_eq!(data.get(Category::Attributes, "*[hidden]"), Some(1));

        agent.run(&window, &Probe::REPORT);
        assert_eq!(agent.data(), data);
    }

    #[test]
    fn calls_and_listeners_land_in_the_same_store() {
        let (window, agent) = window("<div></div>");
        let platform = window.platform();
        platform
            .geolocation
            .get_current_position(&PositionOptions::default())
            .expect("granted");
        platform
            .events
            .add_event_listener(&EventTarget::Document, "input", &ListenerOptions::default())
            .expect("registered");

        let data = agent.data();
        assert_eq!(
            data.get(Category::Accessed, "navigator.geolocation.getCurrentPosition"),
            Some(1)
        );
        assert_eq!(data.get(Category::Listeners, "input"), Some(1));
    }

    #[test]
    fn data_is_a_copy() {
        let (window, agent) = window("<p>");
        let before = agent.data();
        window.platform().media_sources.media_source().expect("ok");
        assert!(before.is_empty());
        assert_eq!(agent.data().get(Category::Accessed, "MediaSource"), Some(1));
    }
}

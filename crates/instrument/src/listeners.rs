use core_types::Category;
use web_api::{ApiResult, EventTarget, EventTargets, ListenerId, ListenerOptions};

use crate::Recorder;

/// Which targets a listener registration is counted against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventRule {
    All,
    /// Every target except elements with one of these tag names.
    Except(&'static [&'static str]),
    /// Only elements with one of these tag names.
    Only(&'static [&'static str]),
}

impl EventRule {
    /// `local_name` is `None` for window and document targets.
    pub fn applies_to(self, local_name: Option<&str>) -> bool {
        match self {
            EventRule::All => true,
            EventRule::Except(names) => local_name.is_none_or(|n| !names.contains(&n)),
            EventRule::Only(names) => local_name.is_some_and(|n| names.contains(&n)),
        }
    }
}

const BODY_FRAMESET: &[&str] = &["body", "frameset"];
const FOCUSABLE: &[&str] = &[
    "a", "area", "body", "button", "frameset", "input", "label", "select", "textarea",
];

// HTML event handler types minus the HTML 4.01 %events set. Sorted by name.
pub const EVENT_RULES: &[(&str, EventRule)] = &[
    ("abort", EventRule::All),
    ("afterprint", EventRule::Only(BODY_FRAMESET)),
    ("autocomplete", EventRule::All),
    ("autocompleteerror", EventRule::All),
    ("beforeprint", EventRule::Only(BODY_FRAMESET)),
    ("beforeunload", EventRule::Only(BODY_FRAMESET)),
    ("blur", EventRule::Except(FOCUSABLE)),
    ("cancel", EventRule::All),
    ("canplay", EventRule::All),
    ("canplaythrough", EventRule::All),
    ("change", EventRule::Except(&["input", "select", "textarea"])),
    ("close", EventRule::All),
    ("contextmenu", EventRule::All),
    ("cuechange", EventRule::All),
    ("drag", EventRule::All),
    ("dragend", EventRule::All),
    ("dragenter", EventRule::All),
    ("dragexit", EventRule::All),
    ("dragleave", EventRule::All),
    ("dragover", EventRule::All),
    ("dragstart", EventRule::All),
    ("drop", EventRule::All),
    ("durationchange", EventRule::All),
    ("emptied", EventRule::All),
    ("ended", EventRule::All),
    ("error", EventRule::Except(BODY_FRAMESET)),
    ("focus", EventRule::Except(FOCUSABLE)),
    ("hashchange", EventRule::Only(BODY_FRAMESET)),
    ("input", EventRule::All),
    ("invalid", EventRule::All),
    ("languagechange", EventRule::Only(BODY_FRAMESET)),
    ("load", EventRule::Except(BODY_FRAMESET)),
    ("loadeddata", EventRule::All),
    ("loadedmetadata", EventRule::All),
    ("loadstart", EventRule::All),
    ("message", EventRule::Only(BODY_FRAMESET)),
    ("mouseenter", EventRule::All),
    ("mouseleave", EventRule::All),
    ("mousewheel", EventRule::All),
    ("offline", EventRule::Only(BODY_FRAMESET)),
    ("online", EventRule::Only(BODY_FRAMESET)),
    ("pagehide", EventRule::Only(BODY_FRAMESET)),
    ("pageshow", EventRule::Only(BODY_FRAMESET)),
    ("pause", EventRule::All),
    ("play", EventRule::All),
    ("playing", EventRule::All),
    ("popstate", EventRule::Only(BODY_FRAMESET)),
    ("progress", EventRule::All),
    ("ratechange", EventRule::All),
    ("reset", EventRule::Except(&["form"])),
    ("resize", EventRule::Except(BODY_FRAMESET)),
    ("scroll", EventRule::Except(BODY_FRAMESET)),
    ("seeked", EventRule::All),
    ("seeking", EventRule::All),
    ("select", EventRule::Except(&["input", "textarea"])),
    ("show", EventRule::All),
    ("sort", EventRule::All),
    ("stalled", EventRule::All),
    ("storage", EventRule::Only(BODY_FRAMESET)),
    ("submit", EventRule::Except(&["form"])),
    ("suspend", EventRule::All),
    ("timeupdate", EventRule::All),
    ("toggle", EventRule::All),
    ("volumechange", EventRule::All),
    ("waiting", EventRule::All),
];

pub fn rule_for(event_type: &str) -> Option<EventRule> {
    EVENT_RULES
        .binary_search_by_key(&event_type, |&(name, _)| name)
        .ok()
        .map(|i| EVENT_RULES[i].1)
}

/// Listener-registration proxy: forwards every call, then counts the ones
/// whose target satisfies the event type's rule.
pub(crate) struct ListenerMonitor {
    inner: Box<dyn EventTargets>,
    recorder: Recorder,
}

impl ListenerMonitor {
    pub(crate) fn new(inner: Box<dyn EventTargets>, recorder: Recorder) -> Self {
        Self { inner, recorder }
    }
}

impl EventTargets for ListenerMonitor {
    fn add_event_listener(
        &self,
        target: &EventTarget,
        event_type: &str,
        options: &ListenerOptions,
    ) -> ApiResult<ListenerId> {
        let id = self.inner.add_event_listener(target, event_type, options)?;
        match rule_for(event_type) {
            Some(rule) if rule.applies_to(target.local_name()) => {
                log::trace!(target: "instrument.listeners", "count {event_type} on {target:?}");
                self.recorder.increment(Category::Listeners, event_type);
            }
            _ => {}
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use html::Id;
    use web_api::DomException;

    fn element(name: &str) -> EventTarget {
        EventTarget::Element {
            id: Id(2),
            local_name: name.to_string(),
        }
    }

    struct Recording;

    impl EventTargets for Recording {
        fn add_event_listener(
            &self,
            _: &EventTarget,
            _: &str,
            _: &ListenerOptions,
        ) -> ApiResult<ListenerId> {
            Ok(ListenerId(1))
        }
    }

    struct Throwing;

    impl EventTargets for Throwing {
        fn add_event_listener(
            &self,
            _: &EventTarget,
            _: &str,
            _: &ListenerOptions,
        ) -> ApiResult<ListenerId> {
            Err(DomException::invalid_state("detached target"))
        }
    }

    #[test]
    fn table_is_sorted_and_unique() {
        assert!(EVENT_RULES.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(rule_for("scroll"), Some(EventRule::Except(BODY_FRAMESET)));
        assert_eq!(rule_for("click"), None);
    }

    #[test]
    fn rules_classify_targets() {
        let scroll = EventRule::Except(BODY_FRAMESET);
        assert!(scroll.applies_to(Some("div")));
        assert!(!scroll.applies_to(Some("body")));
        assert!(scroll.applies_to(None));

        let popstate = EventRule::Only(BODY_FRAMESET);
        assert!(popstate.applies_to(Some("frameset")));
        assert!(!popstate.applies_to(Some("div")));
        assert!(!popstate.applies_to(None));

        assert!(EventRule::All.applies_to(None));
    }

    #[test]
    fn counts_every_applicable_registration() {
        let recorder = Recorder::new();
        let monitor = ListenerMonitor::new(Box::new(Recording), recorder.clone());
        let opts = ListenerOptions::default();

        monitor.add_event_listener(&element("div"), "scroll", &opts).expect("ok");
        monitor.add_event_listener(&element("div"), "scroll", &opts).expect("ok");
        monitor.add_event_listener(&element("body"), "scroll", &opts).expect("ok");
        monitor.add_event_listener(&EventTarget::Window, "popstate", &opts).expect("ok");
        monitor.add_event_listener(&element("body"), "popstate", &opts).expect("ok");
        monitor.add_event_listener(&element("button"), "click", &opts).expect("ok");

        let data = recorder.snapshot();
        assert_eq!(data.get(Category::Listeners, "scroll"), Some(2));
        assert_eq!(data.get(Category::Listeners, "popstate"), Some(1));
        assert_eq!(data.get(Category::Listeners, "click"), None);
    }

    #[test]
    fn failed_registration_is_not_counted() {
        let recorder = Recorder::new();
        let monitor = ListenerMonitor::new(Box::new(Throwing), recorder.clone());
        let err = monitor
            .add_event_listener(&element("div"), "input", &ListenerOptions::default())
            .expect_err("inner error");
        assert_eq!(err.name, "InvalidStateError");
        assert!(recorder.snapshot().is_empty());
    }
}

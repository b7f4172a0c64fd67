use std::collections::HashMap;
use std::sync::LazyLock;

use core_types::Category;
use css::{Selector, parse_selector, query_count};
use html::traverse::for_each_element;
use html::{Doctype, Node};

use crate::Recorder;
use crate::listeners::{EVENT_RULES, EventRule};

pub const LEGACY_COMPAT: &str = "about:legacy-compat";
pub const CUSTOM_DATA_KEY: &str = "// custom data-* attribute";
pub const CUSTOM_DATA_PREFIX: &str = "data-";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoctypeClass {
    Html5,
    NonHtml5,
    Missing,
}

impl DoctypeClass {
    pub fn classify(doctype: Option<&Doctype>) -> Self {
        match doctype {
            None => DoctypeClass::Missing,
            Some(d)
                if d.name == "html"
                    && d.public_id.is_empty()
                    && (d.system_id.is_empty() || d.system_id == LEGACY_COMPAT) =>
            {
                DoctypeClass::Html5
            }
            Some(_) => DoctypeClass::NonHtml5,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            DoctypeClass::Html5 => "HTML5",
            DoctypeClass::NonHtml5 => "non-HTML5",
            DoctypeClass::Missing => "(no doctype)",
        }
    }
}

pub const ELEMENTS: &[&str] = &[
    "abbr",
    "article",
    "aside",
    "audio",
    "bdi",
    "canvas",
    "data",
    "datalist",
    "details",
    "dialog",
    "embed",
    "figcaption",
    "figure",
    "footer",
    "header",
    "hgroup",
    "keygen",
    "main",
    "mark",
    "menuitem",
    "meter",
    "nav",
    "output",
    "picture",
    "progress",
    "rp",
    "rt",
    "ruby",
    "section",
    "source",
    "summary",
    "template",
    "time",
    "track",
    "video",
    "wbr",
];

#[rustfmt::skip]
const ATTRIBUTE_SELECTORS: &[&str] = &[
    // global, minus HTML 4.01 %coreattrs and %i18n
    "*[contenteditable]", "*[contextmenu]", "*[draggable]", "*[dropzone]",
    "*[hidden]", "*[itemid]", "*[itemprop]", "*[itemref]", "*[itemscope]",
    "*[itemtype]", "*[spellcheck]", "*[translate]",
    "a[download]", "a[ping]",
    "area[download]", "area[ping]",
    "button[autofocus]", "button[form]", "button[formaction]",
    "button[formenctype]", "button[formnovalidate]", "button[formtarget]",
    "button[menu]",
    "fieldset[form]",
    "form[autocomplete]", "form[novalidate]",
    "html[manifest]",
    "iframe[allowfullscreen]", "iframe[sandbox]", "iframe[seamless]",
    "iframe[srcdoc]",
    "img[crossorigin]", "img[sizes]", "img[srcset]",
    "input[autocomplete]", "input[autofocus]", "input[dirname]", "input[form]",
    "input[formaction]", "input[formenctype]", "input[formmethod]",
    "input[formnovalidate]", "input[formtarget]", "input[height]",
    "input[inputmode]", "input[list]", "input[max]", "input[min]",
    "input[minlength]", "input[multiple]", "input[pattern]",
    "input[placeholder]", "input[required]", "input[step]", "input[width]",
    "input[type=color]", "input[type=date]", "input[type=datetime]",
    "input[type=datetime-local]", "input[type=email]", "input[type=month]",
    "input[type=number]", "input[type=range]", "input[type=search]",
    "input[type=tel]", "input[type=time]", "input[type=url]",
    "input[type=week]",
    "label[form]",
    "link[crossorigin]", "link[sizes]",
    "link[rel=author]", "link[rel=external]", "link[rel=icon]",
    "link[rel=license]", "link[rel=nofollow]", "link[rel=noreferrer]",
    "link[rel=pingback]", "link[rel=prefetch]", "link[rel=search]",
    "link[rel=sidebar]", "link[rel=tag]",
    "meta[charset]",
    "object[form]", "object[typemustmatch]",
    "ol[reversed]",
    "script[async]", "script[crossorigin]",
    "select[autocomplete]", "select[form]", "select[required]",
    "style[scoped]",
    "table[sortable]",
    "textarea[autocomplete]", "textarea[autofocus]", "textarea[dirname]",
    "textarea[form]", "textarea[inputmode]", "textarea[maxlength]",
    "textarea[minlength]", "textarea[placeholder]", "textarea[required]",
    "textarea[wrap]",
    "th[sorted]",
];

/// Handler-attribute selectors derived from the listener table.
pub fn event_selectors() -> Vec<String> {
    let mut out = Vec::new();
    for &(event, rule) in EVENT_RULES {
        match rule {
            EventRule::All => out.push(format!("*[on{event}]")),
            EventRule::Only(names) => {
                out.extend(names.iter().map(|name| format!("{name}[on{event}]")));
            }
            EventRule::Except(names) => {
                let not: String = names.iter().map(|name| format!(":not({name})")).collect();
                out.push(format!("{not}[on{event}]"));
            }
        }
    }
    out
}

/// Source text of every attribute probe selector, in probe order.
pub fn selector_sources() -> Vec<String> {
    ATTRIBUTE_SELECTORS
        .iter()
        .map(|s| s.to_string())
        .chain(event_selectors())
        .collect()
}

#[derive(Debug)]
pub struct CompiledSelector {
    pub source: String,
    pub selector: Selector,
}

static COMPILED: LazyLock<Vec<CompiledSelector>> = LazyLock::new(|| {
    selector_sources()
        .into_iter()
        .filter_map(|source| match parse_selector(&source) {
            Ok(selector) => Some(CompiledSelector { source, selector }),
            Err(err) => {
                log::warn!(target: "instrument.probes", "skipping selector: {err}");
                None
            }
        })
        .collect()
});

pub fn compiled_selectors() -> &'static [CompiledSelector] {
    &COMPILED
}

/// Replaces the doctype slice with the document's single classification.
pub fn probe_doctype(document: &Node, recorder: &Recorder) -> DoctypeClass {
    let class = DoctypeClass::classify(document.doctype());
    recorder.clear_category(Category::Doctypes);
    recorder.mark(Category::Doctypes, class.key());
    log::debug!(target: "instrument.probes", "doctype: {}", class.key());
    class
}

pub fn probe_elements(document: &Node, recorder: &Recorder) {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for_each_element(document, |el| {
        if let Some(name) = el.local_name().filter(|n| ELEMENTS.contains(n)) {
            *counts.entry(name).or_default() += 1;
        }
    });
    for &name in ELEMENTS {
        recorder.set_count(Category::Elements, name, counts.get(name).copied().unwrap_or(0));
    }
    log::debug!(target: "instrument.probes", "elements: {} kinds present", counts.len());
}

pub fn probe_attributes(document: &Node, selectors: &[CompiledSelector], recorder: &Recorder) {
    for compiled in selectors {
        let n = query_count(document, &compiled.selector) as u64;
        recorder.set_count(Category::Attributes, &compiled.source, n);
    }
    recorder.set_count(Category::Attributes, CUSTOM_DATA_KEY, count_custom_data(document));
}

/// Elements carrying at least one `data-*` attribute.
pub fn count_custom_data(document: &Node) -> u64 {
    let mut n = 0;
    for_each_element(document, |el| {
        if el
            .attributes()
            .iter()
            .any(|(name, _)| name.starts_with(CUSTOM_DATA_PREFIX))
        {
            n += 1;
        }
    });
    n
}

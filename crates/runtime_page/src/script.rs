use bus::{Action, ListenerTarget};
use css::{SelectorError, parse_selector, query_all};
use html::{Id, Node};
use thiserror::Error;
use instrument::StorageArea;
use web_api::{ApiResult, DomException, EventTarget, Storage, WatchId, Window};

/// An action that threw inside the page.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("uncaught {0}")]
    Dom(#[from] DomException),
    #[error(transparent)]
    Selector(#[from] SelectorError),
    #[error("getContext is not a function on <{0}>")]
    NotCanvas(String),
}

fn matching_elements(document: &Node, selector: &str) -> Result<Vec<(Id, String)>, ScriptError> {
    let selector = parse_selector(selector)?;
    Ok(query_all(document, &selector)
        .into_iter()
        .map(|el| (el.id(), el.local_name().unwrap_or_default().to_string()))
        .collect())
}

/// `window.localStorage` / `window.sessionStorage`.
fn storage(window: &Window, area: StorageArea) -> ApiResult<&dyn Storage> {
    match area {
        StorageArea::Local => window.local_storage(),
        StorageArea::Session => window.session_storage(),
    }
}

/// Runs one action the way page script would, through the window's platform.
pub fn run_action(window: &mut Window, action: &Action) -> Result<(), ScriptError> {
    let platform = window.platform();
    match action {
        Action::GetCurrentPosition { options } => {
            platform.geolocation.get_current_position(options)?;
        }
        Action::WatchPosition { options } => {
            platform.geolocation.watch_position(options)?;
        }
        Action::ClearWatch { id } => platform.geolocation.clear_watch(WatchId(*id)),
        Action::AppCacheUpdate => platform.application_cache.update()?,
        Action::AppCacheAbort => platform.application_cache.abort(),
        Action::AppCacheSwapCache => platform.application_cache.swap_cache()?,
        Action::WebSocket { url, protocols } => {
            platform.transports.web_socket(url, protocols.as_deref())?;
        }
        Action::EventSource { url, init } => {
            platform.transports.event_source(url, init.as_ref())?;
        }
        Action::Worker { url, options } => {
            platform.workers.worker(url, options.as_ref())?;
        }
        Action::SharedWorker { url, name } => {
            platform.workers.shared_worker(url, name.as_deref())?;
        }
        Action::GetUserMedia { constraints } => {
            platform.media_devices.get_user_media(constraints)?;
        }
        Action::SessionDescription { init } => {
            platform.peer_connections.session_description(init.as_ref())?;
        }
        Action::PeerConnection { configuration } => {
            platform.peer_connections.peer_connection(configuration.as_ref())?;
        }
        Action::MediaSource => {
            platform.media_sources.media_source()?;
        }
        Action::GetContext {
            selector,
            context_id,
            options,
        } => {
            for (id, name) in matching_elements(window.document(), selector)? {
                if name != "canvas" {
                    return Err(ScriptError::NotCanvas(name));
                }
                platform.canvas.get_context(id, context_id, options.as_ref())?;
            }
        }
        Action::AddEventListener {
            target,
            event,
            options,
        } => {
            let targets = match target {
                ListenerTarget::Window => vec![EventTarget::Window],
                ListenerTarget::Document => vec![EventTarget::Document],
                ListenerTarget::Elements(selector) => matching_elements(window.document(), selector)?
                    .into_iter()
                    .map(|(id, local_name)| EventTarget::Element { id, local_name })
                    .collect(),
            };
            for target in &targets {
                platform.events.add_event_listener(target, event, options)?;
            }
        }
        Action::SetItem { area, key, value } => storage(window, *area)?.set_item(key, value)?,
        Action::RemoveItem { area, key } => storage(window, *area)?.remove_item(key),
        Action::ClearStorage { area } => storage(window, *area)?.clear(),
        Action::RemoveElements { selector } => {
            let ids: Vec<Id> = matching_elements(window.document(), selector)?
                .into_iter()
                .map(|(id, _)| id)
                .collect();
            for id in ids {
                html::traverse::remove_node(window.document_mut(), id);
            }
        }
    }
    Ok(())
}

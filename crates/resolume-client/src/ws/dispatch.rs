//! Inbound message routing and listener state.
//!
//! All mutable channel state lives behind one mutex: the parameter registry,
//! the catch-all listener, composition and error listeners, and the latest
//! sources and effects catalogues. Listeners are cloned out under the lock
//! and invoked after it is released, so a listener may register or remove
//! listeners without deadlocking.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use resolume_core::{
    Action, Composition, EffectsCatalogue, ErrorMessage, InboundMessage, ParameterKey,
    ParameterMessage, Sources,
};

use super::connection::Outbound;
use super::registry::{ListenerId, ListenerRegistry};

pub(crate) type ParameterListener = dyn Fn(&ParameterMessage) + Send + Sync;
pub(crate) type CompositionListener = dyn Fn(&Composition) + Send + Sync;
pub(crate) type ErrorListener = dyn Fn(&ErrorMessage) + Send + Sync;

#[derive(Default)]
struct DispatchState {
    parameters: ListenerRegistry<ParameterListener>,
    catch_all: Option<Arc<ParameterListener>>,
    composition: Vec<Arc<CompositionListener>>,
    errors: Vec<Arc<ErrorListener>>,
    sources: Option<Value>,
    effects: Option<Value>,
}

/// Shared between the channel handle and its connection task.
pub(crate) struct Dispatcher {
    state: Mutex<DispatchState>,
    outbound: mpsc::UnboundedSender<Outbound>,
}

impl Dispatcher {
    pub(crate) fn new(outbound: mpsc::UnboundedSender<Outbound>) -> Self {
        Self {
            state: Mutex::new(DispatchState::default()),
            outbound,
        }
    }

    // ─── Registration ────────────────────────────────────────────────────

    /// Register a parameter listener, subscribing if it is the first for `key`.
    pub(crate) fn add_parameter_listener(
        &self,
        key: ParameterKey,
        listener: Arc<ParameterListener>,
    ) -> ListenerId {
        let id = ListenerId::next();
        let mut state = self.state.lock();
        if let Some(action) = state.parameters.insert(key, id, listener) {
            // Queued while the lock is held so frames keep registry order.
            self.queue(&action);
        }
        id
    }

    /// Remove a parameter listener, unsubscribing if it was the last for `key`.
    pub(crate) fn remove_parameter_listener(&self, key: &ParameterKey, id: ListenerId) {
        let mut state = self.state.lock();
        if let Some(action) = state.parameters.remove(key, id) {
            self.queue(&action);
        }
    }

    pub(crate) fn set_catch_all(&self, listener: Arc<ParameterListener>) {
        self.state.lock().catch_all = Some(listener);
    }

    pub(crate) fn add_composition_listener(&self, listener: Arc<CompositionListener>) {
        self.state.lock().composition.push(listener);
    }

    pub(crate) fn add_error_listener(&self, listener: Arc<ErrorListener>) {
        self.state.lock().errors.push(listener);
    }

    pub(crate) fn is_subscribed(&self, key: &ParameterKey) -> bool {
        self.state.lock().parameters.contains_key(key)
    }

    pub(crate) fn sources(&self) -> Option<Sources> {
        let raw = self.state.lock().sources.clone()?;
        Sources::try_from(raw).ok()
    }

    pub(crate) fn effects(&self) -> Option<EffectsCatalogue> {
        let raw = self.state.lock().effects.clone()?;
        EffectsCatalogue::from_value(&raw)
    }

    fn queue(&self, action: &Action) {
        let frame = match serde_json::to_string(action) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(action = action.action_type().as_str(), error = %e, "failed to encode action");
                return;
            }
        };
        if self.outbound.send(Outbound::Frame(frame)).is_err() {
            debug!(
                action = action.action_type().as_str(),
                parameter = action.target(),
                "channel closed, action not sent"
            );
        }
    }

    // ─── Dispatch ────────────────────────────────────────────────────────

    /// Route one inbound text frame.
    ///
    /// Malformed JSON and frames of unknown shape are dropped.
    pub(crate) fn dispatch(&self, text: &str) {
        let message = match InboundMessage::decode(text) {
            Ok(Some(message)) => message,
            Ok(None) => {
                trace!(len = text.len(), "dropping unrecognized frame");
                return;
            }
            Err(e) => {
                warn!(error = %e, "dropping malformed frame");
                return;
            }
        };
        trace!(kind = message.kind(), "inbound frame");

        match message {
            InboundMessage::Parameter(msg) => self.dispatch_parameter(&msg),
            InboundMessage::Sources(sources) => {
                self.state.lock().sources = Some(sources);
            }
            InboundMessage::Effects(effects) => {
                self.state.lock().effects = Some(effects);
            }
            InboundMessage::Composition(composition) => {
                let listeners = self.state.lock().composition.clone();
                for listener in listeners {
                    listener(&composition);
                }
            }
            InboundMessage::Error(error) => {
                warn!(error = ?error.error, id = ?error.id, path = ?error.path, "server reported error");
                let listeners = self.state.lock().errors.clone();
                for listener in listeners {
                    listener(&error);
                }
            }
        }
    }

    /// Catch-all first, then listeners keyed by id, then by path. A listener
    /// registered under both keys is called twice.
    fn dispatch_parameter(&self, msg: &ParameterMessage) {
        let (catch_all, by_id, by_path) = {
            let state = self.state.lock();
            let lookup = |key: Option<ParameterKey>| {
                key.map(|k| state.parameters.listeners(&k))
                    .unwrap_or_default()
            };
            (
                state.catch_all.clone(),
                lookup(msg.id_key()),
                lookup(msg.path_key()),
            )
        };

        if let Some(listener) = catch_all {
            listener(msg);
        }
        for listener in by_id.iter().chain(&by_path) {
            listener(msg);
        }
    }
}

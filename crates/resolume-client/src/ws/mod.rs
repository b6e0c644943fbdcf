//! Long-lived WebSocket channel with parameter subscriptions.
//!
//! [`SubscriptionChannel::connect`] opens `ws(s)://host:port/api/v1` and
//! spawns a task that owns the socket. Listeners registered on the handle
//! run on that task, one inbound frame at a time, and must not block.
//!
//! Registering the first listener for a parameter sends a `subscribe`
//! action; removing the last one sends `unsubscribe`. Parameter messages are
//! delivered to the catch-all listener, then to listeners keyed by the
//! message's numeric id, then to listeners keyed by its path.

mod connection;
mod dispatch;
mod registry;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::connect_async;
use tracing::{debug, info, instrument};

use resolume_core::{
    Action, Composition, EffectsCatalogue, ErrorMessage, ParameterMessage, ParameterRef, Sources,
};
use resolume_settings::ConnectionSettings;

use crate::errors::ChannelError;

use self::connection::{Outbound, connection_loop};
use self::dispatch::Dispatcher;

pub use self::registry::ListenerId;

/// Lifecycle of a [`SubscriptionChannel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelState {
    /// Connected; actions are sent.
    Open,
    /// Closed locally or by the server. Terminal.
    Closed,
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Open => "open",
            Self::Closed => "closed",
        })
    }
}

/// Handle to an open WebSocket session.
///
/// Dropping the handle closes the socket.
pub struct SubscriptionChannel {
    url: String,
    dispatcher: Arc<Dispatcher>,
    outbound: mpsc::UnboundedSender<Outbound>,
    state: Arc<watch::Sender<ChannelState>>,
    finished: watch::Receiver<bool>,
}

impl SubscriptionChannel {
    /// Connect to the server described by `connection`.
    pub async fn connect(connection: &ConnectionSettings) -> Result<Self, ChannelError> {
        Self::connect_url(connection.ws_base_url()).await
    }

    /// Connect to an explicit WebSocket URL such as `ws://host:8080/api/v1`.
    #[instrument(skip_all, fields(url = %url.as_ref()))]
    pub async fn connect_url(url: impl AsRef<str>) -> Result<Self, ChannelError> {
        let url = url.as_ref().to_owned();
        let (ws, _) = connect_async(url.as_str()).await?;
        info!("subscription channel open");

        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let dispatcher = Arc::new(Dispatcher::new(outbound.clone()));
        let (state, _) = watch::channel(ChannelState::Open);
        let state = Arc::new(state);
        let (finished_tx, finished) = watch::channel(false);

        drop(tokio::spawn(connection_loop(
            ws,
            outbound_rx,
            Arc::clone(&dispatcher),
            Arc::clone(&state),
            finished_tx,
        )));

        Ok(Self {
            url,
            dispatcher,
            outbound,
            state,
            finished,
        })
    }

    /// WebSocket URL this channel connected to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ChannelState {
        *self.state.borrow()
    }

    /// Wait until the connection task has finished, after a local
    /// [`close`](Self::close) or a close from the server.
    ///
    /// Frames sent before `close` have been written once this returns.
    pub async fn closed(&self) {
        let mut rx = self.finished.clone();
        let _ = rx.wait_for(|done| *done).await;
    }

    /// Close the socket. Does nothing if the channel is already closed.
    pub fn close(&self) {
        let was_open = self.state.send_if_modified(|state| {
            let open = *state == ChannelState::Open;
            *state = ChannelState::Closed;
            open
        });
        if was_open {
            debug!(url = %self.url, "close requested");
            let _ = self.outbound.send(Outbound::Close);
        }
    }

    // ─── Listeners ───────────────────────────────────────────────────────

    /// Call `listener` for every message about `parameter`.
    ///
    /// `parameter` is a numeric id or a path. The first listener for a
    /// parameter subscribes to it on the server.
    pub fn on_parameter<F>(&self, parameter: impl Into<ParameterRef>, listener: F) -> ListenerId
    where
        F: Fn(&ParameterMessage) + Send + Sync + 'static,
    {
        let key = parameter.into().key();
        self.dispatcher.add_parameter_listener(key, Arc::new(listener))
    }

    /// Remove a listener added with [`on_parameter`](Self::on_parameter).
    ///
    /// Removing the last listener for a parameter unsubscribes from it.
    /// Unknown ids are ignored.
    pub fn remove_listener(&self, parameter: impl Into<ParameterRef>, id: ListenerId) {
        let key = parameter.into().key();
        self.dispatcher.remove_parameter_listener(&key, id);
    }

    /// Whether any listener is registered for `parameter`.
    #[must_use]
    pub fn is_subscribed(&self, parameter: impl Into<ParameterRef>) -> bool {
        self.dispatcher.is_subscribed(&parameter.into().key())
    }

    /// Call `listener` for every parameter message, before keyed listeners.
    ///
    /// Only one catch-all listener exists; a later call replaces it.
    pub fn on_all<F>(&self, listener: F)
    where
        F: Fn(&ParameterMessage) + Send + Sync + 'static,
    {
        self.dispatcher.set_catch_all(Arc::new(listener));
    }

    /// Call `listener` for every composition snapshot.
    pub fn on_composition<F>(&self, listener: F)
    where
        F: Fn(&Composition) + Send + Sync + 'static,
    {
        self.dispatcher.add_composition_listener(Arc::new(listener));
    }

    /// Call `listener` for every error frame.
    pub fn on_error<F>(&self, listener: F)
    where
        F: Fn(&ErrorMessage) + Send + Sync + 'static,
    {
        self.dispatcher.add_error_listener(Arc::new(listener));
    }

    /// Sources catalogue from the latest `sources_update`.
    ///
    /// `None` before the first update, or when the latest one carried no
    /// object.
    #[must_use]
    pub fn sources(&self) -> Option<Sources> {
        self.dispatcher.sources()
    }

    /// Effects catalogue from the latest `effects_update`, read leniently.
    #[must_use]
    pub fn effects(&self) -> Option<EffectsCatalogue> {
        self.dispatcher.effects()
    }

    // ─── Actions ─────────────────────────────────────────────────────────

    /// Send one action.
    pub fn send(&self, action: &Action) -> Result<(), ChannelError> {
        if self.state() == ChannelState::Closed {
            return Err(ChannelError::Closed);
        }
        let frame = serde_json::to_string(action)?;
        debug!(
            action = action.action_type().as_str(),
            target = action.target(),
            "sending action"
        );
        self.outbound
            .send(Outbound::Frame(frame))
            .map_err(|_| ChannelError::Closed)
    }

    /// Send a bare `subscribe` without registering a listener.
    pub fn subscribe(&self, parameter: impl Into<ParameterRef>) -> Result<(), ChannelError> {
        self.send(&Action::subscribe(parameter.into().key()))
    }

    /// Send a bare `unsubscribe` without touching registered listeners.
    pub fn unsubscribe(&self, parameter: impl Into<ParameterRef>) -> Result<(), ChannelError> {
        self.send(&Action::unsubscribe(parameter.into().key()))
    }

    /// Assign `value` to a parameter.
    pub fn set_parameter(
        &self,
        parameter: impl Into<ParameterRef>,
        value: Value,
    ) -> Result<(), ChannelError> {
        self.send(&Action::Set {
            parameter: parameter.into().key(),
            value,
        })
    }

    /// Fire a trigger parameter, optionally with a pressed state.
    pub fn trigger(
        &self,
        parameter: impl Into<ParameterRef>,
        pressed: Option<bool>,
    ) -> Result<(), ChannelError> {
        self.send(&Action::Trigger {
            parameter: parameter.into().key(),
            value: pressed,
        })
    }

    /// Post `body` to a REST-style `path` over the socket.
    pub fn post(
        &self,
        path: impl Into<String>,
        body: Option<String>,
    ) -> Result<(), ChannelError> {
        self.send(&Action::Post {
            path: path.into(),
            body,
            id: None,
        })
    }
}

impl fmt::Debug for SubscriptionChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionChannel")
            .field("url", &self.url)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Drop for SubscriptionChannel {
    fn drop(&mut self) {
        self.close();
    }
}

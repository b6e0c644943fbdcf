//! REST session against `http(s)://host:port/api/v1`.
//!
//! Reads parse the JSON body and propagate transport or decode failures
//! unchanged. Mutations return the raw [`reqwest::Response`] so the caller
//! can inspect the status; a non-2xx answer is not an error here. Opening a
//! clip is the exception: it races a fixed timer and classifies failures
//! into [`OpenClipError`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use hyper::ext::ReasonPhrase;
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use resolume_core::constants::OPEN_CLIP_TIMEOUT;
use resolume_core::schema::{Clip, Column, Composition, Deck, Layer, ProductInfo};
use resolume_settings::{ClientSettings, ConnectionSettings};

use crate::encoding::{ClipEncoding, video_effect_uri, video_source_uri};
use crate::errors::{ApiError, OpenClipError};

/// REST session. Holds connection parameters only; every call is independent.
#[derive(Clone, Debug)]
pub struct ResolumeApi {
    client: reqwest::Client,
    base_url: String,
    media_root: Option<PathBuf>,
    open_clip_timeout: Duration,
}

impl ResolumeApi {
    /// Session for the given server.
    #[must_use]
    pub fn new(connection: &ConnectionSettings) -> Self {
        Self::with_base_url(connection.rest_base_url())
    }

    /// Session configured from loaded settings, including the media root.
    #[must_use]
    pub fn from_settings(settings: &ClientSettings) -> Self {
        let mut api = Self::new(&settings.connection);
        api.media_root.clone_from(&settings.media_root);
        api
    }

    /// Session against an explicit API root such as `http://host:8080/api/v1`.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        debug!(base_url = %base_url, "REST session created");
        Self {
            client: reqwest::Client::new(),
            base_url,
            media_root: None,
            open_clip_timeout: OPEN_CLIP_TIMEOUT,
        }
    }

    /// Set the directory relative clip paths are resolved against.
    #[must_use]
    pub fn with_media_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.media_root = Some(root.into());
        self
    }

    #[cfg(test)]
    pub(crate) fn with_open_clip_timeout(mut self, timeout: Duration) -> Self {
        self.open_clip_timeout = timeout;
        self
    }

    /// API root, `protocol://host:port/api/v1`.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// Local media directory, if configured.
    #[must_use]
    pub fn media_root(&self) -> Option<&Path> {
        self.media_root.as_deref()
    }

    /// Resolve `path` against the media root when it is relative.
    #[must_use]
    pub fn resolve_media_path(&self, path: &str) -> String {
        match &self.media_root {
            Some(root) if Path::new(path).is_relative() => {
                root.join(path).to_string_lossy().into_owned()
            }
            _ => path.to_owned(),
        }
    }

    // ─── Reads ───────────────────────────────────────────────────────────

    /// `GET /product`
    pub async fn product(&self) -> Result<ProductInfo, ApiError> {
        self.get_json("/product").await
    }

    /// `GET /composition`
    pub async fn composition(&self) -> Result<Composition, ApiError> {
        self.get_json("/composition").await
    }

    /// `GET /composition/layers/{layer}/clips/{clip}`
    pub async fn clip_by_index(&self, layer: u32, clip: u32) -> Result<Clip, ApiError> {
        self.get_json(&clip_path(layer, clip)).await
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// `PUT /composition/decks/by-id/{id}` with the deck as JSON.
    ///
    /// The id is read from the deck itself.
    pub async fn put_deck(&self, deck: &Deck) -> Result<Response, ApiError> {
        let Some(id) = deck.id() else {
            return Err(ApiError::InvalidPayload("deck has no numeric id".into()));
        };
        self.put_json(&format!("/composition/decks/by-id/{id}"), deck)
            .await
    }

    /// `POST /composition/columns/add`
    pub async fn add_column(&self) -> Result<Response, ApiError> {
        self.send(self.request(Method::POST, "/composition/columns/add"))
            .await
    }

    /// `PUT /composition/columns/{index}`
    pub async fn replace_column(&self, index: u32, column: &Column) -> Result<Response, ApiError> {
        self.put_json(&format!("/composition/columns/{index}"), column)
            .await
    }

    /// `POST /composition/layers/add`
    pub async fn add_layer(&self) -> Result<Response, ApiError> {
        self.send(self.request(Method::POST, "/composition/layers/add"))
            .await
    }

    /// `PUT /composition/layers/{index}`
    pub async fn replace_layer(&self, index: u32, layer: &Layer) -> Result<Response, ApiError> {
        self.put_json(&format!("/composition/layers/{index}"), layer)
            .await
    }

    /// `PUT /composition/layers/{layer}/clips/{clip}`
    pub async fn replace_clip(
        &self,
        layer: u32,
        clip: u32,
        value: &Clip,
    ) -> Result<Response, ApiError> {
        self.put_json(&clip_path(layer, clip), value).await
    }

    /// Add the video effect called `name` to a clip.
    ///
    /// `POST .../effects/video/add` with body `effect:///video/<name>`.
    pub async fn add_video_effect(
        &self,
        layer: u32,
        clip: u32,
        name: &str,
    ) -> Result<Response, ApiError> {
        let path = format!("{}/effects/video/add", clip_path(layer, clip));
        self.send(self.request(Method::POST, &path).body(video_effect_uri(name)))
            .await
    }

    /// Load the video source called `name` into a clip.
    ///
    /// `POST .../open` with body `source:///video/<name>`.
    pub async fn add_video_source(
        &self,
        layer: u32,
        clip: u32,
        name: &str,
    ) -> Result<Response, ApiError> {
        let path = format!("{}/open", clip_path(layer, clip));
        self.send(self.request(Method::POST, &path).body(video_source_uri(name)))
            .await
    }

    /// Open media into a clip slot.
    ///
    /// The request races a fixed timer. Fails with
    /// [`OpenClipError::Timeout`] if the timer wins,
    /// [`OpenClipError::BadStatus`] for a status of 300 or above, and
    /// [`OpenClipError::NoResponse`] when the server drops the connection
    /// without answering. Connection failures are returned as
    /// [`ApiError::Http`].
    pub async fn open_clip_by_index(
        &self,
        layer: u32,
        clip: u32,
        path: &str,
        encoding: ClipEncoding,
    ) -> Result<(), ApiError> {
        let endpoint = format!("{}/open", clip_path(layer, clip));
        let body = encoding.body(path);
        let builder = self.request(Method::POST, &endpoint).body(body);

        let response = match tokio::time::timeout(self.open_clip_timeout, builder.send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) if is_no_response(&e) => {
                warn!(layer, clip, error = %e, "open clip: connection closed without response");
                return Err(OpenClipError::NoResponse.into());
            }
            Ok(Err(e)) => return Err(ApiError::Http(e)),
            Err(_) => {
                let timeout_ms = u64::try_from(self.open_clip_timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(layer, clip, timeout_ms, "open clip timed out");
                return Err(OpenClipError::Timeout { timeout_ms }.into());
            }
        };

        let status = response.status();
        if status.as_u16() >= 300 {
            return Err(OpenClipError::BadStatus {
                status: status.as_u16(),
                status_text: status_text(&response),
            }
            .into());
        }
        debug!(layer, clip, %status, "clip opened");
        Ok(())
    }

    // ─── Request helpers ─────────────────────────────────────────────────

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        debug!(%method, url = %url, "REST request");
        self.client.request(method, url)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        Ok(builder.send().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn put_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        value: &T,
    ) -> Result<Response, ApiError> {
        self.send(self.request(Method::PUT, path).json(value)).await
    }
}

fn clip_path(layer: u32, clip: u32) -> String {
    format!("/composition/layers/{layer}/clips/{clip}")
}

/// Reason phrase as sent by the server, else the canonical one, else the
/// numeric code. The client only records a phrase that differs from the
/// canonical one.
fn status_text(response: &Response) -> String {
    let status = response.status();
    response
        .extensions()
        .get::<ReasonPhrase>()
        .filter(|reason| !reason.as_bytes().is_empty())
        .map(|reason| String::from_utf8_lossy(reason.as_bytes()).into_owned())
        .or_else(|| status.canonical_reason().map(str::to_owned))
        .unwrap_or_else(|| status.as_str().to_owned())
}

/// The request reached the server but no response came back.
fn is_no_response(err: &reqwest::Error) -> bool {
    err.is_request() && !err.is_connect() && !err.is_builder() && err.status().is_none()
}

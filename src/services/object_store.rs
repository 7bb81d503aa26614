//! src/services/object_store.rs
//!
//! Client side of the S3-compatible backend. The gateway consumes exactly
//! three operations — stat, get, and a streamed listing — behind the
//! `ObjectStore` trait, so handlers never see the SDK types directly.
//! `S3Store` is the production implementation on top of `aws-sdk-s3`.

use crate::config::GatewayConfig;
use crate::models::object::{ObjectBody, ObjectStat};
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use axum::http::Uri;
use futures::StreamExt;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::{io::ReaderStream, sync::CancellationToken};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid endpoint `{0}`")]
    InvalidEndpoint(String),
    #[error("object `{0}` not found")]
    NotFound(String),
    #[error("backend request failed: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The three backend operations the gateway depends on.
///
/// `stat_object` is metadata-only; `get_object` opens a content stream;
/// `list_objects` enumerates every key sharing the given prefix, nested
/// keys included.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn stat_object(&self, key: &str) -> StoreResult<ObjectStat>;

    async fn get_object(&self, key: &str) -> StoreResult<ObjectBody>;

    async fn list_objects(&self, prefix: &str) -> StoreResult<KeyStream>;
}

/// A streamed enumeration of keys, fed by a background producer task.
///
/// The producer owns the sender half of a bounded channel and watches the
/// cancellation token; cancelling releases it. `stop` cancels explicitly,
/// and dropping the stream cancels as well, so the producer is released on
/// every exit path. Cancellation is idempotent.
pub struct KeyStream {
    rx: mpsc::Receiver<StoreResult<String>>,
    cancel: CancellationToken,
}

impl KeyStream {
    pub fn new(rx: mpsc::Receiver<StoreResult<String>>, cancel: CancellationToken) -> Self {
        Self { rx, cancel }
    }

    /// Next enumerated key, or `None` once the producer is done.
    pub async fn next(&mut self) -> Option<StoreResult<String>> {
        self.rx.recv().await
    }

    /// Tell the producer to stop enumerating.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for KeyStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Object store client bound to one bucket on one endpoint.
#[derive(Clone, Debug)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
}

/// Channel capacity between the listing producer task and the consumer.
const LIST_CHANNEL_CAPACITY: usize = 64;

impl S3Store {
    /// Build the client from the loaded configuration.
    ///
    /// The configured endpoint is a host (optionally with port); `https`
    /// is assumed when no scheme is given. An endpoint that does not parse
    /// as a URI is a construction failure.
    pub fn connect(cfg: &GatewayConfig) -> StoreResult<Self> {
        let endpoint = if cfg.endpoint.contains("://") {
            cfg.endpoint.clone()
        } else {
            format!("https://{}", cfg.endpoint)
        };
        endpoint
            .parse::<Uri>()
            .map_err(|_| StoreError::InvalidEndpoint(cfg.endpoint.clone()))?;

        let credentials = Credentials::new(
            cfg.access_key_id.clone(),
            cfg.access_key_secret.clone(),
            None,
            None,
            "config-file",
        );
        let conf = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .endpoint_url(endpoint)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: aws_sdk_s3::Client::from_conf(conf),
            bucket: cfg.bucket.clone(),
        })
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn stat_object(&self, key: &str) -> StoreResult<ObjectStat> {
        let head = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                let err = err.into_service_error();
                if err.is_not_found() {
                    StoreError::NotFound(key.to_string())
                } else {
                    StoreError::Backend(err.to_string())
                }
            })?;

        Ok(ObjectStat {
            size: head.content_length().unwrap_or(0),
        })
    }

    async fn get_object(&self, key: &str) -> StoreResult<ObjectBody> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| StoreError::Backend(err.into_service_error().to_string()))?;

        let content_type = output.content_type().map(str::to_string);
        let size = output.content_length();
        let stream = ReaderStream::new(output.body.into_async_read()).boxed();

        Ok(ObjectBody {
            content_type,
            size,
            stream,
        })
    }

    async fn list_objects(&self, prefix: &str) -> StoreResult<KeyStream> {
        let (tx, rx) = mpsc::channel(LIST_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();

        let token = cancel.clone();
        let client = self.client.clone();
        let bucket = self.bucket.clone();
        let prefix = prefix.to_string();

        // No delimiter: every key sharing the prefix is enumerated, one
        // page at a time, and forwarded until done or cancelled.
        tokio::spawn(async move {
            let mut pages = client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .into_paginator()
                .send();

            loop {
                let page = tokio::select! {
                    _ = token.cancelled() => return,
                    page = pages.next() => match page {
                        Some(page) => page,
                        None => return,
                    },
                };

                match page {
                    Ok(output) => {
                        for object in output.contents() {
                            let Some(key) = object.key() else { continue };
                            let item = Ok(key.to_string());
                            tokio::select! {
                                _ = token.cancelled() => return,
                                sent = tx.send(item) => {
                                    if sent.is_err() {
                                        return;
                                    }
                                }
                            }
                        }
                    }
                    Err(err) => {
                        let _ = tx
                            .send(Err(StoreError::Backend(
                                err.into_service_error().to_string(),
                            )))
                            .await;
                        return;
                    }
                }
            }
        });

        Ok(KeyStream::new(rx, cancel))
    }
}

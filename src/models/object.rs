//! Metadata and content handles for objects looked up in the backing store.

use bytes::Bytes;
use futures::stream::BoxStream;
use std::io;

/// Chunked object content as produced by the store client.
pub type BodyStream = BoxStream<'static, io::Result<Bytes>>;

/// Result of a metadata-only lookup (stat).
///
/// A path names an object when its stat reports a non-zero size; anything
/// else is treated as a listable prefix.
#[derive(Debug, Clone, Copy)]
pub struct ObjectStat {
    /// Size in bytes. Zero when the backend reports no content length.
    pub size: i64,
}

/// An object fetched for streaming to the client.
pub struct ObjectBody {
    /// Content type as recorded by the backend, if any.
    pub content_type: Option<String>,

    /// Size in bytes, if the backend reports one.
    pub size: Option<i64>,

    /// The content itself.
    pub stream: BodyStream,
}

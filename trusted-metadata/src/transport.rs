// Copyright 2019 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fetching repository files by URL.

use async_trait::async_trait;
use bytes::Bytes;
use dyn_clone::DynClone;
use futures::{StreamExt, TryStreamExt};
use futures_core::stream::BoxStream;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::io::ErrorKind;
use url::Url;

/// A stream of bytes, or an error, as produced by a [`Transport`].
pub type TransportStream = BoxStream<'static, Result<Bytes, TransportError>>;

/// Collects a [`TransportStream`] into a `Vec<u8>`.
#[async_trait]
pub trait IntoVec<E> {
    /// Reads the whole stream, returning the first error encountered.
    async fn into_vec(self) -> Result<Vec<u8>, E>;
}

#[async_trait]
impl<S, E> IntoVec<E> for S
where
    S: futures::Stream<Item = Result<Bytes, E>> + Send,
    E: Send,
{
    async fn into_vec(self) -> Result<Vec<u8>, E> {
        self.try_fold(Vec::new(), |mut acc, bytes| {
            acc.extend_from_slice(bytes.as_ref());
            std::future::ready(Ok(acc))
        })
        .await
    }
}

/// A trait to abstract over the method/protocol by which files are obtained.
///
/// The trait hides the underlying types involved by returning a [`TransportStream`] and by
/// requiring the concrete type [`TransportError`] as the error type.
#[async_trait]
pub trait Transport: Debug + DynClone + Send + Sync {
    /// Opens a stream over the file specified by `url`.
    async fn fetch(&self, url: Url) -> Result<TransportStream, TransportError>;
}

// Implement `Clone` for `Transport` trait objects.
dyn_clone::clone_trait_object!(Transport);

// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=

/// The kind of error that the transport object experienced during `fetch`.
///
/// The updater stops walking the chain of root versions when the next one is not found, so a
/// missing file must be distinguishable from other failures.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportErrorKind {
    /// The transport does not handle the URL scheme. e.g. `file://` or `http://`.
    UnsupportedUrlScheme,
    /// The file cannot be found.
    FileNotFound,
    /// The transport failed for any other reason, e.g. IO error, HTTP broken pipe, etc.
    Other,
}

impl Display for TransportErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TransportErrorKind::UnsupportedUrlScheme => "unsupported URL scheme",
                TransportErrorKind::FileNotFound => "file not found",
                TransportErrorKind::Other => "other",
            }
        )
    }
}

/// The error type that [`Transport::fetch`] returns.
#[derive(Debug)]
pub struct TransportError {
    /// The kind of error that occurred.
    kind: TransportErrorKind,
    /// The URL that the transport was trying to fetch.
    url: String,
    /// The underlying error that occurred (if any).
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl TransportError {
    /// Creates a new [`TransportError`]. Use this when there is no underlying error to wrap.
    pub fn new<S>(kind: TransportErrorKind, url: S) -> Self
    where
        S: AsRef<str>,
    {
        Self {
            kind,
            url: url.as_ref().into(),
            source: None,
        }
    }

    /// Creates a new [`TransportError`]. Use this to preserve an underlying error.
    pub fn new_with_cause<S, E>(kind: TransportErrorKind, url: S, source: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
        S: AsRef<str>,
    {
        Self {
            kind,
            url: url.as_ref().into(),
            source: Some(source.into()),
        }
    }

    /// The type of [`TransportError`].
    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    /// The URL that [`Transport::fetch`] was trying to fetch.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(e) = self.source.as_ref() {
            write!(
                f,
                "Transport '{}' error fetching '{}': {}",
                self.kind, self.url, e
            )
        } else {
            write!(f, "Transport '{}' error fetching '{}'", self.kind, self.url)
        }
    }
}

impl Error for TransportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn Error))
    }
}

// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=

/// Provides a [`Transport`] for local files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilesystemTransport;

#[async_trait]
impl Transport for FilesystemTransport {
    async fn fetch(&self, url: Url) -> Result<TransportStream, TransportError> {
        if url.scheme() != "file" {
            return Err(TransportError::new(
                TransportErrorKind::UnsupportedUrlScheme,
                url,
            ));
        }

        let path = url.to_file_path().map_err(|()| {
            TransportError::new_with_cause(
                TransportErrorKind::Other,
                &url,
                "URL does not name a local file",
            )
        })?;
        let file = tokio::fs::File::open(&path).await.map_err(|e| {
            let kind = match e.kind() {
                ErrorKind::NotFound => TransportErrorKind::FileNotFound,
                _ => TransportErrorKind::Other,
            };
            TransportError::new_with_cause(kind, &url, e)
        })?;

        let stream = tokio_util::io::ReaderStream::new(file).map(move |chunk| {
            chunk.map_err(|e| TransportError::new_with_cause(TransportErrorKind::Other, &url, e))
        });
        Ok(stream.boxed())
    }
}

// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=

/// The transport used when none is given: local files only. Remote repositories are reached by
/// supplying a [`Transport`] for their scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTransport {
    file: FilesystemTransport,
}

impl DefaultTransport {
    /// Creates a new `DefaultTransport`. Same as `default()`.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for DefaultTransport {
    async fn fetch(&self, url: Url) -> Result<TransportStream, TransportError> {
        match url.scheme() {
            "file" => self.file.fetch(url).await,
            _ => Err(TransportError::new(
                TransportErrorKind::UnsupportedUrlScheme,
                url,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DefaultTransport, FilesystemTransport, IntoVec, Transport, TransportErrorKind};
    use url::Url;

    #[tokio::test]
    async fn reads_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.txt");
        std::fs::write(&path, b"contents").unwrap();
        let url = Url::from_file_path(&path).unwrap();

        let data = FilesystemTransport
            .fetch(url)
            .await
            .unwrap()
            .into_vec()
            .await
            .unwrap();
        assert_eq!(data, b"contents");
    }

    #[tokio::test]
    async fn missing_file_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let url = Url::from_file_path(dir.path().join("missing.json")).unwrap();
        let err = FilesystemTransport.fetch(url).await.err().unwrap();
        assert_eq!(err.kind(), TransportErrorKind::FileNotFound);
    }

    #[tokio::test]
    async fn default_transport_rejects_http() {
        let url = Url::parse("https://example.com/root.json").unwrap();
        let err = DefaultTransport::new().fetch(url).await.err().unwrap();
        assert_eq!(err.kind(), TransportErrorKind::UnsupportedUrlScheme);
    }
}

// Copyright 2019 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contains the error type for this library.

#![allow(clippy::default_trait_access)]

use crate::schema::{self, RoleId, RoleType};
use crate::transport::TransportErrorKind;
use crate::TransportError;
use chrono::{DateTime, Utc};
use snafu::{Backtrace, Snafu};
use url::Url;

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for this library.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
#[allow(missing_docs)]
pub enum Error {
    /// An update was requested after a later stage of the chain was already trusted.
    #[snafu(display("Cannot update {} after {} is trusted", role, trusted))]
    OutOfOrder {
        role: RoleId,
        trusted: RoleType,
        backtrace: Backtrace,
    },

    /// An update was requested before the document it depends on was trusted.
    #[snafu(display("Cannot update {} before {} is trusted", role, needs))]
    MissingTrusted {
        role: RoleId,
        needs: RoleType,
        backtrace: Backtrace,
    },

    /// A delegated role was requested before its delegator was trusted.
    #[snafu(display("Cannot load {}: delegator {} is not trusted", role, delegator))]
    DelegatorMissing {
        role: String,
        delegator: String,
        backtrace: Backtrace,
    },

    /// Root delegates only the top-level targets role.
    #[snafu(display("Cannot load {} as delegated by root: root only delegates targets", role))]
    NotDelegatedByRoot { role: String, backtrace: Backtrace },

    /// A targets role that should have been loaded is not trusted.
    #[snafu(display("Targets role {} is not trusted", role))]
    RoleNotTrusted { role: String, backtrace: Backtrace },

    /// The updater has already refreshed its metadata.
    #[snafu(display("Metadata has already been refreshed"))]
    AlreadyRefreshed { backtrace: Backtrace },

    /// A document could not be parsed or failed a structural check.
    #[snafu(display("Failed to parse {} metadata: {}", role, source))]
    ParseMetadata {
        role: RoleId,
        source: schema::Error,
    },

    /// The trusted root document supplied at construction could not be parsed.
    #[snafu(display("Failed to parse trusted root metadata: {}", source))]
    ParseTrustedMetadata { source: schema::Error },

    /// A document that must describe another file does not.
    #[snafu(display("{} metadata does not describe {}", role, file))]
    MetaMissing {
        file: String,
        role: RoleType,
        backtrace: Backtrace,
    },

    /// A document was not signed by a threshold of the keys authorized for it.
    #[snafu(display("Failed to verify {} metadata: {}", role, source))]
    VerifyMetadata {
        role: RoleId,
        source: schema::Error,
    },

    /// The trusted root document supplied at construction is not signed by itself.
    #[snafu(display("Failed to verify trusted root metadata: {}", source))]
    VerifyTrustedMetadata { source: schema::Error },

    /// A document's version is not the one required.
    #[snafu(display(
        "Expected version {} of {} metadata, found version {}",
        expected,
        role,
        fetched
    ))]
    VersionMismatch {
        role: RoleId,
        fetched: u64,
        expected: u64,
        backtrace: Backtrace,
    },

    /// A document's version is older than the one already trusted.
    #[snafu(display(
        "Found version {} of {} metadata when we had previously fetched version {}",
        new_version,
        role,
        current_version
    ))]
    OlderMetadata {
        role: RoleId,
        current_version: u64,
        new_version: u64,
        backtrace: Backtrace,
    },

    /// A newer snapshot dropped a file that the trusted snapshot described.
    #[snafu(display("New snapshot no longer describes {}", file))]
    MetaRemoved { file: String, backtrace: Backtrace },

    /// A timestamp had the same version as the trusted one. Nothing was changed.
    #[snafu(display("{} metadata version {} is already trusted", role, version))]
    EqualVersion {
        role: RoleId,
        version: u64,
        backtrace: Backtrace,
    },

    /// A document is expired at the reference time.
    #[snafu(display("{} metadata is expired (expired at {})", role, expires))]
    ExpiredMetadata {
        role: RoleId,
        expires: DateTime<Utc>,
        backtrace: Backtrace,
    },

    /// A document's bytes do not match the length or digests recorded for it.
    #[snafu(display("Integrity check of {} metadata failed: {}", role, source))]
    VerifyIntegrity {
        role: RoleId,
        source: schema::Error,
    },

    /// A target's bytes do not match the length or digests recorded for it.
    #[snafu(display("Integrity check of target '{}' failed: {}", target, source))]
    VerifyTarget {
        target: String,
        source: schema::Error,
    },

    /// The transport failed to fetch a file.
    #[snafu(display("Failed to fetch {}: {}", url, source))]
    Transport {
        url: Url,
        source: TransportError,
        backtrace: Backtrace,
    },

    /// A URL could not be formed for a file.
    #[snafu(display("Failed to join '{}' to URL '{}': {}", path, url, source))]
    JoinUrl {
        path: String,
        url: Url,
        source: url::ParseError,
        backtrace: Backtrace,
    },

    /// Base URLs must end in a slash so that file names are joined beneath them.
    #[snafu(display("Base URL {} is missing a trailing slash", url))]
    BaseUrlMissingTrailingSlash { url: Url, backtrace: Backtrace },

    /// No trusted targets document lists the requested target.
    #[snafu(display("Target '{}' not found", target))]
    TargetNotFound { target: String, backtrace: Backtrace },

    /// A fetched file was larger than allowed.
    #[snafu(display("Maximum size {} (specified by {}) exceeded", max_size, specifier))]
    MaxSizeExceeded {
        max_size: u64,
        specifier: &'static str,
        backtrace: Backtrace,
    },

    /// Signing a message failed.
    #[snafu(display("Failed to sign message"))]
    Sign {
        source: aws_lc_rs::error::Unspecified,
        backtrace: Backtrace,
    },

    /// A private key was recognized but could not be loaded.
    #[snafu(display("Private key rejected: {}", source))]
    KeyRejected {
        source: aws_lc_rs::error::KeyRejected,
        backtrace: Backtrace,
    },

    /// A private key was not in a recognized format.
    #[snafu(display("Unrecognized private key format"))]
    KeyUnrecognized { backtrace: Backtrace },

    /// A role could not be prepared for signing.
    #[snafu(display("Failed to sign {} metadata: {}", role, source))]
    SignRole {
        role: RoleType,
        source: schema::Error,
    },
}

/// The category of an [`Error`].
///
/// Callers branch on the category rather than on individual variants. Every category except
/// [`ErrorKind::Sequence`] and [`ErrorKind::Other`] is caused by the content of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The operation was called out of order.
    Sequence,
    /// The document is malformed, of the wrong type, or missing a required entry.
    Shape,
    /// The document is not signed by a threshold of authorized keys.
    Signature,
    /// The document's version is not acceptable.
    BadVersion,
    /// The timestamp is identical in version to the trusted one.
    EqualVersion,
    /// The document is expired.
    Expired,
    /// The document's bytes do not match what its parent recorded.
    Integrity,
    /// Transport, URL and signing failures.
    Other,
}

impl Error {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::OutOfOrder { .. }
            | Error::MissingTrusted { .. }
            | Error::DelegatorMissing { .. }
            | Error::NotDelegatedByRoot { .. }
            | Error::RoleNotTrusted { .. }
            | Error::AlreadyRefreshed { .. } => ErrorKind::Sequence,
            Error::ParseMetadata { .. }
            | Error::ParseTrustedMetadata { .. }
            | Error::MetaMissing { .. } => ErrorKind::Shape,
            Error::VerifyMetadata { .. } | Error::VerifyTrustedMetadata { .. } => {
                ErrorKind::Signature
            }
            Error::VersionMismatch { .. }
            | Error::OlderMetadata { .. }
            | Error::MetaRemoved { .. } => ErrorKind::BadVersion,
            Error::EqualVersion { .. } => ErrorKind::EqualVersion,
            Error::ExpiredMetadata { .. } => ErrorKind::Expired,
            Error::VerifyIntegrity { .. } | Error::VerifyTarget { .. } => ErrorKind::Integrity,
            Error::Transport { .. }
            | Error::JoinUrl { .. }
            | Error::BaseUrlMissingTrailingSlash { .. }
            | Error::TargetNotFound { .. }
            | Error::MaxSizeExceeded { .. }
            | Error::Sign { .. }
            | Error::KeyRejected { .. }
            | Error::KeyUnrecognized { .. }
            | Error::SignRole { .. } => ErrorKind::Other,
        }
    }

    /// Whether the error was caused by the content of a document, as opposed to the order of
    /// calls or the environment. A locally cached document that fails this way can be discarded.
    pub fn is_repository_error(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Sequence | ErrorKind::Other)
    }

    /// Whether the transport reported that the file does not exist.
    pub(crate) fn is_file_not_found(&self) -> bool {
        matches!(
            self,
            Error::Transport { source, .. }
                if matches!(source.kind(), TransportErrorKind::FileNotFound)
        )
    }
}

// Copyright 2019 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! trusted-metadata is a client library for [TUF repositories].
//!
//! At its heart is [`TrustedMetadata`], which holds the chain of documents a client has verified
//! and decides whether each newly fetched document may join it: signatures against the keys the
//! chain already trusts, monotonic versions, expiry, and the lengths and digests recorded by the
//! parent document. [`Updater`] drives it, fetching each document through a [`Transport`] in the
//! order the TUF client workflow requires.
//!
//! [TUF repositories]: https://theupdateframework.github.io/
//!
//! # Testing
//!
//! Unit tests are run in the usual manner: `cargo test`.

#![forbid(missing_debug_implementations, missing_copy_implementations)]
#![deny(rust_2018_idioms)]
// missing_docs is on its own line to make it easy to comment out when making changes.
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc
)]

pub mod error;
mod fetch;
mod io;
pub mod schema;
pub mod sign;
pub mod transport;
mod trusted;
mod updater;

pub use crate::error::{Error, ErrorKind, Result};
pub use crate::transport::{
    DefaultTransport, FilesystemTransport, IntoVec, Transport, TransportError, TransportErrorKind,
    TransportStream,
};
pub use crate::trusted::TrustedMetadata;
pub use crate::updater::{Updater, UpdaterConfig};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left as-is when a role name becomes part of a file name.
const FILENAME_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encodes a role name so it can be used as a single path segment.
pub(crate) fn encode_filename<S: AsRef<str>>(name: S) -> String {
    utf8_percent_encode(name.as_ref(), FILENAME_SAFE).to_string()
}

#[cfg(test)]
mod tests {
    use super::encode_filename;

    #[test]
    fn role_names_stay_in_one_segment() {
        assert_eq!(encode_filename("targets"), "targets");
        assert_eq!(encode_filename("a-b_c.d~e"), "a-b_c.d~e");
        assert_eq!(encode_filename("../escape"), "..%2Fescape");
        assert_eq!(encode_filename("with space"), "with%20space");
    }
}

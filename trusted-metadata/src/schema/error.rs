// Copyright 2019 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contains the error type for the schema module.

#![allow(clippy::default_trait_access)]

use crate::schema::RoleType;
use snafu::{Backtrace, Snafu};

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for the schema module.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
#[allow(missing_docs)]
pub enum Error {
    /// A duplicate key ID was present in a key map.
    #[snafu(display("Duplicate key ID: {}", keyid))]
    DuplicateKeyId { keyid: String },

    /// The same key ID signed a document more than once.
    #[snafu(display("Multiple signatures found for key ID {}", keyid))]
    DuplicateSignature { keyid: String },

    /// A hash digest did not match the expected value.
    #[snafu(display(
        "{} digest mismatch: calculated {}, expected {}",
        algorithm,
        calculated,
        expected,
    ))]
    HashMismatch {
        algorithm: String,
        calculated: String,
        expected: String,
        backtrace: Backtrace,
    },

    /// Failed to decode a hexadecimal-encoded string.
    #[snafu(display("Invalid hex string: {}", source))]
    HexDecode {
        source: hex::FromHexError,
        backtrace: Backtrace,
    },

    /// A key ID in a key map did not match the key it maps to.
    #[snafu(display("Key ID {} does not match calculated ID {}", keyid, calculated))]
    InvalidKeyId { keyid: String, calculated: String },

    /// A document could not be deserialized.
    #[snafu(display("Failed to deserialize {}: {}", what, source))]
    JsonDeserialization {
        what: String,
        source: serde_json::Error,
        backtrace: Backtrace,
    },

    /// A document could not be serialized to canonical JSON.
    #[snafu(display("Failed to serialize {} to JSON: {}", what, source))]
    JsonSerialization {
        what: String,
        source: serde_json::Error,
        backtrace: Backtrace,
    },

    /// A payload was not the length recorded for it.
    #[snafu(display("Length mismatch: expected {} bytes, got {}", expected, actual))]
    LengthMismatch { expected: u64, actual: u64 },

    /// The delegating targets document declares no delegations at all.
    #[snafu(display("Delegator has no delegations"))]
    NoDelegations,

    /// Failed to decode a PEM-encoded key.
    #[snafu(display("Invalid PEM string: {}", source))]
    PemDecode {
        source: pem::PemError,
        backtrace: Backtrace,
    },

    /// A PEM block was not a public key.
    #[snafu(display("Unrecognized PEM tag '{}'", tag))]
    PemTag { tag: String },

    /// The delegator does not authorize any keys for the requested role.
    #[snafu(display("No delegation found for role '{}'", name))]
    RoleNotFound { name: String },

    /// Fewer authorized keys than the threshold produced valid signatures.
    #[snafu(display(
        "Signature threshold of {} not met for role {} ({} valid signatures)",
        threshold,
        role,
        valid,
    ))]
    SignatureThreshold {
        role: String,
        threshold: u64,
        valid: u64,
    },

    /// A PEM public key did not contain a valid SubjectPublicKeyInfo structure.
    #[snafu(display("Invalid SubjectPublicKeyInfo: {}", source))]
    SpkiDecode { source: pkcs8::der::Error },

    /// A digest algorithm listed in `hashes` cannot be computed by this client.
    #[snafu(display("Unsupported hash algorithm '{}'", algorithm))]
    UnsupportedHash { algorithm: String },

    /// The document declares a different `_type` than the one being loaded.
    #[snafu(display("Expected metadata of type {}, got '{}'", expected, found))]
    WrongType { expected: RoleType, found: String },
}

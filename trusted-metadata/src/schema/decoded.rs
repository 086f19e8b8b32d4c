// Copyright 2019 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provides a wrapper type for byte strings that arrive encoded in metadata (hex key IDs and
//! signatures, PEM public keys) while retaining the original encoded form.
//!
//! The original string is what gets serialized back out. Signatures are computed over the
//! canonical form of a role, so re-encoding the bytes any other way would break verification.

use crate::schema::error::{self, Error, Result};
use pkcs8::der::Decode as _;
use pkcs8::spki::SubjectPublicKeyInfoRef;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use snafu::ResultExt;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Deref;
use std::str::FromStr;

/// A wrapper around decoded bytes that remembers the string they were decoded from.
pub struct Decoded<T> {
    bytes: Vec<u8>,
    original: String,
    spooky: PhantomData<T>,
}

impl<T> Decoded<T> {
    /// Consumes this object and returns the decoded bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    /// The string this value was decoded from.
    pub fn original(&self) -> &str {
        &self.original
    }
}

/// A method for decoding a string into bytes.
pub trait Decode {
    /// Decodes `s` into bytes.
    fn decode(s: &str) -> Result<Vec<u8>>;
}

/// A method for encoding bytes into a string.
pub trait Encode {
    /// Encodes `b` into a string.
    fn encode(b: &[u8]) -> String;
}

/// Hexadecimal encoding, used for key IDs, signatures, digests and Ed25519 public keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hex;

impl Decode for Hex {
    fn decode(s: &str) -> Result<Vec<u8>> {
        hex::decode(s).context(error::HexDecodeSnafu)
    }
}

impl Encode for Hex {
    fn encode(b: &[u8]) -> String {
        hex::encode(b)
    }
}

/// PEM-encoded public keys. The decoded bytes are the raw key material: the encoded point for
/// elliptic curve keys and the PKCS #1 `RSAPublicKey` for RSA keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pem;

impl Decode for Pem {
    fn decode(s: &str) -> Result<Vec<u8>> {
        let pem = pem::parse(s).context(error::PemDecodeSnafu)?;
        match pem.tag() {
            "PUBLIC KEY" => {
                let spki = SubjectPublicKeyInfoRef::from_der(pem.contents())
                    .context(error::SpkiDecodeSnafu)?;
                Ok(spki.subject_public_key.raw_bytes().to_vec())
            }
            "RSA PUBLIC KEY" => Ok(pem.contents().to_vec()),
            tag => error::PemTagSnafu { tag }.fail(),
        }
    }
}

/// DER prefix of a SubjectPublicKeyInfo holding an uncompressed P-256 point.
const P256_SPKI_PREFIX: [u8; 26] = [
    0x30, 0x59, 0x30, 0x13, 0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01, 0x06, 0x08, 0x2a,
    0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07, 0x03, 0x42, 0x00,
];

impl Decoded<Pem> {
    /// Encodes an uncompressed P-256 point as a `PUBLIC KEY` block.
    pub(crate) fn from_p256_point(point: &[u8]) -> Self {
        let mut der = P256_SPKI_PREFIX.to_vec();
        der.extend_from_slice(point);
        Self {
            original: pem::encode(&pem::Pem::new("PUBLIC KEY", der)),
            bytes: point.to_vec(),
            spooky: PhantomData,
        }
    }

    /// Encodes a DER `RSAPublicKey` as an `RSA PUBLIC KEY` block.
    pub(crate) fn from_rsa_public_key(der: &[u8]) -> Self {
        Self {
            original: pem::encode(&pem::Pem::new("RSA PUBLIC KEY", der.to_vec())),
            bytes: der.to_vec(),
            spooky: PhantomData,
        }
    }
}

impl<T: Encode> From<Vec<u8>> for Decoded<T> {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            original: T::encode(&bytes),
            bytes,
            spooky: PhantomData,
        }
    }
}

impl<T: Decode> FromStr for Decoded<T> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self {
            bytes: T::decode(s)?,
            original: s.to_owned(),
            spooky: PhantomData,
        })
    }
}

impl<T> Deref for Decoded<T> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl<T> AsRef<[u8]> for Decoded<T> {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl<T> fmt::Debug for Decoded<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.original, f)
    }
}

impl<T> Clone for Decoded<T> {
    fn clone(&self) -> Self {
        Self {
            bytes: self.bytes.clone(),
            original: self.original.clone(),
            spooky: PhantomData,
        }
    }
}

impl<T> PartialEq for Decoded<T> {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl<T> Eq for Decoded<T> {}

impl<T> PartialOrd for Decoded<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Decoded<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bytes.cmp(&other.bytes)
    }
}

impl<T> Hash for Decoded<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl<'de, T: Decode> Deserialize<'de> for Decoded<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let original = String::deserialize(deserializer)?;
        original.parse().map_err(D::Error::custom)
    }
}

impl<T> Serialize for Decoded<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.original)
    }
}

// Copyright 2019 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::schema::decoded::{Decoded, Hex};
use crate::schema::error::{self, Result};
use crate::schema::key::Key;
use crate::schema::{Delegations, Hashes, KeyHolder, Role, RoleType, Root, Signed};
use aws_lc_rs::digest::{digest, Algorithm, SHA256, SHA512};
use log::trace;
use snafu::{ensure, OptionExt};
use std::collections::{HashMap, HashSet};
use std::num::NonZeroU64;

impl KeyHolder<'_> {
    /// Verifies that `role` is signed by a threshold of the keys this delegator authorizes for the
    /// role called `name`.
    pub fn verify_role<T: Role>(&self, role: &Signed<T>, name: &str) -> Result<()> {
        match self {
            KeyHolder::Root(root) => root.verify_role_named(role, name),
            KeyHolder::Delegations(delegations) => delegations.verify_role(role, name),
        }
    }
}

impl Root {
    /// Verifies that `role` is signed by a threshold of the keys listed for its role type.
    pub fn verify_role<T: Role>(&self, role: &Signed<T>) -> Result<()> {
        self.verify_role_named(role, &T::TYPE.to_string())
    }

    fn verify_role_named<T: Role>(&self, role: &Signed<T>, name: &str) -> Result<()> {
        let role_keys = name
            .parse::<RoleType>()
            .ok()
            .and_then(|role_type| self.roles.get(&role_type))
            .context(error::RoleNotFoundSnafu { name })?;
        verify_threshold(
            name,
            &self.keys,
            &role_keys.keyids,
            role_keys.threshold,
            role,
        )
    }
}

impl Delegations {
    /// Verifies that `role` is signed by a threshold of the keys delegated to the role `name`.
    pub fn verify_role<T: Role>(&self, role: &Signed<T>, name: &str) -> Result<()> {
        let delegated = self
            .roles
            .iter()
            .find(|delegated| delegated.name == name)
            .context(error::RoleNotFoundSnafu { name })?;
        verify_threshold(
            name,
            &self.keys,
            &delegated.keyids,
            delegated.threshold,
            role,
        )
    }
}

/// Counts the distinct authorized keys that produced a valid signature over the canonical form of
/// `role`. Signatures by keys the delegator does not authorize are ignored.
fn verify_threshold<T: Role>(
    name: &str,
    keys: &HashMap<Decoded<Hex>, Key>,
    keyids: &[Decoded<Hex>],
    threshold: NonZeroU64,
    role: &Signed<T>,
) -> Result<()> {
    let data = role.signed.canonical_form()?;

    let mut valid_keyids = HashSet::new();
    for signature in &role.signatures {
        if !keyids.contains(&signature.keyid) {
            trace!(
                "Ignoring signature by key {} not authorized for role {}",
                signature.keyid.original(),
                name
            );
            continue;
        }
        match keys.get(&signature.keyid) {
            Some(key) if key.verify(&data, &signature.sig) => {
                trace!("Verified {} with key {}", name, signature.keyid.original());
                valid_keyids.insert(&signature.keyid);
            }
            Some(_) => trace!(
                "Invalid signature by key {} for role {}",
                signature.keyid.original(),
                name
            ),
            None => trace!(
                "Key {} authorized for role {} is not listed",
                signature.keyid.original(),
                name
            ),
        }
    }

    let valid = valid_keyids.len() as u64;
    ensure!(
        valid >= threshold.get(),
        error::SignatureThresholdSnafu {
            role: name,
            threshold: threshold.get(),
            valid,
        }
    );
    Ok(())
}

/// Checks `data` against a recorded length and set of digests. Either may be absent, in which case
/// it is not checked. A digest algorithm this client cannot compute is an error rather than being
/// skipped.
pub(super) fn verify_length_hashes(
    data: &[u8],
    length: Option<u64>,
    hashes: Option<&Hashes>,
) -> Result<()> {
    if let Some(expected) = length {
        let actual = data.len() as u64;
        ensure!(
            actual == expected,
            error::LengthMismatchSnafu { expected, actual }
        );
    }

    if let Some(hashes) = hashes {
        if let Some(algorithm) = hashes._extra.keys().next() {
            return error::UnsupportedHashSnafu { algorithm }.fail();
        }
        verify_digest(&SHA256, "sha256", &hashes.sha256, data)?;
        if let Some(sha512) = &hashes.sha512 {
            verify_digest(&SHA512, "sha512", sha512, data)?;
        }
    }
    Ok(())
}

fn verify_digest(
    algorithm: &'static Algorithm,
    name: &str,
    expected: &Decoded<Hex>,
    data: &[u8],
) -> Result<()> {
    let calculated = digest(algorithm, data);
    ensure!(
        calculated.as_ref() == expected.as_ref(),
        error::HashMismatchSnafu {
            algorithm: name,
            calculated: hex::encode(calculated),
            expected: hex::encode(expected),
        }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::verify_length_hashes;
    use crate::schema::decoded::Decoded;
    use crate::schema::{Error, Hashes};
    use hex_literal::hex;
    use std::collections::HashMap;

    fn hello_hashes() -> Hashes {
        Hashes {
            sha256: Decoded::from(
                hex!("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824").to_vec(),
            ),
            sha512: None,
            _extra: HashMap::new(),
        }
    }

    #[test]
    fn length_and_hash_match() {
        verify_length_hashes(b"hello", Some(5), Some(&hello_hashes())).unwrap();
    }

    #[test]
    fn nothing_recorded_accepts_anything() {
        verify_length_hashes(b"anything at all", None, None).unwrap();
    }

    #[test]
    fn length_mismatch() {
        let err = verify_length_hashes(b"hello", Some(4), None).unwrap_err();
        assert!(matches!(
            err,
            Error::LengthMismatch {
                expected: 4,
                actual: 5
            }
        ));
    }

    #[test]
    fn hash_mismatch() {
        let err = verify_length_hashes(b"hellO", None, Some(&hello_hashes())).unwrap_err();
        assert!(matches!(err, Error::HashMismatch { .. }));
    }

    #[test]
    fn unknown_algorithm_fails_closed() {
        let mut hashes = hello_hashes();
        hashes
            ._extra
            .insert("md5".to_owned(), serde_json::Value::from("00"));
        let err = verify_length_hashes(b"hello", Some(5), Some(&hashes)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedHash { .. }));
    }
}

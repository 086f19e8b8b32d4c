// Copyright 2019 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Producing signatures over metadata.

use crate::error::{self, Result};
use crate::schema::decoded::{Decoded, Pem};
use crate::schema::key::{EcdsaKey, EcdsaScheme, Ed25519Key, Ed25519Scheme, Key, RsaKey, RsaScheme};
use crate::schema::{Role, Signature, Signed};
use aws_lc_rs::rand::SecureRandom;
use aws_lc_rs::signature::{
    EcdsaKeyPair, Ed25519KeyPair, KeyPair, RsaKeyPair, ECDSA_P256_SHA256_ASN1_SIGNING,
    RSA_PSS_SHA256,
};
use snafu::ResultExt;
use std::collections::HashMap;

/// This trait must be implemented for each type of key with which you will
/// sign things.
pub trait Sign: Sync + Send {
    /// Returns the decoded key along with its scheme and other metadata
    fn tuf_key(&self) -> Key;

    /// Signs the supplied message
    fn sign(&self, msg: &[u8], rng: &dyn SecureRandom) -> Result<Vec<u8>>;
}

impl Sign for Ed25519KeyPair {
    fn tuf_key(&self) -> Key {
        Key::Ed25519 {
            keyval: Ed25519Key {
                public: self.public_key().as_ref().to_vec().into(),
                _extra: HashMap::new(),
            },
            scheme: Ed25519Scheme::Ed25519,
            _extra: HashMap::new(),
        }
    }

    fn sign(&self, msg: &[u8], _rng: &dyn SecureRandom) -> Result<Vec<u8>> {
        Ok(Ed25519KeyPair::sign(self, msg).as_ref().to_vec())
    }
}

impl Sign for EcdsaKeyPair {
    fn tuf_key(&self) -> Key {
        Key::Ecdsa {
            keyval: EcdsaKey {
                public: Decoded::<Pem>::from_p256_point(self.public_key().as_ref()),
                _extra: HashMap::new(),
            },
            scheme: EcdsaScheme::EcdsaSha2Nistp256,
            _extra: HashMap::new(),
        }
    }

    fn sign(&self, msg: &[u8], rng: &dyn SecureRandom) -> Result<Vec<u8>> {
        let signature = EcdsaKeyPair::sign(self, rng, msg).context(error::SignSnafu)?;
        Ok(signature.as_ref().to_vec())
    }
}

impl Sign for RsaKeyPair {
    fn tuf_key(&self) -> Key {
        Key::Rsa {
            keyval: RsaKey {
                public: Decoded::<Pem>::from_rsa_public_key(self.public_key().as_ref()),
                _extra: HashMap::new(),
            },
            scheme: RsaScheme::RsassaPssSha256,
            _extra: HashMap::new(),
        }
    }

    fn sign(&self, msg: &[u8], rng: &dyn SecureRandom) -> Result<Vec<u8>> {
        let mut signature = vec![0; self.public_modulus_len()];
        RsaKeyPair::sign(self, &RSA_PSS_SHA256, rng, msg, &mut signature)
            .context(error::SignSnafu)?;
        Ok(signature)
    }
}

/// Parses a PEM-encoded private key and, if it is recognized, returns an object that implements
/// [`Sign`]. PKCS #8 Ed25519, P-256 and RSA keys are recognized, as are PKCS #1 RSA keys.
pub fn parse_keypair(key: &[u8]) -> Result<Box<dyn Sign>> {
    let pem = match pem::parse(key) {
        Ok(pem) => pem,
        Err(_) => return error::KeyUnrecognizedSnafu.fail(),
    };
    match pem.tag() {
        "PRIVATE KEY" => {
            if let Ok(pair) = Ed25519KeyPair::from_pkcs8(pem.contents()) {
                Ok(Box::new(pair))
            } else if let Ok(pair) =
                EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, pem.contents())
            {
                Ok(Box::new(pair))
            } else if let Ok(pair) = RsaKeyPair::from_pkcs8(pem.contents()) {
                Ok(Box::new(pair))
            } else {
                error::KeyUnrecognizedSnafu.fail()
            }
        }
        "RSA PRIVATE KEY" => Ok(Box::new(
            RsaKeyPair::from_der(pem.contents()).context(error::KeyRejectedSnafu)?,
        )),
        _ => error::KeyUnrecognizedSnafu.fail(),
    }
}

impl<T: Role> Signed<T> {
    /// Signs the canonical form of the role with `signer`, appending the signature. An existing
    /// signature by the same key is replaced.
    pub fn sign(&mut self, signer: &dyn Sign, rng: &dyn SecureRandom) -> Result<&Signature> {
        let role = T::TYPE;
        let keyid = signer
            .tuf_key()
            .key_id()
            .context(error::SignRoleSnafu { role })?;
        let data = self
            .signed
            .canonical_form()
            .context(error::SignRoleSnafu { role })?;
        let sig = signer.sign(&data, rng)?;

        self.signatures.retain(|signature| signature.keyid != keyid);
        let signature = Signature {
            keyid,
            sig: sig.into(),
        };
        self.signatures.push(signature);
        Ok(&self.signatures[self.signatures.len() - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_keypair, Sign};
    use aws_lc_rs::rand::SystemRandom;
    use aws_lc_rs::signature::{
        EcdsaKeyPair, Ed25519KeyPair, UnparsedPublicKey, ECDSA_P256_SHA256_ASN1,
        ECDSA_P256_SHA256_ASN1_SIGNING,
    };

    #[test]
    fn ed25519_pkcs8_is_recognized() {
        let rng = SystemRandom::new();
        let document = Ed25519KeyPair::generate_pkcs8(&rng).unwrap();
        let pem = pem::encode(&pem::Pem::new("PRIVATE KEY", document.as_ref().to_vec()));
        let signer = parse_keypair(pem.as_bytes()).unwrap();
        assert!(matches!(
            signer.tuf_key(),
            crate::schema::key::Key::Ed25519 { .. }
        ));
    }

    #[test]
    fn ecdsa_signature_verifies_with_published_key() {
        let rng = SystemRandom::new();
        let document = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng).unwrap();
        let pair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, document.as_ref()).unwrap();
        let sig = Sign::sign(&pair, b"message", &rng).unwrap();

        let key = pair.tuf_key();
        let crate::schema::key::Key::Ecdsa { keyval, .. } = &key else {
            panic!("not an ECDSA key: {key:?}");
        };
        UnparsedPublicKey::new(&ECDSA_P256_SHA256_ASN1, keyval.public.as_ref())
            .verify(b"message", &sig)
            .unwrap();
    }

    #[test]
    fn garbage_is_unrecognized() {
        assert!(parse_keypair(b"not a key").is_err());
    }
}

#![allow(clippy::used_underscore_binding)]

//! Provides the document types of a TUF repository: the four top-level roles, delegated targets,
//! and the envelope that carries their signatures.

mod de;
pub mod decoded;
mod error;
pub mod key;
mod verify;

use crate::schema::decoded::{Decoded, Hex};
pub use crate::schema::error::{Error, Result};
use crate::schema::key::Key;
use aws_lc_rs::digest::{digest, SHA256};
use chrono::{DateTime, Utc};
use globset::GlobBuilder;
use olpc_cjson::CanonicalFormatter;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_plain::{forward_display_to_serde, forward_from_str_to_serde};
use snafu::{ensure, OptionExt, ResultExt};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::num::NonZeroU64;

/// The name of the top-level targets role, and the key under which its document is stored.
pub(crate) const TARGETS: &str = "targets";
/// The delegator of the top-level targets role.
pub(crate) const ROOT: &str = "root";

/// The type of a top-level metadata role.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RoleType {
    /// Delegates trust to the keys of every top-level role, including itself.
    Root,
    /// Records the current version of every targets document in the repository.
    Snapshot,
    /// Lists trusted target files and delegates parts of the target namespace.
    Targets,
    /// Frequently re-signed pointer to the current snapshot.
    Timestamp,
}

forward_display_to_serde!(RoleType);
forward_from_str_to_serde!(RoleType);

/// Identifies a role: either one of the top-level roles or a delegated targets role by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoleId {
    /// A top-level role.
    StandardRole(RoleType),
    /// A delegated targets role.
    DelegatedRole(String),
}

impl RoleId {
    /// The identity of the targets document called `name`. The name "targets" is always the
    /// top-level targets role.
    pub fn targets(name: &str) -> Self {
        if name == TARGETS {
            RoleId::StandardRole(RoleType::Targets)
        } else {
            RoleId::DelegatedRole(name.to_owned())
        }
    }
}

impl From<RoleType> for RoleId {
    fn from(role_type: RoleType) -> Self {
        RoleId::StandardRole(role_type)
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleId::StandardRole(role_type) => role_type.fmt(f),
            RoleId::DelegatedRole(name) => f.write_str(name),
        }
    }
}

/// Common trait implemented by all roles.
pub trait Role: Serialize {
    /// The type of role this object represents.
    const TYPE: RoleType;

    /// Determines when metadata should be considered expired and no longer trusted by clients.
    fn expires(&self) -> DateTime<Utc>;

    /// An integer that is greater than 0. Clients MUST NOT replace a metadata file with a version
    /// number less than the one currently trusted.
    fn version(&self) -> NonZeroU64;

    /// Whether this document is expired at `reference_time`. A document is still valid at the
    /// exact instant it expires.
    fn is_expired(&self, reference_time: DateTime<Utc>) -> bool {
        reference_time > self.expires()
    }

    /// A deterministic JSON serialization used when calculating the digest of a metadata object.
    /// [More info on canonical JSON](http://wiki.laptop.org/go/Canonical_JSON)
    fn canonical_form(&self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut data, CanonicalFormatter::new());
        self.serialize(&mut ser)
            .context(error::JsonSerializationSnafu { what: "role" })?;
        Ok(data)
    }
}

/// A signed metadata object.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Signed<T> {
    /// The role that is signed.
    pub signed: T,
    /// A list of signatures and their key IDs.
    pub signatures: Vec<Signature>,
}

/// A signature and the key ID that made it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Signature {
    /// The key ID (listed in root.json) that made this signature.
    pub keyid: Decoded<Hex>,
    /// A hex-encoded signature of the canonical JSON form of a role.
    pub sig: Decoded<Hex>,
}

impl<T: Role + DeserializeOwned> Signed<T> {
    /// Parses a signed document of type `T`.
    ///
    /// The declared `_type` is read before anything else so that a document of the wrong kind is
    /// reported as such rather than as whatever field happens to be missing. Envelopes carrying
    /// two signatures by the same key ID are rejected.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        #[derive(Deserialize)]
        struct Envelope {
            signed: TypeTag,
        }

        #[derive(Deserialize)]
        struct TypeTag {
            #[serde(rename = "_type")]
            kind: String,
        }

        let what = format!("{} metadata", T::TYPE);
        let envelope: Envelope =
            serde_json::from_slice(data).context(error::JsonDeserializationSnafu {
                what: what.as_str(),
            })?;
        ensure!(
            envelope.signed.kind == T::TYPE.to_string(),
            error::WrongTypeSnafu {
                expected: T::TYPE,
                found: envelope.signed.kind,
            }
        );

        let signed: Self = serde_json::from_slice(data)
            .context(error::JsonDeserializationSnafu { what: what.as_str() })?;

        let mut seen = HashSet::new();
        for signature in &signed.signatures {
            ensure!(
                seen.insert(&signature.keyid),
                error::DuplicateSignatureSnafu {
                    keyid: signature.keyid.original(),
                }
            );
        }
        Ok(signed)
    }
}

/// The metadata that holds the keys authorized to sign a role: root for the top-level roles, or
/// the delegations of a trusted targets document for a delegated role.
#[derive(Debug, Clone, Copy)]
pub enum KeyHolder<'a> {
    /// Delegations verify delegated targets.
    Delegations(&'a Delegations),
    /// Root verifies the top-level targets, snapshot, timestamp, and root.
    Root(&'a Root),
}

// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=

/// TUF 4.3: The root.json file is signed by the root role's keys. It indicates which keys are
/// authorized for all top-level roles, including the root role itself.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "_type")]
#[serde(rename = "root")]
pub struct Root {
    /// The version of the TUF specification the document follows.
    pub spec_version: String,

    /// Whether the repository publishes version-prefixed metadata and hash-prefixed targets.
    pub consistent_snapshot: bool,

    /// An integer that is greater than 0.
    pub version: NonZeroU64,

    /// Determines when metadata should be considered expired and no longer trusted by clients.
    pub expires: DateTime<Utc>,

    /// Every key ID is checked against the key it names when the document is parsed.
    #[serde(deserialize_with = "de::deserialize_keys")]
    pub keys: HashMap<Decoded<Hex>, Key>,

    /// The keys associated with each top-level role and the threshold of signatures required.
    pub roles: HashMap<RoleType, RoleKeys>,

    /// Extra arguments found during deserialization.
    ///
    /// We must store these to correctly verify signatures for this object.
    ///
    /// If you're instantiating this struct, you should make this `HashMap::empty()`.
    #[serde(flatten)]
    #[serde(deserialize_with = "de::extra_skip_type")]
    pub _extra: HashMap<String, Value>,
}

/// The key IDs used for a role and the threshold of signatures required to validate it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RoleKeys {
    /// The key IDs used for the role.
    pub keyids: Vec<Decoded<Hex>>,

    /// The threshold of signatures required to validate the role.
    pub threshold: NonZeroU64,

    /// Extra arguments found during deserialization.
    #[serde(flatten)]
    pub _extra: HashMap<String, Value>,
}

impl Role for Root {
    const TYPE: RoleType = RoleType::Root;

    fn expires(&self) -> DateTime<Utc> {
        self.expires
    }

    fn version(&self) -> NonZeroU64 {
        self.version
    }
}

// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=

/// TUF 4.6: The timestamp file is signed by a timestamp key. It indicates the latest version of the
/// snapshot metadata and is frequently resigned to limit the amount of time a client can be kept
/// unaware of interference with obtaining updates.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "_type")]
#[serde(rename = "timestamp")]
pub struct Timestamp {
    /// The version of the TUF specification the document follows.
    pub spec_version: String,

    /// An integer that is greater than 0.
    pub version: NonZeroU64,

    /// Determines when metadata should be considered expired and no longer trusted by clients.
    pub expires: DateTime<Utc>,

    /// Describes `snapshot.json`, and nothing else.
    pub meta: HashMap<String, MetaFile>,

    /// Extra arguments found during deserialization.
    #[serde(flatten)]
    #[serde(deserialize_with = "de::extra_skip_type")]
    pub _extra: HashMap<String, Value>,
}

impl Timestamp {
    /// The description of the current snapshot.
    pub fn snapshot_meta(&self) -> Option<&MetaFile> {
        self.meta.get("snapshot.json")
    }
}

impl Role for Timestamp {
    const TYPE: RoleType = RoleType::Timestamp;

    fn expires(&self) -> DateTime<Utc> {
        self.expires
    }

    fn version(&self) -> NonZeroU64 {
        self.version
    }
}

// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=

/// TUF 4.4: The snapshot.json file is signed by the snapshot role. It lists the version numbers of
/// the top-level targets metadata and all delegated targets metadata.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "_type")]
#[serde(rename = "snapshot")]
pub struct Snapshot {
    /// The version of the TUF specification the document follows.
    pub spec_version: String,

    /// An integer that is greater than 0.
    pub version: NonZeroU64,

    /// Determines when metadata should be considered expired and no longer trusted by clients.
    pub expires: DateTime<Utc>,

    /// Keyed by file name, `ROLE.json`.
    pub meta: HashMap<String, MetaFile>,

    /// Extra arguments found during deserialization.
    #[serde(flatten)]
    #[serde(deserialize_with = "de::extra_skip_type")]
    pub _extra: HashMap<String, Value>,
}

impl Snapshot {
    /// The recorded description of the targets document for `role`.
    pub fn targets_meta(&self, role: &str) -> Option<&MetaFile> {
        self.meta.get(&meta_filename(role))
    }
}

impl Role for Snapshot {
    const TYPE: RoleType = RoleType::Snapshot;

    fn expires(&self) -> DateTime<Utc> {
        self.expires
    }

    fn version(&self) -> NonZeroU64 {
        self.version
    }
}

/// The key under which a role's document is described in snapshot and timestamp metadata.
pub fn meta_filename(role: &str) -> String {
    format!("{}.json", role)
}

/// Describes one metadata file: its version, and optionally its length and digests.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MetaFile {
    /// The integer length in bytes of the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,

    /// Digests of the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashes: Option<Hashes>,

    /// The version of the described document.
    pub version: NonZeroU64,

    /// Extra arguments found during deserialization.
    #[serde(flatten)]
    pub _extra: HashMap<String, Value>,
}

impl MetaFile {
    /// Checks `data` against whatever length and digests this entry records.
    pub fn verify_length_hashes(&self, data: &[u8]) -> Result<()> {
        verify::verify_length_hashes(data, self.length, self.hashes.as_ref())
    }
}

/// Digests of a file, hex encoded.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Hashes {
    /// The SHA 256 digest of a metadata file.
    pub sha256: Decoded<Hex>,

    /// The SHA 512 digest, when published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha512: Option<Decoded<Hex>>,

    /// Digests by any other algorithm. These cannot be checked, so their presence fails
    /// verification.
    #[serde(flatten)]
    pub _extra: HashMap<String, Value>,
}

// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=

/// TUF 4.5: The "signed" portion of targets.json. Both the top-level targets role and every
/// delegated role publish a document of this shape.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "_type")]
#[serde(rename = "targets")]
pub struct Targets {
    /// The version of the TUF specification the document follows.
    pub spec_version: String,

    /// An integer that is greater than 0.
    pub version: NonZeroU64,

    /// Determines when metadata should be considered expired and no longer trusted by clients.
    pub expires: DateTime<Utc>,

    /// Target files, keyed by their path relative to the targets base URL.
    pub targets: HashMap<String, Target>,

    /// Delegations describes subsets of the targets for which responsibility is delegated to
    /// another role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegations: Option<Delegations>,

    /// Extra arguments found during deserialization.
    #[serde(flatten)]
    #[serde(deserialize_with = "de::extra_skip_type")]
    pub _extra: HashMap<String, Value>,
}

impl Targets {
    /// The keys this document authorizes for its delegated roles.
    pub fn key_holder(&self) -> Result<KeyHolder<'_>> {
        self.delegations
            .as_ref()
            .map(KeyHolder::Delegations)
            .context(error::NoDelegationsSnafu)
    }
}

impl Role for Targets {
    const TYPE: RoleType = RoleType::Targets;

    fn expires(&self) -> DateTime<Utc> {
        self.expires
    }

    fn version(&self) -> NonZeroU64 {
        self.version
    }
}

/// TUF 4.5: A target file's length, digests and opaque application data.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Target {
    /// LENGTH is the integer length in bytes of the target file at TARGETPATH.
    pub length: u64,

    /// Digests of the target file.
    pub hashes: Hashes,

    /// Opaque to this crate; made available to the application.
    #[serde(default)]
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub custom: HashMap<String, Value>,

    /// Extra arguments found during deserialization.
    #[serde(flatten)]
    pub _extra: HashMap<String, Value>,
}

impl Target {
    /// Checks downloaded target content against the recorded length and digests.
    pub fn verify_length_hashes(&self, data: &[u8]) -> Result<()> {
        verify::verify_length_hashes(data, Some(self.length), Some(&self.hashes))
    }
}

/// Delegations are found in a `targets.json` file.
/// TUF 4.5: DELEGATIONS is an object whose format is the following:
/// ```text
/// { "keys" : {
///       KEYID : KEY,
///       ... },
///   "roles" : [{
///       "name": ROLENAME,
///       "keyids" : [ KEYID, ... ] ,
///       "threshold" : THRESHOLD,
///       ("path_hash_prefixes" : [ HEX_DIGEST, ... ] |
///        "paths" : [ PATHPATTERN, ... ]),
///       "terminating": TERMINATING,
///   }, ... ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Delegations {
    /// Public keys of the delegated roles.
    #[serde(deserialize_with = "de::deserialize_keys")]
    pub keys: HashMap<Decoded<Hex>, Key>,

    /// The list of delegated roles, in priority order.
    pub roles: Vec<DelegatedRole>,
}

impl Delegations {
    /// The delegated role called `name`, if this document delegates to it.
    pub fn role(&self, name: &str) -> Option<&DelegatedRole> {
        self.roles.iter().find(|role| role.name == name)
    }

    /// The roles trusted for `target`, in the order they are declared.
    pub fn roles_for_target<'a>(
        &'a self,
        target: &'a str,
    ) -> impl Iterator<Item = &'a DelegatedRole> + 'a {
        self.roles
            .iter()
            .filter(move |role| role.is_delegated_path(target))
    }
}

/// Each role delegated in a targets file is considered a delegated role.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DelegatedRole {
    /// The name of the delegated role. For example, "projects".
    pub name: String,

    /// The key IDs used by this role.
    pub keyids: Vec<Decoded<Hex>>,

    /// The threshold of signatures required to validate the role.
    pub threshold: NonZeroU64,

    /// The paths governed by this role.
    #[serde(flatten)]
    pub paths: PathSet,

    /// When true, roles after this one are not consulted for targets it matches.
    pub terminating: bool,
}

impl DelegatedRole {
    /// Whether `target` falls inside the part of the namespace this role is trusted for.
    pub fn is_delegated_path(&self, target: &str) -> bool {
        match &self.paths {
            PathSet::Paths(patterns) => patterns
                .iter()
                .any(|pattern| matches_pattern(pattern, target)),
            PathSet::PathHashPrefixes(prefixes) => {
                let hash = hex::encode(digest(&SHA256, target.as_bytes()));
                prefixes.iter().any(|prefix| hash.starts_with(prefix.as_str()))
            }
        }
    }
}

/// Shell-style match, segment by segment. The pattern and the target must have the same number of
/// `/`-separated segments, and each pattern segment must match the corresponding target segment.
fn matches_pattern(pattern: &str, target: &str) -> bool {
    let patterns: Vec<&str> = pattern.split('/').collect();
    let segments: Vec<&str> = target.split('/').collect();
    patterns.len() == segments.len()
        && patterns
            .iter()
            .zip(&segments)
            .all(|(pattern, segment)| matches_segment(pattern, segment))
}

/// Matches one path segment against `*`, `?` and `[...]`. Braces are literal, so `{a,b}` is not
/// an alternation. A pattern that does not compile matches nothing.
fn matches_segment(pattern: &str, segment: &str) -> bool {
    let mut escaped = String::with_capacity(pattern.len());
    let mut in_class = false;
    for c in pattern.chars() {
        match c {
            '{' | '}' if !in_class => {
                escaped.push('[');
                escaped.push(c);
                escaped.push(']');
            }
            '[' => {
                in_class = true;
                escaped.push(c);
            }
            ']' => {
                in_class = false;
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }

    GlobBuilder::new(&escaped)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher().is_match(segment))
        .unwrap_or(false)
}

/// Specifies the target paths that a delegated role controls.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum PathSet {
    /// Shell-style patterns such as `targets/*.tgz`. `*` and `?` never match `/`.
    #[serde(rename = "paths")]
    Paths(Vec<String>),

    /// Hex prefixes of the SHA-256 digest of the target path.
    #[serde(rename = "path_hash_prefixes")]
    PathHashPrefixes(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn delegated(paths: serde_json::Value) -> DelegatedRole {
        let mut role = json!({
            "name": "role",
            "keyids": [],
            "threshold": 1,
            "terminating": false,
        });
        role.as_object_mut()
            .unwrap()
            .extend(paths.as_object().unwrap().clone());
        serde_json::from_value(role).unwrap()
    }

    fn targets_document() -> serde_json::Value {
        json!({
            "signed": {
                "_type": "targets",
                "spec_version": "1.0.0",
                "version": 1,
                "expires": "2030-01-01T00:00:00Z",
                "targets": {},
                "custom_field": [1, 2, 3],
            },
            "signatures": [],
        })
    }

    #[test]
    fn wrong_type_is_reported_before_missing_fields() {
        let data = serde_json::to_vec(&targets_document()).unwrap();
        let err = Signed::<Timestamp>::from_slice(&data).unwrap_err();
        assert!(matches!(
            err,
            Error::WrongType {
                expected: RoleType::Timestamp,
                ..
            }
        ));
    }

    #[test]
    fn unknown_fields_survive_canonicalization() {
        let data = serde_json::to_vec(&targets_document()).unwrap();
        let targets = Signed::<Targets>::from_slice(&data).unwrap();
        let canonical = String::from_utf8(targets.signed.canonical_form().unwrap()).unwrap();
        assert!(canonical.contains("\"custom_field\":[1,2,3]"));
        assert!(canonical.contains("\"_type\":\"targets\""));
    }

    #[test]
    fn duplicate_signatures_are_rejected() {
        let mut document = targets_document();
        document["signatures"] = json!([
            { "keyid": "aa", "sig": "00" },
            { "keyid": "AA", "sig": "01" },
        ]);
        let data = serde_json::to_vec(&document).unwrap();
        let err = Signed::<Targets>::from_slice(&data).unwrap_err();
        assert!(matches!(err, Error::DuplicateSignature { .. }));
    }

    #[test]
    fn expiry_is_exclusive_of_the_instant() {
        let data = serde_json::to_vec(&targets_document()).unwrap();
        let targets = Signed::<Targets>::from_slice(&data).unwrap().signed;
        let expires = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert!(!targets.is_expired(expires));
        assert!(targets.is_expired(expires + chrono::Duration::seconds(1)));
    }

    #[test]
    fn wildcards_stay_within_a_segment() {
        let role = delegated(json!({ "paths": ["foo/*.txt", "bar/?.tgz"] }));
        assert!(role.is_delegated_path("foo/bar.txt"));
        assert!(!role.is_delegated_path("foo/baz/bar.txt"));
        assert!(role.is_delegated_path("bar/a.tgz"));
        assert!(!role.is_delegated_path("bar/ab.tgz"));
    }

    #[test]
    fn recursive_wildcards_do_not_cross_segments() {
        let role = delegated(json!({ "paths": ["releases/**"] }));
        assert!(role.is_delegated_path("releases/a.tgz"));
        assert!(!role.is_delegated_path("releases/a/b/c.tgz"));

        let role = delegated(json!({ "paths": ["**"] }));
        assert!(role.is_delegated_path("file"));
        assert!(!role.is_delegated_path("x/y"));
        assert!(!role.is_delegated_path("deep/nested/file"));
    }

    #[test]
    fn braces_are_literal() {
        let role = delegated(json!({ "paths": ["{a,b}.txt"] }));
        assert!(!role.is_delegated_path("a.txt"));
        assert!(!role.is_delegated_path("b.txt"));
        assert!(role.is_delegated_path("{a,b}.txt"));

        let role = delegated(json!({ "paths": ["[ab].txt"] }));
        assert!(role.is_delegated_path("a.txt"));
        assert!(!role.is_delegated_path("c.txt"));
    }

    #[test]
    fn hash_prefixes_match_the_path_digest() {
        // sha256("foo/bar.txt") = ff4111e8...
        let role = delegated(json!({ "path_hash_prefixes": ["00", "ff41"] }));
        assert!(role.is_delegated_path("foo/bar.txt"));
        let role = delegated(json!({ "path_hash_prefixes": ["ff40"] }));
        assert!(!role.is_delegated_path("foo/bar.txt"));
    }

    #[test]
    fn roles_for_target_keeps_declaration_order() {
        let delegations: Delegations = serde_json::from_value(json!({
            "keys": {},
            "roles": [
                { "name": "c", "keyids": [], "threshold": 1, "terminating": false, "paths": ["*"] },
                { "name": "a", "keyids": [], "threshold": 1, "terminating": false, "paths": ["x"] },
                { "name": "b", "keyids": [], "threshold": 1, "terminating": true, "paths": ["*"] },
            ],
        }))
        .unwrap();
        let names: Vec<_> = delegations
            .roles_for_target("file")
            .map(|role| role.name.as_str())
            .collect();
        assert_eq!(names, vec!["c", "b"]);
    }

    #[test]
    fn targets_name_is_the_top_level_role() {
        assert_eq!(
            RoleId::targets("targets"),
            RoleId::StandardRole(RoleType::Targets)
        );
        assert_eq!(RoleId::targets("role1").to_string(), "role1");
        assert_eq!(RoleId::from(RoleType::Snapshot).to_string(), "snapshot");
    }
}

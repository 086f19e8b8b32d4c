// Copyright 2019 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The trusted metadata state: the documents accepted so far in one update session and the rules
//! for accepting the next one.
//!
//! Documents are accepted in a fixed order: any number of root rotations, then timestamp, then
//! snapshot, then the top-level targets, then delegated targets (each after its delegator).
//! Timestamp and snapshot are stored as soon as their signatures and rollback checks pass, and
//! their expiry (and for snapshot, the version recorded by the timestamp) is checked afterwards.
//! A stored-but-failing document is still the baseline against which the next one is checked.

use crate::error::{self, Result};
use crate::schema::{
    meta_filename, KeyHolder, Role, RoleId, RoleType, Root, Signed, Snapshot, Targets, Timestamp,
    ROOT, TARGETS,
};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use snafu::{ensure, OptionExt, ResultExt};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// The documents trusted so far in one update session.
///
/// Every update operation takes the raw bytes of a candidate document and, on success, returns a
/// reference to the newly trusted document. The state is not shared between sessions: build a new
/// one from the last trusted root each time.
#[derive(Debug, Clone)]
pub struct TrustedMetadata {
    root: Signed<Root>,
    timestamp: Option<Signed<Timestamp>>,
    snapshot: Option<Signed<Snapshot>>,
    targets: HashMap<String, Signed<Targets>>,
    reference_time: DateTime<Utc>,
}

impl TrustedMetadata {
    /// Bootstraps trust from a root document obtained out of band, using the current time as the
    /// reference time for every expiry check in this session.
    pub fn new(root: &[u8]) -> Result<Self> {
        Self::with_reference_time(root, Utc::now())
    }

    /// Bootstraps trust from a root document obtained out of band.
    ///
    /// The root must be signed by a threshold of its own root keys. Its version and expiry are not
    /// checked here; an expired root is a valid starting point for rotation.
    pub fn with_reference_time(root: &[u8], reference_time: DateTime<Utc>) -> Result<Self> {
        let root =
            Signed::<Root>::from_slice(root).context(error::ParseTrustedMetadataSnafu)?;
        root.signed
            .verify_role(&root)
            .context(error::VerifyTrustedMetadataSnafu)?;
        debug!("Loaded trusted root version {}", root.signed.version);

        Ok(Self {
            root,
            timestamp: None,
            snapshot: None,
            targets: HashMap::new(),
            reference_time,
        })
    }

    /// The trusted root.
    pub fn root(&self) -> &Signed<Root> {
        &self.root
    }

    /// The trusted timestamp, if one has been stored.
    pub fn timestamp(&self) -> Option<&Signed<Timestamp>> {
        self.timestamp.as_ref()
    }

    /// The trusted snapshot, if one has been stored.
    pub fn snapshot(&self) -> Option<&Signed<Snapshot>> {
        self.snapshot.as_ref()
    }

    /// The trusted top-level targets, if loaded.
    pub fn targets(&self) -> Option<&Signed<Targets>> {
        self.targets.get(TARGETS)
    }

    /// The trusted targets document for `role`, which may be "targets" or a delegated role.
    pub fn delegated_targets(&self, role: &str) -> Option<&Signed<Targets>> {
        self.targets.get(role)
    }

    /// The instant every expiry check in this session is made against.
    pub fn reference_time(&self) -> DateTime<Utc> {
        self.reference_time
    }

    /// Replaces the reference time.
    ///
    /// This is unsafe for production use: expiry is the only protection against a repository that
    /// is frozen in time. It exists so that tests can exercise time-dependent behavior.
    pub fn set_reference_time(&mut self, reference_time: DateTime<Utc>) {
        self.reference_time = reference_time;
    }

    /// Rotates the trusted root to the next version.
    ///
    /// The candidate must be signed by a threshold of the current root keys and by a threshold of
    /// its own root keys, and its version must be exactly one more than the current one. Not
    /// allowed once a timestamp is trusted.
    pub fn update_root(&mut self, data: &[u8]) -> Result<&Signed<Root>> {
        ensure!(
            self.timestamp.is_none(),
            error::OutOfOrderSnafu {
                role: RoleType::Root,
                trusted: RoleType::Timestamp,
            }
        );
        let role = RoleId::from(RoleType::Root);

        let new_root = Signed::<Root>::from_slice(data)
            .context(error::ParseMetadataSnafu { role: role.clone() })?;
        self.root
            .signed
            .verify_role(&new_root)
            .context(error::VerifyMetadataSnafu { role: role.clone() })?;

        let current = self.root.signed.version.get();
        let fetched = new_root.signed.version.get();
        ensure!(
            Some(fetched) == current.checked_add(1),
            error::VersionMismatchSnafu {
                role: role.clone(),
                fetched,
                expected: current.saturating_add(1),
            }
        );

        new_root
            .signed
            .verify_role(&new_root)
            .context(error::VerifyMetadataSnafu { role })?;

        debug!("Rotated root from version {} to {}", current, fetched);
        self.root = new_root;
        Ok(&self.root)
    }

    /// Stores a new timestamp.
    ///
    /// The trusted root must not be expired. A candidate older than the trusted timestamp, or one
    /// recording an older snapshot, is rejected. A candidate with the same version as the trusted
    /// timestamp is rejected with [`crate::ErrorKind::EqualVersion`] and nothing changes.
    ///
    /// The candidate is stored before its expiry is checked: an expiry error is returned with the
    /// candidate already trusted.
    pub fn update_timestamp(&mut self, data: &[u8]) -> Result<&Signed<Timestamp>> {
        ensure!(
            self.snapshot.is_none(),
            error::OutOfOrderSnafu {
                role: RoleType::Timestamp,
                trusted: RoleType::Snapshot,
            }
        );
        ensure!(
            !self.root.signed.is_expired(self.reference_time),
            error::ExpiredMetadataSnafu {
                role: RoleType::Root,
                expires: self.root.signed.expires,
            }
        );
        let role = RoleId::from(RoleType::Timestamp);

        let new_timestamp = Signed::<Timestamp>::from_slice(data)
            .context(error::ParseMetadataSnafu { role: role.clone() })?;
        self.root
            .signed
            .verify_role(&new_timestamp)
            .context(error::VerifyMetadataSnafu { role: role.clone() })?;

        let new_snapshot_meta =
            new_timestamp
                .signed
                .snapshot_meta()
                .context(error::MetaMissingSnafu {
                    file: "snapshot.json",
                    role: RoleType::Timestamp,
                })?;

        if let Some(old_timestamp) = &self.timestamp {
            let current_version = old_timestamp.signed.version.get();
            let new_version = new_timestamp.signed.version.get();
            ensure!(
                new_version >= current_version,
                error::OlderMetadataSnafu {
                    role: role.clone(),
                    current_version,
                    new_version,
                }
            );
            ensure!(
                new_version != current_version,
                error::EqualVersionSnafu {
                    role: role.clone(),
                    version: new_version,
                }
            );

            if let Some(old_snapshot_meta) = old_timestamp.signed.snapshot_meta() {
                let current_version = old_snapshot_meta.version.get();
                let new_version = new_snapshot_meta.version.get();
                ensure!(
                    new_version >= current_version,
                    error::OlderMetadataSnafu {
                        role: RoleType::Snapshot,
                        current_version,
                        new_version,
                    }
                );
            }
        }

        debug!(
            "Stored timestamp version {}",
            new_timestamp.signed.version.get()
        );
        let reference_time = self.reference_time;
        let timestamp = &*self.timestamp.insert(new_timestamp);
        check_final_timestamp(timestamp, reference_time)?;
        Ok(timestamp)
    }

    /// Stores a new snapshot.
    ///
    /// The trusted timestamp must be trusted and not expired. Unless `is_trusted` is set (for bytes
    /// that were verified when they were first stored), the bytes must match the length and hashes
    /// the timestamp records. A candidate may not drop a file the trusted snapshot describes, nor
    /// lower the version of one.
    ///
    /// The candidate is stored before its expiry and its version against the timestamp are
    /// checked: an error from either is returned with the candidate already trusted.
    pub fn update_snapshot(&mut self, data: &[u8], is_trusted: bool) -> Result<&Signed<Snapshot>> {
        let timestamp = self.timestamp.as_ref().context(error::MissingTrustedSnafu {
            role: RoleType::Snapshot,
            needs: RoleType::Timestamp,
        })?;
        ensure!(
            !self.targets.contains_key(TARGETS),
            error::OutOfOrderSnafu {
                role: RoleType::Snapshot,
                trusted: RoleType::Targets,
            }
        );
        check_final_timestamp(timestamp, self.reference_time)?;
        let role = RoleId::from(RoleType::Snapshot);

        let snapshot_meta =
            timestamp
                .signed
                .snapshot_meta()
                .context(error::MetaMissingSnafu {
                    file: "snapshot.json",
                    role: RoleType::Timestamp,
                })?;
        if !is_trusted {
            snapshot_meta
                .verify_length_hashes(data)
                .context(error::VerifyIntegritySnafu { role: role.clone() })?;
        }

        let new_snapshot = Signed::<Snapshot>::from_slice(data)
            .context(error::ParseMetadataSnafu { role: role.clone() })?;
        self.root
            .signed
            .verify_role(&new_snapshot)
            .context(error::VerifyMetadataSnafu { role })?;

        if let Some(old_snapshot) = &self.snapshot {
            for (file, old_meta) in &old_snapshot.signed.meta {
                let new_meta = new_snapshot
                    .signed
                    .meta
                    .get(file)
                    .context(error::MetaRemovedSnafu { file })?;
                let current_version = old_meta.version.get();
                let new_version = new_meta.version.get();
                ensure!(
                    new_version >= current_version,
                    error::OlderMetadataSnafu {
                        role: meta_role(file),
                        current_version,
                        new_version,
                    }
                );
            }
        }

        debug!(
            "Stored snapshot version {}",
            new_snapshot.signed.version.get()
        );
        let reference_time = self.reference_time;
        let snapshot = &*self.snapshot.insert(new_snapshot);
        check_final_snapshot(snapshot, self.timestamp.as_ref(), reference_time)?;
        Ok(snapshot)
    }

    /// Loads the top-level targets document, which root delegates.
    pub fn update_targets(&mut self, data: &[u8]) -> Result<&Signed<Targets>> {
        self.update_delegated_targets(data, TARGETS, ROOT)
    }

    /// Loads the targets document for `role`, delegated by `delegator`.
    ///
    /// The snapshot must pass its final checks, and `delegator` (either "root", which delegates only
    /// "targets", or an already trusted targets role) must be trusted. The bytes must match the
    /// length and hashes the snapshot records for `role`, the document must be signed by the keys
    /// `delegator` authorizes for `role`, its version must be exactly the one the snapshot records,
    /// and it must not be expired. Nothing is stored unless every check passes.
    pub fn update_delegated_targets(
        &mut self,
        data: &[u8],
        role: &str,
        delegator: &str,
    ) -> Result<&Signed<Targets>> {
        let role_id = RoleId::targets(role);
        let snapshot = self.snapshot.as_ref().context(error::MissingTrustedSnafu {
            role: role_id.clone(),
            needs: RoleType::Snapshot,
        })?;
        check_final_snapshot(snapshot, self.timestamp.as_ref(), self.reference_time)?;

        let key_holder = if delegator == ROOT {
            ensure!(role == TARGETS, error::NotDelegatedByRootSnafu { role });
            KeyHolder::Root(&self.root.signed)
        } else {
            self.targets
                .get(delegator)
                .context(error::DelegatorMissingSnafu { role, delegator })?
                .signed
                .key_holder()
                .context(error::VerifyMetadataSnafu {
                    role: role_id.clone(),
                })?
        };

        let meta = snapshot
            .signed
            .targets_meta(role)
            .context(error::MetaMissingSnafu {
                file: meta_filename(role),
                role: RoleType::Snapshot,
            })?;
        meta.verify_length_hashes(data)
            .context(error::VerifyIntegritySnafu {
                role: role_id.clone(),
            })?;

        let new_targets = Signed::<Targets>::from_slice(data).context(
            error::ParseMetadataSnafu {
                role: role_id.clone(),
            },
        )?;
        key_holder
            .verify_role(&new_targets, role)
            .context(error::VerifyMetadataSnafu {
                role: role_id.clone(),
            })?;

        let expected = meta.version.get();
        let fetched = new_targets.signed.version.get();
        ensure!(
            fetched == expected,
            error::VersionMismatchSnafu {
                role: role_id.clone(),
                fetched,
                expected,
            }
        );
        ensure!(
            !new_targets.signed.is_expired(self.reference_time),
            error::ExpiredMetadataSnafu {
                role: role_id,
                expires: new_targets.signed.expires,
            }
        );

        debug!("Loaded {} version {}", role, fetched);
        let trusted = match self.targets.entry(role.to_owned()) {
            Entry::Occupied(mut entry) => {
                entry.insert(new_targets);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(new_targets),
        };
        Ok(&*trusted)
    }
}

/// The final check of the trusted timestamp: it must not be expired.
fn check_final_timestamp(
    timestamp: &Signed<Timestamp>,
    reference_time: DateTime<Utc>,
) -> Result<()> {
    if timestamp.signed.is_expired(reference_time) {
        warn!(
            "Trusted timestamp version {} expired at {}",
            timestamp.signed.version, timestamp.signed.expires
        );
        return error::ExpiredMetadataSnafu {
            role: RoleType::Timestamp,
            expires: timestamp.signed.expires,
        }
        .fail();
    }
    Ok(())
}

/// The final check of the trusted snapshot: it must not be expired, and its version must be the
/// one the trusted timestamp records.
fn check_final_snapshot(
    snapshot: &Signed<Snapshot>,
    timestamp: Option<&Signed<Timestamp>>,
    reference_time: DateTime<Utc>,
) -> Result<()> {
    if snapshot.signed.is_expired(reference_time) {
        warn!(
            "Trusted snapshot version {} expired at {}",
            snapshot.signed.version, snapshot.signed.expires
        );
        return error::ExpiredMetadataSnafu {
            role: RoleType::Snapshot,
            expires: snapshot.signed.expires,
        }
        .fail();
    }

    let expected = timestamp
        .and_then(|timestamp| timestamp.signed.snapshot_meta())
        .context(error::MetaMissingSnafu {
            file: "snapshot.json",
            role: RoleType::Timestamp,
        })?
        .version
        .get();
    let fetched = snapshot.signed.version.get();
    if fetched != expected {
        warn!(
            "Trusted snapshot version {} does not match version {} recorded by timestamp",
            fetched, expected
        );
        return error::VersionMismatchSnafu {
            role: RoleType::Snapshot,
            fetched,
            expected,
        }
        .fail();
    }
    Ok(())
}

/// The role described by a snapshot `meta` key such as `role1.json`.
fn meta_role(file: &str) -> RoleId {
    RoleId::targets(file.strip_suffix(".json").unwrap_or(file))
}

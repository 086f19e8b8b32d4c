// Copyright 2019 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The client workflow: fetch each document from a repository in order and feed it to a
//! [`TrustedMetadata`], then look up and download targets.

use crate::encode_filename;
use crate::error::{self, ErrorKind, Result};
use crate::fetch::fetch_max_size;
use crate::schema::{meta_filename, RoleId, RoleType, Signed, Target, Targets, ROOT, TARGETS};
use crate::transport::Transport;
use crate::trusted::TrustedMetadata;
use chrono::{DateTime, Utc};
use log::{debug, info};
use snafu::{ensure, OptionExt, ResultExt};
use std::collections::HashSet;
use url::Url;

/// Limits and options for an [`Updater`].
///
/// Sizes are in bytes. The length a parent document records for a file takes precedence over the
/// corresponding maximum.
#[derive(Debug, Clone, Copy)]
pub struct UpdaterConfig {
    /// The most root versions fetched in one refresh.
    pub max_root_rotations: u64,
    /// The most targets roles visited when looking up a target.
    pub max_delegations: usize,
    /// Maximum size of a root document.
    pub root_max_length: u64,
    /// Maximum size of the timestamp document.
    pub timestamp_max_length: u64,
    /// Maximum size of the snapshot document when the timestamp does not record its length.
    pub snapshot_max_length: u64,
    /// Maximum size of a targets document when the snapshot does not record its length.
    pub targets_max_length: u64,
    /// Whether targets are fetched by their hash-prefixed names when the repository publishes
    /// consistent snapshots.
    pub prefix_targets_with_hash: bool,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            max_root_rotations: 256,
            max_delegations: 32,
            root_max_length: 512_000,
            timestamp_max_length: 16_384,
            snapshot_max_length: 2_000_000,
            targets_max_length: 5_000_000,
            prefix_targets_with_hash: true,
        }
    }
}

impl UpdaterConfig {
    /// Set the most root versions fetched in one refresh.
    #[must_use]
    pub fn max_root_rotations(mut self, value: u64) -> Self {
        self.max_root_rotations = value;
        self
    }

    /// Set the most targets roles visited when looking up a target.
    #[must_use]
    pub fn max_delegations(mut self, value: usize) -> Self {
        self.max_delegations = value;
        self
    }

    /// Set the maximum size of a root document.
    #[must_use]
    pub fn root_max_length(mut self, value: u64) -> Self {
        self.root_max_length = value;
        self
    }

    /// Set the maximum size of the timestamp document.
    #[must_use]
    pub fn timestamp_max_length(mut self, value: u64) -> Self {
        self.timestamp_max_length = value;
        self
    }

    /// Set the maximum size of the snapshot document.
    #[must_use]
    pub fn snapshot_max_length(mut self, value: u64) -> Self {
        self.snapshot_max_length = value;
        self
    }

    /// Set the maximum size of a targets document.
    #[must_use]
    pub fn targets_max_length(mut self, value: u64) -> Self {
        self.targets_max_length = value;
        self
    }

    /// Set whether targets are fetched by their hash-prefixed names.
    #[must_use]
    pub fn prefix_targets_with_hash(mut self, value: bool) -> Self {
        self.prefix_targets_with_hash = value;
        self
    }
}

/// Fetches metadata from a repository and resolves targets against it.
#[derive(Debug, Clone)]
pub struct Updater {
    transport: Box<dyn Transport>,
    metadata_base_url: Url,
    targets_base_url: Url,
    config: UpdaterConfig,
    trusted: TrustedMetadata,
    refreshed: bool,
}

impl Updater {
    /// Creates an updater that trusts `root` and fetches from the given base URLs, both of which
    /// must end in a slash.
    pub fn new(
        root: &[u8],
        metadata_base_url: Url,
        targets_base_url: Url,
        transport: Box<dyn Transport>,
        config: UpdaterConfig,
    ) -> Result<Self> {
        for url in [&metadata_base_url, &targets_base_url].iter() {
            ensure!(
                url.as_str().ends_with('/'),
                error::BaseUrlMissingTrailingSlashSnafu { url: (*url).clone() }
            );
        }

        Ok(Self {
            transport,
            metadata_base_url,
            targets_base_url,
            config,
            trusted: TrustedMetadata::new(root)?,
            refreshed: false,
        })
    }

    /// The documents trusted so far.
    pub fn trusted_metadata(&self) -> &TrustedMetadata {
        &self.trusted
    }

    /// Replaces the reference time used for expiry checks.
    ///
    /// This is unsafe for production use. It exists so that tests can exercise time-dependent
    /// behavior.
    pub fn set_reference_time(&mut self, reference_time: DateTime<Utc>) {
        self.trusted.set_reference_time(reference_time);
    }

    /// Brings the trusted metadata up to date: every newer root in turn, then the timestamp,
    /// snapshot, and top-level targets. May be called once per `Updater`.
    pub async fn refresh(&mut self) -> Result<()> {
        ensure!(!self.refreshed, error::AlreadyRefreshedSnafu);
        self.refreshed = true;

        self.load_root().await?;
        self.load_timestamp().await?;
        self.load_snapshot().await?;
        self.load_targets(TARGETS, ROOT).await?;
        info!(
            "Refreshed metadata from {} (root version {})",
            self.metadata_base_url,
            self.trusted.root().signed.version
        );
        Ok(())
    }

    /// Finds the trusted description of the target at `target_path`, refreshing first if the
    /// top-level targets are not yet trusted.
    ///
    /// Delegations are searched depth-first in the order they are declared, loading each role as
    /// it is reached. A terminating role that matches the path ends the search of its siblings and
    /// of every role not yet visited.
    pub async fn get_target_info(&mut self, target_path: &str) -> Result<Target> {
        if self.trusted.targets().is_none() {
            self.refresh().await?;
        }
        self.preorder_depth_first_walk(target_path).await
    }

    /// Downloads the target at `target_path`, bounded by the length `target` records, and checks
    /// it against the recorded length and hashes.
    pub async fn download_target(&self, target: &Target, target_path: &str) -> Result<Vec<u8>> {
        let name = if self.trusted.root().signed.consistent_snapshot
            && self.config.prefix_targets_with_hash
        {
            let digest = hex::encode(&target.hashes.sha256);
            match target_path.rsplit_once('/') {
                Some((dir, base)) => format!("{}/{}.{}", dir, digest, base),
                None => format!("{}.{}", digest, target_path),
            }
        } else {
            target_path.to_owned()
        };
        let url = self
            .targets_base_url
            .join(&name)
            .with_context(|_| error::JoinUrlSnafu {
                path: name.clone(),
                url: self.targets_base_url.clone(),
            })?;

        let data = fetch_max_size(self.transport.as_ref(), url, target.length, "target length")
            .await?;
        target
            .verify_length_hashes(&data)
            .context(error::VerifyTargetSnafu {
                target: target_path,
            })?;
        info!("Downloaded target {}", target_path);
        Ok(data)
    }

    async fn fetch_metadata(
        &self,
        filename: &str,
        max_size: u64,
        specifier: &'static str,
    ) -> Result<Vec<u8>> {
        let url = self
            .metadata_base_url
            .join(filename)
            .with_context(|_| error::JoinUrlSnafu {
                path: filename,
                url: self.metadata_base_url.clone(),
            })?;
        fetch_max_size(self.transport.as_ref(), url, max_size, specifier).await
    }

    /// Walks forward through `N.root.json` until the next version is not found.
    async fn load_root(&mut self) -> Result<()> {
        let lower = self.trusted.root().signed.version.get().saturating_add(1);
        let upper = lower.saturating_add(self.config.max_root_rotations);
        for version in lower..upper {
            let filename = format!("{}.root.json", version);
            match self
                .fetch_metadata(&filename, self.config.root_max_length, "max_root_length")
                .await
            {
                Ok(data) => {
                    self.trusted.update_root(&data)?;
                }
                Err(err) if err.is_file_not_found() => {
                    debug!("{} not found, root version {} is current", filename, version - 1);
                    break;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    async fn load_timestamp(&mut self) -> Result<()> {
        let data = self
            .fetch_metadata(
                "timestamp.json",
                self.config.timestamp_max_length,
                "max_timestamp_length",
            )
            .await?;
        match self.trusted.update_timestamp(&data) {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == ErrorKind::EqualVersion => {
                info!("Timestamp is unchanged");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn load_snapshot(&mut self) -> Result<()> {
        let meta = self
            .trusted
            .timestamp()
            .and_then(|timestamp| timestamp.signed.snapshot_meta())
            .context(error::MetaMissingSnafu {
                file: "snapshot.json",
                role: RoleType::Timestamp,
            })?;
        let max_size = meta.length.unwrap_or(self.config.snapshot_max_length);
        let filename = if self.trusted.root().signed.consistent_snapshot {
            format!("{}.snapshot.json", meta.version)
        } else {
            "snapshot.json".to_owned()
        };

        let data = self
            .fetch_metadata(&filename, max_size, "max_snapshot_length")
            .await?;
        self.trusted.update_snapshot(&data, false)?;
        Ok(())
    }

    /// Loads the targets document for `role`, delegated by `parent`, unless it is already trusted.
    async fn load_targets(&mut self, role: &str, parent: &str) -> Result<&Signed<Targets>> {
        if self.trusted.delegated_targets(role).is_none() {
            let meta = self
                .trusted
                .snapshot()
                .context(error::MissingTrustedSnafu {
                    role: RoleId::targets(role),
                    needs: RoleType::Snapshot,
                })?
                .signed
                .targets_meta(role)
                .context(error::MetaMissingSnafu {
                    file: meta_filename(role),
                    role: RoleType::Snapshot,
                })?;
            let max_size = meta.length.unwrap_or(self.config.targets_max_length);
            let filename = if self.trusted.root().signed.consistent_snapshot {
                format!("{}.{}.json", meta.version, encode_filename(role))
            } else {
                format!("{}.json", encode_filename(role))
            };

            let data = self
                .fetch_metadata(&filename, max_size, "max_targets_length")
                .await?;
            self.trusted.update_delegated_targets(&data, role, parent)?;
        }
        self.trusted
            .delegated_targets(role)
            .context(error::RoleNotTrustedSnafu { role })
    }

    async fn preorder_depth_first_walk(&mut self, target_path: &str) -> Result<Target> {
        // (role, delegator) pairs; the next role to visit is at the end.
        let mut to_visit = vec![(TARGETS.to_owned(), ROOT.to_owned())];
        let mut visited = HashSet::new();

        while visited.len() <= self.config.max_delegations {
            let (role, parent) = match to_visit.pop() {
                Some(next) => next,
                None => break,
            };
            if visited.contains(&role) {
                debug!("Skipping visited role {}", role);
                continue;
            }

            let targets = &self.load_targets(&role, &parent).await?.signed;
            if let Some(target) = targets.targets.get(target_path) {
                debug!("Found {} in role {}", target_path, role);
                return Ok(target.clone());
            }

            let mut children = Vec::new();
            if let Some(delegations) = &targets.delegations {
                for child in delegations.roles_for_target(target_path) {
                    children.push((child.name.clone(), role.clone()));
                    if child.terminating {
                        debug!("{} is terminating, not backtracking", child.name);
                        to_visit.clear();
                        break;
                    }
                }
            }
            visited.insert(role);
            to_visit.extend(children.into_iter().rev());
        }

        if !to_visit.is_empty() {
            info!(
                "{} roles left to visit after reaching the limit of {} delegations",
                to_visit.len(),
                self.config.max_delegations
            );
        }
        error::TargetNotFoundSnafu {
            target: target_path,
        }
        .fail()
    }
}

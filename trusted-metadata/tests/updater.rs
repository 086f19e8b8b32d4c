// Copyright 2020 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT OR Apache-2.0


use aws_lc_rs::digest::{digest, SHA256};
use tempfile::TempDir;
use test_utils::{
    delegated_role, delegations, dir_url, far_future, keypair, meta_file, root, sign, snapshot,
    targets, timestamp, write_file, RootKeys,
};
use trusted_metadata::{ErrorKind, FilesystemTransport, Updater, UpdaterConfig};
use url::Url;

const TOP: &[u8] = b"top level";
const ONE_FROM_ROLE1: &[u8] = b"one, as role1 sees it";
const ONE_FROM_ROLE2: &[u8] = b"one, as role2 sees it";
const TWO: &[u8] = b"two";

/// A repository on disk with `metadata/` and `targets/` directories.
struct Repo {
    dir: TempDir,
    /// The version 1 root, handed to the updater as its trust anchor.
    root: Vec<u8>,
}

impl Repo {
    fn metadata_url(&self) -> Url {
        dir_url(self.dir.path().join("metadata"))
    }

    fn targets_url(&self) -> Url {
        dir_url(self.dir.path().join("targets"))
    }

    fn updater(&self, config: UpdaterConfig) -> Updater {
        Updater::new(
            &self.root,
            self.metadata_url(),
            self.targets_url(),
            Box::new(FilesystemTransport),
            config,
        )
        .unwrap()
    }
}

fn hash_prefixed(path: &str, data: &[u8]) -> String {
    let hash = hex::encode(digest(&SHA256, data));
    match path.rsplit_once('/') {
        Some((dir, base)) => format!("{}/{}.{}", dir, hash, base),
        None => format!("{}.{}", hash, path),
    }
}

/// Writes a repository whose root has been rotated once. The top-level targets role delegates
/// `a/*` to role1 and then role2; role1 is terminating if `terminating` is set.
fn write_repo(consistent_snapshot: bool, terminating: bool) -> Repo {
    let dir = TempDir::new().unwrap();
    let metadata = dir.path().join("metadata");
    let targets_dir = dir.path().join("targets");

    let root_key = keypair();
    let timestamp_key = keypair();
    let snapshot_key = keypair();
    let targets_key = keypair();
    let role1_key = keypair();
    let role2_key = keypair();

    let root_keys = [&root_key];
    let keys = RootKeys {
        root: (&root_keys[..], 1),
        timestamp: &timestamp_key,
        snapshot: &snapshot_key,
        targets: &targets_key,
    };
    let root_v1 = sign(
        root(1, far_future(), &keys, consistent_snapshot),
        &[&root_key],
    );
    let root_v2 = sign(
        root(2, far_future(), &keys, consistent_snapshot),
        &[&root_key],
    );
    write_file(&metadata, "1.root.json", &root_v1);
    write_file(&metadata, "2.root.json", &root_v2);

    let role1 = sign(
        targets(1, far_future(), &[("a/one.txt", ONE_FROM_ROLE1)], None),
        &[&role1_key],
    );
    let role2 = sign(
        targets(
            1,
            far_future(),
            &[("a/one.txt", ONE_FROM_ROLE2), ("a/two.txt", TWO)],
            None,
        ),
        &[&role2_key],
    );
    let top = sign(
        targets(
            1,
            far_future(),
            &[("top.txt", TOP)],
            Some(delegations(
                &[&role1_key, &role2_key],
                vec![
                    delegated_role("role1", &role1_key, &["a/*"], terminating),
                    delegated_role("role2", &role2_key, &["a/*"], false),
                ],
            )),
        ),
        &[&targets_key],
    );
    let snapshot_doc = sign(
        snapshot(
            1,
            far_future(),
            vec![
                ("targets", meta_file(1, Some(&top[..]))),
                ("role1", meta_file(1, Some(&role1[..]))),
                ("role2", meta_file(1, Some(&role2[..]))),
            ],
        ),
        &[&snapshot_key],
    );
    let timestamp_doc = sign(
        timestamp(1, far_future(), meta_file(1, Some(&snapshot_doc[..]))),
        &[&timestamp_key],
    );

    write_file(&metadata, "timestamp.json", &timestamp_doc);
    let prefix = if consistent_snapshot { "1." } else { "" };
    for (name, data) in [
        ("snapshot", &snapshot_doc),
        ("targets", &top),
        ("role1", &role1),
        ("role2", &role2),
    ]
    .iter()
    {
        write_file(&metadata, &format!("{}{}.json", prefix, name), data);
    }

    for (path, data) in [("top.txt", TOP), ("a/one.txt", ONE_FROM_ROLE1), ("a/two.txt", TWO)].iter()
    {
        let name = if consistent_snapshot {
            hash_prefixed(path, data)
        } else {
            (*path).to_owned()
        };
        write_file(&targets_dir, &name, data);
    }

    Repo { dir, root: root_v1 }
}

#[tokio::test]
async fn refresh_walks_root_rotations() {
    let repo = write_repo(false, false);
    let mut updater = repo.updater(UpdaterConfig::default());
    updater.refresh().await.unwrap();

    let trusted = updater.trusted_metadata();
    assert_eq!(trusted.root().signed.version.get(), 2);
    assert_eq!(trusted.timestamp().unwrap().signed.version.get(), 1);
    assert_eq!(trusted.snapshot().unwrap().signed.version.get(), 1);
    assert!(trusted.targets().is_some());
    assert!(trusted.delegated_targets("role1").is_none());
}

#[tokio::test]
async fn refresh_happens_once() {
    let repo = write_repo(false, false);
    let mut updater = repo.updater(UpdaterConfig::default());
    updater.refresh().await.unwrap();
    let err = updater.refresh().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Sequence);
}

#[tokio::test]
async fn top_level_target_downloads() {
    let repo = write_repo(false, false);
    let mut updater = repo.updater(UpdaterConfig::default());

    let info = updater.get_target_info("top.txt").await.unwrap();
    assert_eq!(info.length, TOP.len() as u64);
    let data = updater.download_target(&info, "top.txt").await.unwrap();
    assert_eq!(data, TOP);
}

#[tokio::test]
async fn delegations_are_searched_in_order() {
    let repo = write_repo(false, false);
    let mut updater = repo.updater(UpdaterConfig::default());

    let one = updater.get_target_info("a/one.txt").await.unwrap();
    assert_eq!(one.length, ONE_FROM_ROLE1.len() as u64);
    assert!(updater.trusted_metadata().delegated_targets("role2").is_none());

    let two = updater.get_target_info("a/two.txt").await.unwrap();
    let data = updater.download_target(&two, "a/two.txt").await.unwrap();
    assert_eq!(data, TWO);
    assert!(updater.trusted_metadata().delegated_targets("role2").is_some());
}

#[tokio::test]
async fn terminating_role_stops_the_search() {
    let repo = write_repo(false, true);
    let mut updater = repo.updater(UpdaterConfig::default());

    updater.get_target_info("a/one.txt").await.unwrap();
    let err = updater.get_target_info("a/two.txt").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Other);
    assert!(updater.trusted_metadata().delegated_targets("role2").is_none());
}

#[tokio::test]
async fn delegation_limit_bounds_the_search() {
    let repo = write_repo(false, false);
    let mut updater = repo.updater(UpdaterConfig::default().max_delegations(0));

    updater.get_target_info("top.txt").await.unwrap();
    assert!(updater.get_target_info("a/one.txt").await.is_err());
    assert!(updater.trusted_metadata().delegated_targets("role1").is_none());
}

#[tokio::test]
async fn tampered_target_is_rejected() {
    let repo = write_repo(false, false);
    let mut updater = repo.updater(UpdaterConfig::default());
    let info = updater.get_target_info("top.txt").await.unwrap();

    write_file(repo.dir.path().join("targets"), "top.txt", b"tampered!");
    let err = updater.download_target(&info, "top.txt").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integrity);

    write_file(repo.dir.path().join("targets"), "top.txt", b"much longer than recorded");
    let err = updater.download_target(&info, "top.txt").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Other);
}

#[tokio::test]
async fn consistent_snapshots_use_prefixed_names() {
    let repo = write_repo(true, false);
    let mut updater = repo.updater(UpdaterConfig::default());

    let info = updater.get_target_info("a/two.txt").await.unwrap();
    let data = updater.download_target(&info, "a/two.txt").await.unwrap();
    assert_eq!(data, TWO);
    assert!(updater.trusted_metadata().root().signed.consistent_snapshot);
}

#[tokio::test]
async fn consistent_snapshots_without_hash_prefixes() {
    let repo = write_repo(true, false);
    write_file(repo.dir.path().join("targets"), "top.txt", TOP);
    let mut updater = repo.updater(UpdaterConfig::default().prefix_targets_with_hash(false));

    let info = updater.get_target_info("top.txt").await.unwrap();
    let data = updater.download_target(&info, "top.txt").await.unwrap();
    assert_eq!(data, TOP);
}

#[test]
fn base_urls_need_trailing_slash() {
    let repo = write_repo(false, false);
    let metadata = Url::from_file_path(repo.dir.path().join("metadata")).unwrap();
    let err = Updater::new(
        &repo.root,
        metadata,
        repo.targets_url(),
        Box::new(FilesystemTransport),
        UpdaterConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Other);
}

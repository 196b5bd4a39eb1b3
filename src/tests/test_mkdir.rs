// SPDX-License-Identifier: MPL-2.0 OR LGPL-3.0-or-later
/*
 * kindpath: statically-kinded paths and cycle-safe filesystem walks
 * Copyright (C) 2025-2026 kindpath contributors
 */

use crate::{
    abs_dir,
    error::ErrorKind,
    fs::{exists, mkdir, Tri},
    rel_dir,
    tests::common::typed_root,
    AnyAnchor, Name, RelDir,
};

use anyhow::{Context, Error};
use pretty_assertions::assert_eq;

fn name(s: &str) -> Name {
    Name::new(s).expect("valid name")
}

#[tokio::test]
async fn mkdir_nested_levels() -> Result<(), Error> {
    let dir = tempfile::TempDir::new()?;
    let root = typed_root(&dir)?;

    let path = root.concat(&rel_dir("x/y/z")?);
    mkdir(&path).await?;

    for sub in ["x", "x/y", "x/y/z"] {
        assert!(
            dir.path().join(sub).is_dir(),
            "{sub} must be a directory after mkdir"
        );
    }
    assert_eq!(exists(&path).await, Tri::Yes);

    let _dir = dir;
    Ok(())
}

#[tokio::test]
async fn mkdir_is_idempotent() -> Result<(), Error> {
    let dir = tempfile::TempDir::new()?;
    let root = typed_root(&dir)?;
    let path = root.concat(&rel_dir("x/y")?);

    mkdir(&path).await?;
    mkdir(&path).await.context("second mkdir over existing tree")?;
    assert_eq!(exists(&path).await, Tri::Yes);

    let _dir = dir;
    Ok(())
}

#[tokio::test]
async fn mkdir_materializes_relative_links() -> Result<(), Error> {
    let dir = tempfile::TempDir::new()?;
    let root = typed_root(&dir)?;

    // root/l -> t, then the walk continues through the link and creates t
    // and t/sub.
    let link = RelDir::link(name("l"), AnyAnchor::Rel(rel_dir("t")?));
    let path = root.concat(&link).concat(&rel_dir("sub")?);
    mkdir(&path).await?;

    let meta = std::fs::symlink_metadata(dir.path().join("l"))?;
    assert!(meta.file_type().is_symlink(), "l must be a symlink");
    assert_eq!(std::fs::read_link(dir.path().join("l"))?.to_str(), Some("t"));
    assert!(dir.path().join("t").is_dir(), "the link target is created");
    assert!(dir.path().join("t/sub").is_dir(), "and the tree behind it");
    assert_eq!(exists(&path).await, Tri::Yes);

    let _dir = dir;
    Ok(())
}

#[tokio::test]
async fn mkdir_materializes_absolute_links() -> Result<(), Error> {
    let dir = tempfile::TempDir::new()?;
    let root = typed_root(&dir)?;

    let target = root.concat(&rel_dir("t2")?);
    let link = RelDir::link(name("l2"), AnyAnchor::Abs(target.clone()));
    mkdir(&root.concat(&link)).await?;

    assert_eq!(
        std::fs::read_link(dir.path().join("l2"))?.to_str(),
        Some(target.to_string().as_str()),
        "the symlink records the absolute target"
    );
    assert!(dir.path().join("t2").is_dir(), "the restarted walk creates it");

    let _dir = dir;
    Ok(())
}

#[tokio::test]
async fn mkdir_over_existing_symlink_fails() -> Result<(), Error> {
    let dir = tempfile::TempDir::new()?;
    let root = typed_root(&dir)?;

    let link = RelDir::link(name("l"), AnyAnchor::Rel(rel_dir("t")?));
    let path = root.concat(&link);
    mkdir(&path).await?;

    // The driver refuses to second-guess an existing entry at a link step.
    let err = mkdir(&path).await.expect_err("second mkdir must fail");
    assert_eq!(err.kind(), ErrorKind::OsError(Some(libc::EEXIST)));

    let _dir = dir;
    Ok(())
}

#[tokio::test]
async fn mkdir_follows_dotdot() -> Result<(), Error> {
    let dir = tempfile::TempDir::new()?;
    let root = typed_root(&dir)?;

    mkdir(&root.concat(&rel_dir("a/../b")?)).await?;
    assert!(dir.path().join("a").is_dir());
    assert!(dir.path().join("b").is_dir());

    let _dir = dir;
    Ok(())
}

#[tokio::test]
async fn mkdir_of_root_is_a_noop() -> Result<(), Error> {
    mkdir(&abs_dir("/")?).await?;
    Ok(())
}

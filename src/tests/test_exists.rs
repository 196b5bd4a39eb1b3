// SPDX-License-Identifier: MPL-2.0 OR LGPL-3.0-or-later
/*
 * kindpath: statically-kinded paths and cycle-safe filesystem walks
 * Copyright (C) 2025-2026 kindpath contributors
 */

use crate::{
    fs::{exists, find_item, lstat, FileKind, Tri},
    rel_dir, rel_file,
    tests::common::{create_tree, typed_root},
    AnyAnchor, Name, RelDir, RelFile,
};

use anyhow::{Context, Error};
use pretty_assertions::assert_eq;

fn name(s: &str) -> Name {
    Name::new(s).expect("valid name")
}

#[tokio::test]
async fn exists_basic_tree() -> Result<(), Error> {
    let dir = create_tree! {
        "a/b" => (dir);
        "f" => (file);
    };
    let root = typed_root(&dir)?;

    assert_eq!(exists(&root).await, Tri::Yes, "the tree root exists");
    assert_eq!(
        exists(&root.concat(&rel_dir("a/b")?)).await,
        Tri::Yes,
        "a/b is a directory"
    );
    assert_eq!(
        exists(&root.concat(&rel_dir("a/zzz")?)).await,
        Tri::No,
        "a/zzz does not exist"
    );
    assert_eq!(
        exists(&root.concat(&rel_file("f")?)).await,
        Tri::Yes,
        "f is a file"
    );
    assert_eq!(
        exists(&root.concat(&rel_file("a")?)).await,
        Tri::No,
        "a file term over a directory entry does not hold"
    );
    assert_eq!(
        exists(&root.concat(&rel_dir("f")?)).await,
        Tri::No,
        "a directory term over a file entry does not hold"
    );

    let _dir = dir; // make sure the tempdir is not dropped early
    Ok(())
}

#[tokio::test]
async fn exists_dot_and_dotdot() -> Result<(), Error> {
    let dir = create_tree! {
        "a/b" => (dir);
    };
    let root = typed_root(&dir)?;

    assert_eq!(exists(&root.concat(&rel_dir("a/../a/./b")?)).await, Tri::Yes);
    assert_eq!(exists(&root.concat(&rel_dir(".")?)).await, Tri::Yes);

    let _dir = dir;
    Ok(())
}

#[tokio::test]
async fn exists_treats_dir_items_literally() -> Result<(), Error> {
    let dir = create_tree! {
        "a/b" => (dir);
        "link" => (symlink -> "a");
    };
    let root = typed_root(&dir)?;

    // A Dir item claims a real directory; a symlink there does not count,
    // even though following it would reach one.
    assert_eq!(exists(&root.concat(&rel_dir("link")?)).await, Tri::No);

    let _dir = dir;
    Ok(())
}

#[tokio::test]
async fn exists_link_terms() -> Result<(), Error> {
    let dir = create_tree! {
        "a/b" => (dir);
        "f" => (file);
        "link" => (symlink -> "a");
        "lf" => (symlink -> "f");
    };
    let root = typed_root(&dir)?;

    let link = RelDir::link(name("link"), AnyAnchor::Rel(rel_dir("a")?));
    assert_eq!(
        exists(&root.concat(&link)).await,
        Tri::Yes,
        "link is a symlink and its target directory exists"
    );
    assert_eq!(
        exists(&root.concat(&link).concat(&rel_dir("b")?)).await,
        Tri::Yes,
        "the walk continues through the link target"
    );

    let not_a_link = RelDir::link(name("a"), AnyAnchor::Rel(rel_dir("b")?));
    assert_eq!(
        exists(&root.concat(&not_a_link)).await,
        Tri::No,
        "a link term over a plain directory does not hold"
    );

    let file_link = RelFile::link(name("lf"), AnyAnchor::Rel(rel_file("f")?));
    assert_eq!(exists(&root.concat(&file_link)).await, Tri::Yes);

    // Same thing with an absolute target.
    let abs_target = root.concat(&rel_dir("a")?);
    std::os::unix::fs::symlink(abs_target.to_string(), dir.path().join("al"))
        .context("symlink al")?;
    let abs_link = RelDir::link(name("al"), AnyAnchor::Abs(abs_target));
    assert_eq!(exists(&root.concat(&abs_link)).await, Tri::Yes);

    let _dir = dir;
    Ok(())
}

#[tokio::test]
async fn exists_dangling_links() -> Result<(), Error> {
    let dir = create_tree! {
        "a" => (dir);
        "dangling" => (symlink -> "nowhere");
        "live" => (symlink -> "a");
    };
    let root = typed_root(&dir)?;

    // As a live link term the dangling entry does not hold: its target
    // term must itself exist.
    let as_link = RelFile::link(name("dangling"), AnyAnchor::Rel(rel_file("nowhere")?));
    assert_eq!(exists(&root.concat(&as_link)).await, Tri::No);

    // As a broken-link term it does.
    let as_broken = RelFile::broken_link(name("dangling"), vec!["nowhere".into()]);
    assert_eq!(exists(&root.concat(&as_broken)).await, Tri::Yes);

    // A broken-link term over a symlink whose target resolves does not.
    let not_broken = RelFile::broken_link(name("live"), vec!["a".into()]);
    assert_eq!(exists(&root.concat(&not_broken)).await, Tri::No);

    let _dir = dir;
    Ok(())
}

#[tokio::test]
async fn exists_terminates_over_looping_symlinks() -> Result<(), Error> {
    let dir = create_tree! {
        "loop1" => (symlink -> "loop2");
        "loop2" => (symlink -> "loop1");
    };
    let root = typed_root(&dir)?;

    // A term mirroring the on-disk loop: every link step checks out, and
    // the walk bottoms out on the literal Dir claim at the end.
    let inner = RelDir::link(name("loop1"), AnyAnchor::Rel(rel_dir("loop2")?));
    let term = RelDir::link(
        name("loop1"),
        AnyAnchor::Rel(RelDir::link(name("loop2"), AnyAnchor::Rel(inner))),
    );
    assert_eq!(
        exists(&root.concat(&term)).await,
        Tri::No,
        "the tail Dir claim over a symlink entry fails, finitely"
    );

    let _dir = dir;
    Ok(())
}

#[tokio::test]
async fn find_item_returns_the_first_hit() -> Result<(), Error> {
    let dir = create_tree! {
        "a" => (dir);
        "b/g" => (file);
        "c/g" => (file);
    };
    let root = typed_root(&dir)?;
    let (a, b, c) = (
        root.concat(&rel_dir("a")?),
        root.concat(&rel_dir("b")?),
        root.concat(&rel_dir("c")?),
    );

    let g = rel_file("g")?;
    assert_eq!(
        find_item(&g, &[a.clone(), b.clone(), c.clone()]).await,
        Some(b.clone()),
        "g first resolves under b"
    );
    assert_eq!(
        find_item(&g, &[c.clone(), b.clone()]).await,
        Some(c.clone()),
        "order matters"
    );
    assert_eq!(
        find_item(&rel_file("missing")?, &[a, b, c]).await,
        None,
        "no directory has it"
    );

    let _dir = dir;
    Ok(())
}

#[tokio::test]
async fn lstat_reports_the_entry_itself() -> Result<(), Error> {
    let dir = create_tree! {
        "a" => (dir);
        "f" => (file);
        "fifo" => (fifo);
        "link" => (symlink -> "f");
    };
    let root = typed_root(&dir)?;

    assert_eq!(
        lstat(&root.concat(&rel_dir("a")?)).await?,
        FileKind::Directory
    );
    assert_eq!(lstat(&root.concat(&rel_file("f")?)).await?, FileKind::Regular);
    assert_eq!(lstat(&root.concat(&rel_file("fifo")?)).await?, FileKind::Fifo);
    assert_eq!(
        lstat(&root.concat(&rel_file("link")?)).await?,
        FileKind::Symlink,
        "lstat does not follow the link"
    );

    let _dir = dir;
    Ok(())
}

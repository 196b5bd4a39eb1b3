// SPDX-License-Identifier: MPL-2.0 OR LGPL-3.0-or-later
/*
 * kindpath: statically-kinded paths and cycle-safe filesystem walks
 * Copyright (C) 2025-2026 kindpath contributors
 */

//! Shared fixtures for the filesystem tests.

use crate::AbsDir;

use std::path::Path;

use anyhow::{Context, Error};
use tempfile::TempDir;

macro_rules! create_inode {
    // "foo/bar" => dir
    ($path:expr => dir) => {
        ::std::fs::create_dir($path)
            .with_context(|| format!("mkdir {}", $path.display()))?;
    };
    // "foo/bar" => file
    ($path:expr => file) => {
        ::std::fs::File::create($path)
            .with_context(|| format!("mkfile {}", $path.display()))?;
    };
    // "foo/bar" => fifo
    ($path:expr => fifo) => {
        ::rustix::fs::mknodat(
            ::rustix::fs::CWD,
            $path,
            ::rustix::fs::FileType::Fifo,
            ::rustix::fs::Mode::from_raw_mode(0o644),
            0,
        )
        .with_context(|| format!("mkfifo {}", $path.display()))?;
    };
    // "foo/bar" => symlink -> "target"
    ($path:expr => symlink -> $target:expr) => {
        ::std::os::unix::fs::symlink($target, $path)
            .with_context(|| format!("symlink {} -> {}", $path.display(), $target))?;
    };
}

macro_rules! create_tree {
    // create_tree! {
    //     "a" => (dir);
    //     "a/b/c" => (file);
    //     "b-link" => (symlink -> "a/b");
    // }
    ($($subpath:expr => ($($inner:tt)*));+ $(;)*) => {
        {
            let root = ::tempfile::TempDir::new()?;
            $(
                {
                    let root_dir: &::std::path::Path = root.as_ref();
                    let path = root_dir.join($subpath.trim_start_matches('/'));
                    if let Some(parent) = path.parent() {
                        ::std::fs::create_dir_all(parent)
                            .with_context(|| format!("mkdirall {}", parent.display()))?;
                    }
                    crate::tests::common::create_inode!(&path => $($inner)*);
                }
            )*
            root
        }
    }
}

pub(crate) use {create_inode, create_tree};

/// The typed absolute path of an on-disk directory, canonicalized so that
/// every component is a literal directory (no `/tmp`-style symlinks).
pub(crate) fn typed_root(dir: &TempDir) -> Result<AbsDir, Error> {
    typed_dir(dir.as_ref())
}

pub(crate) fn typed_dir(path: &Path) -> Result<AbsDir, Error> {
    let real = path
        .canonicalize()
        .with_context(|| format!("canonicalize {}", path.display()))?;
    let text = real.to_str().context("tempdir path is not UTF-8")?;
    Ok(crate::abs_dir(text)?)
}

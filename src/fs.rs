// SPDX-License-Identifier: MPL-2.0 OR LGPL-3.0-or-later
/*
 * kindpath: statically-kinded paths and cycle-safe filesystem walks
 * Copyright (C) 2025-2026 kindpath contributors
 */

#![forbid(unsafe_code)]

//! Cycle-safe filesystem operations over typed paths.
//!
//! Everything here is `async`: each underlying syscall runs on the
//! runtime's blocking pool and the walkers suspend between steps, so a
//! dropped future stops issuing syscalls at the next step boundary. Side
//! effects already performed (by [`mkdir`]) are not rolled back.
//!
//! The operations share two pieces of machinery: the [`Tri`] existence
//! values with their short-circuiting combinators, and a per-invocation
//! cursor set remembering which `(resolved prefix, remaining path)` pairs a
//! walk has already passed through, which is what keeps recursion over
//! looping symlink structures finite.

mod cursor;
mod exists;
mod fold;
mod mkdir;
mod tri;

pub use exists::{exists, find_item};
pub use fold::{fold, fold_follows_links, FoldEvent, FollowEvent};
pub use mkdir::mkdir;
pub use tri::Tri;

use crate::{
    error::{Error, ErrorImpl},
    kind::{Abs, Object},
    path::Path,
    repr::Repr,
    syscalls,
};

use std::{io, path::PathBuf};

/// The kind of an on-disk object, as reported by `lstat`/`stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FileKind {
    Regular,
    Directory,
    Symlink,
    BlockDevice,
    CharacterDevice,
    Fifo,
    Socket,
    Unknown,
}

impl From<rustix::fs::FileType> for FileKind {
    fn from(file_type: rustix::fs::FileType) -> Self {
        use rustix::fs::FileType;
        match file_type {
            FileType::RegularFile => FileKind::Regular,
            FileType::Directory => FileKind::Directory,
            FileType::Symlink => FileKind::Symlink,
            FileType::BlockDevice => FileKind::BlockDevice,
            FileType::CharacterDevice => FileKind::CharacterDevice,
            FileType::Fifo => FileKind::Fifo,
            FileType::Socket => FileKind::Socket,
            _ => FileKind::Unknown,
        }
    }
}

/// Run one blocking syscall wrapper on the runtime's blocking pool.
pub(crate) async fn unblock<T, F>(f: F) -> Result<T, syscalls::Error>
where
    F: FnOnce() -> Result<T, syscalls::Error> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        // The runtime is shutting down (or the closure panicked, which the
        // wrappers never do); report it like any other failed operation.
        Err(err) => Err(syscalls::Error::without_path(
            "run blocking filesystem task",
            io::Error::other(err),
        )),
    }
}

/// The on-disk location a resolved, link-free term refers to.
pub(crate) fn os_path(repr: &Repr) -> PathBuf {
    PathBuf::from(repr.to_string())
}

/// Whether a probe should follow a trailing symlink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolve {
    NoFollow,
    Follow,
}

/// What a single stat probe learned about a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Probe {
    Found(FileKind),
    Missing,
    Unknown,
}

/// Stat `path` without erroring: `ENOENT`, `ENOTDIR` and `ELOOP` mean the
/// object is not there, anything else the OS would not say.
pub(crate) async fn probe(path: PathBuf, resolve: Resolve) -> Probe {
    let result = unblock(move || match resolve {
        Resolve::NoFollow => syscalls::lstat(&path),
        Resolve::Follow => syscalls::stat(&path),
    })
    .await;
    match result {
        Ok(file_type) => Probe::Found(file_type.into()),
        Err(err) => match err.errno() {
            Some(libc::ENOENT | libc::ENOTDIR | libc::ELOOP) => Probe::Missing,
            _ => Probe::Unknown,
        },
    }
}

/// The file kind of the object `path` names, symlinks not followed.
pub async fn lstat<O: Object>(path: &Path<Abs, O>) -> Result<FileKind, Error> {
    let os = os_path(path.repr());
    let file_type = unblock(move || syscalls::lstat(&os))
        .await
        .map_err(|err| ErrorImpl::OsError {
            operation: "lstat".into(),
            source: err,
        })?;
    Ok(file_type.into())
}

// SPDX-License-Identifier: MPL-2.0 OR LGPL-3.0-or-later
/*
 * kindpath: statically-kinded paths and cycle-safe filesystem walks
 * Copyright (C) 2025-2026 kindpath contributors
 */

#![forbid(unsafe_code)]

//! Directory tree folds.
//!
//! Both walkers visit a tree in prefix order and hand every discovered
//! object to a caller-supplied async accumulator. The simple [`fold`]
//! reports objects exactly as they sit on disk and never walks through a
//! symlink; [`fold_follows_links`] resolves every object to its real path
//! and reports whether that real path has been seen before.

use crate::{
    error::{Error, ErrorExt, ErrorImpl},
    fs::{
        cursor::PathSet, exists, os_path, unblock, FileKind, Tri,
    },
    kind::{Dir, File, ObjectKind},
    name::Name,
    path::{AbsDir, AbsFile, AnyAnchor, Path, RelDir, RelFile},
    repr::{Item, Repr},
    syscalls,
};

use std::{
    future::Future,
    io,
    path::{Path as OsPath, PathBuf},
};

use futures::future::{BoxFuture, FutureExt};
use tracing::trace;

/// One object discovered by [`fold`], carrying its path relative to the
/// walk's start. The starting directory itself is reported as `Dir(.)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FoldEvent {
    /// A directory, or a symlink resolving to one.
    Dir(RelDir),
    /// Anything that is neither a directory nor a symlink, or a symlink
    /// resolving to such an object.
    File(RelFile),
    /// A symlink whose target does not resolve.
    BrokenLink(RelFile),
}

/// One object discovered by [`fold_follows_links`]: the logical path from
/// the walk's start, the real path it resolves to, and whether that real
/// path was already reported earlier in the walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FollowEvent {
    Dir {
        path: RelDir,
        real: AbsDir,
        already_seen: bool,
    },
    File {
        path: RelFile,
        real: AbsFile,
        already_seen: bool,
    },
    BrokenLink {
        path: RelFile,
        real: AbsFile,
        already_seen: bool,
    },
}

/// Fold `f` over every object under `start`, in prefix order.
///
/// Symlinks are reported (reified into link or broken-link paths) but never
/// walked through: only plain directories are descended into, so the walk
/// terminates even on looping symlink structures. Fails with
/// [`NotFound`](crate::error::ErrorKind::NotFound) if `start` does not
/// currently exist; errors returned by `f` abort the walk.
///
/// Children are visited in the order the OS returns them, which is
/// unspecified.
pub async fn fold<Acc, F, Fut>(start: &AbsDir, init: Acc, mut f: F) -> Result<Acc, Error>
where
    Acc: Send,
    F: FnMut(Acc, AbsDir, FoldEvent) -> Fut + Send,
    Fut: Future<Output = Result<Acc, Error>> + Send,
{
    if exists(start).await != Tri::Yes {
        return Err(ErrorImpl::NotFound {
            path: start.to_string(),
        })?;
    }
    let acc = f(init, start.clone(), FoldEvent::Dir(RelDir::dot())).await?;
    walk(start, Repr::Item(Item::Dot), acc, &mut f).await
}

fn walk<'a, Acc, F, Fut>(
    start: &'a AbsDir,
    rel: Repr,
    acc: Acc,
    f: &'a mut F,
) -> BoxFuture<'a, Result<Acc, Error>>
where
    Acc: Send + 'a,
    F: FnMut(Acc, AbsDir, FoldEvent) -> Fut + Send,
    Fut: Future<Output = Result<Acc, Error>> + Send + 'a,
{
    async move {
        let dir_os = os_under(start, &rel);
        let mut acc = acc;
        for entry in list_dir(&dir_os).await? {
            let name = decode_entry_name(&dir_os, &entry)?;
            let entry_os = dir_os.join(name.as_str());
            let kind = entry_kind(&entry_os).await?;
            trace!(entry = %entry_os.display(), ?kind, "visiting entry");
            match kind {
                FileKind::Directory => {
                    let child = extend(&rel, Item::Dir(name));
                    let event = FoldEvent::Dir(Path::from_repr(child.clone()));
                    acc = f(acc, start.clone(), event).await?;
                    acc = walk(start, child, acc, f).await?;
                }
                FileKind::Symlink => {
                    let item = reify(&dir_os, name).await?;
                    let object = item.object();
                    let broken = matches!(item, Item::BrokenLink { .. });
                    let child = extend(&rel, item);
                    let event = if broken {
                        FoldEvent::BrokenLink(Path::from_repr(child))
                    } else if object == ObjectKind::Dir {
                        FoldEvent::Dir(Path::from_repr(child))
                    } else {
                        FoldEvent::File(Path::from_repr(child))
                    };
                    // Links are leaves here; this walker reports them
                    // without walking through them.
                    acc = f(acc, start.clone(), event).await?;
                }
                _ => {
                    let child = extend(&rel, Item::File(name));
                    acc = f(acc, start.clone(), FoldEvent::File(Path::from_repr(child))).await?;
                }
            }
        }
        Ok(acc)
    }
    .boxed()
}

/// Fold `f` over every object reachable from `start`, following symlinks.
///
/// Every object is resolved to its real path; the event reports whether
/// that real path was seen earlier in the walk. A directory is descended
/// into only the first time its real path appears, which is what bounds
/// the walk on trees with symlink loops; later sightings are still
/// reported, with `already_seen` set.
pub async fn fold_follows_links<Acc, F, Fut>(
    start: &AbsDir,
    init: Acc,
    mut f: F,
) -> Result<Acc, Error>
where
    Acc: Send,
    F: FnMut(Acc, FollowEvent) -> Fut + Send,
    Fut: Future<Output = Result<Acc, Error>> + Send,
{
    if exists(start).await != Tri::Yes {
        return Err(ErrorImpl::NotFound {
            path: start.to_string(),
        })?;
    }
    let mut visited = PathSet::new();
    let mut real_seen = PathSet::new();

    let real = real_dir(os_path(start.repr())).await?;
    let dot = Repr::Item(Item::Dot);
    let mut acc = f(
        init,
        FollowEvent::Dir {
            path: RelDir::dot(),
            real: real.clone(),
            already_seen: false,
        },
    )
    .await?;
    visited.insert(&dot);
    real_seen.insert(real.repr());

    acc = walk_follow(start, dot, acc, &mut f, &mut visited, &mut real_seen).await?;
    Ok(acc)
}

fn walk_follow<'a, Acc, F, Fut>(
    start: &'a AbsDir,
    rel: Repr,
    acc: Acc,
    f: &'a mut F,
    visited: &'a mut PathSet,
    real_seen: &'a mut PathSet,
) -> BoxFuture<'a, Result<Acc, Error>>
where
    Acc: Send + 'a,
    F: FnMut(Acc, FollowEvent) -> Fut + Send,
    Fut: Future<Output = Result<Acc, Error>> + Send + 'a,
{
    async move {
        let dir_os = os_under(start, &rel);
        let mut acc = acc;
        for entry in list_dir(&dir_os).await? {
            let name = decode_entry_name(&dir_os, &entry)?;
            let basename = name.clone();
            let entry_os = dir_os.join(name.as_str());
            let item = match entry_kind(&entry_os).await? {
                FileKind::Directory => Item::Dir(name),
                FileKind::Symlink => reify(&dir_os, name).await?,
                _ => Item::File(name),
            };
            let object = item.object();
            let broken = matches!(item, Item::BrokenLink { .. });
            let child = extend(&rel, item);
            if visited.contains(&child) {
                continue;
            }

            if broken {
                // The target cannot be resolved, but its directory can:
                // the real path of a dangling link is its parent's real
                // path plus its own name.
                let real = real_dir(dir_os.clone()).await?.concat(&RelFile::file(basename));
                let already_seen = real_seen.contains(real.repr());
                let event = FollowEvent::BrokenLink {
                    path: Path::from_repr(child.clone()),
                    real: real.clone(),
                    already_seen,
                };
                acc = f(acc, event).await?;
                visited.insert(&child);
                real_seen.insert(real.repr());
            } else if object == ObjectKind::Dir {
                let real = real_dir(entry_os.clone()).await?;
                let already_seen = real_seen.contains(real.repr());
                let event = FollowEvent::Dir {
                    path: Path::from_repr(child.clone()),
                    real: real.clone(),
                    already_seen,
                };
                acc = f(acc, event).await?;
                visited.insert(&child);
                real_seen.insert(real.repr());
                if !already_seen {
                    acc = walk_follow(start, child, acc, f, visited, real_seen).await?;
                }
            } else {
                let real = real_file(entry_os.clone()).await?;
                let already_seen = real_seen.contains(real.repr());
                let event = FollowEvent::File {
                    path: Path::from_repr(child.clone()),
                    real: real.clone(),
                    already_seen,
                };
                acc = f(acc, event).await?;
                visited.insert(&child);
                real_seen.insert(real.repr());
            }
        }
        Ok(acc)
    }
    .boxed()
}

/// Turn an on-disk symlink entry into a typed item: a live target becomes
/// a link item typed by what the target resolves to, a dead one becomes a
/// broken-link item keeping the raw target pieces.
async fn reify(dir_os: &OsPath, name: Name) -> Result<Item, Error> {
    let entry = dir_os.join(name.as_str());

    let target_os = {
        let entry = entry.clone();
        unblock(move || syscalls::readlink(&entry)).await
    }
    .map_err(|err| ErrorImpl::OsError {
        operation: "read symlink".into(),
        source: err,
    })?;
    let target_text = target_os.into_string().map_err(|_| ErrorImpl::OsError {
        operation: "decode symlink target".into(),
        source: syscalls::Error::new(
            "decode symlink target",
            entry.clone(),
            io::Error::from_raw_os_error(libc::EILSEQ),
        ),
    })?;

    let resolved = {
        let entry = entry.clone();
        unblock(move || syscalls::stat(&entry)).await
    };
    match resolved {
        Ok(file_type) => {
            let target = if FileKind::from(file_type) == FileKind::Directory {
                AnyAnchor::<Dir>::parse(&target_text).map(AnyAnchor::into_repr)
            } else {
                AnyAnchor::<File>::parse(&target_text).map(AnyAnchor::into_repr)
            }
            .with_wrap(|| {
                format!(
                    "reify symlink {} -> {target_text}",
                    entry.display()
                )
            })?;
            Ok(Item::Link {
                name,
                target: Box::new(target),
            })
        }
        Err(err) => match err.errno() {
            // Dangling, or looping back into itself: a broken link.
            Some(libc::ENOENT | libc::ENOTDIR | libc::ELOOP) => Ok(Item::BrokenLink {
                name,
                target: target_text.split('/').map(String::from).collect(),
            }),
            _ => Err(ErrorImpl::OsError {
                operation: "stat symlink target".into(),
                source: err,
            })?,
        },
    }
}

/// Append one item to a logical path, treating the starting `.` as empty.
fn extend(rel: &Repr, item: Item) -> Repr {
    match rel {
        Repr::Item(Item::Dot) => Repr::Item(item),
        rel => rel.concat(&Repr::Item(item)),
    }
}

/// The on-disk location of a logical path under the walk's start.
fn os_under(start: &AbsDir, rel: &Repr) -> PathBuf {
    match rel {
        Repr::Item(Item::Dot) => os_path(start.repr()),
        rel => os_path(start.repr()).join(rel.to_string()),
    }
}

async fn list_dir(dir_os: &OsPath) -> Result<Vec<std::ffi::OsString>, Error> {
    let dir = dir_os.to_path_buf();
    unblock(move || syscalls::read_dir(&dir))
        .await
        .map_err(|err| {
            ErrorImpl::OsError {
                operation: "list directory".into(),
                source: err,
            }
            .into()
        })
}

fn decode_entry_name(dir_os: &OsPath, entry: &std::ffi::OsStr) -> Result<Name, Error> {
    let text = entry.to_str().ok_or_else(|| ErrorImpl::OsError {
        operation: "decode directory entry".into(),
        source: syscalls::Error::new(
            "decode directory entry",
            dir_os.join(entry),
            io::Error::from_raw_os_error(libc::EILSEQ),
        ),
    })?;
    Name::new(text).with_wrap(|| format!("directory entry in {}", dir_os.display()))
}

async fn entry_kind(entry_os: &OsPath) -> Result<FileKind, Error> {
    let entry = entry_os.to_path_buf();
    let file_type = unblock(move || syscalls::lstat(&entry))
        .await
        .map_err(|err| ErrorImpl::OsError {
            operation: "lstat directory entry".into(),
            source: err,
        })?;
    Ok(file_type.into())
}

async fn real_dir(os: PathBuf) -> Result<AbsDir, Error> {
    parse_real(realpath(os).await?)
}

async fn real_file(os: PathBuf) -> Result<AbsFile, Error> {
    parse_real(realpath(os).await?)
}

async fn realpath(os: PathBuf) -> Result<PathBuf, Error> {
    unblock(move || syscalls::realpath(&os))
        .await
        .map_err(|err| {
            ErrorImpl::OsError {
                operation: "resolve real path".into(),
                source: err,
            }
            .into()
        })
}

fn parse_real<P: std::str::FromStr<Err = Error>>(real: PathBuf) -> Result<P, Error> {
    let text = real.to_str().ok_or_else(|| ErrorImpl::OsError {
        operation: "decode real path".into(),
        source: syscalls::Error::new(
            "decode real path",
            real.clone(),
            io::Error::from_raw_os_error(libc::EILSEQ),
        ),
    })?;
    text.parse()
        .with_wrap(|| format!("canonical path {text:?}"))
}

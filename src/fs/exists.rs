// SPDX-License-Identifier: MPL-2.0 OR LGPL-3.0-or-later
/*
 * kindpath: statically-kinded paths and cycle-safe filesystem walks
 * Copyright (C) 2025-2026 kindpath contributors
 */

#![forbid(unsafe_code)]

//! The tri-valued existence oracle.

use crate::{
    fs::{cursor::CursorSet, os_path, probe, FileKind, Probe, Resolve, Tri},
    kind::{Abs, Object, Rel},
    path::{AbsDir, Path},
    repr::{Item, Repr},
};

use std::path::PathBuf;

use futures::future::{BoxFuture, FutureExt};
use tracing::trace;

/// Does the object this path names exist, with every component meaning
/// exactly what it says?
///
/// Every item of the term is checked against the filesystem literally: a
/// [`Dir`](crate::Dir)-kinded component must be a real directory (a symlink
/// to one does not count), a link component must be a symlink whose target
/// term also exists, and a broken-link component must be a symlink whose
/// target does *not* resolve. I/O failures never escape; a probe the OS
/// refuses to answer makes the result [`Tri::Unknown`].
///
/// Terms that mirror looping symlink structures are fine: the walk carries
/// a cursor set and answers [`Tri::Yes`] when it comes back around to a
/// step it has already verified.
pub async fn exists<O: Object>(path: &Path<Abs, O>) -> Tri {
    let mut cursors = CursorSet::new();
    exists_abs(path.repr().clone(), &mut cursors).await
}

/// Search `dirs` for the first directory under which `item` exists.
pub async fn find_item<O: Object>(item: &Path<Rel, O>, dirs: &[AbsDir]) -> Option<AbsDir> {
    for dir in dirs {
        if exists(&dir.concat(item)).await == Tri::Yes {
            return Some(dir.clone());
        }
    }
    None
}

/// Walk an absolute term. Also the restart point for absolute link
/// targets, which is why the cursor set comes from outside.
fn exists_abs(path: Repr, cursors: &mut CursorSet) -> BoxFuture<'_, Tri> {
    async move {
        let root = match probe(PathBuf::from("/"), Resolve::NoFollow).await {
            Probe::Found(FileKind::Directory) => Tri::Yes,
            Probe::Found(_) | Probe::Missing => Tri::No,
            Probe::Unknown => Tri::Unknown,
        };
        if root != Tri::Yes {
            return root;
        }
        match path {
            Repr::Item(Item::Root) => Tri::Yes,
            Repr::Cons(Item::Root, rest) => {
                exists_rel(Repr::Item(Item::Root), *rest, cursors).await
            }
            // A relative term cannot reach here through the typed API.
            _ => Tri::No,
        }
    }
    .boxed()
}

/// Walk a relative term against the already-verified directory `prefix`.
/// `prefix` is always resolved: it contains no links, so printing it gives
/// the on-disk location to probe under.
fn exists_rel(prefix: Repr, rel: Repr, cursors: &mut CursorSet) -> BoxFuture<'_, Tri> {
    async move {
        if !cursors.insert(&prefix, &rel) {
            // This exact cursor has been walked before; going around again
            // cannot change the answer.
            trace!(prefix = %prefix, rel = %rel, "cursor revisited, cutting the loop");
            return Tri::Yes;
        }

        let (head, rest) = match rel {
            Repr::Item(item) => (item, None),
            Repr::Cons(head, tail) => (head, Some(*tail)),
        };

        match head {
            // The prefix is known to exist, so `.` holds trivially.
            Item::Dot => match rest {
                None => Tri::Yes,
                Some(rest) => exists_rel(prefix, rest, cursors).await,
            },

            // The parent of an existing directory exists; no probe needed.
            Item::Dotdot => {
                let parent = prefix.parent().normalize();
                match rest {
                    None => Tri::Yes,
                    Some(rest) => exists_rel(parent, rest, cursors).await,
                }
            }

            Item::Dir(name) => {
                let entry = os_path(&prefix).join(name.as_str());
                let step = match probe(entry, Resolve::NoFollow).await {
                    Probe::Found(FileKind::Directory) => Tri::Yes,
                    Probe::Found(_) | Probe::Missing => Tri::No,
                    Probe::Unknown => Tri::Unknown,
                };
                if step != Tri::Yes {
                    return step;
                }
                match rest {
                    None => Tri::Yes,
                    Some(rest) => {
                        let prefix = prefix.concat(&Repr::Item(Item::Dir(name)));
                        exists_rel(prefix, rest, cursors).await
                    }
                }
            }

            // A file item is a tail by construction: anything that is not a
            // directory and not a symlink satisfies it.
            Item::File(name) => {
                let entry = os_path(&prefix).join(name.as_str());
                match probe(entry, Resolve::NoFollow).await {
                    Probe::Found(FileKind::Directory | FileKind::Symlink) => Tri::No,
                    Probe::Found(_) => Tri::Yes,
                    Probe::Missing => Tri::No,
                    Probe::Unknown => Tri::Unknown,
                }
            }

            Item::Link { name, target } => {
                let entry = os_path(&prefix).join(name.as_str());
                let step = match probe(entry, Resolve::NoFollow).await {
                    Probe::Found(FileKind::Symlink) => Tri::Yes,
                    Probe::Found(_) | Probe::Missing => Tri::No,
                    Probe::Unknown => Tri::Unknown,
                };
                if step != Tri::Yes {
                    return step;
                }
                // The rest of the walk happens where the target points: the
                // target splices in front of the remaining path, restarting
                // from the root if it is absolute.
                let continued = match rest {
                    None => *target,
                    Some(rest) => target.concat(&rest),
                };
                if continued.is_absolute() {
                    exists_abs(continued, cursors).await
                } else {
                    exists_rel(prefix, continued, cursors).await
                }
            }

            Item::BrokenLink { name, target } => {
                if rest.is_some() {
                    // Only ever a tail; a malformed term cannot exist.
                    return Tri::No;
                }
                let entry = os_path(&prefix).join(name.as_str());
                let step = match probe(entry, Resolve::NoFollow).await {
                    Probe::Found(FileKind::Symlink) => Tri::Yes,
                    Probe::Found(_) | Probe::Missing => Tri::No,
                    Probe::Unknown => Tri::Unknown,
                };
                if step != Tri::Yes {
                    return step;
                }
                // Broken means the recorded target must NOT resolve.
                let target_text = target.join("/");
                let target_path = if target_text.starts_with('/') {
                    PathBuf::from(&target_text)
                } else {
                    os_path(&prefix).join(&target_text)
                };
                let target_exists = match probe(target_path, Resolve::Follow).await {
                    Probe::Found(_) => Tri::Yes,
                    Probe::Missing => Tri::No,
                    Probe::Unknown => Tri::Unknown,
                };
                target_exists.negate()
            }

            // Root may only be a head, which exists_abs consumed.
            Item::Root => Tri::No,
        }
    }
    .boxed()
}

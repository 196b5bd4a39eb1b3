// SPDX-License-Identifier: MPL-2.0 OR LGPL-3.0-or-later
/*
 * kindpath: statically-kinded paths and cycle-safe filesystem walks
 * Copyright (C) 2025-2026 kindpath contributors
 */

#![forbid(unsafe_code)]

//! Recursive directory materialization.

use crate::{
    error::{Error, ErrorImpl},
    fs::{cursor::CursorSet, os_path, probe, unblock, Probe, Resolve},
    path::AbsDir,
    repr::{Item, Repr},
    syscalls,
};

use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, trace};

/// Create every directory level of `path`, including the symlinks the term
/// declares.
///
/// The walk materializes one item at a time: a directory level that already
/// exists is skipped (re-running `mkdir` over an existing tree succeeds), a
/// missing one is created with a single-level `mkdir(2)`, and a link item
/// creates the symlink and then carries on *through* it, so a term may
/// declare a link and the tree behind it in one go. Creating a symlink
/// where something already exists is a failure; the driver does not try to
/// check whether an existing link happens to match.
///
/// Side effects of a failed or cancelled call are not undone.
pub async fn mkdir(path: &AbsDir) -> Result<(), Error> {
    let mut cursors = CursorSet::new();
    match path.repr().clone() {
        Repr::Item(Item::Root) => Ok(()),
        Repr::Cons(Item::Root, rest) => {
            mkdir_rel(Repr::Item(Item::Root), *rest, &mut cursors).await
        }
        // Unreachable through the typed API.
        repr => Err(ErrorImpl::InvalidPath {
            description: format!("mkdir of non-absolute term {repr}").into(),
        })?,
    }
}

/// Materialize a relative term under the existing directory `prefix`.
fn mkdir_rel(prefix: Repr, rel: Repr, cursors: &mut CursorSet) -> BoxFuture<'_, Result<(), Error>> {
    async move {
        if !cursors.insert(&prefix, &rel) {
            // Looping symlink structure; everything from here on has
            // already been materialized.
            trace!(prefix = %prefix, rel = %rel, "cursor revisited, cutting the loop");
            return Ok(());
        }

        let (head, rest) = match rel {
            Repr::Item(item) => (item, None),
            Repr::Cons(head, tail) => (head, Some(*tail)),
        };

        match head {
            Item::Dot => match rest {
                None => Ok(()),
                Some(rest) => mkdir_rel(prefix, rest, cursors).await,
            },

            Item::Dotdot => {
                let parent = prefix.parent().normalize();
                match rest {
                    None => Ok(()),
                    Some(rest) => mkdir_rel(parent, rest, cursors).await,
                }
            }

            Item::Dir(name) => {
                let entry = os_path(&prefix).join(name.as_str());
                match probe(entry.clone(), Resolve::Follow).await {
                    Probe::Found(_) => {
                        trace!(path = %entry.display(), "directory level already present");
                    }
                    // On Unknown we still try; the syscall will report the
                    // real problem if there is one.
                    Probe::Missing | Probe::Unknown => {
                        let made = entry.clone();
                        unblock(move || syscalls::mkdir(&made)).await.map_err(
                            |err| ErrorImpl::OsError {
                                operation: "create directory level".into(),
                                source: err,
                            },
                        )?;
                        debug!(path = %entry.display(), "created directory");
                    }
                }
                match rest {
                    None => Ok(()),
                    Some(rest) => {
                        let prefix = prefix.concat(&Repr::Item(Item::Dir(name)));
                        mkdir_rel(prefix, rest, cursors).await
                    }
                }
            }

            Item::Link { name, target } => {
                let entry = os_path(&prefix).join(name.as_str());
                let target_text = target.to_string();
                let link = entry.clone();
                let text = target_text.clone();
                unblock(move || syscalls::symlink(&text, &link))
                    .await
                    .map_err(|err| ErrorImpl::OsError {
                        operation: "create declared symlink".into(),
                        source: err,
                    })?;
                debug!(path = %entry.display(), target = %target_text, "created symlink");

                // Carry on where the target points, with the remaining
                // levels spliced behind it.
                let continued = match rest {
                    None => *target,
                    Some(rest) => target.concat(&rest),
                };
                match continued {
                    Repr::Item(Item::Root) => Ok(()),
                    Repr::Cons(Item::Root, rest) => {
                        mkdir_rel(Repr::Item(Item::Root), *rest, cursors).await
                    }
                    continued => mkdir_rel(prefix, continued, cursors).await,
                }
            }

            // A directory path cannot contain these; unreachable through
            // the typed API.
            item @ (Item::Root | Item::File(_) | Item::BrokenLink { .. }) => {
                Err(ErrorImpl::InvalidPath {
                    description: format!("mkdir over non-directory item {:?}", item).into(),
                })?
            }
        }
    }
    .boxed()
}

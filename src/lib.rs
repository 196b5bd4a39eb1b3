// SPDX-License-Identifier: MPL-2.0 OR LGPL-3.0-or-later
/*
 * kindpath: statically-kinded paths and cycle-safe filesystem walks
 * Copyright (C) 2025-2026 kindpath contributors
 */

//! kindpath is a path algebra whose paths know, at the type level, whether
//! they are absolute or relative and whether they name a directory or a
//! file, plus a small set of filesystem operations that exploit that
//! structure to stay safe around symlinks and symlink loops.
//!
//! # Paths
//!
//! The four path types are [`AbsDir`], [`AbsFile`], [`RelDir`] and
//! [`RelFile`] — instances of one generic [`Path`] with two phantom
//! attributes, the *anchor* and the *object*. Construction goes through
//! the string parsers ([`abs_dir`] and friends), through composition
//! ([`Path::concat`], [`Path::parent`]), or through the single-item
//! constructors; each of them guarantees the structural invariants, so an
//! ill-kinded path (a file in the middle of a directory chain, a `/` in
//! the middle of a relative path) is unrepresentable.
//!
//! ```
//! use kindpath::{abs_dir, rel_dir};
//!
//! # fn main() -> Result<(), kindpath::error::Error> {
//! let tree = abs_dir("/srv/data")?.concat(&rel_dir("a/./b/../c")?);
//! assert_eq!(tree.normalize().to_string(), "/srv/data/a/c");
//! # Ok(())
//! # }
//! ```
//!
//! A path may also contain *link* items carrying the full path term their
//! on-disk symlink points at, which is what lets the filesystem layer walk
//! symlinked trees without ever being surprised by one.
//!
//! # Filesystem operations
//!
//! The [`fs`] module provides an existence oracle returning three-valued
//! answers ([`fs::exists`]), a directory materializer ([`fs::mkdir`]), and
//! two tree folds ([`fs::fold`], [`fs::fold_follows_links`]). All of them
//! are async: blocking syscalls run on the runtime's blocking pool and the
//! walkers suspend between steps. All of them are cycle-safe: recursion is
//! bounded by per-invocation sets of already-visited steps rather than by
//! luck.

// The filesystem layer speaks POSIX.
#![cfg(unix)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(clippy::all)]
#![deny(missing_debug_implementations)]

mod elems;
mod kind;
mod name;
mod path;
mod repr;
mod sexp;
mod syscalls;

pub mod error;
pub mod fs;

pub use elems::{parse_elems, print_elems, Elem};
pub use kind::{Abs, Anchor, AnchorKind, Dir, File, Object, ObjectKind, Rel};
pub use name::Name;
pub use path::{
    abs_dir, abs_file, rel_dir, rel_file, AbsDir, AbsFile, AnyAnchor, Path, RelDir, RelFile,
};
pub use sexp::Sexp;

// Library tests.
#[cfg(test)]
mod tests;

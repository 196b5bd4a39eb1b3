// SPDX-License-Identifier: MPL-2.0 OR LGPL-3.0-or-later
/*
 * kindpath: statically-kinded paths and cycle-safe filesystem walks
 * Copyright (C) 2025-2026 kindpath contributors
 */

#![forbid(unsafe_code)]

//! Statically-kinded path terms.
//!
//! [`Path<A, O>`] is a thin phantom-typed wrapper around the untyped term
//! representation. The four inhabited combinations have aliases:
//! [`AbsDir`], [`AbsFile`], [`RelDir`], [`RelFile`]. Operations that change
//! a kind attribute say so in their signature ([`Path::parent`] always
//! yields a directory, [`Path::concat`] takes the anchor from the left and
//! the object from the right), so a well-typed composition of paths cannot
//! produce an ill-formed term.
//!
//! ```
//! use kindpath::{abs_dir, rel_file};
//!
//! # fn main() -> Result<(), kindpath::error::Error> {
//! let etc = abs_dir("/etc")?;
//! let passwd = etc.concat(&rel_file("ssl/cert.pem")?);
//! assert_eq!(passwd.to_string(), "/etc/ssl/cert.pem");
//! assert!(passwd.parent().equal(&abs_dir("/etc/ssl")?));
//! # Ok(())
//! # }
//! ```

use crate::{
    elems::{parse_elems, Elem},
    error::{Error, ErrorImpl},
    kind::{Abs, Anchor, AnchorKind, Dir, File, Object, ObjectKind, Rel},
    name::Name,
    repr::{dir_of_elems, file_of_elems, Item, Repr},
    sexp::Sexp,
};

use std::{fmt, hash, marker::PhantomData, str::FromStr};

use static_assertions::assert_impl_all;

/// A path term tagged with its anchor `A` and object `O`.
pub struct Path<A, O> {
    repr: Repr,
    _kind: PhantomData<fn() -> (A, O)>,
}

/// An absolute path to a directory.
pub type AbsDir = Path<Abs, Dir>;
/// An absolute path to a file.
pub type AbsFile = Path<Abs, File>;
/// A relative path to a directory.
pub type RelDir = Path<Rel, Dir>;
/// A relative path to a file.
pub type RelFile = Path<Rel, File>;

assert_impl_all!(AbsDir: Send, Sync, Clone);
assert_impl_all!(RelFile: Send, Sync, Clone);

impl<A, O> Clone for Path<A, O> {
    fn clone(&self) -> Self {
        Self {
            repr: self.repr.clone(),
            _kind: PhantomData,
        }
    }
}

impl<A, O> fmt::Debug for Path<A, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Path").field(&self.to_string()).finish()
    }
}

// Structural equality; the normalizing equivalence is `Path::equal`.
impl<A, O> PartialEq for Path<A, O> {
    fn eq(&self, other: &Self) -> bool {
        self.repr == other.repr
    }
}

impl<A, O> Eq for Path<A, O> {}

impl<A, O> hash::Hash for Path<A, O> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.repr.hash(state);
    }
}

impl<A, O> fmt::Display for Path<A, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.repr.fmt(f)
    }
}

impl<A: Anchor, O: Object> Path<A, O> {
    pub(crate) fn from_repr(repr: Repr) -> Self {
        debug_assert_eq!(repr.anchor(), A::KIND);
        debug_assert_eq!(repr.object(), O::KIND);
        Self {
            repr,
            _kind: PhantomData,
        }
    }

    pub(crate) fn repr(&self) -> &Repr {
        &self.repr
    }

    /// Build a path of this kind from parsed elems.
    pub fn from_elems(elems: &[Elem]) -> Result<Self, Error> {
        let repr = match O::KIND {
            ObjectKind::Dir => dir_of_elems(elems, A::KIND)?,
            ObjectKind::File => file_of_elems(elems, A::KIND)?,
        };
        Ok(Self::from_repr(repr))
    }

    /// The runtime anchor tag; always `A`'s kind.
    pub fn anchor(&self) -> AnchorKind {
        A::KIND
    }

    /// The runtime object tag; always `O`'s kind.
    pub fn object(&self) -> ObjectKind {
        O::KIND
    }

    /// Erase the static anchor into its runtime discrimination.
    pub fn kind(&self) -> AnyAnchor<O> {
        match A::KIND {
            AnchorKind::Abs => AnyAnchor::Abs(Path::from_repr(self.repr.clone())),
            AnchorKind::Rel => AnyAnchor::Rel(Path::from_repr(self.repr.clone())),
        }
    }

    /// Collapse `.` components and `name/..` pairs.
    ///
    /// Normalization never consults the filesystem, so it deliberately does
    /// not fold `..` over a link (the link target may point elsewhere);
    /// links are opaque single components here, exactly like plain names.
    pub fn normalize(&self) -> Self {
        Self::from_repr(self.repr.normalize())
    }

    /// Whether [`Path::normalize`] has nothing left to do: no `.` except as
    /// the whole path, and `..` only in a leading run.
    pub fn is_normalized(&self) -> bool {
        self.repr.is_normalized()
    }

    /// Whether any component of this path is a link. Link targets are not
    /// searched.
    pub fn has_link(&self) -> bool {
        self.repr.has_link()
    }

    /// Do the two paths name the same object? This is equality of
    /// normalized forms; link targets are compared structurally.
    pub fn equal(&self, other: &Self) -> bool {
        self.repr.equal(&other.repr)
    }

    /// The directory containing the object this path names. Total: the
    /// parent of `/` is `/`, and the parent of `.` or `..` ascends further.
    pub fn parent(&self) -> Path<A, Dir> {
        Path::from_repr(self.repr.parent())
    }

    /// The components of this path as they would print. The head of an
    /// absolute path is `"/"`; links print as their name.
    pub fn to_list(&self) -> Vec<String> {
        self.to_elems()
            .iter()
            .map(|elem| elem.as_str().to_owned())
            .collect()
    }

    /// The components of this path as elems. Inverse of
    /// [`Path::from_elems`] for link-free paths.
    pub fn to_elems(&self) -> Vec<Elem> {
        self.repr.to_elems()
    }

    /// The canonical serialized form of this path.
    pub fn to_sexp(&self) -> Sexp {
        self.repr.to_sexp()
    }

    /// Decode a serialized path, checking it against this kind.
    pub fn from_sexp(sexp: &Sexp) -> Result<Self, Error> {
        let repr = Repr::of_sexp(sexp)?;
        if repr.anchor() != A::KIND {
            return Err(ErrorImpl::AnchorMismatch {
                path: repr.to_string(),
                expected: A::KIND,
            })?;
        }
        if repr.object() != O::KIND {
            return Err(ErrorImpl::ObjectMismatch {
                path: repr.to_string(),
                tail: repr.object().to_string().into(),
            })?;
        }
        Ok(Self::from_repr(repr))
    }
}

impl<A: Anchor> Path<A, Dir> {
    /// Append a relative path, keeping this path's anchor and taking the
    /// appended path's object.
    pub fn concat<O: Object>(&self, rel: &Path<Rel, O>) -> Path<A, O> {
        Path::from_repr(self.repr.concat(&rel.repr))
    }
}

impl<O: Object> Path<Abs, O> {
    /// Inline every link target, yielding an equivalent link-free path.
    pub fn resolve(&self) -> Self {
        Self::from_repr(self.repr.resolve())
    }
}

impl AbsDir {
    /// The filesystem root, `/`.
    pub fn root() -> Self {
        Self::from_repr(Repr::Item(Item::Root))
    }
}

impl RelDir {
    /// The current directory, `.`.
    pub fn dot() -> Self {
        Self::from_repr(Repr::Item(Item::Dot))
    }

    /// The parent directory, `..`.
    pub fn dotdot() -> Self {
        Self::from_repr(Repr::Item(Item::Dotdot))
    }

    /// A single named directory component.
    pub fn dir(name: Name) -> Self {
        Self::from_repr(Repr::Item(Item::Dir(name)))
    }
}

impl RelFile {
    /// A single named file component.
    pub fn file(name: Name) -> Self {
        Self::from_repr(Repr::Item(Item::File(name)))
    }

    /// A symlink known to dangle, keeping the raw pieces of its target
    /// text.
    pub fn broken_link(name: Name, target: Vec<String>) -> Self {
        Self::from_repr(Repr::Item(Item::BrokenLink { name, target }))
    }
}

impl<O: Object> Path<Rel, O> {
    /// A single symlink component pointing at `target`. The link's object
    /// is its target's object; the target may have either anchor.
    pub fn link(name: Name, target: AnyAnchor<O>) -> Self {
        Self::from_repr(Repr::Item(Item::Link {
            name,
            target: Box::new(target.into_repr()),
        }))
    }
}

impl<A: Anchor, O: Object> FromStr for Path<A, O> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_elems(&parse_elems(s)?)
    }
}

/// Parse an absolute directory path.
pub fn abs_dir(path: &str) -> Result<AbsDir, Error> {
    path.parse()
}

/// Parse a relative directory path.
pub fn rel_dir(path: &str) -> Result<RelDir, Error> {
    path.parse()
}

/// Parse an absolute file path.
pub fn abs_file(path: &str) -> Result<AbsFile, Error> {
    path.parse()
}

/// Parse a relative file path.
pub fn rel_file(path: &str) -> Result<RelFile, Error> {
    path.parse()
}

/// A path whose object is statically known but whose anchor is not.
///
/// This is what parsing produces when the source of a path string (a
/// symlink target, say) determines the object but not the anchor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AnyAnchor<O: Object> {
    Abs(Path<Abs, O>),
    Rel(Path<Rel, O>),
}

impl<O: Object> AnyAnchor<O> {
    /// Parse a path string of either anchor.
    pub fn parse(path: &str) -> Result<Self, Error> {
        let elems = parse_elems(path)?;
        match elems.first() {
            Some(Elem::Root) => Path::from_elems(&elems).map(AnyAnchor::Abs),
            _ => Path::from_elems(&elems).map(AnyAnchor::Rel),
        }
    }

    /// The runtime anchor tag of the wrapped path.
    pub fn anchor(&self) -> AnchorKind {
        match self {
            AnyAnchor::Abs(_) => AnchorKind::Abs,
            AnyAnchor::Rel(_) => AnchorKind::Rel,
        }
    }

    /// The canonical serialized form of the wrapped path.
    pub fn to_sexp(&self) -> Sexp {
        match self {
            AnyAnchor::Abs(path) => path.to_sexp(),
            AnyAnchor::Rel(path) => path.to_sexp(),
        }
    }

    /// Decode a serialized path of either anchor, checking the object.
    pub fn from_sexp(sexp: &Sexp) -> Result<Self, Error> {
        let repr = Repr::of_sexp(sexp)?;
        if repr.object() != O::KIND {
            return Err(ErrorImpl::ObjectMismatch {
                path: repr.to_string(),
                tail: repr.object().to_string().into(),
            })?;
        }
        Ok(match repr.anchor() {
            AnchorKind::Abs => AnyAnchor::Abs(Path::from_repr(repr)),
            AnchorKind::Rel => AnyAnchor::Rel(Path::from_repr(repr)),
        })
    }

    pub(crate) fn into_repr(self) -> Repr {
        match self {
            AnyAnchor::Abs(path) => path.repr,
            AnyAnchor::Rel(path) => path.repr,
        }
    }
}

impl<A: Anchor, O: Object> From<Path<A, O>> for AnyAnchor<O> {
    fn from(path: Path<A, O>) -> Self {
        path.kind()
    }
}

impl<O: Object> fmt::Display for AnyAnchor<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyAnchor::Abs(path) => path.fmt(f),
            AnyAnchor::Rel(path) => path.fmt(f),
        }
    }
}

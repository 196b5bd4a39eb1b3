// SPDX-License-Identifier: MPL-2.0 OR LGPL-3.0-or-later
/*
 * kindpath: statically-kinded paths and cycle-safe filesystem walks
 * Copyright (C) 2025-2026 kindpath contributors
 */

#![forbid(unsafe_code)]

//! The untyped path term underneath every [`Path`](crate::Path).
//!
//! A term is a non-empty cons-list of [`Item`]s. Both kind attributes are
//! recoverable from the term itself: a path is absolute exactly when its
//! head is [`Item::Root`], and its object is the object of its tail. The
//! typed wrappers in [`path`](crate::path) only restate these facts in the
//! type system; all the actual algebra lives here.
//!
//! Structural invariants, maintained by every constructor in this module:
//!
//!  * `Root` appears only as the head of a term.
//!  * Every item before the tail has directory object.
//!  * `BrokenLink` appears only as a tail.

use crate::{
    elems::{print_elems, Elem},
    error::{Error, ErrorImpl},
    kind::{AnchorKind, ObjectKind},
    name::Name,
    sexp::Sexp,
};

use std::fmt;

use itertools::Itertools;

/// One step of a path term.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Item {
    /// The filesystem root. Absolute anchor, directory object.
    Root,
    /// A named directory.
    Dir(Name),
    /// A named file.
    File(Name),
    /// A named symlink together with the full term it points at. The link's
    /// object is its target's object.
    Link { name: Name, target: Box<Repr> },
    /// The current directory.
    Dot,
    /// The parent directory.
    Dotdot,
    /// A symlink whose target does not exist; the target is kept as the raw
    /// `/`-split pieces of the link text. File object by convention.
    BrokenLink { name: Name, target: Vec<String> },
}

/// A non-empty cons-list of items.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Repr {
    Item(Item),
    Cons(Item, Box<Repr>),
}

impl Item {
    pub(crate) fn object(&self) -> ObjectKind {
        match self {
            Item::Root | Item::Dir(_) | Item::Dot | Item::Dotdot => ObjectKind::Dir,
            Item::File(_) | Item::BrokenLink { .. } => ObjectKind::File,
            Item::Link { target, .. } => target.object(),
        }
    }

    /// The string form of this item as a path component.
    fn as_str(&self) -> &str {
        match self {
            Item::Root => "/",
            Item::Dot => ".",
            Item::Dotdot => "..",
            Item::Dir(name) | Item::File(name) => name.as_str(),
            Item::Link { name, .. } | Item::BrokenLink { name, .. } => name.as_str(),
        }
    }

    fn to_sexp(&self) -> Sexp {
        match self {
            Item::Root => Sexp::atom("Root"),
            Item::Dot => Sexp::atom("Dot"),
            Item::Dotdot => Sexp::atom("Dotdot"),
            Item::Dir(name) => Sexp::list([Sexp::atom("Dir"), Sexp::atom(name.as_str())]),
            Item::File(name) => Sexp::list([Sexp::atom("File"), Sexp::atom(name.as_str())]),
            Item::Link { name, target } => Sexp::list([
                Sexp::atom("Link"),
                Sexp::atom(name.as_str()),
                target.to_sexp(),
            ]),
            Item::BrokenLink { name, target } => Sexp::list([
                Sexp::atom("BrokenLink"),
                Sexp::atom(name.as_str()),
                Sexp::list(target.iter().map(|part| Sexp::atom(part.as_str()))),
            ]),
        }
    }

    fn of_sexp(sexp: &Sexp) -> Result<Self, Error> {
        match sexp {
            Sexp::Atom(atom) => match atom.as_str() {
                "Root" => Ok(Item::Root),
                "Dot" => Ok(Item::Dot),
                "Dotdot" => Ok(Item::Dotdot),
                atom => Err(decode_error(format!("unknown item atom {atom:?}"))),
            },
            Sexp::List(items) => match items.as_slice() {
                [Sexp::Atom(tag), Sexp::Atom(name)] if tag == "Dir" => {
                    Ok(Item::Dir(Name::new(name.as_str())?))
                }
                [Sexp::Atom(tag), Sexp::Atom(name)] if tag == "File" => {
                    Ok(Item::File(Name::new(name.as_str())?))
                }
                [Sexp::Atom(tag), Sexp::Atom(name), target] if tag == "Link" => Ok(Item::Link {
                    name: Name::new(name.as_str())?,
                    target: Box::new(Repr::of_sexp(target)?),
                }),
                [Sexp::Atom(tag), Sexp::Atom(name), Sexp::List(parts)] if tag == "BrokenLink" => {
                    let target = parts
                        .iter()
                        .map(|part| match part {
                            Sexp::Atom(part) => Ok(part.clone()),
                            Sexp::List(_) => {
                                Err(decode_error("broken-link target piece is not an atom"))
                            }
                        })
                        .collect::<Result<_, _>>()?;
                    Ok(Item::BrokenLink {
                        name: Name::new(name.as_str())?,
                        target,
                    })
                }
                _ => Err(decode_error(format!("unknown item shape {sexp}"))),
            },
        }
    }
}

fn decode_error(what: impl Into<String>) -> Error {
    ErrorImpl::InvalidPath {
        description: format!("serialized path: {}", what.into()).into(),
    }
    .into()
}

/// Iterator over the items of a term, head first.
pub(crate) struct Items<'a>(Option<&'a Repr>);

impl<'a> Iterator for Items<'a> {
    type Item = &'a Item;

    fn next(&mut self) -> Option<Self::Item> {
        match self.0.take() {
            None => None,
            Some(Repr::Item(item)) => Some(item),
            Some(Repr::Cons(head, tail)) => {
                self.0 = Some(tail);
                Some(head)
            }
        }
    }
}

impl Repr {
    /// The head item and the rest of the term, if any.
    pub(crate) fn split(&self) -> (&Item, Option<&Repr>) {
        match self {
            Repr::Item(item) => (item, None),
            Repr::Cons(head, tail) => (head, Some(tail)),
        }
    }

    pub(crate) fn items(&self) -> Items<'_> {
        Items(Some(self))
    }

    pub(crate) fn is_absolute(&self) -> bool {
        matches!(self.split().0, Item::Root)
    }

    pub(crate) fn anchor(&self) -> AnchorKind {
        if self.is_absolute() {
            AnchorKind::Abs
        } else {
            AnchorKind::Rel
        }
    }

    pub(crate) fn object(&self) -> ObjectKind {
        match self {
            Repr::Item(item) => item.object(),
            Repr::Cons(_, tail) => tail.object(),
        }
    }

    /// Any item of this term is a link. Link targets are not searched; a
    /// term with links only inside a target is itself link-free.
    pub(crate) fn has_link(&self) -> bool {
        self.items().any(|item| matches!(item, Item::Link { .. }))
    }

    /// Append a relative term, keeping this term's anchor and taking the
    /// appended term's object.
    pub(crate) fn concat(&self, rel: &Repr) -> Repr {
        match self {
            Repr::Item(item) => Repr::Cons(item.clone(), Box::new(rel.clone())),
            Repr::Cons(head, tail) => Repr::Cons(head.clone(), Box::new(tail.concat(rel))),
        }
    }

    /// The directory containing the object this term names. Total: the
    /// parent of the root is the root, and the parent of a bare `.` or `..`
    /// ascends one level further.
    pub(crate) fn parent(&self) -> Repr {
        match self {
            Repr::Item(Item::Root) => Repr::Item(Item::Root),
            Repr::Item(Item::Dot | Item::Dotdot) => {
                Repr::Cons(Item::Dotdot, Box::new(Repr::Item(Item::Dotdot)))
            }
            Repr::Item(_) => Repr::Item(Item::Dot),
            Repr::Cons(head, tail) => Repr::Cons(head.clone(), Box::new(tail.parent())),
        }
    }

    /// Collapse `.` components and `dir/..` pairs, bottom-up.
    pub(crate) fn normalize(&self) -> Repr {
        match self {
            Repr::Item(_) => self.clone(),
            Repr::Cons(head, tail) => rewrite(head.clone(), tail.normalize()),
        }
    }

    /// No `.` other than as the sole item, and `..` only at the head or
    /// after `Root` or another `..`.
    pub(crate) fn is_normalized(&self) -> bool {
        if matches!(self, Repr::Item(_)) {
            return true;
        }
        let mut prev: Option<&Item> = None;
        for item in self.items() {
            match item {
                Item::Dot => return false,
                Item::Dotdot => {
                    if !matches!(prev, None | Some(Item::Root | Item::Dotdot)) {
                        return false;
                    }
                }
                _ => {}
            }
            prev = Some(item);
        }
        true
    }

    /// Inline every link target, yielding a link-free term for the same
    /// object. A link whose target is absolute discards everything resolved
    /// before it.
    pub(crate) fn resolve(&self) -> Repr {
        match self {
            Repr::Item(Item::Link { target, .. }) => target.resolve(),
            Repr::Item(_) => self.clone(),
            Repr::Cons(head, tail) => {
                let rest = tail.resolve();
                if rest.is_absolute() {
                    // A deeper link jumped back to the root; this head can
                    // no longer influence the result.
                    return rest;
                }
                match head {
                    Item::Link { target, .. } => target.resolve().concat(&rest),
                    head => Repr::Cons(head.clone(), Box::new(rest)),
                }
            }
        }
    }

    /// Normalizing equivalence: do the two terms name the same object?
    pub(crate) fn equal(&self, other: &Repr) -> bool {
        self.normalize() == other.normalize()
    }

    pub(crate) fn to_elems(&self) -> Vec<Elem> {
        self.items()
            .map(|item| match item {
                Item::Root => Elem::Root,
                Item::Dot => Elem::Dot,
                Item::Dotdot => Elem::Dotdot,
                Item::Dir(name) | Item::File(name) => Elem::Name(name.clone()),
                Item::Link { name, .. } | Item::BrokenLink { name, .. } => {
                    Elem::Name(name.clone())
                }
            })
            .collect()
    }

    pub(crate) fn to_sexp(&self) -> Sexp {
        match self {
            Repr::Item(item) => Sexp::list([Sexp::atom("Item"), item.to_sexp()]),
            Repr::Cons(head, tail) => {
                Sexp::list([Sexp::atom("Cons"), head.to_sexp(), tail.to_sexp()])
            }
        }
    }

    pub(crate) fn of_sexp(sexp: &Sexp) -> Result<Self, Error> {
        let repr = match sexp {
            Sexp::List(items) => match items.as_slice() {
                [Sexp::Atom(tag), item] if tag == "Item" => Repr::Item(Item::of_sexp(item)?),
                [Sexp::Atom(tag), item, tail] if tag == "Cons" => {
                    Repr::Cons(Item::of_sexp(item)?, Box::new(Repr::of_sexp(tail)?))
                }
                _ => return Err(decode_error(format!("unknown term shape {sexp}"))),
            },
            Sexp::Atom(atom) => {
                return Err(decode_error(format!("expected a term, got atom {atom:?}")))
            }
        };
        repr.validate()?;
        Ok(repr)
    }

    /// Check the structural invariants on a decoded term.
    fn validate(&self) -> Result<(), Error> {
        let mut rest = self;
        let mut at_head = true;
        loop {
            let (item, tail) = rest.split();
            if matches!(item, Item::Root) && !at_head {
                return Err(decode_error("Root may only appear as the head"));
            }
            if tail.is_some() && item.object() != ObjectKind::Dir {
                return Err(decode_error("only the tail may have file object"));
            }
            if let Item::Link { target, .. } = item {
                target.validate()?;
            }
            match tail {
                Some(tail) => {
                    rest = tail;
                    at_head = false;
                }
                None => return Ok(()),
            }
        }
    }
}

fn rewrite(head: Item, tail: Repr) -> Repr {
    match (head, tail) {
        // A trailing `.` names the same object as the directory before it.
        (head, Repr::Item(Item::Dot)) => Repr::Item(head),
        (Item::Dot, tail) => tail,
        (Item::Root, Repr::Item(Item::Dotdot)) => Repr::Item(Item::Root),
        (Item::Root, Repr::Cons(Item::Dotdot, rest)) => rewrite(Item::Root, *rest),
        (Item::Dotdot, tail @ (Repr::Item(Item::Dotdot) | Repr::Cons(Item::Dotdot, _))) => {
            Repr::Cons(Item::Dotdot, Box::new(tail))
        }
        (Item::Dir(_) | Item::Link { .. }, Repr::Item(Item::Dotdot)) => Repr::Item(Item::Dot),
        (Item::Dir(_) | Item::Link { .. }, Repr::Cons(Item::Dotdot, rest)) => *rest,
        (head, tail) => Repr::Cons(head, Box::new(tail)),
    }
}

impl fmt::Display for Repr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repr::Item(Item::Root) => f.write_str("/"),
            Repr::Cons(Item::Root, rest) => write!(f, "/{rest}"),
            repr => f.write_str(&repr.items().map(Item::as_str).join("/")),
        }
    }
}

/// Strip and check the anchor, returning the relative elems.
fn split_anchor<'e>(elems: &'e [Elem], anchor: AnchorKind) -> Result<&'e [Elem], Error> {
    let rest = match (anchor, elems.first()) {
        (AnchorKind::Abs, Some(Elem::Root)) => &elems[1..],
        (AnchorKind::Rel, Some(Elem::Root)) | (AnchorKind::Abs, _) => {
            return Err(ErrorImpl::AnchorMismatch {
                path: print_elems(elems),
                expected: anchor,
            })?
        }
        (AnchorKind::Rel, _) => elems,
    };
    if rest.iter().any(|elem| matches!(elem, Elem::Root)) {
        return Err(ErrorImpl::InvalidPath {
            description: format!("'/' inside path {:?}", print_elems(elems)).into(),
        })?;
    }
    Ok(rest)
}

/// Cons a slice of directory elems onto a tail term.
fn cons_dirs(elems: &[Elem], tail: Repr) -> Repr {
    elems.iter().rev().fold(tail, |tail, elem| {
        let item = match elem {
            Elem::Dot => Item::Dot,
            Elem::Dotdot => Item::Dotdot,
            Elem::Name(name) => Item::Dir(name.clone()),
            // Ruled out by split_anchor.
            Elem::Root => Item::Dot,
        };
        Repr::Cons(item, Box::new(tail))
    })
}

/// Build a directory term from elems with the requested anchor.
pub(crate) fn dir_of_elems(elems: &[Elem], anchor: AnchorKind) -> Result<Repr, Error> {
    let rel = split_anchor(elems, anchor)?;
    let tail = match rel.split_last() {
        None => {
            return match anchor {
                AnchorKind::Abs => Ok(Repr::Item(Item::Root)),
                AnchorKind::Rel => Err(ErrorImpl::InvalidPath {
                    description: "no components".into(),
                })?,
            }
        }
        Some((last, _)) => match last {
            Elem::Dot => Item::Dot,
            Elem::Dotdot => Item::Dotdot,
            Elem::Name(name) => Item::Dir(name.clone()),
            Elem::Root => Item::Dot, // ruled out by split_anchor
        },
    };
    let init = &rel[..rel.len() - 1];
    let rel_repr = cons_dirs(init, Repr::Item(tail));
    Ok(match anchor {
        AnchorKind::Abs => Repr::Cons(Item::Root, Box::new(rel_repr)),
        AnchorKind::Rel => rel_repr,
    })
}

/// Build a file term from elems with the requested anchor. The tail elem
/// must be a plain name.
pub(crate) fn file_of_elems(elems: &[Elem], anchor: AnchorKind) -> Result<Repr, Error> {
    let rel = split_anchor(elems, anchor)?;
    let (last, init) = match rel.split_last() {
        None => {
            // Either "" (relative) or "/" (absolute); neither is a file.
            return Err(ErrorImpl::ObjectMismatch {
                path: print_elems(elems),
                tail: match anchor {
                    AnchorKind::Abs => "/".into(),
                    AnchorKind::Rel => "nothing".into(),
                },
            })?;
        }
        Some((last, init)) => (last, init),
    };
    let tail = match last {
        Elem::Name(name) => Item::File(name.clone()),
        elem => {
            return Err(ErrorImpl::ObjectMismatch {
                path: print_elems(elems),
                tail: elem.as_str().to_owned().into(),
            })?
        }
    };
    let rel_repr = cons_dirs(init, Repr::Item(tail));
    Ok(match anchor {
        AnchorKind::Abs => Repr::Cons(Item::Root, Box::new(rel_repr)),
        AnchorKind::Rel => rel_repr,
    })
}

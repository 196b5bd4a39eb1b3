// SPDX-License-Identifier: MPL-2.0 OR LGPL-3.0-or-later
/*
 * kindpath: statically-kinded paths and cycle-safe filesystem walks
 * Copyright (C) 2025-2026 kindpath contributors
 */

#![forbid(unsafe_code)]

//! Validated path components.

use crate::error::{Error, ErrorImpl};

use std::{fmt, str::FromStr};

/// A single validated path component.
///
/// A [`Name`] is a non-empty string that contains no `/` and is not one of
/// the special components `.` or `..`. It is the only thing that may appear
/// as the name of a directory, file, or symlink inside a path term.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(String);

impl Name {
    /// Validate `name` as a path component.
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        let description = if name.is_empty() {
            "empty string"
        } else if name == "." || name == ".." {
            "reserved component"
        } else if memchr::memchr(b'/', name.as_bytes()).is_some() {
            "contains '/'"
        } else {
            return Ok(Self(name));
        };
        Err(ErrorImpl::InvalidName {
            name,
            description: description.into(),
        })?
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// SPDX-License-Identifier: MPL-2.0 OR LGPL-3.0-or-later
/*
 * kindpath: statically-kinded paths and cycle-safe filesystem walks
 * Copyright (C) 2025-2026 kindpath contributors
 */

#![forbid(unsafe_code)]

//! Error types for kindpath.

use crate::{kind::AnchorKind, syscalls::Error as SyscallError};

use std::borrow::Cow;

/// Opaque error type for kindpath.
///
/// If you wish to do non-trivial error handling with kindpath errors, use
/// [`Error::kind`] to get an [`ErrorKind`] you can handle programmatically.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct Error(#[from] Box<ErrorImpl>);

impl<E: Into<ErrorImpl>> From<E> for Error {
    #[doc(hidden)]
    fn from(err: E) -> Self {
        Self(Box::new(err.into()))
    }
}

impl Error {
    /// Get the [`ErrorKind`] of this error.
    pub fn kind(&self) -> ErrorKind {
        self.0.kind()
    }
}

#[derive(thiserror::Error, Debug)]
pub(crate) enum ErrorImpl {
    #[error("invalid name {name:?}: {description}")]
    InvalidName {
        name: String,
        description: Cow<'static, str>,
    },

    #[error("invalid path: {description}")]
    InvalidPath { description: Cow<'static, str> },

    #[error("path {path:?} is not {expected}")]
    AnchorMismatch { path: String, expected: AnchorKind },

    #[error("path {path:?} cannot end in {tail}")]
    ObjectMismatch {
        path: String,
        tail: Cow<'static, str>,
    },

    #[error("path {path:?} does not exist")]
    NotFound { path: String },

    #[error("{operation} failed")]
    OsError {
        operation: Cow<'static, str>,
        source: SyscallError,
    },

    #[error("{context}")]
    Wrapped {
        context: Cow<'static, str>,
        source: Box<ErrorImpl>,
    },
}

/// Underlying error class for kindpath errors.
///
/// This is similar in concept to [`std::io::ErrorKind`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A path component violated the [`Name`](crate::Name) rules.
    InvalidName,
    /// A path string could not be parsed at all.
    InvalidPath,
    /// The path had the wrong anchor for the requested construction (for
    /// example, a relative path beginning with `/`).
    AnchorMismatch,
    /// The path had the wrong tail for the requested construction (for
    /// example, a file path ending in `..`).
    ObjectMismatch,
    /// A walk was started from a path that does not exist.
    NotFound,
    /// The underlying error came from a system call. The provided value is
    /// the numerical `errno`, if available.
    OsError(Option<i32>),
}

impl ErrorImpl {
    pub(crate) fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidName { .. } => ErrorKind::InvalidName,
            Self::InvalidPath { .. } => ErrorKind::InvalidPath,
            Self::AnchorMismatch { .. } => ErrorKind::AnchorMismatch,
            Self::ObjectMismatch { .. } => ErrorKind::ObjectMismatch,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::OsError { source, .. } => ErrorKind::OsError(source.errno()),
            Self::Wrapped { source, .. } => source.kind(),
        }
    }
}

impl ErrorKind {
    /// Return a C-like errno for the [`ErrorKind`].
    ///
    /// Aside from fetching the errno represented by standard
    /// [`ErrorKind::OsError`] errors, pure-Rust errors are also mapped to C
    /// errno values where appropriate.
    pub(crate) fn errno(&self) -> Option<i32> {
        match self {
            ErrorKind::InvalidName
            | ErrorKind::InvalidPath
            | ErrorKind::AnchorMismatch
            | ErrorKind::ObjectMismatch => Some(libc::EINVAL),
            ErrorKind::NotFound => Some(libc::ENOENT),
            ErrorKind::OsError(errno) => *errno,
        }
    }
}

// Private trait necessary to work around the "orphan trait" restriction.
pub(crate) trait ErrorExt: Sized {
    /// Wrap a `Result<..., Error>` with an additional context string.
    fn wrap<S: Into<String>>(self, context: S) -> Self {
        self.with_wrap(|| context.into())
    }

    /// Wrap a `Result<..., Error>` with an additional context string created
    /// by a closure.
    fn with_wrap<F>(self, context_fn: F) -> Self
    where
        F: FnOnce() -> String;
}

impl ErrorExt for ErrorImpl {
    fn with_wrap<F>(self, context_fn: F) -> Self
    where
        F: FnOnce() -> String,
    {
        Self::Wrapped {
            context: context_fn().into(),
            source: self.into(),
        }
    }
}

impl ErrorExt for Error {
    fn with_wrap<F>(self, context_fn: F) -> Self
    where
        F: FnOnce() -> String,
    {
        self.0.with_wrap(context_fn).into()
    }
}

impl<T, E: ErrorExt> ErrorExt for Result<T, E> {
    fn with_wrap<F>(self, context_fn: F) -> Self
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| err.with_wrap(context_fn))
    }
}

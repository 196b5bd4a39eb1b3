// SPDX-License-Identifier: MPL-2.0 OR LGPL-3.0-or-later
/*
 * kindpath: statically-kinded paths and cycle-safe filesystem walks
 * Copyright (C) 2025-2026 kindpath contributors
 */

#![forbid(unsafe_code)]

//! Synchronous wrappers around the raw syscalls this crate needs.
//!
//! Each wrapper records what was attempted, on which path, and where in the
//! crate the call was made, so that an error bubbling out of a deep
//! recursive walk still says something useful. Everything here blocks; the
//! [`fs`](crate::fs) layer offloads these onto the runtime's blocking pool.

use std::{
    ffi::OsString,
    fmt, fs as stdfs, io,
    os::unix::ffi::OsStringExt,
    panic::Location,
    path::{Path, PathBuf},
};

use rustix::fs::{self as rustix_fs, AtFlags, FileType, Mode, OFlags, CWD};

/// A failed syscall: the operation, the path it was applied to, the
/// underlying error, and the source location of the call.
#[derive(Debug)]
pub(crate) struct Error {
    operation: &'static str,
    path: Option<PathBuf>,
    source: io::Error,
    location: &'static Location<'static>,
}

impl Error {
    #[track_caller]
    pub(crate) fn new(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: impl Into<io::Error>,
    ) -> Self {
        Self {
            operation,
            path: Some(path.into()),
            source: source.into(),
            location: Location::caller(),
        }
    }

    #[track_caller]
    pub(crate) fn without_path(operation: &'static str, source: io::Error) -> Self {
        Self {
            operation,
            path: None,
            source,
            location: Location::caller(),
        }
    }

    /// The raw errno of the underlying failure, if there is one.
    pub(crate) fn errno(&self) -> Option<i32> {
        self.source.raw_os_error()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(
                f,
                "{} {:?}: {} (at {})",
                self.operation, path, self.source, self.location
            ),
            None => write!(f, "{}: {} (at {})", self.operation, self.source, self.location),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// `lstat(2)`: the file type of the entry itself, symlinks not followed.
#[track_caller]
pub(crate) fn lstat(path: &Path) -> Result<FileType, Error> {
    rustix_fs::statat(CWD, path, AtFlags::SYMLINK_NOFOLLOW)
        .map(|st| FileType::from_raw_mode(st.st_mode))
        .map_err(|err| Error::new("lstat", path, err))
}

/// `stat(2)`: the file type after following symlinks.
#[track_caller]
pub(crate) fn stat(path: &Path) -> Result<FileType, Error> {
    rustix_fs::statat(CWD, path, AtFlags::empty())
        .map(|st| FileType::from_raw_mode(st.st_mode))
        .map_err(|err| Error::new("stat", path, err))
}

/// `readlink(2)`: the raw target text of a symlink.
#[track_caller]
pub(crate) fn readlink(path: &Path) -> Result<OsString, Error> {
    rustix_fs::readlinkat(CWD, path, Vec::new())
        .map(|target| OsString::from_vec(target.into_bytes()))
        .map_err(|err| Error::new("readlink", path, err))
}

/// `mkdir(2)`: create a single directory level, mode 0o755.
#[track_caller]
pub(crate) fn mkdir(path: &Path) -> Result<(), Error> {
    rustix_fs::mkdir(path, Mode::from_raw_mode(0o755))
        .map_err(|err| Error::new("mkdir", path, err))
}

/// `symlink(2)`: create a symlink at `link` pointing at `target`.
#[track_caller]
pub(crate) fn symlink(target: &str, link: &Path) -> Result<(), Error> {
    rustix_fs::symlink(target, link).map_err(|err| Error::new("symlink", link, err))
}

/// `readdir(3)`: the names in a directory, with `.` and `..` filtered out.
#[track_caller]
pub(crate) fn read_dir(path: &Path) -> Result<Vec<OsString>, Error> {
    let dirfd = rustix_fs::open(
        path,
        OFlags::RDONLY | OFlags::DIRECTORY | OFlags::CLOEXEC,
        Mode::empty(),
    )
    .map_err(|err| Error::new("open directory", path, err))?;

    let mut names = Vec::new();
    for entry in
        rustix_fs::Dir::read_from(&dirfd).map_err(|err| Error::new("read directory", path, err))?
    {
        let entry = entry.map_err(|err| Error::new("read directory entry", path, err))?;
        let name = entry.file_name().to_bytes();
        if name == b"." || name == b".." {
            continue;
        }
        names.push(OsString::from_vec(name.to_vec()));
    }
    Ok(names)
}

/// `realpath(3)`: the canonical absolute path, every symlink resolved.
#[track_caller]
pub(crate) fn realpath(path: &Path) -> Result<PathBuf, Error> {
    stdfs::canonicalize(path).map_err(|err| Error::new("realpath", path, err))
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Error handling. */

use {std::path::PathBuf, thiserror::Error};

/// Classification of build failures.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The build was configured with invalid inputs; the invoker must change
    /// its arguments or the files describing the build.
    Configuration,

    /// A referenced file could not be read or the output could not be
    /// written.
    Resource,
}

/// Primary crate error type.
#[derive(Debug, Error)]
pub enum ParArchiveError {
    #[error("Python interpreter must not be a label: {0}")]
    InterpreterIsLabel(String),

    #[error(
        "par files require a Python runtime installed on the system, not one \
         defined inside the workspace: {0}"
    )]
    InterpreterInWorkspace(String),

    #[error("no Python interpreter reference available")]
    InterpreterMissing,

    #[error("malformed manifest line {} in {}: {}", .line, .path.display(), .message)]
    ManifestParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("duplicate destination path on manifest line {line}: {dest}")]
    DuplicateDestination { dest: String, line: usize },

    #[error("destination path must be relative and must not contain '..': {0}")]
    IllegalDestination(String),

    #[error("manifest must not contain {0}; that entry is generated")]
    ReservedDestination(String),

    #[error("timestamp cannot be represented in a zip archive: {0}")]
    TimestampOutOfRange(i64),

    #[error("source file for {} is missing or not a regular file: {}", .dest, .source_path.display())]
    SourceMissing { dest: String, source_path: PathBuf },

    #[error("I/O error on {}: {}", .0.display(), .1)]
    IoPath(PathBuf, #[source] std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl ParArchiveError {
    /// Obtain the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InterpreterIsLabel(_)
            | Self::InterpreterInWorkspace(_)
            | Self::InterpreterMissing
            | Self::ManifestParse { .. }
            | Self::DuplicateDestination { .. }
            | Self::IllegalDestination(_)
            | Self::ReservedDestination(_)
            | Self::TimestampOutOfRange(_) => ErrorKind::Configuration,
            Self::SourceMissing { .. } | Self::IoPath(..) | Self::Io(_) | Self::Zip(_) => {
                ErrorKind::Resource
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ParArchiveError>;

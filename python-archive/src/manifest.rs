// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Loading of archive manifests.

A manifest is a text file with one archive member per line, in the format
emitted by build-tool runfiles manifests: a destination path inside the
archive and a source path on disk, separated by a single space. A line with
no source path declares an empty file. Entry order in the file is
significant and is preserved through to the produced archive.
*/

use {
    crate::error::{ParArchiveError, Result},
    simple_file_manifest::{is_executable, FileEntry},
    std::{
        collections::BTreeSet,
        path::{Component, Path, PathBuf},
    },
};

/// A single archive member: its destination path inside the archive plus
/// the source of its content.
#[derive(Clone, Debug)]
pub struct ManifestEntry {
    dest: String,
    source: Option<PathBuf>,
    entry: FileEntry,
}

impl ManifestEntry {
    /// The archive-relative destination path.
    pub fn dest(&self) -> &str {
        &self.dest
    }

    /// The resolved source path, if the entry is backed by a file.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// The content of the member.
    pub fn file_entry(&self) -> &FileEntry {
        &self.entry
    }
}

/// Read an ordered list of manifest entries from a file.
///
/// Relative source paths are resolved against `root`. Every file-backed
/// entry is validated to reference an existing regular file, and its
/// executable bit is captured for the archive member mode. Destination
/// paths must be unique and must stay inside the archive root.
pub fn load_manifest(path: &Path, root: &Path) -> Result<Vec<ManifestEntry>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ParArchiveError::IoPath(path.to_path_buf(), e))?;

    parse_manifest(&text, path, root)
}

fn parse_manifest(text: &str, path: &Path, root: &Path) -> Result<Vec<ManifestEntry>> {
    let mut entries = Vec::new();
    let mut seen = BTreeSet::new();

    for (index, line) in text.lines().enumerate() {
        let lineno = index + 1;

        let malformed = |message: &str| ParArchiveError::ManifestParse {
            path: path.to_path_buf(),
            line: lineno,
            message: message.to_string(),
        };

        if line.is_empty() {
            return Err(malformed("blank line"));
        }

        let fields = line.split(' ').collect::<Vec<_>>();

        let (dest, source) = match fields.as_slice() {
            [dest] => (*dest, None),
            [dest, source] if source.is_empty() => (*dest, None),
            [dest, source] => (*dest, Some(*source)),
            _ => return Err(malformed("expected `destination source`")),
        };

        if dest.is_empty() {
            return Err(malformed("empty destination path"));
        }

        validate_dest(dest)?;

        if !seen.insert(dest.to_string()) {
            return Err(ParArchiveError::DuplicateDestination {
                dest: dest.to_string(),
                line: lineno,
            });
        }

        entries.push(match source {
            Some(source) => resolve_source(dest, Path::new(source), root)?,
            None => ManifestEntry {
                dest: dest.to_string(),
                source: None,
                entry: FileEntry::new_from_data(vec![], false),
            },
        });
    }

    Ok(entries)
}

// Destination paths name zip members; they must stay inside the archive.
fn validate_dest(dest: &str) -> Result<()> {
    let path = Path::new(dest);

    if dest.starts_with('/') || path.is_absolute() {
        return Err(ParArchiveError::IllegalDestination(dest.to_string()));
    }

    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(ParArchiveError::IllegalDestination(dest.to_string()));
    }

    Ok(())
}

fn resolve_source(dest: &str, source: &Path, root: &Path) -> Result<ManifestEntry> {
    let resolved = if source.is_absolute() {
        source.to_path_buf()
    } else {
        root.join(source)
    };

    let missing = || ParArchiveError::SourceMissing {
        dest: dest.to_string(),
        source_path: resolved.clone(),
    };

    let metadata = std::fs::metadata(&resolved).map_err(|_| missing())?;

    if !metadata.is_file() {
        return Err(missing());
    }

    let executable = is_executable(&metadata);

    Ok(ManifestEntry {
        dest: dest.to_string(),
        source: Some(resolved.clone()),
        entry: FileEntry::new_from_path(resolved, executable),
    })
}

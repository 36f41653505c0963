// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Assembly of self-executing Python archives.

This module implements the build pipeline: resolve the interpreter, load
the manifest, generate the launcher, and stream everything into a single
output file that is simultaneously an executable script and a zip archive.

Member modification times come from a fixed configured timestamp and member
order follows the manifest, so identical inputs produce byte-identical
archives.
*/

use {
    crate::{
        error::{ParArchiveError, Result},
        interpreter::resolve_interpreter,
        launcher::Launcher,
        manifest::{load_manifest, ManifestEntry},
    },
    log::{debug, info},
    simple_file_manifest::set_executable,
    std::{
        io::{Seek, Write},
        path::{Path, PathBuf},
    },
    zip::CompressionMethod,
};

/// Default modification time for archive members: 1980-01-01T00:00:00Z, the
/// earliest time representable in a zip archive. Expressed in seconds since
/// the Unix epoch for SOURCE_DATE_EPOCH compatibility.
pub const DEFAULT_TIMESTAMP: i64 = 315532800;

/// Destination path of the generated bootstrap member.
pub const MAIN_ENTRY_NAME: &str = "__main__.py";

/// Construction parameters for one archive build.
///
/// Immutable once constructed; one instance fully determines one output
/// artifact.
#[derive(Clone, Debug)]
pub struct ArchiveSpec {
    /// Name of the module executed when the archive runs.
    pub main_module: String,

    /// Paths inside the archive added to the module search path, in order.
    pub import_roots: Vec<String>,

    /// Raw interpreter reference, typically recovered from a stub file.
    pub interpreter: String,

    /// Interpreter to use instead of `interpreter`, verbatim.
    pub interpreter_override: Option<String>,

    /// Where the finished archive is written.
    pub output_path: PathBuf,

    /// Manifest file listing the archive members.
    pub manifest_path: PathBuf,

    /// Directory against which relative manifest source paths are resolved.
    pub manifest_root: PathBuf,

    /// Modification time stored for every member, in seconds since the
    /// Unix epoch.
    pub timestamp: i64,

    /// Whether modules and data files can be used straight from the
    /// archive. If false, the launcher extracts everything to a temporary
    /// directory at startup.
    pub zip_safe: bool,
}

/// Writes a launcher and an ordered set of manifest entries as one
/// self-executing archive.
pub struct ParBuilder {
    launcher: Launcher,
    entries: Vec<ManifestEntry>,
    modified_time: zip::DateTime,
}

impl ParBuilder {
    /// Create a builder from already-validated inputs.
    ///
    /// The bootstrap member is generated, so a manifest entry under the
    /// same path is rejected here rather than silently shadowed.
    pub fn new(launcher: Launcher, entries: Vec<ManifestEntry>, timestamp: i64) -> Result<Self> {
        if entries.iter().any(|e| e.dest() == MAIN_ENTRY_NAME) {
            return Err(ParArchiveError::ReservedDestination(
                MAIN_ENTRY_NAME.to_string(),
            ));
        }

        Ok(Self {
            launcher,
            entries,
            modified_time: zip_datetime(timestamp)?,
        })
    }

    /// Write the archive: shebang bytes first, container immediately after.
    pub fn write_par(&self, writer: &mut (impl Write + Seek)) -> Result<()> {
        writer.write_all(self.launcher.shebang_line().as_bytes())?;
        writer.write_all(b"\n")?;

        self.write_zip_data(writer)
    }

    /// Write the archive to its final filesystem path.
    ///
    /// Content is staged in a uniquely named temporary file next to the
    /// destination. The executable bit is set only after every byte has
    /// been written, and the staged file is renamed into place only on
    /// success; a failed build leaves nothing at the destination.
    pub fn write_to_path(&self, path: &Path) -> Result<PathBuf> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        std::fs::create_dir_all(parent)
            .map_err(|e| ParArchiveError::IoPath(parent.to_path_buf(), e))?;

        let mut staging = tempfile::Builder::new()
            .prefix(".par-staging-")
            .tempfile_in(parent)
            .map_err(|e| ParArchiveError::IoPath(parent.to_path_buf(), e))?;

        self.write_par(staging.as_file_mut())?;

        set_executable(staging.as_file_mut())
            .map_err(|e| ParArchiveError::IoPath(path.to_path_buf(), e))?;

        staging
            .persist(path)
            .map_err(|e| ParArchiveError::IoPath(path.to_path_buf(), e.error))?;

        Ok(path.to_path_buf())
    }

    fn write_zip_data(&self, writer: &mut (impl Write + Seek)) -> Result<()> {
        let mut zf = zip::ZipWriter::new(writer);

        zf.start_file(MAIN_ENTRY_NAME, self.member_options(false))?;
        zf.write_all(self.launcher.main_py().as_bytes())?;

        for entry in &self.entries {
            zf.start_file(
                entry.dest(),
                self.member_options(entry.file_entry().is_executable()),
            )?;

            let content = entry.file_entry().resolve_content().map_err(|error| {
                match entry.source() {
                    Some(source) => ParArchiveError::IoPath(source.to_path_buf(), error),
                    None => ParArchiveError::Io(error),
                }
            })?;

            zf.write_all(&content)?;
        }

        zf.finish()?;

        Ok(())
    }

    fn member_options(&self, executable: bool) -> zip::write::FileOptions {
        zip::write::FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(if executable { 0o755 } else { 0o644 })
            .last_modified_time(self.modified_time)
    }
}

/// Build one archive as described by `spec`.
///
/// The pipeline is strictly sequential: resolve the interpreter, load and
/// validate the manifest, generate the launcher, write the archive. Any
/// failure aborts the whole build with nothing left at the output path.
/// The function keeps no state between invocations.
pub fn build_archive(spec: &ArchiveSpec) -> Result<PathBuf> {
    let interpreter =
        resolve_interpreter(&spec.interpreter, spec.interpreter_override.as_deref())?;
    debug!("resolved interpreter: {}", interpreter);

    let entries = load_manifest(&spec.manifest_path, &spec.manifest_root)?;
    info!(
        "writing {} with {} manifest entries",
        spec.output_path.display(),
        entries.len()
    );

    let launcher = Launcher::new(
        &interpreter,
        &spec.main_module,
        &spec.import_roots,
        spec.zip_safe,
    );

    ParBuilder::new(launcher, entries, spec.timestamp)?.write_to_path(&spec.output_path)
}

fn zip_datetime(timestamp: i64) -> Result<zip::DateTime> {
    let t = time::OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|_| ParArchiveError::TimestampOutOfRange(timestamp))?;

    zip::DateTime::from_date_and_time(
        t.year() as u16,
        t.month() as u8,
        t.day(),
        t.hour(),
        t.minute(),
        t.second(),
    )
    .map_err(|_| ParArchiveError::TimestampOutOfRange(timestamp))
}

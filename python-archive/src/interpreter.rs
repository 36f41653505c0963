// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Resolution of Python interpreter references.

The interpreter named by a build configuration ends up in the shebang line
of the produced archive, so it must remain meaningful after the archive is
copied off the build host. Only absolute paths and `/usr/bin/env` lookups
qualify. References that are only valid inside a build tree are either
rewritten (the well-known autodetecting toolchain wrappers) or rejected.
*/

use crate::error::{ParArchiveError, Result};

/// Toolchain wrapper scripts with well-known in-tree paths.
///
/// These wrappers only exist inside a build tree and cannot be referenced
/// from the shebang line of a relocatable archive. Each stands in for a
/// system interpreter that is looked up on `PATH` at execution time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PythonToolchainWrapper {
    /// The autodetecting Python 3 toolchain wrapper.
    Python3,
    /// The autodetecting Python 2 toolchain wrapper.
    Python2,
}

impl PythonToolchainWrapper {
    /// Match a raw interpreter reference against the known wrapper paths.
    pub fn from_reference(raw: &str) -> Option<Self> {
        match raw {
            "bazel_tools/tools/python/py3wrapper.sh" => Some(Self::Python3),
            "bazel_tools/tools/python/py2wrapper.sh" => Some(Self::Python2),
            _ => None,
        }
    }

    /// The system command the wrapper stands in for.
    pub fn command(&self) -> &'static str {
        match self {
            Self::Python3 => "python3",
            Self::Python2 => "python2",
        }
    }
}

/// An interpreter reference usable both in a shebang line and at run time.
///
/// Always an absolute filesystem path or a `/usr/bin/env <command>` lookup.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedInterpreter(String);

impl ResolvedInterpreter {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResolvedInterpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn env_lookup(command: &str) -> ResolvedInterpreter {
    ResolvedInterpreter(format!("/usr/bin/env {}", command))
}

/// Resolve a raw interpreter reference into its final form.
///
/// `raw` is typically recovered from a py_binary stub file and may be empty
/// if discovery failed. `interpreter_override` wins unconditionally when
/// present and is used verbatim.
///
/// Label references (`//...`) and paths into the build tree are rejected:
/// both would tie the produced archive to the build graph it came from. A
/// bare command name resolves to the system-installed interpreter of that
/// name via `/usr/bin/env`.
pub fn resolve_interpreter(
    raw: &str,
    interpreter_override: Option<&str>,
) -> Result<ResolvedInterpreter> {
    if let Some(value) = interpreter_override {
        return Ok(ResolvedInterpreter(value.to_string()));
    }

    if raw.is_empty() {
        Err(ParArchiveError::InterpreterMissing)
    } else if raw.starts_with("//") {
        Err(ParArchiveError::InterpreterIsLabel(raw.to_string()))
    } else if raw.starts_with('/') {
        Ok(ResolvedInterpreter(raw.to_string()))
    } else if let Some(wrapper) = PythonToolchainWrapper::from_reference(raw) {
        Ok(env_lookup(wrapper.command()))
    } else if raw.contains('/') {
        Err(ParArchiveError::InterpreterInWorkspace(raw.to_string()))
    } else {
        Ok(env_lookup(raw))
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Generation of the launcher that makes an archive self-executing. */

use crate::interpreter::ResolvedInterpreter;

/// The generated launcher for an archive.
///
/// A launcher has two parts. The shebang line is written verbatim as the
/// first bytes of the output file, so the OS program loader hands the file
/// to the resolved interpreter. The `__main__.py` bootstrap is stored as a
/// member of the container: the interpreter locates the trailing zip data
/// regardless of the leading bytes and executes the archive's `__main__`
/// module, which sets up the module search path and transfers control to
/// the configured entry-point module.
///
/// The two parts are generated independently and only concatenated by the
/// archive writer.
pub struct Launcher {
    shebang: String,
    main_py: String,
}

impl Launcher {
    pub fn new(
        interpreter: &ResolvedInterpreter,
        main_module: &str,
        import_roots: &[String],
        zip_safe: bool,
    ) -> Self {
        Self {
            shebang: format!("#!{}", interpreter),
            main_py: generate_main_py(main_module, import_roots, zip_safe),
        }
    }

    /// First line of the archive, without a trailing newline.
    pub fn shebang_line(&self) -> &str {
        &self.shebang
    }

    /// Source of the generated `__main__.py` bootstrap module.
    pub fn main_py(&self) -> &str {
        &self.main_py
    }
}

/// Generate the bootstrap module source.
///
/// In zip-safe mode modules and data files are used straight from the
/// archive, so the import roots are resolved against the archive path
/// itself. Otherwise the entire archive is extracted to a fresh temporary
/// directory before anything is imported from it; the directory is removed
/// again when the interpreter exits, including after an uncaught exception.
fn generate_main_py(main_module: &str, import_roots: &[String], zip_safe: bool) -> String {
    let roots = import_roots
        .iter()
        .map(|root| python_string_literal(root))
        .collect::<Vec<_>>()
        .join(", ");

    if zip_safe {
        format!(
            "\
# Bootstrap of a self-executing Python archive.
import os
import runpy
import sys

archive_path = os.path.dirname(os.path.abspath(__file__))
sys.path[1:1] = [os.path.join(archive_path, root) for root in [{}]]
runpy.run_module({}, run_name='__main__', alter_sys=True)
",
            roots,
            python_string_literal(main_module)
        )
    } else {
        format!(
            "\
# Bootstrap of a self-executing Python archive.
import atexit
import os
import runpy
import shutil
import sys
import tempfile
import zipfile

archive_path = os.path.dirname(os.path.abspath(__file__))
extract_dir = tempfile.mkdtemp()
atexit.register(shutil.rmtree, extract_dir, True)
with zipfile.ZipFile(archive_path) as archive:
    archive.extractall(extract_dir)
sys.path[0] = extract_dir
sys.path[1:1] = [os.path.join(extract_dir, root) for root in [{}]]
runpy.run_module({}, run_name='__main__', alter_sys=True)
",
            roots,
            python_string_literal(main_module)
        )
    }
}

/// Quote a value as a Python single-quoted string literal.
fn python_string_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('\'');

    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }

    escaped.push('\'');
    escaped
}

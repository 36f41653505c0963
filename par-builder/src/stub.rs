// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Parsing of py_binary stub scripts.

The stub script generated alongside a py_binary target records the
interpreter it was configured with in a `PYTHON_BINARY = '...'` assignment.
That reference is recovered here and handed to the interpreter resolver.
*/

use {
    anyhow::{anyhow, Context, Result},
    once_cell::sync::Lazy,
    std::path::Path,
};

/// Matches the assignment naming the configured interpreter.
static RE_PYTHON_BINARY: Lazy<regex::Regex> =
    Lazy::new(|| regex::Regex::new(r"(?m)^PYTHON_BINARY = '([^']*)'$").unwrap());

/// Recover the raw interpreter reference from a stub file.
///
/// The last matching assignment wins. A stub without one is an error; the
/// raw value is returned without further validation.
pub fn parse_stub(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading stub file {}", path.display()))?;

    RE_PYTHON_BINARY
        .captures_iter(&text)
        .last()
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| anyhow!("failed to parse stub file {}", path.display()))
}

#[cfg(test)]
mod test {
    use {super::*, std::io::Write};

    fn write_stub(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let td = tempfile::tempdir().unwrap();
        let path = td.path().join("stub.py");
        let mut fh = std::fs::File::create(&path).unwrap();
        fh.write_all(content.as_bytes()).unwrap();
        (td, path)
    }

    #[test]
    fn interpreter_recovered() {
        let (_td, path) = write_stub(
            "#!/usr/bin/env python\nPYTHON_BINARY = '/usr/bin/python3'\nmain()\n",
        );

        assert_eq!(parse_stub(&path).unwrap(), "/usr/bin/python3");
    }

    #[test]
    fn last_assignment_wins() {
        let (_td, path) = write_stub(
            "PYTHON_BINARY = 'python2'\nPYTHON_BINARY = 'python3'\n",
        );

        assert_eq!(parse_stub(&path).unwrap(), "python3");
    }

    #[test]
    fn indented_assignment_ignored() {
        let (_td, path) = write_stub("  PYTHON_BINARY = 'python3'\n");

        assert!(parse_stub(&path).is_err());
    }

    #[test]
    fn stub_without_assignment_is_error() {
        let (_td, path) = write_stub("print('no interpreter here')\n");

        let err = parse_stub(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse stub file"));
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {
    assert_cmd::Command,
    predicates::prelude::*,
    std::{io::Read, path::Path},
};

fn write_file(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

fn par_builder(dir: &Path, out: &Path, stub: &str) -> Command {
    write_file(dir, "stub.py", stub);

    let mut cmd = Command::cargo_bin("par-builder").unwrap();
    cmd.arg("app.main")
        .arg("--manifest-file")
        .arg(dir.join("MANIFEST"))
        .arg("--manifest-root")
        .arg(dir)
        .arg("--output-par")
        .arg(out)
        .arg("--stub-file")
        .arg(dir.join("stub.py"))
        .arg("--zip-safe")
        .arg("True")
        .arg("--import-root")
        .arg("app");

    cmd
}

#[test]
fn builds_runnable_archive() {
    let td = tempfile::tempdir().unwrap();
    write_file(td.path(), "main.py", "print('hello')\n");
    write_file(td.path(), "MANIFEST", "app/main.py main.py\napp/__init__.py\n");
    let out = td.path().join("app.par");

    par_builder(td.path(), &out, "PYTHON_BINARY = 'python3'\n")
        .assert()
        .success();

    let data = std::fs::read(&out).unwrap();
    assert!(data.starts_with(b"#!/usr/bin/env python3\n"));

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data)).unwrap();

    let mut main_py = String::new();
    archive
        .by_name("__main__.py")
        .unwrap()
        .read_to_string(&mut main_py)
        .unwrap();
    assert!(main_py.contains("runpy.run_module('app.main'"));

    let mut content = String::new();
    archive
        .by_name("app/main.py")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "print('hello')\n");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&out).unwrap().permissions().mode();
        assert_ne!(mode & 0o100, 0);
    }
}

#[test]
fn interpreter_override_wins() {
    let td = tempfile::tempdir().unwrap();
    write_file(td.path(), "main.py", "print('hello')\n");
    write_file(td.path(), "MANIFEST", "app/main.py main.py\n");
    let out = td.path().join("app.par");

    par_builder(td.path(), &out, "PYTHON_BINARY = '//tools:python'\n")
        .arg("--interpreter")
        .arg("/opt/python/bin/python3")
        .assert()
        .success();

    let data = std::fs::read(&out).unwrap();
    assert!(data.starts_with(b"#!/opt/python/bin/python3\n"));
}

#[test]
fn label_interpreter_is_rejected() {
    let td = tempfile::tempdir().unwrap();
    write_file(td.path(), "main.py", "print('hello')\n");
    write_file(td.path(), "MANIFEST", "app/main.py main.py\n");
    let out = td.path().join("app.par");

    par_builder(td.path(), &out, "PYTHON_BINARY = '//tools:python'\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be a label"));

    assert!(!out.exists());
}

#[test]
fn missing_source_fails_without_output() {
    let td = tempfile::tempdir().unwrap();
    write_file(td.path(), "MANIFEST", "app/gone.py gone.py\n");
    let out = td.path().join("app.par");

    par_builder(td.path(), &out, "PYTHON_BINARY = 'python3'\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing or not a regular file"));

    assert!(!out.exists());
}

#[test]
fn zip_safe_requires_explicit_boolean() {
    let td = tempfile::tempdir().unwrap();
    write_file(td.path(), "main.py", "print('hello')\n");
    write_file(td.path(), "MANIFEST", "app/main.py main.py\n");
    write_file(td.path(), "stub.py", "PYTHON_BINARY = 'python3'\n");

    Command::cargo_bin("par-builder")
        .unwrap()
        .arg("app.main")
        .arg("--manifest-file")
        .arg(td.path().join("MANIFEST"))
        .arg("--manifest-root")
        .arg(td.path())
        .arg("--output-par")
        .arg(td.path().join("app.par"))
        .arg("--stub-file")
        .arg(td.path().join("stub.py"))
        .arg("--zip-safe")
        .arg("maybe")
        .assert()
        .failure()
        .stderr(predicate::str::contains("True or False"));
}

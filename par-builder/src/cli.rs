// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {
    crate::stub::parse_stub,
    anyhow::{Context, Result},
    clap::{Arg, ArgAction, Command},
    python_archive::par_builder::{self, ArchiveSpec},
    std::path::{Path, PathBuf},
};

const PAR_BUILDER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse a boolean command line argument value.
fn bool_from_string(raw: &str) -> std::result::Result<bool, String> {
    match raw {
        "True" => Ok(true),
        "False" => Ok(false),
        _ => Err(format!("value must be True or False, got {} instead", raw)),
    }
}

pub fn run() -> Result<i32> {
    let matches = Command::new("par-builder")
        .about("Python executable archive builder")
        .version(PAR_BUILDER_VERSION)
        .arg(
            Arg::new("main_module")
                .required(true)
                .value_name("MODULE")
                .help("Name of the module to run when the archive is executed"),
        )
        .arg(
            Arg::new("manifest_file")
                .long("manifest-file")
                .required(true)
                .value_name("FILE")
                .help(
                    "File listing all files to be included in the archive. This is \
                     typically generated by the build tool as a target's runfiles \
                     manifest",
                ),
        )
        .arg(
            Arg::new("manifest_root")
                .long("manifest-root")
                .value_name("DIR")
                .help(
                    "Root directory of all relative paths in the manifest file \
                     [default: current directory]",
                ),
        )
        .arg(
            Arg::new("output_par")
                .long("output-par")
                .required(true)
                .value_name("FILE")
                .help("Filename of the generated archive"),
        )
        .arg(
            Arg::new("stub_file")
                .long("stub-file")
                .required(true)
                .value_name("FILE")
                .help("Read the interpreter path from the specified stub file"),
        )
        .arg(
            Arg::new("interpreter")
                .long("interpreter")
                .value_name("PATH")
                .help("Interpreter to use instead of the one named by the stub file"),
        )
        .arg(
            Arg::new("timestamp")
                .long("timestamp")
                .value_name("SECONDS")
                .value_parser(clap::value_parser!(i64))
                .help(
                    "Timestamp (in seconds since the Unix epoch) stored for all \
                     archive members [default: 315532800, the earliest time a zip \
                     archive can represent]",
                ),
        )
        .arg(
            Arg::new("zip_safe")
                .long("zip-safe")
                .required(true)
                .value_name("True|False")
                .value_parser(bool_from_string)
                .help(
                    "Safe to import modules and access data files straight from the \
                     archive? If False, all files will be extracted to a temporary \
                     directory at the start of execution",
                ),
        )
        .arg(
            Arg::new("import_root")
                .long("import-root")
                .action(ArgAction::Append)
                .value_name("PATH")
                .help("Path to add to the module search path; may be repeated"),
        )
        .get_matches();

    let manifest_root = match matches.get_one::<String>("manifest_root") {
        Some(value) => PathBuf::from(value),
        None => std::env::current_dir().context("resolving current directory")?,
    };

    let stub_file = matches
        .get_one::<String>("stub_file")
        .expect("stub_file should be set");
    let interpreter = parse_stub(Path::new(stub_file))?;

    let spec = ArchiveSpec {
        main_module: matches
            .get_one::<String>("main_module")
            .expect("main_module should be set")
            .clone(),
        import_roots: matches
            .get_many::<String>("import_root")
            .unwrap_or_default()
            .cloned()
            .collect(),
        interpreter,
        interpreter_override: matches.get_one::<String>("interpreter").cloned(),
        output_path: PathBuf::from(
            matches
                .get_one::<String>("output_par")
                .expect("output_par should be set"),
        ),
        manifest_path: PathBuf::from(
            matches
                .get_one::<String>("manifest_file")
                .expect("manifest_file should be set"),
        ),
        manifest_root,
        timestamp: matches
            .get_one::<i64>("timestamp")
            .copied()
            .unwrap_or(par_builder::DEFAULT_TIMESTAMP),
        zip_safe: *matches
            .get_one::<bool>("zip_safe")
            .expect("zip_safe should be set"),
    };

    let output = par_builder::build_archive(&spec)
        .with_context(|| format!("building {}", spec.output_path.display()))?;
    log::info!("wrote {}", output.display());

    Ok(0)
}

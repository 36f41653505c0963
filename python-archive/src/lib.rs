// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Assembly of self-executing Python archives.

A *par file* is a single artifact that is simultaneously an executable
script and a zip archive: a shebang line referencing a Python interpreter,
followed by a compressed container holding a generated `__main__.py`
bootstrap plus every file named by a build manifest. Executing the file
hands it to the interpreter, which locates the trailing zip data and runs
the bootstrap, which in turn sets up the module search path and transfers
control to the configured entry-point module.

Archives are reproducible: member modification times come from a fixed
configured timestamp and member order follows the manifest, so identical
inputs always produce byte-identical output.
*/

pub mod error;
pub mod interpreter;
pub mod launcher;
pub mod manifest;
pub mod par_builder;

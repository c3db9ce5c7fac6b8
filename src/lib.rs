/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

pub mod ast;
pub mod errors;
pub mod file_reader;
pub mod ir;
pub mod loader;
pub mod recompiler;

use anyhow::{Context, Result};
use file_reader::FileReader;
use recompiler::Recompiler;
use std::path::Path;

/// Output file names expected by the downstream build scripts.
pub const NATIVE_OUTPUT_FILE: &str = "smk.ll";
pub const WASM_OUTPUT_FILE: &str = "smk.bc";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Target {
    Native,
    Wasm,
}

/// A finished recompilation. The module is available even when
/// verification failed so it can still be dumped for post-mortem work.
pub struct Recompilation {
    pub module: ir::Module,
    pub verify_errors: Vec<String>,
}

impl Recompilation {
    pub fn print(&self) -> String {
        ir::printer::print_module(&self.module)
    }

    pub fn to_bitcode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(&self.module)?)
    }

    pub fn is_verified(&self) -> bool {
        self.verify_errors.is_empty()
    }
}

pub fn recompile<F: FileReader>(
    ast_path: &Path,
    target: Target,
    reader: &F,
) -> Result<Recompilation> {
    let document =
        loader::load_ast(ast_path, reader).context("Failed during AST loading stage")?;

    let recompiler = Recompiler::new(document, target);
    let module = recompiler
        .run()
        .context("Failed during IR generation stage")?;

    let verify_errors = ir::verifier::verify_module(&module);

    Ok(Recompilation {
        module,
        verify_errors,
    })
}

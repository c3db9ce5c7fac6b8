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

use crate::ast::RomAst;
use crate::errors::RecompileError;
use crate::file_reader::FileReader;
use std::path::Path;

/// Reads and parses the disassembler document.
pub fn load_ast<F: FileReader>(path: &Path, reader: &F) -> Result<RomAst, RecompileError> {
    let text = reader
        .read_to_string(path)
        .map_err(|e| RecompileError::AstLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    let document: RomAst = serde_json::from_str(&text)?;
    Ok(document)
}

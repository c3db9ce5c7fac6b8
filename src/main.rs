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

use anyhow::{Result, bail};
use clap::Parser as clap_parser;
use clap::ValueEnum;
use smkrc::errors::RecompileError;
use smkrc::file_reader::AstFileReader;
use smkrc::{NATIVE_OUTPUT_FILE, Target, WASM_OUTPUT_FILE, recompile};
use std::fs;
use std::path::PathBuf;

#[derive(clap_parser)]
#[clap(version = "0.1.0", about = "Static recompiler for 65816 ROM disassemblies")]
struct Opts {
    /// Path to the disassembler's AST document (JSON)
    ast_path: PathBuf,
    /// Code generation target
    #[arg(value_enum)]
    target: TargetOpt,
    /// Directory the IR dump is written into (defaults to the working
    /// directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

#[derive(Copy, Clone, ValueEnum)]
enum TargetOpt {
    Native,
    Wasm,
}

fn main() -> Result<()> {
    let opts: Opts = Opts::parse();
    let target = match opts.target {
        TargetOpt::Native => Target::Native,
        TargetOpt::Wasm => Target::Wasm,
    };

    let reader = AstFileReader;
    let result = recompile(&opts.ast_path, target, &reader)?;

    let output_dir = opts.output_dir.unwrap_or_else(|| PathBuf::from("."));
    let output_path = match target {
        Target::Native => output_dir.join(NATIVE_OUTPUT_FILE),
        Target::Wasm => output_dir.join(WASM_OUTPUT_FILE),
    };

    // The dump is written even when verification failed, for post-mortem.
    match target {
        Target::Native => fs::write(&output_path, result.print())?,
        Target::Wasm => fs::write(&output_path, result.to_bitcode()?)?,
    }

    if !result.is_verified() {
        eprintln!(
            "{}",
            RecompileError::Verify {
                errors: result.verify_errors.clone(),
            }
        );
        bail!("module verification failed, IR dumped to {}", output_path.display());
    }

    println!(
        "Successfully recompiled {} to {}",
        opts.ast_path.display(),
        output_path.display()
    );

    Ok(())
}

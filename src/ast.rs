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

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

/// Operand width selected by the live MF/XF status bits at the time the
/// disassembler saw the instruction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u8")]
pub enum MemoryMode {
    SixteenBit,
    EightBit,
}

impl TryFrom<u8> for MemoryMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MemoryMode::SixteenBit),
            1 => Ok(MemoryMode::EightBit),
            other => Err(format!("invalid memory mode {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Label {
    pub name: String,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Instruction {
    pub offset: u32,
    pub pc: u32,
    pub instruction_string: String,
    pub opcode: u8,
    #[serde(default)]
    pub operand: Option<u32>,
    #[serde(default)]
    pub jump_label_name: Option<String>,
    #[serde(default)]
    pub operand_size: u32,
    pub memory_mode: MemoryMode,
    pub index_mode: MemoryMode,
    pub func_names: BTreeSet<String>,
}

impl Instruction {
    pub fn operand(&self) -> u32 {
        self.operand.unwrap_or(0)
    }

    pub fn total_size(&self) -> u32 {
        self.operand_size + 1
    }
}

// Represents a single program node; every Instruction belongs to the most
// recent preceding Label.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum ProgramNode {
    Label(Label),
    Instruction(Instruction),
}

/// The disassembler's whole output document: the node sequence plus the
/// side metadata the translator needs. Map-typed fields use ordered maps so
/// block creation and jump-table case emission are reproducible.
#[derive(Debug, Clone, Deserialize)]
pub struct RomAst {
    pub rom_reset_func_name: String,
    pub rom_reset_addr: u16,
    pub rom_nmi_func_name: String,
    pub rom_irq_func_name: String,
    pub function_names: BTreeSet<String>,
    pub offset_to_function_name: BTreeMap<u32, String>,
    pub labels_to_functions: BTreeMap<u32, BTreeMap<String, bool>>,
    pub jump_tables: BTreeMap<u32, BTreeMap<u32, String>>,
    pub return_address_manipulation_functions: BTreeMap<String, u32>,
    pub ast: Vec<ProgramNode>,
}

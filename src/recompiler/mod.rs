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

pub mod codegen;
pub mod constants;
mod finalize;

use crate::Target;
use crate::ast::{ProgramNode, RomAst};
use crate::errors::RecompileError;
use crate::ir::builder::Builder;
use crate::ir::{BlockId, FuncId, GlobalId, Module, StrId, Type, Value};
use std::collections::{BTreeMap, HashMap};

/// The IR globals backing the 65816 register file. One external-linkage
/// global per register and flag; the runtime defines the storage under the
/// same symbol names.
pub(crate) struct CpuState {
    pub a: GlobalId,
    pub db: GlobalId,
    pub dp: GlobalId,
    pub pb: GlobalId,
    pub pc: GlobalId,
    pub sp: GlobalId,
    pub x: GlobalId,
    pub y: GlobalId,
    pub p: GlobalId,
    pub carry: GlobalId,
    pub zero: GlobalId,
    pub interrupt: GlobalId,
    pub decimal: GlobalId,
    pub index_width: GlobalId,
    pub accumulator_width: GlobalId,
    pub overflow: GlobalId,
    pub negative: GlobalId,
    pub emulation: GlobalId,
}

/// Extern declarations for the runtime helper ABI (§ runtime shims). None
/// of these are defined here.
pub(crate) struct RuntimeHelpers {
    pub rom_cycle: crate::ir::ExternId,
    pub update_instruction_output: crate::ir::ExternId,
    pub panic: crate::ir::ExternId,
    pub read8: crate::ir::ExternId,
    pub write8: crate::ir::ExternId,
    pub do_ppu_frame: crate::ir::ExternId,
    pub adc8: crate::ir::ExternId,
    pub adc16: crate::ir::ExternId,
    pub sbc8: crate::ir::ExternId,
    pub sbc16: crate::ir::ExternId,
}

pub struct Recompiler {
    pub(crate) b: Builder,
    pub(crate) ast: RomAst,
    pub(crate) regs: CpuState,
    pub(crate) helpers: RuntimeHelpers,
    pub(crate) functions: BTreeMap<String, FuncId>,
    pub(crate) blocks: HashMap<String, (FuncId, BlockId)>,
    pub(crate) instruction_text: HashMap<u32, StrId>,
    /// Per manipulation function, the label block containing the marked pc.
    /// First sighting wins.
    pub(crate) manipulation_blocks: BTreeMap<String, (FuncId, BlockId)>,
    pub(crate) start: FuncId,
    start_entry: BlockId,
}

impl Recompiler {
    pub fn new(ast: RomAst, target: Target) -> Self {
        let mut module = Module::new("recompilation");
        if target == Target::Wasm {
            module.data_layout = Some("e-m:e-p:32:32-i64:64-n32:64-S128".to_string());
            module.target_triple = Some("wasm32".to_string());
        }

        let regs = CpuState {
            a: module.add_global("A", Type::I16),
            db: module.add_global("DB", Type::I8),
            dp: module.add_global("DP", Type::I16),
            pb: module.add_global("PB", Type::I8),
            pc: module.add_global("PC", Type::I16),
            sp: module.add_global("SP", Type::I16),
            x: module.add_global("X", Type::I16),
            y: module.add_global("Y", Type::I16),
            p: module.add_global("P", Type::I8),
            carry: module.add_global("CF", Type::I1),
            zero: module.add_global("ZF", Type::I1),
            interrupt: module.add_global("IF", Type::I1),
            decimal: module.add_global("DF", Type::I1),
            index_width: module.add_global("XF", Type::I1),
            accumulator_width: module.add_global("MF", Type::I1),
            overflow: module.add_global("VF", Type::I1),
            negative: module.add_global("NF", Type::I1),
            emulation: module.add_global("EF", Type::I1),
        };

        let helpers = RuntimeHelpers {
            rom_cycle: module.declare_extern("romCycle", &[Type::I32, Type::I32], Type::Void),
            update_instruction_output: module.declare_extern(
                "updateInstructionOutput",
                &[Type::I32, Type::Ptr],
                Type::Void,
            ),
            panic: module.declare_extern("panic", &[], Type::Void),
            read8: module.declare_extern("read8", &[Type::I32], Type::I8),
            write8: module.declare_extern("write8", &[Type::I32, Type::I8], Type::Void),
            do_ppu_frame: module.declare_extern("doPPUFrame", &[], Type::Void),
            adc8: module.declare_extern("ADC8", &[Type::I8], Type::I8),
            adc16: module.declare_extern("ADC16", &[Type::I16], Type::I16),
            sbc8: module.declare_extern("SBC8", &[Type::I8], Type::I8),
            sbc16: module.declare_extern("SBC16", &[Type::I16], Type::I16),
        };

        let start = module.add_function("start", Type::Void);
        let mut b = Builder::new(module);
        let start_entry = b.add_block(start, "EntryBlock");
        let start_panic = b.add_block(start, "PanicBlock");
        b.select(start, start_panic);
        b.call_void(crate::ir::Callee::Extern(helpers.panic), vec![]);
        b.ret_void();
        b.clear_cursor();

        Recompiler {
            b,
            ast,
            regs,
            helpers,
            functions: BTreeMap::new(),
            blocks: HashMap::new(),
            instruction_text: HashMap::new(),
            manipulation_blocks: BTreeMap::new(),
            start,
            start_entry,
        }
    }

    /// Runs the whole pipeline and hands back the finished module.
    pub fn run(mut self) -> Result<Module, RecompileError> {
        self.add_instruction_text_globals();
        self.create_functions();
        self.layout_blocks();
        self.generate_code();
        self.enforce_entry_invariant();
        self.wire_nmi()?;
        self.wire_irq()?;
        self.rewrite_return_address_functions();
        self.emit_start_body()?;
        Ok(self.b.into_module())
    }

    /// One private string constant per instruction, holding its disassembly
    /// text for the `updateInstructionOutput` debug hook.
    fn add_instruction_text_globals(&mut self) {
        for node in &self.ast.ast {
            if let ProgramNode::Instruction(instr) = node {
                let id = self.b.module_mut().add_string(&instr.instruction_string);
                self.instruction_text.entry(instr.offset).or_insert(id);
            }
        }
    }

    /// One IR function per identified source function. Functions that
    /// manipulate their own return address return the i1 unwind flag.
    fn create_functions(&mut self) {
        let names: Vec<String> = self.ast.function_names.iter().cloned().collect();
        for name in names {
            let ret = if self
                .ast
                .return_address_manipulation_functions
                .contains_key(&name)
            {
                Type::I1
            } else {
                Type::Void
            };
            let func = self.b.module_mut().add_function(&name, ret);
            self.functions.insert(name, func);
        }
    }

    /// Creates one basic block per (function, label) pair. A label marked as
    /// a function entry point re-points that function's entry block; when
    /// several labels are marked the last one processed wins.
    fn layout_blocks(&mut self) {
        let nodes = std::mem::take(&mut self.ast.ast);
        for node in &nodes {
            let ProgramNode::Label(label) = node else {
                continue;
            };
            let Some(functions) = self.ast.labels_to_functions.get(&label.offset).cloned() else {
                continue;
            };
            for (func_name, is_entry) in functions {
                let Some(&func) = self.functions.get(&func_name) else {
                    continue;
                };
                let block_name = format!("{}_{}", func_name, label.name);
                let block = self.b.add_block(func, &block_name);
                self.blocks.insert(block_name, (func, block));
                if is_entry {
                    self.b.module_mut().func_mut(func).entry = Some(block);
                }
            }
        }
        self.ast.ast = nodes;
    }

    /// Walks the program in AST order and fills every label's blocks. A
    /// label shared by N functions is translated N times, once per
    /// containing function.
    fn generate_code(&mut self) {
        let nodes = std::mem::take(&mut self.ast.ast);
        for (index, node) in nodes.iter().enumerate() {
            let ProgramNode::Label(label) = node else {
                continue;
            };
            let Some(functions) = self.ast.labels_to_functions.get(&label.offset).cloned() else {
                continue;
            };
            for (func_name, _) in functions {
                let block_name = format!("{}_{}", func_name, label.name);
                let Some(&(func, block)) = self.blocks.get(&block_name) else {
                    continue;
                };
                self.b.select(func, block);
                let manipulation_pc = self
                    .ast
                    .return_address_manipulation_functions
                    .get(&func_name)
                    .copied();

                let mut cursor_index = index + 1;
                let mut has_instructions = false;
                while let Some(ProgramNode::Instruction(instr)) = nodes.get(cursor_index) {
                    if self.b.cursor().is_none() {
                        // The run already ended in a jump or return; any
                        // trailing instructions are unreachable.
                        break;
                    }
                    if manipulation_pc == Some(instr.pc) {
                        self.manipulation_blocks
                            .entry(func_name.clone())
                            .or_insert((func, block));
                    }
                    self.generate_instruction(instr, &func_name);
                    has_instructions = true;
                    cursor_index += 1;
                }

                if !has_instructions {
                    // Empty label: fatal disassembler gap, crash at runtime.
                    self.emit_panic_return();
                } else if self.b.cursor().is_some() {
                    match nodes.get(cursor_index) {
                        Some(ProgramNode::Label(next)) => {
                            let next_name = format!("{}_{}", func_name, next.name);
                            match self.blocks.get(&next_name) {
                                Some(&(_, next_block)) => self.b.br(next_block),
                                None => self.emit_panic_return(),
                            }
                        }
                        _ => self.emit_panic_return(),
                    }
                }
                self.b.clear_cursor();
            }
        }
    }

    fn emit_start_body(&mut self) -> Result<(), RecompileError> {
        let reset = self.ast.rom_reset_func_name.clone();
        let Some(&reset_func) = self.functions.get(&reset) else {
            return Err(RecompileError::Inconsistent {
                reason: format!("reset function {} is not part of the module", reset),
            });
        };
        self.b.select(self.start, self.start_entry);
        let reset_addr = self.c16(u64::from(self.ast.rom_reset_addr));
        self.b.store_global(reset_addr, self.regs.pc);
        self.emit_function_call(reset_func);
        self.b.ret_void();
        self.b.clear_cursor();
        Ok(())
    }

    pub(crate) fn emit_panic_return(&mut self) {
        self.b
            .call_void(crate::ir::Callee::Extern(self.helpers.panic), vec![]);
        self.b.ret_void();
        self.b.clear_cursor();
    }

    pub(crate) fn c1(&self, bits: u64) -> Value {
        self.b.const_val(Type::I1, bits)
    }

    pub(crate) fn c8(&self, bits: u64) -> Value {
        self.b.const_val(Type::I8, bits)
    }

    pub(crate) fn c16(&self, bits: u64) -> Value {
        self.b.const_val(Type::I16, bits)
    }

    pub(crate) fn c32(&self, bits: u64) -> Value {
        self.b.const_val(Type::I32, bits)
    }
}

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

//! Post-translation passes: the function-entry invariant, interrupt entry
//! construction, the per-frame PPU tick at the wait-for-vblank site, and
//! the rewrite of functions that manipulate their own return address.

use crate::errors::RecompileError;
use crate::ir::{BlockId, Callee, FuncId, Inst, Pred, Terminator, Type, Value};
use crate::recompiler::Recompiler;
use crate::recompiler::constants::{WAIT_FOR_VBLANK_LABEL_NAME, WAIT_FOR_VBLANK_LOOP_LABEL_OFFSET};
use std::collections::HashSet;

impl Recompiler {
    /// Entry blocks must have no predecessors. A function whose entry label
    /// is also a branch target gets a fresh entry that only branches.
    pub(crate) fn enforce_entry_invariant(&mut self) {
        let functions: Vec<(String, FuncId)> = self
            .functions
            .iter()
            .map(|(name, &func)| (name.clone(), func))
            .collect();
        for (name, func) in functions {
            let f = self.b.module().func(func);
            let Some(entry) = f.entry else {
                continue;
            };
            if f.predecessor_count(entry) == 0 {
                continue;
            }
            let new_entry = self.b.add_block(func, &format!("{}_entryBlock", name));
            self.b.select(func, new_entry);
            self.b.br(entry);
            self.b.module_mut().func_mut(func).entry = Some(new_entry);
            self.b.clear_cursor();
        }
    }

    /// Interrupt entry code: the hardware pushes PB, the return pc and the
    /// packed status byte before vectoring, so the recompiled handler does
    /// the same before its body runs.
    fn interrupt_prologue(&mut self, func: FuncId, entry_name: &str) {
        let Some(old_entry) = self.b.module().func(func).entry else {
            return;
        };
        let new_entry = self.b.add_block(func, entry_name);
        self.b.select(func, new_entry);

        let pb = self.b.load_global(self.regs.pb);
        self.push(pb);
        let pc16 = self.b.load_global(self.regs.pc);
        let (low, high) = self.split16(pc16);
        self.push(high);
        self.push(low);
        let status = self.status_from_flags();
        self.push(status);

        self.b.br(old_entry);
        self.b.module_mut().func_mut(func).entry = Some(new_entry);
        self.b.clear_cursor();
    }

    pub(crate) fn wire_nmi(&mut self) -> Result<(), RecompileError> {
        let nmi_name = self.ast.rom_nmi_func_name.clone();
        let Some(&nmi) = self.functions.get(&nmi_name) else {
            return Err(RecompileError::Inconsistent {
                reason: format!("NMI function {} is not part of the module", nmi_name),
            });
        };
        self.interrupt_prologue(nmi, "NMI_EntryPoint");

        // The per-frame PPU tick plus the NMI call go in front of the
        // wait-for-vblank spin loop, in every function containing it.
        let Some(site_functions) = self
            .ast
            .labels_to_functions
            .get(&WAIT_FOR_VBLANK_LOOP_LABEL_OFFSET)
            .cloned()
        else {
            return Ok(());
        };
        for (func_name, _) in site_functions {
            let block_name = format!("{}_{}", func_name, WAIT_FOR_VBLANK_LABEL_NAME);
            let Some(&(func, block)) = self.blocks.get(&block_name) else {
                continue;
            };
            let nmi_ret = self.b.module().func(nmi).ret;
            let module = self.b.module_mut();
            let nmi_call_id = if nmi_ret == Type::Void {
                None
            } else {
                Some(module.func_mut(func).alloc_value())
            };
            let insert_at = module.func(func).block(block).first_non_phi();
            let insts = &mut module.func_mut(func).block_mut(block).insts;
            insts.insert(
                insert_at,
                Inst::Call {
                    id: None,
                    callee: Callee::Extern(self.helpers.do_ppu_frame),
                    args: vec![],
                },
            );
            insts.insert(
                insert_at + 1,
                Inst::Call {
                    id: nmi_call_id,
                    callee: Callee::Function(nmi),
                    args: vec![],
                },
            );
        }
        Ok(())
    }

    pub(crate) fn wire_irq(&mut self) -> Result<(), RecompileError> {
        let irq_name = self.ast.rom_irq_func_name.clone();
        let Some(&irq) = self.functions.get(&irq_name) else {
            return Err(RecompileError::Inconsistent {
                reason: format!("IRQ function {} is not part of the module", irq_name),
            });
        };
        self.interrupt_prologue(irq, &format!("{}_entryBlock", irq_name));
        Ok(())
    }

    /// Functions that pop their own return address signal "unwind one more
    /// frame" through their i1 result. Every call site gets an unwind
    /// check spliced in directly after the call; the functions themselves
    /// get a `returnValue` slot that turns true at the manipulation site.
    pub(crate) fn rewrite_return_address_functions(&mut self) {
        let manipulation_funcs: HashSet<FuncId> = self
            .ast
            .return_address_manipulation_functions
            .keys()
            .filter_map(|name| self.functions.get(name).copied())
            .collect();
        if manipulation_funcs.is_empty() {
            return;
        }

        self.splice_unwind_checks(&manipulation_funcs);

        let names: Vec<String> = self
            .ast
            .return_address_manipulation_functions
            .keys()
            .cloned()
            .collect();
        for name in names {
            let Some(&func) = self.functions.get(&name) else {
                continue;
            };
            self.rewrite_manipulation_function(&name, func);
        }
    }

    /// Module-wide pass over every call to a manipulation function: split
    /// the block after the call and return early when the callee reports
    /// an unwind. Tail halves are appended and scanned in turn, so chained
    /// calls in one block are all covered.
    fn splice_unwind_checks(&mut self, manipulation_funcs: &HashSet<FuncId>) {
        let function_count = self.b.module().functions.len();
        for func_index in 0..function_count {
            let func = FuncId(func_index);
            let mut block_index = 0;
            while block_index < self.b.module().func(func).blocks.len() {
                let block = BlockId(block_index);
                let call_pos = self.b.module().func(func).block(block).insts.iter().position(
                    |inst| {
                        matches!(inst, Inst::Call { callee: Callee::Function(target), .. }
                            if manipulation_funcs.contains(target))
                    },
                );
                if let Some(call_pos) = call_pos {
                    self.splice_unwind_check(func, block, call_pos);
                }
                block_index += 1;
            }
        }
    }

    fn splice_unwind_check(&mut self, func: FuncId, block: BlockId, call_pos: usize) {
        let module = self.b.module_mut();
        let f = module.func_mut(func);

        let call_id = f.block(block).insts[call_pos]
            .result()
            .expect("manipulation calls carry their i1 result");
        let cmp_id = f.alloc_value();

        let ret_block = f.add_block("bb");
        f.block_mut(ret_block).term = Some(Terminator::RetVoid);

        let tail_block = f.add_block("bb");
        let tail_insts = f.block_mut(block).insts.split_off(call_pos + 1);
        let tail_term = f.block_mut(block).term.take();
        f.block_mut(tail_block).insts = tail_insts;
        f.block_mut(tail_block).term = tail_term;

        f.block_mut(block).insts.push(Inst::ICmp {
            id: cmp_id,
            pred: Pred::Eq,
            ty: Type::I1,
            lhs: Value::Inst(call_id),
            rhs: Value::Const {
                ty: Type::I1,
                bits: 1,
            },
        });
        f.block_mut(block).term = Some(Terminator::CondBr {
            cond: Value::Inst(cmp_id),
            then_block: ret_block,
            else_block: tail_block,
        });

        // The moved terminator's successors now see the tail as their
        // predecessor.
        f.retarget_phi_sources(block, tail_block);
    }

    fn rewrite_manipulation_function(&mut self, name: &str, func: FuncId) {
        let marked_block = self.manipulation_blocks.get(name).map(|&(_, block)| block);
        let module = self.b.module_mut();
        let f = module.func_mut(func);
        let Some(entry) = f.entry else {
            return;
        };

        // returnValue = false at function entry.
        let slot_id = f.alloc_value();
        let init_at = f.block(entry).first_non_phi();
        f.block_mut(entry).insts.insert(
            init_at,
            Inst::Alloca {
                id: slot_id,
                ty: Type::I1,
            },
        );
        f.block_mut(entry).insts.insert(
            init_at + 1,
            Inst::Store {
                ty: Type::I1,
                value: Value::Const {
                    ty: Type::I1,
                    bits: 0,
                },
                ptr: Value::Inst(slot_id),
            },
        );

        // Every return reports the slot.
        for block_index in 0..f.blocks.len() {
            let block = BlockId(block_index);
            let is_return = matches!(
                f.block(block).term,
                Some(Terminator::Ret(_)) | Some(Terminator::RetVoid)
            );
            if !is_return {
                continue;
            }
            let load_id = f.alloc_value();
            f.block_mut(block).insts.push(Inst::Load {
                id: load_id,
                ty: Type::I1,
                ptr: Value::Inst(slot_id),
            });
            f.block_mut(block).term = Some(Terminator::Ret(Value::Inst(load_id)));
        }

        // The manipulation site flips the slot. When the marked block is
        // the entry itself the initializing store simply starts out true.
        match marked_block {
            Some(block) if block == entry => {
                f.block_mut(entry).insts[init_at + 1] = Inst::Store {
                    ty: Type::I1,
                    value: Value::Const {
                        ty: Type::I1,
                        bits: 1,
                    },
                    ptr: Value::Inst(slot_id),
                };
            }
            Some(block) => {
                let store_at = f.block(block).first_non_phi();
                f.block_mut(block).insts.insert(
                    store_at,
                    Inst::Store {
                        ty: Type::I1,
                        value: Value::Const {
                            ty: Type::I1,
                            bits: 1,
                        },
                        ptr: Value::Inst(slot_id),
                    },
                );
            }
            None => {}
        }
    }
}

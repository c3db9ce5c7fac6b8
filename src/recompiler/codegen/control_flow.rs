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

//! Branches, jumps, runtime-dispatched jump tables, subroutine calls and
//! returns. Branch and jump targets resolve against the qualified
//! `<function>_<label>` block registry; a target the disassembler never
//! described lowers to a `panic` so the gap surfaces at run time instead
//! of as silent misbehaviour.

use crate::ir::{Callee, FuncId, Type, Value};
use crate::recompiler::Recompiler;

impl Recompiler {
    /// Conditional branch. Unconditional BRA/BRL pass a constant-true
    /// condition through the same shape.
    pub(crate) fn branch(&mut self, cond: Value, label: &str, function_name: &str) {
        let block_name = format!("{}_{}", function_name, label);
        match self.blocks.get(&block_name) {
            Some(&(_, target)) => {
                let (take_block, end_block) = self.cond_then(cond);
                self.select_block(take_block);
                self.b.br(target);
                self.select_block(end_block);
            }
            None => self.emit_panic_return(),
        }
    }

    pub(crate) fn jump(&mut self, label: &str, function_name: &str) {
        let block_name = format!("{}_{}", function_name, label);
        match self.blocks.get(&block_name) {
            Some(&(_, target)) => {
                self.b.br(target);
                self.b.clear_cursor();
            }
            None => self.emit_panic_return(),
        }
    }

    /// The 24-bit program-bank:program-counter pair as one i32.
    pub(crate) fn pbpc32(&mut self) -> Value {
        let pc16 = self.b.load_global(self.regs.pc);
        let pc32 = self.b.zext(pc16, Type::I16, Type::I32);
        let pb8 = self.b.load_global(self.regs.pb);
        let pb32 = self.b.zext(pb8, Type::I8, Type::I32);
        let pb_shifted = self.b.shl(Type::I32, pb32, self.c32(16));
        self.b.or(Type::I32, pb_shifted, pc32)
    }

    /// Materializes the disassembler's jump table for this site as a switch
    /// over the computed PBPC. Values outside the table panic.
    pub(crate) fn insert_jump_table(
        &mut self,
        switch_value: Value,
        instruction_offset: u32,
        function_name: &str,
    ) {
        let origin = self.b.cursor().expect("no insertion block selected");
        let entries = self
            .ast
            .jump_tables
            .get(&instruction_offset)
            .cloned()
            .unwrap_or_default();

        let end_block = self.b.add_block_here("bb");
        let panic_block = self.b.add_block_here("PanicBlock");

        let mut cases = Vec::new();
        for (address, label) in entries {
            let block_name = format!("{}_{}", function_name, label);
            let Some(&(_, target)) = self.blocks.get(&block_name) else {
                continue;
            };
            let case_block = self.b.add_block_here("bb");
            self.select_block(case_block);
            self.b.br(target);
            cases.push((address, case_block));
        }

        self.select_block(panic_block);
        self.b
            .call_void(Callee::Extern(self.helpers.panic), vec![]);
        self.b.br(end_block);

        // The switch terminates the block that computed the PBPC value.
        self.b.select(origin.0, origin.1);
        self.b.switch(switch_value, panic_block, cases);

        self.select_block(end_block);
    }

    /// JMP (addr): pointer fetched from bank zero.
    pub(crate) fn jump_indirect(
        &mut self,
        instruction_offset: u32,
        operand16: Value,
        function_name: &str,
    ) {
        let low_address = self.b.zext(operand16, Type::I16, Type::I32);
        let low = self.read8(low_address);
        let operand_high = self.b.add(Type::I16, operand16, self.c16(1));
        let high_address = self.b.zext(operand_high, Type::I16, Type::I32);
        let high = self.read8(high_address);

        let (pc_low_ptr, pc_high_ptr) = self.low_high_ptr(self.regs.pc);
        self.b.store(Type::I8, low, pc_low_ptr);
        self.b.store(Type::I8, high, pc_high_ptr);

        let address = self.pbpc32();
        self.insert_jump_table(address, instruction_offset, function_name);
    }

    /// JMP (addr,X): pointer fetched in the program bank.
    pub(crate) fn jump_indexed_indirect(
        &mut self,
        instruction_offset: u32,
        operand16: Value,
        function_name: &str,
    ) {
        let (low, high) = self.read_program_bank_pointer(operand16);

        let (pc_low_ptr, pc_high_ptr) = self.low_high_ptr(self.regs.pc);
        self.b.store(Type::I8, low, pc_low_ptr);
        self.b.store(Type::I8, high, pc_high_ptr);

        let address = self.pbpc32();
        self.insert_jump_table(address, instruction_offset, function_name);
    }

    /// JMP [addr]: three pointer bytes from bank zero select bank and pc at
    /// once.
    pub(crate) fn jump_indirect_long(
        &mut self,
        instruction_offset: u32,
        operand16: Value,
        function_name: &str,
    ) {
        let low_address = self.b.zext(operand16, Type::I16, Type::I32);
        let low = self.read8(low_address);
        let operand_mid = self.b.add(Type::I16, operand16, self.c16(1));
        let mid_address = self.b.zext(operand_mid, Type::I16, Type::I32);
        let mid = self.read8(mid_address);
        let operand_high = self.b.add(Type::I16, operand16, self.c16(2));
        let high_address = self.b.zext(operand_high, Type::I16, Type::I32);
        let high = self.read8(high_address);

        let address = self.combine32(low, mid, high);
        self.insert_jump_table(address, instruction_offset, function_name);
    }

    /// Direct IR call; the result is materialized for i1-returning callees
    /// so the finalizer can splice the unwind test after it.
    pub(crate) fn emit_function_call(&mut self, func: FuncId) {
        if self.b.module().func(func).ret == Type::Void {
            self.b.call_void(Callee::Function(func), vec![]);
        } else {
            let _ = self.b.call(Callee::Function(func), vec![]);
        }
    }

    /// The statically identified callee of a JSR/JSL site.
    pub(crate) fn call_function_at(&mut self, instruction_offset: u32) {
        let target = self
            .ast
            .offset_to_function_name
            .get(&instruction_offset)
            .and_then(|name| self.functions.get(name))
            .copied();
        match target {
            Some(func) => self.emit_function_call(func),
            None => self.emit_panic_return(),
        }
    }

    /// JSR abs: return address (pc of the next instruction minus one) goes
    /// on the stack before the direct call.
    pub(crate) fn call_short(&mut self, instruction_offset: u32) {
        let pc16 = self.b.load_global(self.regs.pc);
        let return_pc = self.b.add(Type::I16, pc16, self.c16(2));
        let (low, high) = self.split16(return_pc);
        self.push(high);
        self.push(low);
        self.call_function_at(instruction_offset);
    }

    /// JSL long: bank byte first, then the 16-bit return pc, with native
    /// stack arithmetic corrected afterwards.
    pub(crate) fn call_long(&mut self, instruction_offset: u32) {
        let pb8 = self.b.load_global(self.regs.pb);
        self.push(pb8);
        let pc16 = self.b.load_global(self.regs.pc);
        let return_pc = self.b.add(Type::I16, pc16, self.c16(3));
        let (low, high) = self.split16(return_pc);
        self.push(high);
        self.push(low);
        self.force_stack_emulation_invariant();
        self.call_function_at(instruction_offset);
    }

    /// JSR (addr,X): runtime-dispatched call through the jump table; every
    /// case calls its function and rejoins at a common post-call block.
    pub(crate) fn call_indexed_indirect(&mut self, instruction_offset: u32, operand16: Value) {
        let pc16 = self.b.load_global(self.regs.pc);
        let return_pc = self.b.add(Type::I16, pc16, self.c16(2));
        let (return_low, return_high) = self.split16(return_pc);
        self.push_native(return_high);
        self.push_native(return_low);

        let (low, high) = self.read_program_bank_pointer(operand16);
        let (pc_low_ptr, pc_high_ptr) = self.low_high_ptr(self.regs.pc);
        self.b.store(Type::I8, low, pc_low_ptr);
        self.b.store(Type::I8, high, pc_high_ptr);

        let address = self.pbpc32();
        self.force_stack_emulation_invariant();
        let origin = self.b.cursor().expect("no insertion block selected");

        let entries = self
            .ast
            .jump_tables
            .get(&instruction_offset)
            .cloned()
            .unwrap_or_default();

        let end_block = self.b.add_block_here("bb");
        let panic_block = self.b.add_block_here("PanicBlock");

        let mut cases = Vec::new();
        for (case_address, function) in entries {
            let Some(&func) = self.functions.get(&function) else {
                continue;
            };
            let case_block = self.b.add_block_here("bb");
            self.select_block(case_block);
            self.emit_function_call(func);
            self.b.br(end_block);
            cases.push((case_address, case_block));
        }

        self.select_block(panic_block);
        self.b
            .call_void(Callee::Extern(self.helpers.panic), vec![]);
        self.b.br(end_block);

        self.b.select(origin.0, origin.1);
        self.b.switch(address, panic_block, cases);

        self.select_block(end_block);
    }

    /// RTI: restore P from the stack, re-apply the forced implications,
    /// then drop the return pc (and the bank byte in native mode). The IR
    /// call/return discipline already provides the continuation.
    pub(crate) fn return_interrupt(&mut self) {
        let status = self.pull();
        self.set_flags_from_status(status);
        self.force_status_invariants();
        self.pull();

        let emulation = self.b.load_global(self.regs.emulation);
        let cond = self
            .b
            .icmp(crate::ir::Pred::Eq, Type::I1, emulation, self.c1(1));
        let (then_block, else_block, end_block) = self.cond_then_else(cond);

        self.select_block(then_block);
        self.pull();
        self.b.br(end_block);

        self.select_block(else_block);
        self.pull();
        self.pull();
        self.b.br(end_block);

        self.select_block(end_block);
        self.b.ret_void();
        self.b.clear_cursor();
    }

    pub(crate) fn return_short(&mut self) {
        self.pull();
        self.pull();
        self.b.ret_void();
        self.b.clear_cursor();
    }

    pub(crate) fn return_long(&mut self) {
        self.pull_native();
        self.pull_native();
        self.pull_native();
        self.force_stack_emulation_invariant();
        self.b.ret_void();
        self.b.clear_cursor();
    }

    /// Two pointer bytes fetched at `PB:(operand + X)`.
    fn read_program_bank_pointer(&mut self, operand16: Value) -> (Value, Value) {
        let pb8 = self.b.load_global(self.regs.pb);
        let pb32 = self.b.zext(pb8, Type::I8, Type::I32);
        let pb_shifted = self.b.shl(Type::I32, pb32, self.c32(16));

        let x16 = self.b.load_global(self.regs.x);
        let low_offset = self.b.add(Type::I16, operand16, x16);
        let low_offset32 = self.b.zext(low_offset, Type::I16, Type::I32);
        let low_address = self.b.or(Type::I32, pb_shifted, low_offset32);

        let high_offset = self.b.add(Type::I16, low_offset, self.c16(1));
        let high_offset32 = self.b.zext(high_offset, Type::I16, Type::I32);
        let high_address = self.b.or(Type::I32, pb_shifted, high_offset32);

        let low = self.read8(low_address);
        let high = self.read8(high_address);
        (low, high)
    }
}

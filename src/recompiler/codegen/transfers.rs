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

//! Register transfers, the exchange instructions, and the push/pull family.

use super::WidthFlag;
use crate::ir::{GlobalId, Pred, Type, Value};
use crate::recompiler::Recompiler;

impl Recompiler {
    /// Width-governed register transfer (TAX, TXA, TAY, ...). The 8-bit arm
    /// only moves the low byte.
    pub(crate) fn transfer(&mut self, flag: WidthFlag, source: GlobalId, destination: GlobalId) {
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let (source_low_ptr, _) = self.low_high_ptr(source);
        let (destination_low_ptr, _) = self.low_high_ptr(destination);
        let low = self.b.load(Type::I8, source_low_ptr);
        self.b.store(Type::I8, low, destination_low_ptr);
        self.set_zn8(low);
        self.b.br(end);

        self.select_block(notset);
        self.transfer16(source, destination);
        self.b.br(end);

        self.select_block(end);
    }

    /// Full 16-bit transfer regardless of the width flags (TCD, TDC, TSC).
    pub(crate) fn transfer16(&mut self, source: GlobalId, destination: GlobalId) {
        let value = self.b.load_global(source);
        self.b.store_global(value, destination);
        self.set_zn16(value);
    }

    /// TCS: no flags, but the emulation-mode SP pin must be re-applied.
    pub(crate) fn transfer_cs(&mut self) {
        let a16 = self.b.load_global(self.regs.a);
        self.b.store_global(a16, self.regs.sp);
        self.force_stack_emulation_invariant();
    }

    /// TSX under XF.
    pub(crate) fn transfer_sx(&mut self, flag: WidthFlag) {
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let (sp_low_ptr, _) = self.low_high_ptr(self.regs.sp);
        let (x_low_ptr, _) = self.low_high_ptr(self.regs.x);
        let low = self.b.load(Type::I8, sp_low_ptr);
        self.b.store(Type::I8, low, x_low_ptr);
        self.set_zn8(low);
        self.b.br(end);

        self.select_block(notset);
        let sp16 = self.b.load_global(self.regs.sp);
        self.b.store_global(sp16, self.regs.x);
        self.set_zn16(sp16);
        self.b.br(end);

        self.select_block(end);
    }

    /// TXS: no flags; in emulation mode only the low byte moves.
    pub(crate) fn transfer_xs(&mut self) {
        let emulation = self.b.load_global(self.regs.emulation);
        let cond = self.b.icmp(Pred::Eq, Type::I1, emulation, self.c1(1));
        let (then_block, else_block, end_block) = self.cond_then_else(cond);

        self.select_block(then_block);
        let (x_low_ptr, _) = self.low_high_ptr(self.regs.x);
        let (sp_low_ptr, _) = self.low_high_ptr(self.regs.sp);
        let low = self.b.load(Type::I8, x_low_ptr);
        self.b.store(Type::I8, low, sp_low_ptr);
        self.b.br(end_block);

        self.select_block(else_block);
        let x16 = self.b.load_global(self.regs.x);
        self.b.store_global(x16, self.regs.sp);
        self.b.br(end_block);

        self.select_block(end_block);
    }

    /// XBA: swaps the accumulator halves; Z and N reflect the new low byte.
    pub(crate) fn exchange_ba(&mut self) {
        let (a_low_ptr, a_high_ptr) = self.low_high_ptr(self.regs.a);
        let low = self.b.load(Type::I8, a_low_ptr);
        let high = self.b.load(Type::I8, a_high_ptr);
        self.b.store(Type::I8, low, a_high_ptr);
        self.b.store(Type::I8, high, a_low_ptr);
        self.set_zn8(high);
    }

    /// XCE: swaps CF and EF. Entering emulation mode forces the 8-bit
    /// register widths and pins the stack to page 1.
    pub(crate) fn exchange_ce(&mut self) {
        let new_emulation = self.b.load_global(self.regs.carry);
        let new_carry = self.b.load_global(self.regs.emulation);
        self.b.store_global(new_emulation, self.regs.emulation);
        self.b.store_global(new_carry, self.regs.carry);

        let (then_block, end_block) = self.cond_then(new_emulation);

        self.select_block(then_block);
        self.set_flag(self.regs.index_width);
        self.set_flag(self.regs.accumulator_width);
        let (_, x_high_ptr) = self.low_high_ptr(self.regs.x);
        self.b.store(Type::I8, self.c8(0), x_high_ptr);
        let (_, y_high_ptr) = self.low_high_ptr(self.regs.y);
        self.b.store(Type::I8, self.c8(0), y_high_ptr);
        let (_, sp_high_ptr) = self.low_high_ptr(self.regs.sp);
        self.b.store(Type::I8, self.c8(1), sp_high_ptr);
        self.b.br(end_block);

        self.select_block(end_block);
    }

    // --- pushes ---

    pub(crate) fn push_register(&mut self, flag: WidthFlag, value16: Value) {
        let (low, high) = self.split16(value16);
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        self.push(low);
        self.b.br(end);

        self.select_block(notset);
        self.push(high);
        self.push(low);
        self.b.br(end);

        self.select_block(end);
    }

    pub(crate) fn push8(&mut self, value8: Value) {
        self.push(value8);
    }

    /// PHD always moves 16 bits and uses native stack arithmetic.
    pub(crate) fn push_dp(&mut self) {
        let (dp_low_ptr, dp_high_ptr) = self.low_high_ptr(self.regs.dp);
        let low = self.b.load(Type::I8, dp_low_ptr);
        let high = self.b.load(Type::I8, dp_high_ptr);
        self.push_native(high);
        self.push_native(low);
        self.force_stack_emulation_invariant();
    }

    /// PEA.
    pub(crate) fn push_effective_address(&mut self, operand16: Value) {
        let (low, high) = self.split16(operand16);
        self.push_native(high);
        self.push_native(low);
        self.force_stack_emulation_invariant();
    }

    /// PEI: pushes the 16-bit word at the direct-page operand.
    pub(crate) fn push_effective_indirect_address(&mut self, address32: Value) {
        let low = self.read_direct_native(address32);
        let high_address = self.b.add(Type::I32, address32, self.c32(1));
        let high = self.read_direct_native(high_address);
        self.push_native(high);
        self.push_native(low);
        self.force_stack_emulation_invariant();
    }

    /// PER: pushes pc-relative address material.
    pub(crate) fn push_effective_relative_address(&mut self, operand16: Value) {
        let pbpc = self.pbpc32();
        let operand32 = self.b.zext(operand16, Type::I16, Type::I32);
        let result32 = self.b.add(Type::I32, pbpc, operand32);
        let result16 = self.b.trunc(result32, Type::I32, Type::I16);
        let (low, high) = self.split16(result16);
        self.push_native(high);
        self.push_native(low);
        self.force_stack_emulation_invariant();
    }

    // --- pulls ---

    pub(crate) fn pull_register(&mut self, flag: WidthFlag, register: GlobalId) {
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let (low_ptr, _) = self.low_high_ptr(register);
        let value = self.pull();
        self.b.store(Type::I8, value, low_ptr);
        self.set_zn8(value);
        self.b.br(end);

        self.select_block(notset);
        let (low_ptr, high_ptr) = self.low_high_ptr(register);
        let low = self.pull();
        self.b.store(Type::I8, low, low_ptr);
        let high = self.pull();
        self.b.store(Type::I8, high, high_ptr);
        let value16 = self.b.load_global(register);
        self.set_zn16(value16);
        self.b.br(end);

        self.select_block(end);
    }

    pub(crate) fn pull_dp(&mut self) {
        let (dp_low_ptr, dp_high_ptr) = self.low_high_ptr(self.regs.dp);
        let low = self.pull_native();
        self.b.store(Type::I8, low, dp_low_ptr);
        let high = self.pull_native();
        self.b.store(Type::I8, high, dp_high_ptr);
        let value16 = self.b.load_global(self.regs.dp);
        self.set_zn16(value16);
        self.force_stack_emulation_invariant();
    }

    pub(crate) fn pull_db(&mut self) {
        let value = self.pull();
        self.b.store_global(value, self.regs.db);
        self.set_zn8(value);
    }

    pub(crate) fn pull_status(&mut self) {
        let value = self.pull();
        self.set_flags_from_status(value);
        self.force_status_invariants();
    }
}

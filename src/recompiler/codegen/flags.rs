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

//! Status-register handling: packing the nine flag globals into the P byte
//! and back, REP/SEP masking, and the forced implications that keep the
//! register file consistent with the emulation and width flags.

use crate::ir::{GlobalId, Pred, Type, Value};
use crate::recompiler::Recompiler;
use crate::recompiler::constants::*;

impl Recompiler {
    pub(crate) fn set_flag(&mut self, flag: GlobalId) {
        self.b.store_global(self.c1(1), flag);
    }

    pub(crate) fn clear_flag(&mut self, flag: GlobalId) {
        self.b.store_global(self.c1(0), flag);
    }

    /// Packs the eight status flags into the P byte layout.
    pub(crate) fn status_from_flags(&mut self) -> Value {
        let pairs = [
            (self.regs.zero, 1u64),
            (self.regs.interrupt, 2),
            (self.regs.decimal, 3),
            (self.regs.index_width, 4),
            (self.regs.accumulator_width, 5),
            (self.regs.overflow, 6),
            (self.regs.negative, 7),
        ];
        let mut status = self.load_flag8(self.regs.carry);
        for (flag, shift) in pairs {
            let bit8 = self.load_flag8(flag);
            let shifted = self.b.shl(Type::I8, bit8, self.c8(shift));
            status = self.b.or(Type::I8, status, shifted);
        }
        status
    }

    pub(crate) fn set_flags_from_status(&mut self, status8: Value) {
        let pairs = [
            (self.regs.carry, P_CARRY),
            (self.regs.zero, P_ZERO),
            (self.regs.interrupt, P_INTERRUPT),
            (self.regs.decimal, P_DECIMAL),
            (self.regs.index_width, P_INDEX),
            (self.regs.accumulator_width, P_ACCUMULATOR),
            (self.regs.overflow, P_OVERFLOW),
            (self.regs.negative, P_NEGATIVE),
        ];
        for (flag, mask) in pairs {
            let bit = self.test_bits8(status8, mask);
            self.b.store_global(bit, flag);
        }
    }

    /// Re-establishes `EF ⇒ XF ∧ MF` and `XF ⇒ X.high = Y.high = 0` after
    /// anything that can rewrite P or EF.
    pub(crate) fn force_status_invariants(&mut self) {
        let emulation = self.b.load_global(self.regs.emulation);
        let emulation_set = self.b.icmp(Pred::Eq, Type::I1, emulation, self.c1(1));
        let (then_block, end_block) = self.cond_then(emulation_set);

        self.select_block(then_block);
        self.set_flag(self.regs.index_width);
        self.set_flag(self.regs.accumulator_width);
        self.b.br(end_block);

        self.select_block(end_block);
        let index_width = self.b.load_global(self.regs.index_width);
        let index_set = self.b.icmp(Pred::Eq, Type::I1, index_width, self.c1(1));
        let (then_block, end_block) = self.cond_then(index_set);

        self.select_block(then_block);
        let (_, x_high_ptr) = self.low_high_ptr(self.regs.x);
        self.b.store(Type::I8, self.c8(0), x_high_ptr);
        let (_, y_high_ptr) = self.low_high_ptr(self.regs.y);
        self.b.store(Type::I8, self.c8(0), y_high_ptr);
        self.b.br(end_block);

        self.select_block(end_block);
    }

    /// Re-establishes `EF ⇒ SP.high = 0x01` after native stack arithmetic.
    pub(crate) fn force_stack_emulation_invariant(&mut self) {
        let emulation = self.b.load_global(self.regs.emulation);
        let emulation_set = self.b.icmp(Pred::Eq, Type::I1, emulation, self.c1(1));
        let (then_block, end_block) = self.cond_then(emulation_set);

        self.select_block(then_block);
        let (_, sp_high_ptr) = self.low_high_ptr(self.regs.sp);
        self.b.store(Type::I8, self.c8(1), sp_high_ptr);
        self.b.br(end_block);

        self.select_block(end_block);
    }

    /// REP: clear the P bits named by the operand.
    pub(crate) fn reset_status_bits(&mut self, operand8: Value) {
        let status = self.status_from_flags();
        let complement = self.b.xor(Type::I8, operand8, self.c8(0xff));
        let result = self.b.and(Type::I8, status, complement);
        self.set_flags_from_status(result);
        self.force_status_invariants();
    }

    /// SEP: set the P bits named by the operand.
    pub(crate) fn set_status_bits(&mut self, operand8: Value) {
        let status = self.status_from_flags();
        let result = self.b.or(Type::I8, status, operand8);
        self.set_flags_from_status(result);
        self.force_status_invariants();
    }
}

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

//! MVN/MVP block moves. Each lowers to a self-looping mini-CFG: the move
//! body copies one byte from X in the source bank to Y in the destination
//! bank, steps both indices by the direction constant, decrements A, and
//! loops until A has passed zero.

use super::WidthFlag;
use crate::ir::{Pred, Type, Value};
use crate::recompiler::Recompiler;

impl Recompiler {
    /// Operand byte layout: high byte source bank, low byte destination
    /// bank. `adjust16` is +1 for MVN and -1 for MVP.
    pub(crate) fn block_move(&mut self, flag: WidthFlag, operand32: Value, adjust16: Value) {
        let masked_source = self.b.and(Type::I32, operand32, self.c32(0xff00));
        let source_bank = self.b.lshr(Type::I32, masked_source, self.c32(8));
        let destination_bank = self.b.and(Type::I32, operand32, self.c32(0xff));

        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let adjust8 = self.b.trunc(adjust16, Type::I16, Type::I8);
        self.block_move8(source_bank, destination_bank, adjust8, set, end);

        self.select_block(notset);
        self.block_move16(source_bank, destination_bank, adjust16, notset, end);

        self.select_block(end);
    }

    /// One byte through the bus; the destination bank becomes the live DB.
    fn block_move_body(&mut self, source_bank: Value, destination_bank: Value) {
        let db8 = self.b.trunc(destination_bank, Type::I32, Type::I8);
        self.b.store_global(db8, self.regs.db);

        let x32 = self.load_register32(self.regs.x);
        let source_shifted = self.b.shl(Type::I32, source_bank, self.c32(16));
        let read_address = self.b.or(Type::I32, source_shifted, x32);
        let byte = self.read8(read_address);

        let y32 = self.load_register32(self.regs.y);
        let destination_shifted = self.b.shl(Type::I32, destination_bank, self.c32(16));
        let write_address = self.b.or(Type::I32, destination_shifted, y32);
        self.write8(write_address, byte);
    }

    fn block_move8(
        &mut self,
        source_bank: Value,
        destination_bank: Value,
        adjust8: Value,
        loop_block: crate::ir::BlockId,
        end_block: crate::ir::BlockId,
    ) {
        self.block_move_body(source_bank, destination_bank);

        let (x_low_ptr, _) = self.low_high_ptr(self.regs.x);
        let x_low = self.b.load(Type::I8, x_low_ptr);
        let x_stepped = self.b.add(Type::I8, x_low, adjust8);
        self.b.store(Type::I8, x_stepped, x_low_ptr);

        let (y_low_ptr, _) = self.low_high_ptr(self.regs.y);
        let y_low = self.b.load(Type::I8, y_low_ptr);
        let y_stepped = self.b.add(Type::I8, y_low, adjust8);
        self.b.store(Type::I8, y_stepped, y_low_ptr);

        let a16 = self.b.load_global(self.regs.a);
        let a_dropped = self.b.sub(Type::I16, a16, self.c16(1));
        self.b.store_global(a_dropped, self.regs.a);

        let more = self.b.icmp(Pred::Ne, Type::I16, a16, self.c16(0));
        self.b.cond_br(more, loop_block, end_block);
    }

    fn block_move16(
        &mut self,
        source_bank: Value,
        destination_bank: Value,
        adjust16: Value,
        loop_block: crate::ir::BlockId,
        end_block: crate::ir::BlockId,
    ) {
        self.block_move_body(source_bank, destination_bank);

        let x16 = self.b.load_global(self.regs.x);
        let x_stepped = self.b.add(Type::I16, x16, adjust16);
        self.b.store_global(x_stepped, self.regs.x);

        let y16 = self.b.load_global(self.regs.y);
        let y_stepped = self.b.add(Type::I16, y16, adjust16);
        self.b.store_global(y_stepped, self.regs.y);

        let a16 = self.b.load_global(self.regs.a);
        let a_dropped = self.b.sub(Type::I16, a16, self.c16(1));
        self.b.store_global(a_dropped, self.regs.a);

        let more = self.b.icmp(Pred::Ne, Type::I16, a16, self.c16(0));
        self.b.cond_br(more, loop_block, end_block);
    }
}

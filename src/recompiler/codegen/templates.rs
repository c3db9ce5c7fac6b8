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

//! Addressing-mode templates. One template per opcode class and mode:
//! each tests the governing width flag, runs an 8-bit arm and a 16-bit arm
//! that compute the mode's effective address and move bytes through the
//! bus, and rejoins at a shared continuation block. The arithmetic itself
//! is delegated to the [`Op`](super::operations::Op) selector.

use super::WidthFlag;
use super::operations::Op;
use crate::ir::{GlobalId, Type, Value};
use crate::recompiler::Recompiler;

impl Recompiler {
    // --- read templates ---

    pub(crate) fn immediate_read(&mut self, op: Op, flag: WidthFlag, operand16: Value) {
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let operand8 = self.b.trunc(operand16, Type::I16, Type::I8);
        self.apply_op8(op, operand8);
        self.b.br(end);

        self.select_block(notset);
        self.apply_op16(op, operand16);
        self.b.br(end);

        self.select_block(end);
    }

    pub(crate) fn bank_read(&mut self, op: Op, flag: WidthFlag, address32: Value) {
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let read = self.read_bank(address32);
        self.apply_op8(op, read);
        self.b.br(end);

        self.select_block(notset);
        let low = self.read_bank(address32);
        let high_address = self.b.add(Type::I32, address32, self.c32(1));
        let high = self.read_bank(high_address);
        let read16 = self.combine16(low, high);
        self.apply_op16(op, read16);
        self.b.br(end);

        self.select_block(end);
    }

    /// Absolute indexed: `(DB << 16) + operand16 + index`.
    pub(crate) fn bank_read_indexed(
        &mut self,
        op: Op,
        flag: WidthFlag,
        address16: Value,
        index: Value,
    ) {
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let sum = self.b.add(Type::I16, address16, index);
        let address = self.b.zext(sum, Type::I16, Type::I32);
        let read = self.read_bank(address);
        self.apply_op8(op, read);
        self.b.br(end);

        self.select_block(notset);
        let sum = self.b.add(Type::I16, address16, index);
        let low_address = self.b.zext(sum, Type::I16, Type::I32);
        let high_address = self.b.add(Type::I32, low_address, self.c32(1));
        let low = self.read_bank(low_address);
        let high = self.read_bank(high_address);
        let read16 = self.combine16(low, high);
        self.apply_op16(op, read16);
        self.b.br(end);

        self.select_block(end);
    }

    pub(crate) fn long_read(&mut self, op: Op, flag: WidthFlag, address32: Value, index: Value) {
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let index32 = self.b.zext(index, Type::I16, Type::I32);
        let address = self.b.add(Type::I32, address32, index32);
        let read = self.read_long(address);
        self.apply_op8(op, read);
        self.b.br(end);

        self.select_block(notset);
        let index32 = self.b.zext(index, Type::I16, Type::I32);
        let low_address = self.b.add(Type::I32, address32, index32);
        let high_address = self.b.add(Type::I32, low_address, self.c32(1));
        let low = self.read_long(low_address);
        let high = self.read_long(high_address);
        let read16 = self.combine16(low, high);
        self.apply_op16(op, read16);
        self.b.br(end);

        self.select_block(end);
    }

    pub(crate) fn direct_read(&mut self, op: Op, flag: WidthFlag, address32: Value) {
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let read = self.read_direct(address32);
        self.apply_op8(op, read);
        self.b.br(end);

        self.select_block(notset);
        let low = self.read_direct(address32);
        let high_address = self.b.add(Type::I32, address32, self.c32(1));
        let high = self.read_direct(high_address);
        let read16 = self.combine16(low, high);
        self.apply_op16(op, read16);
        self.b.br(end);

        self.select_block(end);
    }

    pub(crate) fn direct_read_indexed(
        &mut self,
        op: Op,
        flag: WidthFlag,
        address16: Value,
        index: Value,
    ) {
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let sum = self.b.add(Type::I16, address16, index);
        let address = self.b.zext(sum, Type::I16, Type::I32);
        let read = self.read_direct(address);
        self.apply_op8(op, read);
        self.b.br(end);

        self.select_block(notset);
        let sum = self.b.add(Type::I16, address16, index);
        let low_address = self.b.zext(sum, Type::I16, Type::I32);
        let high_address = self.b.add(Type::I32, low_address, self.c32(1));
        let low = self.read_direct(low_address);
        let high = self.read_direct(high_address);
        let read16 = self.combine16(low, high);
        self.apply_op16(op, read16);
        self.b.br(end);

        self.select_block(end);
    }

    /// `(d)`: pointer fetched from the direct page, data read in the data
    /// bank.
    pub(crate) fn indirect_read(&mut self, op: Op, flag: WidthFlag, address32: Value) {
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let pointer = self.read_direct_pointer(address32);
        let read = self.read_bank(pointer);
        self.apply_op8(op, read);
        self.b.br(end);

        self.select_block(notset);
        let pointer = self.read_direct_pointer(address32);
        let high_pointer = self.b.add(Type::I32, pointer, self.c32(1));
        let low = self.read_bank(pointer);
        let high = self.read_bank(high_pointer);
        let read16 = self.combine16(low, high);
        self.apply_op16(op, read16);
        self.b.br(end);

        self.select_block(end);
    }

    /// `(d,X)`: X is added to the direct-page address before the pointer
    /// fetch.
    pub(crate) fn indexed_indirect_read(&mut self, op: Op, flag: WidthFlag, address32: Value) {
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let pointer = self.read_indexed_direct_pointer(address32);
        let read = self.read_bank(pointer);
        self.apply_op8(op, read);
        self.b.br(end);

        self.select_block(notset);
        let pointer = self.read_indexed_direct_pointer(address32);
        let high_pointer = self.b.add(Type::I32, pointer, self.c32(1));
        let low = self.read_bank(pointer);
        let high = self.read_bank(high_pointer);
        let read16 = self.combine16(low, high);
        self.apply_op16(op, read16);
        self.b.br(end);

        self.select_block(end);
    }

    /// `(d),Y`: Y is added to the fetched pointer.
    pub(crate) fn indirect_indexed_read(&mut self, op: Op, flag: WidthFlag, address32: Value) {
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let pointer = self.read_direct_pointer(address32);
        let indexed = self.add_register32(pointer, self.regs.y);
        let read = self.read_bank(indexed);
        self.apply_op8(op, read);
        self.b.br(end);

        self.select_block(notset);
        let pointer = self.read_direct_pointer(address32);
        let indexed = self.add_register32(pointer, self.regs.y);
        let high_indexed = self.b.add(Type::I32, indexed, self.c32(1));
        let low = self.read_bank(indexed);
        let high = self.read_bank(high_indexed);
        let read16 = self.combine16(low, high);
        self.apply_op16(op, read16);
        self.b.br(end);

        self.select_block(end);
    }

    /// `[d]` / `[d],Y`: three pointer bytes from the direct page form a
    /// long address.
    pub(crate) fn indirect_long_read(
        &mut self,
        op: Op,
        flag: WidthFlag,
        address32: Value,
        index: Value,
    ) {
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let long_address = self.read_direct_long_pointer(address32);
        let index32 = self.b.zext(index, Type::I16, Type::I32);
        let address = self.b.add(Type::I32, long_address, index32);
        let read = self.read_long(address);
        self.apply_op8(op, read);
        self.b.br(end);

        self.select_block(notset);
        let long_address = self.read_direct_long_pointer(address32);
        let index32 = self.b.zext(index, Type::I16, Type::I32);
        let low_address = self.b.add(Type::I32, long_address, index32);
        let high_address = self.b.add(Type::I32, low_address, self.c32(1));
        let low = self.read_long(low_address);
        let high = self.read_long(high_address);
        let read16 = self.combine16(low, high);
        self.apply_op16(op, read16);
        self.b.br(end);

        self.select_block(end);
    }

    pub(crate) fn stack_read(&mut self, op: Op, flag: WidthFlag, address32: Value) {
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let read = self.read_stack(address32);
        self.apply_op8(op, read);
        self.b.br(end);

        self.select_block(notset);
        let low = self.read_stack(address32);
        let high_address = self.b.add(Type::I32, address32, self.c32(1));
        let high = self.read_stack(high_address);
        let read16 = self.combine16(low, high);
        self.apply_op16(op, read16);
        self.b.br(end);

        self.select_block(end);
    }

    /// `(sr,S),Y`: pointer from the stack page, then Y in the data bank.
    pub(crate) fn indirect_stack_read(&mut self, op: Op, flag: WidthFlag, address32: Value) {
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let indexed = self.read_stack_pointer_indexed(address32);
        let read = self.read_bank(indexed);
        self.apply_op8(op, read);
        self.b.br(end);

        self.select_block(notset);
        let indexed = self.read_stack_pointer_indexed(address32);
        let high_indexed = self.b.add(Type::I32, indexed, self.c32(1));
        let low = self.read_bank(indexed);
        let high = self.read_bank(high_indexed);
        let read16 = self.combine16(low, high);
        self.apply_op16(op, read16);
        self.b.br(end);

        self.select_block(end);
    }

    // --- read-modify-write templates ---

    /// Accumulator / index register in place.
    pub(crate) fn implied_modify(&mut self, op: Op, flag: WidthFlag, register: GlobalId) {
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let (low_ptr, _) = self.low_high_ptr(register);
        let current = self.b.load(Type::I8, low_ptr);
        let result = self.apply_op8(op, current);
        self.b.store(Type::I8, result, low_ptr);
        self.b.br(end);

        self.select_block(notset);
        let current = self.b.load_global(register);
        let result = self.apply_op16(op, current);
        self.b.store_global(result, register);
        self.b.br(end);

        self.select_block(end);
    }

    pub(crate) fn bank_modify(&mut self, op: Op, flag: WidthFlag, address32: Value) {
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let read = self.read_bank(address32);
        let result = self.apply_op8(op, read);
        self.write_bank(address32, result);
        self.b.br(end);

        self.select_block(notset);
        let high_address = self.b.add(Type::I32, address32, self.c32(1));
        let low = self.read_bank(address32);
        let high = self.read_bank(high_address);
        let read16 = self.combine16(low, high);
        let result16 = self.apply_op16(op, read16);
        let (result_low, result_high) = self.split16(result16);
        self.write_bank(high_address, result_high);
        self.write_bank(address32, result_low);
        self.b.br(end);

        self.select_block(end);
    }

    pub(crate) fn bank_indexed_modify(&mut self, op: Op, flag: WidthFlag, address16: Value) {
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let x16 = self.b.load_global(self.regs.x);
        let sum = self.b.add(Type::I16, x16, address16);
        let address = self.b.zext(sum, Type::I16, Type::I32);
        let read = self.read_bank(address);
        let result = self.apply_op8(op, read);
        self.write_bank(address, result);
        self.b.br(end);

        self.select_block(notset);
        let x16 = self.b.load_global(self.regs.x);
        let sum = self.b.add(Type::I16, x16, address16);
        let low_address = self.b.zext(sum, Type::I16, Type::I32);
        let high_address = self.b.add(Type::I32, low_address, self.c32(1));
        let low = self.read_bank(low_address);
        let high = self.read_bank(high_address);
        let read16 = self.combine16(low, high);
        let result16 = self.apply_op16(op, read16);
        let (result_low, result_high) = self.split16(result16);
        self.write_bank(high_address, result_high);
        self.write_bank(low_address, result_low);
        self.b.br(end);

        self.select_block(end);
    }

    pub(crate) fn direct_modify(&mut self, op: Op, flag: WidthFlag, address32: Value) {
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let read = self.read_direct(address32);
        let result = self.apply_op8(op, read);
        self.write_direct(address32, result);
        self.b.br(end);

        self.select_block(notset);
        let high_address = self.b.add(Type::I32, address32, self.c32(1));
        let low = self.read_direct(address32);
        let high = self.read_direct(high_address);
        let read16 = self.combine16(low, high);
        let result16 = self.apply_op16(op, read16);
        let (result_low, result_high) = self.split16(result16);
        self.write_direct(high_address, result_high);
        self.write_direct(address32, result_low);
        self.b.br(end);

        self.select_block(end);
    }

    pub(crate) fn direct_indexed_modify(&mut self, op: Op, flag: WidthFlag, address16: Value) {
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let x16 = self.b.load_global(self.regs.x);
        let sum = self.b.add(Type::I16, x16, address16);
        let address = self.b.zext(sum, Type::I16, Type::I32);
        let read = self.read_direct(address);
        let result = self.apply_op8(op, read);
        self.write_direct(address, result);
        self.b.br(end);

        self.select_block(notset);
        let x16 = self.b.load_global(self.regs.x);
        let sum = self.b.add(Type::I16, x16, address16);
        let low_address = self.b.zext(sum, Type::I16, Type::I32);
        let high_address = self.b.add(Type::I32, low_address, self.c32(1));
        let low = self.read_direct(low_address);
        let high = self.read_direct(high_address);
        let read16 = self.combine16(low, high);
        let result16 = self.apply_op16(op, read16);
        let (result_low, result_high) = self.split16(result16);
        self.write_direct(high_address, result_high);
        self.write_direct(low_address, result_low);
        self.b.br(end);

        self.select_block(end);
    }

    // --- write (store) templates ---

    pub(crate) fn bank_write(&mut self, flag: WidthFlag, address32: Value, value16: Value) {
        let (low, high) = self.split16(value16);
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        self.write_bank(address32, low);
        self.b.br(end);

        self.select_block(notset);
        let high_address = self.b.add(Type::I32, address32, self.c32(1));
        self.write_bank(address32, low);
        self.write_bank(high_address, high);
        self.b.br(end);

        self.select_block(end);
    }

    pub(crate) fn bank_write_indexed(
        &mut self,
        flag: WidthFlag,
        address32: Value,
        index16: Value,
        value16: Value,
    ) {
        let (low, high) = self.split16(value16);
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let index32 = self.b.zext(index16, Type::I16, Type::I32);
        let address = self.b.add(Type::I32, address32, index32);
        self.write_bank(address, low);
        self.b.br(end);

        self.select_block(notset);
        let index32 = self.b.zext(index16, Type::I16, Type::I32);
        let low_address = self.b.add(Type::I32, address32, index32);
        let high_address = self.b.add(Type::I32, low_address, self.c32(1));
        self.write_bank(low_address, low);
        self.write_bank(high_address, high);
        self.b.br(end);

        self.select_block(end);
    }

    /// `addr,l` / `addr,l,X` stores of the accumulator.
    pub(crate) fn long_write(&mut self, flag: WidthFlag, address32: Value, index16: Value) {
        let a16 = self.b.load_global(self.regs.a);
        let (low, high) = self.split16(a16);
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let index32 = self.b.zext(index16, Type::I16, Type::I32);
        let address = self.b.add(Type::I32, address32, index32);
        self.write_long(address, low);
        self.b.br(end);

        self.select_block(notset);
        let index32 = self.b.zext(index16, Type::I16, Type::I32);
        let low_address = self.b.add(Type::I32, address32, index32);
        let high_address = self.b.add(Type::I32, low_address, self.c32(1));
        self.write_long(low_address, low);
        self.write_long(high_address, high);
        self.b.br(end);

        self.select_block(end);
    }

    pub(crate) fn direct_write(&mut self, flag: WidthFlag, address32: Value, value16: Value) {
        let (low, high) = self.split16(value16);
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        self.write_direct(address32, low);
        self.b.br(end);

        self.select_block(notset);
        let high_address = self.b.add(Type::I32, address32, self.c32(1));
        self.write_direct(address32, low);
        self.write_direct(high_address, high);
        self.b.br(end);

        self.select_block(end);
    }

    pub(crate) fn direct_write_indexed(
        &mut self,
        flag: WidthFlag,
        address32: Value,
        index16: Value,
        value16: Value,
    ) {
        let (low, high) = self.split16(value16);
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let index32 = self.b.zext(index16, Type::I16, Type::I32);
        let address = self.b.add(Type::I32, address32, index32);
        self.write_direct(address, low);
        self.b.br(end);

        self.select_block(notset);
        let index32 = self.b.zext(index16, Type::I16, Type::I32);
        let low_address = self.b.add(Type::I32, address32, index32);
        let high_address = self.b.add(Type::I32, low_address, self.c32(1));
        self.write_direct(low_address, low);
        self.write_direct(high_address, high);
        self.b.br(end);

        self.select_block(end);
    }

    pub(crate) fn indirect_write(&mut self, flag: WidthFlag, address32: Value) {
        let a16 = self.b.load_global(self.regs.a);
        let (low, high) = self.split16(a16);
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let pointer = self.read_direct_pointer(address32);
        self.write_bank(pointer, low);
        self.b.br(end);

        self.select_block(notset);
        let pointer = self.read_direct_pointer(address32);
        let high_pointer = self.b.add(Type::I32, pointer, self.c32(1));
        self.write_bank(pointer, low);
        self.write_bank(high_pointer, high);
        self.b.br(end);

        self.select_block(end);
    }

    pub(crate) fn indexed_indirect_write(&mut self, flag: WidthFlag, address32: Value) {
        let a16 = self.b.load_global(self.regs.a);
        let (low, high) = self.split16(a16);
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let pointer = self.read_indexed_direct_pointer(address32);
        self.write_bank(pointer, low);
        self.b.br(end);

        self.select_block(notset);
        let pointer = self.read_indexed_direct_pointer(address32);
        let high_pointer = self.b.add(Type::I32, pointer, self.c32(1));
        self.write_bank(pointer, low);
        self.write_bank(high_pointer, high);
        self.b.br(end);

        self.select_block(end);
    }

    pub(crate) fn indirect_indexed_write(&mut self, flag: WidthFlag, address32: Value) {
        let a16 = self.b.load_global(self.regs.a);
        let (low, high) = self.split16(a16);
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let pointer = self.read_direct_pointer(address32);
        let indexed = self.add_register32(pointer, self.regs.y);
        self.write_bank(indexed, low);
        self.b.br(end);

        self.select_block(notset);
        let pointer = self.read_direct_pointer(address32);
        let indexed = self.add_register32(pointer, self.regs.y);
        let high_indexed = self.b.add(Type::I32, indexed, self.c32(1));
        self.write_bank(indexed, low);
        self.write_bank(high_indexed, high);
        self.b.br(end);

        self.select_block(end);
    }

    pub(crate) fn indirect_long_write(&mut self, flag: WidthFlag, address32: Value, index16: Value) {
        let a16 = self.b.load_global(self.regs.a);
        let (low, high) = self.split16(a16);
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let long_address = self.read_direct_long_pointer(address32);
        let index32 = self.b.zext(index16, Type::I16, Type::I32);
        let address = self.b.add(Type::I32, long_address, index32);
        self.write_long(address, low);
        self.b.br(end);

        self.select_block(notset);
        let long_address = self.read_direct_long_pointer(address32);
        let index32 = self.b.zext(index16, Type::I16, Type::I32);
        let low_address = self.b.add(Type::I32, long_address, index32);
        let high_address = self.b.add(Type::I32, low_address, self.c32(1));
        self.write_long(low_address, low);
        self.write_long(high_address, high);
        self.b.br(end);

        self.select_block(end);
    }

    pub(crate) fn stack_write(&mut self, flag: WidthFlag, address32: Value) {
        let a16 = self.b.load_global(self.regs.a);
        let (low, high) = self.split16(a16);
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        self.write_stack(address32, low);
        self.b.br(end);

        self.select_block(notset);
        let high_address = self.b.add(Type::I32, address32, self.c32(1));
        self.write_stack(address32, low);
        self.write_stack(high_address, high);
        self.b.br(end);

        self.select_block(end);
    }

    pub(crate) fn indirect_stack_write(&mut self, flag: WidthFlag, address32: Value) {
        let a16 = self.b.load_global(self.regs.a);
        let (low, high) = self.split16(a16);
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let indexed = self.read_stack_pointer_indexed(address32);
        self.write_bank(indexed, low);
        self.b.br(end);

        self.select_block(notset);
        let indexed = self.read_stack_pointer_indexed(address32);
        let high_indexed = self.b.add(Type::I32, indexed, self.c32(1));
        self.write_bank(indexed, low);
        self.write_bank(high_indexed, high);
        self.b.br(end);

        self.select_block(end);
    }

    /// `BIT #imm` only touches ZF, unlike the memory forms.
    pub(crate) fn bit_immediate(&mut self, flag: WidthFlag, operand16: Value) {
        let (operand_low, _) = self.split16(operand16);
        let (set, notset, end) = self.width_flag_blocks(flag);

        self.select_block(set);
        let a16 = self.b.load_global(self.regs.a);
        let a8 = self.b.trunc(a16, Type::I16, Type::I8);
        let masked = self.b.and(Type::I8, operand_low, a8);
        let zero = self
            .b
            .icmp(crate::ir::Pred::Eq, Type::I8, masked, self.c8(0));
        self.b.store_global(zero, self.regs.zero);
        self.b.br(end);

        self.select_block(notset);
        let a16 = self.b.load_global(self.regs.a);
        let masked = self.b.and(Type::I16, operand16, a16);
        let zero = self
            .b
            .icmp(crate::ir::Pred::Eq, Type::I16, masked, self.c16(0));
        self.b.store_global(zero, self.regs.zero);
        self.b.br(end);

        self.select_block(end);
    }

    // --- shared pointer fetch helpers ---

    /// Two bytes at the direct-page address, widened to a bank address.
    pub(crate) fn read_direct_pointer(&mut self, address32: Value) -> Value {
        let low = self.read_direct(address32);
        let high_address = self.b.add(Type::I32, address32, self.c32(1));
        let high = self.read_direct(high_address);
        let pointer16 = self.combine16(low, high);
        self.b.zext(pointer16, Type::I16, Type::I32)
    }

    pub(crate) fn read_indexed_direct_pointer(&mut self, address32: Value) -> Value {
        let x = self.load_register32(self.regs.x);
        let low_address = self.b.add(Type::I32, address32, x);
        let low = self.read_direct(low_address);
        let high_address = self.b.add(Type::I32, low_address, self.c32(1));
        let high = self.read_direct(high_address);
        let pointer16 = self.combine16(low, high);
        self.b.zext(pointer16, Type::I16, Type::I32)
    }

    /// Three bytes at the direct-page address (native addressing), forming
    /// a 24-bit pointer.
    pub(crate) fn read_direct_long_pointer(&mut self, address32: Value) -> Value {
        let low = self.read_direct_native(address32);
        let mid_address = self.b.add(Type::I32, address32, self.c32(1));
        let mid = self.read_direct_native(mid_address);
        let high_address = self.b.add(Type::I32, address32, self.c32(2));
        let high = self.read_direct_native(high_address);
        self.combine32(low, mid, high)
    }

    /// Two bytes at the stack-relative address plus Y, as a bank address.
    pub(crate) fn read_stack_pointer_indexed(&mut self, address32: Value) -> Value {
        let low = self.read_stack(address32);
        let high_address = self.b.add(Type::I32, address32, self.c32(1));
        let high = self.read_stack(high_address);
        let pointer16 = self.combine16(low, high);
        let pointer32 = self.b.zext(pointer16, Type::I16, Type::I32);
        self.add_register32(pointer32, self.regs.y)
    }

    pub(crate) fn add_register32(&mut self, address32: Value, register: GlobalId) -> Value {
        let index = self.load_register32(register);
        self.b.add(Type::I32, address32, index)
    }
}

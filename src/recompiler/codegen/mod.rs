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

//! Per-opcode lowering. The table is total: all 256 opcode bytes map to a
//! template bound to an operation and a width flag, so an undecodable byte
//! cannot slip through to run time.

mod block_move;
mod control_flow;
mod flags;
mod memory;
mod operations;
mod templates;
mod transfers;

pub(crate) use operations::Op;

use crate::ast::Instruction;
use crate::ir::{Callee, GlobalId, Pred, Type, Value};
use crate::recompiler::Recompiler;

/// Which status bit governs the operand width of an instruction: `M` for
/// accumulator/memory, `X` for the index registers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum WidthFlag {
    M,
    X,
}

impl Recompiler {
    /// Debug checkpoint in front of every instruction: pin PB/PC to the
    /// instruction's address, report the disassembly text, tick the cycle
    /// hook.
    fn emit_debug_checkpoint(&mut self, instr: &Instruction) {
        let pb = self.c8(u64::from((instr.pc >> 16) & 0xff));
        self.b.store_global(pb, self.regs.pb);
        let pc = self.c16(u64::from(instr.pc & 0xffff));
        self.b.store_global(pc, self.regs.pc);

        if let Some(&text) = self.instruction_text.get(&instr.offset) {
            let pc32 = self.c32(u64::from(instr.pc));
            self.b.call_void(
                Callee::Extern(self.helpers.update_instruction_output),
                vec![pc32, Value::Str(text)],
            );
        }

        let offset32 = self.c32(u64::from(instr.offset));
        self.b.call_void(
            Callee::Extern(self.helpers.rom_cycle),
            vec![offset32, self.c32(1)],
        );
    }

    fn branch_on_flag(&mut self, flag: GlobalId, expected: u64, label: &str, function_name: &str) {
        let value = self.b.load_global(flag);
        let cond = self.b.icmp(Pred::Eq, Type::I1, value, self.c1(expected));
        self.branch(cond, label, function_name);
    }

    pub(crate) fn generate_instruction(&mut self, instr: &Instruction, function_name: &str) {
        self.emit_debug_checkpoint(instr);

        let operand = u64::from(instr.operand());
        let offset = instr.offset;
        let label = instr.jump_label_name.as_deref().unwrap_or("");

        match instr.opcode {
            // BRK - nothing to do.
            0x00 => {}
            0x01 => {
                let address = self.c32(operand);
                self.indexed_indirect_read(Op::Ora, WidthFlag::M, address);
            }
            // COP - nothing to do.
            0x02 => {}
            0x03 => {
                let address = self.c32(operand);
                self.stack_read(Op::Ora, WidthFlag::M, address);
            }
            0x04 => {
                let address = self.c32(operand);
                self.direct_modify(Op::Tsb, WidthFlag::M, address);
            }
            0x05 => {
                let address = self.c32(operand);
                self.direct_read(Op::Ora, WidthFlag::M, address);
            }
            0x06 => {
                let address = self.c32(operand);
                self.direct_modify(Op::Asl, WidthFlag::M, address);
            }
            0x07 => {
                let address = self.c32(operand);
                self.indirect_long_read(Op::Ora, WidthFlag::M, address, self.c16(0));
            }
            0x08 => {
                let status = self.status_from_flags();
                self.push8(status);
            }
            0x09 => {
                let immediate = self.c16(operand);
                self.immediate_read(Op::Ora, WidthFlag::M, immediate);
            }
            0x0a => self.implied_modify(Op::Asl, WidthFlag::M, self.regs.a),
            0x0b => self.push_dp(),
            0x0c => {
                let address = self.c32(operand);
                self.bank_modify(Op::Tsb, WidthFlag::M, address);
            }
            0x0d => {
                let address = self.c32(operand);
                self.bank_read(Op::Ora, WidthFlag::M, address);
            }
            0x0e => {
                let address = self.c32(operand);
                self.bank_modify(Op::Asl, WidthFlag::M, address);
            }
            0x0f => {
                let address = self.c32(operand);
                self.long_read(Op::Ora, WidthFlag::M, address, self.c16(0));
            }
            0x10 => self.branch_on_flag(self.regs.negative, 0, label, function_name),
            0x11 => {
                let address = self.c32(operand);
                self.indirect_indexed_read(Op::Ora, WidthFlag::M, address);
            }
            0x12 => {
                let address = self.c32(operand);
                self.indirect_read(Op::Ora, WidthFlag::M, address);
            }
            0x13 => {
                let address = self.c32(operand);
                self.indirect_stack_read(Op::Ora, WidthFlag::M, address);
            }
            0x14 => {
                let address = self.c32(operand);
                self.direct_modify(Op::Trb, WidthFlag::M, address);
            }
            0x15 => {
                let address = self.c16(operand);
                let x = self.b.load_global(self.regs.x);
                self.direct_read_indexed(Op::Ora, WidthFlag::M, address, x);
            }
            0x16 => {
                let address = self.c16(operand);
                self.direct_indexed_modify(Op::Asl, WidthFlag::M, address);
            }
            0x17 => {
                let address = self.c32(operand);
                let y = self.b.load_global(self.regs.y);
                self.indirect_long_read(Op::Ora, WidthFlag::M, address, y);
            }
            0x18 => self.clear_flag(self.regs.carry),
            0x19 => {
                let address = self.c16(operand);
                let y = self.b.load_global(self.regs.y);
                self.bank_read_indexed(Op::Ora, WidthFlag::M, address, y);
            }
            0x1a => self.implied_modify(Op::Inc, WidthFlag::M, self.regs.a),
            0x1b => self.transfer_cs(),
            0x1c => {
                let address = self.c32(operand);
                self.bank_modify(Op::Trb, WidthFlag::M, address);
            }
            0x1d => {
                let address = self.c16(operand);
                let x = self.b.load_global(self.regs.x);
                self.bank_read_indexed(Op::Ora, WidthFlag::M, address, x);
            }
            0x1e => {
                let address = self.c16(operand);
                self.bank_indexed_modify(Op::Asl, WidthFlag::M, address);
            }
            0x1f => {
                let address = self.c32(operand);
                let x = self.b.load_global(self.regs.x);
                self.long_read(Op::Ora, WidthFlag::M, address, x);
            }
            0x20 => self.call_short(offset),
            0x21 => {
                let address = self.c32(operand);
                self.indexed_indirect_read(Op::And, WidthFlag::M, address);
            }
            0x22 => self.call_long(offset),
            0x23 => {
                let address = self.c32(operand);
                self.stack_read(Op::And, WidthFlag::M, address);
            }
            0x24 => {
                let address = self.c32(operand);
                self.direct_read(Op::Bit, WidthFlag::M, address);
            }
            0x25 => {
                let address = self.c32(operand);
                self.direct_read(Op::And, WidthFlag::M, address);
            }
            0x26 => {
                let address = self.c32(operand);
                self.direct_modify(Op::Rol, WidthFlag::M, address);
            }
            0x27 => {
                let address = self.c32(operand);
                self.indirect_long_read(Op::And, WidthFlag::M, address, self.c16(0));
            }
            0x28 => self.pull_status(),
            0x29 => {
                let immediate = self.c16(operand);
                self.immediate_read(Op::And, WidthFlag::M, immediate);
            }
            0x2a => self.implied_modify(Op::Rol, WidthFlag::M, self.regs.a),
            0x2b => self.pull_dp(),
            0x2c => {
                let address = self.c32(operand);
                self.bank_read(Op::Bit, WidthFlag::M, address);
            }
            0x2d => {
                let address = self.c32(operand);
                self.bank_read(Op::And, WidthFlag::M, address);
            }
            0x2e => {
                let address = self.c32(operand);
                self.bank_modify(Op::Rol, WidthFlag::M, address);
            }
            0x2f => {
                let address = self.c32(operand);
                self.long_read(Op::And, WidthFlag::M, address, self.c16(0));
            }
            0x30 => self.branch_on_flag(self.regs.negative, 1, label, function_name),
            0x31 => {
                let address = self.c32(operand);
                self.indirect_indexed_read(Op::And, WidthFlag::M, address);
            }
            0x32 => {
                let address = self.c32(operand);
                self.indirect_read(Op::And, WidthFlag::M, address);
            }
            0x33 => {
                let address = self.c32(operand);
                self.indirect_stack_read(Op::And, WidthFlag::M, address);
            }
            0x34 => {
                let address = self.c16(operand);
                let x = self.b.load_global(self.regs.x);
                self.direct_read_indexed(Op::Bit, WidthFlag::M, address, x);
            }
            0x35 => {
                let address = self.c16(operand);
                let x = self.b.load_global(self.regs.x);
                self.direct_read_indexed(Op::And, WidthFlag::M, address, x);
            }
            0x36 => {
                let address = self.c16(operand);
                self.direct_indexed_modify(Op::Rol, WidthFlag::M, address);
            }
            0x37 => {
                let address = self.c32(operand);
                let y = self.b.load_global(self.regs.y);
                self.indirect_long_read(Op::And, WidthFlag::M, address, y);
            }
            0x38 => self.set_flag(self.regs.carry),
            0x39 => {
                let address = self.c16(operand);
                let y = self.b.load_global(self.regs.y);
                self.bank_read_indexed(Op::And, WidthFlag::M, address, y);
            }
            0x3a => self.implied_modify(Op::Dec, WidthFlag::M, self.regs.a),
            0x3b => self.transfer16(self.regs.sp, self.regs.a),
            0x3c => {
                let address = self.c16(operand);
                let x = self.b.load_global(self.regs.x);
                self.bank_read_indexed(Op::Bit, WidthFlag::M, address, x);
            }
            0x3d => {
                let address = self.c16(operand);
                let x = self.b.load_global(self.regs.x);
                self.bank_read_indexed(Op::And, WidthFlag::M, address, x);
            }
            0x3e => {
                let address = self.c16(operand);
                self.bank_indexed_modify(Op::Rol, WidthFlag::M, address);
            }
            0x3f => {
                let address = self.c32(operand);
                let x = self.b.load_global(self.regs.x);
                self.long_read(Op::And, WidthFlag::M, address, x);
            }
            0x40 => self.return_interrupt(),
            0x41 => {
                let address = self.c32(operand);
                self.indexed_indirect_read(Op::Eor, WidthFlag::M, address);
            }
            // WDM - nothing to do.
            0x42 => {}
            0x43 => {
                let address = self.c32(operand);
                self.stack_read(Op::Eor, WidthFlag::M, address);
            }
            0x44 => {
                let banks = self.c32(operand);
                self.block_move(WidthFlag::X, banks, self.c16(0xffff));
            }
            0x45 => {
                let address = self.c32(operand);
                self.direct_read(Op::Eor, WidthFlag::M, address);
            }
            0x46 => {
                let address = self.c32(operand);
                self.direct_modify(Op::Lsr, WidthFlag::M, address);
            }
            0x47 => {
                let address = self.c32(operand);
                self.indirect_long_read(Op::Eor, WidthFlag::M, address, self.c16(0));
            }
            0x48 => {
                let a = self.b.load_global(self.regs.a);
                self.push_register(WidthFlag::M, a);
            }
            0x49 => {
                let immediate = self.c16(operand);
                self.immediate_read(Op::Eor, WidthFlag::M, immediate);
            }
            0x4a => self.implied_modify(Op::Lsr, WidthFlag::M, self.regs.a),
            0x4b => {
                let pb = self.b.load_global(self.regs.pb);
                self.push8(pb);
            }
            0x4c => self.jump(label, function_name),
            0x4d => {
                let address = self.c32(operand);
                self.bank_read(Op::Eor, WidthFlag::M, address);
            }
            0x4e => {
                let address = self.c32(operand);
                self.bank_modify(Op::Lsr, WidthFlag::M, address);
            }
            0x4f => {
                let address = self.c32(operand);
                self.long_read(Op::Eor, WidthFlag::M, address, self.c16(0));
            }
            0x50 => self.branch_on_flag(self.regs.overflow, 0, label, function_name),
            0x51 => {
                let address = self.c32(operand);
                self.indirect_indexed_read(Op::Eor, WidthFlag::M, address);
            }
            0x52 => {
                let address = self.c32(operand);
                self.indirect_read(Op::Eor, WidthFlag::M, address);
            }
            0x53 => {
                let address = self.c32(operand);
                self.indirect_stack_read(Op::Eor, WidthFlag::M, address);
            }
            0x54 => {
                let banks = self.c32(operand);
                self.block_move(WidthFlag::X, banks, self.c16(1));
            }
            0x55 => {
                let address = self.c16(operand);
                let x = self.b.load_global(self.regs.x);
                self.direct_read_indexed(Op::Eor, WidthFlag::M, address, x);
            }
            0x56 => {
                let address = self.c16(operand);
                self.direct_indexed_modify(Op::Lsr, WidthFlag::M, address);
            }
            0x57 => {
                let address = self.c32(operand);
                let y = self.b.load_global(self.regs.y);
                self.indirect_long_read(Op::Eor, WidthFlag::M, address, y);
            }
            0x58 => self.clear_flag(self.regs.interrupt),
            0x59 => {
                let address = self.c16(operand);
                let y = self.b.load_global(self.regs.y);
                self.bank_read_indexed(Op::Eor, WidthFlag::M, address, y);
            }
            0x5a => {
                let y = self.b.load_global(self.regs.y);
                self.push_register(WidthFlag::X, y);
            }
            0x5b => self.transfer16(self.regs.a, self.regs.dp),
            0x5c => self.jump(label, function_name),
            0x5d => {
                let address = self.c16(operand);
                let x = self.b.load_global(self.regs.x);
                self.bank_read_indexed(Op::Eor, WidthFlag::M, address, x);
            }
            0x5e => {
                let address = self.c16(operand);
                self.bank_indexed_modify(Op::Lsr, WidthFlag::M, address);
            }
            0x5f => {
                let address = self.c32(operand);
                let x = self.b.load_global(self.regs.x);
                self.long_read(Op::Eor, WidthFlag::M, address, x);
            }
            0x60 => self.return_short(),
            0x61 => {
                let address = self.c32(operand);
                self.indexed_indirect_read(Op::Adc, WidthFlag::M, address);
            }
            0x62 => {
                let displacement = self.c16(operand);
                self.push_effective_relative_address(displacement);
            }
            0x63 => {
                let address = self.c32(operand);
                self.stack_read(Op::Adc, WidthFlag::M, address);
            }
            0x64 => {
                let address = self.c32(operand);
                self.direct_write(WidthFlag::M, address, self.c16(0));
            }
            0x65 => {
                let address = self.c32(operand);
                self.direct_read(Op::Adc, WidthFlag::M, address);
            }
            0x66 => {
                let address = self.c32(operand);
                self.direct_modify(Op::Ror, WidthFlag::M, address);
            }
            0x67 => {
                let address = self.c32(operand);
                self.indirect_long_read(Op::Adc, WidthFlag::M, address, self.c16(0));
            }
            0x68 => self.pull_register(WidthFlag::M, self.regs.a),
            0x69 => {
                let immediate = self.c16(operand);
                self.immediate_read(Op::Adc, WidthFlag::M, immediate);
            }
            0x6a => self.implied_modify(Op::Ror, WidthFlag::M, self.regs.a),
            0x6b => self.return_long(),
            0x6c => {
                let pointer = self.c16(operand);
                self.jump_indirect(offset, pointer, function_name);
            }
            0x6d => {
                let address = self.c32(operand);
                self.bank_read(Op::Adc, WidthFlag::M, address);
            }
            0x6e => {
                let address = self.c32(operand);
                self.bank_modify(Op::Ror, WidthFlag::M, address);
            }
            0x6f => {
                let address = self.c32(operand);
                self.long_read(Op::Adc, WidthFlag::M, address, self.c16(0));
            }
            0x70 => self.branch_on_flag(self.regs.overflow, 1, label, function_name),
            0x71 => {
                let address = self.c32(operand);
                self.indirect_indexed_read(Op::Adc, WidthFlag::M, address);
            }
            0x72 => {
                let address = self.c32(operand);
                self.indirect_read(Op::Adc, WidthFlag::M, address);
            }
            0x73 => {
                let address = self.c32(operand);
                self.indirect_stack_read(Op::Adc, WidthFlag::M, address);
            }
            0x74 => {
                let address = self.c32(operand);
                let x = self.b.load_global(self.regs.x);
                self.direct_write_indexed(WidthFlag::M, address, x, self.c16(0));
            }
            0x75 => {
                let address = self.c16(operand);
                let x = self.b.load_global(self.regs.x);
                self.direct_read_indexed(Op::Adc, WidthFlag::M, address, x);
            }
            0x76 => {
                let address = self.c16(operand);
                self.direct_indexed_modify(Op::Ror, WidthFlag::M, address);
            }
            0x77 => {
                let address = self.c32(operand);
                let y = self.b.load_global(self.regs.y);
                self.indirect_long_read(Op::Adc, WidthFlag::M, address, y);
            }
            0x78 => self.set_flag(self.regs.interrupt),
            0x79 => {
                let address = self.c16(operand);
                let y = self.b.load_global(self.regs.y);
                self.bank_read_indexed(Op::Adc, WidthFlag::M, address, y);
            }
            0x7a => self.pull_register(WidthFlag::X, self.regs.y),
            0x7b => self.transfer16(self.regs.dp, self.regs.a),
            0x7c => {
                let pointer = self.c16(operand);
                self.jump_indexed_indirect(offset, pointer, function_name);
            }
            0x7d => {
                let address = self.c16(operand);
                let x = self.b.load_global(self.regs.x);
                self.bank_read_indexed(Op::Adc, WidthFlag::M, address, x);
            }
            0x7e => {
                let address = self.c16(operand);
                self.bank_indexed_modify(Op::Ror, WidthFlag::M, address);
            }
            0x7f => {
                let address = self.c32(operand);
                let x = self.b.load_global(self.regs.x);
                self.long_read(Op::Adc, WidthFlag::M, address, x);
            }
            0x80 => self.branch(self.c1(1), label, function_name),
            0x81 => {
                let address = self.c32(operand);
                self.indexed_indirect_write(WidthFlag::M, address);
            }
            0x82 => self.branch(self.c1(1), label, function_name),
            0x83 => {
                let address = self.c32(operand);
                self.stack_write(WidthFlag::M, address);
            }
            0x84 => {
                let address = self.c32(operand);
                let y = self.b.load_global(self.regs.y);
                self.direct_write(WidthFlag::X, address, y);
            }
            0x85 => {
                let address = self.c32(operand);
                let a = self.b.load_global(self.regs.a);
                self.direct_write(WidthFlag::M, address, a);
            }
            0x86 => {
                let address = self.c32(operand);
                let x = self.b.load_global(self.regs.x);
                self.direct_write(WidthFlag::X, address, x);
            }
            0x87 => {
                let address = self.c32(operand);
                self.indirect_long_write(WidthFlag::M, address, self.c16(0));
            }
            0x88 => self.implied_modify(Op::Dec, WidthFlag::X, self.regs.y),
            0x89 => {
                let immediate = self.c16(operand);
                self.bit_immediate(WidthFlag::M, immediate);
            }
            0x8a => self.transfer(WidthFlag::M, self.regs.x, self.regs.a),
            0x8b => {
                let db = self.b.load_global(self.regs.db);
                self.push8(db);
            }
            0x8c => {
                let address = self.c32(operand);
                let y = self.b.load_global(self.regs.y);
                self.bank_write(WidthFlag::X, address, y);
            }
            0x8d => {
                let address = self.c32(operand);
                let a = self.b.load_global(self.regs.a);
                self.bank_write(WidthFlag::M, address, a);
            }
            0x8e => {
                let address = self.c32(operand);
                let x = self.b.load_global(self.regs.x);
                self.bank_write(WidthFlag::X, address, x);
            }
            0x8f => {
                let address = self.c32(operand);
                self.long_write(WidthFlag::M, address, self.c16(0));
            }
            0x90 => self.branch_on_flag(self.regs.carry, 0, label, function_name),
            0x91 => {
                let address = self.c32(operand);
                self.indirect_indexed_write(WidthFlag::M, address);
            }
            0x92 => {
                let address = self.c32(operand);
                self.indirect_write(WidthFlag::M, address);
            }
            0x93 => {
                let address = self.c32(operand);
                self.indirect_stack_write(WidthFlag::M, address);
            }
            0x94 => {
                let address = self.c32(operand);
                let x = self.b.load_global(self.regs.x);
                let y = self.b.load_global(self.regs.y);
                self.direct_write_indexed(WidthFlag::X, address, x, y);
            }
            0x95 => {
                let address = self.c32(operand);
                let x = self.b.load_global(self.regs.x);
                let a = self.b.load_global(self.regs.a);
                self.direct_write_indexed(WidthFlag::M, address, x, a);
            }
            0x96 => {
                let address = self.c32(operand);
                let y = self.b.load_global(self.regs.y);
                let x = self.b.load_global(self.regs.x);
                self.direct_write_indexed(WidthFlag::X, address, y, x);
            }
            0x97 => {
                let address = self.c32(operand);
                let y = self.b.load_global(self.regs.y);
                self.indirect_long_write(WidthFlag::M, address, y);
            }
            0x98 => self.transfer(WidthFlag::M, self.regs.y, self.regs.a),
            0x99 => {
                let address = self.c32(operand);
                let y = self.b.load_global(self.regs.y);
                let a = self.b.load_global(self.regs.a);
                self.bank_write_indexed(WidthFlag::M, address, y, a);
            }
            0x9a => self.transfer_xs(),
            0x9b => self.transfer(WidthFlag::X, self.regs.x, self.regs.y),
            0x9c => {
                let address = self.c32(operand);
                self.bank_write(WidthFlag::M, address, self.c16(0));
            }
            0x9d => {
                let address = self.c32(operand);
                let x = self.b.load_global(self.regs.x);
                let a = self.b.load_global(self.regs.a);
                self.bank_write_indexed(WidthFlag::M, address, x, a);
            }
            0x9e => {
                let address = self.c32(operand);
                let x = self.b.load_global(self.regs.x);
                self.bank_write_indexed(WidthFlag::M, address, x, self.c16(0));
            }
            0x9f => {
                let address = self.c32(operand);
                let x = self.b.load_global(self.regs.x);
                self.long_write(WidthFlag::M, address, x);
            }
            0xa0 => {
                let immediate = self.c16(operand);
                self.immediate_read(Op::Ldy, WidthFlag::X, immediate);
            }
            0xa1 => {
                let address = self.c32(operand);
                self.indexed_indirect_read(Op::Lda, WidthFlag::M, address);
            }
            0xa2 => {
                let immediate = self.c16(operand);
                self.immediate_read(Op::Ldx, WidthFlag::X, immediate);
            }
            0xa3 => {
                let address = self.c32(operand);
                self.stack_read(Op::Lda, WidthFlag::M, address);
            }
            0xa4 => {
                let address = self.c32(operand);
                self.direct_read(Op::Ldy, WidthFlag::X, address);
            }
            0xa5 => {
                let address = self.c32(operand);
                self.direct_read(Op::Lda, WidthFlag::M, address);
            }
            0xa6 => {
                let address = self.c32(operand);
                self.direct_read(Op::Ldx, WidthFlag::X, address);
            }
            0xa7 => {
                let address = self.c32(operand);
                self.indirect_long_read(Op::Lda, WidthFlag::M, address, self.c16(0));
            }
            0xa8 => self.transfer(WidthFlag::X, self.regs.a, self.regs.y),
            0xa9 => {
                let immediate = self.c16(operand);
                self.immediate_read(Op::Lda, WidthFlag::M, immediate);
            }
            0xaa => self.transfer(WidthFlag::X, self.regs.a, self.regs.x),
            0xab => self.pull_db(),
            0xac => {
                let address = self.c32(operand);
                self.bank_read(Op::Ldy, WidthFlag::X, address);
            }
            0xad => {
                let address = self.c32(operand);
                self.bank_read(Op::Lda, WidthFlag::M, address);
            }
            0xae => {
                let address = self.c32(operand);
                self.bank_read(Op::Ldx, WidthFlag::X, address);
            }
            0xaf => {
                let address = self.c32(operand);
                self.long_read(Op::Lda, WidthFlag::M, address, self.c16(0));
            }
            0xb0 => self.branch_on_flag(self.regs.carry, 1, label, function_name),
            0xb1 => {
                let address = self.c32(operand);
                self.indirect_indexed_read(Op::Lda, WidthFlag::M, address);
            }
            0xb2 => {
                let address = self.c32(operand);
                self.indirect_read(Op::Lda, WidthFlag::M, address);
            }
            0xb3 => {
                let address = self.c32(operand);
                self.indirect_stack_read(Op::Lda, WidthFlag::M, address);
            }
            0xb4 => {
                let address = self.c16(operand);
                let x = self.b.load_global(self.regs.x);
                self.direct_read_indexed(Op::Ldy, WidthFlag::X, address, x);
            }
            0xb5 => {
                let address = self.c16(operand);
                let x = self.b.load_global(self.regs.x);
                self.direct_read_indexed(Op::Lda, WidthFlag::M, address, x);
            }
            0xb6 => {
                let address = self.c16(operand);
                let y = self.b.load_global(self.regs.y);
                self.direct_read_indexed(Op::Ldx, WidthFlag::X, address, y);
            }
            0xb7 => {
                let address = self.c32(operand);
                let y = self.b.load_global(self.regs.y);
                self.indirect_long_read(Op::Lda, WidthFlag::M, address, y);
            }
            0xb8 => self.clear_flag(self.regs.overflow),
            0xb9 => {
                let address = self.c16(operand);
                let y = self.b.load_global(self.regs.y);
                self.bank_read_indexed(Op::Lda, WidthFlag::M, address, y);
            }
            0xba => self.transfer_sx(WidthFlag::X),
            0xbb => self.transfer(WidthFlag::X, self.regs.y, self.regs.x),
            0xbc => {
                let address = self.c16(operand);
                let x = self.b.load_global(self.regs.x);
                self.bank_read_indexed(Op::Ldy, WidthFlag::X, address, x);
            }
            0xbd => {
                let address = self.c16(operand);
                let x = self.b.load_global(self.regs.x);
                self.bank_read_indexed(Op::Lda, WidthFlag::M, address, x);
            }
            0xbe => {
                let address = self.c16(operand);
                let y = self.b.load_global(self.regs.y);
                self.bank_read_indexed(Op::Ldx, WidthFlag::X, address, y);
            }
            0xbf => {
                let address = self.c32(operand);
                let x = self.b.load_global(self.regs.x);
                self.long_read(Op::Lda, WidthFlag::M, address, x);
            }
            0xc0 => {
                let immediate = self.c16(operand);
                self.immediate_read(Op::Cpy, WidthFlag::X, immediate);
            }
            0xc1 => {
                let address = self.c32(operand);
                self.indexed_indirect_read(Op::Cmp, WidthFlag::M, address);
            }
            0xc2 => {
                let mask = self.c8(operand);
                self.reset_status_bits(mask);
            }
            0xc3 => {
                let address = self.c32(operand);
                self.stack_read(Op::Cmp, WidthFlag::M, address);
            }
            0xc4 => {
                let address = self.c32(operand);
                self.direct_read(Op::Cpy, WidthFlag::X, address);
            }
            0xc5 => {
                let address = self.c32(operand);
                self.direct_read(Op::Cmp, WidthFlag::M, address);
            }
            0xc6 => {
                let address = self.c32(operand);
                self.direct_modify(Op::Dec, WidthFlag::M, address);
            }
            0xc7 => {
                let address = self.c32(operand);
                self.indirect_long_read(Op::Cmp, WidthFlag::M, address, self.c16(0));
            }
            0xc8 => self.implied_modify(Op::Inc, WidthFlag::X, self.regs.y),
            0xc9 => {
                let immediate = self.c16(operand);
                self.immediate_read(Op::Cmp, WidthFlag::M, immediate);
            }
            0xca => self.implied_modify(Op::Dec, WidthFlag::X, self.regs.x),
            // WAI - nothing to do.
            0xcb => {}
            0xcc => {
                let address = self.c32(operand);
                self.bank_read(Op::Cpy, WidthFlag::X, address);
            }
            0xcd => {
                let address = self.c32(operand);
                self.bank_read(Op::Cmp, WidthFlag::M, address);
            }
            0xce => {
                let address = self.c32(operand);
                self.bank_modify(Op::Dec, WidthFlag::M, address);
            }
            0xcf => {
                let address = self.c32(operand);
                self.long_read(Op::Cmp, WidthFlag::M, address, self.c16(0));
            }
            0xd0 => self.branch_on_flag(self.regs.zero, 0, label, function_name),
            0xd1 => {
                let address = self.c32(operand);
                self.indirect_indexed_read(Op::Cmp, WidthFlag::M, address);
            }
            0xd2 => {
                let address = self.c32(operand);
                self.indirect_read(Op::Cmp, WidthFlag::M, address);
            }
            0xd3 => {
                let address = self.c32(operand);
                self.indirect_stack_read(Op::Cmp, WidthFlag::M, address);
            }
            0xd4 => {
                let address = self.c32(operand);
                self.push_effective_indirect_address(address);
            }
            0xd5 => {
                let address = self.c16(operand);
                let x = self.b.load_global(self.regs.x);
                self.direct_read_indexed(Op::Cmp, WidthFlag::M, address, x);
            }
            0xd6 => {
                let address = self.c16(operand);
                self.direct_indexed_modify(Op::Dec, WidthFlag::M, address);
            }
            0xd7 => {
                let address = self.c32(operand);
                let y = self.b.load_global(self.regs.y);
                self.indirect_long_read(Op::Cmp, WidthFlag::M, address, y);
            }
            0xd8 => self.clear_flag(self.regs.decimal),
            0xd9 => {
                let address = self.c16(operand);
                let y = self.b.load_global(self.regs.y);
                self.bank_read_indexed(Op::Cmp, WidthFlag::M, address, y);
            }
            0xda => {
                let x = self.b.load_global(self.regs.x);
                self.push_register(WidthFlag::X, x);
            }
            // STP - nothing to do.
            0xdb => {}
            0xdc => {
                let pointer = self.c16(operand);
                self.jump_indirect_long(offset, pointer, function_name);
            }
            0xdd => {
                let address = self.c16(operand);
                let x = self.b.load_global(self.regs.x);
                self.bank_read_indexed(Op::Cmp, WidthFlag::M, address, x);
            }
            0xde => {
                let address = self.c16(operand);
                self.bank_indexed_modify(Op::Dec, WidthFlag::M, address);
            }
            0xdf => {
                let address = self.c32(operand);
                let x = self.b.load_global(self.regs.x);
                self.long_read(Op::Cmp, WidthFlag::M, address, x);
            }
            0xe0 => {
                let immediate = self.c16(operand);
                self.immediate_read(Op::Cpx, WidthFlag::X, immediate);
            }
            0xe1 => {
                let address = self.c32(operand);
                self.indexed_indirect_read(Op::Sbc, WidthFlag::M, address);
            }
            0xe2 => {
                let mask = self.c8(operand);
                self.set_status_bits(mask);
            }
            0xe3 => {
                let address = self.c32(operand);
                self.stack_read(Op::Sbc, WidthFlag::M, address);
            }
            0xe4 => {
                let address = self.c32(operand);
                self.direct_read(Op::Cpx, WidthFlag::X, address);
            }
            0xe5 => {
                let address = self.c32(operand);
                self.direct_read(Op::Sbc, WidthFlag::M, address);
            }
            0xe6 => {
                let address = self.c32(operand);
                self.direct_modify(Op::Inc, WidthFlag::M, address);
            }
            0xe7 => {
                let address = self.c32(operand);
                self.indirect_long_read(Op::Sbc, WidthFlag::M, address, self.c16(0));
            }
            0xe8 => self.implied_modify(Op::Inc, WidthFlag::X, self.regs.x),
            0xe9 => {
                let immediate = self.c16(operand);
                self.immediate_read(Op::Sbc, WidthFlag::M, immediate);
            }
            // NOP - nothing to do.
            0xea => {}
            0xeb => self.exchange_ba(),
            0xec => {
                let address = self.c32(operand);
                self.bank_read(Op::Cpx, WidthFlag::X, address);
            }
            0xed => {
                let address = self.c32(operand);
                self.bank_read(Op::Sbc, WidthFlag::M, address);
            }
            0xee => {
                let address = self.c32(operand);
                self.bank_modify(Op::Inc, WidthFlag::M, address);
            }
            0xef => {
                let address = self.c32(operand);
                self.long_read(Op::Sbc, WidthFlag::M, address, self.c16(0));
            }
            0xf0 => self.branch_on_flag(self.regs.zero, 1, label, function_name),
            0xf1 => {
                let address = self.c32(operand);
                self.indirect_indexed_read(Op::Sbc, WidthFlag::M, address);
            }
            0xf2 => {
                let address = self.c32(operand);
                self.indirect_read(Op::Sbc, WidthFlag::M, address);
            }
            0xf3 => {
                let address = self.c32(operand);
                self.indirect_stack_read(Op::Sbc, WidthFlag::M, address);
            }
            0xf4 => {
                let address = self.c16(operand);
                self.push_effective_address(address);
            }
            0xf5 => {
                let address = self.c16(operand);
                let x = self.b.load_global(self.regs.x);
                self.direct_read_indexed(Op::Sbc, WidthFlag::M, address, x);
            }
            0xf6 => {
                let address = self.c16(operand);
                self.direct_indexed_modify(Op::Inc, WidthFlag::M, address);
            }
            0xf7 => {
                let address = self.c32(operand);
                let y = self.b.load_global(self.regs.y);
                self.indirect_long_read(Op::Sbc, WidthFlag::M, address, y);
            }
            0xf8 => self.set_flag(self.regs.decimal),
            0xf9 => {
                let address = self.c16(operand);
                let y = self.b.load_global(self.regs.y);
                self.bank_read_indexed(Op::Sbc, WidthFlag::M, address, y);
            }
            0xfa => self.pull_register(WidthFlag::X, self.regs.x),
            0xfb => self.exchange_ce(),
            0xfc => {
                let pointer = self.c16(operand);
                self.call_indexed_indirect(offset, pointer);
            }
            0xfd => {
                let address = self.c16(operand);
                let x = self.b.load_global(self.regs.x);
                self.bank_read_indexed(Op::Sbc, WidthFlag::M, address, x);
            }
            0xfe => {
                let address = self.c16(operand);
                self.bank_indexed_modify(Op::Inc, WidthFlag::M, address);
            }
            0xff => {
                let address = self.c32(operand);
                let x = self.b.load_global(self.regs.x);
                self.long_read(Op::Sbc, WidthFlag::M, address, x);
            }
        }
    }
}

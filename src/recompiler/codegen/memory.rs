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

//! Bus access and effective-address formation. Every memory touch in the
//! recompiled program funnels through the runtime's `read8`/`write8`; the
//! helpers here build the 24-bit addresses the various 65816 addressing
//! modes resolve to, one byte at a time.

use super::WidthFlag;
use crate::ir::{BlockId, Callee, GlobalId, Pred, Type, Value};
use crate::recompiler::Recompiler;

impl Recompiler {
    pub(crate) fn read8(&mut self, address: Value) -> Value {
        self.b.call(Callee::Extern(self.helpers.read8), vec![address])
    }

    pub(crate) fn write8(&mut self, address: Value, value: Value) {
        self.b
            .call_void(Callee::Extern(self.helpers.write8), vec![address, value]);
    }

    /// Loads a register global widened to the 32-bit address domain.
    pub(crate) fn load_register32(&mut self, register: GlobalId) -> Value {
        let ty = self.b.module().global(register).ty;
        let value = self.b.load_global(register);
        self.b.zext(value, ty, Type::I32)
    }

    /// Byte pointers to the low and high halves of a 16-bit register slot.
    pub(crate) fn low_high_ptr(&mut self, register: GlobalId) -> (Value, Value) {
        let low = self.b.byte_gep(Value::Global(register), 0);
        let high = self.b.byte_gep(Value::Global(register), 1);
        (low, high)
    }

    pub(crate) fn combine16(&mut self, low8: Value, high8: Value) -> Value {
        let low16 = self.b.zext(low8, Type::I8, Type::I16);
        let high16 = self.b.zext(high8, Type::I8, Type::I16);
        let shifted = self.b.shl(Type::I16, high16, self.c16(8));
        self.b.or(Type::I16, low16, shifted)
    }

    pub(crate) fn combine32(&mut self, low8: Value, mid8: Value, high8: Value) -> Value {
        let low32 = self.b.zext(low8, Type::I8, Type::I32);
        let mid32 = self.b.zext(mid8, Type::I8, Type::I32);
        let high32 = self.b.zext(high8, Type::I8, Type::I32);
        let mid_shifted = self.b.shl(Type::I32, mid32, self.c32(8));
        let high_shifted = self.b.shl(Type::I32, high32, self.c32(16));
        let upper = self.b.or(Type::I32, mid_shifted, high_shifted);
        self.b.or(Type::I32, low32, upper)
    }

    /// Splits a 16-bit value into its low and high bytes.
    pub(crate) fn split16(&mut self, value16: Value) -> (Value, Value) {
        let low = self.b.trunc(value16, Type::I16, Type::I8);
        let shifted = self.b.lshr(Type::I16, value16, self.c16(8));
        let high = self.b.trunc(shifted, Type::I16, Type::I8);
        (low, high)
    }

    pub(crate) fn test_bits8(&mut self, value: Value, mask: u8) -> Value {
        let masked = self.b.and(Type::I8, value, self.c8(u64::from(mask)));
        self.b.icmp(Pred::Ne, Type::I8, masked, self.c8(0))
    }

    pub(crate) fn test_bits16(&mut self, value: Value, mask: u16) -> Value {
        let masked = self.b.and(Type::I16, value, self.c16(u64::from(mask)));
        self.b.icmp(Pred::Ne, Type::I16, masked, self.c16(0))
    }

    pub(crate) fn load_flag8(&mut self, flag: GlobalId) -> Value {
        let value = self.b.load_global(flag);
        self.b.zext(value, Type::I1, Type::I8)
    }

    /// ZF = (result == 0), NF = sign bit, for an 8-bit result.
    pub(crate) fn set_zn8(&mut self, result: Value) {
        let zero = self.b.icmp(Pred::Eq, Type::I8, result, self.c8(0));
        self.b.store_global(zero, self.regs.zero);
        let negative = self.test_bits8(result, 0x80);
        self.b.store_global(negative, self.regs.negative);
    }

    pub(crate) fn set_zn16(&mut self, result: Value) {
        let zero = self.b.icmp(Pred::Eq, Type::I16, result, self.c16(0));
        self.b.store_global(zero, self.regs.zero);
        let negative = self.test_bits16(result, 0x8000);
        self.b.store_global(negative, self.regs.negative);
    }

    /// Fresh then/else/end blocks with the conditional branch emitted; the
    /// caller fills the arms and rejoins at end.
    pub(crate) fn cond_then_else(&mut self, cond: Value) -> (BlockId, BlockId, BlockId) {
        let then_block = self.b.add_block_here("bb");
        let else_block = self.b.add_block_here("bb");
        let end_block = self.b.add_block_here("bb");
        self.b.cond_br(cond, then_block, else_block);
        (then_block, else_block, end_block)
    }

    pub(crate) fn cond_then(&mut self, cond: Value) -> (BlockId, BlockId) {
        let then_block = self.b.add_block_here("bb");
        let end_block = self.b.add_block_here("bb");
        self.b.cond_br(cond, then_block, end_block);
        (then_block, end_block)
    }

    /// Tests the width flag the instruction is governed by (MF or XF) and
    /// opens the 8-bit arm, the 16-bit arm, and the join block.
    pub(crate) fn width_flag_blocks(&mut self, flag: WidthFlag) -> (BlockId, BlockId, BlockId) {
        let flag_global = match flag {
            WidthFlag::M => self.regs.accumulator_width,
            WidthFlag::X => self.regs.index_width,
        };
        let value = self.b.load_global(flag_global);
        let cond = self.b.icmp(Pred::Eq, Type::I1, value, self.c1(1));
        self.cond_then_else(cond)
    }

    pub(crate) fn select_block(&mut self, block: BlockId) {
        let func = self.b.current_function();
        self.b.select(func, block);
    }

    // --- direct page ---

    pub(crate) fn direct_address(&mut self, address: Value) -> Value {
        let dp = self.load_register32(self.regs.dp);
        let sum = self.b.add(Type::I32, dp, address);
        self.b.and(Type::I32, sum, self.c32(0xffff))
    }

    /// Emulation-mode direct page access with DP low byte zero wraps within
    /// the page: the final byte is (operand | DP) & 0xff.
    pub(crate) fn direct_emulation_address(&mut self, address: Value) -> Value {
        let dp16 = self.b.load_global(self.regs.dp);
        let dp32 = self.b.zext(dp16, Type::I16, Type::I32);
        let joined = self.b.or(Type::I32, address, dp32);
        self.b.and(Type::I32, joined, self.c32(0xff))
    }

    fn direct_wrap_condition(&mut self) -> Value {
        let (dp_low_ptr, _) = self.low_high_ptr(self.regs.dp);
        let dp_low = self.b.load(Type::I8, dp_low_ptr);
        let low_is_zero = self.b.icmp(Pred::Eq, Type::I8, dp_low, self.c8(0));
        let emulation = self.b.load_global(self.regs.emulation);
        self.b.and(Type::I1, emulation, low_is_zero)
    }

    /// Direct-page read: two address paths (page-wrapping emulation form vs
    /// native linear form) joined by a phi.
    pub(crate) fn read_direct(&mut self, address: Value) -> Value {
        let cond = self.direct_wrap_condition();
        let (then_block, else_block, end_block) = self.cond_then_else(cond);

        self.select_block(then_block);
        let emulation_address = self.direct_emulation_address(address);
        let read_emulation = self.read8(emulation_address);
        self.b.br(end_block);

        self.select_block(else_block);
        let native_address = self.direct_address(address);
        let read_native = self.read8(native_address);
        self.b.br(end_block);

        self.select_block(end_block);
        self.b.phi(
            Type::I8,
            vec![(read_emulation, then_block), (read_native, else_block)],
        )
    }

    pub(crate) fn read_direct_native(&mut self, address: Value) -> Value {
        let native_address = self.direct_address(address);
        self.read8(native_address)
    }

    pub(crate) fn write_direct(&mut self, address: Value, value: Value) {
        let cond = self.direct_wrap_condition();
        let (then_block, else_block, end_block) = self.cond_then_else(cond);

        self.select_block(then_block);
        let emulation_address = self.direct_emulation_address(address);
        self.write8(emulation_address, value);
        self.b.br(end_block);

        self.select_block(else_block);
        let native_address = self.direct_address(address);
        self.write8(native_address, value);
        self.b.br(end_block);

        self.select_block(end_block);
    }

    // --- data bank ---

    pub(crate) fn bank_address(&mut self, address: Value) -> Value {
        let bank = self.load_register32(self.regs.db);
        let shifted = self.b.shl(Type::I32, bank, self.c32(16));
        let sum = self.b.add(Type::I32, shifted, address);
        self.b.and(Type::I32, sum, self.c32(0xffffff))
    }

    pub(crate) fn read_bank(&mut self, address: Value) -> Value {
        let bank_address = self.bank_address(address);
        self.read8(bank_address)
    }

    pub(crate) fn write_bank(&mut self, address: Value, value: Value) {
        let bank_address = self.bank_address(address);
        self.write8(bank_address, value);
    }

    // --- 24-bit long ---

    pub(crate) fn read_long(&mut self, address: Value) -> Value {
        let masked = self.b.and(Type::I32, address, self.c32(0xffffff));
        self.read8(masked)
    }

    pub(crate) fn write_long(&mut self, address: Value, value: Value) {
        let masked = self.b.and(Type::I32, address, self.c32(0xffffff));
        self.write8(masked, value);
    }

    // --- stack relative ---

    pub(crate) fn stack_address(&mut self, address: Value) -> Value {
        let sp = self.load_register32(self.regs.sp);
        let sum = self.b.add(Type::I32, sp, address);
        self.b.and(Type::I32, sum, self.c32(0xffff))
    }

    pub(crate) fn read_stack(&mut self, address: Value) -> Value {
        let stack_address = self.stack_address(address);
        self.read8(stack_address)
    }

    pub(crate) fn write_stack(&mut self, address: Value, value: Value) {
        let stack_address = self.stack_address(address);
        self.write8(stack_address, value);
    }

    // --- hardware stack push/pull ---

    /// Pull honouring the emulation flag: in emulation mode only the low
    /// byte of SP is incremented, pinning the stack to page 1.
    pub(crate) fn pull(&mut self) -> Value {
        let emulation = self.b.load_global(self.regs.emulation);
        let cond = self.b.icmp(Pred::Eq, Type::I1, emulation, self.c1(1));
        let (then_block, else_block, end_block) = self.cond_then_else(cond);

        self.select_block(then_block);
        let (sp_low_ptr, _) = self.low_high_ptr(self.regs.sp);
        let sp_low = self.b.load(Type::I8, sp_low_ptr);
        let sp_low_bumped = self.b.add(Type::I8, sp_low, self.c8(1));
        self.b.store(Type::I8, sp_low_bumped, sp_low_ptr);
        self.b.br(end_block);

        self.select_block(else_block);
        let sp16 = self.b.load_global(self.regs.sp);
        let sp16_bumped = self.b.add(Type::I16, sp16, self.c16(1));
        self.b.store_global(sp16_bumped, self.regs.sp);
        self.b.br(end_block);

        self.select_block(end_block);
        let sp = self.load_register32(self.regs.sp);
        self.read8(sp)
    }

    pub(crate) fn pull_native(&mut self) -> Value {
        let sp16 = self.b.load_global(self.regs.sp);
        let sp16_bumped = self.b.add(Type::I16, sp16, self.c16(1));
        let sp32_bumped = self.b.zext(sp16_bumped, Type::I16, Type::I32);
        self.b.store_global(sp16_bumped, self.regs.sp);
        self.read8(sp32_bumped)
    }

    pub(crate) fn push(&mut self, value8: Value) {
        let sp16 = self.b.load_global(self.regs.sp);
        let sp32 = self.b.zext(sp16, Type::I16, Type::I32);
        self.write8(sp32, value8);

        let emulation = self.b.load_global(self.regs.emulation);
        let cond = self.b.icmp(Pred::Eq, Type::I1, emulation, self.c1(1));
        let (then_block, else_block, end_block) = self.cond_then_else(cond);

        self.select_block(then_block);
        let (sp_low_ptr, _) = self.low_high_ptr(self.regs.sp);
        let sp_low = self.b.load(Type::I8, sp_low_ptr);
        let sp_low_dropped = self.b.sub(Type::I8, sp_low, self.c8(1));
        self.b.store(Type::I8, sp_low_dropped, sp_low_ptr);
        self.b.br(end_block);

        self.select_block(else_block);
        let sp16_dropped = self.b.sub(Type::I16, sp16, self.c16(1));
        self.b.store_global(sp16_dropped, self.regs.sp);
        self.b.br(end_block);

        self.select_block(end_block);
    }

    pub(crate) fn push_native(&mut self, value8: Value) {
        let sp16 = self.b.load_global(self.regs.sp);
        let sp32 = self.b.zext(sp16, Type::I16, Type::I32);
        self.write8(sp32, value8);
        let sp16_dropped = self.b.sub(Type::I16, sp16, self.c16(1));
        self.b.store_global(sp16_dropped, self.regs.sp);
    }
}

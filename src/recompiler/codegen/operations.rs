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

//! The arithmetic/logic core handed to the addressing-mode templates.
//! Each operation exists in an 8-bit and a 16-bit form; the templates pick
//! the form at runtime off the governing width flag. Every operation
//! computes its result, updates the flag globals it owns, and returns the
//! value the template should write back (read-only operations return their
//! input unchanged).

use crate::ir::{Callee, Pred, Type, Value};
use crate::recompiler::Recompiler;

/// Operation selector passed to the addressing-mode templates.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Op {
    Asl,
    Lsr,
    Rol,
    Ror,
    Inc,
    Dec,
    Tsb,
    Trb,
    Ora,
    And,
    Eor,
    Bit,
    Lda,
    Ldx,
    Ldy,
    Cmp,
    Cpx,
    Cpy,
    Adc,
    Sbc,
}

impl Recompiler {
    pub(crate) fn apply_op8(&mut self, op: Op, value: Value) -> Value {
        match op {
            Op::Asl => self.asl8(value),
            Op::Lsr => self.lsr8(value),
            Op::Rol => self.rol8(value),
            Op::Ror => self.ror8(value),
            Op::Inc => self.inc8(value),
            Op::Dec => self.dec8(value),
            Op::Tsb => self.tsb8(value),
            Op::Trb => self.trb8(value),
            Op::Ora => self.ora8(value),
            Op::And => self.and8(value),
            Op::Eor => self.eor8(value),
            Op::Bit => self.bit8(value),
            Op::Lda => self.lda8(value),
            Op::Ldx => self.ldx8(value),
            Op::Ldy => self.ldy8(value),
            Op::Cmp => self.compare8(self.regs.a, value),
            Op::Cpx => self.compare8(self.regs.x, value),
            Op::Cpy => self.compare8(self.regs.y, value),
            Op::Adc => self.b.call(Callee::Extern(self.helpers.adc8), vec![value]),
            Op::Sbc => self.b.call(Callee::Extern(self.helpers.sbc8), vec![value]),
        }
    }

    pub(crate) fn apply_op16(&mut self, op: Op, value: Value) -> Value {
        match op {
            Op::Asl => self.asl16(value),
            Op::Lsr => self.lsr16(value),
            Op::Rol => self.rol16(value),
            Op::Ror => self.ror16(value),
            Op::Inc => self.inc16(value),
            Op::Dec => self.dec16(value),
            Op::Tsb => self.tsb16(value),
            Op::Trb => self.trb16(value),
            Op::Ora => self.ora16(value),
            Op::And => self.and16(value),
            Op::Eor => self.eor16(value),
            Op::Bit => self.bit16(value),
            Op::Lda => self.lda16(value),
            Op::Ldx => self.ldx16(value),
            Op::Ldy => self.ldy16(value),
            Op::Cmp => self.compare16(self.regs.a, value),
            Op::Cpx => self.compare16(self.regs.x, value),
            Op::Cpy => self.compare16(self.regs.y, value),
            Op::Adc => self.b.call(Callee::Extern(self.helpers.adc16), vec![value]),
            Op::Sbc => self.b.call(Callee::Extern(self.helpers.sbc16), vec![value]),
        }
    }

    fn asl8(&mut self, value: Value) -> Value {
        let carry = self.test_bits8(value, 0x80);
        self.b.store_global(carry, self.regs.carry);
        let result = self.b.shl(Type::I8, value, self.c8(1));
        self.set_zn8(result);
        result
    }

    fn asl16(&mut self, value: Value) -> Value {
        let carry = self.test_bits16(value, 0x8000);
        self.b.store_global(carry, self.regs.carry);
        let result = self.b.shl(Type::I16, value, self.c16(1));
        self.set_zn16(result);
        result
    }

    fn lsr8(&mut self, value: Value) -> Value {
        let carry = self.test_bits8(value, 0x01);
        self.b.store_global(carry, self.regs.carry);
        let result = self.b.lshr(Type::I8, value, self.c8(1));
        self.set_zn8(result);
        result
    }

    fn lsr16(&mut self, value: Value) -> Value {
        let carry = self.test_bits16(value, 0x01);
        self.b.store_global(carry, self.regs.carry);
        let result = self.b.lshr(Type::I16, value, self.c16(1));
        self.set_zn16(result);
        result
    }

    fn rol8(&mut self, value: Value) -> Value {
        let old_carry = self.b.load_global(self.regs.carry);
        let carry_in = self.b.zext(old_carry, Type::I1, Type::I8);
        let carry_out = self.test_bits8(value, 0x80);
        self.b.store_global(carry_out, self.regs.carry);
        let shifted = self.b.shl(Type::I8, value, self.c8(1));
        let result = self.b.or(Type::I8, shifted, carry_in);
        self.set_zn8(result);
        result
    }

    fn rol16(&mut self, value: Value) -> Value {
        let old_carry = self.b.load_global(self.regs.carry);
        let carry_in = self.b.zext(old_carry, Type::I1, Type::I16);
        let carry_out = self.test_bits16(value, 0x8000);
        self.b.store_global(carry_out, self.regs.carry);
        let shifted = self.b.shl(Type::I16, value, self.c16(1));
        let result = self.b.or(Type::I16, shifted, carry_in);
        self.set_zn16(result);
        result
    }

    fn ror8(&mut self, value: Value) -> Value {
        let old_carry = self.b.load_global(self.regs.carry);
        let carry_in = self.b.zext(old_carry, Type::I1, Type::I8);
        let carry_out = self.test_bits8(value, 0x01);
        self.b.store_global(carry_out, self.regs.carry);
        let high = self.b.shl(Type::I8, carry_in, self.c8(7));
        let low = self.b.lshr(Type::I8, value, self.c8(1));
        let result = self.b.or(Type::I8, high, low);
        self.set_zn8(result);
        result
    }

    fn ror16(&mut self, value: Value) -> Value {
        let old_carry = self.b.load_global(self.regs.carry);
        let carry_in = self.b.zext(old_carry, Type::I1, Type::I16);
        let carry_out = self.test_bits16(value, 0x01);
        self.b.store_global(carry_out, self.regs.carry);
        let high = self.b.shl(Type::I16, carry_in, self.c16(15));
        let low = self.b.lshr(Type::I16, value, self.c16(1));
        let result = self.b.or(Type::I16, high, low);
        self.set_zn16(result);
        result
    }

    fn inc8(&mut self, value: Value) -> Value {
        let result = self.b.add(Type::I8, value, self.c8(1));
        self.set_zn8(result);
        result
    }

    fn inc16(&mut self, value: Value) -> Value {
        let result = self.b.add(Type::I16, value, self.c16(1));
        self.set_zn16(result);
        result
    }

    fn dec8(&mut self, value: Value) -> Value {
        let result = self.b.sub(Type::I8, value, self.c8(1));
        self.set_zn8(result);
        result
    }

    fn dec16(&mut self, value: Value) -> Value {
        let result = self.b.sub(Type::I16, value, self.c16(1));
        self.set_zn16(result);
        result
    }

    fn tsb8(&mut self, value: Value) -> Value {
        let a16 = self.b.load_global(self.regs.a);
        let a8 = self.b.trunc(a16, Type::I16, Type::I8);
        let masked = self.b.and(Type::I8, a8, value);
        let zero = self.b.icmp(Pred::Eq, Type::I8, masked, self.c8(0));
        self.b.store_global(zero, self.regs.zero);
        self.b.or(Type::I8, value, a8)
    }

    fn tsb16(&mut self, value: Value) -> Value {
        let a16 = self.b.load_global(self.regs.a);
        let masked = self.b.and(Type::I16, a16, value);
        let zero = self.b.icmp(Pred::Eq, Type::I16, masked, self.c16(0));
        self.b.store_global(zero, self.regs.zero);
        self.b.or(Type::I16, value, a16)
    }

    fn trb8(&mut self, value: Value) -> Value {
        let a16 = self.b.load_global(self.regs.a);
        let a8 = self.b.trunc(a16, Type::I16, Type::I8);
        let masked = self.b.and(Type::I8, a8, value);
        let zero = self.b.icmp(Pred::Eq, Type::I8, masked, self.c8(0));
        self.b.store_global(zero, self.regs.zero);
        let complement = self.b.xor(Type::I8, a8, self.c8(0xff));
        self.b.and(Type::I8, value, complement)
    }

    fn trb16(&mut self, value: Value) -> Value {
        let a16 = self.b.load_global(self.regs.a);
        let masked = self.b.and(Type::I16, a16, value);
        let zero = self.b.icmp(Pred::Eq, Type::I16, masked, self.c16(0));
        self.b.store_global(zero, self.regs.zero);
        let complement = self.b.xor(Type::I16, a16, self.c16(0xffff));
        self.b.and(Type::I16, value, complement)
    }

    fn ora8(&mut self, value: Value) -> Value {
        let a16 = self.b.load_global(self.regs.a);
        let a8 = self.b.trunc(a16, Type::I16, Type::I8);
        let result = self.b.or(Type::I8, a8, value);
        let (a_low_ptr, _) = self.low_high_ptr(self.regs.a);
        self.b.store(Type::I8, result, a_low_ptr);
        self.set_zn8(result);
        result
    }

    fn ora16(&mut self, value: Value) -> Value {
        let a16 = self.b.load_global(self.regs.a);
        let result = self.b.or(Type::I16, a16, value);
        self.b.store_global(result, self.regs.a);
        self.set_zn16(result);
        result
    }

    fn and8(&mut self, value: Value) -> Value {
        let a16 = self.b.load_global(self.regs.a);
        let a8 = self.b.trunc(a16, Type::I16, Type::I8);
        let result = self.b.and(Type::I8, a8, value);
        let (a_low_ptr, _) = self.low_high_ptr(self.regs.a);
        self.b.store(Type::I8, result, a_low_ptr);
        self.set_zn8(result);
        result
    }

    fn and16(&mut self, value: Value) -> Value {
        let a16 = self.b.load_global(self.regs.a);
        let result = self.b.and(Type::I16, a16, value);
        self.b.store_global(result, self.regs.a);
        self.set_zn16(result);
        result
    }

    fn eor8(&mut self, value: Value) -> Value {
        let a16 = self.b.load_global(self.regs.a);
        let a8 = self.b.trunc(a16, Type::I16, Type::I8);
        let result = self.b.xor(Type::I8, a8, value);
        let (a_low_ptr, _) = self.low_high_ptr(self.regs.a);
        self.b.store(Type::I8, result, a_low_ptr);
        self.set_zn8(result);
        result
    }

    fn eor16(&mut self, value: Value) -> Value {
        let a16 = self.b.load_global(self.regs.a);
        let result = self.b.xor(Type::I16, a16, value);
        self.b.store_global(result, self.regs.a);
        self.set_zn16(result);
        result
    }

    /// BIT: ZF from A & operand, VF and NF copied from operand bits 6/7.
    fn bit8(&mut self, value: Value) -> Value {
        let a16 = self.b.load_global(self.regs.a);
        let a8 = self.b.trunc(a16, Type::I16, Type::I8);
        let masked = self.b.and(Type::I8, value, a8);
        let zero = self.b.icmp(Pred::Eq, Type::I8, masked, self.c8(0));
        self.b.store_global(zero, self.regs.zero);
        let overflow = self.test_bits8(value, 0x40);
        self.b.store_global(overflow, self.regs.overflow);
        let negative = self.test_bits8(value, 0x80);
        self.b.store_global(negative, self.regs.negative);
        value
    }

    fn bit16(&mut self, value: Value) -> Value {
        let a16 = self.b.load_global(self.regs.a);
        let masked = self.b.and(Type::I16, value, a16);
        let zero = self.b.icmp(Pred::Eq, Type::I16, masked, self.c16(0));
        self.b.store_global(zero, self.regs.zero);
        let overflow = self.test_bits16(value, 0x4000);
        self.b.store_global(overflow, self.regs.overflow);
        let negative = self.test_bits16(value, 0x8000);
        self.b.store_global(negative, self.regs.negative);
        value
    }

    fn lda8(&mut self, value: Value) -> Value {
        let (a_low_ptr, _) = self.low_high_ptr(self.regs.a);
        self.b.store(Type::I8, value, a_low_ptr);
        self.set_zn8(value);
        value
    }

    fn lda16(&mut self, value: Value) -> Value {
        self.b.store_global(value, self.regs.a);
        self.set_zn16(value);
        value
    }

    fn ldx8(&mut self, value: Value) -> Value {
        let (x_low_ptr, _) = self.low_high_ptr(self.regs.x);
        self.b.store(Type::I8, value, x_low_ptr);
        self.set_zn8(value);
        value
    }

    fn ldx16(&mut self, value: Value) -> Value {
        self.b.store_global(value, self.regs.x);
        self.set_zn16(value);
        value
    }

    fn ldy8(&mut self, value: Value) -> Value {
        let (y_low_ptr, _) = self.low_high_ptr(self.regs.y);
        self.b.store(Type::I8, value, y_low_ptr);
        self.set_zn8(value);
        value
    }

    fn ldy16(&mut self, value: Value) -> Value {
        self.b.store_global(value, self.regs.y);
        self.set_zn16(value);
        value
    }

    /// CMP/CPX/CPY family: the subtraction runs widened to 32 bits so the
    /// borrow shows up in the sign; CF = (register - operand) >= 0.
    fn compare8(&mut self, register: crate::ir::GlobalId, value: Value) -> Value {
        let reg16 = self.b.load_global(register);
        let reg8 = self.b.trunc(reg16, Type::I16, Type::I8);
        let reg32 = self.b.zext(reg8, Type::I8, Type::I32);
        let value32 = self.b.zext(value, Type::I8, Type::I32);
        let result32 = self.b.sub(Type::I32, reg32, value32);
        let carry = self.b.icmp(Pred::Sge, Type::I32, result32, self.c32(0));
        self.b.store_global(carry, self.regs.carry);
        let result = self.b.trunc(result32, Type::I32, Type::I8);
        self.set_zn8(result);
        result
    }

    fn compare16(&mut self, register: crate::ir::GlobalId, value: Value) -> Value {
        let reg16 = self.b.load_global(register);
        let reg32 = self.b.zext(reg16, Type::I16, Type::I32);
        let value32 = self.b.zext(value, Type::I16, Type::I32);
        let result32 = self.b.sub(Type::I32, reg32, value32);
        let carry = self.b.icmp(Pred::Sge, Type::I32, result32, self.c32(0));
        self.b.store_global(carry, self.regs.carry);
        let result = self.b.trunc(result32, Type::I32, Type::I16);
        self.set_zn16(result);
        result
    }
}

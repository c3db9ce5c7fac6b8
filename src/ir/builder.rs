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

use super::*;

/// Emission cursor over a [`Module`]. Every helper appends to the current
/// insertion block; selecting a block is the only way to move the cursor.
#[derive(Debug)]
pub struct Builder {
    module: Module,
    cursor: Option<(FuncId, BlockId)>,
}

impl Builder {
    pub fn new(module: Module) -> Self {
        Builder {
            module,
            cursor: None,
        }
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn module_mut(&mut self) -> &mut Module {
        &mut self.module
    }

    pub fn into_module(self) -> Module {
        self.module
    }

    pub fn cursor(&self) -> Option<(FuncId, BlockId)> {
        self.cursor
    }

    pub fn select(&mut self, func: FuncId, block: BlockId) {
        self.cursor = Some((func, block));
    }

    pub fn clear_cursor(&mut self) {
        self.cursor = None;
    }

    /// Current function of the cursor. Translation drives the cursor label
    /// by label, so emission without a selected block is a caller bug.
    pub fn current_function(&self) -> FuncId {
        let (func, _) = self.cursor.expect("no insertion block selected");
        func
    }

    pub fn add_block(&mut self, func: FuncId, name: &str) -> BlockId {
        self.module.func_mut(func).add_block(name)
    }

    /// Adds a block to the cursor's function without moving the cursor.
    pub fn add_block_here(&mut self, name: &str) -> BlockId {
        let func = self.current_function();
        self.add_block(func, name)
    }

    fn push(&mut self, inst: Inst) {
        let (func, block) = self.cursor.expect("no insertion block selected");
        let block = self.module.func_mut(func).block_mut(block);
        debug_assert!(block.term.is_none(), "emitting into a terminated block");
        block.insts.push(inst);
    }

    fn alloc(&mut self) -> ValueId {
        let func = self.current_function();
        self.module.func_mut(func).alloc_value()
    }

    fn terminate(&mut self, term: Terminator) {
        let (func, block) = self.cursor.expect("no insertion block selected");
        let block = self.module.func_mut(func).block_mut(block);
        debug_assert!(block.term.is_none(), "block already has a terminator");
        block.term = Some(term);
    }

    pub fn const_val(&self, ty: Type, bits: u64) -> Value {
        Value::Const { ty, bits }
    }

    pub fn global(&self, id: GlobalId) -> Value {
        Value::Global(id)
    }

    pub fn binary(&mut self, op: BinOp, ty: Type, lhs: Value, rhs: Value) -> Value {
        let id = self.alloc();
        self.push(Inst::Bin {
            id,
            op,
            ty,
            lhs,
            rhs,
        });
        Value::Inst(id)
    }

    pub fn add(&mut self, ty: Type, lhs: Value, rhs: Value) -> Value {
        self.binary(BinOp::Add, ty, lhs, rhs)
    }

    pub fn sub(&mut self, ty: Type, lhs: Value, rhs: Value) -> Value {
        self.binary(BinOp::Sub, ty, lhs, rhs)
    }

    pub fn and(&mut self, ty: Type, lhs: Value, rhs: Value) -> Value {
        self.binary(BinOp::And, ty, lhs, rhs)
    }

    pub fn or(&mut self, ty: Type, lhs: Value, rhs: Value) -> Value {
        self.binary(BinOp::Or, ty, lhs, rhs)
    }

    pub fn xor(&mut self, ty: Type, lhs: Value, rhs: Value) -> Value {
        self.binary(BinOp::Xor, ty, lhs, rhs)
    }

    pub fn shl(&mut self, ty: Type, lhs: Value, rhs: Value) -> Value {
        self.binary(BinOp::Shl, ty, lhs, rhs)
    }

    pub fn lshr(&mut self, ty: Type, lhs: Value, rhs: Value) -> Value {
        self.binary(BinOp::LShr, ty, lhs, rhs)
    }

    pub fn icmp(&mut self, pred: Pred, ty: Type, lhs: Value, rhs: Value) -> Value {
        let id = self.alloc();
        self.push(Inst::ICmp {
            id,
            pred,
            ty,
            lhs,
            rhs,
        });
        Value::Inst(id)
    }

    pub fn trunc(&mut self, value: Value, from: Type, to: Type) -> Value {
        let id = self.alloc();
        self.push(Inst::Cast {
            id,
            op: CastOp::Trunc,
            value,
            from,
            to,
        });
        Value::Inst(id)
    }

    pub fn zext(&mut self, value: Value, from: Type, to: Type) -> Value {
        let id = self.alloc();
        self.push(Inst::Cast {
            id,
            op: CastOp::ZExt,
            value,
            from,
            to,
        });
        Value::Inst(id)
    }

    pub fn load(&mut self, ty: Type, ptr: Value) -> Value {
        let id = self.alloc();
        self.push(Inst::Load { id, ty, ptr });
        Value::Inst(id)
    }

    /// Loads a register or flag global at its declared width.
    pub fn load_global(&mut self, g: GlobalId) -> Value {
        let ty = self.module.global(g).ty;
        self.load(ty, Value::Global(g))
    }

    pub fn store(&mut self, ty: Type, value: Value, ptr: Value) {
        self.push(Inst::Store { ty, value, ptr });
    }

    pub fn store_global(&mut self, value: Value, g: GlobalId) {
        let ty = self.module.global(g).ty;
        self.store(ty, value, Value::Global(g));
    }

    /// Call with a result. The callee must not return void.
    pub fn call(&mut self, callee: Callee, args: Vec<Value>) -> Value {
        debug_assert!(self.module.callee_ret(callee) != Type::Void);
        let id = self.alloc();
        self.push(Inst::Call {
            id: Some(id),
            callee,
            args,
        });
        Value::Inst(id)
    }

    pub fn call_void(&mut self, callee: Callee, args: Vec<Value>) {
        self.push(Inst::Call {
            id: None,
            callee,
            args,
        });
    }

    pub fn phi(&mut self, ty: Type, incoming: Vec<(Value, BlockId)>) -> Value {
        let id = self.alloc();
        self.push(Inst::Phi { id, ty, incoming });
        Value::Inst(id)
    }

    pub fn byte_gep(&mut self, base: Value, offset: u32) -> Value {
        let id = self.alloc();
        self.push(Inst::ByteGep { id, base, offset });
        Value::Inst(id)
    }

    pub fn br(&mut self, target: BlockId) {
        self.terminate(Terminator::Br(target));
    }

    pub fn cond_br(&mut self, cond: Value, then_block: BlockId, else_block: BlockId) {
        self.terminate(Terminator::CondBr {
            cond,
            then_block,
            else_block,
        });
    }

    pub fn switch(&mut self, value: Value, default: BlockId, cases: Vec<(u32, BlockId)>) {
        self.terminate(Terminator::Switch {
            value,
            default,
            cases,
        });
    }

    pub fn ret(&mut self, value: Value) {
        self.terminate(Terminator::Ret(value));
    }

    pub fn ret_void(&mut self) {
        self.terminate(Terminator::RetVoid);
    }
}

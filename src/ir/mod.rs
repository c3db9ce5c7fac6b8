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

pub mod builder;
pub mod printer;
pub mod verifier;

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Value and first-class types of the IR. `Ptr` is an opaque pointer, as in
/// modern LLVM; loads and stores carry the pointee type themselves.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Type {
    I1,
    I8,
    I16,
    I32,
    Void,
    Ptr,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Type::I1 => "i1",
            Type::I8 => "i8",
            Type::I16 => "i16",
            Type::I32 => "i32",
            Type::Void => "void",
            Type::Ptr => "ptr",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GlobalId(pub usize);

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct StrId(pub usize);

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ExternId(pub usize);

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FuncId(pub usize);

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BlockId(pub usize);

/// SSA result slot, scoped to its parent function.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ValueId(pub u32);

/// An operand. `Global` and `Str` are pointers to module-level storage;
/// `Inst` names the result of an instruction in the same function.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Value {
    Const { ty: Type, bits: u64 },
    Global(GlobalId),
    Str(StrId),
    Inst(ValueId),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum BinOp {
    Add,
    Sub,
    And,
    Or,
    Xor,
    Shl,
    LShr,
}

impl BinOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::And => "and",
            BinOp::Or => "or",
            BinOp::Xor => "xor",
            BinOp::Shl => "shl",
            BinOp::LShr => "lshr",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Pred {
    Eq,
    Ne,
    Sge,
}

impl Pred {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Pred::Eq => "eq",
            Pred::Ne => "ne",
            Pred::Sge => "sge",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum CastOp {
    Trunc,
    ZExt,
}

/// Callable target of a `call` instruction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Callee {
    Extern(ExternId),
    Function(FuncId),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Inst {
    Bin {
        id: ValueId,
        op: BinOp,
        ty: Type,
        lhs: Value,
        rhs: Value,
    },
    ICmp {
        id: ValueId,
        pred: Pred,
        ty: Type,
        lhs: Value,
        rhs: Value,
    },
    Cast {
        id: ValueId,
        op: CastOp,
        value: Value,
        from: Type,
        to: Type,
    },
    Load {
        id: ValueId,
        ty: Type,
        ptr: Value,
    },
    Store {
        ty: Type,
        value: Value,
        ptr: Value,
    },
    Call {
        id: Option<ValueId>,
        callee: Callee,
        args: Vec<Value>,
    },
    Phi {
        id: ValueId,
        ty: Type,
        incoming: Vec<(Value, BlockId)>,
    },
    Alloca {
        id: ValueId,
        ty: Type,
    },
    /// `getelementptr i8` into a wider slot; offset 0 is the low byte of a
    /// little-endian 16-bit global, offset 1 the high byte.
    ByteGep {
        id: ValueId,
        base: Value,
        offset: u32,
    },
}

impl Inst {
    pub fn result(&self) -> Option<ValueId> {
        match self {
            Inst::Bin { id, .. }
            | Inst::ICmp { id, .. }
            | Inst::Cast { id, .. }
            | Inst::Load { id, .. }
            | Inst::Phi { id, .. }
            | Inst::Alloca { id, .. }
            | Inst::ByteGep { id, .. } => Some(*id),
            Inst::Call { id, .. } => *id,
            Inst::Store { .. } => None,
        }
    }

    pub fn is_phi(&self) -> bool {
        matches!(self, Inst::Phi { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Terminator {
    Br(BlockId),
    CondBr {
        cond: Value,
        then_block: BlockId,
        else_block: BlockId,
    },
    Switch {
        value: Value,
        default: BlockId,
        cases: Vec<(u32, BlockId)>,
    },
    Ret(Value),
    RetVoid,
}

impl Terminator {
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Terminator::Br(t) => vec![*t],
            Terminator::CondBr {
                then_block,
                else_block,
                ..
            } => vec![*then_block, *else_block],
            Terminator::Switch { default, cases, .. } => {
                let mut out = vec![*default];
                out.extend(cases.iter().map(|(_, b)| *b));
                out
            }
            Terminator::Ret(_) | Terminator::RetVoid => vec![],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Block {
    pub name: String,
    pub insts: Vec<Inst>,
    pub term: Option<Terminator>,
}

impl Block {
    /// Index of the first non-phi instruction; phis always sit at the top.
    pub fn first_non_phi(&self) -> usize {
        self.insts.iter().take_while(|i| i.is_phi()).count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Function {
    pub name: String,
    pub ret: Type,
    pub blocks: Vec<Block>,
    pub entry: Option<BlockId>,
    next_value: u32,
    used_block_names: HashSet<String>,
}

impl Function {
    pub fn new(name: &str, ret: Type) -> Self {
        Function {
            name: name.to_string(),
            ret,
            blocks: Vec::new(),
            entry: None,
            next_value: 0,
            used_block_names: HashSet::new(),
        }
    }

    pub fn alloc_value(&mut self) -> ValueId {
        let id = ValueId(self.next_value);
        self.next_value += 1;
        id
    }

    /// Appends a block, uniquifying its name within the function. The first
    /// block created becomes the entry until something re-points it.
    pub fn add_block(&mut self, name: &str) -> BlockId {
        let mut unique = name.to_string();
        let mut n = 0usize;
        while !self.used_block_names.insert(unique.clone()) {
            n += 1;
            unique = format!("{}.{}", name, n);
        }
        let id = BlockId(self.blocks.len());
        self.blocks.push(Block {
            name: unique,
            insts: Vec::new(),
            term: None,
        });
        if self.entry.is_none() {
            self.entry = Some(id);
        }
        id
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.0]
    }

    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of terminator edges targeting `id`.
    pub fn predecessor_count(&self, id: BlockId) -> usize {
        self.blocks
            .iter()
            .filter_map(|b| b.term.as_ref())
            .flat_map(|t| t.successors())
            .filter(|s| *s == id)
            .count()
    }

    /// Redirects phi incoming edges recorded against `old` to `new`. Needed
    /// when a block is split and its terminator moves to the tail.
    pub fn retarget_phi_sources(&mut self, old: BlockId, new: BlockId) {
        for block in &mut self.blocks {
            for inst in &mut block.insts {
                if let Inst::Phi { incoming, .. } = inst {
                    for (_, pred) in incoming.iter_mut() {
                        if *pred == old {
                            *pred = new;
                        }
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Global {
    pub name: String,
    pub ty: Type,
}

/// NUL-terminated private string constant (debug text for one instruction).
#[derive(Debug, Clone, Serialize)]
pub struct StringConst {
    pub name: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExternDecl {
    pub name: String,
    pub params: Vec<Type>,
    pub ret: Type,
}

#[derive(Debug, Clone, Serialize)]
pub struct Module {
    pub name: String,
    pub data_layout: Option<String>,
    pub target_triple: Option<String>,
    pub globals: Vec<Global>,
    pub strings: Vec<StringConst>,
    pub externs: Vec<ExternDecl>,
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new(name: &str) -> Self {
        Module {
            name: name.to_string(),
            data_layout: None,
            target_triple: None,
            globals: Vec::new(),
            strings: Vec::new(),
            externs: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn add_global(&mut self, name: &str, ty: Type) -> GlobalId {
        let id = GlobalId(self.globals.len());
        self.globals.push(Global {
            name: name.to_string(),
            ty,
        });
        id
    }

    pub fn add_string(&mut self, data: &str) -> StrId {
        let id = StrId(self.strings.len());
        self.strings.push(StringConst {
            name: format!("str{}", id.0),
            data: data.as_bytes().to_vec(),
        });
        id
    }

    pub fn declare_extern(&mut self, name: &str, params: &[Type], ret: Type) -> ExternId {
        let id = ExternId(self.externs.len());
        self.externs.push(ExternDecl {
            name: name.to_string(),
            params: params.to_vec(),
            ret,
        });
        id
    }

    pub fn add_function(&mut self, name: &str, ret: Type) -> FuncId {
        let id = FuncId(self.functions.len());
        self.functions.push(Function::new(name, ret));
        id
    }

    pub fn global(&self, id: GlobalId) -> &Global {
        &self.globals[id.0]
    }

    pub fn func(&self, id: FuncId) -> &Function {
        &self.functions[id.0]
    }

    pub fn func_mut(&mut self, id: FuncId) -> &mut Function {
        &mut self.functions[id.0]
    }

    pub fn callee_ret(&self, callee: Callee) -> Type {
        match callee {
            Callee::Extern(e) => self.externs[e.0].ret,
            Callee::Function(f) => self.functions[f.0].ret,
        }
    }
}

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
use std::fmt::Write;

/// Renders the module as LLVM-flavoured textual IR. Blocks print entry
/// first, then in creation order; SSA names are stable (`%vN` per
/// function), so two passes over the same AST produce identical text.
pub fn print_module(module: &Module) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "; ModuleID = '{}'", module.name);
    let _ = writeln!(out, "source_filename = \"{}\"", module.name);
    if let Some(layout) = &module.data_layout {
        let _ = writeln!(out, "target datalayout = \"{}\"", layout);
    }
    if let Some(triple) = &module.target_triple {
        let _ = writeln!(out, "target triple = \"{}\"", triple);
    }
    out.push('\n');

    for global in &module.globals {
        let _ = writeln!(out, "@{} = external global {}", global.name, global.ty);
    }
    if !module.globals.is_empty() {
        out.push('\n');
    }

    for s in &module.strings {
        let _ = writeln!(
            out,
            "@{} = private unnamed_addr constant [{} x i8] c\"{}\\00\"",
            s.name,
            s.data.len() + 1,
            escape_bytes(&s.data)
        );
    }
    if !module.strings.is_empty() {
        out.push('\n');
    }

    for e in &module.externs {
        let params = e
            .params
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "declare {} @{}({})", e.ret, e.name, params);
    }
    if !module.externs.is_empty() {
        out.push('\n');
    }

    for func in &module.functions {
        if func.is_declaration() {
            let _ = writeln!(out, "declare {} @{}()\n", func.ret, func.name);
        } else {
            print_function(&mut out, module, func);
        }
    }

    out
}

fn print_function(out: &mut String, module: &Module, func: &Function) {
    let _ = writeln!(out, "define {} @{}() {{", func.ret, func.name);
    for id in block_order(func) {
        let block = func.block(id);
        let _ = writeln!(out, "{}:", block.name);
        for inst in &block.insts {
            print_inst(out, module, func, inst);
        }
        match &block.term {
            Some(term) => print_term(out, module, func, term),
            None => {
                let _ = writeln!(out, "  ; <missing terminator>");
            }
        }
    }
    let _ = writeln!(out, "}}\n");
}

fn block_order(func: &Function) -> Vec<BlockId> {
    let mut order = Vec::with_capacity(func.blocks.len());
    if let Some(entry) = func.entry {
        order.push(entry);
    }
    for i in 0..func.blocks.len() {
        let id = BlockId(i);
        if Some(id) != func.entry {
            order.push(id);
        }
    }
    order
}

fn print_inst(out: &mut String, module: &Module, func: &Function, inst: &Inst) {
    match inst {
        Inst::Bin { id, op, ty, lhs, rhs } => {
            let _ = writeln!(
                out,
                "  %v{} = {} {} {}, {}",
                id.0,
                op.mnemonic(),
                ty,
                value(module, lhs),
                value(module, rhs)
            );
        }
        Inst::ICmp { id, pred, ty, lhs, rhs } => {
            let _ = writeln!(
                out,
                "  %v{} = icmp {} {} {}, {}",
                id.0,
                pred.mnemonic(),
                ty,
                value(module, lhs),
                value(module, rhs)
            );
        }
        Inst::Cast { id, op, value: v, from, to } => {
            let mnemonic = match op {
                CastOp::Trunc => "trunc",
                CastOp::ZExt => "zext",
            };
            let _ = writeln!(
                out,
                "  %v{} = {} {} {} to {}",
                id.0,
                mnemonic,
                from,
                value(module, v),
                to
            );
        }
        Inst::Load { id, ty, ptr } => {
            let _ = writeln!(out, "  %v{} = load {}, ptr {}", id.0, ty, value(module, ptr));
        }
        Inst::Store { ty, value: v, ptr } => {
            let _ = writeln!(
                out,
                "  store {} {}, ptr {}",
                ty,
                value(module, v),
                value(module, ptr)
            );
        }
        Inst::Call { id, callee, args } => {
            let (name, params, ret) = callee_signature(module, *callee);
            let rendered = args
                .iter()
                .enumerate()
                .map(|(i, a)| {
                    let ty = params.get(i).copied().unwrap_or(Type::Ptr);
                    format!("{} {}", ty, value(module, a))
                })
                .collect::<Vec<_>>()
                .join(", ");
            match id {
                Some(id) => {
                    let _ = writeln!(out, "  %v{} = call {} @{}({})", id.0, ret, name, rendered);
                }
                None => {
                    let _ = writeln!(out, "  call {} @{}({})", ret, name, rendered);
                }
            }
        }
        Inst::Phi { id, ty, incoming } => {
            let edges = incoming
                .iter()
                .map(|(v, b)| format!("[ {}, %{} ]", value(module, v), func.block(*b).name))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "  %v{} = phi {} {}", id.0, ty, edges);
        }
        Inst::Alloca { id, ty } => {
            let _ = writeln!(out, "  %v{} = alloca {}", id.0, ty);
        }
        Inst::ByteGep { id, base, offset } => {
            let _ = writeln!(
                out,
                "  %v{} = getelementptr i8, ptr {}, i32 {}",
                id.0,
                value(module, base),
                offset
            );
        }
    }
}

fn print_term(out: &mut String, module: &Module, func: &Function, term: &Terminator) {
    match term {
        Terminator::Br(target) => {
            let _ = writeln!(out, "  br label %{}", func.block(*target).name);
        }
        Terminator::CondBr {
            cond,
            then_block,
            else_block,
        } => {
            let _ = writeln!(
                out,
                "  br i1 {}, label %{}, label %{}",
                value(module, cond),
                func.block(*then_block).name,
                func.block(*else_block).name
            );
        }
        Terminator::Switch {
            value: v,
            default,
            cases,
        } => {
            let _ = writeln!(
                out,
                "  switch i32 {}, label %{} [",
                value(module, v),
                func.block(*default).name
            );
            for (case, target) in cases {
                let _ = writeln!(out, "    i32 {}, label %{}", case, func.block(*target).name);
            }
            let _ = writeln!(out, "  ]");
        }
        Terminator::Ret(v) => {
            let _ = writeln!(out, "  ret {} {}", func.ret, value(module, v));
        }
        Terminator::RetVoid => {
            let _ = writeln!(out, "  ret void");
        }
    }
}

fn callee_signature(module: &Module, callee: Callee) -> (&str, &[Type], Type) {
    match callee {
        Callee::Extern(e) => {
            let decl = &module.externs[e.0];
            (decl.name.as_str(), decl.params.as_slice(), decl.ret)
        }
        Callee::Function(f) => {
            let func = &module.functions[f.0];
            (func.name.as_str(), &[], func.ret)
        }
    }
}

fn value(module: &Module, v: &Value) -> String {
    match v {
        Value::Global(g) => format!("@{}", module.global(*g).name),
        Value::Str(s) => format!("@{}", module.strings[s.0].name),
        _ => local_value(v),
    }
}

fn local_value(v: &Value) -> String {
    match v {
        Value::Const { ty, bits } => format!("{}", bits & type_mask(*ty)),
        Value::Inst(id) => format!("%v{}", id.0),
        Value::Global(_) | Value::Str(_) => String::new(),
    }
}

fn type_mask(ty: Type) -> u64 {
    match ty {
        Type::I1 => 0x1,
        Type::I8 => 0xff,
        Type::I16 => 0xffff,
        Type::I32 => 0xffff_ffff,
        Type::Void | Type::Ptr => u64::MAX,
    }
}

fn escape_bytes(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len());
    for &b in data {
        if (b' '..=b'~').contains(&b) && b != b'"' && b != b'\\' {
            out.push(b as char);
        } else {
            let _ = write!(out, "\\{:02X}", b);
        }
    }
    out
}

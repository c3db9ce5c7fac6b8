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

use serde_json::{Value, json};
use smkrc::file_reader::MockFileReader;
use smkrc::ir::{Callee, Function, Inst, Module, Terminator, Type};
use smkrc::{Recompilation, Target, recompile};
use std::path::Path;

fn label(name: &str, offset: u32) -> Value {
    json!({"Label": {"name": name, "offset": offset}})
}

/// Instruction node without an operand, 8-bit modes.
fn instr(offset: u32, pc: u32, opcode: u8, funcs: &[&str]) -> Value {
    json!({"Instruction": {
        "offset": offset,
        "pc": pc,
        "instruction_string": format!("op {:02X}", opcode),
        "opcode": opcode,
        "memory_mode": 1,
        "index_mode": 1,
        "func_names": funcs,
    }})
}

fn instr_op(offset: u32, pc: u32, opcode: u8, operand: u32, size: u32, funcs: &[&str]) -> Value {
    json!({"Instruction": {
        "offset": offset,
        "pc": pc,
        "instruction_string": format!("op {:02X} {:x}", opcode, operand),
        "opcode": opcode,
        "operand": operand,
        "operand_size": size,
        "memory_mode": 1,
        "index_mode": 1,
        "func_names": funcs,
    }})
}

fn instr_jump(
    offset: u32,
    pc: u32,
    opcode: u8,
    operand: u32,
    jump_label: &str,
    funcs: &[&str],
) -> Value {
    json!({"Instruction": {
        "offset": offset,
        "pc": pc,
        "instruction_string": format!("op {:02X} {}", opcode, jump_label),
        "opcode": opcode,
        "operand": operand,
        "jump_label_name": jump_label,
        "operand_size": 2,
        "memory_mode": 1,
        "index_mode": 1,
        "func_names": funcs,
    }})
}

/// Builds an object whose keys are numeric offsets, the way the
/// disassembler serializes its maps.
fn offset_map(entries: &[(u32, Value)]) -> Value {
    let mut map = serde_json::Map::new();
    for (key, value) in entries {
        map.insert(key.to_string(), value.clone());
    }
    Value::Object(map)
}

fn document(
    function_names: &[&str],
    labels_to_functions: Value,
    offset_to_function_name: Value,
    jump_tables: Value,
    manipulation: Value,
    ast: Vec<Value>,
) -> Value {
    json!({
        "rom_reset_func_name": "Reset",
        "rom_reset_addr": 0x8000,
        "rom_nmi_func_name": "Nmi",
        "rom_irq_func_name": "Irq",
        "function_names": function_names,
        "offset_to_function_name": offset_to_function_name,
        "labels_to_functions": labels_to_functions,
        "jump_tables": jump_tables,
        "return_address_manipulation_functions": manipulation,
        "ast": ast,
    })
}

fn run(doc: &Value) -> Recompilation {
    let mut reader = MockFileReader::default();
    reader.add_file("test.json", &doc.to_string());
    let result = recompile(Path::new("test.json"), Target::Native, &reader).unwrap();
    assert!(
        result.is_verified(),
        "module failed verification:\n{}\n{}",
        result.verify_errors.join("\n"),
        result.print()
    );
    result
}

fn find_function<'m>(module: &'m Module, name: &str) -> &'m Function {
    module
        .functions
        .iter()
        .find(|f| f.name == name)
        .unwrap_or_else(|| panic!("no function named {}", name))
}

fn function_id(module: &Module, name: &str) -> usize {
    module
        .functions
        .iter()
        .position(|f| f.name == name)
        .unwrap_or_else(|| panic!("no function named {}", name))
}

fn extern_id(module: &Module, name: &str) -> usize {
    module
        .externs
        .iter()
        .position(|e| e.name == name)
        .unwrap_or_else(|| panic!("no extern named {}", name))
}

#[test]
fn test_empty_program() {
    let doc = document(
        &["Reset", "Nmi", "Irq"],
        offset_map(&[(0x8000, json!({"Reset": true}))]),
        offset_map(&[]),
        offset_map(&[]),
        json!({}),
        vec![label("Reset", 0x8000)],
    );
    let result = run(&doc);
    let module = &result.module;

    // The empty label block crashes loudly instead of running off the end.
    let reset = find_function(module, "Reset");
    assert_eq!(reset.blocks.len(), 1);
    let block = &reset.blocks[0];
    assert_eq!(block.name, "Reset_Reset");
    let panic = extern_id(module, "panic");
    assert!(block.insts.iter().any(
        |inst| matches!(inst, Inst::Call { callee: Callee::Extern(e), .. } if e.0 == panic)
    ));
    assert_eq!(block.term, Some(Terminator::RetVoid));

    // start seeds PC with the reset address and calls the reset function.
    let printed = result.print();
    assert!(printed.contains("define void @start()"));
    assert!(printed.contains("store i16 32768, ptr @PC"));
    assert!(printed.contains("call void @Reset()"));
}

#[test]
fn test_lda_immediate_then_return() {
    let doc = document(
        &["Reset", "Nmi", "Irq"],
        offset_map(&[(0x8000, json!({"Reset": true}))]),
        offset_map(&[]),
        offset_map(&[]),
        json!({}),
        vec![
            label("CODE_808000", 0x8000),
            instr_op(0x8000, 0x808000, 0xa9, 0x42, 1, &["Reset"]),
            instr(0x8002, 0x808002, 0x60, &["Reset"]),
        ],
    );
    let result = run(&doc);
    let printed = result.print();

    // Both width arms exist: the 8-bit one stores into the low byte of A,
    // the 16-bit one into the whole register.
    assert!(printed.contains("store i8 66, ptr %v"));
    assert!(printed.contains("store i16 66, ptr @A"));
    // RTS discards two stack bytes and returns.
    assert!(printed.matches("call i8 @read8").count() >= 2);
    assert!(printed.contains("ret void"));
}

#[test]
fn test_forward_branch_taken_on_zero_flag() {
    let doc = document(
        &["Reset", "Nmi", "Irq"],
        offset_map(&[
            (0x8000, json!({"Reset": true})),
            (0x8004, json!({"Reset": false})),
        ]),
        offset_map(&[]),
        offset_map(&[]),
        json!({}),
        vec![
            label("CODE_808000", 0x8000),
            instr_op(0x8000, 0x808000, 0xc9, 0x00, 1, &["Reset"]),
            instr_jump(0x8002, 0x808002, 0xf0, 0x8004, "CODE_808004", &["Reset"]),
            label("CODE_808004", 0x8004),
            instr(0x8004, 0x808004, 0x60, &["Reset"]),
        ],
    );
    let result = run(&doc);
    let module = &result.module;

    let reset = find_function(module, "Reset");
    assert!(reset.blocks.iter().any(|b| b.name == "Reset_CODE_808004"));

    // The branch tests ZF and targets the labelled block.
    let printed = result.print();
    assert!(printed.contains("load i1, ptr @ZF"));
    assert!(printed.contains("label %Reset_CODE_808004"));
}

#[test]
fn test_indirect_jump_with_table() {
    let doc = document(
        &["Reset", "Nmi", "Irq"],
        offset_map(&[
            (0x9000, json!({"Reset": true})),
            (0x9100, json!({"Reset": false})),
            (0x9200, json!({"Reset": false})),
        ]),
        offset_map(&[]),
        offset_map(&[(
            0x9000,
            offset_map(&[(0x809100, json!("A")), (0x809200, json!("B"))]),
        )]),
        json!({}),
        vec![
            label("CODE_809000", 0x9000),
            instr_op(0x9000, 0x809000, 0x7c, 0x9100, 2, &["Reset"]),
            label("A", 0x9100),
            instr(0x9100, 0x809100, 0x60, &["Reset"]),
            label("B", 0x9200),
            instr(0x9200, 0x809200, 0x60, &["Reset"]),
        ],
    );
    let result = run(&doc);
    let module = &result.module;

    let reset = find_function(module, "Reset");
    let (cases, default) = reset
        .blocks
        .iter()
        .find_map(|b| match &b.term {
            Some(Terminator::Switch { cases, default, .. }) => Some((cases.clone(), *default)),
            _ => None,
        })
        .expect("indirect jump lowers to a switch");
    assert_eq!(cases.len(), 2);
    assert!(cases.iter().any(|(v, _)| *v == 0x809100));
    assert!(cases.iter().any(|(v, _)| *v == 0x809200));

    // The default arm panics.
    let panic = extern_id(module, "panic");
    let default_block = reset.block(default);
    assert!(default_block.insts.iter().any(
        |inst| matches!(inst, Inst::Call { callee: Callee::Extern(e), .. } if e.0 == panic)
    ));

    // Case targets are the labelled blocks.
    let printed = result.print();
    assert!(printed.contains("label %Reset_A"));
    assert!(printed.contains("label %Reset_B"));
}

#[test]
fn test_return_address_manipulation_rewrite() {
    let doc = document(
        &["Reset", "F", "Nmi", "Irq"],
        offset_map(&[
            (0x8100, json!({"Reset": true})),
            (0xC000, json!({"F": true})),
        ]),
        offset_map(&[(0x8100, json!("F"))]),
        offset_map(&[]),
        json!({"F": 0x80C000u32}),
        vec![
            label("CODE_808100", 0x8100),
            instr_op(0x8100, 0x808100, 0x22, 0x80C000, 3, &["Reset"]),
            instr(0x8104, 0x808104, 0x60, &["Reset"]),
            label("CODE_80C000", 0xC000),
            instr(0xC000, 0x80C000, 0x68, &["F"]),
            instr(0xC001, 0x80C001, 0x60, &["F"]),
        ],
    );
    let result = run(&doc);
    let module = &result.module;

    // F returns the unwind flag and owns a returnValue slot that starts
    // out true because the marked pc sits in its entry run.
    let f = find_function(module, "F");
    assert_eq!(f.ret, Type::I1);
    let entry = f.entry.expect("F has a body");
    assert!(matches!(
        f.block(entry).insts[0],
        Inst::Alloca { ty: Type::I1, .. }
    ));
    for block in &f.blocks {
        if let Some(term) = &block.term {
            assert!(
                !matches!(term, Terminator::RetVoid),
                "all returns in F must report the unwind flag"
            );
        }
    }

    // The caller tests the result immediately after the call and returns
    // void when an unwind is requested.
    let f_id = function_id(module, "F");
    let reset = find_function(module, "Reset");
    let (call_block, call_pos) = reset
        .blocks
        .iter()
        .enumerate()
        .find_map(|(i, b)| {
            b.insts
                .iter()
                .position(|inst| {
                    matches!(inst, Inst::Call { callee: Callee::Function(f), .. } if f.0 == f_id)
                })
                .map(|pos| (i, pos))
        })
        .expect("Reset calls F");
    let block = &reset.blocks[call_block];
    assert!(matches!(block.insts[call_pos + 1], Inst::ICmp { .. }));
    match &block.term {
        Some(Terminator::CondBr { then_block, .. }) => {
            assert_eq!(reset.block(*then_block).term, Some(Terminator::RetVoid));
        }
        other => panic!("expected an unwind check after the call, got {:?}", other),
    }
}

#[test]
fn test_nmi_wiring_at_wait_for_vblank() {
    let doc = document(
        &["Reset", "Nmi", "Irq"],
        offset_map(&[
            (0x805C, json!({"Reset": true})),
            (0xA000, json!({"Nmi": true})),
        ]),
        offset_map(&[]),
        offset_map(&[]),
        json!({}),
        vec![
            label("CODE_80805C", 0x805C),
            instr(0x805C, 0x80805C, 0x60, &["Reset"]),
            label("CODE_80A000", 0xA000),
            instr(0xA000, 0x80A000, 0x40, &["Nmi"]),
        ],
    );
    let result = run(&doc);
    let module = &result.module;

    // The spin-loop block starts with the PPU frame tick and the NMI call.
    let reset = find_function(module, "Reset");
    let vblank = reset
        .blocks
        .iter()
        .find(|b| b.name == "Reset_CODE_80805C")
        .expect("wait-for-vblank block exists");
    let do_ppu_frame = extern_id(module, "doPPUFrame");
    let nmi_id = function_id(module, "Nmi");
    assert!(matches!(
        vblank.insts[0],
        Inst::Call { callee: Callee::Extern(e), .. } if e.0 == do_ppu_frame
    ));
    assert!(matches!(
        vblank.insts[1],
        Inst::Call { callee: Callee::Function(f), .. } if f.0 == nmi_id
    ));

    // The NMI handler got its interrupt prologue as the new entry block.
    let nmi = find_function(module, "Nmi");
    let entry = nmi.entry.expect("Nmi has a body");
    assert_eq!(nmi.block(entry).name, "NMI_EntryPoint");
    assert_eq!(nmi.predecessor_count(entry), 0);
}

#[test]
fn test_shared_label_translates_once_per_function() {
    let doc = document(
        &["Reset", "Other", "Nmi", "Irq"],
        offset_map(&[
            (0x8000, json!({"Reset": true})),
            (0x8800, json!({"Reset": false, "Other": true})),
        ]),
        offset_map(&[]),
        offset_map(&[]),
        json!({}),
        vec![
            label("CODE_808000", 0x8000),
            instr(0x8000, 0x808000, 0x60, &["Reset"]),
            label("SHARED", 0x8800),
            instr(0x8800, 0x808800, 0x60, &["Reset", "Other"]),
        ],
    );
    let result = run(&doc);
    let module = &result.module;

    let reset = find_function(module, "Reset");
    let other = find_function(module, "Other");
    assert_eq!(
        reset
            .blocks
            .iter()
            .filter(|b| b.name == "Reset_SHARED")
            .count(),
        1
    );
    assert_eq!(
        other
            .blocks
            .iter()
            .filter(|b| b.name == "Other_SHARED")
            .count(),
        1
    );
}

#[test]
fn test_entry_invariant_for_looping_entry_label() {
    // The entry label is also a branch target, so a synthetic entry block
    // must be prepended.
    let doc = document(
        &["Reset", "Nmi", "Irq"],
        offset_map(&[(0x8000, json!({"Reset": true}))]),
        offset_map(&[]),
        offset_map(&[]),
        json!({}),
        vec![
            label("CODE_808000", 0x8000),
            instr_jump(0x8000, 0x808000, 0x80, 0x8000, "CODE_808000", &["Reset"]),
        ],
    );
    let result = run(&doc);
    let module = &result.module;

    let reset = find_function(module, "Reset");
    let entry = reset.entry.expect("Reset has a body");
    assert_eq!(reset.block(entry).name, "Reset_entryBlock");
    assert_eq!(reset.predecessor_count(entry), 0);
}

#[test]
fn test_block_layout_is_reproducible() {
    let doc = document(
        &["Reset", "Nmi", "Irq"],
        offset_map(&[
            (0x8000, json!({"Reset": true})),
            (0x8004, json!({"Reset": false})),
        ]),
        offset_map(&[]),
        offset_map(&[]),
        json!({}),
        vec![
            label("CODE_808000", 0x8000),
            instr_op(0x8000, 0x808000, 0xa9, 0x42, 1, &["Reset"]),
            instr_jump(0x8002, 0x808002, 0xd0, 0x8004, "CODE_808004", &["Reset"]),
            label("CODE_808004", 0x8004),
            instr(0x8004, 0x808004, 0x60, &["Reset"]),
        ],
    );
    let first = run(&doc).print();
    let second = run(&doc).print();
    assert_eq!(first, second);
}

#[test]
fn test_block_move_loops_until_counter_wraps() {
    let doc = document(
        &["Reset", "Nmi", "Irq"],
        offset_map(&[(0x8000, json!({"Reset": true}))]),
        offset_map(&[]),
        offset_map(&[]),
        json!({}),
        vec![
            label("CODE_808000", 0x8000),
            instr_op(0x8000, 0x808000, 0x54, 0x7F7E, 2, &["Reset"]),
            instr(0x8003, 0x808003, 0x60, &["Reset"]),
        ],
    );
    let result = run(&doc);

    // Both width arms loop on themselves while A has not passed zero.
    let reset = find_function(&result.module, "Reset");
    let self_loops = reset
        .blocks
        .iter()
        .enumerate()
        .filter(|(i, b)| {
            matches!(
                b.term,
                Some(Terminator::CondBr { then_block, .. }) if then_block.0 == *i
            )
        })
        .count();
    assert_eq!(self_loops, 2);
}

#[test]
fn test_direct_page_read_merges_wrap_paths() {
    let doc = document(
        &["Reset", "Nmi", "Irq"],
        offset_map(&[(0x8000, json!({"Reset": true}))]),
        offset_map(&[]),
        offset_map(&[]),
        json!({}),
        vec![
            label("CODE_808000", 0x8000),
            instr_op(0x8000, 0x808000, 0xa5, 0x10, 1, &["Reset"]),
            instr(0x8002, 0x808002, 0x60, &["Reset"]),
        ],
    );
    let result = run(&doc);
    let printed = result.print();

    // Emulation-mode page wrap and native linear addressing rejoin in a
    // phi; the selector tests EF and the low byte of DP.
    assert!(printed.contains("phi i8"));
    assert!(printed.contains("load i1, ptr @EF"));
    assert!(printed.contains("getelementptr i8, ptr @DP, i32 0"));
}

#[test]
fn test_rep_reestablishes_width_invariants() {
    let doc = document(
        &["Reset", "Nmi", "Irq"],
        offset_map(&[(0x8000, json!({"Reset": true}))]),
        offset_map(&[]),
        offset_map(&[]),
        json!({}),
        vec![
            label("CODE_808000", 0x8000),
            instr_op(0x8000, 0x808000, 0xc2, 0x30, 1, &["Reset"]),
            instr(0x8002, 0x808002, 0x60, &["Reset"]),
        ],
    );
    let result = run(&doc);
    let printed = result.print();

    // The unpacked status byte lands in the width flags, and the forced
    // configuration re-checks EF and clears the index high bytes.
    assert!(printed.contains("store i1 %v"));
    assert!(printed.contains("load i1, ptr @EF"));
    assert!(printed.contains("getelementptr i8, ptr @X, i32 1"));
    assert!(printed.contains("getelementptr i8, ptr @Y, i32 1"));
}

#[test]
fn test_missing_branch_target_panics_at_runtime() {
    let doc = document(
        &["Reset", "Nmi", "Irq"],
        offset_map(&[(0x8000, json!({"Reset": true}))]),
        offset_map(&[]),
        offset_map(&[]),
        json!({}),
        vec![
            label("CODE_808000", 0x8000),
            instr_jump(0x8000, 0x808000, 0x4c, 0x9999, "CODE_809999", &["Reset"]),
        ],
    );
    let result = run(&doc);
    let module = &result.module;

    let reset = find_function(module, "Reset");
    let panic = extern_id(module, "panic");
    assert!(reset.blocks.iter().any(|b| {
        b.insts.iter().any(
            |inst| matches!(inst, Inst::Call { callee: Callee::Extern(e), .. } if e.0 == panic),
        ) && b.term == Some(Terminator::RetVoid)
    }));
}

#[test]
fn test_wasm_target_sets_layout_and_triple() {
    let doc = document(
        &["Reset", "Nmi", "Irq"],
        offset_map(&[(0x8000, json!({"Reset": true}))]),
        offset_map(&[]),
        offset_map(&[]),
        json!({}),
        vec![label("Reset", 0x8000)],
    );
    let mut reader = MockFileReader::default();
    reader.add_file("test.json", &doc.to_string());
    let result = recompile(Path::new("test.json"), Target::Wasm, &reader).unwrap();
    assert!(result.is_verified());

    let printed = result.print();
    assert!(printed.contains("target datalayout = \"e-m:e-p:32:32-i64:64-n32:64-S128\""));
    assert!(printed.contains("target triple = \"wasm32\""));

    // The binary dump round-trips through the serializer.
    assert!(!result.to_bitcode().unwrap().is_empty());
}

#[test]
fn test_native_dump_round_trips_through_a_file() {
    let doc = document(
        &["Reset", "Nmi", "Irq"],
        offset_map(&[(0x8000, json!({"Reset": true}))]),
        offset_map(&[]),
        offset_map(&[]),
        json!({}),
        vec![label("Reset", 0x8000)],
    );
    let result = run(&doc);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(smkrc::NATIVE_OUTPUT_FILE);
    std::fs::write(&path, result.print()).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("; ModuleID = 'recompilation'"));
    assert!(text.contains("@A = external global i16"));
    assert!(text.contains("declare i8 @read8(i32)"));
}

#[test]
fn test_missing_ast_file_fails() {
    let reader = MockFileReader::default();
    assert!(recompile(Path::new("missing.json"), Target::Native, &reader).is_err());
}

#[test]
fn test_malformed_document_fails() {
    let mut reader = MockFileReader::default();
    reader.add_file("test.json", "{ not json");
    assert!(recompile(Path::new("test.json"), Target::Native, &reader).is_err());
}

#[test]
fn test_missing_interrupt_function_fails() {
    let mut doc = document(
        &["Reset", "Irq"],
        offset_map(&[(0x8000, json!({"Reset": true}))]),
        offset_map(&[]),
        offset_map(&[]),
        json!({}),
        vec![label("Reset", 0x8000)],
    );
    doc["rom_nmi_func_name"] = json!("MissingNmi");
    let mut reader = MockFileReader::default();
    reader.add_file("test.json", &doc.to_string());
    assert!(recompile(Path::new("test.json"), Target::Native, &reader).is_err());
}


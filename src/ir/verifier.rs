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
use std::collections::HashMap;

/// Structural checks over a finished module. Returns one message per
/// violation; an empty vector means the module is well formed.
pub fn verify_module(module: &Module) -> Vec<String> {
    let mut errors = Vec::new();

    for func in &module.functions {
        if func.is_declaration() {
            continue;
        }

        let entry = match func.entry {
            Some(entry) => entry,
            None => {
                errors.push(format!("function {}: body without an entry block", func.name));
                continue;
            }
        };

        if func.predecessor_count(entry) > 0 {
            errors.push(format!(
                "function {}: entry block {} has predecessors",
                func.name,
                func.block(entry).name
            ));
        }

        let mut preds: HashMap<BlockId, Vec<BlockId>> = HashMap::new();
        for (i, block) in func.blocks.iter().enumerate() {
            if let Some(term) = &block.term {
                for succ in term.successors() {
                    preds.entry(succ).or_default().push(BlockId(i));
                }
            }
        }

        for (i, block) in func.blocks.iter().enumerate() {
            let id = BlockId(i);
            match &block.term {
                None => errors.push(format!(
                    "function {}: block {} has no terminator",
                    func.name, block.name
                )),
                Some(Terminator::Ret(_)) if func.ret == Type::Void => errors.push(format!(
                    "function {}: block {} returns a value from a void function",
                    func.name, block.name
                )),
                Some(Terminator::RetVoid) if func.ret != Type::Void => errors.push(format!(
                    "function {}: block {} returns void from a {} function",
                    func.name, block.name, func.ret
                )),
                Some(term) => {
                    for succ in term.successors() {
                        if succ.0 >= func.blocks.len() {
                            errors.push(format!(
                                "function {}: block {} branches out of range",
                                func.name, block.name
                            ));
                        }
                    }
                }
            }

            for inst in &block.insts {
                if let Inst::Phi { incoming, .. } = inst {
                    let block_preds = preds.get(&id).cloned().unwrap_or_default();
                    for (_, pred) in incoming {
                        if !block_preds.contains(pred) {
                            errors.push(format!(
                                "function {}: phi in block {} names non-predecessor {}",
                                func.name,
                                block.name,
                                func.block(*pred).name
                            ));
                        }
                    }
                }
            }
        }
    }

    errors
}

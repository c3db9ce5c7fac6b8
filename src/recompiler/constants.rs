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

//! Fixed ROM facts and status-register bit assignments.

/// Offset of the wait-for-vblank spin loop label; the per-frame PPU tick
/// and the NMI call are injected at the head of this block.
pub const WAIT_FOR_VBLANK_LOOP_LABEL_OFFSET: u32 = 0x805C;
pub const WAIT_FOR_VBLANK_LABEL_NAME: &str = "CODE_80805C";

// Bit positions of the packed processor status byte.
pub const P_CARRY: u8 = 0x01;
pub const P_ZERO: u8 = 0x02;
pub const P_INTERRUPT: u8 = 0x04;
pub const P_DECIMAL: u8 = 0x08;
pub const P_INDEX: u8 = 0x10;
pub const P_ACCUMULATOR: u8 = 0x20;
pub const P_OVERFLOW: u8 = 0x40;
pub const P_NEGATIVE: u8 = 0x80;

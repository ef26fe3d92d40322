/*
Copyright 2020 Anish Jewalikar

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

//! A simple interpreter backend for the Chip-8 family of virtual
//! machines: the original Chip-8, Super Chip-8 (SCHIP) and XO-Chip.
//!
//! The crate is frontend-agnostic. [`Vm`] implements the instruction set
//! with the per-dialect quirks and renders into a bit-packed 128x64
//! framebuffer (low resolution programs are pixel-doubled); [`Engine`]
//! adds the threaded deployment: 60 Hz instruction bursts, timer ticks
//! and a small lock-free surface ([`HostIo`]) through which a presenter
//! feeds key state and takes finished frames.
//!
//! # Example
//!
//! ```rust
//! use ocho_core::{Fault, Mode, Vm};
//!
//! let mut vm = Vm::new(Mode::Schip);
//! vm.load_rom(&[0x00, 0xE0, 0x00, 0xFD]).unwrap();
//!
//! loop {
//!     match vm.step(0) {
//!         Ok(()) => {}
//!         Err(Fault::GuestExit) => break,
//!         Err(fault) => panic!("{}", fault),
//!     }
//! }
//! ```

mod engine;
mod error;
mod font;
mod vm;

pub use engine::{Config, Engine, HostIo, Status, TICKRATE_CHIP8, TICKRATE_SCHIP};
pub use error::{ConfigError, Fault, RomError};
pub use vm::{
    FrameBuffer, Mode, Vm, GFX_HEIGHT, GFX_PITCH, GFX_WIDTH, KEY_LAYOUT, MEM_SIZE, ROM_CAPACITY,
};

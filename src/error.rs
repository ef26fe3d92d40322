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

//! Error types surfaced by the interpreter, the ROM manager and the
//! engine configuration.

use std::error::Error;
use std::fmt;

/// A fatal interpreter fault.
///
/// Returned by `Vm::step` in place of Continue; every variant stops the
/// current run. Variants carry the offending address or opcode so that a
/// frontend can surface a useful diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// A fetch would read outside the executable range `[0x200, 0x1000)`.
    PcOutOfRange(u16),

    /// Decode reached no defined case for the opcode.
    InvalidOpcode { opcode: u16, addr: u16 },

    /// `CALL` with all sixteen stack slots in use.
    StackOverflow,

    /// `RET` with an empty stack.
    StackUnderflow,

    /// A memory-touching instruction would access past the end of the
    /// address space.
    IndexOutOfRange(u16),

    /// The guest executed `00FD` (EXIT) or the bare `0000` halt.
    GuestExit,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::PcOutOfRange(pc) => {
                write!(f, "PC memory access out of bound: {:#06X}", pc)
            }
            Fault::InvalidOpcode { opcode, addr } => {
                write!(f, "invalid instruction {:04X} at {:#06X}", opcode, addr)
            }
            Fault::StackOverflow => write!(f, "stack overflow"),
            Fault::StackUnderflow => write!(f, "return from empty stack"),
            Fault::IndexOutOfRange(i) => {
                write!(f, "I memory access out of bound: {:#06X}", i)
            }
            Fault::GuestExit => write!(f, "guest exited"),
        }
    }
}

impl Error for Fault {}

/// ROM lifecycle violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RomError {
    /// A ROM must hold at least one instruction.
    TooShort(usize),

    /// The buffer does not fit in the 3584 bytes above 0x200.
    TooLarge(usize),

    /// At most one ROM may be associated with a VM; clear it first.
    AlreadyLoaded,
}

impl fmt::Display for RomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RomError::TooShort(len) => {
                write!(f, "ROM of {} bytes is shorter than one instruction", len)
            }
            RomError::TooLarge(len) => write!(
                f,
                "ROM of {} bytes is larger than the permitted 3584 bytes",
                len
            ),
            RomError::AlreadyLoaded => write!(f, "a ROM is already loaded"),
        }
    }
}

impl Error for RomError {}

/// Engine configuration violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The tickrate must lie in `[1, 1000]` instructions per frame.
    TickrateOutOfRange(u16),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::TickrateOutOfRange(rate) => {
                write!(f, "invalid tickrate {} (expected 1 to 1000)", rate)
            }
        }
    }
}

impl Error for ConfigError {}

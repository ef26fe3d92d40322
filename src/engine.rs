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

//! The engine loop and the synchronization surface it shares with a
//! presenter thread.
//!
//! The engine executes a burst of instructions per 60 Hz frame, then
//! publishes the framebuffer (when it changed), the sound gate and one
//! timer tick. The presenter owns the other side: it feeds key state into
//! the shared bitmask, drives the run state and copies published frames
//! out on its own schedule. Nothing in here blocks for longer than one
//! frame except the idle poll while paused or halted.

use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::ConfigError;
use crate::vm::{FrameBuffer, Mode, Vm, GFX_HEIGHT, GFX_PITCH};

/// Nominal instructions per frame for Chip-8 programs.
pub const TICKRATE_CHIP8: u16 = 15;

/// Nominal instructions per frame for SCHIP and XO-Chip programs.
pub const TICKRATE_SCHIP: u16 = 200;

/// Upper bound on the configurable tickrate.
const TICKRATE_MAX: u16 = 1000;

/// One 60 Hz frame.
const FRAME_PERIOD: Duration = Duration::from_micros(16_666);

/// Re-poll interval while paused or halted; bounds cancellation latency.
const IDLE_POLL: Duration = Duration::from_millis(200);

/// Run state shared between the engine and the presenter.
///
/// The presenter is the only writer, except that the engine stores
/// `Halted` when a step faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    /// The engine loop should return at the next poll.
    Exiting = 0,
    /// Executing bursts.
    Running = 1,
    /// Idle until resumed.
    Paused = 2,
    /// A fault stopped the run; reset to rearm.
    Halted = 3,
    /// The engine should reset the VM and resume running.
    Resetting = 4,
}

impl Status {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Status::Exiting,
            1 => Status::Running,
            2 => Status::Paused,
            3 => Status::Halted,
            _ => Status::Resetting,
        }
    }
}

/// The synchronization surface between the engine thread and a presenter.
///
/// Key state and the run status are lock-free atomics; the published
/// framebuffer sits behind a mutex together with a "frame ready" flag so
/// that the presenter only ever copies a complete frame.
pub struct HostIo {
    status: AtomicU8,
    keys: AtomicU16,
    sound: AtomicBool,
    frame_ready: AtomicBool,
    frame: Mutex<FrameBuffer>,
}

impl HostIo {
    fn new() -> Self {
        Self {
            status: AtomicU8::new(Status::Running as u8),
            keys: AtomicU16::new(0),
            sound: AtomicBool::new(false),
            frame_ready: AtomicBool::new(false),
            frame: Mutex::new([[0; GFX_PITCH]; GFX_HEIGHT]),
        }
    }

    /// Current run state.
    pub fn status(&self) -> Status {
        Status::from_u8(self.status.load(Ordering::Acquire))
    }

    /// Store a new run state.
    pub fn set_status(&self, status: Status) {
        self.status.store(status as u8, Ordering::Release);
    }

    /// The current key bitmask.
    pub fn keys(&self) -> u16 {
        self.keys.load(Ordering::Acquire)
    }

    /// Mark the key `0x0..=0xF` as pressed.
    pub fn press(&self, key: u8) {
        self.keys.fetch_or(1 << (key & 0xF), Ordering::AcqRel);
    }

    /// Mark the key `0x0..=0xF` as released.
    pub fn release(&self, key: u8) {
        self.keys.fetch_and(!(1 << (key & 0xF)), Ordering::AcqRel);
    }

    /// Whether the beep should currently be audible.
    pub fn sound_active(&self) -> bool {
        self.sound.load(Ordering::Acquire)
    }

    fn set_sound(&self, on: bool) {
        self.sound.store(on, Ordering::Release);
    }

    /// Copy the latest published frame into `out`. Returns false, leaving
    /// `out` untouched, when no new frame was published since the last
    /// take.
    pub fn take_frame(&self, out: &mut FrameBuffer) -> bool {
        if !self.frame_ready.load(Ordering::Acquire) {
            return false;
        }

        let frame = self.frame.lock().unwrap();
        *out = *frame;
        self.frame_ready.store(false, Ordering::Release);

        true
    }

    fn publish_frame(&self, gfx: &FrameBuffer) {
        let mut frame = self.frame.lock().unwrap();
        *frame = *gfx;
        self.frame_ready.store(true, Ordering::Release);
    }

    fn clear_frame(&self) {
        let mut frame = self.frame.lock().unwrap();
        *frame = [[0; GFX_PITCH]; GFX_HEIGHT];
        self.frame_ready.store(true, Ordering::Release);
    }
}

/// Engine configuration: the dialect and the burst size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,
    pub tickrate: u16,
}

impl Config {
    /// A configuration with the nominal tickrate for `mode`.
    pub fn new(mode: Mode) -> Self {
        let tickrate = match mode {
            Mode::Chip8 => TICKRATE_CHIP8,
            _ => TICKRATE_SCHIP,
        };

        Self { mode, tickrate }
    }

    /// Override the tickrate; 1 to 1000 instructions per frame.
    pub fn with_tickrate(mut self, tickrate: u16) -> Result<Self, ConfigError> {
        if tickrate < 1 || tickrate > TICKRATE_MAX {
            return Err(ConfigError::TickrateOutOfRange(tickrate));
        }

        self.tickrate = tickrate;
        Ok(self)
    }
}

/// Owns a [`Vm`] and drives it in 60 Hz bursts on the calling thread.
///
/// # Example
///
/// ```rust
/// use std::thread;
///
/// use ocho_core::{Config, Engine, Mode, Status};
///
/// let mut engine = Engine::new(Config::new(Mode::Chip8));
/// engine.vm_mut().load_rom(&[0x12, 0x00]).unwrap();
///
/// let io = engine.io();
/// let worker = thread::spawn(move || engine.run());
///
/// // ... presenter loop: io.press / io.take_frame / io.sound_active ...
///
/// io.set_status(Status::Exiting);
/// worker.join().unwrap();
/// ```
pub struct Engine {
    vm: Vm,
    io: Arc<HostIo>,
    tickrate: u16,
}

impl Engine {
    /// Create an engine and its VM from a configuration.
    pub fn new(config: Config) -> Self {
        Self {
            vm: Vm::new(config.mode),
            io: Arc::new(HostIo::new()),
            tickrate: config.tickrate,
        }
    }

    /// The shared handle for the presenter side.
    pub fn io(&self) -> Arc<HostIo> {
        Arc::clone(&self.io)
    }

    pub fn vm(&self) -> &Vm {
        &self.vm
    }

    pub fn vm_mut(&mut self) -> &mut Vm {
        &mut self.vm
    }

    /// Run bursts until the status becomes `Exiting`.
    ///
    /// Each running iteration samples the key bitmask once, executes up to
    /// `tickrate` instructions, publishes the framebuffer when it changed
    /// and the sound gate always, sleeps out the remainder of the frame
    /// and ticks the timers. A fault stores `Halted` and idles; `Resetting`
    /// resets the VM, publishes a blank frame and resumes.
    pub fn run(&mut self) {
        loop {
            match self.io.status() {
                Status::Exiting => return,
                Status::Paused | Status::Halted => {
                    thread::sleep(IDLE_POLL);
                    continue;
                }
                Status::Resetting => {
                    self.vm.reset();
                    self.io.clear_frame();
                    self.io.set_status(Status::Running);
                    continue;
                }
                Status::Running => {}
            }

            let burst_start = Instant::now();
            let keys = self.io.keys();

            let mut fault = None;
            for _ in 0..self.tickrate {
                if let Err(f) = self.vm.step(keys) {
                    fault = Some(f);
                    break;
                }
            }

            if let Some(fault) = fault {
                self.io.set_sound(false);
                log::error!("engine halted: {}", fault);
                self.vm.dump_state();
                self.io.set_status(Status::Halted);
                continue;
            }

            if self.vm.consume_dirty() {
                self.io.publish_frame(self.vm.framebuffer());
            }
            self.io.set_sound(self.vm.sound_active());

            if let Some(rest) = FRAME_PERIOD.checked_sub(burst_start.elapsed()) {
                thread::sleep(rest);
            }
            self.vm.tick_timers();
        }
    }
}

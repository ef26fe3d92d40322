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

//! End-to-end programs run against the public API, one small hex ROM per
//! scenario.

use ocho_core::{Fault, Mode, Vm, MEM_SIZE};

/// Instruction budget for every scenario.
const BUDGET: usize = 200;

/// Run `program` on a fresh VM until it halts, asserting the program
/// counter invariants on the way. Panics when the budget elapses first.
fn run(mode: Mode, program: &[u8]) -> (Vm, Fault) {
    let mut vm = Vm::new(mode);
    vm.load_rom(program).unwrap();

    for _ in 0..BUDGET {
        match vm.step(0) {
            Ok(()) => {
                let pc = vm.pc() as usize;
                assert!(pc >= 0x200 && pc < MEM_SIZE, "pc {:#06X} out of range", pc);
                assert_eq!(pc % 2, 0, "pc {:#06X} is odd", pc);
            }
            Err(fault) => return (vm, fault),
        }
    }

    panic!("program did not halt within {} instructions", BUDGET);
}

/// Whether the guest-resolution pixel at (x, y) is lit, reading the
/// upper-left physical bit of the doubled 2x2 block.
fn guest_pixel(vm: &Vm, x: usize, y: usize) -> bool {
    vm.pixel(2 * x, 2 * y)
}

#[test]
fn clear_and_exit() {
    let (mut vm, fault) = run(Mode::Chip8, &[0x00, 0xE0, 0x00, 0xFD]);

    assert_eq!(fault, Fault::GuestExit);
    assert!(vm.framebuffer().iter().flatten().all(|&b| b == 0));
    assert!(vm.consume_dirty());
}

#[test]
fn counted_loop() {
    let program = [0x60, 0x0A, 0x70, 0xFF, 0x30, 0x00, 0x12, 0x02, 0x00, 0xFD];

    for mode in [Mode::Chip8, Mode::Schip, Mode::Octo] {
        let (vm, fault) = run(mode, &program);

        assert_eq!(fault, Fault::GuestExit);
        assert_eq!(vm.v(0), 0);
        assert_eq!(vm.pc(), 0x20A);
    }
}

#[test]
fn bcd_store_and_reload() {
    // v10 = 156; i = 0x208; FX33; F265 reads the digits back into v0..=v2.
    // The BCD store overwrites the trailing exit, so the run ends on the
    // clobbered word; the registers and I tell the story regardless.
    let program = [0x6A, 0x9C, 0xA2, 0x08, 0xFA, 0x33, 0xF2, 0x65, 0x00, 0xFD];

    for (mode, expected_i) in [
        (Mode::Chip8, 0x20B),
        (Mode::Octo, 0x20B),
        (Mode::Schip, 0x208),
    ] {
        let (vm, _fault) = run(mode, &program);

        assert_eq!((vm.v(0), vm.v(1), vm.v(2)), (1, 5, 6), "mode {:?}", mode);
        assert_eq!(vm.i(), expected_i, "mode {:?}", mode);
    }
}

#[test]
fn draw_small_font_zero() {
    let program = [
        0x60, 0x03, // v0 = 3
        0x61, 0x05, // v1 = 5
        0x62, 0x00, // v2 = 0
        0xF2, 0x29, // i = small font "0"
        0xD0, 0x15, // draw 5 rows at (v0, v1)
        0x00, 0xFD,
    ];

    let (vm, fault) = run(Mode::Chip8, &program);
    assert_eq!(fault, Fault::GuestExit);
    assert_eq!(vm.v(0xF), 0);

    // The 4x5 glyph "0" from the built-in font.
    let glyph: [u8; 5] = [0xF0, 0x90, 0x90, 0x90, 0xF0];

    for (row, &bits) in glyph.iter().enumerate() {
        for col in 0..8 {
            let expected = bits & (0x80 >> col) != 0;
            assert_eq!(
                guest_pixel(&vm, 3 + col, 5 + row),
                expected,
                "glyph mismatch at ({}, {})",
                col,
                row
            );
        }
    }

    // Doubling: the other three physical bits of a lit guest pixel match.
    assert!(vm.pixel(6, 10) && vm.pixel(7, 10) && vm.pixel(6, 11) && vm.pixel(7, 11));
}

#[test]
fn redraw_collides_and_erases() {
    let program = [
        0x60, 0x03, 0x61, 0x05, 0x62, 0x00, 0xF2, 0x29, //
        0xD0, 0x15, 0xD0, 0x15, 0x00, 0xFD,
    ];

    let (vm, fault) = run(Mode::Chip8, &program);
    assert_eq!(fault, Fault::GuestExit);
    assert_eq!(vm.v(0xF), 1);
    assert!(vm.framebuffer().iter().flatten().all(|&b| b == 0));
}

#[test]
fn runaway_calls_overflow_the_stack() {
    let (_, fault) = run(Mode::Chip8, &[0x22, 0x00]);
    assert_eq!(fault, Fault::StackOverflow);
}

#[test]
fn hires_program_draws_one_to_one() {
    let program = [
        0x00, 0xFF, // hires on, clear
        0x62, 0x07, // v2 = 7
        0xF2, 0x29, // i = small font "7"
        0x60, 0x09, // v0 = 9
        0x61, 0x02, // v1 = 2
        0xD0, 0x15, // draw
        0x00, 0xFD,
    ];

    let (vm, fault) = run(Mode::Schip, &program);
    assert_eq!(fault, Fault::GuestExit);
    assert!(vm.hires());

    // Glyph "7" = F0 10 20 40 40, mapped 1:1 at physical (9, 2).
    let glyph: [u8; 5] = [0xF0, 0x10, 0x20, 0x40, 0x40];
    for (row, &bits) in glyph.iter().enumerate() {
        for col in 0..8 {
            let expected = bits & (0x80 >> col) != 0;
            assert_eq!(vm.pixel(9 + col, 2 + row), expected);
        }
    }
}

#[test]
fn large_font_glyph_spans_ten_rows() {
    let program = [
        0x00, 0xFF, // hires on
        0x60, 0x01, // v0 = 1
        0xF0, 0x30, // i = large font "1"
        0x61, 0x00, // v1 = 0
        0xD1, 0x1A, // draw 10 rows at (0, 0)
        0x00, 0xFD,
    ];

    let (vm, fault) = run(Mode::Schip, &program);
    assert_eq!(fault, Fault::GuestExit);

    // Bottom rows of the large "1" are solid 0xFF.
    for x in 0..8 {
        assert!(vm.pixel(x, 8));
        assert!(vm.pixel(x, 9));
    }
    assert!(!vm.pixel(0, 10));
}

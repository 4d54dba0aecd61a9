use std::time::Instant;

use rand::rngs::mock::StepRng;

use super::ChipSet;
use crate::{
    definitions::{cpu, display, memory, timer},
    opcode::{Instruction, Opcode, Operation},
    quirks::Quirks,
    resources::{Rom, SPLASH_IDLE},
    LoadError, OpcodeError, ProcessError, StackError,
};

const SEED: u64 = 0x5EED;

/// will setup the default configured chip with the splash rom loaded
pub(super) fn get_default_chip() -> ChipSet {
    let mut chip = ChipSet::new().with_seed(SEED);
    chip.load_rom(Rom::splash()).expect("the splash rom fits");
    chip
}

/// will setup an empty chip with the given quirks
pub(super) fn setup_chip(quirks: Quirks) -> ChipSet {
    ChipSet::with_quirks(quirks).with_seed(SEED)
}

#[inline]
/// Will write the opcode to the memory location specified
pub(super) fn write_opcode_to_memory(memory: &mut [u8], from: usize, opcode: Opcode) {
    write_slice_to_memory(memory, from, &opcode.to_be_bytes());
}

#[inline]
/// Will write the slice to the memory location specified
pub(super) fn write_slice_to_memory(memory: &mut [u8], from: usize, data: &[u8]) {
    memory[from..(from + data.len())].copy_from_slice(data);
}

/// Writes the opcode at the program counter and runs it.
fn exec(chip: &mut ChipSet, opcode: Opcode) -> Result<Operation, ProcessError> {
    write_opcode_to_memory(&mut chip.memory, chip.program_counter, opcode);
    chip.step()
}

/// The amount of set pixels.
fn lit(chip: &ChipSet) -> usize {
    chip.framebuffer().pixels().iter().filter(|&&p| p).count()
}

#[test]
fn test_initial_state() {
    let chip = ChipSet::new();
    assert_eq!(chip.program_counter, cpu::PROGRAM_COUNTER);
    assert_eq!(chip.stack_pointer, 0);
    assert_eq!(chip.index_register, 0);
    assert_eq!(chip.registers, [0; cpu::register::SIZE]);
    assert_eq!(chip.get_delay_timer(), 0);
    assert_eq!(chip.get_sound_timer(), 0);
    assert_eq!(chip.rom_name(), None);
    assert!(!chip.framebuffer().is_extended());
    assert!(!chip.needs_redraw());

    let small = display::fontset::LOCATION;
    assert_eq!(
        &chip.get_memory()[small..small + display::fontset::FONTSET.len()],
        &display::fontset::FONTSET[..]
    );
    let big = display::big_fontset::LOCATION;
    assert_eq!(
        &chip.get_memory()[big..big + display::big_fontset::FONTSET.len()],
        &display::big_fontset::FONTSET[..]
    );
}

#[test]
/// test reading of the first opcode
fn test_fetch() {
    let mut chip = get_default_chip();
    let opcode = 0xA00A;
    write_opcode_to_memory(&mut chip.memory, chip.program_counter, opcode);

    assert_eq!(chip.fetch(), Ok(Instruction::LoadIndex { nnn: 0x00A }));
    assert_eq!(chip.opcode, opcode);
    assert_eq!(chip.snapshot().mnemonic(), "LD I, 0x00A");
}

#[test]
/// testing internal functionality of popping and pushing into the stack
fn test_push_pop_stack() {
    let mut chip = get_default_chip();
    assert_eq!(chip.stack_pointer, 0);

    let next_counter = 0x0133 + cpu::PROGRAM_COUNTER;

    for i in 0..cpu::stack::SIZE {
        assert_eq!(Ok(()), chip.push_stack(next_counter + i * 8));
    }
    assert_eq!(Err(StackError::Overflow), chip.push_stack(next_counter));
    assert_eq!(cpu::stack::SIZE, chip.stack_pointer);

    for i in (0..cpu::stack::SIZE).rev() {
        assert_eq!(Ok(next_counter + i * 8), chip.pop_stack());
    }
    assert_eq!(Err(StackError::Underflow), chip.pop_stack());
}

#[test]
fn test_load_errors_keep_state() {
    let mut chip = get_default_chip();

    assert_eq!(
        chip.load(&[0x12, 0x00], memory::SIZE),
        Err(LoadError::AddressOutOfRange(memory::SIZE))
    );

    let available = memory::SIZE - cpu::PROGRAM_COUNTER;
    let big = Rom::new("BIG", vec![0xAA; available + 1]);
    assert_eq!(
        chip.load_rom(big),
        Err(LoadError::TooLarge {
            address: cpu::PROGRAM_COUNTER,
            len: available + 1,
            available,
        })
    );
    assert_eq!(chip.rom_name(), Some("SPLASH"));
    assert_eq!(
        &chip.get_memory()[cpu::PROGRAM_COUNTER..cpu::PROGRAM_COUNTER + 2],
        &[0x00, 0xE0]
    );

    // exactly filling the memory works
    let fits = Rom::new("FITS", vec![0xAA; available]);
    assert_eq!(chip.load_rom(fits), Ok(()));
    assert_eq!(chip.get_memory()[memory::SIZE - 1], 0xAA);
}

#[test]
fn test_load_raw_bytes() {
    let mut chip = setup_chip(Quirks::default());
    assert_eq!(chip.load(&[1, 2, 3], 0x300), Ok(()));
    assert_eq!(&chip.get_memory()[0x300..0x303], &[1, 2, 3]);
    assert_eq!(chip.program_counter, cpu::PROGRAM_COUNTER);
}

#[test]
fn test_reset_reloads_rom() {
    let mut chip = get_default_chip();
    write_opcode_to_memory(&mut chip.memory, 0x200, 0xFFFF);
    chip.registers[3] = 9;
    chip.index_register = 0x123;
    chip.program_counter = 0x400;
    chip.push_stack(0x300).expect("room on the stack");
    chip.delay_timer.set_value(7);
    chip.set_key(4, true);
    chip.display.set_extended(true);

    chip.reset();

    let splash = Rom::splash();
    let data = splash.get_data();
    assert_eq!(
        &chip.get_memory()[cpu::PROGRAM_COUNTER..cpu::PROGRAM_COUNTER + data.len()],
        data
    );
    assert_eq!(chip.registers, [0; cpu::register::SIZE]);
    assert_eq!(chip.index_register, 0);
    assert_eq!(chip.program_counter, cpu::PROGRAM_COUNTER);
    assert_eq!(chip.stack_pointer, 0);
    assert_eq!(chip.get_delay_timer(), 0);
    assert!(!chip.is_pressed(4));
    assert!(!chip.framebuffer().is_extended());
}

#[test]
fn test_small_program() {
    let mut chip = setup_chip(Quirks::default());
    chip.load_rom(Rom::new(
        "ADD",
        vec![0x60, 0x05, 0x61, 0x0A, 0x80, 0x14, 0x00, 0x00],
    ))
    .expect("fits");

    for _ in 0..3 {
        assert_eq!(chip.step(), Ok(Operation::None));
    }
    assert_eq!(chip.registers[0], 15);
    assert_eq!(chip.registers[1], 10);
    assert_eq!(chip.registers[cpu::register::LAST], 0);
    assert_eq!(chip.program_counter, 0x206);

    // the trailing zero word is no instruction, it is skipped
    assert_eq!(
        chip.step(),
        Err(ProcessError::Opcode(OpcodeError::Unknown(0x0000)))
    );
    assert_eq!(chip.program_counter, 0x208);
}

#[test]
fn test_loaded_program_survives_reset() {
    let mut chip = setup_chip(Quirks::default());
    chip.load(&[0x60, 0x05, 0x61, 0x0A, 0x80, 0x14, 0x00, 0x00], 0x200)
        .expect("fits");
    chip.load(&[0xAB, 0xCD], 0x300).expect("fits");
    chip.registers[2] = 3;
    chip.reset();

    assert_eq!(chip.registers[2], 0);
    assert_eq!(&chip.get_memory()[0x300..0x302], &[0xAB, 0xCD]);
    for _ in 0..3 {
        assert_eq!(chip.step(), Ok(Operation::None));
    }
    assert_eq!(chip.registers[0], 15);
    assert_eq!(chip.registers[1], 10);
    assert_eq!(chip.program_counter, 0x206);

    // a second reset replays the same bytes again
    chip.reset();
    assert_eq!(chip.step(), Ok(Operation::None));
    assert_eq!(chip.registers[0], 5);

    // a new rom replaces everything loaded before
    chip.load_rom(Rom::new("JUMP", vec![0x12, 0x00])).expect("fits");
    assert_eq!(&chip.get_memory()[0x300..0x302], &[0x00, 0x00]);
}

#[test]
fn test_splash_runs_to_idle() {
    let mut chip = get_default_chip();
    let mut steps = 0;
    while chip.program_counter != SPLASH_IDLE {
        assert!(chip.step().is_ok());
        steps += 1;
        assert!(steps < 1000, "splash never reached its idle loop");
    }
    assert!(chip.needs_redraw());
    assert!(lit(&chip) > 0);

    // the idle loop stays in place
    assert_eq!(chip.step(), Ok(Operation::None));
    assert_eq!(chip.program_counter, SPLASH_IDLE);

    chip.clear_redraw();
    assert!(!chip.needs_redraw());
}

#[test]
fn test_program_counter_wraps() {
    let mut chip = get_default_chip();
    chip.program_counter = memory::SIZE - memory::opcodes::SIZE;
    assert_eq!(exec(&mut chip, 0x6001), Ok(Operation::None));
    assert_eq!(chip.program_counter, 0x000);

    // an opcode can not be read from the last byte
    chip.program_counter = memory::SIZE - 1;
    assert_eq!(
        chip.step(),
        Err(ProcessError::Opcode(OpcodeError::MemoryInvalid {
            pointer: memory::SIZE - 1,
            len: memory::SIZE,
        }))
    );
    assert_eq!(chip.program_counter, 0x001);
}

#[test]
fn test_tick_timers() {
    let mut chip = get_default_chip();
    chip.registers[0] = 3;
    assert_eq!(exec(&mut chip, 0xF015), Ok(Operation::None));
    assert_eq!(exec(&mut chip, 0xF018), Ok(Operation::None));
    assert!(chip.is_sound_active());

    let start = Instant::now();
    chip.tick_timers(start);
    assert_eq!(chip.get_delay_timer(), 3);
    chip.tick_timers(start + timer::INTERVAL);
    assert_eq!(chip.get_delay_timer(), 2);
    assert_eq!(chip.get_sound_timer(), 2);
    // no instruction count has any effect on the timers
    for _ in 0..50 {
        let _ = exec(&mut chip, 0x6000);
    }
    assert_eq!(chip.get_delay_timer(), 2);
}

#[test]
fn test_snapshot() {
    let mut chip = get_default_chip();
    assert_eq!(exec(&mut chip, 0x6005), Ok(Operation::None));

    let snapshot = chip.snapshot();
    assert_eq!(snapshot.program_counter, 0x202);
    assert_eq!(snapshot.registers[0], 5);
    assert_eq!(snapshot.opcode, 0x6005);
    assert_eq!(snapshot.mnemonic(), "LD V0, 0x05");
    assert!(!snapshot.extended);
    assert!(!snapshot.halted);

    let _ = exec(&mut chip, 0x0123);
    assert_eq!(chip.snapshot().mnemonic(), "??? 0x0123");
}

mod zero {
    use super::*;

    #[test]
    /// `0x00E0`
    fn test_clear_display_opcode() {
        let mut chip = get_default_chip();
        chip.display.draw_sprite(0, 0, &[0xFF], 1);
        chip.clear_redraw();

        assert_eq!(exec(&mut chip, 0x00E0), Ok(Operation::Draw));
        assert_eq!(lit(&chip), 0);
        assert!(chip.needs_redraw());
        assert_eq!(chip.program_counter, 0x202);
    }

    #[test]
    /// `0x2NNN` followed by `0x00EE`
    fn test_call_and_return() {
        let mut chip = get_default_chip();
        write_opcode_to_memory(&mut chip.memory, 0x234, 0x00EE);

        assert_eq!(exec(&mut chip, 0x2234), Ok(Operation::None));
        assert_eq!(chip.program_counter, 0x234);
        assert_eq!(chip.stack_pointer, 1);
        assert_eq!(chip.stack[0], 0x200);

        assert_eq!(chip.step(), Ok(Operation::None));
        assert_eq!(chip.program_counter, 0x202);
        assert_eq!(chip.stack_pointer, 0);
    }

    #[test]
    fn test_return_on_empty_stack() {
        let mut chip = get_default_chip();
        assert_eq!(
            exec(&mut chip, 0x00EE),
            Err(ProcessError::Stack(StackError::Underflow))
        );
        assert_eq!(chip.program_counter, 0x202);
        assert_eq!(chip.stack_pointer, 0);
    }

    #[test]
    fn test_illegal_zero_opcode() {
        let mut chip = get_default_chip();
        let before = chip.registers;
        assert_eq!(
            exec(&mut chip, 0x00EA),
            Err(ProcessError::Opcode(OpcodeError::Unknown(0x00EA)))
        );
        assert_eq!(chip.program_counter, 0x202);
        assert_eq!(chip.registers, before);
    }

    #[test]
    fn test_resolution_switch() {
        let mut chip = get_default_chip();
        chip.display.draw_sprite(0, 0, &[0xFF], 1);

        assert_eq!(exec(&mut chip, 0x00FF), Ok(Operation::Draw));
        assert!(chip.framebuffer().is_extended());
        assert_eq!(chip.framebuffer().width(), display::EXTENDED_WIDTH);
        assert_eq!(chip.framebuffer().height(), display::EXTENDED_HEIGHT);
        assert_eq!(lit(&chip), 0);

        assert_eq!(exec(&mut chip, 0x00FE), Ok(Operation::Draw));
        assert!(!chip.framebuffer().is_extended());
        assert_eq!(chip.framebuffer().width(), display::WIDTH);
    }

    #[test]
    fn test_extended_instructions_need_support() {
        let mut chip = setup_chip(Quirks::cosmac());
        for opcode in [0x00FFu16, 0x00C2, 0x00FB, 0x00FC, 0x00FD] {
            let pc = chip.program_counter;
            assert_eq!(
                exec(&mut chip, opcode),
                Err(ProcessError::Opcode(OpcodeError::Unknown(opcode)))
            );
            assert_eq!(chip.program_counter, pc + 2);
        }
        assert!(!chip.framebuffer().is_extended());
        assert!(!chip.is_halted());
    }

    #[test]
    fn test_scrolls() {
        let mut chip = get_default_chip();
        chip.display.draw_sprite(0, 0, &[0x80], 1);

        assert_eq!(exec(&mut chip, 0x00C2), Ok(Operation::Draw));
        assert!(chip.framebuffer().get(0, 2));
        assert!(!chip.framebuffer().get(0, 0));

        assert_eq!(exec(&mut chip, 0x00FB), Ok(Operation::Draw));
        assert!(chip.framebuffer().get(4, 2));

        assert_eq!(exec(&mut chip, 0x00FC), Ok(Operation::Draw));
        assert!(chip.framebuffer().get(0, 2));
        assert_eq!(lit(&chip), 1);
    }

    #[test]
    fn test_scrolls_extended() {
        let mut chip = get_default_chip();
        assert_eq!(exec(&mut chip, 0x00FF), Ok(Operation::Draw));
        let (width, height) = (display::EXTENDED_WIDTH, display::EXTENDED_HEIGHT);
        chip.display.draw_sprite(0, height - 1, &[0x80], 1);
        chip.display.draw_sprite(width - 8, 0, &[0x01], 1);
        assert_eq!(lit(&chip), 2);

        // the bottom row falls off
        assert_eq!(exec(&mut chip, 0x00C1), Ok(Operation::Draw));
        assert!(chip.framebuffer().get(width - 1, 1));
        assert_eq!(lit(&chip), 1);

        // the right edge falls off
        chip.display.draw_sprite(0, 20, &[0x10], 1);
        assert_eq!(exec(&mut chip, 0x00FB), Ok(Operation::Draw));
        assert!(chip.framebuffer().get(7, 20));
        assert_eq!(lit(&chip), 1);

        // the left edge falls off
        chip.display.draw_sprite(0, 30, &[0x40], 1);
        assert_eq!(exec(&mut chip, 0x00FC), Ok(Operation::Draw));
        assert!(chip.framebuffer().get(3, 20));
        assert_eq!(lit(&chip), 1);
        assert_eq!(chip.framebuffer().width(), width);
    }

    #[test]
    fn test_exit_halts_until_reset() {
        let mut chip = get_default_chip();
        assert_eq!(exec(&mut chip, 0x00FD), Ok(Operation::Exit));
        assert!(chip.is_halted());
        let pc = chip.program_counter;

        assert_eq!(chip.step(), Ok(Operation::Exit));
        assert_eq!(chip.program_counter, pc);

        chip.reset();
        assert!(!chip.is_halted());
        assert_eq!(chip.step(), Ok(Operation::Draw));
    }
}

mod one {
    use super::*;

    #[test]
    /// `1NNN`
    fn test_jump_address() {
        let mut chip = get_default_chip();
        assert_eq!(exec(&mut chip, 0x1234), Ok(Operation::None));
        assert_eq!(chip.program_counter, 0x234);
    }
}

mod two {
    use super::*;

    #[test]
    /// a seventeenth nested call is refused
    fn test_call_overflow() {
        let mut chip = get_default_chip();
        // calls itself over and over again
        write_opcode_to_memory(&mut chip.memory, 0x200, 0x2200);

        for depth in 1..=cpu::stack::SIZE {
            assert_eq!(chip.step(), Ok(Operation::None));
            assert_eq!(chip.stack_pointer, depth);
            assert_eq!(chip.program_counter, 0x200);
        }

        assert_eq!(
            chip.step(),
            Err(ProcessError::Stack(StackError::Overflow))
        );
        assert_eq!(chip.stack_pointer, cpu::stack::SIZE);
        assert_eq!(chip.program_counter, 0x202);
    }
}

mod skips {
    use super::*;

    #[test]
    /// `3XNN` and `4XNN`
    fn test_skip_if_const() {
        let mut chip = get_default_chip();
        chip.registers[1] = 0x23;

        assert_eq!(exec(&mut chip, 0x3123), Ok(Operation::None));
        assert_eq!(chip.program_counter, 0x204);
        assert_eq!(exec(&mut chip, 0x3124), Ok(Operation::None));
        assert_eq!(chip.program_counter, 0x206);

        assert_eq!(exec(&mut chip, 0x4124), Ok(Operation::None));
        assert_eq!(chip.program_counter, 0x20A);
        assert_eq!(exec(&mut chip, 0x4123), Ok(Operation::None));
        assert_eq!(chip.program_counter, 0x20C);
    }

    #[test]
    /// `5XY0` and `9XY0`
    fn test_skip_if_register() {
        let mut chip = get_default_chip();
        chip.registers[1] = 7;
        chip.registers[2] = 7;

        assert_eq!(exec(&mut chip, 0x5120), Ok(Operation::None));
        assert_eq!(chip.program_counter, 0x204);
        assert_eq!(exec(&mut chip, 0x9120), Ok(Operation::None));
        assert_eq!(chip.program_counter, 0x206);

        chip.registers[2] = 8;
        assert_eq!(exec(&mut chip, 0x9120), Ok(Operation::None));
        assert_eq!(chip.program_counter, 0x20A);
    }

    #[test]
    fn test_wrong_register_skips() {
        let mut chip = get_default_chip();
        assert_eq!(
            exec(&mut chip, 0x5121),
            Err(ProcessError::Opcode(OpcodeError::Unknown(0x5121)))
        );
        assert_eq!(
            exec(&mut chip, 0x912F),
            Err(ProcessError::Opcode(OpcodeError::Unknown(0x912F)))
        );
        assert_eq!(chip.program_counter, 0x204);
    }
}

mod six_seven {
    use super::*;

    #[test]
    /// `6XNN`
    fn test_set_vx_to_nn() {
        let mut chip = get_default_chip();
        let mut expected = [0; cpu::register::SIZE];
        for x in 0..cpu::register::SIZE {
            let nn = (x as u8).wrapping_mul(0x1F).wrapping_add(0x42);
            let opcode = 0x6000 | ((x as Opcode) << 8) | nn as Opcode;
            assert_eq!(exec(&mut chip, opcode), Ok(Operation::None));
            expected[x] = nn;
            assert_eq!(chip.registers, expected, "after LD V{:X}", x);
        }
    }

    #[test]
    /// `7XNN` wraps and leaves VF alone
    fn test_add_nn_to_vx() {
        let mut chip = get_default_chip();
        chip.registers[0] = 0xFF;
        chip.registers[cpu::register::LAST] = 7;
        assert_eq!(exec(&mut chip, 0x7002), Ok(Operation::None));
        assert_eq!(chip.registers[0], 0x01);
        assert_eq!(chip.registers[cpu::register::LAST], 7);
    }
}

mod eight {
    use super::*;

    fn alu(quirks: Quirks, vx: u8, vy: u8, opcode: Opcode) -> (u8, u8) {
        let mut chip = setup_chip(quirks);
        chip.registers[0] = vx;
        chip.registers[1] = vy;
        chip.registers[cpu::register::LAST] = 0xAA;
        assert_eq!(exec(&mut chip, opcode), Ok(Operation::None));
        (chip.registers[0], chip.registers[cpu::register::LAST])
    }

    #[test]
    fn test_bitwise() {
        let q = Quirks::default();
        assert_eq!(alu(q, 0x0F, 0xF0, 0x8010), (0xF0, 0xAA));
        assert_eq!(alu(q, 0x0F, 0xF0, 0x8011), (0xFF, 0xAA));
        assert_eq!(alu(q, 0x3C, 0x0F, 0x8012), (0x0C, 0xAA));
        assert_eq!(alu(q, 0x3C, 0x0F, 0x8013), (0x33, 0xAA));
    }

    #[test]
    /// `8XY4`
    fn test_addition_with_carry() {
        let q = Quirks::default();
        assert_eq!(alu(q, 0xFF, 0x02, 0x8014), (0x01, 1));
        assert_eq!(alu(q, 0x05, 0x0A, 0x8014), (0x0F, 0));
    }

    #[test]
    /// `8XY5` and `8XY7`
    fn test_subtraction_with_borrow() {
        let q = Quirks::default();
        assert_eq!(alu(q, 5, 5, 0x8015), (0, 1));
        assert_eq!(alu(q, 3, 5, 0x8015), (0xFE, 0));
        assert_eq!(alu(q, 3, 5, 0x8017), (2, 1));
        assert_eq!(alu(q, 5, 3, 0x8017), (0xFE, 0));
    }

    #[test]
    /// `8XY6` and `8XYE` in both flavours
    fn test_shifts() {
        let modern = Quirks::modern();
        assert_eq!(alu(modern, 0b101, 0xF0, 0x8016), (0b10, 1));
        assert_eq!(alu(modern, 0x81, 0x00, 0x801E), (0x02, 1));

        let cosmac = Quirks::cosmac();
        assert_eq!(alu(cosmac, 0b101, 0xF0, 0x8016), (0x78, 0));
        assert_eq!(alu(cosmac, 0x81, 0x40, 0x801E), (0x80, 0));
    }

    #[test]
    /// the flag wins if VF is the destination
    fn test_flag_written_after_result() {
        let mut chip = get_default_chip();
        chip.registers[cpu::register::LAST] = 0xFF;
        chip.registers[1] = 0x01;
        assert_eq!(exec(&mut chip, 0x8F14), Ok(Operation::None));
        assert_eq!(chip.registers[cpu::register::LAST], 1);
    }

    #[test]
    fn test_eight_wrong_opcode() {
        let mut chip = get_default_chip();
        assert_eq!(
            exec(&mut chip, 0x8128),
            Err(ProcessError::Opcode(OpcodeError::Unknown(0x8128)))
        );
    }
}

mod a_b_c {
    use super::*;

    #[test]
    /// `ANNN`
    fn test_set_index_reg_to_addr() {
        let mut chip = get_default_chip();
        assert_eq!(exec(&mut chip, 0xA2F0), Ok(Operation::None));
        assert_eq!(chip.index_register, 0x2F0);
    }

    #[test]
    /// `BNNN`
    fn test_jump_with_offset() {
        let mut chip = setup_chip(Quirks::modern());
        chip.registers[0] = 0x10;
        chip.registers[3] = 0x05;
        assert_eq!(exec(&mut chip, 0xB300), Ok(Operation::None));
        assert_eq!(chip.program_counter, 0x310);

        let mut chip = setup_chip(Quirks::schip());
        chip.registers[0] = 0x10;
        chip.registers[3] = 0x05;
        assert_eq!(exec(&mut chip, 0xB310), Ok(Operation::None));
        assert_eq!(chip.program_counter, 0x315);
    }

    #[test]
    /// `CXNN` masks the generated byte
    fn test_bitwise_and_random() {
        let mut chip = ChipSet::new().with_rng(StepRng::new(0xAB, 0));
        assert_eq!(exec(&mut chip, 0xC00F), Ok(Operation::None));
        assert_eq!(chip.registers[0], 0x0B);
    }

    #[test]
    fn test_seeded_random_is_reproducible() {
        let mut left = setup_chip(Quirks::default());
        let mut right = setup_chip(Quirks::default());
        for _ in 0..16 {
            assert!(exec(&mut left, 0xC5FF).is_ok());
            assert!(exec(&mut right, 0xC5FF).is_ok());
            assert_eq!(left.registers[5], right.registers[5]);
        }
    }
}

mod d {
    use super::*;

    #[test]
    /// drawing the same sprite twice erases it and reports the collision
    fn test_draw_twice() {
        let mut chip = get_default_chip();
        chip.registers[0] = 0;
        assert_eq!(exec(&mut chip, 0xF029), Ok(Operation::None));

        assert_eq!(exec(&mut chip, 0xD125), Ok(Operation::Draw));
        assert_eq!(chip.registers[cpu::register::LAST], 0);
        // the glyph `0` has 14 set pixels
        assert_eq!(lit(&chip), 14);
        assert!(chip.needs_redraw());

        assert_eq!(exec(&mut chip, 0xD125), Ok(Operation::Draw));
        assert_eq!(chip.registers[cpu::register::LAST], 1);
        assert_eq!(lit(&chip), 0);
    }

    #[test]
    fn test_draw_wraps() {
        let mut chip = get_default_chip();
        chip.registers[1] = 62;
        chip.registers[2] = 30;
        // glyph `0`
        chip.index_register = 0;
        assert_eq!(exec(&mut chip, 0xD125), Ok(Operation::Draw));

        let fb = chip.framebuffer();
        assert!(fb.get(62, 30));
        assert!(fb.get(1, 30));
        // third row lands on the top of the screen
        assert!(fb.get(62, 0));
        assert!(fb.get(1, 0));
        assert_eq!(lit(&chip), 14);
    }

    #[test]
    fn test_start_coordinates_wrap() {
        let mut chip = get_default_chip();
        chip.registers[1] = 64 + 3;
        chip.registers[2] = 32 + 1;
        chip.index_register = 0x300;
        chip.memory[0x300] = 0x80;
        assert_eq!(exec(&mut chip, 0xD121), Ok(Operation::Draw));
        assert!(chip.framebuffer().get(3, 1));
    }

    #[test]
    fn test_big_sprite() {
        let mut chip = get_default_chip();
        assert_eq!(exec(&mut chip, 0x00FF), Ok(Operation::Draw));
        chip.index_register = 0x300;
        write_slice_to_memory(&mut chip.memory, 0x300, &[0xFF; 32]);

        assert_eq!(exec(&mut chip, 0xD120), Ok(Operation::Draw));
        assert_eq!(lit(&chip), 256);
        assert_eq!(chip.registers[cpu::register::LAST], 0);
        assert!(chip.framebuffer().get(15, 15));
        assert!(!chip.framebuffer().get(16, 0));
    }

    #[test]
    fn test_zero_height_in_standard_mode() {
        let mut chip = get_default_chip();
        chip.registers[cpu::register::LAST] = 1;
        chip.index_register = 0x300;
        write_slice_to_memory(&mut chip.memory, 0x300, &[0xFF; 32]);

        assert_eq!(exec(&mut chip, 0xD120), Ok(Operation::Draw));
        assert_eq!(lit(&chip), 0);
        assert_eq!(chip.registers[cpu::register::LAST], 0);
    }

    #[test]
    fn test_sprite_outside_of_memory() {
        let mut chip = get_default_chip();
        chip.index_register = 0xFFE;
        assert_eq!(
            exec(&mut chip, 0xD125),
            Err(ProcessError::AddressOverflow {
                address: 0xFFE,
                len: 5
            })
        );
        assert_eq!(lit(&chip), 0);
        assert_eq!(chip.program_counter, 0x202);
    }
}

mod e {
    use super::*;

    #[test]
    /// `EX9E`
    fn test_skip_key_pressed() {
        let mut chip = get_default_chip();
        // only the low nibble selects the key
        chip.registers[0] = 0x1A;

        assert_eq!(exec(&mut chip, 0xE09E), Ok(Operation::None));
        assert_eq!(chip.program_counter, 0x202);

        chip.set_key(0xA, true);
        assert_eq!(exec(&mut chip, 0xE09E), Ok(Operation::None));
        assert_eq!(chip.program_counter, 0x206);
    }

    #[test]
    /// `EXA1`
    fn test_skip_key_not_pressed() {
        let mut chip = get_default_chip();
        chip.registers[0] = 0x3;

        assert_eq!(exec(&mut chip, 0xE0A1), Ok(Operation::None));
        assert_eq!(chip.program_counter, 0x204);

        chip.toggle_key(0x3);
        assert_eq!(exec(&mut chip, 0xE0A1), Ok(Operation::None));
        assert_eq!(chip.program_counter, 0x206);
    }

    #[test]
    fn test_wrong_opcode() {
        let mut chip = get_default_chip();
        assert_eq!(
            exec(&mut chip, 0xE111),
            Err(ProcessError::Opcode(OpcodeError::Unknown(0xE111)))
        );
    }
}

mod f {
    use super::*;

    #[test]
    /// `FX15` then `FX07`
    fn test_delay_timer_round_trip() {
        let mut chip = get_default_chip();
        chip.registers[0] = 30;
        assert_eq!(exec(&mut chip, 0xF015), Ok(Operation::None));
        assert_eq!(exec(&mut chip, 0xF107), Ok(Operation::None));
        assert_eq!(chip.registers[1], 30);
    }

    #[test]
    /// `FX0A`
    fn test_await_key_press() {
        let mut chip = get_default_chip();
        write_opcode_to_memory(&mut chip.memory, 0x200, 0xF00A);

        for _ in 0..3 {
            assert_eq!(chip.step(), Ok(Operation::Wait));
            assert_eq!(chip.program_counter, 0x200);
        }

        let mut keys = [false; 16];
        keys[3] = true;
        keys[7] = true;
        chip.set_keyboard(&keys);

        assert_eq!(chip.step(), Ok(Operation::None));
        assert_eq!(chip.registers[0], 7);
        assert_eq!(chip.program_counter, 0x202);
    }

    #[test]
    /// `FX1E`
    fn test_add_vx_to_i() {
        let mut chip = setup_chip(Quirks::default());
        chip.index_register = 0xFFE;
        chip.registers[0] = 1;
        assert_eq!(exec(&mut chip, 0xF01E), Ok(Operation::None));
        assert_eq!(chip.index_register, 0xFFF);
        assert_eq!(chip.registers[cpu::register::LAST], 0);

        chip.registers[0] = 2;
        assert_eq!(exec(&mut chip, 0xF01E), Ok(Operation::None));
        assert_eq!(chip.index_register, 0x1001);
        assert_eq!(chip.registers[cpu::register::LAST], 1);

        let quirks = Quirks {
            index_overflow_inclusive: true,
            ..Quirks::default()
        };
        let mut chip = setup_chip(quirks);
        chip.index_register = 0xFFE;
        chip.registers[0] = 1;
        assert_eq!(exec(&mut chip, 0xF01E), Ok(Operation::None));
        assert_eq!(chip.registers[cpu::register::LAST], 1);
    }

    #[test]
    /// `FX29` and `FX30`
    fn test_set_i_to_given_font() {
        let mut chip = get_default_chip();
        chip.registers[0] = 0xA;
        assert_eq!(exec(&mut chip, 0xF029), Ok(Operation::None));
        assert_eq!(chip.index_register, 50);

        chip.registers[0] = 0x1A;
        assert_eq!(exec(&mut chip, 0xF029), Ok(Operation::None));
        assert_eq!(chip.index_register, 50);

        chip.registers[0] = 2;
        assert_eq!(exec(&mut chip, 0xF030), Ok(Operation::None));
        assert_eq!(chip.index_register, 0x50 + 20);
    }

    #[test]
    /// `FX33`
    fn test_binary_coding() {
        let mut chip = get_default_chip();
        chip.registers[0] = 246;
        chip.index_register = 0x300;
        assert_eq!(exec(&mut chip, 0xF033), Ok(Operation::None));
        assert_eq!(&chip.get_memory()[0x300..0x303], &[2, 4, 6]);
        assert_eq!(chip.index_register, 0x300);
    }

    #[test]
    fn test_index_is_masked() {
        let mut chip = get_default_chip();
        chip.registers[0] = 123;
        chip.index_register = 0x1300;
        assert_eq!(exec(&mut chip, 0xF033), Ok(Operation::None));
        assert_eq!(&chip.get_memory()[0x300..0x303], &[1, 2, 3]);
    }

    #[test]
    /// `FX55` then `FX65`
    fn test_store_and_load_registers() {
        let mut chip = setup_chip(Quirks::modern());
        let values = [1, 2, 3, 4, 5, 6];
        chip.registers[..6].copy_from_slice(&values);
        chip.index_register = 0x300;

        assert_eq!(exec(&mut chip, 0xF555), Ok(Operation::None));
        assert_eq!(&chip.get_memory()[0x300..0x306], &values);
        assert_eq!(chip.index_register, 0x300);

        chip.registers = [0; cpu::register::SIZE];
        assert_eq!(exec(&mut chip, 0xF565), Ok(Operation::None));
        assert_eq!(&chip.registers[..6], &values);
        assert_eq!(chip.registers[6], 0);
    }

    #[test]
    fn test_store_increments_index() {
        let mut chip = setup_chip(Quirks::cosmac());
        chip.index_register = 0x300;
        assert_eq!(exec(&mut chip, 0xF555), Ok(Operation::None));
        assert_eq!(chip.index_register, 0x306);
        assert_eq!(exec(&mut chip, 0xF165), Ok(Operation::None));
        assert_eq!(chip.index_register, 0x308);
    }

    #[test]
    fn test_store_outside_of_memory() {
        let mut chip = get_default_chip();
        chip.registers[..6].copy_from_slice(&[9; 6]);
        chip.index_register = 0xFFE;
        assert_eq!(
            exec(&mut chip, 0xF555),
            Err(ProcessError::AddressOverflow {
                address: 0xFFE,
                len: 6
            })
        );
        assert_eq!(&chip.get_memory()[0xFFE..], &[0, 0]);
        assert_eq!(chip.program_counter, 0x202);
    }

    #[test]
    /// `FX75` and `FX85`, the values survive a reset
    fn test_flag_registers() {
        let mut chip = get_default_chip();
        chip.registers[..4].copy_from_slice(&[4, 3, 2, 1]);
        assert_eq!(exec(&mut chip, 0xF375), Ok(Operation::None));

        chip.reset();
        assert_eq!(chip.registers, [0; cpu::register::SIZE]);
        assert_eq!(exec(&mut chip, 0xF385), Ok(Operation::None));
        assert_eq!(&chip.registers[..4], &[4, 3, 2, 1]);
    }

    #[test]
    fn test_wrong_opcode() {
        let mut chip = get_default_chip();
        assert_eq!(
            exec(&mut chip, 0xF0AA),
            Err(ProcessError::Opcode(OpcodeError::Unknown(0xF0AA)))
        );
    }
}

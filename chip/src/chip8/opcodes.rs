use std::ops::Range;

use crate::{
    definitions::{cpu, display, keyboard, memory},
    opcode::{AluOp, Instruction, Operation, ProgramCounterStep},
    ProcessError,
};

use super::ChipSet;

impl ChipSet {
    /// Will execute a single decoded instruction.
    ///
    /// On error nothing has been changed, the caller skips the instruction.
    pub(super) fn execute(
        &mut self,
        instruction: Instruction,
    ) -> Result<(ProgramCounterStep, Operation), ProcessError> {
        let step = match instruction {
            Instruction::ScrollDown { n } => {
                // 00CN
                // Scroll display N lines down
                self.display.scroll_down(n as usize);
                return Ok((ProgramCounterStep::Next, Operation::Draw));
            }
            Instruction::Clear => {
                // 00E0
                // clear display
                self.display.clear();
                return Ok((ProgramCounterStep::Next, Operation::Draw));
            }
            Instruction::Return => {
                // 00EE
                // Return from sub routine => pop from stack, the stack holds the
                // address of the call itself
                let pc = self.pop_stack()?;
                ProgramCounterStep::Jump(pc + memory::opcodes::SIZE)
            }
            Instruction::ScrollRight => {
                // 00FB
                self.display.scroll_right(display::SCROLL_HORIZONTAL);
                return Ok((ProgramCounterStep::Next, Operation::Draw));
            }
            Instruction::ScrollLeft => {
                // 00FC
                self.display.scroll_left(display::SCROLL_HORIZONTAL);
                return Ok((ProgramCounterStep::Next, Operation::Draw));
            }
            Instruction::Exit => {
                // 00FD
                log::info!("Program exited at {:#06X}.", self.program_counter);
                self.halted = true;
                return Ok((ProgramCounterStep::Next, Operation::Exit));
            }
            Instruction::LowRes | Instruction::HighRes => {
                // 00FE / 00FF
                let extended = instruction == Instruction::HighRes;
                log::info!(
                    "Switching to the {} resolution.",
                    if extended { "extended" } else { "standard" }
                );
                self.display.set_extended(extended);
                return Ok((ProgramCounterStep::Next, Operation::Draw));
            }
            Instruction::Jump { nnn } => {
                // 1NNN
                // Jumps to address NNN.
                ProgramCounterStep::Jump(nnn)
            }
            Instruction::Call { nnn } => {
                // 2NNN
                // Calls subroutine at NNN.
                self.push_stack(self.program_counter)?;
                ProgramCounterStep::Jump(nnn)
            }
            Instruction::SkipEqConst { x, nn } => {
                // 3XNN
                ProgramCounterStep::cond(self.registers[x] == nn)
            }
            Instruction::SkipNotEqConst { x, nn } => {
                // 4XNN
                ProgramCounterStep::cond(self.registers[x] != nn)
            }
            Instruction::SkipEqReg { x, y } => {
                // 5XY0
                ProgramCounterStep::cond(self.registers[x] == self.registers[y])
            }
            Instruction::LoadConst { x, nn } => {
                // 6XNN
                // Sets VX to NN.
                self.registers[x] = nn;
                ProgramCounterStep::Next
            }
            Instruction::AddConst { x, nn } => {
                // 7XNN
                // Adds NN to VX. (Carry flag is not changed)
                self.registers[x] = self.registers[x].wrapping_add(nn);
                ProgramCounterStep::Next
            }
            Instruction::Alu { op, x, y } => {
                self.alu(op, x, y);
                ProgramCounterStep::Next
            }
            Instruction::SkipNotEqReg { x, y } => {
                // 9XY0
                ProgramCounterStep::cond(self.registers[x] != self.registers[y])
            }
            Instruction::LoadIndex { nnn } => {
                // ANNN
                // Sets I to the address NNN.
                self.index_register = nnn as u16;
                ProgramCounterStep::Next
            }
            Instruction::JumpOffset { nnn } => {
                // BNNN
                // Jumps to the address NNN plus V0, or plus VX when read as BXNN.
                let register = if self.quirks.jump_quirk {
                    nnn >> 8
                } else {
                    0
                };
                ProgramCounterStep::Jump(nnn + self.registers[register] as usize)
            }
            Instruction::Random { x, nn } => {
                // CXNN
                // using a fill bytes call here, as the trait RngCore does not
                // support random u8.
                let mut rand: [u8; 1] = [0];
                self.rng.fill_bytes(&mut rand);
                self.registers[x] = nn & rand[0];
                ProgramCounterStep::Next
            }
            Instruction::Draw { x, y, n } => {
                self.draw(x, y, n)?;
                return Ok((ProgramCounterStep::Next, Operation::Draw));
            }
            Instruction::SkipKeyPressed { x } => {
                // EX9E
                ProgramCounterStep::cond(self.keyboard.is_pressed(self.key_in(x)))
            }
            Instruction::SkipKeyNotPressed { x } => {
                // EXA1
                ProgramCounterStep::cond(!self.keyboard.is_pressed(self.key_in(x)))
            }
            Instruction::LoadDelay { x } => {
                // FX07
                self.registers[x] = self.get_delay_timer();
                ProgramCounterStep::Next
            }
            Instruction::WaitKey { x } => {
                // FX0A
                // A key press is awaited, and then stored in VX. Until then the
                // instruction is executed again and again.
                match self.keyboard.last_pressed() {
                    Some(key) => {
                        self.registers[x] = key as u8;
                        ProgramCounterStep::Next
                    }
                    None => return Ok((ProgramCounterStep::None, Operation::Wait)),
                }
            }
            Instruction::SetDelay { x } => {
                // FX15
                self.delay_timer.set_value(self.registers[x]);
                ProgramCounterStep::Next
            }
            Instruction::SetSound { x } => {
                // FX18
                self.sound_timer.set_value(self.registers[x]);
                ProgramCounterStep::Next
            }
            Instruction::AddIndex { x } => {
                self.add_index(x);
                ProgramCounterStep::Next
            }
            Instruction::LoadFont { x } => {
                // FX29
                // Sets I to the location of the sprite for the character in VX.
                let glyph = self.key_in(x);
                self.index_register = (display::fontset::LOCATION
                    + display::fontset::GLYPH_SIZE * glyph)
                    as u16;
                ProgramCounterStep::Next
            }
            Instruction::LoadBigFont { x } => {
                // FX30
                let glyph = self.key_in(x);
                self.index_register = (display::big_fontset::LOCATION
                    + display::big_fontset::GLYPH_SIZE * glyph)
                    as u16;
                ProgramCounterStep::Next
            }
            Instruction::StoreBcd { x } => {
                // FX33
                // Stores the binary-coded decimal representation of VX at I, I + 1 and I + 2.
                let range = self.index_range(3)?;
                let r = self.registers[x];
                self.memory[range].copy_from_slice(&[r / 100, r / 10 % 10, r % 10]);
                ProgramCounterStep::Next
            }
            Instruction::StoreRegisters { x } => {
                // FX55
                // Stores V0 to VX (including VX) in memory starting at address I.
                let range = self.index_range(x + 1)?;
                self.memory[range].copy_from_slice(&self.registers[..=x]);
                self.advance_index(x);
                ProgramCounterStep::Next
            }
            Instruction::LoadRegisters { x } => {
                // FX65
                // Fills V0 to VX (including VX) with values from memory starting at address I.
                let range = self.index_range(x + 1)?;
                self.registers[..=x].copy_from_slice(&self.memory[range]);
                self.advance_index(x);
                ProgramCounterStep::Next
            }
            Instruction::StoreFlags { x } => {
                // FX75
                self.flags[..=x].copy_from_slice(&self.registers[..=x]);
                ProgramCounterStep::Next
            }
            Instruction::LoadFlags { x } => {
                // FX85
                self.registers[..=x].copy_from_slice(&self.flags[..=x]);
                ProgramCounterStep::Next
            }
        };

        Ok((step, Operation::None))
    }

    /// The 8XYN family, VF is always written after the result.
    fn alu(&mut self, op: AluOp, x: usize, y: usize) {
        let vx = self.registers[x];
        let vy = self.registers[y];
        // the register the shifts read from
        let source = if self.quirks.shift_ignores_vy { vx } else { vy };

        let (result, flag) = match op {
            // 8XY0
            AluOp::Load => (vy, None),
            // 8XY1
            AluOp::Or => (vx | vy, None),
            // 8XY2
            AluOp::And => (vx & vy, None),
            // 8XY3
            AluOp::Xor => (vx ^ vy, None),
            AluOp::Add => {
                // 8XY4
                // VF is set to 1 when there's a carry, and to 0 when there isn't.
                let (res, carry) = vx.overflowing_add(vy);
                (res, Some(carry as u8))
            }
            // 8XY5
            // VF is set to 0 when there's a borrow, and 1 when there isn't.
            AluOp::Sub => (vx.wrapping_sub(vy), Some((vx >= vy) as u8)),
            // 8XY6
            AluOp::ShiftRight => (source >> 1, Some(source & 1)),
            // 8XY7
            AluOp::SubReverse => (vy.wrapping_sub(vx), Some((vy >= vx) as u8)),
            // 8XYE
            AluOp::ShiftLeft => (source << 1, Some(source >> 7)),
        };

        self.registers[x] = result;
        if let Some(flag) = flag {
            self.registers[cpu::register::LAST] = flag;
        }
    }

    /// DXYN
    ///
    /// Draws a sprite at coordinate (VX, VY) that has a width of 8 pixels and a height of N
    /// pixels, read from memory starting at I. VF is set to 1 if any screen pixels are flipped
    /// from set to unset. With `N == 0` a `16x16` sprite is drawn if the extended mode is active.
    fn draw(&mut self, x: usize, y: usize, n: u8) -> Result<(), ProcessError> {
        const BIG_SPRITE: usize = 16;

        let (rows, bytes_per_row) = match n {
            0 if self.quirks.extended_sprite_support && self.display.is_extended() => {
                (BIG_SPRITE, 2)
            }
            n => (n as usize, 1),
        };
        let range = self.index_range(rows * bytes_per_row)?;

        let coorx = self.registers[x] as usize % self.display.width();
        let coory = self.registers[y] as usize % self.display.height();

        let collision =
            self.display
                .draw_sprite(coorx, coory, &self.memory[range], bytes_per_row);
        self.registers[cpu::register::LAST] = collision as u8;
        Ok(())
    }

    /// FX1E
    ///
    /// Adds VX to I. VF is set to 1 when there is a range overflow and to 0 when there isn't.
    fn add_index(&mut self, x: usize) {
        let sum = self.index_register as u32 + self.registers[x] as u32;
        let overflow = if self.quirks.index_overflow_inclusive {
            sum >= cpu::INDEX_LIMIT
        } else {
            sum > cpu::INDEX_LIMIT
        };
        self.index_register = sum as u16;
        self.registers[cpu::register::LAST] = overflow as u8;
    }

    /// The key index stored in VX, only the low nibble counts.
    fn key_in(&self, x: usize) -> usize {
        self.registers[x] as usize % keyboard::SIZE
    }

    /// Moves I behind the registers accessed by FX55 / FX65 if the quirk asks for it.
    fn advance_index(&mut self, x: usize) {
        if self.quirks.store_load_increments_index {
            self.index_register = self.index_register.wrapping_add(x as u16 + 1);
        }
    }

    /// The memory range of `len` bytes starting at I.
    fn index_range(&self, len: usize) -> Result<Range<usize>, ProcessError> {
        let address = self.index_register as usize & memory::ADDRESS_MASK;
        if address + len > memory::SIZE {
            return Err(ProcessError::AddressOverflow { address, len });
        }
        Ok(address..(address + len))
    }
}

use std::time::Instant;

use crate::{
    chip8::ChipSet,
    definitions::cpu,
    devices::{DisplayCommands, KeyboardCommands},
    opcode::Operation,
};

/// Drives a [`ChipSet`] one host frame at a time, the host decides how often
/// [`frame`](Runner::frame) is called.
pub struct Runner<D, K>
where
    D: DisplayCommands,
    K: KeyboardCommands,
{
    chip: ChipSet,
    display: D,
    keyboard: K,
    cycles_per_frame: usize,
}

impl<D, K> Runner<D, K>
where
    D: DisplayCommands,
    K: KeyboardCommands,
{
    pub fn new(chip: ChipSet, display: D, keyboard: K) -> Self {
        Self {
            chip,
            display,
            keyboard,
            cycles_per_frame: cpu::CYCLES_PER_FRAME,
        }
    }

    /// Sets the amount of instructions executed per frame, at least one.
    pub fn with_cycles(mut self, cycles_per_frame: usize) -> Self {
        self.cycles_per_frame = cycles_per_frame.max(1);
        self
    }

    /// Runs a single frame:
    /// - read the host keyboard
    /// - execute up to `cycles_per_frame` instructions, stopping early on a key wait or exit
    /// - let the timers run with the given time
    /// - push the framebuffer to the display if it changed
    ///
    /// Returns [`Operation::Wait`] or [`Operation::Exit`] if the frame stopped early,
    /// [`Operation::Draw`] if the display was updated and [`Operation::None`] otherwise.
    pub fn frame(&mut self, now: Instant) -> Operation {
        let keys = self.keyboard.get_keyboard();
        self.chip.set_keyboard(&keys);

        let mut status = Operation::None;
        for _ in 0..self.cycles_per_frame {
            match self.chip.step() {
                Ok(op @ (Operation::Wait | Operation::Exit)) => {
                    status = op;
                    break;
                }
                Ok(_) => {}
                // the chipset already logged and skipped the instruction
                Err(_) => {}
            }
        }

        self.chip.tick_timers(now);

        if self.chip.needs_redraw() {
            self.display.display(self.chip.framebuffer());
            self.chip.clear_redraw();
            if status == Operation::None {
                status = Operation::Draw;
            }
        }
        status
    }

    pub fn chip(&self) -> &ChipSet {
        &self.chip
    }

    pub fn chip_mut(&mut self) -> &mut ChipSet {
        &mut self.chip
    }

    pub fn keyboard(&self) -> &K {
        &self.keyboard
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }
}

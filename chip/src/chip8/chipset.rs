use std::time::Instant;

use rand::{rngs::SmallRng, RngCore, SeedableRng};

use crate::{
    definitions::{cpu, display, keyboard, memory},
    devices::Keyboard,
    display::Framebuffer,
    opcode::{self, Instruction, Opcode, Operation, ProgramCounterStep},
    quirks::Quirks,
    resources::Rom,
    timer::Timer,
    LoadError, ProcessError,
};

/// The ChipSet struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instance of the
/// Chip8 CPU.
pub struct ChipSet {
    /// the quirks selected on construction
    pub(super) quirks: Quirks,
    /// the rom reloaded on every reset
    pub(super) rom: Option<Rom>,
    /// the regions written by `load`, replayed after the rom on every reset
    pub(super) regions: Vec<(usize, Vec<u8>)>,
    /// all two bytes long and stored big-endian
    pub(super) opcode: Opcode,
    /// the instruction decoded from `opcode`, if decoding worked
    pub(super) instruction: Option<Instruction>,
    /// - `0x000-0x04F` - Used for the built in `4x5` pixel font set (`0-F`)
    /// - `0x050-0x0EF` - Used for the built in `8x10` pixel font set (`0-F`)
    /// - `0x200-0xFFF` - Program ROM and work RAM
    pub(super) memory: Vec<u8>,
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions. In an addition operation, `VF` is the carry flag,
    /// while in subtraction, it is the "no borrow" flag. In the draw instruction `VF` is set upon
    /// pixel collision.
    pub(super) registers: [u8; cpu::register::SIZE],
    /// The index for the register, this is a special register entry
    /// called index `I`. It is `16-bit` wide, only the lower `12-bit` are used
    /// as an address.
    pub(super) index_register: u16,
    /// The program counter is a CPU register in the computer processor which has the address of the
    /// next instruction to be executed from memory.
    pub(super) program_counter: usize,
    /// The stack is only used to store return addresses when subroutines are called.
    pub(super) stack: [usize; cpu::stack::SIZE],
    /// Points at the next free stack slot.
    pub(super) stack_pointer: usize,
    /// Delay timer: This timer is intended to be used for timing the events of games. Its value
    /// can be set and read.
    /// Counts down at 60 hertz, until it reaches 0.
    pub(super) delay_timer: Timer,
    /// Sound timer: This timer is used for sound effects. When its value is nonzero, a beeping
    /// sound is made.
    /// Counts down at 60 hertz, until it reaches 0.
    pub(super) sound_timer: Timer,
    /// The monochrome screen
    pub(super) display: Framebuffer,
    /// The state of the hex keyboard, written by the host
    pub(super) keyboard: Keyboard,
    /// The auxiliary registers of `FX75` / `FX85`, they survive a reset.
    pub(super) flags: [u8; cpu::flags::SIZE],
    /// Set by `00FD`, the machine will not execute anything until reset.
    pub(super) halted: bool,
    /// This stores the random number generator, used by the chipset.
    /// It is stored into the chipset, so as to enable simple mocking
    /// of the given type.
    pub(super) rng: Box<dyn RngCore + Send>,
}

/// A read only copy of the machine state, meant for debug views.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub program_counter: usize,
    pub stack_pointer: usize,
    pub index_register: u16,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub registers: [u8; cpu::register::SIZE],
    pub stack: [usize; cpu::stack::SIZE],
    /// The last fetched opcode
    pub opcode: Opcode,
    /// The last decoded instruction
    pub instruction: Option<Instruction>,
    pub extended: bool,
    pub halted: bool,
}

impl Snapshot {
    /// The mnemonic of the last decoded instruction.
    pub fn mnemonic(&self) -> String {
        match self.instruction {
            Some(instruction) => instruction.to_string(),
            None => format!("??? {:#06X}", self.opcode),
        }
    }
}

impl Default for ChipSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ChipSet {
    /// will create a new chipset object with the default quirks
    pub fn new() -> Self {
        Self::with_quirks(Quirks::default())
    }

    /// will create a new chipset object using the given quirks
    pub fn with_quirks(quirks: Quirks) -> Self {
        let mut chip = Self {
            quirks,
            rom: None,
            regions: Vec::new(),
            opcode: 0,
            instruction: None,
            memory: vec![0; memory::SIZE],
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER,
            stack: [0; cpu::stack::SIZE],
            stack_pointer: 0,
            delay_timer: Timer::new(0),
            sound_timer: Timer::new(0),
            display: Framebuffer::new(),
            keyboard: Keyboard::new(),
            flags: [0; cpu::flags::SIZE],
            halted: false,
            rng: Box::new(rand::rngs::OsRng {}),
        };
        chip.reset();
        chip
    }

    /// Replaces the random number generator used by `CXNN`.
    pub fn with_rng<R>(mut self, rng: R) -> Self
    where
        R: RngCore + Send + 'static,
    {
        self.rng = Box::new(rng);
        self
    }

    /// Uses a seeded generator, so that `CXNN` is reproducible.
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(SmallRng::seed_from_u64(seed))
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    /// The name of the loaded rom, if any.
    pub fn rom_name(&self) -> Option<&str> {
        self.rom.as_ref().map(Rom::get_name)
    }

    /// Makes sure `len` bytes fit into memory starting at `address`.
    fn check_fit(address: usize, len: usize) -> Result<(), LoadError> {
        if address >= memory::SIZE {
            return Err(LoadError::AddressOutOfRange(address));
        }
        let available = memory::SIZE - address;
        if len > available {
            return Err(LoadError::TooLarge {
                address,
                len,
                available,
            });
        }
        Ok(())
    }

    /// Will write the bytes into memory starting at `address`, nothing else is touched.
    /// The bytes are remembered, every later reset writes them again.
    pub fn load(&mut self, bytes: &[u8], address: usize) -> Result<(), LoadError> {
        Self::check_fit(address, bytes.len())?;
        self.memory[address..(address + bytes.len())].copy_from_slice(bytes);
        self.regions.push((address, bytes.to_vec()));
        Ok(())
    }

    /// Will reset the machine and place the rom at the program start. The rom is
    /// remembered, every later reset reloads it. Regions written by `load` before
    /// are forgotten.
    pub fn load_rom(&mut self, rom: Rom) -> Result<(), LoadError> {
        Self::check_fit(cpu::PROGRAM_COUNTER, rom.get_data().len())?;
        log::info!(
            "Loading rom '{}' ({} bytes).",
            rom.get_name(),
            rom.get_data().len()
        );
        self.rom = Some(rom);
        self.regions.clear();
        self.reset();
        Ok(())
    }

    /// Returns the machine to its initial state and reloads the rom, followed by
    /// everything written through `load` in the original order.
    /// The flag registers of `FX75` keep their values.
    pub fn reset(&mut self) {
        log::info!("Resetting the machine.");
        self.memory.iter_mut().for_each(|cell| *cell = 0);

        // load fonts
        let small = display::fontset::LOCATION;
        self.memory[small..(small + display::fontset::FONTSET.len())]
            .copy_from_slice(&display::fontset::FONTSET);
        let big = display::big_fontset::LOCATION;
        self.memory[big..(big + display::big_fontset::FONTSET.len())]
            .copy_from_slice(&display::big_fontset::FONTSET);

        // write the rom data into memory, the size was checked during loading
        if let Some(rom) = &self.rom {
            let data = rom.get_data();
            self.memory[cpu::PROGRAM_COUNTER..(cpu::PROGRAM_COUNTER + data.len())]
                .copy_from_slice(data);
        }
        // the sizes were checked by `load`
        for (address, bytes) in &self.regions {
            self.memory[*address..(*address + bytes.len())].copy_from_slice(bytes);
        }

        self.opcode = 0;
        self.instruction = None;
        self.registers = [0; cpu::register::SIZE];
        self.index_register = 0;
        self.program_counter = cpu::PROGRAM_COUNTER;
        self.stack = [0; cpu::stack::SIZE];
        self.stack_pointer = 0;
        self.delay_timer.reset();
        self.sound_timer.reset();
        self.display = Framebuffer::new();
        self.keyboard.reset();
        self.halted = false;
    }

    /// will get the next opcode from memory and decode it
    pub(super) fn fetch(&mut self) -> Result<Instruction, ProcessError> {
        self.opcode = 0;
        self.instruction = None;

        self.opcode = opcode::build_opcode(&self.memory, self.program_counter)?;
        let instruction = Instruction::decode(self.opcode, self.quirks.extended_sprite_support)?;
        log::debug!(
            "{:#06X}: {:#06X} {}",
            self.program_counter,
            self.opcode,
            instruction
        );
        self.instruction = Some(instruction);
        Ok(instruction)
    }

    /// will advance the program by a single step
    ///
    /// An error is only a diagnostic, the faulty instruction was skipped and
    /// the machine can keep running.
    pub fn step(&mut self) -> Result<Operation, ProcessError> {
        if self.halted {
            return Ok(Operation::Exit);
        }

        match self.fetch().and_then(|instruction| self.execute(instruction)) {
            Ok((step, operation)) => {
                self.program_counter = step.apply(self.program_counter);
                Ok(operation)
            }
            Err(err) => {
                log::warn!(
                    "Skipping {:#06X} at {:#06X}: {}",
                    self.opcode,
                    self.program_counter,
                    err
                );
                self.program_counter = ProgramCounterStep::Next.apply(self.program_counter);
                Err(err)
            }
        }
    }

    /// Lets both timers count down, depending on the passed wall clock time.
    pub fn tick_timers(&mut self, now: Instant) {
        self.delay_timer.tick(now);
        self.sound_timer.tick(now);
    }

    /// Will write keyboard data into internal keyboard representation.
    pub fn set_keyboard(&mut self, keys: &[bool; keyboard::SIZE]) {
        self.keyboard.set_mult(keys);
    }

    /// Will set the value of the given key
    pub fn set_key(&mut self, key: usize, to: bool) {
        self.keyboard.set_key(key, to)
    }

    /// Will toggle the given key
    pub fn toggle_key(&mut self, key: usize) {
        self.keyboard.toggle_key(key)
    }

    pub fn is_pressed(&self, key: usize) -> bool {
        self.keyboard.is_pressed(key)
    }

    /// Will get the current state of the keyboard
    pub fn get_keyboard(&self) -> &[bool] {
        self.keyboard.get_keys()
    }

    /// will return the sound timer
    pub fn get_sound_timer(&self) -> u8 {
        self.sound_timer.get_value()
    }

    /// will return the delay timer
    pub fn get_delay_timer(&self) -> u8 {
        self.delay_timer.get_value()
    }

    /// The buzzer should sound while this is true.
    pub fn is_sound_active(&self) -> bool {
        self.get_sound_timer() > 0
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Will return the current display
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.display
    }

    /// Set whenever an instruction changed the display since the last [`clear_redraw`](Self::clear_redraw).
    pub fn needs_redraw(&self) -> bool {
        self.display.is_dirty()
    }

    /// Marks the current frame as consumed.
    pub fn clear_redraw(&mut self) {
        self.display.clear_dirty();
    }

    /// Will return a immutable slice of the memory
    pub fn get_memory(&self) -> &[u8] {
        &self.memory
    }

    /// Copies the observable state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            program_counter: self.program_counter,
            stack_pointer: self.stack_pointer,
            index_register: self.index_register,
            delay_timer: self.get_delay_timer(),
            sound_timer: self.get_sound_timer(),
            registers: self.registers,
            stack: self.stack,
            opcode: self.opcode,
            instruction: self.instruction,
            extended: self.display.is_extended(),
            halted: self.halted,
        }
    }

    /// Will push the given pointer to the stack
    pub(super) fn push_stack(&mut self, pointer: usize) -> Result<(), crate::StackError> {
        if self.stack_pointer == cpu::stack::SIZE {
            return Err(crate::StackError::Overflow);
        }
        self.stack[self.stack_pointer] = pointer;
        self.stack_pointer += 1;
        Ok(())
    }

    /// Will pop the last pushed pointer
    pub(super) fn pop_stack(&mut self) -> Result<usize, crate::StackError> {
        if self.stack_pointer == 0 {
            return Err(crate::StackError::Underflow);
        }
        self.stack_pointer -= 1;
        Ok(self.stack[self.stack_pointer])
    }
}

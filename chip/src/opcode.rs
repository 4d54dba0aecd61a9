//! Opcode abstractions, the decoded instruction set and its mnemonics.
use std::{convert::TryFrom, fmt};

use crate::{definitions::memory, OpcodeError};

/// the base mask used for generating all the other sub masks
pub(crate) const OPCODE_MASK_FFFF: u16 = u16::MAX;

/// the mask for the first twelve bytes
pub(crate) const OPCODE_MASK_FFF0: u16 = OPCODE_MASK_FFFF << 4;

/// the mask for the first eight bytes
pub(crate) const OPCODE_MASK_FF00: u16 = OPCODE_MASK_FFFF << 8;

/// the mask for the first four bytes
pub(crate) const OPCODE_MASK_F000: u16 = OPCODE_MASK_FFFF << 12;

/// the mask for the last four bytes
pub(crate) const OPCODE_MASK_000F: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FFF0;

/// the mask for the last eight bytes
pub(crate) const OPCODE_MASK_00FF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FF00;

/// the mask for the last four bytes
pub(crate) const OPCODE_MASK_0FFF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_F000;

/// the size of a single byte
const BYTE_SIZE: u16 = 0x8;

/// a wrapper type for u16 to make it clear what is meant to be used
pub type Opcode = u16;

/// will build an opcode from data and the given point
/// # Arguments
///
/// - `data` - A slice of u8 data entries used to generate the opcodes
/// - `pointer` - Where in the data the opcode shall be extracted, so `pointer` and `pointer + 1` make
/// the opcode up
///
/// # Example
/// ```rust
/// # use chip::opcode::*;
/// # use chip::OpcodeError;
///  const OPCODES: [Opcode; 2] = [0x00EE, 0x1EDA];
///  const SPLIT_OPCODE: [u8; 4] = [0x00, 0xEE, 0x1E, 0xDA];
///  for (i, val) in OPCODES.iter().enumerate() {
///      let opcode = build_opcode(&SPLIT_OPCODE, i * 2).expect("This will work.");
///      assert_eq!(opcode, *val);
///  }
/// # let pointer = 3;
/// # let err = OpcodeError::MemoryInvalid {pointer, len: SPLIT_OPCODE.len() };
/// # assert_eq!(Err(err), build_opcode(&SPLIT_OPCODE, pointer));
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Result<Opcode, OpcodeError> {
    // controlling that there is no illegal access here
    if pointer + 1 < data.len() {
        Ok(Opcode::from_be_bytes([data[pointer], data[pointer + 1]]))
    } else {
        Err(OpcodeError::MemoryInvalid {
            pointer,
            len: data.len(),
        })
    }
}

/// These are special traits used to filter out information
/// from opcodes
pub trait OpcodeTrait {
    /// the opcode family, the top nibble already shifted down
    fn t(&self) -> usize;

    /// this is an opcode extractor for the opcode type `TNNN`
    /// - `NNN` is an address
    fn nnn(&self) -> usize;

    /// this is an opcode extractor for the opcode type `TXNN`
    /// - `X` is a register index
    /// - `NN` is a constant
    fn xnn(&self) -> (usize, u8);

    /// this is an opcode extractor for the opcode type `TXYN`
    /// - `X` is a register index
    /// - `Y` is a register index
    /// - `N` is a constant nibble
    fn xyn(&self) -> (usize, usize, u8);

    /// this is an opcode extractor for the opcode type `TXYT`
    fn xy(&self) -> (usize, usize);

    /// this is an opcode extractor for the opcode type `TXTT`
    fn x(&self) -> usize;
}

impl OpcodeTrait for Opcode {
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.t(), 0x1);
    /// ```
    fn t(&self) -> usize {
        const SHIFT: u16 = 3 * BYTE_SIZE / 2;
        ((self & OPCODE_MASK_F000) >> SHIFT) as usize
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.nnn(), 0xEDA)
    /// ```
    fn nnn(&self) -> usize {
        (self & OPCODE_MASK_0FFF) as usize
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.xnn(), (0xE, 0xDA));
    /// ```
    fn xnn(&self) -> (usize, u8) {
        let x = self.x();
        let nn = (self & OPCODE_MASK_00FF) as u8;
        (x, nn)
    }

    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xyn(), (0xE, 0xD, 0xA));
    /// ```
    fn xyn(&self) -> (usize, usize, u8) {
        let (x, y) = self.xy();
        let n = (self & OPCODE_MASK_000F) as u8;
        (x, y, n)
    }

    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xy(), (0xE, 0xD));
    /// ```
    fn xy(&self) -> (usize, usize) {
        let x = self.x();
        const MASK: u16 = OPCODE_MASK_00FF ^ OPCODE_MASK_000F;
        const NIBBLE: u16 = BYTE_SIZE / 2;
        let y = ((self & MASK) >> NIBBLE) as usize;
        (x, y)
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.x(), 0xE);
    /// ```
    fn x(&self) -> usize {
        ((self & OPCODE_MASK_0FFF & OPCODE_MASK_FF00) >> BYTE_SIZE) as usize
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents the program steps that the chip
/// can take.
pub enum ProgramCounterStep {
    /// Will not change the program counter
    None,
    /// Will move the program counter to the next instruction
    Next,
    /// Will skip the next instruction
    Skip,
    /// Will simply move the program counter to the given location.
    Jump(usize),
}

impl ProgramCounterStep {
    /// Will return a Skip if the condition is true.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next, ProgramCounterStep::cond(false));
    /// assert_eq!(ProgramCounterStep::Skip, ProgramCounterStep::cond(true));
    /// ```
    #[inline]
    pub fn cond(cond: bool) -> Self {
        if cond {
            ProgramCounterStep::Skip
        } else {
            ProgramCounterStep::Next
        }
    }

    /// Calculates the new program counter, always kept inside of the address space.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Skip.apply(0x200), 0x204);
    /// assert_eq!(ProgramCounterStep::Jump(0x1234).apply(0x200), 0x234);
    /// ```
    #[inline]
    pub fn apply(&self, program_counter: usize) -> usize {
        let next = match *self {
            ProgramCounterStep::None => program_counter,
            ProgramCounterStep::Next => program_counter + memory::opcodes::SIZE,
            ProgramCounterStep::Skip => program_counter + 2 * memory::opcodes::SIZE,
            ProgramCounterStep::Jump(pointer) => pointer,
        };
        next & memory::ADDRESS_MASK
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents a command from the interpreter up to the host.
pub enum Operation {
    /// If no action has to be taken.
    None,
    /// The machine waits for a key press, the instruction will be retried.
    Wait,
    /// The framebuffer changed.
    Draw,
    /// The program requested the machine to stop.
    Exit,
}

/// The register to register operations of the `8XYN` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    /// `8XY0` - `Vx = Vy`
    Load,
    /// `8XY1` - `Vx |= Vy`
    Or,
    /// `8XY2` - `Vx &= Vy`
    And,
    /// `8XY3` - `Vx ^= Vy`
    Xor,
    /// `8XY4` - `Vx += Vy`, `VF` carry
    Add,
    /// `8XY5` - `Vx -= Vy`, `VF` not borrow
    Sub,
    /// `8XY6` - `Vx >>= 1`, `VF` shifted out bit
    ShiftRight,
    /// `8XY7` - `Vx = Vy - Vx`, `VF` not borrow
    SubReverse,
    /// `8XYE` - `Vx <<= 1`, `VF` shifted out bit
    ShiftLeft,
}

impl AluOp {
    fn from_nibble(n: u8) -> Option<Self> {
        let op = match n {
            0x0 => AluOp::Load,
            0x1 => AluOp::Or,
            0x2 => AluOp::And,
            0x3 => AluOp::Xor,
            0x4 => AluOp::Add,
            0x5 => AluOp::Sub,
            0x6 => AluOp::ShiftRight,
            0x7 => AluOp::SubReverse,
            0xE => AluOp::ShiftLeft,
            _ => return None,
        };
        Some(op)
    }

    fn mnemonic(&self) -> &'static str {
        match self {
            AluOp::Load => "LD",
            AluOp::Or => "OR",
            AluOp::And => "AND",
            AluOp::Xor => "XOR",
            AluOp::Add => "ADD",
            AluOp::Sub => "SUB",
            AluOp::ShiftRight => "SHR",
            AluOp::SubReverse => "SUBN",
            AluOp::ShiftLeft => "SHL",
        }
    }
}

/// A fully decoded instruction, `x` and `y` are register indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `00CN` - scroll the display down by `n` rows
    ScrollDown { n: u8 },
    /// `00E0` - clear the display
    Clear,
    /// `00EE` - return from a subroutine
    Return,
    /// `00FB` - scroll the display right by 4 pixels
    ScrollRight,
    /// `00FC` - scroll the display left by 4 pixels
    ScrollLeft,
    /// `00FD` - stop the machine
    Exit,
    /// `00FE` - switch to the standard resolution
    LowRes,
    /// `00FF` - switch to the extended resolution
    HighRes,
    /// `1NNN` - `PC = NNN`
    Jump { nnn: usize },
    /// `2NNN` - call the subroutine at `NNN`
    Call { nnn: usize },
    /// `3XNN` - skip if `Vx == NN`
    SkipEqConst { x: usize, nn: u8 },
    /// `4XNN` - skip if `Vx != NN`
    SkipNotEqConst { x: usize, nn: u8 },
    /// `5XY0` - skip if `Vx == Vy`
    SkipEqReg { x: usize, y: usize },
    /// `6XNN` - `Vx = NN`
    LoadConst { x: usize, nn: u8 },
    /// `7XNN` - `Vx += NN` without touching the carry
    AddConst { x: usize, nn: u8 },
    /// `8XYN` - register to register operations
    Alu { op: AluOp, x: usize, y: usize },
    /// `9XY0` - skip if `Vx != Vy`
    SkipNotEqReg { x: usize, y: usize },
    /// `ANNN` - `I = NNN`
    LoadIndex { nnn: usize },
    /// `BNNN` - `PC = NNN + V0` (or `+ Vx` with the jump quirk)
    JumpOffset { nnn: usize },
    /// `CXNN` - `Vx = rand() & NN`
    Random { x: usize, nn: u8 },
    /// `DXYN` - draw a sprite of `n` rows at `(Vx, Vy)`
    Draw { x: usize, y: usize, n: u8 },
    /// `EX9E` - skip if the key `Vx` is pressed
    SkipKeyPressed { x: usize },
    /// `EXA1` - skip if the key `Vx` is not pressed
    SkipKeyNotPressed { x: usize },
    /// `FX07` - `Vx = delay`
    LoadDelay { x: usize },
    /// `FX0A` - wait for a key and store it in `Vx`
    WaitKey { x: usize },
    /// `FX15` - `delay = Vx`
    SetDelay { x: usize },
    /// `FX18` - `sound = Vx`
    SetSound { x: usize },
    /// `FX1E` - `I += Vx`
    AddIndex { x: usize },
    /// `FX29` - `I` points to the small glyph of `Vx`
    LoadFont { x: usize },
    /// `FX30` - `I` points to the large glyph of `Vx`
    LoadBigFont { x: usize },
    /// `FX33` - store the decimal digits of `Vx` at `I`
    StoreBcd { x: usize },
    /// `FX55` - store `V0..=Vx` at `I`
    StoreRegisters { x: usize },
    /// `FX65` - load `V0..=Vx` from `I`
    LoadRegisters { x: usize },
    /// `FX75` - store `V0..=Vx` in the flag registers
    StoreFlags { x: usize },
    /// `FX85` - load `V0..=Vx` from the flag registers
    LoadFlags { x: usize },
}

impl Instruction {
    /// Decodes the opcode, the super chip additions are only recognised if
    /// `extended` is set.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// # use chip::OpcodeError;
    /// assert_eq!(Instruction::decode(0x6105, false), Ok(Instruction::LoadConst { x: 1, nn: 0x05 }));
    /// assert_eq!(Instruction::decode(0x00FF, true), Ok(Instruction::HighRes));
    /// assert_eq!(Instruction::decode(0x00FF, false), Err(OpcodeError::Unknown(0x00FF)));
    /// ```
    pub fn decode(opcode: Opcode, extended: bool) -> Result<Self, OpcodeError> {
        let instruction = Self::try_from(opcode)?;
        if instruction.is_extended() && !extended {
            return Err(OpcodeError::Unknown(opcode));
        }
        Ok(instruction)
    }

    /// Is this one of the instructions only available in extended mode.
    pub fn is_extended(&self) -> bool {
        matches!(
            self,
            Instruction::ScrollDown { .. }
                | Instruction::ScrollRight
                | Instruction::ScrollLeft
                | Instruction::Exit
                | Instruction::LowRes
                | Instruction::HighRes
                | Instruction::LoadBigFont { .. }
                | Instruction::StoreFlags { .. }
                | Instruction::LoadFlags { .. }
        )
    }
}

impl TryFrom<Opcode> for Instruction {
    type Error = OpcodeError;

    fn try_from(opcode: Opcode) -> Result<Self, Self::Error> {
        let unknown = Err(OpcodeError::Unknown(opcode));
        let nnn = opcode.nnn();
        let (x, nn) = opcode.xnn();
        let (_, y, n) = opcode.xyn();

        let res = match opcode.t() {
            0x0 => match opcode {
                0x00E0 => Instruction::Clear,
                0x00EE => Instruction::Return,
                0x00FB => Instruction::ScrollRight,
                0x00FC => Instruction::ScrollLeft,
                0x00FD => Instruction::Exit,
                0x00FE => Instruction::LowRes,
                0x00FF => Instruction::HighRes,
                _ if opcode & OPCODE_MASK_FFF0 == 0x00C0 => Instruction::ScrollDown { n },
                _ => return unknown,
            },
            0x1 => Instruction::Jump { nnn },
            0x2 => Instruction::Call { nnn },
            0x3 => Instruction::SkipEqConst { x, nn },
            0x4 => Instruction::SkipNotEqConst { x, nn },
            0x5 if n == 0 => Instruction::SkipEqReg { x, y },
            0x6 => Instruction::LoadConst { x, nn },
            0x7 => Instruction::AddConst { x, nn },
            0x8 => match AluOp::from_nibble(n) {
                Some(op) => Instruction::Alu { op, x, y },
                None => return unknown,
            },
            0x9 if n == 0 => Instruction::SkipNotEqReg { x, y },
            0xA => Instruction::LoadIndex { nnn },
            0xB => Instruction::JumpOffset { nnn },
            0xC => Instruction::Random { x, nn },
            0xD => Instruction::Draw { x, y, n },
            0xE => match nn {
                0x9E => Instruction::SkipKeyPressed { x },
                0xA1 => Instruction::SkipKeyNotPressed { x },
                _ => return unknown,
            },
            0xF => match nn {
                0x07 => Instruction::LoadDelay { x },
                0x0A => Instruction::WaitKey { x },
                0x15 => Instruction::SetDelay { x },
                0x18 => Instruction::SetSound { x },
                0x1E => Instruction::AddIndex { x },
                0x29 => Instruction::LoadFont { x },
                0x30 => Instruction::LoadBigFont { x },
                0x33 => Instruction::StoreBcd { x },
                0x55 => Instruction::StoreRegisters { x },
                0x65 => Instruction::LoadRegisters { x },
                0x75 => Instruction::StoreFlags { x },
                0x85 => Instruction::LoadFlags { x },
                _ => return unknown,
            },
            _ => return unknown,
        };
        Ok(res)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::ScrollDown { n } => write!(f, "SCD {}", n),
            Instruction::Clear => write!(f, "CLS"),
            Instruction::Return => write!(f, "RET"),
            Instruction::ScrollRight => write!(f, "SCR"),
            Instruction::ScrollLeft => write!(f, "SCL"),
            Instruction::Exit => write!(f, "EXIT"),
            Instruction::LowRes => write!(f, "LOW"),
            Instruction::HighRes => write!(f, "HIGH"),
            Instruction::Jump { nnn } => write!(f, "JP {:#05X}", nnn),
            Instruction::Call { nnn } => write!(f, "CALL {:#05X}", nnn),
            Instruction::SkipEqConst { x, nn } => write!(f, "SE V{:X}, {:#04X}", x, nn),
            Instruction::SkipNotEqConst { x, nn } => write!(f, "SNE V{:X}, {:#04X}", x, nn),
            Instruction::SkipEqReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            Instruction::LoadConst { x, nn } => write!(f, "LD V{:X}, {:#04X}", x, nn),
            Instruction::AddConst { x, nn } => write!(f, "ADD V{:X}, {:#04X}", x, nn),
            Instruction::Alu { op, x, y } => write!(f, "{} V{:X}, V{:X}", op.mnemonic(), x, y),
            Instruction::SkipNotEqReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            Instruction::LoadIndex { nnn } => write!(f, "LD I, {:#05X}", nnn),
            // the register depends on the jump quirk
            Instruction::JumpOffset { nnn } => {
                write!(f, "JP V0/V{:X}, {:#05X}", nnn >> 8, nnn)
            }
            Instruction::Random { x, nn } => write!(f, "RND V{:X}, {:#04X}", x, nn),
            Instruction::Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Instruction::SkipKeyPressed { x } => write!(f, "SKP V{:X}", x),
            Instruction::SkipKeyNotPressed { x } => write!(f, "SKNP V{:X}", x),
            Instruction::LoadDelay { x } => write!(f, "LD V{:X}, DT", x),
            Instruction::WaitKey { x } => write!(f, "LD V{:X}, K", x),
            Instruction::SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            Instruction::SetSound { x } => write!(f, "LD ST, V{:X}", x),
            Instruction::AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            Instruction::LoadFont { x } => write!(f, "LD F, V{:X}", x),
            Instruction::LoadBigFont { x } => write!(f, "LD HF, V{:X}", x),
            Instruction::StoreBcd { x } => write!(f, "LD B, V{:X}", x),
            Instruction::StoreRegisters { x } => write!(f, "LD [I], V{:X}", x),
            Instruction::LoadRegisters { x } => write!(f, "LD V{:X}, [I]", x),
            Instruction::StoreFlags { x } => write!(f, "LD R, V{:X}", x),
            Instruction::LoadFlags { x } => write!(f, "LD V{:X}, R", x),
        }
    }
}

/// Will disassemble the data into `(address, opcode, mnemonic)` triples, the
/// address being relative to `offset`. Undecodable words are returned as `None`.
pub fn disassemble(data: &[u8], offset: usize) -> Vec<(usize, Opcode, Option<Instruction>)> {
    (0..data.len())
        .step_by(memory::opcodes::SIZE)
        .filter_map(|i| build_opcode(data, i).ok().map(|opcode| (i, opcode)))
        .map(|(i, opcode)| (offset + i, opcode, Instruction::try_from(opcode).ok()))
        .collect()
}

use thiserror::Error;

use crate::opcode::Opcode;

/// Raised while executing a single instruction. None of these are fatal, the
/// instruction that caused them has been skipped.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum ProcessError {
    #[error("Invalid opcode state '{0}'.")]
    Opcode(#[from] OpcodeError),
    #[error("Invalid stack state '{0}'.")]
    Stack(#[from] StackError),
    #[error("Access of {len} bytes at {address:#06X} leaves the address space.")]
    AddressOverflow { address: usize, len: usize },
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum OpcodeError {
    #[error("An unsupported opcode was used {0:#06X?}.")]
    Unknown(Opcode),
    #[error("Pointer location invalid there can not be an opcode at {pointer}, if data len is {len}")]
    MemoryInvalid { pointer: usize, len: usize },
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum StackError {
    #[error("Stack is full!")]
    Overflow,
    #[error("Stack is empty!")]
    Underflow,
}

/// Returned when a rom can not be written into memory.
#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum LoadError {
    #[error("Rom of {len} bytes does not fit at {address:#06X}, only {available} bytes are available.")]
    TooLarge {
        address: usize,
        len: usize,
        available: usize,
    },
    #[error("Load address {0:#06X} is outside of the memory.")]
    AddressOutOfRange(usize),
}

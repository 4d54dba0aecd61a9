//! The behavioural differences between the historical interpreters that
//! a rom may depend on. Selected once, when the chipset is built.

/// The selectable quirks of the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quirks {
    /// `8XY6` / `8XYE` shift `VX` in place instead of loading the shifted `VY`.
    pub shift_ignores_vy: bool,
    /// `FX55` / `FX65` leave `I` pointing behind the last register accessed.
    pub store_load_increments_index: bool,
    /// `BNNN` is read as `BXNN` and jumps to `XNN + VX`.
    pub jump_quirk: bool,
    /// Enables the super chip instruction set, the `128x64` mode and `16x16` sprites.
    pub extended_sprite_support: bool,
    /// `FX1E` raises `VF` once `I + VX >= 0xFFF` instead of `> 0xFFF`.
    pub index_overflow_inclusive: bool,
}

impl Quirks {
    /// The behaviour of the original COSMAC VIP interpreter.
    pub const fn cosmac() -> Self {
        Self {
            shift_ignores_vy: false,
            store_load_increments_index: true,
            jump_quirk: false,
            extended_sprite_support: false,
            index_overflow_inclusive: false,
        }
    }

    /// The behaviour of the HP48 super chip interpreter.
    pub const fn schip() -> Self {
        Self {
            shift_ignores_vy: true,
            store_load_increments_index: false,
            jump_quirk: true,
            extended_sprite_support: true,
            index_overflow_inclusive: false,
        }
    }

    /// What most roms written today expect.
    pub const fn modern() -> Self {
        Self {
            shift_ignores_vy: true,
            store_load_increments_index: false,
            jump_quirk: false,
            extended_sprite_support: true,
            index_overflow_inclusive: false,
        }
    }
}

impl Default for Quirks {
    fn default() -> Self {
        Self::modern()
    }
}

//! Rom container and the embedded default rom.

/// Shown when the host has no rom to run. Draws the hex digits `0-F` in two
/// rows and idles afterwards.
const SPLASH: [u8; 38] = [
    0x00, 0xE0, // CLS
    0x62, 0x00, // LD V2, 0x00
    0x60, 0x04, // LD V0, 0x04
    0x61, 0x06, // LD V1, 0x06
    0xF2, 0x29, // LD F, V2
    0xD0, 0x15, // DRW V0, V1, 5
    0x72, 0x01, // ADD V2, 0x01
    0x70, 0x07, // ADD V0, 0x07
    0x32, 0x08, // SE V2, 0x08
    0x12, 0x08, // JP 0x208
    0x60, 0x04, // LD V0, 0x04
    0x61, 0x14, // LD V1, 0x14
    0xF2, 0x29, // LD F, V2
    0xD0, 0x15, // DRW V0, V1, 5
    0x72, 0x01, // ADD V2, 0x01
    0x70, 0x07, // ADD V0, 0x07
    0x32, 0x10, // SE V2, 0x10
    0x12, 0x18, // JP 0x218
    0x12, 0x24, // JP 0x224
];

/// The address the splash rom idles at once everything is drawn.
pub const SPLASH_IDLE: usize = 0x224;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Represents a single rom with it's information
pub struct Rom {
    /// The rom name
    name: String,
    /// The raw content, no header
    data: Box<[u8]>,
}

impl Rom {
    /// Will generate a new rom based of the given data
    pub fn new(name: &str, data: impl Into<Box<[u8]>>) -> Self {
        Rom {
            name: name.to_string(),
            data: data.into(),
        }
    }

    /// The embedded default rom.
    pub fn splash() -> Self {
        Rom::new("SPLASH", &SPLASH[..])
    }

    /// Will return a slice internal values of the given data
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }

    /// Will return the name of the rom.
    pub fn get_name(&self) -> &str {
        &self.name
    }
}

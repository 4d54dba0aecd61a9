use crate::{definitions::keyboard, display::Framebuffer};

#[cfg_attr(test, mockall::automock)]
/// The traits responsible for the display based code
pub trait DisplayCommands {
    /// Will display all the pixels of the given frame
    fn display(&mut self, frame: &Framebuffer);
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for reading the host keyboard once per frame
pub trait KeyboardCommands {
    fn get_keyboard(&mut self) -> [bool; keyboard::SIZE];
}

/// Will store the state of the internal keyboard
///
/// Input is done with a hex keyboard that has 16 keys ranging `0-F`. The `8`, `4`, `6`, and
/// `2` keys are typically used for directional input. Three opcodes are used to detect input.
/// One skips an instruction if a specific key is pressed, while another does the same if a
/// specific key is not pressed. The third waits for a key press, and then stores it in one of
/// the data registers.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    keys: [bool; keyboard::SIZE],
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard::default()
    }

    pub(crate) fn reset(&mut self) {
        self.keys = [false; keyboard::SIZE];
    }

    /// Will set the value of the given key, indices outside of `0x0..=0xF` are ignored.
    pub fn set_key(&mut self, key: usize, to: bool) {
        match self.keys.get_mut(key) {
            Some(entry) => *entry = to,
            None => log::warn!("Ignoring state of unknown key {:#X}.", key),
        }
    }

    pub fn toggle_key(&mut self, key: usize) {
        let current = self.is_pressed(key);
        self.set_key(key, !current)
    }

    /// Will overwrite the state of all keys.
    pub fn set_mult(&mut self, keys: &[bool; keyboard::SIZE]) {
        self.keys.copy_from_slice(keys);
    }

    pub fn is_pressed(&self, key: usize) -> bool {
        self.keys.get(key).copied().unwrap_or(false)
    }

    pub fn get_keys(&self) -> &[bool] {
        &self.keys
    }

    /// The highest pressed key, if any.
    pub fn last_pressed(&self) -> Option<usize> {
        self.keys.iter().rposition(|&pressed| pressed)
    }
}

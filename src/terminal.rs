//! Crossterm backed host devices, the screen is drawn with half blocks so that
//! two pixel rows fit into a single terminal row.
use std::{
    io::{self, Stdout, Write},
    time::Duration,
};

use chip::{
    definitions::keyboard,
    devices::{DisplayCommands, KeyboardCommands},
    display::Framebuffer,
};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{self, ClearType},
};

/// The left-hand side of a qwerty keyboard, placed over the hex keypad layout
const KEYS: [[char; 4]; 4] = [
    ['1', '2', '3', '4'],
    ['q', 'w', 'e', 'r'],
    ['a', 's', 'd', 'f'],
    ['z', 'x', 'c', 'v'],
];

/// Terminals only report presses, a key counts as held for this many frames.
const HOLD_FRAMES: u8 = 6;

fn map_key(c: char) -> Option<usize> {
    let c = c.to_ascii_lowercase();
    KEYS.iter().zip(keyboard::LAYOUT.iter()).find_map(|(chars, keys)| {
        chars
            .iter()
            .position(|&mapped| mapped == c)
            .map(|column| keys[column])
    })
}

/// Puts the terminal into raw mode on an alternate screen, restored on drop.
pub struct Guard;

impl Guard {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(
            io::stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(ClearType::All)
        )?;
        Ok(Guard)
    }
}

impl Drop for Guard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

pub struct TerminalDisplay {
    stdout: Stdout,
    /// the width of the last drawn frame, a mode switch clears the screen
    width: usize,
    /// the row below the screen
    status_row: u16,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            width: 0,
            status_row: 0,
        }
    }

    fn draw(&mut self, frame: &Framebuffer) -> io::Result<()> {
        if frame.width() != self.width {
            self.width = frame.width();
            queue!(self.stdout, terminal::Clear(ClearType::All))?;
        }

        for y in (0..frame.height()).step_by(2) {
            let line: String = (0..frame.width())
                .map(|x| match (frame.get(x, y), frame.get(x, y + 1)) {
                    (true, true) => '█',
                    (true, false) => '▀',
                    (false, true) => '▄',
                    (false, false) => ' ',
                })
                .collect();
            queue!(self.stdout, cursor::MoveTo(0, (y / 2) as u16), Print(line))?;
        }
        self.status_row = (frame.height() / 2) as u16;
        self.stdout.flush()
    }

    /// Writes a single line of text below the screen.
    pub fn status(&mut self, text: &str) -> io::Result<()> {
        queue!(
            self.stdout,
            cursor::MoveTo(0, self.status_row),
            terminal::Clear(ClearType::CurrentLine),
            Print(text)
        )?;
        self.stdout.flush()
    }

    /// Rings the terminal bell.
    pub fn beep(&mut self) -> io::Result<()> {
        queue!(self.stdout, Print('\x07'))?;
        self.stdout.flush()
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayCommands for TerminalDisplay {
    fn display(&mut self, frame: &Framebuffer) {
        if let Err(err) = self.draw(frame) {
            log::error!("Could not draw the frame: {}", err);
        }
    }
}

#[derive(Default)]
pub struct TerminalKeyboard {
    /// the remaining frames every key counts as pressed
    held: [u8; keyboard::SIZE],
    quit: bool,
}

impl TerminalKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set once escape or `ctrl-c` was pressed.
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    fn press(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        match code {
            KeyCode::Esc => self.quit = true,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => self.quit = true,
            KeyCode::Char(c) => match map_key(c) {
                Some(key) => self.held[key] = HOLD_FRAMES,
                None => log::debug!("Ignoring unmapped key '{}'.", c),
            },
            _ => {}
        }
    }

    fn poll_events(&mut self) -> io::Result<()> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read()?
            {
                if kind != KeyEventKind::Release {
                    self.press(code, modifiers);
                }
            }
        }
        Ok(())
    }
}

impl KeyboardCommands for TerminalKeyboard {
    fn get_keyboard(&mut self) -> [bool; keyboard::SIZE] {
        self.held
            .iter_mut()
            .for_each(|frames| *frames = frames.saturating_sub(1));

        if let Err(err) = self.poll_events() {
            log::error!("Could not read the terminal input: {}", err);
            self.quit = true;
        }

        let mut keys = [false; keyboard::SIZE];
        for (key, frames) in keys.iter_mut().zip(self.held.iter()) {
            *key = *frames > 0;
        }
        keys
    }
}

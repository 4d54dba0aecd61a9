//! The pretty print implementation of the [`ChipSet`](super::ChipSet), used by the
//! dump output of the frontend.
//! This implementation was split up into this file for smaller file sizes and higher
//! cohesion.

use std::fmt;

use once_cell::sync::Lazy;

use super::ChipSet;

/// The amount of entries printed per row, has to be bigger than 2.
const HEX_PRINT_STEP: usize = 8;

const END_OF_LINE: char = '\n';
const INDENT_FILLAMENT: char = '\t';
const INDENT_SIZE: usize = 2;

/// Will add an indent post processing
fn indent_helper(text: &mut String, indent: usize) {
    for _ in 0..indent {
        text.push(INDENT_FILLAMENT);
    }
}

/// The length of a single printed integer, prefix included.
static INTEGER_LEN: Lazy<usize> = Lazy::new(|| integer_print::formatter(0u8).len());

/// A line length, a bit bigger than the actual line will be.
static LENLINE: Lazy<usize> = Lazy::new(|| {
    INDENT_SIZE + HEX_PRINT_STEP * (*INTEGER_LEN + 1) + 1 + pointer_print::formatter(0, 0).len()
});

/// Handles all the printing of the pointer values.
mod pointer_print {
    /// will format the pointers according to definition
    pub(super) fn formatter(from: usize, to: usize) -> String {
        format!("{:#06X} - {:#06X} :", from, to)
    }
}

/// handles printing of any and all of integers.
mod integer_print {
    use super::{indent_helper, pointer_print, END_OF_LINE, HEX_PRINT_STEP};
    use num_traits::Unsigned;
    use std::fmt;

    /// will format all integer types
    pub(super) fn formatter<T>(data: T) -> String
    where
        T: fmt::UpperHex + Unsigned + Copy,
    {
        format!("{:#06X}", data)
    }

    /// will pretty print all the integer data given
    pub(super) fn printer<T>(data: &[T], indent: usize) -> String
    where
        T: fmt::UpperHex + Unsigned + Copy,
    {
        let mut res = String::with_capacity(*super::LENLINE * (data.len() / HEX_PRINT_STEP + 1));
        for (row, chunk) in data.chunks(HEX_PRINT_STEP).enumerate() {
            let from = row * HEX_PRINT_STEP;
            indent_helper(&mut res, indent);
            res.push_str(&pointer_print::formatter(from, from + chunk.len() - 1));

            for entry in chunk {
                res.push(' ');
                res.push_str(&formatter(*entry));
            }
            res.push(END_OF_LINE);
        }
        // Remove unneeded new line
        res.pop();
        res
    }
}

/// Handles all the opcode prints
mod opcode_print {
    use super::{indent_helper, integer_print, pointer_print, END_OF_LINE, HEX_PRINT_STEP};
    use crate::{definitions::memory, opcode::Opcode};
    use once_cell::sync::Lazy;

    /// As an opcode is two bytes long, this many bytes make up a row.
    const POINTER_INCREMENT: usize = HEX_PRINT_STEP * memory::opcodes::SIZE;
    /// The values that are used when there are at least two rows of zeros.
    const FILLER_BASE: &str = "...";

    /// The line used, in the case that there is at least one row of only zeros.
    static ZERO_FILLER: Lazy<String> = Lazy::new(|| {
        let formatted = integer_print::formatter(0u16);
        let length = formatted.len() * (HEX_PRINT_STEP - 2) + (HEX_PRINT_STEP - 1)
            - FILLER_BASE.len();
        let filler = " ".repeat(length / 2);
        format!(
            "{}{}{}{}{}",
            formatted, filler, FILLER_BASE, filler, formatted
        )
    });

    /// a single row of opcodes
    struct Row {
        from: usize,
        to: usize,
        data: Vec<Opcode>,
        only_null: bool,
    }

    /// will pretty print the content of the raw memory, consecutive rows
    /// holding only zeros are merged
    pub(super) fn printer(memory: &[u8], indent: usize) -> String {
        let mut rows: Vec<Row> = Vec::with_capacity(memory.len() / POINTER_INCREMENT);

        for (index, chunk) in memory.chunks(POINTER_INCREMENT).enumerate() {
            let from = index * POINTER_INCREMENT;
            let data: Vec<Opcode> = chunk
                .chunks_exact(memory::opcodes::SIZE)
                .map(|pair| Opcode::from_be_bytes([pair[0], pair[1]]))
                .collect();
            let only_null = data.iter().all(|&opcode| opcode == 0);
            let mut row = Row {
                from,
                to: from + chunk.len() - 1,
                data,
                only_null,
            };

            if only_null {
                if let Some(last) = rows.last() {
                    if last.only_null {
                        row.from = last.from;
                        rows.pop();
                    }
                }
            }
            rows.push(row);
        }

        let mut string = String::with_capacity((*super::LENLINE + 1) * rows.len());
        for row in rows {
            indent_helper(&mut string, indent);
            string.push_str(&pointer_print::formatter(row.from, row.to));
            string.push(' ');
            if row.only_null {
                string.push_str(&ZERO_FILLER);
            } else {
                let line: Vec<String> = row.data.into_iter().map(integer_print::formatter).collect();
                string.push_str(&line.join(" "));
            }
            string.push(END_OF_LINE);
        }
        string.pop();
        string
    }
}

/// Handles all the boolean data types.
mod bool_print {
    use super::{indent_helper, pointer_print, END_OF_LINE, HEX_PRINT_STEP};

    /// keeps the correct format length
    fn formatter(value: bool) -> String {
        format!("{:<width$}", value, width = *super::INTEGER_LEN)
    }

    /// will pretty print all the boolean data given
    pub(super) fn printer(data: &[bool], indent: usize) -> String {
        let mut res = String::with_capacity(*super::LENLINE * (data.len() / HEX_PRINT_STEP + 1));

        for (row, chunk) in data.chunks(HEX_PRINT_STEP).enumerate() {
            let from = row * HEX_PRINT_STEP;
            indent_helper(&mut res, indent);
            res.push_str(&pointer_print::formatter(from, from + chunk.len() - 1));

            let line: Vec<String> = chunk.iter().map(|&value| formatter(value)).collect();
            res.push(' ');
            res.push_str(line.join(" ").trim_end());
            res.push(END_OF_LINE);
        }
        res.pop();
        res
    }
}

/// indents a single value
fn single(value: &str) -> String {
    let mut line = String::with_capacity(INDENT_SIZE + value.len());
    indent_helper(&mut line, INDENT_SIZE);
    line.push_str(value);
    line
}

impl fmt::Display for ChipSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let snapshot = self.snapshot();

        let nam = single(self.rom_name().unwrap_or("-"));
        let opc = single(&format!(
            "{} {}",
            integer_print::formatter(snapshot.opcode),
            snapshot.mnemonic()
        ));
        let prc = single(&integer_print::formatter(snapshot.program_counter));
        let ind = single(&integer_print::formatter(snapshot.index_register));
        let tim = single(&format!(
            "delay {} sound {}",
            integer_print::formatter(snapshot.delay_timer),
            integer_print::formatter(snapshot.sound_timer)
        ));
        let mem = opcode_print::printer(&self.memory, INDENT_SIZE);
        let key = bool_print::printer(self.get_keyboard(), INDENT_SIZE);
        let sta = integer_print::printer(&snapshot.stack[..], INDENT_SIZE);
        let reg = integer_print::printer(&snapshot.registers[..], INDENT_SIZE);

        write!(
            f,
            "Chipset {{\n\
                \tProgram Name :\n{}\n\
                \tOpcode :\n{}\n\
                \tProgram Counter :\n{}\n\
                \tIndex :\n{}\n\
                \tTimers :\n{}\n\
                \tMemory :\n{}\n\
                \tKeyboard :\n{}\n\
                \tStack :\n{}\n\
                \tRegister :\n{}\n\
                }}",
            nam, opc, prc, ind, tim, mem, key, sta, reg
        )
    }
}

//! Console display adapter.
//!
//! Mirrors the 16x2 LCD into a pair of fixed-width line buffers and logs
//! a line whenever its content changes. Used on the bench board, which
//! has no LCD fitted, and by the host simulator.

use log::info;

use crate::app::ports::{DisplayPort, LCD_COLS};

type Line = heapless::String<LCD_COLS>;

pub struct ConsoleDisplay {
    lines: [Line; 2],
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self {
            lines: [Self::blank(), Self::blank()],
        }
    }

    fn blank() -> Line {
        let mut line = Line::new();
        for _ in 0..LCD_COLS {
            let _ = line.push(' ');
        }
        line
    }

    /// Current content of `row`, padded to [`LCD_COLS`].
    pub fn line(&self, row: u8) -> &str {
        self.lines.get(row as usize).map_or("", |l| l.as_str())
    }
}

impl Default for ConsoleDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayPort for ConsoleDisplay {
    fn write_line(&mut self, text: &str, row: u8) {
        let Some(slot) = self.lines.get_mut(row as usize) else {
            return;
        };
        let mut padded = Line::new();
        for c in text.chars().chain(core::iter::repeat(' ')).take(LCD_COLS) {
            // Only fails on multi-byte characters at the end of the line.
            if padded.push(c).is_err() {
                break;
            }
        }
        if *slot != padded {
            info!("LCD[{}] |{}|", row, padded);
            *slot = padded;
        }
    }
}

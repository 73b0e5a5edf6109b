//! Keypad number entry shared by the numeric set screens.

/// Maximum characters accepted, including a decimal point.
pub const ENTRY_MAX_LEN: usize = 10;

/// Digits typed so far. `'*'` stands in for the decimal point since the
/// keypad has none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberEntry {
    text: heapless::String<ENTRY_MAX_LEN>,
    allow_fraction: bool,
}

impl NumberEntry {
    /// Entry that accepts a fractional part.
    pub fn decimal() -> Self {
        Self {
            text: heapless::String::new(),
            allow_fraction: true,
        }
    }

    /// Entry restricted to whole numbers.
    pub fn integer() -> Self {
        Self {
            text: heapless::String::new(),
            allow_fraction: false,
        }
    }

    /// Apply an editing key. Returns `false` if the key is not an edit key
    /// or the entry is full.
    pub fn push_key(&mut self, key: char) -> bool {
        match key {
            '0'..='9' => self.text.push(key).is_ok(),
            '*' if self.allow_fraction && !self.text.contains('.') => {
                if self.text.is_empty() && self.text.push('0').is_err() {
                    return false;
                }
                self.text.push('.').is_ok()
            }
            'B' => self.text.pop().is_some(),
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Parsed value, or `None` while nothing has been typed.
    pub fn value(&self) -> Option<f32> {
        if self.text.is_empty() {
            return None;
        }
        self.text.parse().ok()
    }

    /// Whole-number value, or `None` if empty or too large for `u32`.
    pub fn whole(&self) -> Option<u32> {
        let digits = self.text.split('.').next()?;
        if digits.is_empty() {
            return None;
        }
        digits.parse().ok()
    }
}

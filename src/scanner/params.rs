//! Control sequence parameters.
//!
//! Parameters are separated by `;` (or `:`). A parameter with no digits is
//! "unset" and each code resolves it to its own default.

use std::fmt;

/// Parameters beyond this count are dropped
pub const MAX_PARAMS: usize = 32;

/// Largest value a single parameter can hold; more digits saturate
pub const MAX_PARAM_VALUE: u16 = u16::MAX;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: Vec<Option<u16>>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter; `None` means unset
    pub fn push(&mut self, value: Option<u16>) {
        if self.values.len() < MAX_PARAMS {
            self.values.push(value);
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The raw parameter, `None` if unset or absent
    pub fn get(&self, index: usize) -> Option<u16> {
        self.values.get(index).copied().flatten()
    }

    pub fn get_or(&self, index: usize, default: u16) -> u16 {
        self.get(index).unwrap_or(default)
    }

    /// A repeat count or 1-based coordinate: unset and 0 both mean 1
    pub fn count(&self, index: usize) -> u16 {
        match self.get(index) {
            Some(0) | None => 1,
            Some(v) => v,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<u16>> + '_ {
        self.values.iter().copied()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for value in &self.values {
            match value {
                Some(v) => list.entry(v),
                None => list.entry(&"unset"),
            };
        }
        list.finish()
    }
}

//! Fixed-capacity parameter table
//!
//! RAM-only implementation of [`ParameterStore`]. Parameters keep their
//! registration order, which is also the index order streamed to the GCS.

use super::{ParamStoreError, ParameterStore, PARAM_ID_LEN};
use heapless::{String, Vec};

/// Single parameter (name and current value)
#[derive(Debug, Clone, PartialEq)]
pub struct ParamEntry {
    /// Parameter name (max 16 bytes, MAVLink standard)
    pub name: String<PARAM_ID_LEN>,
    /// Current value
    pub value: f32,
}

/// Parameter table with room for `N` entries
#[derive(Debug, Default)]
pub struct ParameterTable<const N: usize> {
    entries: Vec<ParamEntry, N>,
}

impl<const N: usize> ParameterTable<N> {
    /// Create an empty table
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a parameter and return its index
    pub fn register(&mut self, name: &str, value: f32) -> Result<u16, ParamStoreError> {
        if name.len() > PARAM_ID_LEN {
            return Err(ParamStoreError::NameTooLong);
        }
        if self.index_of(name).is_some() {
            return Err(ParamStoreError::DuplicateName);
        }

        let name = String::try_from(name).map_err(|_| ParamStoreError::NameTooLong)?;
        let index = self.entries.len() as u16;
        self.entries
            .push(ParamEntry { name, value })
            .map_err(|_| ParamStoreError::Full)?;
        Ok(index)
    }

    /// Find the index of a parameter by name
    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.entries
            .iter()
            .position(|entry| entry.name.as_str() == name)
            .map(|index| index as u16)
    }

    /// Get a parameter by index
    pub fn get(&self, index: u16) -> Option<&ParamEntry> {
        self.entries.get(index as usize)
    }

    /// Set the value of a parameter by index
    pub fn set(&mut self, index: u16, value: f32) -> Result<(), ParamStoreError> {
        let count = self.count();
        let entry = self
            .entries
            .get_mut(index as usize)
            .ok_or(ParamStoreError::IndexOutOfRange { index, count })?;
        entry.value = value;
        Ok(())
    }

    fn entry(&self, index: u16) -> Result<&ParamEntry, ParamStoreError> {
        self.get(index).ok_or(ParamStoreError::IndexOutOfRange {
            index,
            count: self.count(),
        })
    }
}

impl<const N: usize> ParameterStore for ParameterTable<N> {
    fn count(&self) -> u16 {
        self.entries.len() as u16
    }

    fn value(&self, index: u16) -> Result<f32, ParamStoreError> {
        self.entry(index).map(|entry| entry.value)
    }

    fn name(&self, index: u16) -> Result<&str, ParamStoreError> {
        self.entry(index).map(|entry| entry.name.as_str())
    }
}

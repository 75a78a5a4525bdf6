//! Parameter store interface
//!
//! The telemetry dispatcher reads parameters by index when it emits PARAM_VALUE.
//! The store owns its own bounds checking: an index past `count()` is reported as
//! [`ParamStoreError::IndexOutOfRange`] rather than read out of bounds.

pub mod registry;

pub use registry::{ParamEntry, ParameterTable};

/// Maximum parameter name length on the wire (MAVLink `param_id`)
pub const PARAM_ID_LEN: usize = 16;

/// Read-only, index-addressed view of the parameter set.
pub trait ParameterStore {
    /// Total number of parameters
    fn count(&self) -> u16;

    /// Value of the parameter at `index`, as a 32-bit float
    fn value(&self, index: u16) -> Result<f32, ParamStoreError>;

    /// Name of the parameter at `index` (at most [`PARAM_ID_LEN`] bytes)
    fn name(&self, index: u16) -> Result<&str, ParamStoreError>;
}

impl<P: ParameterStore + ?Sized> ParameterStore for &P {
    fn count(&self) -> u16 {
        (**self).count()
    }

    fn value(&self, index: u16) -> Result<f32, ParamStoreError> {
        (**self).value(index)
    }

    fn name(&self, index: u16) -> Result<&str, ParamStoreError> {
        (**self).name(index)
    }
}

/// Errors from parameter store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParamStoreError {
    /// Requested index is not below the parameter count
    IndexOutOfRange { index: u16, count: u16 },
    /// Name longer than the 16-byte wire field
    NameTooLong,
    /// A parameter with this name is already registered
    DuplicateName,
    /// Table capacity reached
    Full,
}

impl core::fmt::Display for ParamStoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParamStoreError::IndexOutOfRange { index, count } => {
                write!(f, "parameter index {} out of range (count {})", index, count)
            }
            ParamStoreError::NameTooLong => write!(f, "parameter name exceeds 16 bytes"),
            ParamStoreError::DuplicateName => write!(f, "parameter name already registered"),
            ParamStoreError::Full => write!(f, "parameter table full"),
        }
    }
}

//! Occupation state of a control component.
//!
//! Integer codes are part of the external contract and must not change.

use crate::model::InvalidEnumValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OccupationState {
    Free,
    Occupied,
    Priority,
    Local,
}

impl OccupationState {
    /// Returns the integer code of this state.
    pub fn value(self) -> i32 {
        match self {
            Self::Free => 0,
            Self::Occupied => 1,
            Self::Priority => 2,
            Self::Local => 3,
        }
    }

    /// Decodes a state from its integer code.
    ///
    /// # Errors
    /// - Returns `InvalidEnumValue` for any code outside `0..=3`.
    pub fn from_value(value: i32) -> Result<Self, InvalidEnumValue> {
        match value {
            0 => Ok(Self::Free),
            1 => Ok(Self::Occupied),
            2 => Ok(Self::Priority),
            3 => Ok(Self::Local),
            other => Err(InvalidEnumValue::new("occupation state", other.to_string())),
        }
    }
}

impl TryFrom<i32> for OccupationState {
    type Error = InvalidEnumValue;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<OccupationState> for i32 {
    fn from(value: OccupationState) -> Self {
        value.value()
    }
}

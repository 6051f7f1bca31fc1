use rand::Rng;

use crate::error::GridError;

pub const DEFAULT_FOUR_PROBABILITY: f64 = 0.4;

/// A numbered tile. The value is always a power of two, at least 2.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    value: u32,
    /// Set by the connectivity pass; meaningless outside a settle cycle.
    pub(crate) supported: bool,
}

impl Tile {
    pub fn new(value: u32) -> Result<Self, GridError> {
        if value < 2 || !value.is_power_of_two() {
            return Err(GridError::InvalidTileValue(value));
        }
        Ok(Self {
            value,
            supported: false,
        })
    }

    /// A fresh spawn tile: 4 with `four_probability`, otherwise 2.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, four_probability: f64) -> Self {
        let value = if rng.gen_bool(four_probability.clamp(0.0, 1.0)) {
            4
        } else {
            2
        };
        Self {
            value,
            supported: false,
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    /// Doubles the value in place and returns the new value. A tile already
    /// at the largest `u32` power of two is left as is and yields `None`.
    pub(crate) fn double(&mut self) -> Option<u32> {
        self.value = self.value.checked_mul(2)?;
        Some(self.value)
    }
}

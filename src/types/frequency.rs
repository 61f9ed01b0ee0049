//! Sampling frequency of the hourly slots requested from WorldWeatherOnline.

use crate::error::WwoError;
use std::fmt;

const HOURS_PER_DAY: u32 = 24;

/// Number of hours between two samples within one day (the provider's `tp` parameter).
///
/// Valid values are `1..=24`. Values that do not divide 24 are accepted; the provider
/// decides which slots it returns and the flattener keeps at most
/// [`Frequency::slots_per_day`] of them (the floor of `24 / hours`).
///
/// # Examples
///
/// ```
/// use wwo_hist::Frequency;
///
/// let three_hourly = Frequency::new(3).unwrap();
/// assert_eq!(three_hourly.slots_per_day(), 8);
/// assert!(Frequency::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frequency(u32);

impl Frequency {
    pub fn new(hours: u32) -> Result<Self, WwoError> {
        if hours == 0 || hours > HOURS_PER_DAY {
            return Err(WwoError::invalid_argument(format!(
                "frequency must be between 1 and {HOURS_PER_DAY} hours, got {hours}"
            )));
        }
        Ok(Self(hours))
    }

    pub fn hours(self) -> u32 {
        self.0
    }

    pub fn slots_per_day(self) -> usize {
        (HOURS_PER_DAY / self.0) as usize
    }

    /// Whether 24 is an exact multiple of this frequency.
    pub fn divides_day(self) -> bool {
        HOURS_PER_DAY % self.0 == 0
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_per_day() {
        assert_eq!(Frequency::new(1).unwrap().slots_per_day(), 24);
        assert_eq!(Frequency::new(6).unwrap().slots_per_day(), 4);
        assert_eq!(Frequency::new(24).unwrap().slots_per_day(), 1);
    }

    #[test]
    fn test_non_divisor_is_floored() {
        let five = Frequency::new(5).unwrap();
        assert!(!five.divides_day());
        assert_eq!(five.slots_per_day(), 4);
    }

    #[test]
    fn test_out_of_bounds_is_invalid_argument() {
        assert!(matches!(
            Frequency::new(0),
            Err(WwoError::InvalidArgument { .. })
        ));
        assert!(matches!(
            Frequency::new(25),
            Err(WwoError::InvalidArgument { .. })
        ));
    }
}

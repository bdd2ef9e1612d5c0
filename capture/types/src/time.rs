/*!
    Timestamp and time base types.
*/

/**
    A rational number, used for stream time bases and frame rates.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rational {
    /// Numerator.
    pub num: i32,
    /// Denominator.
    pub den: i32,
}

impl Rational {
    /**
        Create a new rational.
    */
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /**
        Convert to a float. Returns 0.0 for a zero denominator.
    */
    pub fn to_f64(self) -> f64 {
        if self.den == 0 {
            0.0
        } else {
            self.num as f64 / self.den as f64
        }
    }
}

/**
    A presentation timestamp in stream time-base units.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pts(pub i64);

/**
    A duration in stream time-base units.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MediaDuration(pub i64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rational_to_f64() {
        assert_eq!(Rational::new(30, 1).to_f64(), 30.0);
        assert!((Rational::new(30000, 1001).to_f64() - 29.97).abs() < 0.01);
        assert_eq!(Rational::new(1, 0).to_f64(), 0.0);
    }
}

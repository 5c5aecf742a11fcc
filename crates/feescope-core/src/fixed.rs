use fixed::types::U64F64;

/// U64.64 fixed-point: 64 integer bits, 64 fractional bits.
///
/// Every `u64` complexity value converts exactly, and dividing by a time step
/// of at least one second never overflows.
pub type Rate = U64F64;

/// Per-second rate `amount / seconds`. A zero divisor is treated as one second.
#[inline]
pub fn rate_per_second(amount: u64, seconds: u64) -> Rate {
    Rate::from_num(amount) / Rate::from_num(seconds.max(1))
}

/// Truncate a rate to whole units per second.
#[inline]
pub fn rate_to_u64(rate: Rate) -> u64 {
    rate.to_num::<u64>()
}

/// Convert a rate to f64. Use only for display.
#[inline]
pub fn rate_to_f64(rate: Rate) -> f64 {
    rate.to_num::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_integer_rates() {
        assert_eq!(rate_to_u64(rate_per_second(10, 2)), 5);
        assert_eq!(rate_to_u64(rate_per_second(10, 1)), 10);
    }

    #[test]
    fn zero_seconds_counts_as_one() {
        assert_eq!(rate_per_second(7, 0), rate_per_second(7, 1));
    }

    #[test]
    fn truncates_toward_zero() {
        assert_eq!(rate_to_u64(rate_per_second(10, 3)), 3);
        assert_eq!(rate_to_u64(rate_per_second(1, 2)), 0);
    }

    #[test]
    fn max_value_converts_exactly() {
        assert_eq!(rate_to_u64(rate_per_second(u64::MAX, 1)), u64::MAX);
    }

    #[test]
    fn ordering_follows_value() {
        assert!(rate_per_second(1, 3) < rate_per_second(1, 2));
        assert_eq!(rate_to_f64(rate_per_second(3, 2)), 1.5);
    }
}

//! Integer approximation of `factor * e^(numerator / denominator)`.

use feescope_core::policy::PolicyError;

/// Taylor-series approximation of `factor * e^(numerator / denominator)`.
///
/// Sums `factor * (numerator / denominator)^i / i!` term by term with integer
/// division until a term rounds to zero. Deterministic across platforms.
/// Fails on a zero denominator, and on overflow instead of saturating.
pub fn fake_exponential(factor: u64, numerator: u64, denominator: u64) -> Result<u64, PolicyError> {
    if denominator == 0 {
        return Err(PolicyError::invalid("exponential denominator must be non-zero"));
    }
    let overflow = || PolicyError::overflow("computing exponential price");

    let numerator = u128::from(numerator);
    let denominator = u128::from(denominator);
    let mut output: u128 = 0;
    let mut term = u128::from(factor) * denominator;
    let mut i: u128 = 1;
    while term > 0 {
        output = output.checked_add(term).ok_or_else(overflow)?;
        term = term.checked_mul(numerator).ok_or_else(overflow)? / (denominator * i);
        i += 1;
    }
    u64::try_from(output / denominator).map_err(|_| overflow())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_values() {
        let cases = [
            (1, 0, 1, 1),
            (38493, 0, 1000, 38493),
            (0, 1234, 2345, 0),
            (1, 2, 1, 6),
            (1, 4, 2, 6),
            (1, 3, 1, 16),
            (1, 6, 2, 18),
            (1, 4, 1, 49),
            (1, 8, 2, 50),
            (10, 8, 2, 542),
            (11, 8, 2, 596),
            (1, 5, 1, 136),
            (1, 5, 2, 11),
            (2, 5, 2, 23),
            (1, 50_000_000, 2_225_652, 5_709_098_764),
        ];
        for (factor, numerator, denominator, expected) in cases {
            assert_eq!(
                fake_exponential(factor, numerator, denominator).unwrap(),
                expected,
                "fake_exponential({factor}, {numerator}, {denominator})"
            );
        }
    }

    #[test]
    fn zero_excess_is_identity() {
        assert_eq!(fake_exponential(10, 0, 100_000).unwrap(), 10);
    }

    #[test]
    fn one_denominator_of_excess_is_about_e() {
        assert_eq!(fake_exponential(10, 100_000, 100_000).unwrap(), 27);
        assert_eq!(fake_exponential(10, 200_000, 100_000).unwrap(), 73);
    }

    #[test]
    fn zero_denominator_is_a_config_error() {
        assert!(matches!(
            fake_exponential(1, 1, 0),
            Err(PolicyError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn huge_exponent_overflows_explicitly() {
        assert!(matches!(
            fake_exponential(u64::MAX, 100, 1),
            Err(PolicyError::Overflow { .. })
        ));
    }
}

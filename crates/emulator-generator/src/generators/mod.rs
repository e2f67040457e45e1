//! Concrete record generators, one module per domain.

pub mod transaction;

/// Round to two decimal places, the precision used for currency amounts.
pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(12.345_6), 12.35);
        assert_eq!(round_cents(0.004), 0.0);
        assert_eq!(round_cents(9999.999), 10000.0);
    }
}

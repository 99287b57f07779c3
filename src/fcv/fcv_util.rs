/// Bytes needed to bring `offset` up to the next 4-byte boundary.
pub(crate) fn padding_to_align4(offset: u64) -> u64 {
    (4 - offset % 4) % 4
}

/// Rounds half away from zero to `digits` decimal places.
pub(crate) fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_lands_on_boundary() {
        for len in 0..64u64 {
            let padding = padding_to_align4(len);
            assert!(padding < 4);
            assert_eq!((len + padding) % 4, 0);
        }
        // 1 node: 3 header + 2 table + 1 id
        assert_eq!(padding_to_align4(6), 2);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 4), 1.2346);
        assert_eq!(round_to(-0.00004, 4), -0.0);
        assert_eq!(round_to(0.1234567, 6), 0.123457);
    }
}

//! Positional encoding of counter values over an [`Alphabet`].

use crate::domain::entities::Alphabet;

/// Encodes `value` in the radix of `alphabet`, most significant symbol first,
/// left-padded with the zero symbol to at least `min_len` symbols.
///
/// With the base62 alphabet and `min_len = 6`, the first `62^6` values all
/// encode to six symbols; the seventh symbol appears only after that.
///
/// A single-symbol alphabet has no positional notation: every value encodes to
/// the same padded code.
///
/// # Examples
///
/// ```ignore
/// let base62 = Alphabet::base62();
/// assert_eq!(encode(0, &base62, 6), "000000");
/// assert_eq!(encode(61, &base62, 1), "z");
/// assert_eq!(encode(62, &base62, 1), "10");
/// ```
pub fn encode(value: u64, alphabet: &Alphabet, min_len: usize) -> String {
    let radix = alphabet.len() as u64;
    let zero = alphabet.symbol(0);

    if radix < 2 {
        return std::iter::repeat_n(zero, min_len.max(1)).collect();
    }

    // u64::MAX needs 11 base62 digits and 64 base2 digits.
    let mut digits = Vec::with_capacity(64);
    let mut rest = value;
    loop {
        digits.push(alphabet.symbol((rest % radix) as usize));
        rest /= radix;
        if rest == 0 {
            break;
        }
    }

    let padding = min_len.saturating_sub(digits.len());
    let mut encoded = String::with_capacity(padding + digits.len());
    encoded.extend(std::iter::repeat_n(zero, padding));
    encoded.extend(digits.iter().rev());
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_zero_is_padded() {
        assert_eq!(encode(0, &Alphabet::base62(), 6), "000000");
        assert_eq!(encode(0, &Alphabet::base62(), 0), "0");
    }

    #[test]
    fn test_encode_digit_boundaries() {
        let base62 = Alphabet::base62();
        assert_eq!(encode(9, &base62, 1), "9");
        assert_eq!(encode(10, &base62, 1), "A");
        assert_eq!(encode(61, &base62, 1), "z");
        assert_eq!(encode(62, &base62, 1), "10");
        assert_eq!(encode(3_843, &base62, 1), "zz");
    }

    #[test]
    fn test_length_grows_only_after_keyspace_is_used() {
        let base62 = Alphabet::base62();
        let last_six = 62u64.pow(6) - 1;

        assert_eq!(encode(last_six, &base62, 6), "zzzzzz");
        assert_eq!(encode(last_six + 1, &base62, 6), "1000000");
    }

    #[test]
    fn test_encode_u64_max() {
        let encoded = encode(u64::MAX, &Alphabet::base62(), 6);
        assert_eq!(encoded, "LygHa16AHYF");
    }

    #[test]
    fn test_encode_binary_alphabet() {
        let binary = Alphabet::new("01").unwrap();
        assert_eq!(encode(5, &binary, 4), "0101");
        assert_eq!(encode(u64::MAX, &binary, 1).len(), 64);
    }

    #[test]
    fn test_single_symbol_alphabet_is_constant() {
        let unary = Alphabet::new("a").unwrap();
        assert_eq!(encode(0, &unary, 3), "aaa");
        assert_eq!(encode(12_345, &unary, 3), "aaa");
        assert_eq!(encode(7, &unary, 0), "a");
    }
}

//! IBM System/360 ↔ IEEE 754 double conversion.
//!
//! Transport files store numbers as big-endian IBM hexadecimal floats:
//! one sign bit, a 7-bit base-16 exponent biased by 64, and a 56-bit
//! fraction `0.F`. Missing values use a marker byte followed by zeros.

const FRACTION_MASK: u64 = 0x00ff_ffff_ffff_ffff;
const FRACTION_BITS: i32 = 56;

/// Convert an 8-byte IBM float into an IEEE double.
pub fn ibm_to_ieee(bytes: [u8; 8]) -> f64 {
    let raw = u64::from_be_bytes(bytes);
    let fraction = raw & FRACTION_MASK;
    if fraction == 0 {
        return 0.0;
    }
    let negative = raw >> 63 == 1;
    let exponent = ((raw >> 56) & 0x7f) as i32 - 64;
    let magnitude = fraction as f64 * 2f64.powi(4 * exponent - FRACTION_BITS);
    if negative { -magnitude } else { magnitude }
}

/// Convert an IEEE double into an 8-byte IBM float.
///
/// Values beyond the IBM range saturate; values below it flush to zero.
pub fn ieee_to_ibm(value: f64) -> [u8; 8] {
    if value == 0.0 || !value.is_finite() {
        return [0u8; 8];
    }
    let sign: u64 = if value < 0.0 { 1 << 63 } else { 0 };
    let mut fraction = value.abs();
    let mut exponent: i32 = 64;
    while fraction >= 1.0 {
        fraction /= 16.0;
        exponent += 1;
    }
    while fraction < 1.0 / 16.0 {
        fraction *= 16.0;
        exponent -= 1;
    }
    let mut mantissa = (fraction * 2f64.powi(FRACTION_BITS)).round() as u64;
    if mantissa > FRACTION_MASK {
        mantissa >>= 4;
        exponent += 1;
    }
    if exponent < 0 {
        return [0u8; 8];
    }
    if exponent > 127 {
        return (sign | (127u64 << 56) | FRACTION_MASK).to_be_bytes();
    }
    (sign | ((exponent as u64) << 56) | mantissa).to_be_bytes()
}

/// Returns true if the field holds one of the 28 SAS missing codes
/// (`.`, `._`, `.A`–`.Z`).
pub fn is_missing(bytes: &[u8]) -> bool {
    let Some((&first, rest)) = bytes.split_first() else {
        return true;
    };
    let marker = first == b'.' || first == b'_' || first.is_ascii_uppercase();
    marker && rest.iter().all(|&b| b == 0)
}

/// Standard missing value (`.`) as stored on disk.
pub const MISSING_STANDARD: [u8; 8] = [b'.', 0, 0, 0, 0, 0, 0, 0];

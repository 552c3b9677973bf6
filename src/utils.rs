//! The `utils` module provides the conversions between hexadecimal strings and
//! byte buffers used by the record codec.
//!
//! Output is always upper-case; input is accepted in either case.

use crate::error::UniversalHexError;

/// Convert a string of hexadecimal characters into bytes.
///
/// # Errors
/// Returns an error if the string length is odd or if it contains non-hex
/// characters.
///
/// # Example
/// ```
/// use universalhexlib::hex_str_to_bytes;
///
/// let bytes = hex_str_to_bytes("0102030A11FF80").unwrap();
/// assert_eq!(bytes, vec![1, 2, 3, 10, 17, 255, 128]);
/// ```
pub fn hex_str_to_bytes(hex_str: &str) -> Result<Vec<u8>, UniversalHexError> {
    let bytes = hex_str.as_bytes();
    if bytes.len() % 2 != 0 {
        return Err(UniversalHexError::InvalidHexCharacter(hex_str.to_string()));
    }

    let mut result = Vec::with_capacity(bytes.len() / 2);
    for pair in bytes.chunks_exact(2) {
        match (hex_digit(pair[0]), hex_digit(pair[1])) {
            (Some(high), Some(low)) => result.push(high << 4 | low),
            _ => return Err(UniversalHexError::InvalidHexCharacter(hex_str.to_string())),
        }
    }
    Ok(result)
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Convert a single byte into a fixed-width, upper-case hex string.
#[must_use]
pub fn byte_to_hex(value: u8) -> String {
    format!("{value:02X}")
}

/// Convert a byte slice into an upper-case hex string.
///
/// # Example
/// ```
/// use universalhexlib::bytes_to_hex;
///
/// assert_eq!(bytes_to_hex(&[1, 2, 3, 10, 17, 255, 128]), "0102030A11FF80");
/// ```
#[must_use]
pub fn bytes_to_hex(data: &[u8]) -> String {
    data.iter().map(|b| format!("{b:02X}")).collect()
}

/// Concatenate multiple byte slices into a single buffer.
#[must_use]
pub fn concat_bytes(arrays: &[&[u8]]) -> Vec<u8> {
    let total: usize = arrays.iter().map(|a| a.len()).sum();
    let mut result = Vec::with_capacity(total);
    for array in arrays {
        result.extend_from_slice(array);
    }
    result
}

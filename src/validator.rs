//! Structural validation of bencode without building a tree.
//!
//! Mirrors the decoder's dispatch shape one-for-one (`string`/`integer`/
//! `list`/`dictionary`/`next`) but enforces rules the decoder leaves lax —
//! notably rejecting leading zeros in integers — since the two serve
//! different purposes: the decoder favors permissiveness for data someone
//! else already accepted, the validator is the strict gate for data from an
//! untrusted source.

use crate::error::ValidateError;

/// Checks that `bytes` begins with one complete, well-formed bencoded value.
/// On success, returns the offset just past that value (trailing bytes are
/// not inspected).
pub fn validate(bytes: &[u8]) -> Result<usize, ValidateError> {
    next(bytes, 0, 0)
}

fn next(bytes: &[u8], offset: usize, depth: u32) -> Result<usize, ValidateError> {
    if depth > crate::RECURSION_LIMIT {
        return Err(ValidateError::Malformed);
    }
    match bytes.get(offset) {
        None => Err(ValidateError::ShortInput),
        Some(b'd') => dictionary(bytes, offset, depth),
        Some(b'l') => list(bytes, offset, depth),
        Some(b'i') => integer(bytes, offset),
        Some(b'0'..=b'9') => string(bytes, offset),
        Some(_) => Err(ValidateError::Malformed),
    }
}

fn string(bytes: &[u8], offset: usize) -> Result<usize, ValidateError> {
    let mut i = offset;
    while let Some(&b) = bytes.get(i) {
        if b == b':' {
            break;
        }
        if !b.is_ascii_digit() {
            return Err(ValidateError::Malformed);
        }
        i += 1;
    }
    if i == offset {
        return Err(ValidateError::Malformed);
    }
    if bytes.get(i) != Some(&b':') {
        return Err(ValidateError::ShortInput);
    }
    let digits = &bytes[offset..i];
    let text = core::str::from_utf8(digits).map_err(|_| ValidateError::Malformed)?;
    let length: usize = text.parse().map_err(|_| ValidateError::Malformed)?;
    let payload_start = i + 1;
    let payload_end = payload_start
        .checked_add(length)
        .ok_or(ValidateError::Malformed)?;
    if payload_end > bytes.len() {
        return Err(ValidateError::ShortInput);
    }
    Ok(payload_end)
}

fn integer(bytes: &[u8], offset: usize) -> Result<usize, ValidateError> {
    debug_assert_eq!(bytes.get(offset), Some(&b'i'));
    let mut i = offset + 1;
    // Empty body (`ie`) is rejected before anything else is inspected.
    match bytes.get(i) {
        None => return Err(ValidateError::ShortInput),
        Some(b'e') => return Err(ValidateError::Malformed),
        _ => {}
    }
    if bytes.get(i) == Some(&b'-') {
        // `-0e` is rejected explicitly, independent of the general
        // leading-zero check below.
        if bytes.get(i + 1) == Some(&b'0') && bytes.get(i + 2) == Some(&b'e') {
            return Err(ValidateError::Malformed);
        }
        i += 1;
    }
    let digits_start = i;
    while let Some(&b) = bytes.get(i) {
        if b == b'e' {
            break;
        }
        if !b.is_ascii_digit() {
            return Err(ValidateError::Malformed);
        }
        i += 1;
    }
    if i == digits_start {
        return Err(ValidateError::Malformed);
    }
    let digits = &bytes[digits_start..i];
    if digits.len() > 1 && digits[0] == b'0' {
        return Err(ValidateError::Malformed);
    }
    match bytes.get(i) {
        Some(b'e') => Ok(i + 1),
        Some(_) => Err(ValidateError::Malformed),
        None => Err(ValidateError::ShortInput),
    }
}

fn list(bytes: &[u8], offset: usize, depth: u32) -> Result<usize, ValidateError> {
    debug_assert_eq!(bytes.get(offset), Some(&b'l'));
    let mut i = offset + 1;
    loop {
        match bytes.get(i) {
            None => return Err(ValidateError::ShortInput),
            Some(b'e') => return Ok(i + 1),
            _ => i = next(bytes, i, depth + 1)?,
        }
    }
}

fn dictionary(bytes: &[u8], offset: usize, depth: u32) -> Result<usize, ValidateError> {
    debug_assert_eq!(bytes.get(offset), Some(&b'd'));
    let mut i = offset + 1;
    loop {
        match bytes.get(i) {
            None => return Err(ValidateError::ShortInput),
            Some(b'e') => return Ok(i + 1),
            Some(b'0'..=b'9') => {
                i = string(bytes, i)?;
                match bytes.get(i) {
                    None => return Err(ValidateError::ShortInput),
                    Some(b'e') => return Err(ValidateError::Malformed),
                    _ => i = next(bytes, i, depth + 1)?,
                }
            }
            _ => return Err(ValidateError::Malformed),
        }
    }
}

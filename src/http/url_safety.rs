//! Target classification, percent-decoding, and path normalization.
//!
//! Run in this fixed order — decode before normalize — so that a
//! percent-encoded `.` or `/` can never smuggle a directory-escape segment
//! past the normalizer.

use crate::{errors::ErrorKind, http::view::ByteView};

/// Classifies the request target as an API route, narrowing the view in
/// place rather than copying: `/api/echo` becomes `/echo`, `/api` becomes
/// `/`, anything else is returned unchanged with `is_api = false`.
pub(crate) fn classify_api(target: ByteView<'_>) -> (bool, ByteView<'_>) {
    if target.as_bytes() == b"/api" {
        return (true, ByteView::new(b"/"));
    }
    if target.starts_with(b"/api/") {
        return (true, target.narrow_left(4));
    }
    (false, target)
}

/// Percent-decodes `target`, rejecting malformed escapes. Output length is
/// always `<= target.len()`, so the returned `Vec` never reallocates past
/// its initial capacity.
pub(crate) fn percent_decode(target: &[u8]) -> Result<Vec<u8>, ErrorKind> {
    let mut out = Vec::with_capacity(target.len());
    let mut i = 0;

    while i < target.len() {
        if target[i] == b'%' {
            let high = *target.get(i + 1).ok_or(ErrorKind::BadRequestPath)?;
            let low = *target.get(i + 2).ok_or(ErrorKind::BadRequestPath)?;
            let high = hex_digit(high).ok_or(ErrorKind::BadRequestPath)?;
            let low = hex_digit(low).ok_or(ErrorKind::BadRequestPath)?;
            out.push(high * 16 + low);
            i += 3;
        } else {
            out.push(target[i]);
            i += 1;
        }
    }

    Ok(out)
}

#[inline(always)]
fn hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Normalizes a decoded path with a segment stack: collapses repeated `/`,
/// drops `.` segments, pops on `..` (failing if the stack is already at
/// root), and always returns a path starting with `/`.
pub(crate) fn normalize_path(decoded: &[u8]) -> Result<Vec<u8>, ErrorKind> {
    let mut segments: Vec<&[u8]> = Vec::new();

    for segment in decoded.split(|&b| b == b'/') {
        match segment {
            b"" | b"." => continue,
            b".." => {
                if segments.pop().is_none() {
                    return Err(ErrorKind::BadRequestPath);
                }
            }
            other => segments.push(other),
        }
    }

    let mut out = Vec::with_capacity(decoded.len().max(1));
    out.push(b'/');
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push(b'/');
        }
        out.extend_from_slice(segment);
    }

    Ok(out)
}

//! Character-boundary arithmetic on byte offsets.
//!
//! Lines are stored as UTF-8 and columns are byte offsets, so every motion
//! and deletion must step by whole encoded characters. Forward steps read the
//! sequence length from the lead byte; backward steps scan back over
//! continuation bytes (`0b10xx_xxxx`) until a lead byte appears.

/// Encoded length of a UTF-8 sequence from its lead byte.
///
/// Continuation bytes and invalid leads report 1 so callers always make
/// progress; they cannot occur at a boundary of a valid `&str`.
#[inline]
#[must_use]
pub const fn char_len(lead: u8) -> usize {
    match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}

/// True for continuation bytes, which never start a character.
#[inline]
#[must_use]
pub const fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

/// The boundary after the character starting at `col`. Saturates at the
/// end of the line.
#[must_use]
pub fn next_boundary(line: &str, col: usize) -> usize {
    let bytes = line.as_bytes();
    if col >= bytes.len() {
        return bytes.len();
    }
    (col + char_len(bytes[col])).min(bytes.len())
}

/// The boundary before `col`. Saturates at 0.
#[must_use]
pub fn prev_boundary(line: &str, col: usize) -> usize {
    let bytes = line.as_bytes();
    let mut i = col.min(bytes.len());
    if i == 0 {
        return 0;
    }
    i -= 1;
    while i > 0 && is_continuation(bytes[i]) {
        i -= 1;
    }
    i
}

/// Clamp `col` to the line and round it down to a character boundary.
#[must_use]
pub fn floor_boundary(line: &str, col: usize) -> usize {
    let mut i = col.min(line.len());
    while i > 0 && !line.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Number of characters in `line[..col]`.
///
/// Used by display layers that show the cursor column to the user.
#[must_use]
pub fn char_col(line: &str, col: usize) -> usize {
    line[..floor_boundary(line, col)].chars().count()
}

/// True when the byte at `col` belongs to a word: ASCII alphanumeric or `_`.
///
/// Multi-byte characters are never word characters; their lead byte is
/// above the ASCII range.
#[inline]
#[must_use]
pub fn is_word_byte(line: &str, col: usize) -> bool {
    line.as_bytes()
        .get(col)
        .is_some_and(|&b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Previous index in a list of `len` rows, wrapping to the last row.
pub const fn wrap_decrement(index: usize, len: usize) -> usize {
    match (index, len) {
        (_, 0) => 0,
        (0, len) => len - 1,
        (index, len) if index >= len => len - 1,
        (index, _) => index - 1,
    }
}

/// Next index in a list of `len` rows, wrapping to the first row.
pub const fn wrap_increment(index: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }

    (index + 1) % len
}

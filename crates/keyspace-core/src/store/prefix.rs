/// Smallest key strictly greater than every key that starts with `prefix`.
///
/// Trailing `0xFF` bytes are dropped before incrementing. Returns `None` when
/// no such key exists (empty prefix or all `0xFF`), meaning "unbounded".
#[must_use]
pub fn prefix_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();

    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }

    None
}

/// Immediate successor of `key` in byte order (`key ++ 0x00`).
#[must_use]
pub fn next_key(key: &[u8]) -> Vec<u8> {
    let mut next = Vec::with_capacity(key.len() + 1);
    next.extend_from_slice(key);
    next.push(0);

    next
}

///
/// TESTS
///

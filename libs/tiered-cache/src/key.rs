use std::borrow::Cow;

/// Separator between the segments of a scope key.
pub const KEY_DELIMITER: char = ':';

/// A type that derives a cache partition key from the request parameters
/// that define the partition.
///
/// Implementations are normally generated with [`scope_key!`](crate::scope_key)
/// so the key format and its argument list live side by side.
pub trait ScopeKey {
    type Args<'r>;

    fn key_with_args(&self, args: Self::Args<'_>) -> Cow<'static, str>;
}

/// Whether `segment` can be embedded in a scope key without colliding with
/// another scope. Empty segments, the delimiter and whitespace are rejected.
pub fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && !segment
            .chars()
            .any(|c| c == KEY_DELIMITER || c.is_whitespace())
}

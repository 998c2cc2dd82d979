//! Status codes returned across the C boundary.
//!
//! `init`, `term` and `set_k_and_b` return the same values narrowed to `i8`.

/// Success.
pub const STATUS_OK: i64 = 0;

/// The envelope is not a UTF-8 JSON object.
pub const STATUS_PARSE_ERROR: i64 = -1;

/// The command, object or method is not recognized.
pub const STATUS_UNKNOWN_COMMAND: i64 = -2;

/// The engine failed, panics included.
pub const STATUS_ENGINE_ERROR: i64 = -3;

/// Out-of-order lifecycle use.
pub const STATUS_LIFECYCLE: i64 = -4;

/// Null pointers, missing command name, malformed payload or non-finite k/b.
pub const STATUS_INVALID_INPUT: i64 = -5;

/// Response buffers could not be allocated.
pub const STATUS_ALLOCATION: i64 = -6;

/// Narrow a status to the byte-sized return of the lifecycle calls.
pub const fn narrow(status: i64) -> i8 {
    status as i8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrow_keeps_values() {
        for status in [
            STATUS_OK,
            STATUS_PARSE_ERROR,
            STATUS_UNKNOWN_COMMAND,
            STATUS_ENGINE_ERROR,
            STATUS_LIFECYCLE,
            STATUS_INVALID_INPUT,
            STATUS_ALLOCATION,
        ] {
            assert_eq!(i64::from(narrow(status)), status);
        }
    }
}

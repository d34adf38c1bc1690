//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Code | Domain    | Description                                   |
//! |------|-----------|-----------------------------------------------|
//! | 0    | Universal | Success                                       |
//! | 1    | Universal | General error (unspecified)                   |
//! | 2    | Universal | CLI usage error (bad args)                    |
//! | 3    | resolve   | Input file not found                          |
//! | 4    | resolve   | No field scored above the key threshold       |
//! | 5    | resolve   | Required column (update date, key) missing    |
//! | 6    | resolve   | Config file invalid                           |
//! | 7    | resolve   | Read/write failure                            |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `resolve_exit_code`

use nugget_resolve::ResolveError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Resolve (3-9)
// =============================================================================

/// Input path does not exist. Nothing is written.
pub const EXIT_INPUT_NOT_FOUND: u8 = 3;

/// No field cleared the key threshold. The score table is printed to stderr.
pub const EXIT_NO_KEY_FIELDS: u8 = 4;

/// A column the merge needs is absent.
pub const EXIT_MISSING_COLUMN: u8 = 5;

/// Config file failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 6;

/// File read/write or CSV framing failure.
pub const EXIT_IO: u8 = 7;

/// Map an engine error to its exit code.
pub fn resolve_exit_code(err: &ResolveError) -> u8 {
    match err {
        ResolveError::InputNotFound { .. } => EXIT_INPUT_NOT_FOUND,
        ResolveError::NoKeyFieldsFound { .. } => EXIT_NO_KEY_FIELDS,
        ResolveError::MissingRequiredColumn { .. } => EXIT_MISSING_COLUMN,
        ResolveError::ConfigParse(_) | ResolveError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ResolveError::Io(_) => EXIT_IO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_INPUT_NOT_FOUND,
            EXIT_NO_KEY_FIELDS,
            EXIT_MISSING_COLUMN,
            EXIT_INVALID_CONFIG,
            EXIT_IO,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn maps_engine_errors() {
        let err = ResolveError::MissingRequiredColumn { column: "update_date".into() };
        assert_eq!(resolve_exit_code(&err), EXIT_MISSING_COLUMN);
        assert_eq!(resolve_exit_code(&ResolveError::ConfigParse("x".into())), EXIT_INVALID_CONFIG);
    }
}

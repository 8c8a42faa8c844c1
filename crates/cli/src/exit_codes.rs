//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `dlens` exit codes.
//! Exit codes are part of the shell contract, so scripts can branch on
//! why a file failed to load without parsing stderr.
//!
//! | Code | Meaning                                          |
//! |------|--------------------------------------------------|
//! | 0    | Success                                          |
//! | 1    | General error (output could not be written)      |
//! | 2    | Usage error (bad arguments)                      |
//! | 3    | Unsupported file format                          |
//! | 4    | File could not be read or parsed                 |
//! | 5    | SQLite database could not be opened or queried   |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `normalize_exit_code` or the command that raises it

use datalens_io::NormalizeError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - output could not be produced.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments such as a multi-byte delimiter.
pub const EXIT_USAGE: u8 = 2;

/// The file extension is not one of the supported formats.
pub const EXIT_UNSUPPORTED_FORMAT: u8 = 3;

/// The file is missing, unreadable, or malformed for its format.
pub const EXIT_IO: u8 = 4;

/// The SQLite file could not be opened or one of its tables could not be read.
pub const EXIT_DATABASE: u8 = 5;

/// Map a normalization failure to its exit code.
pub fn normalize_exit_code(err: &NormalizeError) -> u8 {
    match err {
        NormalizeError::UnsupportedFormat(_) => EXIT_UNSUPPORTED_FORMAT,
        NormalizeError::Io(_) => EXIT_IO,
        NormalizeError::Database(_) => EXIT_DATABASE,
    }
}

//! Exit code constants for sheetsplit.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed (possibly with skipped items) |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 3 | `INPUT_NOT_FOUND` | Input root missing or not a directory |
//! | 4 | `NO_VALID_DATA` | No document yielded usable rows |
//! | 5 | `PARTIAL_FAILURE` | `--strict` run skipped a document or batch |

/// Exit codes matching the documented exit code table.
///
/// ```rust
/// use sheetsplit_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert_eq!(ExitCode::NO_VALID_DATA, ExitCode::from_i32(4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid arguments or configuration values
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Input root does not exist or is not a directory
    pub const INPUT_NOT_FOUND: ExitCode = ExitCode(3);

    /// No document produced usable rows (or none carried the identity column)
    pub const NO_VALID_DATA: ExitCode = ExitCode(4);

    /// Strict mode only: the run finished but skipped documents or batches
    pub const PARTIAL_FAILURE: ExitCode = ExitCode(5);

    /// Get the numeric exit code value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

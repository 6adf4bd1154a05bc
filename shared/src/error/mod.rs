//! Coded errors shared by the catalog service and its clients
//!
//! | Range | Category |
//! |-------|----------|
//! | 0xxx  | request  |
//! | 1xxx  | auth     |
//! | 6xxx  | catalog and products |
//! | 9xxx  | system   |
//!
//! ```
//! use shared::error::{ApiResponse, AppError, ErrorCode};
//!
//! let err = AppError::with_message(ErrorCode::CategoryNotLeaf, "a/c is not a leaf")
//!     .with_detail("path", "a/c");
//! assert_eq!(ApiResponse::<()>::error(&err).code, Some(6103));
//! ```

mod codes;
mod types;

pub use codes::{ErrorCategory, ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};

//! Numeric error codes carried in every error body
//!
//! The leading digit selects the [`ErrorCategory`]; the table below is the
//! single source for each code's number, HTTP status and default message.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which part of the service an [`ErrorCode`] belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// 0xxx
    Request,
    /// 1xxx
    Auth,
    /// 6xxx
    Catalog,
    /// 9xxx and anything unassigned
    System,
}

impl ErrorCategory {
    pub const fn of(code: u16) -> Self {
        match code {
            0..1000 => Self::Request,
            1000..2000 => Self::Auth,
            6000..7000 => Self::Catalog,
            _ => Self::System,
        }
    }
}

macro_rules! error_codes {
    ($( $(#[$doc:meta])* $variant:ident = $num:literal, $status:ident, $msg:literal; )+) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(into = "u16", try_from = "u16")]
        #[repr(u16)]
        pub enum ErrorCode {
            $( $(#[$doc])* $variant = $num, )+
        }

        impl ErrorCode {
            /// Fallback message used when no specific one is supplied
            pub const fn message(&self) -> &'static str {
                match self {
                    $( Self::$variant => $msg, )+
                }
            }

            pub fn http_status(&self) -> StatusCode {
                match self {
                    $( Self::$variant => StatusCode::$status, )+
                }
            }
        }

        impl TryFrom<u16> for ErrorCode {
            type Error = InvalidErrorCode;

            fn try_from(value: u16) -> Result<Self, Self::Error> {
                match value {
                    $( $num => Ok(Self::$variant), )+
                    other => Err(InvalidErrorCode(other)),
                }
            }
        }
    };
}

error_codes! {
    /// Lookup by a key the store does not know
    NotFound = 3, NOT_FOUND, "Resource not found";
    /// Write lost a race against another writer
    ConcurrentModification = 9, CONFLICT, "Resource was modified concurrently";

    NotAuthenticated = 1001, UNAUTHORIZED, "Authentication required";
    TokenExpired = 1003, UNAUTHORIZED, "Authentication token has expired";
    TokenInvalid = 1004, UNAUTHORIZED, "Authentication token is invalid";

    ProductNotFound = 6001, NOT_FOUND, "Product not found";
    /// Product still has category associations
    ProductInUse = 6002, CONFLICT, "Product is associated with categories";
    /// Nothing has been published yet
    CatalogNotFound = 6101, NOT_FOUND, "Catalog not found";
    CategoryNotFound = 6102, NOT_FOUND, "Category not found";
    /// Products can only be placed under leaves
    CategoryNotLeaf = 6103, UNPROCESSABLE_ENTITY, "Category is not a leaf";
    CategoriesInUse = 6104, CONFLICT, "Categories are in use";
    /// Bad tree, listing or association batch
    CatalogMalformed = 6105, BAD_REQUEST, "Catalog is malformed";

    DatabaseError = 9002, INTERNAL_SERVER_ERROR, "Database error";
    /// Deadline hit or server shutting down
    RequestCancelled = 9301, SERVICE_UNAVAILABLE, "Request was cancelled";
    /// Retriable storage failure
    SystemBusy = 9404, SERVICE_UNAVAILABLE, "System busy, please retry later";
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    pub const fn category(&self) -> ErrorCategory {
        ErrorCategory::of(self.code())
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// A number with no matching [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

//! Request/response plumbing shared by all endpoints

pub mod error;
pub mod json;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::{Json, ValidatedJson};

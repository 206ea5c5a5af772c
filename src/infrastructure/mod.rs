//! Infrastructure layer - External service implementations

pub mod auth;
pub mod logging;
pub mod mail;
pub mod password_reset;
pub mod storage;
pub mod user;

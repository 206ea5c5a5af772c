//! Authentication infrastructure module
//!
//! Signed session tokens issued at login and checked on protected routes.

mod jwt;

pub use jwt::{IssuedToken, JwtClaims, JwtConfig, JwtGenerator, JwtService};

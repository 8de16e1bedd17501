//! `nilecart-auth` — identity boundary: JWT claims validation, roles, and the
//! minimal user shape the storefront persists for order population and
//! notification addressing.
//!
//! The OTP/password-reset flow lives with the external identity provider; this
//! crate only consumes what that provider asserts.

pub mod claims;
pub mod roles;
pub mod user;

pub use claims::{Hs256JwtValidator, JwtClaims, JwtValidator, TokenValidationError, validate_claims};
pub use roles::Role;
pub use user::User;

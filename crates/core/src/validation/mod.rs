//! Request validation gate.
//!
//! Each request body is checked against a [`Schema`] of declarative
//! [`FieldRule`]s before it reaches a handler. The gate holds no state and has
//! no side effects besides rejecting the request.

mod schema;
mod validator;

pub use schema::{FieldKind, FieldRule, Schema, Validate};
pub use validator::validate;

//! Rule execution engine and validator facade for Trellis.
//!
//! Consumes the `(IR, refs)` pair produced by `trellis-schema` and walks
//! it against an input value, enforcing bail and implicit-rule semantics,
//! union/group dispatch, and sync vs async rule execution.

mod errors;
mod exec;
mod validator;

pub use errors::ValidateError;
pub use validator::{Program, ValidateOptions, Validator, compile};

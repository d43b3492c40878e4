//! A parser for wavefront's `.mtl` material files.
//!
//! Lines are matched against a [`schema::Schema`] of known keywords and each
//! recognized field is written into the material opened by the preceding
//! `newmtl`. A malformed field is reported and skipped; it never aborts the
//! rest of the file.
#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unreachable_pub)]

pub use lex::{ErrorKind, ParseError, ValueError};

mod lex;

pub mod material;
pub mod mtl;
pub mod recognize;
pub mod schema;
pub mod tree;

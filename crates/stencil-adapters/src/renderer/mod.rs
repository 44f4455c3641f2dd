//! Template renderer adapters.

mod jinja;

pub use jinja::{Delimiters, MiniJinjaRenderer};

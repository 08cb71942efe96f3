//! Command implementations for the lcia CLI.

pub mod convert;
pub mod inspect;

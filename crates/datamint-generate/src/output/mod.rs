//! Output writers for generated records.

pub mod atomic;
pub mod json;

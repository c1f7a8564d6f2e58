//! Domain layer - sandwich detection and attribution logic

pub mod flow;
pub mod sandwich;
pub mod signatures;
pub mod traits;
pub mod validators;

#[cfg(test)]
pub(crate) mod testing;

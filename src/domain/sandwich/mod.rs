//! Sandwich bracket identification

pub mod sandwich_identifier;

pub use sandwich_identifier::{bracket_count, identify, SandwichBracket, SandwichesBySlot};

//! CLI module for faqbuddy
//!
//! Handles command-line argument parsing and interactive input.

pub mod args;
pub mod input;

pub use args::{Args, Commands};
pub use input::{InputHandler, InputLine};

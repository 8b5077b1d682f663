//! mineclone2d CLI library.
//!
//! Command implementations and the session script parser behind the
//! `mineclone2d` binary.

pub mod commands;
pub mod script;

//! Core template logic: types, parsing, defaulting, composition, assembly.

pub mod assembler;
pub mod composer;
pub mod defaults;
pub mod digest;
pub mod error;
pub mod output;
pub mod parser;
pub mod template;
pub mod types;

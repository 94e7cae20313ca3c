//! # Block Program Code Generation
//!
//! Python code generation for block programs.

mod block_handlers;
mod python_codegen;
pub mod template;

pub use python_codegen::*;

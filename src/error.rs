//! # Compiler Errors
//!
//! Error taxonomy for registry setup, graph loading and compilation.
//!
//! Only structural problems are fatal. A disconnected socket is never an
//! error: the emitter substitutes an empty placeholder and keeps going.

use thiserror::Error;

/// Errors raised by the block compiler.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A block references a type that is not in the registry
    #[error("Unknown block type: {0}")]
    UnknownType(String),

    /// A conflicting definition was registered under an existing name
    #[error("Block type '{0}' is already registered with a different definition")]
    DuplicateType(String),

    /// A next-link (or socket link) walk revisited a block
    #[error("Cyclic block chain detected at block {0}")]
    CyclicChain(String),

    /// A block reached through more than one parent during emission
    #[error("Block {0} is connected to more than one parent")]
    SharedBlock(String),

    /// A block id does not exist in the graph
    #[error("Block not found: {0}")]
    UnknownBlock(String),

    /// Two blocks in a graph description share an id
    #[error("Duplicate block id in graph description: {0}")]
    DuplicateBlockId(String),

    /// A graph description links to an id that was never declared
    #[error("Block '{from}' references missing block '{to}'")]
    DanglingReference { from: String, to: String },

    /// A connection request that can never be structurally valid
    #[error("Invalid connection: {0}")]
    InvalidConnection(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, CompileError>;

//! # SmartX Block Compiler (SXBC)
//!
//! Compiler for turning SmartX visual block programs into standalone
//! Python automation scripts.
//!
//! A block program is a set of placed blocks: statement blocks chained one
//! under another, expression blocks plugged into their sockets. SXBC reads
//! that graph, emits Python for every reachable block, and wraps the result
//! in a fixed script with the SmartX helper library and a guarded `main()`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sxbc::{compile_program, BlockRegistry, ProgramGraph};
//!
//! let registry = BlockRegistry::standard()?;
//! let graph = ProgramGraph::from_json(&std::fs::read_to_string("workflow.json")?)?;
//!
//! match compile_program(&graph, &registry) {
//!     Ok(script) => std::fs::write("workflow.py", script)?,
//!     Err(e) => eprintln!("Compilation failed: {}", e),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! 1. **Block Registry** - Block schemas and their emission rules
//! 2. **Graph Reading** - Roots, statement chains and socket contents
//! 3. **Code Generation** - Precedence-aware expression emission and
//!    indented statement bodies
//! 4. **Templating** - Header, helper library and entry point
//! 5. **Validation** - Unreachable blocks, endless loops, statistics

pub mod analysis;
pub mod blocks;
pub mod codegen;
pub mod compiler;
pub mod error;
pub mod graph;
pub mod options;
pub mod presets;
pub mod reader;
pub mod registry;

// Re-export the main compilation API
pub use compiler::{
    compile_program,
    compile_program_with_options,
    CompiledProgram,
    Workspace,
    ERROR_PLACEHOLDER,
    PREVIEW_PLACEHOLDER,
};

pub use analysis::{Complexity, Warning, WorkspaceStats};
pub use error::{CompileError, Result};
pub use graph::{BlockId, BlockInstance, GraphDescription, Mutation, ProgramGraph};
pub use options::CompileOptions;
pub use presets::Preset;
pub use reader::GraphReader;
pub use registry::{
    Arg, BlockRegistry, BlockType, EmitRule, FieldDecl, Precedence, SocketDecl, ValueKind,
};

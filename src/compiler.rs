//! # Block Program Compiler
//!
//! Main entry points for compiling block programs to Python scripts.

use crate::analysis::{self, Warning, WorkspaceStats};
use crate::codegen::{template, ScriptGenerator};
use crate::error::{CompileError, Result};
use crate::graph::ProgramGraph;
use crate::options::CompileOptions;
use crate::reader::GraphReader;
use crate::registry::BlockRegistry;

/// Preview text shown while the workspace produces no statements.
pub const PREVIEW_PLACEHOLDER: &str = "# Build your workflow to see generated code...";

/// Text shown in place of a script when compilation fails.
pub const ERROR_PLACEHOLDER: &str = "# Error generating code";

/// Output of a successful compilation.
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    /// Complete standalone script
    pub script: String,
    /// Compiled statements only, unindented
    pub body: String,
    pub variables: Vec<String>,
    pub warnings: Vec<Warning>,
    pub stats: WorkspaceStats,
}

impl CompiledProgram {
    /// The statement body, or a placeholder when there is none.
    pub fn preview(&self) -> &str {
        if self.body.trim().is_empty() {
            PREVIEW_PLACEHOLDER
        } else {
            &self.body
        }
    }
}

/// Compile a block program to a Python script
///
/// This is the main entry point for the compiler. It uses default
/// [`CompileOptions`] and returns only the script text.
///
/// # Arguments
///
/// * `graph` - The block program to compile
/// * `registry` - Block definitions the program's blocks are looked up in
///
/// # Returns
///
/// * `Ok(String)` - The generated script
/// * `Err(CompileError)` - Unknown block type or cyclic chain
///
/// # Examples
///
/// ```rust
/// use sxbc::{compile_program, BlockRegistry, ProgramGraph};
///
/// let registry = BlockRegistry::standard()?;
/// let mut graph = ProgramGraph::new("demo");
/// let wait = graph.add_block("smartx_wait_seconds");
/// let seconds = graph.add_block("math_number");
/// graph.set_field(seconds, "NUM", "5")?;
/// graph.connect_value(wait, "SECONDS", seconds)?;
///
/// let script = compile_program(&graph, &registry)?;
/// assert!(script.contains("time.sleep(5)"));
/// # Ok::<(), sxbc::CompileError>(())
/// ```
pub fn compile_program(graph: &ProgramGraph, registry: &BlockRegistry) -> Result<String> {
    Ok(compile_program_with_options(graph, registry, &CompileOptions::default())?.script)
}

/// Compile a block program with explicit options
///
/// # Arguments
///
/// * `graph` - The block program to compile
/// * `registry` - Block definitions
/// * `options` - Formatting and header settings
///
/// # Returns
///
/// * `Ok(CompiledProgram)` - Script, body, warnings and statistics
/// * `Err(CompileError)` - A descriptive error if compilation fails
pub fn compile_program_with_options(
    graph: &ProgramGraph,
    registry: &BlockRegistry,
    options: &CompileOptions,
) -> Result<CompiledProgram> {
    tracing::info!("[SXBC] Starting block program compilation");
    tracing::info!(
        "[SXBC] Program: {} ({} blocks, {} block types registered)",
        graph.name,
        graph.len(),
        registry.len()
    );

    // Phase 1: Index the graph
    tracing::info!("[SXBC] Phase 1: Reading program graph...");
    let reader = GraphReader::new(graph);
    tracing::info!("[SXBC]   - {} top-level roots", reader.top_level_roots().len());

    // Phase 2: Emit statements
    tracing::info!("[SXBC] Phase 2: Emitting statements...");
    let generated = ScriptGenerator::new(&reader, registry, options).generate_body()?;
    tracing::info!(
        "[SXBC]   - {} blocks emitted, {} variables",
        generated.reached.len(),
        generated.variables.len()
    );

    // Phase 3: Wrap in the script template
    tracing::info!("[SXBC] Phase 3: Rendering script template...");
    let script = template::render_script(&generated.code, options);

    // Phase 4: Validation and statistics
    tracing::info!("[SXBC] Phase 4: Validating workspace...");
    let warnings = analysis::validate(&reader, &generated.reached);
    let stats = analysis::workspace_stats(graph, &script);

    tracing::info!("[SXBC] Code generation complete ({} bytes)", script.len());
    tracing::info!("[SXBC] Compilation successful!");

    Ok(CompiledProgram {
        script,
        body: generated.code,
        variables: generated.variables,
        warnings,
        stats,
    })
}

/// An editable program that recompiles after every change.
///
/// Every edit goes through [`Workspace::edit`], so the cached output always
/// reflects the complete graph after the last edit.
pub struct Workspace {
    graph: ProgramGraph,
    registry: BlockRegistry,
    options: CompileOptions,
    output: std::result::Result<CompiledProgram, CompileError>,
}

impl Workspace {
    pub fn new(name: impl Into<String>, registry: BlockRegistry, options: CompileOptions) -> Self {
        let graph = ProgramGraph::new(name);
        let output = compile_program_with_options(&graph, &registry, &options);
        Self { graph, registry, options, output }
    }

    /// Apply a change to the graph and recompile.
    pub fn edit<T>(&mut self, change: impl FnOnce(&mut ProgramGraph) -> T) -> T {
        let result = change(&mut self.graph);
        self.recompile();
        result
    }

    /// Replace the whole graph (template or saved workspace) and recompile.
    pub fn load(&mut self, graph: ProgramGraph) {
        self.graph = graph;
        self.recompile();
    }

    pub fn clear(&mut self) {
        self.edit(ProgramGraph::clear);
    }

    pub fn graph(&self) -> &ProgramGraph {
        &self.graph
    }

    pub fn output(&self) -> std::result::Result<&CompiledProgram, &CompileError> {
        self.output.as_ref()
    }

    /// Latest script, or the error placeholder if the last compile failed.
    pub fn script(&self) -> &str {
        match &self.output {
            Ok(program) => &program.script,
            Err(_) => ERROR_PLACEHOLDER,
        }
    }

    /// Latest body preview, or the error placeholder.
    pub fn preview(&self) -> &str {
        match &self.output {
            Ok(program) => program.preview(),
            Err(_) => ERROR_PLACEHOLDER,
        }
    }

    fn recompile(&mut self) {
        self.output = compile_program_with_options(&self.graph, &self.registry, &self.options);
        if let Err(e) = &self.output {
            tracing::error!("[SXBC] Code generation error: {}", e);
        }
    }
}

//! # Workspace Validation
//!
//! Non-fatal findings about a program graph and the statistics shown next
//! to the editor. None of this affects the generated script.

use crate::graph::{BlockId, ProgramGraph};
use crate::reader::GraphReader;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Blocks that are neither roots nor reached from one
    Unreachable { blocks: Vec<BlockId> },
    /// `while True` with no way out
    InfiniteLoop { block: BlockId },
    /// Block linked from more than one parent
    SharedBlock { block: BlockId },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::Unreachable { blocks } => {
                write!(f, "{} disconnected blocks found", blocks.len())
            }
            Warning::InfiniteLoop { block } => {
                write!(f, "Potential infinite loop detected at block {}", block)
            }
            Warning::SharedBlock { block } => {
                write!(f, "Block {} is connected to more than one parent", block)
            }
        }
    }
}

/// Collect warnings for a graph whose emission reached `reached`.
pub fn validate(reader: &GraphReader<'_>, reached: &HashSet<BlockId>) -> Vec<Warning> {
    let graph = reader.graph();
    let roots: HashSet<BlockId> = reader.top_level_roots().into_iter().collect();
    let mut warnings = Vec::new();

    let unreachable: Vec<BlockId> = graph
        .blocks()
        .map(|b| b.id)
        .filter(|id| !roots.contains(id) && !reached.contains(id))
        .collect();
    if !unreachable.is_empty() {
        warnings.push(Warning::Unreachable { blocks: unreachable });
    }

    for block in graph.blocks().filter(|b| reached.contains(&b.id)) {
        if is_endless_while(reader, block.id) {
            warnings.push(Warning::InfiniteLoop { block: block.id });
        }
    }

    for block in reader.shared_blocks() {
        warnings.push(Warning::SharedBlock { block });
    }

    for warning in &warnings {
        tracing::warn!("[SXBC] Validation: {}", warning);
    }
    warnings
}

fn is_endless_while(reader: &GraphReader<'_>, id: BlockId) -> bool {
    let graph = reader.graph();
    let Some(block) = graph.get(id) else {
        return false;
    };
    if block.block_type != "controls_whileUntil" || block.field("MODE") == Some("UNTIL") {
        return false;
    }
    reader
        .socket_value(id, "BOOL")
        .and_then(|cond| graph.get(cond))
        .map(|cond| cond.block_type == "logic_boolean" && cond.field("BOOL") != Some("FALSE"))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    pub fn for_block_count(blocks: usize) -> Self {
        match blocks {
            0..=15 => Complexity::Simple,
            16..=30 => Complexity::Moderate,
            _ => Complexity::Complex,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceStats {
    pub blocks: usize,
    /// Non-blank lines of the generated script
    pub lines: usize,
    pub complexity: Complexity,
}

pub fn workspace_stats(graph: &ProgramGraph, script: &str) -> WorkspaceStats {
    let blocks = graph.len();
    WorkspaceStats {
        blocks,
        lines: script.lines().filter(|line| !line.trim().is_empty()).count(),
        complexity: Complexity::for_block_count(blocks),
    }
}

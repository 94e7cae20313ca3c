//! # Program Graph Reader
//!
//! Read-only view over a [`ProgramGraph`]: which blocks are roots, what a
//! statement chain contains, and what sits in each socket.

use crate::error::{CompileError, Result};
use crate::graph::{BlockId, ProgramGraph};
use std::collections::{HashMap, HashSet};

pub struct GraphReader<'a> {
    graph: &'a ProgramGraph,
    parents: HashMap<BlockId, Vec<BlockId>>,
}

impl<'a> GraphReader<'a> {
    pub fn new(graph: &'a ProgramGraph) -> Self {
        let mut parents: HashMap<BlockId, Vec<BlockId>> = HashMap::new();
        for block in graph.blocks() {
            for child in block.children() {
                parents.entry(child).or_default().push(block.id);
            }
        }
        Self { graph, parents }
    }

    pub fn graph(&self) -> &'a ProgramGraph {
        self.graph
    }

    /// Blocks nothing links to, in insertion order.
    pub fn top_level_roots(&self) -> Vec<BlockId> {
        self.graph
            .blocks()
            .filter(|block| !self.parents.contains_key(&block.id))
            .map(|block| block.id)
            .collect()
    }

    /// Lazily walk `next` links starting at `root` (inclusive).
    pub fn statement_chain(&self, root: BlockId) -> StatementChain<'a> {
        StatementChain {
            graph: self.graph,
            current: self.graph.get(root).map(|b| b.id),
            seen: HashSet::new(),
            done: false,
        }
    }

    pub fn socket_value(&self, id: BlockId, socket: &str) -> Option<BlockId> {
        let child = *self.graph.get(id)?.values.get(socket)?;
        self.graph.get(child).map(|b| b.id)
    }

    pub fn socket_statement_head(&self, id: BlockId, socket: &str) -> Option<BlockId> {
        let child = *self.graph.get(id)?.statements.get(socket)?;
        self.graph.get(child).map(|b| b.id)
    }

    pub fn parents(&self, id: BlockId) -> &[BlockId] {
        self.parents.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Blocks claimed by more than one parent.
    pub fn shared_blocks(&self) -> Vec<BlockId> {
        self.graph
            .blocks()
            .filter(|block| self.parents(block.id).len() > 1)
            .map(|block| block.id)
            .collect()
    }

    /// First block found on a `next` cycle anywhere in the graph, including
    /// cycles no root leads into.
    pub fn find_next_cycle(&self) -> Option<BlockId> {
        let mut finished: HashSet<BlockId> = HashSet::new();

        for block in self.graph.blocks() {
            let mut path = HashSet::new();
            let mut current = Some(block.id);
            while let Some(id) = current {
                if finished.contains(&id) {
                    break;
                }
                if !path.insert(id) {
                    return Some(id);
                }
                current = self.graph.get(id).and_then(|b| b.next);
            }
            finished.extend(path);
        }
        None
    }

    /// Editor-facing name of a block for error messages.
    pub fn describe(&self, id: BlockId) -> String {
        describe(self.graph, id)
    }
}

pub(crate) fn describe(graph: &ProgramGraph, id: BlockId) -> String {
    match graph.get(id) {
        Some(block) => format!("'{}' ({})", block.key, block.block_type),
        None => id.to_string(),
    }
}

/// Iterator over one statement chain.
///
/// Yields `Err(CompileError::CyclicChain)` once when a block comes around
/// a second time, then ends.
pub struct StatementChain<'a> {
    graph: &'a ProgramGraph,
    current: Option<BlockId>,
    seen: HashSet<BlockId>,
    done: bool,
}

impl Iterator for StatementChain<'_> {
    type Item = Result<BlockId>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let id = self.current?;
        if !self.seen.insert(id) {
            self.done = true;
            return Some(Err(CompileError::CyclicChain(describe(self.graph, id))));
        }
        self.current = self
            .graph
            .get(id)
            .and_then(|b| b.next)
            .filter(|next| self.graph.get(*next).is_some());
        Some(Ok(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_of_three() -> (ProgramGraph, [BlockId; 3]) {
        let mut graph = ProgramGraph::new("test");
        let a = graph.add_block("smartx_wait_seconds");
        let b = graph.add_block("smartx_wait_seconds");
        let c = graph.add_block("smartx_wait_seconds");
        graph.connect_next(a, b).unwrap();
        graph.connect_next(b, c).unwrap();
        (graph, [a, b, c])
    }

    #[test]
    fn roots_are_unlinked_blocks_in_insertion_order() {
        let (mut graph, [a, ..]) = chain_of_three();
        let floating = graph.add_block("text");
        let reader = GraphReader::new(&graph);
        assert_eq!(reader.top_level_roots(), vec![a, floating]);
    }

    #[test]
    fn statement_chain_follows_next_links() {
        let (graph, ids) = chain_of_three();
        let reader = GraphReader::new(&graph);
        let chain: Vec<_> = reader
            .statement_chain(ids[0])
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(chain, ids.to_vec());
    }

    #[test]
    fn statement_chain_stops_on_cycle() {
        let json = r#"{ "blocks": [
            { "id": "a", "type": "smartx_wait_seconds", "next": "b" },
            { "id": "b", "type": "smartx_wait_seconds", "next": "a" }
        ] }"#;
        let graph = ProgramGraph::from_json(json).unwrap();
        let reader = GraphReader::new(&graph);
        let first = graph.blocks().next().unwrap().id;

        let items: Vec<_> = reader.statement_chain(first).collect();
        assert_eq!(items.len(), 3);
        assert!(matches!(items[2], Err(CompileError::CyclicChain(_))));
        assert!(reader.top_level_roots().is_empty());
        assert!(reader.find_next_cycle().is_some());
    }

    #[test]
    fn acyclic_graph_has_no_next_cycle() {
        let (graph, _) = chain_of_three();
        assert_eq!(GraphReader::new(&graph).find_next_cycle(), None);
    }

    #[test]
    fn socket_lookups() {
        let mut graph = ProgramGraph::new("test");
        let loop_block = graph.add_block("controls_whileUntil");
        let cond = graph.add_block("logic_boolean");
        let body = graph.add_block("smartx_log_event");
        graph.connect_value(loop_block, "BOOL", cond).unwrap();
        graph.connect_statement(loop_block, "DO", body).unwrap();

        let reader = GraphReader::new(&graph);
        assert_eq!(reader.socket_value(loop_block, "BOOL"), Some(cond));
        assert_eq!(reader.socket_value(loop_block, "DO"), None);
        assert_eq!(reader.socket_statement_head(loop_block, "DO"), Some(body));
        assert_eq!(reader.parents(body), &[loop_block]);
    }

    #[test]
    fn shared_children_are_reported() {
        let json = r#"{ "blocks": [
            { "id": "p1", "type": "smartx_log_event", "values": { "EVENT": "t" } },
            { "id": "p2", "type": "smartx_log_event", "values": { "EVENT": "t" } },
            { "id": "t", "type": "text" }
        ] }"#;
        let graph = ProgramGraph::from_json(json).unwrap();
        let reader = GraphReader::new(&graph);
        assert_eq!(reader.shared_blocks().len(), 1);
    }
}

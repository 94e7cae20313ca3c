//! Serialized form of a [`ProgramGraph`], as handed over by the editor.
//!
//! Blocks are listed flat with string ids; links refer to those ids. The
//! order of `blocks` is the insertion order of the graph.

use super::{BlockId, Link, Mutation, ProgramGraph};
use crate::error::{CompileError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDescription {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub blocks: Vec<BlockDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDescription {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub statements: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Mutation::is_empty")]
    pub mutation: Mutation,
}

impl ProgramGraph {
    /// Build a graph from its description.
    ///
    /// Links are taken verbatim. Nothing here checks for cycles or shared
    /// children; that is left to the compiler so it can report them.
    pub fn from_description(description: &GraphDescription) -> Result<Self> {
        let mut graph = ProgramGraph::new(description.name.clone());
        let mut ids: HashMap<&str, BlockId> = HashMap::new();

        for block in &description.blocks {
            if ids.contains_key(block.id.as_str()) {
                return Err(CompileError::DuplicateBlockId(block.id.clone()));
            }
            let id = graph.add_block_with_key(block.id.clone(), block.block_type.clone());
            graph.block_mut(id)?.fields = block.fields.clone();
            graph.block_mut(id)?.mutation = block.mutation.clone();
            ids.insert(block.id.as_str(), id);
        }

        let resolve = |from: &str, to: &str| {
            ids.get(to).copied().ok_or_else(|| CompileError::DanglingReference {
                from: from.to_string(),
                to: to.to_string(),
            })
        };

        for block in &description.blocks {
            let parent = ids[block.id.as_str()];
            for (socket, child) in &block.values {
                let child = resolve(&block.id, child)?;
                graph.link_raw(parent, Link::Value(socket.clone()), child)?;
            }
            for (socket, child) in &block.statements {
                let child = resolve(&block.id, child)?;
                graph.link_raw(parent, Link::Statement(socket.clone()), child)?;
            }
            if let Some(next) = &block.next {
                let child = resolve(&block.id, next)?;
                graph.link_raw(parent, Link::Next, child)?;
            }
        }

        tracing::debug!(
            "[SXBC] Loaded graph '{}' with {} block(s)",
            graph.name,
            graph.len()
        );
        Ok(graph)
    }

    pub fn to_description(&self) -> GraphDescription {
        let key = |id: &BlockId| {
            self.get(*id)
                .map(|b| b.key.clone())
                .unwrap_or_else(|| id.to_string())
        };

        let blocks = self
            .blocks()
            .map(|block| BlockDescription {
                id: block.key.clone(),
                block_type: block.block_type.clone(),
                fields: block.fields.clone(),
                values: block.values.iter().map(|(s, c)| (s.clone(), key(c))).collect(),
                statements: block
                    .statements
                    .iter()
                    .map(|(s, c)| (s.clone(), key(c)))
                    .collect(),
                next: block.next.as_ref().map(key),
                mutation: block.mutation.clone(),
            })
            .collect();

        GraphDescription {
            name: self.name.clone(),
            blocks,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let description: GraphDescription = serde_json::from_str(json)?;
        Self::from_description(&description)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_description())?)
    }
}

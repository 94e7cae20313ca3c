//! # Program Graph
//!
//! Arena of placed blocks and the links between them.
//!
//! Blocks never hold references to each other. Every connection is an
//! optional [`BlockId`] stored on the owning block: value sockets and
//! statement sockets by socket name, plus the `next` link of a statement
//! chain. A block that no other block links to is a top-level root.
//!
//! The mutation methods mirror what the editor canvas does when a user
//! drops, moves, or deletes a block. They check structure only; whether a
//! Number block may plug into a String socket is the editor's concern.

pub mod description;

use crate::error::{CompileError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

pub use description::{BlockDescription, GraphDescription};

/// Opaque handle to a block in a [`ProgramGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(usize);

impl BlockId {
    /// Position of the block in the arena (insertion order).
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-instance shape of blocks with a variable number of sockets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mutation {
    /// Item count for `text_join` / `lists_create_with`
    pub items: usize,
    /// Number of `else if` branches on `controls_if`
    pub else_if: usize,
    /// Whether `controls_if` has an `else` branch
    pub has_else: bool,
}

impl Mutation {
    pub fn items(items: usize) -> Self {
        Self { items, ..Self::default() }
    }

    pub fn branches(else_if: usize, has_else: bool) -> Self {
        Self { items: 0, else_if, has_else }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One placed block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockInstance {
    pub id: BlockId,
    /// Editor-side identifier, preserved through serialization
    pub key: String,
    pub block_type: String,
    pub fields: BTreeMap<String, String>,
    pub values: BTreeMap<String, BlockId>,
    pub statements: BTreeMap<String, BlockId>,
    pub next: Option<BlockId>,
    pub mutation: Mutation,
}

impl BlockInstance {
    fn new(id: BlockId, key: String, block_type: String) -> Self {
        Self {
            id,
            key,
            block_type,
            fields: BTreeMap::new(),
            values: BTreeMap::new(),
            statements: BTreeMap::new(),
            next: None,
            mutation: Mutation::default(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Every block this one links to, in a stable order.
    pub fn children(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.values
            .values()
            .chain(self.statements.values())
            .copied()
            .chain(self.next)
    }

    fn links_to(&self, child: BlockId) -> bool {
        self.children().any(|c| c == child)
    }

    fn unlink(&mut self, child: BlockId) {
        self.values.retain(|_, c| *c != child);
        self.statements.retain(|_, c| *c != child);
        if self.next == Some(child) {
            self.next = None;
        }
    }
}

/// The complete set of blocks in a workspace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramGraph {
    pub name: String,
    slots: Vec<Option<BlockInstance>>,
}

impl ProgramGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slots: Vec::new(),
        }
    }

    /// Place a new, unconnected block. It starts out as a top-level root.
    ///
    /// The generated key skips keys already taken by loaded blocks.
    pub fn add_block(&mut self, block_type: impl Into<String>) -> BlockId {
        let mut n = self.slots.len();
        let key = loop {
            let key = format!("b{}", n);
            if !self.blocks().any(|b| b.key == key) {
                break key;
            }
            n += 1;
        };
        self.add_block_with_key(key, block_type)
    }

    pub fn add_block_with_key(
        &mut self,
        key: impl Into<String>,
        block_type: impl Into<String>,
    ) -> BlockId {
        let id = BlockId(self.slots.len());
        self.slots
            .push(Some(BlockInstance::new(id, key.into(), block_type.into())));
        id
    }

    pub fn get(&self, id: BlockId) -> Option<&BlockInstance> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn block(&self, id: BlockId) -> Result<&BlockInstance> {
        self.get(id)
            .ok_or_else(|| CompileError::UnknownBlock(id.to_string()))
    }

    fn block_mut(&mut self, id: BlockId) -> Result<&mut BlockInstance> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| CompileError::UnknownBlock(id.to_string()))
    }

    /// Live blocks in insertion order.
    pub fn blocks(&self) -> impl Iterator<Item = &BlockInstance> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.blocks().count()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks().next().is_none()
    }

    pub fn set_field(
        &mut self,
        id: BlockId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        self.block_mut(id)?.fields.insert(name.into(), value.into());
        Ok(())
    }

    pub fn set_mutation(&mut self, id: BlockId, mutation: Mutation) -> Result<()> {
        self.block_mut(id)?.mutation = mutation;
        Ok(())
    }

    /// Plug `child` into the value socket `socket` of `parent`.
    ///
    /// The child is first unplugged from wherever it was. A block already
    /// occupying the socket is bumped out and becomes top-level.
    pub fn connect_value(
        &mut self,
        parent: BlockId,
        socket: impl Into<String>,
        child: BlockId,
    ) -> Result<()> {
        self.prepare_connection(parent, child)?;
        self.block_mut(parent)?.values.insert(socket.into(), child);
        Ok(())
    }

    /// Make `child` the head of the statement socket `socket` of `parent`.
    pub fn connect_statement(
        &mut self,
        parent: BlockId,
        socket: impl Into<String>,
        child: BlockId,
    ) -> Result<()> {
        self.prepare_connection(parent, child)?;
        self.block_mut(parent)?.statements.insert(socket.into(), child);
        Ok(())
    }

    /// Attach `next` directly below `prev` in a statement chain.
    pub fn connect_next(&mut self, prev: BlockId, next: BlockId) -> Result<()> {
        self.prepare_connection(prev, next)?;
        self.block_mut(prev)?.next = Some(next);
        Ok(())
    }

    /// Unplug a block from its parent (if any). It becomes top-level,
    /// keeping everything it owns.
    pub fn disconnect(&mut self, child: BlockId) -> Result<()> {
        self.block(child)?;
        for block in self.slots.iter_mut().flatten() {
            block.unlink(child);
        }
        Ok(())
    }

    /// Delete a block together with everything it owns (socket contents
    /// and the rest of its chain). Returns the number of blocks removed.
    pub fn remove_block(&mut self, id: BlockId) -> Result<usize> {
        self.disconnect(id)?;

        let mut removed = 0;
        let mut seen = HashSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            if let Some(block) = self.slots.get_mut(current.0).and_then(Option::take) {
                stack.extend(block.children());
                removed += 1;
            }
        }

        tracing::debug!("[SXBC] Removed {} block(s) starting at {}", removed, id);
        Ok(removed)
    }

    /// Remove every block.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Ids of blocks that link to `child`.
    pub fn parents_of(&self, child: BlockId) -> Vec<BlockId> {
        self.blocks()
            .filter(|b| b.links_to(child))
            .map(|b| b.id)
            .collect()
    }

    fn prepare_connection(&mut self, parent: BlockId, child: BlockId) -> Result<()> {
        self.block(parent)?;
        self.block(child)?;
        if parent == child {
            return Err(CompileError::InvalidConnection(format!(
                "block {} cannot connect to itself",
                parent
            )));
        }
        self.disconnect(child)
    }

    /// Write a link without unplugging anything first. Used when loading
    /// descriptions, which must be taken as-is so malformed input can be
    /// reported by the compiler instead of silently repaired.
    fn link_raw(&mut self, parent: BlockId, link: Link, child: BlockId) -> Result<()> {
        let block = self.block_mut(parent)?;
        match link {
            Link::Value(name) => {
                block.values.insert(name, child);
            }
            Link::Statement(name) => {
                block.statements.insert(name, child);
            }
            Link::Next => block.next = Some(child),
        }
        Ok(())
    }
}

enum Link {
    Value(String),
    Statement(String),
    Next,
}

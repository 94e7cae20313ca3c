//! # Standard Block Library
//!
//! Block definitions shipped with the SmartX editor: the generic editor
//! blocks (logic, loops, math, text, variables, lists) and the SmartX
//! domain blocks (sensors, actions, data processing, ML, communication,
//! time).

mod builtin;
mod smartx;

use crate::error::Result;
use crate::registry::BlockRegistry;

impl BlockRegistry {
    /// Registry holding every block the editor toolbox offers.
    pub fn standard() -> Result<Self> {
        let mut registry = Self::new();
        builtin::register(&mut registry)?;
        smartx::register(&mut registry)?;
        tracing::debug!("[SXBC] Standard registry built with {} block types", registry.len());
        Ok(registry)
    }
}

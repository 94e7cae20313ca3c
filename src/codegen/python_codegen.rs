//! # Python Code Generator for Block Programs
//!
//! Walks the program graph root by root and turns every reachable block
//! into Python text. Expression blocks come back with their precedence so
//! the parent can decide whether to wrap them in parentheses.

use crate::error::{CompileError, Result};
use crate::graph::{BlockId, BlockInstance};
use crate::options::CompileOptions;
use crate::reader::GraphReader;
use crate::registry::{BlockRegistry, Precedence};
use std::collections::{HashMap, HashSet};

/// Emitted expression text and how tightly it binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub code: String,
    pub precedence: Precedence,
}

impl Expr {
    pub fn new(code: impl Into<String>, precedence: Precedence) -> Self {
        Self { code: code.into(), precedence }
    }

    pub fn atomic(code: impl Into<String>) -> Self {
        Self::new(code, Precedence::Atomic)
    }

    /// Text of this expression placed in `context`.
    pub fn in_context(self, context: Precedence) -> String {
        if !self.code.is_empty() && self.precedence.needs_parens_in(context) {
            format!("({})", self.code)
        } else {
            self.code
        }
    }
}

/// Result of emitting the statement body of a program.
#[derive(Debug, Clone)]
pub struct GeneratedBody {
    /// Variable declarations followed by every top-level chain
    pub code: String,
    /// Variables in first-use order
    pub variables: Vec<String>,
    /// Blocks that ended up in the output
    pub reached: HashSet<BlockId>,
}

/// Block-program to Python generator
pub struct ScriptGenerator<'a> {
    pub(super) reader: &'a GraphReader<'a>,
    pub(super) registry: &'a BlockRegistry,
    pub(super) options: &'a CompileOptions,
    reached: HashSet<BlockId>,
    active: HashSet<BlockId>,
    variables: Vec<String>,
    /// Editor name -> Python name
    variable_names: HashMap<String, String>,
}

impl<'a> ScriptGenerator<'a> {
    pub fn new(
        reader: &'a GraphReader<'a>,
        registry: &'a BlockRegistry,
        options: &'a CompileOptions,
    ) -> Self {
        Self {
            reader,
            registry,
            options,
            reached: HashSet::new(),
            active: HashSet::new(),
            variables: Vec::new(),
            variable_names: HashMap::new(),
        }
    }

    /// Generate the statement body for the whole graph
    pub fn generate_body(mut self) -> Result<GeneratedBody> {
        if let Some(id) = self.reader.find_next_cycle() {
            return Err(CompileError::CyclicChain(self.reader.describe(id)));
        }

        let mut statements = String::new();
        for root in self.reader.top_level_roots() {
            let block = self.block(root)?;
            let (block_type, _) = self.registry.lookup(&block.block_type)?;

            if block_type.is_expression() {
                tracing::debug!("[CODEGEN] Floating expression root {}", root);
                let expr = self.emit_expression(root)?;
                statements.push_str(&expr.code);
                statements.push('\n');
            } else {
                tracing::debug!("[CODEGEN] Emitting chain from root {}", root);
                statements.push_str(&self.emit_chain(root)?);
            }
        }

        let mut code = String::new();
        if self.options.declare_variables && !self.variables.is_empty() {
            for name in &self.variables {
                code.push_str(&format!("{} = None\n", name));
            }
            code.push('\n');
        }
        code.push_str(&statements);

        Ok(GeneratedBody {
            code,
            variables: self.variables,
            reached: self.reached,
        })
    }

    /// Emit every statement of the chain starting at `head`, unindented.
    pub(super) fn emit_chain(&mut self, head: BlockId) -> Result<String> {
        let mut code = String::new();
        let chain: Vec<BlockId> = self.reader.statement_chain(head).collect::<Result<_>>()?;
        for id in chain {
            code.push_str(&self.emit_statement(id)?);
        }
        Ok(code)
    }

    fn emit_statement(&mut self, id: BlockId) -> Result<String> {
        let block = self.block(id)?;
        let (block_type, rule) = self.registry.lookup(&block.block_type)?;

        self.enter(id)?;
        tracing::debug!("[CODEGEN] Statement {} ({})", id, block.block_type);
        let code = if block_type.is_expression() {
            // An expression dropped into a statement slot runs for its effect
            let expr = self.emit_rule_expression(block, rule)?;
            format!("{}\n", expr.code)
        } else {
            self.emit_rule_statement(block, rule)?
        };
        self.leave(id);

        Ok(code)
    }

    /// Emit an expression block. A statement block sitting in a value
    /// socket cannot produce a value and is treated as disconnected.
    pub(super) fn emit_expression(&mut self, id: BlockId) -> Result<Expr> {
        let block = self.block(id)?;
        let (block_type, rule) = self.registry.lookup(&block.block_type)?;
        if !block_type.is_expression() {
            tracing::debug!("[CODEGEN] Statement block {} in a value socket, skipped", id);
            return Ok(Expr::atomic(""));
        }

        self.enter(id)?;
        tracing::debug!("[CODEGEN] Expression {} ({})", id, block.block_type);
        let expr = self.emit_rule_expression(block, rule)?;
        self.leave(id);

        Ok(expr)
    }

    /// Code for the block in value socket `socket`, parenthesized for
    /// `context`. Empty when nothing is connected.
    pub(super) fn value_to_code(
        &mut self,
        block: &BlockInstance,
        socket: &str,
        context: Precedence,
    ) -> Result<String> {
        match self.reader.socket_value(block.id, socket) {
            Some(child) => Ok(self.emit_expression(child)?.in_context(context)),
            None => Ok(String::new()),
        }
    }

    /// Indented body for statement socket `socket`; `pass` when empty.
    pub(super) fn statement_body(&mut self, block: &BlockInstance, socket: &str) -> Result<String> {
        let code = match self.reader.socket_statement_head(block.id, socket) {
            Some(head) => self.emit_chain(head)?,
            None => String::new(),
        };
        let code = if code.trim().is_empty() { "pass\n".to_string() } else { code };
        Ok(indent_lines(&code, &self.options.indent))
    }

    /// Python name for an editor variable. Editor names that sanitize to
    /// the same identifier get numbered suffixes so they stay distinct.
    pub(super) fn declare_variable(&mut self, raw: &str) -> String {
        if let Some(name) = self.variable_names.get(raw) {
            return name.clone();
        }
        let base = python_identifier(raw);
        let mut name = base.clone();
        let mut n = 2;
        while self.variables.contains(&name) {
            name = format!("{}_{}", base, n);
            n += 1;
        }
        if name != base {
            tracing::warn!(
                "[CODEGEN] Variable '{}' renamed to '{}' to avoid a clash",
                raw,
                name
            );
        }
        self.variables.push(name.clone());
        self.variable_names.insert(raw.to_string(), name.clone());
        name
    }

    fn block(&self, id: BlockId) -> Result<&'a BlockInstance> {
        self.reader.graph().block(id)
    }

    /// Track the blocks currently being emitted. Coming back to one of them
    /// means the graph loops through a socket; reaching a finished one means
    /// two parents share it, and every block is emitted at most once.
    fn enter(&mut self, id: BlockId) -> Result<()> {
        if self.active.contains(&id) {
            return Err(CompileError::CyclicChain(self.reader.describe(id)));
        }
        if !self.reached.insert(id) {
            return Err(CompileError::SharedBlock(self.reader.describe(id)));
        }
        self.active.insert(id);
        Ok(())
    }

    fn leave(&mut self, id: BlockId) {
        self.active.remove(&id);
    }
}

/// Prefix every non-blank line with `indent`.
pub fn indent_lines(code: &str, indent: &str) -> String {
    let mut out = String::with_capacity(code.len());
    for line in code.lines() {
        if !line.trim().is_empty() {
            out.push_str(indent);
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

/// Python string literal for `text`.
pub fn quote(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\'', "\\'");
    format!("'{}'", escaped)
}

const RESERVED_WORDS: &[&str] = &[
    // Python keywords
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
    // Names the script template defines or imports
    "time", "random", "json", "logging", "datetime", "timedelta", "mqtt", "requests",
    "dataclass", "logger", "main", "count", "print", "str", "int", "range",
];

/// Turn an editor variable name into a valid Python identifier that does
/// not clash with keywords or template names.
pub fn python_identifier(raw: &str) -> String {
    let mut name: String = raw
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if name.is_empty() {
        name.push_str("unnamed");
    }
    if name.starts_with(|c: char| c.is_numeric()) {
        name.insert(0, '_');
    }
    if RESERVED_WORDS.contains(&name.as_str()) {
        name.push('_');
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_escapes_python_specials() {
        assert_eq!(quote("Temp: "), "'Temp: '");
        assert_eq!(quote("it's"), "'it\\'s'");
        assert_eq!(quote("a\\b\nc"), "'a\\\\b\\nc'");
    }

    #[test]
    fn identifiers_are_sanitized() {
        assert_eq!(python_identifier("temperature"), "temperature");
        assert_eq!(python_identifier("motor speed"), "motor_speed");
        assert_eq!(python_identifier("2nd"), "_2nd");
        assert_eq!(python_identifier("class"), "class_");
        assert_eq!(python_identifier("time"), "time_");
        assert_eq!(python_identifier(""), "unnamed");
        assert_eq!(python_identifier("température"), "température");
    }

    #[test]
    fn indent_skips_blank_lines() {
        assert_eq!(indent_lines("a\n\nb\n", "  "), "  a\n\n  b\n");
    }

    #[test]
    fn parens_follow_precedence() {
        let sum = Expr::new("a + b", Precedence::Additive);
        assert_eq!(sum.in_context(Precedence::Multiplicative), "(a + b)");
        let call = Expr::new("f(x)", Precedence::FunctionCall);
        assert_eq!(call.in_context(Precedence::Multiplicative), "f(x)");
        assert_eq!(Expr::new("", Precedence::None).in_context(Precedence::Atomic), "");
    }
}

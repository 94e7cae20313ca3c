//! # Block Registry
//!
//! Schemas for every block type together with the rule that turns an
//! instance of it into script text.
//!
//! Emission rules form a closed enum rather than a table of callbacks, so
//! the set of things a block can emit is known up front and every variant
//! is covered by the emitter's `match`.

use crate::error::{CompileError, Result};
use std::collections::BTreeMap;

/// Kind of value an expression block produces or a socket accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Number,
    String,
    Boolean,
    Array,
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketKind {
    /// Accepts one expression block
    Value(ValueKind),
    /// Family of value sockets `PREFIX0..PREFIXn`; `n` comes from the
    /// instance's mutation
    RepeatedValue { prefix: String, kind: ValueKind },
    /// Accepts a chain of statement blocks
    Statement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketDecl {
    pub name: String,
    pub kind: SocketKind,
}

impl SocketDecl {
    pub fn value(name: &str, kind: ValueKind) -> Self {
        Self { name: name.to_string(), kind: SocketKind::Value(kind) }
    }

    pub fn repeated(prefix: &str, kind: ValueKind) -> Self {
        Self {
            name: prefix.to_string(),
            kind: SocketKind::RepeatedValue { prefix: prefix.to_string(), kind },
        }
    }

    pub fn statement(name: &str) -> Self {
        Self { name: name.to_string(), kind: SocketKind::Statement }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text { default: String },
    Number { default: String },
    /// `(label, value)` pairs; the first option is the default
    Dropdown { options: Vec<(String, String)> },
    Variable { default: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldDecl {
    pub fn text(name: &str, default: &str) -> Self {
        Self { name: name.to_string(), kind: FieldKind::Text { default: default.to_string() } }
    }

    pub fn number(name: &str, default: &str) -> Self {
        Self { name: name.to_string(), kind: FieldKind::Number { default: default.to_string() } }
    }

    pub fn dropdown(name: &str, options: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Dropdown {
                options: options
                    .iter()
                    .map(|(label, value)| (label.to_string(), value.to_string()))
                    .collect(),
            },
        }
    }

    pub fn variable(name: &str, default: &str) -> Self {
        Self { name: name.to_string(), kind: FieldKind::Variable { default: default.to_string() } }
    }

    /// Value used when an instance leaves the field unset.
    pub fn default_value(&self) -> &str {
        match &self.kind {
            FieldKind::Text { default }
            | FieldKind::Number { default }
            | FieldKind::Variable { default } => default,
            FieldKind::Dropdown { options } => {
                options.first().map(|(_, value)| value.as_str()).unwrap_or("")
            }
        }
    }
}

/// Schema of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockType {
    pub name: String,
    pub sockets: Vec<SocketDecl>,
    pub fields: Vec<FieldDecl>,
    /// `None` for statement blocks
    pub output: Option<ValueKind>,
    /// Whether the block has previous/next connections
    pub chainable: bool,
}

impl BlockType {
    /// A chainable statement block.
    pub fn statement(name: &str) -> Self {
        Self {
            name: name.to_string(),
            sockets: Vec::new(),
            fields: Vec::new(),
            output: None,
            chainable: true,
        }
    }

    /// An expression block producing `kind`.
    pub fn expression(name: &str, kind: ValueKind) -> Self {
        Self {
            name: name.to_string(),
            sockets: Vec::new(),
            fields: Vec::new(),
            output: Some(kind),
            chainable: false,
        }
    }

    pub fn with_socket(mut self, socket: SocketDecl) -> Self {
        self.sockets.push(socket);
        self
    }

    pub fn with_field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    pub fn is_expression(&self) -> bool {
        self.output.is_some()
    }

    pub fn field_decl(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Python operator binding strength, tightest first.
///
/// A child expression whose precedence compares greater than its context
/// binds looser and must be wrapped in parentheses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precedence {
    #[default]
    Atomic,
    Collection,
    FunctionCall,
    Exponentiation,
    UnarySign,
    Multiplicative,
    Additive,
    Relational,
    LogicalNot,
    LogicalAnd,
    LogicalOr,
    Conditional,
    /// Standalone context; nothing needs wrapping
    None,
}

impl Precedence {
    /// One step tighter. Used for operands where equal precedence would
    /// regroup the expression (`a - (b - c)`).
    pub fn tighter(self) -> Self {
        match self {
            Self::Atomic | Self::Collection => Self::Atomic,
            Self::FunctionCall => Self::Collection,
            Self::Exponentiation => Self::FunctionCall,
            Self::UnarySign => Self::Exponentiation,
            Self::Multiplicative => Self::UnarySign,
            Self::Additive => Self::Multiplicative,
            Self::Relational => Self::Additive,
            Self::LogicalNot => Self::Relational,
            Self::LogicalAnd => Self::LogicalNot,
            Self::LogicalOr => Self::LogicalAnd,
            Self::Conditional => Self::LogicalOr,
            Self::None => Self::Conditional,
        }
    }

    pub fn needs_parens_in(self, context: Precedence) -> bool {
        self > context
    }
}

/// Where a call argument takes its text from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgSource {
    /// Emitted expression in a value socket; empty when disconnected
    Socket(String),
    /// Field value written as a quoted string literal
    QuotedField(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    pub source: ArgSource,
    /// Emit as `keyword=value`
    pub keyword: Option<String>,
    /// Drop the argument entirely when its socket is disconnected
    pub optional: bool,
}

impl Arg {
    pub fn socket(name: &str) -> Self {
        Self { source: ArgSource::Socket(name.to_string()), keyword: None, optional: false }
    }

    pub fn field(name: &str) -> Self {
        Self { source: ArgSource::QuotedField(name.to_string()), keyword: None, optional: false }
    }

    pub fn keyword(mut self, keyword: &str) -> Self {
        self.keyword = Some(keyword.to_string());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// How a block type becomes script text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitRule {
    /// `function(args...)`, as an expression or a statement line
    Call { function: String, args: Vec<Arg> },
    /// `math_number`: field `NUM`
    Number,
    /// `text`: field `TEXT` as a string literal
    Text,
    /// `logic_boolean`: field `BOOL`
    Boolean,
    /// `variables_get`: field `VAR`
    VariableGet,
    /// `variables_set`: field `VAR`, socket `VALUE`
    VariableSet,
    /// `logic_compare`: field `OP`, sockets `A`, `B`
    Compare,
    /// `math_arithmetic`: field `OP`, sockets `A`, `B`
    Arithmetic,
    /// `logic_operation`: field `OP`, sockets `A`, `B`
    Logic,
    /// `logic_negate`: socket `BOOL`
    Negate,
    /// `controls_if`: sockets `IFn`/`DOn`, optional `ELSE`
    If,
    /// `controls_whileUntil`: field `MODE`, socket `BOOL`, body `DO`
    WhileUntil,
    /// `controls_repeat_ext`: socket `TIMES`, body `DO`
    Repeat,
    /// `text_join`: sockets `ADD0..n`
    TextJoin,
    /// `lists_create_with`: sockets `ADD0..n`
    ListCreate,
    /// `text_print`: socket `TEXT`
    Print,
}

impl EmitRule {
    pub fn call(function: &str, args: Vec<Arg>) -> Self {
        EmitRule::Call { function: function.to_string(), args }
    }
}

/// Registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredBlock {
    pub block_type: BlockType,
    pub rule: EmitRule,
}

/// Lookup table from block-type name to schema and emission rule.
///
/// Built once, then passed by reference into every compilation.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    blocks: BTreeMap<String, RegisteredBlock>,
}

impl BlockRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a block type.
    ///
    /// Registering the exact same definition twice is a no-op; a different
    /// definition under an existing name is rejected.
    pub fn register(&mut self, block_type: BlockType, rule: EmitRule) -> Result<()> {
        let entry = RegisteredBlock { block_type, rule };
        if let Some(existing) = self.blocks.get(&entry.block_type.name) {
            if *existing == entry {
                return Ok(());
            }
            return Err(CompileError::DuplicateType(entry.block_type.name));
        }
        self.blocks.insert(entry.block_type.name.clone(), entry);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<(&BlockType, &EmitRule)> {
        self.blocks
            .get(name)
            .map(|entry| (&entry.block_type, &entry.rule))
            .ok_or_else(|| CompileError::UnknownType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.blocks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Entries sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredBlock> {
        self.blocks.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wait_block() -> (BlockType, EmitRule) {
        (
            BlockType::statement("wait").with_socket(SocketDecl::value("SECONDS", ValueKind::Number)),
            EmitRule::call("time.sleep", vec![Arg::socket("SECONDS")]),
        )
    }

    #[test]
    fn lookup_returns_registered_definition() {
        let mut registry = BlockRegistry::new();
        let (ty, rule) = wait_block();
        registry.register(ty.clone(), rule.clone()).unwrap();

        let (found_ty, found_rule) = registry.lookup("wait").unwrap();
        assert_eq!(found_ty, &ty);
        assert_eq!(found_rule, &rule);
    }

    #[test]
    fn identical_reregistration_is_allowed() {
        let mut registry = BlockRegistry::new();
        let (ty, rule) = wait_block();
        registry.register(ty.clone(), rule.clone()).unwrap();
        registry.register(ty, rule).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn conflicting_rule_is_a_duplicate() {
        let mut registry = BlockRegistry::new();
        let (ty, rule) = wait_block();
        registry.register(ty.clone(), rule).unwrap();

        let err = registry
            .register(ty, EmitRule::call("pause", vec![Arg::socket("SECONDS")]))
            .unwrap_err();
        assert!(matches!(err, CompileError::DuplicateType(ref name) if name == "wait"));
    }

    #[test]
    fn missing_type_is_unknown() {
        let registry = BlockRegistry::new();
        assert!(matches!(
            registry.lookup("nope"),
            Err(CompileError::UnknownType(ref name)) if name == "nope"
        ));
    }

    #[test]
    fn precedence_parenthesization() {
        assert!(!Precedence::Atomic.needs_parens_in(Precedence::Multiplicative));
        assert!(!Precedence::FunctionCall.needs_parens_in(Precedence::Multiplicative));
        assert!(Precedence::Additive.needs_parens_in(Precedence::Multiplicative));
        assert!(!Precedence::LogicalOr.needs_parens_in(Precedence::None));
        assert!(Precedence::Additive.needs_parens_in(Precedence::Additive.tighter()));
    }

    #[test]
    fn dropdown_default_is_first_option() {
        let field = FieldDecl::dropdown("UNIT", &[("°C", "CELSIUS"), ("°F", "FAHRENHEIT")]);
        assert_eq!(field.default_value(), "CELSIUS");
    }
}

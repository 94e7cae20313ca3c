//! Generic editor blocks: control flow, logic, math, text, variables, lists.

use crate::error::Result;
use crate::registry::{
    BlockRegistry, BlockType, EmitRule, FieldDecl, SocketDecl, ValueKind,
};

pub(super) fn register(registry: &mut BlockRegistry) -> Result<()> {
    // Control flow
    registry.register(
        BlockType::statement("controls_if")
            .with_socket(SocketDecl::value("IF0", ValueKind::Boolean))
            .with_socket(SocketDecl::statement("DO0"))
            .with_socket(SocketDecl::statement("ELSE")),
        EmitRule::If,
    )?;
    registry.register(
        BlockType::statement("controls_whileUntil")
            .with_field(FieldDecl::dropdown("MODE", &[("while", "WHILE"), ("until", "UNTIL")]))
            .with_socket(SocketDecl::value("BOOL", ValueKind::Boolean))
            .with_socket(SocketDecl::statement("DO")),
        EmitRule::WhileUntil,
    )?;
    registry.register(
        BlockType::statement("controls_repeat_ext")
            .with_socket(SocketDecl::value("TIMES", ValueKind::Number))
            .with_socket(SocketDecl::statement("DO")),
        EmitRule::Repeat,
    )?;

    // Logic
    registry.register(
        BlockType::expression("logic_compare", ValueKind::Boolean)
            .with_field(FieldDecl::dropdown(
                "OP",
                &[
                    ("=", "EQ"),
                    ("\u{2260}", "NEQ"),
                    ("<", "LT"),
                    ("\u{2264}", "LTE"),
                    (">", "GT"),
                    ("\u{2265}", "GTE"),
                ],
            ))
            .with_socket(SocketDecl::value("A", ValueKind::Any))
            .with_socket(SocketDecl::value("B", ValueKind::Any)),
        EmitRule::Compare,
    )?;
    registry.register(
        BlockType::expression("logic_operation", ValueKind::Boolean)
            .with_field(FieldDecl::dropdown("OP", &[("and", "AND"), ("or", "OR")]))
            .with_socket(SocketDecl::value("A", ValueKind::Boolean))
            .with_socket(SocketDecl::value("B", ValueKind::Boolean)),
        EmitRule::Logic,
    )?;
    registry.register(
        BlockType::expression("logic_negate", ValueKind::Boolean)
            .with_socket(SocketDecl::value("BOOL", ValueKind::Boolean)),
        EmitRule::Negate,
    )?;
    registry.register(
        BlockType::expression("logic_boolean", ValueKind::Boolean)
            .with_field(FieldDecl::dropdown("BOOL", &[("true", "TRUE"), ("false", "FALSE")])),
        EmitRule::Boolean,
    )?;

    // Math
    registry.register(
        BlockType::expression("math_number", ValueKind::Number)
            .with_field(FieldDecl::number("NUM", "0")),
        EmitRule::Number,
    )?;
    registry.register(
        BlockType::expression("math_arithmetic", ValueKind::Number)
            .with_field(FieldDecl::dropdown(
                "OP",
                &[
                    ("+", "ADD"),
                    ("-", "MINUS"),
                    ("\u{d7}", "MULTIPLY"),
                    ("\u{f7}", "DIVIDE"),
                    ("^", "POWER"),
                ],
            ))
            .with_socket(SocketDecl::value("A", ValueKind::Number))
            .with_socket(SocketDecl::value("B", ValueKind::Number)),
        EmitRule::Arithmetic,
    )?;

    // Text
    registry.register(
        BlockType::expression("text", ValueKind::String).with_field(FieldDecl::text("TEXT", "")),
        EmitRule::Text,
    )?;
    registry.register(
        BlockType::expression("text_join", ValueKind::String)
            .with_socket(SocketDecl::repeated("ADD", ValueKind::Any)),
        EmitRule::TextJoin,
    )?;
    registry.register(
        BlockType::statement("text_print").with_socket(SocketDecl::value("TEXT", ValueKind::Any)),
        EmitRule::Print,
    )?;

    // Variables
    registry.register(
        BlockType::expression("variables_get", ValueKind::Any)
            .with_field(FieldDecl::variable("VAR", "item")),
        EmitRule::VariableGet,
    )?;
    registry.register(
        BlockType::statement("variables_set")
            .with_field(FieldDecl::variable("VAR", "item"))
            .with_socket(SocketDecl::value("VALUE", ValueKind::Any)),
        EmitRule::VariableSet,
    )?;

    // Lists
    registry.register(
        BlockType::expression("lists_create_with", ValueKind::Array)
            .with_socket(SocketDecl::repeated("ADD", ValueKind::Any)),
        EmitRule::ListCreate,
    )?;

    Ok(())
}

//! # Block-Specific Handlers
//!
//! One arm per [`EmitRule`] variant. Expression rules return an [`Expr`]
//! carrying the operator precedence of the generated code; statement rules
//! return newline-terminated lines.

use super::python_codegen::{quote, Expr, ScriptGenerator};
use crate::error::Result;
use crate::graph::BlockInstance;
use crate::registry::{Arg, ArgSource, EmitRule, Precedence};

impl<'a> ScriptGenerator<'a> {
    pub(super) fn emit_rule_expression(
        &mut self,
        block: &BlockInstance,
        rule: &EmitRule,
    ) -> Result<Expr> {
        let expr = match rule {
            EmitRule::Call { function, args } => {
                let args = self.call_arguments(block, args)?;
                Expr::new(format!("{}({})", function, args), Precedence::FunctionCall)
            }
            EmitRule::Number => number_literal(self.field(block, "NUM")),
            EmitRule::Text => Expr::atomic(quote(self.field(block, "TEXT"))),
            EmitRule::Boolean => {
                let value = if self.field(block, "BOOL") == "FALSE" { "False" } else { "True" };
                Expr::atomic(value)
            }
            EmitRule::VariableGet => {
                let raw = self.field(block, "VAR").to_string();
                Expr::atomic(self.declare_variable(&raw))
            }
            EmitRule::Compare => {
                let op = match self.field(block, "OP") {
                    "NEQ" => "!=",
                    "LT" => "<",
                    "LTE" => "<=",
                    "GT" => ">",
                    "GTE" => ">=",
                    _ => "==",
                };
                // Python chains comparisons, so nested ones always get parens
                let context = Precedence::Relational.tighter();
                let a = self.value_to_code(block, "A", context)?;
                let b = self.value_to_code(block, "B", context)?;
                Expr::new(format!("{} {} {}", a, op, b), Precedence::Relational)
            }
            EmitRule::Arithmetic => {
                let (op, precedence, commutative) = match self.field(block, "OP") {
                    "MINUS" => ("-", Precedence::Additive, false),
                    "MULTIPLY" => ("*", Precedence::Multiplicative, true),
                    "DIVIDE" => ("/", Precedence::Multiplicative, false),
                    "POWER" => ("**", Precedence::Exponentiation, false),
                    _ => ("+", Precedence::Additive, true),
                };
                // `**` groups to the right; the other operators to the left
                let (left, right) = if op == "**" {
                    (precedence.tighter(), precedence)
                } else if commutative {
                    (precedence, precedence)
                } else {
                    (precedence, precedence.tighter())
                };
                let a = self.value_to_code(block, "A", left)?;
                let b = self.value_to_code(block, "B", right)?;
                Expr::new(format!("{} {} {}", a, op, b), precedence)
            }
            EmitRule::Logic => {
                let (op, precedence) = match self.field(block, "OP") {
                    "OR" => ("or", Precedence::LogicalOr),
                    _ => ("and", Precedence::LogicalAnd),
                };
                let a = self.value_to_code(block, "A", precedence)?;
                let b = self.value_to_code(block, "B", precedence)?;
                Expr::new(format!("{} {} {}", a, op, b), precedence)
            }
            EmitRule::Negate => {
                let value = self.value_to_code(block, "BOOL", Precedence::LogicalNot)?;
                Expr::new(format!("not {}", value), Precedence::LogicalNot)
            }
            EmitRule::TextJoin => {
                let parts = self.repeated_values(block, "ADD", Precedence::None)?;
                match parts.len() {
                    0 => Expr::atomic("''"),
                    1 => Expr::new(format!("str({})", parts[0]), Precedence::FunctionCall),
                    _ => {
                        let joined = parts
                            .iter()
                            .map(|part| format!("str({})", part))
                            .collect::<Vec<_>>()
                            .join(" + ");
                        Expr::new(joined, Precedence::Additive)
                    }
                }
            }
            EmitRule::ListCreate => {
                let items = self.repeated_values(block, "ADD", Precedence::None)?;
                Expr::atomic(format!("[{}]", items.join(", ")))
            }
            // Statement rules have no value
            EmitRule::VariableSet
            | EmitRule::If
            | EmitRule::WhileUntil
            | EmitRule::Repeat
            | EmitRule::Print => Expr::atomic(""),
        };
        Ok(expr)
    }

    pub(super) fn emit_rule_statement(
        &mut self,
        block: &BlockInstance,
        rule: &EmitRule,
    ) -> Result<String> {
        let code = match rule {
            EmitRule::Call { function, args } => {
                let args = self.call_arguments(block, args)?;
                format!("{}({})\n", function, args)
            }
            EmitRule::VariableSet => {
                let raw = self.field(block, "VAR").to_string();
                let name = self.declare_variable(&raw);
                let value = self.value_to_code(block, "VALUE", Precedence::None)?;
                format!("{} = {}\n", name, value)
            }
            EmitRule::If => {
                let mut code = String::new();
                for branch in 0..=block.mutation.else_if {
                    let keyword = if branch == 0 { "if" } else { "elif" };
                    let condition =
                        self.value_to_code(block, &format!("IF{}", branch), Precedence::None)?;
                    code.push_str(&format!("{} {}:\n", keyword, condition));
                    code.push_str(&self.statement_body(block, &format!("DO{}", branch))?);
                }
                if block.mutation.has_else || block.statements.contains_key("ELSE") {
                    code.push_str("else:\n");
                    code.push_str(&self.statement_body(block, "ELSE")?);
                }
                code
            }
            EmitRule::WhileUntil => {
                let condition = if self.field(block, "MODE") == "UNTIL" {
                    let value = self.value_to_code(block, "BOOL", Precedence::LogicalNot)?;
                    format!("not {}", value)
                } else {
                    self.value_to_code(block, "BOOL", Precedence::None)?
                };
                format!("while {}:\n{}", condition, self.statement_body(block, "DO")?)
            }
            EmitRule::Repeat => {
                let times = self.value_to_code(block, "TIMES", Precedence::None)?;
                let times = if times.parse::<u64>().is_ok() {
                    times
                } else {
                    format!("int({})", times)
                };
                format!(
                    "for count in range({}):\n{}",
                    times,
                    self.statement_body(block, "DO")?
                )
            }
            EmitRule::Print => {
                let value = self.value_to_code(block, "TEXT", Precedence::None)?;
                format!("print({})\n", value)
            }
            // Expression rules used as a statement: evaluate and discard
            EmitRule::Number
            | EmitRule::Text
            | EmitRule::Boolean
            | EmitRule::VariableGet
            | EmitRule::Compare
            | EmitRule::Arithmetic
            | EmitRule::Logic
            | EmitRule::Negate
            | EmitRule::TextJoin
            | EmitRule::ListCreate => {
                format!("{}\n", self.emit_rule_expression(block, rule)?.code)
            }
        };
        Ok(code)
    }

    /// Comma-separated argument list for a call rule.
    fn call_arguments(&mut self, block: &BlockInstance, args: &[Arg]) -> Result<String> {
        let mut rendered = Vec::with_capacity(args.len());
        for arg in args {
            let value = match &arg.source {
                ArgSource::Socket(socket) => self.value_to_code(block, socket, Precedence::None)?,
                ArgSource::QuotedField(field) => quote(self.field(block, field)),
            };
            if arg.optional && value.is_empty() {
                continue;
            }
            match &arg.keyword {
                Some(keyword) => rendered.push(format!("{}={}", keyword, value)),
                None => rendered.push(value),
            }
        }
        Ok(rendered.join(", "))
    }

    /// Values of the socket family `PREFIX0..PREFIXn`, where `n` is the
    /// instance's item count.
    fn repeated_values(
        &mut self,
        block: &BlockInstance,
        prefix: &str,
        context: Precedence,
    ) -> Result<Vec<String>> {
        (0..block.mutation.items)
            .map(|i| self.value_to_code(block, &format!("{}{}", prefix, i), context))
            .collect()
    }

    /// Field value set on the instance, else the declared default.
    fn field<'b>(&self, block: &'b BlockInstance, name: &str) -> &'b str
    where
        'a: 'b,
    {
        if let Some(value) = block.field(name) {
            return value;
        }
        self.registry
            .lookup(&block.block_type)
            .ok()
            .and_then(|(block_type, _)| block_type.field_decl(name))
            .map(|decl| decl.default_value())
            .unwrap_or("")
    }
}

/// Python literal for a number field.
fn number_literal(raw: &str) -> Expr {
    let raw = raw.trim();
    // Integers are printed exactly; f64 loses digits past 2^53
    let code = if let Ok(int) = raw.parse::<i128>() {
        int.to_string()
    } else {
        float_literal(raw.parse::<f64>().unwrap_or(0.0))
    };

    let precedence = if code.starts_with('-') {
        Precedence::UnarySign
    } else if code.starts_with("float") {
        Precedence::FunctionCall
    } else {
        Precedence::Atomic
    };
    Expr::new(code, precedence)
}

fn float_literal(value: f64) -> String {
    if value.is_nan() {
        "float('nan')".to_string()
    } else if value.is_infinite() {
        let sign = if value > 0.0 { "" } else { "-" };
        format!("{}float('inf')", sign)
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_literals() {
        assert_eq!(number_literal("5"), Expr::atomic("5"));
        assert_eq!(number_literal("5.0"), Expr::atomic("5"));
        assert_eq!(number_literal("0.7"), Expr::atomic("0.7"));
        assert_eq!(number_literal("abc"), Expr::atomic("0"));
        assert_eq!(number_literal("-3"), Expr::new("-3", Precedence::UnarySign));
        assert_eq!(number_literal("inf").code, "float('inf')");
        assert_eq!(number_literal(" 42 "), Expr::atomic("42"));
        assert_eq!(
            number_literal("12345678901234567890"),
            Expr::atomic("12345678901234567890")
        );
        assert_eq!(
            number_literal("-12345678901234567890"),
            Expr::new("-12345678901234567890", Precedence::UnarySign)
        );
    }
}

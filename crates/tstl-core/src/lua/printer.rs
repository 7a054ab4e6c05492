//! Renders an emitted Lua AST to source text. The transformer never prints;
//! it hands a finished [`Block`] to this printer.

use super::ast::*;
use crate::symbols::NameMangler;

/// Operator precedence, per the Lua reference manual. Higher binds tighter.
fn binary_precedence(op: BinaryOperator) -> (u8, u8) {
    use BinaryOperator::*;
    // (left, right) binding powers; right-associative ops bind looser on
    // the left side of their own level.
    match op {
        Or => (1, 2),
        And => (3, 4),
        Equal | NotEqual | LessThan | LessThanOrEqual | GreaterThan | GreaterThanOrEqual => (5, 6),
        BitwiseOr => (7, 8),
        BitwiseXor => (9, 10),
        BitwiseAnd => (11, 12),
        ShiftLeft | ShiftRight => (13, 14),
        Concat => (18, 17),
        Add | Subtract => (19, 20),
        Multiply | Divide | Modulo => (21, 22),
        Power => (28, 27),
    }
}

const UNARY_PRECEDENCE: u8 = 25;

fn binary_operator_str(op: BinaryOperator) -> &'static str {
    use BinaryOperator::*;
    match op {
        Add => "+",
        Subtract => "-",
        Multiply => "*",
        Divide => "/",
        Modulo => "%",
        Power => "^",
        Concat => "..",
        Equal => "==",
        NotEqual => "~=",
        LessThan => "<",
        LessThanOrEqual => "<=",
        GreaterThan => ">",
        GreaterThanOrEqual => ">=",
        And => "and",
        Or => "or",
        BitwiseAnd => "&",
        BitwiseOr => "|",
        BitwiseXor => "~",
        ShiftLeft => "<<",
        ShiftRight => ">>",
    }
}

fn unary_operator_str(op: UnaryOperator) -> &'static str {
    match op {
        UnaryOperator::Negate => "-",
        UnaryOperator::Not => "not ",
        UnaryOperator::Length => "#",
        UnaryOperator::BitwiseNot => "~",
    }
}

pub struct LuaPrinter {
    output: String,
    indent_level: usize,
    indent_str: String,
}

impl Default for LuaPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl LuaPrinter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            indent_str: "    ".to_string(),
        }
    }

    /// Print a chunk and return the Lua source.
    pub fn print(mut self, block: &Block) -> String {
        for statement in &block.statements {
            self.print_statement(statement);
        }
        self.output
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn dedent(&mut self) {
        self.indent_level -= 1;
    }

    fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str(&self.indent_str);
        }
    }

    fn writeln(&mut self, text: &str) {
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn print_block_indented(&mut self, block: &Block) {
        self.indent();
        for statement in &block.statements {
            self.print_statement(statement);
        }
        self.dedent();
    }

    pub fn print_statement(&mut self, statement: &Statement) {
        match &statement.kind {
            StatementKind::Do(block) => {
                self.write_indent();
                self.writeln("do");
                self.print_block_indented(block);
                self.write_indent();
                self.writeln("end");
            }
            StatementKind::LocalDeclaration { names, expressions } => {
                self.write_indent();
                self.write("local ");
                for (i, name) in names.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.write(&name.text);
                }
                if !expressions.is_empty() {
                    self.write(" = ");
                    self.print_expression_list(expressions);
                }
                self.writeln("");
            }
            StatementKind::Assignment { targets, expressions } => {
                self.write_indent();
                self.print_expression_list(targets);
                self.write(" = ");
                self.print_expression_list(expressions);
                self.writeln("");
            }
            StatementKind::If {
                condition,
                then_block,
                else_block,
            } => {
                self.write_indent();
                self.write("if ");
                self.print_expression(condition, 0);
                self.writeln(" then");
                self.print_block_indented(then_block);
                if let Some(else_block) = else_block {
                    self.write_indent();
                    self.writeln("else");
                    self.print_block_indented(else_block);
                }
                self.write_indent();
                self.writeln("end");
            }
            StatementKind::While { condition, body } => {
                self.write_indent();
                self.write("while ");
                self.print_expression(condition, 0);
                self.writeln(" do");
                self.print_block_indented(body);
                self.write_indent();
                self.writeln("end");
            }
            StatementKind::Repeat { body, until } => {
                self.write_indent();
                self.writeln("repeat");
                self.print_block_indented(body);
                self.write_indent();
                self.write("until ");
                self.print_expression(until, 0);
                self.writeln("");
            }
            StatementKind::NumericFor {
                variable,
                start,
                limit,
                step,
                body,
            } => {
                self.write_indent();
                self.write("for ");
                self.write(&variable.text);
                self.write(" = ");
                self.print_expression(start, 0);
                self.write(", ");
                self.print_expression(limit, 0);
                if let Some(step) = step {
                    self.write(", ");
                    self.print_expression(step, 0);
                }
                self.writeln(" do");
                self.print_block_indented(body);
                self.write_indent();
                self.writeln("end");
            }
            StatementKind::GenericFor {
                variables,
                expressions,
                body,
            } => {
                self.write_indent();
                self.write("for ");
                for (i, variable) in variables.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.write(&variable.text);
                }
                self.write(" in ");
                self.print_expression_list(expressions);
                self.writeln(" do");
                self.print_block_indented(body);
                self.write_indent();
                self.writeln("end");
            }
            StatementKind::Return(expressions) => {
                self.write_indent();
                self.write("return");
                if !expressions.is_empty() {
                    self.write(" ");
                    self.print_expression_list(expressions);
                }
                self.writeln("");
            }
            StatementKind::Break => {
                self.write_indent();
                self.writeln("break");
            }
            StatementKind::Goto(label) => {
                self.write_indent();
                self.write("goto ");
                self.writeln(label);
            }
            StatementKind::Label(name) => {
                self.write_indent();
                self.write("::");
                self.write(name);
                self.writeln("::");
            }
            StatementKind::Expression(expression) => {
                self.write_indent();
                self.print_expression(expression, 0);
                self.writeln("");
            }
        }
    }

    fn print_expression_list(&mut self, expressions: &[Expression]) {
        for (i, expression) in expressions.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_expression(expression, 0);
        }
    }

    /// Print an expression, parenthesizing when its precedence is below the
    /// minimum the context requires.
    fn print_expression(&mut self, expression: &Expression, min_precedence: u8) {
        match &expression.kind {
            ExpressionKind::Nil => self.write("nil"),
            ExpressionKind::True => self.write("true"),
            ExpressionKind::False => self.write("false"),
            ExpressionKind::Dots => self.write("..."),
            ExpressionKind::Number(value) => {
                let text = format_number(*value);
                self.write(&text);
            }
            ExpressionKind::String(value) => {
                let escaped = escape_string(value);
                self.write(&escaped);
            }
            ExpressionKind::Identifier(ident) => self.write(&ident.text),
            ExpressionKind::Binary { op, left, right } => {
                let (left_bp, right_bp) = binary_precedence(*op);
                let needs_parens = left_bp.min(right_bp) < min_precedence;
                if needs_parens {
                    self.write("(");
                }
                self.print_expression(left, left_bp);
                let op_str = binary_operator_str(*op);
                self.write(&format!(" {op_str} "));
                self.print_expression(right, right_bp);
                if needs_parens {
                    self.write(")");
                }
            }
            ExpressionKind::Unary { op, operand } => {
                let needs_parens = UNARY_PRECEDENCE < min_precedence;
                if needs_parens {
                    self.write("(");
                }
                self.write(unary_operator_str(*op));
                self.print_expression(operand, UNARY_PRECEDENCE);
                if needs_parens {
                    self.write(")");
                }
            }
            ExpressionKind::Index { table, key } => {
                self.print_prefix_expression(table);
                match &key.kind {
                    ExpressionKind::String(name)
                        if NameMangler::is_valid_lua_identifier(name)
                            && !crate::symbols::LUA_KEYWORDS.contains(&name.as_str()) =>
                    {
                        self.write(".");
                        self.write(name);
                    }
                    _ => {
                        self.write("[");
                        self.print_expression(key, 0);
                        self.write("]");
                    }
                }
            }
            ExpressionKind::Call { function, arguments } => {
                self.print_prefix_expression(function);
                self.write("(");
                self.print_expression_list(arguments);
                self.write(")");
            }
            ExpressionKind::MethodCall {
                table,
                method,
                arguments,
            } => {
                self.print_prefix_expression(table);
                self.write(":");
                self.write(method);
                self.write("(");
                self.print_expression_list(arguments);
                self.write(")");
            }
            ExpressionKind::Function(body) => {
                self.write("function(");
                for (i, parameter) in body.parameters.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.write(&parameter.text);
                }
                if body.is_vararg {
                    if !body.parameters.is_empty() {
                        self.write(", ");
                    }
                    self.write("...");
                }
                self.writeln(")");
                self.print_block_indented(&body.body);
                self.write_indent();
                self.write("end");
            }
            ExpressionKind::Table(fields) => {
                if fields.is_empty() {
                    self.write("{}");
                    return;
                }
                self.writeln("{");
                self.indent();
                for field in fields {
                    self.write_indent();
                    match field {
                        TableField::Positional(value) => self.print_expression(value, 0),
                        TableField::Named { key, value } => {
                            if NameMangler::is_valid_lua_identifier(key)
                                && !crate::symbols::LUA_KEYWORDS.contains(&key.as_str())
                            {
                                self.write(key);
                            } else {
                                self.write("[");
                                let escaped = escape_string(key);
                                self.write(&escaped);
                                self.write("]");
                            }
                            self.write(" = ");
                            self.print_expression(value, 0);
                        }
                        TableField::Keyed { key, value } => {
                            self.write("[");
                            self.print_expression(key, 0);
                            self.write("]");
                            self.write(" = ");
                            self.print_expression(value, 0);
                        }
                    }
                    self.writeln(",");
                }
                self.dedent();
                self.write_indent();
                self.write("}");
            }
            ExpressionKind::Parenthesized(inner) => {
                self.write("(");
                self.print_expression(inner, 0);
                self.write(")");
            }
        }
    }

    /// Prefix expressions (call/index receivers) must themselves be a name,
    /// index, call or parenthesized expression in Lua's grammar.
    fn print_prefix_expression(&mut self, expression: &Expression) {
        let is_prefix = matches!(
            expression.kind,
            ExpressionKind::Identifier(_)
                | ExpressionKind::Index { .. }
                | ExpressionKind::Call { .. }
                | ExpressionKind::MethodCall { .. }
                | ExpressionKind::Parenthesized(_)
        );
        if is_prefix {
            self.print_expression(expression, 0);
        } else {
            self.write("(");
            self.print_expression(expression, 0);
            self.write(")");
        }
    }
}

fn format_number(value: f64) -> String {
    if value.is_infinite() {
        // Never reached for transformer output (math.huge is emitted
        // instead), kept total for hand-built ASTs.
        return if value > 0.0 {
            "math.huge".to_string()
        } else {
            "-math.huge".to_string()
        };
    }
    if value == value.trunc() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn escape_string(value: &str) -> String {
    let mut result = String::with_capacity(value.len() + 2);
    result.push('"');
    for c in value.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\0' => result.push_str("\\0"),
            _ => result.push(c),
        }
    }
    result.push('"');
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn print_expr(expression: Expression) -> String {
        let block = Block::new(vec![Statement::ret(vec![expression], None)]);
        LuaPrinter::new().print(&block)
    }

    #[test]
    fn test_member_access_prints_dotted() {
        let expr = Expression::member(Expression::name("t", None), "field", None);
        assert_eq!(print_expr(expr), "return t.field\n");
    }

    #[test]
    fn test_keyword_key_prints_bracketed() {
        let expr = Expression::member(Expression::name("t", None), "end", None);
        assert_eq!(print_expr(expr), "return t[\"end\"]\n");
    }

    #[test]
    fn test_precedence_parens() {
        // (1 + 2) * 3 keeps its parens; 1 + 2 * 3 does not gain any.
        let sum = Expression::binary(
            BinaryOperator::Add,
            Expression::number(1.0, None),
            Expression::number(2.0, None),
            None,
        );
        let product = Expression::binary(
            BinaryOperator::Multiply,
            sum,
            Expression::number(3.0, None),
            None,
        );
        assert_eq!(print_expr(product), "return (1 + 2) * 3\n");

        let product2 = Expression::binary(
            BinaryOperator::Multiply,
            Expression::number(2.0, None),
            Expression::number(3.0, None),
            None,
        );
        let sum2 = Expression::binary(
            BinaryOperator::Add,
            Expression::number(1.0, None),
            product2,
            None,
        );
        assert_eq!(print_expr(sum2), "return 1 + 2 * 3\n");
    }

    #[test]
    fn test_and_or_chain_unparenthesized() {
        // cond and a or b must print without parens around the and-chain.
        let chain = Expression::binary(
            BinaryOperator::Or,
            Expression::binary(
                BinaryOperator::And,
                Expression::name("cond", None),
                Expression::name("a", None),
                None,
            ),
            Expression::name("b", None),
            None,
        );
        assert_eq!(print_expr(chain), "return cond and a or b\n");
    }

    #[test]
    fn test_method_call() {
        let call = Expression::method_call(
            Expression::name("obj", None),
            "greet",
            vec![Expression::string("hi", None)],
            None,
        );
        assert_eq!(print_expr(call), "return obj:greet(\"hi\")\n");
    }

    #[test]
    fn test_function_expression_receiver_is_wrapped() {
        let func = Expression::function(vec![], false, Block::default(), None);
        let call = Expression::call(func, vec![], None);
        let printed = print_expr(call);
        assert!(printed.starts_with("return (function()"));
        assert!(printed.contains("end)()"));
    }

    #[test]
    fn test_numeric_for() {
        let body = Block::new(vec![Statement::expression(
            Expression::call(
                Expression::name("print", None),
                vec![Expression::name("i", None)],
                None,
            ),
            None,
        )]);
        let stmt = Statement::new(
            StatementKind::NumericFor {
                variable: Identifier::new("i", None),
                start: Expression::number(1.0, None),
                limit: Expression::number(10.0, None),
                step: None,
                body,
            },
            None,
        );
        let printed = LuaPrinter::new().print(&Block::new(vec![stmt]));
        assert_eq!(printed, "for i = 1, 10 do\n    print(i)\nend\n");
    }

    #[test]
    fn test_goto_and_label() {
        let block = Block::new(vec![
            Statement::goto("done", None),
            Statement::label("done", None),
        ]);
        assert_eq!(LuaPrinter::new().print(&block), "goto done\n::done::\n");
    }

    #[test]
    fn test_string_escaping() {
        let expr = Expression::string("a\"b\nc", None);
        assert_eq!(print_expr(expr), "return \"a\\\"b\\nc\"\n");
    }

    #[test]
    fn test_concat_right_assoc_no_parens() {
        let concat = concat_parts(
            vec![
                Expression::string("a", None),
                Expression::string("b", None),
                Expression::string("c", None),
            ],
            None,
        );
        // Left-folded concat prints with parens on the left fold, which is
        // semantically identical; accept either shape but require all parts.
        let printed = print_expr(concat);
        assert!(printed.contains("\"a\""));
        assert!(printed.contains("\"b\""));
        assert!(printed.contains("\"c\""));
    }
}

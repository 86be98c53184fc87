use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use super::environment::Environment;
use super::error::RuntimeError;
use super::parser::TokenParser;
use crate::ast::{BinaryOp, Expr, ExprKind, LogicalOp, Stmt, UnaryOp, VarDecl};
use crate::diagnostic::Span;
use crate::value::{value_to_string, values_equal, Value};

/// Walks the AST and produces effects. Owns the environment chain; `print`
/// output goes through the writer so callers can capture it.
pub struct Interpreter {
    env: Environment,
    out: Rc<RefCell<dyn Write>>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_writer(Rc::new(RefCell::new(io::stdout())))
    }

    pub fn with_writer(out: Rc<RefCell<dyn Write>>) -> Self {
        Self {
            env: Environment::new(),
            out,
        }
    }

    /// Runs the statements in order. The first runtime error aborts the
    /// rest of the list and is returned for the caller to report.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for statement in statements {
            self.execute(statement)?;
        }
        Ok(())
    }

    fn execute(&mut self, statement: &Stmt) -> Result<(), RuntimeError> {
        match statement {
            Stmt::Expr(expr) => {
                self.evaluate(expr)?;
                Ok(())
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                let _ = writeln!(self.out.borrow_mut(), "{}", value_to_string(&value));
                Ok(())
            }
            Stmt::Var(decl) => self.declare(decl),
            Stmt::Vars(decls) => {
                for decl in decls {
                    self.declare(decl)?;
                }
                Ok(())
            }
            Stmt::Block(statements) => {
                self.env.push_scope();
                let result = self.execute_all(statements);
                // The pop pairs with the push on the error path too, so an
                // unwinding block still restores the enclosing scope.
                self.env.pop_scope();
                result
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }
                Ok(())
            }
        }
    }

    fn execute_all(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for statement in statements {
            self.execute(statement)?;
        }
        Ok(())
    }

    fn declare(&mut self, decl: &VarDecl) -> Result<(), RuntimeError> {
        let value = match &decl.initializer {
            Some(init) => self.evaluate(init)?,
            None => Value::Nil,
        };
        self.env.define(&decl.name, value);
        Ok(())
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match &expr.kind {
            ExprKind::Literal(value) => Ok(value.clone()),

            ExprKind::Grouping(inner) => self.evaluate(inner),

            ExprKind::Variable(name) => self
                .env
                .get(name)
                .ok_or_else(|| RuntimeError::undefined_variable(name.as_ref(), expr.span)),

            ExprKind::Assign { name, value } => {
                let value = self.evaluate(value)?;
                if self.env.assign(name, value.clone()) {
                    // Assignment is an expression; it yields the assigned
                    // value so chains and uses in larger expressions work.
                    Ok(value)
                } else {
                    Err(RuntimeError::undefined_variable(name.as_ref(), expr.span))
                }
            }

            ExprKind::Unary { op, expr: operand } => {
                let value = self.evaluate(operand)?;
                match op {
                    UnaryOp::Neg => match value {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(RuntimeError::operand_not_number(expr.span)),
                    },
                    UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                }
            }

            ExprKind::Binary { left, op, right } => {
                // Both sides evaluate before the operator dispatches.
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary_op(*op, left, right, expr.span)
            }

            ExprKind::Logical { left, op, right } => {
                let left = self.evaluate(left)?;
                match op {
                    // The deciding operand comes back as-is, not coerced to
                    // a boolean; the other side is never evaluated.
                    LogicalOp::Or if left.is_truthy() => Ok(left),
                    LogicalOp::And if !left.is_truthy() => Ok(left),
                    _ => self.evaluate(right),
                }
            }

            ExprKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }
        }
    }
}

fn binary_op(op: BinaryOp, left: Value, right: Value, span: Span) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::Add => match (&left, &right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::Str(_), _) | (_, Value::Str(_)) => Ok(Value::Str(Rc::from(format!(
                "{}{}",
                value_to_string(&left),
                value_to_string(&right)
            )))),
            _ => Err(RuntimeError::operands_not_addable(span)),
        },
        BinaryOp::Sub => numeric_operands(left, right, span).map(|(a, b)| Value::Number(a - b)),
        BinaryOp::Mul => numeric_operands(left, right, span).map(|(a, b)| Value::Number(a * b)),
        // Division by zero is not checked; IEEE semantics produce an
        // infinity or NaN.
        BinaryOp::Div => numeric_operands(left, right, span).map(|(a, b)| Value::Number(a / b)),
        BinaryOp::Greater => numeric_operands(left, right, span).map(|(a, b)| Value::Bool(a > b)),
        BinaryOp::GreaterEq => numeric_operands(left, right, span).map(|(a, b)| Value::Bool(a >= b)),
        BinaryOp::Less => numeric_operands(left, right, span).map(|(a, b)| Value::Bool(a < b)),
        BinaryOp::LessEq => numeric_operands(left, right, span).map(|(a, b)| Value::Bool(a <= b)),
        BinaryOp::Eq => Ok(Value::Bool(values_equal(&left, &right))),
        BinaryOp::NotEq => Ok(Value::Bool(!values_equal(&left, &right))),
        // The left side has already been evaluated for its effects.
        BinaryOp::Comma => Ok(right),
    }
}

fn numeric_operands(left: Value, right: Value, span: Span) -> Result<(f64, f64), RuntimeError> {
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(RuntimeError::operand_not_number(span)),
    }
}

/// Lexes, parses and runs `source` against a fresh interpreter, returning
/// everything the program printed. Lex, parse and runtime failures come
/// back as the error text. The integration tests are built on this.
pub fn parse_and_run(source: &str) -> Result<String, String> {
    let tokens = crate::lexer::scan(source).map_err(|_| "Lexer failed".to_string())?;
    let mut parser = TokenParser::new(tokens);
    let result = parser.parse();
    if !result.errors.is_empty() {
        return Err(result
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n"));
    }

    let buffer: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
    let mut interpreter = Interpreter::with_writer(buffer.clone());
    interpreter
        .interpret(&result.statements)
        .map_err(|e| e.to_string())?;

    let output = buffer.borrow();
    Ok(String::from_utf8_lossy(&output).into_owned())
}

use serde_json::{json, Value as Json};

use crate::ast::{BinaryOp, Expr, ExprKind, LogicalOp, Stmt, UnaryOp, VarDecl};
use crate::value::Value;

/// Renders a parsed program as a JSON tree, one tagged object per AST node.
/// This backs `--dump-ast` and is handy for tooling that wants to inspect
/// what the parser produced without running anything.
pub fn program_to_json(statements: &[Stmt]) -> Json {
    Json::Array(statements.iter().map(stmt_to_json).collect())
}

fn stmt_to_json(stmt: &Stmt) -> Json {
    match stmt {
        Stmt::Expr(expr) => json!({ "type": "expression", "expr": expr_to_json(expr) }),
        Stmt::Print(expr) => json!({ "type": "print", "expr": expr_to_json(expr) }),
        Stmt::Var(decl) => var_decl_to_json(decl),
        Stmt::Vars(decls) => json!({
            "type": "vars",
            "declarations": decls.iter().map(var_decl_to_json).collect::<Vec<_>>(),
        }),
        Stmt::Block(statements) => json!({
            "type": "block",
            "statements": statements.iter().map(stmt_to_json).collect::<Vec<_>>(),
        }),
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => json!({
            "type": "if",
            "condition": expr_to_json(condition),
            "then": stmt_to_json(then_branch),
            "else": else_branch.as_deref().map(stmt_to_json),
        }),
        Stmt::While { condition, body } => json!({
            "type": "while",
            "condition": expr_to_json(condition),
            "body": stmt_to_json(body),
        }),
    }
}

fn var_decl_to_json(decl: &VarDecl) -> Json {
    json!({
        "type": "var",
        "name": decl.name.as_ref(),
        "initializer": decl.initializer.as_ref().map(expr_to_json),
    })
}

fn expr_to_json(expr: &Expr) -> Json {
    match &expr.kind {
        ExprKind::Literal(value) => json!({ "type": "literal", "value": literal_to_json(value) }),
        ExprKind::Grouping(inner) => json!({ "type": "grouping", "expr": expr_to_json(inner) }),
        ExprKind::Unary { op, expr: operand } => json!({
            "type": "unary",
            "op": unary_op_symbol(*op),
            "expr": expr_to_json(operand),
        }),
        ExprKind::Binary { left, op, right } => json!({
            "type": "binary",
            "op": binary_op_symbol(*op),
            "left": expr_to_json(left),
            "right": expr_to_json(right),
        }),
        ExprKind::Logical { left, op, right } => json!({
            "type": "logical",
            "op": logical_op_symbol(*op),
            "left": expr_to_json(left),
            "right": expr_to_json(right),
        }),
        ExprKind::Ternary {
            condition,
            then_branch,
            else_branch,
        } => json!({
            "type": "ternary",
            "condition": expr_to_json(condition),
            "then": expr_to_json(then_branch),
            "else": expr_to_json(else_branch),
        }),
        ExprKind::Variable(name) => json!({ "type": "variable", "name": name.as_ref() }),
        ExprKind::Assign { name, value } => json!({
            "type": "assign",
            "name": name.as_ref(),
            "value": expr_to_json(value),
        }),
    }
}

fn literal_to_json(value: &Value) -> Json {
    match value {
        Value::Nil => Json::Null,
        Value::Bool(b) => json!(b),
        Value::Number(n) => json!(n),
        Value::Str(s) => json!(s.as_ref()),
    }
}

fn unary_op_symbol(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Neg => "-",
        UnaryOp::Not => "!",
    }
}

fn binary_op_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Eq => "==",
        BinaryOp::NotEq => "!=",
        BinaryOp::Greater => ">",
        BinaryOp::GreaterEq => ">=",
        BinaryOp::Less => "<",
        BinaryOp::LessEq => "<=",
        BinaryOp::Comma => ",",
    }
}

fn logical_op_symbol(op: LogicalOp) -> &'static str {
    match op {
        LogicalOp::And => "and",
        LogicalOp::Or => "or",
    }
}

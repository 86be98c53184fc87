use std::fmt;
use std::mem;
use std::rc::Rc;

use crate::ast::{BinaryOp, Expr, ExprKind, LogicalOp, Stmt, UnaryOp, VarDecl};
use crate::diagnostic::{Diagnostic, Label, Span};
use crate::token::Token;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub found: Token,
    pub span: Span,
}

impl ParseError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        let at = if self.found == Token::Eof {
            "at end".to_string()
        } else {
            format!("at '{}'", self.found)
        };
        Diagnostic::error(self.message.clone())
            .with_code("E0101")
            .with_label(Label::primary(self.span, at))
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.found == Token::Eof {
            write!(f, "Error at end: {}", self.message)
        } else {
            write!(f, "Error at '{}': {}", self.found, self.message)
        }
    }
}

impl std::error::Error for ParseError {}

/// What a parse produces: every statement that survived recovery, plus
/// every error reported along the way. The parser itself never bails; it
/// resynchronizes and keeps going until the end of input.
#[derive(Debug)]
pub struct ParseResult {
    pub statements: Vec<Stmt>,
    pub errors: Vec<ParseError>,
}

pub struct TokenParser {
    tokens: Vec<(Token, Span)>,
    current: usize,
    errors: Vec<ParseError>,
}

impl TokenParser {
    /// Expects the token stream to end with a single `Eof`, which is what
    /// `lexer::scan` produces.
    pub fn new(tokens: Vec<(Token, Span)>) -> Self {
        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    pub fn parse(&mut self) -> ParseResult {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        ParseResult {
            statements,
            errors: mem::take(&mut self.errors),
        }
    }

    /// The recovery point: a declaration that fails to parse is reported,
    /// the stream is resynchronized, and the hole is dropped.
    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.match_token(&Token::Var) {
            self.var_declarations()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(error) => {
                self.errors.push(error);
                self.synchronize();
                None
            }
        }
    }

    fn var_declarations(&mut self) -> Result<Stmt, ParseError> {
        let mut declarations = vec![self.var_declaration()?];
        while self.match_token(&Token::Comma) {
            declarations.push(self.var_declaration()?);
        }
        self.consume(&Token::Semicolon, "Expect ';' after var declaration.")?;

        Ok(if declarations.len() == 1 {
            Stmt::Var(declarations.remove(0))
        } else {
            Stmt::Vars(declarations)
        })
    }

    fn var_declaration(&mut self) -> Result<VarDecl, ParseError> {
        let (name, span) = self.consume_identifier("Expect variable name.")?;
        // The initializer parses at assignment level so a following comma
        // starts the next declaration instead of being swallowed.
        let initializer = if self.match_token(&Token::Assign) {
            Some(self.assignment()?)
        } else {
            None
        };
        Ok(VarDecl {
            name,
            span,
            initializer,
        })
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        if self.match_token(&Token::For) {
            return self.for_statement();
        }
        if self.match_token(&Token::If) {
            return self.if_statement();
        }
        if self.match_token(&Token::Print) {
            return self.print_statement();
        }
        if self.match_token(&Token::While) {
            return self.while_statement();
        }
        if self.match_token(&Token::LBrace) {
            return Ok(Stmt::Block(self.block()?));
        }
        self.expression_statement()
    }

    /// `for` has no AST node of its own: it is rewritten here into the
    /// equivalent block/while tree.
    fn for_statement(&mut self) -> Result<Stmt, ParseError> {
        let for_span = self.previous_span();
        self.consume(&Token::LParen, "'(' expected after 'for'.")?;

        let initializer = if self.match_token(&Token::Semicolon) {
            None
        } else if self.match_token(&Token::Var) {
            Some(self.var_declarations()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if self.check(&Token::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(&Token::Semicolon, "; expected")?;

        let increment = if self.check(&Token::RParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(&Token::RParen, "')' expected after 'for' condition.")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expr(increment)]);
        }

        let condition = condition.unwrap_or(Expr {
            kind: ExprKind::Literal(Value::Bool(true)),
            span: for_span,
        });
        body = Stmt::While {
            condition,
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Ok(body)
    }

    fn if_statement(&mut self) -> Result<Stmt, ParseError> {
        self.consume(&Token::LParen, "'(' expected after if.")?;
        let condition = self.expression()?;
        self.consume(&Token::RParen, "')' expected after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_token(&Token::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt, ParseError> {
        self.consume(&Token::LParen, "'(' expected after while.")?;
        let condition = self.expression()?;
        self.consume(&Token::RParen, "')' expected after while condition.")?;

        let body = Box::new(self.statement()?);

        Ok(Stmt::While { condition, body })
    }

    fn print_statement(&mut self) -> Result<Stmt, ParseError> {
        let value = self.expression()?;
        self.consume(&Token::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print(value))
    }

    fn expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.expression()?;
        self.consume(&Token::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expr(expr))
    }

    fn block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();
        while !self.check(&Token::RBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        self.consume(&Token::RBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.comma()
    }

    fn comma(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.assignment()?;
        while self.match_token(&Token::Comma) {
            let right = self.assignment()?;
            expr = binary(expr, BinaryOp::Comma, right);
        }
        Ok(expr)
    }

    fn assignment(&mut self) -> Result<Expr, ParseError> {
        let expr = self.ternary()?;

        if self.match_token(&Token::Assign) {
            let assign_span = self.previous_span();
            let value = self.expression()?;

            if let ExprKind::Variable(name) = &expr.kind {
                let span = expr.span.merge(value.span);
                return Ok(Expr {
                    kind: ExprKind::Assign {
                        name: name.clone(),
                        value: Box::new(value),
                    },
                    span,
                });
            }

            // Reported but not bailed on: the right-hand side has already
            // been consumed, so parsing continues as if no `=` were there.
            self.errors.push(ParseError {
                message: "Invalid assignment target.".to_string(),
                found: Token::Assign,
                span: assign_span,
            });
        }

        Ok(expr)
    }

    fn ternary(&mut self) -> Result<Expr, ParseError> {
        let condition = self.or()?;

        if self.match_token(&Token::Question) {
            // Both arms re-enter ternary, which makes `a ? b : c ? d : e`
            // group as `a ? b : (c ? d : e)`.
            let then_branch = self.ternary()?;
            self.consume(&Token::Colon, "Expect ':'")?;
            let else_branch = self.ternary()?;
            let span = condition.span.merge(else_branch.span);
            return Ok(Expr {
                kind: ExprKind::Ternary {
                    condition: Box::new(condition),
                    then_branch: Box::new(then_branch),
                    else_branch: Box::new(else_branch),
                },
                span,
            });
        }

        Ok(condition)
    }

    fn or(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.and()?;
        while self.match_token(&Token::Or) {
            let right = self.and()?;
            expr = logical(expr, LogicalOp::Or, right);
        }
        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.equality()?;
        while self.match_token(&Token::And) {
            let right = self.equality()?;
            expr = logical(expr, LogicalOp::And, right);
        }
        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.comparison()?;
        loop {
            let op = match self.peek() {
                Token::Eq => BinaryOp::Eq,
                Token::NotEq => BinaryOp::NotEq,
                _ => break,
            };
            self.advance();
            let right = self.comparison()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.term()?;
        loop {
            let op = match self.peek() {
                Token::Greater => BinaryOp::Greater,
                Token::GreaterEq => BinaryOp::GreaterEq,
                Token::Less => BinaryOp::Less,
                Token::LessEq => BinaryOp::LessEq,
                _ => break,
            };
            self.advance();
            let right = self.term()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.factor()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.factor()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.unary()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek() {
            Token::Bang => Some(UnaryOp::Not),
            Token::Minus => Some(UnaryOp::Neg),
            _ => None,
        };

        if let Some(op) = op {
            let op_span = self.advance().1;
            let operand = self.unary()?;
            let span = op_span.merge(operand.span);
            return Ok(Expr {
                kind: ExprKind::Unary {
                    op,
                    expr: Box::new(operand),
                },
                span,
            });
        }

        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        if self.match_token(&Token::LParen) {
            let lparen_span = self.previous_span();
            let expr = self.expression()?;
            let rparen_span = self.consume(&Token::RParen, "Expect ')' after expression.")?;
            return Ok(Expr {
                kind: ExprKind::Grouping(Box::new(expr)),
                span: lparen_span.merge(rparen_span),
            });
        }

        let span = self.peek_span();
        let kind = match self.peek() {
            Token::False => ExprKind::Literal(Value::Bool(false)),
            Token::True => ExprKind::Literal(Value::Bool(true)),
            Token::Nil => ExprKind::Literal(Value::Nil),
            Token::Number(n) => ExprKind::Literal(Value::Number(*n)),
            Token::String(s) => ExprKind::Literal(Value::Str(Rc::from(s.as_str()))),
            Token::Ident(name) => ExprKind::Variable(Rc::from(name.as_str())),
            _ => return Err(self.error("Expect expression.")),
        };
        self.advance();
        Ok(Expr { kind, span })
    }

    /// Discards tokens up to the next likely statement boundary: just past
    /// a semicolon, or right before a statement keyword.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().0 == Token::Semicolon {
                return;
            }

            match self.peek() {
                Token::Class
                | Token::Fun
                | Token::Var
                | Token::For
                | Token::If
                | Token::While
                | Token::Print
                | Token::Return => return,
                _ => {}
            }

            self.advance();
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)].0
    }

    fn peek_span(&self) -> Span {
        self.tokens[self.current.min(self.tokens.len() - 1)].1
    }

    fn previous(&self) -> &(Token, Span) {
        &self.tokens[self.current - 1]
    }

    fn previous_span(&self) -> Span {
        self.previous().1
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    fn advance(&mut self) -> &(Token, Span) {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn check(&self, kind: &Token) -> bool {
        !self.is_at_end() && mem::discriminant(self.peek()) == mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &Token) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: &Token, message: &str) -> Result<Span, ParseError> {
        if self.check(kind) {
            let span = self.advance().1;
            Ok(span)
        } else {
            Err(self.error(message))
        }
    }

    fn consume_identifier(&mut self, message: &str) -> Result<(Rc<str>, Span), ParseError> {
        let name = match self.peek() {
            Token::Ident(name) => Rc::from(name.as_str()),
            _ => return Err(self.error(message)),
        };
        let span = self.advance().1;
        Ok((name, span))
    }

    fn error(&self, message: &str) -> ParseError {
        ParseError {
            message: message.to_string(),
            found: self.peek().clone(),
            span: self.peek_span(),
        }
    }
}

fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    let span = left.span.merge(right.span);
    Expr {
        kind: ExprKind::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        span,
    }
}

fn logical(left: Expr, op: LogicalOp, right: Expr) -> Expr {
    let span = left.span.merge(right.span);
    Expr {
        kind: ExprKind::Logical {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        span,
    }
}

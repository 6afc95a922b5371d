//! Expression productions: precedence climbing over binary operators, then
//! unary/cast, postfix selectors and primaries

use super::error::{PResult, ParseError};
use super::lexer::{Delimited, Token};
use super::parser::{BodyKind, Parser};
use crate::ast::*;
use crate::config::{Feature, LanguageLevel};
use crate::diagnostics::{Category, Diagnostic};

const RELATIONAL_PRECEDENCE: u8 = 7;

fn binary_op(token: &Token) -> Option<(u8, BinaryOp)> {
    let entry = match token {
        Token::PipePipe => (1, BinaryOp::LogicalOr),
        Token::AndAnd => (2, BinaryOp::LogicalAnd),
        Token::Pipe => (3, BinaryOp::Or),
        Token::Caret => (4, BinaryOp::Xor),
        Token::Amp => (5, BinaryOp::And),
        Token::Eq => (6, BinaryOp::Eq),
        Token::Ne => (6, BinaryOp::Ne),
        Token::Lt => (RELATIONAL_PRECEDENCE, BinaryOp::Lt),
        Token::Le => (RELATIONAL_PRECEDENCE, BinaryOp::Le),
        Token::Gt => (RELATIONAL_PRECEDENCE, BinaryOp::Gt),
        Token::Ge => (RELATIONAL_PRECEDENCE, BinaryOp::Ge),
        Token::LShift => (8, BinaryOp::LShift),
        Token::RShift => (8, BinaryOp::RShift),
        Token::URShift => (8, BinaryOp::URShift),
        Token::Plus => (9, BinaryOp::Add),
        Token::Minus => (9, BinaryOp::Sub),
        Token::Star => (10, BinaryOp::Mul),
        Token::Slash => (10, BinaryOp::Div),
        Token::Percent => (10, BinaryOp::Mod),
        _ => return None,
    };
    Some(entry)
}

fn assignment_op(token: &Token) -> Option<AssignmentOp> {
    Some(match token {
        Token::Assign => AssignmentOp::Assign,
        Token::AddAssign => AssignmentOp::AddAssign,
        Token::SubAssign => AssignmentOp::SubAssign,
        Token::MulAssign => AssignmentOp::MulAssign,
        Token::DivAssign => AssignmentOp::DivAssign,
        Token::ModAssign => AssignmentOp::ModAssign,
        Token::AndAssign => AssignmentOp::AndAssign,
        Token::OrAssign => AssignmentOp::OrAssign,
        Token::XorAssign => AssignmentOp::XorAssign,
        Token::LShiftAssign => AssignmentOp::LShiftAssign,
        Token::RShiftAssign => AssignmentOp::RShiftAssign,
        Token::URShiftAssign => AssignmentOp::URShiftAssign,
        _ => return None,
    })
}

impl<'c> Parser<'c> {
    pub(super) fn expression(&mut self) -> PResult<Expr> {
        self.nested(|p| p.assignment())
    }

    fn assignment(&mut self) -> PResult<Expr> {
        let target = self.conditional_expression()?;
        if let Some(operator) = assignment_op(&self.peek().token) {
            self.advance();
            let value = self.expression()?;
            let span = target.span().to(value.span());
            return Ok(Expr::Assignment(AssignmentExpr {
                target: Box::new(target),
                operator,
                value: Box::new(value),
                span,
            }));
        }
        Ok(target)
    }

    /// Expression in which a bare `x -> ...` is not a lambda (case labels, guards)
    pub(super) fn expression_no_lambda(&mut self) -> PResult<Expr> {
        self.with_lambdas(false, |p| p.expression())
    }

    pub(super) fn conditional_no_lambda(&mut self) -> PResult<Expr> {
        self.with_lambdas(false, |p| p.conditional_expression())
    }

    fn with_lambdas<T>(&mut self, allowed: bool, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let saved = self.no_lambda;
        self.no_lambda = !allowed;
        let result = f(self);
        self.no_lambda = saved;
        result
    }

    pub(super) fn conditional_expression(&mut self) -> PResult<Expr> {
        let condition = self.binary(1)?;
        if !self.match_token(&Token::Question) {
            return Ok(condition);
        }
        let then_expr = self.with_lambdas(true, |p| p.expression())?;
        self.expect(&Token::Colon, "ConditionalExpression")?;
        let else_expr = self.nested(|p| p.conditional_expression())?;
        let span = condition.span().to(else_expr.span());
        Ok(Expr::Conditional(ConditionalExpr {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
            span,
        }))
    }

    fn binary(&mut self, min_precedence: u8) -> PResult<Expr> {
        let mut links = 0;
        let result = self.binary_chain(min_precedence, &mut links);
        self.release(links);
        result
    }

    /// Each operator deepens the left-nested tree, so it holds a level
    fn binary_chain(&mut self, min_precedence: u8, links: &mut usize) -> PResult<Expr> {
        let mut left = self.unary()?;
        loop {
            if self.check(&Token::InstanceOf) && RELATIONAL_PRECEDENCE >= min_precedence {
                self.descend()?;
                *links += 1;
                left = self.instanceof_rest(left)?;
                continue;
            }
            let Some((precedence, operator)) = binary_op(&self.peek().token) else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            self.descend()?;
            *links += 1;
            self.advance();
            let right = self.binary(precedence + 1)?;
            let span = left.span().to(right.span());
            left = Expr::Binary(BinaryExpr { left: Box::new(left), operator, right: Box::new(right), span });
        }
        Ok(left)
    }

    fn instanceof_rest(&mut self, expr: Expr) -> PResult<Expr> {
        self.expect(&Token::InstanceOf, "InstanceofExpression")?;
        let target = if self.pattern_follows() {
            let pattern = self.pattern()?;
            self.gate(Feature::InstanceofPatterns, pattern.span());
            InstanceOfTarget::Pattern(pattern)
        } else {
            InstanceOfTarget::Type(self.type_ref()?)
        };
        let span = expr.span().to(self.previous().span);
        Ok(Expr::InstanceOf(InstanceOfExpr { expr: Box::new(expr), target, span }))
    }

    /// Type pattern `[final] T name` or record pattern `R(p, ...)`
    pub(super) fn pattern(&mut self) -> PResult<Pattern> {
        let start = self.peek().span;
        let (modifiers, _) = self.modifiers()?;
        let type_ref = self.type_ref()?;
        if self.check(&Token::LParen) {
            let open = self.advance().span;
            self.gate(Feature::RecordPatterns, start.to(open));
            let mut subpatterns = Vec::new();
            if !self.check(&Token::RParen) {
                loop {
                    subpatterns.push(self.nested(|p| p.pattern())?);
                    if !self.match_token(&Token::Comma) {
                        break;
                    }
                }
            }
            self.expect(&Token::RParen, "RecordPattern")?;
            return Ok(Pattern::Record(RecordPattern { type_ref, subpatterns, span: start.to(self.previous().span) }));
        }
        let (name, name_span) = self.ident()?;
        Ok(Pattern::Type(TypePattern { modifiers, type_ref, name, name_span, span: start.to(name_span) }))
    }

    fn unary(&mut self) -> PResult<Expr> {
        let tok = self.peek().clone();
        let operator = match tok.token {
            Token::Plus => Some(UnaryOp::Plus),
            Token::Minus => Some(UnaryOp::Minus),
            Token::Bang => Some(UnaryOp::Not),
            Token::Tilde => Some(UnaryOp::BitNot),
            Token::Inc => Some(UnaryOp::PreInc),
            Token::Dec => Some(UnaryOp::PreDec),
            _ => None,
        };
        if let Some(operator) = operator {
            self.advance();
            let operand = self.nested(|p| p.unary())?;
            let span = tok.span.to(operand.span());
            return Ok(Expr::Unary(UnaryExpr { operator, operand: Box::new(operand), span }));
        }
        if tok.token == Token::LParen && self.cast_follows() {
            return self.cast();
        }
        self.postfix()
    }

    fn cast_follows(&self) -> bool {
        let open = self.current;
        if self.lambda_follows() {
            return false;
        }
        let Some(mut j) = self.speculate_type(open + 1) else {
            return false;
        };
        if self.token_at(open + 1).token.is_primitive_type() {
            return self.token_at(j).token == Token::RParen;
        }
        while self.token_at(j).token == Token::Amp {
            match self.speculate_type(j + 1) {
                Some(k) => j = k,
                None => return false,
            }
        }
        if self.token_at(j).token != Token::RParen {
            return false;
        }
        let next = &self.token_at(j + 1).token;
        next.is_literal()
            || matches!(
                next,
                Token::Identifier
                    | Token::Underscore
                    | Token::LParen
                    | Token::Bang
                    | Token::Tilde
                    | Token::This
                    | Token::Super
                    | Token::New
                    | Token::Switch
            )
            || next.is_primitive_type()
    }

    fn cast(&mut self) -> PResult<Expr> {
        let start = self.expect(&Token::LParen, "CastExpression")?.span;
        let target_type = self.type_ref()?;
        let mut extra_bounds = Vec::new();
        while self.match_token(&Token::Amp) {
            extra_bounds.push(self.type_ref()?);
        }
        self.expect(&Token::RParen, "CastExpression")?;
        let expr = self.nested(|p| p.unary())?;
        let span = start.to(expr.span());
        Ok(Expr::Cast(CastExpr { target_type, extra_bounds, expr: Box::new(expr), span }))
    }

    fn postfix(&mut self) -> PResult<Expr> {
        let mut links = 0;
        let result = self.postfix_chain(&mut links);
        self.release(links);
        result
    }

    fn postfix_chain(&mut self, links: &mut usize) -> PResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            if matches!(self.peek().token, Token::Dot | Token::LBracket | Token::Inc | Token::Dec | Token::DoubleColon) {
                self.descend()?;
                *links += 1;
            }
            match self.peek().token {
                Token::Dot => {
                    self.advance();
                    expr = self.selector(expr)?;
                }
                Token::LBracket if self.check_at(1, &Token::RBracket) => {
                    let Some(name) = expr.as_qualified_name() else {
                        let tok = self.peek_at(1).clone();
                        self.syntax(ParseError::expected(&tok.lexeme, "Expression"), tok.span);
                        return Err(self.recovery());
                    };
                    let dims = self.dims();
                    let type_ref = TypeRef::simple(name, expr.span()).with_extra_dims(dims);
                    expr = self.type_suffix(type_ref)?;
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.with_lambdas(true, |p| p.expression())?;
                    self.expect(&Token::RBracket, "ArrayAccess")?;
                    let span = expr.span().to(self.previous().span);
                    expr = Expr::ArrayAccess(ArrayAccessExpr { array: Box::new(expr), index: Box::new(index), span });
                }
                Token::Inc | Token::Dec => {
                    let tok = self.advance();
                    let operator = if tok.token == Token::Inc { UnaryOp::PostInc } else { UnaryOp::PostDec };
                    let span = expr.span().to(tok.span);
                    expr = Expr::Unary(UnaryExpr { operator, operand: Box::new(expr), span });
                }
                Token::DoubleColon => {
                    expr = self.method_ref(MethodRefTarget::Expr(Box::new(expr)))?;
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// Member selection after a `.`
    fn selector(&mut self, target: Expr) -> PResult<Expr> {
        let tok = self.peek().clone();
        match tok.token {
            Token::New => {
                let mut created = self.new_expression()?;
                if let Expr::New(ref mut n) = created {
                    n.span = target.span().to(n.span);
                    n.outer = Some(Box::new(target));
                }
                Ok(created)
            }
            Token::This => {
                self.advance();
                Ok(Expr::This(ThisExpr { qualifier: target.as_qualified_name(), span: target.span().to(tok.span) }))
            }
            Token::Class => {
                self.advance();
                let name = target.as_qualified_name().unwrap_or_default();
                let type_ref = TypeRef::simple(name, target.span());
                Ok(Expr::ClassLiteral(ClassLiteralExpr { type_ref, span: target.span().to(tok.span) }))
            }
            Token::Super => {
                self.advance();
                Ok(Expr::Super(target.span().to(tok.span)))
            }
            Token::Lt => {
                let (args, _) = self.type_arguments()?;
                let type_args = args
                    .into_iter()
                    .filter_map(|a| match a {
                        TypeArg::Type(t) => Some(t),
                        TypeArg::Wildcard(_) => None,
                    })
                    .collect();
                let (name, name_span) = self.ident()?;
                let arguments = self.arguments()?;
                let span = target.span().to(self.previous().span);
                Ok(Expr::MethodCall(MethodCallExpr {
                    target: Some(Box::new(target)),
                    type_args,
                    name,
                    name_span,
                    arguments,
                    id: self.next_id(),
                    span,
                }))
            }
            _ => {
                let (name, name_span) = self.ident()?;
                if self.check(&Token::LParen) {
                    let arguments = self.arguments()?;
                    let span = target.span().to(self.previous().span);
                    return Ok(Expr::MethodCall(MethodCallExpr {
                        target: Some(Box::new(target)),
                        type_args: Vec::new(),
                        name,
                        name_span,
                        arguments,
                        id: self.next_id(),
                        span,
                    }));
                }
                let span = target.span().to(name_span);
                Ok(Expr::FieldAccess(FieldAccessExpr { target: Box::new(target), name, name_span, id: self.next_id(), span }))
            }
        }
    }

    /// `T.class` or `T::m` after a type written in expression position
    fn type_suffix(&mut self, type_ref: TypeRef) -> PResult<Expr> {
        if self.check(&Token::Dot) && self.check_at(1, &Token::Class) {
            self.advance();
            let end = self.advance().span;
            let span = type_ref.span.to(end);
            return Ok(Expr::ClassLiteral(ClassLiteralExpr { type_ref, span }));
        }
        if self.check(&Token::DoubleColon) {
            return self.method_ref(MethodRefTarget::Type(type_ref));
        }
        self.report_missing(&Token::Dot, "ClassLiteral");
        Err(self.recovery())
    }

    fn method_ref(&mut self, target: MethodRefTarget) -> PResult<Expr> {
        let colons = self.expect(&Token::DoubleColon, "MethodReference")?.span;
        if self.level() < LanguageLevel::V1_8 {
            self.diagnostics.push(Diagnostic::error(
                Category::FeatureNotAvailable,
                "Method references are allowed only at source level 1.8 or above",
                colons,
            ));
        }
        if self.check(&Token::Lt) {
            self.type_arguments()?;
        }
        let name = if self.match_token(&Token::New) { "new".to_string() } else { self.ident()?.0 };
        let start = match &target {
            MethodRefTarget::Expr(e) => e.span(),
            MethodRefTarget::Type(t) => t.span,
        };
        Ok(Expr::MethodRef(MethodRefExpr { target, name, span: start.to(self.previous().span) }))
    }

    fn primary(&mut self) -> PResult<Expr> {
        let tok = self.peek().clone();
        match tok.token {
            t if t.is_literal() => self.literal(),
            Token::This => {
                self.advance();
                if self.check(&Token::LParen) {
                    return self.unqualified_call("this".to_string(), tok.span);
                }
                Ok(Expr::This(ThisExpr { qualifier: None, span: tok.span }))
            }
            Token::Super => {
                self.advance();
                if self.check(&Token::LParen) {
                    return self.unqualified_call("super".to_string(), tok.span);
                }
                Ok(Expr::Super(tok.span))
            }
            Token::New => self.new_expression(),
            Token::LParen if !self.no_lambda && self.lambda_follows() => self.lambda(),
            Token::LParen => {
                self.advance();
                let expr = self.with_lambdas(true, |p| p.expression())?;
                self.expect(&Token::RParen, "Expression")?;
                Ok(Expr::Parenthesized(ParenExpr { expr: Box::new(expr), span: tok.span.to(self.previous().span) }))
            }
            Token::Switch => {
                self.gate(Feature::SwitchExpressions, tok.span);
                let block = self.with_lambdas(true, |p| p.switch_block())?;
                Ok(Expr::Switch(block))
            }
            Token::Identifier | Token::Underscore if !self.no_lambda && self.check_at(1, &Token::Arrow) => self.lambda(),
            Token::Identifier | Token::Underscore => {
                let (name, span) = self.ident()?;
                if self.check(&Token::LParen) {
                    return self.unqualified_call(name, span);
                }
                Ok(Expr::Identifier(IdentifierExpr { name, id: self.next_id(), span }))
            }
            t if t.is_primitive_type() || t == Token::Void => {
                self.advance();
                let dims = self.dims();
                let type_ref = TypeRef::simple(tok.lexeme.clone(), tok.span).with_extra_dims(dims);
                self.type_suffix(type_ref)
            }
            Token::Semicolon | Token::RParen | Token::RBrace | Token::RBracket | Token::Comma | Token::Eof => {
                let prev = self.previous().clone();
                self.syntax(
                    ParseError::ExpectedAfter { found: prev.lexeme.clone(), expected: "Expression".to_string() },
                    prev.span,
                );
                Err(self.recovery())
            }
            _ => {
                self.syntax(ParseError::expected(&tok.lexeme, "Expression"), tok.span);
                Err(self.recovery())
            }
        }
    }

    fn unqualified_call(&mut self, name: String, name_span: Span) -> PResult<Expr> {
        let arguments = self.arguments()?;
        Ok(Expr::MethodCall(MethodCallExpr {
            target: None,
            type_args: Vec::new(),
            name,
            name_span,
            arguments,
            id: self.next_id(),
            span: name_span.to(self.previous().span),
        }))
    }

    /// `( [expr {, expr}] )`
    pub(super) fn arguments(&mut self) -> PResult<Vec<Expr>> {
        self.expect(&Token::LParen, "ArgumentList")?;
        let mut args = Vec::new();
        if self.match_token(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.with_lambdas(true, |p| p.expression())?);
            if !self.match_token(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RParen, "ArgumentList")?;
        Ok(args)
    }

    pub(super) fn variable_initializer(&mut self) -> PResult<Expr> {
        if self.check(&Token::LBrace) {
            return self.array_initializer();
        }
        self.expression()
    }

    pub(super) fn array_initializer(&mut self) -> PResult<Expr> {
        Ok(Expr::ArrayInitializer(self.array_init()?))
    }

    fn array_init(&mut self) -> PResult<ArrayInit> {
        self.nested(|p| p.array_init_inner())
    }

    fn array_init_inner(&mut self) -> PResult<ArrayInit> {
        let start = self.expect(&Token::LBrace, "ArrayInitializer")?.span;
        let mut elements = Vec::new();
        while !self.check(&Token::RBrace) && !self.is_at_end() {
            elements.push(self.with_lambdas(true, |p| p.variable_initializer())?);
            if !self.match_token(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RBrace, "ArrayInitializer")?;
        Ok(ArrayInit { elements, span: start.to(self.previous().span) })
    }

    fn new_expression(&mut self) -> PResult<Expr> {
        let start = self.expect(&Token::New, "ClassInstanceCreationExpression")?.span;
        if self.check(&Token::Lt) {
            self.type_arguments()?;
        }
        let type_ref = self.type_ref()?;

        if type_ref.array_dims > 0 {
            let mut element_type = type_ref.clone();
            element_type.array_dims = 0;
            let initializer = self.array_init()?;
            return Ok(Expr::NewArray(NewArrayExpr {
                element_type,
                dimensions: Vec::new(),
                extra_dims: type_ref.array_dims,
                span: start.to(initializer.span),
                initializer: Some(initializer),
            }));
        }

        if self.check(&Token::LBracket) {
            let mut dimensions = Vec::new();
            while self.check(&Token::LBracket) && !self.check_at(1, &Token::RBracket) {
                self.advance();
                dimensions.push(self.with_lambdas(true, |p| p.expression())?);
                self.expect(&Token::RBracket, "DimWithOrWithOutExpr")?;
            }
            let extra_dims = self.dims();
            let initializer = if self.check(&Token::LBrace) { Some(self.array_init()?) } else { None };
            return Ok(Expr::NewArray(NewArrayExpr {
                element_type: type_ref,
                dimensions,
                extra_dims,
                initializer,
                span: start.to(self.previous().span),
            }));
        }

        let arguments = self.arguments()?;
        let anonymous_body = if self.check(&Token::LBrace) {
            let (members, span) = self.class_body("", BodyKind::Anonymous)?;
            Some(ClassBody { members, span })
        } else {
            None
        };
        Ok(Expr::New(NewExpr {
            outer: None,
            target_type: type_ref,
            arguments,
            anonymous_body,
            id: self.next_id(),
            span: start.to(self.previous().span),
        }))
    }

    /// `(` ... `)` followed by `->`
    fn lambda_follows(&self) -> bool {
        if self.peek().token != Token::LParen {
            return false;
        }
        match self.skip_balanced(self.current, Token::LParen, Token::RParen) {
            Some(j) => self.token_at(j).token == Token::Arrow,
            None => false,
        }
    }

    fn lambda(&mut self) -> PResult<Expr> {
        let start = self.peek().span;
        let mut params = Vec::new();
        if self.match_token(&Token::LParen) {
            if !self.check(&Token::RParen) {
                loop {
                    params.push(self.lambda_param()?);
                    if !self.match_token(&Token::Comma) {
                        break;
                    }
                }
            }
            self.expect(&Token::RParen, "LambdaParameters")?;
        } else {
            let (name, name_span) = self.ident()?;
            params.push(LambdaParam { modifiers: Vec::new(), type_ref: None, name, name_span, span: name_span });
        }
        let arrow = self.expect(&Token::Arrow, "LambdaExpression")?.span;
        self.gate(Feature::Lambdas, arrow);
        let body = self.with_lambdas(true, |p| {
            if p.check(&Token::LBrace) {
                Ok(LambdaBody::Block(p.block()?))
            } else {
                Ok(LambdaBody::Expr(Box::new(p.expression()?)))
            }
        })?;
        Ok(Expr::Lambda(LambdaExpr { params, body, span: start.to(self.previous().span) }))
    }

    fn lambda_param(&mut self) -> PResult<LambdaParam> {
        let start = self.peek().span;
        let inferred = matches!(self.peek().token, Token::Identifier | Token::Underscore)
            && (self.check_at(1, &Token::Comma) || self.check_at(1, &Token::RParen));
        if inferred {
            let (name, name_span) = self.ident()?;
            return Ok(LambdaParam { modifiers: Vec::new(), type_ref: None, name, name_span, span: name_span });
        }
        let (modifiers, _) = self.modifiers()?;
        let mut type_ref = self.type_ref()?;
        if self.check(&Token::Ellipsis) {
            self.advance();
            type_ref = type_ref.with_extra_dims(1);
        }
        let (name, name_span) = self.ident()?;
        let dims = self.dims();
        Ok(LambdaParam {
            modifiers,
            type_ref: Some(type_ref.with_extra_dims(dims)),
            name,
            name_span,
            span: start.to(name_span),
        })
    }

    fn literal(&mut self) -> PResult<Expr> {
        let tok = self.advance();
        let value = match tok.token {
            Token::IntLiteral => Literal::Int(parse_integer(&tok.lexeme, false)),
            Token::LongLiteral => Literal::Long(parse_integer(&tok.lexeme, true)),
            Token::FloatLiteral => {
                let text: String = tok.lexeme.chars().filter(|c| *c != '_').collect();
                match text.chars().last() {
                    Some('f') | Some('F') => Literal::Float(text[..text.len() - 1].parse().unwrap_or(0.0)),
                    Some('d') | Some('D') => Literal::Double(text[..text.len() - 1].parse().unwrap_or(0.0)),
                    _ => Literal::Double(text.parse().unwrap_or(0.0)),
                }
            }
            Token::StringLiteral(delimited) => Literal::String(unescape(strip_quotes(&tok.lexeme, "\"", delimited))),
            Token::TextBlock(delimited) => {
                self.gate(Feature::TextBlocks, tok.span);
                Literal::String(text_block_content(strip_quotes(&tok.lexeme, "\"\"\"", delimited)))
            }
            Token::CharLiteral(delimited) => {
                Literal::Char(unescape(strip_quotes(&tok.lexeme, "'", delimited)).chars().next().unwrap_or('\0'))
            }
            Token::True => Literal::Boolean(true),
            Token::False => Literal::Boolean(false),
            _ => Literal::Null,
        };
        Ok(Expr::Literal(LiteralExpr { value, span: tok.span }))
    }
}

fn strip_quotes<'a>(lexeme: &'a str, quote: &str, delimited: Delimited) -> &'a str {
    let body = lexeme.strip_prefix(quote).unwrap_or(lexeme);
    match delimited {
        Delimited::Closed => body.strip_suffix(quote).unwrap_or(body),
        Delimited::Unclosed => body,
    }
}

/// Integer literal value; int-typed hex/octal/binary literals wrap to 32 bits
fn parse_integer(lexeme: &str, long: bool) -> i64 {
    let digits: String = lexeme.trim_end_matches(['l', 'L']).chars().filter(|c| *c != '_').collect();
    let (radix, body) = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        (16, hex)
    } else if let Some(bin) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        (2, bin)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits.as_str())
    };
    let value = u64::from_str_radix(body, radix).unwrap_or(0);
    match (long, radix) {
        (true, _) => value as i64,
        (false, 10) => value as i64,
        (false, _) => value as u32 as i32 as i64,
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('s') => out.push(' '),
            Some(d @ '0'..='7') => {
                let mut value = d.to_digit(8).unwrap_or(0);
                let longest = if d <= '3' { 2 } else { 1 };
                for _ in 0..longest {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(v) => {
                            value = value * 8 + v;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(value).unwrap_or('\0'));
            }
            Some('u') => {
                while chars.peek() == Some(&'u') {
                    chars.next();
                }
                let hex: String = chars.by_ref().take(4).collect();
                if let Some(ch) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    out.push(ch);
                }
            }
            Some('\n') => {}
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Strip the opening line and common indentation of a text block
fn text_block_content(raw: &str) -> String {
    let body = match raw.find('\n') {
        Some(i) => &raw[i + 1..],
        None => raw,
    };
    let indent = body
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    let lines: Vec<&str> = body.lines().map(|l| if l.len() >= indent { &l[indent..] } else { l.trim_start() }).collect();
    unescape(&lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_literals_follow_radix_prefixes() {
        assert_eq!(parse_integer("42", false), 42);
        assert_eq!(parse_integer("1_000", false), 1000);
        assert_eq!(parse_integer("0x1F", false), 31);
        assert_eq!(parse_integer("0b101", false), 5);
        assert_eq!(parse_integer("017", false), 15);
        assert_eq!(parse_integer("0xFFFFFFFF", false), -1);
        assert_eq!(parse_integer("10L", true), 10);
    }

    #[test]
    fn escapes_are_decoded() {
        assert_eq!(unescape("a\\tb\\n"), "a\tb\n");
        assert_eq!(unescape("\\u0041"), "A");
        assert_eq!(unescape("\\\""), "\"");
    }

    #[test]
    fn text_block_drops_opening_line_and_indent() {
        assert_eq!(text_block_content("\n    hello\n      world\n    "), "hello\n  world\n");
    }
}

//! Statement, block and switch-block productions

use super::error::{PResult, ParseError};
use super::lexer::Token;
use super::parser::Parser;
use super::span::Span;
use crate::ast::*;
use crate::config::Feature;
use crate::diagnostics::{Category, Diagnostic};

/// Facts accumulated across the labels of one switch block
#[derive(Debug, Default)]
pub(super) struct LabelState {
    seen_default: bool,
    arrow_kind: Option<bool>,
}

impl<'c> Parser<'c> {
    pub(super) fn block(&mut self) -> PResult<Block> {
        let open = self.expect(&Token::LBrace, "Block")?.span;
        let statements = self.statements_until(|p| p.check(&Token::RBrace));
        let close = if self.check(&Token::RBrace) {
            self.advance().span
        } else {
            self.syntax(ParseError::insert("}", "Block"), self.previous().span);
            self.previous().span
        };
        Ok(Block { statements, span: open.to(close) })
    }

    /// Block statements until `stop` holds or input ends, recovering per statement
    fn statements_until(&mut self, stop: fn(&Parser<'c>) -> bool) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !stop(self) && !self.check(&Token::RBrace) && !self.is_at_end() {
            if self.exhausted() {
                break;
            }
            let before = self.current;
            match self.block_statement() {
                Ok(s) => statements.push(s),
                Err(_) => {
                    self.synchronize_in_block();
                    if self.current == before {
                        self.advance();
                    }
                }
            }
        }
        statements
    }

    pub(super) fn block_statement(&mut self) -> PResult<Stmt> {
        let start = self.peek().span;

        let local_type_start = matches!(
            self.peek().token,
            Token::Class | Token::Interface | Token::Enum | Token::Abstract | Token::Static | Token::Strictfp
        ) || self.record_starts_here();
        let modifier_start =
            self.check(&Token::Final) || (self.check(&Token::At) && !self.check_at(1, &Token::Interface));

        if local_type_start || modifier_start {
            let (modifiers, annotations) = self.modifiers()?;
            let keyword = self.peek().clone();
            if let Some(decl) = self.try_type_decl(modifiers.clone(), annotations.clone(), start)? {
                if matches!(keyword.token, Token::Interface | Token::Enum) {
                    self.gate(Feature::LocalEnumsAndInterfaces, keyword.span);
                }
                return Ok(Stmt::TypeDecl(decl));
            }
            let decl = self.local_var_decl(modifiers, annotations, start)?;
            self.end_statement()?;
            return Ok(Stmt::Declaration(decl));
        }

        if self.yield_statement_here() {
            return self.statement();
        }

        if self.declaration_follows() && !self.check_at(1, &Token::Colon) {
            let decl = self.local_var_decl(Vec::new(), Vec::new(), start)?;
            self.end_statement()?;
            return Ok(Stmt::Declaration(decl));
        }

        self.statement()
    }

    pub(super) fn local_var_decl(
        &mut self,
        modifiers: Vec<Modifier>,
        annotations: Vec<Annotation>,
        start: Span,
    ) -> PResult<VarDeclStmt> {
        let type_ref = self.type_ref()?;
        let (name, name_span) = self.ident()?;
        let variables = self.declarators_from(name, name_span)?;
        Ok(VarDeclStmt { modifiers, annotations, type_ref, variables, span: start.to(self.previous().span) })
    }

    /// Declarators of a local declaration whose first name is already consumed
    fn declarators_from(&mut self, name: String, name_span: Span) -> PResult<Vec<VariableDeclarator>> {
        let mut variables = Vec::new();
        let (mut name, mut name_span) = (name, name_span);
        loop {
            let array_dims = self.dims();
            let initializer = if self.match_token(&Token::Assign) { Some(self.variable_initializer()?) } else { None };
            variables.push(VariableDeclarator {
                name,
                name_span,
                array_dims,
                initializer,
                span: name_span.to(self.previous().span),
            });
            if !self.match_token(&Token::Comma) {
                break;
            }
            let next = self.ident()?;
            name = next.0;
            name_span = next.1;
        }
        Ok(variables)
    }

    /// Terminating `;`. A missing semicolon before a line break is reported and
    /// treated as inserted.
    pub(super) fn end_statement(&mut self) -> PResult<()> {
        if self.match_token(&Token::Semicolon) {
            return Ok(());
        }
        let tok = self.peek().clone();
        let same_line = tok.span.start.line == self.previous().span.end.line;
        if same_line && !matches!(tok.token, Token::Eof | Token::RBrace) && self.check_at(1, &Token::Semicolon) {
            self.syntax(ParseError::delete(&tok.lexeme), tok.span);
            self.advance();
            self.advance();
            return Ok(());
        }
        self.report_missing(&Token::Semicolon, "BlockStatements");
        if !same_line || matches!(tok.token, Token::Eof | Token::RBrace) {
            return Ok(());
        }
        Err(self.recovery())
    }

    fn yield_statement_here(&self) -> bool {
        if self.peek().contextual_keyword(self.level()) != Some(super::lexer::ContextualKeyword::Yield) {
            return false;
        }
        let next = &self.peek_at(1).token;
        !(next.is_assignment_operator()
            || matches!(
                next,
                Token::Dot | Token::LBracket | Token::Inc | Token::Dec | Token::Colon | Token::Semicolon | Token::Eof
            ))
    }

    pub(super) fn statement(&mut self) -> PResult<Stmt> {
        self.nested(|p| p.statement_inner())
    }

    fn statement_inner(&mut self) -> PResult<Stmt> {
        let start = self.peek().span;
        let tok = self.peek().clone();
        match tok.token {
            Token::LBrace => Ok(Stmt::Block(self.block()?)),
            Token::Semicolon => {
                self.advance();
                Ok(Stmt::Empty(start))
            }
            Token::If => self.if_statement(),
            Token::While => {
                self.advance();
                let condition = self.paren_condition("WhileStatement")?;
                let body = Box::new(self.statement()?);
                Ok(Stmt::While(WhileStmt { condition, body, span: start.to(self.previous().span) }))
            }
            Token::Do => {
                self.advance();
                let body = Box::new(self.statement()?);
                self.expect(&Token::While, "DoStatement")?;
                let condition = self.paren_condition("DoStatement")?;
                self.end_statement()?;
                Ok(Stmt::DoWhile(DoWhileStmt { body, condition, span: start.to(self.previous().span) }))
            }
            Token::For => self.for_statement(),
            Token::Switch => Ok(Stmt::Switch(self.switch_block()?)),
            Token::Return => {
                self.advance();
                let value = if self.check(&Token::Semicolon) { None } else { Some(self.expression()?) };
                self.end_statement()?;
                Ok(Stmt::Return(ReturnStmt { value, span: start.to(self.previous().span) }))
            }
            Token::Break | Token::Continue => {
                self.advance();
                let label = if self.check(&Token::Identifier) { Some(self.ident()?.0) } else { None };
                self.end_statement()?;
                let span = start.to(self.previous().span);
                Ok(if tok.token == Token::Break {
                    Stmt::Break(BreakStmt { label, span })
                } else {
                    Stmt::Continue(ContinueStmt { label, span })
                })
            }
            Token::Throw => {
                self.advance();
                let expr = self.expression()?;
                self.end_statement()?;
                Ok(Stmt::Throw(ThrowStmt { expr, span: start.to(self.previous().span) }))
            }
            Token::Try => self.try_statement(),
            Token::Synchronized => {
                self.advance();
                let lock = self.paren_condition("SynchronizedStatement")?;
                let body = self.block()?;
                Ok(Stmt::Synchronized(SynchronizedStmt { lock, body, span: start.to(self.previous().span) }))
            }
            Token::Assert => {
                self.advance();
                let condition = self.expression()?;
                let message = if self.match_token(&Token::Colon) { Some(self.expression()?) } else { None };
                self.end_statement()?;
                Ok(Stmt::Assert(AssertStmt { condition, message, span: start.to(self.previous().span) }))
            }
            Token::Identifier if self.check_at(1, &Token::Colon) => {
                let (label, _) = self.ident()?;
                self.advance();
                let statement = Box::new(self.statement()?);
                Ok(Stmt::Labeled(LabeledStmt { label, statement, span: start.to(self.previous().span) }))
            }
            Token::Identifier if self.yield_statement_here() => {
                self.advance();
                let value = self.expression()?;
                self.end_statement()?;
                Ok(Stmt::Yield(YieldStmt { value, span: start.to(self.previous().span) }))
            }
            Token::Else | Token::Case | Token::Default | Token::Catch | Token::Finally | Token::RParen | Token::RBracket => {
                self.syntax(ParseError::delete(&tok.lexeme), tok.span);
                self.advance();
                Err(self.recovery())
            }
            _ => {
                let expr = self.expression()?;
                self.end_statement()?;
                Ok(Stmt::Expression(ExprStmt { expr, span: start.to(self.previous().span) }))
            }
        }
    }

    fn paren_condition(&mut self, construct: &str) -> PResult<Expr> {
        self.expect(&Token::LParen, construct)?;
        let condition = self.expression()?;
        self.expect(&Token::RParen, construct)?;
        Ok(condition)
    }

    fn if_statement(&mut self) -> PResult<Stmt> {
        let start = self.expect(&Token::If, "IfStatement")?.span;
        let condition = self.paren_condition("IfStatement")?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_token(&Token::Else) { Some(Box::new(self.statement()?)) } else { None };
        Ok(Stmt::If(IfStmt { condition, then_branch, else_branch, span: start.to(self.previous().span) }))
    }

    fn for_statement(&mut self) -> PResult<Stmt> {
        let start = self.expect(&Token::For, "ForStatement")?.span;
        self.expect(&Token::LParen, "ForStatement")?;

        let mut init = Vec::new();
        let declares = self.check(&Token::Final)
            || (self.check(&Token::At) && !self.check_at(1, &Token::Interface))
            || self.declaration_follows();
        if declares {
            let decl_start = self.peek().span;
            let (modifiers, annotations) = self.modifiers()?;
            let type_ref = self.type_ref()?;
            let (name, name_span) = self.ident()?;
            if self.check(&Token::Colon) {
                let colon = self.advance().span;
                self.gate(Feature::ForEach, colon);
                let iterable = self.expression()?;
                self.expect(&Token::RParen, "ForStatement")?;
                let body = Box::new(self.statement()?);
                return Ok(Stmt::ForEach(ForEachStmt {
                    modifiers,
                    type_ref,
                    name,
                    name_span,
                    iterable,
                    body,
                    span: start.to(self.previous().span),
                }));
            }
            let variables = self.declarators_from(name, name_span)?;
            init.push(Stmt::Declaration(VarDeclStmt {
                modifiers,
                annotations,
                type_ref,
                variables,
                span: decl_start.to(self.previous().span),
            }));
        } else if !self.check(&Token::Semicolon) {
            loop {
                let expr = self.expression()?;
                let span = expr.span();
                init.push(Stmt::Expression(ExprStmt { expr, span }));
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(&Token::Semicolon, "ForStatement")?;
        let condition = if self.check(&Token::Semicolon) { None } else { Some(self.expression()?) };
        self.expect(&Token::Semicolon, "ForStatement")?;
        let mut update = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                update.push(self.expression()?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(&Token::RParen, "ForStatement")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::For(ForStmt { init, condition, update, body, span: start.to(self.previous().span) }))
    }

    fn try_statement(&mut self) -> PResult<Stmt> {
        let start = self.expect(&Token::Try, "TryStatement")?.span;
        let mut resources = Vec::new();
        if self.match_token(&Token::LParen) {
            while !self.check(&Token::RParen) && !self.is_at_end() {
                resources.push(self.try_resource()?);
                if !self.match_token(&Token::Semicolon) {
                    break;
                }
            }
            self.expect(&Token::RParen, "ResourceSpecification")?;
        }
        let try_block = self.block()?;
        let mut catch_clauses = Vec::new();
        while self.check(&Token::Catch) {
            let catch_start = self.advance().span;
            self.expect(&Token::LParen, "CatchClause")?;
            let param_start = self.peek().span;
            let (modifiers, annotations) = self.modifiers()?;
            let type_ref = self.type_ref()?;
            let mut alt_types = Vec::new();
            while self.match_token(&Token::Pipe) {
                alt_types.push(self.type_ref()?);
            }
            let (name, name_span) = self.ident()?;
            self.expect(&Token::RParen, "CatchClause")?;
            let parameter = Parameter {
                modifiers,
                annotations,
                type_ref,
                name,
                name_span,
                varargs: false,
                span: param_start.to(name_span),
            };
            let block = self.block()?;
            catch_clauses.push(CatchClause { parameter, alt_types, span: catch_start.to(block.span), block });
        }
        let finally_block = if self.match_token(&Token::Finally) { Some(self.block()?) } else { None };
        if resources.is_empty() && catch_clauses.is_empty() && finally_block.is_none() {
            self.syntax(ParseError::insert("Finally", "BlockStatements"), self.previous().span);
        }
        Ok(Stmt::Try(TryStmt { resources, try_block, catch_clauses, finally_block, span: start.to(self.previous().span) }))
    }

    fn try_resource(&mut self) -> PResult<TryResource> {
        let start = self.peek().span;
        if self.check(&Token::Final) || self.declaration_follows() {
            let (modifiers, _) = self.modifiers()?;
            let type_ref = self.type_ref()?;
            let (name, name_span) = self.ident()?;
            self.expect(&Token::Assign, "Resource")?;
            let initializer = self.expression()?;
            return Ok(TryResource::Var {
                modifiers,
                type_ref,
                name,
                name_span,
                initializer,
                span: start.to(self.previous().span),
            });
        }
        let expr = self.expression()?;
        Ok(TryResource::Expr { span: expr.span(), expr })
    }

    // ----- switch -----

    /// `switch (selector) { ... }` shared by statements and expressions
    pub(super) fn switch_block(&mut self) -> PResult<SwitchBlock> {
        let keyword_span = self.expect(&Token::Switch, "SwitchStatement")?.span;
        self.expect(&Token::LParen, "SwitchStatement")?;
        let selector = self.expression()?;
        self.expect(&Token::RParen, "SwitchStatement")?;
        self.expect(&Token::LBrace, "SwitchBlock")?;

        let mut cases = Vec::new();
        let mut state = LabelState::default();
        while !self.check(&Token::RBrace) && !self.is_at_end() {
            if self.exhausted() {
                break;
            }
            let before = self.current;
            if !self.label_starts_here() {
                let tok = self.peek().clone();
                self.syntax(ParseError::expected(&tok.lexeme, "case"), tok.span);
                let _ = self.block_statement();
                if self.current == before {
                    self.advance();
                }
                continue;
            }
            match self.switch_case(&mut state) {
                Ok(c) => cases.push(c),
                Err(_) => {
                    self.synchronize_in_switch();
                    if self.current == before {
                        self.advance();
                    }
                }
            }
        }
        let close = if self.check(&Token::RBrace) {
            self.advance().span
        } else {
            self.syntax(ParseError::insert("}", "SwitchBlock"), self.previous().span);
            self.previous().span
        };
        log::trace!("parsed switch with {} case groups", cases.len());
        Ok(SwitchBlock { selector: Box::new(selector), cases, keyword_span, span: keyword_span.to(close) })
    }

    fn label_starts_here(&self) -> bool {
        self.check(&Token::Case)
            || (self.check(&Token::Default) && (self.check_at(1, &Token::Colon) || self.check_at(1, &Token::Arrow)))
    }

    fn synchronize_in_switch(&mut self) {
        let mut depth = 0usize;
        while !self.is_at_end() {
            match self.peek().token {
                Token::LBrace => depth += 1,
                Token::RBrace if depth == 0 => return,
                Token::RBrace => depth -= 1,
                Token::Case | Token::Default if depth == 0 => return,
                _ => {}
            }
            self.advance();
        }
    }

    fn switch_case(&mut self, state: &mut LabelState) -> PResult<SwitchCase> {
        let start = self.peek().span;
        let (first, arrow) = self.switch_label(state)?;
        if arrow {
            let body = if self.check(&Token::LBrace) {
                CaseBody::Block(self.block()?)
            } else if self.check(&Token::Throw) {
                let throw_start = self.advance().span;
                let expr = self.expression()?;
                self.end_statement()?;
                CaseBody::Throw(ThrowStmt { expr, span: throw_start.to(self.previous().span) })
            } else {
                let expr = self.expression()?;
                self.end_statement()?;
                CaseBody::Expression(expr)
            };
            return Ok(SwitchCase { labels: vec![first], arrow: true, body, span: start.to(self.previous().span) });
        }

        let mut labels = vec![first];
        while self.label_starts_here() {
            let (label, _) = self.switch_label(state)?;
            labels.push(label);
        }
        let statements = self.statements_until(|p| p.label_starts_here());
        Ok(SwitchCase {
            labels,
            arrow: false,
            body: CaseBody::Statements(statements),
            span: start.to(self.previous().span),
        })
    }

    /// One `case ...:`/`case ... ->`/`default` label; returns whether it is an arrow rule
    fn switch_label(&mut self, state: &mut LabelState) -> PResult<(SwitchLabel, bool)> {
        let start = self.peek().span;
        let mut elements: Vec<CaseLabelElement> = Vec::new();
        let mut guard = None;

        if self.check(&Token::Default) {
            let span = self.advance().span;
            self.note_default(state, span);
            elements.push(CaseLabelElement::Default(span));
        } else {
            self.expect(&Token::Case, "SwitchLabel")?;
            loop {
                let element = self.case_label_element(&elements, state)?;
                elements.push(element);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
            let has_pattern = elements.iter().any(|e| matches!(e, CaseLabelElement::Pattern(_)));
            if has_pattern && (self.check(&Token::AndAnd) || self.peek().is_word("when")) {
                self.advance();
                guard = Some(self.expression_no_lambda()?);
            }
        }

        let arrow = if self.check(&Token::Arrow) {
            let span = self.advance().span;
            self.gate(Feature::ArrowCases, span);
            true
        } else {
            self.expect(&Token::Colon, "SwitchLabel")?;
            false
        };
        match state.arrow_kind {
            None => state.arrow_kind = Some(arrow),
            Some(kind) if kind != arrow => {
                self.syntax(ParseError::other("Different case kinds used in the switch"), start);
            }
            Some(_) => {}
        }
        Ok((SwitchLabel { elements, guard, span: start.to(self.previous().span) }, arrow))
    }

    fn case_label_element(&mut self, existing: &[CaseLabelElement], state: &mut LabelState) -> PResult<CaseLabelElement> {
        let tok = self.peek().clone();

        if tok.token == Token::Default {
            self.advance();
            let follows_null = existing.len() == 1 && matches!(existing[0], CaseLabelElement::Null(_));
            if !follows_null {
                self.report(
                    Category::IllegalDefaultPlacement,
                    "A 'default' can occur after 'case' only as a second case label expression and that too only if 'null' precedes in 'case null, default'",
                    tok.span,
                );
            }
            self.note_default(state, tok.span);
            return Ok(CaseLabelElement::Default(tok.span));
        }

        if tok.token == Token::Null
            && (self.check_at(1, &Token::Comma) || self.check_at(1, &Token::Colon) || self.check_at(1, &Token::Arrow))
        {
            self.advance();
            self.gate(Feature::SwitchPatterns, tok.span);
            return Ok(CaseLabelElement::Null(tok.span));
        }

        if self.pattern_follows() {
            let pattern = self.pattern()?;
            let span = pattern.span();
            self.gate(Feature::SwitchPatterns, span);
            if existing.iter().any(|e| matches!(e, CaseLabelElement::Pattern(_))) {
                self.report(
                    Category::MultiplePatternsInLabel,
                    "A switch label may not have more than one pattern case label element",
                    span,
                );
            } else if existing.iter().any(|e| matches!(e, CaseLabelElement::Constant(_))) {
                self.report(Category::MixedPatternAndConstantLabels, "Cannot mix pattern with other case labels", span);
            }
            return Ok(CaseLabelElement::Pattern(pattern));
        }

        let constant = self.conditional_no_lambda()?;
        let span = constant.span();
        if existing.iter().any(|e| matches!(e, CaseLabelElement::Pattern(_))) {
            self.report(Category::MixedPatternAndConstantLabels, "Cannot mix pattern with other case labels", span);
        }
        if existing.len() == 1 && matches!(existing[0], CaseLabelElement::Constant(_)) {
            self.gate(Feature::MultiConstantCaseLabels, span);
        }
        Ok(CaseLabelElement::Constant(constant))
    }

    fn note_default(&mut self, state: &mut LabelState, span: Span) {
        if state.seen_default {
            self.report(Category::DuplicateDefaultCase, "The default case is already defined", span);
        }
        state.seen_default = true;
    }

    /// A type pattern or record pattern starts at the cursor
    pub(super) fn pattern_follows(&self) -> bool {
        let mut i = self.current;
        while self.token_at(i).token == Token::Final {
            i += 1;
        }
        let Some(j) = self.speculate_type(i) else {
            return false;
        };
        match self.token_at(j).token {
            Token::Identifier | Token::Underscore => true,
            Token::LParen => self.token_at(i).token == Token::Identifier,
            _ => false,
        }
    }

    /// Record a non-syntax structural error found while parsing
    pub(super) fn report(&mut self, category: Category, message: &str, span: Span) {
        self.diagnostics.push(Diagnostic::error(category, message, span));
    }
}

//! Recursive-descent parser for Java compilation units
//!
//! Every production returns `PResult<T>`; an `Err(Recovery)` means a
//! diagnostic has already been recorded and the caller's driver loop
//! (compilation unit, class body, block, switch block) must resynchronise at
//! the next member or statement boundary. Statements live in `statements.rs`,
//! expressions and patterns in `expressions.rs`.

use std::collections::HashSet;

use super::error::{PResult, ParseError, Recovery};
use super::lexer::{LexicalToken, Token};
use super::span::Span;
use crate::ast::*;
use crate::config::{Config, Feature, LanguageLevel};
use crate::consts::{PARSER_MAX_DEPTH, PARSER_MAX_LOOP_ITERS};
use crate::diagnostics::{Category, Diagnostic};

/// Parser for Java source
pub struct Parser<'c> {
    pub(super) tokens: Vec<LexicalToken>,
    pub(super) current: usize,
    pub(super) config: &'c Config,
    pub(super) diagnostics: Vec<Diagnostic>,
    reported_offsets: HashSet<usize>,
    syntax_errors: usize,
    next_id: u32,
    steps: usize,
    depth: usize,
    /// Disables `x -> ...` lambda recognition while parsing case labels
    pub(super) no_lambda: bool,
}

/// What kind of body a member list belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BodyKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
    Anonymous,
}

impl<'c> Parser<'c> {
    /// `tokens` must end with `Token::Eof`
    pub fn new(mut tokens: Vec<LexicalToken>, config: &'c Config) -> Self {
        if tokens.last().map(|t| t.token != Token::Eof).unwrap_or(true) {
            let end = tokens.last().map(|t| Span::single(t.span.end)).unwrap_or_default();
            tokens.push(LexicalToken::new(Token::Eof, "", end));
        }
        Self {
            tokens,
            current: 0,
            config,
            diagnostics: Vec::new(),
            reported_offsets: HashSet::new(),
            syntax_errors: 0,
            next_id: 0,
            steps: 0,
            depth: 0,
            no_lambda: false,
        }
    }

    pub fn level(&self) -> LanguageLevel {
        self.config.language_level
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Parse a whole compilation unit, recovering from every syntax error
    pub fn parse_compilation_unit(&mut self) -> CompilationUnit {
        let start = self.peek().span;
        let mut package_decl = None;
        let mut imports = Vec::new();
        let mut type_decls = Vec::new();

        if self.check(&Token::Package) || (self.check(&Token::At) && self.package_follows_annotations()) {
            match self.package_decl() {
                Ok(p) => package_decl = Some(p),
                Err(_) => self.synchronize_toplevel(),
            }
        }

        while self.check(&Token::Import) {
            match self.import_decl() {
                Ok(i) => imports.push(i),
                Err(_) => self.synchronize_toplevel(),
            }
        }

        while !self.is_at_end() {
            if self.exhausted() {
                break;
            }
            if self.match_token(&Token::Semicolon) {
                continue;
            }
            let before = self.current;
            match self.top_level_type() {
                Ok(t) => type_decls.push(t),
                Err(_) => {
                    self.synchronize_toplevel();
                    if self.current == before {
                        self.advance();
                    }
                }
            }
        }

        let end = self.previous().span;
        CompilationUnit { package_decl, imports, type_decls, span: start.to(end) }
    }

    fn package_follows_annotations(&self) -> bool {
        let mut i = self.current;
        while i < self.tokens.len() {
            match self.tokens[i].token {
                Token::Package => return true,
                Token::Class | Token::Interface | Token::Enum | Token::LBrace | Token::Semicolon => return false,
                _ => i += 1,
            }
        }
        false
    }

    fn package_decl(&mut self) -> PResult<PackageDecl> {
        let annotations = self.annotations()?;
        let start = self.expect(&Token::Package, "PackageDeclaration")?.span;
        let (name, _) = self.qualified_name()?;
        self.expect(&Token::Semicolon, "PackageDeclaration")?;
        Ok(PackageDecl { name, annotations, span: start.to(self.previous().span) })
    }

    fn import_decl(&mut self) -> PResult<ImportDecl> {
        let start = self.expect(&Token::Import, "ImportDeclaration")?.span;
        let is_static = self.match_token(&Token::Static);
        if is_static {
            self.gate(Feature::StaticImports, self.previous().span);
        }
        let (first, _) = self.ident()?;
        let mut name = first;
        let mut is_wildcard = false;
        while self.match_token(&Token::Dot) {
            if self.match_token(&Token::Star) {
                is_wildcard = true;
                break;
            }
            let (part, _) = self.ident()?;
            name.push('.');
            name.push_str(&part);
        }
        self.expect(&Token::Semicolon, "ImportDeclaration")?;
        Ok(ImportDecl { name, is_static, is_wildcard, span: start.to(self.previous().span) })
    }

    fn top_level_type(&mut self) -> PResult<TypeDecl> {
        let start = self.peek().span;
        let (modifiers, annotations) = self.modifiers()?;
        match self.try_type_decl(modifiers, annotations, start)? {
            Some(decl) => Ok(decl),
            None => {
                let tok = self.peek().clone();
                if tok.token == Token::Eof {
                    return Err(self.recovery());
                }
                self.syntax(ParseError::delete(&tok.lexeme), tok.span);
                Err(self.recovery())
            }
        }
    }

    /// Parse a class, interface, enum, record or annotation type if one starts here
    pub(super) fn try_type_decl(
        &mut self,
        modifiers: Vec<Modifier>,
        annotations: Vec<Annotation>,
        start: Span,
    ) -> PResult<Option<TypeDecl>> {
        let decl = if self.check(&Token::Class) {
            TypeDecl::Class(self.class_decl(modifiers, annotations, start)?)
        } else if self.check(&Token::Interface) {
            TypeDecl::Interface(self.interface_decl(modifiers, annotations, start)?)
        } else if self.check(&Token::At) && self.check_at(1, &Token::Interface) {
            TypeDecl::Annotation(self.annotation_decl(modifiers, annotations, start)?)
        } else if self.check(&Token::Enum) || self.enum_keyword_as_identifier() {
            TypeDecl::Enum(self.enum_decl(modifiers, annotations, start)?)
        } else if self.record_starts_here() {
            TypeDecl::Record(self.record_decl(modifiers, annotations, start)?)
        } else {
            return Ok(None);
        };
        Ok(Some(decl))
    }

    /// `enum` spelled at a level where it is still an identifier
    fn enum_keyword_as_identifier(&self) -> bool {
        self.peek().is_word("enum")
            && self.check_at(1, &Token::Identifier)
            && (self.check_at(2, &Token::LBrace) || self.check_at(2, &Token::Implements))
    }

    pub(super) fn record_starts_here(&self) -> bool {
        self.peek().is_word("record")
            && self.check_at(1, &Token::Identifier)
            && (self.check_at(2, &Token::LParen) || self.check_at(2, &Token::Lt))
    }

    fn class_decl(&mut self, modifiers: Vec<Modifier>, annotations: Vec<Annotation>, start: Span) -> PResult<ClassDecl> {
        self.expect(&Token::Class, "ClassDeclaration")?;
        let (name, name_span) = self.ident()?;
        let type_params = self.optional_type_params()?;
        let extends = if self.match_token(&Token::Extends) { Some(self.type_ref()?) } else { None };
        let implements = if self.match_token(&Token::Implements) { self.type_list()? } else { Vec::new() };
        let permits = self.optional_permits()?;
        let (body, body_span) = self.class_body(&name, BodyKind::Class)?;
        Ok(ClassDecl {
            modifiers,
            annotations,
            name,
            name_span,
            type_params,
            extends,
            implements,
            permits,
            body,
            span: start.to(body_span),
        })
    }

    fn interface_decl(
        &mut self,
        modifiers: Vec<Modifier>,
        annotations: Vec<Annotation>,
        start: Span,
    ) -> PResult<InterfaceDecl> {
        self.expect(&Token::Interface, "InterfaceDeclaration")?;
        let (name, name_span) = self.ident()?;
        let type_params = self.optional_type_params()?;
        let extends = if self.match_token(&Token::Extends) { self.type_list()? } else { Vec::new() };
        let permits = self.optional_permits()?;
        let (body, body_span) = self.class_body(&name, BodyKind::Interface)?;
        Ok(InterfaceDecl { modifiers, annotations, name, name_span, type_params, extends, permits, body, span: start.to(body_span) })
    }

    fn annotation_decl(
        &mut self,
        modifiers: Vec<Modifier>,
        annotations: Vec<Annotation>,
        start: Span,
    ) -> PResult<AnnotationDecl> {
        let at = self.advance().span;
        self.gate(Feature::Annotations, at);
        self.expect(&Token::Interface, "AnnotationTypeDeclaration")?;
        let (name, name_span) = self.ident()?;
        let (body, body_span) = self.class_body(&name, BodyKind::Annotation)?;
        Ok(AnnotationDecl { modifiers, annotations, name, name_span, body, span: start.to(body_span) })
    }

    fn record_decl(&mut self, modifiers: Vec<Modifier>, annotations: Vec<Annotation>, start: Span) -> PResult<RecordDecl> {
        let keyword = self.advance().span;
        self.gate(Feature::Records, keyword);
        let (name, name_span) = self.ident()?;
        let type_params = self.optional_type_params()?;
        let components = self.formal_parameters()?;
        let implements = if self.match_token(&Token::Implements) { self.type_list()? } else { Vec::new() };
        let (body, body_span) = self.class_body(&name, BodyKind::Record)?;
        Ok(RecordDecl {
            modifiers,
            annotations,
            name,
            name_span,
            type_params,
            components,
            implements,
            body,
            span: start.to(body_span),
        })
    }

    fn enum_decl(&mut self, modifiers: Vec<Modifier>, annotations: Vec<Annotation>, start: Span) -> PResult<EnumDecl> {
        let keyword = self.advance().span;
        self.gate(Feature::Enums, keyword);
        let (name, name_span) = self.ident()?;
        let implements = if self.match_token(&Token::Implements) { self.type_list()? } else { Vec::new() };
        self.expect(&Token::LBrace, "EnumBody")?;

        let mut constants = Vec::new();
        let mut has_constant_terminator = false;
        loop {
            if self.exhausted() || self.is_at_end() {
                break;
            }
            if self.match_token(&Token::Semicolon) {
                has_constant_terminator = true;
                break;
            }
            if self.check(&Token::RBrace) {
                break;
            }
            let before = self.current;
            match self.enum_constant() {
                Ok(c) => constants.push(c),
                Err(_) => {
                    self.synchronize_in_enum_constants();
                    if self.current == before {
                        self.advance();
                    }
                    continue;
                }
            }
            if self.match_token(&Token::Comma) {
                continue;
            }
            if self.match_token(&Token::Semicolon) {
                has_constant_terminator = true;
                break;
            }
            if self.check(&Token::RBrace) {
                break;
            }
            let tok = self.peek().clone();
            self.syntax(ParseError::insert("}", "EnumBody"), self.previous().span);
            if tok.token != Token::Identifier {
                self.synchronize_in_enum_constants();
            }
        }

        let mut body = Vec::new();
        if has_constant_terminator {
            body = self.member_list(&name, BodyKind::Enum)?;
        }
        let end = self.expect(&Token::RBrace, "EnumBody").map(|t| t.span).unwrap_or_else(|_| self.previous().span);
        Ok(EnumDecl {
            modifiers,
            annotations,
            name,
            name_span,
            implements,
            constants,
            has_constant_terminator,
            body,
            span: start.to(end),
        })
    }

    fn enum_constant(&mut self) -> PResult<EnumConstant> {
        let start = self.peek().span;
        let (modifiers, annotations) = self.modifiers()?;
        let (name, name_span) = self.ident()?;
        let arguments = if self.check(&Token::LParen) { Some(self.arguments()?) } else { None };
        let body = if self.check(&Token::LBrace) {
            let (members, span) = self.class_body("", BodyKind::Anonymous)?;
            ConstantBody::WithBody(ClassBody { members, span })
        } else {
            ConstantBody::Plain
        };
        Ok(EnumConstant { modifiers, annotations, name, name_span, arguments, body, span: start.to(self.previous().span) })
    }

    fn synchronize_in_enum_constants(&mut self) {
        while !self.is_at_end() {
            match self.peek().token {
                Token::Comma | Token::Semicolon | Token::RBrace => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// `{ members }`, returning the members and the span of the braces
    pub(super) fn class_body(&mut self, owner: &str, kind: BodyKind) -> PResult<(Vec<ClassMember>, Span)> {
        let open = self.expect(&Token::LBrace, "ClassBody")?.span;
        let members = self.nested(|p| p.member_list(owner, kind))?;
        let close = if self.check(&Token::RBrace) {
            self.advance().span
        } else {
            self.syntax(ParseError::insert("}", "ClassBody"), self.previous().span);
            self.previous().span
        };
        Ok((members, open.to(close)))
    }

    /// Members up to (not including) the closing brace
    fn member_list(&mut self, owner: &str, kind: BodyKind) -> PResult<Vec<ClassMember>> {
        let mut members = Vec::new();
        while !self.check(&Token::RBrace) && !self.is_at_end() {
            if self.exhausted() {
                break;
            }
            if self.match_token(&Token::Semicolon) {
                continue;
            }
            let before = self.current;
            match self.class_member(owner, kind) {
                Ok(mut m) => members.append(&mut m),
                Err(_) => {
                    self.synchronize_in_class_body();
                    if self.current == before {
                        self.advance();
                    }
                }
            }
        }
        Ok(members)
    }

    fn class_member(&mut self, owner: &str, kind: BodyKind) -> PResult<Vec<ClassMember>> {
        let start = self.peek().span;
        if self.check(&Token::LBrace) {
            let body = self.block()?;
            let span = start.to(body.span);
            return Ok(vec![ClassMember::Initializer(InitializerBlock { is_static: false, body, span })]);
        }
        if self.check(&Token::Static) && self.check_at(1, &Token::LBrace) {
            self.advance();
            let body = self.block()?;
            let span = start.to(body.span);
            return Ok(vec![ClassMember::Initializer(InitializerBlock { is_static: true, body, span })]);
        }

        let (modifiers, annotations) = self.modifiers()?;
        if let Some(decl) = self.try_type_decl(modifiers.clone(), annotations.clone(), start)? {
            return Ok(vec![ClassMember::TypeDecl(decl)]);
        }

        let type_params = self.optional_type_params()?;

        if self.check(&Token::Identifier) && self.check_at(1, &Token::LParen) {
            return self.constructor(modifiers, annotations, type_params, owner, start).map(|c| vec![c]);
        }
        if kind == BodyKind::Record && self.peek().is_word(owner) && self.check_at(1, &Token::LBrace) {
            let (name, name_span) = self.ident()?;
            let body = self.block()?;
            return Ok(vec![ClassMember::Constructor(ConstructorDecl {
                modifiers,
                annotations,
                type_params,
                name,
                name_span,
                parameters: Vec::new(),
                throws: Vec::new(),
                explicit_invocation: None,
                span: start.to(body.span),
                body,
                compact: true,
            })]);
        }

        let return_type = if self.match_token(&Token::Void) { None } else { Some(self.type_ref()?) };
        let (name, name_span) = self.ident()?;

        if self.check(&Token::LParen) {
            let parameters = self.formal_parameters()?;
            let extra_dims = self.dims();
            let return_type = return_type.map(|t| t.with_extra_dims(extra_dims));
            let throws = if self.match_token(&Token::Throws) { self.type_list()? } else { Vec::new() };
            let default_value = if kind == BodyKind::Annotation && self.match_token(&Token::Default) {
                Some(self.element_value()?)
            } else {
                None
            };
            let body = if self.check(&Token::LBrace) {
                Some(self.block()?)
            } else {
                self.expect(&Token::Semicolon, "MethodDeclaration")?;
                None
            };
            return Ok(vec![ClassMember::Method(MethodDecl {
                modifiers,
                annotations,
                type_params,
                return_type,
                name,
                name_span,
                parameters,
                throws,
                body,
                default_value,
                span: start.to(self.previous().span),
            })]);
        }

        let Some(field_type) = return_type else {
            self.syntax(ParseError::expected(&name, "Identifier"), name_span);
            return Err(self.recovery());
        };
        let mut fields = Vec::new();
        let (mut name, mut name_span) = (name, name_span);
        loop {
            let dims = self.dims();
            let initializer = if self.match_token(&Token::Assign) { Some(self.variable_initializer()?) } else { None };
            fields.push(ClassMember::Field(FieldDecl {
                modifiers: modifiers.clone(),
                annotations: annotations.clone(),
                type_ref: field_type.clone().with_extra_dims(dims),
                name,
                name_span,
                initializer,
                span: start.to(self.previous().span),
            }));
            if !self.match_token(&Token::Comma) {
                break;
            }
            let next = self.ident()?;
            name = next.0;
            name_span = next.1;
        }
        self.expect(&Token::Semicolon, "FieldDeclaration")?;
        Ok(fields)
    }

    fn constructor(
        &mut self,
        modifiers: Vec<Modifier>,
        annotations: Vec<Annotation>,
        type_params: Vec<TypeParam>,
        owner: &str,
        start: Span,
    ) -> PResult<ClassMember> {
        let (name, name_span) = self.ident()?;
        if name != owner {
            self.syntax(ParseError::other("Return type for the method is missing"), name_span);
        }
        let parameters = self.formal_parameters()?;
        let throws = if self.match_token(&Token::Throws) { self.type_list()? } else { Vec::new() };
        let mut body = self.block()?;
        let explicit_invocation = extract_explicit_invocation(&mut body);
        if name != owner {
            return Ok(ClassMember::Method(MethodDecl {
                modifiers,
                annotations,
                type_params,
                return_type: None,
                name,
                name_span,
                parameters,
                throws,
                body: Some(body),
                default_value: None,
                span: start.to(self.previous().span),
            }));
        }
        Ok(ClassMember::Constructor(ConstructorDecl {
            modifiers,
            annotations,
            type_params,
            name,
            name_span,
            parameters,
            throws,
            explicit_invocation,
            span: start.to(self.previous().span),
            body,
            compact: false,
        }))
    }

    /// `( [param {, param}] )`
    pub(super) fn formal_parameters(&mut self) -> PResult<Vec<Parameter>> {
        self.expect(&Token::LParen, "MethodHeaderParameters")?;
        let mut params = Vec::new();
        if self.match_token(&Token::RParen) {
            return Ok(params);
        }
        loop {
            let start = self.peek().span;
            let (modifiers, annotations) = self.modifiers()?;
            let type_ref = self.type_ref()?;
            let varargs = if self.check(&Token::Ellipsis) {
                let span = self.advance().span;
                self.gate(Feature::Varargs, span);
                true
            } else {
                false
            };
            if self.check(&Token::This) {
                // receiver parameter
                self.advance();
                if !self.match_token(&Token::Comma) {
                    break;
                }
                continue;
            }
            let (name, name_span) = self.ident()?;
            let dims = self.dims();
            params.push(Parameter {
                modifiers,
                annotations,
                type_ref: type_ref.with_extra_dims(dims),
                name,
                name_span,
                varargs,
                span: start.to(self.previous().span),
            });
            if !self.match_token(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RParen, "FormalParameterList")?;
        Ok(params)
    }

    /// Modifiers and annotations in any order
    pub(super) fn modifiers(&mut self) -> PResult<(Vec<Modifier>, Vec<Annotation>)> {
        let mut modifiers = Vec::new();
        let mut annotations = Vec::new();
        loop {
            let tok = self.peek().clone();
            let modifier = match tok.token {
                Token::Public => Some(Modifier::Public),
                Token::Protected => Some(Modifier::Protected),
                Token::Private => Some(Modifier::Private),
                Token::Abstract => Some(Modifier::Abstract),
                Token::Static => Some(Modifier::Static),
                Token::Final => Some(Modifier::Final),
                Token::Native => Some(Modifier::Native),
                Token::Synchronized if !self.check_at(1, &Token::LParen) => Some(Modifier::Synchronized),
                Token::Transient => Some(Modifier::Transient),
                Token::Volatile => Some(Modifier::Volatile),
                Token::Strictfp => Some(Modifier::Strictfp),
                Token::Default if !self.check_at(1, &Token::Colon) && !self.check_at(1, &Token::Arrow) => {
                    Some(Modifier::Default)
                }
                Token::At if !self.check_at(1, &Token::Interface) => {
                    annotations.push(self.annotation()?);
                    continue;
                }
                Token::Identifier if tok.lexeme == "sealed" && self.modifier_follows(1) => {
                    self.gate(Feature::SealedTypes, tok.span);
                    Some(Modifier::Sealed)
                }
                Token::Identifier if tok.lexeme == "non" && self.non_sealed_here() => {
                    self.advance();
                    self.advance();
                    self.gate(Feature::SealedTypes, tok.span.to(self.peek().span));
                    Some(Modifier::NonSealed)
                }
                _ => None,
            };
            match modifier {
                Some(m) => {
                    self.advance();
                    modifiers.push(m);
                }
                None => break,
            }
        }
        Ok((modifiers, annotations))
    }

    fn modifier_follows(&self, n: usize) -> bool {
        let t = &self.peek_at(n);
        t.token.is_modifier()
            || matches!(t.token, Token::Class | Token::Interface | Token::At)
            || t.is_word("sealed")
            || t.is_word("non")
            || t.is_word("record")
    }

    /// `non-sealed` as three adjacent tokens
    fn non_sealed_here(&self) -> bool {
        let non = self.peek();
        let dash = self.peek_at(1);
        let sealed = self.peek_at(2);
        dash.token == Token::Minus
            && sealed.is_word("sealed")
            && non.span.end.offset == dash.span.start.offset
            && dash.span.end.offset == sealed.span.start.offset
    }

    pub(super) fn annotations(&mut self) -> PResult<Vec<Annotation>> {
        let mut annotations = Vec::new();
        while self.check(&Token::At) && !self.check_at(1, &Token::Interface) {
            annotations.push(self.annotation()?);
        }
        Ok(annotations)
    }

    fn annotation(&mut self) -> PResult<Annotation> {
        let start = self.expect(&Token::At, "Annotation")?.span;
        self.gate(Feature::Annotations, start);
        let (name, _) = self.qualified_name()?;
        let mut arguments = Vec::new();
        if self.match_token(&Token::LParen) {
            if !self.check(&Token::RParen) {
                loop {
                    if self.check(&Token::Identifier) && self.check_at(1, &Token::Assign) {
                        let (key, _) = self.ident()?;
                        self.advance();
                        arguments.push(AnnotationArg::Named(key, self.element_value()?));
                    } else {
                        arguments.push(AnnotationArg::Value(self.element_value()?));
                    }
                    if !self.match_token(&Token::Comma) {
                        break;
                    }
                }
            }
            self.expect(&Token::RParen, "Annotation")?;
        }
        Ok(Annotation { name, arguments, span: start.to(self.previous().span) })
    }

    fn element_value(&mut self) -> PResult<Expr> {
        if self.check(&Token::At) {
            let a = self.nested(|p| p.annotation())?;
            return Ok(Expr::Erroneous(a.span));
        }
        if self.check(&Token::LBrace) {
            return self.array_initializer();
        }
        self.conditional_expression()
    }

    pub(super) fn optional_type_params(&mut self) -> PResult<Vec<TypeParam>> {
        if !self.check(&Token::Lt) {
            return Ok(Vec::new());
        }
        let lt = self.advance().span;
        self.gate(Feature::TypeParameters, lt);
        let mut params = Vec::new();
        loop {
            let _ = self.annotations()?;
            let (name, span) = self.ident()?;
            let mut bounds = Vec::new();
            if self.match_token(&Token::Extends) {
                bounds.push(self.type_ref()?);
                while self.match_token(&Token::Amp) {
                    bounds.push(self.type_ref()?);
                }
            }
            params.push(TypeParam { name, bounds, span: span.to(self.previous().span) });
            if !self.match_token(&Token::Comma) {
                break;
            }
        }
        self.expect_closing_angle()?;
        Ok(params)
    }

    fn optional_permits(&mut self) -> PResult<Vec<TypeRef>> {
        if self.peek().is_word("permits") {
            let span = self.advance().span;
            self.gate(Feature::SealedTypes, span);
            return self.type_list();
        }
        Ok(Vec::new())
    }

    pub(super) fn type_list(&mut self) -> PResult<Vec<TypeRef>> {
        let mut types = vec![self.type_ref()?];
        while self.match_token(&Token::Comma) {
            types.push(self.type_ref()?);
        }
        Ok(types)
    }

    /// A type: primitive or qualified class type with arguments, then dims
    pub(super) fn type_ref(&mut self) -> PResult<TypeRef> {
        self.nested(|p| p.type_ref_inner())
    }

    fn type_ref_inner(&mut self) -> PResult<TypeRef> {
        let annotations = self.annotations()?;
        let start = self.peek().span;
        let mut type_args = Vec::new();
        let mut diamond = false;
        let name = if self.peek().token.is_primitive_type() {
            self.advance().lexeme
        } else {
            let (mut name, _) = self.ident()?;
            loop {
                if self.check(&Token::Lt) {
                    let (args, is_diamond) = self.type_arguments()?;
                    type_args = args;
                    diamond = is_diamond;
                }
                if self.check(&Token::Dot) && self.check_at(1, &Token::Identifier) {
                    self.advance();
                    let (part, _) = self.ident()?;
                    name.push('.');
                    name.push_str(&part);
                    continue;
                }
                break;
            }
            name
        };
        let array_dims = self.dims();
        Ok(TypeRef { name, type_args, diamond, annotations, array_dims, span: start.to(self.previous().span) })
    }

    /// `<...>`; returns the arguments and whether it was a diamond
    pub(super) fn type_arguments(&mut self) -> PResult<(Vec<TypeArg>, bool)> {
        let lt = self.expect(&Token::Lt, "TypeArguments")?.span;
        self.gate(Feature::Generics, lt);
        if self.match_token(&Token::Gt) {
            return Ok((Vec::new(), true));
        }
        let mut args = Vec::new();
        loop {
            let _ = self.annotations()?;
            if self.check(&Token::Question) {
                let start = self.advance().span;
                let bound = if self.match_token(&Token::Extends) {
                    Some((BoundKind::Extends, self.type_ref()?))
                } else if self.match_token(&Token::Super) {
                    Some((BoundKind::Super, self.type_ref()?))
                } else {
                    None
                };
                args.push(TypeArg::Wildcard(WildcardType { bound, span: start.to(self.previous().span) }));
            } else {
                args.push(TypeArg::Type(self.type_ref()?));
            }
            if !self.match_token(&Token::Comma) {
                break;
            }
        }
        self.expect_closing_angle()?;
        Ok((args, false))
    }

    /// Consume one `>`, splitting `>>`, `>>>` and `>=` style tokens
    pub(super) fn expect_closing_angle(&mut self) -> PResult<()> {
        let rest = match self.peek().token {
            Token::Gt => {
                self.advance();
                return Ok(());
            }
            Token::RShift => Some((Token::Gt, ">")),
            Token::URShift => Some((Token::RShift, ">>")),
            Token::Ge => Some((Token::Assign, "=")),
            Token::RShiftAssign => Some((Token::Ge, ">=")),
            Token::URShiftAssign => Some((Token::RShiftAssign, ">>=")),
            _ => None,
        };
        match rest {
            Some((token, lexeme)) => {
                let tok = &mut self.tokens[self.current];
                tok.token = token;
                tok.lexeme = lexeme.to_string();
                tok.span.start.offset += 1;
                tok.span.start.column += 1;
                Ok(())
            }
            None => {
                self.report_missing(&Token::Gt, "ReferenceType");
                Err(self.recovery())
            }
        }
    }

    /// Count `[]` pairs
    pub(super) fn dims(&mut self) -> usize {
        let mut dims = 0;
        while self.check(&Token::LBracket) && self.check_at(1, &Token::RBracket) {
            self.advance();
            self.advance();
            dims += 1;
        }
        dims
    }

    pub(super) fn qualified_name(&mut self) -> PResult<(String, Span)> {
        let (mut name, start) = self.ident()?;
        while self.check(&Token::Dot) && self.check_at(1, &Token::Identifier) {
            self.advance();
            let (part, _) = self.ident()?;
            name.push('.');
            name.push_str(&part);
        }
        Ok((name, start.to(self.previous().span)))
    }

    /// An identifier, with the level-dependent reserved-word diagnostics
    pub(super) fn ident(&mut self) -> PResult<(String, Span)> {
        let tok = self.peek().clone();
        match tok.token {
            Token::Identifier => {
                self.advance();
                self.check_reserved_identifier(&tok);
                Ok((tok.lexeme, tok.span))
            }
            Token::Underscore => {
                self.advance();
                self.syntax(
                    ParseError::other("'_' is a keyword from source level 9 onwards, cannot be used as identifier"),
                    tok.span,
                );
                Ok((tok.lexeme, tok.span))
            }
            _ => {
                self.report_missing(&Token::Identifier, "Identifier");
                Err(self.recovery())
            }
        }
    }

    fn check_reserved_identifier(&mut self, tok: &LexicalToken) {
        let message = match tok.lexeme.as_str() {
            "assert" => "'assert' should not be used as an identifier, since it is a reserved keyword from source level 1.4 on",
            "enum" => "'enum' should not be used as an identifier, since it is a reserved keyword from source level 1.5 on",
            "_" if self.level() >= LanguageLevel::V1_8 => {
                "'_' should not be used as an identifier, since it is a reserved keyword from source level 1.8 on"
            }
            _ => return,
        };
        self.diagnostics
            .push(Diagnostic::warning(Category::ReservedKeywordAsIdentifier, message, tok.span));
    }

    // ----- token cursor -----

    pub(super) fn is_at_end(&self) -> bool {
        self.peek().token == Token::Eof
    }

    pub(super) fn peek(&self) -> &LexicalToken {
        let last = self.tokens.len() - 1;
        &self.tokens[self.current.min(last)]
    }

    pub(super) fn peek_at(&self, n: usize) -> &LexicalToken {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.current + n).min(last)]
    }

    pub(super) fn token_at(&self, i: usize) -> &LexicalToken {
        let last = self.tokens.len() - 1;
        &self.tokens[i.min(last)]
    }

    pub(super) fn previous(&self) -> &LexicalToken {
        &self.tokens[self.current.saturating_sub(1)]
    }

    pub(super) fn check(&self, token_type: &Token) -> bool {
        self.peek().is(token_type)
    }

    pub(super) fn check_at(&self, n: usize, token_type: &Token) -> bool {
        self.peek_at(n).is(token_type)
    }

    pub(super) fn advance(&mut self) -> LexicalToken {
        let tok = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        tok
    }

    pub(super) fn match_token(&mut self, token_type: &Token) -> bool {
        if self.check(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn expect(&mut self, token_type: &Token, construct: &str) -> PResult<LexicalToken> {
        if self.check(token_type) {
            return Ok(self.advance());
        }
        self.report_missing(token_type, construct);
        Err(self.recovery())
    }

    pub(super) fn recovery(&self) -> Recovery {
        Recovery { at: self.current }
    }

    /// Bounded progress counter for every driver loop
    pub(super) fn exhausted(&mut self) -> bool {
        self.steps += 1;
        if self.steps > PARSER_MAX_LOOP_ITERS {
            log::debug!("parser step limit reached at token {}", self.current);
            self.current = self.tokens.len() - 1;
            return true;
        }
        false
    }

    /// Run `f` one nesting level deeper
    pub(super) fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        self.descend()?;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Claim one nesting level, failing past `PARSER_MAX_DEPTH`. The caller
    /// gives the level back.
    pub(super) fn descend(&mut self) -> PResult<()> {
        if self.depth >= PARSER_MAX_DEPTH {
            let tok = self.peek().clone();
            log::debug!("nesting limit reached at token {}", self.current);
            self.syntax(ParseError::other("Syntax error, the construct is nested too deeply"), tok.span);
            return Err(self.recovery());
        }
        self.depth += 1;
        Ok(())
    }

    pub(super) fn release(&mut self, levels: usize) {
        self.depth -= levels;
    }

    pub(super) fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    // ----- diagnostics -----

    /// Record a syntax error, at most one per token offset
    pub(super) fn syntax(&mut self, error: ParseError, span: Span) {
        if self.syntax_errors >= self.config.max_parse_errors {
            return;
        }
        if !self.reported_offsets.insert(span.start.offset) {
            return;
        }
        self.syntax_errors += 1;
        log::trace!("syntax error at {}: {}", span.start, error);
        self.diagnostics.push(error.into_diagnostic(span));
    }

    /// Report a missing token: "insert" for closers, "X expected" otherwise
    pub(super) fn report_missing(&mut self, token_type: &Token, construct: &str) {
        let found = self.peek().clone();
        let closer = matches!(
            token_type,
            Token::Semicolon | Token::RParen | Token::RBracket | Token::RBrace | Token::Gt
        );
        if closer || found.token == Token::Eof {
            let at = self.previous().span;
            self.syntax(ParseError::insert(token_type.describe(), construct), at);
        } else {
            self.syntax(ParseError::expected(&found.lexeme, token_type.describe()), found.span);
        }
    }

    /// Report a construct unavailable at the configured level; returns whether it is allowed
    pub(super) fn gate(&mut self, feature: Feature, span: Span) -> bool {
        if self.config.allows(feature) {
            return true;
        }
        let message = feature.unavailable_message();
        let duplicate = self
            .diagnostics
            .iter()
            .any(|d| d.span.start.offset == span.start.offset && d.message == message);
        if !duplicate {
            self.diagnostics
                .push(Diagnostic::error(Category::FeatureNotAvailable, message, span));
        }
        false
    }

    // ----- recovery -----

    pub(super) fn synchronize_toplevel(&mut self) {
        while !self.is_at_end() {
            match self.peek().token {
                Token::Class | Token::Interface | Token::Enum | Token::Public | Token::Abstract | Token::Final => return,
                Token::Semicolon | Token::RBrace => {
                    self.advance();
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    pub(super) fn synchronize_in_class_body(&mut self) {
        let mut depth = 0usize;
        while !self.is_at_end() {
            match self.peek().token {
                Token::LBrace => depth += 1,
                Token::RBrace if depth == 0 => return,
                Token::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                Token::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                t if depth == 0 && (t.is_modifier() || t == Token::Class || t == Token::Interface) => {
                    if self.previous().span.end.line < self.peek().span.start.line {
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    pub(super) fn synchronize_in_block(&mut self) {
        while !self.is_at_end() {
            match self.peek().token {
                Token::Semicolon => {
                    self.advance();
                    return;
                }
                Token::RBrace | Token::LBrace => return,
                Token::If
                | Token::For
                | Token::While
                | Token::Do
                | Token::Return
                | Token::Switch
                | Token::Try
                | Token::Throw
                | Token::Case
                | Token::Default
                    if self.previous().span.end.line < self.peek().span.start.line =>
                {
                    return
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ----- lookahead -----

    /// Index just past a plausible type starting at token `i`, without consuming
    pub(super) fn speculate_type(&self, mut i: usize) -> Option<usize> {
        while self.token_at(i).token == Token::At && self.token_at(i + 1).token == Token::Identifier {
            i += 2;
            while self.token_at(i).token == Token::Dot && self.token_at(i + 1).token == Token::Identifier {
                i += 2;
            }
            if self.token_at(i).token == Token::LParen {
                i = self.skip_balanced(i, Token::LParen, Token::RParen)?;
            }
        }
        let first = &self.token_at(i).token;
        if first.is_primitive_type() {
            i += 1;
        } else if *first == Token::Identifier {
            i += 1;
            loop {
                if self.token_at(i).token == Token::Lt {
                    i = self.skip_type_arguments(i)?;
                }
                if self.token_at(i).token == Token::Dot && self.token_at(i + 1).token == Token::Identifier {
                    i += 2;
                    continue;
                }
                break;
            }
        } else {
            return None;
        }
        while self.token_at(i).token == Token::LBracket && self.token_at(i + 1).token == Token::RBracket {
            i += 2;
        }
        Some(i)
    }

    fn skip_type_arguments(&self, mut i: usize) -> Option<usize> {
        let mut depth: i32 = 0;
        loop {
            let tok = &self.token_at(i).token;
            match tok {
                Token::Lt => depth += 1,
                Token::Gt => depth -= 1,
                Token::RShift => depth -= 2,
                Token::URShift => depth -= 3,
                Token::Identifier
                | Token::Dot
                | Token::Comma
                | Token::Question
                | Token::Extends
                | Token::Super
                | Token::LBracket
                | Token::RBracket
                | Token::At
                | Token::Amp => {}
                t if t.is_primitive_type() => {}
                _ => return None,
            }
            i += 1;
            if depth <= 0 {
                return if depth == 0 { Some(i) } else { None };
            }
        }
    }

    pub(super) fn skip_balanced(&self, mut i: usize, open: Token, close: Token) -> Option<usize> {
        let mut depth = 0usize;
        loop {
            let tok = &self.token_at(i).token;
            if *tok == Token::Eof {
                return None;
            }
            if *tok == open {
                depth += 1;
            } else if *tok == close {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            i += 1;
        }
    }

    /// Local variable declaration starts here (type followed by a name)
    pub(super) fn declaration_follows(&self) -> bool {
        match self.speculate_type(self.current) {
            Some(j) => matches!(self.token_at(j).token, Token::Identifier | Token::Underscore),
            None => false,
        }
    }
}

/// Move a leading `this(...)`/`super(...)` statement out of a constructor body
fn extract_explicit_invocation(body: &mut Block) -> Option<ExplicitCtorInvocation> {
    let is_call = matches!(
        body.statements.first(),
        Some(Stmt::Expression(ExprStmt { expr: Expr::MethodCall(mc), .. }))
            if mc.target.is_none() && (mc.name == "this" || mc.name == "super")
    );
    if !is_call {
        return None;
    }
    match body.statements.remove(0) {
        Stmt::Expression(ExprStmt { expr: Expr::MethodCall(mc), span }) => Some(ExplicitCtorInvocation {
            kind: if mc.name == "this" { CtorCallKind::This } else { CtorCallKind::Super },
            arguments: mc.arguments,
            span,
        }),
        _ => None,
    }
}

/// Parse a token stream into a compilation unit plus syntax diagnostics
pub fn parse(tokens: Vec<LexicalToken>, config: &Config) -> (CompilationUnit, Vec<Diagnostic>) {
    let mut parser = Parser::new(tokens, config);
    let unit = parser.parse_compilation_unit();
    (unit, parser.into_diagnostics())
}

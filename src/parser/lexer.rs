use logos::Logos;

use super::span::{Location, Span};
use crate::config::{Feature, LanguageLevel};
use crate::diagnostics::{Category, Diagnostic};

/// Whether a delimited token (string, text block, char, block comment) was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimited {
    Closed,
    Unclosed,
}

/// Java tokens
#[derive(Logos, Debug, PartialEq, Clone, Copy)]
pub enum Token {
    // Keywords
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("static")]
    Static,
    #[token("public")]
    Public,
    #[token("protected")]
    Protected,
    #[token("private")]
    Private,
    #[token("abstract")]
    Abstract,
    #[token("final")]
    Final,
    #[token("native")]
    Native,
    #[token("synchronized")]
    Synchronized,
    #[token("transient")]
    Transient,
    #[token("volatile")]
    Volatile,
    #[token("strictfp")]
    Strictfp,
    #[token("class")]
    Class,
    #[token("interface")]
    Interface,
    #[token("enum")]
    Enum,
    #[token("extends")]
    Extends,
    #[token("implements")]
    Implements,
    #[token("new")]
    New,
    #[token("this")]
    This,
    #[token("super")]
    Super,
    #[token("instanceof")]
    InstanceOf,
    #[token("void")]
    Void,
    #[token("boolean")]
    Boolean,
    #[token("byte")]
    Byte,
    #[token("short")]
    Short,
    #[token("int")]
    Int,
    #[token("long")]
    Long,
    #[token("char")]
    Char,
    #[token("float")]
    Float,
    #[token("double")]
    Double,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("assert")]
    Assert,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("return")]
    Return,
    #[token("throw")]
    Throw,
    #[token("throws")]
    Throws,
    #[token("try")]
    Try,
    #[token("catch")]
    Catch,
    #[token("finally")]
    Finally,
    #[token("const")]
    Const,
    #[token("goto")]
    Goto,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("_", priority = 10)]
    Underscore,

    // Operators
    #[token("=")]
    Assign,
    #[token("+=")]
    AddAssign,
    #[token("-=")]
    SubAssign,
    #[token("*=")]
    MulAssign,
    #[token("/=")]
    DivAssign,
    #[token("%=")]
    ModAssign,
    #[token("&=")]
    AndAssign,
    #[token("|=")]
    OrAssign,
    #[token("^=")]
    XorAssign,
    #[token("<<=")]
    LShiftAssign,
    #[token(">>=")]
    RShiftAssign,
    #[token(">>>=")]
    URShiftAssign,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("++")]
    Inc,
    #[token("--")]
    Dec,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("<<")]
    LShift,
    #[token(">>")]
    RShift,
    #[token(">>>")]
    URShift,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    PipePipe,
    #[token("==")]
    Eq,
    #[token("!=")]
    Ne,
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token("::")]
    DoubleColon,
    #[token("->")]
    Arrow,

    // Separators
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("@")]
    At,
    #[token("...")]
    Ellipsis,

    // Literals
    #[token("\"", lex_string)]
    StringLiteral(Delimited),
    #[token("\"\"\"", lex_text_block)]
    TextBlock(Delimited),
    #[token("'", lex_char)]
    CharLiteral(Delimited),
    #[regex(r"0[xX][0-9a-fA-F_]+|0[bB][01_]+|[0-9][0-9_]*")]
    IntLiteral,
    #[regex(r"(0[xX][0-9a-fA-F_]+|0[bB][01_]+|[0-9][0-9_]*)[lL]")]
    LongLiteral,
    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9]+)?[fFdD]?|\.[0-9][0-9_]*([eE][+-]?[0-9]+)?[fFdD]?|[0-9][0-9_]*[eE][+-]?[0-9]+[fFdD]?|[0-9][0-9_]*[fFdD]")]
    FloatLiteral,

    // Identifiers
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*")]
    Identifier,

    // Comments and whitespace
    #[regex(r"//[^\n]*")]
    LineComment,
    #[token("/*", lex_block_comment)]
    BlockComment(Delimited),
    #[regex(r"[ \t\n\r\x0C]+")]
    Whitespace,
    #[token("\u{FEFF}")]
    Bom,

    /// Character sequence no rule accepts
    Invalid,
    /// End of input marker appended by `tokenize`
    Eof,
}

fn lex_string(lex: &mut logos::Lexer<'_, Token>) -> Delimited {
    let rest = lex.remainder();
    let mut escaped = false;
    for (i, ch) in rest.char_indices() {
        match ch {
            '\n' | '\r' => {
                lex.bump(i);
                return Delimited::Unclosed;
            }
            '\\' if !escaped => {
                escaped = true;
                continue;
            }
            '"' if !escaped => {
                lex.bump(i + 1);
                return Delimited::Closed;
            }
            _ => {}
        }
        escaped = false;
    }
    lex.bump(rest.len());
    Delimited::Unclosed
}

fn lex_text_block(lex: &mut logos::Lexer<'_, Token>) -> Delimited {
    let bytes = lex.remainder().as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i..].starts_with(b"\"\"\"") {
            lex.bump(i + 3);
            return Delimited::Closed;
        }
        i += 1;
    }
    let len = bytes.len();
    lex.bump(len);
    Delimited::Unclosed
}

fn lex_char(lex: &mut logos::Lexer<'_, Token>) -> Delimited {
    let rest = lex.remainder();
    let mut escaped = false;
    let mut close = None;
    for (i, ch) in rest.char_indices() {
        match ch {
            '\n' | '\r' => break,
            '\\' if !escaped => {
                escaped = true;
                continue;
            }
            '\'' if !escaped => {
                close = Some(i);
                break;
            }
            _ => {}
        }
        escaped = false;
    }
    match close {
        Some(i) => {
            let valid = is_valid_char_body(&rest[..i]);
            lex.bump(i + 1);
            if valid {
                Delimited::Closed
            } else {
                Delimited::Unclosed
            }
        }
        None => {
            if let Some(ch) = rest.chars().next().filter(|c| *c != '\n' && *c != '\r') {
                lex.bump(ch.len_utf8());
            }
            Delimited::Unclosed
        }
    }
}

fn is_valid_char_body(body: &str) -> bool {
    let mut chars = body.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c != '\\',
        (Some('\\'), Some(e)) => {
            let tail: String = chars.collect();
            match e {
                'b' | 't' | 'n' | 'f' | 'r' | 's' | '"' | '\'' | '\\' => tail.is_empty(),
                '0'..='7' => tail.len() <= 2 && tail.chars().all(|c| ('0'..='7').contains(&c)),
                'u' => {
                    let hex = tail.trim_start_matches('u');
                    hex.len() == 4 && hex.chars().all(|c| c.is_ascii_hexdigit())
                }
                _ => false,
            }
        }
        _ => false,
    }
}

fn lex_block_comment(lex: &mut logos::Lexer<'_, Token>) -> Delimited {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(i) => {
            lex.bump(i + 2);
            Delimited::Closed
        }
        None => {
            lex.bump(rest.len());
            Delimited::Unclosed
        }
    }
}

/// Coarse token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    Identifier,
    Literal,
    Operator,
    Punctuation,
    Invalid,
}

/// Identifiers that act as keywords only in particular positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextualKeyword {
    Record,
    Var,
    Yield,
    Sealed,
    Permits,
    When,
}

impl ContextualKeyword {
    fn from_lexeme(lexeme: &str) -> Option<Self> {
        match lexeme {
            "record" => Some(ContextualKeyword::Record),
            "var" => Some(ContextualKeyword::Var),
            "yield" => Some(ContextualKeyword::Yield),
            "sealed" => Some(ContextualKeyword::Sealed),
            "permits" => Some(ContextualKeyword::Permits),
            "when" => Some(ContextualKeyword::When),
            _ => None,
        }
    }

    pub fn feature(self) -> Feature {
        match self {
            ContextualKeyword::Record => Feature::Records,
            ContextualKeyword::Var => Feature::VarLocalInference,
            ContextualKeyword::Yield => Feature::SwitchExpressions,
            ContextualKeyword::Sealed | ContextualKeyword::Permits => Feature::SealedTypes,
            ContextualKeyword::When => Feature::SwitchPatterns,
        }
    }
}

impl Token {
    pub fn is_keyword(&self) -> bool {
        use Token::*;
        matches!(
            self,
            Package | Import | Static | Public | Protected | Private | Abstract | Final | Native
                | Synchronized | Transient | Volatile | Strictfp | Class | Interface | Enum | Extends
                | Implements | New | This | Super | InstanceOf | Void | Boolean | Byte | Short | Int
                | Long | Char | Float | Double | If | Else | For | While | Do | Switch | Case | Default
                | Assert | Break | Continue | Return | Throw | Throws | Try | Catch | Finally | Const
                | Goto | True | False | Null | Underscore
        )
    }

    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            Token::Public
                | Token::Protected
                | Token::Private
                | Token::Abstract
                | Token::Final
                | Token::Native
                | Token::Synchronized
                | Token::Transient
                | Token::Volatile
                | Token::Static
                | Token::Strictfp
        )
    }

    /// Primitive type keywords, `void` excluded
    pub fn is_primitive_type(&self) -> bool {
        matches!(
            self,
            Token::Boolean | Token::Byte | Token::Short | Token::Int | Token::Long | Token::Char | Token::Float | Token::Double
        )
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Token::StringLiteral(_)
                | Token::TextBlock(_)
                | Token::CharLiteral(_)
                | Token::IntLiteral
                | Token::LongLiteral
                | Token::FloatLiteral
                | Token::True
                | Token::False
                | Token::Null
        )
    }

    pub fn is_operator(&self) -> bool {
        use Token::*;
        matches!(
            self,
            Assign | AddAssign | SubAssign | MulAssign | DivAssign | ModAssign | AndAssign | OrAssign
                | XorAssign | LShiftAssign | RShiftAssign | URShiftAssign | Plus | Minus | Star | Slash
                | Percent | Inc | Dec | Bang | Tilde | Amp | Pipe | Caret | LShift | RShift | URShift
                | AndAnd | PipePipe | Eq | Ne | Lt | Le | Gt | Ge | Question | Colon | DoubleColon | Arrow
        )
    }

    pub fn is_assignment_operator(&self) -> bool {
        use Token::*;
        matches!(
            self,
            Assign | AddAssign | SubAssign | MulAssign | DivAssign | ModAssign | AndAssign | OrAssign
                | XorAssign | LShiftAssign | RShiftAssign | URShiftAssign
        )
    }

    pub fn is_trivia(&self) -> bool {
        matches!(self, Token::Whitespace | Token::LineComment | Token::BlockComment(_) | Token::Bom)
    }

    /// Spelling used in "X expected" style messages
    pub fn describe(&self) -> &'static str {
        use Token::*;
        match self {
            Identifier => "Identifier",
            IntLiteral | LongLiteral | FloatLiteral | StringLiteral(_) | TextBlock(_) | CharLiteral(_) => "Literal",
            Semicolon => ";",
            Comma => ",",
            Dot => ".",
            LParen => "(",
            RParen => ")",
            LBrace => "{",
            RBrace => "}",
            LBracket => "[",
            RBracket => "]",
            Lt => "<",
            Gt => ">",
            Colon => ":",
            Arrow => "->",
            Assign => "=",
            Question => "?",
            At => "@",
            Ellipsis => "...",
            DoubleColon => "::",
            While => "while",
            Class => "class",
            Interface => "interface",
            Enum => "enum",
            Case => "case",
            Default => "default",
            Eof => "EOF",
            _ => "token",
        }
    }
}

/// Lexical token with its source span
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalToken {
    pub token: Token,
    pub lexeme: String,
    pub span: Span,
}

impl LexicalToken {
    pub fn new(token: Token, lexeme: impl Into<String>, span: Span) -> Self {
        Self { token, lexeme: lexeme.into(), span }
    }

    pub fn token_type(&self) -> &Token {
        &self.token
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn location(&self) -> Location {
        self.span.start
    }

    /// Check if this token matches the given token type, ignoring payloads
    pub fn is(&self, token_type: &Token) -> bool {
        std::mem::discriminant(&self.token) == std::mem::discriminant(token_type)
    }

    pub fn kind(&self) -> TokenKind {
        match self.token {
            Token::Identifier => TokenKind::Identifier,
            Token::Invalid => TokenKind::Invalid,
            t if t.is_literal() => TokenKind::Literal,
            t if t.is_keyword() => TokenKind::Keyword,
            t if t.is_operator() => TokenKind::Operator,
            _ => TokenKind::Punctuation,
        }
    }

    /// Contextual keyword this identifier spells, when the level recognises it
    pub fn contextual_keyword(&self, level: LanguageLevel) -> Option<ContextualKeyword> {
        if self.token != Token::Identifier {
            return None;
        }
        ContextualKeyword::from_lexeme(&self.lexeme).filter(|k| level.allows(k.feature()))
    }

    /// True when this identifier spells `word` regardless of level
    pub fn is_word(&self, word: &str) -> bool {
        self.token == Token::Identifier && self.lexeme == word
    }
}

/// Lazy Java tokenizer tracking line/column positions
pub struct Lexer<'a> {
    lexer: logos::Lexer<'a, Token>,
    level: LanguageLevel,
    cursor: Location,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, level: LanguageLevel) -> Self {
        Self {
            lexer: Token::lexer(source),
            level,
            cursor: Location::start(),
            diagnostics: Vec::new(),
        }
    }

    /// Next token including whitespace and comments
    pub fn next_raw(&mut self) -> Option<LexicalToken> {
        let result = self.lexer.next()?;
        let range = self.lexer.span();
        let source = self.lexer.source();
        self.advance_to(range.start);
        let start = self.cursor;
        self.advance_to(range.end);
        let span = Span::new(start, self.cursor);
        let lexeme = source.get(range.clone()).unwrap_or("");

        let token = match result {
            Ok(token) => self.adjust_for_level(token),
            Err(()) => Token::Invalid,
        };
        self.report_unclosed(token, span);
        Some(LexicalToken::new(token, lexeme, span))
    }

    /// Keywords that the configured level does not know yet lex as identifiers
    fn adjust_for_level(&self, token: Token) -> Token {
        match token {
            Token::Assert if !self.level.allows(Feature::AssertKeyword) => Token::Identifier,
            Token::Enum if !self.level.allows(Feature::Enums) => Token::Identifier,
            Token::Underscore if !self.level.allows(Feature::UnderscoreKeyword) => Token::Identifier,
            other => other,
        }
    }

    fn report_unclosed(&mut self, token: Token, span: Span) {
        let message = match token {
            Token::StringLiteral(Delimited::Unclosed) => "String literal is not properly closed by a double-quote",
            Token::TextBlock(Delimited::Unclosed) => "Text block is not properly closed with the delimiter",
            Token::CharLiteral(Delimited::Unclosed) => "Invalid character constant",
            Token::BlockComment(Delimited::Unclosed) => "Unexpected end of comment",
            _ => return,
        };
        log::trace!("unterminated token at {}", span.start);
        self.diagnostics
            .push(Diagnostic::error(Category::UnterminatedLiteral, message, span));
    }

    fn advance_to(&mut self, offset: usize) {
        if offset <= self.cursor.offset {
            return;
        }
        let source = self.lexer.source();
        if let Some(text) = source.get(self.cursor.offset..offset) {
            self.cursor.advance_str(text);
        }
    }

    /// Diagnostics produced so far
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Collect every significant token, ending with `Token::Eof`
    pub fn tokenize(mut self) -> (Vec<LexicalToken>, Vec<Diagnostic>) {
        let mut tokens: Vec<LexicalToken> = self.by_ref().collect();
        let source_len = self.lexer.source().len();
        self.advance_to(source_len);
        tokens.push(LexicalToken::new(Token::Eof, "", Span::single(self.cursor)));
        (tokens, self.diagnostics)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = LexicalToken;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let token = self.next_raw()?;
            if !token.token.is_trivia() {
                return Some(token);
            }
        }
    }
}

/// Tokenize a whole source text
pub fn tokenize(source: &str, level: LanguageLevel) -> (Vec<LexicalToken>, Vec<Diagnostic>) {
    Lexer::new(source, level).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        let (tokens, _) = tokenize(source, LanguageLevel::LATEST);
        tokens.into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_lexer_keywords() {
        let toks = kinds("public class Test extends Object implements Interface");
        assert_eq!(
            toks,
            vec![
                Token::Public,
                Token::Class,
                Token::Identifier,
                Token::Extends,
                Token::Identifier,
                Token::Implements,
                Token::Identifier,
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_lexer_literals() {
        let toks = kinds(r#"42 42L 0x1F 1.5 2e3 3f "hello" 'a' true null"#);
        assert_eq!(
            toks,
            vec![
                Token::IntLiteral,
                Token::LongLiteral,
                Token::IntLiteral,
                Token::FloatLiteral,
                Token::FloatLiteral,
                Token::FloatLiteral,
                Token::StringLiteral(Delimited::Closed),
                Token::CharLiteral(Delimited::Closed),
                Token::True,
                Token::Null,
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_lexer_comments_are_skipped() {
        assert_eq!(kinds("// line\n/* block */ /** doc */"), vec![Token::Eof]);
    }

    #[test]
    fn positions_are_one_based() {
        let (tokens, _) = tokenize("int x;\n  y = 1;", LanguageLevel::LATEST);
        let y = &tokens[3];
        assert_eq!(y.lexeme, "y");
        assert_eq!((y.span.start.line, y.span.start.column), (2, 3));
        assert_eq!(y.span.end.column, 4);
    }

    #[test]
    fn level_dependent_keywords() {
        assert_eq!(kinds_at("assert", LanguageLevel::V1_3), vec![Token::Identifier, Token::Eof]);
        assert_eq!(kinds_at("assert", LanguageLevel::V1_4), vec![Token::Assert, Token::Eof]);
        assert_eq!(kinds_at("enum", LanguageLevel::V1_4), vec![Token::Identifier, Token::Eof]);
        assert_eq!(kinds_at("_", LanguageLevel::V1_8), vec![Token::Identifier, Token::Eof]);
        assert_eq!(kinds_at("_", LanguageLevel::V9), vec![Token::Underscore, Token::Eof]);
        assert_eq!(kinds_at("_x __ x_", LanguageLevel::V9), vec![Token::Identifier, Token::Identifier, Token::Identifier, Token::Eof]);
    }

    fn kinds_at(source: &str, level: LanguageLevel) -> Vec<Token> {
        tokenize(source, level).0.into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn contextual_keywords_depend_on_level() {
        let (tokens, _) = tokenize("record", LanguageLevel::V16);
        assert_eq!(tokens[0].contextual_keyword(LanguageLevel::V16), Some(ContextualKeyword::Record));
        assert_eq!(tokens[0].contextual_keyword(LanguageLevel::V15), None);
    }

    #[test]
    fn unterminated_string_and_comment_are_reported() {
        let (tokens, diags) = tokenize("\"abc\nint x; /* never", LanguageLevel::LATEST);
        assert_eq!(tokens[0].token, Token::StringLiteral(Delimited::Unclosed));
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].message, "String literal is not properly closed by a double-quote");
        assert_eq!(diags[1].message, "Unexpected end of comment");
    }

    #[test]
    fn invalid_characters_become_invalid_tokens() {
        let toks = kinds("int # x");
        assert_eq!(toks[1], Token::Invalid);
    }

    #[test]
    fn malformed_char_literal() {
        let (_, diags) = tokenize("char c = 'ab';", LanguageLevel::LATEST);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Invalid character constant");
    }
}

//! Tokens and the tokenizer for Krm source text.

use logos::{Lexer, Logos};

use std::fmt;

use crate::error::SyntaxError;
use crate::parsing::Span;

/// Every terminal name a grammar production may reference. The selection
/// table builder validates production symbols against this list.
pub const TERMINALS: &[&'static str] = &[
    "node", "export", "var", "const", "fn", "while", "true", "false", "if", "else", "return",
    "struct", "int", "float", "bool", "char", "id", "integer", "float_lit", "char_lit", "string",
    "assign", "add", "sub", "mul", "div", "add_assign", "sub_assign", "mul_assign", "div_assign",
    "lparen", "rparen", "lbracket", "rbracket", "lbrace", "rbrace", "semicolon", "colon",
    "double_colon", "arrow", "dot", "comma", "eq", "neq", "less", "greater", "leq", "geq", "not",
    "and", "or", "bit_and", "bit_or",
];

/// Enumeration of all tokens of the Krm language.
///
/// `string`, `.`, `::`, `&` and `|` are recognized here but appear in no
/// production of the grammar; handing them to the parser produces a plain
/// syntax error.
#[derive(Logos, Debug, PartialEq, Clone)]
pub enum Token<'a> {
    /// Erroneous input that matches no other variant.
    #[error]
    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    #[regex(r"//[^\n]*", logos::skip)]
    Error,

    #[token("node")]
    Node,

    #[token("export")]
    Export,

    #[token("var")]
    Var,

    #[token("const")]
    Const,

    #[token("fn")]
    Fn,

    #[token("while")]
    While,

    #[token("true")]
    True,

    #[token("false")]
    False,

    #[token("if")]
    If,

    #[token("else")]
    Else,

    #[token("return")]
    Return,

    #[token("struct")]
    Struct,

    #[token("int")]
    Int,

    #[token("float")]
    FloatType,

    #[token("bool")]
    Bool,

    #[token("char")]
    Char,

    /// An identifier: a letter or underscore followed by letters, digits and
    /// underscores.
    #[regex("[A-Za-z_][A-Za-z0-9_]*", Lexer::slice)]
    Identifier(&'a str),

    /// An unsigned integer literal. Negative values are built with the
    /// unary minus operator.
    #[regex("[0-9]+", integer_callback)]
    Integer(i64),

    /// A float literal with digits on both sides of the point.
    #[regex(r"[0-9]+\.[0-9]+", float_callback)]
    Float(f64),

    /// A character literal. Exactly one character between single quotes;
    /// anything longer fails to lex.
    #[regex(r"'[^']'", char_callback)]
    Character(char),

    /// A string literal. Reserved by the lexer, unused by the grammar.
    #[regex(r#""[^"]*""#, string_callback)]
    Str(&'a str),

    #[token("=")]
    Assign,

    #[token("+")]
    Add,

    #[token("-")]
    Sub,

    #[token("*")]
    Mul,

    #[token("/")]
    Div,

    #[token("+=")]
    AddAssign,

    #[token("-=")]
    SubAssign,

    #[token("*=")]
    MulAssign,

    #[token("/=")]
    DivAssign,

    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[token("[")]
    LeftBracket,

    #[token("]")]
    RightBracket,

    #[token("{")]
    LeftBrace,

    #[token("}")]
    RightBrace,

    #[token(";")]
    Semicolon,

    #[token(":")]
    Colon,

    #[token("::")]
    DoubleColon,

    #[token("->")]
    Arrow,

    #[token(".")]
    Dot,

    #[token(",")]
    Comma,

    #[token("==")]
    Equals,

    #[token("!=")]
    NotEquals,

    #[token("<")]
    Less,

    #[token(">")]
    Greater,

    #[token("<=")]
    LessEqual,

    #[token(">=")]
    GreaterEqual,

    #[token("!")]
    Not,

    #[token("&&")]
    LogicalAnd,

    #[token("||")]
    LogicalOr,

    #[token("&")]
    BitwiseAnd,

    #[token("|")]
    BitwiseOr,
}

fn integer_callback<'a>(
    lex: &mut Lexer<'a, Token<'a>>,
) -> std::result::Result<i64, std::num::ParseIntError> {
    lex.slice().parse()
}

fn float_callback<'a>(
    lex: &mut Lexer<'a, Token<'a>>,
) -> std::result::Result<f64, std::num::ParseFloatError> {
    lex.slice().parse()
}

fn char_callback<'a>(lex: &mut Lexer<'a, Token<'a>>) -> std::result::Result<char, ()> {
    lex.slice().chars().nth(1).ok_or(())
}

fn string_callback<'a>(lex: &mut Lexer<'a, Token<'a>>) -> &'a str {
    let slice = lex.slice();
    &slice[1..slice.len() - 1]
}

impl<'a> Token<'a> {
    /// The terminal name this token matches in the grammar table.
    pub fn terminal(&self) -> &'static str {
        match self {
            Token::Error => "error",
            Token::Node => "node",
            Token::Export => "export",
            Token::Var => "var",
            Token::Const => "const",
            Token::Fn => "fn",
            Token::While => "while",
            Token::True => "true",
            Token::False => "false",
            Token::If => "if",
            Token::Else => "else",
            Token::Return => "return",
            Token::Struct => "struct",
            Token::Int => "int",
            Token::FloatType => "float",
            Token::Bool => "bool",
            Token::Char => "char",
            Token::Identifier(_) => "id",
            Token::Integer(_) => "integer",
            Token::Float(_) => "float_lit",
            Token::Character(_) => "char_lit",
            Token::Str(_) => "string",
            Token::Assign => "assign",
            Token::Add => "add",
            Token::Sub => "sub",
            Token::Mul => "mul",
            Token::Div => "div",
            Token::AddAssign => "add_assign",
            Token::SubAssign => "sub_assign",
            Token::MulAssign => "mul_assign",
            Token::DivAssign => "div_assign",
            Token::LeftParen => "lparen",
            Token::RightParen => "rparen",
            Token::LeftBracket => "lbracket",
            Token::RightBracket => "rbracket",
            Token::LeftBrace => "lbrace",
            Token::RightBrace => "rbrace",
            Token::Semicolon => "semicolon",
            Token::Colon => "colon",
            Token::DoubleColon => "double_colon",
            Token::Arrow => "arrow",
            Token::Dot => "dot",
            Token::Comma => "comma",
            Token::Equals => "eq",
            Token::NotEquals => "neq",
            Token::Less => "less",
            Token::Greater => "greater",
            Token::LessEqual => "leq",
            Token::GreaterEqual => "geq",
            Token::Not => "not",
            Token::LogicalAnd => "and",
            Token::LogicalOr => "or",
            Token::BitwiseAnd => "bit_and",
            Token::BitwiseOr => "bit_or",
        }
    }
}

impl<'a> fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Error => write!(f, "<error>"),
            Token::Identifier(name) => write!(f, "{}", name),
            Token::Integer(value) => write!(f, "{}", value),
            Token::Float(value) => write!(f, "{}", value),
            Token::Character(value) => write!(f, "'{}'", value),
            Token::Str(value) => write!(f, "\"{}\"", value),
            Token::Node => write!(f, "node"),
            Token::Export => write!(f, "export"),
            Token::Var => write!(f, "var"),
            Token::Const => write!(f, "const"),
            Token::Fn => write!(f, "fn"),
            Token::While => write!(f, "while"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::If => write!(f, "if"),
            Token::Else => write!(f, "else"),
            Token::Return => write!(f, "return"),
            Token::Struct => write!(f, "struct"),
            Token::Int => write!(f, "int"),
            Token::FloatType => write!(f, "float"),
            Token::Bool => write!(f, "bool"),
            Token::Char => write!(f, "char"),
            Token::Assign => write!(f, "="),
            Token::Add => write!(f, "+"),
            Token::Sub => write!(f, "-"),
            Token::Mul => write!(f, "*"),
            Token::Div => write!(f, "/"),
            Token::AddAssign => write!(f, "+="),
            Token::SubAssign => write!(f, "-="),
            Token::MulAssign => write!(f, "*="),
            Token::DivAssign => write!(f, "/="),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::Semicolon => write!(f, ";"),
            Token::Colon => write!(f, ":"),
            Token::DoubleColon => write!(f, "::"),
            Token::Arrow => write!(f, "->"),
            Token::Dot => write!(f, "."),
            Token::Comma => write!(f, ","),
            Token::Equals => write!(f, "=="),
            Token::NotEquals => write!(f, "!="),
            Token::Less => write!(f, "<"),
            Token::Greater => write!(f, ">"),
            Token::LessEqual => write!(f, "<="),
            Token::GreaterEqual => write!(f, ">="),
            Token::Not => write!(f, "!"),
            Token::LogicalAnd => write!(f, "&&"),
            Token::LogicalOr => write!(f, "||"),
            Token::BitwiseAnd => write!(f, "&"),
            Token::BitwiseOr => write!(f, "|"),
        }
    }
}

/// Runs the lexer over `source` and collects the token stream the parser
/// consumes. The first unrecognizable piece of input aborts with a lexical
/// [SyntaxError].
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>, SyntaxError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(token) = lexer.next() {
        if let Token::Error = token {
            return Err(SyntaxError::invalid_token(lexer.slice(), lexer.span()));
        }

        tokens.push((token, lexer.span()));
    }

    Ok(tokens)
}

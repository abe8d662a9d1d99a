//! The Krm language front end: lexer, table-driven parser and AST.

pub mod ast;
pub mod parser;
pub mod token;

pub use self::ast::Module;
pub use self::parser::{SyntaxNode, SyntaxTree};
pub use self::token::{tokenize, Token};

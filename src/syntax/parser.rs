//! The table-driven predictive parser.
//!
//! The engine owns no grammar knowledge of its own: it pops symbols off a
//! working stack and, for nonterminals, asks the selection table for the
//! unique production admitted by the current lookahead. There is exactly one
//! candidate per (nonterminal, lookahead) pair, so the parse never backtracks
//! and the first mismatch is the definitive syntax error.

use crate::error::SyntaxError;
use crate::grammar::{END, SELECTION, START_SYMBOL};
use crate::parsing::{Span, TokenStream};

use super::token::Token;

/// One applied production: the nonterminal it belongs to and its children in
/// grammar order. An epsilon production leaves the branch empty.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxTree<'a> {
    pub nonterminal: &'static str,
    pub children: Vec<SyntaxNode<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxNode<'a> {
    Leaf(Token<'a>, Span),
    Branch(SyntaxTree<'a>),
}

enum Entry {
    Terminal(&'static str),
    Rule(&'static str),
    Close,
    End,
}

impl<'a> SyntaxTree<'a> {
    /// Parses a token stream into a syntax tree, or fails with the first
    /// point of divergence from the grammar.
    pub fn parse(tokens: &[(Token<'a>, Span)]) -> Result<SyntaxTree<'a>, SyntaxError> {
        let table = &*SELECTION;

        let mut stream = TokenStream::new(tokens);
        let mut stack = vec![Entry::End, Entry::Rule(START_SYMBOL)];
        let mut build: Vec<SyntaxTree<'a>> = Vec::new();
        let mut root: Option<SyntaxTree<'a>> = None;

        while let Some(entry) = stack.pop() {
            match entry {
                Entry::Terminal(name) => match stream.peek() {
                    Some((token, span)) if token.terminal() == name => {
                        stream.advance();

                        match build.last_mut() {
                            Some(parent) => parent
                                .children
                                .push(SyntaxNode::Leaf(token.clone(), span.clone())),
                            None => unreachable!(),
                        }
                    }
                    Some((token, span)) => {
                        return Err(SyntaxError::unexpected(
                            vec![name],
                            token.to_string(),
                            span.clone(),
                        ));
                    }
                    None => {
                        return Err(SyntaxError::end_of_input(vec![name], stream.end_span()));
                    }
                },

                Entry::Rule(rule) => {
                    let lookahead = stream.peek().map(|(t, _)| t.terminal()).unwrap_or(END);

                    match table.production(rule, lookahead) {
                        Some(production) => {
                            build.push(SyntaxTree {
                                nonterminal: rule,
                                children: Vec::new(),
                            });
                            stack.push(Entry::Close);

                            // Reversed, so the leftmost symbol is processed
                            // next.
                            for &symbol in production.iter().rev() {
                                if table.is_nonterminal(symbol) {
                                    stack.push(Entry::Rule(symbol));
                                } else {
                                    stack.push(Entry::Terminal(symbol));
                                }
                            }
                        }
                        None => {
                            let expected = table.expected(rule);

                            return Err(match stream.peek() {
                                Some((token, span)) => SyntaxError::unexpected(
                                    expected,
                                    token.to_string(),
                                    span.clone(),
                                ),
                                None => SyntaxError::end_of_input(expected, stream.end_span()),
                            });
                        }
                    }
                }

                Entry::Close => {
                    let tree = match build.pop() {
                        Some(tree) => tree,
                        None => unreachable!(),
                    };

                    match build.last_mut() {
                        Some(parent) => parent.children.push(SyntaxNode::Branch(tree)),
                        None => root = Some(tree),
                    }
                }

                Entry::End => {
                    return match (root, stream.peek()) {
                        (Some(root), None) => Ok(root),
                        (_, Some((token, span))) => Err(SyntaxError::unexpected(
                            vec![END],
                            token.to_string(),
                            span.clone(),
                        )),
                        (None, None) => unreachable!(),
                    };
                }
            }
        }

        unreachable!()
    }

    /// The consumed tokens in source order. A successful parse reproduces
    /// the input token sequence here exactly.
    pub fn leaves(&self) -> Vec<&Token<'a>> {
        fn collect<'t, 'a>(tree: &'t SyntaxTree<'a>, out: &mut Vec<&'t Token<'a>>) {
            for child in &tree.children {
                match child {
                    SyntaxNode::Leaf(token, _) => out.push(token),
                    SyntaxNode::Branch(branch) => collect(branch, out),
                }
            }
        }

        let mut out = Vec::new();
        collect(self, &mut out);
        out
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn branch(&self, index: usize) -> &SyntaxTree<'a> {
        match &self.children[index] {
            SyntaxNode::Branch(tree) => tree,
            SyntaxNode::Leaf(..) => unreachable!(),
        }
    }

    pub(crate) fn leaf(&self, index: usize) -> &Token<'a> {
        match &self.children[index] {
            SyntaxNode::Leaf(token, _) => token,
            SyntaxNode::Branch(_) => unreachable!(),
        }
    }
}

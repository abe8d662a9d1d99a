//! The declarative grammar table for the Krm language and the LL(1)
//! selection table derived from it.
//!
//! The grammar is pure data: every nonterminal lists its production
//! alternatives (an empty alternative is the epsilon production) together
//! with its FIRST and FOLLOW sets. [SelectionTable::build] recomputes
//! nullability, FIRST and FOLLOW from the productions, rejects the table if
//! the declared sets disagree, and then checks that the selection sets of
//! every nonterminal's alternatives are pairwise disjoint. A violation of
//! any of these is a grammar-authoring defect and surfaces as a
//! [GrammarError] exactly once, at construction; parsing itself can never
//! hit one.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;

use crate::error::GrammarError;
use crate::syntax::token::TERMINALS;

/// Marker for the empty-string derivation inside FIRST sets.
pub const EPSILON: &'static str = "ε";

/// Marker for end-of-input inside FOLLOW sets and selection-table rows.
pub const END: &'static str = "$";

/// The start symbol of the Krm grammar.
pub const START_SYMBOL: &'static str = "Program";

/// An ordered sequence of symbol names. Nonterminals are capitalized,
/// terminals are lowercase; the empty sequence is the epsilon alternative.
pub type Production = &'static [&'static str];

/// One nonterminal of the grammar table.
pub struct Rule {
    pub name: &'static str,
    pub productions: &'static [Production],
    pub first: &'static [&'static str],
    pub follow: &'static [&'static str],
}

/// The Krm grammar.
///
/// A program is a sequence of node declarations. Nodes carry an optional
/// dependency list and a body of items: functions, structs and (optionally
/// exported) `var`/`const` bindings. Expressions use an epsilon-tail ladder
/// (`Expr` → `Conj` → `Rel` → `Sum` → `Term` → `Factor`) so that every
/// precedence level stays LL(1).
pub static GRAMMAR: &[Rule] = &[
    Rule {
        name: "Program",
        productions: &[&["NodeDecl", "Program"], &[]],
        first: &["node", EPSILON],
        follow: &[END],
    },
    Rule {
        name: "NodeDecl",
        productions: &[&["node", "id", "NodeDeps", "lbrace", "ItemSeq", "rbrace"]],
        first: &["node"],
        follow: &["node", END],
    },
    Rule {
        name: "NodeDeps",
        productions: &[&["colon", "id", "DepTail"], &[]],
        first: &["colon", EPSILON],
        follow: &["lbrace"],
    },
    Rule {
        name: "DepTail",
        productions: &[&["comma", "id", "DepTail"], &[]],
        first: &["comma", EPSILON],
        follow: &["lbrace"],
    },
    Rule {
        name: "ItemSeq",
        productions: &[&["Item", "ItemSeq"], &[]],
        first: &["fn", "struct", "export", "var", "const", EPSILON],
        follow: &["rbrace"],
    },
    Rule {
        name: "Item",
        productions: &[&["FnDecl"], &["StructDecl"], &["Decl"]],
        first: &["fn", "struct", "export", "var", "const"],
        follow: &["fn", "struct", "export", "var", "const", "rbrace"],
    },
    Rule {
        name: "FnDecl",
        productions: &[&[
            "fn", "id", "lparen", "Params", "rparen", "RetType", "lbrace", "StmtSeq", "rbrace",
        ]],
        first: &["fn"],
        follow: &["fn", "struct", "export", "var", "const", "rbrace"],
    },
    Rule {
        name: "Params",
        productions: &[&["Param", "ParamTail"], &[]],
        first: &["id", EPSILON],
        follow: &["rparen"],
    },
    Rule {
        name: "ParamTail",
        productions: &[&["comma", "Param", "ParamTail"], &[]],
        first: &["comma", EPSILON],
        follow: &["rparen"],
    },
    Rule {
        name: "Param",
        productions: &[&["id", "colon", "Type"]],
        first: &["id"],
        follow: &["comma", "rparen", "rbrace"],
    },
    Rule {
        name: "RetType",
        productions: &[&["arrow", "RetSpec"], &[]],
        first: &["arrow", EPSILON],
        follow: &["lbrace"],
    },
    Rule {
        name: "RetSpec",
        productions: &[&["Type"], &["not"]],
        first: &["int", "float", "bool", "char", "lbracket", "id", "not"],
        follow: &["lbrace"],
    },
    Rule {
        name: "StructDecl",
        productions: &[&["struct", "id", "lbrace", "Fields", "rbrace"]],
        first: &["struct"],
        follow: &["fn", "struct", "export", "var", "const", "rbrace"],
    },
    Rule {
        name: "Fields",
        productions: &[&["Param", "FieldTail"], &[]],
        first: &["id", EPSILON],
        follow: &["rbrace"],
    },
    Rule {
        name: "FieldTail",
        productions: &[&["comma", "Param", "FieldTail"], &[]],
        first: &["comma", EPSILON],
        follow: &["rbrace"],
    },
    Rule {
        name: "Decl",
        productions: &[&["Export", "Binding"]],
        first: &["export", "var", "const"],
        follow: &["fn", "struct", "export", "var", "const", "rbrace"],
    },
    Rule {
        name: "Export",
        productions: &[&["export"], &[]],
        first: &["export", EPSILON],
        follow: &["var", "const"],
    },
    Rule {
        name: "Binding",
        productions: &[
            &["var", "id", "colon", "Type", "assign", "Expr", "semicolon"],
            &["const", "id", "colon", "Type", "assign", "Expr", "semicolon"],
        ],
        first: &["var", "const"],
        follow: &[
            "fn", "struct", "export", "var", "const", "while", "if", "return", "id", "rbrace",
        ],
    },
    Rule {
        name: "StmtSeq",
        productions: &[&["Stmt", "StmtSeq"], &[]],
        first: &["var", "const", "while", "if", "return", "id", EPSILON],
        follow: &["rbrace"],
    },
    Rule {
        name: "Stmt",
        productions: &[
            &["Binding"],
            &["WhileStmt"],
            &["IfStmt"],
            &["ReturnStmt"],
            &["id", "StmtTail"],
        ],
        first: &["var", "const", "while", "if", "return", "id"],
        follow: &["var", "const", "while", "if", "return", "id", "rbrace"],
    },
    Rule {
        name: "StmtTail",
        productions: &[
            &["AssignOp", "Expr", "semicolon"],
            &["lparen", "Args", "rparen", "semicolon"],
            &["lbracket", "Expr", "rbracket", "assign", "Expr", "semicolon"],
        ],
        first: &[
            "assign", "add_assign", "sub_assign", "mul_assign", "div_assign", "lparen", "lbracket",
        ],
        follow: &["var", "const", "while", "if", "return", "id", "rbrace"],
    },
    Rule {
        name: "AssignOp",
        productions: &[
            &["assign"],
            &["add_assign"],
            &["sub_assign"],
            &["mul_assign"],
            &["div_assign"],
        ],
        first: &["assign", "add_assign", "sub_assign", "mul_assign", "div_assign"],
        follow: &[
            "lparen", "not", "sub", "integer", "float_lit", "char_lit", "true", "false", "id",
        ],
    },
    Rule {
        name: "WhileStmt",
        productions: &[&["while", "lparen", "Expr", "rparen", "lbrace", "StmtSeq", "rbrace"]],
        first: &["while"],
        follow: &["var", "const", "while", "if", "return", "id", "rbrace"],
    },
    Rule {
        name: "IfStmt",
        productions: &[&[
            "if", "lparen", "Expr", "rparen", "lbrace", "StmtSeq", "rbrace", "ElseClause",
        ]],
        first: &["if"],
        follow: &["var", "const", "while", "if", "return", "id", "rbrace"],
    },
    Rule {
        name: "ElseClause",
        productions: &[&["else", "lbrace", "StmtSeq", "rbrace"], &[]],
        first: &["else", EPSILON],
        follow: &["var", "const", "while", "if", "return", "id", "rbrace"],
    },
    Rule {
        name: "ReturnStmt",
        productions: &[&["return", "RetValue"]],
        first: &["return"],
        follow: &["var", "const", "while", "if", "return", "id", "rbrace"],
    },
    Rule {
        name: "RetValue",
        productions: &[&["semicolon"], &["Expr", "semicolon"]],
        first: &[
            "semicolon", "lparen", "not", "sub", "integer", "float_lit", "char_lit", "true",
            "false", "id",
        ],
        follow: &["var", "const", "while", "if", "return", "id", "rbrace"],
    },
    Rule {
        name: "Expr",
        productions: &[&["Conj", "ExprTail"]],
        first: &[
            "lparen", "not", "sub", "integer", "float_lit", "char_lit", "true", "false", "id",
        ],
        follow: &["rparen", "semicolon", "rbracket", "comma"],
    },
    Rule {
        name: "ExprTail",
        productions: &[&["or", "Conj", "ExprTail"], &[]],
        first: &["or", EPSILON],
        follow: &["rparen", "semicolon", "rbracket", "comma"],
    },
    Rule {
        name: "Conj",
        productions: &[&["Rel", "ConjTail"]],
        first: &[
            "lparen", "not", "sub", "integer", "float_lit", "char_lit", "true", "false", "id",
        ],
        follow: &["or", "rparen", "semicolon", "rbracket", "comma"],
    },
    Rule {
        name: "ConjTail",
        productions: &[&["and", "Rel", "ConjTail"], &[]],
        first: &["and", EPSILON],
        follow: &["or", "rparen", "semicolon", "rbracket", "comma"],
    },
    Rule {
        name: "Rel",
        productions: &[&["Sum", "RelTail"]],
        first: &[
            "lparen", "not", "sub", "integer", "float_lit", "char_lit", "true", "false", "id",
        ],
        follow: &["and", "or", "rparen", "semicolon", "rbracket", "comma"],
    },
    Rule {
        name: "RelTail",
        productions: &[&["RelOp", "Sum"], &[]],
        first: &["eq", "neq", "less", "greater", "leq", "geq", EPSILON],
        follow: &["and", "or", "rparen", "semicolon", "rbracket", "comma"],
    },
    Rule {
        name: "RelOp",
        productions: &[&["eq"], &["neq"], &["less"], &["greater"], &["leq"], &["geq"]],
        first: &["eq", "neq", "less", "greater", "leq", "geq"],
        follow: &[
            "lparen", "not", "sub", "integer", "float_lit", "char_lit", "true", "false", "id",
        ],
    },
    Rule {
        name: "Sum",
        productions: &[&["Term", "SumTail"]],
        first: &[
            "lparen", "not", "sub", "integer", "float_lit", "char_lit", "true", "false", "id",
        ],
        follow: &[
            "eq", "neq", "less", "greater", "leq", "geq", "and", "or", "rparen", "semicolon",
            "rbracket", "comma",
        ],
    },
    Rule {
        name: "SumTail",
        productions: &[&["add", "Term", "SumTail"], &["sub", "Term", "SumTail"], &[]],
        first: &["add", "sub", EPSILON],
        follow: &[
            "eq", "neq", "less", "greater", "leq", "geq", "and", "or", "rparen", "semicolon",
            "rbracket", "comma",
        ],
    },
    Rule {
        name: "Term",
        productions: &[&["Factor", "TermTail"]],
        first: &[
            "lparen", "not", "sub", "integer", "float_lit", "char_lit", "true", "false", "id",
        ],
        follow: &[
            "add", "sub", "eq", "neq", "less", "greater", "leq", "geq", "and", "or", "rparen",
            "semicolon", "rbracket", "comma",
        ],
    },
    Rule {
        name: "TermTail",
        productions: &[
            &["mul", "Factor", "TermTail"],
            &["div", "Factor", "TermTail"],
            &[],
        ],
        first: &["mul", "div", EPSILON],
        follow: &[
            "add", "sub", "eq", "neq", "less", "greater", "leq", "geq", "and", "or", "rparen",
            "semicolon", "rbracket", "comma",
        ],
    },
    Rule {
        name: "Factor",
        productions: &[
            &["lparen", "Expr", "rparen"],
            &["not", "Factor"],
            &["sub", "Factor"],
            &["Literal"],
            &["id", "FactorTail"],
        ],
        first: &[
            "lparen", "not", "sub", "integer", "float_lit", "char_lit", "true", "false", "id",
        ],
        follow: &[
            "mul", "div", "add", "sub", "eq", "neq", "less", "greater", "leq", "geq", "and", "or",
            "rparen", "semicolon", "rbracket", "comma",
        ],
    },
    Rule {
        name: "FactorTail",
        productions: &[
            &["lparen", "Args", "rparen"],
            &["lbracket", "Expr", "rbracket"],
            &[],
        ],
        first: &["lparen", "lbracket", EPSILON],
        follow: &[
            "mul", "div", "add", "sub", "eq", "neq", "less", "greater", "leq", "geq", "and", "or",
            "rparen", "semicolon", "rbracket", "comma",
        ],
    },
    Rule {
        name: "Literal",
        productions: &[&["integer"], &["float_lit"], &["char_lit"], &["true"], &["false"]],
        first: &["integer", "float_lit", "char_lit", "true", "false"],
        follow: &[
            "mul", "div", "add", "sub", "eq", "neq", "less", "greater", "leq", "geq", "and", "or",
            "rparen", "semicolon", "rbracket", "comma",
        ],
    },
    Rule {
        name: "Args",
        productions: &[&["Expr", "ArgTail"], &[]],
        first: &[
            "lparen", "not", "sub", "integer", "float_lit", "char_lit", "true", "false", "id",
            EPSILON,
        ],
        follow: &["rparen"],
    },
    Rule {
        name: "ArgTail",
        productions: &[&["comma", "Expr", "ArgTail"], &[]],
        first: &["comma", EPSILON],
        follow: &["rparen"],
    },
    Rule {
        name: "Type",
        productions: &[
            &["int"],
            &["float"],
            &["bool"],
            &["char"],
            &["lbracket", "Type", "semicolon", "integer", "rbracket"],
            &["id"],
        ],
        first: &["int", "float", "bool", "char", "lbracket", "id"],
        follow: &["comma", "rparen", "rbrace", "lbrace", "assign", "semicolon"],
    },
];

lazy_static! {
    /// The selection table shared by every parse. Building it validates the
    /// grammar; a defective table is a configuration error, not a parse
    /// error, so it aborts here.
    pub static ref SELECTION: SelectionTable =
        SelectionTable::build(GRAMMAR).expect("grammar table is not LL(1)");
}

/// The flat `(nonterminal, lookahead terminal) → production` map driving
/// predictive parsing. Built once, read-only afterwards.
pub struct SelectionTable {
    entries: HashMap<(&'static str, &'static str), Production>,
    rows: HashMap<&'static str, Vec<&'static str>>,
    nonterminals: HashSet<&'static str>,
}

impl SelectionTable {
    /// Validates `rules` and derives the selection table.
    pub fn build(rules: &'static [Rule]) -> Result<SelectionTable, GrammarError> {
        let mut by_name: HashMap<&'static str, &'static Rule> = HashMap::new();

        for rule in rules {
            if by_name.insert(rule.name, rule).is_some() {
                return Err(GrammarError::DuplicateRule {
                    nonterminal: rule.name,
                });
            }
        }

        let nonterminals: HashSet<&'static str> = by_name.keys().copied().collect();
        let terminals: HashSet<&'static str> = TERMINALS.iter().copied().collect();

        for rule in rules {
            for production in rule.productions {
                for symbol in *production {
                    if !nonterminals.contains(symbol) && !terminals.contains(symbol) {
                        return Err(GrammarError::UnknownSymbol {
                            nonterminal: rule.name,
                            symbol,
                        });
                    }
                }
            }
        }

        let first = compute_first(rules, &nonterminals);

        for rule in rules {
            check_declared_set(rule.name, rule.first, &first[rule.name], true)?;
        }

        let follow = compute_follow(rules, &nonterminals, &first);

        for rule in rules {
            check_declared_set(rule.name, rule.follow, &follow[rule.name], false)?;
        }

        let mut entries = HashMap::new();
        let mut rows: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
        let mut chosen: HashMap<(&'static str, &'static str), usize> = HashMap::new();

        for rule in rules {
            for (index, production) in rule.productions.iter().enumerate() {
                let (mut selection, nullable) =
                    first_of_sequence(production, &nonterminals, &first);

                if nullable {
                    selection.extend(follow[rule.name].iter().copied());
                }

                for terminal in selection {
                    if let Some(&previous) = chosen.get(&(rule.name, terminal)) {
                        return Err(GrammarError::SelectionConflict {
                            nonterminal: rule.name,
                            terminal,
                            productions: (previous, index),
                        });
                    }

                    chosen.insert((rule.name, terminal), index);
                    entries.insert((rule.name, terminal), *production);
                    rows.entry(rule.name).or_default().push(terminal);
                }
            }
        }

        for row in rows.values_mut() {
            row.sort_unstable();
        }

        Ok(SelectionTable {
            entries,
            rows,
            nonterminals,
        })
    }

    /// Looks up the unique production for `nonterminal` under `lookahead`.
    /// `None` is a syntax error at the call site.
    pub fn production(
        &self,
        nonterminal: &'static str,
        lookahead: &str,
    ) -> Option<Production> {
        self.entries.get(&(nonterminal, lookahead)).copied()
    }

    /// Every terminal that selects some production of `nonterminal`: the
    /// table row, used for "expected one of {…}" diagnostics.
    pub fn expected(&self, nonterminal: &'static str) -> Vec<&'static str> {
        self.rows.get(nonterminal).cloned().unwrap_or_default()
    }

    pub fn is_nonterminal(&self, symbol: &str) -> bool {
        self.nonterminals.contains(symbol)
    }
}

/// FIRST of a symbol sequence under the already-computed per-nonterminal
/// FIRST sets. The boolean is true when the whole sequence can derive the
/// empty string.
fn first_of_sequence(
    sequence: &[&'static str],
    nonterminals: &HashSet<&'static str>,
    first: &HashMap<&'static str, HashSet<&'static str>>,
) -> (HashSet<&'static str>, bool) {
    let mut out = HashSet::new();

    for symbol in sequence {
        if !nonterminals.contains(symbol) {
            out.insert(*symbol);
            return (out, false);
        }

        let symbol_first = &first[symbol];
        out.extend(symbol_first.iter().copied().filter(|s| *s != EPSILON));

        if !symbol_first.contains(EPSILON) {
            return (out, false);
        }
    }

    (out, true)
}

fn compute_first(
    rules: &'static [Rule],
    nonterminals: &HashSet<&'static str>,
) -> HashMap<&'static str, HashSet<&'static str>> {
    let mut first: HashMap<&'static str, HashSet<&'static str>> =
        rules.iter().map(|r| (r.name, HashSet::new())).collect();

    loop {
        let mut changed = false;

        for rule in rules {
            for production in rule.productions {
                let (addition, nullable) = first_of_sequence(production, nonterminals, &first);

                let set = first.get_mut(rule.name).unwrap();
                let before = set.len();
                set.extend(addition);

                if nullable {
                    set.insert(EPSILON);
                }

                changed |= set.len() != before;
            }
        }

        if !changed {
            return first;
        }
    }
}

fn compute_follow(
    rules: &'static [Rule],
    nonterminals: &HashSet<&'static str>,
    first: &HashMap<&'static str, HashSet<&'static str>>,
) -> HashMap<&'static str, HashSet<&'static str>> {
    let mut follow: HashMap<&'static str, HashSet<&'static str>> =
        rules.iter().map(|r| (r.name, HashSet::new())).collect();

    follow.get_mut(START_SYMBOL).unwrap().insert(END);

    loop {
        let mut changed = false;

        for rule in rules {
            for production in rule.productions {
                for (i, symbol) in production.iter().enumerate() {
                    if !nonterminals.contains(symbol) {
                        continue;
                    }

                    let (rest_first, rest_nullable) =
                        first_of_sequence(&production[i + 1..], nonterminals, first);

                    let mut addition: HashSet<&'static str> = rest_first;

                    if rest_nullable {
                        addition.extend(follow[rule.name].iter().copied());
                    }

                    let set = follow.get_mut(symbol).unwrap();
                    let before = set.len();
                    set.extend(addition);
                    changed |= set.len() != before;
                }
            }
        }

        if !changed {
            return follow;
        }
    }
}

fn check_declared_set(
    nonterminal: &'static str,
    declared: &'static [&'static str],
    computed: &HashSet<&'static str>,
    is_first: bool,
) -> Result<(), GrammarError> {
    let declared_set: HashSet<&'static str> = declared.iter().copied().collect();

    if declared_set == *computed {
        return Ok(());
    }

    let mut declared: Vec<&'static str> = declared_set.into_iter().collect();
    let mut computed: Vec<&'static str> = computed.iter().copied().collect();
    declared.sort_unstable();
    computed.sort_unstable();

    if is_first {
        Err(GrammarError::FirstMismatch {
            nonterminal,
            declared,
            computed,
        })
    } else {
        Err(GrammarError::FollowMismatch {
            nonterminal,
            declared,
            computed,
        })
    }
}

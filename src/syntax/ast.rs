//! The abstract syntax tree and the lowering from the raw syntax tree.
//!
//! Lowering erases punctuation and the epsilon-tail scaffolding the LL(1)
//! grammar needs, leaving only semantically meaningful constructs. Every
//! node exclusively owns its children.

use crate::error::SyntaxError;

use super::parser::{SyntaxNode, SyntaxTree};
use super::token::{tokenize, Token};

/// A parsed program: the ordered sequence of node declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub nodes: Vec<NodeDecl>,
}

/// A `node` declaration with its dependency list and body.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDecl {
    pub name: String,
    pub dependencies: Vec<String>,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Function(Function),
    Struct(StructDecl),
    Binding(Binding),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: ReturnType,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Type,
}

/// A function's annotated result. `-> !` marks a function that never
/// returns to its caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnType {
    Value(Type),
    Void,
    Never,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name: String,
    pub fields: Vec<Param>,
}

/// A `var` or `const` definition. `exported` state is visible to dependent
/// nodes; only node-level bindings can carry it.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub exported: bool,
    pub mutable: bool,
    pub name: String,
    pub ty: Type,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Binding(Binding),
    Assign {
        target: String,
        op: AssignOp,
        value: Expr,
    },
    IndexAssign {
        target: String,
        index: Expr,
        value: Expr,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    If {
        condition: Expr,
        then_body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
    },
    Return(Option<Expr>),
    Call {
        callee: String,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssignOp {
    Set,
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Variable(String),
    Index {
        base: String,
        index: Box<Expr>,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Neq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Int,
    Float,
    Bool,
    Char,
    Array(Box<Type>, usize),
    Named(String),
}

impl Module {
    /// Tokenizes and parses `source` and lowers the result.
    pub fn parse(source: &str) -> Result<Module, SyntaxError> {
        let tokens = tokenize(source)?;
        let tree = SyntaxTree::parse(&tokens)?;

        Ok(Module::from_tree(&tree))
    }

    /// Lowers an already-parsed syntax tree.
    pub fn from_tree(tree: &SyntaxTree) -> Module {
        let mut nodes = Vec::new();
        let mut current = tree;

        while !current.is_empty() {
            nodes.push(lower_node(current.branch(0)));
            current = current.branch(1);
        }

        Module { nodes }
    }
}

fn ident(token: &Token) -> String {
    match token {
        Token::Identifier(name) => (*name).to_string(),
        _ => unreachable!(),
    }
}

fn integer(token: &Token) -> i64 {
    match token {
        Token::Integer(value) => *value,
        _ => unreachable!(),
    }
}

fn lower_node(tree: &SyntaxTree) -> NodeDecl {
    let name = ident(tree.leaf(1));

    let mut dependencies = Vec::new();
    let deps = tree.branch(2);

    if !deps.is_empty() {
        dependencies.push(ident(deps.leaf(1)));

        let mut tail = deps.branch(2);
        while !tail.is_empty() {
            dependencies.push(ident(tail.leaf(1)));
            tail = tail.branch(2);
        }
    }

    let mut items = Vec::new();
    let mut seq = tree.branch(4);

    while !seq.is_empty() {
        items.push(lower_item(seq.branch(0)));
        seq = seq.branch(1);
    }

    NodeDecl {
        name,
        dependencies,
        items,
    }
}

fn lower_item(tree: &SyntaxTree) -> Item {
    let inner = tree.branch(0);

    match inner.nonterminal {
        "FnDecl" => Item::Function(lower_function(inner)),
        "StructDecl" => Item::Struct(lower_struct(inner)),
        "Decl" => {
            let exported = !inner.branch(0).is_empty();
            Item::Binding(lower_binding(inner.branch(1), exported))
        }
        _ => unreachable!(),
    }
}

fn lower_function(tree: &SyntaxTree) -> Function {
    Function {
        name: ident(tree.leaf(1)),
        params: lower_params(tree.branch(3)),
        return_type: lower_return_type(tree.branch(5)),
        body: lower_stmt_seq(tree.branch(7)),
    }
}

fn lower_params(tree: &SyntaxTree) -> Vec<Param> {
    let mut params = Vec::new();

    if tree.is_empty() {
        return params;
    }

    params.push(lower_param(tree.branch(0)));

    let mut tail = tree.branch(1);
    while !tail.is_empty() {
        params.push(lower_param(tail.branch(1)));
        tail = tail.branch(2);
    }

    params
}

fn lower_param(tree: &SyntaxTree) -> Param {
    Param {
        name: ident(tree.leaf(0)),
        ty: lower_type(tree.branch(2)),
    }
}

fn lower_return_type(tree: &SyntaxTree) -> ReturnType {
    if tree.is_empty() {
        return ReturnType::Void;
    }

    let spec = tree.branch(1);

    match &spec.children[0] {
        SyntaxNode::Leaf(Token::Not, _) => ReturnType::Never,
        SyntaxNode::Branch(ty) => ReturnType::Value(lower_type(ty)),
        _ => unreachable!(),
    }
}

fn lower_struct(tree: &SyntaxTree) -> StructDecl {
    let mut fields = Vec::new();
    let body = tree.branch(3);

    if !body.is_empty() {
        fields.push(lower_param(body.branch(0)));

        let mut tail = body.branch(1);
        while !tail.is_empty() {
            fields.push(lower_param(tail.branch(1)));
            tail = tail.branch(2);
        }
    }

    StructDecl {
        name: ident(tree.leaf(1)),
        fields,
    }
}

fn lower_binding(tree: &SyntaxTree, exported: bool) -> Binding {
    Binding {
        exported,
        mutable: matches!(tree.leaf(0), Token::Var),
        name: ident(tree.leaf(1)),
        ty: lower_type(tree.branch(3)),
        value: lower_expr(tree.branch(5)),
    }
}

fn lower_stmt_seq(tree: &SyntaxTree) -> Vec<Stmt> {
    let mut stmts = Vec::new();
    let mut current = tree;

    while !current.is_empty() {
        stmts.push(lower_stmt(current.branch(0)));
        current = current.branch(1);
    }

    stmts
}

fn lower_stmt(tree: &SyntaxTree) -> Stmt {
    match &tree.children[0] {
        SyntaxNode::Leaf(token, _) => lower_stmt_tail(ident(token), tree.branch(1)),
        SyntaxNode::Branch(inner) => match inner.nonterminal {
            "Binding" => Stmt::Binding(lower_binding(inner, false)),
            "WhileStmt" => Stmt::While {
                condition: lower_expr(inner.branch(2)),
                body: lower_stmt_seq(inner.branch(5)),
            },
            "IfStmt" => {
                let else_clause = inner.branch(7);

                Stmt::If {
                    condition: lower_expr(inner.branch(2)),
                    then_body: lower_stmt_seq(inner.branch(5)),
                    else_body: if else_clause.is_empty() {
                        None
                    } else {
                        Some(lower_stmt_seq(else_clause.branch(2)))
                    },
                }
            }
            "ReturnStmt" => {
                let value = inner.branch(1);

                match &value.children[0] {
                    SyntaxNode::Leaf(Token::Semicolon, _) => Stmt::Return(None),
                    SyntaxNode::Branch(expr) => Stmt::Return(Some(lower_expr(expr))),
                    _ => unreachable!(),
                }
            }
            _ => unreachable!(),
        },
    }
}

fn lower_stmt_tail(target: String, tree: &SyntaxTree) -> Stmt {
    match &tree.children[0] {
        SyntaxNode::Branch(op) => Stmt::Assign {
            target,
            op: lower_assign_op(op),
            value: lower_expr(tree.branch(1)),
        },
        SyntaxNode::Leaf(Token::LeftParen, _) => Stmt::Call {
            callee: target,
            args: lower_args(tree.branch(1)),
        },
        SyntaxNode::Leaf(Token::LeftBracket, _) => Stmt::IndexAssign {
            target,
            index: lower_expr(tree.branch(1)),
            value: lower_expr(tree.branch(4)),
        },
        _ => unreachable!(),
    }
}

fn lower_assign_op(tree: &SyntaxTree) -> AssignOp {
    match tree.leaf(0) {
        Token::Assign => AssignOp::Set,
        Token::AddAssign => AssignOp::Add,
        Token::SubAssign => AssignOp::Sub,
        Token::MulAssign => AssignOp::Mul,
        Token::DivAssign => AssignOp::Div,
        _ => unreachable!(),
    }
}

/// Folds one `X → Y Tail`, `Tail → op Y Tail | ε` level of the expression
/// ladder into left-associative binary nodes.
fn fold_binary<F>(tree: &SyntaxTree, lower_operand: F, op_for: fn(&Token) -> BinaryOp) -> Expr
where
    F: Fn(&SyntaxTree) -> Expr,
{
    let mut expr = lower_operand(tree.branch(0));
    let mut tail = tree.branch(1);

    while !tail.is_empty() {
        let op = op_for(tail.leaf(0));
        let rhs = lower_operand(tail.branch(1));

        expr = Expr::Binary {
            op,
            lhs: Box::new(expr),
            rhs: Box::new(rhs),
        };

        tail = tail.branch(2);
    }

    expr
}

fn lower_expr(tree: &SyntaxTree) -> Expr {
    fold_binary(tree, lower_conj, |_| BinaryOp::Or)
}

fn lower_conj(tree: &SyntaxTree) -> Expr {
    fold_binary(tree, lower_rel, |_| BinaryOp::And)
}

fn lower_rel(tree: &SyntaxTree) -> Expr {
    let lhs = lower_sum(tree.branch(0));
    let tail = tree.branch(1);

    if tail.is_empty() {
        return lhs;
    }

    let op = match tail.branch(0).leaf(0) {
        Token::Equals => BinaryOp::Eq,
        Token::NotEquals => BinaryOp::Neq,
        Token::Less => BinaryOp::Less,
        Token::Greater => BinaryOp::Greater,
        Token::LessEqual => BinaryOp::LessEq,
        Token::GreaterEqual => BinaryOp::GreaterEq,
        _ => unreachable!(),
    };

    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(lower_sum(tail.branch(1))),
    }
}

fn lower_sum(tree: &SyntaxTree) -> Expr {
    fold_binary(tree, lower_term, |token| match token {
        Token::Add => BinaryOp::Add,
        Token::Sub => BinaryOp::Sub,
        _ => unreachable!(),
    })
}

fn lower_term(tree: &SyntaxTree) -> Expr {
    fold_binary(tree, lower_factor, |token| match token {
        Token::Mul => BinaryOp::Mul,
        Token::Div => BinaryOp::Div,
        _ => unreachable!(),
    })
}

fn lower_factor(tree: &SyntaxTree) -> Expr {
    match &tree.children[0] {
        SyntaxNode::Leaf(Token::LeftParen, _) => lower_expr(tree.branch(1)),
        SyntaxNode::Leaf(Token::Not, _) => Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(lower_factor(tree.branch(1))),
        },
        SyntaxNode::Leaf(Token::Sub, _) => Expr::Unary {
            op: UnaryOp::Neg,
            operand: Box::new(lower_factor(tree.branch(1))),
        },
        SyntaxNode::Leaf(token, _) => {
            let base = ident(token);
            let tail = tree.branch(1);

            if tail.is_empty() {
                return Expr::Variable(base);
            }

            match tail.leaf(0) {
                Token::LeftParen => Expr::Call {
                    callee: base,
                    args: lower_args(tail.branch(1)),
                },
                Token::LeftBracket => Expr::Index {
                    base,
                    index: Box::new(lower_expr(tail.branch(1))),
                },
                _ => unreachable!(),
            }
        }
        SyntaxNode::Branch(literal) => Expr::Literal(lower_literal(literal)),
    }
}

fn lower_literal(tree: &SyntaxTree) -> Literal {
    match tree.leaf(0) {
        Token::Integer(value) => Literal::Int(*value),
        Token::Float(value) => Literal::Float(*value),
        Token::Character(value) => Literal::Char(*value),
        Token::True => Literal::Bool(true),
        Token::False => Literal::Bool(false),
        _ => unreachable!(),
    }
}

fn lower_args(tree: &SyntaxTree) -> Vec<Expr> {
    let mut args = Vec::new();

    if tree.is_empty() {
        return args;
    }

    args.push(lower_expr(tree.branch(0)));

    let mut tail = tree.branch(1);
    while !tail.is_empty() {
        args.push(lower_expr(tail.branch(1)));
        tail = tail.branch(2);
    }

    args
}

fn lower_type(tree: &SyntaxTree) -> Type {
    match &tree.children[0] {
        SyntaxNode::Leaf(Token::Int, _) => Type::Int,
        SyntaxNode::Leaf(Token::FloatType, _) => Type::Float,
        SyntaxNode::Leaf(Token::Bool, _) => Type::Bool,
        SyntaxNode::Leaf(Token::Char, _) => Type::Char,
        SyntaxNode::Leaf(Token::LeftBracket, _) => Type::Array(
            Box::new(lower_type(tree.branch(1))),
            integer(tree.leaf(3)) as usize,
        ),
        SyntaxNode::Leaf(token, _) => Type::Named(ident(token)),
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowers_a_node_with_dependencies_and_items() {
        let module = Module::parse(
            "node Sensor : Hub, Log {
                export var reading: float = 0.0;
                const ID: int = 7;

                fn poll(limit: int) -> bool {
                    return reading < 1.5;
                }
            }",
        )
        .unwrap();

        assert_eq!(module.nodes.len(), 1);

        let node = &module.nodes[0];
        assert_eq!(node.name, "Sensor");
        assert_eq!(node.dependencies, vec!["Hub", "Log"]);
        assert_eq!(node.items.len(), 3);

        match &node.items[0] {
            Item::Binding(b) => {
                assert!(b.exported);
                assert!(b.mutable);
                assert_eq!(b.ty, Type::Float);
            }
            other => panic!("expected a binding, got {:?}", other),
        }

        match &node.items[2] {
            Item::Function(f) => {
                assert_eq!(f.params.len(), 1);
                assert_eq!(f.return_type, ReturnType::Value(Type::Bool));
                assert_eq!(f.body.len(), 1);
            }
            other => panic!("expected a function, got {:?}", other),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let module = Module::parse("node A { var x: int = 1 + 2 * 3; }").unwrap();

        let value = match &module.nodes[0].items[0] {
            Item::Binding(b) => &b.value,
            other => panic!("expected a binding, got {:?}", other),
        };

        match value {
            Expr::Binary {
                op: BinaryOp::Add,
                rhs,
                ..
            } => match rhs.as_ref() {
                Expr::Binary {
                    op: BinaryOp::Mul, ..
                } => {}
                other => panic!("expected a product on the right, got {:?}", other),
            },
            other => panic!("expected a sum, got {:?}", other),
        }
    }

    #[test]
    fn chained_subtraction_folds_left() {
        let module = Module::parse("node A { var x: int = 10 - 4 - 3; }").unwrap();

        let value = match &module.nodes[0].items[0] {
            Item::Binding(b) => &b.value,
            other => panic!("expected a binding, got {:?}", other),
        };

        // (10 - 4) - 3
        match value {
            Expr::Binary {
                op: BinaryOp::Sub,
                lhs,
                rhs,
            } => {
                assert_eq!(rhs.as_ref(), &Expr::Literal(Literal::Int(3)));
                match lhs.as_ref() {
                    Expr::Binary {
                        op: BinaryOp::Sub, ..
                    } => {}
                    other => panic!("expected a nested difference, got {:?}", other),
                }
            }
            other => panic!("expected a difference, got {:?}", other),
        }
    }

    #[test]
    fn never_return_and_array_types_lower() {
        let module = Module::parse(
            "node A {
                fn spin(buf: [int; 4]) -> ! {
                    while (true) {
                        buf[0] = 1;
                    }
                }
            }",
        )
        .unwrap();

        let function = match &module.nodes[0].items[0] {
            Item::Function(f) => f,
            other => panic!("expected a function, got {:?}", other),
        };

        assert_eq!(function.return_type, ReturnType::Never);
        assert_eq!(
            function.params[0].ty,
            Type::Array(Box::new(Type::Int), 4)
        );

        match &function.body[0] {
            Stmt::While { body, .. } => match &body[0] {
                Stmt::IndexAssign { target, .. } => assert_eq!(target, "buf"),
                other => panic!("expected an index assignment, got {:?}", other),
            },
            other => panic!("expected a while loop, got {:?}", other),
        }
    }

    #[test]
    fn if_else_and_compound_assignment_lower() {
        let module = Module::parse(
            "node A {
                fn step(x: int) {
                    if (x < 3 && x != 0) {
                        x += 1;
                    } else {
                        report(x, true);
                    }
                }
            }",
        )
        .unwrap();

        let function = match &module.nodes[0].items[0] {
            Item::Function(f) => f,
            other => panic!("expected a function, got {:?}", other),
        };

        match &function.body[0] {
            Stmt::If {
                condition,
                then_body,
                else_body,
            } => {
                match condition {
                    Expr::Binary {
                        op: BinaryOp::And, ..
                    } => {}
                    other => panic!("expected a conjunction, got {:?}", other),
                }

                match &then_body[0] {
                    Stmt::Assign {
                        op: AssignOp::Add, ..
                    } => {}
                    other => panic!("expected a compound assignment, got {:?}", other),
                }

                let else_body = else_body.as_ref().unwrap();
                match &else_body[0] {
                    Stmt::Call { callee, args } => {
                        assert_eq!(callee, "report");
                        assert_eq!(args.len(), 2);
                    }
                    other => panic!("expected a call, got {:?}", other),
                }
            }
            other => panic!("expected an if statement, got {:?}", other),
        }
    }
}

use krm::error::SyntaxErrorKind;
use krm::syntax::ast::{Item, ReturnType, Type};
use krm::syntax::{tokenize, Module, SyntaxTree};

#[test]
fn test_hello_leaves_reconstruct_the_input() {
    let source = include_str!("hello.krm");

    let tokens = tokenize(source).expect("could not tokenize hello.krm");
    let tree = SyntaxTree::parse(&tokens).expect("could not parse hello.krm");

    let leaves: Vec<_> = tree.leaves().into_iter().cloned().collect();
    let input: Vec<_> = tokens.iter().map(|(token, _)| token.clone()).collect();

    assert_eq!(leaves, input);
}

#[test]
fn test_hello_module_shape() {
    let module = Module::parse(include_str!("hello.krm")).expect("could not parse hello.krm");

    assert_eq!(module.nodes.len(), 1);

    let node = &module.nodes[0];
    assert_eq!(node.name, "Main");
    assert!(node.dependencies.is_empty());
    assert_eq!(node.items.len(), 5);

    match &node.items[0] {
        Item::Binding(binding) => {
            assert!(!binding.mutable);
            assert!(!binding.exported);
            assert_eq!(binding.name, "LIMIT");
            assert_eq!(binding.ty, Type::Int);
        }
        other => panic!("expected the LIMIT binding, got {:?}", other),
    }

    match &node.items[1] {
        Item::Binding(binding) => {
            assert!(binding.mutable);
            assert!(binding.exported);
            assert_eq!(binding.name, "total");
        }
        other => panic!("expected the total binding, got {:?}", other),
    }

    match &node.items[2] {
        Item::Struct(decl) => {
            assert_eq!(decl.name, "Point");
            assert_eq!(decl.fields.len(), 2);
            assert_eq!(decl.fields[1].ty, Type::Float);
        }
        other => panic!("expected the Point struct, got {:?}", other),
    }

    match &node.items[3] {
        Item::Function(function) => {
            assert_eq!(function.name, "main");
            assert_eq!(function.return_type, ReturnType::Void);
            assert_eq!(function.body.len(), 3);
        }
        other => panic!("expected fn main, got {:?}", other),
    }
}

#[test]
fn test_nodes_dependencies_and_never_return() {
    let module = Module::parse(include_str!("nodes.krm")).expect("could not parse nodes.krm");

    let names: Vec<_> = module.nodes.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["Hub", "Sensor", "Display"]);

    assert!(module.nodes[0].dependencies.is_empty());
    assert_eq!(module.nodes[1].dependencies, vec!["Hub"]);
    assert_eq!(module.nodes[2].dependencies, vec!["Hub", "Sensor"]);

    match &module.nodes[0].items[1] {
        Item::Function(function) => {
            assert_eq!(function.name, "pump");
            assert_eq!(function.return_type, ReturnType::Never);
        }
        other => panic!("expected fn pump, got {:?}", other),
    }

    match &module.nodes[1].items[0] {
        Item::Binding(binding) => {
            assert_eq!(binding.ty, Type::Array(Box::new(Type::Float), 4));
        }
        other => panic!("expected the samples binding, got {:?}", other),
    }
}

#[test]
fn test_parse_is_idempotent() {
    let source = include_str!("nodes.krm");

    let first = Module::parse(source).expect("could not parse nodes.krm");
    let second = Module::parse(source).expect("could not parse nodes.krm");

    assert_eq!(first, second);

    let tokens = tokenize(source).unwrap();
    assert_eq!(
        SyntaxTree::parse(&tokens).unwrap(),
        SyntaxTree::parse(&tokens).unwrap(),
    );
}

#[test]
fn test_first_divergence_aborts_with_the_offending_token() {
    // `const` bindings need a value; the semicolon after the type diverges.
    let source = "node Broken {
        const A: int;
    }";

    let err = Module::parse(source).unwrap_err();

    match &err.kind {
        SyntaxErrorKind::UnexpectedToken { expected, found } => {
            assert_eq!(expected, &vec!["assign"]);
            assert_eq!(found, ";");
        }
        other => panic!("unexpected error kind: {:?}", other),
    }

    assert_eq!(&source[err.span.start..err.span.end], ";");
}

#[test]
fn test_expected_set_comes_from_the_selection_row() {
    // A statement cannot begin with `else`.
    let err = Module::parse("node A { fn f() { else } }").unwrap_err();

    let expected = match err.kind {
        SyntaxErrorKind::UnexpectedToken { expected, .. } => expected,
        other => panic!("unexpected error kind: {:?}", other),
    };

    for terminal in &["var", "const", "while", "if", "return", "id", "rbrace"] {
        assert!(
            expected.contains(terminal),
            "expected set {:?} is missing {}",
            expected,
            terminal
        );
    }
}

#[test]
fn test_reserved_tokens_lex_but_do_not_parse() {
    // `.` is a token of the language but no production accepts it.
    assert!(tokenize("node A { var x: int = a.b; }").is_ok());
    assert!(Module::parse("node A { var x: int = a.b; }").is_err());
}

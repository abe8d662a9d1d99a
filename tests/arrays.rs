use krm::{
    bytecode::Program,
    vm::{Machine, TestIo, Value, VmErrorKind},
};

fn filled_array_listing(tail: &str) -> Program {
    // decla &1 int 3; [9, 8, 7]; then `tail`.
    let listing = format!(
        "___krb___\n\
         ___code___\n\
         decla &1 int 3\n\
         pushi 0\n\
         pushi 9\n\
         storai &1\n\
         pushi 1\n\
         pushi 8\n\
         storai &1\n\
         pushi 2\n\
         pushi 7\n\
         storai &1\n\
         {}\
         ___end___\n",
        tail
    );

    Program::parse(&listing).unwrap()
}

#[test]
fn test_indexed_store_and_load() {
    let p = filled_array_listing("pushi 1\nloadai &1\nretval\n");

    let mut e = Machine::new(p, TestIo::new());
    e.run().unwrap();

    assert_eq!(e.return_value, Some(Value::Int(8)));
}

#[test]
fn test_out_of_bounds_index_is_fatal() {
    let p = filled_array_listing("pushi 5\nloadai &1\n");

    let mut e = Machine::new(p, TestIo::new());
    let err = e.run().unwrap_err();

    assert_eq!(err.kind, VmErrorKind::OutOfBounds);
    assert_eq!(err.pc, 11);
}

#[test]
fn test_negative_index_is_fatal() {
    let p = filled_array_listing("pushi -1\nloadai &1\n");

    let mut e = Machine::new(p, TestIo::new());
    let err = e.run().unwrap_err();

    assert_eq!(err.kind, VmErrorKind::OutOfBounds);
}

#[test]
fn test_whole_array_destruction() {
    let p = filled_array_listing("dstra &1\npushi 0\nloadai &1\n");

    let mut e = Machine::new(p, TestIo::new());
    let err = e.run().unwrap_err();

    assert_eq!(err.kind, VmErrorKind::UseAfterFree);
}

#[test]
fn test_element_kind_is_checked() {
    let p = filled_array_listing("pushi 0\nloadaf &1\n");

    let mut e = Machine::new(p, TestIo::new());
    let err = e.run().unwrap_err();

    assert_eq!(err.kind, VmErrorKind::TypeMismatch);
}

#[test]
fn test_unwritten_cells_cannot_be_read() {
    let p = Program::parse(
        "___krb___\n\
         ___code___\n\
         decla &0 bool 2\n\
         pushi 0\n\
         loadab &0\n\
         ___end___\n",
    )
    .unwrap();

    let mut e = Machine::new(p, TestIo::new());
    let err = e.run().unwrap_err();

    assert_eq!(err.kind, VmErrorKind::TypeMismatch);
}

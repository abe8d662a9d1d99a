use krm::{
    bytecode::Program,
    vm::{Machine, TestIo, Value},
};

#[test]
fn test_while_false_produces_no_output() {
    // while (false) { prnti 42 } as a code generator would lay it out:
    // the condition fails immediately and ifFalse skips the body.
    let p = Program::parse(
        "___krb___\n\
         ___code___\n\
         pushb 0\n\
         ifFalse 5\n\
         pushi 42\n\
         prnti\n\
         jump 0\n\
         ret\n\
         ___end___\n",
    )
    .unwrap();

    let mut io = TestIo::new();
    let mut e = Machine::new(p, &mut io);

    e.run().unwrap();

    assert!(e.halted);
    assert!(io.output().is_empty());
}

#[test]
fn test_countdown_loop() {
    // var x = 3; while (x > 0) { print x; x -= 1; }
    let p = Program::parse(
        "___krb___\n\
         ___code___\n\
         decli &0\n\
         pushi 3\n\
         stori &0\n\
         loadi &0\n\
         pushi 0\n\
         gti\n\
         ifFalse 14\n\
         loadi &0\n\
         prnti\n\
         loadi &0\n\
         pushi 1\n\
         subi\n\
         stori &0\n\
         jump 3\n\
         dstri &0\n\
         ret\n\
         ___end___\n",
    )
    .unwrap();

    let mut io = TestIo::new();
    let mut e = Machine::new(p, &mut io);

    while !e.halted {
        println!("{:?}", e.program.fetch(e.pc));
        e.step().unwrap();
    }

    assert_eq!(
        io.into_output(),
        vec![Value::Int(3), Value::Int(2), Value::Int(1)]
    );
}

#[test]
fn test_if_true_takes_the_jump() {
    // ifTrue picks between two retvals.
    let p = Program::parse(
        "___krb___\n\
         ___code___\n\
         pushb 1\n\
         ifTrue 4\n\
         pushi 0\n\
         retval\n\
         pushi 1\n\
         retval\n\
         ___end___\n",
    )
    .unwrap();

    let mut e = Machine::new(p, TestIo::new());
    e.run().unwrap();

    assert_eq!(e.return_value, Some(Value::Int(1)));
}

#[test]
fn test_eager_connectives_consume_both_operands() {
    // false && (1 / 0 == 1) at the bytecode level: the right operand was
    // already evaluated and pushed, `and` merely pops twice. Here both
    // operands are plain pushes; the point is that the stack ends empty.
    let p = Program::parse(
        "___krb___\n\
         ___code___\n\
         pushb 0\n\
         pushb 1\n\
         and\n\
         pushb 0\n\
         or\n\
         retval\n\
         ___end___\n",
    )
    .unwrap();

    let mut e = Machine::new(p, TestIo::new());
    e.run().unwrap();

    assert_eq!(e.return_value, Some(Value::Bool(false)));
    assert!(e.stack.is_empty());
}

#[test]
fn test_running_off_the_end_halts_implicitly() {
    let p = Program::parse(
        "___krb___\n\
         ___code___\n\
         pushi 1\n\
         pushi 2\n\
         addi\n\
         ___end___\n",
    )
    .unwrap();

    let mut e = Machine::new(p, TestIo::new());
    e.run().unwrap();

    assert!(e.halted);
    assert_eq!(e.return_value, None);
    assert_eq!(e.stack, vec![Value::Int(3)]);
}

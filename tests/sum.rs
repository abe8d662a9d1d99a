use krm::{
    bytecode::Program,
    vm::{Machine, TestIo, Value},
};

fn read_program() -> Program {
    let listing = include_str!("sum.krb");

    Program::parse(listing).unwrap()
}

#[test]
fn test_sum_read_program() {
    let p = read_program();

    assert_eq!(p.len(), 21);

    // The listing renders back to itself.
    assert_eq!(Program::parse(&p.to_string()).unwrap(), p);
}

#[test]
fn test_sum_emulate_program() {
    let p = read_program();

    let cases = vec![
        (vec![1, 2, 3, 4, 0], vec![1 + 2 + 3 + 4]),
        (vec![0], vec![0]),
        (vec![1, 10, 100, 1000, 10000, 0], vec![11111]),
    ];

    for (input, output) in cases {
        let mut io = TestIo::with_input(input.into_iter().map(Value::Int));

        let mut e = Machine::new(p.clone(), &mut io);

        while !e.halted {
            println!("{:?}", e.program.fetch(e.pc));
            e.step().unwrap();
            println!("stack: {:?}", e.stack);
        }

        assert_eq!(
            io.into_output(),
            output.into_iter().map(Value::Int).collect::<Vec<_>>()
        );
    }
}

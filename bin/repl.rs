use std::io::{self, BufRead, Write};

use clap::{App, Arg, ArgMatches};
use slog::{o, Drain, Logger};
use slog_term::{FullFormat, TermDecorator};

use krm::{
    bytecode::Program,
    vm::{Machine, StdIo},
};

fn parse_arguments() -> ArgMatches<'static> {
    App::new("krmrepl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Interactive Krm bytecode environment")
        .arg(
            Arg::with_name("trace")
                .long("trace")
                .help("Trace every dispatched instruction to the terminal"),
        )
        .get_matches()
}

fn terminal_logger() -> Logger {
    let decorator = TermDecorator::new().build();
    let drain = FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    Logger::root(drain, o!())
}

fn fresh_machine(trace: bool) -> Machine<StdIo> {
    let logger = if trace { Some(terminal_logger()) } else { None };

    Machine::with_logger(Program::default(), StdIo, logger)
}

fn print_help() {
    println!("Commands:");
    println!("  .stack    print the operand stack, top last");
    println!("  .memory   print the live memory slots");
    println!("  .program  print the program as a listing");
    println!("  .reset    discard the program and all state");
    println!("  .quit     leave the REPL");
    println!("Anything else is parsed as one instruction, appended and executed.");
}

fn main() {
    let args = parse_arguments();
    let trace = args.is_present("trace");

    let mut machine = fresh_machine(trace);

    println!("krm bytecode REPL; .help lists the commands");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{:>4}> ", machine.pc);

        if io::stdout().flush().is_err() {
            break;
        }

        let line = match lines.next() {
            Some(Ok(line)) => line,
            _ => break,
        };

        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('.') {
            match line {
                ".quit" => break,
                ".help" => print_help(),
                ".stack" => {
                    for value in &machine.stack {
                        println!("{} ({})", value, value.kind());
                    }
                }
                ".memory" => {
                    for (addr, slot) in machine.memory.dump() {
                        println!("&{}: {}", addr, slot);
                    }
                }
                ".program" => print!("{}", machine.program),
                ".reset" => {
                    machine = fresh_machine(trace);
                }
                _ => print_help(),
            }

            continue;
        }

        let instruction = match Program::parse_line(line) {
            Ok(instruction) => instruction,
            Err(err) => {
                println!("error: {}", err);
                continue;
            }
        };

        machine.program.instructions.push(instruction);

        // The machine may have halted implicitly at the old end of the
        // program; appending new code resumes it.
        machine.halted = false;

        while !machine.halted && machine.pc < machine.program.len() {
            if let Err(err) = machine.step() {
                println!("error: {}", err);
                break;
            }
        }

        if let Some(value) = machine.return_value.take() {
            println!("= {}", value);
        }
    }
}

use krm::{
    bytecode::Program,
    syntax::Module,
    vm::{Machine, StdIo},
};

use clap::{App, Arg, ArgMatches};
use slog::{o, Drain, Logger};
use slog_term::{FullFormat, TermDecorator};

enum Error {
    Syntax(String),
    Listing(String),
    Execution(String),
    IO(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::IO(e)
    }
}

fn parse_arguments() -> ArgMatches<'static> {
    App::new("krmrun")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Utility for checking and executing Krm programs")
        .arg(
            Arg::with_name("source")
                .help("File containing Krm source or a bytecode listing")
                .value_name("SOURCE")
                .required(true)
                .index(1),
        )
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

fn main() {
    let args = parse_arguments();

    let file_path = args.value_of("source").unwrap();

    match run(file_path, args.is_present("trace")) {
        Ok(()) => (),
        Err(Error::IO(io)) => eprintln!("IO error: {}", io),
        Err(Error::Syntax(msg)) => eprintln!("syntax error {}", msg),
        Err(Error::Listing(msg)) => eprintln!("listing error {}", msg),
        Err(Error::Execution(msg)) => eprintln!("execution error: {}", msg),
    }
}

fn run(file_path: &str, trace: bool) -> Result<(), Error> {
    let file = std::fs::read_to_string(file_path)?;

    if file_path.ends_with(".krm") {
        let module =
            Module::parse(&file).map_err(|err| Error::Syntax(err.verbose(&file)))?;

        for node in &module.nodes {
            println!(
                "node {} ({} items, depends on {})",
                node.name,
                node.items.len(),
                if node.dependencies.is_empty() {
                    "nothing".to_string()
                } else {
                    node.dependencies.join(", ")
                }
            );
        }

        println!("syntax ok");
        return Ok(());
    }

    let program = Program::parse(&file).map_err(|err| Error::Listing(err.verbose(&file)))?;

    let logger = if trace { Some(terminal_logger()) } else { None };

    let mut machine = Machine::with_logger(program, StdIo, logger);

    machine
        .run()
        .map_err(|err| Error::Execution(err.to_string()))?;

    if let Some(value) = machine.return_value {
        println!("{}", value);
    }

    Ok(())
}

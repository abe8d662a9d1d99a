//! A crate for working with the Krm node language and its stack virtual
//! machine.
//!
//! Currently this crate provides the functionality to:
//! - Tokenize and parse `.krm` source files into an abstract syntax tree,
//!   driven entirely by a declarative LL(1) grammar table.
//! - Read and write `.krb` files containing Krm bytecode listings.
//! - Execute bytecode programs on a typed stack machine.
//!
//! # Future plans
//!
//! - A code generator from the AST to bytecode.
//! - The cross-node runtime consuming `export`-marked variables.
//!
//! Note that the instruction set deliberately has no call opcode and no
//! frame structure: multiple functions in one address space require the
//! code generator to layer a caller-saved return-address convention on
//! `pushsp`, slots and `jump`. See [vm] for details.
//!
//! # Example
//! ```
//! use krm::{
//!     bytecode::Program,
//!     vm::{Machine, TestIo, Value},
//! };
//!
//! fn main() {
//!     // A Krm bytecode program that adds 3 and 4 and prints the sum.
//!     let listing = "\
//! ___krb___
//! ___code___
//! pushi 3
//! pushi 4
//! addi
//! prnti
//! ___end___
//! ";
//!
//!     // Parse the listing into a bytecode program.
//!     let program = Program::parse(listing)
//!         .expect("could not parse listing");
//!
//!     // Load the program into a machine with a capturing IO handler.
//!     let mut machine = Machine::new(program, TestIo::new());
//!
//!     // Execute it.
//!     machine.run()
//!         .expect("an error occurred while executing the program");
//!
//!     assert_eq!(machine.io.output(), &[Value::Int(7)]);
//! }
//! ```
//!
//! The front end works the same way from source text:
//! ```
//! use krm::syntax::Module;
//!
//! let module = Module::parse("node Main { export var hits: int = 0; }")
//!     .expect("could not parse source");
//!
//! assert_eq!(module.nodes[0].name, "Main");
//! ```
//!
//! # Executables
//!
//! ## `krmrun`
//!
//! Runs a `.krb` bytecode listing against standard input and output, or
//! front-end-checks a `.krm` source file. Built with the `krmrun` feature.
//!
//! ## `krmrepl`
//!
//! An interactive bytecode REPL: instructions typed at the prompt are
//! appended to the program and executed immediately. Built with the
//! `krmrepl` feature.

pub mod bytecode;
pub mod error;
pub mod grammar;
pub mod instruction;
pub mod parsing;
pub mod syntax;
pub mod vm;

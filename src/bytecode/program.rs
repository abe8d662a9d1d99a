use std::fmt;

use crate::error::ListingError;
use crate::instruction::Instruction;

use super::parser::parse_listing;

/// An ordered instruction sequence ready for execution. Jump targets are
/// instruction indices into this sequence, resolved before execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub instructions: Vec<Instruction>,
}

impl Program {
    pub fn new(instructions: Vec<Instruction>) -> Program {
        Program { instructions }
    }

    /// Parses a textual `.krb` listing.
    pub fn parse(listing: &str) -> Result<Program, ListingError> {
        parse_listing(listing)
    }

    /// Parses a single bare instruction line, as typed at a REPL prompt.
    pub fn parse_line(line: &str) -> Result<Instruction, ListingError> {
        super::parser::parse_instruction_line(line)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn fetch(&self, pc: usize) -> Option<&Instruction> {
        self.instructions.get(pc)
    }

    /// The wire form: one `(opcode byte, optional operand word)` pair per
    /// instruction.
    pub fn to_words(&self) -> Vec<(u8, Option<i64>)> {
        self.instructions.iter().map(Instruction::encode).collect()
    }

    /// Rebuilds a program from its wire form. `None` when a pair does not
    /// decode to a known instruction.
    pub fn from_words(words: &[(u8, Option<i64>)]) -> Option<Program> {
        words
            .iter()
            .map(|(byte, operand)| Instruction::decode(*byte, *operand))
            .collect::<Option<Vec<_>>>()
            .map(Program::new)
    }
}

impl fmt::Display for Program {
    /// Renders the parseable listing form.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "___krb___")?;
        writeln!(f, "___code___")?;

        for instruction in &self.instructions {
            writeln!(f, "{}", instruction)?;
        }

        writeln!(f, "___end___")
    }
}

use std::result::Result as StdResult;

use nom::{
    bytes::complete::{tag, take_while, take_while1},
    combinator::{map, map_res, opt, recognize},
    multi::many0,
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};

use edit_distance::edit_distance;

use crate::error::ListingError;
use crate::instruction::{Instruction, OpCode, Operand, OperandKind, ValueKind, MNEMONICS};

use super::program::Program;

type Result<'a, T> = IResult<&'a str, T, ListingError>;

const SPACE_CHARACTERS: &'static str = " \t";
const NEWLINE_CHARACTERS: &'static str = "\r\n";

fn sp(input: &str) -> Result<&str> {
    take_while(|c| SPACE_CHARACTERS.contains(c))(input)
}

fn line_end(input: &str) -> Result<&str> {
    preceded(sp, take_while1(|c| NEWLINE_CHARACTERS.contains(c)))(input)
}

fn take_usize(input: &str) -> Result<usize> {
    map_res(take_while1(|c: char| c.is_digit(10)), |s: &str| s.parse())(input)
}

fn take_i64(input: &str) -> Result<i64> {
    map_res(
        recognize(pair(opt(tag("-")), take_while1(|c: char| c.is_digit(10)))),
        |s: &str| s.parse(),
    )(input)
}

fn take_f64(input: &str) -> Result<f64> {
    map_res(
        recognize(tuple((
            opt(tag("-")),
            take_while1(|c: char| c.is_digit(10)),
            opt(pair(tag("."), take_while1(|c: char| c.is_digit(10)))),
        ))),
        |s: &str| s.parse(),
    )(input)
}

fn take_addr(input: &str) -> Result<usize> {
    preceded(tag("&"), take_usize)(input)
}

fn take_kind(input: &str) -> Result<ValueKind> {
    map_res(take_while1(|c: char| c.is_ascii_alphabetic()), |name| {
        ValueKind::from_name(name).ok_or(())
    })(input)
}

fn take_array_descriptor(input: &str) -> Result<Operand> {
    map(
        tuple((take_addr, sp, take_kind, sp, take_usize)),
        |(addr, _, kind, _, len)| Operand::Array { addr, kind, len },
    )(input)
}

/// Mnemonic lookup with a nearest-match suggestion for typos. An unknown
/// mnemonic is a hard failure: there is no point scanning further lines.
fn take_opcode(input: &str) -> Result<OpCode> {
    let (rest, mnemonic) = take_while1(|c: char| c.is_ascii_alphanumeric())(input)?;

    match OpCode::from_mnemonic(mnemonic) {
        Some(opcode) => Ok((rest, opcode)),
        None => {
            let suggestion = MNEMONICS
                .iter()
                .map(|(name, _)| *name)
                .min_by_key(|name| edit_distance(name, mnemonic))
                .filter(|name| edit_distance(name, mnemonic) <= 2)
                .map(|name| name.to_string());

            Err(nom::Err::Failure(ListingError::unknown_mnemonic(
                input, mnemonic, suggestion,
            )))
        }
    }
}

fn take_instruction(input: &str) -> Result<Instruction> {
    let (input, opcode) = take_opcode(input)?;
    let (input, _) = sp(input)?;

    let (input, operand) = match opcode.operand_kind() {
        OperandKind::None => (input, None),
        OperandKind::Int => map(take_i64, |v| Some(Operand::Int(v)))(input)?,
        OperandKind::Float => map(take_f64, |v| Some(Operand::Float(v)))(input)?,
        OperandKind::Addr => map(take_addr, |a| Some(Operand::Addr(a)))(input)?,
        OperandKind::Target => map(take_usize, |t| Some(Operand::Target(t)))(input)?,
        OperandKind::Array => map(take_array_descriptor, Some)(input)?,
    };

    Ok((input, Instruction { opcode, operand }))
}

fn parse_listing_nom(input: &str) -> Result<Program> {
    map(
        tuple((
            terminated(tag("___krb___"), line_end),
            terminated(tag("___code___"), line_end),
            many0(terminated(preceded(sp, take_instruction), line_end)),
            tag("___end___"),
        )),
        |(_, _, instructions, _)| Program { instructions },
    )(input)
}

/// Parses one bare instruction line, for interactive use.
pub(crate) fn parse_instruction_line(input: &str) -> StdResult<Instruction, ListingError> {
    match preceded(sp, take_instruction)(input) {
        Ok((rest, instruction)) => {
            if rest.trim().is_empty() {
                Ok(instruction)
            } else {
                Err(ListingError::trailing(rest))
            }
        }
        Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => Err(err),
        Err(nom::Err::Incomplete(_)) => Err(ListingError::incomplete()),
    }
}

pub(crate) fn parse_listing(input: &str) -> StdResult<Program, ListingError> {
    match parse_listing_nom(input) {
        Ok((_, program)) => Ok(program),
        Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => Err(err),
        Err(nom::Err::Incomplete(_)) => Err(ListingError::incomplete()),
    }
}

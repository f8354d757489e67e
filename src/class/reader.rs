//! Big-endian primitives over the unconsumed part of the input.
//!
//! The input slice is the cursor: each read hands back the rest of the slice
//! together with the value, so the position only ever moves forward and is
//! owned by whoever holds the returned slice.

use nom::{
    Parser,
    bytes::complete::take,
    number::complete::{be_i32, be_u8, be_u16, be_u32},
};

use super::ParseResult;
use crate::error::FormatError;

fn short_read(input: &[u8], needed: usize) -> nom::Err<FormatError> {
    nom::Err::Failure(FormatError::UnexpectedEof {
        needed,
        remaining: input.len(),
    })
}

pub fn read_u1(input: &[u8]) -> ParseResult<'_, u8> {
    be_u8::<_, ()>(input).map_err(|_| short_read(input, 1))
}

pub fn read_u2(input: &[u8]) -> ParseResult<'_, u16> {
    be_u16::<_, ()>(input).map_err(|_| short_read(input, 2))
}

pub fn read_u4(input: &[u8]) -> ParseResult<'_, u32> {
    be_u32::<_, ()>(input).map_err(|_| short_read(input, 4))
}

pub fn read_i4(input: &[u8]) -> ParseResult<'_, i32> {
    be_i32::<_, ()>(input).map_err(|_| short_read(input, 4))
}

pub fn read_bytes(input: &[u8], length: usize) -> ParseResult<'_, &[u8]> {
    take::<_, _, ()>(length)
        .parse(input)
        .map_err(|_| short_read(input, length))
}

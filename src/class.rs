mod parser;
mod reader;
mod resolve;
mod structs;

pub use parser::class_file;
pub use reader::{read_bytes, read_i4, read_u1, read_u2, read_u4};
pub use resolve::{FieldRef, MethodRef};
pub use structs::*;

use nom::IResult;

use crate::error::FormatError;

/// Result of a parser step: the unconsumed input and the decoded value.
pub type ParseResult<'a, T> = IResult<&'a [u8], T, FormatError>;

pub(crate) fn fail<T>(err: FormatError) -> Result<T, nom::Err<FormatError>> {
    Err(nom::Err::Failure(err))
}

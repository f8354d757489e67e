use std::io;

use nom::error::{ErrorKind, ParseError};
use thiserror::Error;

pub type Result<T> = ::std::result::Result<T, Error>;

/// Every way decoding or executing a class can fail.
///
/// All of them abort the unit of work they occur in (a whole class decode,
/// or a whole method's decode and execution); nothing is retried and no
/// partial result is handed back.
#[derive(Debug, Error)]
pub enum Error {
    #[error("class format error: {0}")]
    Format(#[from] FormatError),

    #[error("unsupported: {0}")]
    Unsupported(#[from] UnsupportedFeature),

    /// The requested member is not declared by the class.
    #[error("method not found: {0}")]
    MethodNotFound(String),

    /// The call surface has no function registered under this name.
    #[error("call not found: {0}")]
    CallNotFound(String),

    #[error("operand stack underflow")]
    StackUnderflow,

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// The bytes do not form a well-formed class file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("not a class file (magic {0:#010x})")]
    BadMagic(u32),

    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("constant pool count must be at least 1")]
    EmptyConstantPool,

    #[error("unknown constant pool tag {tag} at #{index}")]
    UnknownConstantTag { index: u16, tag: u8 },

    #[error("invalid constant pool index #{0}")]
    BadConstantIndex(u16),

    #[error("constant #{index} is {found}, expected {expected}")]
    ConstantMismatch {
        index: u16,
        expected: &'static str,
        found: &'static str,
    },

    #[error("constant #{0} is not valid modified UTF-8")]
    InvalidUtf8(u16),

    #[error("attribute `{name}` does not match its declared length of {declared} bytes")]
    AttributeLength { name: String, declared: u32 },

    #[error("invalid descriptor `{0}`")]
    InvalidDescriptor(String),

    #[error("{0} trailing bytes after the class file")]
    TrailingBytes(usize),

    #[error("parser error: {0:?}")]
    Parser(ErrorKind),
}

/// Well-formed input that falls outside what the engine implements.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UnsupportedFeature {
    #[error("opcode {opcode:#04x} ({mnemonic}) at pc {pc}")]
    Opcode {
        opcode: u8,
        mnemonic: &'static str,
        pc: usize,
    },

    #[error("ldc of {kind} constant #{index}")]
    LdcConstant { index: u16, kind: &'static str },

    #[error("call to `{method}` on a receiver that is not a static field")]
    Receiver { method: String },
}

impl<I> ParseError<I> for FormatError {
    fn from_error_kind(_input: I, kind: ErrorKind) -> Self {
        FormatError::Parser(kind)
    }

    fn append(_input: I, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

impl From<nom::Err<FormatError>> for FormatError {
    fn from(err: nom::Err<FormatError>) -> Self {
        match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => e,
            nom::Err::Incomplete(needed) => FormatError::UnexpectedEof {
                needed: match needed {
                    nom::Needed::Size(size) => size.get(),
                    nom::Needed::Unknown => 1,
                },
                remaining: 0,
            },
        }
    }
}

impl From<nom::Err<FormatError>> for Error {
    fn from(err: nom::Err<FormatError>) -> Self {
        Error::Format(err.into())
    }
}

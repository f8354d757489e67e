use std::{fmt, sync::Arc};

use super::instructions::{self as inst, mnemonic};
use crate::{
    class::{ClassFile, ConstantPool, ConstantPoolInfo, FieldRef, MethodRef, read_u1, read_u2},
    error::{Result, UnsupportedFeature},
};

/// One decoded instruction with its pool operand already resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    GetStatic(FieldRef),
    /// `ldc` of a string constant; only strings are supported.
    Ldc(Arc<str>),
    InvokeVirtual(MethodRef),
    Return,
}

impl Operation {
    pub fn opcode(&self) -> u8 {
        match self {
            Operation::GetStatic(_) => inst::GETSTATIC,
            Operation::Ldc(_) => inst::LDC,
            Operation::InvokeVirtual(_) => inst::INVOKEVIRTUAL,
            Operation::Return => inst::RETURN,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opcode = self.opcode();
        write!(f, "{:#04x} {}", opcode, mnemonic(opcode))?;
        match self {
            Operation::GetStatic(field) => write!(f, ": {field}"),
            Operation::Ldc(value) => write!(f, ": {value}"),
            Operation::InvokeVirtual(method) => write!(f, ": {method}"),
            Operation::Return => Ok(()),
        }
    }
}

/// Decodes the whole of `code`, failing on the first opcode outside the
/// supported set.
pub fn decode(code: &[u8], pool: &ConstantPool) -> Result<Vec<Operation>> {
    let mut operations = Vec::new();
    let mut input = code;
    while !input.is_empty() {
        let pc = code.len() - input.len();
        let operation;
        (input, operation) = decode_operation(input, pc, pool)?;
        log::debug!("{pc:>4}: {operation}");
        operations.push(operation);
    }
    Ok(operations)
}

/// Looks `name` up in `class` and decodes its code.
pub fn decode_method(class: &ClassFile, name: &str) -> Result<Vec<Operation>> {
    let method = class.find_method(name)?;
    decode(&method.code, &class.constant_pool)
}

fn decode_operation<'a>(
    input: &'a [u8],
    pc: usize,
    pool: &ConstantPool,
) -> Result<(&'a [u8], Operation)> {
    let (input, opcode) = read_u1(input)?;
    match opcode {
        inst::GETSTATIC => {
            let (input, index) = read_u2(input)?;
            Ok((input, Operation::GetStatic(pool.field_ref(index)?)))
        }
        inst::LDC => {
            let (input, index) = read_u1(input)?;
            Ok((input, Operation::Ldc(ldc_string(pool, index as u16)?)))
        }
        inst::INVOKEVIRTUAL => {
            let (input, index) = read_u2(input)?;
            Ok((input, Operation::InvokeVirtual(pool.method_ref(index)?)))
        }
        inst::RETURN => Ok((input, Operation::Return)),
        _ => Err(UnsupportedFeature::Opcode {
            opcode,
            mnemonic: mnemonic(opcode),
            pc,
        }
        .into()),
    }
}

fn ldc_string(pool: &ConstantPool, index: u16) -> Result<Arc<str>> {
    match *pool.get(index)? {
        ConstantPoolInfo::String { string_index } => Ok(Arc::clone(pool.utf8(string_index)?)),
        ref other => Err(UnsupportedFeature::LdcConstant {
            index,
            kind: other.kind(),
        }
        .into()),
    }
}

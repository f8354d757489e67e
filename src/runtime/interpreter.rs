mod decoder;
pub mod instructions;

pub use decoder::*;

use super::{NativeInterface, NativeVariable};
use crate::{
    class::{ClassFile, MethodRef},
    error::{Error, Result, UnsupportedFeature},
};

/// Operand stack of one method execution. Values stay in their decoded
/// form; `invokevirtual` inspects what produced each argument.
#[derive(Debug, Default)]
pub struct OperandStack {
    stack: Vec<Operation>,
}

impl OperandStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, operation: Operation) {
        self.stack.push(operation);
    }

    pub fn pop(&mut self) -> Result<Operation> {
        self.stack.pop().ok_or(Error::StackUnderflow)
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

/// Executes decoded methods, sending every call to `N`.
pub struct Interpreter<N> {
    natives: N,
}

impl<N: NativeInterface> Interpreter<N> {
    pub fn new(natives: N) -> Self {
        Self { natives }
    }

    pub fn natives(&self) -> &N {
        &self.natives
    }

    pub fn into_natives(self) -> N {
        self.natives
    }

    /// Decodes the whole method first, then executes it. Nothing is
    /// dispatched if decoding fails.
    pub fn run_method(&mut self, class: &ClassFile, name: &str) -> Result<()> {
        let operations = decode_method(class, name)?;
        self.execute(&operations)
    }

    /// Replays every operation in order. `return` has no stack effect and
    /// does not stop the replay.
    pub fn execute(&mut self, operations: &[Operation]) -> Result<()> {
        let mut stack = OperandStack::new();
        for operation in operations {
            match operation {
                Operation::GetStatic(_) | Operation::Ldc(_) => stack.push(operation.clone()),
                Operation::InvokeVirtual(method) => self.invoke_virtual(&mut stack, method)?,
                Operation::Return => {}
            }
        }
        Ok(())
    }

    fn invoke_virtual(&mut self, stack: &mut OperandStack, method: &MethodRef) -> Result<()> {
        let mut args = Vec::with_capacity(method.arg_types.len());
        for _ in &method.arg_types {
            args.push(match stack.pop()? {
                Operation::Ldc(value) => NativeVariable::String(value),
                _ => NativeVariable::Null,
            });
        }
        // popped last argument first
        args.reverse();

        let receiver = match stack.pop()? {
            Operation::GetStatic(field) => field,
            _ => {
                return Err(UnsupportedFeature::Receiver {
                    method: format!("{}.{}", method.class, method.name),
                }
                .into());
            }
        };

        let name = format!("{}.{}.{}", receiver.class, receiver.name, method.name);
        self.natives.call(&name, args)?;
        Ok(())
    }
}

//! A class-file decoder paired with a small stack-based bytecode engine.
//!
//! Bytes are decoded into a [`ClassFile`] (constant pool, members and their
//! attributes), one method's code is decoded into [`Operation`]s and those are
//! replayed by the [`Interpreter`] against an operand stack, with calls routed
//! to a [`NativeInterface`].

pub mod class;
pub mod consts;
pub mod descriptor;
pub mod error;
pub mod runtime;

pub use class::{AttributeInfo, ClassFile, ConstantPool, ConstantPoolInfo, FieldRef, MethodRef};
pub use error::{Error, FormatError, Result, UnsupportedFeature};
pub use runtime::{Interpreter, NativeInterface, NativeVariable, Natives, Operation};

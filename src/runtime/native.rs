mod system;

use std::{
    fmt,
    io::{self, Write},
    sync::Arc,
};

use dashmap::DashMap;

use crate::error::{Error, Result};

pub type NativeFunction = fn(NativeEnv<'_>) -> Result<Option<NativeVariable>>;

pub struct NativeEnv<'a> {
    pub args: Vec<NativeVariable>,
    pub out: &'a mut dyn Write,
}

/// A call argument or result crossing into native code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeVariable {
    String(Arc<str>),
    /// The engine could not realize the value.
    Null,
}

impl NativeVariable {
    pub fn get_string(&self) -> Option<&str> {
        match self {
            NativeVariable::String(s) => Some(s),
            NativeVariable::Null => None,
        }
    }
}

impl fmt::Display for NativeVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeVariable::String(s) => f.write_str(s),
            NativeVariable::Null => f.write_str("null"),
        }
    }
}

/// The call surface the interpreter dispatches `invokevirtual` to, keyed
/// by fully qualified dotted name such as `java.lang.System.out.println`.
pub trait NativeInterface {
    fn call(&mut self, name: &str, args: Vec<NativeVariable>) -> Result<Option<NativeVariable>>;
}

impl<T: NativeInterface + ?Sized> NativeInterface for &mut T {
    fn call(&mut self, name: &str, args: Vec<NativeVariable>) -> Result<Option<NativeVariable>> {
        (**self).call(name, args)
    }
}

/// Registry of native functions writing their output to `W`.
pub struct Natives<W> {
    functions: DashMap<String, NativeFunction>,
    out: W,
}

impl<W: Write> Natives<W> {
    /// A registry with the built-in natives already registered.
    pub fn new(out: W) -> Self {
        let natives = Self {
            functions: DashMap::new(),
            out,
        };
        system::register_natives(&natives);
        natives
    }

    pub fn register(&self, name: impl Into<String>, function: NativeFunction) {
        self.functions.insert(name.into(), function);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn out(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl Natives<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> NativeInterface for Natives<W> {
    fn call(&mut self, name: &str, args: Vec<NativeVariable>) -> Result<Option<NativeVariable>> {
        let Some(function) = self.functions.get(name).map(|function| *function) else {
            return Err(Error::CallNotFound(name.to_string()));
        };
        log::debug!("native call {name} {args:?}");
        function(NativeEnv {
            args,
            out: &mut self.out,
        })
    }
}

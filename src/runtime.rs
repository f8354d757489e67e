mod interpreter;
mod native;

pub use interpreter::*;
pub use native::*;

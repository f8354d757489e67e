use std::io::Write;

use super::{NativeEnv, NativeVariable, Natives};
use crate::error::Result;

// public void println(String x);
fn native_println(env: NativeEnv<'_>) -> Result<Option<NativeVariable>> {
    let line = env
        .args
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(env.out, "{line}")?;
    Ok(None)
}

pub(super) fn register_natives<W: Write>(natives: &Natives<W>) {
    natives.register("java.lang.System.out.println", native_println);
}

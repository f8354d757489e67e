use std::fs::File;
use std::io::{self, BufReader, Write};

use clap::{App, Arg};
use minijvm::runtime::decode_method;
use minijvm::{ClassFile, Interpreter, Natives};

fn main() -> minijvm::Result<()> {
    env_logger::init();

    let matches = App::new("java")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Decodes a class file and runs one of its methods")
        .arg(
            Arg::with_name("CLASS_FILE")
                .help("Sets the class file to load")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("method")
                .long("method")
                .value_name("NAME")
                .takes_value(true)
                .default_value("main")
                .help("Method to run"),
        )
        .arg(
            Arg::with_name("dump")
                .long("dump")
                .help("Prints the decoded class file before running"),
        )
        .arg(
            Arg::with_name("decode-only")
                .long("decode-only")
                .help("Lists the decoded operations instead of executing them"),
        )
        .get_matches();

    let class_path = matches.value_of("CLASS_FILE").unwrap_or_default();
    let method = matches.value_of("method").unwrap_or("main");

    log::info!("Loading '{}'", class_path);
    let class = ClassFile::read_from(BufReader::new(File::open(class_path)?))?;
    log::info!(
        "Loaded {} (class file version {}.{})",
        class.class_name()?,
        class.major_version,
        class.minor_version
    );

    if matches.is_present("dump") {
        println!("{:#?}", class);
    }

    if matches.is_present("decode-only") {
        let mut stdout = io::stdout().lock();
        for operation in decode_method(&class, method)? {
            writeln!(stdout, "{operation}")?;
        }
        return Ok(());
    }

    log::info!("Running '{}'", method);
    let mut interpreter = Interpreter::new(Natives::stdout());
    interpreter.run_method(&class, method)?;

    Ok(())
}

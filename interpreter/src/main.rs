use std::io::{self, BufRead, Write};
use std::{env, fs, process};

use interpreter::interp::Interp;
use log::{error, info};

fn main() {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .unwrap();

    // cargo run -- <filename> to run a script file
    // cargo run for the REPL
    let args: Vec<String> = env::args().collect();
    match args.get(1) {
        Some(path) => run_file(path),
        None => repl(),
    }
}

fn run_file(path: &str) {
    info!("eval script file: {}", path);
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            error!("cannot read {}: {}", path, err);
            process::exit(1);
        }
    };

    let interp = Interp::new();
    match interp.eval_program(&source) {
        Ok(value) => println!("{}", value),
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    }
}

fn repl() {
    println!("lisp repl, Ctrl-D exits");

    let interp = Interp::new();
    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                error!("read line failed: {}", err);
                break;
            }
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // A failed line leaves earlier definitions in place.
        match interp.eval_program(line) {
            Ok(value) => println!("{}", value),
            Err(err) => println!("{}", err),
        }
    }
}

use std::env;
use std::fs;
use std::process;

use torshrt::{Interp, TraceLog};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let exit_code = match args[1].as_str() {
        "run" => run_command(&args[2..]),
        "eval" => eval_command(&args[2..]),
        _ => {
            print_usage();
            1
        }
    };
    process::exit(exit_code);
}

fn run_command(args: &[String]) -> i32 {
    let mut trace_path: Option<String> = None;
    let mut file_arg: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--trace" => {
                let Some(path) = args.get(i + 1) else {
                    eprintln!("--trace requires a path");
                    return 1;
                };
                trace_path = Some(path.clone());
                i += 2;
            }
            _ => {
                file_arg = Some(args[i].clone());
                i += 1;
            }
        }
    }
    let Some(file) = file_arg else {
        eprintln!("torsh run requires a script file");
        return 1;
    };
    let source = match fs::read_to_string(&file) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("{file}: {err}");
            return 1;
        }
    };
    let mut trace = trace_path.map(TraceLog::new);
    let mut interp = Interp::new();
    let mut last = String::new();
    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match interp.eval_line(trimmed) {
            Ok(result) => {
                if let Some(t) = trace.as_mut() {
                    if let Err(err) = t.append(trimmed, true, &result) {
                        eprintln!("trace: {err}");
                        return 1;
                    }
                }
                last = result;
            }
            Err(err) => {
                if let Some(t) = trace.as_mut() {
                    let _ = t.append(trimmed, false, err.message());
                }
                eprintln!("{err}");
                return 1;
            }
        }
    }
    if !last.is_empty() {
        println!("{last}");
    }
    0
}

fn eval_command(args: &[String]) -> i32 {
    if args.is_empty() {
        eprintln!("torsh eval requires a command");
        return 1;
    }
    let mut interp = Interp::new();
    match interp.eval_words(args) {
        Ok(result) => {
            if !result.is_empty() {
                println!("{result}");
            }
            0
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn print_usage() {
    eprintln!("usage: torsh run <file> [--trace <path>]");
    eprintln!("       torsh eval <word>...");
}

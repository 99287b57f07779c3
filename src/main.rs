use std::{env, fs::File, path::Path, process};

use fcv_reader::fcv::{DiagnosticSink, EndianMode, LogSink, WriterSink};
use fcv_reader::{Endian, FcvFile, FcvParser, ParseOptions, Result};
use rayon::prelude::*;

struct Args {
    paths: Vec<String>,
    verbose: bool,
    write_log: bool,
    write_json: bool,
    endian: EndianMode,
}

fn usage(program: &str) -> ! {
    eprintln!(
        "Usage: {} <path_to_fcv_file>... [--verbose] [--log] [--json] [--endian auto|little|big]",
        program
    );
    process::exit(1);
}

fn parse_args() -> Args {
    let mut raw = env::args();
    let program = raw.next().unwrap_or_else(|| "fcv-reader".to_string());
    let mut args = Args {
        paths: Vec::new(),
        verbose: false,
        write_log: false,
        write_json: false,
        endian: EndianMode::Auto,
    };

    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--verbose" | "-verbose" => args.verbose = true,
            "--log" => args.write_log = true,
            "--json" => args.write_json = true,
            "--endian" => {
                args.endian = match raw.next().as_deref() {
                    Some("auto") => EndianMode::Auto,
                    Some("little") => EndianMode::Forced(Endian::Little),
                    Some("big") => EndianMode::Forced(Endian::Big),
                    _ => usage(&program),
                }
            }
            flag if flag.starts_with('-') => usage(&program),
            _ => args.paths.push(arg),
        }
    }

    if args.paths.is_empty() {
        usage(&program);
    }
    args
}

/// Parses one file; report lines are returned when `--verbose` or `--log` asks for them.
fn process_file(path: &str, args: &Args) -> (Vec<String>, Result<FcvFile>) {
    let mut lines: Vec<String> = Vec::new();
    let result = run_file(path, args, &mut lines);
    (lines, result)
}

fn run_file(path: &str, args: &Args, lines: &mut Vec<String>) -> Result<FcvFile> {
    let options = ParseOptions {
        endian: args.endian,
    };
    let reader = File::open(path)?;

    let parsed = if args.write_log || args.verbose {
        FcvParser::new(reader, options).parse(&mut *lines)
    } else {
        FcvParser::new(reader, options).parse(&mut LogSink)
    };

    if args.write_log {
        let mut sink = WriterSink::new(File::create(format!("{}.log", path))?);
        for line in lines.iter() {
            sink.emit(line)?;
        }
        sink.flush()?;
    }
    let fcv = parsed?;

    if args.write_json {
        let json_path = Path::new(path).with_extension("json");
        std::fs::write(&json_path, fcv.to_json().map_err(std::io::Error::from)?)?;
    }
    Ok(fcv)
}

fn main() {
    env_logger::init();
    let args = parse_args();

    let results: Vec<(&String, (Vec<String>, Result<FcvFile>))> = args
        .paths
        .par_iter()
        .map(|path| (path, process_file(path, &args)))
        .collect();

    let mut failures = 0;
    for (path, (lines, result)) in results {
        if args.verbose {
            for line in &lines {
                println!("{}", line);
            }
        }
        match result {
            Ok(fcv) => {
                let info = fcv.summary();
                println!("=== FCV File: {} ===", path);
                println!("Byte Order  : {:?}", fcv.endian);
                println!("Max Time    : {} frames", info.max_time);
                println!("Node Count  : {}", info.node_count);
                println!(
                    "File Size   : {} bytes (actual {} bytes)",
                    info.declared_file_size, info.actual_file_size
                );
                println!("Padding     : {} byte(s)", info.padding_bytes);
                if args.write_log {
                    println!(".FCV parsing complete. See {}.log for details.", path);
                } else {
                    println!(".FCV parsing complete.");
                }
            }
            Err(err) => {
                failures += 1;
                eprintln!("ERROR: {}: {}", path, err);
            }
        }
    }

    if failures > 0 {
        process::exit(1);
    }
}

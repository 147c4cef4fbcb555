use std::env;
use std::io::{self, Write};
use std::process;
use std::time::Instant;

use serde_json::json;
use tracing_subscriber::EnvFilter;
use tracking_id::{Generator, init, parse_tracking_id, validate_tracking_id};

const DEFAULT_STREAM_COUNT: usize = 10;
const DEFAULT_BENCH_COUNT: usize = 100_000;

#[derive(Debug, Clone, Default)]
struct EmitOpts {
    count: Option<usize>,
    labels: bool,
    json: bool,
}

fn default_stream_count() -> usize {
    env::var("TRACKING_ID_COUNT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_STREAM_COUNT)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn print_help() {
    eprintln!(
        "tracking-id - ObjectId-style tracking id generator CLI\n\n\
Usage:\n  tracking-id next\n  tracking-id stream [--count <n>] [--labels]\n  tracking-id validate <id>\n  tracking-id parse <id> [--json]\n  tracking-id healthcheck [--json]\n  tracking-id bench [--count <n>]\n\n\
Environment:\n  TRACKING_ID_COUNT  default --count for stream (10)\n  RUST_LOG           log filter (warn)\n"
    );
}

fn parse_flags(args: &[String], allow_count: bool) -> Result<EmitOpts, String> {
    let mut opts = EmitOpts::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--count" if allow_count => {
                if i + 1 >= args.len() {
                    return Err("missing value for --count".to_string());
                }
                opts.count = Some(
                    args[i + 1]
                        .parse::<usize>()
                        .map_err(|_| "invalid integer for --count".to_string())?,
                );
                i += 2;
            }
            "--labels" => {
                opts.labels = true;
                i += 1;
            }
            "--json" => {
                opts.json = true;
                i += 1;
            }
            _ => return Err(format!("unknown flag: {}", args[i])),
        }
    }

    Ok(opts)
}

fn generator() -> Result<&'static Generator, String> {
    init().map_err(|e| e.to_string())
}

fn run_next(args: &[String]) -> Result<(), String> {
    parse_flags(args, false)?;
    println!("{}", generator()?.generate_id());
    Ok(())
}

fn run_stream(args: &[String]) -> Result<(), String> {
    let opts = parse_flags(args, true)?;
    let count = opts.count.unwrap_or_else(default_stream_count);
    let generator = generator()?;

    let mut out = io::stdout().lock();
    for id in generator.iter().take(count) {
        if opts.labels {
            writeln!(out, "Generated ID: {}", id).map_err(|e| e.to_string())?;
        } else {
            writeln!(out, "{}", id).map_err(|e| e.to_string())?;
        }
    }
    out.flush().map_err(|e| e.to_string())
}

fn run_validate(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err("validate requires an id".to_string());
    }

    let ok = validate_tracking_id(&args[0]);
    println!("{}", if ok { "true" } else { "false" });
    if ok {
        Ok(())
    } else {
        Err("invalid tracking id".to_string())
    }
}

fn run_parse(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err("parse requires an id".to_string());
    }

    let opts = parse_flags(&args[1..], false)?;
    let parsed = parse_tracking_id(&args[0]).map_err(|e| e.to_string())?;

    if opts.json {
        let payload = json!({
            "raw": parsed.raw,
            "id": parsed.id,
            "timestamp": parsed.timestamp.to_rfc3339(),
            "machine": format!("{:06X}", parsed.machine),
            "process": format!("{:04X}", parsed.process),
            "counter": parsed.counter,
        });
        println!(
            "{}",
            serde_json::to_string(&payload).map_err(|e| e.to_string())?
        );
    } else {
        println!("raw={}", parsed.raw);
        println!("timestamp={}", parsed.timestamp.to_rfc3339());
        println!("machine={:06X}", parsed.machine);
        println!("process={:04X}", parsed.process);
        println!("counter={}", parsed.counter);
    }

    Ok(())
}

fn run_healthcheck(args: &[String]) -> Result<(), String> {
    let opts = parse_flags(args, false)?;
    let generator = generator()?;
    let fingerprint = generator.fingerprint();

    let sample = generator.next_id();
    let rendered = sample.to_hex();
    let ok = validate_tracking_id(&rendered)
        && sample.machine() == fingerprint.machine
        && sample.process() == fingerprint.process;

    if opts.json {
        let payload = json!({
            "ok": ok,
            "sample_id": rendered,
            "machine": format!("{:06X}", fingerprint.machine),
            "process": format!("{:04X}", fingerprint.process),
            "machine_source": fingerprint.source.machine.as_str(),
            "process_source": fingerprint.source.process.as_str(),
        });
        println!(
            "{}",
            serde_json::to_string(&payload).map_err(|e| e.to_string())?
        );
    } else {
        println!(
            "ok={} sample={} machine_source={} process_source={}",
            if ok { "true" } else { "false" },
            rendered,
            fingerprint.source.machine.as_str(),
            fingerprint.source.process.as_str()
        );
    }

    if ok {
        Ok(())
    } else {
        Err("healthcheck failed".to_string())
    }
}

fn run_bench(args: &[String]) -> Result<(), String> {
    let opts = parse_flags(args, true)?;
    let count = opts.count.filter(|&n| n > 0).unwrap_or(DEFAULT_BENCH_COUNT);
    let generator = generator()?;

    let start = Instant::now();
    for _ in 0..count {
        let _ = generator.generate_id();
    }
    let secs = start.elapsed().as_secs_f64().max(1e-9);

    let payload = json!({
        "impl": "rust",
        "n": count,
        "seconds": secs,
        "ids_per_sec": count as f64 / secs,
    });
    println!(
        "{}",
        serde_json::to_string(&payload).map_err(|e| e.to_string())?
    );
    Ok(())
}

fn main() {
    init_logging();

    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() {
        print_help();
        process::exit(2);
    }

    if args[0] == "-h" || args[0] == "--help" || args[0] == "help" {
        print_help();
        return;
    }

    let cmd = args[0].as_str();
    let rest = &args[1..];

    let res = match cmd {
        "next" => run_next(rest),
        "stream" => run_stream(rest),
        "validate" => run_validate(rest),
        "parse" => run_parse(rest),
        "healthcheck" => run_healthcheck(rest),
        "bench" => run_bench(rest),
        _ => Err(format!("unknown command: {}", cmd)),
    };

    if let Err(err) = res {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}

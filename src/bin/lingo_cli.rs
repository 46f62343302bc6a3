//! lingo-cli: Lingo.dev 本地化引擎命令行工具
//!
//! Usage:
//!   lingo-cli translate <target> <text> [--source <locale>] [--fast]
//!   lingo-cli recognize <text>
//!   lingo-cli whoami
//!   lingo-cli version

use lingo_engine::{BlockingEngine, EngineConfig, LocalizationParams, ProgressCallback};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let code = match args[1].as_str() {
        "translate" => cmd_translate(&args[2..]),
        "recognize" => cmd_recognize(&args[2..]),
        "whoami" => cmd_whoami(),
        "version" | "--version" | "-V" => {
            cmd_version();
            0
        }
        "help" | "--help" | "-h" => {
            print_usage();
            0
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            1
        }
    };
    std::process::exit(code);
}

fn print_usage() {
    println!(
        r#"lingo-cli: Lingo.dev localization engine

USAGE:
    lingo-cli <COMMAND> [OPTIONS]

COMMANDS:
    translate <target> <text>   Translate text into the target locale
        --source <locale>       Source locale (detected by the service if omitted)
        --fast                  Prefer speed over quality
        --progress              Print progress per chunk to stderr
    recognize <text>            Detect the locale of a text
    whoami                      Show the account behind the API key
    version                     Show version information
    help                        Show this help message

ENVIRONMENT:
    LINGODOTDEV_API_KEY         API key (required)
    LINGODOTDEV_API_URL         Service base URL
    LINGODOTDEV_BATCH_SIZE, LINGODOTDEV_IDEAL_BATCH_ITEM_SIZE,
    LINGODOTDEV_TIMEOUT_SECS, LINGODOTDEV_MAX_PARALLEL,
    LINGODOTDEV_RETRY_MAX_ATTEMPTS, LINGODOTDEV_RETRY_BASE_DELAY,
    LINGODOTDEV_RETRY_MAX_TIMEOUT
    RUST_LOG                    Log filter (default: warn)"#
    );
}

fn cmd_version() {
    println!("lingo-cli {}", env!("CARGO_PKG_VERSION"));
}

fn engine() -> Option<BlockingEngine> {
    let config = match EngineConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            return None;
        }
    };
    match BlockingEngine::new(config) {
        Ok(engine) => Some(engine),
        Err(e) => {
            eprintln!("Error: {e}");
            None
        }
    }
}

fn report(e: &lingo_engine::Error) -> i32 {
    eprintln!("Error: {e}");
    for hint in e.suggestions() {
        eprintln!("  hint: {hint}");
    }
    1
}

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn cmd_translate(args: &[String]) -> i32 {
    let positional: Vec<&String> = {
        let mut out = Vec::new();
        let mut skip = false;
        for a in args {
            if skip {
                skip = false;
                continue;
            }
            match a.as_str() {
                "--source" => skip = true,
                "--fast" | "--progress" => {}
                _ => out.push(a),
            }
        }
        out
    };
    let (target, text) = match positional.as_slice() {
        [target, rest @ ..] if !rest.is_empty() => (
            target.as_str(),
            rest.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(" "),
        ),
        _ => {
            eprintln!("Usage: lingo-cli translate <target> <text> [--source <locale>] [--fast]");
            return 1;
        }
    };

    let mut params = LocalizationParams::new(target).with_fast(args.iter().any(|a| a == "--fast"));
    if let Some(source) = flag_value(args, "--source") {
        params = params.with_source_locale(source);
    }

    let Some(engine) = engine() else { return 1 };
    let progress = args
        .iter()
        .any(|a| a == "--progress")
        .then(|| ProgressCallback::simple(|p| eprintln!("progress: {p}%")));
    let result = engine.localize_text(&text, &params, progress);
    engine.close();
    match result {
        Ok(out) => {
            println!("{out}");
            0
        }
        Err(e) => report(&e),
    }
}

fn cmd_recognize(args: &[String]) -> i32 {
    if args.is_empty() {
        eprintln!("Usage: lingo-cli recognize <text>");
        return 1;
    }
    let text = args.join(" ");
    let Some(engine) = engine() else { return 1 };
    let result = engine.recognize_locale(&text);
    engine.close();
    match result {
        Ok(locale) => {
            println!("{locale}");
            0
        }
        Err(e) => report(&e),
    }
}

fn cmd_whoami() -> i32 {
    let Some(engine) = engine() else { return 1 };
    let result = engine.whoami();
    engine.close();
    match result {
        Ok(Some(identity)) => {
            println!("{} ({})", identity.email, identity.id);
            0
        }
        Ok(None) => {
            eprintln!("Not authenticated");
            1
        }
        Err(e) => report(&e),
    }
}

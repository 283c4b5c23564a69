// Keyseq CLI
// Parse, match, format and replay keyboard shortcut patterns from the shell

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use keyseq_core::{
    build_handler_with_clock, format, match_any, parse, parse_strict, KeyEvent, ManualClock,
    MatchOptions, PatternSource, Platform, Settings,
};

/// Keyboard shortcut pattern tool
#[derive(Parser, Debug)]
#[command(name = "keyseq")]
#[command(author = "keyseq contributors")]
#[command(version)]
#[command(about = "Parse, match and format keyboard shortcut patterns", long_about = None)]
struct Args {
    /// TOML settings file (default: ~/.config/keyseq/settings.toml)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the canonical form and steps of a pattern
    Parse {
        pattern: String,

        /// Reject tokens the lenient parser would drop
        #[arg(long)]
        strict: bool,

        /// Compare single-character keys with their case
        #[arg(long)]
        case_sensitive: bool,

        /// Platform used to resolve `mod`
        #[arg(long, value_name = "PLATFORM")]
        platform: Option<Platform>,
    },

    /// Check whether an event (written as a step, e.g. "ctrl+k") matches
    Match {
        event: String,

        #[arg(required = true)]
        patterns: Vec<String>,

        #[arg(long)]
        case_sensitive: bool,

        #[arg(long, value_name = "PLATFORM")]
        platform: Option<Platform>,
    },

    /// Render a pattern as a display label
    Format {
        pattern: String,

        #[arg(long, value_name = "PLATFORM")]
        platform: Option<Platform>,

        /// Use symbol glyphs (⌘K)
        #[arg(long, conflicts_with = "words")]
        symbols: bool,

        /// Use words (Ctrl + K)
        #[arg(long)]
        words: bool,

        /// Text placed between the labels of one step
        #[arg(long, value_name = "SEPARATOR")]
        separator: Option<String>,
    },

    /// Feed timed events through a sequence handler
    Replay {
        #[arg(required = true)]
        patterns: Vec<String>,

        /// Space-separated `step@ms` events, e.g. "g@0 g@100 x@900"
        #[arg(long, value_name = "EVENTS")]
        events: String,

        /// Milliseconds allowed between steps; 0 waits forever
        #[arg(long, value_name = "MS")]
        timeout: Option<u64>,
    },

    /// List configured bindings with their labels
    Bindings,
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
    match path {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display())),
        None => Settings::load_default().context("failed to load default settings"),
    }
}

fn match_options(
    settings: &Settings,
    case_sensitive: bool,
    platform: Option<Platform>,
) -> MatchOptions {
    let mut options = settings.match_options();
    if case_sensitive {
        options.case_sensitive = true;
    }
    if let Some(platform) = platform {
        options.platform = Some(platform);
    }
    options
}

/// Build an event from a single-step description like "ctrl+shift+k"
fn parse_event(text: &str, options: &MatchOptions) -> Result<KeyEvent> {
    let parsed = parse_strict(text, options)
        .with_context(|| format!("invalid event '{}'", text))?;
    let Some(step) = parsed.single_step() else {
        bail!("event '{}' must be a single step", text);
    };
    let Some(key) = step.key() else {
        bail!("event '{}' names no key", text);
    };
    Ok(KeyEvent::new(key).with_modifiers(step.modifiers()))
}

/// Split "g@100" into the event and its offset
fn parse_timed_event(text: &str, options: &MatchOptions) -> Result<(KeyEvent, Duration)> {
    let (step, at) = text
        .rsplit_once('@')
        .with_context(|| format!("event '{}' is missing '@ms'", text))?;
    let millis: u64 = at
        .parse()
        .with_context(|| format!("invalid offset '{}' in event '{}'", at, text))?;
    Ok((parse_event(step, options)?, Duration::from_millis(millis)))
}

fn run_parse(
    settings: &Settings,
    pattern: &str,
    strict: bool,
    case_sensitive: bool,
    platform: Option<Platform>,
) -> Result<ExitCode> {
    let options = match_options(settings, case_sensitive, platform);
    let parsed = if strict {
        parse_strict(pattern, &options).with_context(|| format!("invalid pattern '{}'", pattern))?
    } else {
        parse(pattern, &options)
    };

    println!("pattern: {}", parsed);
    println!("sequence: {}", if parsed.is_sequence() { "yes" } else { "no" });
    for (index, step) in parsed.sequence().iter().enumerate() {
        println!(
            "step {}: key={} modifiers={}",
            index,
            step.key().unwrap_or("<any>"),
            step.modifiers()
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn run_match(
    settings: &Settings,
    event: &str,
    patterns: &[String],
    case_sensitive: bool,
    platform: Option<Platform>,
) -> Result<ExitCode> {
    let options = match_options(settings, case_sensitive, platform);
    let event = parse_event(event, &options)?;
    if match_any(&event, patterns, &options) {
        println!("match");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("no match");
        Ok(ExitCode::FAILURE)
    }
}

fn run_format(
    settings: &Settings,
    pattern: &str,
    platform: Option<Platform>,
    symbols: bool,
    words: bool,
    separator: Option<String>,
) -> Result<ExitCode> {
    let mut options = settings.format_options();
    if let Some(platform) = platform {
        options.platform = Some(platform);
    }
    if symbols {
        options = options.with_symbols(true);
    } else if words {
        options = options.with_symbols(false);
    }
    if let Some(separator) = separator {
        options = options.with_separator(separator);
    }
    println!("{}", format(pattern, &options));
    Ok(ExitCode::SUCCESS)
}

fn run_replay(
    settings: &Settings,
    patterns: Vec<String>,
    events: &str,
    timeout: Option<u64>,
) -> Result<ExitCode> {
    let options = settings.match_options();
    let timed = events
        .split_whitespace()
        .map(|text| parse_timed_event(text, &options))
        .collect::<Result<Vec<_>>>()?;

    let source = PatternSource::Sequence {
        patterns,
        sequence_timeout_ms: timeout.unwrap_or(settings.sequence_timeout_ms()),
    };

    let clock = ManualClock::new();
    let mut fired = 0usize;
    let mut handler = build_handler_with_clock(
        source,
        |event: &KeyEvent| log::info!("handler fired on {}", event),
        &options,
        Arc::new(clock.clone()),
    );

    for (event, at) in &timed {
        clock.set(*at);
        if handler.poll() {
            println!("{:>6}ms  sequence reset (timeout)", at.as_millis());
        }
        if handler.handle(event) {
            fired += 1;
            println!("{:>6}ms  {}  fired", at.as_millis(), event);
        } else {
            println!(
                "{:>6}ms  {}  (step {})",
                at.as_millis(),
                event,
                handler.progress()
            );
        }
    }

    println!("fired {} time(s)", fired);
    Ok(ExitCode::SUCCESS)
}

fn run_bindings(settings: &Settings) -> Result<ExitCode> {
    if settings.bindings().is_empty() {
        println!("No bindings configured");
        return Ok(ExitCode::SUCCESS);
    }

    let options = settings.format_options();
    for (name, patterns) in settings.bindings() {
        let labels: Vec<String> = patterns.iter().map(|p| format(p, &options)).collect();
        println!("{:<16} {:<24} {}", name, patterns.join(", "), labels.join(", "));
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    let settings = load_settings(args.config.as_ref())?;
    log::debug!("platform: {}", settings.platform());

    match args.command {
        Command::Parse {
            pattern,
            strict,
            case_sensitive,
            platform,
        } => run_parse(&settings, &pattern, strict, case_sensitive, platform),
        Command::Match {
            event,
            patterns,
            case_sensitive,
            platform,
        } => run_match(&settings, &event, &patterns, case_sensitive, platform),
        Command::Format {
            pattern,
            platform,
            symbols,
            words,
            separator,
        } => run_format(&settings, &pattern, platform, symbols, words, separator),
        Command::Replay {
            patterns,
            events,
            timeout,
        } => run_replay(&settings, patterns, &events, timeout),
        Command::Bindings => run_bindings(&settings),
    }
}

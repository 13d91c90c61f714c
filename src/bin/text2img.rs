//! CLI binary for text2img.
//!
//! A thin shim over the library crate: classifies the raw words, applies the
//! argument policy, maps flags onto `ConversionConfig`, and turns the outcome
//! into a process exit status.

use anyhow::{Context, Result};
use clap::parser::ValueSource;
use clap::{CommandFactory, FromArgMatches, Parser};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use text2img::args::{interpret, tokenize, Command, Token};
use text2img::config::{parse_color, DEFAULT_APPROXIMATE_THRESHOLD};
use text2img::{convert, Codepage, ConversionConfig, Destination, ExitStatus, OutputFormat, Text2ImgError};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Render an NFO file next to itself (art.png)
  text2img art.nfo

  # Choose the output format by extension
  text2img readme.txt readme.gif

  # Force an encoding (numeric id or name)
  text2img /C:65001 notes.txt notes.png
  text2img --codepage=koi8-r letter.txt letter.bmp

  # Pipe through standard input and output
  cat build.log | text2img - - --format jpg > build.jpg

  # Larger glyphs, white on black
  text2img --scale 3 --fg white --bg black banner.txt banner.png

  # TrueType face, JSON report
  text2img --font DejaVuSansMono.ttf --size 20 --json code.rs code.png

SWITCHES:
  /?  -?  -h  --help          Show this help (exit status 6)
  /L      -l  --list          List supported codepages (exit status 7)
  /C:id   --codepage=id       Force the input encoding

  Unmarked input is read as codepage 437. A UTF-8 byte-order mark switches
  to UTF-8 unless an encoding is forced.

EXIT STATUS:
  0 success      1 no arguments   2 invalid arguments   3 read error
  4 write error  5 bad codepage   6 help shown          7 list shown
  8 render error

ENVIRONMENT VARIABLES:
  TEXT2IMG_CODEPAGE    Default for --codepage
  TEXT2IMG_FONT        Default for --font
  TEXT2IMG_FG / _BG    Default text / background colour
  RUST_LOG             Log filter (overrides --verbose / --quiet)
"#;

/// Render plain-text files as images in a fixed-pitch font.
#[derive(Parser, Debug)]
#[command(
    name = "text2img",
    version,
    about = "Render plain-text files as PNG, JPEG, BMP or GIF images",
    override_usage = "text2img [OPTIONS] <INPUT|-> [OUTPUT|-]",
    disable_help_flag = true,
    args_override_self = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input file (`-` for stdin), optional output image (`-` for stdout),
    /// and DOS-style switches such as /? /L /C:437.
    #[arg(value_name = "ARGS")]
    args: Vec<String>,

    /// How many positional words precede `--codepage` on the command line.
    #[arg(skip)]
    codepage_position: usize,

    /// Show help.
    #[arg(short = 'h', long = "help")]
    help: bool,

    /// List supported codepages.
    #[arg(short = 'l', long = "list")]
    list: bool,

    /// Input encoding: numeric codepage id or encoding name.
    #[arg(short = 'c', long, env = "TEXT2IMG_CODEPAGE")]
    codepage: Option<String>,

    /// Fixed-pitch TrueType/OpenType font file (default: built-in 8x8 face).
    #[arg(long, env = "TEXT2IMG_FONT")]
    font: Option<PathBuf>,

    /// Pixel size for --font.
    #[arg(long, env = "TEXT2IMG_FONT_SIZE", default_value_t = 16.0)]
    size: f32,

    /// Magnification of the built-in face (1–16).
    #[arg(long, env = "TEXT2IMG_SCALE", default_value_t = 2,
          value_parser = clap::value_parser!(u32).range(1..=16))]
    scale: u32,

    /// Text colour: #RRGGBB, #RRGGBBAA, black, white.
    #[arg(long, env = "TEXT2IMG_FG", default_value = "black")]
    fg: String,

    /// Background colour; `transparent` leaves the canvas clear.
    #[arg(long, env = "TEXT2IMG_BG", default_value = "transparent")]
    bg: String,

    /// Image format when writing to standard output.
    #[arg(long, env = "TEXT2IMG_FORMAT", value_enum)]
    format: Option<FormatArg>,

    /// Cell count on either axis above which sizing is extrapolated.
    #[arg(long, env = "TEXT2IMG_THRESHOLD", default_value_t = DEFAULT_APPROXIMATE_THRESHOLD)]
    threshold: usize,

    /// JPEG quality (1–100).
    #[arg(long, env = "TEXT2IMG_JPEG_QUALITY", default_value_t = 90,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Print a JSON conversion report.
    #[arg(long, env = "TEXT2IMG_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "TEXT2IMG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "TEXT2IMG_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Png,
    #[value(alias = "jpeg")]
    Jpg,
    Bmp,
    Gif,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Jpg => OutputFormat::Jpeg,
            FormatArg::Bmp => OutputFormat::Bmp,
            FormatArg::Gif => OutputFormat::Gif,
        }
    }
}

/// Parse `argv`, accepting `-?` as a help switch and recording where
/// `--codepage` sat among the positional words.
fn parse_cli<I, T>(argv: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let argv = argv.into_iter().map(|a| {
        let a = a.into();
        if a == "-?" {
            "-h".to_string()
        } else {
            a
        }
    });
    let matches = Cli::command().try_get_matches_from(argv)?;
    let mut cli = Cli::from_arg_matches(&matches)?;

    if matches.value_source("codepage") == Some(ValueSource::CommandLine) {
        if let Some(flag_at) = matches.index_of("codepage") {
            cli.codepage_position = matches
                .indices_of("args")
                .map(|indices| indices.filter(|&i| i < flag_at).count())
                .unwrap_or(0);
        }
    }
    Ok(cli)
}

fn main() -> ExitCode {
    let cli = match parse_cli(std::env::args()) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                clap::error::ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(ExitStatus::InvalidArgs.code()),
            };
        }
    };

    // ── Logging setup ────────────────────────────────────────────────────
    // stderr only: stdout may carry image bytes.
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(status) => ExitCode::from(status.code()),
        Err(err) => {
            let status = err
                .downcast_ref::<Text2ImgError>()
                .map(Text2ImgError::exit_status)
                .unwrap_or(ExitStatus::InvalidArgs);
            eprintln!("text2img: {err:#}");
            if status == ExitStatus::NoArgs {
                print_usage();
            }
            ExitCode::from(status.code())
        }
    }
}

fn run(cli: &Cli) -> Result<ExitStatus> {
    let tokens = command_tokens(cli);

    let job = match interpret(&tokens, cli.format.map(OutputFormat::from))? {
        Command::Help => {
            print_help();
            return Ok(ExitStatus::HelpRequest);
        }
        Command::ListCodepages => {
            print_codepages();
            return Ok(ExitStatus::ListRequest);
        }
        Command::Convert(job) => job,
    };

    let config = build_config(cli)?;
    let report = convert(&job, &config)?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        // Keep stdout clean when it carries the image.
        if job.destination == Destination::Stdout {
            eprintln!("{json}");
        } else {
            println!("{json}");
        }
    } else if !cli.quiet {
        if let Destination::File(ref path) = job.destination {
            eprintln!(
                "{}  {}x{} px  {}  →  {}",
                green("✔"),
                report.canvas.width,
                report.canvas.height,
                dim(&format!("{}, {:?}", report.encoding.codepage, report.strategy)),
                bold(&path.display().to_string()),
            );
        }
    }

    Ok(ExitStatus::Success)
}

/// Positional words plus flag-borne switches, in command-line order.
fn command_tokens(cli: &Cli) -> Vec<Token> {
    let mut tokens = tokenize(&cli.args);
    // A codepage from the environment alone is not a request to convert.
    if !tokens.is_empty() || cli.help || cli.list {
        if let Some(ref cp) = cli.codepage {
            let at = cli.codepage_position.min(tokens.len());
            tokens.insert(at, Token::Codepage(cp.clone()));
        }
    }
    if cli.help {
        tokens.push(Token::Help);
    }
    if cli.list {
        tokens.push(Token::List);
    }
    tokens
}

/// Map CLI flags to `ConversionConfig`.
fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .foreground(parse_color(&cli.fg)?)
        .background(parse_color(&cli.bg)?)
        .approximate_threshold(cli.threshold)
        .jpeg_quality(cli.quality);

    builder = match cli.font {
        Some(ref path) => builder.truetype_font(path, cli.size),
        None => builder.builtin_font(cli.scale),
    };

    Ok(builder.build()?)
}

fn print_usage() {
    let mut cmd = Cli::command();
    eprintln!("{}", cmd.render_usage());
}

fn print_help() {
    let mut cmd = Cli::command();
    eprintln!("{}", cmd.render_long_help());
}

fn print_codepages() {
    let mut err = io::stderr().lock();
    let _ = writeln!(err, "{:>6}  {:<16}  DESCRIPTION", "ID", "NAME");
    for cp in Codepage::all() {
        let _ = writeln!(err, "{:>6}  {:<16}  {}", cp.id(), cp.name(), cp.description());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use text2img::args::Job;

    fn job(argv: &[&str]) -> Job {
        let cli = parse_cli(argv.iter().copied()).expect("parse");
        match interpret(&command_tokens(&cli), cli.format.map(OutputFormat::from)) {
            Ok(Command::Convert(job)) => job,
            other => panic!("expected a conversion, got {other:?}"),
        }
    }

    #[test]
    fn flags_after_stream_sentinels_still_parse() {
        let cli = Cli::try_parse_from(["text2img", "-", "-", "--format", "gif"]).unwrap();
        assert!(matches!(cli.format, Some(FormatArg::Gif)));
        assert_eq!(cli.args, vec!["-", "-"]);

        let j = job(&["text2img", "-", "-", "--format", "gif"]);
        assert_eq!(j.format, OutputFormat::Gif);
        assert_eq!(j.destination, Destination::Stdout);
    }

    #[test]
    fn flags_after_paths_still_parse() {
        let cli = parse_cli(["text2img", "h.txt", "h.png", "--scale", "3", "-q", "--json"]).unwrap();
        assert_eq!(cli.args, vec!["h.txt", "h.png"]);
        assert_eq!(cli.scale, 3);
        assert!(cli.quiet && cli.json);
    }

    #[test]
    fn dos_and_unix_help_switches() {
        for argv in [["text2img", "-?"], ["text2img", "/?"], ["text2img", "--help"]] {
            let cli = parse_cli(argv).unwrap();
            assert_eq!(interpret(&command_tokens(&cli), None).unwrap(), Command::Help);
        }
        let cli = parse_cli(["text2img", "a.txt", "/L"]).unwrap();
        assert_eq!(interpret(&command_tokens(&cli), None).unwrap(), Command::ListCodepages);
    }

    #[test]
    fn last_codepage_switch_wins_across_flag_and_dos_forms() {
        let j = job(&["text2img", "/C:437", "a.txt", "--codepage=utf-8"]);
        assert!(j.codepage.unwrap().is_utf8());

        let j = job(&["text2img", "--codepage", "utf-8", "a.txt", "/C:437"]);
        assert_eq!(j.codepage.unwrap().id(), 437);

        let j = job(&["text2img", "-c", "1252", "-c", "koi8-r", "a.txt"]);
        assert_eq!(j.codepage.unwrap().id(), 20866);
    }

    #[test]
    fn invalid_config_message_is_not_doubled() {
        let cli = parse_cli(["text2img", "--font", "mono.ttf", "--size", "1", "a.txt"]).unwrap();
        let msg = format!("{:#}", build_config(&cli).unwrap_err());
        assert_eq!(msg.matches("Invalid configuration").count(), 1, "{msg}");
    }
}

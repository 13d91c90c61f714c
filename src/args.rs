//! Argument policy: raw command-line words → a [`Command`].
//!
//! Parsing is split in two passes. [`tokenize`] classifies each word without
//! looking at its neighbours; [`interpret`] then applies the rules to the
//! token list as a whole:
//!
//! 1. no tokens at all is [`Text2ImgError::NoArguments`];
//! 2. any help token wins over everything, then any list token;
//! 3. codepage values resolve, the last one winning;
//! 4. the first path is the input, the second the output, a third is an error;
//! 5. the output extension must name a supported image format;
//! 6. a missing output is derived from the input.
//!
//! Both DOS-style (`/?`, `/L`, `/C:1252`) and Unix-style (`-h`, `--list`,
//! `--codepage=1252`) switches are recognised, case-insensitively.

use crate::error::Text2ImgError;
use crate::pipeline::encode::OutputFormat;
use crate::pipeline::encoding::Codepage;
use crate::pipeline::input::Source;
use crate::pipeline::sink::Destination;
use std::path::PathBuf;

/// One classified command-line word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Help,
    List,
    /// A codepage id or name, not yet resolved.
    Codepage(String),
    /// Input or output; `-` is the standard stream sentinel.
    Path(String),
}

/// What the caller asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    ListCodepages,
    Convert(Job),
}

/// A fully validated conversion request.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub source: Source,
    pub destination: Destination,
    pub format: OutputFormat,
    /// Explicit codepage; `None` lets the resolver detect a BOM.
    pub codepage: Option<Codepage>,
}

impl Job {
    /// A job with no forced codepage; the format follows `destination`.
    pub fn new(source: Source, destination: Destination) -> Result<Self, Text2ImgError> {
        let format = format_for(&destination, None)?;
        Ok(Self {
            source,
            destination,
            format,
            codepage: None,
        })
    }

    pub fn with_codepage(mut self, codepage: Codepage) -> Self {
        self.codepage = Some(codepage);
        self
    }
}

/// Classify a single word.
pub fn classify(word: &str) -> Token {
    let lower = word.to_ascii_lowercase();
    match lower.as_str() {
        "/?" | "-?" | "-h" | "--help" => return Token::Help,
        "/l" | "-l" | "--list" => return Token::List,
        _ => {}
    }
    for prefix in ["/c:", "--codepage="] {
        if lower.starts_with(prefix) {
            return Token::Codepage(word[prefix.len()..].to_string());
        }
    }
    Token::Path(word.to_string())
}

/// Classify every word in order.
pub fn tokenize<I, S>(words: I) -> Vec<Token>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    words.into_iter().map(|w| classify(w.as_ref())).collect()
}

/// Apply the argument policy to `tokens`.
///
/// `format_override` only applies when the image goes to standard output;
/// a named output file is always encoded per its extension.
pub fn interpret(
    tokens: &[Token],
    format_override: Option<OutputFormat>,
) -> Result<Command, Text2ImgError> {
    if tokens.is_empty() {
        return Err(Text2ImgError::NoArguments);
    }
    if tokens.contains(&Token::Help) {
        return Ok(Command::Help);
    }
    if tokens.contains(&Token::List) {
        return Ok(Command::ListCodepages);
    }

    let mut codepage = None;
    let mut paths = Vec::new();
    for token in tokens {
        match token {
            Token::Codepage(value) if value.trim().is_empty() => {
                return Err(Text2ImgError::InvalidArguments {
                    reason: "codepage switch needs a value (e.g. /C:1252)".into(),
                });
            }
            Token::Codepage(value) => codepage = Some(Codepage::lookup(value.trim())?),
            Token::Path(p) => paths.push(p.as_str()),
            Token::Help | Token::List => {}
        }
    }

    let (input, output) = match paths.as_slice() {
        [] => {
            return Err(Text2ImgError::InvalidArguments {
                reason: "no input file given".into(),
            })
        }
        [input] => (*input, None),
        [input, output] => (*input, Some(*output)),
        [_, _, extra, ..] => {
            return Err(Text2ImgError::TooManyArguments {
                extra: (*extra).to_string(),
            })
        }
    };

    let source = Source::parse(input);
    let destination = match output {
        Some("-") => Destination::Stdout,
        Some(path) => Destination::File(PathBuf::from(path)),
        None => auto_destination(&source),
    };
    let format = format_for(&destination, format_override)?;

    Ok(Command::Convert(Job {
        source,
        destination,
        format,
        codepage,
    }))
}

/// Output for a run without an explicit destination: the input path with a
/// `.png` extension, or standard output when reading standard input.
pub fn auto_destination(source: &Source) -> Destination {
    match source {
        Source::File(path) => Destination::File(path.with_extension(OutputFormat::Png.extension())),
        Source::Stdin => Destination::Stdout,
    }
}

fn format_for(
    destination: &Destination,
    format_override: Option<OutputFormat>,
) -> Result<OutputFormat, Text2ImgError> {
    match destination {
        Destination::Stdout => Ok(format_override.unwrap_or(OutputFormat::Png)),
        Destination::File(path) => {
            OutputFormat::from_path(path).ok_or_else(|| Text2ImgError::UnsupportedOutputFormat {
                path: path.clone(),
            })
        }
    }
}

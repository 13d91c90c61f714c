//! Line-break normalisation: every CR, LF and CRLF becomes CRLF.
//!
//! The substitutions run in a fixed order so that no break is rewritten
//! twice: CRLF collapses to a lone CR first, then every LF joins it as CR,
//! and only then is each CR expanded back to CRLF.

const CR: &str = "\r";
const LF: &str = "\n";
const CRLF: &str = "\r\n";

/// Text whose only line break is CRLF. Only [`normalize`] constructs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lines split on CRLF. A trailing CRLF does not open an extra line.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        split_lines(&self.0)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Rewrite all line breaks in `text` to CRLF.
pub fn normalize(text: &str) -> NormalizedText {
    let collapsed = text.replace(CRLF, CR).replace(LF, CR);
    NormalizedText(collapsed.replace(CR, CRLF))
}

/// Split CRLF-delimited text into lines, ignoring one trailing terminator.
pub(crate) fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let body = text.strip_suffix(CRLF).unwrap_or(text);
    // "" has no lines; "\r\n" has one empty line.
    let skip_all = text.is_empty();
    body.split(CRLF).filter(move |_| !skip_all)
}

//! Encoding resolution: pick the codepage for the input and decode it.
//!
//! A caller-supplied codepage is used verbatim. Without one, the configured
//! default (codepage 437 unless changed) applies, except that a UTF-8
//! byte-order mark at the very start switches decoding to UTF-8. Detection
//! looks at the raw byte slice, so the decoder always sees the full input.

use crate::error::Text2ImgError;
use crate::pipeline::cp437;
use encoding_rs::Encoding;
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

/// The UTF-8 byte-order mark.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// How bytes of a codepage become characters.
#[derive(Clone, Copy)]
enum Codec {
    /// Built-in IBM PC table.
    Cp437,
    /// Any encoding known to `encoding_rs`.
    Standard(&'static Encoding),
}

/// A byte-to-text encoding, identified by a numeric id and a name.
#[derive(Clone, Copy)]
pub struct Codepage {
    id: u16,
    name: &'static str,
    description: &'static str,
    codec: Codec,
}

const fn cp(id: u16, name: &'static str, description: &'static str, enc: &'static Encoding) -> Codepage {
    Codepage {
        id,
        name,
        description,
        codec: Codec::Standard(enc),
    }
}

static REGISTRY: &[Codepage] = &[
    Codepage {
        id: 437,
        name: "IBM437",
        description: "OEM United States",
        codec: Codec::Cp437,
    },
    cp(866, "cp866", "Cyrillic (DOS)", &encoding_rs::IBM866_INIT),
    cp(874, "windows-874", "Thai (Windows)", &encoding_rs::WINDOWS_874_INIT),
    cp(932, "shift_jis", "Japanese (Shift-JIS)", &encoding_rs::SHIFT_JIS_INIT),
    cp(936, "gb2312", "Chinese Simplified (GB2312)", &encoding_rs::GBK_INIT),
    cp(949, "ks_c_5601-1987", "Korean", &encoding_rs::EUC_KR_INIT),
    cp(950, "big5", "Chinese Traditional (Big5)", &encoding_rs::BIG5_INIT),
    cp(1200, "utf-16", "Unicode (UTF-16 little endian)", &encoding_rs::UTF_16LE_INIT),
    cp(1201, "utf-16BE", "Unicode (UTF-16 big endian)", &encoding_rs::UTF_16BE_INIT),
    cp(1250, "windows-1250", "Central European (Windows)", &encoding_rs::WINDOWS_1250_INIT),
    cp(1251, "windows-1251", "Cyrillic (Windows)", &encoding_rs::WINDOWS_1251_INIT),
    cp(1252, "windows-1252", "Western European (Windows)", &encoding_rs::WINDOWS_1252_INIT),
    cp(1253, "windows-1253", "Greek (Windows)", &encoding_rs::WINDOWS_1253_INIT),
    cp(1254, "windows-1254", "Turkish (Windows)", &encoding_rs::WINDOWS_1254_INIT),
    cp(1255, "windows-1255", "Hebrew (Windows)", &encoding_rs::WINDOWS_1255_INIT),
    cp(1256, "windows-1256", "Arabic (Windows)", &encoding_rs::WINDOWS_1256_INIT),
    cp(1257, "windows-1257", "Baltic (Windows)", &encoding_rs::WINDOWS_1257_INIT),
    cp(1258, "windows-1258", "Vietnamese (Windows)", &encoding_rs::WINDOWS_1258_INIT),
    cp(10000, "macintosh", "Western European (Mac)", &encoding_rs::MACINTOSH_INIT),
    cp(10007, "x-mac-cyrillic", "Cyrillic (Mac)", &encoding_rs::X_MAC_CYRILLIC_INIT),
    cp(20866, "koi8-r", "Cyrillic (KOI8-R)", &encoding_rs::KOI8_R_INIT),
    cp(21866, "koi8-u", "Cyrillic (KOI8-U)", &encoding_rs::KOI8_U_INIT),
    cp(28592, "iso-8859-2", "Central European (ISO)", &encoding_rs::ISO_8859_2_INIT),
    cp(28593, "iso-8859-3", "Latin 3 (ISO)", &encoding_rs::ISO_8859_3_INIT),
    cp(28594, "iso-8859-4", "Baltic (ISO)", &encoding_rs::ISO_8859_4_INIT),
    cp(28595, "iso-8859-5", "Cyrillic (ISO)", &encoding_rs::ISO_8859_5_INIT),
    cp(28596, "iso-8859-6", "Arabic (ISO)", &encoding_rs::ISO_8859_6_INIT),
    cp(28597, "iso-8859-7", "Greek (ISO)", &encoding_rs::ISO_8859_7_INIT),
    cp(28598, "iso-8859-8", "Hebrew (ISO-Visual)", &encoding_rs::ISO_8859_8_INIT),
    cp(28603, "iso-8859-13", "Estonian (ISO)", &encoding_rs::ISO_8859_13_INIT),
    cp(28605, "iso-8859-15", "Latin 9 (ISO)", &encoding_rs::ISO_8859_15_INIT),
    cp(38598, "iso-8859-8-i", "Hebrew (ISO-Logical)", &encoding_rs::ISO_8859_8_I_INIT),
    cp(50220, "iso-2022-jp", "Japanese (JIS)", &encoding_rs::ISO_2022_JP_INIT),
    cp(51932, "euc-jp", "Japanese (EUC)", &encoding_rs::EUC_JP_INIT),
    cp(51949, "euc-kr", "Korean (EUC)", &encoding_rs::EUC_KR_INIT),
    cp(54936, "GB18030", "Chinese Simplified (GB18030)", &encoding_rs::GB18030_INIT),
    cp(65001, "utf-8", "Unicode (UTF-8)", &encoding_rs::UTF_8_INIT),
];

impl Codepage {
    /// Codepage 437, the assumed encoding of unmarked input.
    pub fn oem_default() -> Codepage {
        REGISTRY[0]
    }

    /// UTF-8 (65001).
    pub fn utf8() -> Codepage {
        Self::from_id(65001)
            .unwrap_or_else(|| cp(65001, "utf-8", "Unicode (UTF-8)", encoding_rs::UTF_8))
    }

    /// Every codepage that can be selected by numeric id.
    pub fn all() -> impl Iterator<Item = Codepage> {
        REGISTRY.iter().copied()
    }

    /// Look up a codepage by numeric id.
    pub fn from_id(id: u16) -> Option<Codepage> {
        REGISTRY.iter().copied().find(|c| c.id == id)
    }

    /// Resolve a user-supplied identifier: a numeric id, a registry name,
    /// an OEM alias, or any WHATWG encoding label.
    pub fn lookup(identifier: &str) -> Result<Codepage, Text2ImgError> {
        let ident = identifier.trim();
        let unknown = || Text2ImgError::InvalidEncoding {
            name: identifier.to_string(),
        };
        if ident.is_empty() {
            return Err(unknown());
        }

        if ident.bytes().all(|b| b.is_ascii_digit()) {
            return ident
                .parse::<u16>()
                .ok()
                .and_then(Self::from_id)
                .ok_or_else(unknown);
        }

        if ["cp437", "ibm437", "oem", "ibm-pc", "dos"]
            .iter()
            .any(|alias| alias.eq_ignore_ascii_case(ident))
        {
            return Ok(Self::oem_default());
        }

        if let Some(found) = REGISTRY.iter().find(|c| c.name.eq_ignore_ascii_case(ident)) {
            return Ok(*found);
        }

        let encoding = Encoding::for_label(ident.as_bytes()).ok_or_else(unknown)?;
        // Labels like "iso-2022-kr" resolve to the replacement encoding,
        // which decodes everything to a single U+FFFD.
        if encoding == encoding_rs::REPLACEMENT {
            return Err(unknown());
        }
        Ok(REGISTRY
            .iter()
            .copied()
            .find(|c| matches!(c.codec, Codec::Standard(e) if e == encoding))
            .unwrap_or_else(|| cp(0, encoding.name(), "WHATWG encoding", encoding)))
    }

    /// Numeric id; 0 for encodings only reachable by label.
    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn is_utf8(&self) -> bool {
        matches!(self.codec, Codec::Standard(e) if e == encoding_rs::UTF_8)
    }

    /// Decode `bytes`, stripping a byte-order mark that belongs to this
    /// encoding. Invalid sequences become U+FFFD; the flag reports whether
    /// any were replaced.
    pub fn decode(&self, bytes: &[u8]) -> (String, bool) {
        match self.codec {
            Codec::Cp437 => (cp437::decode(bytes), false),
            Codec::Standard(encoding) => {
                let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
                (text.into_owned(), had_errors)
            }
        }
    }
}

impl PartialEq for Codepage {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name
    }
}

impl Eq for Codepage {}

impl fmt::Debug for Codepage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Codepage({} {})", self.id, self.name)
    }
}

impl fmt::Display for Codepage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.id == 0 {
            f.write_str(self.name)
        } else {
            write!(f, "{} ({})", self.name, self.id)
        }
    }
}

/// The encoding actually used for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingSpec {
    pub codepage: Codepage,
    /// Supplied by the caller; disables BOM detection.
    pub forced: bool,
    /// A UTF-8 BOM switched decoding away from the default.
    pub bom_detected: bool,
}

impl Serialize for EncodingSpec {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("EncodingSpec", 4)?;
        s.serialize_field("codepage", &self.codepage.id)?;
        s.serialize_field("name", self.codepage.name)?;
        s.serialize_field("forced", &self.forced)?;
        s.serialize_field("bom_detected", &self.bom_detected)?;
        s.end()
    }
}

/// The logical document after decoding. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText(String);

impl DecodedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// True when the first three bytes are exactly the UTF-8 BOM. Inputs shorter
/// than three bytes never match.
pub fn has_utf8_bom(bytes: &[u8]) -> bool {
    bytes.get(..UTF8_BOM.len()) == Some(&UTF8_BOM[..])
}

/// Decide the encoding of `bytes` and decode them.
///
/// `user` is the caller's explicit choice (forced, no detection). Without
/// it, `default` applies unless a UTF-8 BOM is present and `default` is not
/// already UTF-8.
pub fn resolve(bytes: &[u8], user: Option<Codepage>, default: Codepage) -> (EncodingSpec, DecodedText) {
    let spec = match user {
        Some(codepage) => EncodingSpec {
            codepage,
            forced: true,
            bom_detected: false,
        },
        None if !default.is_utf8() && has_utf8_bom(bytes) => EncodingSpec {
            codepage: Codepage::utf8(),
            forced: false,
            bom_detected: true,
        },
        None => EncodingSpec {
            codepage: default,
            forced: false,
            bom_detected: false,
        },
    };
    debug!(
        "Decoding {} bytes as {} (forced={}, bom={})",
        bytes.len(),
        spec.codepage,
        spec.forced,
        spec.bom_detected
    );

    let (text, had_errors) = spec.codepage.decode(bytes);
    if had_errors {
        warn!(
            "Input contains byte sequences invalid in {}; replaced with U+FFFD",
            spec.codepage
        );
    }
    (spec, DecodedText(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_switches_default_to_utf8() {
        let bytes = b"\xEF\xBB\xBFgr\xC3\xBC\xC3\x9F";
        let (spec, text) = resolve(bytes, None, Codepage::oem_default());
        assert!(spec.codepage.is_utf8());
        assert!(spec.bom_detected);
        assert!(!spec.forced);
        assert_eq!(text.as_str(), "grüß");
    }

    #[test]
    fn forced_encoding_skips_bom_detection() {
        let bytes = b"\xEF\xBB\xBFA";
        let (spec, text) = resolve(bytes, Some(Codepage::oem_default()), Codepage::oem_default());
        assert!(spec.forced);
        assert!(!spec.codepage.is_utf8());
        assert_eq!(text.as_str(), "∩╗┐A");
    }

    #[test]
    fn short_input_falls_back_to_default() {
        for bytes in [&b""[..], b"\xEF", b"\xEF\xBB"] {
            let (spec, text) = resolve(bytes, None, Codepage::oem_default());
            assert_eq!(spec.codepage.id(), 437);
            assert!(!spec.bom_detected);
            assert_eq!(text.as_str().chars().count(), bytes.len());
        }
    }

    #[test]
    fn no_bom_uses_default() {
        let (spec, text) = resolve(b"\xC9\xCD\xBB", None, Codepage::oem_default());
        assert_eq!(spec.codepage.id(), 437);
        assert_eq!(text.as_str(), "╔═╗");
    }

    #[test]
    fn utf8_default_keeps_utf8_and_strips_bom() {
        let (spec, text) = resolve(b"\xEF\xBB\xBFok", None, Codepage::utf8());
        assert!(!spec.bom_detected);
        assert!(spec.codepage.is_utf8());
        assert_eq!(text.as_str(), "ok");
    }

    #[test]
    fn lookup_by_id_name_and_label() {
        assert_eq!(Codepage::lookup("437").unwrap().id(), 437);
        assert_eq!(Codepage::lookup("cp437").unwrap().id(), 437);
        assert_eq!(Codepage::lookup("65001").unwrap().name(), "utf-8");
        assert_eq!(Codepage::lookup("UTF-8").unwrap().id(), 65001);
        assert_eq!(Codepage::lookup("Windows-1252").unwrap().id(), 1252);
        assert_eq!(Codepage::lookup("latin1").unwrap().id(), 1252);
        assert_eq!(Codepage::lookup("ibm866").unwrap().id(), 866);
    }

    #[test]
    fn lookup_rejects_unknown_identifiers() {
        for bad in ["", "12", "99999", "klingon", "iso-2022-kr", "-5"] {
            let err = Codepage::lookup(bad).unwrap_err();
            assert!(
                matches!(err, Text2ImgError::InvalidEncoding { .. }),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn decode_replaces_invalid_utf8() {
        let (text, had_errors) = Codepage::utf8().decode(b"a\xFFb");
        assert!(had_errors);
        assert_eq!(text, "a\u{FFFD}b");
    }

    #[test]
    fn registry_ids_are_unique() {
        let mut ids: Vec<u16> = Codepage::all().map(|c| c.id()).collect();
        let len = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), len);
    }
}

//! IBM PC codepage 437 (OEM United States).
//!
//! The lower half is ASCII with control codes kept as controls, so CR/LF
//! survive decoding and reach the line normaliser untouched.

/// Upper half of codepage 437, bytes `0x80..=0xFF`.
pub const CP437_UPPER: [char; 128] = [
    '\u{00C7}', '\u{00FC}', '\u{00E9}', '\u{00E2}', // 0x80
    '\u{00E4}', '\u{00E0}', '\u{00E5}', '\u{00E7}', // 0x84
    '\u{00EA}', '\u{00EB}', '\u{00E8}', '\u{00EF}', // 0x88
    '\u{00EE}', '\u{00EC}', '\u{00C4}', '\u{00C5}', // 0x8C
    '\u{00C9}', '\u{00E6}', '\u{00C6}', '\u{00F4}', // 0x90
    '\u{00F6}', '\u{00F2}', '\u{00FB}', '\u{00F9}', // 0x94
    '\u{00FF}', '\u{00D6}', '\u{00DC}', '\u{00A2}', // 0x98
    '\u{00A3}', '\u{00A5}', '\u{20A7}', '\u{0192}', // 0x9C
    '\u{00E1}', '\u{00ED}', '\u{00F3}', '\u{00FA}', // 0xA0
    '\u{00F1}', '\u{00D1}', '\u{00AA}', '\u{00BA}', // 0xA4
    '\u{00BF}', '\u{2310}', '\u{00AC}', '\u{00BD}', // 0xA8
    '\u{00BC}', '\u{00A1}', '\u{00AB}', '\u{00BB}', // 0xAC
    '\u{2591}', '\u{2592}', '\u{2593}', '\u{2502}', // 0xB0
    '\u{2524}', '\u{2561}', '\u{2562}', '\u{2556}', // 0xB4
    '\u{2555}', '\u{2563}', '\u{2551}', '\u{2557}', // 0xB8
    '\u{255D}', '\u{255C}', '\u{255B}', '\u{2510}', // 0xBC
    '\u{2514}', '\u{2534}', '\u{252C}', '\u{251C}', // 0xC0
    '\u{2500}', '\u{253C}', '\u{255E}', '\u{255F}', // 0xC4
    '\u{255A}', '\u{2554}', '\u{2569}', '\u{2566}', // 0xC8
    '\u{2560}', '\u{2550}', '\u{256C}', '\u{2567}', // 0xCC
    '\u{2568}', '\u{2564}', '\u{2565}', '\u{2559}', // 0xD0
    '\u{2558}', '\u{2552}', '\u{2553}', '\u{256B}', // 0xD4
    '\u{256A}', '\u{2518}', '\u{250C}', '\u{2588}', // 0xD8
    '\u{2584}', '\u{258C}', '\u{2590}', '\u{2580}', // 0xDC
    '\u{03B1}', '\u{00DF}', '\u{0393}', '\u{03C0}', // 0xE0
    '\u{03A3}', '\u{03C3}', '\u{00B5}', '\u{03C4}', // 0xE4
    '\u{03A6}', '\u{0398}', '\u{03A9}', '\u{03B4}', // 0xE8
    '\u{221E}', '\u{03C6}', '\u{03B5}', '\u{2229}', // 0xEC
    '\u{2261}', '\u{00B1}', '\u{2265}', '\u{2264}', // 0xF0
    '\u{2320}', '\u{2321}', '\u{00F7}', '\u{2248}', // 0xF4
    '\u{00B0}', '\u{2219}', '\u{00B7}', '\u{221A}', // 0xF8
    '\u{207F}', '\u{00B2}', '\u{25A0}', '\u{00A0}', // 0xFC
];

/// Decode one byte.
pub fn decode_byte(byte: u8) -> char {
    if byte < 0x80 {
        char::from(byte)
    } else {
        CP437_UPPER[usize::from(byte - 0x80)]
    }
}

/// Decode a full buffer. Every byte maps to exactly one character.
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().copied().map(decode_byte).collect()
}

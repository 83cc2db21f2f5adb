//! Text encoding detection for exported TSV files
//!
//! Exports come from different tools: some write UTF-16 with a byte order mark,
//! some plain UTF-8. The encoding is sniffed from the first bytes and, when
//! loading under it fails, the remaining candidates are tried in a fixed order.

use crate::services::metrics_analyzer::loader::error::{LoadError, LoadResult};

const BOM_UTF16_LE: &[u8] = &[0xFF, 0xFE];
const BOM_UTF16_BE: &[u8] = &[0xFE, 0xFF];
const BOM_UTF8: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Supported text encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    /// UTF-8 prefixed with a byte order mark
    Utf8Bom,
    Utf16Le,
    Utf16Be,
    Latin1,
}

impl TextEncoding {
    /// Order in which encodings are retried after the detected one fails
    pub const FALLBACKS: [TextEncoding; 4] =
        [Self::Utf8, Self::Utf16Le, Self::Utf16Be, Self::Latin1];

    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf8Bom => "utf-8-sig",
            Self::Utf16Le => "utf-16le",
            Self::Utf16Be => "utf-16be",
            Self::Latin1 => "latin1",
        }
    }

    /// Detect encoding from a byte order mark in the first 4 bytes, defaulting to UTF-8
    pub fn detect(bytes: &[u8]) -> Self {
        let head = &bytes[..bytes.len().min(4)];

        if head.starts_with(BOM_UTF16_LE) {
            Self::Utf16Le
        } else if head.starts_with(BOM_UTF16_BE) {
            Self::Utf16Be
        } else if head.starts_with(BOM_UTF8) {
            Self::Utf8Bom
        } else {
            Self::Utf8
        }
    }

    /// Decode raw bytes, dropping a leading byte order mark
    pub fn decode(self, bytes: &[u8]) -> LoadResult<String> {
        match self {
            Self::Utf8 | Self::Utf8Bom => {
                let text = std::str::from_utf8(bytes).map_err(|e| self.error(e.to_string()))?;
                Ok(text.strip_prefix('\u{FEFF}').unwrap_or(text).to_string())
            },
            Self::Utf16Le => self.decode_utf16(bytes, u16::from_le_bytes),
            Self::Utf16Be => self.decode_utf16(bytes, u16::from_be_bytes),
            Self::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }

    fn decode_utf16(self, bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> LoadResult<String> {
        if bytes.len() % 2 != 0 {
            return Err(self.error(format!("odd byte length {}", bytes.len())));
        }

        let units = bytes.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));
        let text = char::decode_utf16(units)
            .collect::<Result<String, _>>()
            .map_err(|e| self.error(e.to_string()))?;

        Ok(text.strip_prefix('\u{FEFF}').map(str::to_string).unwrap_or(text))
    }

    fn error(self, reason: String) -> LoadError {
        LoadError::Decode { encoding: self.name(), reason }
    }
}

/// Run `load` under the detected encoding, then under each fallback.
///
/// Returns the first success. When every attempt fails, the error from the
/// detected encoding is surfaced.
pub fn load_with_fallback<T>(
    bytes: &[u8],
    mut load: impl FnMut(&str) -> LoadResult<T>,
) -> LoadResult<T> {
    let detected = TextEncoding::detect(bytes);
    tracing::debug!("Detected encoding: {}", detected.name());

    let original_error = match detected.decode(bytes).and_then(|text| load(&text)) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    for encoding in TextEncoding::FALLBACKS.into_iter().filter(|e| *e != detected) {
        match encoding.decode(bytes).and_then(|text| load(&text)) {
            Ok(value) => {
                tracing::debug!("Loaded with fallback encoding {}", encoding.name());
                return Ok(value);
            },
            Err(e) => tracing::debug!("Fallback encoding {} failed: {}", encoding.name(), e),
        }
    }

    Err(original_error)
}

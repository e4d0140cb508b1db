//! Supported recognition and translation languages.
//!
//! Both tables are closed sets: a request naming anything else is rejected
//! with [`MediaDocError::UnsupportedLanguage`] instead of silently falling
//! back to English.

use crate::error::MediaDocError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Locale the speech-to-text engine should listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SourceLanguage {
    #[default]
    #[serde(rename = "en-US")]
    EnglishUs,
    #[serde(rename = "en-GB")]
    EnglishUk,
    #[serde(rename = "hi-IN")]
    Hindi,
    #[serde(rename = "ta-IN")]
    Tamil,
    #[serde(rename = "te-IN")]
    Telugu,
    #[serde(rename = "bn-IN")]
    Bengali,
    #[serde(rename = "mr-IN")]
    Marathi,
    #[serde(rename = "gu-IN")]
    Gujarati,
    #[serde(rename = "pa-IN")]
    Punjabi,
    #[serde(rename = "ml-IN")]
    Malayalam,
    #[serde(rename = "kn-IN")]
    Kannada,
    #[serde(rename = "ur-IN")]
    Urdu,
}

impl SourceLanguage {
    pub const ALL: [SourceLanguage; 12] = [
        SourceLanguage::EnglishUs,
        SourceLanguage::EnglishUk,
        SourceLanguage::Hindi,
        SourceLanguage::Tamil,
        SourceLanguage::Telugu,
        SourceLanguage::Bengali,
        SourceLanguage::Marathi,
        SourceLanguage::Gujarati,
        SourceLanguage::Punjabi,
        SourceLanguage::Malayalam,
        SourceLanguage::Kannada,
        SourceLanguage::Urdu,
    ];

    /// BCP-47 locale code, e.g. `hi-IN`.
    pub fn code(self) -> &'static str {
        match self {
            SourceLanguage::EnglishUs => "en-US",
            SourceLanguage::EnglishUk => "en-GB",
            SourceLanguage::Hindi => "hi-IN",
            SourceLanguage::Tamil => "ta-IN",
            SourceLanguage::Telugu => "te-IN",
            SourceLanguage::Bengali => "bn-IN",
            SourceLanguage::Marathi => "mr-IN",
            SourceLanguage::Gujarati => "gu-IN",
            SourceLanguage::Punjabi => "pa-IN",
            SourceLanguage::Malayalam => "ml-IN",
            SourceLanguage::Kannada => "kn-IN",
            SourceLanguage::Urdu => "ur-IN",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SourceLanguage::EnglishUs => "English (US)",
            SourceLanguage::EnglishUk => "English (UK)",
            SourceLanguage::Hindi => "Hindi",
            SourceLanguage::Tamil => "Tamil",
            SourceLanguage::Telugu => "Telugu",
            SourceLanguage::Bengali => "Bengali",
            SourceLanguage::Marathi => "Marathi",
            SourceLanguage::Gujarati => "Gujarati",
            SourceLanguage::Punjabi => "Punjabi",
            SourceLanguage::Malayalam => "Malayalam",
            SourceLanguage::Kannada => "Kannada",
            SourceLanguage::Urdu => "Urdu",
        }
    }

    /// Two-letter ISO 639-1 prefix of the locale (`hi-IN` → `hi`).
    ///
    /// Whisper-style APIs take the bare language, not the region.
    pub fn iso_639_1(self) -> &'static str {
        let code = self.code();
        code.split_once('-').map(|(lang, _)| lang).unwrap_or(code)
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SourceLanguage {
    type Err = MediaDocError;

    /// Accepts either the locale code (`ta-IN`) or the display name (`Tamil`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        SourceLanguage::ALL
            .into_iter()
            .find(|l| {
                l.code().eq_ignore_ascii_case(needle) || l.display_name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| MediaDocError::UnsupportedLanguage {
                role: "source",
                value: s.to_string(),
            })
    }
}

/// Language the transcript is translated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TargetLanguage {
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "ta")]
    Tamil,
    #[serde(rename = "te")]
    Telugu,
    #[serde(rename = "bn")]
    Bengali,
    #[serde(rename = "mr")]
    Marathi,
    #[serde(rename = "gu")]
    Gujarati,
    #[serde(rename = "pa")]
    Punjabi,
    #[serde(rename = "ml")]
    Malayalam,
    #[serde(rename = "kn")]
    Kannada,
    #[serde(rename = "ur")]
    Urdu,
    #[default]
    #[serde(rename = "en")]
    English,
}

impl TargetLanguage {
    pub const ALL: [TargetLanguage; 11] = [
        TargetLanguage::Hindi,
        TargetLanguage::Tamil,
        TargetLanguage::Telugu,
        TargetLanguage::Bengali,
        TargetLanguage::Marathi,
        TargetLanguage::Gujarati,
        TargetLanguage::Punjabi,
        TargetLanguage::Malayalam,
        TargetLanguage::Kannada,
        TargetLanguage::Urdu,
        TargetLanguage::English,
    ];

    /// ISO 639-1 code, e.g. `ta`.
    pub fn code(self) -> &'static str {
        match self {
            TargetLanguage::Hindi => "hi",
            TargetLanguage::Tamil => "ta",
            TargetLanguage::Telugu => "te",
            TargetLanguage::Bengali => "bn",
            TargetLanguage::Marathi => "mr",
            TargetLanguage::Gujarati => "gu",
            TargetLanguage::Punjabi => "pa",
            TargetLanguage::Malayalam => "ml",
            TargetLanguage::Kannada => "kn",
            TargetLanguage::Urdu => "ur",
            TargetLanguage::English => "en",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TargetLanguage::Hindi => "Hindi",
            TargetLanguage::Tamil => "Tamil",
            TargetLanguage::Telugu => "Telugu",
            TargetLanguage::Bengali => "Bengali",
            TargetLanguage::Marathi => "Marathi",
            TargetLanguage::Gujarati => "Gujarati",
            TargetLanguage::Punjabi => "Punjabi",
            TargetLanguage::Malayalam => "Malayalam",
            TargetLanguage::Kannada => "Kannada",
            TargetLanguage::Urdu => "Urdu",
            TargetLanguage::English => "English",
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for TargetLanguage {
    type Err = MediaDocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        TargetLanguage::ALL
            .into_iter()
            .find(|l| {
                l.code().eq_ignore_ascii_case(needle) || l.display_name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| MediaDocError::UnsupportedLanguage {
                role: "target",
                value: s.to_string(),
            })
    }
}

//! Target languages recognized by the engine.
//!
//! Only some of these have a type-system plugin; asking the plugin registry
//! for the others is reported as an unsupported language rather than being
//! silently mapped onto a different language.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    TypeScript,
    JavaScript,
    Python,
    Rust,
    Go,
    Java,
    Kotlin,
    Zig,
}

impl Language {
    pub const ALL: [Language; 8] = [
        Language::TypeScript,
        Language::JavaScript,
        Language::Python,
        Language::Rust,
        Language::Go,
        Language::Java,
        Language::Kotlin,
        Language::Zig,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Rust => "rust",
            Language::Go => "go",
            Language::Java => "java",
            Language::Kotlin => "kotlin",
            Language::Zig => "zig",
        }
    }

    /// Whether values of this language carry static type annotations.
    pub const fn is_statically_typed(self) -> bool {
        !matches!(self, Language::JavaScript | Language::Python)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a language tag is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized language tag `{0}`")]
pub struct UnknownLanguageTag(pub String);

impl FromStr for Language {
    type Err = UnknownLanguageTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "typescript" | "ts" | "tsx" => Ok(Language::TypeScript),
            "javascript" | "js" | "jsx" => Ok(Language::JavaScript),
            "python" | "py" => Ok(Language::Python),
            "rust" | "rs" => Ok(Language::Rust),
            "go" | "golang" => Ok(Language::Go),
            "java" => Ok(Language::Java),
            "kotlin" | "kt" => Ok(Language::Kotlin),
            "zig" => Ok(Language::Zig),
            other => Err(UnknownLanguageTag(other.to_string())),
        }
    }
}

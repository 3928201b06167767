//! Supported source languages and the file-extension table used to infer them.

use phf::phf_map;
use serde::{Deserialize, Serialize};

/// A language tag accepted by the analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Java,
    CSharp,
    Cpp,
    C,
    Go,
    Rust,
    Php,
    Ruby,
    Swift,
    Kotlin,
}

/// Extension (lowercase, without the dot) to language.
static EXTENSIONS: phf::Map<&'static str, Language> = phf_map! {
    "js" => Language::JavaScript,
    "mjs" => Language::JavaScript,
    "cjs" => Language::JavaScript,
    "jsx" => Language::JavaScript,
    "ts" => Language::TypeScript,
    "tsx" => Language::TypeScript,
    "py" => Language::Python,
    "pyw" => Language::Python,
    "java" => Language::Java,
    "cs" => Language::CSharp,
    "cpp" => Language::Cpp,
    "cc" => Language::Cpp,
    "cxx" => Language::Cpp,
    "hpp" => Language::Cpp,
    "hh" => Language::Cpp,
    "c" => Language::C,
    "h" => Language::C,
    "go" => Language::Go,
    "rs" => Language::Rust,
    "php" => Language::Php,
    "rb" => Language::Ruby,
    "swift" => Language::Swift,
    "kt" => Language::Kotlin,
    "kts" => Language::Kotlin,
};

impl Language {
    /// Every known language, in display order.
    pub const ALL: &'static [Language] = &[
        Language::JavaScript,
        Language::TypeScript,
        Language::Python,
        Language::Java,
        Language::CSharp,
        Language::Cpp,
        Language::C,
        Language::Go,
        Language::Rust,
        Language::Php,
        Language::Ruby,
        Language::Swift,
        Language::Kotlin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::Java => "java",
            Language::CSharp => "csharp",
            Language::Cpp => "cpp",
            Language::C => "c",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Php => "php",
            Language::Ruby => "ruby",
            Language::Swift => "swift",
            Language::Kotlin => "kotlin",
        }
    }

    /// Parse a language tag. Matching is case-insensitive and accepts a few
    /// common aliases ("js", "c++", "c#", ...).
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "javascript" | "js" => Some(Language::JavaScript),
            "typescript" | "ts" => Some(Language::TypeScript),
            "python" | "py" => Some(Language::Python),
            "java" => Some(Language::Java),
            "csharp" | "c#" | "cs" => Some(Language::CSharp),
            "cpp" | "c++" => Some(Language::Cpp),
            "c" => Some(Language::C),
            "go" | "golang" => Some(Language::Go),
            "rust" | "rs" => Some(Language::Rust),
            "php" => Some(Language::Php),
            "ruby" | "rb" => Some(Language::Ruby),
            "swift" => Some(Language::Swift),
            "kotlin" | "kt" => Some(Language::Kotlin),
            _ => None,
        }
    }

    /// Determine the language from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        EXTENSIONS.get(ext.to_lowercase().as_str()).copied()
    }

    /// Get the file extensions associated with this language.
    pub fn extensions(&self) -> Vec<&'static str> {
        let mut exts: Vec<&'static str> = EXTENSIONS
            .entries()
            .filter(|(_, lang)| *lang == self)
            .map(|(ext, _)| *ext)
            .collect();
        exts.sort_unstable();
        exts
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown language: {}", s))
    }
}

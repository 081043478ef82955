//! Content sniffing - guesses the language of a span of text.
//!
//! Each language carries a set of weighted regex signatures. The winner is
//! the language with the highest total weight; its confidence grows with
//! that weight and shrinks when other languages score close to it.

pub mod handlers;

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Solidity,
    Sql,
    Json,
    Html,
    Shell,
    PlainText,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rust => "rust",
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Solidity => "solidity",
            Self::Sql => "sql",
            Self::Json => "json",
            Self::Html => "html",
            Self::Shell => "shell",
            Self::PlainText => "plaintext",
        }
    }

    /// Map a fence info string (```` ```py ````) to a language.
    pub fn from_hint(hint: &str) -> Option<Self> {
        match hint.trim().to_lowercase().as_str() {
            "rust" | "rs" => Some(Self::Rust),
            "python" | "py" => Some(Self::Python),
            "javascript" | "js" | "jsx" | "node" => Some(Self::JavaScript),
            "typescript" | "ts" | "tsx" => Some(Self::TypeScript),
            "solidity" | "sol" => Some(Self::Solidity),
            "sql" | "postgres" | "mysql" => Some(Self::Sql),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            "bash" | "sh" | "shell" | "zsh" => Some(Self::Shell),
            "text" | "txt" | "plain" => Some(Self::PlainText),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Classification {
    pub label: Language,
    /// In `[0, 1]`.
    pub confidence: f32,
}

impl Classification {
    pub fn plain_text() -> Self {
        Self {
            label: Language::PlainText,
            confidence: 0.0,
        }
    }
}

// Total weight at which a lone winner reaches full confidence.
const SATURATION: f32 = 4.0;

// An unfenced paragraph is only code if its winner matched at least one
// signature this heavy and scored at least `MIN_PARAGRAPH_CONFIDENCE`.
const STRONG_WEIGHT: f32 = 1.5;
const MIN_PARAGRAPH_CONFIDENCE: f32 = 0.25;

const SIGNATURES: &[(Language, &str, f32)] = &[
    (Language::Rust, r"\bfn\s+\w+\s*(<[^>]*>)?\s*\(", 1.5),
    (Language::Rust, r"\blet\s+mut\s+\w+", 1.5),
    (Language::Rust, r"\buse\s+\w+(::\w+)+", 1.5),
    (Language::Rust, r"\bpub\s+(fn|struct|enum|mod|trait)\b", 1.5),
    (Language::Rust, r"\bimpl\b[^{\n]*\{", 1.0),
    (Language::Rust, r"\w+!\(", 1.0),
    (Language::Rust, r"&mut\s", 1.0),
    (Language::Python, r"(?m)^\s*def\s+\w+\s*\([^)]*\)\s*(->\s*[^:]+)?:", 2.0),
    (Language::Python, r"(?m)^\s*from\s+[\w.]+\s+import\s", 1.5),
    (Language::Python, r"(?m)^\s*import\s+\w+\s*$", 1.0),
    (Language::Python, r"\belif\b", 1.5),
    (Language::Python, r"\bself\.\w+", 0.5),
    (Language::Python, r"(?m):\s*$", 0.5),
    (Language::Python, r"\bNone\b|\bTrue\b|\bFalse\b", 0.5),
    (Language::JavaScript, r"\bfunction\s*\w*\s*\(", 1.5),
    (Language::JavaScript, r"\bconst\s+\w+\s*=", 1.0),
    (Language::JavaScript, r"\bconsole\.log\(", 1.5),
    (Language::JavaScript, r"\brequire\(\s*['\x22]", 1.5),
    (Language::JavaScript, r"=>", 0.5),
    (Language::JavaScript, r"===|!==", 1.0),
    (Language::TypeScript, r":\s*(string|number|boolean|any|void|unknown)\b", 2.0),
    (Language::TypeScript, r"\binterface\s+\w+\s*\{", 1.5),
    (Language::TypeScript, r"\btype\s+\w+\s*=", 1.0),
    (Language::TypeScript, r"\bimport\s+.*\bfrom\s+['\x22]", 1.0),
    (Language::TypeScript, r"\b(public|private|readonly)\s+\w+\s*:", 1.0),
    (Language::Solidity, r"\bpragma\s+solidity\b", 3.0),
    (Language::Solidity, r"\bcontract\s+\w+", 2.0),
    (Language::Solidity, r"\bmapping\s*\(", 2.0),
    (Language::Solidity, r"\bmsg\.sender\b", 2.0),
    (Language::Solidity, r"\buint(8|256)?\b", 1.0),
    (
        Language::Sql,
        r"(?i)\bselect\s+(distinct\s+)?[\w.()*]+(\s*,\s*[\w.()*]+)*\s+from\s+\w+",
        2.0,
    ),
    (Language::Sql, r"(?i)\binsert\s+into\b", 2.0),
    (Language::Sql, r"(?i)\bcreate\s+table\b", 2.0),
    (Language::Sql, r"(?i)\bupdate\s+\w+\s+set\b", 2.0),
    (Language::Sql, r"(?i)\bwhere\b", 0.5),
    (Language::Sql, r"(?i)\b(inner|left|right)?\s*join\b", 0.5),
    (Language::Json, r"^\s*[\{\[]", 0.5),
    (Language::Json, r#""[^"\n]+"\s*:\s*("|\d|\{|\[|true|false|null)"#, 1.0),
    (Language::Html, r"(?i)<!DOCTYPE\s+html", 3.0),
    (Language::Html, r"(?i)</?(html|head|body|div|span|p|a|ul|li|table|form)\b[^>]*>", 1.5),
    (Language::Html, r#"(?i)<\w+[^>]*\s(class|id|href|src)=""#, 1.0),
    (Language::Shell, r"(?m)^#!\s*/(usr/)?bin/(env\s+)?(ba|z)?sh", 3.0),
    (Language::Shell, r"(?m)^\s*(sudo|apt-get|curl|wget|chmod|export|echo|mkdir)\s", 1.5),
    (Language::Shell, r"\|\s*(grep|awk|sed|xargs)\b", 1.0),
    (Language::Shell, r"(?m)^\s*(fi|done|esac)\s*$", 1.0),
    (Language::Shell, r"\$\{?\w+\}?", 0.5),
];

lazy_static! {
    static ref COMPILED: Vec<(Language, Regex, f32)> = SIGNATURES
        .iter()
        .map(|(lang, pattern, weight)| {
            (*lang, Regex::new(pattern).expect("language signature"), *weight)
        })
        .collect();
    static ref FENCE_RE: Regex =
        Regex::new(r"(?s)```([\w+-]*)[^\n]*\n(.*?)```").expect("fence regex");
    static ref PARAGRAPH_RE: Regex = Regex::new(r"\n\s*\n").expect("paragraph regex");
}

/// Classify `text` into a language label with a confidence in `[0, 1]`.
pub fn classify(text: &str) -> Classification {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Classification::plain_text();
    }

    // A document that parses as a JSON object or array is JSON, whatever
    // else it resembles.
    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
    {
        return Classification {
            label: Language::Json,
            confidence: 1.0,
        };
    }

    let mut scores: Vec<(Language, f32)> = Vec::new();
    for (lang, re, weight) in COMPILED.iter() {
        if re.is_match(trimmed) {
            match scores.iter_mut().find(|(l, _)| l == lang) {
                Some((_, score)) => *score += weight,
                None => scores.push((*lang, *weight)),
            }
        }
    }

    scores.sort_by(|a, b| b.1.total_cmp(&a.1));
    let Some(&(label, best)) = scores.first() else {
        return Classification::plain_text();
    };
    let total: f32 = scores.iter().map(|(_, s)| s).sum();

    let dominance = best / total;
    let strength = (best / SATURATION).min(1.0);
    Classification {
        label,
        confidence: (dominance * strength).clamp(0.0, 1.0),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CodeBlock {
    pub content: String,
    #[serde(flatten)]
    pub classification: Classification,
}

/// Split `text` into code blocks and classify each.
///
/// Fenced blocks win when present; a fence info string naming a known
/// language is taken at full confidence. Otherwise blank-line separated
/// paragraphs are classified and plain prose is dropped.
pub fn extract_code_blocks(text: &str) -> Vec<CodeBlock> {
    let fenced: Vec<CodeBlock> = FENCE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let content = caps.get(2)?.as_str().trim_end().to_string();
            if content.trim().is_empty() {
                return None;
            }
            let classification = match caps.get(1).and_then(|m| Language::from_hint(m.as_str())) {
                Some(label) => Classification {
                    label,
                    confidence: 1.0,
                },
                None => classify(&content),
            };
            Some(CodeBlock {
                content,
                classification,
            })
        })
        .collect();
    if !fenced.is_empty() {
        return fenced;
    }

    PARAGRAPH_RE
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter_map(|p| {
            let classification = classify(p);
            looks_like_code(p, &classification).then(|| CodeBlock {
                content: p.to_string(),
                classification,
            })
        })
        .collect()
}

fn looks_like_code(paragraph: &str, classification: &Classification) -> bool {
    if classification.label == Language::PlainText {
        return false;
    }
    // Parsed JSON.
    if classification.confidence >= 1.0 {
        return true;
    }
    classification.confidence >= MIN_PARAGRAPH_CONFIDENCE
        && COMPILED.iter().any(|(lang, re, weight)| {
            *lang == classification.label && *weight >= STRONG_WEIGHT && re.is_match(paragraph)
        })
}

//! # Tokenizador
//!
//! Divide o texto bruto em sentenças e as sentenças em tokens (palavras e
//! pontuações). Cada token preserva sua posição no texto original (offset em
//! bytes) para que o renderizador destaque as entidades sem perder a
//! formatação original.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use wikiner_core::tokenizer::{tokenize_sentences, tokenize_words};
//!
//! let text = "Obama visited Paris. He met Macron.";
//! let sentences = tokenize_sentences(text);
//! assert_eq!(sentences.len(), 2);
//!
//! let tokens = tokenize_words(&sentences[0].text);
//! // "Obama", "visited", "Paris", "."
//! assert_eq!(tokens.len(), 4);
//! ```

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Um token extraído do texto original.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// O texto do token (ex: "Paris", ",", "1.5").
    pub text: String,
    /// Índice de byte inicial no texto original (inclusive).
    pub start: usize,
    /// Índice de byte final no texto original (exclusivo).
    pub end: usize,
    /// Índice sequencial do token na sentença (0, 1, 2...).
    pub index: usize,
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Uma sentença e sua posição no texto de origem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sentence {
    pub text: String,
    /// Offset em bytes do início da sentença no texto de origem.
    pub start: usize,
}

/// Números com separador (1.000, 3,14), palavras com apóstrofo ou hífen
/// internos (O'Neil, Jean-Luc) e qualquer outro símbolo isolado.
const WORD_PATTERN: &str = r"\d+(?:[.,]\d+)+|\w+(?:['’\-]\w+)*|[^\w\s]";

fn word_regex() -> &'static Regex {
    static WORD_RE: OnceLock<Regex> = OnceLock::new();
    WORD_RE.get_or_init(|| Regex::new(WORD_PATTERN).expect("padrão de tokenização inválido"))
}

/// Tokeniza uma sentença em palavras e pontuações.
pub fn tokenize_words(text: &str) -> Vec<Token> {
    word_regex()
        .find_iter(text)
        .enumerate()
        .map(|(index, m)| Token {
            text: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
            index,
        })
        .collect()
}

/// Divide o texto em sentenças usando as fronteiras Unicode (UAX #29).
///
/// Espaços nas bordas são removidos e sentenças vazias descartadas.
pub fn tokenize_sentences(text: &str) -> Vec<Sentence> {
    text.split_sentence_bound_indices()
        .filter_map(|(offset, raw)| {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return None;
            }
            let leading = raw.len() - raw.trim_start().len();
            Some(Sentence {
                text: trimmed.to_string(),
                start: offset + leading,
            })
        })
        .collect()
}

//! Destaque das entidades no terminal com cores ANSI.

use std::fmt::Write;

use crate::error::{NerError, Result};
use crate::tagger::{ColorMapping, TaggedToken, NON_ENTITY};

const RESET: &str = "\x1b[0m";

/// Código ANSI de cor de texto para um nome de cor.
///
/// `white` e `default` não alteram o texto.
pub fn ansi_code(color: &str) -> Result<Option<&'static str>> {
    let code = match color.to_lowercase().as_str() {
        "white" | "default" => return Ok(None),
        "black" => "\x1b[30m",
        "red" => "\x1b[31m",
        "green" => "\x1b[32m",
        "yellow" => "\x1b[33m",
        "blue" => "\x1b[34m",
        "magenta" => "\x1b[35m",
        "cyan" => "\x1b[36m",
        _ => return Err(NerError::UnknownColor(color.to_string())),
    };
    Ok(Some(code))
}

fn paint(out: &mut String, text: &str, color: &str) -> Result<()> {
    match ansi_code(color)? {
        Some(code) => {
            let _ = write!(out, "{code}{text}{RESET}");
        }
        None => out.push_str(text),
    }
    Ok(())
}

/// Reconstrói `text` com cada token pintado na cor do seu label.
///
/// O espaço entre tokens é copiado do texto original usando os offsets dos
/// tokens, que precisam estar em ordem e dentro de `text`.
pub fn render_highlighted(text: &str, tagged: &[TaggedToken], colors: &ColorMapping) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for item in tagged {
        let color = colors
            .get(&item.label)
            .ok_or_else(|| NerError::UnknownLabel(item.label.clone()))?;
        let token = &item.token;
        if token.start >= cursor {
            out.push_str(&text[cursor..token.start]);
        }
        paint(&mut out, &token.text, color)?;
        cursor = cursor.max(token.end);
    }
    out.push_str(&text[cursor.min(text.len())..]);

    Ok(out)
}

/// Uma linha com o nome de cada classe na sua cor (sem prefixos BIO).
pub fn render_legend(colors: &ColorMapping) -> Result<String> {
    let mut out = String::new();
    for (name, color) in colors {
        if name == NON_ENTITY || name.starts_with("I-") {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        paint(&mut out, name.strip_prefix("B-").unwrap_or(name), color)?;
    }
    Ok(out)
}

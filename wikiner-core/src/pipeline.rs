//! # Pipeline de Inferência
//!
//! Conecta tokenizador, features, modelo e renderizador:
//!
//! ```text
//! texto ─► sentenças ─► tokens ─► features (janela do modelo) ─► Viterbi ─► labels BIO ─► ANSI
//! ```
//!
//! Cada sentença é processada de forma independente; os tokens resultantes
//! carregam offsets relativos ao texto completo.

use tracing::{debug, info};

use crate::config::ClassConfig;
use crate::error::{NerError, Result};
use crate::features::tokens_to_features;
use crate::model::{NerModel, SequenceLabeler};
use crate::render::{render_highlighted, render_legend};
use crate::tagger::{labels_to_spans, ColorMapping, EntityClass, TaggedToken};
use crate::tokenizer::{tokenize_sentences, tokenize_words};

/// Uma entidade encontrada no texto
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub text: String,
    pub class: EntityClass,
    /// Offset em bytes (início inclusivo, fim exclusivo)
    pub start: usize,
    pub end: usize,
}

/// Pipeline NER sobre um modelo treinado.
pub struct NerPipeline {
    model: NerModel,
    /// Cores por label BIO
    colors: ColorMapping,
}

impl NerPipeline {
    pub fn new(model: NerModel) -> Self {
        Self::with_config(model, &ClassConfig::default())
    }

    pub fn with_config(model: NerModel, config: &ClassConfig) -> Self {
        Self {
            model,
            colors: config.color_mapping(true),
        }
    }

    pub fn model(&self) -> &NerModel {
        &self.model
    }

    pub fn colors(&self) -> &ColorMapping {
        &self.colors
    }

    /// Rotula uma única sentença.
    pub fn tag_sentence(&self, text: &str) -> Result<Vec<TaggedToken>> {
        let tokens = tokenize_words(text);
        let features = tokens_to_features(&tokens, self.model.window_size());
        let labels = self
            .model
            .predict(&[features])?
            .pop()
            .ok_or(NerError::LengthMismatch { expected: 1, found: 0 })?;
        if labels.len() != tokens.len() {
            return Err(NerError::LengthMismatch {
                expected: tokens.len(),
                found: labels.len(),
            });
        }
        debug!(tokens = tokens.len(), "sentença rotulada");

        Ok(tokens
            .into_iter()
            .zip(labels)
            .map(|(token, label)| TaggedToken { token, label })
            .collect())
    }

    /// Rotula um texto com várias sentenças.
    ///
    /// Os offsets dos tokens são ajustados para o texto completo e os índices
    /// numerados em sequência.
    pub fn tag_document(&self, text: &str) -> Result<Vec<TaggedToken>> {
        let sentences = tokenize_sentences(text);
        let mut tagged = Vec::new();
        for sentence in &sentences {
            for mut item in self.tag_sentence(&sentence.text)? {
                item.token.start += sentence.start;
                item.token.end += sentence.start;
                item.token.index = tagged.len();
                tagged.push(item);
            }
        }
        info!(sentences = sentences.len(), tokens = tagged.len(), "documento rotulado");
        Ok(tagged)
    }

    /// Agrupa tokens rotulados em entidades.
    pub fn entities(&self, text: &str, tagged: &[TaggedToken]) -> Result<Vec<Entity>> {
        let labels: Vec<&str> = tagged.iter().map(|t| t.label.as_str()).collect();
        Ok(labels_to_spans(&labels)?
            .into_iter()
            .map(|span| {
                let start = tagged[span.start_token].token.start;
                let end = tagged[span.end_token].token.end;
                Entity {
                    text: text[start..end].to_string(),
                    class: span.class,
                    start,
                    end,
                }
            })
            .collect())
    }

    /// Texto com as entidades destacadas em ANSI.
    pub fn highlight(&self, text: &str) -> Result<String> {
        let tagged = self.tag_document(text)?;
        render_highlighted(text, &tagged, &self.colors)
    }

    pub fn legend(&self) -> Result<String> {
        render_legend(&self.colors)
    }
}

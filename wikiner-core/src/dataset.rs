//! # Dataset NER (formato WikiNER)
//!
//! Cada linha do dataset é uma sentença com duas colunas paralelas:
//!
//! - `words`: os tokens da sentença;
//! - `ner_tags`: o id de classe de cada token (tabela fixa `{0, 1, 2, 4}`).
//!
//! ```json
//! {"words": ["John", "lives", "in", "New", "York"], "ner_tags": [2, 0, 0, 1, 1]}
//! ```
//!
//! O formato do arquivo é escolhido pela extensão ([`DatasetFormat`]):
//! `.json` (array de linhas) ou `.jsonl` (uma linha por linha de texto).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_jsonlines::json_lines;
use tracing::{debug, info};

use crate::error::{NerError, Result};
use crate::features::{tokens_to_features, FeatureVector, DEFAULT_WINDOW_SIZE};
use crate::tagger::numbers_to_labels;

/// Uma sentença anotada
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    pub words: Vec<String>,
    pub ner_tags: Vec<u32>,
}

/// Leitor de um formato: lê todas as linhas do arquivo em `path`.
pub type RowLoader = fn(&Path) -> Result<Vec<DatasetRow>>;

/// Formatos de arquivo com leitor registrado.
///
/// Tabelas `.csv` e `.parquet` não têm leitor aqui e caem em
/// [`NerError::UnsupportedFormat`], como qualquer outra extensão.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    /// `.json`: um array de objetos
    Json,
    /// `.jsonl` / `.ndjson`: um objeto por linha
    JsonLines,
}

impl DatasetFormat {
    /// Escolhe o formato pela extensão do arquivo.
    pub fn from_path(path: &Path) -> Result<Self> {
        let suffix = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_lowercase();
        match suffix.as_str() {
            "json" => Ok(DatasetFormat::Json),
            "jsonl" | "ndjson" => Ok(DatasetFormat::JsonLines),
            _ => Err(NerError::UnsupportedFormat(suffix)),
        }
    }

    pub fn loader(&self) -> RowLoader {
        match self {
            DatasetFormat::Json => load_json,
            DatasetFormat::JsonLines => load_json_lines,
        }
    }
}

fn load_json(path: &Path) -> Result<Vec<DatasetRow>> {
    let file = File::open(path).map_err(|e| NerError::io(path, e))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn load_json_lines(path: &Path) -> Result<Vec<DatasetRow>> {
    json_lines::<DatasetRow, _>(path)
        .and_then(|rows| rows.collect::<std::io::Result<Vec<_>>>())
        .map_err(|e| NerError::io(path, e))
}

/// Dataset de sentenças anotadas, com linhas validadas na construção.
#[derive(Debug, Clone, Default)]
pub struct NerDataset {
    rows: Vec<DatasetRow>,
}

impl NerDataset {
    /// Constrói o dataset rejeitando linhas com `words` e `ner_tags` de
    /// tamanhos diferentes.
    pub fn from_rows(rows: Vec<DatasetRow>) -> Result<Self> {
        if let Some((row, r)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.words.len() != r.ner_tags.len())
        {
            return Err(NerError::RowArityMismatch {
                row,
                tokens: r.words.len(),
                tags: r.ner_tags.len(),
            });
        }
        Ok(Self { rows })
    }

    /// Carrega um dataset do disco; o formato vem da extensão.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = DatasetFormat::from_path(path)?;
        let rows = (format.loader())(path)?;
        info!(path = %path.display(), ?format, rows = rows.len(), "dataset carregado");
        Self::from_rows(rows)
    }

    pub fn rows(&self) -> &[DatasetRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Labels BIO de cada linha, na ordem do dataset.
    pub fn labels(&self) -> Result<Vec<Vec<String>>> {
        self.rows
            .par_iter()
            .map(|row| numbers_to_labels(&row.ner_tags))
            .collect()
    }

    /// Features de cada linha com a janela padrão.
    pub fn features(&self) -> Vec<Vec<FeatureVector>> {
        self.features_with_window(DEFAULT_WINDOW_SIZE)
    }

    /// Features de cada linha com uma janela explícita.
    ///
    /// As linhas são processadas em paralelo; a ordem é preservada.
    pub fn features_with_window(&self, window_size: usize) -> Vec<Vec<FeatureVector>> {
        debug!(rows = self.rows.len(), window_size, "extraindo features");
        self.rows
            .par_iter()
            .map(|row| tokens_to_features(&row.words, window_size))
            .collect()
    }
}

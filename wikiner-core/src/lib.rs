//! # wikiner-core — Reconhecimento de Entidades Nomeadas no estilo WikiNER
//!
//! Transforma sentenças tokenizadas em features por token, converte ids de
//! classe em labels BIO e treina/aplica um rotulador de sequências
//! linear-chain sobre essas features.
//!
//! ## Arquitetura
//!
//! 1.  **Tokenização** ([`tokenizer`]): texto → sentenças → tokens com offsets.
//! 2.  **Features** ([`features`]): cada token vira um mapa de características
//!     de si mesmo e dos vizinhos dentro de uma janela.
//! 3.  **Labels** ([`tagger`]): ids de classe `{0, 1, 2, 4}` → `B-X`/`I-X`/`NON-ENTITY`.
//! 4.  **Modelo** ([`model`], [`crf`], [`perceptron`], [`viterbi`]): treino
//!     Averaged Perceptron e decodificação Viterbi.
//! 5.  **Saída** ([`pipeline`], [`render`]): tokens rotulados e texto destacado.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use wikiner_core::{tokens_to_features, NerModel, NerPipeline, SequenceLabeler, TrainerConfig};
//!
//! let tokens = ["Anna", "lives", "in", "Oslo", "."];
//! let labels = ["B-PERSON", "NON-ENTITY", "NON-ENTITY", "B-LOCATION", "NON-ENTITY"];
//!
//! let mut model = NerModel::new(TrainerConfig { max_iterations: 10, ..TrainerConfig::default() });
//! let features = vec![tokens_to_features(&tokens, model.window_size())];
//! let gold: Vec<Vec<String>> = vec![labels.iter().map(|l| l.to_string()).collect()];
//! model.fit(&features, &gold).unwrap();
//!
//! let pipeline = NerPipeline::new(model);
//! for item in pipeline.tag_document("Anna lives in Oslo.").unwrap() {
//!     println!("{} -> {}", item.token.text, item.label);
//! }
//! ```

pub mod config;
pub mod crf;
pub mod dataset;
pub mod error;
pub mod features;
pub mod metrics;
pub mod model;
pub mod perceptron;
pub mod pipeline;
pub mod render;
pub mod tagger;
pub mod tokenizer;
pub mod viterbi;

pub use config::ClassConfig;
pub use dataset::{DatasetFormat, DatasetRow, NerDataset};
pub use error::{NerError, Result};
pub use features::{lowlevel_features, token_to_features, tokens_to_features, FeatureValue, FeatureVector};
pub use metrics::{classification_report, flat_accuracy, ClassificationReport};
pub use model::{NerModel, SequenceLabeler};
pub use perceptron::{Algorithm, TrainerConfig};
pub use pipeline::{Entity, NerPipeline};
pub use tagger::{expand_bio, numbers_to_labels, ColorMapping, EntityClass, EntitySpan, Tag, TaggedToken};
pub use tokenizer::{tokenize_sentences, tokenize_words, Sentence, Token};

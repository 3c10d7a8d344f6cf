//! # Modelo NER
//!
//! Define o contrato de um rotulador de sequências ([`SequenceLabeler`]) e a
//! implementação padrão [`NerModel`], que agrega:
//!
//! - os **hiperparâmetros** de treino ([`TrainerConfig`]), incluindo o raio da
//!   janela de features;
//! - os **pesos** do [`CrfModel`] aprendidos pelo [`PerceptronTrainer`].
//!
//! O modelo é salvo em JSON com a janela junto, de modo que a inferência
//! sempre extrai features com a mesma janela usada no treino.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::crf::{compute_emission_scores, CrfModel};
use crate::error::{NerError, Result};
use crate::features::FeatureVector;
use crate::metrics::flat_accuracy;
use crate::perceptron::{check_aligned, PerceptronTrainer, TrainerConfig};
use crate::viterbi::viterbi_decode;

/// Rotulador de sequências: aprende e prediz labels BIO a partir de features.
///
/// Os lotes são paralelos: a sentença `i` de `features` corresponde à
/// sentença `i` de `labels`, token a token.
pub trait SequenceLabeler {
    fn fit(&mut self, features: &[Vec<FeatureVector>], labels: &[Vec<String>]) -> Result<()>;

    fn predict(&self, features: &[Vec<FeatureVector>]) -> Result<Vec<Vec<String>>>;

    /// Acurácia token a token das predições contra os labels verdadeiros
    fn score(&self, features: &[Vec<FeatureVector>], labels: &[Vec<String>]) -> Result<f64> {
        check_aligned(features, labels)?;
        let predicted = self.predict(features)?;
        flat_accuracy(labels, &predicted)
    }
}

/// O modelo NER completo: configuração de treino + pesos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NerModel {
    pub config: TrainerConfig,
    crf: Option<CrfModel>,
}

impl NerModel {
    /// Cria um modelo ainda não treinado
    pub fn new(config: TrainerConfig) -> Self {
        Self { config, crf: None }
    }

    /// Modelo já treinado a partir de pesos existentes
    pub fn from_weights(config: TrainerConfig, crf: CrfModel) -> Self {
        Self {
            config,
            crf: Some(crf),
        }
    }

    /// Raio da janela de features com que o modelo foi (ou será) treinado
    pub fn window_size(&self) -> usize {
        self.config.window_size
    }

    pub fn is_fitted(&self) -> bool {
        self.crf.is_some()
    }

    pub fn crf(&self) -> Option<&CrfModel> {
        self.crf.as_ref()
    }

    /// Nome de arquivo padrão: `crf_{algoritmo}_{iterações}.model`
    pub fn default_filename(&self) -> String {
        format!(
            "crf_{}_{}.model",
            self.config.algorithm.name(),
            self.config.max_iterations
        )
    }

    /// Prediz os labels de uma única sentença.
    pub fn predict_sentence(&self, features: &[FeatureVector]) -> Result<Vec<String>> {
        let crf = self.crf.as_ref().ok_or(NerError::ModelNotFitted)?;
        let attrs: Vec<Vec<(String, f64)>> = features.iter().map(FeatureVector::attributes).collect();
        let emission = compute_emission_scores(crf, &attrs);
        Ok(viterbi_decode(crf, &emission)
            .best_path
            .into_iter()
            .map(|i| crf.labels[i].clone())
            .collect())
    }

    /// Salva o modelo em JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| NerError::io(path, e))?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        info!(path = %path.display(), "modelo salvo");
        Ok(())
    }

    /// Carrega um modelo salvo com [`NerModel::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| NerError::io(path, e))?;
        let model: Self = serde_json::from_reader(BufReader::new(file))?;
        info!(
            path = %path.display(),
            window_size = model.window_size(),
            fitted = model.is_fitted(),
            "modelo carregado"
        );
        Ok(model)
    }
}

impl Default for NerModel {
    fn default() -> Self {
        Self::new(TrainerConfig::default())
    }
}

impl SequenceLabeler for NerModel {
    fn fit(&mut self, features: &[Vec<FeatureVector>], labels: &[Vec<String>]) -> Result<()> {
        let trainer = PerceptronTrainer::new(self.config.clone());
        self.crf = Some(trainer.train(features, labels)?);
        Ok(())
    }

    fn predict(&self, features: &[Vec<FeatureVector>]) -> Result<Vec<Vec<String>>> {
        features
            .iter()
            .map(|sentence| self.predict_sentence(sentence))
            .collect()
    }
}

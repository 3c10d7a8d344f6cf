//! # Averaged Perceptron Estruturado
//!
//! Treina os pesos de um [`CrfModel`] de forma **online** e **mistake-driven**:
//! para cada sentença, decodifica com Viterbi usando os pesos atuais e, se a
//! sequência predita difere da correta, promove os atributos/transições da
//! sequência correta e penaliza os da predita.
//!
//! O modelo final usa a **média** dos pesos ao longo de todos os passos, com
//! "Lazy Averaging": a média de um peso só é atualizada quando ele muda.

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::crf::{compute_emission_scores, CrfModel};
use crate::error::{NerError, Result};
use crate::features::{FeatureVector, DEFAULT_WINDOW_SIZE};
use crate::viterbi::viterbi_decode;

/// Algoritmos de treino disponíveis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Perceptron estruturado com média dos pesos
    AveragedPerceptron,
}

impl Algorithm {
    /// Nome curto, usado no nome do arquivo do modelo
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::AveragedPerceptron => "ap",
        }
    }
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::AveragedPerceptron
    }
}

impl FromStr for Algorithm {
    type Err = NerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ap" | "perceptron" | "averaged_perceptron" | "averaged-perceptron" => {
                Ok(Algorithm::AveragedPerceptron)
            }
            other => Err(NerError::InvalidConfig(format!(
                "algoritmo de treino desconhecido: {other:?}"
            ))),
        }
    }
}

/// Hiperparâmetros de treino, persistidos junto com o modelo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    pub algorithm: Algorithm,
    /// Número máximo de passadas pelo dataset
    pub max_iterations: usize,
    /// Raio da janela de features usado no treino e, depois, na inferência
    pub window_size: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            max_iterations: 100,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

/// Chave de um peso do modelo
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum WeightKey {
    Emission(String, usize),
    Transition(usize, usize),
}

/// Estado do treino com Lazy Averaging.
struct AveragedWeights {
    model: CrfModel,
    /// Soma acumulada de cada peso: $\sum w_t$
    totals: HashMap<WeightKey, f64>,
    /// Último passo em que o peso foi atualizado
    last_update: HashMap<WeightKey, usize>,
    /// Sentenças processadas
    steps: usize,
}

impl AveragedWeights {
    fn new(labels: Vec<String>) -> Self {
        Self {
            model: CrfModel::new(labels),
            totals: HashMap::new(),
            last_update: HashMap::new(),
            steps: 0,
        }
    }

    fn weight(&self, key: &WeightKey) -> f64 {
        match key {
            WeightKey::Emission(attr, label) => self
                .model
                .emission_weights
                .get(attr)
                .map_or(0.0, |w| w[*label]),
            WeightKey::Transition(prev, next) => self.model.transition_score(*prev, *next),
        }
    }

    fn set_weight(&mut self, key: &WeightKey, value: f64) {
        match key {
            WeightKey::Emission(attr, label) => self.model.set_emission(attr, *label, value),
            WeightKey::Transition(prev, next) => self.model.set_transition(*prev, *next, value),
        }
    }

    /// Soma `delta` ao peso, acumulando antes o peso antigo pelo intervalo em
    /// que ficou constante.
    fn update(&mut self, key: WeightKey, delta: f64) {
        let current = self.weight(&key);
        let last = self.last_update.get(&key).copied().unwrap_or(0);
        *self.totals.entry(key.clone()).or_insert(0.0) += (self.steps - last) as f64 * current;
        self.last_update.insert(key.clone(), self.steps);
        self.set_weight(&key, current + delta);
    }

    /// Substitui os pesos atuais pelas médias ($\sum w_t / T$).
    fn finalize(mut self) -> CrfModel {
        if self.steps == 0 {
            return self.model;
        }
        let keys: Vec<WeightKey> = self.last_update.keys().cloned().collect();
        let steps = self.steps as f64;
        for key in keys {
            let current = self.weight(&key);
            let last = self.last_update[&key];
            let total = self.totals.get(&key).copied().unwrap_or(0.0)
                + (self.steps - last) as f64 * current;
            self.set_weight(&key, total / steps);
        }
        self.model
    }
}

/// Treinador Averaged Perceptron.
pub struct PerceptronTrainer {
    config: TrainerConfig,
}

impl PerceptronTrainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    /// Treina um [`CrfModel`] a partir de sequências de features e labels alinhadas.
    ///
    /// Os labels conhecidos pelo modelo são exatamente os vistos no treino, em
    /// ordem alfabética; sem nenhum label o treino falha com
    /// [`NerError::EmptyTrainingData`]. Sempre executa `max_iterations`
    /// passadas: a média dos pesos continua se estabilizando mesmo depois da
    /// última correção.
    pub fn train(&self, features: &[Vec<FeatureVector>], labels: &[Vec<String>]) -> Result<CrfModel> {
        check_aligned(features, labels)?;

        let label_set: BTreeSet<&str> = labels.iter().flatten().map(String::as_str).collect();
        if label_set.is_empty() {
            return Err(NerError::EmptyTrainingData);
        }
        let label_names: Vec<String> = label_set.into_iter().map(str::to_string).collect();
        let mut state = AveragedWeights::new(label_names);

        // Atributos e labels-alvo convertidos uma única vez
        let sequences: Vec<Vec<Vec<(String, f64)>>> = features
            .iter()
            .map(|sentence| {
                sentence
                    .iter()
                    .map(|fv| fv.attributes().into_iter().filter(|(_, v)| *v != 0.0).collect())
                    .collect()
            })
            .collect();
        let gold: Vec<Vec<usize>> = labels
            .iter()
            .map(|sentence| {
                sentence
                    .iter()
                    .filter_map(|l| state.model.label_index(l))
                    .collect()
            })
            .collect();

        info!(
            sentences = sequences.len(),
            labels = state.model.num_labels(),
            max_iterations = self.config.max_iterations,
            "iniciando treino"
        );

        for iteration in 0..self.config.max_iterations {
            let mut mistakes = 0usize;
            for (attrs, gold_path) in sequences.iter().zip(&gold) {
                let emission = compute_emission_scores(&state.model, attrs);
                let predicted = viterbi_decode(&state.model, &emission).best_path;

                if predicted != *gold_path {
                    mistakes += 1;
                    update_sequence(&mut state, attrs, gold_path, &predicted);
                }
                state.steps += 1;
            }

            debug!(iteration, mistakes, "passada concluída");
        }

        Ok(state.finalize())
    }
}

/// Promove a sequência correta e penaliza a predita, apenas onde diferem.
fn update_sequence(
    state: &mut AveragedWeights,
    attrs: &[Vec<(String, f64)>],
    gold: &[usize],
    predicted: &[usize],
) {
    for i in 0..gold.len() {
        if gold[i] != predicted[i] {
            for (attr, value) in &attrs[i] {
                state.update(WeightKey::Emission(attr.clone(), gold[i]), *value);
                state.update(WeightKey::Emission(attr.clone(), predicted[i]), -value);
            }
        }
        if i > 0 && (gold[i - 1], gold[i]) != (predicted[i - 1], predicted[i]) {
            state.update(WeightKey::Transition(gold[i - 1], gold[i]), 1.0);
            state.update(WeightKey::Transition(predicted[i - 1], predicted[i]), -1.0);
        }
    }
}

/// Verifica que features e labels formam lotes paralelos de mesmo formato.
pub(crate) fn check_aligned(features: &[Vec<FeatureVector>], labels: &[Vec<String>]) -> Result<()> {
    if features.len() != labels.len() {
        return Err(NerError::LengthMismatch {
            expected: features.len(),
            found: labels.len(),
        });
    }
    for (fvs, ls) in features.iter().zip(labels) {
        if fvs.len() != ls.len() {
            return Err(NerError::LengthMismatch {
                expected: fvs.len(),
                found: ls.len(),
            });
        }
    }
    Ok(())
}

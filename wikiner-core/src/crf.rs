//! # CRF — Modelo Linear-Chain
//!
//! Modelo de marcação de sequências com o mesmo formato de pesos de um CRF
//! linear-chain: pesos de **emissão** (atributo × label) e uma **matriz de
//! transição** (label anterior × label seguinte).
//!
//! ```text
//! score(y, x) = Σ_i [emission(y_i, x_i) + transition(y_{i-1}, y_i)]
//! emission(y, x_i) = Σ_k valor_k * w[k][y]
//! ```
//!
//! Os labels não são fixos: o modelo conhece exatamente os labels vistos no
//! treino, na ordem em que foram registrados.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Modelo CRF com pesos aprendidos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrfModel {
    /// Labels conhecidos; a posição é o índice usado nas matrizes
    pub labels: Vec<String>,
    /// Pesos de emissão: atributo → peso por label
    pub emission_weights: HashMap<String, Vec<f64>>,
    /// Pesos de transição: indexed by [prev_label_idx][next_label_idx]
    pub transition_weights: Vec<Vec<f64>>,
}

impl CrfModel {
    /// Cria um modelo com pesos zerados para os labels dados
    pub fn new(labels: Vec<String>) -> Self {
        let n = labels.len();
        Self {
            labels,
            emission_weights: HashMap::new(),
            transition_weights: vec![vec![0.0f64; n]; n],
        }
    }

    pub fn num_labels(&self) -> usize {
        self.labels.len()
    }

    pub fn label_index(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Scores de emissão de todos os labels para um token
    ///
    /// `score[y] = Σ_k valor_k * w[k][y]`
    pub fn emission_scores(&self, attributes: &[(String, f64)]) -> Vec<f64> {
        let mut scores = vec![0.0; self.num_labels()];
        for (attr, value) in attributes {
            if let Some(weights) = self.emission_weights.get(attr) {
                for (score, w) in scores.iter_mut().zip(weights) {
                    *score += value * w;
                }
            }
        }
        scores
    }

    pub fn transition_score(&self, prev: usize, next: usize) -> f64 {
        self.transition_weights[prev][next]
    }

    /// Configura um peso de emissão
    pub fn set_emission(&mut self, attribute: &str, label: usize, weight: f64) {
        let n = self.num_labels();
        self.emission_weights
            .entry(attribute.to_string())
            .or_insert_with(|| vec![0.0; n])[label] = weight;
    }

    /// Configura um peso de transição
    pub fn set_transition(&mut self, from: usize, to: usize, weight: f64) {
        self.transition_weights[from][to] = weight;
    }
}

/// Calcula os scores de emissão para todos os tokens e labels: `[token][label]`
pub fn compute_emission_scores(model: &CrfModel, sequence: &[Vec<(String, f64)>]) -> Vec<Vec<f64>> {
    sequence
        .iter()
        .map(|attributes| model.emission_scores(attributes))
        .collect()
}

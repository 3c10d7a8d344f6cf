//! # Algoritmo de Viterbi — Decodificação de Sequências
//!
//! Programação dinâmica que encontra a sequência de labels de maior score em
//! `O(N × L²)` em vez de testar as `L^N` combinações.
//!
//! ```text
//! Inicialização: viterbi[0][t] = emission(t, x_0)
//! Recursão:      viterbi[i][t] = max_{t'} [viterbi[i-1][t'] + transition(t', t)] + emission(t, x_i)
//! Backtracking:  reconstrói o caminho ótimo de trás pra frente
//! ```
//!
//! Transições que violam o esquema BIO (`I-X` sem `B-X`/`I-X` antes) recebem
//! uma penalidade fixa, inclusive no primeiro token.

use crate::crf::CrfModel;
use crate::tagger::Tag;

/// Penalidade somada a transições BIO inválidas.
pub const INVALID_TRANSITION_PENALTY: f64 = -10.0;

/// Resultado do Viterbi
#[derive(Debug, Clone, PartialEq)]
pub struct ViterbiResult {
    /// Índices dos labels da melhor sequência (um por token)
    pub best_path: Vec<usize>,
    /// Score (não-normalizado) da melhor sequência
    pub best_score: f64,
}

/// Executa o Viterbi sobre os scores de emissão `[token][label]` de uma sentença.
pub fn viterbi_decode(model: &CrfModel, emission: &[Vec<f64>]) -> ViterbiResult {
    if emission.is_empty() || model.num_labels() == 0 {
        return ViterbiResult {
            best_path: vec![],
            best_score: 0.0,
        };
    }

    let n_tokens = emission.len();
    let n_labels = model.num_labels();
    let (start_penalty, transition) = bio_adjusted_transitions(model);

    let mut viterbi: Vec<f64> = (0..n_labels)
        .map(|t| emission[0][t] + start_penalty[t])
        .collect();
    // backptr[i][t] = label anterior que maximiza o score de t no token i
    let mut backptr: Vec<Vec<usize>> = vec![vec![0usize; n_labels]; n_tokens];

    for i in 1..n_tokens {
        let mut next = vec![f64::NEG_INFINITY; n_labels];
        for t in 0..n_labels {
            let (best_prev, best_score) = (0..n_labels)
                .map(|prev| (prev, viterbi[prev] + transition[prev][t]))
                .fold((0, f64::NEG_INFINITY), |best, cand| if cand.1 > best.1 { cand } else { best });
            next[t] = best_score + emission[i][t];
            backptr[i][t] = best_prev;
        }
        viterbi = next;
    }

    let (mut last, best_score) = best_in_slice(&viterbi);
    let mut best_path = vec![0usize; n_tokens];
    best_path[n_tokens - 1] = last;
    for i in (0..n_tokens - 1).rev() {
        last = backptr[i + 1][last];
        best_path[i] = last;
    }

    ViterbiResult {
        best_path,
        best_score,
    }
}

/// Penalidade de início e matriz de transição já com as penalidades BIO.
///
/// Labels que não são do esquema BIO não recebem penalidade.
fn bio_adjusted_transitions(model: &CrfModel) -> (Vec<f64>, Vec<Vec<f64>>) {
    let tags: Vec<Option<Tag>> = model.labels.iter().map(|l| Tag::from_label(l)).collect();
    let penalty = |prev: &Tag, next: &Tag| {
        if Tag::is_valid_transition(prev, next) {
            0.0
        } else {
            INVALID_TRANSITION_PENALTY
        }
    };

    let start = tags
        .iter()
        .map(|t| t.map_or(0.0, |t| penalty(&Tag::Outside, &t)))
        .collect();

    let transition = (0..tags.len())
        .map(|prev| {
            (0..tags.len())
                .map(|next| {
                    let bio = match (tags[prev], tags[next]) {
                        (Some(p), Some(n)) => penalty(&p, &n),
                        _ => 0.0,
                    };
                    model.transition_score(prev, next) + bio
                })
                .collect()
        })
        .collect();

    (start, transition)
}

/// Retorna (índice, valor) do máximo em um slice
fn best_in_slice(scores: &[f64]) -> (usize, f64) {
    scores
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, &v)| (i, v))
        .unwrap_or((0, f64::NEG_INFINITY))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> CrfModel {
        CrfModel::new(vec![
            "NON-ENTITY".to_string(),
            "B-PERSON".to_string(),
            "I-PERSON".to_string(),
        ])
    }

    #[test]
    fn test_viterbi_follows_emissions() {
        let model = model();
        let emission = vec![vec![0.0, 5.0, 0.0], vec![3.0, 0.0, 0.0]];
        let result = viterbi_decode(&model, &emission);
        assert_eq!(result.best_path, vec![1, 0]);
        assert!((result.best_score - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_viterbi_uses_transitions() {
        let mut model = model();
        model.set_transition(1, 2, 3.0);
        // Segundo token levemente prefere NON-ENTITY, mas B→I compensa
        let emission = vec![vec![0.0, 5.0, 0.0], vec![1.0, 0.0, 0.5]];
        let result = viterbi_decode(&model, &emission);
        assert_eq!(result.best_path, vec![1, 2]);
    }

    #[test]
    fn test_viterbi_penalizes_inside_without_begin() {
        let model = model();
        // I-PERSON tem a maior emissão no início, mas a penalidade BIO vence
        let emission = vec![vec![0.5, 0.0, 4.0]];
        let result = viterbi_decode(&model, &emission);
        assert_eq!(result.best_path, vec![0]);
    }

    #[test]
    fn test_viterbi_empty() {
        let result = viterbi_decode(&model(), &[]);
        assert!(result.best_path.is_empty());
    }
}

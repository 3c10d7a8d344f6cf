//! # Métricas de Avaliação
//!
//! - **Acurácia plana**: fração de tokens com label correto.
//! - **Relatório por classe**: precisão, revocação e F1 calculados sobre
//!   entidades inteiras pelo `rusev` (SeqEval em modo leniente). Uma entidade
//!   predita só conta como acerto se classe, início e fim coincidirem
//!   exatamente com uma entidade verdadeira.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use rusev::{Average, DivByZeroStrat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NerError, Result};
use crate::tagger::{EntityClass, NON_ENTITY};

/// Métricas de uma classe
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Número de entidades verdadeiras da classe
    pub support: usize,
}

impl From<&rusev::ClassMetrics> for ClassMetrics {
    fn from(m: &rusev::ClassMetrics) -> Self {
        Self {
            precision: f64::from(m.precision),
            recall: f64::from(m.recall),
            f1: f64::from(m.fscore),
            support: m.support,
        }
    }
}

/// Relatório de classificação por entidade
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: BTreeMap<EntityClass, ClassMetrics>,
    /// Média micro sobre todas as classes
    pub micro: ClassMetrics,
}

/// Acurácia token a token sobre todas as sentenças.
///
/// Sem tokens, a acurácia é `0.0`.
pub fn flat_accuracy<S: AsRef<str>, T: AsRef<str>>(y_true: &[Vec<S>], y_pred: &[Vec<T>]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let (correct, total) = y_true
        .iter()
        .zip(y_pred)
        .flat_map(|(t, p)| t.iter().zip(p))
        .fold((0usize, 0usize), |(correct, total), (t, p)| {
            (correct + usize::from(t.as_ref() == p.as_ref()), total + 1)
        });
    Ok(ratio(correct, total))
}

/// Calcula precisão, revocação e F1 por classe de entidade.
///
/// `NON-ENTITY` vira `O` antes de chegar ao `rusev`. Sem nenhuma entidade
/// (verdadeira ou predita) o relatório sai vazio, com a média micro zerada.
pub fn classification_report<S: AsRef<str>, T: AsRef<str>>(
    y_true: &[Vec<S>],
    y_pred: &[Vec<T>],
) -> Result<ClassificationReport> {
    check_lengths(y_true, y_pred)?;

    let y_true = to_seqeval(y_true);
    let y_pred = to_seqeval(y_pred);
    let has_entity = |seqs: &[Vec<&str>]| seqs.iter().flatten().any(|l| *l != "O");
    if !has_entity(&y_true) && !has_entity(&y_pred) {
        debug!("nenhuma entidade para avaliar");
        return Ok(ClassificationReport::default());
    }

    let reporter = rusev::classification_report(
        y_true,
        y_pred,
        None,
        DivByZeroStrat::ReplaceBy0,
        None,
        false,
        false,
    )
    .map_err(|e| NerError::Metrics(e.to_string()))?;

    let mut report = ClassificationReport::default();
    for m in HashSet::<rusev::ClassMetrics>::from(reporter) {
        match m.average {
            Average::None => {
                let class = EntityClass::from_name(&m.class)
                    .ok_or_else(|| NerError::UnknownLabel(m.class.clone()))?;
                report.classes.insert(class, ClassMetrics::from(&m));
            }
            Average::Micro => report.micro = ClassMetrics::from(&m),
            _ => {}
        }
    }
    Ok(report)
}

/// Labels no vocabulário do SeqEval: `NON-ENTITY` → `O`.
fn to_seqeval<S: AsRef<str>>(seqs: &[Vec<S>]) -> Vec<Vec<&str>> {
    seqs.iter()
        .map(|seq| {
            seq.iter()
                .map(|label| match label.as_ref() {
                    NON_ENTITY => "O",
                    other => other,
                })
                .collect()
        })
        .collect()
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for (class, m) in &self.classes {
            writeln!(
                f,
                "{:>12} {:>10.4} {:>10.4} {:>10.4} {:>10}",
                class.name(),
                m.precision,
                m.recall,
                m.f1,
                m.support
            )?;
        }
        write!(
            f,
            "{:>12} {:>10.4} {:>10.4} {:>10.4} {:>10}",
            "micro avg", self.micro.precision, self.micro.recall, self.micro.f1, self.micro.support
        )
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn check_lengths<S, T>(y_true: &[Vec<S>], y_pred: &[Vec<T>]) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(NerError::LengthMismatch {
            expected: y_true.len(),
            found: y_pred.len(),
        });
    }
    for (t, p) in y_true.iter().zip(y_pred) {
        if t.len() != p.len() {
            return Err(NerError::LengthMismatch {
                expected: t.len(),
                found: p.len(),
            });
        }
    }
    Ok(())
}

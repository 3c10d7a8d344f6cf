//! # Engenharia de Features com Janela Deslizante
//!
//! Para cada token, monta um mapa de features (nome → valor) que o modelo
//! sequencial consome. O mapa de um token combina:
//!
//! - **Features do token central**, sem prefixo, incluindo `bias`.
//! - **Features dos vizinhos** dentro da janela, com o nome prefixado pelo
//!   **índice absoluto** do vizinho na sentença (ex: `"3:token.lower()"`).
//! - **Marcadores de fronteira** `BOS` e `EOS`.
//!
//! ## Features de baixo nível
//!
//! | Chave               | Valor                                   |
//! |---------------------|-----------------------------------------|
//! | `token.lower()`     | token em minúsculas                     |
//! | `token[-3:]`        | últimos 3 caracteres                    |
//! | `token[-2:]`        | últimos 2 caracteres                    |
//! | `token[:3]`         | primeiros 3 caracteres                  |
//! | `token[:2]`         | primeiros 2 caracteres                  |
//! | `token.isupper()`   | todas as letras maiúsculas              |
//! | `token.istitle()`   | capitalizado como título                |
//! | `token.isdigit()`   | apenas dígitos                          |
//! | `contains_digit`    | contém algum dígito                     |
//! | `bias`              | `1.0` (apenas no token central)         |
//!
//! ## Janela
//!
//! A janela de um token `i` cobre os índices `[i - w, i + w)` recortados aos
//! limites da sentença. O limite direito é exclusivo: com `w = 2` o token
//! vê dois vizinhos à esquerda e um à direita.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Raio padrão da janela de contexto.
pub const DEFAULT_WINDOW_SIZE: usize = 2;

/// Mapa de features de um token.
pub type FeatureMap = HashMap<String, FeatureValue>;

/// Valor de uma feature: booleano, texto ou número.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Bool(bool),
    Float(f64),
    Str(String),
}

impl From<bool> for FeatureValue {
    fn from(value: bool) -> Self {
        FeatureValue::Bool(value)
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Float(value)
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        FeatureValue::Str(value)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Str(value.to_string())
    }
}

/// Features de um token em seu contexto.
///
/// O mapa é esparso: cada token ativa apenas as chaves da sua janela. Os valores
/// são heterogêneos e só viram números quando convertidos em atributos
/// ([`FeatureVector::attributes`]) pelo modelo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// O mapa de features. Ex: `{"BOS": true, "token.lower()": "paris", ...}`.
    pub features: FeatureMap,
    /// Índice do token na sentença.
    pub token_index: usize,
}

impl FeatureVector {
    pub fn new(token_index: usize) -> Self {
        Self {
            features: HashMap::new(),
            token_index,
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FeatureValue>) {
        self.features.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FeatureValue> {
        self.features.get(key)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Converte as features em atributos numéricos `(nome, valor)`.
    ///
    /// - Texto vira um atributo indicador `"chave=valor"` com peso `1.0`.
    /// - Booleano vira `"chave"` com `1.0` ou `0.0`.
    /// - Número vira `"chave"` com o próprio valor.
    ///
    /// A ordem segue as chaves ordenadas, para que treino e predição vejam
    /// sempre a mesma sequência de atributos.
    pub fn attributes(&self) -> Vec<(String, f64)> {
        let mut keys: Vec<&String> = self.features.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|key| match &self.features[key] {
                FeatureValue::Str(v) => (format!("{key}={v}"), 1.0),
                FeatureValue::Bool(b) => (key.clone(), if *b { 1.0 } else { 0.0 }),
                FeatureValue::Float(f) => (key.clone(), *f),
            })
            .collect()
    }
}

/// Extrai as features de baixo nível de um único token.
///
/// Com `prefix`, todas as chaves viram `"{prefix}:{chave}"`. Qualquer string é
/// aceita, inclusive a vazia (afixos vazios, predicados falsos).
pub fn lowlevel_features(token: &str, prefix: Option<&str>, include_bias: bool) -> FeatureMap {
    let mut features: Vec<(&str, FeatureValue)> = vec![
        ("token.lower()", token.to_lowercase().into()),
        ("token[-3:]", last_chars(token, 3).into()),
        ("token[-2:]", last_chars(token, 2).into()),
        ("token[:3]", first_chars(token, 3).into()),
        ("token[:2]", first_chars(token, 2).into()),
        ("token.isupper()", is_upper(token).into()),
        ("token.istitle()", is_title(token).into()),
        ("token.isdigit()", is_digit(token).into()),
        ("contains_digit", decimal_digit_regex().is_match(token).into()),
    ];

    if include_bias {
        features.push(("bias", FeatureValue::Float(1.0)));
    }

    features
        .into_iter()
        .map(|(key, value)| match prefix {
            Some(p) => (format!("{p}:{key}"), value),
            None => (key.to_string(), value),
        })
        .collect()
}

/// Extrai as features de um token em seu contexto.
///
/// O resultado começa com `BOS`/`EOS` e recebe as features de cada posição da
/// janela recortada. Vizinhos são prefixados pelo índice absoluto, portanto
/// nunca colidem com as chaves do token central.
///
/// # Panics
/// Se `center` estiver fora de `0..tokens.len()`.
pub fn token_to_features<S: AsRef<str>>(tokens: &[S], center: usize, window_size: usize) -> FeatureVector {
    let center_token = tokens[center].as_ref();
    let len = tokens.len();

    let mut fv = FeatureVector::new(center);
    fv.insert("BOS", center == 0);
    fv.insert("EOS", center == len - 1);

    let lo = center.saturating_sub(window_size);
    // Janela 0 degenera no próprio token.
    let hi = center.saturating_add(window_size).min(len).max(center + 1);

    for (index, token) in tokens[lo..hi].iter().enumerate().map(|(o, t)| (lo + o, t)) {
        if index == center {
            fv.features.extend(lowlevel_features(center_token, None, true));
        } else {
            let prefix = index.to_string();
            fv.features
                .extend(lowlevel_features(token.as_ref(), Some(&prefix), false));
        }
    }

    fv
}

/// Gera a sequência de features de uma sentença inteira.
///
/// O índice `i` do retorno corresponde ao token `i` da entrada. Sentença vazia
/// resulta em sequência vazia.
pub fn tokens_to_features<S: AsRef<str>>(tokens: &[S], window_size: usize) -> Vec<FeatureVector> {
    (0..tokens.len())
        .map(|i| token_to_features(tokens, i, window_size))
        .collect()
}

fn first_chars(token: &str, n: usize) -> String {
    token.chars().take(n).collect()
}

fn last_chars(token: &str, n: usize) -> String {
    let count = token.chars().count();
    token.chars().skip(count.saturating_sub(n)).collect()
}

/// Ao menos uma letra com caixa e nenhuma minúscula.
fn is_upper(token: &str) -> bool {
    let mut cased = false;
    for c in token.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Maiúsculas só depois de caracteres sem caixa, minúsculas só depois de
/// caracteres com caixa, e ao menos uma letra com caixa.
fn is_title(token: &str) -> bool {
    let mut cased = false;
    let mut prev_cased = false;
    for c in token.chars() {
        if c.is_uppercase() {
            if prev_cased {
                return false;
            }
            prev_cased = true;
            cased = true;
        } else if c.is_lowercase() {
            if !prev_cased {
                return false;
            }
            prev_cased = true;
            cased = true;
        } else {
            prev_cased = false;
        }
    }
    cased
}

fn decimal_digit_regex() -> &'static Regex {
    static DIGIT_RE: OnceLock<Regex> = OnceLock::new();
    DIGIT_RE.get_or_init(|| Regex::new(r"\p{Nd}").expect("padrão de dígito inválido"))
}

/// Token não vazio formado só por dígitos decimais (categoria `Nd`).
///
/// Frações e numerais romanos (`½`, `Ⅻ`) não contam. Dígitos sobrescritos e
/// circulados (`²`, `①`) também ficam de fora, embora o `isdigit` do Python os aceite.
fn is_digit(token: &str) -> bool {
    static ALL_DIGITS_RE: OnceLock<Regex> = OnceLock::new();
    ALL_DIGITS_RE
        .get_or_init(|| Regex::new(r"^\p{Nd}+$").expect("padrão de dígito inválido"))
        .is_match(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;
    use rstest::rstest;

    fn prefixes(fv: &FeatureVector) -> Vec<String> {
        let mut found: Vec<String> = fv
            .features
            .keys()
            .filter_map(|k| k.split_once(':').map(|(p, _)| p.to_string()))
            .filter(|p| p.parse::<usize>().is_ok())
            .collect();
        found.sort();
        found.dedup();
        found
    }

    #[test]
    fn test_lowlevel_exact_keys() {
        let features = lowlevel_features("Paris", None, true);
        let mut keys: Vec<&str> = features.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "bias",
                "contains_digit",
                "token.isdigit()",
                "token.istitle()",
                "token.isupper()",
                "token.lower()",
                "token[-2:]",
                "token[-3:]",
                "token[:2]",
                "token[:3]",
            ]
        );
        assert_eq!(features["token.lower()"], FeatureValue::from("paris"));
        assert_eq!(features["token[-3:]"], FeatureValue::from("ris"));
        assert_eq!(features["token[:2]"], FeatureValue::from("Pa"));
        assert_eq!(features["token.istitle()"], FeatureValue::Bool(true));
        assert_eq!(features["token.isupper()"], FeatureValue::Bool(false));
    }

    #[rstest]
    #[case("Paris", true)]
    #[case("1984", true)]
    #[case("", true)]
    #[case("Paris", false)]
    #[case("", false)]
    fn test_bias_present_only_when_requested(#[case] token: &str, #[case] include_bias: bool) {
        let features = lowlevel_features(token, None, include_bias);
        if include_bias {
            assert_eq!(features.get("bias"), Some(&FeatureValue::Float(1.0)));
        } else {
            assert!(features.get("bias").is_none());
        }
    }

    #[test]
    fn test_short_token_slices_whole_token() {
        let features = lowlevel_features("a", None, false);
        assert_eq!(features["token[-3:]"], FeatureValue::from("a"));
        assert_eq!(features["token[:2]"], FeatureValue::from("a"));
    }

    #[test]
    fn test_empty_token_is_valid() {
        let features = lowlevel_features("", None, true);
        assert_eq!(features.len(), 10);
        assert_eq!(features["token[-3:]"], FeatureValue::from(""));
        assert_eq!(features["token.isdigit()"], FeatureValue::Bool(false));
        assert_eq!(features["token.isupper()"], FeatureValue::Bool(false));
        assert_eq!(features["token.istitle()"], FeatureValue::Bool(false));
        assert_eq!(features["contains_digit"], FeatureValue::Bool(false));
    }

    #[test]
    fn test_slices_count_chars_not_bytes() {
        let features = lowlevel_features("Zürich", None, false);
        assert_eq!(features["token[:2]"], FeatureValue::from("Zü"));
        assert_eq!(features["token[-3:]"], FeatureValue::from("ich"));
    }

    #[rstest]
    #[case("NATO", true, false, false, false)]
    #[case("Nato", false, true, false, false)]
    #[case("O'Neil", false, true, false, false)]
    #[case("McDonald", false, false, false, false)]
    #[case("2024", false, false, true, true)]
    #[case("B52", true, true, false, true)]
    #[case("...", false, false, false, false)]
    #[case("½", false, false, false, false)]
    #[case("Ⅻ", true, true, false, false)]
    #[case("٢٠٢٤", false, false, true, true)]
    fn test_predicates(
        #[case] token: &str,
        #[case] upper: bool,
        #[case] title: bool,
        #[case] digit: bool,
        #[case] has_digit: bool,
    ) {
        let features = lowlevel_features(token, None, false);
        assert_eq!(features["token.isupper()"], FeatureValue::Bool(upper));
        assert_eq!(features["token.istitle()"], FeatureValue::Bool(title));
        assert_eq!(features["token.isdigit()"], FeatureValue::Bool(digit));
        assert_eq!(features["contains_digit"], FeatureValue::Bool(has_digit));
    }

    #[test]
    fn test_prefix_rewrites_every_key() {
        let features = lowlevel_features("Berlin", Some("3"), false);
        assert_eq!(features.len(), 9);
        assert!(features.keys().all(|k| k.starts_with("3:")));
        assert_eq!(features["3:token.lower()"], FeatureValue::from("berlin"));
    }

    #[test]
    fn test_window_clipped_at_sentence_start() {
        let tokens = ["a", "b", "c"];
        let fv = token_to_features(&tokens, 0, 2);
        // [0, 2): apenas o vizinho 1, nada negativo
        assert_eq!(prefixes(&fv), vec!["1".to_string()]);
        assert!(fv.features.contains_key("token.lower()"));
        assert!(!fv.features.keys().any(|k| k.starts_with('-')));
    }

    #[test]
    fn test_window_uses_absolute_index_and_exclusive_right_bound() {
        let tokens = ["w0", "w1", "w2", "w3", "w4"];
        let fv = token_to_features(&tokens, 2, 2);
        assert_eq!(prefixes(&fv), vec!["0", "1", "3"]);
        assert_eq!(fv.get("0:token.lower()"), Some(&FeatureValue::from("w0")));
        assert!(fv.get("4:token.lower()").is_none());
        // Vizinhos não carregam bias
        assert!(fv.get("1:bias").is_none());
        assert_eq!(fv.get("bias"), Some(&FeatureValue::Float(1.0)));
        // 2 fronteiras + 10 do centro + 9 por vizinho
        assert_eq!(fv.len(), 2 + 10 + 3 * 9);
    }

    #[test]
    fn test_zero_window_keeps_center_only() {
        let tokens = ["a", "b", "c"];
        let fv = token_to_features(&tokens, 1, 0);
        assert!(prefixes(&fv).is_empty());
        assert_eq!(fv.get("token.lower()"), Some(&FeatureValue::from("b")));
        assert_eq!(fv.len(), 12);
    }

    #[test]
    fn test_huge_window_covers_whole_sentence() {
        let tokens = ["a", "b", "c"];
        let fv = token_to_features(&tokens, 1, usize::MAX);
        // [0, 3) recortado: vizinhos 0 e 2
        assert_eq!(prefixes(&fv), vec!["0", "2"]);

        let all = tokens_to_features(&tokens, usize::MAX);
        assert_eq!(all.len(), 3);
        assert_eq!(prefixes(&all[2]), vec!["0", "1"]);
    }

    #[test]
    fn test_bos_eos_flags() {
        let empty: Vec<String> = vec![];
        assert!(tokens_to_features(&empty, 2).is_empty());

        let single = tokens_to_features(&["Oslo"], 2);
        assert_eq!(single[0].get("BOS"), Some(&FeatureValue::Bool(true)));
        assert_eq!(single[0].get("EOS"), Some(&FeatureValue::Bool(true)));

        let many = tokens_to_features(&["John", "lives", "in", "Oslo", "."], 2);
        for (i, fv) in many.iter().enumerate() {
            assert_eq!(fv.get("BOS"), Some(&FeatureValue::Bool(i == 0)));
            assert_eq!(fv.get("EOS"), Some(&FeatureValue::Bool(i == 4)));
            assert_eq!(fv.token_index, i);
        }
    }

    #[test]
    #[should_panic]
    fn test_center_out_of_range_panics() {
        token_to_features(&["a", "b"], 2, 2);
    }

    #[test]
    fn test_attributes_conversion() {
        let mut fv = FeatureVector::new(0);
        fv.insert("BOS", true);
        fv.insert("EOS", false);
        fv.insert("bias", 1.0);
        fv.insert("token.lower()", "oslo");

        let attrs = fv.attributes();
        assert_eq!(
            attrs,
            vec![
                ("BOS".to_string(), 1.0),
                ("EOS".to_string(), 0.0),
                ("bias".to_string(), 1.0),
                ("token.lower()=oslo".to_string(), 1.0),
            ]
        );
    }

    quickcheck! {
        fn prop_sequence_length_matches(tokens: Vec<String>, window: u8) -> bool {
            tokens_to_features(&tokens, window as usize).len() == tokens.len()
        }

        fn prop_sequencer_is_idempotent(tokens: Vec<String>) -> bool {
            tokens_to_features(&tokens, DEFAULT_WINDOW_SIZE)
                == tokens_to_features(&tokens, DEFAULT_WINDOW_SIZE)
        }
    }
}

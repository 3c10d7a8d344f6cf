//! # Esquema de Tags BIO e Codec de Classes
//!
//! Traduz os ids numéricos de classe do dataset para labels BIO e vice-versa.
//!
//! ## Classes
//!
//! | Id | Nome         |
//! |----|--------------|
//! | 0  | `NON-ENTITY` |
//! | 1  | `LOCATION`   |
//! | 2  | `PERSON`     |
//! | 4  | `MISC`       |
//!
//! O id 3 é reservado e não existe na tabela.
//!
//! ## Esquema BIO
//!
//! - `B-CLASSE`: primeiro token de uma entidade
//! - `I-CLASSE`: tokens seguintes da **mesma** entidade
//! - `NON-ENTITY`: fora de qualquer entidade
//!
//! Na decodificação, `I-` só aparece quando o id se repete imediatamente.
//! Duas classes diferentes lado a lado produzem dois `B-`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{NerError, Result};
use crate::tokenizer::Token;

/// Label dos tokens fora de entidade.
pub const NON_ENTITY: &str = "NON-ENTITY";

/// Tabela fixa id → nome de classe.
pub const CLASS_TABLE: [(u32, &str); 4] = [
    (0, NON_ENTITY),
    (1, "LOCATION"),
    (2, "PERSON"),
    (4, "MISC"),
];

/// Mapa nome de classe (ou label BIO) → cor.
pub type ColorMapping = BTreeMap<String, String>;

/// Categorias de entidade reconhecidas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityClass {
    /// **Local**: países, cidades, rios. Ex: "Paris", "Danúbio".
    Location,
    /// **Pessoa**: nomes de pessoas reais ou fictícias.
    Person,
    /// **Miscelânea**: eventos, obras, nacionalidades.
    Misc,
}

impl EntityClass {
    pub const ALL: [EntityClass; 3] = [EntityClass::Location, EntityClass::Person, EntityClass::Misc];

    pub fn name(&self) -> &'static str {
        match self {
            EntityClass::Location => "LOCATION",
            EntityClass::Person => "PERSON",
            EntityClass::Misc => "MISC",
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            EntityClass::Location => 1,
            EntityClass::Person => 2,
            EntityClass::Misc => 4,
        }
    }

    /// `None` para 0 (não-entidade) e para ids fora da tabela.
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            1 => Some(EntityClass::Location),
            2 => Some(EntityClass::Person),
            4 => Some(EntityClass::Misc),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

/// Nome da classe de um id, consultando [`CLASS_TABLE`].
pub fn class_name(id: u32) -> Result<&'static str> {
    CLASS_TABLE
        .iter()
        .find(|(class_id, _)| *class_id == id)
        .map(|(_, name)| *name)
        .ok_or(NerError::UnknownClassId(id))
}

/// Tag BIO aplicada a um token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// **Begin**: início de uma entidade.
    Begin(EntityClass),
    /// **Inside**: continuação da entidade anterior.
    Inside(EntityClass),
    /// **Outside**: `NON-ENTITY`.
    Outside,
}

impl Tag {
    /// Representação textual da tag (ex: "B-PERSON", "I-MISC", "NON-ENTITY")
    pub fn label(&self) -> String {
        match self {
            Tag::Begin(class) => format!("B-{}", class.name()),
            Tag::Inside(class) => format!("I-{}", class.name()),
            Tag::Outside => NON_ENTITY.to_string(),
        }
    }

    pub fn class(&self) -> Option<EntityClass> {
        match self {
            Tag::Begin(c) | Tag::Inside(c) => Some(*c),
            Tag::Outside => None,
        }
    }

    /// `I-X` só pode seguir `B-X` ou `I-X`; o resto é sempre válido.
    pub fn is_valid_transition(prev: &Tag, next: &Tag) -> bool {
        match next {
            Tag::Inside(class) => match prev {
                Tag::Begin(prev_class) | Tag::Inside(prev_class) => prev_class == class,
                Tag::Outside => false,
            },
            _ => true,
        }
    }

    /// Parseia uma tag a partir de string (ex: "B-PERSON" → Begin(Person))
    pub fn from_label(s: &str) -> Option<Self> {
        if s == NON_ENTITY {
            return Some(Tag::Outside);
        }
        let (prefix, name) = s.split_once('-')?;
        let class = EntityClass::from_name(name)?;
        match prefix {
            "B" => Some(Tag::Begin(class)),
            "I" => Some(Tag::Inside(class)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Decodifica os ids de classe de uma sentença em tags BIO.
///
/// O estado (`último id`) é um acumulador local do fold: cada chamada começa do
/// zero e nada vaza entre sentenças.
///
/// - `0` emite `NON-ENTITY` e zera o estado.
/// - id diferente do anterior emite `B-`.
/// - id igual ao imediatamente anterior emite `I-`.
pub fn decode_class_ids(ids: &[u32]) -> Result<Vec<Tag>> {
    let (tags, _) = ids.iter().try_fold(
        (Vec::with_capacity(ids.len()), None::<u32>),
        |(mut tags, last), &id| -> Result<(Vec<Tag>, Option<u32>)> {
            if id == 0 {
                tags.push(Tag::Outside);
                return Ok((tags, None));
            }
            let class = EntityClass::from_id(id).ok_or(NerError::UnknownClassId(id))?;
            if last == Some(id) {
                tags.push(Tag::Inside(class));
            } else {
                tags.push(Tag::Begin(class));
            }
            Ok((tags, Some(id)))
        },
    )?;
    Ok(tags)
}

/// Decodifica ids de classe direto em labels BIO textuais.
pub fn numbers_to_labels(ids: &[u32]) -> Result<Vec<String>> {
    Ok(decode_class_ids(ids)?.iter().map(Tag::label).collect())
}

/// Expande um mapa classe → cor para o esquema BIO.
///
/// `NON-ENTITY` é mantido; cada outra classe `X` vira `B-X` e `I-X` com a cor
/// original.
pub fn expand_bio(colors: &ColorMapping) -> ColorMapping {
    let mut expanded = ColorMapping::new();
    for (name, color) in colors {
        if name == NON_ENTITY {
            expanded.insert(name.clone(), color.clone());
        } else {
            expanded.insert(format!("B-{name}"), color.clone());
            expanded.insert(format!("I-{name}"), color.clone());
        }
    }
    expanded
}

/// Um token com o label BIO predito
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedToken {
    pub token: Token,
    pub label: String,
}

/// Uma entidade: sequência `B-X I-X*` de tokens
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntitySpan {
    pub class: EntityClass,
    /// Índice do primeiro token
    pub start_token: usize,
    /// Índice do último token (inclusivo)
    pub end_token: usize,
}

/// Converte uma sequência de labels BIO em spans de entidades.
///
/// - `B-X` abre uma nova entidade.
/// - `I-X` continua a entidade aberta se ela for da mesma classe; caso
///   contrário abre uma nova (modo leniente).
/// - `NON-ENTITY` fecha a entidade aberta.
///
/// # Exemplo
/// `[B-PERSON, I-PERSON, NON-ENTITY, B-LOCATION]` -> `[PERSON(0..=1), LOCATION(3..=3)]`
pub fn labels_to_spans<S: AsRef<str>>(labels: &[S]) -> Result<Vec<EntitySpan>> {
    let mut spans = Vec::new();
    let mut open: Option<EntitySpan> = None;

    for (i, label) in labels.iter().enumerate() {
        let label = label.as_ref();
        let tag = Tag::from_label(label).ok_or_else(|| NerError::UnknownLabel(label.to_string()))?;

        match tag {
            Tag::Inside(class) if open.as_ref().is_some_and(|s| s.class == class) => {
                if let Some(span) = open.as_mut() {
                    span.end_token = i;
                }
            }
            Tag::Begin(class) | Tag::Inside(class) => {
                spans.extend(open.take());
                open = Some(EntitySpan {
                    class,
                    start_token: i,
                    end_token: i,
                });
            }
            Tag::Outside => spans.extend(open.take()),
        }
    }
    spans.extend(open);

    Ok(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_decode_resets_on_zero() {
        let labels = numbers_to_labels(&[1, 1, 2, 0, 1]).unwrap();
        assert_eq!(
            labels,
            vec!["B-LOCATION", "I-LOCATION", "B-PERSON", "NON-ENTITY", "B-LOCATION"]
        );
    }

    #[test]
    fn test_adjacent_classes_both_begin() {
        let labels = numbers_to_labels(&[1, 2]).unwrap();
        assert_eq!(labels, vec!["B-LOCATION", "B-PERSON"]);
    }

    #[test]
    fn test_decode_long_runs() {
        let tags = decode_class_ids(&[4, 4, 4, 0, 0, 2]).unwrap();
        assert_eq!(
            tags,
            vec![
                Tag::Begin(EntityClass::Misc),
                Tag::Inside(EntityClass::Misc),
                Tag::Inside(EntityClass::Misc),
                Tag::Outside,
                Tag::Outside,
                Tag::Begin(EntityClass::Person),
            ]
        );
    }

    #[test]
    fn test_decode_empty() {
        assert!(numbers_to_labels(&[]).unwrap().is_empty());
    }

    #[rstest]
    #[case(3)]
    #[case(5)]
    #[case(42)]
    fn test_unknown_class_id_fails(#[case] id: u32) {
        let err = numbers_to_labels(&[1, id]).unwrap_err();
        assert!(matches!(err, NerError::UnknownClassId(found) if found == id));
    }

    #[test]
    fn test_decode_state_does_not_leak_between_calls() {
        assert_eq!(numbers_to_labels(&[2]).unwrap(), vec!["B-PERSON"]);
        assert_eq!(numbers_to_labels(&[2]).unwrap(), vec!["B-PERSON"]);
    }

    #[test]
    fn test_class_name_lookup() {
        assert_eq!(class_name(0).unwrap(), "NON-ENTITY");
        assert_eq!(class_name(4).unwrap(), "MISC");
        assert!(class_name(3).is_err());
    }

    #[test]
    fn test_expand_bio() {
        let mut colors = ColorMapping::new();
        colors.insert("NON-ENTITY".to_string(), "white".to_string());
        colors.insert("LOCATION".to_string(), "green".to_string());

        let expanded = expand_bio(&colors);
        let expected: ColorMapping = [
            ("NON-ENTITY", "white"),
            ("B-LOCATION", "green"),
            ("I-LOCATION", "green"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(expanded, expected);
    }

    #[test]
    fn test_tag_labels_roundtrip() {
        for tag in [
            Tag::Outside,
            Tag::Begin(EntityClass::Location),
            Tag::Inside(EntityClass::Person),
            Tag::Begin(EntityClass::Misc),
        ] {
            assert_eq!(Tag::from_label(&tag.label()), Some(tag));
        }
        assert_eq!(Tag::from_label("O"), None);
        assert_eq!(Tag::from_label("B-ORG"), None);
    }

    #[test]
    fn test_valid_transitions() {
        assert!(Tag::is_valid_transition(
            &Tag::Begin(EntityClass::Person),
            &Tag::Inside(EntityClass::Person)
        ));
        assert!(!Tag::is_valid_transition(
            &Tag::Outside,
            &Tag::Inside(EntityClass::Person)
        ));
        assert!(!Tag::is_valid_transition(
            &Tag::Begin(EntityClass::Location),
            &Tag::Inside(EntityClass::Person)
        ));
    }

    #[test]
    fn test_labels_to_spans() {
        let labels = ["B-PERSON", "I-PERSON", "NON-ENTITY", "B-LOCATION", "B-LOCATION", "I-MISC"];
        let spans = labels_to_spans(&labels).unwrap();
        assert_eq!(
            spans,
            vec![
                EntitySpan { class: EntityClass::Person, start_token: 0, end_token: 1 },
                EntitySpan { class: EntityClass::Location, start_token: 3, end_token: 3 },
                EntitySpan { class: EntityClass::Location, start_token: 4, end_token: 4 },
                EntitySpan { class: EntityClass::Misc, start_token: 5, end_token: 5 },
            ]
        );
    }

    #[test]
    fn test_labels_to_spans_rejects_unknown_label() {
        assert!(matches!(
            labels_to_spans(&["B-PERSON", "B-ORG"]),
            Err(NerError::UnknownLabel(label)) if label == "B-ORG"
        ));
    }
}

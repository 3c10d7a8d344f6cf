//! Configuração das classes: id → nome + cor de destaque.
//!
//! O arquivo pode ser YAML (`.yaml` / `.yml`) ou JSON (`.json`):
//!
//! ```yaml
//! 0: { name: NON-ENTITY, color: white }
//! 1: { name: LOCATION, color: green }
//! 2: { name: PERSON, color: red }
//! 4: { name: MISC, color: blue }
//! ```
//!
//! ```json
//! {
//!   "0": { "name": "NON-ENTITY", "color": "white" },
//!   "1": { "name": "LOCATION",   "color": "green" },
//!   "2": { "name": "PERSON",     "color": "red" },
//!   "4": { "name": "MISC",       "color": "blue" }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NerError, Result};
use crate::tagger::{expand_bio, ColorMapping, CLASS_TABLE};

/// Entrada de uma classe no arquivo de configuração
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntry {
    pub name: String,
    pub color: String,
}

/// Mapa id de classe → [`ClassEntry`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassConfig {
    pub classes: BTreeMap<u32, ClassEntry>,
}

impl Default for ClassConfig {
    fn default() -> Self {
        let colors = ["white", "green", "red", "blue"];
        let classes = CLASS_TABLE
            .iter()
            .zip(colors)
            .map(|(&(id, name), color)| {
                (
                    id,
                    ClassEntry {
                        name: name.to_string(),
                        color: color.to_string(),
                    },
                )
            })
            .collect();
        Self { classes }
    }
}

impl ClassConfig {
    /// Lê e valida a configuração de um arquivo YAML ou JSON; o formato vem
    /// da extensão.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let suffix = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_lowercase();
        let text = fs::read_to_string(path).map_err(|e| NerError::io(path, e))?;
        let config: Self = match suffix.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&text)?,
            "json" => serde_json::from_str(&text)?,
            _ => return Err(NerError::UnsupportedFormat(suffix)),
        };
        config.validate()?;
        debug!(path = %path.display(), classes = config.classes.len(), "configuração carregada");
        Ok(config)
    }

    /// id → nome da classe
    pub fn class_mapping(&self) -> BTreeMap<u32, String> {
        self.classes
            .iter()
            .map(|(&id, entry)| (id, entry.name.clone()))
            .collect()
    }

    /// Nome da classe → cor. Com `bio`, cada entidade vira `B-X` e `I-X`.
    pub fn color_mapping(&self, bio: bool) -> ColorMapping {
        let plain: ColorMapping = self
            .classes
            .values()
            .map(|entry| (entry.name.clone(), entry.color.clone()))
            .collect();
        if bio {
            expand_bio(&plain)
        } else {
            plain
        }
    }

    /// Cada par (id, nome) precisa existir na tabela fixa de classes.
    pub fn validate(&self) -> Result<()> {
        for (id, entry) in &self.classes {
            let expected = CLASS_TABLE
                .iter()
                .find(|(table_id, _)| table_id == id)
                .map(|&(_, name)| name);
            match expected {
                Some(name) if name == entry.name => {}
                Some(name) => {
                    return Err(NerError::InvalidConfig(format!(
                        "classe {id} deveria se chamar {name:?}, encontrado {:?}",
                        entry.name
                    )))
                }
                None => {
                    return Err(NerError::InvalidConfig(format!(
                        "id de classe {id} fora da tabela"
                    )))
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_table() {
        let config = ClassConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.class_mapping()[&4], "MISC");
        assert_eq!(config.color_mapping(false)["PERSON"], "red");
    }

    #[test]
    fn test_color_mapping_bio_expansion() {
        let mapping = ClassConfig::default().color_mapping(true);
        let expected: ColorMapping = [
            ("NON-ENTITY", "white"),
            ("B-LOCATION", "green"),
            ("I-LOCATION", "green"),
            ("B-PERSON", "red"),
            ("I-PERSON", "red"),
            ("B-MISC", "blue"),
            ("I-MISC", "blue"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(mapping, expected);
    }

    #[test]
    fn test_parse_json_with_string_keys() {
        let config: ClassConfig = serde_json::from_str(
            r#"{"0": {"name": "NON-ENTITY", "color": "default"}, "2": {"name": "PERSON", "color": "yellow"}}"#,
        )
        .unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.color_mapping(true)["I-PERSON"], "yellow");
        assert!(!config.color_mapping(true).contains_key("B-LOCATION"));
    }

    #[test]
    fn test_validate_rejects_wrong_name_and_id() {
        let mut config = ClassConfig::default();
        config.classes.get_mut(&1).unwrap().name = "PLACE".to_string();
        assert!(matches!(config.validate(), Err(NerError::InvalidConfig(_))));

        let mut config = ClassConfig::default();
        let location = config.classes[&1].clone();
        config.classes.insert(3, location);
        assert!(matches!(config.validate(), Err(NerError::InvalidConfig(_))));
    }

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("wikiner-config-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_yaml_and_json() {
        let yaml = temp_file(
            "classes.yaml",
            "0:\n  name: NON-ENTITY\n  color: white\n2:\n  name: PERSON\n  color: red\n",
        );
        let yml = temp_file("classes.yml", "1: { name: LOCATION, color: cyan }\n");
        let json = temp_file("classes.json", r#"{"4": {"name": "MISC", "color": "blue"}}"#);

        let from_yaml = ClassConfig::load(&yaml);
        let from_yml = ClassConfig::load(&yml);
        let from_json = ClassConfig::load(&json);
        for path in [&yaml, &yml, &json] {
            std::fs::remove_file(path).ok();
        }

        let from_yaml = from_yaml.unwrap();
        assert_eq!(from_yaml.class_mapping()[&2], "PERSON");
        assert_eq!(from_yaml.color_mapping(true)["B-PERSON"], "red");
        assert_eq!(from_yml.unwrap().color_mapping(false)["LOCATION"], "cyan");
        assert_eq!(from_json.unwrap().class_mapping()[&4], "MISC");
    }

    #[test]
    fn test_load_validates_yaml() {
        let path = temp_file("bad.yaml", "2: { name: PLACE, color: red }\n");
        let result = ClassConfig::load(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(NerError::InvalidConfig(_))));
    }

    #[test]
    fn test_load_rejects_unknown_suffix() {
        let path = temp_file("classes.toml", "");
        let result = ClassConfig::load(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(NerError::UnsupportedFormat(s)) if s == "toml"));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            ClassConfig::load("/nonexistent/classes.yaml"),
            Err(NerError::Io { .. })
        ));
    }
}

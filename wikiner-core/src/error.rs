//! Tipos de erro da biblioteca.

use std::path::PathBuf;

use thiserror::Error;

/// Erro principal do `wikiner-core`.
///
/// Todas as falhas são erros de programação ou de dados: são propagadas
/// imediatamente ao chamador e nunca reprocessadas.
#[derive(Error, Debug)]
pub enum NerError {
    /// Id de classe fora da tabela fixa {0, 1, 2, 4}
    #[error("id de classe desconhecido: {0}")]
    UnknownClassId(u32),

    /// Linha do dataset com número de tokens diferente do número de tags
    #[error("linha {row}: {tokens} tokens mas {tags} tags")]
    RowArityMismatch {
        row: usize,
        tokens: usize,
        tags: usize,
    },

    /// Extensão de arquivo sem leitor registrado
    #[error("formato de arquivo não suportado: {0:?}")]
    UnsupportedFormat(String),

    /// Erro de I/O com o caminho do arquivo
    #[error("erro de I/O em {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Erro de (de)serialização JSON
    #[error("erro JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Erro de (de)serialização YAML
    #[error("erro YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Falha no cálculo das métricas de avaliação
    #[error("erro nas métricas: {0}")]
    Metrics(String),

    /// Configuração inválida (classes, algoritmo de treino, ...)
    #[error("configuração inválida: {0}")]
    InvalidConfig(String),

    /// Nome de cor sem código ANSI correspondente
    #[error("cor desconhecida: {0:?}")]
    UnknownColor(String),

    /// Label BIO sem cor ou fora do esquema
    #[error("label desconhecido: {0:?}")]
    UnknownLabel(String),

    /// Dados de treino sem nenhum token rotulado
    #[error("dados de treino sem labels")]
    EmptyTrainingData,

    /// Predição pedida a um modelo ainda não treinado
    #[error("o modelo ainda não foi treinado")]
    ModelNotFitted,

    /// Sequências paralelas com tamanhos diferentes
    #[error("tamanhos incompatíveis: esperado {expected}, encontrado {found}")]
    LengthMismatch { expected: usize, found: usize },
}

impl NerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        NerError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, NerError>;

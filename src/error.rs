use thiserror::Error;

/// Ошибки загрузки конфигурации и входных данных.
///
/// Сами алгоритмы гидрологии не падают: некорректные высоты зажимаются в `[0, 1]`,
/// вырожденные сетки дают пустой результат.
#[derive(Debug, Error)]
pub enum HydromapError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("row {row} has {found} values, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
}

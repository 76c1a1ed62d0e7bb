//! Ошибки генерации карты и загрузки конфигурации.

use thiserror::Error;

/// Фатальная ошибка одного прогона генерации.
///
/// Любая из них прерывает весь прогон: частично заполненная карта наружу не отдаётся.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// Карта нулевого размера.
    #[error("Map dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    /// Минимальный радиус горы не меньше максимального.
    #[error("Minimum mountain radius {min} must be lower than maximum radius {max}")]
    InvalidMountainRadius { min: u32, max: u32 },
    /// В таблице порогов нет ни одной записи.
    #[error("Threshold table is empty")]
    EmptyThresholdTable,
    /// Террейн уровня моря отсутствует в таблице порогов.
    #[error("Sea level terrain '{0}' is not part of the threshold table")]
    SeaLevelMissing(String),
    /// Пороги идут не строго по возрастанию.
    #[error("Thresholds must be strictly increasing, found {previous} followed by {next}")]
    UnsortedThresholds { previous: i32, next: i32 },
    /// Один и тот же террейн встречается в таблице дважды.
    #[error("Terrain '{0}' appears more than once in the threshold table")]
    DuplicateTerrain(String),
    /// Карта идеально плоская, нормализовать нечего.
    #[error("Min and max height are the same ({0})")]
    FlatMap(f64),
    /// Высота ячейки выше всех порогов.
    #[error("Height {height} at ({x}, {y}) does not map to any terrain")]
    Unclassified { x: u32, y: u32, height: i32 },
}

/// Ошибка чтения или разбора конфигурации мира.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Unknown terrain '{0}'")]
    UnknownTerrain(String),
    #[error("Terrain '{terrain}' references unknown liquid {liquid}")]
    UnknownLiquid { terrain: String, liquid: u32 },
    #[error("Duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: u32 },
    #[error("Invalid height map: {0}")]
    HeightMap(#[from] GenerationError),
}

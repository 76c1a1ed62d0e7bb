// src/config.rs
//! Конфигурация генерации карты
//!
//! Этот модуль определяет все параметры, управляющие процедурной генерацией:
//! - Размеры карты и сид генератора
//! - Параметры гор и шума
//! - Параметры рек
//! - Каталог террейнов и таблицу порогов высот (в составе [`WorldSetup`])
//!
//! Все структуры поддерживают сериализацию в TOML/JSON для удобной настройки через конфигурационные файлы.

use crate::classifier::TerrainClassifier;
use crate::error::ConfigError;
use crate::noise::{DEFAULT_OCTAVES, DEFAULT_PERSISTENCE};
use crate::terrain::{CatalogConfig, TerrainCatalog};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Источник шума для огрубления рельефа
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum NoiseKind {
    /// Value-noise на банке простых чисел с косинусной интерполяцией
    #[default]
    Value,
    /// OpenSimplex2 из `fastnoise-lite`
    OpenSimplex,
}

/// Настройки шумового прохода
///
/// Шум вычитается (по модулю) из высоты каждой ячейки после того, как упали все горы.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoiseSettings {
    /// Выполнять ли шумовой проход вообще
    #[serde(default = "default_noise_enabled")]
    pub enabled: bool,

    /// Тип шума (по умолчанию `Value`)
    #[serde(default)]
    pub kind: NoiseKind,

    /// Начальная амплитуда
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,

    /// Затухание амплитуды от октавы к октаве
    #[serde(default = "default_persistence")]
    pub persistence: f64,

    /// Количество октав
    #[serde(default = "default_octaves")]
    pub octaves: u32,
}

fn default_noise_enabled() -> bool {
    true
}
fn default_amplitude() -> f64 {
    10.0
}
fn default_persistence() -> f64 {
    DEFAULT_PERSISTENCE
}
fn default_octaves() -> u32 {
    DEFAULT_OCTAVES
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            kind: NoiseKind::Value,
            amplitude: 10.0,
            persistence: DEFAULT_PERSISTENCE,
            octaves: DEFAULT_OCTAVES,
        }
    }
}

/// Основные параметры генерации карты
///
/// Полная конфигурация для одного прогона генератора.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationConfig {
    /// Сид генератора случайных чисел (детерминированная генерация)
    #[serde(default)]
    pub seed: u64,

    /// Ширина карты в ячейках
    #[serde(default = "default_width")]
    pub width: u32,

    /// Высота карты в ячейках
    #[serde(default = "default_height")]
    pub height: u32,

    /// Вертикальный размер мира. Двумерным генератором не используется
    #[serde(default = "default_elevation")]
    pub elevation: u32,

    /// Сколько гор сбросить на карту
    #[serde(default = "default_num_mountains")]
    pub num_mountains: u32,

    /// Минимальный радиус горы (строго меньше максимального)
    #[serde(default = "default_min_mountain_radius")]
    pub min_mountain_radius: u32,

    /// Максимальный радиус горы
    #[serde(default = "default_max_mountain_radius")]
    pub max_mountain_radius: u32,

    /// Максимальное количество рек
    #[serde(default = "default_num_rivers")]
    pub num_rivers: u32,

    /// Минимальное расстояние между истоками рек
    #[serde(default = "default_min_river_distance")]
    pub min_river_distance: u32,

    /// Количество лесов. Принимается, но генератор лесов не реализован
    #[serde(default)]
    pub num_forests: u32,

    /// Минимальное расстояние между лесами. Принимается, но не используется
    #[serde(default)]
    pub min_forest_distance: u32,

    /// Настройки шумового прохода
    #[serde(default)]
    pub noise: NoiseSettings,
}

fn default_width() -> u32 {
    100
}
fn default_height() -> u32 {
    100
}
fn default_elevation() -> u32 {
    1
}
fn default_num_mountains() -> u32 {
    50
}
fn default_min_mountain_radius() -> u32 {
    5
}
fn default_max_mountain_radius() -> u32 {
    15
}
fn default_num_rivers() -> u32 {
    4
}
fn default_min_river_distance() -> u32 {
    15
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            width: 100,
            height: 100,
            elevation: 1,
            num_mountains: 50,
            min_mountain_radius: 5,
            max_mountain_radius: 15,
            num_rivers: 4,
            min_river_distance: 15,
            num_forests: 0,
            min_forest_distance: 0,
            noise: NoiseSettings::default(),
        }
    }
}

impl GenerationConfig {
    /// Загружает параметры из TOML-файла
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}

/// Таблица порогов в том виде, как её пишет автор контента
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeightMapConfig {
    /// Имя таблицы, только для логов
    #[serde(default)]
    pub name: String,

    /// Имя террейна, соответствующего уровню моря
    pub sea_level: String,

    /// Пороги высот; порядок в файле не важен
    pub thresholds: Vec<ThresholdConfig>,
}

/// Одна запись таблицы порогов
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThresholdConfig {
    /// Имя террейна из каталога
    pub terrain: String,
    /// Наибольшая нормализованная высота (0–100), которая ещё относится к этому террейну
    pub height: i32,
}

/// Полный набор входных данных генератора: параметры, каталог и таблица порогов
///
/// # Пример
/// ```toml
/// [generation]
/// seed = 42
/// width = 60
/// height = 40
///
/// [[liquids]]
/// id = 1
/// name = "water"
///
/// [[terrains]]
/// id = 1
/// name = "sea"
/// symbol = "~"
/// kind = "Liquid"
/// liquid_content = { liquid = 1, volume = 1000 }
///
/// [height_map]
/// sea_level = "sea"
/// thresholds = [{ terrain = "sea", height = 100 }]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorldSetup {
    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(flatten)]
    pub catalog: CatalogConfig,

    pub height_map: HeightMapConfig,
}

impl WorldSetup {
    /// Загружает описание мира из TOML-файла
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Собирает каталог и классификатор, проверяя все ссылки по именам.
    pub fn build(&self) -> Result<(TerrainCatalog, TerrainClassifier), ConfigError> {
        let catalog = TerrainCatalog::from_config(&self.catalog)?;
        let classifier = TerrainClassifier::from_config(&self.height_map, &catalog)?;
        Ok((catalog, classifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config: GenerationConfig = toml::from_str("seed = 9\nwidth = 30").unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.width, 30);
        assert_eq!(config.height, 100);
        assert_eq!(config.noise, NoiseSettings::default());
        assert_eq!(
            GenerationConfig {
                seed: 9,
                width: 30,
                ..GenerationConfig::default()
            },
            config
        );
    }

    #[test]
    fn forest_settings_are_accepted() {
        let config: GenerationConfig =
            toml::from_str("num_forests = 3\nmin_forest_distance = 8").unwrap();
        assert_eq!(config.num_forests, 3);
        assert_eq!(config.min_forest_distance, 8);
    }

    #[test]
    fn noise_kind_parses() {
        let config: GenerationConfig =
            toml::from_str("[noise]\nkind = \"OpenSimplex\"\namplitude = 4.0").unwrap();
        assert_eq!(config.noise.kind, NoiseKind::OpenSimplex);
        assert!((config.noise.amplitude - 4.0).abs() < f64::EPSILON);
        assert!(config.noise.enabled);
    }
}

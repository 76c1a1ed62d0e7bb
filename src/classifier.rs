//! Отображение нормализованной высоты на тип местности.

use crate::config::HeightMapConfig;
use crate::error::{ConfigError, GenerationError};
use crate::terrain::{TerrainCatalog, TerrainDescriptor};
use std::collections::HashSet;
use std::sync::Arc;

/// Запись таблицы порогов: все высоты `<= height` относятся к `terrain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Threshold {
    pub height: i32,
    pub terrain: Arc<TerrainDescriptor>,
}

/// Упорядоченная по возрастанию таблица порогов и террейн уровня моря.
///
/// После построения классификатор только читается, поэтому один экземпляр
/// можно делить между параллельными прогонами генератора.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainClassifier {
    pub name: String,
    sea_level: Arc<TerrainDescriptor>,
    thresholds: Vec<Threshold>,
}

impl TerrainClassifier {
    pub fn new(name: impl Into<String>, sea_level: Arc<TerrainDescriptor>) -> Self {
        Self {
            name: name.into(),
            sea_level,
            thresholds: Vec::new(),
        }
    }

    /// Собирает классификатор из таблицы, где террейны указаны по имени.
    pub fn from_config(
        config: &HeightMapConfig,
        catalog: &TerrainCatalog,
    ) -> Result<Self, ConfigError> {
        let lookup = |name: &str| {
            catalog
                .terrain_by_name(name)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownTerrain(name.to_string()))
        };
        let sea_level = lookup(config.sea_level.as_str())?;
        let mut classifier = Self::new(config.name.clone(), sea_level);
        for entry in &config.thresholds {
            classifier.add_threshold(lookup(entry.terrain.as_str())?, entry.height);
        }
        classifier.validate()?;
        Ok(classifier)
    }

    /// Добавляет порог и пересортировывает таблицу по возрастанию.
    pub fn add_threshold(&mut self, terrain: Arc<TerrainDescriptor>, height: i32) {
        self.thresholds.push(Threshold { height, terrain });
        self.thresholds.sort_by_key(|t| t.height);
    }

    pub fn thresholds(&self) -> &[Threshold] {
        &self.thresholds
    }

    pub fn sea_level_terrain(&self) -> &Arc<TerrainDescriptor> {
        &self.sea_level
    }

    /// Проверка таблицы один раз при построении, а не на каждый запрос.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.thresholds.is_empty() {
            return Err(GenerationError::EmptyThresholdTable);
        }
        for pair in self.thresholds.windows(2) {
            if pair[0].height >= pair[1].height {
                return Err(GenerationError::UnsortedThresholds {
                    previous: pair[0].height,
                    next: pair[1].height,
                });
            }
        }
        let mut seen = HashSet::new();
        for threshold in &self.thresholds {
            if !seen.insert(threshold.terrain.id) {
                return Err(GenerationError::DuplicateTerrain(
                    threshold.terrain.name.clone(),
                ));
            }
        }
        if self.position(&self.sea_level).is_none() {
            return Err(GenerationError::SeaLevelMissing(self.sea_level.name.clone()));
        }
        Ok(())
    }

    /// Первый террейн, чей порог не меньше `height`.
    pub fn terrain_for(&self, height: i32) -> Option<&Arc<TerrainDescriptor>> {
        self.thresholds
            .iter()
            .find(|t| height <= t.height)
            .map(|t| &t.terrain)
    }

    fn position(&self, terrain: &TerrainDescriptor) -> Option<usize> {
        self.thresholds
            .iter()
            .position(|t| t.terrain.id == terrain.id)
    }

    /// Порядковое смещение террейна относительно уровня моря.
    ///
    /// `None`, если террейна или уровня моря нет в таблице.
    pub fn offset_of(&self, terrain: &TerrainDescriptor) -> Option<i32> {
        let level = self.position(terrain)? as i32;
        let sea = self.position(&self.sea_level)? as i32;
        Some(level - sea)
    }

    pub fn is_above_sea_level(&self, terrain: &TerrainDescriptor) -> bool {
        self.offset_of(terrain).is_some_and(|offset| offset > 0)
    }

    /// Порог террейна уровня моря.
    pub fn sea_level_height(&self) -> Option<i32> {
        self.thresholds
            .iter()
            .find(|t| t.terrain.id == self.sea_level.id)
            .map(|t| t.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TerrainKind;

    fn terrain(id: u32, name: &str) -> Arc<TerrainDescriptor> {
        Arc::new(TerrainDescriptor::new(id, name, 'x', TerrainKind::Open))
    }

    fn three_bands() -> (TerrainClassifier, [Arc<TerrainDescriptor>; 3]) {
        let water = terrain(1, "water");
        let plain = terrain(2, "plain");
        let mountain = terrain(3, "mountain");
        let mut classifier = TerrainClassifier::new("test", water.clone());
        // Порядок добавления не важен
        classifier.add_threshold(mountain.clone(), 100);
        classifier.add_threshold(water.clone(), 20);
        classifier.add_threshold(plain.clone(), 60);
        (classifier, [water, plain, mountain])
    }

    #[test]
    fn three_band_scenario() {
        let (classifier, [water, plain, mountain]) = three_bands();
        assert!(classifier.validate().is_ok());
        assert_eq!(classifier.terrain_for(10).unwrap().id, water.id);
        assert_eq!(classifier.terrain_for(20).unwrap().id, water.id);
        assert_eq!(classifier.terrain_for(60).unwrap().id, plain.id);
        assert_eq!(classifier.terrain_for(61).unwrap().id, mountain.id);
        assert_eq!(classifier.offset_of(&mountain), Some(2));
        assert_eq!(classifier.offset_of(&water), Some(0));
        assert!(classifier.is_above_sea_level(&plain));
        assert!(!classifier.is_above_sea_level(&water));
        assert_eq!(classifier.sea_level_height(), Some(20));
    }

    #[test]
    fn above_highest_threshold_is_unclassified() {
        let (classifier, _) = three_bands();
        assert!(classifier.terrain_for(101).is_none());
    }

    #[test]
    fn lookup_is_monotonic() {
        let (classifier, _) = three_bands();
        let mut last = 0;
        for h in 0..=100 {
            let t = classifier.terrain_for(h).unwrap();
            let pos = classifier.position(t).unwrap();
            assert!(pos >= last, "height {h} went back from {last} to {pos}");
            last = pos;
        }
    }

    #[test]
    fn below_sea_level_offset_is_negative() {
        let deep = terrain(4, "deep");
        let (mut classifier, _) = three_bands();
        classifier.add_threshold(deep.clone(), 5);
        assert_eq!(classifier.offset_of(&deep), Some(-1));
        assert!(!classifier.is_above_sea_level(&deep));
    }

    #[test]
    fn missing_sea_level_is_reported() {
        let ghost = terrain(9, "ghost");
        let mut classifier = TerrainClassifier::new("broken", ghost.clone());
        classifier.add_threshold(terrain(1, "water"), 100);
        assert_eq!(classifier.sea_level_height(), None);
        assert_eq!(classifier.offset_of(&ghost), None);
        assert_eq!(
            classifier.validate(),
            Err(GenerationError::SeaLevelMissing("ghost".into()))
        );
    }

    #[test]
    fn empty_and_duplicate_tables_are_rejected() {
        let water = terrain(1, "water");
        let mut classifier = TerrainClassifier::new("empty", water.clone());
        assert_eq!(classifier.validate(), Err(GenerationError::EmptyThresholdTable));

        classifier.add_threshold(water.clone(), 20);
        classifier.add_threshold(water.clone(), 40);
        assert_eq!(
            classifier.validate(),
            Err(GenerationError::DuplicateTerrain("water".into()))
        );
    }

    #[test]
    fn equal_thresholds_are_rejected() {
        let water = terrain(1, "water");
        let mut classifier = TerrainClassifier::new("ties", water.clone());
        classifier.add_threshold(water, 50);
        classifier.add_threshold(terrain(2, "plain"), 50);
        assert_eq!(
            classifier.validate(),
            Err(GenerationError::UnsortedThresholds {
                previous: 50,
                next: 50
            })
        );
    }
}

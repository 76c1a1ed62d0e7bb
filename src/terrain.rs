//! Каталог террейнов и жидкостей.
//!
//! Каталог собирается один раз из конфигурации и дальше только читается:
//! ячейки карты и таблица порогов держат общие `Arc<TerrainDescriptor>`.

use crate::error::ConfigError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerrainId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LiquidId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Liquid {
    pub id: LiquidId,
    pub name: String,
}

/// Физическая природа террейна
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TerrainKind {
    /// Проходимая земля: равнины, холмы, горные тропы
    #[default]
    Open,
    /// Водоёмы: море, озёра, болота
    Liquid,
    /// Непроходимая порода или стены
    Solid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainFlag {
    Indoor,
    NaturalLight,
}

impl TerrainFlag {
    const fn bit(self) -> u32 {
        match self {
            TerrainFlag::Indoor => 1,
            TerrainFlag::NaturalLight => 2,
        }
    }
}

/// Битовая маска флагов террейна. В конфигурации пишется списком.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<TerrainFlag>", into = "Vec<TerrainFlag>")]
pub struct TerrainFlags(u32);

impl TerrainFlags {
    pub const NONE: Self = Self(0);

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn contains(self, flag: TerrainFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    #[must_use]
    pub const fn with(self, flag: TerrainFlag) -> Self {
        Self(self.0 | flag.bit())
    }
}

impl From<Vec<TerrainFlag>> for TerrainFlags {
    fn from(flags: Vec<TerrainFlag>) -> Self {
        flags.into_iter().fold(Self::NONE, Self::with)
    }
}

impl From<TerrainFlags> for Vec<TerrainFlag> {
    fn from(flags: TerrainFlags) -> Self {
        [TerrainFlag::Indoor, TerrainFlag::NaturalLight]
            .into_iter()
            .filter(|&f| flags.contains(f))
            .collect()
    }
}

/// Жидкость, которая может забить из террейна, с относительным весом
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidSource {
    pub liquid: LiquidId,
    pub weight: u32,
}

/// Жидкость в ячейке и её объём
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LiquidContent {
    pub liquid: LiquidId,
    pub volume: u32,
}

/// Неизменяемое описание типа местности
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainDescriptor {
    pub id: TerrainId,
    pub name: String,
    /// Символ для текстовой карты
    pub symbol: char,
    #[serde(default)]
    pub kind: TerrainKind,
    #[serde(default)]
    pub flags: TerrainFlags,
    /// Доступное пространство (вместимость) ячейки
    #[serde(default)]
    pub space: u32,
    /// Жидкость, заполняющая террейн изначально (например, море)
    #[serde(default)]
    pub liquid_content: Option<LiquidContent>,
    /// Из каких жидкостей могут начинаться реки
    #[serde(default)]
    pub liquid_sources: Vec<LiquidSource>,
}

impl TerrainDescriptor {
    #[must_use]
    pub fn new(id: u32, name: &str, symbol: char, kind: TerrainKind) -> Self {
        Self {
            id: TerrainId(id),
            name: name.to_string(),
            symbol,
            kind,
            flags: TerrainFlags::NONE,
            space: 0,
            liquid_content: None,
            liquid_sources: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_space(mut self, space: u32) -> Self {
        self.space = space;
        self
    }

    #[must_use]
    pub fn with_flag(mut self, flag: TerrainFlag) -> Self {
        self.flags = self.flags.with(flag);
        self
    }

    #[must_use]
    pub fn with_liquid_content(mut self, liquid: LiquidId, volume: u32) -> Self {
        self.liquid_content = Some(LiquidContent { liquid, volume });
        self
    }

    #[must_use]
    pub fn with_liquid_source(mut self, liquid: LiquidId, weight: u32) -> Self {
        self.liquid_sources.push(LiquidSource { liquid, weight });
        self
    }

    #[must_use]
    pub fn has_liquid_sources(&self) -> bool {
        !self.liquid_sources.is_empty()
    }

    #[must_use]
    pub fn is_passable(&self) -> bool {
        self.kind != TerrainKind::Solid
    }

    /// Выбирает жидкость пропорционально весам (накопленная вероятность).
    ///
    /// Возвращает `None`, если источников нет или сумма весов равна нулю.
    pub fn pick_liquid_source<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<LiquidId> {
        // Сумма весов в u64: несколько весов около u32::MAX не переполняются
        let total: u64 = self.liquid_sources.iter().map(|s| u64::from(s.weight)).sum();
        if total == 0 {
            return None;
        }
        let picked = rng.gen_range(0..total);
        let mut cumulative = 0u64;
        for source in &self.liquid_sources {
            cumulative += u64::from(source.weight);
            if picked < cumulative {
                return Some(source.liquid);
            }
        }
        None
    }
}

/// Каталог в том виде, как он записан в конфигурации
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogConfig {
    #[serde(default)]
    pub liquids: Vec<Liquid>,
    #[serde(default)]
    pub terrains: Vec<TerrainDescriptor>,
}

/// Проверенный каталог террейнов и жидкостей
#[derive(Debug, Clone, Default)]
pub struct TerrainCatalog {
    liquids: Vec<Liquid>,
    terrains: Vec<Arc<TerrainDescriptor>>,
}

impl TerrainCatalog {
    /// Проверяет уникальность идентификаторов и имён, а также ссылки на жидкости.
    pub fn new(
        liquids: Vec<Liquid>,
        terrains: Vec<TerrainDescriptor>,
    ) -> Result<Self, ConfigError> {
        let mut liquid_ids = HashSet::new();
        for liquid in &liquids {
            if !liquid_ids.insert(liquid.id) {
                return Err(ConfigError::DuplicateId {
                    kind: "liquid",
                    id: liquid.id.0,
                });
            }
        }

        let mut terrain_ids = HashSet::new();
        let mut terrain_names = HashSet::new();
        for terrain in &terrains {
            if !terrain_ids.insert(terrain.id) || !terrain_names.insert(terrain.name.as_str()) {
                return Err(ConfigError::DuplicateId {
                    kind: "terrain",
                    id: terrain.id.0,
                });
            }
            let referenced = terrain
                .liquid_sources
                .iter()
                .map(|s| s.liquid)
                .chain(terrain.liquid_content.map(|c| c.liquid));
            for liquid in referenced {
                if !liquid_ids.contains(&liquid) {
                    return Err(ConfigError::UnknownLiquid {
                        terrain: terrain.name.clone(),
                        liquid: liquid.0,
                    });
                }
            }
        }

        Ok(Self {
            liquids,
            terrains: terrains.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self, ConfigError> {
        Self::new(config.liquids.clone(), config.terrains.clone())
    }

    #[must_use]
    pub fn terrain(&self, id: TerrainId) -> Option<&Arc<TerrainDescriptor>> {
        self.terrains.iter().find(|t| t.id == id)
    }

    #[must_use]
    pub fn terrain_by_name(&self, name: &str) -> Option<&Arc<TerrainDescriptor>> {
        self.terrains.iter().find(|t| t.name == name)
    }

    #[must_use]
    pub fn liquid(&self, id: LiquidId) -> Option<&Liquid> {
        self.liquids.iter().find(|l| l.id == id)
    }

    pub fn terrains(&self) -> impl Iterator<Item = &Arc<TerrainDescriptor>> {
        self.terrains.iter()
    }

    pub fn liquids(&self) -> impl Iterator<Item = &Liquid> {
        self.liquids.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn water() -> Liquid {
        Liquid {
            id: LiquidId(1),
            name: "water".into(),
        }
    }

    #[test]
    fn weighted_pick_follows_weights() {
        let spring = TerrainDescriptor::new(1, "spring", 'S', TerrainKind::Open)
            .with_liquid_source(LiquidId(1), 3)
            .with_liquid_source(LiquidId(2), 1);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut counts = [0u32; 2];
        for _ in 0..4000 {
            match spring.pick_liquid_source(&mut rng) {
                Some(LiquidId(1)) => counts[0] += 1,
                Some(LiquidId(2)) => counts[1] += 1,
                other => panic!("unexpected pick {other:?}"),
            }
        }
        // 3:1 с запасом на разброс
        assert!(counts[0] > 2700 && counts[0] < 3300, "{counts:?}");
    }

    #[test]
    fn zero_weights_pick_nothing() {
        let dry = TerrainDescriptor::new(1, "dry", 'd', TerrainKind::Open)
            .with_liquid_source(LiquidId(1), 0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(dry.pick_liquid_source(&mut rng), None);
        assert!(dry.has_liquid_sources());
    }

    #[test]
    fn zero_weight_entry_is_never_picked() {
        let spring = TerrainDescriptor::new(1, "spring", 'S', TerrainKind::Open)
            .with_liquid_source(LiquidId(7), 0)
            .with_liquid_source(LiquidId(1), 5);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..200 {
            assert_eq!(spring.pick_liquid_source(&mut rng), Some(LiquidId(1)));
        }
    }

    #[test]
    fn huge_weights_do_not_overflow() {
        let spring = TerrainDescriptor::new(1, "spring", 'S', TerrainKind::Open)
            .with_liquid_source(LiquidId(1), u32::MAX)
            .with_liquid_source(LiquidId(2), 1)
            .with_liquid_source(LiquidId(3), u32::MAX);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut seen = [0u32; 2];
        for _ in 0..1000 {
            match spring.pick_liquid_source(&mut rng) {
                Some(LiquidId(1)) => seen[0] += 1,
                Some(LiquidId(3)) => seen[1] += 1,
                other => panic!("unexpected pick {other:?}"),
            }
        }
        // Два равных тяжёлых веса делят выборку примерно пополам
        assert!(seen[0] > 400 && seen[1] > 400, "{seen:?}");
    }

    #[test]
    fn flags_round_trip_through_list() {
        let flags = TerrainFlags::from(vec![TerrainFlag::NaturalLight]);
        assert!(flags.contains(TerrainFlag::NaturalLight));
        assert!(!flags.contains(TerrainFlag::Indoor));
        assert_eq!(flags.bits(), 2);
        assert_eq!(Vec::<TerrainFlag>::from(flags), vec![TerrainFlag::NaturalLight]);
    }

    #[test]
    fn catalog_rejects_unknown_liquid() {
        let terrain = TerrainDescriptor::new(1, "sea", '~', TerrainKind::Liquid)
            .with_liquid_content(LiquidId(9), 100);
        let err = TerrainCatalog::new(vec![water()], vec![terrain]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownLiquid { liquid: 9, .. }));
    }

    #[test]
    fn catalog_rejects_duplicate_terrain() {
        let a = TerrainDescriptor::new(1, "plain", '.', TerrainKind::Open);
        let b = TerrainDescriptor::new(1, "hill", 'n', TerrainKind::Open);
        let err = TerrainCatalog::new(vec![water()], vec![a, b]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateId { kind: "terrain", id: 1 }));
    }

    #[test]
    fn catalog_lookup() {
        let plain = TerrainDescriptor::new(3, "plain", '.', TerrainKind::Open);
        let catalog = TerrainCatalog::new(vec![water()], vec![plain]).unwrap();
        assert_eq!(catalog.terrain_by_name("plain").unwrap().id, TerrainId(3));
        assert!(catalog.terrain(TerrainId(4)).is_none());
        assert_eq!(catalog.liquid(LiquidId(1)).unwrap().name, "water");
    }
}

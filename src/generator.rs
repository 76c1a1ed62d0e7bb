//! Полный прогон генерации: высоты, террейны, выравнивание суши, реки.

use crate::cell::{Cell, WorldMap};
use crate::classifier::TerrainClassifier;
use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::grid::Grid;
use crate::heightmap::{self, generate_heightmap, to_levels};
use crate::relief::flatten;
use crate::rivers::{River, carve_rivers};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Результат прогона: карта и проложенные по ней реки
#[derive(Debug, Clone)]
pub struct GeneratedWorld {
    pub map: WorldMap,
    pub rivers: Vec<River>,
}

/// Генерирует карту мира.
///
/// Один и тот же `config` (включая сид) и один и тот же классификатор всегда дают
/// одинаковую карту. При ошибке частичная карта не возвращается.
pub fn generate_map(
    config: &GenerationConfig,
    classifier: &TerrainClassifier,
) -> Result<WorldMap, GenerationError> {
    generate_world(config, classifier).map(|world| world.map)
}

/// То же, что [`generate_map`], но вместе со списком рек.
pub fn generate_world(
    config: &GenerationConfig,
    classifier: &TerrainClassifier,
) -> Result<GeneratedWorld, GenerationError> {
    heightmap::validate(config)?;
    classifier.validate()?;

    log::info!(
        "Generating {}x{} map with seed {} using height map '{}'",
        config.width,
        config.height,
        config.seed,
        classifier.name
    );
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    log::info!("Generating height map");
    let field = generate_heightmap(config, &mut rng)?;

    log::info!("Assigning terrains");
    let mut map = classify(&to_levels(&field), classifier)?;

    log::info!("Flattening mainland");
    flatten(&mut map, classifier)?;

    let rivers = carve_rivers(&mut map, config, &mut rng);
    log::info!("{} rivers carved", rivers.len());

    if config.num_forests > 0 {
        log::debug!(
            "Forest generation is not supported, ignoring {} forests",
            config.num_forests
        );
    }

    Ok(GeneratedWorld { map, rivers })
}

/// Превращает целочисленные высоты в ячейки с террейнами.
pub fn classify(
    levels: &Grid<i32>,
    classifier: &TerrainClassifier,
) -> Result<WorldMap, GenerationError> {
    let mut data = Vec::with_capacity(levels.len());
    for (index, &height) in levels.data.iter().enumerate() {
        let (x, y) = levels.coords(index);
        let terrain = classifier
            .terrain_for(height)
            .ok_or(GenerationError::Unclassified { x, y, height })?;
        data.push(Cell::new(x, y, height, terrain.clone()));
    }
    Ok(Grid {
        width: levels.width,
        height: levels.height,
        data,
    })
}

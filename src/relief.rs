use crate::cell::WorldMap;
use crate::classifier::TerrainClassifier;
use crate::error::GenerationError;

/// Выравнивает сушу: каждая ячейка выше уровня моря получает высоту
/// `уровень моря + смещение её террейна`.
///
/// Подводные ячейки сохраняют исходную высоту. Террейны не пересчитываются,
/// поэтому повторный вызов ничего не меняет.
pub fn flatten(
    map: &mut WorldMap,
    classifier: &TerrainClassifier,
) -> Result<(), GenerationError> {
    let sea_level = classifier.sea_level_height().ok_or_else(|| {
        GenerationError::SeaLevelMissing(classifier.sea_level_terrain().name.clone())
    })?;
    log::info!("Levelling mainland terrains, sea level at {sea_level}");

    let mut levelled = 0usize;
    for cell in &mut map.data {
        let Some(offset) = classifier.offset_of(&cell.terrain) else {
            continue;
        };
        if offset > 0 {
            cell.height = (sea_level + offset).max(0);
            levelled += 1;
        }
    }
    log::debug!("{levelled} cells levelled");
    Ok(())
}

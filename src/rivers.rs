use crate::cell::{Cell, WorldMap};
use crate::config::GenerationConfig;
use crate::terrain::{LiquidContent, LiquidId};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// Вероятность того, что река в яме не иссякнет, а свернёт к случайному соседу
pub const MEANDER_CHANCE: f64 = 0.45;
/// Сколько шагов подряд река может петлять без спуска, прежде чем её бросят
pub const MAX_STALL_STEPS: usize = 8;

/// Проложенная река
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct River {
    pub liquid: LiquidId,
    /// Ячейки от истока до устья; первая — исток
    pub cells: Vec<(u32, u32)>,
}

impl River {
    #[must_use]
    pub fn source(&self) -> (u32, u32) {
        self.cells[0]
    }
}

/// Расстояние между ячейками с учётом высоты, округлённое вниз
fn distance(a: &Cell, b: &Cell) -> u32 {
    let dx = f64::from(a.x) - f64::from(b.x);
    let dy = f64::from(a.y) - f64::from(b.y);
    let dz = f64::from(a.height) - f64::from(b.height);
    (dx * dx + dy * dy + dz * dz).sqrt() as u32
}

/// Ячейки, из которых может начаться река, не ближе `min_distance` друг к другу
#[must_use]
pub fn find_sources(map: &WorldMap, min_distance: u32) -> Vec<(u32, u32)> {
    let mut sources: Vec<&Cell> = Vec::new();
    for cell in &map.data {
        if !cell.terrain.has_liquid_sources() || cell.has_liquid() {
            continue;
        }
        if sources.iter().any(|s| distance(cell, s) <= min_distance) {
            continue;
        }
        sources.push(cell);
    }
    sources.into_iter().map(|c| (c.x, c.y)).collect()
}

/// Прокладывает до `num_rivers` рек методом наискорейшего спуска.
///
/// Река помечает каждую пройденную ячейку жидкостью истока и останавливается,
/// когда упирается в уже существующую жидкость или в яму.
pub fn carve_rivers<R: Rng + ?Sized>(
    map: &mut WorldMap,
    config: &GenerationConfig,
    rng: &mut R,
) -> Vec<River> {
    log::info!("Generating rivers on the map");
    let mut sources = find_sources(map, config.min_river_distance);
    log::debug!("{} possible river sources", sources.len());

    sources.shuffle(rng);
    sources.truncate(config.num_rivers as usize);

    let mut rivers = Vec::with_capacity(sources.len());
    for (x, y) in sources {
        if let Some(river) = flow(map, (x, y), rng) {
            log::debug!(
                "River of liquid {} starts from {x};{y}, {} cells long",
                river.liquid.0,
                river.cells.len()
            );
            rivers.push(river);
        }
    }
    rivers
}

/// Пускает одну реку из `source`.
///
/// Возвращает `None`, если у истока нет ни одной жидкости с ненулевым весом
/// или он уже залит другой рекой.
pub fn flow<R: Rng + ?Sized>(
    map: &mut WorldMap,
    source: (u32, u32),
    rng: &mut R,
) -> Option<River> {
    let start = map.get(source.0, source.1);
    if start.has_liquid() {
        return None;
    }
    let terrain = start.terrain.clone();
    let liquid = terrain.pick_liquid_source(rng)?;
    let content = LiquidContent {
        liquid,
        volume: terrain.space,
    };

    map.get_mut(source.0, source.1).liquid = Some(content);
    let mut cells = vec![source];
    let mut visited: HashSet<(u32, u32)> = HashSet::from([source]);
    let mut current = source;
    let mut stalled = 0;

    // Каждый шаг помечает новую ячейку, так что больше шагов, чем ячеек, не бывает
    for _ in 0..map.len() {
        let mut neighbours: Vec<(u32, u32)> = map
            .neighbours(current.0, current.1)
            .filter(|n| !visited.contains(n))
            .collect();
        // Равные по высоте соседи выбираются случайно
        neighbours.shuffle(rng);

        let here = map.get(current.0, current.1).height;
        let lowest = neighbours
            .iter()
            .copied()
            .filter(|&(x, y)| map.get(x, y).height < here)
            .min_by_key(|&(x, y)| map.get(x, y).height);

        let next = if let Some(next) = lowest {
            stalled = 0;
            next
        } else {
            if neighbours.is_empty() || !rng.gen_bool(MEANDER_CHANCE) {
                break;
            }
            stalled += 1;
            if stalled > MAX_STALL_STEPS {
                log::debug!("River from {source:?} abandoned after {stalled} flat steps");
                break;
            }
            neighbours[0]
        };

        // Влилась в существующий водоём
        if map.get(next.0, next.1).has_liquid() {
            break;
        }
        map.get_mut(next.0, next.1).liquid = Some(content);
        visited.insert(next);
        cells.push(next);
        current = next;
    }

    Some(River { liquid, cells })
}

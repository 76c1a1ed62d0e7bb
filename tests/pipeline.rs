use mudmap::render::{self, DumpLayer, MapExport};
use mudmap::{GenerationError, GridLattice, WorldSetup, generate_map, generate_world};
use petgraph::algo::dijkstra;

const SETUP: &str = include_str!("../assets/temperate.toml");

fn setup() -> WorldSetup {
    WorldSetup::from_toml_str(SETUP).unwrap()
}

#[test]
fn sample_setup_builds() {
    let setup = setup();
    assert_eq!(setup.generation.seed, 42);
    let (catalog, classifier) = setup.build().unwrap();
    assert_eq!(catalog.terrains().count(), 7);
    assert_eq!(classifier.sea_level_terrain().name, "coast");
    assert_eq!(classifier.sea_level_height(), Some(36));
    assert_eq!(classifier.thresholds().len(), 7);
}

#[test]
fn generation_is_deterministic() {
    let setup = setup();
    let (_, classifier) = setup.build().unwrap();
    let a = generate_world(&setup.generation, &classifier).unwrap();
    let b = generate_world(&setup.generation, &classifier).unwrap();
    assert_eq!(a.map, b.map);
    assert_eq!(a.rivers, b.rivers);
}

#[test]
fn heights_follow_the_classifier() {
    let setup = setup();
    let (_, classifier) = setup.build().unwrap();
    let sea_level = classifier.sea_level_height().unwrap();
    let map = generate_map(&setup.generation, &classifier).unwrap();

    for cell in &map.data {
        let offset = classifier.offset_of(&cell.terrain).unwrap();
        if offset > 0 {
            assert_eq!(cell.height, sea_level + offset);
        } else {
            assert!((0..=sea_level).contains(&cell.height), "{cell:?}");
            assert_eq!(
                classifier.terrain_for(cell.height).map(|t| t.id),
                Some(cell.terrain.id)
            );
        }
    }
    // После нормализации обязательно есть и самая низкая, и самая высокая точка
    assert!(map.data.iter().any(|c| c.height == 0));
    assert!(map.data.iter().any(|c| c.terrain.name == "peaks"));
}

#[test]
fn rivers_are_connected_and_bounded() {
    let setup = setup();
    let (_, classifier) = setup.build().unwrap();
    let world = generate_world(&setup.generation, &classifier).unwrap();
    assert!(world.rivers.len() <= setup.generation.num_rivers as usize);

    for river in &world.rivers {
        let source = world.map.get(river.source().0, river.source().1);
        assert!(source.terrain.has_liquid_sources());
        for pair in river.cells.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert_eq!(a.0.abs_diff(b.0) + a.1.abs_diff(b.1), 1);
        }
        for &(x, y) in &river.cells {
            let cell = world.map.get(x, y);
            assert_eq!(cell.liquid.map(|l| l.liquid), Some(river.liquid));
        }
    }
}

#[test]
fn overriding_seed_changes_the_map() {
    let mut setup = setup();
    let (_, classifier) = setup.build().unwrap();
    let first = generate_map(&setup.generation, &classifier).unwrap();
    setup.generation.seed = 7;
    let second = generate_map(&setup.generation, &classifier).unwrap();
    assert_ne!(first, second);
}

#[test]
fn bad_dimensions_fail_the_whole_run() {
    let mut setup = setup();
    let (_, classifier) = setup.build().unwrap();
    setup.generation.width = 0;
    assert_eq!(
        generate_map(&setup.generation, &classifier),
        Err(GenerationError::InvalidDimensions {
            width: 0,
            height: 50
        })
    );
}

#[test]
fn shortest_paths_on_generated_map() {
    let setup = setup();
    let (_, classifier) = setup.build().unwrap();
    let map = generate_map(&setup.generation, &classifier).unwrap();
    let lattice = GridLattice::new(&map);
    let (graph, nodes) = lattice.to_graph();

    let start = map
        .data
        .iter()
        .map(|c| (c.x, c.y))
        .find(|&p| lattice.is_passable(p))
        .unwrap();
    let costs = dijkstra(&graph, nodes[&start], None, |e| *e.weight());

    // Каждая двадцатая проходимая ячейка как цель
    let mut targets: Vec<_> = nodes.keys().copied().collect();
    targets.sort_unstable();
    for target in targets.into_iter().step_by(20) {
        let outcome = lattice.find_path(start, target);
        assert!(!outcome.truncated);
        let expected = costs.get(&nodes[&target]).copied();
        assert_eq!(outcome.path.as_ref().map(|p| p.len() as u32), expected);
        if let Some(path) = outcome.path {
            assert!(path.iter().all(|&p| lattice.is_passable(p)));
            assert_eq!(path.last().copied().unwrap_or(start), target);
        }
    }
}

#[test]
fn exports_cover_every_cell() {
    let setup = setup();
    let (_, classifier) = setup.build().unwrap();
    let map = generate_map(&setup.generation, &classifier).unwrap();

    let export: MapExport = serde_json::from_str(&render::to_json(&map).unwrap()).unwrap();
    assert_eq!(export.cells.len(), map.len());

    let glyphs = render::dump_map(&map, DumpLayer::Glyphs, &[]);
    // Рамка сверху и снизу плюс по строке на ряд
    assert_eq!(glyphs.lines().count(), map.height as usize + 2);
    let width = map.width as usize;
    assert!(
        glyphs
            .lines()
            .skip(1)
            .take(map.height as usize)
            .all(|l| l.chars().count() == width)
    );

    let image = render::terrain_image(&map, 2, &[]);
    assert_eq!(image.dimensions(), (map.width * 2, map.height * 2));
}

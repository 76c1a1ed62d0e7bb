use clap::Parser;
use mudmap::render::{self, DumpLayer};
use mudmap::{GridLattice, WorldSetup, generate_world};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Описание мира по умолчанию, если `--config` не задан
const BUILTIN_SETUP: &str = include_str!("../../assets/temperate.toml");

/// Две точки карты для поиска пути
#[derive(Debug, Clone, Copy)]
struct Route {
    from: (u32, u32),
    to: (u32, u32),
}

fn parse_point(s: &str) -> Result<(u32, u32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y, got '{s}'"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x in '{s}': {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y in '{s}': {e}"))?;
    Ok((x, y))
}

fn parse_route(s: &str) -> Result<Route, String> {
    let (from, to) = s
        .split_once(':')
        .ok_or_else(|| format!("expected x0,y0:x1,y1, got '{s}'"))?;
    Ok(Route {
        from: parse_point(from)?,
        to: parse_point(to)?,
    })
}

/// Генератор карт поверхности для MUD-мира
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Описание мира в формате TOML (по умолчанию встроенный умеренный климат)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Переопределяет сид из конфигурации
    #[arg(short, long)]
    seed: Option<u64>,

    /// Печатать текстовый дамп высот и террейнов
    #[arg(long)]
    ascii: bool,

    /// Сохранить цветную карту террейнов
    #[arg(long)]
    png: Option<PathBuf>,

    /// Сохранить карту высот в оттенках серого
    #[arg(long)]
    heights_png: Option<PathBuf>,

    /// Сохранить карту в JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Найти путь между двумя ячейками: x0,y0:x1,y1
    #[arg(long, value_parser = parse_route)]
    path: Option<Route>,

    /// Размер ячейки в пикселях для --png
    #[arg(long, default_value_t = 4)]
    scale: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut setup = match &cli.config {
        Some(path) => {
            log::info!("Loading world setup from {}", path.display());
            WorldSetup::from_toml_file(path)?
        }
        None => WorldSetup::from_toml_str(BUILTIN_SETUP)?,
    };
    if let Some(seed) = cli.seed {
        setup.generation.seed = seed;
    }

    let (catalog, classifier) = setup.build()?;
    log::debug!(
        "{} terrains and {} liquids in catalog",
        catalog.terrains().count(),
        catalog.liquids().count()
    );

    let world = generate_world(&setup.generation, &classifier)?;
    let map = &world.map;

    let mut route = Vec::new();
    if let Some(Route { from, to }) = cli.path {
        for (x, y) in [from, to] {
            if !map.contains(i64::from(x), i64::from(y)) {
                let message = format!(
                    "point {x},{y} is outside the {}x{} map",
                    map.width, map.height
                );
                return Err(message.into());
            }
        }
        let outcome = GridLattice::new(map).find_path(from, to);
        log::info!(
            "Path search created {} nodes, expanded {}",
            outcome.created,
            outcome.expanded
        );
        match outcome.path {
            Some(path) => {
                log::info!("Path of {} steps found", path.len());
                route.push(from);
                route.extend(path);
            }
            None => log::warn!("No path from {from:?} to {to:?}"),
        }
    }

    if cli.ascii {
        print!("{}", render::dump_map(map, DumpLayer::Heights, &route));
        print!("{}", render::dump_map(map, DumpLayer::Glyphs, &route));
    }
    if let Some(path) = &cli.heights_png {
        render::save_heights_png(map, path)?;
        log::info!("Heights saved to {}", path.display());
    }
    if let Some(path) = &cli.png {
        render::save_terrain_png(map, cli.scale, &route, path)?;
        log::info!("Terrain map saved to {}", path.display());
    }
    if let Some(path) = &cli.json {
        render::save_json(map, path)?;
        log::info!("JSON export saved to {}", path.display());
    }
    Ok(())
}

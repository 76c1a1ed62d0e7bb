//! Вывод готовой карты: текстовый дамп, PNG и JSON.

use crate::cell::{Cell, WorldMap};
use crate::heightmap::MAX_HEIGHT;
use crate::terrain::{LiquidContent, TerrainId, TerrainKind};
use image::{ImageBuffer, Luma, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Слой текстового дампа
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpLayer {
    /// Высоты, каждая по центру колонки шириной 4
    Heights,
    /// Символы террейнов, `r` для рек
    Glyphs,
}

/// Символ ячейки в слое [`DumpLayer::Glyphs`]
#[must_use]
pub fn glyph(cell: &Cell) -> char {
    if cell.is_river() { 'r' } else { cell.terrain.symbol }
}

/// Текстовый дамп одного слоя в рамке из дефисов.
///
/// Ячейки из `path` рисуются звёздочкой.
#[must_use]
pub fn dump_map(map: &WorldMap, layer: DumpLayer, path: &[(u32, u32)]) -> String {
    let on_path: HashSet<(u32, u32)> = path.iter().copied().collect();
    let rows: Vec<String> = (0..map.height)
        .map(|y| {
            let cells = (0..map.width).map(|x| (map.get(x, y), on_path.contains(&(x, y))));
            match layer {
                DumpLayer::Heights => cells
                    .map(|(cell, marked)| {
                        if marked {
                            format!("{:^4}", '*')
                        } else {
                            format!("{:^4}", cell.height)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(", "),
                DumpLayer::Glyphs => cells
                    .map(|(cell, marked)| if marked { '*' } else { glyph(cell) })
                    .collect(),
            }
        })
        .collect();

    let frame = "-".repeat(rows.first().map_or(0, |r| r.chars().count()));
    let mut out = String::new();
    out.push_str(&frame);
    out.push('\n');
    for row in rows {
        out.push_str(&row);
        out.push('\n');
    }
    out.push_str(&frame);
    out.push('\n');
    out
}

/// Яркость пропорциональна высоте; выровненная суша светлее моря.
#[must_use]
pub fn heights_image(map: &WorldMap) -> ImageBuffer<Luma<u8>, Vec<u8>> {
    let top = map
        .data
        .iter()
        .map(|c| c.height)
        .max()
        .unwrap_or(0)
        .max(1);
    ImageBuffer::from_fn(map.width, map.height, |x, y| {
        let h = map.get(x, y).height.max(0);
        Luma([(f64::from(h) / f64::from(top) * 255.0) as u8])
    })
}

fn shade(base: [u8; 3], height: i32) -> Rgb<u8> {
    // Чем выше, тем светлее, но не больше чем на треть
    let lift = 0.66 + 0.34 * (f64::from(height.max(0)) / MAX_HEIGHT).min(1.0);
    Rgb(base.map(|c| (f64::from(c) * lift) as u8))
}

fn cell_color(cell: &Cell) -> Rgb<u8> {
    if cell.is_river() {
        return Rgb([70, 140, 230]);
    }
    match cell.terrain.kind {
        TerrainKind::Liquid => shade([30, 70, 170], cell.height),
        TerrainKind::Open => shade([110, 170, 80], cell.height),
        TerrainKind::Solid => shade([150, 140, 130], cell.height),
    }
}

/// Цветная карта террейнов; каждая ячейка — квадрат `scale`×`scale`.
///
/// Путь, если задан, рисуется красной ломаной через центры ячеек.
#[must_use]
pub fn terrain_image(map: &WorldMap, scale: u32, path: &[(u32, u32)]) -> RgbImage {
    let scale = scale.max(1);
    let mut img = RgbImage::new(map.width * scale, map.height * scale);
    for cell in &map.data {
        draw_filled_rect_mut(
            &mut img,
            Rect::at((cell.x * scale) as i32, (cell.y * scale) as i32).of_size(scale, scale),
            cell_color(cell),
        );
    }

    let centre = |(x, y): (u32, u32)| {
        (
            (x * scale) as f32 + scale as f32 / 2.0,
            (y * scale) as f32 + scale as f32 / 2.0,
        )
    };
    for pair in path.windows(2) {
        draw_line_segment_mut(&mut img, centre(pair[0]), centre(pair[1]), Rgb([220, 30, 30]));
    }
    if let [single] = path {
        let (x, y) = *single;
        draw_filled_rect_mut(
            &mut img,
            Rect::at((x * scale) as i32, (y * scale) as i32).of_size(scale, scale),
            Rgb([220, 30, 30]),
        );
    }
    img
}

pub fn save_heights_png(
    map: &WorldMap,
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    heights_image(map).save(path)?;
    Ok(())
}

pub fn save_terrain_png(
    map: &WorldMap,
    scale: u32,
    route: &[(u32, u32)],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    terrain_image(map, scale, route).save(path)?;
    Ok(())
}

/// Ячейка в формате обмена
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellExport {
    pub x: u32,
    pub y: u32,
    pub height: i32,
    pub terrain: TerrainId,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub liquid: Option<LiquidContent>,
}

/// Готовая карта в формате обмена: размеры и ячейки построчно
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapExport {
    pub width: u32,
    pub height: u32,
    pub cells: Vec<CellExport>,
}

impl From<&WorldMap> for MapExport {
    fn from(map: &WorldMap) -> Self {
        Self {
            width: map.width,
            height: map.height,
            cells: map
                .data
                .iter()
                .map(|c| CellExport {
                    x: c.x,
                    y: c.y,
                    height: c.height,
                    terrain: c.terrain.id,
                    liquid: c.liquid,
                })
                .collect(),
        }
    }
}

pub fn to_json(map: &WorldMap) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&MapExport::from(map))
}

pub fn save_json(
    map: &WorldMap,
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    fs::write(path, to_json(map)?)?;
    Ok(())
}

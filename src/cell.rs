use crate::grid::Grid;
use crate::terrain::{LiquidContent, TerrainDescriptor};
use std::sync::Arc;

/// Ячейка готовой карты
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
    /// Нормализованная высота, 0–100 до выравнивания суши
    pub height: i32,
    pub terrain: Arc<TerrainDescriptor>,
    pub liquid: Option<LiquidContent>,
}

impl Cell {
    /// Ячейка без жидкости сверх той, что задана террейном по умолчанию.
    #[must_use]
    pub fn new(x: u32, y: u32, height: i32, terrain: Arc<TerrainDescriptor>) -> Self {
        let liquid = terrain.liquid_content;
        Self {
            x,
            y,
            height,
            terrain,
            liquid,
        }
    }

    #[must_use]
    pub fn has_liquid(&self) -> bool {
        self.liquid.is_some()
    }

    /// Жидкость появилась не из террейна, а была проложена рекой.
    #[must_use]
    pub fn is_river(&self) -> bool {
        self.terrain.liquid_content.is_none() && self.liquid.is_some()
    }
}

/// Готовая карта: плотная сетка ячеек
pub type WorldMap = Grid<Cell>;

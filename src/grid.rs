use serde::{Deserialize, Serialize};

/// Смещения четырёх соседей: север, юг, запад, восток.
pub const DIRECTIONS: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// Плотная двумерная сетка, хранится построчно (row-major).
///
/// В отличие от карты мира здесь нет бесшовности по X: края ограничены.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    pub width: u32,
    pub height: u32,
    pub data: Vec<T>,
}

/// Число ячеек, посчитанное в `usize`, чтобы не переполнить `u32`
fn cell_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

impl<T: Clone> Grid<T> {
    pub fn new(width: u32, height: u32, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; cell_count(width, height)],
        }
    }
}

impl<T> Grid<T> {
    /// Строит сетку, вызывая `f(x, y)` для каждой ячейки.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> T) -> Self {
        let mut data = Vec::with_capacity(cell_count(width, height));
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn coords(&self, index: usize) -> (u32, u32) {
        let width = self.width as usize;
        ((index % width) as u32, (index / width) as u32)
    }

    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width) && y < i64::from(self.height)
    }

    /// Ячейка или `None`, если координаты вне сетки.
    pub fn try_get(&self, x: u32, y: u32) -> Option<&T> {
        self.contains(i64::from(x), i64::from(y))
            .then(|| &self.data[self.index(x, y)])
    }

    pub fn get(&self, x: u32, y: u32) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: u32, y: u32) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: u32, y: u32, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Соседи по четырём направлениям, лежащие внутри сетки.
    pub fn neighbours(&self, x: u32, y: u32) -> impl Iterator<Item = (u32, u32)> + '_ {
        DIRECTIONS.iter().filter_map(move |&(dx, dy)| {
            let nx = i64::from(x) + i64::from(dx);
            let ny = i64::from(y) + i64::from(dy);
            self.contains(nx, ny).then_some((nx as u32, ny as u32))
        })
    }

    /// Применяет `f` к каждой ячейке, сохраняя размеры.
    pub fn map<U>(&self, mut f: impl FnMut(u32, u32, &T) -> U) -> Grid<U> {
        let width = self.width as usize;
        Grid {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .enumerate()
                .map(|(i, v)| f((i % width) as u32, (i / width) as u32, v))
                .collect(),
        }
    }
}

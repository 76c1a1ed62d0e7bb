//! Карта мира как граф для поиска пути.

use crate::cell::{Cell, WorldMap};
use crate::pathfinding::{SearchGraph, SearchOutcome, search_graph};
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashMap;

/// Четырёхсвязная решётка над готовой картой.
///
/// Переход разрешён только в проходимую ячейку; шаг стоит 1, эвристика — манхэттенское расстояние.
pub struct GridLattice<'a> {
    map: &'a WorldMap,
    passable: Box<dyn Fn(&Cell) -> bool + 'a>,
}

impl<'a> GridLattice<'a> {
    /// Решётка, где непроходимы только твёрдые террейны.
    #[must_use]
    pub fn new(map: &'a WorldMap) -> Self {
        Self::with_passable(map, |cell| cell.terrain.is_passable())
    }

    pub fn with_passable(map: &'a WorldMap, passable: impl Fn(&Cell) -> bool + 'a) -> Self {
        Self {
            map,
            passable: Box::new(passable),
        }
    }

    /// Точки вне карты непроходимы.
    #[must_use]
    pub fn is_passable(&self, (x, y): (u32, u32)) -> bool {
        self.map.try_get(x, y).is_some_and(|cell| (self.passable)(cell))
    }

    /// Кратчайший путь между двумя ячейками; узлов не больше, чем ячеек карты.
    #[must_use]
    pub fn find_path(&self, start: (u32, u32), goal: (u32, u32)) -> SearchOutcome<(u32, u32)> {
        search_graph(self, start, goal, self.map.len().max(1))
    }

    /// Экспорт проходимых ячеек в граф `petgraph`.
    ///
    /// Узлы хранят координаты, рёбра соединяют проходимых соседей и весят 1.
    #[must_use]
    pub fn to_graph(&self) -> (UnGraph<(u32, u32), u32>, HashMap<(u32, u32), NodeIndex>) {
        let mut graph = UnGraph::new_undirected();
        let mut nodes = HashMap::new();

        for cell in &self.map.data {
            if (self.passable)(cell) {
                nodes.insert((cell.x, cell.y), graph.add_node((cell.x, cell.y)));
            }
        }

        // Каждое ребро добавляется один раз: только к восточному и южному соседу
        for (&(x, y), &node) in &nodes {
            for neighbour in [(x + 1, y), (x, y + 1)] {
                if let Some(&other) = nodes.get(&neighbour) {
                    graph.add_edge(node, other, 1);
                }
            }
        }
        (graph, nodes)
    }
}

impl SearchGraph for GridLattice<'_> {
    type Node = (u32, u32);
    type Key = (u32, u32);

    fn key(&self, node: &Self::Node) -> Self::Key {
        *node
    }

    fn neighbours(&self, &(x, y): &Self::Node) -> Vec<Self::Node> {
        self.map.neighbours(x, y).collect()
    }

    fn connected(&self, _from: &Self::Node, to: &Self::Node) -> bool {
        self.is_passable(*to)
    }

    fn distance(&self, from: &Self::Node, to: &Self::Node) -> u32 {
        from.0.abs_diff(to.0) + from.1.abs_diff(to.1)
    }
}

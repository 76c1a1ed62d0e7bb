//! Поиск пути A* по произвольному графу.
//!
//! Граф задаётся вызывающей стороной: соседи, проверка перехода, расстояние и
//! равенство элементов. Узлы поиска живут в арене (`Vec`) и ссылаются друг на
//! друга по индексу; мемо гарантирует, что один и тот же элемент графа
//! оборачивается в узел не больше одного раза за поиск.
//!
//! Закрытые узлы никогда не открываются повторно. Для согласованной эвристики
//! это не мешает оптимальности, для несогласованной путь может выйти длиннее.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

/// Предел числа узлов по умолчанию
pub const DEFAULT_NODE_LIMIT: usize = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeState {
    #[default]
    Unvisited,
    Open,
    Closed,
}

/// Рабочее состояние A* для одного элемента графа
#[derive(Debug, Clone)]
pub struct PathNode<T> {
    pub element: T,
    /// Стоимость пути от старта
    pub g: u64,
    /// Оценка остатка до цели
    pub h: u64,
    pub state: NodeState,
    pub parent: Option<usize>,
}

impl<T> PathNode<T> {
    fn new(element: T) -> Self {
        Self {
            element,
            g: 0,
            h: 0,
            state: NodeState::Unvisited,
            parent: None,
        }
    }

    #[must_use]
    pub fn f(&self) -> u64 {
        self.g + self.h
    }
}

/// Граф, у элементов которого есть хешируемый ключ идентичности
pub trait SearchGraph {
    type Node: Clone;
    type Key: Eq + Hash;

    /// Два элемента — один и тот же узел, если у них равные ключи.
    fn key(&self, node: &Self::Node) -> Self::Key;

    fn neighbours(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Можно ли перейти из `from` в соседа `to`.
    fn connected(&self, _from: &Self::Node, _to: &Self::Node) -> bool {
        true
    }

    /// Стоимость шага между соседями и эвристика до цели.
    fn distance(&self, from: &Self::Node, to: &Self::Node) -> u32;
}

/// Итог поиска со статистикой
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome<T> {
    /// Путь без стартового элемента, заканчивается целью
    pub path: Option<Vec<T>>,
    /// Сколько узлов было создано
    pub created: usize,
    /// Сколько узлов было закрыто
    pub expanded: usize,
    /// Поиск остановлен пределом узлов
    pub truncated: bool,
}

/// Как найти уже созданный узел для элемента графа
trait NodeMemo<T> {
    fn find(&self, nodes: &[PathNode<T>], element: &T) -> Option<usize>;
    fn remember(&mut self, element: &T, index: usize);
}

/// Мемо на функции равенства: линейный просмотр арены
struct ScanMemo<'a, T> {
    equal: &'a dyn Fn(&T, &T) -> bool,
}

impl<T> NodeMemo<T> for ScanMemo<'_, T> {
    fn find(&self, nodes: &[PathNode<T>], element: &T) -> Option<usize> {
        nodes.iter().position(|n| (self.equal)(&n.element, element))
    }

    fn remember(&mut self, _element: &T, _index: usize) {}
}

/// Мемо на хеш-таблице ключей
struct KeyedMemo<'a, G: SearchGraph> {
    graph: &'a G,
    index: HashMap<G::Key, usize>,
}

impl<G: SearchGraph> NodeMemo<G::Node> for KeyedMemo<'_, G> {
    fn find(&self, _nodes: &[PathNode<G::Node>], element: &G::Node) -> Option<usize> {
        self.index.get(&self.graph.key(element)).copied()
    }

    fn remember(&mut self, element: &G::Node, index: usize) {
        self.index.insert(self.graph.key(element), index);
    }
}

/// Элемент открытого списка: меньшие `f`, затем `h`, затем ранее добавленные идут первыми
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    f: u64,
    h: u64,
    seq: u64,
    g: u64,
    index: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.f, self.h, self.seq).cmp(&(other.f, other.h, other.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Общий цикл A*, не зависящий от способа задания графа
#[allow(clippy::too_many_arguments)]
fn run<T, M>(
    start: T,
    goal: &T,
    node_limit: usize,
    memo: &mut M,
    is_goal: impl Fn(&T) -> bool,
    neighbours: impl Fn(&T) -> Vec<T>,
    connected: impl Fn(&T, &T) -> bool,
    distance: impl Fn(&T, &T) -> u32,
) -> SearchOutcome<T>
where
    T: Clone,
    M: NodeMemo<T>,
{
    let mut nodes: Vec<PathNode<T>> = Vec::new();
    let mut open = BinaryHeap::new();
    let mut seq = 0u64;
    let mut expanded = 0usize;

    let mut start_node = PathNode::new(start);
    start_node.h = u64::from(distance(&start_node.element, goal));
    start_node.state = NodeState::Open;
    memo.remember(&start_node.element, 0);
    open.push(Reverse(OpenEntry {
        f: start_node.f(),
        h: start_node.h,
        seq,
        g: 0,
        index: 0,
    }));
    nodes.push(start_node);

    while let Some(Reverse(entry)) = open.pop() {
        let current = entry.index;
        // Устаревшая запись: узел уже закрыт или найден более короткий путь
        if nodes[current].state == NodeState::Closed || nodes[current].g != entry.g {
            continue;
        }
        if is_goal(&nodes[current].element) {
            return SearchOutcome {
                path: Some(reconstruct(&nodes, current)),
                created: nodes.len(),
                expanded,
                truncated: false,
            };
        }
        nodes[current].state = NodeState::Closed;
        expanded += 1;

        let element = nodes[current].element.clone();
        let current_g = nodes[current].g;
        for neighbour in neighbours(&element) {
            if !connected(&element, &neighbour) {
                continue;
            }
            let candidate_g = current_g + u64::from(distance(&element, &neighbour));

            let index = match memo.find(&nodes, &neighbour) {
                Some(index) => {
                    let node = &mut nodes[index];
                    match node.state {
                        NodeState::Closed => continue,
                        NodeState::Open if candidate_g >= node.g => continue,
                        _ => {}
                    }
                    node.g = candidate_g;
                    node.parent = Some(current);
                    node.state = NodeState::Open;
                    index
                }
                None => {
                    if nodes.len() >= node_limit {
                        log::warn!("Path search gave up after creating {node_limit} nodes");
                        return SearchOutcome {
                            path: None,
                            created: nodes.len(),
                            expanded,
                            truncated: true,
                        };
                    }
                    let mut node = PathNode::new(neighbour);
                    node.g = candidate_g;
                    node.h = u64::from(distance(&node.element, goal));
                    node.parent = Some(current);
                    node.state = NodeState::Open;
                    let index = nodes.len();
                    memo.remember(&node.element, index);
                    nodes.push(node);
                    index
                }
            };

            seq += 1;
            let node = &nodes[index];
            open.push(Reverse(OpenEntry {
                f: node.f(),
                h: node.h,
                seq,
                g: node.g,
                index,
            }));
        }
    }

    SearchOutcome {
        path: None,
        created: nodes.len(),
        expanded,
        truncated: false,
    }
}

/// Путь от цели к старту по родителям, развёрнутый; старт не включается
fn reconstruct<T: Clone>(nodes: &[PathNode<T>], goal: usize) -> Vec<T> {
    let mut path = Vec::new();
    let mut current = goal;
    while let Some(parent) = nodes[current].parent {
        path.push(nodes[current].element.clone());
        current = parent;
    }
    path.reverse();
    path
}

/// A* над графом, заданным четырьмя функциями
pub struct AStar<T, C, D, E, N> {
    connected: C,
    distance: D,
    equal: E,
    neighbours: N,
    node_limit: usize,
    _element: std::marker::PhantomData<fn(T)>,
}

impl<T, C, D, E, N> AStar<T, C, D, E, N>
where
    T: Clone,
    C: Fn(&T, &T) -> bool,
    D: Fn(&T, &T) -> u32,
    E: Fn(&T, &T) -> bool,
    N: Fn(&T) -> Vec<T>,
{
    pub fn new(connected: C, distance: D, equal: E, neighbours: N) -> Self {
        Self {
            connected,
            distance,
            equal,
            neighbours,
            node_limit: DEFAULT_NODE_LIMIT,
            _element: std::marker::PhantomData,
        }
    }

    /// Ограничивает число создаваемых узлов (например, размером сетки).
    #[must_use]
    pub fn with_node_limit(mut self, node_limit: usize) -> Self {
        self.node_limit = node_limit.max(1);
        self
    }

    pub fn search(&self, start: T, goal: T) -> SearchOutcome<T> {
        let mut memo = ScanMemo {
            equal: &self.equal,
        };
        run(
            start,
            &goal,
            self.node_limit,
            &mut memo,
            |e| (self.equal)(e, &goal),
            &self.neighbours,
            &self.connected,
            &self.distance,
        )
    }

    /// Путь от `start` до `goal` или `None`, если цель недостижима.
    pub fn find_path(&self, start: T, goal: T) -> Option<Vec<T>> {
        self.search(start, goal).path
    }
}

/// Разовый поиск без явного построения [`AStar`]
pub fn find_path<T, C, D, E, N>(
    start: T,
    goal: T,
    connected: C,
    distance: D,
    equal: E,
    neighbours: N,
) -> Option<Vec<T>>
where
    T: Clone,
    C: Fn(&T, &T) -> bool,
    D: Fn(&T, &T) -> u32,
    E: Fn(&T, &T) -> bool,
    N: Fn(&T) -> Vec<T>,
{
    AStar::new(connected, distance, equal, neighbours).find_path(start, goal)
}

/// Поиск по [`SearchGraph`] с мемо на хеш-таблице
pub fn search_graph<G: SearchGraph>(
    graph: &G,
    start: G::Node,
    goal: G::Node,
    node_limit: usize,
) -> SearchOutcome<G::Node> {
    let goal_key = graph.key(&goal);
    let mut memo = KeyedMemo {
        graph,
        index: HashMap::new(),
    };
    run(
        start,
        &goal,
        node_limit,
        &mut memo,
        |e| graph.key(e) == goal_key,
        |e| graph.neighbours(e),
        |a, b| graph.connected(a, b),
        |a, b| graph.distance(a, b),
    )
}

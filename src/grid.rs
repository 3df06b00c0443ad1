use crate::algorithms::common::{Cost, Graph, INFINITE};
use crate::error::MapError;
use pathfinding::prelude::dijkstra;
use rand::Rng;

/// Index of a node in the grid's node arena.
pub type NodeId = usize;
/// Index of an edge in the grid's edge arena.
pub type EdgeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }

    pub fn manhattan(&self, other: &Position) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Landscape of a cell. Entering a cell costs its terrain's cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terrain {
    Street,
    Plains,
    Forest,
    Hill,
    Mountain,
}

impl Terrain {
    pub fn cost(self) -> Cost {
        match self {
            Terrain::Street => 1,
            Terrain::Plains => 2,
            Terrain::Forest => 3,
            Terrain::Hill => 5,
            Terrain::Mountain => INFINITE,
        }
    }

    pub fn is_passable(self) -> bool {
        self.cost() != INFINITE
    }

    pub fn glyph(self) -> char {
        match self {
            Terrain::Street => '.',
            Terrain::Plains => ',',
            Terrain::Forest => 'f',
            Terrain::Hill => 'h',
            Terrain::Mountain => '#',
        }
    }

    fn from_glyph(glyph: char) -> Option<Terrain> {
        match glyph {
            '.' | 'S' | 'G' | '?' => Some(Terrain::Street),
            ',' => Some(Terrain::Plains),
            'f' => Some(Terrain::Forest),
            'h' => Some(Terrain::Hill),
            '#' => Some(Terrain::Mountain),
            _ => None,
        }
    }
}

/// The four edge slots of a node, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    fn slot(self) -> usize {
        self as usize
    }

    fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub position: Position,
    pub terrain: Terrain,
    /// Whether the searcher has seen this cell. Unknown cells are fog.
    pub known: bool,
    edges: [Option<EdgeId>; 4],
}

impl Node {
    pub fn cost(&self) -> Cost {
        self.terrain.cost()
    }

    pub fn edge(&self, direction: Direction) -> Option<EdgeId> {
        self.edges[direction.slot()]
    }

    pub fn edges(&self) -> [Option<EdgeId>; 4] {
        self.edges
    }
}

/// Undirected connection between two orthogonally adjacent nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    a: NodeId,
    b: NodeId,
}

impl Edge {
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.a, self.b)
    }

    /// The endpoint opposite `node`, or `None` if `node` is not on this edge.
    pub fn other_endpoint(&self, node: NodeId) -> Option<NodeId> {
        if node == self.a {
            Some(self.b)
        } else if node == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Percentages of each terrain used by random generation. Plains fill the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainMix {
    pub street: u8,
    pub forest: u8,
    pub hill: u8,
    pub mountain: u8,
}

impl TerrainMix {
    fn pick<R: Rng>(&self, rng: &mut R) -> Terrain {
        let roll = rng.gen_range(0..100u32);
        let mut bound = u32::from(self.mountain);
        if roll < bound {
            return Terrain::Mountain;
        }
        bound += u32::from(self.hill);
        if roll < bound {
            return Terrain::Hill;
        }
        bound += u32::from(self.forest);
        if roll < bound {
            return Terrain::Forest;
        }
        bound += u32::from(self.street);
        if roll < bound {
            return Terrain::Street;
        }
        Terrain::Plains
    }
}

/// A map parsed from text, with the optional `S` and `G` markers resolved.
#[derive(Debug, Clone)]
pub struct ParsedMap {
    pub grid: Grid,
    pub start: Option<NodeId>,
    pub target: Option<NodeId>,
}

/// Fixed-topology 4-connected grid. Nodes and edges live in arenas and refer
/// to each other by index.
#[derive(Debug, Clone)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Grid {
    /// An all-plains grid with nothing known to the searcher.
    pub fn new(width: usize, height: usize) -> Self {
        Self::from_terrain(width, height, vec![Terrain::Plains; width * height])
    }

    /// Builds nodes row by row from `terrain` and links every orthogonal pair.
    pub fn from_terrain(width: usize, height: usize, terrain: Vec<Terrain>) -> Self {
        debug_assert_eq!(terrain.len(), width * height);

        let nodes = terrain
            .into_iter()
            .enumerate()
            .map(|(id, terrain)| Node {
                id,
                position: Position::new(id % width, id / width),
                terrain,
                known: false,
                edges: [None; 4],
            })
            .collect();

        let mut grid = Grid {
            width,
            height,
            nodes,
            edges: Vec::new(),
        };

        for y in 0..height {
            for x in 0..width {
                let id = y * width + x;
                if x + 1 < width {
                    grid.link(id, id + 1, Direction::East);
                }
                if y + 1 < height {
                    grid.link(id, id + width, Direction::South);
                }
            }
        }
        grid
    }

    /// Random terrain according to `mix`, nothing known.
    pub fn random<R: Rng>(width: usize, height: usize, mix: &TerrainMix, rng: &mut R) -> Self {
        let terrain = (0..width * height).map(|_| mix.pick(rng)).collect();
        Self::from_terrain(width, height, terrain)
    }

    /// Parses a map drawn one row per line.
    ///
    /// `.` street, `,` plains, `f` forest, `h` hill, `#` mountain, `?` street
    /// hidden in fog, `S`/`G` street cells marking start and target. Every cell
    /// except `?` starts out known.
    pub fn from_ascii(map: &str) -> Result<ParsedMap, MapError> {
        let rows: Vec<&str> = map
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let width = rows.first().map(|row| row.chars().count()).ok_or(MapError::Empty)?;
        if width == 0 {
            return Err(MapError::Empty);
        }

        let mut terrain = Vec::with_capacity(width * rows.len());
        let mut hidden = Vec::new();
        let mut start = None;
        let mut target = None;

        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(MapError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }
            for (column, glyph) in line.chars().enumerate() {
                let id = row * width + column;
                let cell = Terrain::from_glyph(glyph).ok_or(MapError::UnknownGlyph {
                    glyph,
                    row,
                    column,
                })?;
                match glyph {
                    'S' if start.replace(id).is_some() => {
                        return Err(MapError::DuplicateMarker { glyph });
                    }
                    'G' if target.replace(id).is_some() => {
                        return Err(MapError::DuplicateMarker { glyph });
                    }
                    '?' => hidden.push(id),
                    _ => {}
                }
                terrain.push(cell);
            }
        }

        let mut grid = Self::from_terrain(width, rows.len(), terrain);
        grid.reveal_all();
        for id in hidden {
            grid.set_known(id, false);
        }

        Ok(ParsedMap {
            grid,
            start,
            target,
        })
    }

    fn link(&mut self, from: NodeId, to: NodeId, direction: Direction) {
        let edge = self.edges.len();
        self.edges.push(Edge { a: from, b: to });
        self.nodes[from].edges[direction.slot()] = Some(edge);
        self.nodes[to].edges[direction.opposite().slot()] = Some(edge);
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_at(&self, position: Position) -> Option<NodeId> {
        if position.x < self.width && position.y < self.height {
            Some(position.y * self.width + position.x)
        } else {
            None
        }
    }

    pub fn set_terrain(&mut self, id: NodeId, terrain: Terrain) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.terrain = terrain;
        }
    }

    pub fn set_known(&mut self, id: NodeId, known: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.known = known;
        }
    }

    pub fn reveal_all(&mut self) {
        for node in &mut self.nodes {
            node.known = true;
        }
    }

    pub fn hide_all(&mut self) {
        for node in &mut self.nodes {
            node.known = false;
        }
    }

    /// Marks every node within `radius` (Chebyshev) of `center` as known.
    /// Returns how many nodes were newly revealed.
    pub fn reveal_radius(&mut self, center: NodeId, radius: usize) -> usize {
        let Some(center) = self.node(center).map(|n| n.position) else {
            return 0;
        };
        let min_x = center.x.saturating_sub(radius);
        let max_x = (center.x + radius).min(self.width - 1);
        let min_y = center.y.saturating_sub(radius);
        let max_y = (center.y + radius).min(self.height - 1);

        let mut revealed = 0;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let node = &mut self.nodes[y * self.width + x];
                if !node.known {
                    node.known = true;
                    revealed += 1;
                }
            }
        }
        revealed
    }

    pub fn known_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.known).count()
    }

    /// Cost of walking `path`: every node after the first is entered once.
    pub fn path_cost(&self, path: &[NodeId]) -> Cost {
        path.iter()
            .skip(1)
            .map(|&id| self.intrinsic_cost(id))
            .fold(0, Cost::saturating_add)
    }

    /// Cheapest route and its cost computed independently of the fog search.
    /// With `respect_fog` only known cells (plus `start`) may be crossed.
    pub fn optimal_cost(
        &self,
        start: NodeId,
        target: NodeId,
        respect_fog: bool,
    ) -> Option<(Vec<NodeId>, Cost)> {
        if start >= self.nodes.len() || target >= self.nodes.len() {
            return None;
        }
        dijkstra(
            &start,
            |&id| {
                self.neighbors(id)
                    .into_iter()
                    .filter(|&n| {
                        let node = &self.nodes[n];
                        node.terrain.is_passable() && (!respect_fog || node.known)
                    })
                    .map(|n| (n, self.nodes[n].cost()))
                    .collect::<Vec<_>>()
            },
            |&id| id == target,
        )
    }

    /// Print a visual representation of the grid with an optional path overlay.
    pub fn print_grid(
        &self,
        agent: Option<NodeId>,
        start: NodeId,
        goal: NodeId,
        path: &[NodeId],
    ) {
        println!("Legend: S=Start, G=Goal, A=Agent, *=Path, ?=Fog, .=Street ,=Plains f=Forest h=Hill #=Mountain");

        print!("   ");
        for x in 0..self.width {
            print!("{:2}", x % 10);
        }
        println!();

        for y in 0..self.height {
            print!("{:2} ", y);
            for x in 0..self.width {
                let id = y * self.width + x;
                let node = &self.nodes[id];
                let glyph = if Some(id) == agent {
                    'A'
                } else if id == start {
                    'S'
                } else if id == goal {
                    'G'
                } else if path.contains(&id) {
                    '*'
                } else if !node.known {
                    '?'
                } else {
                    node.terrain.glyph()
                };
                print!("{} ", glyph);
            }
            println!();
        }
        println!();
    }
}

impl Graph for Grid {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edges_of(&self, node: NodeId) -> [Option<EdgeId>; 4] {
        self.nodes.get(node).map(Node::edges).unwrap_or([None; 4])
    }

    fn other_endpoint(&self, edge: EdgeId, node: NodeId) -> Option<NodeId> {
        self.edges.get(edge)?.other_endpoint(node)
    }

    fn is_known(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|n| n.known)
    }

    fn intrinsic_cost(&self, node: NodeId) -> Cost {
        self.nodes.get(node).map_or(INFINITE, Node::cost)
    }

    fn location(&self, node: NodeId) -> Position {
        self.nodes
            .get(node)
            .map_or(Position::new(usize::MAX, usize::MAX), |n| n.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_edges_are_shared_between_neighbors() {
        let grid = Grid::new(3, 2);
        let center = grid.node_at(Position::new(1, 0)).unwrap();
        let below = grid.node_at(Position::new(1, 1)).unwrap();

        let south = grid.node(center).unwrap().edge(Direction::South).unwrap();
        assert_eq!(grid.node(below).unwrap().edge(Direction::North), Some(south));
        assert_eq!(grid.other_endpoint(south, center), Some(below));
        assert_eq!(grid.other_endpoint(south, below), Some(center));
        assert_eq!(grid.other_endpoint(south, 0), None);

        // Corners have exactly two edges, the top middle three.
        assert_eq!(grid.neighbors(0).len(), 2);
        assert_eq!(grid.neighbors(center).len(), 3);
        assert_eq!(grid.node(0).unwrap().edge(Direction::North), None);
    }

    #[test]
    fn test_from_ascii_markers_and_fog() {
        let parsed = Grid::from_ascii(
            "S.#
             ?fG",
        )
        .unwrap();
        let grid = &parsed.grid;
        assert_eq!((grid.width, grid.height), (3, 2));
        assert_eq!(parsed.start, Some(0));
        assert_eq!(parsed.target, Some(5));
        assert_eq!(grid.intrinsic_cost(2), INFINITE);
        assert_eq!(grid.intrinsic_cost(4), 3);
        assert!(!grid.is_known(3));
        assert_eq!(grid.known_count(), 5);
    }

    #[test]
    fn test_from_ascii_rejects_bad_input() {
        assert_eq!(Grid::from_ascii("").unwrap_err(), MapError::Empty);
        assert_eq!(
            Grid::from_ascii("..\n...").unwrap_err(),
            MapError::RaggedRow {
                row: 1,
                expected: 2,
                found: 3
            }
        );
        assert_eq!(
            Grid::from_ascii(".x").unwrap_err(),
            MapError::UnknownGlyph {
                glyph: 'x',
                row: 0,
                column: 1
            }
        );
        assert_eq!(
            Grid::from_ascii("SS").unwrap_err(),
            MapError::DuplicateMarker { glyph: 'S' }
        );
    }

    #[test]
    fn test_reveal_radius_clamps_to_bounds() {
        let mut grid = Grid::new(5, 5);
        assert_eq!(grid.reveal_radius(0, 1), 4);
        assert_eq!(grid.reveal_radius(0, 1), 0);
        assert_eq!(grid.reveal_radius(12, 2), 21);
        assert_eq!(grid.known_count(), 25);
    }

    #[test]
    fn test_optimal_cost_respects_fog() {
        let parsed = Grid::from_ascii(
            "S?G
             ,,,",
        )
        .unwrap();
        let grid = parsed.grid;
        let (_, full) = grid.optimal_cost(0, 2, false).unwrap();
        let (path, fogged) = grid.optimal_cost(0, 2, true).unwrap();
        assert_eq!(full, 2);
        assert_eq!(fogged, 2 + 2 + 2 + 1);
        assert_eq!(grid.path_cost(&path), fogged);
    }

    #[test]
    fn test_random_mix_only_produces_requested_terrain() {
        let mut rng = StdRng::seed_from_u64(7);
        let mix = TerrainMix {
            street: 0,
            forest: 0,
            hill: 0,
            mountain: 100,
        };
        let grid = Grid::random(4, 4, &mix, &mut rng);
        assert!(grid.nodes().iter().all(|n| n.terrain == Terrain::Mountain));
        assert!(grid.nodes().iter().all(|n| n.cost() == INFINITE));
    }
}

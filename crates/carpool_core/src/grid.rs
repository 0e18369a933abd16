//! City layout: a dense grid of tiles plus the intersection specs that
//! drive the traffic signals.

use bevy_ecs::prelude::*;

/// Cell coordinates on the city grid. `y` grows upward, matching the
/// visualization clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan_distance(&self, other: &GridPos) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Orthogonal neighbors only, never the cell itself.
    pub fn is_adjacent(&self, other: &GridPos) -> bool {
        self.manhattan_distance(other) == 1
    }
}

/// One of the four travel directions. The declaration order is the scan
/// order used everywhere a set of directions is inspected, which keeps
/// runs with the same seed reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Left,
    Right,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Right,
        Direction::Down,
    ];

    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Down => (0, -1),
        }
    }

    /// Two-letter wire code used in snapshots and traffic light ids.
    pub fn code(self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Left => "LF",
            Direction::Right => "RH",
            Direction::Down => "DW",
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        match (dx, dy) {
            (0, 1) => Some(Direction::Up),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            (0, -1) => Some(Direction::Down),
            _ => None,
        }
    }
}

/// Index into [`CityGrid::intersections`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntersectionId(pub usize);

/// What a single cell of the city contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tile {
    /// One-way road flowing in the given direction.
    Road(Direction),
    /// Walkable cell where passengers appear and wait.
    Sidewalk,
    /// Signal-controlled crossing, owned by the referenced spec.
    Intersection(IntersectionId),
    /// Impassable cell.
    Building,
}

/// Static description of one intersection: which inbound directions are
/// gated by a light, and which outbound directions a car may take.
#[derive(Debug, Clone)]
pub struct IntersectionSpec {
    pub position: GridPos,
    pub directions_to_stop: Vec<Direction>,
    pub directions_to_go: Vec<Direction>,
}

/// The immutable city map. Tiles are stored row-major with
/// `index = y * width + x`.
#[derive(Debug, Clone, Resource)]
pub struct CityGrid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
    intersections: Vec<IntersectionSpec>,
}

impl CityGrid {
    pub fn new(
        width: i32,
        height: i32,
        tiles: Vec<Tile>,
        intersections: Vec<IntersectionSpec>,
    ) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        assert_eq!(
            tiles.len(),
            (width * height) as usize,
            "tile count must match grid dimensions"
        );
        let grid = Self {
            width,
            height,
            tiles,
            intersections,
        };
        for (id, spec) in grid.intersections.iter().enumerate() {
            assert!(
                !spec.directions_to_stop.is_empty(),
                "intersection {:?} must gate at least one direction",
                spec.position
            );
            assert_eq!(
                grid.tile(spec.position),
                &Tile::Intersection(IntersectionId(id)),
                "intersection spec {:?} must sit on its own tile",
                spec.position
            );
        }
        for (index, tile) in grid.tiles.iter().enumerate() {
            if let Tile::Intersection(id) = tile {
                assert!(
                    id.0 < grid.intersections.len(),
                    "tile {} references unknown intersection {}",
                    index,
                    id.0
                );
            }
        }
        grid
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    pub fn tile(&self, pos: GridPos) -> &Tile {
        assert!(self.contains(pos), "position {:?} out of bounds", pos);
        &self.tiles[(pos.y * self.width + pos.x) as usize]
    }

    /// The in-bounds cell one step in `direction`, if any.
    pub fn step(&self, pos: GridPos, direction: Direction) -> Option<GridPos> {
        let (dx, dy) = direction.offset();
        let next = GridPos::new(pos.x + dx, pos.y + dy);
        self.contains(next).then_some(next)
    }

    /// In-bounds orthogonal neighbors, scanned in [`Direction::ALL`] order.
    pub fn neighbors(&self, pos: GridPos) -> Vec<GridPos> {
        Direction::ALL
            .iter()
            .filter_map(|direction| self.step(pos, *direction))
            .collect()
    }

    /// Directions a car standing on `pos` is allowed to leave through.
    /// Empty for sidewalks and buildings.
    pub fn exits(&self, pos: GridPos) -> Vec<Direction> {
        match self.tile(pos) {
            Tile::Road(direction) => vec![*direction],
            Tile::Intersection(id) => self.intersections[id.0].directions_to_go.clone(),
            Tile::Sidewalk | Tile::Building => Vec::new(),
        }
    }

    pub fn intersection(&self, id: IntersectionId) -> &IntersectionSpec {
        &self.intersections[id.0]
    }

    pub fn intersections(&self) -> &[IntersectionSpec] {
        &self.intersections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> CityGrid {
        let tiles = vec![
            Tile::Road(Direction::Right),
            Tile::Intersection(IntersectionId(0)),
            Tile::Sidewalk,
            Tile::Building,
        ];
        let intersections = vec![IntersectionSpec {
            position: GridPos::new(1, 0),
            directions_to_stop: vec![Direction::Right],
            directions_to_go: vec![Direction::Up],
        }];
        CityGrid::new(2, 2, tiles, intersections)
    }

    #[test]
    fn adjacency_is_orthogonal_distance_one() {
        let origin = GridPos::new(3, 3);
        assert!(origin.is_adjacent(&GridPos::new(3, 4)));
        assert!(origin.is_adjacent(&GridPos::new(2, 3)));
        assert!(!origin.is_adjacent(&GridPos::new(4, 4)));
        assert!(!origin.is_adjacent(&origin));
    }

    #[test]
    fn step_respects_bounds() {
        let grid = two_by_two();
        assert_eq!(
            grid.step(GridPos::new(0, 0), Direction::Right),
            Some(GridPos::new(1, 0))
        );
        assert_eq!(grid.step(GridPos::new(0, 0), Direction::Left), None);
        assert_eq!(grid.step(GridPos::new(0, 1), Direction::Up), None);
    }

    #[test]
    fn exits_follow_tile_kind() {
        let grid = two_by_two();
        assert_eq!(grid.exits(GridPos::new(0, 0)), vec![Direction::Right]);
        assert_eq!(grid.exits(GridPos::new(1, 0)), vec![Direction::Up]);
        assert!(grid.exits(GridPos::new(0, 1)).is_empty());
        assert!(grid.exits(GridPos::new(1, 1)).is_empty());
    }

    #[test]
    fn direction_codes_round_trip_offsets() {
        for direction in Direction::ALL {
            let (dx, dy) = direction.offset();
            assert_eq!(Direction::from_delta(dx, dy), Some(direction));
        }
        assert_eq!(Direction::from_delta(1, 1), None);
    }

    #[test]
    #[should_panic(expected = "tile count must match")]
    fn construction_rejects_wrong_tile_count() {
        CityGrid::new(2, 2, vec![Tile::Sidewalk; 3], Vec::new());
    }
}

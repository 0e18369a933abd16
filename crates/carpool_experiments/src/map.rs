//! City layout parsing.
//!
//! A layout is a block of text, one row per line, each cell a two
//! character code: `UP`/`DW`/`LF`/`RH` for one-way road cells, `IN` for
//! signal-controlled intersections, `SW` for sidewalks and `00` for
//! building filler. Lines are listed top to bottom, so the first line
//! becomes the highest `y` of the grid.
//!
//! Intersection light directions are not written down. They are inferred
//! from the surrounding road cells: a neighboring road whose flow points
//! away from the intersection is an exit, every other neighboring road
//! feeds the intersection and gets a light for its flow direction.

use carpool_core::grid::{CityGrid, Direction, GridPos, IntersectionId, IntersectionSpec, Tile};
use thiserror::Error;

/// The stock 26x26 city: a six by six lattice of alternating one-way
/// streets, sidewalk rings and building-filled blocks.
pub const DEFAULT_CITY: &str = "\
IN LF LF LF LF IN LF LF LF LF IN LF LF LF LF IN LF LF LF LF IN LF LF LF LF IN
DW SW SW SW SW UP SW SW SW SW DW SW SW SW SW UP SW SW SW SW DW SW SW SW SW UP
DW SW 00 00 SW UP SW 00 00 SW DW SW 00 00 SW UP SW 00 00 SW DW SW 00 00 SW UP
DW SW 00 00 SW UP SW 00 00 SW DW SW 00 00 SW UP SW 00 00 SW DW SW 00 00 SW UP
DW SW SW SW SW UP SW SW SW SW DW SW SW SW SW UP SW SW SW SW DW SW SW SW SW UP
IN RH RH RH RH IN RH RH RH RH IN RH RH RH RH IN RH RH RH RH IN RH RH RH RH IN
DW SW SW SW SW UP SW SW SW SW DW SW SW SW SW UP SW SW SW SW DW SW SW SW SW UP
DW SW 00 00 SW UP SW 00 00 SW DW SW 00 00 SW UP SW 00 00 SW DW SW 00 00 SW UP
DW SW 00 00 SW UP SW 00 00 SW DW SW 00 00 SW UP SW 00 00 SW DW SW 00 00 SW UP
DW SW SW SW SW UP SW SW SW SW DW SW SW SW SW UP SW SW SW SW DW SW SW SW SW UP
IN LF LF LF LF IN LF LF LF LF IN LF LF LF LF IN LF LF LF LF IN LF LF LF LF IN
DW SW SW SW SW UP SW SW SW SW DW SW SW SW SW UP SW SW SW SW DW SW SW SW SW UP
DW SW 00 00 SW UP SW 00 00 SW DW SW 00 00 SW UP SW 00 00 SW DW SW 00 00 SW UP
DW SW 00 00 SW UP SW 00 00 SW DW SW 00 00 SW UP SW 00 00 SW DW SW 00 00 SW UP
DW SW SW SW SW UP SW SW SW SW DW SW SW SW SW UP SW SW SW SW DW SW SW SW SW UP
IN RH RH RH RH IN RH RH RH RH IN RH RH RH RH IN RH RH RH RH IN RH RH RH RH IN
DW SW SW SW SW UP SW SW SW SW DW SW SW SW SW UP SW SW SW SW DW SW SW SW SW UP
DW SW 00 00 SW UP SW 00 00 SW DW SW 00 00 SW UP SW 00 00 SW DW SW 00 00 SW UP
DW SW 00 00 SW UP SW 00 00 SW DW SW 00 00 SW UP SW 00 00 SW DW SW 00 00 SW UP
DW SW SW SW SW UP SW SW SW SW DW SW SW SW SW UP SW SW SW SW DW SW SW SW SW UP
IN LF LF LF LF IN LF LF LF LF IN LF LF LF LF IN LF LF LF LF IN LF LF LF LF IN
DW SW SW SW SW UP SW SW SW SW DW SW SW SW SW UP SW SW SW SW DW SW SW SW SW UP
DW SW 00 00 SW UP SW 00 00 SW DW SW 00 00 SW UP SW 00 00 SW DW SW 00 00 SW UP
DW SW 00 00 SW UP SW 00 00 SW DW SW 00 00 SW UP SW 00 00 SW DW SW 00 00 SW UP
DW SW SW SW SW UP SW SW SW SW DW SW SW SW SW UP SW SW SW SW DW SW SW SW SW UP
IN RH RH RH RH IN RH RH RH RH IN RH RH RH RH IN RH RH RH RH IN RH RH RH RH IN
";

/// Why a layout could not be turned into a [`CityGrid`].
#[derive(Debug, Error)]
pub enum MapError {
    #[error("layout has no rows")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown tile code {code:?} at row {row}, column {column}")]
    UnknownCode {
        code: String,
        row: usize,
        column: usize,
    },
    /// Grid coordinates of an intersection no road feeds into. Its
    /// lights would gate nothing.
    #[error("intersection at ({x}, {y}) has no inbound road")]
    NoInboundRoad { x: i32, y: i32 },
}

enum RawTile {
    Road(Direction),
    Sidewalk,
    Crossing,
    Building,
}

fn decode(code: &str) -> Option<RawTile> {
    match code {
        "IN" => Some(RawTile::Crossing),
        "UP" => Some(RawTile::Road(Direction::Up)),
        "LF" => Some(RawTile::Road(Direction::Left)),
        "RH" => Some(RawTile::Road(Direction::Right)),
        "DW" => Some(RawTile::Road(Direction::Down)),
        "SW" => Some(RawTile::Sidewalk),
        "00" => Some(RawTile::Building),
        _ => None,
    }
}

/// Light directions for the crossing at `pos`, probed in
/// [`Direction::ALL`] order so the rotation is reproducible.
fn crossing_directions(
    raw: &[RawTile],
    width: i32,
    height: i32,
    pos: GridPos,
) -> (Vec<Direction>, Vec<Direction>) {
    let mut directions_to_stop = Vec::new();
    let mut directions_to_go = Vec::new();
    for probe in Direction::ALL {
        let (dx, dy) = probe.offset();
        let neighbor = GridPos::new(pos.x + dx, pos.y + dy);
        if neighbor.x < 0 || neighbor.x >= width || neighbor.y < 0 || neighbor.y >= height {
            continue;
        }
        if let RawTile::Road(flow) = raw[(neighbor.y * width + neighbor.x) as usize] {
            if flow == probe {
                directions_to_go.push(probe);
            } else if !directions_to_stop.contains(&flow) {
                directions_to_stop.push(flow);
            }
        }
    }
    (directions_to_stop, directions_to_go)
}

/// Parse a layout into a [`CityGrid`].
pub fn parse_city_map(layout: &str) -> Result<CityGrid, MapError> {
    let rows: Vec<Vec<&str>> = layout
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .filter(|codes| !codes.is_empty())
        .collect();
    if rows.is_empty() {
        return Err(MapError::Empty);
    }

    let height = rows.len();
    let width = rows[0].len();
    for (row, codes) in rows.iter().enumerate() {
        if codes.len() != width {
            return Err(MapError::RaggedRow {
                row,
                expected: width,
                found: codes.len(),
            });
        }
    }

    // Decode into grid order: the first text row is the top of the city,
    // so `raw[y * width + x]` reads the rows back to front.
    let mut raw = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = height - 1 - y;
        for (column, code) in rows[row].iter().enumerate() {
            match decode(code) {
                Some(tile) => raw.push(tile),
                None => {
                    return Err(MapError::UnknownCode {
                        code: (*code).to_string(),
                        row,
                        column,
                    })
                }
            }
        }
    }

    let width = width as i32;
    let height = height as i32;
    let mut tiles = Vec::with_capacity(raw.len());
    let mut intersections = Vec::new();
    for (index, tile) in raw.iter().enumerate() {
        let pos = GridPos::new(index as i32 % width, index as i32 / width);
        tiles.push(match tile {
            RawTile::Road(direction) => Tile::Road(*direction),
            RawTile::Sidewalk => Tile::Sidewalk,
            RawTile::Building => Tile::Building,
            RawTile::Crossing => {
                let (directions_to_stop, directions_to_go) =
                    crossing_directions(&raw, width, height, pos);
                if directions_to_stop.is_empty() {
                    return Err(MapError::NoInboundRoad { x: pos.x, y: pos.y });
                }
                let id = IntersectionId(intersections.len());
                intersections.push(IntersectionSpec {
                    position: pos,
                    directions_to_stop,
                    directions_to_go,
                });
                Tile::Intersection(id)
            }
        });
    }

    Ok(CityGrid::new(width, height, tiles, intersections))
}

/// The parsed [`DEFAULT_CITY`].
pub fn built_in_city() -> CityGrid {
    parse_city_map(DEFAULT_CITY).expect("the built-in layout must parse")
}

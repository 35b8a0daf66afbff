//! Tile map ingestion, spawn derivation and circle-vs-tile collision

use std::path::Path;

use glam::Vec2;
use tracing::{info, warn};

use super::entities::Team;

/// World units per tile edge
pub const TILE_SIZE: f32 = 40.0;

/// Built-in arena dimensions (tiles)
pub const ARENA_WIDTH: usize = 40;
pub const ARENA_HEIGHT: usize = 25;

const FLOOR: u8 = 0;
const SOLID: u8 = 1;

/// Spawn points partitioned by team
#[derive(Debug, Clone, Default)]
pub struct TeamSpawns {
    pub blue: Vec<Vec2>,
    pub red: Vec<Vec2>,
    pub none: Vec<Vec2>,
}

impl TeamSpawns {
    pub fn for_team(&self, team: Team) -> &[Vec2] {
        match team {
            Team::Blue => &self.blue,
            Team::Red => &self.red,
            Team::None => &self.none,
        }
    }
}

/// Immutable per-match tile grid
#[derive(Debug, Clone)]
pub struct MapData {
    grid: Vec<Vec<u8>>,
    pub tile_size: f32,
    pub width: usize,
    pub height: usize,
    pub spawns: Vec<Vec2>,
    pub team_spawns: TeamSpawns,
}

impl MapData {
    /// Build map data from a finished grid (rows of 0 = floor, 1 = solid).
    pub fn from_grid(grid: Vec<Vec<u8>>) -> Result<Self, MapError> {
        let height = grid.len();
        let width = grid.first().map(Vec::len).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(MapError::Empty);
        }

        for (y, row) in grid.iter().enumerate() {
            if row.len() != width {
                return Err(MapError::Ragged {
                    row: y,
                    expected: width,
                    found: row.len(),
                });
            }
            if let Some((x, &value)) = row.iter().enumerate().find(|(_, &v)| v > SOLID) {
                return Err(MapError::InvalidCell { x, y, value });
            }
        }

        let mut spawns = find_spawns(&grid);
        if spawns.is_empty() {
            let fallback = nearest_floor_to_center(&grid).ok_or(MapError::NoFloor)?;
            warn!(
                x = fallback.x,
                y = fallback.y,
                "No open spawn pockets found, falling back to floor cell nearest the centre"
            );
            spawns.push(fallback);
        }

        let team_spawns = partition_spawns(&spawns, width);

        info!(
            width,
            height,
            spawns = spawns.len(),
            blue_spawns = team_spawns.blue.len(),
            red_spawns = team_spawns.red.len(),
            "Map loaded"
        );

        Ok(Self {
            grid,
            tile_size: TILE_SIZE,
            width,
            height,
            spawns,
            team_spawns,
        })
    }

    /// Parse a JSON array of rows, e.g. `[[1,1,1],[1,0,1],[1,1,1]]`.
    pub fn from_json_str(json: &str) -> Result<Self, MapError> {
        let grid: Vec<Vec<u8>> = serde_json::from_str(json)?;
        Self::from_grid(grid)
    }

    /// Load a JSON grid from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// The built-in arena: bordered room, centre block, two gapped bars and
    /// short cover walls at each team's end.
    pub fn arena() -> Result<Self, MapError> {
        let mut grid = vec![vec![FLOOR; ARENA_WIDTH]; ARENA_HEIGHT];
        for (y, row) in grid.iter_mut().enumerate() {
            for (x, cell) in row.iter_mut().enumerate() {
                let border = x == 0 || x == ARENA_WIDTH - 1 || y == 0 || y == ARENA_HEIGHT - 1;
                let centre_block = x > 18 && x < 22 && y > 10 && y < 15;
                let bars = (x == 10 || x == 30) && y > 5 && y < 20 && y % 5 != 0;
                let cover = y == 12 && (x < 5 || x > 35);
                if border || centre_block || bars || cover {
                    *cell = SOLID;
                }
            }
        }
        Self::from_grid(grid)
    }

    pub fn grid(&self) -> &[Vec<u8>] {
        &self.grid
    }

    /// World-space extent of the map
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(
            self.width as f32 * self.tile_size,
            self.height as f32 * self.tile_size,
        )
    }

    /// Whether the tile at grid coordinates is solid. Cells outside the grid
    /// are reported as `None`.
    pub fn tile_solid(&self, tx: i32, ty: i32) -> Option<bool> {
        if tx < 0 || ty < 0 {
            return None;
        }
        self.grid
            .get(ty as usize)
            .and_then(|row| row.get(tx as usize))
            .map(|&cell| cell == SOLID)
    }

    /// Tile coordinates containing a world point
    pub fn tile_at(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.tile_size).floor() as i32,
            (pos.y / self.tile_size).floor() as i32,
        )
    }

    /// Does a circle overlap any solid tile? Tiles outside the grid are open.
    pub fn collides(&self, pos: Vec2, radius: f32) -> bool {
        let (min_x, min_y) = self.tile_at(Vec2::new(pos.x - radius, pos.y - radius));
        let (max_x, max_y) = self.tile_at(Vec2::new(pos.x + radius, pos.y + radius));

        for ty in min_y..=max_y {
            for tx in min_x..=max_x {
                if self.tile_solid(tx, ty) == Some(true) {
                    return true;
                }
            }
        }
        false
    }

    /// Inverse of [`collides`](Self::collides)
    pub fn is_walkable(&self, pos: Vec2, radius: f32) -> bool {
        !self.collides(pos, radius)
    }

    /// Is the point inside the map rectangle?
    pub fn contains(&self, pos: Vec2) -> bool {
        let size = self.world_size();
        pos.x >= 0.0 && pos.y >= 0.0 && pos.x < size.x && pos.y < size.y
    }

    /// Team spawn points, falling back to the generic list when the team
    /// half of the map has none.
    pub fn spawns_for(&self, team: Team) -> &[Vec2] {
        let team_spawns = self.team_spawns.for_team(team);
        if team_spawns.is_empty() {
            &self.spawns
        } else {
            team_spawns
        }
    }
}

fn tile_center(x: usize, y: usize) -> Vec2 {
    Vec2::new(
        x as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        y as f32 * TILE_SIZE + TILE_SIZE / 2.0,
    )
}

/// Interior cells whose right and lower neighbours are also floor.
fn find_spawns(grid: &[Vec<u8>]) -> Vec<Vec2> {
    let height = grid.len();
    let width = grid[0].len();
    let mut spawns = Vec::new();

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            if grid[y][x] == FLOOR && grid[y + 1][x] == FLOOR && grid[y][x + 1] == FLOOR {
                spawns.push(tile_center(x, y));
            }
        }
    }
    spawns
}

fn nearest_floor_to_center(grid: &[Vec<u8>]) -> Option<Vec2> {
    let cy = (grid.len() as f32 - 1.0) / 2.0;
    let cx = (grid[0].len() as f32 - 1.0) / 2.0;

    grid.iter()
        .enumerate()
        .flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, &cell)| cell == FLOOR)
                .map(move |(x, _)| (x, y))
        })
        .min_by(|a, b| {
            let da = (a.0 as f32 - cx).powi(2) + (a.1 as f32 - cy).powi(2);
            let db = (b.0 as f32 - cx).powi(2) + (b.1 as f32 - cy).powi(2);
            da.total_cmp(&db)
        })
        .map(|(x, y)| tile_center(x, y))
}

/// Left half of the map is Blue's, right half Red's; FFA uses every spawn.
fn partition_spawns(spawns: &[Vec2], width: usize) -> TeamSpawns {
    let midpoint = width as f32 * TILE_SIZE / 2.0;
    let mut team_spawns = TeamSpawns::default();
    for &spawn in spawns {
        if spawn.x < midpoint {
            team_spawns.blue.push(spawn);
        } else {
            team_spawns.red.push(spawn);
        }
        team_spawns.none.push(spawn);
    }
    team_spawns
}

/// Map ingestion errors
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Map grid is empty")]
    Empty,

    #[error("Map row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid tile value {value} at ({x}, {y})")]
    InvalidCell { x: usize, y: usize, value: u8 },

    #[error("Map has no floor tiles to spawn on")]
    NoFloor,

    #[error("Failed to parse map JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read map file: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Solid border around an open interior
    pub(crate) fn open_room(width: usize, height: usize) -> MapData {
        let grid = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| {
                        if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                            SOLID
                        } else {
                            FLOOR
                        }
                    })
                    .collect()
            })
            .collect();
        MapData::from_grid(grid).expect("open room is valid")
    }

    #[test]
    fn test_rejects_bad_grids() {
        assert!(matches!(MapData::from_grid(vec![]), Err(MapError::Empty)));
        assert!(matches!(
            MapData::from_grid(vec![vec![0, 0], vec![0]]),
            Err(MapError::Ragged { row: 1, .. })
        ));
        assert!(matches!(
            MapData::from_grid(vec![vec![0, 2]]),
            Err(MapError::InvalidCell { x: 1, y: 0, value: 2 })
        ));
        assert!(matches!(
            MapData::from_grid(vec![vec![1, 1], vec![1, 1]]),
            Err(MapError::NoFloor)
        ));
    }

    #[test]
    fn test_spawns_partitioned_by_midpoint() {
        let map = open_room(10, 6);
        assert!(!map.team_spawns.blue.is_empty());
        assert!(!map.team_spawns.red.is_empty());
        let mid = map.world_size().x / 2.0;
        assert!(map.team_spawns.blue.iter().all(|s| s.x < mid));
        assert!(map.team_spawns.red.iter().all(|s| s.x >= mid));
        assert_eq!(map.team_spawns.none.len(), map.spawns.len());
        for spawn in &map.spawns {
            assert!(map.is_walkable(*spawn, 15.0));
        }
    }

    #[test]
    fn test_fallback_spawn_when_no_pockets() {
        // A single-cell corridor: no cell has both right and lower floor neighbours
        let grid = vec![
            vec![1, 1, 1, 1, 1],
            vec![1, 1, 0, 1, 1],
            vec![1, 1, 1, 1, 1],
        ];
        let map = MapData::from_grid(grid).unwrap();
        assert_eq!(map.spawns, vec![Vec2::new(100.0, 60.0)]);
        // Right half gets the lone spawn; Blue falls back to the generic list
        assert_eq!(map.spawns_for(Team::Blue), map.spawns.as_slice());
    }

    #[test]
    fn test_collision_against_walls() {
        let map = open_room(5, 5);
        // Centre of tile (2, 2) is open
        assert!(map.is_walkable(Vec2::new(100.0, 100.0), 15.0));
        // Touching the left border tile (x < 40)
        assert!(map.collides(Vec2::new(50.0, 100.0), 15.0));
        // Outside the grid is not solid
        assert!(!map.collides(Vec2::new(-500.0, -500.0), 5.0));
    }

    #[test]
    fn test_arena_layout() {
        let map = MapData::arena().unwrap();
        assert_eq!(map.width, ARENA_WIDTH);
        assert_eq!(map.height, ARENA_HEIGHT);
        assert_eq!(map.tile_solid(20, 12), Some(true));
        assert_eq!(map.tile_solid(2, 2), Some(false));
        assert!(!map.team_spawns.blue.is_empty());
        assert!(!map.team_spawns.red.is_empty());
    }

    #[test]
    fn test_json_ingestion() {
        let map = MapData::from_json_str("[[1,1,1,1],[1,0,0,1],[1,0,0,1],[1,1,1,1]]").unwrap();
        assert_eq!(map.width, 4);
        assert_eq!(map.spawns.len(), 1);
        assert!(matches!(MapData::from_json_str("not json"), Err(MapError::Parse(_))));
    }
}

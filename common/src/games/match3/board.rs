use super::types::{BOARD_SIZE, CELL_COUNT, GemType, Gem, Position, PowerupTag};
use crate::games::session_rng::RandomSource;
use crate::id_generator::GemIdGenerator;

/// Type-only snapshot of the grid, row-major. `None` is an empty cell.
pub type TypeGrid = Vec<Vec<Option<GemType>>>;

/// The 8x8 grid. Owns every gem; each stored gem's `position` equals its cell.
#[derive(Clone, Debug)]
pub struct Board {
    cells: Vec<Option<Gem>>,
    ids: GemIdGenerator,
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: vec![None; CELL_COUNT],
            ids: GemIdGenerator::new(),
        }
    }

    /// A full board with no run of three anywhere.
    pub fn generate(rng: &mut impl RandomSource) -> Self {
        let mut board = Self::new();
        board.initialize(rng);
        board
    }

    pub fn initialize(&mut self, rng: &mut impl RandomSource) {
        self.clear();
        for pos in Position::all() {
            let allowed = self.types_without_run_at(pos);
            let gem_type = rng.pick(&allowed).copied().unwrap_or(GemType::Ruby);
            self.spawn(pos, gem_type, PowerupTag::None);
        }
    }

    /// Types that would not complete a run of three ending at `pos`, looking only
    /// at the two cells to the left and the two cells above.
    fn types_without_run_at(&self, pos: Position) -> Vec<GemType> {
        let mut excluded: Vec<GemType> = Vec::with_capacity(2);

        if pos.col >= 2 {
            let left = self.gem_type_at(Position::new(pos.row, pos.col - 1));
            let left2 = self.gem_type_at(Position::new(pos.row, pos.col - 2));
            if let (Some(a), Some(b)) = (left, left2)
                && a == b
            {
                excluded.push(a);
            }
        }

        if pos.row >= 2 {
            let up = self.gem_type_at(Position::new(pos.row - 1, pos.col));
            let up2 = self.gem_type_at(Position::new(pos.row - 2, pos.col));
            if let (Some(a), Some(b)) = (up, up2)
                && a == b
            {
                excluded.push(a);
            }
        }

        GemType::ALL
            .iter()
            .copied()
            .filter(|t| !excluded.contains(t))
            .collect()
    }

    pub fn get(&self, pos: Position) -> Option<&Gem> {
        if !pos.is_in_bounds() {
            return None;
        }
        self.cells[pos.to_index()].as_ref()
    }

    pub fn gem_type_at(&self, pos: Position) -> Option<GemType> {
        self.get(pos).map(|gem| gem.gem_type)
    }

    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.get(pos).is_none()
    }

    /// Places `gem` at `pos`, rewriting its stored position. Out of bounds is a no-op.
    pub fn set(&mut self, pos: Position, mut gem: Gem) -> bool {
        if !pos.is_in_bounds() {
            return false;
        }
        gem.position = pos;
        self.cells[pos.to_index()] = Some(gem);
        true
    }

    pub fn remove(&mut self, pos: Position) -> Option<Gem> {
        if !pos.is_in_bounds() {
            return None;
        }
        self.cells[pos.to_index()].take()
    }

    /// Creates a gem with a fresh id and stores it at `pos`.
    pub fn spawn(&mut self, pos: Position, gem_type: GemType, powerup: PowerupTag) -> Option<Gem> {
        if !pos.is_in_bounds() {
            return None;
        }
        let gem = Gem {
            id: self.ids.next_id(),
            gem_type,
            position: pos,
            powerup,
        };
        self.cells[pos.to_index()] = Some(gem);
        Some(gem)
    }

    pub fn retype(&mut self, pos: Position, gem_type: GemType) -> bool {
        if !pos.is_in_bounds() {
            return false;
        }
        match self.cells[pos.to_index()].as_mut() {
            Some(gem) => {
                gem.gem_type = gem_type;
                true
            }
            None => false,
        }
    }

    pub fn set_powerup(&mut self, pos: Position, powerup: PowerupTag) -> bool {
        if !pos.is_in_bounds() {
            return false;
        }
        match self.cells[pos.to_index()].as_mut() {
            Some(gem) => {
                gem.powerup = powerup;
                true
            }
            None => false,
        }
    }

    pub fn are_adjacent(a: Position, b: Position) -> bool {
        a.manhattan_distance(b) == 1
    }

    /// Exchanges the two cells, whatever they hold. Validation belongs to the caller.
    pub fn swap(&mut self, a: Position, b: Position) -> bool {
        if !a.is_in_bounds() || !b.is_in_bounds() {
            return false;
        }
        let (ia, ib) = (a.to_index(), b.to_index());
        self.cells.swap(ia, ib);
        if let Some(gem) = self.cells[ia].as_mut() {
            gem.position = a;
        }
        if let Some(gem) = self.cells[ib].as_mut() {
            gem.position = b;
        }
        true
    }

    /// Compacts each column toward the bottom row, keeping relative order.
    /// Returns the gems that moved, at their new positions.
    pub fn apply_gravity(&mut self) -> Vec<Gem> {
        let mut moved = Vec::new();

        for col in 0..BOARD_SIZE {
            let mut write_row = BOARD_SIZE;
            for read_row in (0..BOARD_SIZE).rev() {
                let from = Position::new(read_row, col);
                let Some(gem) = self.remove(from) else {
                    continue;
                };
                write_row -= 1;
                let to = Position::new(write_row, col);
                self.set(to, gem);
                if to != from
                    && let Some(placed) = self.get(to)
                {
                    moved.push(*placed);
                }
            }
        }

        moved
    }

    /// Fills every empty cell with a fresh random gem, row-major.
    pub fn fill_empty(&mut self, rng: &mut impl RandomSource) -> Vec<Gem> {
        let mut spawned = Vec::new();
        for pos in self.empty_positions() {
            let gem_type = rng.pick(&GemType::ALL).copied().unwrap_or(GemType::Ruby);
            if let Some(gem) = self.spawn(pos, gem_type, PowerupTag::None) {
                spawned.push(gem);
            }
        }
        spawned
    }

    pub fn empty_positions(&self) -> Vec<Position> {
        Position::all().filter(|pos| self.is_empty_at(*pos)).collect()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_some())
    }

    pub fn gems(&self) -> impl Iterator<Item = &Gem> {
        self.cells.iter().flatten()
    }

    pub fn gem_count(&self) -> usize {
        self.gems().count()
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }

    /// Type-only snapshot. Powerup tags are not part of it.
    pub fn to_array(&self) -> TypeGrid {
        (0..BOARD_SIZE)
            .map(|row| {
                (0..BOARD_SIZE)
                    .map(|col| self.gem_type_at(Position::new(row, col)))
                    .collect()
            })
            .collect()
    }

    /// Rebuilds a board from a type grid with fresh ids and no powerups.
    /// Cells outside the 8x8 area are ignored; missing cells stay empty.
    pub fn from_array(grid: &[Vec<Option<GemType>>]) -> Self {
        let mut board = Self::new();
        for (row, line) in grid.iter().enumerate().take(BOARD_SIZE) {
            for (col, cell) in line.iter().enumerate().take(BOARD_SIZE) {
                if let Some(gem_type) = cell {
                    board.spawn(Position::new(row, col), *gem_type, PowerupTag::None);
                }
            }
        }
        board
    }

    /// Test helper: one string per row, digits are `GemType` indices, `.` is empty.
    #[cfg(test)]
    pub(crate) fn from_rows(rows: &[&str]) -> Self {
        let grid: TypeGrid = rows
            .iter()
            .map(|line| {
                line.chars()
                    .map(|c| c.to_digit(10).and_then(|d| GemType::from_index(d as usize)))
                    .collect()
            })
            .collect();
        Self::from_array(&grid)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

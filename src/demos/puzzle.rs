//! Eight-puzzle race: breadth-first search against iterative-deepening
//! depth-first search.

use std::collections::{HashSet, VecDeque};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::race::{CancellationToken, Strategy, StrategyOutcome};

/// Expansions between cancellation probes in the breadth-first search.
const PROBE_BATCH: u64 = 256;

/// Tile board, row-major; 0 is the blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board(pub [u8; 9]);

/// The solved position.
pub const GOAL: Board = Board([1, 2, 3, 4, 5, 6, 7, 8, 0]);

/// One move of the blank tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    fn delta(self) -> (i32, i32) {
        match self {
            Move::Up => (-1, 0),
            Move::Down => (1, 0),
            Move::Left => (0, -1),
            Move::Right => (0, 1),
        }
    }

    fn opposite(self) -> Move {
        match self {
            Move::Up => Move::Down,
            Move::Down => Move::Up,
            Move::Left => Move::Right,
            Move::Right => Move::Left,
        }
    }

    fn letter(self) -> char {
        match self {
            Move::Up => 'U',
            Move::Down => 'D',
            Move::Left => 'L',
            Move::Right => 'R',
        }
    }
}

impl Board {
    fn blank(&self) -> Option<usize> {
        self.0.iter().position(|&tile| tile == 0)
    }

    /// Apply a move of the blank; `None` if it would leave the board (or the
    /// board has no blank at all).
    pub fn apply(&self, m: Move) -> Option<Board> {
        let blank = self.blank()?;
        let (row, col) = ((blank / 3) as i32, (blank % 3) as i32);
        let (dr, dc) = m.delta();
        let (nr, nc) = (row + dr, col + dc);
        if !(0..3).contains(&nr) || !(0..3).contains(&nc) {
            return None;
        }
        let mut tiles = self.0;
        tiles.swap(blank, (nr * 3 + nc) as usize);
        Some(Board(tiles))
    }

    /// Random walk of `moves` steps away from the goal; always solvable.
    pub fn scrambled(moves: usize, seed: u64) -> Board {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut board = GOAL;
        let mut last: Option<Move> = None;
        let mut taken = 0;
        while taken < moves {
            let m = Move::ALL[rng.random_range(0..Move::ALL.len())];
            // Undoing the previous step would shorten the scramble.
            if last.is_some_and(|l| l.opposite() == m) {
                continue;
            }
            if let Some(next) = board.apply(m) {
                board = next;
                last = Some(m);
                taken += 1;
            }
        }
        board
    }
}

/// Render a move path in the U/D/L/R letters of the classic demo output.
pub fn path_string(path: &[Move]) -> String {
    path.iter().map(|m| m.letter()).collect()
}

/// Replay a move path from `start`.
pub fn apply_path(start: Board, path: &[Move]) -> Option<Board> {
    path.iter().try_fold(start, |board, &m| board.apply(m))
}

/// Both solvers, breadth-first first.
pub fn strategies() -> Vec<Box<dyn Strategy<Board, Vec<Move>>>> {
    vec![Box::new(Bfs), Box::new(IterativeDeepening::default())]
}

/// Breadth-first search with a visited set; finds a shortest path.
pub struct Bfs;

impl Strategy<Board, Vec<Move>> for Bfs {
    fn name(&self) -> &str {
        "bfs"
    }

    fn solve(&self, start: &Board, cancel: &CancellationToken) -> StrategyOutcome<Vec<Move>> {
        let mut queue: VecDeque<(Board, Vec<Move>)> = VecDeque::new();
        let mut visited: HashSet<Board> = HashSet::new();
        queue.push_back((*start, Vec::new()));
        visited.insert(*start);

        let mut expanded: u64 = 0;
        while let Some((board, path)) = queue.pop_front() {
            if board == GOAL {
                return StrategyOutcome::Solved(path);
            }
            expanded += 1;
            if expanded % PROBE_BATCH == 0 && cancel.should_cancel() {
                return StrategyOutcome::Cancelled;
            }
            for m in Move::ALL {
                if let Some(next) = board.apply(m) {
                    if visited.insert(next) {
                        let mut next_path = path.clone();
                        next_path.push(m);
                        queue.push_back((next, next_path));
                    }
                }
            }
        }
        StrategyOutcome::Exhausted
    }
}

/// Iterative-deepening DFS with a depth cap, probing at every node entry.
pub struct IterativeDeepening {
    pub max_depth: usize,
}

impl Default for IterativeDeepening {
    fn default() -> Self {
        Self { max_depth: 30 }
    }
}

impl Strategy<Board, Vec<Move>> for IterativeDeepening {
    fn name(&self) -> &str {
        "iddfs"
    }

    fn solve(&self, start: &Board, cancel: &CancellationToken) -> StrategyOutcome<Vec<Move>> {
        for limit in 0..=self.max_depth {
            let mut path = Vec::with_capacity(limit);
            match dfs(*start, limit, &mut path, cancel) {
                Dfs::Found => return StrategyOutcome::Solved(path),
                Dfs::Cancelled => return StrategyOutcome::Cancelled,
                Dfs::NotFound => {}
            }
        }
        StrategyOutcome::Exhausted
    }
}

enum Dfs {
    Found,
    NotFound,
    Cancelled,
}

fn dfs(board: Board, limit: usize, path: &mut Vec<Move>, cancel: &CancellationToken) -> Dfs {
    if cancel.should_cancel() {
        return Dfs::Cancelled;
    }
    if board == GOAL {
        return Dfs::Found;
    }
    if limit == 0 {
        return Dfs::NotFound;
    }
    for m in Move::ALL {
        // Immediately undoing the previous move cannot reach anything new.
        if path.last().is_some_and(|&l| l.opposite() == m) {
            continue;
        }
        if let Some(next) = board.apply(m) {
            path.push(m);
            match dfs(next, limit - 1, path, cancel) {
                Dfs::NotFound => {
                    path.pop();
                }
                terminal => return terminal,
            }
        }
    }
    Dfs::NotFound
}

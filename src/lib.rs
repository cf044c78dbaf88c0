//! ai-2048-search: a 2048 move engine and move-recommendation search
//!
//! This crate provides:
//! - A packed `Board` with table-driven moves (`engine` module) and a grid codec
//! - A tunable board heuristic (`heuristic` module)
//! - Five interchangeable search strategies behind one trait (`search` module)
//! - JSON-loadable search settings (`config` module)
//!
//! Quick start:
//! ```
//! use ai_2048_search::engine::{self as GameEngine, board_to_grid, grid_to_board, Move};
//! use ai_2048_search::search::{select_move_code, GreedyDfs, SearchStrategy};
//! use ai_2048_search::SearchConfig;
//!
//! // One-time table init (strategies also do this on construction)
//! GameEngine::new();
//!
//! let board = grid_to_board(&[[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
//! let moved = GameEngine::simulate_move(board, Move::Left);
//! assert_eq!(board_to_grid(moved.board)[0], [4, 0, 0, 0]);
//! assert_eq!(moved.score_delta, 4);
//!
//! let mut dfs = GreedyDfs::new(SearchConfig::with_depth(3));
//! assert!(dfs.select_move(board).is_some());
//!
//! // At the integer boundary, -1 means "no legal move"
//! let locked = [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]];
//! assert_eq!(select_move_code(&mut dfs, &locked), Ok(-1));
//! ```
//!
pub mod config;
pub mod engine;
pub mod error;
pub mod heuristic;
pub mod search;

pub use config::{CacheMode, SearchConfig};
pub use engine::{Board, Move};
pub use error::{ConfigError, InvalidTileError};
pub use heuristic::{evaluate, Weights};
pub use search::SearchStrategy;

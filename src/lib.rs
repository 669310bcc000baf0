//! # Connect Four AI
//!
//! Two Connect Four engines over one reversible board: a depth-bounded
//! alpha-beta minimax search and a self-play agent that learns an n-tuple
//! value function by temporal-difference updates.
//!
//! ## Modules
//!
//! - [`game`]: Core game logic: board, sides, precomputed win lines
//! - [`ai`]: Agent trait, minimax search, n-tuple network, TD learner, random baseline
//! - [`training`]: Game driver, self-play trainer, evaluation and metrics log
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

pub mod ai;
pub mod config;
pub mod error;
pub mod game;
pub mod training;

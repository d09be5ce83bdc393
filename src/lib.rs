//! Proxle Engine
//!
//! Daily word-guessing game engine: deterministic daily word assignment,
//! two-pass letter matching, a semantic-similarity hint channel with local
//! fallback, per-player streak/statistics tracking, and idempotent public
//! leaderboard denormalization.
//!
//! # Quick Start
//!
//! ```rust
//! use proxle_engine::catalog::{PUZZLE_EPOCH, WordCatalog, word_for_date};
//! use proxle_engine::core::match_pattern;
//! use time::macros::date;
//!
//! let catalog = WordCatalog::embedded();
//! let secret = word_for_date(catalog, PUZZLE_EPOCH, date!(2025 - 11 - 28));
//! let statuses = match_pattern("QUEST", secret.text());
//! assert_eq!(statuses.len(), 5);
//! ```

// Core domain types
pub mod core;

// Word catalog and daily selection
pub mod catalog;

// Semantic-oracle boundary
pub mod hints;

// Player statistics and persistence
pub mod progress;

// Public leaderboard denormalization
pub mod leaderboard;

// Guess evaluation and game completion entry points
pub mod game;

//! mineclone2d End-to-End Test Infrastructure
//!
//! This crate provides integration tests across the core library and the CLI:
//!
//! - **Determinism**: equal seeds give byte-identical PNG saves
//! - Session: scripted painting against a real atlas file
//! - Preferences: file-backed store repair and best-effort writes
//! - CLI: commands run end to end against temporary files
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p mineclone2d-tests
//! ```
//!
//! ## Determinism Testing
//!
//! ```rust,ignore
//! use mineclone2d_tests::determinism::verify_determinism;
//!
//! let result = verify_determinism(|| render_world(42), 3);
//! result.assert_deterministic();
//! ```

pub mod determinism;
pub mod fixtures;

// Re-export commonly used items
pub use determinism::{compute_hash, verify_determinism, DeterminismResult, DiffInfo};
pub use fixtures::{AtlasFixture, ATLAS_TILES, TILE_COLORS};

//! Shared test utilities for the tstl workspace: TSL AST builders, a
//! table-driven mock TypeOracle, and transpile convenience wrappers used by
//! unit and integration tests.

pub mod builders;
pub mod mocks;
pub mod transpile;

pub use builders::AstBuilder;
pub use mocks::MockTypeOracle;
pub use transpile::{transpile, transpile_with_features, transpile_with_options};

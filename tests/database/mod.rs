//! Database-facing helpers
//!
//! Placeholder rendering and named-to-positional statement rewriting. None
//! of these tests need a live database.

mod placeholders;
mod statement;

//! Shared helpers that are not specific to one mapping stage.

pub mod inflector;

//! # Mapping Constants
//!
//! Naming conventions shared by the alias parser, the strategy builder and
//! the hydrator.

/// Separator between alias and field in a result column name (`Articles__title`)
pub const DEFAULT_COLUMN_SEPARATOR: &str = "__";

/// Reserved property a junction row may be attached under on a many-to-many target
pub const JOIN_DATA_PROPERTY: &str = "_joinData";

/// Entity class token used for junction types that were never registered explicitly
pub const GENERIC_ENTITY_CLASS: &str = "Entity";

/// Identity key assumed for synthesized junction types
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Environment variable prefix read by [`crate::config::MapperConfig::load`]
pub const ENV_PREFIX: &str = "NATIVE_MAPPER";

/// Component names used in structured log events
pub mod components {
    pub const STRATEGY_BUILDER: &str = "mapping_strategy";
    pub const HYDRATOR: &str = "recursive_hydrator";
    pub const QUERY_MAPPER: &str = "native_query_mapper";
    pub const STATEMENT: &str = "native_statement";
}

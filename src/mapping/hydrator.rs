//! # Recursive Hydrator
//!
//! Walks a [`MappingTree`] against every parsed row and builds a
//! de-duplicated entity graph.
//!
//! Instances live in an arena while rows are merged; associations are kept
//! as arena indices so a reused parent can keep accumulating children. The
//! arena is turned into owned [`Entity`] trees once every row is processed.
//!
//! Identity bookkeeping is local to a single [`RecursiveHydrator::hydrate_many`]
//! call and dropped when it returns.

use crate::config::MapperConfig;
use crate::constants::components;
use crate::error::{MapperError, Result};
use crate::logging::{log_error, log_hydration_summary};
use crate::mapping::alias_parser::{AliasParser, ParsedRow};
use crate::mapping::strategy::{MappingNode, MappingTree};
use crate::models::{DefaultConstructor, Entity, EntityConstructor, Related};
use crate::registry::{AssociationKind, SchemaRegistry};
use crate::value::{FieldMap, Row, SqlValue};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Instant;
use tracing::debug;
use uuid::Uuid;

type NodeId = usize;

/// Association slot on an arena node
#[derive(Debug)]
enum Slot {
    One(NodeId),
    Many(Vec<NodeId>),
}

#[derive(Debug)]
struct ArenaNode {
    entity: Entity,
    related: IndexMap<String, Slot>,
}

/// Exact, variant-tagged image of a raw value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ValueKey {
    Null,
    Bool(bool),
    Int(i64),
    /// Bit pattern; NaN and the infinities never equal NULL or each other
    Float(u64),
    Text(String),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
    Uuid(Uuid),
    Json(String),
}

impl From<&SqlValue> for ValueKey {
    fn from(value: &SqlValue) -> Self {
        match value {
            SqlValue::Null => ValueKey::Null,
            SqlValue::Bool(b) => ValueKey::Bool(*b),
            SqlValue::Int(i) => ValueKey::Int(*i),
            SqlValue::Float(f) => ValueKey::Float(f.to_bits()),
            SqlValue::Text(s) => ValueKey::Text(s.clone()),
            SqlValue::Timestamp(ts) => ValueKey::Timestamp(*ts),
            SqlValue::Date(d) => ValueKey::Date(*d),
            SqlValue::Uuid(u) => ValueKey::Uuid(*u),
            SqlValue::Json(json) => ValueKey::Json(json.to_string()),
        }
    }
}

/// Raw field map sorted by field name
type FieldKey = Vec<(String, ValueKey)>;

/// Identity of one instance: alias, raw fields and, for to-many children,
/// the parent instance
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct IdentityKey {
    alias: String,
    fields: FieldKey,
    parent: Option<NodeId>,
}

/// Per-call hydration state
#[derive(Debug, Default)]
struct HydrationState {
    arena: Vec<ArenaNode>,
    roots: Vec<NodeId>,
    /// Identity -> position in the root list or in the parent's sibling list
    identities: HashMap<IdentityKey, usize>,
}

pub struct RecursiveHydrator<'a, C = DefaultConstructor> {
    registry: &'a SchemaRegistry,
    tree: &'a MappingTree,
    config: &'a MapperConfig,
    parser: AliasParser,
    constructor: C,
    requires_identity: bool,
}

impl<'a> RecursiveHydrator<'a, DefaultConstructor> {
    pub fn new(
        registry: &'a SchemaRegistry,
        tree: &'a MappingTree,
        config: &'a MapperConfig,
    ) -> Result<Self> {
        tree.validate()?;
        Ok(Self {
            registry,
            tree,
            config,
            parser: AliasParser::from_config(config),
            constructor: DefaultConstructor,
            requires_identity: tree.has_to_many(),
        })
    }
}

impl<'a, C: EntityConstructor> RecursiveHydrator<'a, C> {
    /// Swap the constructor used to build instances
    pub fn with_constructor<D: EntityConstructor>(
        self,
        constructor: D,
    ) -> RecursiveHydrator<'a, D> {
        RecursiveHydrator {
            registry: self.registry,
            tree: self.tree,
            config: self.config,
            parser: self.parser,
            constructor,
            requires_identity: self.requires_identity,
        }
    }

    /// Hydrate raw rows into root entities, in first-appearance order
    pub fn hydrate_many(&self, rows: &[Row]) -> Result<Vec<Entity>> {
        let started = Instant::now();
        let root_alias = self.tree.root_alias();

        let result = self.parser.parse_rows(rows).and_then(|parsed| {
            let mut state = HydrationState::default();
            for row in &parsed {
                self.map_root(&mut state, self.tree.root(), row)?;
            }
            Ok(state)
        });
        let state = match result {
            Ok(state) => state,
            Err(err) => {
                log_error(components::HYDRATOR, "hydrate_many", &err.to_string(), Some(root_alias));
                return Err(err);
            }
        };

        let instance_count = state.arena.len();
        let entities = materialize(state);
        log_hydration_summary(
            root_alias,
            rows.len(),
            entities.len(),
            instance_count,
            started.elapsed().as_micros(),
        );
        Ok(entities)
    }

    /// Hydrate and deserialize every root entity into `T`
    pub fn hydrate_as<T: DeserializeOwned>(&self, rows: &[Row]) -> Result<Vec<T>> {
        self.hydrate_many(rows)?
            .iter()
            .map(|entity| entity.deserialize::<T>())
            .collect()
    }

    fn map_root(
        &self,
        state: &mut HydrationState,
        node: &MappingNode,
        row: &ParsedRow,
    ) -> Result<()> {
        let fields = fields_of(row, &node.alias);
        let key = IdentityKey {
            alias: node.alias.clone(),
            fields: identity_fields(fields),
            parent: None,
        };
        let id = match state.identities.get(&key) {
            Some(&position) => state.roots[position],
            None => {
                let id = self
                    .construct(state, node, fields)?
                    .ok_or_else(|| MapperError::EmptyRootEntity {
                        alias: node.alias.clone(),
                    })?;
                state.roots.push(id);
                state.identities.insert(key, state.roots.len() - 1);
                id
            }
        };
        self.map_children(state, node, row, id)
    }

    fn map_children(
        &self,
        state: &mut HydrationState,
        node: &MappingNode,
        row: &ParsedRow,
        parent: NodeId,
    ) -> Result<()> {
        for kind in AssociationKind::ALL {
            for child in node.children_of(kind) {
                let resolved = match kind {
                    AssociationKind::HasOne | AssociationKind::BelongsTo => {
                        self.map_to_one(state, child, row, parent)?
                    }
                    AssociationKind::HasMany | AssociationKind::BelongsToMany => {
                        self.map_to_many(state, child, row, parent)?
                    }
                };
                // No instance for this row: the subtree is skipped too
                if let Some(id) = resolved {
                    self.map_children(state, child, row, id)?;
                }
            }
        }
        Ok(())
    }

    /// First occurrence wins; later rows reuse the attached instance
    fn map_to_one(
        &self,
        state: &mut HydrationState,
        node: &MappingNode,
        row: &ParsedRow,
        parent: NodeId,
    ) -> Result<Option<NodeId>> {
        let property = property_of(node)?;
        match state.arena[parent].related.get(property) {
            Some(Slot::One(existing)) => return Ok(Some(*existing)),
            Some(Slot::Many(_)) => return Err(slot_conflict(node, property)),
            None => {}
        }
        let Some(id) = self.construct(state, node, fields_of(row, &node.alias))? else {
            return Ok(None);
        };
        state.arena[parent]
            .related
            .insert(property.to_string(), Slot::One(id));
        Ok(Some(id))
    }

    fn map_to_many(
        &self,
        state: &mut HydrationState,
        node: &MappingNode,
        row: &ParsedRow,
        parent: NodeId,
    ) -> Result<Option<NodeId>> {
        let property = property_of(node)?;
        let fields = fields_of(row, &node.alias);
        let key = IdentityKey {
            alias: node.alias.clone(),
            fields: identity_fields(fields),
            parent: Some(parent),
        };

        if let Some(&position) = state.identities.get(&key) {
            return match state.arena[parent].related.get(property) {
                Some(Slot::Many(siblings)) => Ok(siblings.get(position).copied()),
                _ => Err(slot_conflict(node, property)),
            };
        }

        let Some(id) = self.construct(state, node, fields)? else {
            return Ok(None);
        };
        let slot = state.arena[parent]
            .related
            .entry(property.to_string())
            .or_insert_with(|| Slot::Many(Vec::new()));
        let Slot::Many(siblings) = slot else {
            return Err(slot_conflict(node, property));
        };
        siblings.push(id);
        let position = siblings.len() - 1;
        state.identities.insert(key, position);
        Ok(Some(id))
    }

    /// Build one instance, or `None` when every field is null (outer join miss)
    fn construct(
        &self,
        state: &mut HydrationState,
        node: &MappingNode,
        fields: &FieldMap,
    ) -> Result<Option<NodeId>> {
        if fields.values().all(SqlValue::is_null) {
            return Ok(None);
        }
        if self.requires_identity {
            if node.primary_key.is_empty() {
                return Err(MapperError::Configuration(format!(
                    "Alias '{}' must declare a primary key in order to map \
                     'hasMany' and 'belongsToMany' associations",
                    node.alias
                )));
            }
            // A NULL key cannot identify an instance
            let missing = |key: &String| fields.get(key).map_or(true, SqlValue::is_null);
            if node.primary_key.iter().any(missing) {
                return Err(MapperError::MissingColumn {
                    alias: node.alias.clone(),
                    columns: node.primary_key.clone(),
                });
            }
        }

        let entity = self
            .constructor
            .construct(&node.alias, &node.entity_class, self.convert(&node.alias, fields))?;
        state.arena.push(ArenaNode {
            entity,
            related: IndexMap::new(),
        });
        let id = state.arena.len() - 1;
        debug!(alias = %node.alias, node_id = id, "Constructed entity");
        Ok(Some(id))
    }

    /// Apply declared column types; raw values are hashed before this runs
    fn convert(&self, alias: &str, fields: &FieldMap) -> FieldMap {
        let entity_type = match self.registry.get(alias) {
            Some(t) if self.config.convert_types && !t.column_types().is_empty() => t,
            _ => return fields.clone(),
        };
        fields
            .iter()
            .map(|(field, value)| {
                let value = match entity_type.column_type(field) {
                    Some(column_type) => value.clone().convert(column_type),
                    None => value.clone(),
                };
                (field.clone(), value)
            })
            .collect()
    }
}

/// Stands in for aliases a row does not carry at all
static NO_FIELDS: OnceLock<FieldMap> = OnceLock::new();

fn fields_of<'r>(row: &'r ParsedRow, alias: &str) -> &'r FieldMap {
    row.get(alias)
        .unwrap_or_else(|| NO_FIELDS.get_or_init(FieldMap::new))
}

fn property_of(node: &MappingNode) -> Result<&str> {
    node.property.as_deref().ok_or_else(|| {
        MapperError::Configuration(format!("Unknown property name for alias {}", node.alias))
    })
}

fn slot_conflict(node: &MappingNode, property: &str) -> MapperError {
    MapperError::Configuration(format!(
        "Property '{property}' of alias {} is mapped as both a single entity and a collection",
        node.alias
    ))
}

/// Full comparison key of a field map, independent of column order
fn identity_fields(fields: &FieldMap) -> FieldKey {
    let mut key: FieldKey = fields
        .iter()
        .map(|(field, value)| (field.clone(), ValueKey::from(value)))
        .collect();
    key.sort_unstable_by(|a, b| a.0.cmp(&b.0));
    key
}

/// Move every arena node into its owner, root list first
fn materialize(state: HydrationState) -> Vec<Entity> {
    let mut arena: Vec<Option<ArenaNode>> = state.arena.into_iter().map(Some).collect();
    state
        .roots
        .iter()
        .filter_map(|id| take_entity(&mut arena, *id))
        .collect()
}

fn take_entity(arena: &mut [Option<ArenaNode>], id: NodeId) -> Option<Entity> {
    let ArenaNode { mut entity, related } = arena.get_mut(id)?.take()?;
    for (property, slot) in related {
        let related = match slot {
            Slot::One(child) => match take_entity(arena, child) {
                Some(child) => Related::One(Box::new(child)),
                None => continue,
            },
            Slot::Many(children) => Related::Many(
                children
                    .into_iter()
                    .filter_map(|child| take_entity(arena, child))
                    .collect(),
            ),
        };
        entity.attach(property, related);
    }
    Some(entity)
}

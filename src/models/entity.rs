use crate::error::Result;
use crate::value::{FieldMap, SqlValue};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Lifecycle state of an entity produced by the hydrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityState {
    /// Loaded from the database and untouched since
    Hydrated,
    /// At least one field was changed through [`Entity::set`]
    Modified,
}

/// Associated entities attached under a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Related {
    One(Box<Entity>),
    Many(Vec<Entity>),
}

impl Related {
    pub fn as_one(&self) -> Option<&Entity> {
        match self {
            Related::One(entity) => Some(entity),
            Related::Many(_) => None,
        }
    }

    pub fn as_many(&self) -> Option<&[Entity]> {
        match self {
            Related::One(_) => None,
            Related::Many(entities) => Some(entities),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Related::One(entity) => entity.to_json(),
            Related::Many(entities) => {
                serde_json::Value::Array(entities.iter().map(Entity::to_json).collect())
            }
        }
    }
}

/// A persisted row of one alias with its attached associations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Alias the entity was hydrated from
    source: String,
    entity_class: String,
    fields: FieldMap,
    related: IndexMap<String, Related>,
    state: EntityState,
    dirty: Vec<String>,
}

impl Entity {
    /// An entity in the hydrated (clean, already persisted) state
    pub fn hydrated(
        source: impl Into<String>,
        entity_class: impl Into<String>,
        fields: FieldMap,
    ) -> Self {
        Self {
            source: source.into(),
            entity_class: entity_class.into(),
            fields,
            related: IndexMap::new(),
            state: EntityState::Hydrated,
            dirty: Vec::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn entity_class(&self) -> &str {
        &self.entity_class
    }

    pub fn state(&self) -> EntityState {
        self.state
    }

    /// Hydrated entities are never pending insertion
    pub fn is_new(&self) -> bool {
        false
    }

    pub fn is_dirty(&self) -> bool {
        self.state == EntityState::Modified
    }

    /// Names of fields changed since hydration (or since the last [`Entity::mark_clean`])
    pub fn dirty_fields(&self) -> &[String] {
        &self.dirty
    }

    pub fn get(&self, field: &str) -> Option<&SqlValue> {
        self.fields.get(field)
    }

    /// True when the field or association exists and is not null
    pub fn has(&self, property: &str) -> bool {
        self.related.contains_key(property)
            || self.fields.get(property).is_some_and(|v| !v.is_null())
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Change a field value, moving the entity into the modified state
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<SqlValue>) {
        let field = field.into();
        let value = value.into();
        if self.fields.get(&field) == Some(&value) {
            return;
        }
        if !self.dirty.contains(&field) {
            self.dirty.push(field.clone());
        }
        self.fields.insert(field, value);
        self.state = EntityState::Modified;
    }

    pub fn mark_clean(&mut self) {
        self.dirty.clear();
        self.state = EntityState::Hydrated;
    }

    pub fn related(&self, property: &str) -> Option<&Related> {
        self.related.get(property)
    }

    pub fn one(&self, property: &str) -> Option<&Entity> {
        self.related.get(property).and_then(Related::as_one)
    }

    pub fn many(&self, property: &str) -> Option<&[Entity]> {
        self.related.get(property).and_then(Related::as_many)
    }

    pub fn associations(&self) -> impl Iterator<Item = (&str, &Related)> {
        self.related.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Attach associations without affecting the entity state
    pub(crate) fn attach(&mut self, property: impl Into<String>, related: Related) {
        self.related.insert(property.into(), related);
    }

    /// Fields followed by associations as a JSON object
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::with_capacity(self.fields.len() + self.related.len());
        for (field, value) in &self.fields {
            map.insert(field.clone(), value.to_json());
        }
        for (property, related) in &self.related {
            map.insert(property.clone(), related.to_json());
        }
        serde_json::Value::Object(map)
    }

    /// Deserialize into a typed domain object
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.to_json())?)
    }
}

/// Builds domain instances for the hydrator
pub trait EntityConstructor {
    /// Construct a hydrated instance of `entity_class` for `alias` from its fields
    fn construct(&self, alias: &str, entity_class: &str, fields: FieldMap) -> Result<Entity>;
}

impl<T: EntityConstructor + ?Sized> EntityConstructor for &T {
    fn construct(&self, alias: &str, entity_class: &str, fields: FieldMap) -> Result<Entity> {
        (**self).construct(alias, entity_class, fields)
    }
}

/// Builds plain [`Entity`] values
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConstructor;

impl EntityConstructor for DefaultConstructor {
    fn construct(&self, alias: &str, entity_class: &str, fields: FieldMap) -> Result<Entity> {
        Ok(Entity::hydrated(alias, entity_class, fields))
    }
}

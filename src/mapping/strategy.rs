//! # Mapping Strategy
//!
//! Resolves the aliases observed in a result set against the root type's
//! relationship graph and produces an immutable [`MappingTree`].
//!
//! ## Resolution order
//!
//! 1. The root type's own relationships are scanned one level deep. Every
//!    relationship whose target alias was observed becomes a first-level
//!    node. A many-to-many junction alias, when observed too, is attached
//!    under its target node as a `hasOne` child.
//! 2. Resolved nodes are then expanded one level at a time against their own
//!    type, breadth-first, until every alias is placed or no progress is
//!    possible.
//!
//! Each alias is consumed exactly once, so the tree is acyclic even when the
//! type graph is not.

use crate::config::{JunctionProperty, MapperConfig};
use crate::constants::components;
use crate::error::{MapperError, Result, UnknownAliasReason};
use crate::logging::{log_error, log_mapping_operation};
use crate::registry::{
    AssociationKind, EntityType, Relationship, RelationshipGraphWalker, Resolution, SchemaRegistry,
};
use crate::utils::inflector::singular_property;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// One alias in the mapping tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingNode {
    pub alias: String,
    /// Constructor token handed to the entity constructor
    pub entity_class: String,
    /// Identity-key fields, enforced when the tree contains to-many nodes
    #[serde(default)]
    pub primary_key: Vec<String>,
    /// Property on the parent instance; `None` for the root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    /// Association joining this node to its parent; `None` for the root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<AssociationKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MappingNode>,
}

impl MappingNode {
    pub fn new(alias: impl Into<String>, entity_class: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            entity_class: entity_class.into(),
            primary_key: Vec::new(),
            property: None,
            kind: None,
            children: Vec::new(),
        }
    }

    fn from_type(entity_type: &EntityType) -> Self {
        Self::new(entity_type.alias(), entity_type.entity_class())
            .with_primary_key(entity_type.primary_key().iter().cloned())
    }

    pub fn with_primary_key<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Attach `child` under `property` through an association of `kind`
    pub fn with_child(
        mut self,
        kind: AssociationKind,
        property: impl Into<String>,
        mut child: MappingNode,
    ) -> Self {
        child.kind = Some(kind);
        child.property = Some(property.into());
        self.children.push(child);
        self
    }

    pub fn is_root(&self) -> bool {
        self.kind.is_none()
    }

    /// Direct child with the given alias
    pub fn child(&self, alias: &str) -> Option<&MappingNode> {
        self.children.iter().find(|c| c.alias == alias)
    }

    /// Direct children joined through `kind`, in declaration order
    pub fn children_of(&self, kind: AssociationKind) -> impl Iterator<Item = &MappingNode> {
        self.children
            .iter()
            .filter(move |c| c.kind == Some(kind))
    }

    /// Depth-first search for `alias` in this subtree
    pub fn find(&self, alias: &str) -> Option<&MappingNode> {
        if self.alias == alias {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(alias))
    }

    fn collect_aliases<'n>(&'n self, out: &mut Vec<&'n str>) {
        out.push(&self.alias);
        for child in &self.children {
            child.collect_aliases(out);
        }
    }

    fn has_to_many(&self) -> bool {
        self.kind.is_some_and(|k| k.is_to_many()) || self.children.iter().any(Self::has_to_many)
    }
}

/// Immutable alias-to-relationship resolution driving hydration.
///
/// Trees are read-only once built and may be shared across hydrations
/// through an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingTree {
    root: MappingNode,
}

impl MappingTree {
    /// Wrap a hand-built root node; the node is validated first
    pub fn new(root: MappingNode) -> Result<Self> {
        let tree = Self { root };
        tree.validate()?;
        Ok(tree)
    }

    pub fn root(&self) -> &MappingNode {
        &self.root
    }

    pub fn root_alias(&self) -> &str {
        &self.root.alias
    }

    /// Every alias in document order, root first
    pub fn aliases(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.root.collect_aliases(&mut out);
        out
    }

    pub fn find(&self, alias: &str) -> Option<&MappingNode> {
        self.root.find(alias)
    }

    /// True when any node is reached through a to-many association.
    /// Identity keys become mandatory for every alias in that case.
    pub fn has_to_many(&self) -> bool {
        self.root.has_to_many()
    }

    /// Structural checks: the root carries no association, every other
    /// node carries both kind and property, and no alias appears twice.
    pub fn validate(&self) -> Result<()> {
        if self.root.kind.is_some() || self.root.property.is_some() {
            return Err(MapperError::Configuration(format!(
                "Root alias '{}' must not declare an association",
                self.root.alias
            )));
        }
        let mut seen = HashSet::new();
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            if !seen.insert(node.alias.as_str()) {
                return Err(MapperError::Configuration(format!(
                    "Alias '{}' appears more than once in the mapping strategy",
                    node.alias
                )));
            }
            for child in &node.children {
                if child.kind.is_none() {
                    return Err(MapperError::Configuration(format!(
                        "Unknown association type for alias {}",
                        child.alias
                    )));
                }
                if child.property.is_none() {
                    return Err(MapperError::Configuration(format!(
                        "Unknown property name for alias {}",
                        child.alias
                    )));
                }
                stack.push(child);
            }
        }
        Ok(())
    }
}

/// A resolved alias waiting to be assembled into the tree
struct PendingNode {
    node: MappingNode,
    children: Vec<usize>,
}

/// Builds a [`MappingTree`] from a root alias and the aliases observed in a
/// result set.
#[derive(Debug, Clone, Copy)]
pub struct MappingStrategyBuilder<'a> {
    registry: &'a SchemaRegistry,
    config: &'a MapperConfig,
}

impl<'a> MappingStrategyBuilder<'a> {
    pub fn new(registry: &'a SchemaRegistry, config: &'a MapperConfig) -> Self {
        Self { registry, config }
    }

    /// Resolve one alias reachable from `root`, shortest relationship path first
    pub fn resolve(&self, root: &str, alias: &str) -> Result<Resolution<'a>> {
        RelationshipGraphWalker::new(self.registry)
            .resolve(root, alias)
            .ok_or_else(|| {
                MapperError::unknown_alias(
                    UnknownAliasReason::Unreachable,
                    root,
                    vec![alias.to_string()],
                )
            })
    }

    pub fn build<S: AsRef<str>>(&self, root: &str, observed: &[S]) -> Result<MappingTree> {
        let observed: Vec<String> = observed.iter().map(|a| a.as_ref().to_string()).collect();
        log_mapping_operation("build_strategy", root, &observed, "started", None);

        let result = self.build_tree(root, &observed);
        match &result {
            Ok(tree) => {
                debug!(root = %root, tree = ?tree, "Mapping strategy built");
                log_mapping_operation("build_strategy", root, &observed, "completed", None);
            }
            Err(err) => log_error(
                components::STRATEGY_BUILDER,
                "build",
                &err.to_string(),
                Some(root),
            ),
        }
        result
    }

    fn build_tree(&self, root: &str, observed: &[String]) -> Result<MappingTree> {
        if observed.is_empty() {
            return Err(MapperError::unknown_alias(
                UnknownAliasReason::EmptyAliasSet,
                root,
                Vec::new(),
            ));
        }
        let mut unresolved: IndexSet<String> = observed.iter().cloned().collect();
        if !unresolved.shift_remove(root) {
            return Err(MapperError::unknown_alias(
                UnknownAliasReason::MissingRootAlias,
                root,
                Vec::new(),
            ));
        }

        let root_type = self.entity_type(root)?;
        let mut pending = vec![PendingNode {
            node: MappingNode::from_type(root_type),
            children: Vec::new(),
        }];

        // Root level, one hop only
        let before = unresolved.len();
        let mut queue = VecDeque::new();
        self.expand(0, &mut pending, &mut unresolved, &mut queue)?;
        if before > 0 && unresolved.len() == before {
            return Err(MapperError::unknown_alias(
                UnknownAliasReason::NoRootAssociation,
                root,
                unresolved.into_iter().collect(),
            ));
        }

        while let Some(index) = queue.pop_front() {
            if unresolved.is_empty() {
                break;
            }
            self.expand(index, &mut pending, &mut unresolved, &mut queue)?;
        }

        if !unresolved.is_empty() {
            let remaining: Vec<String> = unresolved.into_iter().collect();
            self.explain_unresolved(root, &remaining);
            return Err(MapperError::unknown_alias(
                UnknownAliasReason::NoAssociation,
                root,
                remaining,
            ));
        }

        MappingTree::new(assemble(pending)?)
    }

    /// Expand one resolved node against its own type's relationships
    fn expand(
        &self,
        index: usize,
        pending: &mut Vec<PendingNode>,
        unresolved: &mut IndexSet<String>,
        queue: &mut VecDeque<usize>,
    ) -> Result<()> {
        let owner = self.entity_type(&pending[index].node.alias)?;
        for rel in owner.relationships() {
            if !unresolved.shift_remove(&rel.target) {
                continue;
            }
            let target = self.entity_type(&rel.target)?;
            debug!(
                owner = %owner.alias(),
                alias = %target.alias(),
                kind = %rel.kind,
                property = %rel.property,
                "Resolved alias"
            );
            let child = push_child(pending, index, target, rel.kind, &rel.property);
            queue.push_back(child);

            if rel.kind == AssociationKind::BelongsToMany {
                self.attach_junction(rel, child, pending, unresolved, queue)?;
            }
        }
        Ok(())
    }

    fn attach_junction(
        &self,
        rel: &Relationship,
        target_index: usize,
        pending: &mut Vec<PendingNode>,
        unresolved: &mut IndexSet<String>,
        queue: &mut VecDeque<usize>,
    ) -> Result<()> {
        let Some(through) = rel.through.as_deref() else {
            return Ok(());
        };
        if !unresolved.shift_remove(through) {
            return Ok(());
        }
        let junction = self.entity_type(through)?;
        let property = match self.config.junction_property {
            JunctionProperty::Singular => singular_property(through),
            JunctionProperty::JoinData => self.config.join_data_property.clone(),
        };
        debug!(
            junction = %through,
            target = %rel.target,
            property = %property,
            "Resolved junction alias"
        );
        let index = push_child(pending, target_index, junction, AssociationKind::HasOne, &property);
        queue.push_back(index);
        Ok(())
    }

    fn entity_type(&self, alias: &str) -> Result<&'a EntityType> {
        self.registry.get(alias).ok_or_else(|| {
            MapperError::Configuration(format!("No entity type is registered for alias '{alias}'"))
        })
    }

    fn explain_unresolved(&self, root: &str, remaining: &[String]) {
        let walker = RelationshipGraphWalker::new(self.registry);
        for alias in remaining {
            match walker.resolve(root, alias) {
                Some(found) => debug!(
                    alias = %alias,
                    via = %found.owner.alias(),
                    "Alias is reachable from the root but its owner alias was not selected"
                ),
                None => debug!(
                    alias = %alias,
                    root = %root,
                    "Alias is not reachable from the root"
                ),
            }
        }
    }
}

fn push_child(
    pending: &mut Vec<PendingNode>,
    parent: usize,
    target: &EntityType,
    kind: AssociationKind,
    property: &str,
) -> usize {
    let mut node = MappingNode::from_type(target);
    node.kind = Some(kind);
    node.property = Some(property.to_string());
    pending.push(PendingNode {
        node,
        children: Vec::new(),
    });
    let index = pending.len() - 1;
    pending[parent].children.push(index);
    index
}

/// Children always sit after their parent, so assembling back to front
/// finds every subtree complete.
fn assemble(pending: Vec<PendingNode>) -> Result<MappingNode> {
    let mut built: Vec<Option<MappingNode>> = Vec::with_capacity(pending.len());
    let mut links = Vec::with_capacity(pending.len());
    for entry in pending {
        built.push(Some(entry.node));
        links.push(entry.children);
    }
    for index in (0..built.len()).rev() {
        let children: Vec<MappingNode> = links[index]
            .iter()
            .filter_map(|child| built[*child].take())
            .collect();
        if let Some(node) = built[index].as_mut() {
            node.children = children;
        }
    }
    built
        .into_iter()
        .next()
        .flatten()
        .ok_or_else(|| MapperError::Configuration("Mapping strategy has no root".to_string()))
}

//! # Relationship Graph Walker
//!
//! Breadth-first resolution of an alias to the type reachable from a root
//! type. The relationship graph may contain cycles (`Users` has many
//! `Articles`, `Articles` belongs to `Users`); a visited set over type aliases
//! keeps the walk finite, and an explicit queue keeps stack depth constant.

use super::schema_registry::{AssociationKind, EntityType, Relationship, SchemaRegistry};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// How an alias was reached from the root
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution<'a> {
    /// Type the alias resolves to
    pub target: &'a EntityType,
    /// Type declaring the relationship that reaches the alias
    pub owner: &'a EntityType,
    /// The relationship followed; for junctions, the many-to-many relationship
    pub via: &'a Relationship,
    /// True when the alias is the junction of `via`
    pub through: bool,
}

/// Walks declared relationships of a [`SchemaRegistry`]
#[derive(Debug, Clone, Copy)]
pub struct RelationshipGraphWalker<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> RelationshipGraphWalker<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Resolve `alias` starting at `root`. The first match in level order
    /// wins; ties are broken by relationship declaration order.
    pub fn resolve(&self, root: &str, alias: &str) -> Option<Resolution<'a>> {
        let root_type = self.registry.get(root)?;
        let mut visited: HashSet<&'a str> = HashSet::new();
        let mut queue: VecDeque<&'a EntityType> = VecDeque::new();
        visited.insert(root_type.alias());
        queue.push_back(root_type);

        while let Some(owner) = queue.pop_front() {
            for rel in owner.relationships() {
                let direct =
                    self.visit(owner, rel, &rel.target, alias, false, &mut visited, &mut queue);
                if direct.is_some() {
                    return direct;
                }
                if rel.kind == AssociationKind::BelongsToMany {
                    if let Some(through) = rel.through.as_deref() {
                        let junction =
                            self.visit(owner, rel, through, alias, true, &mut visited, &mut queue);
                        if junction.is_some() {
                            return junction;
                        }
                    }
                }
            }
        }

        debug!(root = %root, alias = %alias, "Alias not reachable from root");
        None
    }

    #[allow(clippy::too_many_arguments)]
    fn visit(
        &self,
        owner: &'a EntityType,
        via: &'a Relationship,
        candidate: &str,
        alias: &str,
        through: bool,
        visited: &mut HashSet<&'a str>,
        queue: &mut VecDeque<&'a EntityType>,
    ) -> Option<Resolution<'a>> {
        let target = self.registry.get(candidate)?;
        if target.alias() == alias {
            return Some(Resolution {
                target,
                owner,
                via,
                through,
            });
        }
        if visited.insert(target.alias()) {
            queue.push_back(target);
        }
        None
    }
}

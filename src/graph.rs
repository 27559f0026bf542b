//! Group membership graph
//!
//! A directed graph whose edges run from a group to each of its direct
//! members. Edges are checked on insertion so the graph stays a forest:
//! no cycles, and at most one parent per element.

use std::collections::{HashMap, HashSet};

use crate::model::ElementId;

/// Edge from a group to one of its direct members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupMembership {
    pub group: ElementId,
    pub member: ElementId,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("Element {0} was added more than once")]
    DuplicateVertex(ElementId),

    #[error("Element {0} is not in the graph")]
    UnknownVertex(ElementId),

    #[error("Element {0} is not a group and cannot have members")]
    NotAGroup(ElementId),

    #[error("Element {member} is already a member of {existing}, cannot also join {group}")]
    AlreadyMember {
        member: ElementId,
        existing: ElementId,
        group: ElementId,
    },

    #[error("Membership cycle detected: {}", .0.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(" -> "))]
    Cycle(Vec<ElementId>),
}

#[derive(Debug, Clone, Default)]
pub struct MembershipGraph {
    /// All vertices, in insertion order
    order: Vec<ElementId>,
    known: HashSet<ElementId>,
    groups: HashSet<ElementId>,
    /// member -> the single edge pointing at it
    incoming: HashMap<ElementId, GroupMembership>,
    /// group -> members, in insertion order
    children: HashMap<ElementId, Vec<ElementId>>,
}

impl MembershipGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element. Only groups may later receive members.
    pub fn add_vertex(&mut self, id: ElementId, is_group: bool) -> Result<(), GraphError> {
        if !self.known.insert(id) {
            return Err(GraphError::DuplicateVertex(id));
        }
        self.order.push(id);
        if is_group {
            self.groups.insert(id);
        }
        Ok(())
    }

    /// Record that `member` belongs directly to `group`
    pub fn add_membership(
        &mut self,
        group: ElementId,
        member: ElementId,
    ) -> Result<GroupMembership, GraphError> {
        if !self.contains(&group) {
            return Err(GraphError::UnknownVertex(group));
        }
        if !self.contains(&member) {
            return Err(GraphError::UnknownVertex(member));
        }
        if !self.groups.contains(&group) {
            return Err(GraphError::NotAGroup(group));
        }
        if let Some(existing) = self.incoming.get(&member) {
            return Err(GraphError::AlreadyMember {
                member,
                existing: existing.group,
                group,
            });
        }

        // The new edge closes a cycle iff member is group or one of its ancestors
        if member == group {
            return Err(GraphError::Cycle(vec![member, member]));
        }
        if self.ancestors(&group).any(|a| a == member) {
            let mut between: Vec<ElementId> =
                self.ancestors(&group).take_while(|a| *a != member).collect();
            between.reverse();

            let mut cycle = vec![member];
            cycle.extend(between);
            cycle.push(group);
            cycle.push(member);
            return Err(GraphError::Cycle(cycle));
        }

        let edge = GroupMembership { group, member };
        self.incoming.insert(member, edge);
        self.children.entry(group).or_default().push(member);
        Ok(edge)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.known.contains(id)
    }

    /// Whether `id` was registered as a group
    pub fn is_group(&self, id: &ElementId) -> bool {
        self.groups.contains(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn vertices(&self) -> impl Iterator<Item = &ElementId> {
        self.order.iter()
    }

    /// All edges, grouped by owning group
    pub fn edges(&self) -> impl Iterator<Item = GroupMembership> + '_ {
        self.order.iter().flat_map(move |group| {
            self.children_of(group)
                .iter()
                .map(move |member| GroupMembership { group: *group, member: *member })
        })
    }

    /// The edge pointing at `id`, if it has a parent
    pub fn incoming(&self, id: &ElementId) -> Option<&GroupMembership> {
        self.incoming.get(id)
    }

    pub fn parent_of(&self, id: &ElementId) -> Option<ElementId> {
        self.incoming.get(id).map(|edge| edge.group)
    }

    pub fn children_of(&self, id: &ElementId) -> &[ElementId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Elements with no incoming membership edge
    pub fn roots(&self) -> impl DoubleEndedIterator<Item = &ElementId> + '_ {
        self.order.iter().filter(|id| !self.incoming.contains_key(*id))
    }

    /// Walk from the parent of `id` up to its root
    pub fn ancestors(&self, id: &ElementId) -> Ancestors<'_> {
        Ancestors {
            graph: self,
            next: self.parent_of(id),
        }
    }

    /// Every vertex, parents before their members
    ///
    /// Roots are visited in insertion order and each subtree is walked
    /// pre-order, members in insertion order.
    pub fn depth_first(&self) -> Vec<ElementId> {
        let mut result = Vec::with_capacity(self.order.len());
        let mut stack: Vec<ElementId> = self.roots().rev().copied().collect();

        while let Some(id) = stack.pop() {
            result.push(id);
            stack.extend(self.children_of(&id).iter().rev().copied());
        }

        result
    }
}

pub struct Ancestors<'a> {
    graph: &'a MembershipGraph,
    next: Option<ElementId>,
}

impl Iterator for Ancestors<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.graph.parent_of(&current);
        Some(current)
    }
}

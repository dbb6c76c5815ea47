//! Parent/child edges of the scene graph
//!
//! Nodes are keyed by entity index. Liveness is the registry's business; the
//! hierarchy assumes every entity handed to it is alive.

use crate::ecs::Entity;

#[derive(Debug, Clone, Default)]
struct Node {
    entity: Option<Entity>,
    parent: Option<Entity>,
    children: Vec<Entity>,
}

/// Ordered parent/child relation over live entities
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    nodes: Vec<Node>,
    roots: Vec<Entity>,
}

impl Hierarchy {
    /// Create an empty hierarchy
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&self, entity: Entity) -> Option<&Node> {
        self.nodes
            .get(entity.index() as usize)
            .filter(|node| node.entity == Some(entity))
    }

    fn node_mut(&mut self, entity: Entity) -> Option<&mut Node> {
        self.nodes
            .get_mut(entity.index() as usize)
            .filter(|node| node.entity == Some(entity))
    }

    /// Whether `entity` has a node
    pub fn contains(&self, entity: Entity) -> bool {
        self.node(entity).is_some()
    }

    /// Add `entity` as the last child of `parent`, or as a root
    pub fn insert(&mut self, entity: Entity, parent: Option<Entity>) {
        let slot = entity.index() as usize;
        if slot >= self.nodes.len() {
            self.nodes.resize_with(slot + 1, Node::default);
        }
        self.nodes[slot] = Node {
            entity: Some(entity),
            parent: None,
            children: Vec::new(),
        };
        self.link(entity, parent);
    }

    /// Drop `entity`'s node and unlink it from its parent.
    ///
    /// Remaining children become roots.
    pub fn remove(&mut self, entity: Entity) {
        self.unlink(entity);
        let children = match self.node_mut(entity) {
            Some(node) => {
                node.entity = None;
                std::mem::take(&mut node.children)
            }
            None => return,
        };
        for child in children {
            if let Some(node) = self.node_mut(child) {
                node.parent = None;
            }
            self.roots.push(child);
        }
    }

    /// Move `entity` under `parent` (or to the roots), appended last.
    ///
    /// The caller rules out cycles with [`Hierarchy::is_ancestor`].
    pub fn set_parent(&mut self, entity: Entity, parent: Option<Entity>) {
        if !self.contains(entity) || self.parent(entity) == parent {
            return;
        }
        self.unlink(entity);
        self.link(entity, parent);
    }

    /// Whether `ancestor` is a strict ancestor of `entity`
    pub fn is_ancestor(&self, ancestor: Entity, entity: Entity) -> bool {
        let mut current = self.parent(entity);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    /// Parent of `entity`
    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        self.node(entity).and_then(|node| node.parent)
    }

    /// Children of `entity` in insertion order
    pub fn children(&self, entity: Entity) -> &[Entity] {
        self.node(entity).map_or(&[], |node| node.children.as_slice())
    }

    /// Entities without a parent, in insertion order
    pub fn roots(&self) -> &[Entity] {
        &self.roots
    }

    /// All descendants of `entity`, depth first, parents before children
    pub fn descendants(&self, entity: Entity) -> Vec<Entity> {
        let mut out = Vec::new();
        let mut stack: Vec<Entity> = self.children(entity).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        out
    }

    fn link(&mut self, entity: Entity, parent: Option<Entity>) {
        match parent.filter(|&parent| self.contains(parent)) {
            Some(parent) => {
                self.nodes[parent.index() as usize].children.push(entity);
                self.nodes[entity.index() as usize].parent = Some(parent);
            }
            None => self.roots.push(entity),
        }
    }

    fn unlink(&mut self, entity: Entity) {
        let Some(node) = self.node_mut(entity) else {
            return;
        };
        let siblings = match node.parent.take() {
            Some(parent) if self.contains(parent) => &mut self.nodes[parent.index() as usize].children,
            _ => &mut self.roots,
        };
        if let Some(position) = siblings.iter().position(|&sibling| sibling == entity) {
            siblings.remove(position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::IdentityRegistry;

    fn entities(count: usize) -> Vec<Entity> {
        let mut registry = IdentityRegistry::default();
        (0..count).map(|_| registry.create().unwrap()).collect()
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let e = entities(4);
        let mut hierarchy = Hierarchy::new();
        hierarchy.insert(e[0], None);
        hierarchy.insert(e[1], Some(e[0]));
        hierarchy.insert(e[2], Some(e[0]));
        hierarchy.insert(e[3], Some(e[0]));

        assert_eq!(hierarchy.children(e[0]), &[e[1], e[2], e[3]]);
        assert_eq!(hierarchy.roots(), &[e[0]]);
        assert_eq!(hierarchy.parent(e[2]), Some(e[0]));
    }

    #[test]
    fn test_descendants_are_depth_first() {
        let e = entities(5);
        let mut hierarchy = Hierarchy::new();
        hierarchy.insert(e[0], None);
        hierarchy.insert(e[1], Some(e[0]));
        hierarchy.insert(e[2], Some(e[1]));
        hierarchy.insert(e[3], Some(e[0]));
        hierarchy.insert(e[4], Some(e[2]));

        assert_eq!(hierarchy.descendants(e[0]), vec![e[1], e[2], e[4], e[3]]);
        assert!(hierarchy.is_ancestor(e[0], e[4]));
        assert!(!hierarchy.is_ancestor(e[3], e[4]));
        assert!(!hierarchy.is_ancestor(e[4], e[4]));
    }

    #[test]
    fn test_set_parent_moves_between_lists() {
        let e = entities(3);
        let mut hierarchy = Hierarchy::new();
        hierarchy.insert(e[0], None);
        hierarchy.insert(e[1], None);
        hierarchy.insert(e[2], Some(e[0]));

        hierarchy.set_parent(e[2], Some(e[1]));
        assert!(hierarchy.children(e[0]).is_empty());
        assert_eq!(hierarchy.children(e[1]), &[e[2]]);

        hierarchy.set_parent(e[1], None);
        assert_eq!(hierarchy.roots(), &[e[0], e[1]]);

        hierarchy.set_parent(e[0], Some(e[1]));
        assert_eq!(hierarchy.roots(), &[e[1]]);
        assert_eq!(hierarchy.children(e[1]), &[e[2], e[0]]);
    }

    #[test]
    fn test_set_parent_to_current_parent_keeps_sibling_order() {
        let e = entities(4);
        let mut hierarchy = Hierarchy::new();
        hierarchy.insert(e[0], None);
        hierarchy.insert(e[1], Some(e[0]));
        hierarchy.insert(e[2], Some(e[0]));
        hierarchy.insert(e[3], None);

        hierarchy.set_parent(e[1], Some(e[0]));
        assert_eq!(hierarchy.children(e[0]), &[e[1], e[2]]);

        hierarchy.set_parent(e[0], None);
        assert_eq!(hierarchy.roots(), &[e[0], e[3]]);
    }

    #[test]
    fn test_remove_unlinks_node() {
        let e = entities(3);
        let mut hierarchy = Hierarchy::new();
        hierarchy.insert(e[0], None);
        hierarchy.insert(e[1], Some(e[0]));
        hierarchy.insert(e[2], Some(e[1]));

        hierarchy.remove(e[1]);

        assert!(!hierarchy.contains(e[1]));
        assert!(hierarchy.children(e[0]).is_empty());
        assert_eq!(hierarchy.parent(e[2]), None);
        assert_eq!(hierarchy.roots(), &[e[0], e[2]]);
    }
}

use compact_str::CompactString;

/// Index into the arena `Vec<HierarchyNode>`. Uses u32 to save memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single node of the weighted hierarchy, stored in a flat arena.
/// Uses sibling-list representation: each node has `first_child` and `next_sibling`.
#[derive(Debug, Clone)]
pub struct HierarchyNode {
    /// Display name (not the dotted id)
    pub name: CompactString,
    /// Dotted path from the root, e.g. `root.Wii.Wii Sports`
    pub id: CompactString,
    /// Optional category tag carried by leaves of the public datasets
    pub category: Option<CompactString>,
    /// Own value for leaves, `None` for internal nodes
    pub value: Option<f64>,
    /// Sum of descendant leaf values (leaf: its own value)
    pub aggregate: f64,
    /// Parent node index (None for root)
    pub parent: Option<NodeId>,
    /// First child node index (None for leaves)
    pub first_child: Option<NodeId>,
    /// Next sibling node index (None if last child)
    pub next_sibling: Option<NodeId>,
    /// Depth in the tree (root = 0)
    pub depth: u16,
    /// Longest path down to a leaf (leaf = 0)
    pub height: u16,
    /// Position among siblings in the input document
    pub order: u32,
}

impl HierarchyNode {
    pub fn is_leaf(&self) -> bool {
        self.first_child.is_none()
    }
}

/// The hierarchy stored as a flat arena of nodes.
///
/// Children always have higher indices than their parents, so reverse index
/// order is a valid bottom-up traversal.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    /// All nodes in contiguous memory
    pub nodes: Vec<HierarchyNode>,
    /// Root node index
    pub root: NodeId,
    /// Last child per node, to keep appends O(1) and input order intact
    last_child: Vec<Option<NodeId>>,
    /// Number of children appended per node
    child_count: Vec<u32>,
}

impl Hierarchy {
    /// Create a tree holding only a root node.
    pub fn new(root_name: &str) -> Self {
        let root_node = HierarchyNode {
            name: CompactString::new(root_name),
            id: CompactString::new(root_name),
            category: None,
            value: None,
            aggregate: 0.0,
            parent: None,
            first_child: None,
            next_sibling: None,
            depth: 0,
            height: 0,
            order: 0,
        };

        Hierarchy {
            nodes: vec![root_node],
            root: NodeId(0),
            last_child: vec![None],
            child_count: vec![0],
        }
    }

    /// Append a child under the given parent. Returns the new node's ID.
    /// Fills in `parent`, `depth`, `order` and the dotted `id`.
    pub fn add_child(&mut self, parent: NodeId, mut node: HierarchyNode) -> NodeId {
        let new_id = NodeId(self.nodes.len() as u32);
        let parent_node = &self.nodes[parent.index()];
        node.parent = Some(parent);
        node.depth = parent_node.depth + 1;
        node.id = compact_str::format_compact!("{}.{}", parent_node.id, node.name);
        node.next_sibling = None;
        node.order = self.child_count[parent.index()];

        match self.last_child[parent.index()] {
            Some(last) => self.nodes[last.index()].next_sibling = Some(new_id),
            None => self.nodes[parent.index()].first_child = Some(new_id),
        }
        self.last_child[parent.index()] = Some(new_id);
        self.child_count[parent.index()] += 1;

        self.nodes.push(node);
        self.last_child.push(None);
        self.child_count.push(0);
        new_id
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> &HierarchyNode {
        &self.nodes[id.index()]
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> &mut HierarchyNode {
        &mut self.nodes[id.index()]
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: NodeId) -> ChildIter<'_> {
        ChildIter {
            tree: self,
            current: self.nodes[parent.index()].first_child,
        }
    }

    /// All leaves, in arena order.
    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_leaf())
            .map(|(i, _)| NodeId(i as u32))
    }

    /// Replace the child list of `parent` with `children`, in that order.
    /// Re-links the sibling list without moving nodes in the arena.
    pub(crate) fn relink_children(&mut self, parent: NodeId, children: &[NodeId]) {
        let Some((&first, _)) = children.split_first() else {
            return;
        };
        self.nodes[parent.index()].first_child = Some(first);
        for w in children.windows(2) {
            self.nodes[w[0].index()].next_sibling = Some(w[1]);
        }
        if let Some(&last) = children.last() {
            self.nodes[last.index()].next_sibling = None;
            self.last_child[parent.index()] = Some(last);
        }
    }
}

/// Iterator over the children of a node.
pub struct ChildIter<'a> {
    tree: &'a Hierarchy,
    current: Option<NodeId>,
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        self.current = self.tree.nodes[id.index()].next_sibling;
        Some(id)
    }
}

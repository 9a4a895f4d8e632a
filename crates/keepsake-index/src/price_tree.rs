//! Height-balanced (AVL) binary search tree keyed by price.
//!
//! Nodes live in a `Vec` arena addressed by `NodeId`. Insertion and the
//! rotations return the id of the replacement subtree root, and the caller
//! stores it in the parent link.
//!
//! Keys are `(price, id)`. Ids grow monotonically, so a record whose price
//! equals an existing one always compares greater and descends right.
//! There is no delete.

use keepsake_common::RecordId;
use std::cmp::Ordering;
use tracing::trace;

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct NodeId(u32);

impl NodeId {
    /// Id of the node that will sit at arena position `len`.
    ///
    /// Panics once the arena would outgrow the `u32` id space.
    #[inline]
    fn at(len: usize) -> Self {
        match u32::try_from(len) {
            Ok(raw) => NodeId(raw),
            Err(_) => panic!("price tree arena full: {} nodes", len),
        }
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Ordering key of a tree node.
#[derive(Debug, Clone, Copy)]
struct PriceKey {
    price: f64,
    id: RecordId,
}

impl PriceKey {
    #[inline]
    fn compare(&self, other: &PriceKey) -> Ordering {
        self.price
            .total_cmp(&other.price)
            .then_with(|| self.id.cmp(&other.id))
    }

    #[inline]
    fn lt(&self, other: &PriceKey) -> bool {
        self.compare(other) == Ordering::Less
    }
}

#[derive(Debug, Clone)]
struct PriceNode {
    key: PriceKey,
    left: Option<NodeId>,
    right: Option<NodeId>,
    /// Leaf = 1, empty subtree = 0.
    height: u32,
}

/// Cumulative rotation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationStats {
    pub left: u64,
    pub right: u64,
}

/// AVL tree over record prices.
pub struct PriceTree {
    nodes: Vec<PriceNode>,
    root: Option<NodeId>,
    rotations: RotationStats,
}

impl PriceTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty tree with arena room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root: None,
            rotations: RotationStats::default(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the whole tree (0 when empty).
    #[inline]
    pub fn height(&self) -> u32 {
        self.height_of(self.root)
    }

    /// Price stored at the root.
    pub fn root_price(&self) -> Option<f64> {
        self.root.map(|n| self.node(n).key.price)
    }

    /// Rotations performed since the tree was created.
    #[inline]
    pub fn rotations(&self) -> RotationStats {
        self.rotations
    }

    #[inline]
    fn node(&self, id: NodeId) -> &PriceNode {
        &self.nodes[id.index()]
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut PriceNode {
        &mut self.nodes[id.index()]
    }

    #[inline]
    fn height_of(&self, id: Option<NodeId>) -> u32 {
        id.map_or(0, |n| self.node(n).height)
    }

    #[inline]
    fn update_height(&mut self, id: NodeId) {
        let node = self.node(id);
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self.node_mut(id).height = height;
    }

    /// `height(left) - height(right)`.
    #[inline]
    fn balance_factor(&self, id: NodeId) -> i64 {
        let node = self.node(id);
        i64::from(self.height_of(node.left)) - i64::from(self.height_of(node.right))
    }

    /// Inserts a record under its price and rebalances the insertion path.
    ///
    /// # Panics
    ///
    /// Panics if the tree already holds `u32::MAX + 1` nodes.
    pub fn insert(&mut self, price: f64, id: RecordId) {
        // `+ 0.0` folds -0.0 into 0.0 so total ordering agrees with `<=`.
        let key = PriceKey {
            price: price + 0.0,
            id,
        };
        let new = NodeId::at(self.nodes.len());
        self.nodes.push(PriceNode {
            key,
            left: None,
            right: None,
            height: 1,
        });
        let root = self.insert_at(self.root, new, key);
        self.root = Some(root);
    }

    fn insert_at(&mut self, subtree: Option<NodeId>, new: NodeId, key: PriceKey) -> NodeId {
        let Some(root) = subtree else {
            return new;
        };

        if key.lt(&self.node(root).key) {
            let left = self.insert_at(self.node(root).left, new, key);
            self.node_mut(root).left = Some(left);
        } else {
            let right = self.insert_at(self.node(root).right, new, key);
            self.node_mut(root).right = Some(right);
        }

        self.update_height(root);
        self.rebalance(root, key)
    }

    /// Restores the AVL balance at `root` after inserting `key` below it.
    ///
    /// The case is picked by comparing `key` with the heavy child the same
    /// way the descent did, so it always names the grandchild subtree that
    /// actually grew.
    fn rebalance(&mut self, root: NodeId, key: PriceKey) -> NodeId {
        let balance = self.balance_factor(root);

        if balance > 1 {
            let Some(left) = self.node(root).left else {
                return root;
            };
            if key.lt(&self.node(left).key) {
                // Left-Left
                return self.rotate_right(root);
            }
            // Left-Right
            let left = self.rotate_left(left);
            self.node_mut(root).left = Some(left);
            return self.rotate_right(root);
        }

        if balance < -1 {
            let Some(right) = self.node(root).right else {
                return root;
            };
            if !key.lt(&self.node(right).key) {
                // Right-Right
                return self.rotate_left(root);
            }
            // Right-Left
            let right = self.rotate_right(right);
            self.node_mut(root).right = Some(right);
            return self.rotate_left(root);
        }

        root
    }

    /// Promotes `y.left` into `y`'s position and returns it.
    fn rotate_right(&mut self, y: NodeId) -> NodeId {
        let Some(x) = self.node(y).left else {
            return y;
        };
        let t2 = self.node(x).right;

        self.node_mut(x).right = Some(y);
        self.node_mut(y).left = t2;

        self.update_height(y);
        self.update_height(x);

        self.rotations.right += 1;
        trace!(pivot = %self.node(y).key.id, promoted = %self.node(x).key.id, "rotate right");
        x
    }

    /// Promotes `x.right` into `x`'s position and returns it.
    fn rotate_left(&mut self, x: NodeId) -> NodeId {
        let Some(y) = self.node(x).right else {
            return x;
        };
        let t2 = self.node(y).left;

        self.node_mut(y).left = Some(x);
        self.node_mut(x).right = t2;

        self.update_height(x);
        self.update_height(y);

        self.rotations.left += 1;
        trace!(pivot = %self.node(x).key.id, promoted = %self.node(y).key.id, "rotate left");
        y
    }

    /// Returns the ids of all records with `min <= price <= max`, in no
    /// particular order.
    ///
    /// Subtrees are pruned when they cannot hold a match: left children are
    /// only visited when `price >= min`, right children when `price <= max`.
    /// Equal prices can sit on either side of a node after rotations, so
    /// both bounds are inclusive.
    pub fn range_query(&self, min: f64, max: f64) -> Vec<RecordId> {
        let (min, max) = (min + 0.0, max + 0.0);
        let mut results = Vec::new();
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();

        while let Some(id) = stack.pop() {
            let node = self.node(id);
            let price = node.key.price;

            if min <= price && price <= max {
                results.push(node.key.id);
            }
            if price.total_cmp(&min).is_ge() {
                stack.extend(node.left);
            }
            if price.total_cmp(&max).is_le() {
                stack.extend(node.right);
            }
        }

        results
    }

    /// Returns all record ids in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = RecordId> + '_ {
        InOrder {
            tree: self,
            stack: Vec::new(),
            current: self.root,
        }
    }
}

impl Default for PriceTree {
    fn default() -> Self {
        Self::new()
    }
}

struct InOrder<'a> {
    tree: &'a PriceTree,
    stack: Vec<NodeId>,
    current: Option<NodeId>,
}

impl Iterator for InOrder<'_> {
    type Item = RecordId;

    fn next(&mut self) -> Option<RecordId> {
        while let Some(id) = self.current {
            self.stack.push(id);
            self.current = self.tree.node(id).left;
        }
        let id = self.stack.pop()?;
        let node = self.tree.node(id);
        self.current = node.right;
        Some(node.key.id)
    }
}

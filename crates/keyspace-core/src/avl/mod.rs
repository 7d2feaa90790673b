//! Module: avl
//! Responsibility: an AVL-balanced ordered map persisted entirely through
//! collection primitives.
//! Does not own: value storage format (delegated to the value codec).
//! Boundary: nodes live in a `Vector` addressed by id, values in a `Map`
//! keyed identically, and the root id in an `Item`.
//!
//! Keys are ordered by their terminal byte encoding, the same order every
//! other collection iterates in. The tree is insert-only.

mod node;


pub use node::{Node, NodeCodec};

use crate::{
    codec::{KeyAsValue, KeyCodec, ValueCodec, encode_key},
    collections::{Item, Map, Vector},
    error::InternalError,
    obs::sink::{self, MetricsEvent, RotationKind},
    schema::{Prefix, SchemaBuilder},
    store::KvStore,
};
use std::cmp::Ordering;
use tracing::trace;

const ROOT_SUFFIX: u8 = 0x00;
const NODES_SUFFIX: u8 = 0x01;
const VALUES_SUFFIX: u8 = 0x02;

///
/// TreeMap
///
/// Ordered map answering min/max/floor/ceil/higher/lower queries.
///
/// Layout under the tree prefix `P`:
/// - `P ++ 0x00`: root node id (`{name}_root`)
/// - `P ++ 0x01`: node vector (`{name}_nodes`)
/// - `P ++ 0x02`: values by key (`{name}_values`)
///

#[derive(Clone, Debug)]
pub struct TreeMap<K, VC> {
    name: String,
    root: Item<KeyAsValue<u64>>,
    nodes: Vector<NodeCodec<K>>,
    values: Map<K, VC>,
}

impl<K, VC> TreeMap<K, VC>
where
    K: KeyCodec,
    VC: ValueCodec,
{
    pub fn new(
        builder: &mut SchemaBuilder,
        prefix: impl Into<Prefix>,
        name: impl Into<String>,
        value_codec: VC,
    ) -> Self {
        let prefix = prefix.into();
        let name = name.into();

        Self {
            root: Item::new(
                builder,
                prefix.child(ROOT_SUFFIX),
                format!("{name}_root"),
                KeyAsValue::new(),
            ),
            nodes: Vector::new(
                builder,
                prefix.child(NODES_SUFFIX),
                format!("{name}_nodes"),
                NodeCodec::new(),
            ),
            values: Map::new(
                builder,
                prefix.child(VALUES_SUFFIX),
                format!("{name}_values"),
                value_codec,
            ),
            name,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert or overwrite. Overwriting an existing key leaves the tree
    /// untouched. The value is encoded and size-checked before any node is
    /// written.
    pub fn set<S: KvStore>(
        &self,
        store: &mut S,
        key: &K,
        value: &VC::Value,
    ) -> Result<(), InternalError> {
        let entry = self.values.encode_checked(key, value)?;

        if !self.values.has(store, key)? {
            let key_bytes = encode_key(key)?;
            let root = self.root.try_get(store)?;
            let root = self.insert(store, root, key, &key_bytes)?;
            self.root.set(store, &root)?;
        }

        self.values.write_encoded(store, &entry)
    }

    pub fn get<S: KvStore>(&self, store: &S, key: &K) -> Result<VC::Value, InternalError> {
        self.values.get(store, key)
    }

    pub fn try_get<S: KvStore>(
        &self,
        store: &S,
        key: &K,
    ) -> Result<Option<VC::Value>, InternalError> {
        self.values.try_get(store, key)
    }

    pub fn has<S: KvStore>(&self, store: &S, key: &K) -> Result<bool, InternalError> {
        self.values.has(store, key)
    }

    /// Number of keys.
    pub fn len<S: KvStore>(&self, store: &S) -> Result<u64, InternalError> {
        self.nodes.len(store)
    }

    pub fn is_empty<S: KvStore>(&self, store: &S) -> Result<bool, InternalError> {
        self.nodes.is_empty(store)
    }

    /// Height of the tree; 0 when empty.
    pub fn height<S: KvStore>(&self, store: &S) -> Result<u64, InternalError> {
        let root = self.root.try_get(store)?;

        self.height_of(store, root)
    }

    pub fn min<S: KvStore>(&self, store: &S) -> Result<Option<K>, InternalError> {
        self.extreme(store, |node| node.left)
    }

    pub fn max<S: KvStore>(&self, store: &S) -> Result<Option<K>, InternalError> {
        self.extreme(store, |node| node.right)
    }

    /// Smallest key strictly greater than `key`.
    pub fn higher<S: KvStore>(&self, store: &S, key: &K) -> Result<Option<K>, InternalError> {
        self.nearest(store, key, Ordering::Greater)
    }

    /// Largest key strictly less than `key`.
    pub fn lower<S: KvStore>(&self, store: &S, key: &K) -> Result<Option<K>, InternalError> {
        self.nearest(store, key, Ordering::Less)
    }

    /// Smallest key greater than or equal to `key`.
    pub fn ceil<S: KvStore>(&self, store: &S, key: &K) -> Result<Option<K>, InternalError> {
        if self.has(store, key)? {
            return Ok(Some(key.clone()));
        }

        self.higher(store, key)
    }

    /// Largest key less than or equal to `key`.
    pub fn floor<S: KvStore>(&self, store: &S, key: &K) -> Result<Option<K>, InternalError> {
        if self.has(store, key)? {
            return Ok(Some(key.clone()));
        }

        self.lower(store, key)
    }

    /// Visit entries in ascending key order until `f` returns `Ok(true)`.
    pub fn walk<S, E, F>(&self, store: &S, f: F) -> Result<(), E>
    where
        S: KvStore,
        E: From<InternalError>,
        F: FnMut(K, VC::Value) -> Result<bool, E>,
    {
        let first = self.min(store)?;

        self.walk_keys(store, first, f)
    }

    /// Like `walk`, starting at the smallest key `>= start`.
    pub fn walk_from<S, E, F>(&self, store: &S, start: &K, f: F) -> Result<(), E>
    where
        S: KvStore,
        E: From<InternalError>,
        F: FnMut(K, VC::Value) -> Result<bool, E>,
    {
        let first = self.ceil(store, start)?;

        self.walk_keys(store, first, f)
    }

    /// Verify ids, heights, balance and in-order key order of every node.
    pub fn check_invariants<S: KvStore>(&self, store: &S) -> Result<(), InternalError> {
        let mut previous = None;
        let mut visited = 0;
        if let Some(root) = self.root.try_get(store)? {
            self.check_node(store, root, &mut previous, &mut visited)?;
        }

        let len = self.len(store)?;
        if visited != len {
            return Err(InternalError::tree_invariant(format!(
                "tree '{}': reached {visited} of {len} nodes from the root",
                self.name
            )));
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // descent
    // ------------------------------------------------------------------

    fn node<S: KvStore>(&self, store: &S, id: u64) -> Result<Node<K>, InternalError> {
        self.nodes.get(store, id)
    }

    fn height_of<S: KvStore>(&self, store: &S, id: Option<u64>) -> Result<u64, InternalError> {
        match id {
            Some(id) => Ok(self.node(store, id)?.height),
            None => Ok(0),
        }
    }

    fn extreme<S: KvStore>(
        &self,
        store: &S,
        next: impl Fn(&Node<K>) -> Option<u64>,
    ) -> Result<Option<K>, InternalError> {
        let Some(mut id) = self.root.try_get(store)? else {
            return Ok(None);
        };

        loop {
            let node = self.node(store, id)?;
            match next(&node) {
                Some(child) => id = child,
                None => return Ok(Some(node.key)),
            }
        }
    }

    // Best-candidate descent from the root for the closest key strictly on
    // the `side` of `key`.
    fn nearest<S: KvStore>(
        &self,
        store: &S,
        key: &K,
        side: Ordering,
    ) -> Result<Option<K>, InternalError> {
        let target = encode_key(key)?;
        let mut best = None;
        let mut current = self.root.try_get(store)?;

        while let Some(id) = current {
            let node = self.node(store, id)?;
            let candidate = encode_key(&node.key)?;

            if candidate.as_slice().cmp(&target) == side {
                current = match side {
                    Ordering::Greater => node.left,
                    _ => node.right,
                };
                best = Some(node.key);
            } else {
                current = match side {
                    Ordering::Greater => node.right,
                    _ => node.left,
                };
            }
        }

        Ok(best)
    }

    fn walk_keys<S, E, F>(&self, store: &S, first: Option<K>, mut f: F) -> Result<(), E>
    where
        S: KvStore,
        E: From<InternalError>,
        F: FnMut(K, VC::Value) -> Result<bool, E>,
    {
        let mut current = first;

        while let Some(key) = current {
            let value = self.values.get(store, &key)?;
            let next = self.higher(store, &key)?;
            if f(key, value)? {
                break;
            }
            current = next;
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // insertion
    // ------------------------------------------------------------------

    // Insert below `id`, returning the id of the (possibly rotated) subtree
    // root.
    fn insert<S: KvStore>(
        &self,
        store: &mut S,
        id: Option<u64>,
        key: &K,
        key_bytes: &[u8],
    ) -> Result<u64, InternalError> {
        let Some(id) = id else {
            let id = self.nodes.len(store)?;
            self.nodes.push(store, &Node::leaf(id, key.clone()))?;
            trace!(tree = %self.name, node = id, "inserted leaf");

            return Ok(id);
        };

        let mut node = self.node(store, id)?;
        match key_bytes.cmp(encode_key(&node.key)?.as_slice()) {
            Ordering::Less => node.left = Some(self.insert(store, node.left, key, key_bytes)?),
            Ordering::Greater => node.right = Some(self.insert(store, node.right, key, key_bytes)?),
            Ordering::Equal => return Ok(id),
        }

        self.rebalance(store, node)
    }

    fn rebalance<S: KvStore>(
        &self,
        store: &mut S,
        mut node: Node<K>,
    ) -> Result<u64, InternalError> {
        let left = self.height_of(store, node.left)?;
        let right = self.height_of(store, node.right)?;

        if left > right + 1 {
            let child = self.child(store, node.left, node.id)?;
            if self.height_of(store, child.right)? > self.height_of(store, child.left)? {
                node.left = Some(self.rotate_left(store, child)?);
            }
            return self.rotate_right(store, node);
        }

        if right > left + 1 {
            let child = self.child(store, node.right, node.id)?;
            if self.height_of(store, child.left)? > self.height_of(store, child.right)? {
                node.right = Some(self.rotate_right(store, child)?);
            }
            return self.rotate_left(store, node);
        }

        node.height = 1 + left.max(right);
        self.nodes.replace(store, node.id, &node)?;

        Ok(node.id)
    }

    fn rotate_left<S: KvStore>(
        &self,
        store: &mut S,
        mut node: Node<K>,
    ) -> Result<u64, InternalError> {
        let mut pivot = self.child(store, node.right, node.id)?;

        node.right = pivot.left;
        node.height = 1 + self
            .height_of(store, node.left)?
            .max(self.height_of(store, node.right)?);
        self.nodes.replace(store, node.id, &node)?;

        pivot.left = Some(node.id);
        pivot.height = 1 + node.height.max(self.height_of(store, pivot.right)?);
        self.nodes.replace(store, pivot.id, &pivot)?;

        self.record_rotation(RotationKind::Left, node.id, pivot.id);

        Ok(pivot.id)
    }

    fn rotate_right<S: KvStore>(
        &self,
        store: &mut S,
        mut node: Node<K>,
    ) -> Result<u64, InternalError> {
        let mut pivot = self.child(store, node.left, node.id)?;

        node.left = pivot.right;
        node.height = 1 + self
            .height_of(store, node.left)?
            .max(self.height_of(store, node.right)?);
        self.nodes.replace(store, node.id, &node)?;

        pivot.right = Some(node.id);
        pivot.height = 1 + node.height.max(self.height_of(store, pivot.left)?);
        self.nodes.replace(store, pivot.id, &pivot)?;

        self.record_rotation(RotationKind::Right, node.id, pivot.id);

        Ok(pivot.id)
    }

    // A child the balance factor says must exist.
    fn child<S: KvStore>(
        &self,
        store: &S,
        child: Option<u64>,
        parent: u64,
    ) -> Result<Node<K>, InternalError> {
        let Some(id) = child else {
            return Err(InternalError::tree_invariant(format!(
                "tree '{}': node {parent} is unbalanced toward a missing child",
                self.name
            )));
        };

        self.node(store, id)
    }

    fn record_rotation(&self, kind: RotationKind, node: u64, pivot: u64) {
        sink::record(MetricsEvent::TreeRotation {
            tree: &self.name,
            kind,
        });
        trace!(tree = %self.name, ?kind, node, pivot, "rotated");
    }

    // ------------------------------------------------------------------
    // invariants
    // ------------------------------------------------------------------

    // In-order check; returns the verified height of the subtree.
    fn check_node<S: KvStore>(
        &self,
        store: &S,
        id: u64,
        previous: &mut Option<Vec<u8>>,
        visited: &mut u64,
    ) -> Result<u64, InternalError> {
        let node = self.node(store, id)?;
        let fail = |message: String| {
            Err(InternalError::tree_invariant(format!(
                "tree '{}': node {id}: {message}",
                self.name
            )))
        };

        if node.id != id {
            return fail(format!("stored under id {id} but claims id {}", node.id));
        }

        let left = match node.left {
            Some(child) => self.check_node(store, child, previous, visited)?,
            None => 0,
        };

        let key = encode_key(&node.key)?;
        if previous.as_ref().is_some_and(|prev| *prev >= key) {
            return fail(format!("key {} is out of order", node.key.stringify()));
        }
        *previous = Some(key);
        *visited += 1;

        let right = match node.right {
            Some(child) => self.check_node(store, child, previous, visited)?,
            None => 0,
        };

        if node.height != 1 + left.max(right) {
            return fail(format!(
                "height {} does not match children {left}/{right}",
                node.height
            ));
        }
        if left.abs_diff(right) > 1 {
            return fail(format!("balance factor {left}/{right} exceeds 1"));
        }

        Ok(node.height)
    }
}

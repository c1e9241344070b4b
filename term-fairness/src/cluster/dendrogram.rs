//! Merge trees produced by agglomerative clustering.

use serde::{Deserialize, Serialize};

use crate::cluster::LinkageMethod;

/// One agglomeration step.
///
/// Cluster ids follow the linkage-matrix convention: leaves are `0..n` in
/// label order, and the merge at step `s` creates cluster `n + s`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Merge {
    /// Smaller child cluster id
    pub left: usize,
    /// Larger child cluster id
    pub right: usize,
    /// Linkage distance at which the children were joined
    pub distance: f64,
    /// Number of leaves under the new cluster
    pub size: usize,
}

/// Nested view of a dendrogram, for renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DendrogramNode {
    /// A single group.
    Leaf {
        /// Leaf id (index into the labels)
        id: usize,
        /// Group label
        label: String,
    },
    /// Two subtrees joined at `distance`.
    Cluster {
        /// Cluster id
        id: usize,
        /// Merge distance
        distance: f64,
        /// Number of leaves below
        size: usize,
        /// Subtree with the smaller id
        left: Box<DendrogramNode>,
        /// Subtree with the larger id
        right: Box<DendrogramNode>,
    },
}

impl DendrogramNode {
    /// The node's cluster id.
    pub fn id(&self) -> usize {
        match self {
            DendrogramNode::Leaf { id, .. } | DendrogramNode::Cluster { id, .. } => *id,
        }
    }
}

/// Binary merge tree over a set of groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dendrogram {
    labels: Vec<String>,
    merges: Vec<Merge>,
    linkage: LinkageMethod,
}

impl Dendrogram {
    pub(crate) fn new(labels: Vec<String>, merges: Vec<Merge>, linkage: LinkageMethod) -> Self {
        Self {
            labels,
            merges,
            linkage,
        }
    }

    /// Leaf labels, indexed by leaf id.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Merge steps in order; there are `labels().len() - 1` of them.
    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// Linkage rule the tree was built with.
    pub fn linkage(&self) -> LinkageMethod {
        self.linkage
    }

    /// Id of the root cluster.
    pub fn root_id(&self) -> usize {
        self.labels.len() + self.merges.len() - 1
    }

    /// The nested tree rooted at the last merge.
    pub fn tree(&self) -> DendrogramNode {
        self.node(self.root_id())
    }

    fn node(&self, id: usize) -> DendrogramNode {
        let n = self.labels.len();
        if id < n {
            return DendrogramNode::Leaf {
                id,
                label: self.labels[id].clone(),
            };
        }
        let merge = self.merges[id - n];
        DendrogramNode::Cluster {
            id,
            distance: merge.distance,
            size: merge.size,
            left: Box::new(self.node(merge.left)),
            right: Box::new(self.node(merge.right)),
        }
    }

    /// Leaf ids in left-to-right drawing order.
    pub fn leaf_order(&self) -> Vec<usize> {
        let n = self.labels.len();
        let mut order = Vec::with_capacity(n);
        let mut stack = vec![self.root_id()];
        while let Some(id) = stack.pop() {
            if id < n {
                order.push(id);
            } else {
                let merge = self.merges[id - n];
                stack.push(merge.right);
                stack.push(merge.left);
            }
        }
        order
    }

    /// Leaf labels in drawing order.
    pub fn ordered_labels(&self) -> Vec<&str> {
        self.leaf_order()
            .into_iter()
            .map(|id| self.labels[id].as_str())
            .collect()
    }

    /// Flat clusters from every merge at or below `threshold`.
    ///
    /// Returns one cluster number per leaf, in label order. Numbers start at 1
    /// and are assigned in order of each cluster's first leaf.
    pub fn cut(&self, threshold: f64) -> Vec<usize> {
        let steps = self
            .merges
            .iter()
            .take_while(|merge| merge.distance <= threshold)
            .count();
        self.flatten(steps)
    }

    /// Flat clusters from the first `labels().len() - k` merges, giving
    /// `k` clusters (clamped to `1..=labels().len()`).
    pub fn cut_into(&self, k: usize) -> Vec<usize> {
        let n = self.labels.len();
        let k = k.clamp(1, n.max(1));
        self.flatten(n - k)
    }

    fn flatten(&self, steps: usize) -> Vec<usize> {
        let n = self.labels.len();
        let mut parent: Vec<usize> = (0..n + self.merges.len()).collect();

        for (step, merge) in self.merges.iter().take(steps).enumerate() {
            let id = n + step;
            parent[merge.left] = id;
            parent[merge.right] = id;
        }

        let mut numbering: Vec<Option<usize>> = vec![None; parent.len()];
        let mut next = 1;
        (0..n)
            .map(|leaf| {
                let root = find(&parent, leaf);
                *numbering[root].get_or_insert_with(|| {
                    next += 1;
                    next - 1
                })
            })
            .collect()
    }
}

fn find(parent: &[usize], mut id: usize) -> usize {
    while parent[id] != id {
        id = parent[id];
    }
    id
}

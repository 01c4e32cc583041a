use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

pub type NodeId = usize;

pub const HIERARCHY_ROOT_KEY: &str = "__root_key__";

/// Extracts the group key of a fact for one layer.
pub type GroupBy<F> = Arc<dyn Fn(&F) -> String + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregator {
    #[default]
    Sum,
    Count,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyNode {
    pub key: String,
    pub value: f64,
    pub depth: usize,
    pub parent: Option<NodeId>,
    pub sort_index: usize,
    pub children: Vec<NodeId>,
}

/// Arena of aggregated nodes. Index 0 is the root; every other node points to
/// its parent by index, so parent values equal the sum of their children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hierarchy {
    nodes: Vec<HierarchyNode>,
}

impl Hierarchy {
    pub const ROOT: NodeId = 0;

    pub fn group_by_rollup<F>(
        facts: &[F],
        value_accessor: impl Fn(&F) -> f64,
        group_by: &[GroupBy<F>],
        aggregator: Aggregator,
    ) -> Self {
        let mut nodes = vec![HierarchyNode {
            key: HIERARCHY_ROOT_KEY.to_string(),
            value: 0.0,
            depth: 0,
            parent: None,
            sort_index: 0,
            children: Vec::new(),
        }];
        let mut lookup: HashMap<(NodeId, String), NodeId> = HashMap::new();

        for fact in facts {
            let amount = match aggregator {
                Aggregator::Sum => value_accessor(fact),
                Aggregator::Count => 1.0,
            };
            nodes[Self::ROOT].value += amount;
            let mut current = Self::ROOT;
            for (layer, accessor) in group_by.iter().enumerate() {
                let key = accessor(fact);
                let next = match lookup.get(&(current, key.clone())) {
                    Some(&id) => id,
                    None => {
                        let id = nodes.len();
                        nodes.push(HierarchyNode {
                            key: key.clone(),
                            value: 0.0,
                            depth: layer + 1,
                            parent: Some(current),
                            sort_index: 0,
                            children: Vec::new(),
                        });
                        nodes[current].children.push(id);
                        lookup.insert((current, key), id);
                        id
                    }
                };
                nodes[next].value += amount;
                current = next;
            }
        }

        for id in 0..nodes.len() {
            let mut children = std::mem::take(&mut nodes[id].children);
            // stable, so equal values keep first-seen order
            children.sort_by(|a, b| {
                nodes[*b]
                    .value
                    .partial_cmp(&nodes[*a].value)
                    .unwrap_or(Ordering::Equal)
            });
            for (index, child) in children.iter().enumerate() {
                nodes[*child].sort_index = index;
            }
            nodes[id].children = children;
        }

        Self { nodes }
    }

    pub fn node(&self, id: NodeId) -> &HierarchyNode {
        &self.nodes[id]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[Self::ROOT].children.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.nodes[Self::ROOT].value
    }

    /// Node ids from the first layer down to `id`, root excluded.
    pub fn path(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            if node == Self::ROOT {
                break;
            }
            path.push(node);
            current = self.nodes[node].parent;
        }
        path.reverse();
        path
    }

    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or(0)
    }
}

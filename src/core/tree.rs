//! Folder / dataset tree exploration
//!
//! The backend is asked for one level at a time; folders are expanded
//! until the requested depth is reached.

use std::future::Future;
use std::pin::Pin;

use super::error::{check_range, KbResult};
use super::kb::KnowledgeApi;
use crate::remote::types::{DatasetNode, NodeKind};

pub const MAX_TREE_DEPTH: u32 = 10;

/// A node and everything fetched below it
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub node: DatasetNode,
    pub children: Vec<TreeNode>,
}

/// Fetched tree plus the parameters it was built with
#[derive(Debug, Clone)]
pub struct DatasetTree {
    pub root_id: String,
    pub filter: String,
    pub max_depth: u32,
    pub nodes: Vec<TreeNode>,
}

impl DatasetTree {
    pub fn total_nodes(&self) -> usize {
        count_nodes(&self.nodes)
    }
}

/// Build the tree under `parent_id`, at most `max_depth` levels deep
pub async fn build_tree(
    api: &dyn KnowledgeApi,
    parent_id: &str,
    filter: &str,
    max_depth: u32,
) -> KbResult<DatasetTree> {
    check_range("deep", max_depth as i64, 1, MAX_TREE_DEPTH as i64)?;

    tracing::info!(parent_id, filter, max_depth, "building dataset tree");
    let nodes = fetch_level(api, parent_id.to_string(), filter, max_depth, 0).await;
    tracing::info!(total = count_nodes(&nodes), "dataset tree built");

    Ok(DatasetTree {
        root_id: parent_id.to_string(),
        filter: filter.to_string(),
        max_depth,
        nodes,
    })
}

fn fetch_level<'a>(
    api: &'a dyn KnowledgeApi,
    parent_id: String,
    filter: &'a str,
    max_depth: u32,
    depth: u32,
) -> Pin<Box<dyn Future<Output = Vec<TreeNode>> + Send + 'a>> {
    Box::pin(async move {
        if depth >= max_depth {
            return Vec::new();
        }

        let nodes = match api.dataset_tree(&parent_id, filter, 1).await {
            Ok(nodes) => nodes,
            Err(e) => {
                tracing::warn!(parent_id = %parent_id, depth, error = %e, "failed to list tree level");
                return Vec::new();
            }
        };

        let mut level = Vec::with_capacity(nodes.len());
        for node in nodes {
            let children = if node.kind == NodeKind::Folder && depth + 1 < max_depth {
                fetch_level(api, node.id.clone(), filter, max_depth, depth + 1).await
            } else {
                Vec::new()
            };
            level.push(TreeNode { node, children });
        }
        level
    })
}

/// Total number of nodes, at every level
pub fn count_nodes(nodes: &[TreeNode]) -> usize {
    nodes.iter().map(|n| 1 + count_nodes(&n.children)).sum()
}

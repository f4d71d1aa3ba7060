//! Assembles flat comment records into the two-level display tree.

use std::collections::HashMap;

use uuid::Uuid;

use crate::comment::{Comment, CommentNode};

/// Group `comments` into root comments with their direct replies.
///
/// Output is ordered by `created_at` ascending, both across roots and within
/// each root's replies; equal timestamps keep their input order. Replies whose
/// parent is not a root present in `comments` are dropped, which also covers
/// replies to replies.
pub fn build_tree(comments: &[Comment]) -> Vec<CommentNode> {
  let mut ordered: Vec<&Comment> = comments.iter().collect();
  ordered.sort_by_key(|c| c.created_at);

  let mut nodes: Vec<CommentNode> = Vec::new();
  let mut root_index: HashMap<Uuid, usize> = HashMap::new();
  for comment in ordered.iter().filter(|c| c.is_root()) {
    root_index.insert(comment.comment_id, nodes.len());
    nodes.push(CommentNode {
      comment: (*comment).clone(),
      replies: Vec::new(),
    });
  }

  for reply in ordered.iter().filter(|c| !c.is_root()) {
    let Some(parent) = reply.parent_id else { continue };
    if let Some(&idx) = root_index.get(&parent) {
      nodes[idx].replies.push((*reply).clone());
    }
  }

  nodes
}

//! メモリ上の文書モデル
//!
//! ブラウザの contentEditable 要素の振る舞いを再現する最小限の木構造。
//! テストやヘッドレス実行で `Surface` として使う。

use super::{NativePoint, NativeSelection, Surface};

/// ノードの識別子（アリーナ内のインデックス）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Element { children: Vec<NodeId> },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
}

/// contentEditable 要素を模した木
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<NodeData>,
    root: NodeId,
    selection: Option<NativeSelection<NodeId>>,
    pending_selection_changes: usize,
    mounted: bool,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// 子を持たないルート要素だけの木
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Element {
                    children: Vec::new(),
                },
                parent: None,
            }],
            root: NodeId(0),
            selection: None,
            pending_selection_changes: 0,
            mounted: true,
        }
    }

    /// 隣接するテキストノード列から構築
    pub fn from_leaves(leaves: &[&str]) -> Self {
        let mut tree = Self::new();
        for leaf in leaves {
            tree.append_text(leaf);
        }
        tree
    }

    /// ルート末尾にテキストノードを追加
    pub fn append_text(&mut self, text: &str) -> NodeId {
        let root = self.root;
        self.push_child(root, NodeKind::Text(text.to_string()))
    }

    /// テキストノードを `at` 文字目で2つに分割し、後半のノードを返す
    pub fn split_text(&mut self, node: NodeId, at: usize) -> Option<NodeId> {
        let (head, tail) = match &self.nodes[node.0].kind {
            NodeKind::Text(text) => {
                let byte = char_to_byte(text, at);
                (text[..byte].to_string(), text[byte..].to_string())
            }
            NodeKind::Element { .. } => return None,
        };
        let parent = self.nodes[node.0].parent?;
        self.nodes[node.0].kind = NodeKind::Text(head);

        let new_id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind: NodeKind::Text(tail),
            parent: Some(parent),
        });
        if let NodeKind::Element { children } = &mut self.nodes[parent.0].kind {
            let index = children.iter().position(|&child| child == node)?;
            children.insert(index + 1, new_id);
        }
        Some(new_id)
    }

    /// ノードを新しい要素で包む（`<span>` で装飾された状態の再現）
    pub fn wrap_in_element(&mut self, node: NodeId) -> Option<NodeId> {
        let parent = self.nodes[node.0].parent?;
        let wrapper = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind: NodeKind::Element {
                children: vec![node],
            },
            parent: Some(parent),
        });
        self.nodes[node.0].parent = Some(wrapper);
        if let NodeKind::Element { children } = &mut self.nodes[parent.0].kind {
            let index = children.iter().position(|&child| child == node)?;
            children[index] = wrapper;
        }
        Some(wrapper)
    }

    /// テキストノードの内容
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    /// 表示面を取り外す
    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    fn push_child(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
        });
        if let NodeKind::Element { children } = &mut self.nodes[parent.0].kind {
            children.push(id);
        }
        id
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { children } => {
                for &child in children {
                    self.collect_text(child, out);
                }
            }
        }
    }
}

impl Surface for DomTree {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        self.root
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { children } => children.clone(),
            NodeKind::Text(_) => Vec::new(),
        }
    }

    fn text_len(&self, node: NodeId) -> Option<usize> {
        self.text(node).map(|text| text.chars().count())
    }

    fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(self.root, &mut out);
        out
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn set_text_content(&mut self, text: &str) {
        let root = self.root;
        let old_children = self.children(root);
        for child in old_children {
            self.nodes[child.0].parent = None;
        }
        if let NodeKind::Element { children } = &mut self.nodes[root.0].kind {
            children.clear();
        }
        if !text.is_empty() {
            self.push_child(root, NodeKind::Text(text.to_string()));
        }
        // 削除されたノード内の選択はルート先頭へ潰れる
        if self.selection.is_some() {
            self.selection = Some(NativeSelection::caret(NativePoint::new(root, 0)));
            self.pending_selection_changes += 1;
        }
    }

    fn append_empty_text(&mut self) -> NodeId {
        self.append_text("")
    }

    fn selection(&self) -> Option<NativeSelection<NodeId>> {
        self.selection
    }

    fn set_selection(&mut self, selection: NativeSelection<NodeId>) {
        self.selection = Some(selection);
        self.pending_selection_changes += 1;
    }

    fn drain_selection_changes(&mut self) -> usize {
        std::mem::take(&mut self.pending_selection_changes)
    }
}

fn char_to_byte(text: &str, char_pos: usize) -> usize {
    text.char_indices()
        .nth(char_pos)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_content_leaves_no_text_nodes() {
        let mut tree = DomTree::from_leaves(&["abc"]);
        tree.set_text_content("");
        assert!(tree.text_leaves().is_empty());
        assert_eq!(tree.text_content(), "");
    }

    #[test]
    fn split_keeps_content_contiguous() {
        let mut tree = DomTree::new();
        let node = tree.append_text("héllo");
        let tail = tree.split_text(node, 2).unwrap();
        assert_eq!(tree.text(node), Some("hé"));
        assert_eq!(tree.text(tail), Some("llo"));
        assert_eq!(tree.text_content(), "héllo");
        assert_eq!(tree.text_leaves(), vec![(node, 2), (tail, 3)]);
    }

    #[test]
    fn wrapped_leaves_stay_in_document_order() {
        let mut tree = DomTree::from_leaves(&["ab", "cd", "ef"]);
        let middle = tree.text_leaves()[1].0;
        tree.wrap_in_element(middle).unwrap();
        assert_eq!(tree.text_content(), "abcdef");
        let lens: Vec<usize> = tree.text_leaves().iter().map(|(_, len)| *len).collect();
        assert_eq!(lens, vec![2, 2, 2]);
    }

    #[test]
    fn selection_mutations_queue_notifications() {
        let mut tree = DomTree::from_leaves(&["abc"]);
        let leaf = tree.text_leaves()[0].0;
        tree.set_selection(NativeSelection::caret(NativePoint::new(leaf, 1)));
        tree.set_text_content("xyz");
        assert_eq!(tree.drain_selection_changes(), 2);
        assert_eq!(tree.drain_selection_changes(), 0);
        assert_eq!(
            tree.selection(),
            Some(NativeSelection::caret(NativePoint::new(tree.root(), 0)))
        );
    }
}

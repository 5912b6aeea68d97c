//! 編集面の抽象化
//!
//! ブラウザ文書の contentEditable 要素のように、テキスト葉ノードの木と
//! (ノード, オフセット) で表されるネイティブ選択を持つ表示面を扱う。

use std::fmt::Debug;

pub mod dom;

pub use dom::{DomTree, NodeId};

/// ネイティブ選択の境界点
///
/// テキストノードでは文字オフセット、要素では子ノードのインデックスを表す。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativePoint<N> {
    pub node: N,
    pub offset: usize,
}

impl<N> NativePoint<N> {
    pub fn new(node: N, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// ネイティブ選択（`anchor` が `focus` より後ろでもよい）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeSelection<N> {
    pub anchor: NativePoint<N>,
    pub focus: NativePoint<N>,
}

impl<N: Copy + Eq> NativeSelection<N> {
    pub fn caret(point: NativePoint<N>) -> Self {
        Self {
            anchor: point,
            focus: point,
        }
    }

    pub fn range(anchor: NativePoint<N>, focus: NativePoint<N>) -> Self {
        Self { anchor, focus }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

/// 同期対象となる編集面
pub trait Surface {
    type Node: Copy + Eq + Debug;

    /// 編集可能なルート要素
    fn root(&self) -> Self::Node;

    /// 子ノード（文書順）
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// テキストノードなら文字数、要素なら `None`
    fn text_len(&self, node: Self::Node) -> Option<usize>;

    /// ルート配下のテキスト全体
    fn text_content(&self) -> String;

    /// 表示面がまだ存在するかどうか
    fn is_mounted(&self) -> bool;

    /// ルートの子をすべて置き換える
    ///
    /// 空文字列ではテキストノードを1つも残さない。
    fn set_text_content(&mut self, text: &str);

    /// ルート末尾に空のテキストノードを追加
    fn append_empty_text(&mut self) -> Self::Node;

    fn selection(&self) -> Option<NativeSelection<Self::Node>>;

    fn set_selection(&mut self, selection: NativeSelection<Self::Node>);

    /// 前回以降に発生した選択変更通知の数を取り出す
    fn drain_selection_changes(&mut self) -> usize;

    /// テキスト葉ノードを文書順に列挙
    fn text_leaves(&self) -> Vec<(Self::Node, usize)> {
        let mut leaves = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(node) = stack.pop() {
            match self.text_len(node) {
                Some(len) => leaves.push((node, len)),
                None => stack.extend(self.children(node).into_iter().rev()),
            }
        }
        leaves
    }
}

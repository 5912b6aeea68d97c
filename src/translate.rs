//! オフセット変換
//!
//! ネイティブ選択の (ノード, オフセット) とルート先頭からの文字オフセットを
//! 相互に変換する。状態を持たない純粋な関数群。
//!
//! 隣接する葉ノードの境界では前の葉の末尾を優先する。

use crate::coords::{Addressing, Coord, LineIndex, Span};
use crate::surface::{NativePoint, NativeSelection, Surface};

/// 現在のネイティブ選択を正規化済みの文字範囲へ変換
///
/// 選択がない、または表示面の外にある場合は `(0, 0)`。
pub fn to_linear_offsets<S: Surface>(surface: &S) -> Span {
    selection_span(surface).unwrap_or_default()
}

/// 現在のネイティブ選択を文字範囲へ変換（表示面内に選択がなければ `None`）
pub fn selection_span<S: Surface>(surface: &S) -> Option<Span> {
    let selection = surface.selection()?;
    let anchor = point_to_offset(surface, selection.anchor)?;
    let focus = point_to_offset(surface, selection.focus)?;
    Some(Span::new(anchor, focus))
}

/// 正規化した選択範囲の両端をエンジンの座標方式で表す
///
/// 行配列でアドレスするエンジンには `{row, col}` を返す。
pub fn selection_coords<S: Surface>(surface: &S, addressing: Addressing) -> Option<(Coord, Coord)> {
    let span = selection_span(surface)?;
    let index = LineIndex::from_text(&surface.text_content());
    Some((
        index.coord(span.start, addressing),
        index.coord(span.end, addressing),
    ))
}

/// 境界点より前にあるテキストの文字数
///
/// ルート先頭から境界点までの範囲の文字列長と同じ値になる。
pub fn point_to_offset<S: Surface>(surface: &S, point: NativePoint<S::Node>) -> Option<usize> {
    let mut consumed = 0;
    if walk_to_point(surface, surface.root(), point, &mut consumed) {
        Some(consumed)
    } else {
        None
    }
}

fn walk_to_point<S: Surface>(
    surface: &S,
    node: S::Node,
    point: NativePoint<S::Node>,
    consumed: &mut usize,
) -> bool {
    if node == point.node {
        match surface.text_len(node) {
            Some(len) => *consumed += point.offset.min(len),
            None => {
                for child in surface.children(node).into_iter().take(point.offset) {
                    *consumed += subtree_len(surface, child);
                }
            }
        }
        return true;
    }

    match surface.text_len(node) {
        Some(len) => {
            *consumed += len;
            false
        }
        None => surface
            .children(node)
            .into_iter()
            .any(|child| walk_to_point(surface, child, point, consumed)),
    }
}

fn subtree_len<S: Surface>(surface: &S, node: S::Node) -> usize {
    match surface.text_len(node) {
        Some(len) => len,
        None => surface
            .children(node)
            .into_iter()
            .map(|child| subtree_len(surface, child))
            .sum(),
    }
}

/// 文字オフセットに対応するテキストノード内の位置を求める
///
/// テキストノードが1つもなければ空のノードを作ってその先頭を返す。
/// 全体長を超えるオフセットは最後の葉の末尾にクランプする。
pub fn locate<S: Surface>(surface: &mut S, offset: usize) -> NativePoint<S::Node> {
    let leaves = surface.text_leaves();
    let Some(&(last, last_len)) = leaves.last() else {
        let node = surface.append_empty_text();
        return NativePoint::new(node, 0);
    };

    let mut remaining = offset;
    for (node, len) in leaves {
        if len >= remaining {
            return NativePoint::new(node, remaining);
        }
        remaining -= len;
    }
    NativePoint::new(last, last_len)
}

/// 指定オフセットに折り畳んだキャレットを置く
pub fn to_native_caret<S: Surface>(surface: &mut S, offset: usize) {
    if !surface.is_mounted() {
        return;
    }
    let point = locate(surface, offset);
    surface.set_selection(NativeSelection::caret(point));
}

/// `start` から `end` へ向かう選択を張る
pub fn to_native_selection<S: Surface>(surface: &mut S, start: usize, end: usize) {
    if !surface.is_mounted() {
        return;
    }
    let span = Span::new(start, end);
    let anchor = locate(surface, span.start);
    let focus = locate(surface, span.end);
    surface.set_selection(NativeSelection::range(anchor, focus));
}

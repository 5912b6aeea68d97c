//! 座標系
//!
//! エンジン側のアドレス（文字オフセット / 行・列）と
//! 正規化済み選択範囲を扱う。位置はすべて `char` 単位で数える。

use serde::{Deserialize, Serialize};

/// 行・列による位置（いずれも0ベース、列は文字単位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowCol {
    pub row: usize,
    pub col: usize,
}

impl RowCol {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// エンジン境界で使う座標
///
/// ワイヤ上では数値か `{row, col}` のどちらかで現れる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coord {
    Flat(usize),
    RowCol(RowCol),
}

/// エンジンが位置を表す方式
///
/// 最後に受け取ったスナップショットの形から決まり、報告もその方式で行う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Addressing {
    #[default]
    Flat,
    RowCol,
}

/// 向きを持つ選択（エンジン境界での表現）
///
/// `anchor` が `active` より後ろにあってもよい。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: usize,
    pub active: usize,
}

/// 正規化済みの範囲（常に `start <= end`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(anchor: usize, active: usize) -> Self {
        Self { anchor, active }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.active
    }

    /// 正規化した範囲を導出
    pub fn span(&self) -> Span {
        Span::new(self.anchor, self.active)
    }

    pub fn clamped(&self, len: usize) -> Self {
        Self {
            anchor: self.anchor.min(len),
            active: self.active.min(len),
        }
    }
}

impl Span {
    /// 引数の順序に関係なく `start <= end` の範囲を作る
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn clamped(&self, len: usize) -> Self {
        Span::new(self.start.min(len), self.end.min(len))
    }
}

/// 行長の配列から構築する行インデックス
///
/// 行区切りは `'\n'` のみ。空テキストは長さ0の1行として扱う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_lengths: Vec<usize>,
}

impl LineIndex {
    pub fn from_text(text: &str) -> Self {
        Self {
            line_lengths: text.split('\n').map(|line| line.chars().count()).collect(),
        }
    }

    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut line_lengths: Vec<usize> = lines
            .iter()
            .map(|line| line.as_ref().chars().count())
            .collect();
        if line_lengths.is_empty() {
            line_lengths.push(0);
        }
        Self { line_lengths }
    }

    pub fn line_count(&self) -> usize {
        self.line_lengths.len()
    }

    pub fn line_len(&self, row: usize) -> Option<usize> {
        self.line_lengths.get(row).copied()
    }

    /// 改行を含む全体の文字数
    pub fn total_len(&self) -> usize {
        self.line_lengths.iter().sum::<usize>() + self.line_lengths.len() - 1
    }

    /// 行・列を文字オフセットへ変換（範囲外はクランプ）
    pub fn to_flat(&self, pos: RowCol) -> usize {
        let last = self.line_lengths.len() - 1;
        let row = pos.row.min(last);
        let before: usize = self.line_lengths[..row].iter().map(|len| len + 1).sum();
        before + pos.col.min(self.line_lengths[row])
    }

    /// 文字オフセットを行・列へ変換（範囲外はクランプ）
    ///
    /// 改行文字の直前の位置はその行の末尾として扱う。
    pub fn to_row_col(&self, offset: usize) -> RowCol {
        let mut remaining = offset.min(self.total_len());
        for (row, &len) in self.line_lengths.iter().enumerate() {
            if remaining <= len {
                return RowCol::new(row, remaining);
            }
            remaining -= len + 1;
        }
        let last = self.line_lengths.len() - 1;
        RowCol::new(last, self.line_lengths[last])
    }

    /// 文字オフセットを指定方式の座標で表す
    pub fn coord(&self, offset: usize, addressing: Addressing) -> Coord {
        match addressing {
            Addressing::Flat => Coord::Flat(offset.min(self.total_len())),
            Addressing::RowCol => Coord::RowCol(self.to_row_col(offset)),
        }
    }

    /// 任意の座標を文字オフセットへ解決
    pub fn resolve(&self, coord: Coord) -> usize {
        match coord {
            Coord::Flat(offset) => offset.min(self.total_len()),
            Coord::RowCol(pos) => self.to_flat(pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_normalizes_order() {
        assert_eq!(Span::new(5, 2), Span { start: 2, end: 5 });
        assert_eq!(Selection::new(5, 2).span(), Selection::new(2, 5).span());
        assert_eq!(Span::new(5, 2).len(), 3);
    }

    #[test]
    fn empty_text_has_one_empty_line() {
        let index = LineIndex::from_text("");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.total_len(), 0);
        assert_eq!(index.to_row_col(10), RowCol::new(0, 0));
        assert_eq!(index.to_flat(RowCol::new(3, 3)), 0);
    }

    #[test]
    fn converts_between_flat_and_row_col() {
        let index = LineIndex::from_text("ab\ncde\n\nf");
        assert_eq!(index.total_len(), 9);
        assert_eq!(index.to_row_col(2), RowCol::new(0, 2));
        assert_eq!(index.to_row_col(3), RowCol::new(1, 0));
        assert_eq!(index.to_row_col(7), RowCol::new(2, 0));
        assert_eq!(index.to_row_col(9), RowCol::new(3, 1));
        assert_eq!(index.to_flat(RowCol::new(1, 3)), 6);
        assert_eq!(index.to_flat(RowCol::new(1, 99)), 6);
        assert_eq!(index.to_flat(RowCol::new(3, 1)), 9);
    }

    #[test]
    fn flat_round_trips_through_row_col() {
        let index = LineIndex::from_text("héllo\nwörld\n");
        for offset in 0..=index.total_len() {
            assert_eq!(index.to_flat(index.to_row_col(offset)), offset);
        }
    }

    #[test]
    fn lines_and_text_agree() {
        let from_lines = LineIndex::from_lines(&["ab", "cde", "", "f"]);
        assert_eq!(from_lines, LineIndex::from_text("ab\ncde\n\nf"));
        assert_eq!(LineIndex::from_lines::<&str>(&[]), LineIndex::from_text(""));
    }

    #[test]
    fn coord_deserializes_both_shapes() {
        let flat: Coord = serde_json::from_str("4").unwrap();
        let row_col: Coord = serde_json::from_str(r#"{"row":1,"col":2}"#).unwrap();
        assert_eq!(flat, Coord::Flat(4));
        assert_eq!(row_col, Coord::RowCol(RowCol::new(1, 2)));

        let index = LineIndex::from_text("abc\ndef");
        assert_eq!(index.resolve(flat), 4);
        assert_eq!(index.resolve(row_col), 6);
        assert_eq!(index.resolve(Coord::Flat(100)), 7);
    }

    #[test]
    fn coord_follows_addressing() {
        let index = LineIndex::from_text("ab
cd");
        assert_eq!(index.coord(4, Addressing::Flat), Coord::Flat(4));
        assert_eq!(index.coord(4, Addressing::RowCol), Coord::RowCol(RowCol::new(1, 1)));
        assert_eq!(index.coord(99, Addressing::Flat), Coord::Flat(5));
        assert_eq!(index.resolve(index.coord(3, Addressing::RowCol)), 3);
    }
}

//! 読み取り専用ミラー表示
//!
//! 非表示の入力プロキシでキーを受け取り、文書そのものは行番号付きの
//! 編集不可レイヤーとして描く統合形態のための描画データ。

use crate::snapshot::DocumentSnapshot;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

/// ミラー表示の1行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorLine {
    /// 行番号（1ベース）
    pub number: usize,
    pub text: String,
    /// キャレットの表示セル位置（この行にある場合）
    pub caret: Option<usize>,
    /// 選択されている列範囲（文字単位、終端は含まない）
    pub selected: Option<(usize, usize)>,
}

/// スナップショットを行単位の描画データへ変換
pub fn render(snapshot: &DocumentSnapshot) -> Vec<MirrorLine> {
    let index = snapshot.line_index();
    let caret = index.to_row_col(snapshot.cursor());
    let selection = snapshot
        .visible_selection()
        .map(|span| (index.to_row_col(span.start), index.to_row_col(span.end)));

    snapshot
        .lines()
        .into_iter()
        .enumerate()
        .map(|(row, text)| {
            let caret_cell = (caret.row == row).then(|| display_width(&text, caret.col));
            let selected = selection.and_then(|(start, end)| {
                if row < start.row || row > end.row {
                    return None;
                }
                let from = if row == start.row { start.col } else { 0 };
                let to = if row == end.row {
                    end.col
                } else {
                    text.chars().count()
                };
                Some((from, to))
            });
            MirrorLine {
                number: row + 1,
                text,
                caret: caret_cell,
                selected,
            }
        })
        .collect()
}

/// 行番号欄に必要な桁数
pub fn gutter_width(lines: &[MirrorLine]) -> usize {
    lines.len().max(1).to_string().len()
}

fn display_width(text: &str, col: usize) -> usize {
    let byte = text
        .char_indices()
        .nth(col)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    text[..byte].width()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Selection;

    #[test]
    fn numbers_lines_and_places_caret() {
        let snapshot = DocumentSnapshot::new("ab\ncd", 4, None);
        let lines = render(&snapshot);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].number, 1);
        assert_eq!(lines[0].caret, None);
        assert_eq!(lines[1].caret, Some(1));
    }

    #[test]
    fn caret_uses_display_cells() {
        let snapshot = DocumentSnapshot::new("日本語", 2, None);
        assert_eq!(render(&snapshot)[0].caret, Some(4));
    }

    #[test]
    fn selection_spans_multiple_lines() {
        let snapshot = DocumentSnapshot::new("abc\ndef\nghi", 9, Some(Selection::new(9, 1)));
        let lines = render(&snapshot);
        assert_eq!(lines[0].selected, Some((1, 3)));
        assert_eq!(lines[1].selected, Some((0, 3)));
        assert_eq!(lines[2].selected, Some((0, 1)));
    }

    #[test]
    fn empty_document_has_one_line() {
        let lines = render(&DocumentSnapshot::empty());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].caret, Some(0));
        assert_eq!(gutter_width(&lines), 1);
    }
}

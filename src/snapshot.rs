use crate::coords::{Addressing, LineIndex, RowCol, Selection, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// エンジンから届くスナップショットのワイヤ表現
///
/// 文字オフセット版と行配列版の2種類があり、どちらも受け付ける。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WireSnapshot {
    Linear {
        text: String,
        cursor: usize,
        #[serde(default)]
        selection: Option<(usize, usize)>,
    },
    Lines {
        lines: Vec<String>,
        cursor: RowCol,
        #[serde(default)]
        selection: Option<(RowCol, RowCol)>,
    },
}

/// エンジンが保持する文書の不変コピー
///
/// 正準表現は文字オフセット。行配列は必要に応じて導出する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    text: String,
    len: usize,
    cursor: usize,
    selection: Option<Selection>,
    addressing: Addressing,
}

impl DocumentSnapshot {
    /// 座標を `[0, len]` にクランプして作成
    pub fn new(text: impl Into<String>, cursor: usize, selection: Option<Selection>) -> Self {
        let text = text.into();
        let len = text.chars().count();
        Self {
            cursor: cursor.min(len),
            selection: selection.map(|sel| sel.clamped(len)),
            len,
            text,
            addressing: Addressing::Flat,
        }
    }

    /// エンジンが使う座標方式を設定
    pub fn with_addressing(mut self, addressing: Addressing) -> Self {
        self.addressing = addressing;
        self
    }

    pub fn empty() -> Self {
        Self::new(String::new(), 0, None)
    }

    pub fn from_wire(wire: WireSnapshot) -> Self {
        match wire {
            WireSnapshot::Linear {
                text,
                cursor,
                selection,
            } => Self::new(
                text,
                cursor,
                selection.map(|(anchor, active)| Selection::new(anchor, active)),
            ),
            WireSnapshot::Lines {
                lines,
                cursor,
                selection,
            } => {
                let index = LineIndex::from_lines(&lines);
                let cursor = index.to_flat(cursor);
                let selection = selection.map(|(anchor, active)| {
                    Selection::new(index.to_flat(anchor), index.to_flat(active))
                });
                Self::new(lines.join("\n"), cursor, selection).with_addressing(Addressing::RowCol)
            }
        }
    }

    /// 受け取った時と同じ形のワイヤ表現へ戻す
    pub fn to_wire(&self) -> WireSnapshot {
        match self.addressing {
            Addressing::Flat => WireSnapshot::Linear {
                text: self.text.clone(),
                cursor: self.cursor,
                selection: self.selection.map(|sel| (sel.anchor, sel.active)),
            },
            Addressing::RowCol => {
                let index = self.line_index();
                WireSnapshot::Lines {
                    lines: self.lines(),
                    cursor: index.to_row_col(self.cursor),
                    selection: self.selection.map(|sel| {
                        (index.to_row_col(sel.anchor), index.to_row_col(sel.active))
                    }),
                }
            }
        }
    }

    pub fn addressing(&self) -> Addressing {
        self.addressing
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// 文字数
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// 表示上の選択範囲があればそれを返す（両端が同じ選択は無視）
    pub fn visible_selection(&self) -> Option<Span> {
        self.selection
            .filter(|sel| !sel.is_collapsed())
            .map(|sel| sel.span())
    }

    /// 正規化した範囲（選択がなければカーソル位置の空範囲）
    pub fn span(&self) -> Span {
        self.visible_selection()
            .unwrap_or_else(|| Span::caret(self.cursor))
    }

    pub fn lines(&self) -> Vec<String> {
        self.text.split('\n').map(|line| line.to_string()).collect()
    }

    pub fn line_index(&self) -> LineIndex {
        LineIndex::from_text(&self.text)
    }

    pub fn status(&self) -> StatusLine {
        let pos = self.line_index().to_row_col(self.cursor);
        StatusLine {
            line: pos.row,
            column: pos.col,
            selection: self.visible_selection(),
            chars: self.len,
        }
    }
}

impl From<WireSnapshot> for DocumentSnapshot {
    fn from(wire: WireSnapshot) -> Self {
        Self::from_wire(wire)
    }
}

/// ステータス表示用の情報
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatusLine {
    /// 行番号（0ベース）
    pub line: usize,
    /// 列番号（0ベース、文字単位）
    pub column: usize,
    pub selection: Option<Span>,
    pub chars: usize,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ln {}, Col {}", self.line + 1, self.column + 1)?;
        if let Some(span) = self.selection {
            write!(f, " ({} selected)", span.len())?;
        }
        Ok(())
    }
}

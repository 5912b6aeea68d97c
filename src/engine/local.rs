//! ループバックエンジン
//!
//! バックエンドを持たないホストやテストのための参照実装。
//! バッファは文字単位で保持し、応答は次回の `poll` で返す。

use super::{Direction, EngineMessage, EngineRequest, EngineResponse, EngineTransport, RequestId};
use crate::coords::{Addressing, Coord, LineIndex, RowCol, Selection};
use crate::error::Result;
use crate::snapshot::{DocumentSnapshot, WireSnapshot};
use std::collections::VecDeque;

/// メモリ上のテキストバッファエンジン
#[derive(Debug, Clone)]
pub struct LocalEngine {
    buffer: Vec<char>,
    cursor: usize,
    selection: Option<Selection>,
    platform: String,
    addressing: Addressing,
}

impl Default for LocalEngine {
    fn default() -> Self {
        Self::new("")
    }
}

impl LocalEngine {
    pub fn new(initial: &str) -> Self {
        Self {
            buffer: initial.chars().collect(),
            cursor: 0,
            selection: None,
            platform: std::env::consts::OS.to_string(),
            addressing: Addressing::Flat,
        }
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// スナップショットを行配列形式で返すエンジンとして振る舞う
    pub fn with_addressing(mut self, addressing: Addressing) -> Self {
        self.addressing = addressing;
        self
    }

    pub fn text(&self) -> String {
        self.buffer.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn snapshot(&self) -> WireSnapshot {
        DocumentSnapshot::new(self.text(), self.cursor, self.selection)
            .with_addressing(self.addressing)
            .to_wire()
    }

    /// 要求を処理して応答を返す
    pub fn handle(&mut self, request: &EngineRequest) -> Result<EngineResponse> {
        match request {
            EngineRequest::FetchInitialState => {}
            EngineRequest::InsertText { text } => self.insert_text(text),
            EngineRequest::InsertNewline => self.insert_text("\n"),
            EngineRequest::DeleteBackward => self.delete_backward(),
            EngineRequest::SetCursor { pos } => {
                let pos = self.resolve(*pos);
                self.set_cursor(pos);
            }
            EngineRequest::UpdateSelection { start, end } => {
                let anchor = self.resolve(*start);
                let active = self.resolve(*end);
                self.update_selection(anchor, active);
            }
            EngineRequest::MoveCursor { direction } => self.move_cursor(*direction),
            EngineRequest::QueryPlatform => {
                return Ok(EngineResponse::Platform(self.platform.clone()));
            }
        }
        Ok(EngineResponse::Snapshot(self.snapshot()))
    }

    /// カーソル位置に挿入（選択範囲があれば置き換え）
    pub fn insert_text(&mut self, text: &str) {
        let pos = self.take_selection().unwrap_or(self.cursor);
        let inserted: Vec<char> = text.chars().collect();
        let count = inserted.len();
        self.buffer.splice(pos..pos, inserted);
        self.cursor = pos + count;
    }

    /// 選択範囲、またはカーソル直前の1文字を削除
    pub fn delete_backward(&mut self) {
        if let Some(pos) = self.take_selection() {
            self.cursor = pos;
        } else if self.cursor > 0 {
            self.cursor -= 1;
            self.buffer.remove(self.cursor);
        }
    }

    pub fn set_cursor(&mut self, pos: usize) {
        self.cursor = pos.min(self.buffer.len());
        self.selection = None;
    }

    /// 選択を設定（向きは保持し、カーソルは `active` 側）
    pub fn update_selection(&mut self, anchor: usize, active: usize) {
        let len = self.buffer.len();
        let selection = Selection::new(anchor, active).clamped(len);
        self.cursor = selection.active;
        self.selection = if selection.is_collapsed() {
            None
        } else {
            Some(selection)
        };
    }

    pub fn move_cursor(&mut self, direction: Direction) {
        let len = self.buffer.len();
        self.selection = None;
        match direction {
            Direction::Left => self.cursor = self.cursor.saturating_sub(1),
            Direction::Right => self.cursor = (self.cursor + 1).min(len),
            Direction::Up | Direction::Down => {
                let index = LineIndex::from_text(&self.text());
                let pos = index.to_row_col(self.cursor);
                let target = match direction {
                    Direction::Up if pos.row == 0 => return,
                    Direction::Up => pos.row - 1,
                    _ if pos.row + 1 >= index.line_count() => return,
                    _ => pos.row + 1,
                };
                self.cursor = index.to_flat(RowCol::new(target, pos.col));
            }
        }
    }

    fn resolve(&self, coord: Coord) -> usize {
        match coord {
            Coord::Flat(offset) => offset.min(self.buffer.len()),
            Coord::RowCol(_) => LineIndex::from_text(&self.text()).resolve(coord),
        }
    }

    /// 空でない選択範囲を削除してその開始位置を返す
    fn take_selection(&mut self) -> Option<usize> {
        let span = self.selection.take()?.span();
        if span.is_empty() {
            return None;
        }
        self.buffer.drain(span.start..span.end);
        Some(span.start)
    }
}

/// `LocalEngine` を包む通信路
#[derive(Debug, Default)]
pub struct LoopbackTransport {
    engine: LocalEngine,
    inbox: VecDeque<EngineMessage>,
    sent: Vec<EngineRequest>,
}

impl LoopbackTransport {
    pub fn new(engine: LocalEngine) -> Self {
        Self {
            engine,
            inbox: VecDeque::new(),
            sent: Vec::new(),
        }
    }

    pub fn engine(&self) -> &LocalEngine {
        &self.engine
    }

    /// 別の経路からの編集を再現するためにエンジンを直接操作する
    pub fn engine_mut(&mut self) -> &mut LocalEngine {
        &mut self.engine
    }

    /// 現在の文書を更新通知として配信
    pub fn push_update(&mut self) {
        self.inbox
            .push_back(EngineMessage::DocumentUpdated(self.engine.snapshot()));
    }

    /// これまでに受け取った要求
    pub fn sent(&self) -> &[EngineRequest] {
        &self.sent
    }
}

impl EngineTransport for LoopbackTransport {
    fn send(&mut self, id: RequestId, request: EngineRequest) -> Result<()> {
        let result = self.engine.handle(&request);
        self.sent.push(request);
        self.inbox.push_back(EngineMessage::Reply { id, result });
        Ok(())
    }

    fn poll(&mut self) -> Option<EngineMessage> {
        self.inbox.pop_front()
    }
}

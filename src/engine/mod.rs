//! エンジンとのインターフェース
//!
//! 権威を持つテキストバッファエンジンへ送る要求と、その応答・通知の型。
//! 1つの要求に対して1つの応答が返る。

pub mod local;

pub use local::{LocalEngine, LoopbackTransport};

use crate::coords::Coord;
use crate::error::Result;
use crate::snapshot::WireSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 要求の識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// カーソル移動の方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// エンジンへの要求
///
/// ワイヤ上では `{"command": "insert_at_cursor", "text": "a"}` の形になる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EngineRequest {
    #[serde(rename = "get_editor_state")]
    FetchInitialState,
    #[serde(rename = "insert_at_cursor")]
    InsertText { text: String },
    InsertNewline,
    #[serde(rename = "delete_at_cursor")]
    DeleteBackward,
    SetCursor { pos: Coord },
    UpdateSelection { start: Coord, end: Coord },
    MoveCursor { direction: Direction },
    #[serde(rename = "get_platform")]
    QueryPlatform,
}

impl EngineRequest {
    /// ログ用の短い名前
    pub fn name(&self) -> &'static str {
        match self {
            EngineRequest::FetchInitialState => "get_editor_state",
            EngineRequest::InsertText { .. } => "insert_at_cursor",
            EngineRequest::InsertNewline => "insert_newline",
            EngineRequest::DeleteBackward => "delete_at_cursor",
            EngineRequest::SetCursor { .. } => "set_cursor",
            EngineRequest::UpdateSelection { .. } => "update_selection",
            EngineRequest::MoveCursor { .. } => "move_cursor",
            EngineRequest::QueryPlatform => "get_platform",
        }
    }
}

/// エンジンからの応答
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EngineResponse {
    Snapshot(WireSnapshot),
    Platform(String),
    /// スナップショットを返さない要求への応答
    Ack,
}

/// エンジンから届くメッセージ
#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    /// 要求に対する応答
    Reply {
        id: RequestId,
        result: Result<EngineResponse>,
    },
    /// エンジン起点の文書更新通知
    DocumentUpdated(WireSnapshot),
}

/// エンジンとの通信路
///
/// 呼び出しはすべて UI スレッドから行われ、応答は `poll` で非同期に受け取る。
pub trait EngineTransport {
    /// 要求の送信を開始する
    fn send(&mut self, id: RequestId, request: EngineRequest) -> Result<()>;

    /// 届いているメッセージを1つ取り出す
    fn poll(&mut self) -> Option<EngineMessage>;
}

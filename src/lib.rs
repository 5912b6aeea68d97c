//! surface-sync - 編集面と権威テキストエンジンの同期レイヤー
//!
//! テキスト本体、キャレット、選択範囲の3つを一致させ続ける。
//! テキストの変更はすべてエンジン側で行い、このクレートは
//! 位置の変換、入力のコマンド化、スナップショットの反映だけを担う。

// コアモジュール
pub mod error;
pub mod options;
pub mod trace;

// データ層
pub mod coords;
pub mod snapshot;

// 表示面
pub mod surface;
pub mod translate;
pub mod mirror;

// 入力とエンジン
pub mod engine;
pub mod input;

// 同期
pub mod sync;

// 公開API
pub use coords::{Addressing, Coord, LineIndex, RowCol, Selection, Span};
pub use engine::{EngineRequest, EngineResponse, EngineTransport, LocalEngine, LoopbackTransport};
pub use error::{Result, SyncError};
pub use input::{KeyAction, KeyInput, Platform};
pub use options::{OptionOverrides, SyncOptions};
pub use snapshot::{DocumentSnapshot, StatusLine, WireSnapshot};
pub use surface::{DomTree, Surface};
pub use sync::SurfaceSession;

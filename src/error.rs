//! エラーハンドリング
//!
//! 同期レイヤー全体で使用するエラー型を定義する。
//! 位置変換の境界ケースはエラーにせずクランプで解決し、
//! バックエンド通信の失敗だけがここに現れる。

use thiserror::Error;

/// 同期レイヤーのエラー型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// エンジンとの通信失敗
    #[error("Transport failure: {message}")]
    Transport { message: String },

    /// エンジンが操作を拒否した
    #[error("Backend rejected the request: {message}")]
    Backend { message: String },

    /// 入力イベントの変換エラー
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// 設定エラー
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// トレース出力の失敗
    #[error("Trace output failed: {message}")]
    Trace { message: String },
}

/// 入力処理固有のエラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("Unsupported key: {0}")]
    UnsupportedKey(String),

    #[error("Empty key payload")]
    EmptyKey,
}

/// 設定固有のエラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// エラーレベル分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLevel {
    Warning,
    Error,
}

impl SyncError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// ログ出力時のレベル
    ///
    /// 利用者が同じキーを押し直せば回復できるものは警告扱い。
    pub fn level(&self) -> ErrorLevel {
        match self {
            SyncError::Transport { .. } | SyncError::Backend { .. } | SyncError::Input(_) => {
                ErrorLevel::Warning
            }
            SyncError::Config(_) | SyncError::Trace { .. } => {
                ErrorLevel::Error
            }
        }
    }

    /// `log` クレートに渡すレベル
    pub fn log_level(&self) -> log::Level {
        match self.level() {
            ErrorLevel::Warning => log::Level::Warn,
            ErrorLevel::Error => log::Level::Error,
        }
    }
}

/// Result型のエイリアス
pub type Result<T> = std::result::Result<T, SyncError>;

//! 入力分類
//!
//! 生のキー入力を閉じた編集コマンド集合へ分類する。

pub mod keymap;

pub use keymap::KeyInput;

use crate::engine::Direction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

/// コマンド修飾キーを決めるためのプラットフォーム
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
    Unknown,
}

impl Platform {
    /// エンジンが返すプラットフォーム識別子を解釈
    pub fn from_identifier(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "macos" | "darwin" | "ios" | "mac" => Platform::MacOs,
            "windows" | "win32" => Platform::Windows,
            "linux" | "android" => Platform::Linux,
            _ => Platform::Unknown,
        }
    }

    /// アプリケーションコマンドに使う修飾キー（macOS は Cmd、それ以外は Ctrl）
    pub fn command_modifier(self) -> KeyModifiers {
        match self {
            Platform::MacOs => KeyModifiers::SUPER,
            _ => KeyModifiers::CONTROL,
        }
    }
}

/// テキストを変更する編集コマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    InsertText(String),
    InsertNewline,
    DeleteBackward,
}

/// ネイティブのキャレット移動に任せるキー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

impl NavKey {
    /// エンジン側のカーソル移動方向（Home/End には対応する方向がない）
    pub fn direction(self) -> Option<Direction> {
        match self {
            NavKey::Left => Some(Direction::Left),
            NavKey::Right => Some(Direction::Right),
            NavKey::Up => Some(Direction::Up),
            NavKey::Down => Some(Direction::Down),
            NavKey::Home | NavKey::End => None,
        }
    }
}

/// バッファ変更ではないアプリケーションレベルのコマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Save,
    Open,
    Other(char),
}

/// キー入力の分類結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Edit(EditCommand),
    Navigate(NavKey),
    App(AppCommand),
    /// エンジンを経由しないネイティブ編集を止めるだけのキー
    Block,
    Ignore,
}

impl KeyAction {
    /// ブラウザ既定動作を抑止すべきかどうか
    pub fn prevents_default(&self) -> bool {
        matches!(self, KeyAction::Edit(_) | KeyAction::App(_) | KeyAction::Block)
    }
}

/// キーイベントを分類する
pub fn classify(event: &KeyEvent, platform: Platform, soft_tab: &str) -> KeyAction {
    if let Some(nav) = nav_key(event.code) {
        return KeyAction::Navigate(nav);
    }

    let modifiers = event.modifiers;
    // Windows の AltGr は Ctrl+Alt として届き、key には入力される文字が入る
    if platform != Platform::MacOs
        && modifiers.contains(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        if let KeyCode::Char(ch) = event.code {
            if !ch.is_control() {
                return KeyAction::Edit(EditCommand::InsertText(ch.to_string()));
            }
        }
    }

    if modifiers.contains(platform.command_modifier()) {
        return match event.code {
            KeyCode::Char(ch) => KeyAction::App(app_command(ch)),
            code if edits_natively(code) => KeyAction::Block,
            _ => KeyAction::Ignore,
        };
    }

    if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER) {
        return if edits_natively(event.code) {
            KeyAction::Block
        } else {
            KeyAction::Ignore
        };
    }

    match event.code {
        KeyCode::Char(ch) if !ch.is_control() => {
            KeyAction::Edit(EditCommand::InsertText(ch.to_string()))
        }
        KeyCode::Enter => KeyAction::Edit(EditCommand::InsertNewline),
        KeyCode::Backspace => KeyAction::Edit(EditCommand::DeleteBackward),
        KeyCode::Tab => KeyAction::Edit(EditCommand::InsertText(soft_tab.to_string())),
        // 前方削除に対応するエンジンコマンドはない
        KeyCode::Delete => KeyAction::Block,
        _ => KeyAction::Ignore,
    }
}

/// ブラウザの既定動作がテキストを書き換えるキー
fn edits_natively(code: KeyCode) -> bool {
    matches!(
        code,
        KeyCode::Char(_) | KeyCode::Backspace | KeyCode::Delete | KeyCode::Enter
    )
}

fn nav_key(code: KeyCode) -> Option<NavKey> {
    match code {
        KeyCode::Left => Some(NavKey::Left),
        KeyCode::Right => Some(NavKey::Right),
        KeyCode::Up => Some(NavKey::Up),
        KeyCode::Down => Some(NavKey::Down),
        KeyCode::Home => Some(NavKey::Home),
        KeyCode::End => Some(NavKey::End),
        _ => None,
    }
}

fn app_command(ch: char) -> AppCommand {
    match ch.to_ascii_lowercase() {
        's' => AppCommand::Save,
        'o' => AppCommand::Open,
        other => AppCommand::Other(other),
    }
}

use crate::error::InputError;
use crossterm::event::{KeyCode as CrosstermKeyCode, KeyEvent, KeyModifiers as CrosstermModifiers};
use serde::{Deserialize, Serialize};

/// ブラウザの keydown イベントから取り出したキー情報
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct KeyInput {
    /// `KeyboardEvent.key` の値（例: `"a"`, `"Enter"`, `"ArrowLeft"`）
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub meta: bool,
}

impl KeyInput {
    /// 修飾キーなしのキー
    pub fn plain(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    /// crossterm のキーイベントへ正規化
    pub fn to_key_event(&self) -> Result<KeyEvent, InputError> {
        let code = parse_key_code(&self.key)?;
        let mut modifiers = CrosstermModifiers::empty();
        if self.ctrl {
            modifiers |= CrosstermModifiers::CONTROL;
        }
        if self.alt {
            modifiers |= CrosstermModifiers::ALT;
        }
        if self.shift {
            modifiers |= CrosstermModifiers::SHIFT;
        }
        if self.meta {
            modifiers |= CrosstermModifiers::SUPER;
        }
        Ok(KeyEvent::new(code, modifiers))
    }
}

fn parse_key_code(raw: &str) -> Result<CrosstermKeyCode, InputError> {
    if raw.is_empty() {
        return Err(InputError::EmptyKey);
    }

    let mut chars = raw.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        return Ok(CrosstermKeyCode::Char(ch));
    }

    let code = match raw.to_ascii_lowercase().as_str() {
        "enter" => CrosstermKeyCode::Enter,
        "backspace" => CrosstermKeyCode::Backspace,
        "delete" => CrosstermKeyCode::Delete,
        "tab" => CrosstermKeyCode::Tab,
        "escape" | "esc" => CrosstermKeyCode::Esc,
        "arrowup" | "up" => CrosstermKeyCode::Up,
        "arrowdown" | "down" => CrosstermKeyCode::Down,
        "arrowleft" | "left" => CrosstermKeyCode::Left,
        "arrowright" | "right" => CrosstermKeyCode::Right,
        "home" => CrosstermKeyCode::Home,
        "end" => CrosstermKeyCode::End,
        "pageup" => CrosstermKeyCode::PageUp,
        "pagedown" => CrosstermKeyCode::PageDown,
        _ => return Err(InputError::UnsupportedKey(raw.to_string())),
    };

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_simple_key() {
        let event = KeyInput::plain("a").to_key_event().unwrap();
        assert_eq!(event.code, CrosstermKeyCode::Char('a'));
        assert!(event.modifiers.is_empty());
    }

    #[test]
    fn converts_non_ascii_character() {
        let event = KeyInput::plain("é").to_key_event().unwrap();
        assert_eq!(event.code, CrosstermKeyCode::Char('é'));
    }

    #[test]
    fn converts_browser_key_names() {
        let event = KeyInput::plain("ArrowLeft").with_shift().to_key_event().unwrap();
        assert_eq!(event.code, CrosstermKeyCode::Left);
        assert!(event.modifiers.contains(CrosstermModifiers::SHIFT));
        assert_eq!(
            KeyInput::plain("Home").to_key_event().unwrap().code,
            CrosstermKeyCode::Home
        );
    }

    #[test]
    fn meta_maps_to_super() {
        let event = KeyInput::plain("s").with_meta().to_key_event().unwrap();
        assert!(event.modifiers.contains(CrosstermModifiers::SUPER));
    }

    #[test]
    fn rejects_unknown_key() {
        assert_eq!(
            KeyInput::plain("F13").to_key_event(),
            Err(InputError::UnsupportedKey("F13".into()))
        );
        assert_eq!(KeyInput::plain("").to_key_event(), Err(InputError::EmptyKey));
    }

    #[test]
    fn deserializes_payload_with_defaults() {
        let input: KeyInput = serde_json::from_str(r#"{"key":"x","ctrl":true}"#).unwrap();
        assert_eq!(input, KeyInput::plain("x").with_ctrl());
    }
}

use crate::error::{ConfigError, Result};
use crate::input::Platform;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_TRACE: &str = "SURFACE_SYNC_TRACE";
pub const ENV_TAB_WIDTH: &str = "SURFACE_SYNC_TAB_WIDTH";
pub const ENV_TIMEOUT_MS: &str = "SURFACE_SYNC_TIMEOUT_MS";

const DEFAULT_SOFT_TAB_WIDTH: usize = 2;

/// 同期セッションのオプション
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOptions {
    /// Tab キーで挿入する空白の数
    pub soft_tab_width: usize,
    /// 応答待ちリクエストを破棄するまでの時間（未指定時は無期限に待つ）
    pub command_timeout: Option<Duration>,
    /// JSON Lines トレースの出力先
    pub trace_path: Option<PathBuf>,
    /// エンジンへの問い合わせを省略してプラットフォームを固定する
    pub platform: Option<Platform>,
    /// 読み取り専用ミラー表示を維持するかどうか
    pub mirror: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            soft_tab_width: DEFAULT_SOFT_TAB_WIDTH,
            command_timeout: None,
            trace_path: None,
            platform: None,
            mirror: false,
        }
    }
}

/// 明示的に指定された項目だけを持つ上書き設定
///
/// `None` の項目は元の値を残す。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionOverrides {
    pub soft_tab_width: Option<usize>,
    pub command_timeout: Option<Duration>,
    pub trace_path: Option<PathBuf>,
    pub platform: Option<Platform>,
    pub mirror: Option<bool>,
}

impl OptionOverrides {
    /// 環境変数から上書き設定を読む
    pub fn from_env() -> Result<Self> {
        let mut overrides = Self::default();
        if let Some(path) = env::var_os(ENV_TRACE) {
            overrides.trace_path = Some(PathBuf::from(path));
        }
        if let Ok(raw) = env::var(ENV_TAB_WIDTH) {
            overrides.soft_tab_width = Some(parse_number(ENV_TAB_WIDTH, &raw)?);
        }
        if let Ok(raw) = env::var(ENV_TIMEOUT_MS) {
            let millis = parse_number(ENV_TIMEOUT_MS, &raw)?;
            overrides.command_timeout = Some(Duration::from_millis(millis as u64));
        }
        Ok(overrides)
    }
}

impl SyncOptions {
    /// 既定値に環境変数の上書きを重ねたオプション
    pub fn from_env() -> Result<Self> {
        let options = Self::default().merged_with(&OptionOverrides::from_env()?);
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.soft_tab_width == 0 {
            return Err(ConfigError::InvalidValue {
                key: "soft_tab_width".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Tab キーで挿入する文字列
    pub fn soft_tab(&self) -> String {
        " ".repeat(self.soft_tab_width)
    }

    pub fn with_default_trace(mut self) -> Self {
        if self.trace_path.is_none() {
            self.trace_path = default_trace_path();
        }
        self
    }

    pub fn merged_with(&self, overrides: &OptionOverrides) -> SyncOptions {
        SyncOptions {
            soft_tab_width: overrides.soft_tab_width.unwrap_or(self.soft_tab_width),
            command_timeout: overrides.command_timeout.or(self.command_timeout),
            trace_path: overrides
                .trace_path
                .clone()
                .or_else(|| self.trace_path.clone()),
            platform: overrides.platform.or(self.platform),
            mirror: overrides.mirror.unwrap_or(self.mirror),
        }
    }
}

/// 既定のトレース出力先（`~/.surface-sync/trace.jsonl`）
pub fn default_trace_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".surface-sync").join("trace.jsonl"))
}

fn parse_number(key: &str, raw: &str) -> Result<usize> {
    raw.trim().parse::<usize>().map_err(|_| {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_expand_tab_to_two_spaces() {
        let options = SyncOptions::default();
        assert_eq!(options.soft_tab(), "  ");
        assert!(options.command_timeout.is_none());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn zero_tab_width_is_rejected() {
        let options = SyncOptions {
            soft_tab_width: 0,
            ..SyncOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn merge_prefers_overrides() {
        let base = SyncOptions {
            trace_path: Some(PathBuf::from("base.jsonl")),
            ..SyncOptions::default()
        };
        let overrides = OptionOverrides {
            soft_tab_width: Some(4),
            platform: Some(Platform::MacOs),
            ..OptionOverrides::default()
        };
        let merged = base.merged_with(&overrides);
        assert_eq!(merged.soft_tab_width, 4);
        assert_eq!(merged.platform, Some(Platform::MacOs));
        assert_eq!(merged.trace_path, Some(PathBuf::from("base.jsonl")));
    }

    #[test]
    fn explicit_default_values_still_override() {
        let base = SyncOptions {
            soft_tab_width: 4,
            mirror: true,
            ..SyncOptions::default()
        };
        let overrides = OptionOverrides {
            soft_tab_width: Some(2),
            mirror: Some(false),
            ..OptionOverrides::default()
        };
        let merged = base.merged_with(&overrides);
        assert_eq!(merged.soft_tab_width, 2);
        assert!(!merged.mirror);

        // 何も指定しなければ元のまま
        assert_eq!(base.merged_with(&OptionOverrides::default()), base);
    }

    #[test]
    fn parse_number_reports_key() {
        let err = parse_number(ENV_TAB_WIDTH, "four").unwrap_err();
        assert!(matches!(
            err,
            crate::error::SyncError::Config(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn env_overrides_are_applied() {
        // 環境変数を触るのはこのテストだけ
        env::set_var(ENV_TAB_WIDTH, "4");
        env::set_var(ENV_TIMEOUT_MS, "250");
        env::set_var(ENV_TRACE, "/tmp/surface-sync-trace.jsonl");
        let options = SyncOptions::from_env();

        env::set_var(ENV_TAB_WIDTH, "0");
        let rejected = SyncOptions::from_env();

        env::remove_var(ENV_TAB_WIDTH);
        env::remove_var(ENV_TIMEOUT_MS);
        env::remove_var(ENV_TRACE);

        let options = options.unwrap();
        assert_eq!(options.soft_tab_width, 4);
        assert_eq!(options.command_timeout, Some(Duration::from_millis(250)));
        assert_eq!(
            options.trace_path,
            Some(PathBuf::from("/tmp/surface-sync-trace.jsonl"))
        );
        assert!(rejected.is_err());
    }

    #[test]
    fn default_trace_keeps_explicit_path() {
        let explicit = SyncOptions {
            trace_path: Some(PathBuf::from("mine.jsonl")),
            ..SyncOptions::default()
        };
        assert_eq!(
            explicit.with_default_trace().trace_path,
            Some(PathBuf::from("mine.jsonl"))
        );
        assert_eq!(
            SyncOptions::default().with_default_trace().trace_path,
            default_trace_path()
        );
    }
}

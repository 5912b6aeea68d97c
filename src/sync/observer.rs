//! ユーザー起点の選択変更の検出

use super::SurfaceSession;
use crate::engine::{EngineRequest, EngineTransport};
use crate::input::NavKey;
use crate::surface::Surface;
use crate::translate;

/// 選択の読み取りを引き起こした要因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// 編集面の選択変更通知
    Notification,
    /// マウスボタンの解放（クリック、ドラッグ選択）
    MouseUp,
    /// ナビゲーションキーによるネイティブのキャレット移動
    Navigation(NavKey),
}

impl<S: Surface, T: EngineTransport> SurfaceSession<S, T> {
    /// mouseup を処理する
    pub fn handle_mouse_up(&mut self) {
        self.observe(Trigger::MouseUp);
    }

    /// 現在のネイティブ選択をエンジンへ報告する
    ///
    /// 抑止中、または要求が処理中の間は何もしない。処理中に動いた
    /// ネイティブのキャレットは次に適用するスナップショットで上書きされる。
    pub(super) fn observe(&mut self, trigger: Trigger) {
        if self.echo.is_suppressed() {
            log::trace!("ignoring {trigger:?} while applying a snapshot");
            return;
        }
        if self.is_busy() {
            log::debug!("ignoring {trigger:?} while a request is outstanding");
            return;
        }
        if !self.surface.is_mounted() {
            return;
        }
        let Some(span) = translate::selection_span(&self.surface) else {
            return;
        };
        // known_span はスナップショット適用時にだけ更新する。
        // 報告が失敗しても同じ位置から再報告できる。
        if self.known_span == Some(span) {
            return;
        }

        let Some((start, end)) = translate::selection_coords(&self.surface, self.addressing())
        else {
            return;
        };
        let request = if span.is_empty() {
            EngineRequest::SetCursor { pos: start }
        } else {
            EngineRequest::UpdateSelection { start, end }
        };
        log::trace!("{trigger:?} reports {span:?} as {}", request.name());
        self.enqueue_request(request);
    }
}

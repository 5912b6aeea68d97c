//! スナップショットの適用

use super::{SurfaceSession, Task};
use crate::engine::EngineTransport;
use crate::mirror;
use crate::snapshot::DocumentSnapshot;
use crate::surface::Surface;
use crate::trace::TraceEvent;
use crate::translate;

impl<S: Surface, T: EngineTransport> SurfaceSession<S, T> {
    /// スナップショットを表示面へ反映する
    ///
    /// テキストの書き換えとキャレット移動が発生させる選択変更通知は
    /// 抑止状態のまま処理されるよう、解除タスクをそれらの後ろに積む。
    /// 同じスナップショットを何度適用しても結果は変わらない。
    pub fn apply(&mut self, snapshot: DocumentSnapshot) {
        if self.surface.is_mounted() {
            self.echo.enter();
            self.surface.set_text_content(snapshot.text());
            match snapshot.visible_selection() {
                Some(span) => {
                    translate::to_native_selection(&mut self.surface, span.start, span.end)
                }
                None => translate::to_native_caret(&mut self.surface, snapshot.cursor()),
            }
            self.pump_selection_changes();
            self.tasks.push_back(Task::ReleaseEcho);
        } else {
            log::debug!("surface is not mounted; keeping snapshot for status only");
        }

        self.status = snapshot.status();
        self.known_span = Some(snapshot.span());
        if self.options.mirror {
            self.mirror = Some(mirror::render(&snapshot));
        }
        self.trace(TraceEvent::Apply {
            snapshot: snapshot.to_wire(),
        });
        self.current = Some(snapshot);
    }
}

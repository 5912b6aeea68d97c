//! 同期セッション
//!
//! 1つの編集面と1つのエンジン通信路を結び、入力の分類、要求の直列化、
//! スナップショットの適用、ユーザー起点の選択変更の報告を担う。
//!
//! すべての処理は UI スレッド上の協調的なタスクキューで進む。
//! `run_until_idle` の1回の反復が「次のティック」に相当する。

mod applier;
mod dispatcher;
mod observer;

pub use observer::Trigger;

use crate::coords::{Addressing, Span};
use crate::engine::{EngineMessage, EngineRequest, EngineTransport, RequestId};
use crate::error::{Result, SyncError};
use crate::input::{AppCommand, Platform};
use crate::mirror::MirrorLine;
use crate::options::SyncOptions;
use crate::snapshot::{DocumentSnapshot, StatusLine};
use crate::surface::Surface;
use crate::trace::{TraceEvent, TraceLogger};
use std::collections::VecDeque;
use std::time::Instant;

/// タスクキューの要素
#[derive(Debug)]
enum Task {
    /// 編集面からの選択変更通知
    SelectionChange,
    /// 同期による選択変更の抑止を1段解除
    ReleaseEcho,
    /// ネイティブのキャレット移動後に選択を読み取る
    ObserveSelection(Trigger),
    Engine(EngineMessage),
}

/// 同期処理が引き起こした選択変更を無視するためのガード
///
/// 深さが1以上の間は抑止状態。解除は必ず次のティック以降に行う。
#[derive(Debug, Default)]
struct EchoGuard {
    depth: usize,
}

impl EchoGuard {
    fn enter(&mut self) {
        self.depth += 1;
    }

    fn release(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn is_suppressed(&self) -> bool {
        self.depth > 0
    }
}

/// 応答待ちの要求
#[derive(Debug)]
struct InFlight {
    id: RequestId,
    request: EngineRequest,
    sent_at: Instant,
}

/// 編集面とエンジンの同期セッション
pub struct SurfaceSession<S: Surface, T: EngineTransport> {
    surface: S,
    transport: T,
    options: SyncOptions,
    platform: Platform,
    tasks: VecDeque<Task>,
    echo: EchoGuard,
    in_flight: Option<InFlight>,
    pending: VecDeque<EngineRequest>,
    next_id: u64,
    current: Option<DocumentSnapshot>,
    status: StatusLine,
    /// エンジンが把握している（または報告済みの）正規化範囲
    known_span: Option<Span>,
    mirror: Option<Vec<MirrorLine>>,
    app_commands: Vec<AppCommand>,
    trace: Option<TraceLogger>,
}

impl<S: Surface, T: EngineTransport> SurfaceSession<S, T> {
    pub fn new(surface: S, transport: T, options: SyncOptions) -> Result<Self> {
        options.validate()?;
        let trace = match &options.trace_path {
            Some(path) => Some(TraceLogger::new(path.clone()).map_err(|err| SyncError::Trace {
                message: err.to_string(),
            })?),
            None => None,
        };
        Ok(Self {
            surface,
            transport,
            platform: options.platform.unwrap_or(Platform::Unknown),
            options,
            tasks: VecDeque::new(),
            echo: EchoGuard::default(),
            in_flight: None,
            pending: VecDeque::new(),
            next_id: 1,
            current: None,
            status: StatusLine::default(),
            known_span: None,
            mirror: None,
            app_commands: Vec::new(),
            trace,
        })
    }

    /// 初期状態とプラットフォームを問い合わせる
    pub fn start(&mut self) {
        self.enqueue_request(EngineRequest::FetchInitialState);
        if self.options.platform.is_none() {
            self.enqueue_request(EngineRequest::QueryPlatform);
        }
    }

    /// キューが空になるまでタスクを処理する
    pub fn run_until_idle(&mut self) {
        loop {
            self.pump();
            let Some(task) = self.tasks.pop_front() else {
                break;
            };
            self.run_task(task);
        }
    }

    fn pump(&mut self) {
        self.expire_in_flight();
        self.pump_selection_changes();
        while let Some(message) = self.transport.poll() {
            self.tasks.push_back(Task::Engine(message));
        }
    }

    fn pump_selection_changes(&mut self) {
        for _ in 0..self.surface.drain_selection_changes() {
            self.tasks.push_back(Task::SelectionChange);
        }
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::SelectionChange => self.observe(Trigger::Notification),
            Task::ReleaseEcho => self.echo.release(),
            Task::ObserveSelection(trigger) => self.observe(trigger),
            Task::Engine(message) => self.handle_engine_message(message),
        }
    }

    fn trace(&mut self, event: TraceEvent<'_>) {
        if let Some(logger) = &mut self.trace {
            if let Err(err) = logger.record(&event) {
                log::warn!("trace output to {} failed: {err}", logger.path().display());
            }
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// ユーザー操作（マウス選択やネイティブのキャレット移動）を再現するための可変参照
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// 位置の報告に使う座標方式（最後に適用したスナップショットの形に従う）
    pub fn addressing(&self) -> Addressing {
        self.current
            .as_ref()
            .map(DocumentSnapshot::addressing)
            .unwrap_or_default()
    }

    /// 最後に適用したスナップショット
    pub fn current(&self) -> Option<&DocumentSnapshot> {
        self.current.as_ref()
    }

    pub fn status(&self) -> StatusLine {
        self.status
    }

    /// 読み取り専用ミラー（`options.mirror` が有効な場合のみ）
    pub fn mirror(&self) -> Option<&[MirrorLine]> {
        self.mirror.as_deref()
    }

    /// 同期による選択変更を無視している最中かどうか
    pub fn is_suppressed(&self) -> bool {
        self.echo.is_suppressed()
    }

    /// 応答待ち、または送信待ちの要求があるかどうか
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some() || !self.pending.is_empty()
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight.as_ref().map(|flight| flight.id)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// シェル側で処理するアプリケーションコマンドを取り出す
    pub fn take_app_commands(&mut self) -> Vec<AppCommand> {
        std::mem::take(&mut self.app_commands)
    }

    /// 表示面のテキストが最後のスナップショットと一致しているかどうか
    pub fn is_in_sync(&self) -> bool {
        match &self.current {
            Some(snapshot) => self.surface.text_content() == snapshot.text(),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_guard_nests() {
        let mut guard = EchoGuard::default();
        assert!(!guard.is_suppressed());
        guard.enter();
        guard.enter();
        guard.release();
        assert!(guard.is_suppressed());
        guard.release();
        guard.release();
        assert!(!guard.is_suppressed());
    }
}

//! コマンドの分類と直列化
//!
//! 応答待ちの要求は常に高々1つ。後続の要求は到着順に待機し、
//! 前の応答を適用し終えてから送信する。取りこぼしや合成は行わない。

use super::{InFlight, SurfaceSession, Task, Trigger};
use crate::engine::{EngineMessage, EngineRequest, EngineResponse, EngineTransport, RequestId};
use crate::error::{Result, SyncError};
use crate::input::{classify, EditCommand, KeyAction, KeyInput, Platform};
use crate::snapshot::DocumentSnapshot;
use crate::surface::Surface;
use crate::trace::TraceEvent;
use crossterm::event::KeyEvent;
use std::time::Instant;

impl<S: Surface, T: EngineTransport> SurfaceSession<S, T> {
    /// keydown の生データを処理する
    ///
    /// 戻り値の `prevents_default()` が真ならホストはブラウザ既定動作を抑止する。
    /// 解釈できないキーは無視する。
    pub fn handle_key(&mut self, input: &KeyInput) -> KeyAction {
        match input.to_key_event() {
            Ok(event) => self.handle_key_event(&event),
            Err(err) => {
                let err = SyncError::from(err);
                // 修飾キー単体などは日常的に届くので debug に留める
                log::debug!("ignoring key {:?}: {err}", input.key);
                KeyAction::Ignore
            }
        }
    }

    pub fn handle_key_event(&mut self, event: &KeyEvent) -> KeyAction {
        let soft_tab = self.options.soft_tab();
        let action = classify(event, self.platform, &soft_tab);
        match &action {
            KeyAction::Edit(command) => self.enqueue_request(edit_request(command)),
            KeyAction::Navigate(nav) => {
                if self.options.mirror {
                    // ミラー表示ではネイティブのキャレットがないのでエンジンに移動させる
                    match nav.direction() {
                        Some(direction) => {
                            self.enqueue_request(EngineRequest::MoveCursor { direction })
                        }
                        None => log::debug!("{nav:?} has no engine counterpart in mirror mode"),
                    }
                } else {
                    self.tasks
                        .push_back(Task::ObserveSelection(Trigger::Navigation(*nav)));
                }
            }
            KeyAction::App(command) => {
                log::debug!("application command {command:?}");
                self.app_commands.push(command.clone());
            }
            KeyAction::Block => log::trace!("blocked native edit {:?}", event.code),
            KeyAction::Ignore => {}
        }
        action
    }

    /// 要求を待ち行列に積み、空いていれば送信する
    pub(super) fn enqueue_request(&mut self, request: EngineRequest) {
        self.pending.push_back(request);
        self.dispatch_next();
    }

    fn dispatch_next(&mut self) {
        if self.in_flight.is_some() {
            return;
        }
        while let Some(request) = self.pending.pop_front() {
            let id = RequestId(self.next_id);
            self.next_id += 1;
            match self.transport.send(id, request.clone()) {
                Ok(()) => {
                    self.trace(TraceEvent::Send {
                        id,
                        request: &request,
                    });
                    self.in_flight = Some(InFlight {
                        id,
                        request,
                        sent_at: Instant::now(),
                    });
                    return;
                }
                Err(err) => self.report_failure(id, &request, &err),
            }
        }
    }

    pub(super) fn handle_engine_message(&mut self, message: EngineMessage) {
        match message {
            EngineMessage::DocumentUpdated(wire) => {
                self.apply(DocumentSnapshot::from_wire(wire));
            }
            EngineMessage::Reply { id, result } => {
                let flight = match self.in_flight.take() {
                    Some(flight) if flight.id == id => flight,
                    other => {
                        self.in_flight = other;
                        log::debug!("discarding stale reply {id}");
                        self.trace(TraceEvent::Stale { id });
                        return;
                    }
                };
                self.complete(flight, result);
                self.dispatch_next();
            }
        }
    }

    fn complete(&mut self, flight: InFlight, result: Result<EngineResponse>) {
        match result {
            Ok(EngineResponse::Snapshot(wire)) => self.apply(DocumentSnapshot::from_wire(wire)),
            Ok(EngineResponse::Platform(raw)) => {
                self.platform = Platform::from_identifier(&raw);
                log::debug!("platform {raw:?} -> {:?}", self.platform);
            }
            Ok(EngineResponse::Ack) => {}
            // 楽観的な変更はしていないので巻き戻しは不要
            Err(err) => self.report_failure(flight.id, &flight.request, &err),
        }
    }

    fn report_failure(&mut self, id: RequestId, request: &EngineRequest, err: &SyncError) {
        log::log!(err.log_level(), "{} {id} failed: {err}", request.name());
        self.trace(TraceEvent::Failed {
            id,
            request,
            error: err.to_string(),
        });
    }

    /// タイムアウトを過ぎた応答待ちの要求を破棄する
    pub(super) fn expire_in_flight(&mut self) {
        let Some(timeout) = self.options.command_timeout else {
            return;
        };
        let expired = self
            .in_flight
            .as_ref()
            .is_some_and(|flight| flight.sent_at.elapsed() >= timeout);
        if expired {
            if let Some(flight) = self.in_flight.take() {
                log::warn!(
                    "{} {} timed out after {timeout:?}",
                    flight.request.name(),
                    flight.id
                );
                self.trace(TraceEvent::Timeout {
                    id: flight.id,
                    request: &flight.request,
                });
            }
            self.dispatch_next();
        }
    }

    /// 応答待ちの要求を手動で破棄する（遅れて届いた応答は捨てられる）
    pub fn cancel_in_flight(&mut self) -> Option<RequestId> {
        let flight = self.in_flight.take()?;
        log::debug!("cancelled {} {}", flight.request.name(), flight.id);
        self.trace(TraceEvent::Cancel { id: flight.id });
        self.dispatch_next();
        Some(flight.id)
    }
}

fn edit_request(command: &EditCommand) -> EngineRequest {
    match command {
        EditCommand::InsertText(text) => EngineRequest::InsertText { text: text.clone() },
        EditCommand::InsertNewline => EngineRequest::InsertNewline,
        EditCommand::DeleteBackward => EngineRequest::DeleteBackward,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_commands_map_to_requests() {
        assert_eq!(
            edit_request(&EditCommand::InsertText("  ".into())),
            EngineRequest::InsertText { text: "  ".into() }
        );
        assert_eq!(edit_request(&EditCommand::InsertNewline), EngineRequest::InsertNewline);
        assert_eq!(edit_request(&EditCommand::DeleteBackward), EngineRequest::DeleteBackward);
    }
}

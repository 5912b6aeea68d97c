//! セッショントレース
//!
//! 同期セッションで起きた出来事を1行1レコードの JSON で記録する。
//! 記録には通し番号とロガー作成からの経過ミリ秒が付く。

use crate::engine::{EngineRequest, RequestId};
use crate::snapshot::WireSnapshot;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// トレースに残す出来事
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum TraceEvent<'a> {
    /// 要求を送信した
    Send {
        id: RequestId,
        request: &'a EngineRequest,
    },
    /// スナップショットを表示面へ反映した
    Apply { snapshot: WireSnapshot },
    /// 送信または応答が失敗した
    Failed {
        id: RequestId,
        request: &'a EngineRequest,
        error: String,
    },
    /// 破棄済みの要求への応答を捨てた
    Stale { id: RequestId },
    /// 応答待ちがタイムアウトした
    Timeout {
        id: RequestId,
        request: &'a EngineRequest,
    },
    /// 応答待ちを手動で取り消した
    Cancel { id: RequestId },
}

#[derive(Serialize)]
struct TraceRecord<'e, 'a> {
    seq: u64,
    elapsed_ms: u128,
    #[serde(flatten)]
    event: &'e TraceEvent<'a>,
}

/// JSON Lines 形式のトレース出力
#[derive(Debug)]
pub struct TraceLogger {
    path: PathBuf,
    writer: LineWriter<File>,
    started: Instant,
    seq: u64,
}

impl TraceLogger {
    /// 出力先を開く（親ディレクトリがなければ作成し、既存の内容には追記する）
    pub fn new(path: PathBuf) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: LineWriter::new(file),
            started: Instant::now(),
            seq: 0,
        })
    }

    pub fn record(&mut self, event: &TraceEvent<'_>) -> io::Result<()> {
        self.seq += 1;
        let record = TraceRecord {
            seq: self.seq,
            elapsed_ms: self.started.elapsed().as_millis(),
            event,
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::tempdir;

    fn read_records(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn records_are_numbered_and_tagged() {
        let dir = tempdir().unwrap();
        let mut logger = TraceLogger::new(dir.path().join("nested").join("trace.jsonl")).unwrap();
        let request = EngineRequest::InsertText { text: "a".into() };
        logger
            .record(&TraceEvent::Send {
                id: RequestId(3),
                request: &request,
            })
            .unwrap();
        logger
            .record(&TraceEvent::Apply {
                snapshot: WireSnapshot::Linear {
                    text: "a".into(),
                    cursor: 1,
                    selection: None,
                },
            })
            .unwrap();

        let records = read_records(logger.path());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["tag"], "send");
        assert_eq!(records[0]["seq"], 1);
        assert_eq!(records[0]["id"], 3);
        assert_eq!(records[0]["request"]["command"], "insert_at_cursor");
        assert_eq!(records[1]["tag"], "apply");
        assert_eq!(records[1]["seq"], 2);
        assert_eq!(records[1]["snapshot"]["cursor"], 1);
    }

    #[test]
    fn reopening_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.jsonl");
        for _ in 0..2 {
            let mut logger = TraceLogger::new(path.clone()).unwrap();
            logger.record(&TraceEvent::Cancel { id: RequestId(1) }).unwrap();
        }
        let records = read_records(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["tag"], "cancel");
        assert_eq!(records[1]["seq"], 1);
    }
}

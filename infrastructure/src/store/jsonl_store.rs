//! JSONL file store for chat sessions.
//!
//! Each dispatch is serialized as a single JSON line with a `type` field and
//! `timestamp`, appended to the file via a buffered writer. The same file is
//! read back, newest line first, to rebuild a session's recent history.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use hotbox_application::{ChatRecorder, RecordError};
use hotbox_domain::{ChatTurn, OrchestrationResult, SessionId};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

const RECORD_TYPE: &str = "dispatch";

/// Bytes read per step when scanning the store from its end
const TAIL_BLOCK: u64 = 64 * 1024;

/// One line of the store
#[derive(Debug, Serialize, Deserialize)]
struct ChatRecord {
    #[serde(rename = "type")]
    kind: String,
    timestamp: DateTime<Utc>,
    session_id: SessionId,
    prompt: String,
    result: OrchestrationResult,
}

/// JSONL chat store that appends one JSON object per dispatch.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every record.
pub struct JsonlChatStore {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlChatStore {
    /// Open (or create) the store at the given path.
    ///
    /// Creates parent directories as needed. Returns `None` if the file
    /// cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create chat store directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open chat store {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> Result<(), RecordError> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| RecordError::Serialization("chat store lock poisoned".to_string()))?;
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }
}

#[async_trait]
impl ChatRecorder for JsonlChatStore {
    async fn record(
        &self,
        session: &SessionId,
        result: &OrchestrationResult,
        at: DateTime<Utc>,
    ) -> Result<(), RecordError> {
        let record = ChatRecord {
            kind: RECORD_TYPE.to_string(),
            timestamp: at,
            session_id: session.clone(),
            prompt: result.prompt.clone(),
            result: result.clone(),
        };
        let line = serde_json::to_string(&record)
            .map_err(|e| RecordError::Serialization(e.to_string()))?;
        self.append(&line)?;
        debug!(
            session = %session,
            at = %at.to_rfc3339_opts(SecondsFormat::Millis, true),
            "Recorded dispatch"
        );
        Ok(())
    }

    /// Reads backwards from the end of the file and stops as soon as
    /// `max_turns` turns are collected, so the cost follows the session's
    /// recent activity rather than the size of the whole store. Records
    /// are assumed to be appended in time order.
    async fn history(
        &self,
        session: &SessionId,
        max_turns: usize,
    ) -> Result<Vec<ChatTurn>, RecordError> {
        if max_turns == 0 {
            return Ok(Vec::new());
        }
        let path = self.path.clone();
        let session = session.clone();
        tokio::task::spawn_blocking(move || recent_turns(&path, &session, max_turns))
            .await
            .map_err(|e| RecordError::Io(std::io::Error::other(e)))?
    }
}

/// The last `max_turns` turns of `session`, oldest first
fn recent_turns(
    path: &Path,
    session: &SessionId,
    max_turns: usize,
) -> Result<Vec<ChatTurn>, RecordError> {
    // Lines are written compactly, so a substring check skips other sessions
    // without parsing them
    let marker = format!(
        "\"session_id\":{}",
        serde_json::to_string(session).map_err(|e| RecordError::Serialization(e.to_string()))?
    );

    let mut records = Vec::new();
    let mut collected = 0;
    scan_lines_backwards(path, |line| {
        if !line.contains(&marker) {
            return true;
        }
        match serde_json::from_str::<ChatRecord>(line) {
            Ok(record) if record.kind == RECORD_TYPE && &record.session_id == session => {
                collected += 1 + usize::from(record.result.answer_text().is_some());
                records.push(record);
            }
            Ok(_) => {}
            Err(e) => debug!("Skipping unreadable chat store line: {}", e),
        }
        collected < max_turns
    })?;
    records.sort_by_key(|r| r.timestamp);

    let mut turns = Vec::with_capacity(collected);
    for record in records {
        turns.push(ChatTurn::user(record.prompt));
        if let Some(answer) = record.result.answer_text() {
            turns.push(ChatTurn::assistant(answer));
        }
    }
    let start = turns.len().saturating_sub(max_turns);
    Ok(turns.split_off(start))
}

/// Feed complete lines to `visit`, last line first, until it returns false
fn scan_lines_backwards(path: &Path, mut visit: impl FnMut(&str) -> bool) -> std::io::Result<()> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    let mut pos = file.seek(SeekFrom::End(0))?;
    // Start of a line whose beginning lies in an earlier block
    let mut carry: Vec<u8> = Vec::new();

    while pos > 0 {
        let step = TAIL_BLOCK.min(pos);
        pos -= step;
        file.seek(SeekFrom::Start(pos))?;
        let mut block = vec![0u8; step as usize];
        file.read_exact(&mut block)?;
        block.extend_from_slice(&carry);

        let mut lines: Vec<&[u8]> = block.split(|b| *b == b'\n').collect();
        carry = if pos > 0 {
            lines.remove(0).to_vec()
        } else {
            Vec::new()
        };

        for line in lines.iter().rev() {
            let line = String::from_utf8_lossy(line);
            if line.trim().is_empty() {
                continue;
            }
            if !visit(&line) {
                return Ok(());
            }
        }
    }
    Ok(())
}

impl Drop for JsonlChatStore {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hotbox_domain::{Completion, ErrorKind, ModeKind, Outcome, ProviderId, Role};
    use std::time::Duration;

    fn answered(prompt: &str, answer: &str) -> OrchestrationResult {
        OrchestrationResult::single(
            prompt,
            Outcome::success(
                ProviderId::Gemini,
                Completion::new(answer).with_tokens(9),
                Duration::from_millis(420),
            ),
        )
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[tokio::test]
    async fn test_store_writes_valid_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chats.jsonl");
        let store = JsonlChatStore::open(&path).unwrap();
        let session = SessionId::from("s-1");

        store
            .record(&session, &answered("hi", "hello"), at(0))
            .await
            .unwrap();
        drop(store);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.trim().lines().collect();
        assert_eq!(lines.len(), 1);

        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["type"], "dispatch");
        assert_eq!(value["session_id"], "s-1");
        assert_eq!(value["prompt"], "hi");
        assert!(value.get("timestamp").is_some());
        assert_eq!(value["result"]["outcomes"][0]["latency_ms"], 420);
    }

    #[tokio::test]
    async fn test_history_is_per_session_and_ordered() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlChatStore::open(dir.path().join("nested/chats.jsonl")).unwrap();
        let mine = SessionId::from("mine");
        let other = SessionId::from("other");

        store.record(&mine, &answered("second", "B"), at(20)).await.unwrap();
        store.record(&other, &answered("noise", "X"), at(10)).await.unwrap();
        store.record(&mine, &answered("first", "A"), at(5)).await.unwrap();

        let turns = store.history(&mine, 10).await.unwrap();
        let contents: Vec<&str> = turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "A", "second", "B"]);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_failed_dispatch_has_no_assistant_turn() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlChatStore::open(dir.path().join("chats.jsonl")).unwrap();
        let session = SessionId::from("s");
        let failed = OrchestrationResult::collected(
            ModeKind::Consensus,
            "anyone?",
            vec![Outcome::failure(
                ProviderId::Grok,
                ErrorKind::Timeout,
                "no answer within 30000ms",
                Duration::from_secs(30),
            )],
        );

        store.record(&session, &failed, at(0)).await.unwrap();
        let turns = store.history(&session, 10).await.unwrap();
        assert_eq!(turns, vec![ChatTurn::user("anyone?")]);
    }

    #[tokio::test]
    async fn test_reopen_appends_and_skips_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chats.jsonl");
        let session = SessionId::from("s");

        let store = JsonlChatStore::open(&path).unwrap();
        store.record(&session, &answered("one", "1"), at(0)).await.unwrap();
        drop(store);

        std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .and_then(|mut f| writeln!(f, "not json"))
            .unwrap();

        let store = JsonlChatStore::open(&path).unwrap();
        store.record(&session, &answered("two", "2"), at(1)).await.unwrap();

        let turns = store.history(&session, 10).await.unwrap();
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[2].content, "two");
    }

    #[tokio::test]
    async fn test_history_keeps_only_recent_turns() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlChatStore::open(dir.path().join("chats.jsonl")).unwrap();
        let session = SessionId::from("s");
        let other = SessionId::from("o");

        for i in 0..50 {
            let prompt = format!("q{}", i);
            let answer = format!("a{}", i);
            store
                .record(&session, &answered(&prompt, &answer), at(i))
                .await
                .unwrap();
            store
                .record(&other, &answered("noise", "x"), at(i))
                .await
                .unwrap();
        }

        let turns = store.history(&session, 3).await.unwrap();
        let contents: Vec<&str> = turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["a48", "q49", "a49"]);
        assert!(store.history(&session, 0).await.unwrap().is_empty());
    }

    #[test]
    fn test_scan_lines_backwards_across_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.txt");
        let long = "x".repeat(TAIL_BLOCK as usize + 10);
        std::fs::write(&path, format!("first\n{}\nlast\n", long)).unwrap();

        let mut seen = Vec::new();
        scan_lines_backwards(&path, |line| {
            seen.push(line.len());
            true
        })
        .unwrap();
        assert_eq!(seen, vec![4, long.len(), 5]);

        let mut stopped = Vec::new();
        scan_lines_backwards(&path, |line| {
            stopped.push(line.to_string());
            false
        })
        .unwrap();
        assert_eq!(stopped, vec!["last".to_string()]);
    }
}

//! End-to-end tests of the streaming adapter against real processes

use graphlog::graph::{Rows, MARKER};
use graphlog::subprocess::{LogStream, ProcessCommand, Started};
use std::time::Duration;

fn sh(script: String) -> ProcessCommand {
    ProcessCommand::new("sh").args(["-c".to_string(), script])
}

fn revision_loop(count: usize) -> String {
    format!(
        r"i=0; while [ $i -lt {count} ]; do printf '\033[35m○\033[0m  {MARKER}c%d{MARKER}%d{MARKER}false\033[1mc%d\033[0m text\n│  body\n' $i $i $i; i=$((i+1)); done"
    )
}

#[tokio::test]
async fn test_noisy_stderr_does_not_block_output() {
    // far more stderr than a pipe buffer holds, written before any stdout
    let script = format!(
        "i=0; while [ $i -lt 2000 ]; do echo 'warning: something fairly long about line '$i >&2; i=$((i+1)); done; {}",
        revision_loop(10)
    );
    let started = tokio::time::timeout(Duration::from_secs(20), LogStream::spawn(sh(script), 4))
        .await
        .expect("startup should not deadlock")
        .unwrap();
    let Started {
        mut stream,
        warning,
    } = started;
    assert!(warning.is_some());

    let mut rows = Rows::new();
    loop {
        let batch = stream.request_more().await;
        assert!(batch.rows.len() <= 4);
        rows.extend(batch.rows);
        if !batch.has_more {
            break;
        }
    }
    stream.close().await;

    assert_eq!(rows.len(), 10);
    assert_eq!(rows.position_of("c7"), Some(7));
    let last = rows.get(9).unwrap();
    assert_eq!(rows.previous(last).map(|r| r.commit.commit_id.as_str()), Some("8"));
}

#[tokio::test]
async fn test_rows_resolve_previous_across_batches() {
    let Started { mut stream, .. } = LogStream::spawn(sh(revision_loop(25)), 6)
        .await
        .unwrap();

    let mut rows = Rows::new();
    let mut batches = 0;
    loop {
        let batch = stream.request_more().await;
        batches += 1;
        rows.extend(batch.rows);
        if !batch.has_more {
            break;
        }
    }
    stream.close().await;

    assert_eq!(rows.len(), 25);
    assert!(batches >= 5);
    for row in rows.iter().skip(1) {
        let previous = rows.previous(row).unwrap();
        assert_eq!(previous.index + 1, row.index);
        assert_eq!(row.lines.len(), 2);
        assert_eq!(row.lines[1].gutter.text(), "│");
    }
}

#[tokio::test]
async fn test_dropping_stream_without_close() {
    let script = format!("while true; do {}; done", revision_loop(1));
    let Started { mut stream, .. } = LogStream::spawn(sh(script), 2).await.unwrap();
    assert_eq!(stream.request_more().await.rows.len(), 2);
    drop(stream);
}

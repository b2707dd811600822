//! Integration tests for betwire.
//!
//! Each test runs the full client against an in-process TCP server speaking
//! the same newline-framed protocol.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use betwire::{Client, ClientConfig, SessionOutcome, SourceConfig};

/// Accept one connection and answer every message: acknowledgements for
/// batches, the winners announcement once the query shows up.
async fn spawn_server(winners_reply: &'static str) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut lines = BufReader::new(read_half).lines();
        let mut received = Vec::new();

        while let Ok(Some(msg)) = lines.next_line().await {
            let is_query = msg.contains("GANADORES");
            let records = msg.matches("APUESTA|").count();
            received.push(msg);

            if records > 0 {
                let ack = format!("CONFIRMARAPUESTA|{records}\n");
                write_half.write_all(ack.as_bytes()).await.unwrap();
            }
            if is_query {
                write_half
                    .write_all(format!("{winners_reply}\n").as_bytes())
                    .await
                    .unwrap();
                break;
            }
        }
        received
    });

    (addr, handle)
}

fn write_records(n: usize) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for i in 0..n {
        writeln!(file, "First{i},Last{i},{i},2000-01-01,{i}").unwrap();
    }
    file.flush().unwrap();
    file
}

fn config(addr: String, path: std::path::PathBuf, batch_max_amount: usize) -> ClientConfig {
    ClientConfig {
        client_id: "1".to_string(),
        server_address: addr,
        batch_max_amount,
        source: SourceConfig::Plain { path },
        grace_period_ms: None,
    }
}

#[tokio::test]
async fn test_full_submission_reports_winner_count() {
    let (addr, server) = spawn_server("GANADORES|111|222|333").await;
    let records = write_records(12);

    let client = Client::new(config(addr, records.path().to_path_buf(), 5)).unwrap();
    let cancel = CancellationToken::new();

    let outcome = client.run(&cancel).await.unwrap();
    assert_eq!(outcome, SessionOutcome::Completed { winners: 3 });

    let received = server.await.unwrap();
    assert_eq!(received.len(), 3);
    assert!(received[0].ends_with(";FINAPUESTA"));
    assert!(received[1].ends_with(";FINAPUESTA"));
    assert!(received[2].ends_with(";FINAPUESTA;GANADORES|1"));
}

#[tokio::test]
async fn test_empty_source_sends_only_the_query() {
    let (addr, server) = spawn_server("GANADORES|").await;
    let records = write_records(0);

    let client = Client::new(config(addr, records.path().to_path_buf(), 5)).unwrap();
    let cancel = CancellationToken::new();

    let outcome = client.run(&cancel).await.unwrap();
    assert_eq!(outcome, SessionOutcome::Completed { winners: 0 });

    let received = server.await.unwrap();
    assert_eq!(received, vec!["GANADORES|1".to_string()]);
}

#[tokio::test]
async fn test_archive_source_submits_matching_entries() {
    let (addr, server) = spawn_server("GANADORES|7").await;

    let archive = tempfile::NamedTempFile::new().unwrap();
    let mut writer = zip::ZipWriter::new(archive.reopen().unwrap());
    let options = zip::write::SimpleFileOptions::default();
    writer.start_file("agency-1-a.csv", options).unwrap();
    writer.write_all(b"Ana,Gomez,111,1990-01-01,10\n").unwrap();
    writer.start_file("agency-2.csv", options).unwrap();
    writer.write_all(b"Other,Agency,999,1990-01-01,99\n").unwrap();
    writer.finish().unwrap();

    let mut cfg = config(addr, archive.path().to_path_buf(), 5);
    cfg.source = SourceConfig::Archive {
        path: archive.path().to_path_buf(),
    };

    let client = Client::new(cfg).unwrap();
    let cancel = CancellationToken::new();

    let outcome = client.run(&cancel).await.unwrap();
    assert_eq!(outcome, SessionOutcome::Completed { winners: 1 });

    let received = server.await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].starts_with("APUESTA|1|Ana|Gomez|111|"));
    assert!(!received[0].contains("Other"));
}

#[tokio::test]
async fn test_connect_failure_is_a_clean_error() {
    let records = write_records(1);
    // Bind-then-drop leaves a port nothing is listening on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let client = Client::new(config(addr, records.path().to_path_buf(), 5)).unwrap();
    let cancel = CancellationToken::new();

    let err = client.run(&cancel).await.unwrap_err();
    assert!(matches!(err, betwire::BetwireError::Connect { .. }));
}

#[tokio::test]
async fn test_pre_cancelled_run_ends_gracefully() {
    let (addr, server) = spawn_server("GANADORES|").await;
    let records = write_records(10);

    let client = Client::new(config(addr, records.path().to_path_buf(), 5)).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = client.run(&cancel).await.unwrap();
    assert_eq!(outcome, SessionOutcome::Cancelled);

    server.abort();
    let received = server.await;
    // The server saw the connection but never a message.
    assert!(received.is_err() || received.unwrap().is_empty());
}

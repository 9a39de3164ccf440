// tests/buffer.rs

use std::collections::HashMap;
use std::error::Error;

use zedamigo_exec::exec::SharedBuffer;

type TestResult = Result<(), Box<dyn Error>>;

const WRITERS: usize = 8;
const WRITES: usize = 1000;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_and_snapshots() -> TestResult {
    let buf = SharedBuffer::new();

    let mut writers = Vec::new();
    for id in 0..WRITERS {
        let buf = buf.clone();
        writers.push(tokio::spawn(async move {
            let record = [b'a' + id as u8];
            for n in 0..WRITES {
                buf.write(&record);
                if n % 100 == 0 {
                    tokio::task::yield_now().await;
                }
            }
        }));
    }

    let reader = {
        let buf = buf.clone();
        tokio::spawn(async move {
            let mut last = 0;
            for _ in 0..200 {
                let snap = buf.snapshot();
                // Snapshots only ever grow and never contain foreign bytes.
                assert!(snap.len() >= last);
                assert!(snap.iter().all(|b| (b'a'..b'a' + WRITERS as u8).contains(b)));
                last = snap.len();
                tokio::task::yield_now().await;
            }
        })
    };

    for writer in writers {
        writer.await?;
    }
    reader.await?;

    let snap = buf.snapshot();
    assert_eq!(snap.len(), WRITERS * WRITES);
    assert_eq!(buf.len(), WRITERS * WRITES);

    let mut counts: HashMap<u8, usize> = HashMap::new();
    for b in &snap {
        *counts.entry(*b).or_default() += 1;
    }
    assert_eq!(counts.len(), WRITERS);
    assert!(counts.values().all(|&c| c == WRITES));

    Ok(())
}

#[test]
fn snapshot_is_a_copy() {
    let buf = SharedBuffer::new();
    assert!(buf.is_empty());

    buf.write(b"hello ");
    let snap = buf.snapshot();
    buf.write(b"world");

    assert_eq!(snap, b"hello ");
    assert_eq!(buf.to_string_lossy(), "hello world");
}

use bytes::Bytes;
use futures::{stream, StreamExt};
use tempfile::TempDir;

use shelf_blob::{
    BlobAdapter, BlobConfig, BlobError, BlobPut, BlobStore, ByteRange, ByteStream, FsStore,
};

/// Test factory functions
fn body_of(data: &'static [u8]) -> ByteStream {
    Box::pin(stream::once(async move { Ok(Bytes::from_static(data)) }))
}

fn chunked_body(chunks: Vec<&'static [u8]>) -> ByteStream {
    Box::pin(stream::iter(
        chunks.into_iter().map(|c| Ok(Bytes::from_static(c))),
    ))
}

async fn test_store() -> (TempDir, FsStore) {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());
    store.ensure_root().await.unwrap();
    (dir, store)
}

async fn collect(mut body: impl futures::Stream<Item = std::io::Result<Bytes>> + Unpin) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(chunk) = body.next().await {
        out.extend_from_slice(&chunk.unwrap());
    }
    out
}

async fn names(store: &FsStore) -> Vec<String> {
    let mut names: Vec<String> = store
        .list()
        .await
        .unwrap()
        .filter_map(|entry| async move { entry.ok().map(|f| f.name) })
        .collect()
        .await;
    names.sort();
    names
}

#[tokio::test]
async fn write_then_full_read_round_trips() {
    let (_dir, store) = test_store().await;

    let file = store
        .write("notes.txt", chunked_body(vec![b"hello ", b"shelf", b"!"]))
        .await
        .unwrap();
    assert_eq!(file.name, "notes.txt");
    assert_eq!(file.size_bytes, 12);
    assert_eq!(file.mime_type, "text/plain");
    assert!(!file.previewable);

    let handle = store.open_full("notes.txt").await.unwrap();
    assert_eq!(handle.len(), 12);
    assert_eq!(collect(handle).await, b"hello shelf!");
    assert_eq!(store.open_handles(), 0);
}

#[tokio::test]
async fn write_sanitizes_and_overwrites() {
    let (dir, store) = test_store().await;

    let file = store.write("a b!@.txt", body_of(b"first")).await.unwrap();
    assert_eq!(file.name, "a_b__.txt");
    assert!(dir.path().join("a_b__.txt").exists());

    // A different raw name that sanitizes to the same key replaces the content
    let file = store.write("a_b!?.txt", body_of(b"second!")).await.unwrap();
    assert_eq!(file.name, "a_b__.txt");
    assert_eq!(file.size_bytes, 7);
    assert_eq!(names(&store).await, vec!["a_b__.txt".to_string()]);
}

#[tokio::test]
async fn write_rejects_names_that_are_not_files() {
    let (_dir, store) = test_store().await;

    for name in ["", ".", ".."] {
        let err = store.write(name, body_of(b"x")).await.unwrap_err();
        assert!(matches!(err, BlobError::Invalid { .. }), "{name:?}");
    }
}

#[tokio::test]
async fn failed_body_leaves_no_partial_file() {
    let (_dir, store) = test_store().await;

    let body: ByteStream = Box::pin(stream::iter(vec![
        Ok(Bytes::from_static(b"partial")),
        Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "client went away")),
    ]));
    let err = store.write("broken.bin", body).await.unwrap_err();
    assert!(matches!(err, BlobError::Io { .. }));
    assert!(names(&store).await.is_empty());
}

#[tokio::test]
async fn list_reports_metadata_and_skips_directories() {
    let (dir, store) = test_store().await;
    assert!(names(&store).await.is_empty());

    store.write("clip.mp4", body_of(b"0123456789")).await.unwrap();
    store.write("cover.png", body_of(b"png")).await.unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();

    let mut files: Vec<_> = store
        .list()
        .await
        .unwrap()
        .map(|entry| entry.unwrap())
        .collect()
        .await;
    files.sort_by(|a, b| a.name.cmp(&b.name));

    assert_eq!(files.len(), 2);
    assert_eq!(files[0].name, "clip.mp4");
    assert_eq!(files[0].size_bytes, 10);
    assert_eq!(files[0].mime_type, "video/mp4");
    assert!(files[0].previewable);
    assert_eq!(files[1].mime_type, "image/png");
}

#[cfg(unix)]
#[tokio::test]
async fn unreadable_entry_is_reported_and_listing_continues() {
    let (dir, store) = test_store().await;
    store.write("ok.txt", body_of(b"fine")).await.unwrap();
    std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("dangling.mp4"))
        .unwrap();

    let entries: Vec<_> = store.list().await.unwrap().collect().await;
    assert_eq!(entries.len(), 2);

    let ok: Vec<_> = entries.iter().filter_map(|e| e.as_ref().ok()).collect();
    assert_eq!(ok.len(), 1);
    assert_eq!(ok[0].name, "ok.txt");

    let failed: Vec<_> = entries.iter().filter_map(|e| e.as_ref().err()).collect();
    assert_eq!(failed.len(), 1);
    assert!(matches!(failed[0], BlobError::Entry { name, .. } if name == "dangling.mp4"));
}

#[tokio::test]
async fn large_reads_arrive_in_bounded_chunks() {
    let (_dir, store) = test_store().await;
    let body: ByteStream = Box::pin(stream::once(async { Ok(Bytes::from(vec![7u8; 200 * 1024])) }));
    store.write("long.mp3", body).await.unwrap();

    let mut handle = store.open_full("long.mp3").await.unwrap();
    let mut total = 0usize;
    while let Some(chunk) = handle.next().await {
        let chunk = chunk.unwrap();
        assert!(!chunk.is_empty() && chunk.len() <= 64 * 1024);
        total += chunk.len();
    }
    assert_eq!(total, 200 * 1024);
    assert_eq!(store.open_handles(), 0);
}

#[tokio::test]
async fn list_fails_when_root_is_missing() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path().join("absent"));
    assert!(store.list().await.is_err());
}

#[tokio::test]
async fn delete_removes_from_listing() {
    let (_dir, store) = test_store().await;
    store.write("gone.txt", body_of(b"bye")).await.unwrap();
    store.write("kept.txt", body_of(b"hi")).await.unwrap();

    store.delete("gone.txt").await.unwrap();
    assert_eq!(names(&store).await, vec!["kept.txt".to_string()]);

    let err = store.delete("gone.txt").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn lookups_never_leave_the_root() {
    let (_dir, store) = test_store().await;

    for name in ["../outside.txt", "..", ".", "", "a/b"] {
        assert!(store.stat(name).await.unwrap_err().is_not_found(), "{name:?}");
        assert!(store.open_full(name).await.unwrap_err().is_not_found());
        assert!(store.delete(name).await.unwrap_err().is_not_found());
    }
}

#[tokio::test]
async fn bounded_read_stops_at_window_end() {
    let (_dir, store) = test_store().await;
    store.write("digits.bin", body_of(b"0123456789")).await.unwrap();

    let handle = store.open_read("digits.bin", 2, 4).await.unwrap();
    assert_eq!(handle.len(), 3);
    assert_eq!(collect(handle).await, b"234");

    let handle = store.open_read("digits.bin", 9, 9).await.unwrap();
    assert_eq!(collect(handle).await, b"9");

    assert!(matches!(
        store.open_read("digits.bin", 5, 4).await,
        Err(BlobError::Invalid { .. })
    ));
    assert!(store.open_read("missing.bin", 0, 1).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn dropped_handle_releases_descriptor() {
    let (_dir, store) = test_store().await;
    let data: &'static [u8] = Box::leak(vec![7u8; 256 * 1024].into_boxed_slice());
    store.write("big.bin", body_of(data)).await.unwrap();

    let mut handle = store.open_full("big.bin").await.unwrap();
    assert_eq!(store.open_handles(), 1);

    // Consume one chunk, then abandon the rest like a disconnecting client
    let first = handle.next().await.unwrap().unwrap();
    assert!(!first.is_empty());
    assert!(!handle.is_released());
    drop(handle);
    assert_eq!(store.open_handles(), 0);
}

#[tokio::test]
async fn exhausted_handle_releases_before_drop() {
    let (_dir, store) = test_store().await;
    store.write("tiny.txt", body_of(b"abc")).await.unwrap();

    let mut handle = store.open_full("tiny.txt").await.unwrap();
    while handle.next().await.is_some() {}
    assert!(handle.is_released());
    assert_eq!(store.open_handles(), 0);
}

#[tokio::test]
async fn adapter_serves_partial_media() {
    let (_dir, store) = test_store().await;
    store.write("clip.mp4", body_of(b"0123456789")).await.unwrap();
    let blobs = BlobAdapter::new(store.clone(), BlobConfig::default());

    let opened = blobs.open("clip.mp4", Some("bytes=0-0")).await.unwrap();
    assert!(opened.is_partial());
    assert_eq!(opened.range, Some(ByteRange { start: 0, end: 0, total: 10 }));
    assert_eq!(opened.content_length(), 1);
    assert_eq!(collect(opened.body).await, b"0");

    let opened = blobs.open("clip.mp4", None).await.unwrap();
    assert!(!opened.is_partial());
    assert_eq!(opened.content_length(), 10);
    drop(opened);

    assert_eq!(store.open_handles(), 0);
}

#[tokio::test]
async fn adapter_rejects_unsatisfiable_media_ranges() {
    let (_dir, store) = test_store().await;
    store.write("clip.mp4", body_of(b"0123456789")).await.unwrap();
    store.write("empty.mp3", stream_empty()).await.unwrap();
    let blobs = BlobAdapter::new(store, BlobConfig::default());

    let err = blobs.open("clip.mp4", Some("bytes=15-")).await.unwrap_err();
    assert!(matches!(err, BlobError::Range { total: 10, .. }));

    let err = blobs.open("clip.mp4", Some("lines=1-2")).await.unwrap_err();
    assert!(matches!(err, BlobError::Range { total: 10, .. }));

    let err = blobs.open("empty.mp3", Some("bytes=0-")).await.unwrap_err();
    assert!(matches!(err, BlobError::Range { total: 0, .. }));
}

#[tokio::test]
async fn adapter_ignores_ranges_for_documents_and_downloads() {
    let (_dir, store) = test_store().await;
    store.write("notes.txt", body_of(b"0123456789")).await.unwrap();
    store.write("clip.webm", body_of(b"0123456789")).await.unwrap();
    let blobs = BlobAdapter::new(store, BlobConfig::default());

    let opened = blobs.open("notes.txt", Some("bytes=15-")).await.unwrap();
    assert!(!opened.is_partial());
    assert_eq!(collect(opened.body).await, b"0123456789");

    let opened = blobs.download("clip.webm").await.unwrap();
    assert!(!opened.is_partial());
    assert_eq!(opened.content_length(), 10);
}

#[tokio::test]
async fn adapter_open_ended_range_uses_configured_chunk() {
    let (_dir, store) = test_store().await;
    store.write("clip.mp4", body_of(b"0123456789")).await.unwrap();
    let blobs = BlobAdapter::new(store, BlobConfig::new().with_chunk_size(3));

    let opened = blobs.open("clip.mp4", Some("bytes=2-")).await.unwrap();
    assert_eq!(opened.range.unwrap().end, 5);
    assert_eq!(collect(opened.body).await, b"2345");
}

#[tokio::test]
async fn adapter_enforces_upload_limit() {
    let (_dir, store) = test_store().await;
    let blobs = BlobAdapter::new(store.clone(), BlobConfig::new().with_max_blob_bytes(4));

    let err = blobs
        .put(BlobPut::new("big.bin"), chunked_body(vec![b"abc", b"def"]))
        .await
        .unwrap_err();
    assert!(matches!(err, BlobError::TooLarge { limit: 4 }));
    assert!(names(&store).await.is_empty());

    let receipt = blobs
        .put(BlobPut::new("ok file.bin"), body_of(b"abcd"))
        .await
        .unwrap();
    assert_eq!(receipt.file.name, "ok_file.bin");
    assert_eq!(receipt.original_name, "ok file.bin");
    assert_eq!(receipt.content_type, "application/octet-stream");
}

#[tokio::test]
async fn adapter_prefers_declared_content_type() {
    let (_dir, store) = test_store().await;
    let blobs = BlobAdapter::new(store, BlobConfig::default());

    let receipt = blobs
        .put(
            BlobPut::new("track.mp3").with_content_type("audio/x-custom"),
            body_of(b"id3"),
        )
        .await
        .unwrap();
    assert_eq!(receipt.content_type, "audio/x-custom");
    assert_eq!(receipt.file.mime_type, "audio/mpeg");
}

fn stream_empty() -> ByteStream {
    Box::pin(stream::empty())
}

//! End-to-end pipeline scenarios over mock engines and repositories.

use std::sync::Arc;

use chrono::Utc;
use mediarack_core::models::{Media, MediaKind};
use mediarack_engines::{
    sort_engines, FileMetadata, StorageEngine, StorageError, ThumbSource, UploadedFile,
};
use mediarack_ingest::test_helpers::{
    MockIngestRepository, ParseBehavior, PostprocessBehavior, RecordingEngine,
    RecordingThumbnailer, StoreBehavior, ThumbBehavior, TranscodeBehavior, MOCK_CATCHALL,
    MOCK_EMBED, MOCK_FILE, MOCK_FILE_AFTER_EMBED,
};
use mediarack_ingest::{MediaIngest, ThumbnailError};
use uuid::Uuid;

fn sample_media() -> Media {
    let now = Utc::now();
    Media {
        id: Uuid::new_v4(),
        title: None,
        description: None,
        kind: None,
        duration: None,
        thumbnail_url: None,
        created_at: now,
        updated_at: now,
    }
}

fn upload(filename: &str) -> UploadedFile {
    UploadedFile {
        filename: filename.to_string(),
        content_type: "application/octet-stream".to_string(),
        data: vec![0u8; 128],
    }
}

fn accepted_meta(unique_id: &str) -> FileMetadata {
    let mut meta = FileMetadata::new(MediaKind::Video);
    meta.unique_id = Some(unique_id.to_string());
    meta.display_name = Some("accepted".to_string());
    meta
}

struct Harness {
    ingest: MediaIngest,
    repo: Arc<MockIngestRepository>,
    media_id: Uuid,
}

fn harness(engines: Vec<Arc<RecordingEngine>>, thumbnailer: RecordingThumbnailer) -> Harness {
    harness_with_media(engines, thumbnailer, sample_media())
}

fn harness_with_media(
    engines: Vec<Arc<RecordingEngine>>,
    thumbnailer: RecordingThumbnailer,
    media: Media,
) -> Harness {
    let repo = Arc::new(MockIngestRepository::new());
    let media_id = media.id;
    repo.add_media(media);

    let dyn_engines: Vec<Arc<dyn StorageEngine>> = engines
        .iter()
        .map(|e| e.clone() as Arc<dyn StorageEngine>)
        .collect();
    let ordered = sort_engines(dyn_engines).expect("test engine graph is acyclic");

    Harness {
        ingest: MediaIngest::new(ordered, repo.clone(), Arc::new(thumbnailer)),
        repo,
        media_id,
    }
}

#[tokio::test]
async fn first_accepting_engine_wins_and_earlier_engines_never_store() {
    let first = Arc::new(RecordingEngine::new(
        &MOCK_FILE,
        Uuid::from_u128(1),
        ParseBehavior::Reject,
    ));
    let second = Arc::new(RecordingEngine::new(
        &MOCK_EMBED,
        Uuid::from_u128(2),
        ParseBehavior::Reject,
    ));
    let third = Arc::new(RecordingEngine::new(
        &MOCK_CATCHALL,
        Uuid::from_u128(3),
        ParseBehavior::Accept(accepted_meta("remote-42")),
    ));
    let h = harness(
        vec![first.clone(), second.clone(), third.clone()],
        RecordingThumbnailer::new(ThumbBehavior::Empty),
    );

    let file = h
        .ingest
        .add_new_media_file(h.media_id, None, Some("https://example.com/x".to_string()))
        .await
        .unwrap();

    assert_eq!(file.engine_id, third.instance_id());
    assert_eq!(file.unique_id, "remote-42");
    assert_eq!(first.parse_count(), 1);
    assert_eq!(second.parse_count(), 1);
    assert_eq!(third.parse_count(), 1);
    assert_eq!(first.store_count(), 0);
    assert_eq!(second.store_count(), 0);
    assert_eq!(third.store_count(), 1);
    assert_eq!(third.postprocess_count(), 1);
}

#[tokio::test]
async fn rejected_by_all_engines_yields_user_error_and_no_rows() {
    let engine = Arc::new(RecordingEngine::new(
        &MOCK_FILE,
        Uuid::from_u128(1),
        ParseBehavior::FileUpload,
    ));
    let h = harness(
        vec![engine],
        RecordingThumbnailer::new(ThumbBehavior::Empty),
    );

    let err = h
        .ingest
        .add_new_media_file(h.media_id, Some(upload("payload.xyz")), None)
        .await
        .unwrap_err();

    assert!(err.is_user_safe());
    assert!(err.to_string().contains(".xyz"));
    assert_eq!(h.repo.file_count(), 0);
}

#[tokio::test]
async fn backfill_fills_unset_fields_and_preserves_operator_values() {
    let mut meta = accepted_meta("vid-1");
    meta.title = Some("Ignore Me".to_string());
    meta.description = Some("From metadata".to_string());
    meta.duration = Some(300.0);

    let engine = Arc::new(RecordingEngine::new(
        &MOCK_FILE,
        Uuid::from_u128(1),
        ParseBehavior::Accept(meta),
    ));

    let mut media = sample_media();
    media.title = Some("Keep Me".to_string());
    let h = harness_with_media(
        vec![engine],
        RecordingThumbnailer::new(ThumbBehavior::Empty),
        media,
    );

    h.ingest
        .add_new_media_file(h.media_id, Some(upload("clip.mp4")), None)
        .await
        .unwrap();

    let media = h.repo.media(h.media_id).unwrap();
    assert_eq!(media.title.as_deref(), Some("Keep Me"));
    assert_eq!(media.description.as_deref(), Some("From metadata"));
    assert_eq!(media.duration, Some(300.0));
    assert_eq!(media.kind, Some(MediaKind::Video));
}

#[tokio::test]
async fn successful_ingest_persists_owner_and_unique_id() {
    let engine = Arc::new(
        RecordingEngine::new(&MOCK_FILE, Uuid::from_u128(7), ParseBehavior::FileUpload)
            .with_store(StoreBehavior::DeriveFromId),
    );
    let h = harness(
        vec![engine.clone()],
        RecordingThumbnailer::new(ThumbBehavior::Empty),
    );

    let file = h
        .ingest
        .add_new_media_file(h.media_id, Some(upload("track.mp3")), None)
        .await
        .unwrap();

    assert_eq!(file.engine_id, engine.instance_id());
    assert!(!file.unique_id.is_empty());
    assert_eq!(file.kind, MediaKind::Audio);
    assert_eq!(file.container, "mp3");
    assert_eq!(file.size, Some(128));

    let persisted = h.repo.file(file.id).unwrap();
    assert_eq!(persisted.unique_id, file.unique_id);
}

#[tokio::test]
async fn youtube_url_is_claimed_by_embed_engine_not_file_engine() {
    let file_engine = Arc::new(
        RecordingEngine::new(
            &MOCK_FILE_AFTER_EMBED,
            Uuid::from_u128(1),
            ParseBehavior::FileUpload,
        )
        .with_store(StoreBehavior::DeriveFromId),
    );
    let embed_engine = Arc::new(RecordingEngine::new(
        &MOCK_EMBED,
        Uuid::from_u128(2),
        ParseBehavior::EmbedYoutube,
    ));
    let h = harness(
        vec![file_engine.clone(), embed_engine.clone()],
        RecordingThumbnailer::new(ThumbBehavior::Empty),
    );

    let file = h
        .ingest
        .add_new_media_file(
            h.media_id,
            None,
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(file.engine_id, embed_engine.instance_id());
    assert_eq!(file.unique_id, "dQw4w9WgXcQ");
    assert_eq!(file_engine.store_count(), 0);
}

#[tokio::test]
async fn store_failure_cleans_up_the_stub_row() {
    let engine = Arc::new(
        RecordingEngine::new(&MOCK_FILE, Uuid::from_u128(1), ParseBehavior::FileUpload)
            .with_store(StoreBehavior::Fail("disk full".to_string())),
    );
    let h = harness(
        vec![engine.clone()],
        RecordingThumbnailer::new(ThumbBehavior::Empty),
    );

    let err = h
        .ingest
        .add_new_media_file(h.media_id, Some(upload("clip.mp4")), None)
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Store(_)));
    assert_eq!(h.repo.file_count(), 0);
    // Store never succeeded, so there is no asset to delete.
    assert!(engine.deleted_ids().is_empty());
}

#[tokio::test]
async fn postprocess_failure_removes_the_stored_asset() {
    let engine = Arc::new(
        RecordingEngine::new(
            &MOCK_FILE,
            Uuid::from_u128(1),
            ParseBehavior::Accept(accepted_meta("asset-9")),
        )
        .with_postprocess(PostprocessBehavior::Fail("hook crashed".to_string())),
    );
    let h = harness(
        vec![engine.clone()],
        RecordingThumbnailer::new(ThumbBehavior::Empty),
    );

    let err = h
        .ingest
        .add_new_media_file(h.media_id, Some(upload("clip.mp4")), None)
        .await
        .unwrap_err();

    assert!(!err.is_user_safe());
    assert_eq!(h.repo.file_count(), 0);
    assert_eq!(engine.deleted_ids(), vec!["asset-9".to_string()]);
}

#[tokio::test]
async fn missing_unique_id_is_an_internal_defect() {
    // Neither the metadata nor store supplies a unique id.
    let mut meta = FileMetadata::new(MediaKind::Video);
    meta.display_name = Some("broken".to_string());
    let engine = Arc::new(RecordingEngine::new(
        &MOCK_FILE,
        Uuid::from_u128(1),
        ParseBehavior::Accept(meta),
    ));
    let h = harness(
        vec![engine],
        RecordingThumbnailer::new(ThumbBehavior::Empty),
    );

    let err = h
        .ingest
        .add_new_media_file(h.media_id, Some(upload("clip.mp4")), None)
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Internal(_)));
    assert!(!err.is_user_safe());
    assert_eq!(h.repo.file_count(), 0);
}

#[tokio::test]
async fn transcode_stops_at_first_acceptor() {
    let owner = Arc::new(RecordingEngine::new(
        &MOCK_FILE,
        Uuid::from_u128(1),
        ParseBehavior::Accept(accepted_meta("a-1")),
    ));
    let transcoder = Arc::new(
        RecordingEngine::new(&MOCK_EMBED, Uuid::from_u128(2), ParseBehavior::Reject)
            .with_transcode(TranscodeBehavior::Accept),
    );
    let never_asked = Arc::new(
        RecordingEngine::new(&MOCK_CATCHALL, Uuid::from_u128(3), ParseBehavior::Reject)
            .with_transcode(TranscodeBehavior::Accept),
    );
    let h = harness(
        vec![owner.clone(), transcoder.clone(), never_asked.clone()],
        RecordingThumbnailer::new(ThumbBehavior::Empty),
    );

    let file = h
        .ingest
        .add_new_media_file(h.media_id, Some(upload("clip.mp4")), None)
        .await
        .unwrap();

    // The owner is asked first (and declines), the second engine accepts,
    // the third is never reached. Ownership never changes.
    assert_eq!(owner.transcode_count(), 1);
    assert_eq!(transcoder.transcode_count(), 1);
    assert_eq!(never_asked.transcode_count(), 0);
    assert_eq!(file.engine_id, owner.instance_id());
}

#[tokio::test]
async fn transcode_failure_propagates_but_keeps_the_file() {
    let owner = Arc::new(
        RecordingEngine::new(
            &MOCK_FILE,
            Uuid::from_u128(1),
            ParseBehavior::Accept(accepted_meta("a-1")),
        )
        .with_transcode(TranscodeBehavior::Fail("encoder crashed".to_string())),
    );
    let h = harness(
        vec![owner],
        RecordingThumbnailer::new(ThumbBehavior::Empty),
    );

    let err = h
        .ingest
        .add_new_media_file(h.media_id, Some(upload("clip.mp4")), None)
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Store(_)));
    // The file was fully ingested before transcoding began; it stays.
    assert_eq!(h.repo.file_count(), 1);
}

#[tokio::test]
async fn thumbnail_fetch_failure_does_not_abort_ingestion() {
    let mut meta = accepted_meta("vid-1");
    meta.thumbnail = Some(ThumbSource::Url("https://img.example/t.jpg".to_string()));
    let engine = Arc::new(RecordingEngine::new(
        &MOCK_FILE,
        Uuid::from_u128(1),
        ParseBehavior::Accept(meta),
    ));
    let h = harness(
        vec![engine],
        RecordingThumbnailer::new(ThumbBehavior::FetchFail),
    );

    let file = h
        .ingest
        .add_new_media_file(h.media_id, Some(upload("clip.mp4")), None)
        .await
        .unwrap();

    assert_eq!(h.repo.file(file.id).unwrap().unique_id, "vid-1");
    assert!(h.repo.media(h.media_id).unwrap().thumbnail_url.is_none());
}

#[tokio::test]
async fn thumbnail_generation_failure_aborts_ingestion() {
    let mut meta = accepted_meta("vid-1");
    meta.thumbnail = Some(ThumbSource::Url("https://img.example/t.jpg".to_string()));
    let engine = Arc::new(RecordingEngine::new(
        &MOCK_FILE,
        Uuid::from_u128(1),
        ParseBehavior::Accept(meta),
    ));
    let h = harness(
        vec![engine],
        RecordingThumbnailer::new(ThumbBehavior::GenerateFail),
    );

    let err = h
        .ingest
        .add_new_media_file(h.media_id, Some(upload("clip.mp4")), None)
        .await
        .unwrap_err();

    match err {
        StorageError::Internal(source) => {
            assert!(source.downcast_ref::<ThumbnailError>().is_some());
        }
        other => panic!("expected Internal error, got {:?}", other),
    }
    assert_eq!(h.repo.file_count(), 0);
}

#[tokio::test]
async fn thumbnail_is_materialized_once_and_existing_thumbnails_kept() {
    let mut meta = accepted_meta("vid-1");
    meta.thumbnail = Some(ThumbSource::Url("https://img.example/t.jpg".to_string()));
    let engine = Arc::new(RecordingEngine::new(
        &MOCK_FILE,
        Uuid::from_u128(1),
        ParseBehavior::Accept(meta.clone()),
    ));
    let thumbnailer = RecordingThumbnailer::new(ThumbBehavior::Produce("thumbs/v1.jpg".to_string()));
    let h = harness(vec![engine], thumbnailer);

    h.ingest
        .add_new_media_file(h.media_id, Some(upload("clip.mp4")), None)
        .await
        .unwrap();
    assert_eq!(
        h.repo.media(h.media_id).unwrap().thumbnail_url.as_deref(),
        Some("thumbs/v1.jpg")
    );

    // A media that already has a distinct thumbnail is left alone.
    let engine2 = Arc::new(RecordingEngine::new(
        &MOCK_FILE,
        Uuid::from_u128(2),
        ParseBehavior::Accept(meta),
    ));
    let thumbnailer2 = RecordingThumbnailer::new(ThumbBehavior::Produce("thumbs/v2.jpg".to_string()));
    let mut media = sample_media();
    media.thumbnail_url = Some("thumbs/custom.jpg".to_string());
    let h2 = harness_with_media(vec![engine2], thumbnailer2, media);

    h2.ingest
        .add_new_media_file(h2.media_id, Some(upload("clip.mp4")), None)
        .await
        .unwrap();
    assert_eq!(
        h2.repo.media(h2.media_id).unwrap().thumbnail_url.as_deref(),
        Some("thumbs/custom.jpg")
    );
}

#[tokio::test]
async fn unknown_media_id_is_an_internal_error() {
    let engine = Arc::new(RecordingEngine::new(
        &MOCK_FILE,
        Uuid::from_u128(1),
        ParseBehavior::FileUpload,
    ));
    let h = harness(
        vec![engine],
        RecordingThumbnailer::new(ThumbBehavior::Empty),
    );

    let err = h
        .ingest
        .add_new_media_file(Uuid::new_v4(), Some(upload("clip.mp4")), None)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Internal(_)));
}

#[tokio::test]
async fn missing_file_and_url_is_a_user_error() {
    let engine = Arc::new(RecordingEngine::new(
        &MOCK_FILE,
        Uuid::from_u128(1),
        ParseBehavior::FileUpload,
    ));
    let h = harness(
        vec![engine],
        RecordingThumbnailer::new(ThumbBehavior::Empty),
    );

    let err = h
        .ingest
        .add_new_media_file(h.media_id, None, None)
        .await
        .unwrap_err();
    assert!(err.is_user_safe());
}

//! Scripted engines and thumbnailers for pipeline tests
//!
//! A [`RecordingEngine`] is configured with a behavior per operation and
//! counts every call, so tests can assert which engines the pipeline
//! touched and in what way.

use async_trait::async_trait;
use mediarack_core::models::{Media, MediaFile};
use mediarack_engines::upload::parse_file_upload;
use mediarack_engines::{
    EngineClass, FileMetadata, ParseOutcome, PlaybackUri, StorageEngine, StorageError,
    TranscodeOutcome, UploadSource,
};
use serde_json::Value as JsonValue;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::thumbnail::{ThumbnailError, Thumbnailer};

fn empty_config() -> JsonValue {
    serde_json::json!({})
}

pub static MOCK_FILE: EngineClass = EngineClass {
    engine_type: "mock_file",
    label: "Mock File",
    is_singleton: false,
    try_before: &[],
    try_after: &[],
    default_config: empty_config,
};

pub static MOCK_EMBED: EngineClass = EngineClass {
    engine_type: "mock_embed",
    label: "Mock Embed",
    is_singleton: false,
    try_before: &[],
    try_after: &["mock_file"],
    default_config: empty_config,
};

pub static MOCK_CATCHALL: EngineClass = EngineClass {
    engine_type: "mock_catchall",
    label: "Mock Catch-all",
    is_singleton: false,
    try_before: &[],
    try_after: &["mock_embed"],
    default_config: empty_config,
};

/// A file engine explicitly ordered after the embed engines.
pub static MOCK_FILE_AFTER_EMBED: EngineClass = EngineClass {
    engine_type: "mock_file_late",
    label: "Mock File (after embeds)",
    is_singleton: false,
    try_before: &[],
    try_after: &["mock_embed"],
    default_config: empty_config,
};

pub enum ParseBehavior {
    /// Always reject.
    Reject,
    /// Always accept with the given metadata.
    Accept(FileMetadata),
    /// Delegate to the file-upload base helper.
    FileUpload,
    /// Accept YouTube URLs, unique id = the extracted video id.
    EmbedYoutube,
}

pub enum StoreBehavior {
    /// Return the given unique id (None = keep the metadata-supplied one).
    Succeed(Option<String>),
    /// Return a name derived from the media file id, like the real file
    /// engines do.
    DeriveFromId,
    Fail(String),
}

pub enum TranscodeBehavior {
    Decline,
    Accept,
    Fail(String),
}

pub enum PostprocessBehavior {
    Succeed,
    Fail(String),
}

pub struct RecordingEngine {
    class: &'static EngineClass,
    id: Uuid,
    display_name: String,
    parse: ParseBehavior,
    store: StoreBehavior,
    transcode: TranscodeBehavior,
    postprocess: PostprocessBehavior,
    pub parse_calls: AtomicUsize,
    pub store_calls: AtomicUsize,
    pub transcode_calls: AtomicUsize,
    pub postprocess_calls: AtomicUsize,
    pub delete_calls: Mutex<Vec<String>>,
}

impl RecordingEngine {
    pub fn new(class: &'static EngineClass, id: Uuid, parse: ParseBehavior) -> Self {
        RecordingEngine {
            class,
            id,
            display_name: class.label.to_string(),
            parse,
            store: StoreBehavior::Succeed(None),
            transcode: TranscodeBehavior::Decline,
            postprocess: PostprocessBehavior::Succeed,
            parse_calls: AtomicUsize::new(0),
            store_calls: AtomicUsize::new(0),
            transcode_calls: AtomicUsize::new(0),
            postprocess_calls: AtomicUsize::new(0),
            delete_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_store(mut self, store: StoreBehavior) -> Self {
        self.store = store;
        self
    }

    pub fn with_transcode(mut self, transcode: TranscodeBehavior) -> Self {
        self.transcode = transcode;
        self
    }

    pub fn with_postprocess(mut self, postprocess: PostprocessBehavior) -> Self {
        self.postprocess = postprocess;
        self
    }

    pub fn parse_count(&self) -> usize {
        self.parse_calls.load(Ordering::SeqCst)
    }

    pub fn store_count(&self) -> usize {
        self.store_calls.load(Ordering::SeqCst)
    }

    pub fn transcode_count(&self) -> usize {
        self.transcode_calls.load(Ordering::SeqCst)
    }

    pub fn postprocess_count(&self) -> usize {
        self.postprocess_calls.load(Ordering::SeqCst)
    }

    pub fn deleted_ids(&self) -> Vec<String> {
        self.delete_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StorageEngine for RecordingEngine {
    fn class(&self) -> &'static EngineClass {
        self.class
    }

    fn instance_id(&self) -> Uuid {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    async fn parse(&self, source: &UploadSource) -> Result<ParseOutcome, StorageError> {
        self.parse_calls.fetch_add(1, Ordering::SeqCst);
        match &self.parse {
            ParseBehavior::Reject => Ok(ParseOutcome::Rejected),
            ParseBehavior::Accept(meta) => Ok(ParseOutcome::Accepted(meta.clone())),
            ParseBehavior::FileUpload => Ok(parse_file_upload(source)),
            ParseBehavior::EmbedYoutube => {
                let Some(url) = source.url() else {
                    return Ok(ParseOutcome::Rejected);
                };
                match mediarack_engines::youtube::extract_video_id(url) {
                    Some(video_id) => {
                        let mut meta =
                            FileMetadata::new(mediarack_core::models::MediaKind::Video);
                        meta.unique_id = Some(video_id);
                        meta.display_name = Some(url.to_string());
                        Ok(ParseOutcome::Accepted(meta))
                    }
                    None => Ok(ParseOutcome::Rejected),
                }
            }
        }
    }

    async fn store(
        &self,
        file: &MediaFile,
        _source: &UploadSource,
        _meta: &FileMetadata,
    ) -> Result<Option<String>, StorageError> {
        self.store_calls.fetch_add(1, Ordering::SeqCst);
        match &self.store {
            StoreBehavior::Succeed(unique_id) => Ok(unique_id.clone()),
            StoreBehavior::DeriveFromId => Ok(Some(if file.container.is_empty() {
                file.id.to_string()
            } else {
                format!("{}.{}", file.id, file.container)
            })),
            StoreBehavior::Fail(msg) => Err(StorageError::Store(msg.clone())),
        }
    }

    async fn postprocess(&self, _file: &MediaFile) -> Result<(), StorageError> {
        self.postprocess_calls.fetch_add(1, Ordering::SeqCst);
        match &self.postprocess {
            PostprocessBehavior::Succeed => Ok(()),
            PostprocessBehavior::Fail(msg) => Err(StorageError::Store(msg.clone())),
        }
    }

    async fn transcode(&self, _file: &MediaFile) -> Result<TranscodeOutcome, StorageError> {
        self.transcode_calls.fetch_add(1, Ordering::SeqCst);
        match &self.transcode {
            TranscodeBehavior::Decline => Ok(TranscodeOutcome::Declined),
            TranscodeBehavior::Accept => Ok(TranscodeOutcome::Accepted),
            TranscodeBehavior::Fail(msg) => Err(StorageError::Store(msg.clone())),
        }
    }

    async fn delete(&self, unique_id: &str) -> Result<bool, StorageError> {
        self.delete_calls
            .lock()
            .unwrap()
            .push(unique_id.to_string());
        Ok(true)
    }

    fn playback_uris(&self, _file: &MediaFile) -> Vec<PlaybackUri> {
        Vec::new()
    }
}

pub enum ThumbBehavior {
    /// Produce a thumbnail at the given locator.
    Produce(String),
    /// Produce nothing.
    Empty,
    FetchFail,
    GenerateFail,
}

pub struct RecordingThumbnailer {
    behavior: ThumbBehavior,
    pub url_calls: Mutex<Vec<String>>,
    pub bytes_calls: AtomicUsize,
}

impl RecordingThumbnailer {
    pub fn new(behavior: ThumbBehavior) -> Self {
        RecordingThumbnailer {
            behavior,
            url_calls: Mutex::new(Vec::new()),
            bytes_calls: AtomicUsize::new(0),
        }
    }

    fn outcome(&self) -> Result<Option<String>, ThumbnailError> {
        match &self.behavior {
            ThumbBehavior::Produce(locator) => Ok(Some(locator.clone())),
            ThumbBehavior::Empty => Ok(None),
            ThumbBehavior::FetchFail => {
                Err(ThumbnailError::Fetch("connection timed out".to_string()))
            }
            ThumbBehavior::GenerateFail => {
                Err(ThumbnailError::Generate("corrupt source image".to_string()))
            }
        }
    }
}

#[async_trait]
impl Thumbnailer for RecordingThumbnailer {
    async fn create_from_url(
        &self,
        _media: &Media,
        url: &str,
    ) -> Result<Option<String>, ThumbnailError> {
        self.url_calls.lock().unwrap().push(url.to_string());
        self.outcome()
    }

    async fn create_from_bytes(
        &self,
        _media: &Media,
        _data: &[u8],
    ) -> Result<Option<String>, ThumbnailError> {
        self.bytes_calls.fetch_add(1, Ordering::SeqCst);
        self.outcome()
    }
}

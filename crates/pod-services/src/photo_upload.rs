//! Check-in photo upload pipeline.
//!
//! Per photo: extract GPS metadata, strip EXIF, compress to the byte budget,
//! render a square thumbnail, then store the main image and thumbnail
//! concurrently. Batches run through the worker pool with the configured
//! concurrency cap and per-photo timeout; one bad photo never fails the batch.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use uuid::Uuid;

use pod_core::config::PipelineConfig;
use pod_core::models::Photo;
use pod_processing::{extract_location, strip_exif, PhotoCompressor, Thumbnailer};
use pod_storage::{photo_key, ObjectStorage, PhotoVariant};
use pod_worker::{PoolOptions, TaskFailure};

/// Pipeline stage an upload failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Processing,
    Storage,
    Timeout,
}

#[derive(Debug, thiserror::Error)]
#[error("photo upload failed during {stage:?}: {source}")]
pub struct UploadError {
    pub stage: UploadStage,
    #[source]
    pub source: anyhow::Error,
}

impl UploadError {
    fn processing(source: anyhow::Error) -> Self {
        Self {
            stage: UploadStage::Processing,
            source,
        }
    }

    fn storage(source: anyhow::Error) -> Self {
        Self {
            stage: UploadStage::Storage,
            source,
        }
    }
}

/// One raw photo submitted for upload.
#[derive(Debug, Clone)]
pub struct PhotoInput {
    pub data: Vec<u8>,
    pub original_filename: String,
}

/// Batch result: one slot per input photo, in input order.
#[derive(Debug)]
pub struct UploadBatch {
    pub photos: Vec<Result<Photo, UploadError>>,
    pub succeeded: usize,
    pub failed: usize,
}

impl UploadBatch {
    /// Successful photos only, preserving input order.
    pub fn successes(self) -> Vec<Photo> {
        self.photos.into_iter().filter_map(|r| r.ok()).collect()
    }
}

pub struct PhotoUploadService {
    storage: Arc<dyn ObjectStorage>,
    config: PipelineConfig,
}

impl PhotoUploadService {
    pub fn new(storage: Arc<dyn ObjectStorage>, config: PipelineConfig) -> Self {
        Self { storage, config }
    }

    /// Process and store a single photo, returning its stored record.
    pub async fn upload_photo(
        &self,
        shipper_id: Uuid,
        input: PhotoInput,
    ) -> Result<Photo, UploadError> {
        let started = Instant::now();
        let photo_id = Uuid::new_v4();

        // Decoding and re-encoding are CPU-bound; keep them off the runtime
        // threads.
        let max_bytes = self.config.max_photo_bytes;
        let thumbnail_side = self.config.thumbnail_side;
        let processed = tokio::task::spawn_blocking(move || {
            let location = extract_location(&input.data);
            let clean = strip_exif(&input.data).context("strip metadata")?;
            let compressed = PhotoCompressor::compress_to_budget(&clean, max_bytes)
                .context("compress to byte budget")?;
            // Thumbnail from the original, not the compressed output, so an
            // aggressively downscaled primary never degrades it.
            let thumbnail =
                Thumbnailer::square(&clean, thumbnail_side).context("render thumbnail")?;
            Ok::<_, anyhow::Error>((location, compressed, thumbnail, input.original_filename))
        })
        .await
        .map_err(|e| UploadError::processing(anyhow::anyhow!("processing task failed: {e}")))?
        .map_err(UploadError::processing)?;

        let (location, compressed, thumbnail, original_filename) = processed;

        let main_key = photo_key(shipper_id, photo_id, PhotoVariant::Main);
        let thumb_key = photo_key(shipper_id, photo_id, PhotoVariant::Thumbnail);
        let size_bytes = compressed.data.len() as u64;

        let (url, thumbnail_url) = tokio::try_join!(
            self.storage
                .put(&main_key, "image/jpeg", compressed.data.to_vec()),
            self.storage
                .put(&thumb_key, "image/jpeg", thumbnail.to_vec()),
        )
        .map_err(|e| UploadError::storage(e.into()))?;

        tracing::info!(
            photo_id = %photo_id,
            shipper_id = %shipper_id,
            size_bytes,
            quality = compressed.quality,
            duration_ms = started.elapsed().as_millis() as u64,
            "photo uploaded"
        );

        Ok(Photo {
            url,
            thumbnail_url,
            storage_key: main_key,
            thumbnail_key: thumb_key,
            size_bytes,
            width: compressed.width,
            height: compressed.height,
            location_metadata: location.to_json(),
            original_filename,
            content_type: "image/jpeg".to_string(),
        })
    }

    /// Upload a batch of photos with bounded concurrency. Results keep input
    /// order; failures are recorded per slot rather than aborting the batch.
    pub async fn upload_photos(
        self: &Arc<Self>,
        shipper_id: Uuid,
        inputs: Vec<PhotoInput>,
    ) -> UploadBatch {
        let total = inputs.len();
        let service = Arc::clone(self);

        let outcomes = pod_worker::run(
            inputs,
            move |input, _| {
                let service = Arc::clone(&service);
                async move {
                    service
                        .upload_photo(shipper_id, input)
                        .await
                        .map_err(anyhow::Error::from)
                }
            },
            PoolOptions {
                max_concurrent: Some(self.config.max_concurrent_uploads),
                task_timeout: Some(self.config.photo_timeout),
                ..Default::default()
            },
        )
        .await;

        let photos: Vec<Result<Photo, UploadError>> = outcomes
            .into_iter()
            .map(|outcome| match outcome {
                Ok(photo) => Ok(photo),
                Err(TaskFailure::TimedOut(d)) => Err(UploadError {
                    stage: UploadStage::Timeout,
                    source: anyhow::anyhow!("photo processing exceeded {d:?}"),
                }),
                Err(failure) => Err(UploadError::processing(anyhow::anyhow!("{failure}"))),
            })
            .collect();

        let succeeded = photos.iter().filter(|r| r.is_ok()).count();
        let failed = total - succeeded;
        if failed > 0 {
            tracing::warn!(total, succeeded, failed, "photo batch completed with failures");
        } else {
            tracing::info!(total, "photo batch completed");
        }

        UploadBatch {
            photos,
            succeeded,
            failed,
        }
    }

    /// Remove a stored photo and its thumbnail. Missing objects are not an
    /// error.
    pub async fn delete_photo(&self, photo: &Photo) -> anyhow::Result<()> {
        tokio::try_join!(
            self.storage.delete(&photo.storage_key),
            self.storage.delete(&photo.thumbnail_key),
        )?;
        tracing::info!(storage_key = %photo.storage_key, "photo deleted");
        Ok(())
    }
}

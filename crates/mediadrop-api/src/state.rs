//! Application state shared by all handlers.
//!
//! Services take the storage sink and the two stores as trait objects, so the same router
//! runs against Postgres and a real backend in production and against in-memory mocks in tests.

use mediadrop_core::Config;
use mediadrop_db::{AssetStore, UserDirectory};
use mediadrop_storage::Storage;
use std::sync::Arc;

use crate::services::{AssetService, BatchUploader, UploadService};

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub upload_service: UploadService,
    pub batch_uploader: BatchUploader,
    pub asset_service: AssetService,
}

impl AppState {
    /// Wire the services from configuration and the three collaborators.
    pub fn new(
        config: Config,
        storage: Arc<dyn Storage>,
        assets: Arc<dyn AssetStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        let limits = config.upload_limits();
        let upload_service = UploadService::new(
            storage.clone(),
            assets.clone(),
            users,
            config.storage_bucket().to_string(),
            limits.clone(),
        );
        let batch_uploader =
            BatchUploader::new(upload_service.clone(), limits, config.upload_pacing());
        let asset_service = AssetService::new(storage.clone(), assets);

        Self {
            storage,
            upload_service,
            batch_uploader,
            asset_service,
        }
    }
}

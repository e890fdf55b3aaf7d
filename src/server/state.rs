//! Server shared state
//!
//! Holds configuration, the geocoding backend and one picker per map form.

use crate::config::Config;
use crate::error::Result;
use crate::geocode::mapbox::MapboxGeocoder;
use crate::picker::{LocationPicker, LocationSelection, PickerDriver, PickerHandle, TracingPresenter};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// Session used when a request names none
pub const DEFAULT_SESSION: &str = "default";

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration
    pub config: Arc<RwLock<Config>>,

    /// Reverse geocoding backend
    pub geocoder: Arc<MapboxGeocoder>,

    /// Running pickers keyed by form session id
    pickers: Mutex<HashMap<String, PickerHandle>>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config) -> Result<Self> {
        let geocoder = Arc::new(MapboxGeocoder::new(&config.geocoder)?);

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            geocoder,
            pickers: Mutex::new(HashMap::new()),
        })
    }

    /// Picker for `session`, started on first use
    ///
    /// Must be called from within a tokio runtime.
    pub async fn picker(&self, session: &str) -> PickerHandle {
        let mut pickers = self.pickers.lock().await;
        if let Some(handle) = pickers.get(session) {
            return handle.clone();
        }

        let owner = session.to_string();
        let picker = LocationPicker::new(
            TracingPresenter,
            Box::new(move |selection: &LocationSelection| {
                info!(
                    "Session {} reported selection {} at {}",
                    owner, selection.sequence, selection.point
                );
            }),
        );
        let (handle, _task) = PickerDriver::spawn(picker, Arc::clone(&self.geocoder));
        debug!("Started picker for session {}", session);

        pickers.insert(session.to_string(), handle.clone());
        handle
    }

    /// Picker for `session` if one is running
    pub async fn existing_picker(&self, session: &str) -> Option<PickerHandle> {
        self.pickers.lock().await.get(session).cloned()
    }

    /// Stop and forget the picker for `session`; its selection is discarded
    pub async fn close_picker(&self, session: &str) -> Result<()> {
        let Some(handle) = self.pickers.lock().await.remove(session) else {
            return Ok(());
        };
        debug!("Closed picker for session {}", session);
        handle.shutdown()
    }

    /// Minimum fractional digits for encoded point text
    pub async fn precision(&self) -> usize {
        self.config.read().await.codec.precision
    }
}

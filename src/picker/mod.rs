//! Click-to-locate picker
//!
//! [`LocationPicker`] owns the current selection and the map marker. A click
//! creates a fresh selection tagged with a monotonically increasing sequence
//! number and hands back a [`GeocodeRequest`]; whoever runs the lookup feeds
//! the result back through [`LocationPicker::apply`] with the same sequence.
//! Results for anything but the current sequence are discarded, so the last
//! click wins regardless of the order lookups complete in.
//!
//! The picker performs no I/O itself. [`driver`] runs it on a tokio task.

pub mod driver;
pub mod presenter;

use crate::geocode::{AddressInfo, GeocodeResult};
use crate::geometry::Point;
use presenter::{popup_html, MapPresenter};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use driver::{PickerDriver, PickerHandle};
pub use presenter::TracingPresenter;

/// Callback invoked once per resolved selection
pub type ReportFn = Box<dyn FnMut(&LocationSelection) + Send>;

/// Picker lifecycle for the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickerState {
    /// No selection yet
    #[default]
    Idle,
    /// Click registered, lookup in flight
    AwaitingGeocode,
    /// Address attached
    Resolved,
    /// Lookup failed or found nothing; the coordinate is still usable
    ResolvedWithoutAddress,
}

/// The picker's working value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSelection {
    pub point: Point,
    pub address: Option<AddressInfo>,
    pub sequence: u64,
}

/// A lookup the picker wants performed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeocodeRequest {
    pub sequence: u64,
    pub point: Point,
}

/// What happened to a lookup result handed to [`LocationPicker::apply`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Merged into the current selection
    Applied(PickerState),
    /// A newer click (or a clear) superseded it
    Stale,
    /// The current selection was already resolved
    Duplicate,
}

/// Point-in-time view of a picker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PickerSnapshot {
    pub state: PickerState,
    pub selection: Option<LocationSelection>,
    /// Lookup results discarded because a newer click superseded them
    pub stale_responses: u64,
}

/// Selection state machine driven by map clicks and lookup results
pub struct LocationPicker<P: MapPresenter> {
    presenter: P,
    on_resolved: ReportFn,
    state: PickerState,
    selection: Option<LocationSelection>,
    last_sequence: u64,
    stale_responses: u64,
}

impl<P: MapPresenter> LocationPicker<P> {
    /// Create an idle picker
    pub fn new(presenter: P, on_resolved: ReportFn) -> Self {
        Self {
            presenter,
            on_resolved,
            state: PickerState::Idle,
            selection: None,
            last_sequence: 0,
            stale_responses: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> PickerState {
        self.state
    }

    /// Current selection, if any
    pub fn selection(&self) -> Option<&LocationSelection> {
        self.selection.as_ref()
    }

    /// The map this picker writes to
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Snapshot of state, selection and counters
    pub fn snapshot(&self) -> PickerSnapshot {
        PickerSnapshot {
            state: self.state,
            selection: self.selection.clone(),
            stale_responses: self.stale_responses,
        }
    }

    /// Handle a map click
    ///
    /// Out-of-range coordinates are ignored and return `None`. Otherwise the
    /// previous selection is abandoned, the marker moves, and the lookup to
    /// perform is returned. No report is made until the lookup resolves.
    pub fn click(&mut self, lng: f64, lat: f64) -> Option<GeocodeRequest> {
        let point = match Point::new(lng, lat) {
            Ok(point) => point,
            Err(e) => {
                debug!("Ignoring click: {}", e);
                return None;
            }
        };

        self.last_sequence += 1;
        let sequence = self.last_sequence;

        self.selection = Some(LocationSelection {
            point,
            address: None,
            sequence,
        });
        self.presenter.set_marker(point);
        self.state = PickerState::AwaitingGeocode;

        debug!("Selection {} at {}", sequence, point);
        Some(GeocodeRequest { sequence, point })
    }

    /// Merge a lookup result issued for `sequence`
    pub fn apply(&mut self, sequence: u64, result: GeocodeResult) -> Resolution {
        let Some(selection) = self.selection.as_mut().filter(|s| s.sequence == sequence) else {
            self.stale_responses += 1;
            debug!("Discarding stale geocode result for selection {}", sequence);
            return Resolution::Stale;
        };

        if self.state != PickerState::AwaitingGeocode {
            debug!("Selection {} already resolved", sequence);
            return Resolution::Duplicate;
        }

        let (state, address) = match result {
            GeocodeResult::Found(address) => (PickerState::Resolved, Some(address)),
            GeocodeResult::Empty | GeocodeResult::NetworkError(_) => {
                (PickerState::ResolvedWithoutAddress, None)
            }
        };

        selection.address = address;
        self.state = state;

        let selection = selection.clone();
        self.presenter
            .show_popup(&popup_html(&selection.point, selection.address.as_ref()));
        info!(
            "Selection {} resolved at {} ({})",
            selection.sequence,
            selection.point,
            if selection.address.is_some() { "with address" } else { "without address" }
        );
        (self.on_resolved)(&selection);

        Resolution::Applied(state)
    }

    /// Drop the current selection (owning form saved or closed)
    ///
    /// Results still in flight become stale.
    pub fn clear(&mut self) {
        self.selection = None;
        self.state = PickerState::Idle;
    }
}

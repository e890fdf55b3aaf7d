//! Async driver for a [`LocationPicker`]
//!
//! One tokio task owns the picker and processes events from an mpsc channel
//! in arrival order. Lookups run as spawned tasks that post their result
//! back into the same channel tagged with the sequence they were issued for,
//! so the picker's stale-discard rule decides ordering, not the network.

use crate::error::{Error, Result};
use crate::geocode::{GeocodeResult, ReverseGeocoder};
use crate::picker::presenter::MapPresenter;
use crate::picker::{GeocodeRequest, LocationPicker, PickerSnapshot};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Events processed by the picker task
#[derive(Debug)]
enum PickerEvent {
    Click {
        lng: f64,
        lat: f64,
        reply: oneshot::Sender<Option<u64>>,
    },
    Geocoded {
        sequence: u64,
        result: GeocodeResult,
    },
    Clear,
    Shutdown,
}

/// Cloneable handle for sending clicks to a running picker
#[derive(Debug, Clone)]
pub struct PickerHandle {
    events: mpsc::UnboundedSender<PickerEvent>,
    snapshots: watch::Receiver<PickerSnapshot>,
}

impl PickerHandle {
    fn send(&self, event: PickerEvent) -> Result<()> {
        self.events
            .send(event)
            .map_err(|_| Error::Picker("Picker task has stopped".to_string()))
    }

    /// Deliver a map click
    ///
    /// Returns the sequence assigned to the new selection, or `None` if the
    /// click was outside the valid coordinate range and ignored.
    pub async fn click(&self, lng: f64, lat: f64) -> Result<Option<u64>> {
        let (reply, rx) = oneshot::channel();
        self.send(PickerEvent::Click { lng, lat, reply })?;
        rx.await
            .map_err(|_| Error::Picker("Picker task dropped the click".to_string()))
    }

    /// Discard the current selection
    pub fn clear(&self) -> Result<()> {
        self.send(PickerEvent::Clear)
    }

    /// Stop the picker task; lookups still in flight are abandoned
    pub fn shutdown(&self) -> Result<()> {
        self.send(PickerEvent::Shutdown)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> PickerSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Wait until a published snapshot satisfies `predicate`
    pub async fn wait_for<F>(&self, predicate: F) -> Result<PickerSnapshot>
    where
        F: FnMut(&PickerSnapshot) -> bool,
    {
        let mut snapshots = self.snapshots.clone();
        let snapshot = snapshots
            .wait_for(predicate)
            .await
            .map_err(|_| Error::Picker("Picker task has stopped".to_string()))?;
        Ok(snapshot.clone())
    }
}

/// Runs a picker on its own task
pub struct PickerDriver<P: MapPresenter, G> {
    picker: LocationPicker<P>,
    geocoder: Arc<G>,
    events: mpsc::UnboundedReceiver<PickerEvent>,
    lookups: mpsc::WeakUnboundedSender<PickerEvent>,
    snapshots: watch::Sender<PickerSnapshot>,
}

impl<P, G> PickerDriver<P, G>
where
    P: MapPresenter + 'static,
    G: ReverseGeocoder + 'static,
{
    /// Spawn the picker task and return a handle to it
    ///
    /// The task ends on [`PickerHandle::shutdown`], or once every handle and
    /// in-flight lookup has been dropped.
    pub fn spawn(picker: LocationPicker<P>, geocoder: Arc<G>) -> (PickerHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(picker.snapshot());

        let driver = Self {
            picker,
            geocoder,
            events: rx,
            lookups: tx.downgrade(),
            snapshots: snapshot_tx,
        };
        let task = tokio::spawn(driver.run());

        let handle = PickerHandle {
            events: tx,
            snapshots: snapshot_rx,
        };
        (handle, task)
    }

    async fn run(mut self) {
        info!("Location picker started ({} geocoder)", self.geocoder.name());

        while let Some(event) = self.events.recv().await {
            let reply = match event {
                PickerEvent::Click { lng, lat, reply } => {
                    let request = self.picker.click(lng, lat);
                    if let Some(request) = request {
                        self.start_lookup(request);
                    }
                    Some((reply, request.map(|r| r.sequence)))
                }
                PickerEvent::Geocoded { sequence, result } => {
                    let resolution = self.picker.apply(sequence, result);
                    debug!("Lookup {} -> {:?}", sequence, resolution);
                    None
                }
                PickerEvent::Clear => {
                    self.picker.clear();
                    None
                }
                PickerEvent::Shutdown => break,
            };

            // Publish before replying so a caller sees its own click in the snapshot
            self.snapshots.send_replace(self.picker.snapshot());
            if let Some((reply, sequence)) = reply {
                let _ = reply.send(sequence);
            }
        }

        info!("Location picker stopped");
    }

    fn start_lookup(&self, request: GeocodeRequest) {
        // Upgrade fails only when every handle is gone; nobody could observe the result
        let Some(events) = self.lookups.upgrade() else {
            return;
        };
        let geocoder = Arc::clone(&self.geocoder);

        tokio::spawn(async move {
            let result = geocoder.reverse_geocode(request.point).await;
            let _ = events.send(PickerEvent::Geocoded {
                sequence: request.sequence,
                result,
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::AddressInfo;
    use crate::geometry::Point;
    use crate::picker::{LocationSelection, PickerState, TracingPresenter};

    type Call = (Point, oneshot::Sender<GeocodeResult>);

    /// Geocoder whose lookups block until the test answers them
    struct ManualGeocoder {
        calls: mpsc::UnboundedSender<Call>,
    }

    impl ReverseGeocoder for ManualGeocoder {
        fn name(&self) -> &'static str {
            "manual"
        }

        async fn reverse_geocode(&self, point: Point) -> GeocodeResult {
            let (tx, rx) = oneshot::channel();
            let _ = self.calls.send((point, tx));
            rx.await
                .unwrap_or_else(|_| GeocodeResult::NetworkError("abandoned".to_string()))
        }
    }

    struct Harness {
        handle: PickerHandle,
        calls: mpsc::UnboundedReceiver<Call>,
        reports: mpsc::UnboundedReceiver<LocationSelection>,
        task: JoinHandle<()>,
    }

    fn start() -> Harness {
        let (calls_tx, calls) = mpsc::unbounded_channel();
        let (reports_tx, reports) = mpsc::unbounded_channel();

        let picker = LocationPicker::new(
            TracingPresenter,
            Box::new(move |selection: &LocationSelection| {
                let _ = reports_tx.send(selection.clone());
            }),
        );
        let geocoder = Arc::new(ManualGeocoder { calls: calls_tx });
        let (handle, task) = PickerDriver::spawn(picker, geocoder);

        Harness {
            handle,
            calls,
            reports,
            task,
        }
    }

    fn found(city: &str) -> GeocodeResult {
        GeocodeResult::Found(AddressInfo {
            ciudad: Some(city.to_string()),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_click_resolves_through_geocoder() {
        let mut h = start();

        let sequence = h.handle.click(-74.08, 4.6).await.unwrap();
        assert_eq!(sequence, Some(1));
        assert_eq!(h.handle.snapshot().state, PickerState::AwaitingGeocode);

        let (point, answer) = h.calls.recv().await.unwrap();
        assert_eq!(point, Point::new(-74.08, 4.6).unwrap());
        answer.send(found("Bogotá")).unwrap();

        let report = h.reports.recv().await.unwrap();
        assert_eq!(report.sequence, 1);
        assert_eq!(report.address.unwrap().ciudad.as_deref(), Some("Bogotá"));

        let snapshot = h
            .handle
            .wait_for(|s| s.state == PickerState::Resolved)
            .await
            .unwrap();
        assert_eq!(snapshot.selection.unwrap().sequence, 1);
    }

    #[tokio::test]
    async fn test_late_response_for_earlier_click_is_discarded() {
        let mut h = start();

        h.handle.click(-74.08, 4.6).await.unwrap();
        h.handle.click(-75.56, 6.25).await.unwrap();

        let (first_point, first_answer) = h.calls.recv().await.unwrap();
        let (second_point, second_answer) = h.calls.recv().await.unwrap();
        assert_eq!(first_point, Point::new(-74.08, 4.6).unwrap());
        assert_eq!(second_point, Point::new(-75.56, 6.25).unwrap());

        // Newer lookup finishes first, older one arrives afterwards
        second_answer.send(found("Medellín")).unwrap();
        let report = h.reports.recv().await.unwrap();
        assert_eq!(report.point, second_point);

        first_answer.send(found("Bogotá")).unwrap();
        let snapshot = h.handle.wait_for(|s| s.stale_responses == 1).await.unwrap();

        let selection = snapshot.selection.unwrap();
        assert_eq!(selection.point, second_point);
        assert_eq!(selection.address.unwrap().ciudad.as_deref(), Some("Medellín"));
        assert!(h.reports.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_lookup_still_reports_coordinate() {
        let mut h = start();

        h.handle.click(10.0, 20.0).await.unwrap();
        let (_, answer) = h.calls.recv().await.unwrap();
        answer
            .send(GeocodeResult::NetworkError("503".to_string()))
            .unwrap();

        let report = h.reports.recv().await.unwrap();
        assert_eq!(report.point, Point::new(10.0, 20.0).unwrap());
        assert!(report.address.is_none());
    }

    #[tokio::test]
    async fn test_invalid_click_rejected() {
        let mut h = start();

        assert_eq!(h.handle.click(0.0, 100.0).await.unwrap(), None);
        assert_eq!(h.handle.snapshot().state, PickerState::Idle);
        assert!(h.calls.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_clear_then_late_response() {
        let mut h = start();

        h.handle.click(1.0, 1.0).await.unwrap();
        let (_, answer) = h.calls.recv().await.unwrap();
        h.handle.clear().unwrap();
        h.handle
            .wait_for(|s| s.state == PickerState::Idle)
            .await
            .unwrap();

        answer.send(GeocodeResult::Empty).unwrap();
        let snapshot = h.handle.wait_for(|s| s.stale_responses == 1).await.unwrap();
        assert!(snapshot.selection.is_none());
        assert!(h.reports.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_shutdown_stops_task() {
        let h = start();

        h.handle.shutdown().unwrap();
        h.task.await.unwrap();
        assert!(h.handle.click(1.0, 1.0).await.is_err());
    }
}

use crate::error::{Error, RecordError};
use crate::geo::{BoundingBox, Viewport};
use crate::models::{Locate, LocateResult, Station, StoredPosition, Stops, TripDetails, TripRow, VehiclePosition};
use futures::future::LocalBoxFuture;
use log::{info, warn};

pub(crate) const UNKNOWN_STOP: &str = "Unknown Stop | Unknown";
pub(crate) const STOP_CODE_WIDTH: usize = 5;

/// Geo indexed key value store holding the live vehicle positions.
pub(crate) trait PositionStore {
    /// Keys inside the box, in the order the index returns them.
    fn search_box<'a>(&'a self, area: &'a BoundingBox) -> LocalBoxFuture<'a, Result<Vec<String>, anyhow::Error>>;

    /// Fetches every key in one round trip. Each key comes back paired with its
    /// value, `None` when nothing is stored under it.
    fn batch_get<'a>(&'a self, keys: &'a [String]) -> LocalBoxFuture<'a, Result<Vec<(String, Option<String>)>, anyhow::Error>>;
}

/// Relational store holding the trip schedule and the station directory.
pub(crate) trait TripStore {
    fn trip<'a>(&'a self, trip_id: i32) -> LocalBoxFuture<'a, Result<Option<TripRow>, anyhow::Error>>;

    fn station<'a>(&'a self, stop_code: &'a str) -> LocalBoxFuture<'a, Result<Option<Station>, anyhow::Error>>;
}

#[derive(Debug)]
pub(crate) enum Resolution {
    Resolved(Locate),
    Skipped { key: String, reason: RecordError },
}

pub(crate) fn resolve(key: String, value: Option<String>) -> Resolution {
    let decoded = value
        .ok_or(RecordError::Missing)
        .and_then(|v| Ok(StoredPosition::from_json(&v)?))
        .and_then(|p| Ok(VehiclePosition::new(key.parse::<i32>()?, p)));
    match decoded {
        Ok(p) => Resolution::Resolved(p.into()),
        Err(reason) => Resolution::Skipped { key, reason },
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub(crate) async fn locate<P>(store: &P, viewport: &Viewport) -> Result<LocateResult, Error>
where
    P: PositionStore,
{
    let area = viewport.to_box();
    let keys = store.search_box(&area).await.map_err(Error::StoreUnavailable)?;
    info!("{} vehicles found", keys.len());
    if keys.is_empty() {
        return Ok(LocateResult {
            locates: vec![],
            timestamp: now(),
        });
    }
    let values = store.batch_get(&keys).await.map_err(Error::StoreUnavailable)?;
    let mut locates = Vec::with_capacity(values.len());
    for (key, value) in values {
        match resolve(key, value) {
            Resolution::Resolved(l) => locates.push(l),
            Resolution::Skipped { key, reason } => warn!("skipping position {}: {}", key, reason),
        }
    }
    Ok(LocateResult {
        locates,
        timestamp: now(),
    })
}

pub(crate) fn stop_key(stop_code: i32) -> String {
    format!("{:0width$}", stop_code, width = STOP_CODE_WIDTH)
}

async fn stop_name<T>(store: &T, stop_code: i32) -> String
where
    T: TripStore,
{
    let key = stop_key(stop_code);
    match store.station(&key).await {
        Ok(Some(s)) => format!("{} | {}", s.name.trim(), s.city.trim()),
        Ok(None) => {
            warn!("no station for stop code {}", key);
            UNKNOWN_STOP.to_owned()
        }
        Err(e) => {
            warn!("failed to look up station {}: {:#}", key, e);
            UNKNOWN_STOP.to_owned()
        }
    }
}

pub(crate) async fn trip_details<T>(store: &T, trip_id: i32) -> Result<TripDetails, Error>
where
    T: TripStore,
{
    let trip = store
        .trip(trip_id)
        .await
        .map_err(Error::StoreUnavailable)?
        .ok_or_else(|| Error::NotFound(format!("trip {}", trip_id)))?;
    let stops = Stops {
        first_stop: stop_name(store, trip.first_stop).await,
        prev_stop: stop_name(store, trip.prev_stop).await,
        last_stop: stop_name(store, trip.last_stop).await,
    };
    Ok(TripDetails {
        route_number: trip.route_number.trim().to_owned(),
        bus_type: trip.bus_type,
        stops,
        delay_seconds: trip.delay,
        start_time: trip.start_time.trim().to_owned(),
        end_time: trip.end_time.trim().to_owned(),
        timestamp: now(),
    })
}

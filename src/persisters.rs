use crate::core::TripStore;
use crate::models::{Station, TripRow};
use anyhow::{Context, Error};
use diesel::sql_types::{Integer, Text};
use diesel::{sql_query, OptionalExtension, QueryableByName};
use diesel_async::pooled_connection::bb8::Pool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use futures::future::LocalBoxFuture;

// Casts keep the row shape fixed whatever the exact column types are.
const TRIP_QUERY: &str = "SELECT route_number::text AS route_number, bus_type::integer AS bus_type, \
                          first_stop::integer AS first_stop, prev_stop::integer AS prev_stop, last_stop::integer AS last_stop, \
                          delay::integer AS delay, start_time::text AS start_time, end_time::text AS end_time \
                          FROM trips WHERE trip_id = $1";

const STATION_QUERY: &str = "SELECT station_name::text AS station_name, city::text AS city FROM stations WHERE stop_code = $1";

#[derive(QueryableByName)]
struct TripRecord {
    #[diesel(sql_type = Text)]
    route_number: String,
    #[diesel(sql_type = Integer)]
    bus_type: i32,
    #[diesel(sql_type = Integer)]
    first_stop: i32,
    #[diesel(sql_type = Integer)]
    prev_stop: i32,
    #[diesel(sql_type = Integer)]
    last_stop: i32,
    #[diesel(sql_type = Integer)]
    delay: i32,
    #[diesel(sql_type = Text)]
    start_time: String,
    #[diesel(sql_type = Text)]
    end_time: String,
}

impl From<TripRecord> for TripRow {
    fn from(r: TripRecord) -> Self {
        Self {
            route_number: r.route_number,
            bus_type: r.bus_type,
            first_stop: r.first_stop,
            prev_stop: r.prev_stop,
            last_stop: r.last_stop,
            delay: r.delay,
            start_time: r.start_time,
            end_time: r.end_time,
        }
    }
}

#[derive(QueryableByName)]
struct StationRecord {
    #[diesel(sql_type = Text)]
    station_name: String,
    #[diesel(sql_type = Text)]
    city: String,
}

/// Trip schedule and station directory in PostgreSQL.
#[derive(Clone)]
pub(crate) struct PgTripStore {
    pool: Pool<AsyncPgConnection>,
}

impl PgTripStore {
    pub async fn connect(url: &str, pool_size: u32) -> Result<Self, Error> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(url);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .await
            .context("failed to build postgres pool")?;
        Ok(Self { pool })
    }
}

impl TripStore for PgTripStore {
    fn trip<'a>(&'a self, trip_id: i32) -> LocalBoxFuture<'a, Result<Option<TripRow>, Error>> {
        Box::pin(async move {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|e| Error::msg(format!("failed to acquire connection: {}", e)))?;
            let record = sql_query(TRIP_QUERY)
                .bind::<Integer, _>(trip_id)
                .get_result::<TripRecord>(&mut *conn)
                .await
                .optional()
                .with_context(|| format!("select trip {}", trip_id))?;
            Ok(record.map(TripRow::from))
        })
    }

    fn station<'a>(&'a self, stop_code: &'a str) -> LocalBoxFuture<'a, Result<Option<Station>, Error>> {
        Box::pin(async move {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|e| Error::msg(format!("failed to acquire connection: {}", e)))?;
            let record = sql_query(STATION_QUERY)
                .bind::<Text, _>(stop_code)
                .get_result::<StationRecord>(&mut *conn)
                .await
                .optional()
                .with_context(|| format!("select station {}", stop_code))?;
            Ok(record.map(|r| Station {
                name: r.station_name,
                city: r.city,
            }))
        })
    }
}

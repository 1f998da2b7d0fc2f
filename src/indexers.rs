use crate::core::PositionStore;
use crate::geo::BoundingBox;
use anyhow::{Context, Error};
use futures::future::LocalBoxFuture;
use redis::aio::MultiplexedConnection;

/// Vehicle positions kept in a Redis geo set, with the serialized position of
/// each trip stored as a plain string under the same key.
#[derive(Clone)]
pub(crate) struct RedisPositionStore {
    conn: MultiplexedConnection,
    geo_key: String,
}

impl RedisPositionStore {
    pub async fn connect(url: &str, geo_key: &str) -> Result<Self, Error> {
        let client = redis::Client::open(url).with_context(|| format!("invalid redis url {}", url))?;
        let conn = client.get_multiplexed_tokio_connection().await.context("failed to connect to redis")?;
        Ok(Self {
            conn,
            geo_key: geo_key.to_owned(),
        })
    }
}

// GEOSEARCH key FROMLONLAT lng lat BYBOX width height m
fn geosearch(geo_key: &str, area: &BoundingBox) -> redis::Cmd {
    let mut cmd = redis::cmd("GEOSEARCH");
    cmd.arg(geo_key)
        .arg("FROMLONLAT")
        .arg(area.center.lng)
        .arg(area.center.lat)
        .arg("BYBOX")
        .arg(area.width_meters)
        .arg(area.height_meters)
        .arg("m");
    cmd
}

fn pipelined_get(keys: &[String]) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    for key in keys {
        pipe.cmd("GET").arg(key);
    }
    pipe
}

impl PositionStore for RedisPositionStore {
    fn search_box<'a>(&'a self, area: &'a BoundingBox) -> LocalBoxFuture<'a, Result<Vec<String>, Error>> {
        Box::pin(async move {
            let mut conn = self.conn.clone();
            let keys: Vec<String> = geosearch(&self.geo_key, area)
                .query_async(&mut conn)
                .await
                .with_context(|| format!("GEOSEARCH {}", self.geo_key))?;
            Ok(keys)
        })
    }

    // An error reply to any single GET (WRONGTYPE on one key, say) fails the
    // whole pipeline, so it surfaces as a batch failure rather than a skip.
    fn batch_get<'a>(&'a self, keys: &'a [String]) -> LocalBoxFuture<'a, Result<Vec<(String, Option<String>)>, Error>> {
        Box::pin(async move {
            let mut conn = self.conn.clone();
            let values: Vec<Option<String>> = pipelined_get(keys)
                .query_async(&mut conn)
                .await
                .context("pipelined GET")?;
            if values.len() != keys.len() {
                return Err(Error::msg(format!("pipeline returned {} replies for {} keys", values.len(), keys.len())));
            }
            Ok(keys.iter().cloned().zip(values).collect())
        })
    }
}

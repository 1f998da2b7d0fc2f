mod config;
mod core;
mod error;
mod geo;
mod handlers;
mod indexers;
mod models;
mod persisters;

use crate::config::Config;
use crate::handlers::{json_error, locate, path_error, trip_details};
use actix_web::{
    self,
    web::{get, post, Data, JsonConfig, PathConfig},
};
use anyhow::Context;
use indexers::RedisPositionStore;
use log::info;
use persisters::PgTripStore;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cfg = Config::from_env()?;

    let positions = RedisPositionStore::connect(&cfg.redis_url, &cfg.geo_key).await?;
    let trips = PgTripStore::connect(&cfg.database_url, cfg.database_pool_size).await?;

    info!("listening on {}", cfg.bind_addr);
    actix_web::HttpServer::new(move || {
        actix_web::App::new()
            .app_data(JsonConfig::default().error_handler(json_error))
            .app_data(PathConfig::default().error_handler(path_error))
            .app_data(Data::new(positions.clone()))
            .app_data(Data::new(trips.clone()))
            .route("/locate", post().to(locate::<RedisPositionStore>))
            .route("/trips/{trip_id}", get().to(trip_details::<PgTripStore>))
    })
    .bind(&cfg.bind_addr)
    .with_context(|| format!("failed to bind {}", cfg.bind_addr))?
    .run()
    .await?;
    info!("server stopped, closing store connections");
    Ok(())
}

use crate::core::{self, PositionStore, TripStore};
use crate::error::Error;
use crate::geo::{GeoPoint, Viewport};
use crate::models::{LocateResult, TripDetails};
use actix_web::error::{JsonPayloadError, PathError};
use actix_web::web::{Data, Json, Path};
use actix_web::HttpRequest;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LocateRequest {
    #[serde(alias = "cLat")]
    center_lat: f64,
    #[serde(alias = "cLng")]
    center_lng: f64,
    #[serde(alias = "b")]
    corner_lat: f64,
    #[serde(alias = "l")]
    corner_lng: f64,
}

impl From<LocateRequest> for Viewport {
    fn from(r: LocateRequest) -> Self {
        Viewport::new(GeoPoint::new(r.center_lat, r.center_lng), r.corner_lng, r.corner_lat)
    }
}

pub(crate) async fn locate<P>(Json(req): Json<LocateRequest>, store: Data<P>) -> Result<Json<LocateResult>, Error>
where
    P: PositionStore + 'static,
{
    let res = core::locate(store.get_ref(), &req.into()).await?;
    Ok(Json(res))
}

pub(crate) async fn trip_details<T>(trip_id: Path<i32>, store: Data<T>) -> Result<Json<TripDetails>, Error>
where
    T: TripStore + 'static,
{
    let res = core::trip_details(store.get_ref(), trip_id.into_inner()).await?;
    Ok(Json(res))
}

pub(crate) fn json_error(err: JsonPayloadError, _: &HttpRequest) -> actix_web::Error {
    Error::InvalidRequest(err.to_string()).into()
}

pub(crate) fn path_error(err: PathError, _: &HttpRequest) -> actix_web::Error {
    Error::InvalidRequest(err.to_string()).into()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::test::{position, sample_trips, MemoryPositions, MemoryTrips};
    use crate::core::UNKNOWN_STOP;
    use actix_web::http::StatusCode;
    use actix_web::web::{get, post, JsonConfig, PathConfig};
    use actix_web::{test, App};
    use serde_json::{json, Value};

    fn app_data(positions: MemoryPositions, trips: MemoryTrips) -> (Data<MemoryPositions>, Data<MemoryTrips>) {
        (Data::new(positions), Data::new(trips))
    }

    macro_rules! service {
        ($positions:expr, $trips:expr) => {{
            let (positions, trips) = app_data($positions, $trips);
            test::init_service(
                App::new()
                    .app_data(JsonConfig::default().error_handler(json_error))
                    .app_data(PathConfig::default().error_handler(path_error))
                    .app_data(positions)
                    .app_data(trips)
                    .route("/locate", post().to(locate::<MemoryPositions>))
                    .route("/trips/{trip_id}", get().to(trip_details::<MemoryTrips>)),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn test_locate_response_shape() {
        let app = service!(
            MemoryPositions::with(vec![("101", position(40.01, -74.02, 90)), ("102", "{".to_owned())]),
            MemoryTrips::default()
        );
        let req = test::TestRequest::post()
            .uri("/locate")
            .set_json(json!({"centerLat": 40.0, "centerLng": -74.0, "cornerLat": 39.9, "cornerLng": -74.1}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["locates"], json!([{"tripId": 101, "lat": 40.01, "lng": -74.02, "course": 90}]));
        assert!(body["timestamp"].as_i64().unwrap() > 0);
    }

    #[actix_web::test]
    async fn test_locate_accepts_short_field_names() {
        let app = service!(MemoryPositions::default(), MemoryTrips::default());
        let req = test::TestRequest::post()
            .uri("/locate")
            .set_json(json!({"cLat": 40.0, "cLng": -74.0, "b": 39.9, "l": -74.1}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["locates"], json!([]));
    }

    #[actix_web::test]
    async fn test_locate_store_down() {
        let positions = MemoryPositions {
            search_fails: true,
            ..Default::default()
        };
        let app = service!(positions, MemoryTrips::default());
        let req = test::TestRequest::post()
            .uri("/locate")
            .set_json(json!({"centerLat": 40.0, "centerLng": -74.0, "cornerLat": 39.9, "cornerLng": -74.1}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_web::test]
    async fn test_locate_bad_body() {
        let app = service!(MemoryPositions::default(), MemoryTrips::default());
        let req = test::TestRequest::post().uri("/locate").set_json(json!({"centerLat": 40.0})).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_trip_details_response_shape() {
        let app = service!(MemoryPositions::default(), sample_trips());
        let req = test::TestRequest::get().uri("/trips/1234").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["routeNumber"], "52");
        assert_eq!(body["busType"], 3);
        assert_eq!(body["delaySeconds"], 120);
        assert_eq!(body["startTime"], "08:15:00");
        assert_eq!(body["endTime"], "09:02:00");
        assert_eq!(
            body["stops"],
            json!({"firstStop": "Union Station | Toronto", "prevStop": UNKNOWN_STOP, "lastStop": "Oshawa GO | Oshawa"})
        );
    }

    #[actix_web::test]
    async fn test_trip_details_not_found() {
        let app = service!(MemoryPositions::default(), sample_trips());
        let req = test::TestRequest::get().uri("/trips/99").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "trip 99 not found");
    }

    #[actix_web::test]
    async fn test_trip_details_bad_id() {
        let app = service!(MemoryPositions::default(), sample_trips());
        let req = test::TestRequest::get().uri("/trips/abc").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

//! Router-level tests with in-memory storage and fake collaborators

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use chrono::Duration;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use restaurant_service::db::MemoryRestaurantStore;
use restaurant_service::geocoding::Geocoder;
use restaurant_service::{AppState, create_router};
use serde_json::{Value, json};
use shared::auth::JwtService;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::geo::{Coordinates, EARTH_RADIUS_KM};
use shared::identity::{IdentityClient, PartialLocation, Profile};
use shared::models::Role;
use tower::ServiceExt;

const SECRET: &str = "restaurant-service-test-secret-0000";

static NEXT_PHONE: AtomicU32 = AtomicU32::new(1);

/// Profiles keyed by token; a missing token behaves like an unreachable user service
#[derive(Default)]
struct FakeIdentity {
    profiles: Mutex<HashMap<String, Profile>>,
}

#[async_trait]
impl IdentityClient for FakeIdentity {
    async fn fetch_profile(&self, token: &str) -> AppResult<Profile> {
        self.profiles
            .lock()
            .get(token)
            .cloned()
            .ok_or_else(|| AppError::collaborator_unavailable("user", "user service unreachable"))
    }
}

const COLOMBO_FORT: &str = "1 Chatham St, Colombo 01";
const KANDY_TOWN: &str = "12 Dalada Veediya, Kandy";

/// Known addresses resolve to fixed points; anything else fails to geocode
struct AddressBookGeocoder;

#[async_trait]
impl Geocoder for AddressBookGeocoder {
    async fn geocode(&self, address: &str) -> AppResult<Coordinates> {
        match address {
            "Somewhere" => Ok(Coordinates::new(0.0, 0.0)),
            COLOMBO_FORT => Ok(Coordinates::new(6.9344, 79.8428)),
            KANDY_TOWN => Ok(Coordinates::new(7.2936, 80.6413)),
            _ => Err(AppError::new(ErrorCode::GeocodingFailed).with_detail("address", address)),
        }
    }
}

struct Harness {
    app: Router,
    jwt: JwtService,
    identity: Arc<FakeIdentity>,
}

impl Harness {
    fn new() -> Self {
        let jwt = JwtService::new(SECRET);
        let identity = Arc::new(FakeIdentity::default());
        let state = AppState::from_parts(
            jwt.clone(),
            Arc::new(MemoryRestaurantStore::new()),
            Arc::new(AddressBookGeocoder),
            identity.clone(),
        );
        Self {
            app: create_router(state),
            jwt,
            identity,
        }
    }

    fn token(&self, user_id: &str, role: Role) -> String {
        self.jwt.issue(user_id, role, Duration::hours(1)).unwrap()
    }

    fn set_profile(&self, token: &str, profile: Profile) {
        self.identity
            .profiles
            .lock()
            .insert(token.to_string(), profile);
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {t}"));
        }
        let req = match body {
            Some(b) => builder
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = self.app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Submit and approve a restaurant `km` north of the origin
    async fn approved_restaurant(&self, owner: &str, tag: &str, km: f64) -> String {
        let operator = self.token(owner, Role::RestaurantAdmin);
        let admin = self.token("admin", Role::Admin);
        let lat = (km / EARTH_RADIUS_KM).to_degrees();
        let (status, body) = self
            .call(
                Method::POST,
                "/add-restaurant",
                Some(&operator),
                Some(json!({
                    "name": format!("Restaurant {tag}"),
                    "email": format!("{tag}@example.com"),
                    "phone": format!("077{:07}", NEXT_PHONE.fetch_add(1, Ordering::Relaxed)),
                    "address": "Somewhere",
                    "cuisineType": "Sri Lankan",
                    "location": {"latitude": lat, "longitude": 0.0}
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let id = body["restaurant"]["id"].as_str().unwrap().to_string();
        let (status, _) = self
            .call(Method::PUT, &format!("/approve/{id}"), Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        id
    }
}

fn located(lat: f64, lon: f64) -> Profile {
    Profile {
        location: Some(PartialLocation {
            latitude: Some(lat),
            longitude: Some(lon),
        }),
        ..Default::default()
    }
}

#[tokio::test]
async fn health_is_public() {
    let h = Harness::new();
    let (status, body) = h.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn nearby_end_to_end() {
    let h = Harness::new();
    h.approved_restaurant("o1", "a", 1.2).await;
    h.approved_restaurant("o1", "bb", 4.9).await;
    h.approved_restaurant("o2", "ccc", 5.01).await;
    h.approved_restaurant("o2", "dddd", 3.0).await;

    let customer = h.token("c1", Role::Customer);
    h.set_profile(&customer, located(0.0, 0.0));

    let (status, body) = h
        .call(Method::GET, "/nearby-restaurants", Some(&customer), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["searchRadius"], 5.0);
    assert_eq!(body["count"], 3);
    assert_eq!(body["userLocation"]["latitude"], 0.0);
    let distances: Vec<f64> = body["restaurants"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["distance"].as_f64().unwrap())
        .collect();
    assert_eq!(distances, [1.2, 3.0, 4.9]);
    assert_eq!(body["restaurants"][0]["name"], "Restaurant a");
}

#[tokio::test]
async fn nearby_honours_max_distance() {
    let h = Harness::new();
    h.approved_restaurant("o1", "near", 1.0).await;
    h.approved_restaurant("o1", "far", 8.0).await;
    let customer = h.token("c1", Role::Customer);
    h.set_profile(&customer, located(0.0, 0.0));

    let (_, body) = h
        .call(Method::GET, "/nearby-restaurants?maxDistance=10", Some(&customer), None)
        .await;
    assert_eq!(body["count"], 2);

    let (_, body) = h
        .call(Method::GET, "/nearby-restaurants?maxDistance=abc", Some(&customer), None)
        .await;
    assert_eq!(body["searchRadius"], 5.0);
    assert_eq!(body["count"], 1);

    let (status, _) = h
        .call(Method::GET, "/nearby-restaurants?maxDistance=-3", Some(&customer), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn nearby_without_location_is_400() {
    let h = Harness::new();
    let customer = h.token("c1", Role::Customer);
    h.set_profile(&customer, Profile::default());
    let (status, body) = h
        .call(Method::GET, "/nearby-restaurants", Some(&customer), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], ErrorCode::LocationUnavailable.code());
}

#[tokio::test]
async fn nearby_with_unreachable_identity_is_503() {
    let h = Harness::new();
    let customer = h.token("c1", Role::Customer);
    let (status, body) = h
        .call(Method::GET, "/nearby-restaurants", Some(&customer), None)
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], ErrorCode::CollaboratorUnavailable.code());
}

#[tokio::test]
async fn nearby_requires_token() {
    let h = Harness::new();
    let (status, _) = h.call(Method::GET, "/nearby-restaurants", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn role_gates() {
    let h = Harness::new();
    let customer = h.token("c1", Role::Customer);
    let operator = h.token("o1", Role::RestaurantAdmin);

    let (status, _) = h
        .call(Method::POST, "/add-restaurant", Some(&customer), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = h
        .call(Method::PUT, "/approve/whatever", Some(&operator), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = h
        .call(Method::PUT, "/approve/whatever", Some(&h.token("a", Role::Admin)), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], ErrorCode::RestaurantNotFound.code());
}

#[tokio::test]
async fn submit_missing_fields_is_400() {
    let h = Harness::new();
    let operator = h.token("o1", Role::RestaurantAdmin);
    let (status, body) = h
        .call(
            Method::POST,
            "/add-restaurant",
            Some(&operator),
            Some(json!({"name": "Only a name"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], ErrorCode::RequiredField.code());
}

#[tokio::test]
async fn owner_update_and_reads() {
    let h = Harness::new();
    let id = h.approved_restaurant("o1", "mine", 1.0).await;
    let owner = h.token("o1", Role::RestaurantAdmin);
    let other = h.token("o2", Role::RestaurantAdmin);

    let (status, _) = h
        .call(
            Method::PUT,
            &format!("/update-restaurant/{id}"),
            Some(&other),
            Some(json!({"isOpen": false})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = h
        .call(
            Method::PUT,
            &format!("/update-restaurant/{id}"),
            Some(&owner),
            Some(json!({"isOpen": false, "status": "rejected", "ownerId": "o2"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["restaurant"]["isOpen"], false);
    assert_eq!(body["restaurant"]["status"], "approved");
    assert_eq!(body["restaurant"]["ownerId"], "o1");

    let (_, body) = h.call(Method::GET, "/my-restaurants", Some(&owner), None).await;
    assert_eq!(body["restaurants"].as_array().unwrap().len(), 1);

    let (_, body) = h.call(Method::GET, "/check-owner", Some(&owner), None).await;
    assert_eq!(body["exists"], true);
    let (_, body) = h.call(Method::GET, "/check-owner", Some(&other), None).await;
    assert_eq!(body["exists"], false);

    let (status, body) = h
        .call(Method::GET, &format!("/restaurants/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());

    let (_, body) = h.call(Method::GET, "/all-restaurants", None, None).await;
    assert_eq!(body["restaurants"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn submitted_address_is_geocoded_and_stored() {
    let h = Harness::new();
    let owner = h.token("o1", Role::RestaurantAdmin);
    let (status, body) = h
        .call(
            Method::POST,
            "/add-restaurant",
            Some(&owner),
            Some(json!({
                "name": "Fort Kottu",
                "email": "fort@example.com",
                "phone": "0112345678",
                "address": COLOMBO_FORT,
                "cuisineType": "Sri Lankan"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["restaurant"]["id"].as_str().unwrap().to_string();

    let (status, body) = h
        .call(Method::GET, &format!("/restaurants/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["address"], COLOMBO_FORT);
    assert_eq!(body["location"], json!({"latitude": 6.9344, "longitude": 79.8428}));

    let (status, _) = h
        .call(
            Method::PUT,
            &format!("/update-restaurant/{id}"),
            Some(&owner),
            Some(json!({"address": KANDY_TOWN})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = h
        .call(Method::GET, &format!("/restaurants/{id}"), None, None)
        .await;
    assert_eq!(body["location"], json!({"latitude": 7.2936, "longitude": 80.6413}));
}

#[tokio::test]
async fn unresolvable_address_is_rejected() {
    let h = Harness::new();
    let owner = h.token("o1", Role::RestaurantAdmin);
    let (status, body) = h
        .call(
            Method::POST,
            "/add-restaurant",
            Some(&owner),
            Some(json!({
                "name": "Nowhere Cafe",
                "email": "nowhere@example.com",
                "phone": "0119876543",
                "address": "Atlantis",
                "cuisineType": "Fusion"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], ErrorCode::GeocodingFailed.code());

    let (_, body) = h.call(Method::GET, "/my-restaurants", Some(&owner), None).await;
    assert_eq!(body["restaurants"].as_array().unwrap().len(), 0);
}

use crate::config::settings::PlacesSettings;
use crate::config::theatre::BusinessCategory;
use crate::domain::model::{CategoryPlaces, Place};
use crate::domain::ports::{PlacesProvider, PlacesQuery};
use crate::utils::error::Result;
use crate::utils::geo::calculate_distance;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDateTime, Timelike};
use reqwest::Client;
use serde::Deserialize;

/// Nearby dining lookups against the Google Places web service.
pub struct GooglePlacesClient {
    client: Client,
    search_endpoint: String,
    details_endpoint: String,
    max_results: usize,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    #[serde(default)]
    results: Vec<NearbyResult>,
}

#[derive(Debug, Deserialize)]
struct NearbyResult {
    place_id: Option<String>,
    name: Option<String>,
    rating: Option<f64>,
    vicinity: Option<String>,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    result: Option<DetailsResult>,
}

#[derive(Debug, Deserialize)]
struct DetailsResult {
    opening_hours: Option<OpeningHours>,
}

/// `opening_hours` from a place details response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub periods: Vec<Period>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Period {
    pub open: PeriodPoint,
    pub close: Option<PeriodPoint>,
}

/// `day` is 0 for Sunday; `time` is `HHMM`.
#[derive(Debug, Clone, Deserialize)]
pub struct PeriodPoint {
    pub day: u8,
    pub time: Option<String>,
}

/// A search hit before filtering.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub place_id: String,
    pub name: String,
    pub rating: Option<f64>,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

impl GooglePlacesClient {
    pub fn new(client: Client, settings: &PlacesSettings, api_key: Option<String>) -> Self {
        Self {
            client,
            search_endpoint: settings.search_endpoint.clone(),
            details_endpoint: settings.details_endpoint.clone(),
            max_results: settings.max_results_per_category,
            api_key,
        }
    }

    async fn fetch_candidates(
        &self,
        api_key: &str,
        latitude: f64,
        longitude: f64,
        radius: u32,
        keyword: &str,
    ) -> Result<Vec<Candidate>> {
        let query = [
            ("location", format!("{},{}", latitude, longitude)),
            ("radius", radius.to_string()),
            ("keyword", keyword.to_string()),
            ("key", api_key.to_string()),
            ("type", "establishment".to_string()),
        ];

        tracing::debug!("Places nearby search: keyword='{}' radius={}", keyword, radius);
        let response = self
            .client
            .get(&self.search_endpoint)
            .query(&query)
            .send()
            .await?;
        let data: NearbySearchResponse = response.json().await?;

        let candidates = data
            .results
            .into_iter()
            .filter_map(|r| {
                let location = r.geometry?.location;
                Some(Candidate {
                    place_id: r.place_id?,
                    name: r.name?,
                    rating: r.rating,
                    address: r.vicinity.unwrap_or_default(),
                    lat: location.lat,
                    lng: location.lng,
                })
            })
            .collect();
        Ok(candidates)
    }

    async fn fetch_opening_hours(&self, api_key: &str, place_id: &str) -> Result<Option<OpeningHours>> {
        let query = [
            ("place_id", place_id),
            ("fields", "opening_hours"),
            ("key", api_key),
        ];
        let response = self
            .client
            .get(&self.details_endpoint)
            .query(&query)
            .send()
            .await?;
        let data: DetailsResponse = response.json().await?;
        Ok(data.result.and_then(|r| r.opening_hours))
    }

    /// Open at every check time. Missing hours or lookup errors count as closed.
    async fn is_open_for_all(&self, api_key: &str, place: &Place, check_times: &[NaiveDateTime]) -> bool {
        match self.fetch_opening_hours(api_key, &place.place_id).await {
            Ok(Some(hours)) => check_times.iter().all(|t| is_open_at(&hours, *t)),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("⚠️ Error checking hours for {}: {}", place.place_id, e);
                false
            }
        }
    }

    async fn places_for_category(
        &self,
        api_key: &str,
        query: &PlacesQuery<'_>,
        category: &BusinessCategory,
    ) -> Vec<Place> {
        let search_radius = query.radius_meters.max(query.whitelist_radius_meters);
        let candidates = match self
            .fetch_candidates(api_key, query.latitude, query.longitude, search_radius, &category.keyword)
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!("⚠️ Places search failed for '{}': {}", category.name, e);
                return Vec::new();
            }
        };

        let ranked = rank_candidates(candidates, query);
        let mut valid = Vec::new();
        for place in ranked {
            if self.is_open_for_all(api_key, &place, &query.check_times).await {
                valid.push(place);
                if valid.len() >= self.max_results {
                    break;
                }
            }
        }

        tracing::debug!("Category '{}': {} places open for the show window", category.name, valid.len());
        valid
    }
}

#[async_trait]
impl PlacesProvider for GooglePlacesClient {
    async fn get_nearby_places(&self, query: &PlacesQuery<'_>) -> Vec<CategoryPlaces> {
        let mut results = Vec::with_capacity(query.categories.len());
        for category in query.categories {
            let places = match self.api_key.as_deref() {
                Some(api_key) => self.places_for_category(api_key, query, category).await,
                None => vec![Place::mock()],
            };
            results.push(CategoryPlaces {
                name: category.name.clone(),
                places,
            });
        }
        results
    }
}

/// Applies the blacklist, whitelist promotion and radius rules, then orders
/// promoted places first and nearer places before farther ones.
pub fn rank_candidates(candidates: Vec<Candidate>, query: &PlacesQuery<'_>) -> Vec<Place> {
    let whitelist: Vec<String> = query.lists.whitelist.iter().map(|w| w.to_lowercase()).collect();
    let blacklist: Vec<String> = query.lists.blacklist.iter().map(|b| b.to_lowercase()).collect();

    let mut places: Vec<Place> = candidates
        .into_iter()
        .filter_map(|c| {
            let name = c.name.to_lowercase();
            if blacklist.iter().any(|b| name.contains(b.as_str())) {
                return None;
            }

            let is_promoted = whitelist.iter().any(|w| name.contains(w.as_str()));
            let distance_m = calculate_distance(query.latitude, query.longitude, c.lat, c.lng);
            let limit = if is_promoted {
                query.whitelist_radius_meters
            } else {
                query.radius_meters
            };
            if distance_m > f64::from(limit) {
                return None;
            }

            let map_url = build_map_url(&c.name, &c.address, &c.place_id);
            Some(Place {
                place_id: c.place_id,
                name: c.name,
                rating: c.rating,
                address: c.address,
                lat: c.lat,
                lng: c.lng,
                distance_m,
                is_promoted,
                map_url,
            })
        })
        .collect();

    places.sort_by(|a, b| {
        b.is_promoted
            .cmp(&a.is_promoted)
            .then(a.distance_m.total_cmp(&b.distance_m))
    });
    places
}

/// Google Maps universal link pinned to the place ID.
pub fn build_map_url(name: &str, address: &str, place_id: &str) -> String {
    let label = format!("{}, {}", name, address);
    let query: String = url::form_urlencoded::byte_serialize(label.as_bytes()).collect();
    format!(
        "https://www.google.com/maps/search/?api=1&query={}&query_place_id={}",
        query, place_id
    )
}

/// Whether the opening hours cover `target` (wall-clock time at the venue).
///
/// A period opening Sunday at `0000` with no close means open around the clock.
/// Periods where open >= close run past midnight.
pub fn is_open_at(hours: &OpeningHours, target: NaiveDateTime) -> bool {
    let google_day = target.weekday().num_days_from_sunday() as u8;
    let target_time = target.hour() * 100 + target.minute();

    for period in &hours.periods {
        let open_time = period.open.time.as_deref();
        if period.open.day == 0 && open_time == Some("0000") && period.close.is_none() {
            return true;
        }

        if period.open.day != google_day {
            continue;
        }

        let open = open_time.and_then(|t| t.parse::<u32>().ok());
        let close = period
            .close
            .as_ref()
            .and_then(|c| c.time.as_deref())
            .and_then(|t| t.parse::<u32>().ok());
        let (Some(open), Some(close)) = (open, close) else {
            // Unverifiable hours: treat as closed.
            return false;
        };

        if open < close {
            if open <= target_time && target_time < close {
                return true;
            }
        } else if target_time >= open || target_time < close {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::theatre::PlaceLists;
    use httpmock::prelude::*;
    use serde_json::json;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn hours(periods: serde_json::Value) -> OpeningHours {
        serde_json::from_value(json!({ "periods": periods })).unwrap()
    }

    // 2025-11-20 is a Thursday (Google day 4).

    #[test]
    fn test_standard_hours() {
        let h = hours(json!([{"open": {"day": 4, "time": "1100"}, "close": {"day": 4, "time": "2200"}}]));
        assert!(is_open_at(&h, dt("2025-11-20T18:30:00")));
        assert!(is_open_at(&h, dt("2025-11-20T11:00:00")));
        assert!(!is_open_at(&h, dt("2025-11-20T22:00:00")));
        assert!(!is_open_at(&h, dt("2025-11-21T18:30:00")));
    }

    #[test]
    fn test_late_night_hours() {
        let h = hours(json!([{"open": {"day": 4, "time": "1800"}, "close": {"day": 5, "time": "0200"}}]));
        assert!(is_open_at(&h, dt("2025-11-20T23:00:00")));
        assert!(is_open_at(&h, dt("2025-11-20T01:00:00")));
        assert!(!is_open_at(&h, dt("2025-11-20T17:00:00")));
    }

    #[test]
    fn test_always_open() {
        let h = hours(json!([{"open": {"day": 0, "time": "0000"}}]));
        assert!(is_open_at(&h, dt("2025-11-20T03:00:00")));
    }

    #[test]
    fn test_missing_close_is_closed() {
        let h = hours(json!([{"open": {"day": 4, "time": "1100"}}]));
        assert!(!is_open_at(&h, dt("2025-11-20T12:00:00")));
        assert!(!is_open_at(&OpeningHours::default(), dt("2025-11-20T12:00:00")));
    }

    fn candidate(id: &str, name: &str, lat: f64, lng: f64) -> Candidate {
        Candidate {
            place_id: id.to_string(),
            name: name.to_string(),
            rating: Some(4.5),
            address: "1 Main St".to_string(),
            lat,
            lng,
        }
    }

    #[test]
    fn test_rank_candidates() {
        let lists = PlaceLists {
            whitelist: vec!["Sponsor".to_string()],
            blacklist: vec!["burger chain".to_string()],
        };
        let query = PlacesQuery {
            latitude: 40.0,
            longitude: -75.0,
            radius_meters: 500,
            whitelist_radius_meters: 1500,
            categories: &[],
            check_times: vec![],
            lists: &lists,
        };

        // ~0.0009 deg latitude is about 100 m.
        let ranked = rank_candidates(
            vec![
                candidate("far", "Far Bistro", 40.0090, -75.0),
                candidate("near", "Near Cafe", 40.0009, -75.0),
                candidate("mid", "Mid Diner", 40.0027, -75.0),
                candidate("bad", "Big Burger Chain", 40.0001, -75.0),
                candidate("promo", "The Sponsor Tavern", 40.0100, -75.0),
                candidate("promo_far", "Sponsor Annex", 40.0300, -75.0),
            ],
            &query,
        );

        let ids: Vec<&str> = ranked.iter().map(|p| p.place_id.as_str()).collect();
        assert_eq!(ids, vec!["promo", "near", "mid"]);
        assert!(ranked[0].is_promoted);
        assert!(ranked[1].distance_m < ranked[2].distance_m);
        assert!(ranked[1].map_url.contains("query_place_id=near"));
    }

    #[test]
    fn test_map_url_encoding() {
        assert_eq!(
            build_map_url("Joe's Pizza", "12 Elm St", "abc"),
            "https://www.google.com/maps/search/?api=1&query=Joe%27s+Pizza%2C+12+Elm+St&query_place_id=abc"
        );
    }

    fn client_for(server: &MockServer, key: Option<&str>) -> GooglePlacesClient {
        let settings = PlacesSettings {
            search_endpoint: server.url("/nearbysearch/json"),
            details_endpoint: server.url("/details/json"),
            max_results_per_category: 3,
        };
        GooglePlacesClient::new(Client::new(), &settings, key.map(str::to_string))
    }

    fn search_result(id: &str, name: &str, lat: f64) -> serde_json::Value {
        json!({
            "place_id": id,
            "name": name,
            "rating": 4.2,
            "vicinity": "Main St",
            "geometry": {"location": {"lat": lat, "lng": -75.0}}
        })
    }

    #[tokio::test]
    async fn test_time_guard_and_limit() {
        let server = MockServer::start();
        let search = server.mock(|when, then| {
            when.method(GET)
                .path("/nearbysearch/json")
                .query_param("keyword", "restaurant")
                .query_param("radius", "1500")
                .query_param("type", "establishment");
            then.status(200).json_body(json!({
                "results": [
                    search_result("p1", "One", 40.0001),
                    search_result("p2", "Two", 40.0002),
                    search_result("p3", "Three", 40.0003),
                    search_result("p4", "Four", 40.0004),
                    search_result("p5", "Five", 40.0005)
                ]
            }));
        });

        let open = json!({"result": {"opening_hours": {"periods": [
            {"open": {"day": 4, "time": "1100"}, "close": {"day": 4, "time": "2300"}}
        ]}}});
        let closes_early = json!({"result": {"opening_hours": {"periods": [
            {"open": {"day": 4, "time": "1100"}, "close": {"day": 4, "time": "1845"}}
        ]}}});

        let p1 = server.mock(|when, then| {
            when.method(GET).path("/details/json").query_param("place_id", "p1");
            then.status(200).json_body(open.clone());
        });
        let p2 = server.mock(|when, then| {
            when.method(GET).path("/details/json").query_param("place_id", "p2");
            then.status(200).json_body(closes_early.clone());
        });
        let p3 = server.mock(|when, then| {
            when.method(GET).path("/details/json").query_param("place_id", "p3");
            then.status(200).json_body(json!({"result": {}}));
        });
        let p4 = server.mock(|when, then| {
            when.method(GET).path("/details/json").query_param("place_id", "p4");
            then.status(200).json_body(open.clone());
        });
        let p5 = server.mock(|when, then| {
            when.method(GET).path("/details/json").query_param("place_id", "p5");
            then.status(200).json_body(open.clone());
        });
        let p6 = server.mock(|when, then| {
            when.method(GET).path("/details/json").query_param("place_id", "p6");
            then.status(200).json_body(open.clone());
        });

        let lists = PlaceLists::default();
        let categories = vec![BusinessCategory {
            name: "Dinner".to_string(),
            keyword: "restaurant".to_string(),
        }];
        let query = PlacesQuery {
            latitude: 40.0,
            longitude: -75.0,
            radius_meters: 800,
            whitelist_radius_meters: 1500,
            categories: &categories,
            check_times: vec![dt("2025-11-20T18:30:00"), dt("2025-11-20T19:15:00")],
            lists: &lists,
        };

        let client = client_for(&server, Some("gkey"));
        let results = client.get_nearby_places(&query).await;

        search.assert();
        p1.assert();
        p2.assert();
        p3.assert();
        p4.assert();
        p5.assert();
        p6.assert_hits(0);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Dinner");
        let ids: Vec<&str> = results[0].places.iter().map(|p| p.place_id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p4", "p5"]);
    }

    #[tokio::test]
    async fn test_search_failure_yields_empty_category() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/nearbysearch/json");
            then.status(500).body("oops");
        });

        let lists = PlaceLists::default();
        let categories = vec![BusinessCategory {
            name: "Drinks".to_string(),
            keyword: "bar".to_string(),
        }];
        let query = PlacesQuery {
            latitude: 40.0,
            longitude: -75.0,
            radius_meters: 800,
            whitelist_radius_meters: 1500,
            categories: &categories,
            check_times: vec![],
            lists: &lists,
        };

        let results = client_for(&server, Some("gkey")).get_nearby_places(&query).await;
        assert_eq!(results.len(), 1);
        assert!(results[0].places.is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_returns_mock_places() {
        let server = MockServer::start();
        let search = server.mock(|when, then| {
            when.path("/nearbysearch/json");
            then.status(200);
        });

        let lists = PlaceLists::default();
        let categories = vec![
            BusinessCategory {
                name: "Dinner".to_string(),
                keyword: "restaurant".to_string(),
            },
            BusinessCategory {
                name: "Dessert".to_string(),
                keyword: "dessert".to_string(),
            },
        ];
        let query = PlacesQuery {
            latitude: 40.0,
            longitude: -75.0,
            radius_meters: 800,
            whitelist_radius_meters: 1500,
            categories: &categories,
            check_times: vec![],
            lists: &lists,
        };

        let results = client_for(&server, None).get_nearby_places(&query).await;
        search.assert_hits(0);
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].name, "Dessert");
        assert_eq!(results[1].places, vec![Place::mock()]);
    }
}

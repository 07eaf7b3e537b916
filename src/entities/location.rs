use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Great-circle distance in kilometers.
    pub fn haversine_km(&self, other: &Coordinates) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_KM * c
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Airport,
    Landmark,
    Resort,
    Border,
    City,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name_en: String,
    pub name_ru: String,
    pub category: Category,
    pub coordinates: Coordinates,
}

impl Location {
    pub fn new(
        id: &str,
        name_en: &str,
        name_ru: &str,
        category: Category,
        lat: f64,
        lng: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name_en: name_en.into(),
            name_ru: name_ru.into(),
            category,
            coordinates: Coordinates { lat, lng },
        }
    }

    /// Lower-cased names this location answers to.
    pub fn keys(&self) -> [String; 3] {
        [
            self.id.to_lowercase(),
            self.name_en.to_lowercase(),
            self.name_ru.to_lowercase(),
        ]
    }
}

#[test]
fn haversine_same_point() {
    let tbilisi = Coordinates {
        lat: 41.7151,
        lng: 44.8271,
    };

    assert!(tbilisi.haversine_km(&tbilisi) < 0.001);
}

#[test]
fn haversine_tbilisi_batumi() {
    let tbilisi = Coordinates {
        lat: 41.7151,
        lng: 44.8271,
    };
    let batumi = Coordinates {
        lat: 41.6168,
        lng: 41.6367,
    };

    // roughly 265 km as the crow flies
    let distance = tbilisi.haversine_km(&batumi);
    assert!(distance > 250.0 && distance < 280.0, "got {}", distance);
    assert!((distance - batumi.haversine_km(&tbilisi)).abs() < 1e-9);
}

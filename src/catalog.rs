//! Reference table of the places the booking flow knows coordinates for.

use crate::entities::{Category, Location};

/// Shortest query that is allowed to match by substring.
const MIN_FUZZY_LEN: usize = 3;

#[derive(Clone, Debug)]
pub struct LocationTable {
    entries: Vec<(Location, [String; 3])>,
}

impl LocationTable {
    pub fn new(locations: Vec<Location>) -> Self {
        let entries = locations
            .into_iter()
            .map(|location| {
                let keys = location.keys();
                (location, keys)
            })
            .collect();

        Self { entries }
    }

    pub fn georgia() -> Self {
        use Category::*;

        Self::new(vec![
            Location::new("tbilisi", "Tbilisi", "Тбилиси", City, 41.7151, 44.8271),
            Location::new("tbilisi_airport", "Tbilisi Airport", "Аэропорт Тбилиси", Airport, 41.6692, 44.9547),
            Location::new("kutaisi", "Kutaisi", "Кутаиси", City, 42.2679, 42.6946),
            Location::new("kutaisi_airport", "Kutaisi Airport", "Аэропорт Кутаиси", Airport, 42.1764, 42.4826),
            Location::new("batumi", "Batumi", "Батуми", City, 41.6168, 41.6367),
            Location::new("batumi_airport", "Batumi Airport", "Аэропорт Батуми", Airport, 41.6103, 41.5997),
            Location::new("mtskheta", "Mtskheta", "Мцхета", City, 41.8416, 44.7186),
            Location::new("gori", "Gori", "Гори", City, 41.9842, 44.1158),
            Location::new("telavi", "Telavi", "Телави", City, 41.9198, 45.4731),
            Location::new("sighnaghi", "Sighnaghi", "Сигнахи", City, 41.6196, 45.9222),
            Location::new("kvareli", "Kvareli", "Кварели", City, 41.9483, 45.8104),
            Location::new("zugdidi", "Zugdidi", "Зугдиди", City, 42.5088, 41.8709),
            Location::new("poti", "Poti", "Поти", City, 42.1462, 41.6720),
            Location::new("gudauri", "Gudauri", "Гудаури", Resort, 42.4776, 44.4786),
            Location::new("kazbegi", "Kazbegi", "Казбеги", Resort, 42.6573, 44.6433),
            Location::new("borjomi", "Borjomi", "Боржоми", Resort, 41.8397, 43.3797),
            Location::new("bakuriani", "Bakuriani", "Бакуриани", Resort, 41.7497, 43.5297),
            Location::new("mestia", "Mestia", "Местиа", Resort, 43.0453, 42.7250),
            Location::new("kobuleti", "Kobuleti", "Кобулети", Resort, 41.8214, 41.7792),
            Location::new("ureki", "Ureki", "Уреки", Resort, 41.9961, 41.7783),
            Location::new("tskaltubo", "Tskaltubo", "Цхалтубо", Resort, 42.3289, 42.5997),
            Location::new("ananuri", "Ananuri Fortress", "Крепость Ананури", Landmark, 42.1640, 44.7030),
            Location::new("uplistsikhe", "Uplistsikhe", "Уплисцихе", Landmark, 41.9672, 44.2081),
            Location::new("vardzia", "Vardzia", "Вардзия", Landmark, 41.3811, 43.2842),
            Location::new("prometheus_cave", "Prometheus Cave", "Пещера Прометея", Landmark, 42.3767, 42.6008),
            Location::new("martvili_canyon", "Martvili Canyon", "Мартвильский каньон", Landmark, 42.4575, 42.3775),
            Location::new("sarpi", "Sarpi Border", "Граница Сарпи", Border, 41.5211, 41.5486),
            Location::new("lars", "Upper Lars Border", "Верхний Ларс", Border, 42.7411, 44.6306),
            Location::new("red_bridge", "Red Bridge Border", "Красный мост", Border, 41.3300, 45.1100),
            Location::new("sadakhlo", "Sadakhlo Border", "Садахло", Border, 41.2483, 44.8139),
        ])
    }

    pub fn all(&self) -> impl Iterator<Item = &Location> {
        self.entries.iter().map(|(location, _)| location)
    }

    /// Case-insensitive lookup on id, English or Russian name. Exact matches
    /// win, then names containing the query, then the longest name the query
    /// contains.
    pub fn resolve(&self, name: &str) -> Option<&Location> {
        let query = name.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        if let Some((location, _)) = self
            .entries
            .iter()
            .find(|(_, keys)| keys.iter().any(|key| *key == query))
        {
            return Some(location);
        }

        if query.chars().count() < MIN_FUZZY_LEN {
            return None;
        }

        if let Some((location, _)) = self
            .entries
            .iter()
            .find(|(_, keys)| keys.iter().any(|key| key.contains(&query)))
        {
            return Some(location);
        }

        self.entries
            .iter()
            .filter_map(|(location, keys)| {
                keys.iter()
                    .filter(|key| key.chars().count() >= MIN_FUZZY_LEN && query.contains(key.as_str()))
                    .map(|key| key.len())
                    .max()
                    .map(|len| (len, location))
            })
            .max_by_key(|(len, _)| *len)
            .map(|(_, location)| location)
    }
}

impl Default for LocationTable {
    fn default() -> Self {
        Self::georgia()
    }
}

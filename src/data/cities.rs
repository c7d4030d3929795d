//! 城市参考表：下拉选择框与 city_lookup 工具共用
//!
//! 只读静态数据，进程内共享，无需加载。

use std::collections::BTreeMap;

use serde::Serialize;

/// 城市记录（名称、国家、经纬度）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct City {
    pub name: &'static str,
    pub country: &'static str,
    pub lat: f64,
    pub lon: f64,
}

const fn city(name: &'static str, country: &'static str, lat: f64, lon: f64) -> City {
    City {
        name,
        country,
        lat,
        lon,
    }
}

pub static CITIES: &[City] = &[
    city("Tokyo", "Japan", 35.6762, 139.6503),
    city("Osaka", "Japan", 34.6937, 135.5023),
    city("Kyoto", "Japan", 35.0116, 135.7681),
    city("Seoul", "South Korea", 37.5665, 126.9780),
    city("Busan", "South Korea", 35.1796, 129.0756),
    city("Beijing", "China", 39.9042, 116.4074),
    city("Shanghai", "China", 31.2304, 121.4737),
    city("Hong Kong", "China", 22.3193, 114.1694),
    city("Singapore", "Singapore", 1.3521, 103.8198),
    city("Bangkok", "Thailand", 13.7563, 100.5018),
    city("Mumbai", "India", 19.0760, 72.8777),
    city("Delhi", "India", 28.7041, 77.1025),
    city("Dubai", "United Arab Emirates", 25.2048, 55.2708),
    city("Istanbul", "Turkey", 41.0082, 28.9784),
    city("Cairo", "Egypt", 30.0444, 31.2357),
    city("Cape Town", "South Africa", -33.9249, 18.4241),
    city("Nairobi", "Kenya", -1.2921, 36.8219),
    city("London", "United Kingdom", 51.5074, -0.1278),
    city("Edinburgh", "United Kingdom", 55.9533, -3.1883),
    city("Paris", "France", 48.8566, 2.3522),
    city("Lyon", "France", 45.7640, 4.8357),
    city("Berlin", "Germany", 52.5200, 13.4050),
    city("Munich", "Germany", 48.1351, 11.5820),
    city("Madrid", "Spain", 40.4168, -3.7038),
    city("Barcelona", "Spain", 41.3874, 2.1686),
    city("Rome", "Italy", 41.9028, 12.4964),
    city("Milan", "Italy", 45.4642, 9.1900),
    city("Amsterdam", "Netherlands", 52.3676, 4.9041),
    city("Stockholm", "Sweden", 59.3293, 18.0686),
    city("Reykjavik", "Iceland", 64.1466, -21.9426),
    city("New York", "United States", 40.7128, -74.0060),
    city("San Francisco", "United States", 37.7749, -122.4194),
    city("Chicago", "United States", 41.8781, -87.6298),
    city("Toronto", "Canada", 43.6532, -79.3832),
    city("Vancouver", "Canada", 49.2827, -123.1207),
    city("Mexico City", "Mexico", 19.4326, -99.1332),
    city("Sao Paulo", "Brazil", -23.5505, -46.6333),
    city("Rio de Janeiro", "Brazil", -22.9068, -43.1729),
    city("Buenos Aires", "Argentina", -34.6037, -58.3816),
    city("Sydney", "Australia", -33.8688, 151.2093),
    city("Melbourne", "Australia", -37.8136, 144.9631),
    city("Auckland", "New Zealand", -36.8485, 174.7633),
];

/// 按名称查找（忽略大小写与首尾空白）
pub fn find(name: &str) -> Option<&'static City> {
    let name = name.trim();
    CITIES.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

/// 下拉框过滤：名称或国家包含 query（忽略大小写）；空 query 返回全部
pub fn search(query: &str) -> Vec<&'static City> {
    let query = query.trim().to_lowercase();
    CITIES
        .iter()
        .filter(|c| {
            query.is_empty()
                || c.name.to_lowercase().contains(&query)
                || c.country.to_lowercase().contains(&query)
        })
        .collect()
}

/// 按国家分组（国家、城市均按名称排序）
pub fn by_country<'a, I>(cities: I) -> BTreeMap<&'static str, Vec<&'static City>>
where
    I: IntoIterator<Item = &'a &'static City>,
{
    let mut groups: BTreeMap<&'static str, Vec<&'static City>> = BTreeMap::new();
    for c in cities {
        groups.entry(c.country).or_default().push(*c);
    }
    for list in groups.values_mut() {
        list.sort_by(|a, b| a.name.cmp(b.name));
    }
    groups
}

/// 两城之间的大圆距离（公里，haversine）
pub fn distance_km(a: &City, b: &City) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

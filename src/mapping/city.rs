//! Raw search results → `CityResult`.

use crate::mapping::types::CityResult;
use crate::upstream::types::RawSearchResult;

pub fn map_search(raw: &[RawSearchResult]) -> Vec<CityResult> {
    raw.iter()
        .map(|r| CityResult {
            id: r.id,
            name: r.name.clone(),
            region: r.region.clone(),
            country: r.country.clone(),
            lat: r.lat,
            lon: r.lon,
            url: r.url.clone(),
        })
        .collect()
}

//! Filter state <-> route query parameters
//!
//! Decoding never fails: malformed values fall back to the field default.
//! Encoding leaves out fields at their default, except `sort`, which is
//! always written so a shared link reproduces the ordering.

use std::collections::BTreeSet;

use super::params::QueryParams;
use super::state::{DurationBucket, FilterState, SortMode};
use crate::models::TagId;

pub const KEY_SEARCH: &str = "search";
pub const KEY_FAVORITES: &str = "favorites";
pub const KEY_TAGS: &str = "tags";
pub const KEY_DURATION: &str = "duration";
pub const KEY_SORT: &str = "sort";
pub const KEY_PAGE: &str = "page";

/// Repeated-key tag form accepted on input only
const KEY_TAGS_LEGACY: &str = "tags[]";

/// Parameters owned by the list engine, in encoding order
pub const ENGINE_KEYS: [&str; 6] = [
    KEY_SEARCH,
    KEY_FAVORITES,
    KEY_TAGS,
    KEY_DURATION,
    KEY_SORT,
    KEY_PAGE,
];

/// Build a state from route parameters
///
/// Fields absent from `params` take their defaults. Page size, view mode and
/// seed are not route fields and are copied from `base`.
#[must_use]
pub fn decode(params: &QueryParams, base: &FilterState) -> FilterState {
    FilterState {
        keyword: params.get(KEY_SEARCH).unwrap_or_default().to_string(),
        only_favorites: params.get(KEY_FAVORITES).is_some_and(parse_flag),
        tag_ids: decode_tags(params),
        duration: params
            .get(KEY_DURATION)
            .and_then(|v| v.parse::<DurationBucket>().ok()),
        sort: params
            .get(KEY_SORT)
            .and_then(|v| v.parse::<SortMode>().ok())
            .unwrap_or_default(),
        page: params
            .get(KEY_PAGE)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(1),
        page_size: base.page_size,
        view_mode: base.view_mode,
        random_seed: base.random_seed,
    }
}

/// Encode the route fields of `state`
#[must_use]
pub fn encode(state: &FilterState) -> QueryParams {
    let mut params = QueryParams::new();

    if !state.keyword.is_empty() {
        params.append(KEY_SEARCH, state.keyword.clone());
    }
    if state.only_favorites {
        params.append(KEY_FAVORITES, "true");
    }
    if !state.tag_ids.is_empty() {
        params.append(KEY_TAGS, join_tags(&state.tag_ids));
    }
    if let Some(duration) = state.duration {
        params.append(KEY_DURATION, duration.as_str());
    }
    params.append(KEY_SORT, state.sort.as_str());
    if state.page > 1 {
        params.append(KEY_PAGE, state.page.to_string());
    }

    params
}

/// Mirror `state` into an existing parameter set
///
/// Unrelated parameters are kept in place. Engine parameters are updated,
/// appended when new, and removed when their field is back at its default.
#[must_use]
pub fn merge_into(existing: &QueryParams, state: &FilterState) -> QueryParams {
    let encoded = encode(state);
    let mut merged = existing.clone();
    merged.remove(KEY_TAGS_LEGACY);

    for key in ENGINE_KEYS {
        match encoded.get(key) {
            Some(value) => merged.set(key, value),
            None => {
                merged.remove(key);
            }
        }
    }

    merged
}

/// Whether `params` carries any engine-owned parameter
#[must_use]
pub fn carries_filters(params: &QueryParams) -> bool {
    ENGINE_KEYS.iter().any(|key| params.contains_key(key)) || params.contains_key(KEY_TAGS_LEGACY)
}

/// Only the engine-owned parameters of `params`
#[must_use]
pub fn engine_params(params: &QueryParams) -> QueryParams {
    params
        .iter()
        .filter(|(k, _)| ENGINE_KEYS.contains(k) || *k == KEY_TAGS_LEGACY)
        .collect()
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim(), "true" | "1" | "yes" | "on")
}

fn decode_tags(params: &QueryParams) -> BTreeSet<TagId> {
    let parse = |raw: &str| raw.trim().parse::<TagId>().ok();

    match params.get(KEY_TAGS) {
        Some(joined) => joined.split(',').filter_map(parse).collect(),
        None => params.get_all(KEY_TAGS_LEGACY).filter_map(parse).collect(),
    }
}

fn join_tags(tags: &BTreeSet<TagId>) -> String {
    tags.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::state::ViewMode;
    use crate::seed::RandomSeed;

    fn state() -> FilterState {
        FilterState::default()
    }

    #[test]
    fn test_encode_minimal_random_query() {
        let state = FilterState {
            tag_ids: BTreeSet::from([3]),
            sort: SortMode::Random,
            page: 2,
            ..state()
        };

        assert_eq!(encode(&state).to_string(), "tags=3&sort=random&page=2");
    }

    #[test]
    fn test_encode_full_order() {
        let state = FilterState {
            keyword: "cat".into(),
            only_favorites: true,
            tag_ids: BTreeSet::from([9, 1]),
            duration: Some(DurationBucket::Long),
            sort: SortMode::Size,
            page: 5,
            ..state()
        };
        let encoded = encode(&state);
        let keys: Vec<&str> = encoded.iter().map(|(k, _)| k).collect();

        assert_eq!(keys, ENGINE_KEYS.to_vec());
        assert_eq!(encoded.get(KEY_TAGS), Some("1,9"));
        assert_eq!(encoded.get(KEY_FAVORITES), Some("true"));
    }

    #[test]
    fn test_decode_defaults_when_absent() {
        let decoded = decode(&QueryParams::new(), &state());
        assert_eq!(decoded, state());
    }

    #[test]
    fn test_decode_clamps_malformed_values() {
        let params = QueryParams::parse(
            "page=0&tags=2,x,,7&sort=newest&duration=medium&favorites=nope",
        );
        let decoded = decode(&params, &state());

        assert_eq!(decoded.page, 1);
        assert_eq!(decoded.tag_ids, BTreeSet::from([2, 7]));
        assert_eq!(decoded.sort, SortMode::Random);
        assert_eq!(decoded.duration, None);
        assert!(!decoded.only_favorites);

        let decoded = decode(&QueryParams::parse("page=abc"), &state());
        assert_eq!(decoded.page, 1);
    }

    #[test]
    fn test_decode_keeps_non_route_fields_from_base() {
        let base = FilterState {
            page_size: 48,
            view_mode: ViewMode::List,
            random_seed: RandomSeed::new(0.5),
            ..state()
        };
        let decoded = decode(&QueryParams::parse("page=3&sort=filename"), &base);

        assert_eq!(decoded.page_size, 48);
        assert_eq!(decoded.view_mode, ViewMode::List);
        assert_eq!(decoded.random_seed, RandomSeed::new(0.5));
        assert_eq!(decoded.page, 3);
        assert_eq!(decoded.sort, SortMode::Filename);
    }

    #[test]
    fn test_round_trip() {
        let cases = [
            state(),
            FilterState {
                keyword: "a & b = c".into(),
                only_favorites: true,
                tag_ids: BTreeSet::from([1, 2, 30]),
                duration: Some(DurationBucket::Short),
                sort: SortMode::CreatedAt,
                page: 12,
                ..state()
            },
            FilterState {
                sort: SortMode::Duration,
                duration: Some(DurationBucket::Long),
                ..state()
            },
        ];

        for case in cases {
            let params = QueryParams::parse(&encode(&case).to_string());
            assert_eq!(decode(&params, &case), case);
        }
    }

    #[test]
    fn test_legacy_tag_list_is_accepted() {
        let decoded = decode(&QueryParams::parse("tags[]=4&tags[]=1&page=2"), &state());
        assert_eq!(decoded.tag_ids, BTreeSet::from([1, 4]));
        assert_eq!(decoded.page, 2);
    }

    #[test]
    fn test_merge_preserves_unrelated_and_drops_defaults() {
        let existing = QueryParams::parse("lang=en&search=old&page=3&tab=2");
        let state = FilterState {
            tag_ids: BTreeSet::from([8]),
            ..state()
        };

        let merged = merge_into(&existing, &state);

        assert_eq!(merged.to_string(), "lang=en&tab=2&tags=8&sort=random");
    }

    #[test]
    fn test_carries_filters() {
        assert!(!carries_filters(&QueryParams::parse("lang=en")));
        assert!(carries_filters(&QueryParams::parse("lang=en&page=2")));
        assert!(carries_filters(&QueryParams::parse("tags[]=1")));
    }

    #[test]
    fn test_engine_params_filters_unrelated() {
        let params = QueryParams::parse("lang=en&sort=size&x=1&page=2");
        assert_eq!(engine_params(&params).to_string(), "sort=size&page=2");
    }
}

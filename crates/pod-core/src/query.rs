//! Query helpers for check-in read paths.
//!
//! Pagination clamping and geospatial bounding-box query construction. The
//! query document shape matches the persistence collaborator's filter format.

use serde_json::{json, Map, Value};

use crate::error::AppError;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Hard cap on documents returned by a geospatial query.
pub const GEOSPATIAL_QUERY_LIMIT: u32 = 500;

/// Sanitized pagination options for read queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub page: u32,
    pub limit: u32,
    /// Read-only projection; always forced on for list paths.
    pub lean: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            lean: true,
        }
    }
}

impl QueryOptions {
    /// Clamp raw (possibly absent or out-of-range) pagination input.
    ///
    /// `page` is clamped to >= 1 (default 1); `limit` to `[1, MAX_PAGE_SIZE]`
    /// (default `DEFAULT_PAGE_SIZE`). Invalid values are silently corrected,
    /// never rejected.
    pub fn clamped(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = match page {
            // Saturate rather than truncate: a page beyond u32 must stay >= 1.
            Some(p) if p >= 1 => u32::try_from(p).unwrap_or(u32::MAX),
            _ => 1,
        };
        let limit = match limit {
            Some(l) if l >= 1 => (l as u64).min(MAX_PAGE_SIZE as u64) as u32,
            _ => DEFAULT_PAGE_SIZE,
        };
        Self {
            page,
            limit,
            lean: true,
        }
    }

    /// Options for the geospatial map read path, which is unpaginated and
    /// capped at [`GEOSPATIAL_QUERY_LIMIT`] documents.
    pub fn geospatial() -> Self {
        Self {
            page: 1,
            limit: GEOSPATIAL_QUERY_LIMIT,
            lean: true,
        }
    }

    pub fn skip(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

/// Geographic bounding box, in (longitude, latitude) order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl GeoBounds {
    /// Validate ranges and ordering. The caller layer rejects invalid bounds
    /// before building a query; `build_geospatial_query` assumes this passed.
    pub fn validate(&self) -> Result<(), AppError> {
        let in_range = |v: f64, lo: f64, hi: f64| v.is_finite() && (lo..=hi).contains(&v);
        if !in_range(self.min_lng, -180.0, 180.0) || !in_range(self.max_lng, -180.0, 180.0) {
            return Err(AppError::Validation(
                "longitude must be within [-180, 180]".to_string(),
            ));
        }
        if !in_range(self.min_lat, -90.0, 90.0) || !in_range(self.max_lat, -90.0, 90.0) {
            return Err(AppError::Validation(
                "latitude must be within [-90, 90]".to_string(),
            ));
        }
        if self.min_lng >= self.max_lng || self.min_lat >= self.max_lat {
            return Err(AppError::Validation(
                "bounds minimum must be strictly less than maximum".to_string(),
            ));
        }
        Ok(())
    }
}

/// Build a bounding-box filter document over pre-validated bounds.
///
/// Soft-deleted check-ins are always excluded; `extra_filters` entries are
/// merged in and may not override the geospatial or deletion clauses.
pub fn build_geospatial_query(bounds: &GeoBounds, extra_filters: Map<String, Value>) -> Value {
    let mut query = extra_filters;
    query.insert(
        "location".to_string(),
        json!({
            "$geoWithin": {
                "$box": [
                    [bounds.min_lng, bounds.min_lat],
                    [bounds.max_lng, bounds.max_lat],
                ]
            }
        }),
    );
    query.insert("isDeleted".to_string(), Value::Bool(false));
    Value::Object(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_defaults_on_absent() {
        let opts = QueryOptions::clamped(None, None);
        assert_eq!(opts.page, 1);
        assert_eq!(opts.limit, DEFAULT_PAGE_SIZE);
        assert!(opts.lean);
    }

    #[test]
    fn test_clamp_negative_page() {
        let opts = QueryOptions::clamped(Some(-5), Some(10));
        assert_eq!(opts.page, 1);
        assert_eq!(opts.limit, 10);
    }

    #[test]
    fn test_clamp_oversized_limit() {
        let opts = QueryOptions::clamped(Some(2), Some(100_000));
        assert_eq!(opts.page, 2);
        assert_eq!(opts.limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_clamp_zero_limit() {
        let opts = QueryOptions::clamped(Some(1), Some(0));
        assert_eq!(opts.limit, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_skip() {
        let opts = QueryOptions::clamped(Some(3), Some(20));
        assert_eq!(opts.skip(), 40);
    }

    #[test]
    fn test_geospatial_options_use_the_result_cap() {
        let opts = QueryOptions::geospatial();
        assert_eq!(opts.page, 1);
        assert_eq!(opts.limit, GEOSPATIAL_QUERY_LIMIT);
        assert!(opts.lean);
        assert_eq!(opts.skip(), 0);
    }

    #[test]
    fn test_clamp_page_beyond_u32_saturates() {
        let opts = QueryOptions::clamped(Some(1_i64 << 32), Some(20));
        assert_eq!(opts.page, u32::MAX);

        let opts = QueryOptions::clamped(Some(i64::MAX), Some(20));
        assert_eq!(opts.page, u32::MAX);
    }

    #[test]
    fn test_skip_on_saturated_page_does_not_underflow() {
        let opts = QueryOptions::clamped(Some(1_i64 << 32), Some(20));
        assert_eq!(opts.skip(), (u32::MAX as u64 - 1) * 20);
    }

    fn valid_bounds() -> GeoBounds {
        GeoBounds {
            min_lng: 106.6,
            min_lat: 10.7,
            max_lng: 106.8,
            max_lat: 10.9,
        }
    }

    #[test]
    fn test_bounds_valid() {
        assert!(valid_bounds().validate().is_ok());
    }

    #[test]
    fn test_bounds_out_of_range() {
        let mut bounds = valid_bounds();
        bounds.max_lng = 181.0;
        assert!(bounds.validate().is_err());

        let mut bounds = valid_bounds();
        bounds.min_lat = -95.0;
        assert!(bounds.validate().is_err());
    }

    #[test]
    fn test_bounds_min_not_less_than_max() {
        let mut bounds = valid_bounds();
        bounds.min_lng = bounds.max_lng;
        assert!(bounds.validate().is_err());

        let mut bounds = valid_bounds();
        bounds.min_lat = bounds.max_lat + 0.1;
        assert!(bounds.validate().is_err());
    }

    #[test]
    fn test_bounds_non_finite() {
        let mut bounds = valid_bounds();
        bounds.min_lng = f64::NAN;
        assert!(bounds.validate().is_err());
    }

    #[test]
    fn test_geospatial_query_shape() {
        let query = build_geospatial_query(&valid_bounds(), Map::new());
        assert_eq!(query["isDeleted"], Value::Bool(false));
        assert_eq!(
            query["location"]["$geoWithin"]["$box"],
            json!([[106.6, 10.7], [106.8, 10.9]])
        );
    }

    #[test]
    fn test_geospatial_query_merges_extra_filters() {
        let mut extra = Map::new();
        extra.insert("shipperId".to_string(), json!("abc"));
        // An attempt to override the deletion clause must lose.
        extra.insert("isDeleted".to_string(), Value::Bool(true));

        let query = build_geospatial_query(&valid_bounds(), extra);
        assert_eq!(query["shipperId"], json!("abc"));
        assert_eq!(query["isDeleted"], Value::Bool(false));
    }
}

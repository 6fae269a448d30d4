use crate::error::CriteriaError;
use chrono::NaiveDate;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self, CriteriaError> {
        let finite = [min_lon, min_lat, max_lon, max_lat]
            .iter()
            .all(|v| v.is_finite());
        if !finite || min_lon >= max_lon || min_lat >= max_lat {
            return Err(CriteriaError::BboxOrder);
        }
        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    /// Closed (lon, lat) ring around the box, first vertex repeated last.
    pub fn ring(&self) -> [(f64, f64); 5] {
        [
            (self.min_lon, self.min_lat),
            (self.min_lon, self.max_lat),
            (self.max_lon, self.max_lat),
            (self.max_lon, self.min_lat),
            (self.min_lon, self.min_lat),
        ]
    }
}

impl FromStr for BoundingBox {
    type Err = CriteriaError;

    /// Parses "min_lon min_lat max_lon max_lat".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split_whitespace()
            .map(|v| {
                v.parse::<f64>()
                    .map_err(|_| CriteriaError::BboxValue(v.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        match values[..] {
            [min_lon, min_lat, max_lon, max_lat] => Self::new(min_lon, min_lat, max_lon, max_lat),
            _ => Err(CriteriaError::BboxArity(values.len())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    bbox: BoundingBox,
    start: NaiveDate,
    end: NaiveDate,
    cloud_cover: f64,
}

impl SearchCriteria {
    pub fn new(
        bbox: BoundingBox,
        start: NaiveDate,
        end: NaiveDate,
        cloud_cover: f64,
    ) -> Result<Self, CriteriaError> {
        if start > end {
            return Err(CriteriaError::DateOrder { start, end });
        }
        if !(0.0..=100.0).contains(&cloud_cover) {
            return Err(CriteriaError::CloudCover(cloud_cover));
        }
        Ok(Self {
            bbox,
            start,
            end,
            cloud_cover,
        })
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Exclusive: products sensed on this date are not matched.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn cloud_cover(&self) -> f64 {
        self.cloud_cover
    }
}

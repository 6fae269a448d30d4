use crate::copernicus::COLLECTION;
use crate::criteria::SearchCriteria;
use chrono::NaiveDate;

/// Builds the OData `$filter` expression for a catalog search.
///
/// The date range is half-open on `ContentDate/Start`: midnight of the start
/// date is included, midnight of the end date is not. Equal start and end
/// dates therefore match nothing.
pub fn build_filter(criteria: &SearchCriteria) -> String {
    [
        format!("Collection/Name eq '{COLLECTION}'"),
        format!(
            "Attributes/OData.CSC.DoubleAttribute/any(att:att/Name eq 'cloudCover' and \
             att/OData.CSC.DoubleAttribute/Value le {})",
            criteria.cloud_cover()
        ),
        format!(
            "OData.CSC.Intersects(area=geography'SRID=4326;{}')",
            polygon_wkt(criteria)
        ),
        format!("ContentDate/Start ge {}", timestamp(criteria.start())),
        format!("ContentDate/Start lt {}", timestamp(criteria.end())),
    ]
    .join(" and ")
}

fn polygon_wkt(criteria: &SearchCriteria) -> String {
    let ring = criteria
        .bbox()
        .ring()
        .iter()
        .map(|(lon, lat)| format!("{lon} {lat}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("POLYGON(({ring}))")
}

fn timestamp(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
}

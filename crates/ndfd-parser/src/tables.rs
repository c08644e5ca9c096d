//! NDFD parameter lookup.
//!
//! Maps (discipline, category, number) plus the statistical process of
//! template 4.8 to the short field names the products ask for.

use crate::sections::StatisticalProcess;

/// Name given to fields this table does not recognise.
pub const UNKNOWN_FIELD: &str = "unknown";

/// Short field name for a GRIB2 parameter.
pub fn field_name(
    discipline: u8,
    category: u8,
    number: u8,
    statistic: Option<StatisticalProcess>,
) -> &'static str {
    use StatisticalProcess::{Maximum, Minimum};

    match (discipline, category, number, statistic) {
        // Temperature
        (0, 0, 0, Some(Maximum)) | (0, 0, 4, _) => "MaxT",
        (0, 0, 0, Some(Minimum)) | (0, 0, 5, _) => "MinT",
        (0, 0, 0, _) => "T",
        (0, 0, 6, _) => "Td",

        // Moisture
        (0, 1, 1, Some(Maximum)) | (0, 1, 27, _) => "MaxRH",
        (0, 1, 1, Some(Minimum)) | (0, 1, 198, _) => "MinRH",
        (0, 1, 1, _) => "RH",

        // Momentum
        (0, 2, 1, _) => "WindSpd",
        (0, 2, 22, _) => "WindGust",

        _ => UNKNOWN_FIELD,
    }
}

/// Native units of a named field.
pub fn field_units(name: &str) -> &'static str {
    match name {
        "MaxT" | "MinT" | "T" | "Td" => "K",
        "MaxRH" | "MinRH" | "RH" => "%",
        "WindSpd" | "WindGust" => "m/s",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistical_names() {
        assert_eq!(field_name(0, 1, 1, Some(StatisticalProcess::Minimum)), "MinRH");
        assert_eq!(field_name(0, 1, 1, None), "RH");
        assert_eq!(field_name(0, 0, 4, Some(StatisticalProcess::Maximum)), "MaxT");
        assert_eq!(field_name(0, 0, 0, Some(StatisticalProcess::Minimum)), "MinT");
    }

    #[test]
    fn test_unknown_parameter() {
        assert_eq!(field_name(0, 19, 2, None), UNKNOWN_FIELD);
        assert_eq!(field_name(10, 0, 3, None), UNKNOWN_FIELD);
        assert_eq!(field_units(UNKNOWN_FIELD), "");
    }
}

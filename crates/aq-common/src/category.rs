//! Ordered range-to-category tables for AQI, PM2.5, heat index and elevation.
//!
//! Each table is a list of inclusive upper bounds sorted ascending; a value
//! falls in the first class whose bound it does not exceed. The last class
//! has no bound.

use serde::Serialize;

/// A category a value can fall in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Category {
    pub label: &'static str,
    /// CSS color used by the map client.
    pub color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice: Option<&'static str>,
}

/// One class of a table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryClass {
    /// Inclusive upper bound, `None` for the open-ended last class.
    pub upper: Option<f64>,
    #[serde(flatten)]
    pub category: Category,
}

/// A named, sorted category table.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CategoryTable {
    pub name: &'static str,
    pub unit: &'static str,
    pub classes: &'static [CategoryClass],
}

impl CategoryTable {
    /// Find the category of a value. NaN has no category.
    pub fn classify(&self, value: f64) -> Option<&Category> {
        if value.is_nan() {
            return None;
        }
        self.classes
            .iter()
            .find(|class| class.upper.map_or(true, |upper| value <= upper))
            .map(|class| &class.category)
    }

    /// Category of an optional value; `None` maps to nothing.
    pub fn classify_opt(&self, value: Option<f64>) -> Option<&Category> {
        value.and_then(|v| self.classify(v))
    }
}

/// Color of markers with no AQI for the selected hour.
pub const NO_DATA_COLOR: &str = "#95a5a6";

const fn class(upper: Option<f64>, label: &'static str, color: &'static str) -> CategoryClass {
    CategoryClass {
        upper,
        category: Category {
            label,
            color,
            advice: None,
        },
    }
}

const fn advised(
    upper: Option<f64>,
    label: &'static str,
    color: &'static str,
    advice: &'static str,
) -> CategoryClass {
    CategoryClass {
        upper,
        category: Category {
            label,
            color,
            advice: Some(advice),
        },
    }
}

/// US AQI levels.
pub const AQI: CategoryTable = CategoryTable {
    name: "aqi",
    unit: "",
    classes: &[
        advised(Some(50.0), "Good", "#27ae60", "Air quality is good and poses no health risk."),
        advised(Some(100.0), "Moderate", "#f1c40f", "Sensitive groups should limit time outdoors."),
        advised(
            Some(150.0),
            "Unhealthy for sensitive groups",
            "#e67e22",
            "Sensitive people may experience health effects.",
        ),
        advised(Some(200.0), "Unhealthy", "#c0392b", "Everyone may begin to experience health effects."),
        advised(
            Some(300.0),
            "Very unhealthy",
            "#8e44ad",
            "Health alert: everyone may experience serious effects.",
        ),
        advised(
            None,
            "Hazardous",
            "#78281f",
            "Health emergency: the whole population is likely to be affected.",
        ),
    ],
};

/// PM2.5 concentration levels (µg/m³) with health recommendations.
pub const PM25: CategoryTable = CategoryTable {
    name: "pm25",
    unit: "µg/m³",
    classes: &[
        advised(
            Some(12.0),
            "Good",
            "#00E400",
            "Air quality is good. Outdoor activities are fine.",
        ),
        advised(
            Some(35.4),
            "Moderate",
            "#FFFF00",
            "Sensitive groups (elderly, children, people with respiratory conditions) should reduce outdoor activity.",
        ),
        advised(
            Some(55.4),
            "Poor",
            "#FF7E00",
            "Sensitive groups should stay indoors. Others should limit strenuous outdoor activity.",
        ),
        advised(
            Some(150.4),
            "Unhealthy",
            "#FF0000",
            "Everyone should avoid outdoor activity. Wear a filtering mask if you must go out.",
        ),
        advised(
            Some(250.4),
            "Very unhealthy",
            "#8F3F97",
            "Serious health effects. Stay indoors and keep windows closed.",
        ),
        advised(
            None,
            "Hazardous",
            "#7E0023",
            "Health emergency. Do not go outside.",
        ),
    ],
};

/// Apparent temperature (°C) comfort levels.
pub const HEAT_INDEX: CategoryTable = CategoryTable {
    name: "heat_index",
    unit: "°C",
    classes: &[
        advised(Some(30.0), "Comfortable", "#43d967", "No discomfort for most people."),
        advised(
            Some(34.0),
            "Slight discomfort",
            "#ffe066",
            "May cause slight discomfort for sensitive people.",
        ),
        advised(
            Some(39.0),
            "Discomfort",
            "#ffb347",
            "Noticeable discomfort. Limit heavy physical work.",
        ),
        advised(
            Some(45.0),
            "Great discomfort",
            "#ff5e57",
            "Avoid strenuous activity outdoors.",
        ),
        advised(
            Some(54.0),
            "Dangerous",
            "#b83227",
            "Stop all physical activity, serious danger.",
        ),
        advised(None, "Extreme danger", "#6d214f", "Heat stroke risk, potentially fatal."),
    ],
};

/// Elevation bands (m) of the DEM overlay.
pub const ELEVATION: CategoryTable = CategoryTable {
    name: "elevation",
    unit: "m",
    classes: &[
        class(Some(0.0), "Sea level", "#2e8b5700"),
        class(Some(200.0), "Lowland", "#2e8b57"),
        class(Some(500.0), "Hills", "#6b8e23"),
        class(Some(1000.0), "Upland", "#b8860b"),
        class(Some(2000.0), "Mountain", "#cd853f"),
        class(None, "High mountain", "#a0522d"),
    ],
};

/// All tables, in the order the legend lists them.
pub const ALL_TABLES: [&CategoryTable; 4] = [&AQI, &PM25, &HEAT_INDEX, &ELEVATION];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aqi_boundaries_are_inclusive() {
        assert_eq!(AQI.classify(0.0).unwrap().label, "Good");
        assert_eq!(AQI.classify(50.0).unwrap().label, "Good");
        assert_eq!(AQI.classify(50.5).unwrap().label, "Moderate");
        assert_eq!(AQI.classify(300.0).unwrap().label, "Very unhealthy");
        assert_eq!(AQI.classify(301.0).unwrap().label, "Hazardous");
    }

    #[test]
    fn test_pm25_recommendations() {
        let category = PM25.classify(35.4).unwrap();
        assert_eq!(category.label, "Moderate");
        assert!(category.advice.unwrap().contains("Sensitive groups"));
        assert_eq!(PM25.classify(500.0).unwrap().color, "#7E0023");
    }

    #[test]
    fn test_missing_and_nan_have_no_category() {
        assert!(AQI.classify_opt(None).is_none());
        assert!(AQI.classify(f64::NAN).is_none());
    }

    #[test]
    fn test_tables_are_sorted_with_open_last_class() {
        for table in ALL_TABLES {
            let bounds: Vec<f64> = table.classes.iter().filter_map(|c| c.upper).collect();
            assert!(bounds.windows(2).all(|w| w[0] < w[1]), "{} not sorted", table.name);
            assert!(table.classes.last().unwrap().upper.is_none());
            assert_eq!(bounds.len(), table.classes.len() - 1);
        }
    }

    #[test]
    fn test_elevation_below_sea_level_is_transparent() {
        assert_eq!(ELEVATION.classify(-12.0).unwrap().color, "#2e8b5700");
        assert_eq!(ELEVATION.classify(2500.0).unwrap().label, "High mountain");
    }
}

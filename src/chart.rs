use serde::Serialize;

const BAR_COLOR: &str = "#10a674";
const Y_AXIS_LABEL: &str = "kWh/year";

/// A single bar chart, as drawn on screen by the front end or into the PDF report
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub category: String,
    pub value: f64,
    pub y_axis_label: String,
    pub color: String,
    pub annotation: Annotation,
}

/// Label drawn over the bar
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Annotation {
    pub text: String,
    /// Vertical placement as a fraction of the bar height
    pub height_ratio: f64,
}

/// Returns the chart shown on screen
///
/// # Arguments
///
/// * 'annual_kwh' - estimated annual AC output
pub fn screen_chart(annual_kwh: f64) -> BarChart {
    BarChart {
        title: "Your Solar Output".to_string(),
        category: "Your System".to_string(),
        value: annual_kwh,
        y_axis_label: Y_AXIS_LABEL.to_string(),
        color: BAR_COLOR.to_string(),
        annotation: Annotation { text: format_kwh(annual_kwh), height_ratio: 1.0 },
    }
}

/// Returns the chart drawn into the downloadable report
///
/// # Arguments
///
/// * 'annual_kwh' - estimated annual AC output
pub fn report_chart(annual_kwh: f64) -> BarChart {
    BarChart {
        title: "GreenOpt AI Report".to_string(),
        category: "Optimized".to_string(),
        value: annual_kwh,
        y_axis_label: Y_AXIS_LABEL.to_string(),
        color: BAR_COLOR.to_string(),
        annotation: Annotation { text: format!("{}/year", format_kwh(annual_kwh)), height_ratio: 0.8 },
    }
}

/// Formats an energy amount as a thousands separated integer with unit, e.g. "15,000 kWh"
pub fn format_kwh(kwh: f64) -> String {
    format!("{} kWh", thousands(kwh))
}

/// Rounds to an integer and groups digits in thousands
pub fn thousands(value: f64) -> String {
    let rounded = format!("{:.0}", value);
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(d) => ("-", d),
        None => ("", rounded.as_str()),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}{}", sign, grouped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_kwh(15000.0), "15,000 kWh");
        assert_eq!(format_kwh(999.0), "999 kWh");
        assert_eq!(format_kwh(1000.0), "1,000 kWh");
        assert_eq!(format_kwh(1234567.4), "1,234,567 kWh");
        assert_eq!(format_kwh(0.0), "0 kWh");
    }

    #[test]
    fn rounds_fraction() {
        assert_eq!(format_kwh(16872.61), "16,873 kWh");
        assert_eq!(format_kwh(999.6), "1,000 kWh");
    }

    #[test]
    fn negative_keeps_sign_outside_groups() {
        assert_eq!(thousands(-123456.0), "-123,456");
    }

    #[test]
    fn screen_chart_is_labeled() {
        let chart = screen_chart(15000.0);

        assert_eq!(chart.category, "Your System");
        assert_eq!(chart.y_axis_label, "kWh/year");
        assert_eq!(chart.value, 15000.0);
        assert_eq!(chart.annotation.text, "15,000 kWh");
    }

    #[test]
    fn report_chart_places_overlay_inside_bar() {
        let chart = report_chart(15000.0);

        assert_eq!(chart.title, "GreenOpt AI Report");
        assert_eq!(chart.annotation.text, "15,000 kWh/year");
        assert_eq!(chart.annotation.height_ratio, 0.8);
    }
}

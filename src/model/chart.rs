//! Chart types (`c:chartSpace` parts referenced from graphic frames).

use serde::{Deserialize, Serialize};

use super::TextBody;

/// A chart referenced by a slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    /// Chart title (`c:title` rich text); runs may carry hyperlinks
    pub title: Option<TextBody>,

    /// Plot type, e.g. `bar`, `column`, `pie`
    pub chart_type: Option<String>,

    /// Category labels of the first series
    pub categories: Vec<String>,

    /// Data series
    pub series: Vec<ChartSeries>,
}

impl Chart {
    /// Title text, if the chart has a non-empty title.
    pub fn title_text(&self) -> Option<String> {
        self.title
            .as_ref()
            .map(|t| t.plain_text())
            .filter(|t| !t.is_empty())
    }
}

/// One data series (`c:ser`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: Option<String>,
    pub values: Vec<String>,
}

/// Map a plot element name (`c:barChart`, `c:pie3DChart`, ...) to a chart type label.
pub fn chart_type_label(element: &str, bar_direction: Option<&str>) -> Option<String> {
    let base = element.strip_suffix("Chart")?;
    let base = base.strip_suffix("3D").unwrap_or(base);
    let label = match base {
        "bar" if bar_direction == Some("col") => "column".to_string(),
        "ofPie" => "pie of pie".to_string(),
        other => other.to_lowercase(),
    };
    Some(label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Paragraph;

    #[test]
    fn test_chart_type_label() {
        assert_eq!(chart_type_label("barChart", Some("col")).as_deref(), Some("column"));
        assert_eq!(chart_type_label("barChart", Some("bar")).as_deref(), Some("bar"));
        assert_eq!(chart_type_label("pie3DChart", None).as_deref(), Some("pie"));
        assert_eq!(chart_type_label("doughnutChart", None).as_deref(), Some("doughnut"));
        assert_eq!(chart_type_label("plotArea", None), None);
    }

    #[test]
    fn test_title_text() {
        let chart = Chart {
            title: Some(TextBody::new(vec![Paragraph::with_text(" Revenue ")])),
            ..Default::default()
        };
        assert_eq!(chart.title_text().as_deref(), Some("Revenue"));
        assert_eq!(Chart::default().title_text(), None);
    }
}

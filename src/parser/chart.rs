//! Chart part parsing (`c:chartSpace`).

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::Result;
use crate::model::{chart_type_label, Chart, ChartSeries};

use super::container::OoxmlContainer;
use super::slide::{attr_value, local_name, LinkResolver, TextBodyBuilder};

/// Parse a chart part: title (with run hyperlinks), plot type, categories and series values.
pub(crate) fn parse_chart_part(
    container: &OoxmlContainer,
    part: &str,
    slide_numbers: &HashMap<String, u32>,
) -> Result<Chart> {
    let xml = container.read_xml(part)?;
    let rels = container.relationships(part)?;
    let links = LinkResolver {
        rels: &rels,
        slide_numbers,
    };
    parse_chart_xml(xml, &links)
}

fn parse_chart_xml(xml: &str, links: &LinkResolver<'_>) -> Result<Chart> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut chart = Chart::default();
    let mut stack: Vec<String> = Vec::new();
    let mut title: Option<TextBodyBuilder> = None;
    let mut plot: Option<String> = None;
    let mut bar_direction: Option<String> = None;
    let mut series: Option<ChartSeries> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let name = local_name(e);
                if let Some(builder) = title.as_mut() {
                    builder.open(e, links, false)?;
                } else if name == "title" && stack.last().is_some_and(|p| p == "chart") {
                    title = Some(TextBodyBuilder::default());
                } else if name == "ser" && plot.is_some() {
                    series = Some(ChartSeries::default());
                } else if plot.is_none() && stack.last().is_some_and(|p| p == "plotArea") {
                    if name.ends_with("Chart") {
                        plot = Some(name.clone());
                    }
                }
                stack.push(name);
            }
            Event::Empty(ref e) => {
                let name = local_name(e);
                if let Some(builder) = title.as_mut() {
                    builder.open(e, links, true)?;
                } else if name == "barDir" {
                    bar_direction = attr_value(e, b"val")?;
                } else if plot.is_none()
                    && name.ends_with("Chart")
                    && stack.last().is_some_and(|p| p == "plotArea")
                {
                    plot = Some(name);
                }
            }
            Event::End(ref e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                stack.pop();
                if name == "title" && title.is_some() && stack.last().is_some_and(|p| p == "chart") {
                    chart.title = title.take().map(TextBodyBuilder::finish);
                } else if let Some(builder) = title.as_mut() {
                    builder.close(name.as_bytes());
                } else if name == "ser" {
                    if let Some(s) = series.take() {
                        chart.series.push(s);
                    }
                }
            }
            Event::Text(ref t) => {
                if let Some(builder) = title.as_mut() {
                    builder.text(t)?;
                } else if let Some(s) = series.as_mut() {
                    if stack.last().is_some_and(|n| n == "v") {
                        let value = t.unescape()?.trim().to_string();
                        match series_section(&stack) {
                            Some("tx") => s.name = Some(value),
                            Some("cat") if chart.series.is_empty() => chart.categories.push(value),
                            Some("val") => s.values.push(value),
                            _ => {}
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    chart.chart_type = plot.and_then(|p| chart_type_label(&p, bar_direction.as_deref()));
    Ok(chart)
}

/// The `c:ser` child (`tx`, `cat`, `val`) the current element sits in.
fn series_section(stack: &[String]) -> Option<&str> {
    let ser = stack.iter().rposition(|n| n == "ser")?;
    stack.get(ser + 1).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::container::{Relationship, Relationships};

    const CHART: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<c:chart>
<c:title><c:tx><c:rich><a:bodyPr/><a:p><a:r><a:rPr lang="en-US"><a:hlinkClick r:id="rId1"/></a:rPr><a:t>Revenue</a:t></a:r></a:p></c:rich></c:tx><c:overlay val="0"/></c:title>
<c:plotArea><c:layout/>
<c:barChart><c:barDir val="col"/><c:grouping val="clustered"/>
<c:ser><c:idx val="0"/><c:tx><c:strRef><c:strCache><c:pt idx="0"><c:v>2024</c:v></c:pt></c:strCache></c:strRef></c:tx>
<c:cat><c:strRef><c:strCache><c:pt idx="0"><c:v>Q1</c:v></c:pt><c:pt idx="1"><c:v>Q2</c:v></c:pt></c:strCache></c:strRef></c:cat>
<c:val><c:numRef><c:numCache><c:pt idx="0"><c:v>10</c:v></c:pt><c:pt idx="1"><c:v>12.5</c:v></c:pt></c:numCache></c:numRef></c:val></c:ser>
</c:barChart>
<c:valAx><c:title><c:tx><c:rich><a:p><a:r><a:t>Axis</a:t></a:r></a:p></c:rich></c:tx></c:title></c:valAx>
</c:plotArea></c:chart></c:chartSpace>"#;

    #[test]
    fn test_parse_chart() {
        let mut rels = Relationships::new();
        rels.insert(
            "rId1".to_string(),
            Relationship {
                id: "rId1".to_string(),
                rel_type: "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink".to_string(),
                target: "example.com/revenue".to_string(),
                external: true,
            },
        );
        let slide_numbers = HashMap::new();
        let links = LinkResolver {
            rels: &rels,
            slide_numbers: &slide_numbers,
        };

        let chart = parse_chart_xml(CHART, &links).unwrap();
        assert_eq!(chart.title_text().as_deref(), Some("Revenue"));
        assert_eq!(chart.chart_type.as_deref(), Some("column"));
        assert_eq!(chart.categories, vec!["Q1", "Q2"]);
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].name.as_deref(), Some("2024"));
        assert_eq!(chart.series[0].values, vec!["10", "12.5"]);

        let title = chart.title.unwrap();
        assert_eq!(
            title.paragraphs[0].runs[0].hyperlink.as_deref(),
            Some("https://example.com/revenue")
        );
    }

    #[test]
    fn test_chart_without_title() {
        let xml = r#"<c:chartSpace xmlns:c="c"><c:chart><c:plotArea><c:pieChart><c:ser><c:val><c:numRef><c:numCache><c:pt idx="0"><c:v>1</c:v></c:pt></c:numCache></c:numRef></c:val></c:ser></c:pieChart></c:plotArea></c:chart></c:chartSpace>"#;
        let rels = Relationships::new();
        let slide_numbers = HashMap::new();
        let links = LinkResolver {
            rels: &rels,
            slide_numbers: &slide_numbers,
        };
        let chart = parse_chart_xml(xml, &links).unwrap();
        assert_eq!(chart.title, None);
        assert_eq!(chart.chart_type.as_deref(), Some("pie"));
        assert_eq!(chart.series[0].values, vec!["1"]);
    }
}

//! Chart generation for the analytics view.
//!
//! This module creates ECharts visualizations from the analytics series:
//! - **Category Chart**: Pie chart of expenses by category
//! - **Monthly Chart**: Bar chart of expenses by month
//!
//! Colors are assigned by position in the series, so the same series always
//! gets the same colors.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Color, ItemStyle, JsFunction, Tooltip,
        Trigger,
    },
    series::{Pie, bar},
};

use crate::analytics::SeriesPoint;

/// The colors assigned to series entries, in order.
pub const PALETTE: [&str; 4] = [
    "hsl(200, 95%, 45%)",
    "hsl(165, 80%, 50%)",
    "hsl(220, 15%, 45%)",
    "hsl(0, 84%, 60%)",
];

/// The color for the entry at `position` in a series.
///
/// The palette repeats once it runs out.
pub fn color_for_position(position: usize) -> &'static str {
    PALETTE[position % PALETTE.len()]
}

/// Pair each entry in `series` with its color.
pub fn colored_series(series: &[SeriesPoint]) -> Vec<(&SeriesPoint, &'static str)> {
    series
        .iter()
        .enumerate()
        .map(|(position, point)| (point, color_for_position(position)))
        .collect()
}

/// A pie chart of expense totals by category.
pub fn category_chart(series: &[SeriesPoint]) -> Chart {
    let data: Vec<(f64, &str)> = series
        .iter()
        .map(|point| (point.value, point.key.as_str()))
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("Expenses by Category")
                .subtext("Distribution of your spending"),
        )
        .color(palette())
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().bottom("1%"))
        .series(
            Pie::new()
                .name("Expenses")
                .radius("60%")
                .data(data),
        )
}

/// A bar chart of expense totals by month.
pub fn monthly_chart(series: &[SeriesPoint]) -> Chart {
    let labels: Vec<String> = series.iter().map(|point| point.key.clone()).collect();
    let values: Vec<f64> = series.iter().map(|point| point.value).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Monthly Trends")
                .subtext("Your spending over time"),
        )
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .value_formatter(currency_formatter())
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(
            bar::Bar::new()
                .name("Expenses")
                .item_style(ItemStyle::new().color(color_for_position(0)))
                .data(values),
        )
}

/// Wrap `chart` in a standalone HTML page that loads ECharts from a CDN.
pub fn render_html(title: &str, chart: &Chart) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <script src="https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js"></script>
</head>
<body>
    <div id="chart" style="width: 100%; min-height: 480px;"></div>
    <script>
        (function() {{
            const chart = echarts.init(document.getElementById("chart"));
            const option = {chart};
            chart.setOption(option);
            window.addEventListener('resize', chart.resize);
        }})();
    </script>
</body>
</html>
"#
    )
}

fn palette() -> Vec<Color> {
    PALETTE.iter().map(|&color| Color::from(color)).collect()
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

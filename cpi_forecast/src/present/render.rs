//! Drawing [`Figure`]s with ratatui

use super::{ChartPanel, Figure, Layout as FigureLayout, LineStyle, SeriesRole, Shading};
use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{Axis, Block, Chart, Dataset, GraphType, LegendPosition, Paragraph},
};

const CLOSE_HINT: &str = " q / Esc / Enter: close ";

/// Interpolation steps per segment of a dashed line
const DASH_STEPS: usize = 8;

/// Draw every panel of `figure` into `area`, arranged by its layout
pub fn render_figure(frame: &mut Frame, area: Rect, figure: &Figure) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let cells = panel_areas(figure.layout(), chunks[0]);
    for (panel, cell) in figure.panels().iter().zip(cells) {
        render_panel(frame, cell, panel);
    }

    frame.render_widget(
        Paragraph::new(CLOSE_HINT).style(Style::default().fg(Color::DarkGray)),
        chunks[1],
    );
}

/// Screen areas for the panels of `layout`, in reading order
fn panel_areas(layout: FigureLayout, area: Rect) -> Vec<Rect> {
    let halves = |row: Rect| {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(row)
    };

    match layout {
        FigureLayout::SideBySide => halves(area).to_vec(),
        FigureLayout::Grid => {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Ratio(1, 3),
                    Constraint::Ratio(1, 3),
                    Constraint::Ratio(1, 3),
                ])
                .split(area);

            let mut cells = halves(rows[0]).to_vec();
            cells.extend(halves(rows[1]).iter());
            cells.push(rows[2]);
            cells
        }
    }
}

fn role_color(role: SeriesRole) -> Color {
    match role {
        SeriesRole::Rate => Color::Cyan,
        SeriesRole::Actual => Color::Green,
        SeriesRole::Forecast => Color::Yellow,
    }
}

/// Dataset contents with their styling, owned so datasets can borrow them
struct Layer {
    name: Option<String>,
    points: Vec<(f64, f64)>,
    graph_type: GraphType,
    color: Color,
}

fn render_panel(frame: &mut Frame, area: Rect, panel: &ChartPanel) {
    let columns = usize::from(area.width.max(1)) * 2;
    let rows = usize::from(area.height.max(1)) * 4;

    let mut layers: Vec<Layer> = panel
        .shading
        .iter()
        .map(|shade| shade_layer(shade, panel.y_axis.bounds, columns, rows))
        .collect();

    for line in &panel.lines {
        let (points, graph_type) = match line.style {
            LineStyle::Solid => (line.points.clone(), GraphType::Line),
            LineStyle::Dashed => (dashed(&line.points), GraphType::Scatter),
        };
        layers.push(Layer {
            name: Some(line.label.clone()),
            points,
            graph_type,
            color: role_color(line.role),
        });
    }

    let datasets: Vec<Dataset> = layers
        .iter()
        .map(|layer| {
            let dataset = Dataset::default()
                .marker(Marker::Braille)
                .graph_type(layer.graph_type)
                .style(Style::default().fg(layer.color))
                .data(&layer.points);
            match &layer.name {
                Some(name) => dataset.name(name.clone()),
                None => dataset,
            }
        })
        .collect();

    let x_labels: Vec<Span> = panel
        .x_axis
        .labels
        .iter()
        .map(|l| Span::raw(l.clone()))
        .collect();
    let y_labels: Vec<Span> = panel
        .y_axis
        .labels
        .iter()
        .map(|l| Span::raw(l.clone()))
        .collect();

    let chart = Chart::new(datasets)
        .block(Block::bordered().title(format!(" {} ", panel.title)))
        .x_axis(
            Axis::default()
                .title(panel.x_axis.title.clone())
                .style(Style::default().fg(Color::Gray))
                .bounds(panel.x_axis.bounds)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(panel.y_axis.title.clone())
                .style(Style::default().fg(Color::Gray))
                .bounds(panel.y_axis.bounds)
                .labels(y_labels),
        )
        .legend_position(Some(LegendPosition::TopLeft))
        .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)));

    frame.render_widget(chart, area);
}

/// A dense point grid filling the shaded area
fn shade_layer(shade: &Shading, y_bounds: [f64; 2], columns: usize, rows: usize) -> Layer {
    let y_step = (y_bounds[1] - y_bounds[0]) / rows as f64;
    let mut points = Vec::new();

    let label = match shade {
        Shading::Period { label, start, end } => {
            let x_step = ((end - start) / columns as f64).max(f64::EPSILON);
            let mut x = *start;
            while x <= *end {
                fill_column(&mut points, x, y_bounds[0], y_bounds[1], y_step);
                x += x_step;
            }
            label
        }
        Shading::Band {
            label,
            lower,
            upper,
        } => {
            for (low, high) in lower.windows(2).zip(upper.windows(2)) {
                let steps = DASH_STEPS * 2;
                for i in 0..=steps {
                    let t = i as f64 / steps as f64;
                    let x = low[0].0 + t * (low[1].0 - low[0].0);
                    let bottom = low[0].1 + t * (low[1].1 - low[0].1);
                    let top = high[0].1 + t * (high[1].1 - high[0].1);
                    fill_column(&mut points, x, bottom, top, y_step);
                }
            }
            label
        }
    };

    Layer {
        name: Some(label.clone()),
        points,
        graph_type: GraphType::Scatter,
        color: Color::DarkGray,
    }
}

fn fill_column(points: &mut Vec<(f64, f64)>, x: f64, bottom: f64, top: f64, step: f64) {
    if step <= 0.0 || !step.is_finite() {
        points.push((x, bottom));
        return;
    }
    let mut y = bottom;
    while y <= top {
        points.push((x, y));
        y += step;
    }
}

/// Points along `line` with every other stretch left out
fn dashed(line: &[(f64, f64)]) -> Vec<(f64, f64)> {
    if line.len() < 2 {
        return line.to_vec();
    }

    let mut points = Vec::with_capacity(line.len() * DASH_STEPS);
    for segment in line.windows(2) {
        let (x0, y0) = segment[0];
        let (x1, y1) = segment[1];
        for i in 0..DASH_STEPS {
            // dash on the first half of each segment
            if i < DASH_STEPS / 2 {
                let t = i as f64 / DASH_STEPS as f64;
                points.push((x0 + t * (x1 - x0), y0 + t * (y1 - y0)));
            }
        }
    }
    if let Some(&last) = line.last() {
        points.push(last);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TimeSeries;
    use crate::forecast::{ForecastPoint, ForecastResult};
    use crate::present::{Figure, Layout as FigureLayout, FORECAST_TITLE, QOQ_TITLE, YOY_TITLE};
    use crate::transform::{quarter_over_quarter, year_over_year};
    use crate::utils::add_months;
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn figure(layout: FigureLayout) -> Figure {
        let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..60).map(|i| add_months(start, i).unwrap()).collect();
        let values = (0..60).map(|i| 234.0 + 0.3 * i as f64).collect();
        let raw = TimeSeries::new("CPIAUCSL", dates, values).unwrap();
        let points = (1..=6)
            .map(|h| ForecastPoint {
                date: add_months(raw.last_date(), h).unwrap(),
                value: raw.last_value() + h as f64 * 0.3,
            })
            .collect();
        let forecast = ForecastResult::PointOnly { points };
        let derived = vec![
            year_over_year(&raw).unwrap(),
            quarter_over_quarter(&raw).unwrap(),
        ];
        Figure::compose(layout, &raw, &derived, &forecast).unwrap()
    }

    fn screen_text(layout: FigureLayout, width: u16, height: u16) -> String {
        let figure = figure(layout);
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_figure(frame, area, &figure)
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_side_by_side_titles() {
        let text = screen_text(FigureLayout::SideBySide, 160, 40);
        assert!(text.contains(YOY_TITLE));
        assert!(text.contains(FORECAST_TITLE));
        assert!(text.contains("q / Esc / Enter"));
    }

    #[test]
    fn test_grid_titles() {
        let text = screen_text(FigureLayout::Grid, 200, 60);
        assert!(text.contains(YOY_TITLE));
        assert!(text.contains(QOQ_TITLE));
        assert!(text.contains("Jun 2020"));
    }

    #[test]
    fn test_panel_areas() {
        let area = Rect::new(0, 0, 100, 30);
        assert_eq!(panel_areas(FigureLayout::SideBySide, area).len(), 2);

        let grid = panel_areas(FigureLayout::Grid, area);
        assert_eq!(grid.len(), 5);
        assert_eq!(grid[4].width, 100);
        assert_eq!(grid[0].y, grid[1].y);
    }

    #[test]
    fn test_dashed_keeps_endpoints() {
        let line = [(0.0, 0.0), (8.0, 8.0), (16.0, 0.0)];
        let points = dashed(&line);
        assert_eq!(points.first(), Some(&(0.0, 0.0)));
        assert_eq!(points.last(), Some(&(16.0, 0.0)));
        assert_eq!(points.len(), 2 * DASH_STEPS / 2 + 1);
        assert!(!points.contains(&(6.0, 6.0)));
    }
}

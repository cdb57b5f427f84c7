use std::fmt::Write;

const MIN_MOOD: f64 = 1.0;
const MAX_MOOD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Geometry of the trend graphic. A value of 1 sits on the bottom margin and
/// a value of 5 on the top margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sparkline {
    pub width: f64,
    pub height: f64,
    pub margin_x: f64,
    pub margin_y: f64,
    pub radius: f64,
}

impl Default for Sparkline {
    fn default() -> Self {
        Self {
            width: 320.0,
            height: 60.0,
            margin_x: 5.0,
            margin_y: 6.0,
            radius: 3.0,
        }
    }
}

impl Sparkline {
    pub fn points(&self, values: &[u8]) -> Vec<Point> {
        let span = values.len().saturating_sub(1).max(1) as f64;
        let plot_width = self.width - 2.0 * self.margin_x;
        let plot_height = self.height - 2.0 * self.margin_y;

        values
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                let value = f64::from(value).clamp(MIN_MOOD, MAX_MOOD);
                let ratio = (value - MIN_MOOD) / (MAX_MOOD - MIN_MOOD);
                Point {
                    x: self.margin_x + (index as f64 / span) * plot_width,
                    y: self.height - self.margin_y - ratio * plot_height,
                }
            })
            .collect()
    }

    pub fn to_svg(&self, values: &[u8]) -> String {
        let mut svg = format!(
            r#"<svg class="sparkline" viewBox="0 0 {w} {h}" width="{w}" height="{h}" role="img" aria-label="Mood trend">"#,
            w = self.width,
            h = self.height,
        );

        let points = self.points(values);
        if !points.is_empty() {
            let path = points
                .iter()
                .enumerate()
                .map(|(index, p)| {
                    let cmd = if index == 0 { 'M' } else { 'L' };
                    format!("{cmd} {:.2} {:.2}", p.x, p.y)
                })
                .collect::<Vec<_>>()
                .join(" ");
            let _ = write!(svg, r#"<path class="spark-line" d="{path}" />"#);

            for p in &points {
                let _ = write!(
                    svg,
                    r#"<circle class="spark-point" cx="{:.2}" cy="{:.2}" r="{}" />"#,
                    p.x, p.y, self.radius
                );
            }
        }

        svg.push_str("</svg>");
        svg
    }
}

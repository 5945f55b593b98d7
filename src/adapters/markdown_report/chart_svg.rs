//! SVG rendering of the NAV curve.

pub const WIDTH: u32 = 960;
pub const HEIGHT: u32 = 480;
pub const PADDING: u32 = 40;
const GRID_STEP: usize = 50;

/// Pixel coordinates for each value, left to right.
///
/// A flat series is padded by 1e-6 so the range is never zero; a single
/// value is centered horizontally.
pub fn line_points(values: &[f64], width: u32, height: u32, padding: u32) -> Vec<(i64, i64)> {
    if values.is_empty() {
        return Vec::new();
    }

    let x_min = i64::from(padding);
    let x_max = i64::from(width) - i64::from(padding) - 1;
    let y_min = i64::from(padding);
    let y_max = i64::from(height) - i64::from(padding) - 1;

    let v_min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut v_max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if (v_max - v_min).abs() < 1e-12 {
        v_max = v_min + 1e-6;
    }

    let n = values.len();
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let x = if n == 1 {
                (x_min + x_max) / 2
            } else {
                x_min + ((x_max - x_min) as f64 * i as f64 / (n - 1) as f64) as i64
            };
            let ratio = (value - v_min) / (v_max - v_min);
            let y = y_max - ((y_max - y_min) as f64 * ratio) as i64;
            (x, y)
        })
        .collect()
}

/// Full SVG document with grid, axes and the NAV polyline.
pub fn render_nav_svg(nav_values: &[f64]) -> String {
    let (w, h, p) = (WIDTH, HEIGHT, PADDING);
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n"
    ));
    svg.push_str(&format!(
        "  <rect width=\"{w}\" height=\"{h}\" fill=\"rgb(250,250,250)\"/>\n"
    ));

    for gy in (p..h - p).step_by(GRID_STEP) {
        svg.push_str(&format!(
            "  <line x1=\"{p}\" y1=\"{gy}\" x2=\"{}\" y2=\"{gy}\" stroke=\"rgb(230,230,230)\"/>\n",
            w - p
        ));
    }

    let axis = "stroke=\"rgb(180,180,180)\"";
    svg.push_str(&format!(
        "  <line x1=\"{p}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" {axis}/>\n",
        h - p,
        w - p,
        h - p
    ));
    svg.push_str(&format!(
        "  <line x1=\"{p}\" y1=\"{p}\" x2=\"{p}\" y2=\"{}\" {axis}/>\n",
        h - p
    ));

    let points = line_points(nav_values, w, h, p);
    if !points.is_empty() {
        let joined = points
            .iter()
            .map(|(x, y)| format!("{},{}", x, y))
            .collect::<Vec<_>>()
            .join(" ");
        svg.push_str(&format!(
            "  <polyline points=\"{joined}\" fill=\"none\" stroke=\"rgb(30,110,220)\" stroke-width=\"2\"/>\n"
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_has_no_points() {
        assert!(line_points(&[], WIDTH, HEIGHT, PADDING).is_empty());
        assert!(!render_nav_svg(&[]).contains("<polyline"));
    }

    #[test]
    fn single_point_is_centered() {
        let points = line_points(&[1.0], WIDTH, HEIGHT, PADDING);
        assert_eq!(points, vec![((40 + 919) / 2, 439)]);
    }

    #[test]
    fn flat_series_sits_on_the_baseline() {
        let points = line_points(&[1.0, 1.0, 1.0], WIDTH, HEIGHT, PADDING);
        assert!(points.iter().all(|&(_, y)| y == 439));
        assert_eq!(points[0].0, 40);
        assert_eq!(points[2].0, 919);
    }

    #[test]
    fn extremes_map_to_plot_edges() {
        let points = line_points(&[1.0, 2.0, 1.5], WIDTH, HEIGHT, PADDING);
        assert_eq!(points[0].1, 439);
        assert_eq!(points[1].1, 40);
    }

    #[test]
    fn svg_document_contains_polyline() {
        let svg = render_nav_svg(&[1.0, 1.1, 1.05]);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("width=\"960\" height=\"480\""));
        assert!(svg.contains("<polyline points=\"40,439 "));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}

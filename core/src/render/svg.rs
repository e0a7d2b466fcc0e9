//! SVG image production for charts and cards.
//!
//! Output is a standalone SVG document returned as raw bytes with the
//! `image/svg+xml` MIME type. Rendering is deterministic for a given
//! input; callers wrap the bytes as an image part and never look back
//! inside them.

use super::rank_color;

pub const MIME_SVG: &str = "image/svg+xml";

const SERIES_COLORS: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b",
];

/// Rating bands shown behind performance charts, bottom-up.
const RANK_BANDS: &[(i64, i64, &str)] = &[
    (0, 1200, "#cccccc"),
    (1200, 1400, "#77ff77"),
    (1400, 1600, "#77ddbb"),
    (1600, 1900, "#aaaaff"),
    (1900, 2100, "#ff88ff"),
    (2100, 2300, "#ffcc88"),
];
const TOP_BAND_COLOR: &str = "#ffbb55";

/// One plotted line: a label and (unix seconds, value) points.
#[derive(Debug, Clone)]
pub struct Series {
    pub label: String,
    pub points: Vec<(i64, i64)>,
}

/// Card style variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardStyle {
    Modern,
    Minimal,
    Dark,
}

impl CardStyle {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "modern" => Some(Self::Modern),
            "minimal" => Some(Self::Minimal),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

/// Inputs for a single-user profile card.
#[derive(Debug, Clone)]
pub struct ProfileCardData {
    pub handle: String,
    pub rank: String,
    pub rating: i64,
    pub max_rating: i64,
    pub solved: usize,
    pub contests: usize,
    pub member_since: String,
    /// Rating after each contest, oldest first; empty hides the graph.
    pub history: Vec<i64>,
    pub style: CardStyle,
    /// Footer stamp supplied by the caller so rendering stays a pure
    /// function of its input.
    pub generated_on: String,
}

/// Inputs for one entry of a side-by-side comparison card.
#[derive(Debug, Clone)]
pub struct ComparisonEntry {
    pub handle: String,
    pub rank: String,
    pub rating: i64,
    pub max_rating: i64,
    pub solved: usize,
    pub history: Vec<i64>,
}

// ─────────────────────────────────────────────────────────────────────
// Charts
// ─────────────────────────────────────────────────────────────────────

/// Multi-series line chart over time, optionally over rank bands.
pub fn line_chart(title: &str, y_label: &str, series: &[Series], rank_bands: bool) -> Vec<u8> {
    let (width, height) = (900.0, 540.0);
    let (left, right, top, bottom) = (70.0, 30.0, 56.0, 50.0);
    let plot_w = width - left - right;
    let plot_h = height - top - bottom;

    let mut svg = Svg::new(width, height, "#fafafa");
    svg.text(width / 2.0, 28.0, 20.0, "#333333", "middle", title);

    let points: Vec<(i64, i64)> = series.iter().flat_map(|s| s.points.iter().copied()).collect();
    if points.is_empty() {
        svg.text(width / 2.0, height / 2.0, 16.0, "#666666", "middle", "no data");
        return svg.finish();
    }

    let (t_min, t_max) = min_max(points.iter().map(|(t, _)| *t));
    let (v_min, v_max) = min_max(points.iter().map(|(_, v)| *v));
    let v_lo = round_down(v_min - 100, 100);
    let v_hi = round_up(v_max + 100, 100);
    let t_span = (t_max - t_min).max(1) as f64;
    let v_span = (v_hi - v_lo).max(1) as f64;

    let x_of = |t: i64| left + (t - t_min) as f64 / t_span * plot_w;
    let y_of = |v: i64| top + plot_h - (v - v_lo) as f64 / v_span * plot_h;

    if rank_bands {
        for &(lo, hi, color) in RANK_BANDS {
            draw_band(&mut svg, lo, hi, color, v_lo, v_hi, &y_of, left, plot_w);
        }
        draw_band(&mut svg, 2300, v_hi.max(2400), TOP_BAND_COLOR, v_lo, v_hi, &y_of, left, plot_w);
    }

    // Axes and horizontal grid lines.
    svg.line(left, top, left, top + plot_h, "#888888", 1.0);
    svg.line(left, top + plot_h, left + plot_w, top + plot_h, "#888888", 1.0);
    let step = grid_step(v_hi - v_lo);
    let mut tick = round_up(v_lo, step);
    while tick <= v_hi {
        let y = y_of(tick);
        svg.line(left, y, left + plot_w, y, "#dddddd", 0.5);
        svg.text(left - 8.0, y + 4.0, 11.0, "#555555", "end", &tick.to_string());
        tick += step;
    }
    svg.text(left, height - 12.0, 11.0, "#555555", "start", &format_day(t_min));
    svg.text(left + plot_w, height - 12.0, 11.0, "#555555", "end", &format_day(t_max));
    svg.text(16.0, top - 10.0, 12.0, "#555555", "start", y_label);

    for (i, s) in series.iter().enumerate() {
        if s.points.is_empty() {
            continue;
        }
        let color = SERIES_COLORS[i % SERIES_COLORS.len()];
        let pts: Vec<(f64, f64)> = s.points.iter().map(|&(t, v)| (x_of(t), y_of(v))).collect();
        svg.polyline(&pts, color, 2.0);
        for &(x, y) in &pts {
            svg.circle(x, y, 3.0, color);
        }
        // Legend row per series.
        let ly = top + 6.0 + i as f64 * 18.0;
        svg.rect(left + plot_w - 150.0, ly - 9.0, 12.0, 12.0, color, None);
        svg.text(left + plot_w - 132.0, ly + 2.0, 12.0, "#333333", "start", &s.label);
    }

    svg.finish()
}

/// Vertical bar chart over rating buckets.
pub fn bar_chart(title: &str, bins: &[(i64, usize)], bin_size: i64) -> Vec<u8> {
    let (width, height) = (900.0, 540.0);
    let (left, right, top, bottom) = (70.0, 30.0, 56.0, 60.0);
    let plot_w = width - left - right;
    let plot_h = height - top - bottom;

    let mut svg = Svg::new(width, height, "#fafafa");
    svg.text(width / 2.0, 28.0, 20.0, "#333333", "middle", title);

    if bins.is_empty() {
        svg.text(width / 2.0, height / 2.0, 16.0, "#666666", "middle", "no data");
        return svg.finish();
    }

    let max_count = bins.iter().map(|(_, c)| *c).max().unwrap_or(1).max(1);
    let slot = plot_w / bins.len() as f64;
    let bar_w = (slot - 6.0).max(2.0);

    svg.line(left, top + plot_h, left + plot_w, top + plot_h, "#888888", 1.0);

    for (i, &(bucket, count)) in bins.iter().enumerate() {
        let h = count as f64 / max_count as f64 * plot_h;
        let x = left + i as f64 * slot + 3.0;
        let y = top + plot_h - h;
        svg.rect(x, y, bar_w, h, "#1e90ff", Some(("#333333", 0.5)));
        svg.text(x + bar_w / 2.0, y - 5.0, 11.0, "#333333", "middle", &count.to_string());
        let label = format!("{}-{}", bucket, bucket + bin_size - 1);
        svg.text(x + bar_w / 2.0, top + plot_h + 16.0, 10.0, "#555555", "middle", &label);
    }

    svg.finish()
}

/// Pie chart with a counted legend.
pub fn pie_chart(title: &str, slices: &[(String, usize)]) -> Vec<u8> {
    let (width, height) = (760.0, 560.0);
    let (cx, cy, r) = (280.0, 300.0, 190.0);

    let mut svg = Svg::new(width, height, "#fafafa");
    svg.text(width / 2.0, 30.0, 20.0, "#333333", "middle", title);

    let total: usize = slices.iter().map(|(_, c)| *c).sum();
    if total == 0 {
        svg.text(width / 2.0, height / 2.0, 16.0, "#666666", "middle", "no data");
        return svg.finish();
    }

    let mut angle = -90.0_f64;
    for (i, (label, count)) in slices.iter().enumerate() {
        let color = SERIES_COLORS[i % SERIES_COLORS.len()];
        let sweep = *count as f64 / total as f64 * 360.0;
        if slices.len() == 1 || sweep >= 359.99 {
            svg.circle(cx, cy, r, color);
        } else {
            svg.pie_slice(cx, cy, r, angle, angle + sweep, color);
        }
        let pct = *count as f64 / total as f64 * 100.0;
        let ly = 80.0 + i as f64 * 24.0;
        svg.rect(520.0, ly - 12.0, 14.0, 14.0, color, None);
        svg.text(
            542.0,
            ly,
            13.0,
            "#333333",
            "start",
            &format!("{label}: {count} ({pct:.1}%)"),
        );
        angle += sweep;
    }

    svg.finish()
}

// ─────────────────────────────────────────────────────────────────────
// Cards
// ─────────────────────────────────────────────────────────────────────

/// Single-user profile card with rating, stats, and a mini graph.
pub fn profile_card(data: &ProfileCardData) -> Vec<u8> {
    let (width, height, bg_top, bg_bottom, text_color, muted) = match data.style {
        CardStyle::Dark => (800.0, 500.0, "#1e1e28", "#32323c", "#ffffff", "#969696"),
        CardStyle::Minimal => (700.0, 400.0, "#fafafa", "#f0f0f0", "#323232", "#969696"),
        CardStyle::Modern => (850.0, 550.0, "#f5f5fa", "#ebebf5", "#282828", "#969696"),
    };
    let accent = rank_color(&data.rank);

    let mut svg = Svg::with_gradient(width, height, bg_top, bg_bottom);

    svg.text(40.0, 76.0, 36.0, accent, "start", &data.handle);
    svg.text(40.0, 110.0, 22.0, text_color, "start", &title_case(&data.rank));

    // Rating block with a progress bar against the 3000 ceiling.
    svg.text(40.0, 170.0, 22.0, text_color, "start", "Rating");
    let rating_line = if data.max_rating != data.rating {
        format!("Current: {} (Max: {})", data.rating, data.max_rating)
    } else {
        format!("Current: {}", data.rating)
    };
    svg.text(40.0, 200.0, 17.0, accent, "start", &rating_line);
    let progress = (data.rating as f64 / 3000.0).clamp(0.0, 1.0);
    svg.rect(40.0, 216.0, 300.0, 15.0, "#c8c8c8", Some(("#aaaaaa", 1.0)));
    if progress > 0.0 {
        svg.rect(40.0, 216.0, 300.0 * progress, 15.0, accent, None);
    }

    // Statistics block.
    svg.text(40.0, 290.0, 22.0, text_color, "start", "Statistics");
    svg.text(
        40.0,
        322.0,
        17.0,
        text_color,
        "start",
        &format!("Problems Solved: {}", data.solved),
    );
    svg.text(
        40.0,
        350.0,
        17.0,
        text_color,
        "start",
        &format!("Member Since: {}", data.member_since),
    );
    svg.text(
        40.0,
        378.0,
        17.0,
        text_color,
        "start",
        &format!("Contests: {}", data.contests),
    );

    if data.history.len() > 1 {
        mini_graph(
            &mut svg,
            width - 320.0,
            50.0,
            280.0,
            150.0,
            &data.history,
            accent,
        );
    }

    svg.text(
        40.0,
        height - 24.0,
        13.0,
        muted,
        "start",
        &format!("Generated on {}", data.generated_on),
    );
    svg.text(width - 40.0, height - 24.0, 13.0, muted, "end", "Codeforces Profile");

    svg.finish()
}

/// Side-by-side comparison card for two to four users.
pub fn comparison_card(entries: &[ComparisonEntry]) -> Vec<u8> {
    let count = entries.len();
    let (width, height, cols, rows) = match count {
        0 | 1 | 2 => (900.0, 500.0, 2usize, 1usize),
        3 | 4 => (900.0, 700.0, 2, 2),
        _ => (900.0, 700.0, 2, 2),
    };

    let mut svg = Svg::new(width, height, "#f0f0fa");
    svg.text(width / 2.0, 40.0, 28.0, "#333333", "middle", "Profile Comparison");

    let card_w = (width - 60.0) / cols as f64;
    let card_h = (height - 100.0) / rows as f64;

    for (i, entry) in entries.iter().enumerate().take(4) {
        let (x, y) = if count == 3 && i == 2 {
            // Center the third card on the second row.
            ((width - card_w) / 2.0, 80.0 + card_h + 10.0)
        } else {
            let col = i % cols;
            let row = i / cols;
            (
                30.0 + col as f64 * (card_w + 10.0),
                80.0 + row as f64 * (card_h + 10.0),
            )
        };

        let accent = rank_color(&entry.rank);
        svg.rect(x, y, card_w - 10.0, card_h - 10.0, "#fafafa", Some((accent, 3.0)));
        svg.text(x + 15.0, y + 34.0, 20.0, accent, "start", &entry.handle);
        svg.text(x + 15.0, y + 58.0, 14.0, "#646464", "start", &title_case(&entry.rank));
        svg.text(
            x + 15.0,
            y + 92.0,
            15.0,
            "#323232",
            "start",
            &format!("Rating: {}", entry.rating),
        );
        if entry.max_rating != entry.rating {
            svg.text(
                x + 15.0,
                y + 114.0,
                13.0,
                "#646464",
                "start",
                &format!("Max: {}", entry.max_rating),
            );
        }
        svg.text(
            x + 15.0,
            y + 138.0,
            15.0,
            "#323232",
            "start",
            &format!("Solved: {}", entry.solved),
        );

        if entry.history.len() > 1 {
            mini_graph(
                &mut svg,
                x + 15.0,
                y + 158.0,
                card_w - 40.0,
                (card_h - 180.0).max(60.0),
                &entry.history,
                accent,
            );
        }
    }

    svg.finish()
}

fn mini_graph(svg: &mut Svg, x: f64, y: f64, w: f64, h: f64, history: &[i64], color: &str) {
    svg.rect(x, y, w, h, "#ffffff", Some((color, 1.5)));
    let (lo, hi) = min_max(history.iter().copied());
    let span = (hi - lo).max(1) as f64;
    let n = history.len();
    let pts: Vec<(f64, f64)> = history
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let px = x + 8.0 + i as f64 * (w - 16.0) / (n - 1) as f64;
            let py = y + h - 8.0 - (v - lo) as f64 / span * (h - 16.0);
            (px, py)
        })
        .collect();
    svg.polyline(&pts, color, 2.0);
    for &(px, py) in &pts {
        svg.circle(px, py, 2.5, color);
    }
}

// ─────────────────────────────────────────────────────────────────────
// Low-level builder
// ─────────────────────────────────────────────────────────────────────

struct Svg {
    body: String,
}

impl Svg {
    fn new(width: f64, height: f64, background: &str) -> Self {
        let mut body = String::with_capacity(4096);
        body.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\" \
             viewBox=\"0 0 {width:.0} {height:.0}\" font-family=\"Helvetica, Arial, sans-serif\">\n"
        ));
        body.push_str(&format!(
            "<rect x=\"0\" y=\"0\" width=\"{width:.0}\" height=\"{height:.0}\" fill=\"{background}\"/>\n"
        ));
        Self { body }
    }

    fn with_gradient(width: f64, height: f64, top: &str, bottom: &str) -> Self {
        let mut body = String::with_capacity(4096);
        body.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\" \
             viewBox=\"0 0 {width:.0} {height:.0}\" font-family=\"Helvetica, Arial, sans-serif\">\n"
        ));
        body.push_str(&format!(
            "<defs><linearGradient id=\"bg\" x1=\"0\" y1=\"0\" x2=\"0\" y2=\"1\">\
             <stop offset=\"0\" stop-color=\"{top}\"/>\
             <stop offset=\"1\" stop-color=\"{bottom}\"/>\
             </linearGradient></defs>\n"
        ));
        body.push_str(&format!(
            "<rect x=\"0\" y=\"0\" width=\"{width:.0}\" height=\"{height:.0}\" fill=\"url(#bg)\"/>\n"
        ));
        Self { body }
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str, stroke: Option<(&str, f64)>) {
        let stroke_attr = match stroke {
            Some((color, sw)) => format!(" stroke=\"{color}\" stroke-width=\"{sw:.1}\""),
            None => String::new(),
        };
        self.body.push_str(&format!(
            "<rect x=\"{x:.1}\" y=\"{y:.1}\" width=\"{w:.1}\" height=\"{h:.1}\" fill=\"{fill}\"{stroke_attr}/>\n"
        ));
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str, width: f64) {
        self.body.push_str(&format!(
            "<line x1=\"{x1:.1}\" y1=\"{y1:.1}\" x2=\"{x2:.1}\" y2=\"{y2:.1}\" stroke=\"{stroke}\" stroke-width=\"{width:.1}\"/>\n"
        ));
    }

    fn polyline(&mut self, points: &[(f64, f64)], stroke: &str, width: f64) {
        let coords: Vec<String> = points.iter().map(|(x, y)| format!("{x:.1},{y:.1}")).collect();
        self.body.push_str(&format!(
            "<polyline points=\"{}\" fill=\"none\" stroke=\"{stroke}\" stroke-width=\"{width:.1}\"/>\n",
            coords.join(" ")
        ));
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str) {
        self.body.push_str(&format!(
            "<circle cx=\"{cx:.1}\" cy=\"{cy:.1}\" r=\"{r:.1}\" fill=\"{fill}\"/>\n"
        ));
    }

    fn pie_slice(&mut self, cx: f64, cy: f64, r: f64, start_deg: f64, end_deg: f64, fill: &str) {
        let (x1, y1) = polar(cx, cy, r, start_deg);
        let (x2, y2) = polar(cx, cy, r, end_deg);
        let large_arc = if end_deg - start_deg > 180.0 { 1 } else { 0 };
        self.body.push_str(&format!(
            "<path d=\"M {cx:.1} {cy:.1} L {x1:.1} {y1:.1} A {r:.1} {r:.1} 0 {large_arc} 1 {x2:.1} {y2:.1} Z\" fill=\"{fill}\"/>\n"
        ));
    }

    fn text(&mut self, x: f64, y: f64, size: f64, fill: &str, anchor: &str, content: &str) {
        self.body.push_str(&format!(
            "<text x=\"{x:.1}\" y=\"{y:.1}\" font-size=\"{size:.0}\" fill=\"{fill}\" text-anchor=\"{anchor}\">{}</text>\n",
            xml_escape(content)
        ));
    }

    fn finish(mut self) -> Vec<u8> {
        self.body.push_str("</svg>\n");
        self.body.into_bytes()
    }
}

fn polar(cx: f64, cy: f64, r: f64, deg: f64) -> (f64, f64) {
    let rad = deg.to_radians();
    (cx + r * rad.cos(), cy + r * rad.sin())
}

fn draw_band<F: Fn(i64) -> f64>(
    svg: &mut Svg,
    lo: i64,
    hi: i64,
    color: &str,
    v_lo: i64,
    v_hi: i64,
    y_of: &F,
    left: f64,
    plot_w: f64,
) {
    let lo = lo.max(v_lo);
    let hi = hi.min(v_hi);
    if lo >= hi {
        return;
    }
    let y_top = y_of(hi);
    let y_bottom = y_of(lo);
    svg.body.push_str(&format!(
        "<rect x=\"{left:.1}\" y=\"{y_top:.1}\" width=\"{plot_w:.1}\" height=\"{:.1}\" fill=\"{color}\" opacity=\"0.5\"/>\n",
        y_bottom - y_top
    ));
}

fn min_max<I: Iterator<Item = i64>>(values: I) -> (i64, i64) {
    let mut lo = i64::MAX;
    let mut hi = i64::MIN;
    for v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo > hi {
        (0, 0)
    } else {
        (lo, hi)
    }
}

fn round_down(value: i64, step: i64) -> i64 {
    (value.div_euclid(step)) * step
}

fn round_up(value: i64, step: i64) -> i64 {
    let down = round_down(value, step);
    if down == value {
        value
    } else {
        down + step
    }
}

fn grid_step(span: i64) -> i64 {
    let raw = (span / 6).max(1);
    ((raw + 99) / 100).max(1) * 100
}

fn format_day(secs: i64) -> String {
    match chrono::DateTime::<chrono::Utc>::from_timestamp(secs, 0) {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => String::new(),
    }
}

fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn xml_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

use rand::Rng;
use std::f64::consts::PI;
use std::fmt::Write;

pub const SEGMENTS: usize = 7;

const START_X_JITTER: f64 = 40.0;
const START_Y_MIN: f64 = 20.0;
const START_Y_MAX: f64 = 60.0;
const END_Y_INSET: f64 = 60.0;
const Y_JITTER: f64 = 10.0;
const MAX_SPREAD: f64 = 80.0;
const BRANCH_LEN_MIN: f64 = 40.0;
const BRANCH_LEN_MAX: f64 = 160.0;
const BRANCH_CONTROL_RATIO: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A quadratic offshoot attached to an interior trunk vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub origin_index: usize,
    pub origin: Point,
    pub control: Point,
    pub end: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoltPath {
    pub width: f64,
    pub height: f64,
    pub trunk: Vec<Point>,
    pub branches: Vec<Branch>,
}

pub fn generate(width: f64, height: f64) -> BoltPath {
    generate_with(&mut rand::thread_rng(), width, height)
}

/// Builds a fresh bolt. The trunk is a jagged polyline whose horizontal
/// spread peaks at its midpoint; branches curve off interior vertices.
pub fn generate_with(rng: &mut impl Rng, width: f64, height: f64) -> BoltPath {
    let width = clamp_dimension(width);
    let height = clamp_dimension(height);

    let start = Point {
        x: width / 2.0 + rng.gen_range(-START_X_JITTER..START_X_JITTER),
        y: rng.gen_range(START_Y_MIN..START_Y_MAX),
    };
    let end_y = height - END_Y_INSET;

    let mut trunk = Vec::with_capacity(SEGMENTS + 1);
    trunk.push(start);
    for i in 1..=SEGMENTS {
        let t = i as f64 / SEGMENTS as f64;
        let spread = MAX_SPREAD * (1.0 - (0.5 - t).abs());
        let x = start.x + rng.gen_range(-1.0..1.0) * spread;
        let y = if i == SEGMENTS {
            end_y
        } else {
            start.y + (end_y - start.y) * t + rng.gen_range(-Y_JITTER..Y_JITTER)
        };
        trunk.push(Point { x, y });
    }

    let branch_count = rng.gen_range(2..=4);
    let branches = (0..branch_count)
        .map(|_| {
            let origin_index = rng.gen_range(1..SEGMENTS);
            let origin = trunk[origin_index];
            let angle = rng.gen_range(-PI..=PI);
            let length = rng.gen_range(BRANCH_LEN_MIN..=BRANCH_LEN_MAX);
            let (dx, dy) = (angle.cos() * length, angle.sin() * length);
            Branch {
                origin_index,
                origin,
                control: Point {
                    x: origin.x + dx * BRANCH_CONTROL_RATIO,
                    y: origin.y + dy * BRANCH_CONTROL_RATIO,
                },
                end: Point {
                    x: origin.x + dx,
                    y: origin.y + dy,
                },
            }
        })
        .collect();

    BoltPath {
        width,
        height,
        trunk,
        branches,
    }
}

fn clamp_dimension(value: f64) -> f64 {
    // NaN falls through to 1.0 as well.
    value.max(1.0)
}

impl BoltPath {
    pub fn trunk_d(&self) -> String {
        let mut d = String::new();
        for (i, p) in self.trunk.iter().enumerate() {
            let cmd = if i == 0 { 'M' } else { 'L' };
            if i > 0 {
                d.push(' ');
            }
            let _ = write!(d, "{cmd}{:.1} {:.1}", p.x, p.y);
        }
        d
    }
}

impl Branch {
    pub fn d(&self) -> String {
        format!(
            "M{:.1} {:.1} Q{:.1} {:.1} {:.1} {:.1}",
            self.origin.x, self.origin.y, self.control.x, self.control.y, self.end.x, self.end.y
        )
    }
}

/// Layered SVG: blurred glow, fill and core strokes for the trunk, then a
/// thin core stroke per branch.
pub fn render_svg(path: &BoltPath) -> String {
    let trunk = path.trunk_d();
    let mut svg = format!(
        concat!(
            r#"<svg class="bolt" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w:.0} {h:.0}" "#,
            r#"width="{w:.0}" height="{h:.0}" fill="none" stroke-linecap="round" stroke-linejoin="round">"#,
            r#"<defs><filter id="bolt-glow" x="-50%" y="-50%" width="200%" height="200%">"#,
            r#"<feGaussianBlur stdDeviation="6"/></filter></defs>"#,
            r#"<path class="bolt-glow" d="{d}" stroke="rgba(140,190,255,0.55)" stroke-width="14" filter="url(#bolt-glow)"/>"#,
            r#"<path class="bolt-fill" d="{d}" stroke="rgba(190,220,255,0.85)" stroke-width="6"/>"#,
            r##"<path class="bolt-core" d="{d}" stroke="#ffffff" stroke-width="2"/>"##,
        ),
        w = path.width,
        h = path.height,
        d = trunk,
    );
    for branch in &path.branches {
        let _ = write!(
            svg,
            r##"<path class="bolt-branch" d="{}" stroke="#f2f7ff" stroke-width="1.5"/>"##,
            branch.d()
        );
    }
    svg.push_str("</svg>");
    svg
}

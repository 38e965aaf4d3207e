//! Drawable primitives, their styles and the serialisable parameter specs that
//! construction scripts use to create them.

use std::{f64::consts::TAU, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    config::LayoutConfig,
    geometry::{bounds_of, corners, Affine, Point, Rect, Vec2, EPSILON},
    BeamVizError, Result,
};

/// RGB colour serialised as a `#rrggbb` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const PINK: Color = Color::rgb(0xd1, 0x47, 0xbd);
    pub const YELLOW: Color = Color::rgb(0xff, 0xff, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Color {
    type Error = BeamVizError;

    fn try_from(value: String) -> Result<Self> {
        let hex = value
            .strip_prefix('#')
            .filter(|hex| hex.len() == 6 && hex.is_ascii())
            .ok_or_else(|| BeamVizError::msg(format!("colour `{value}` is not #rrggbb")))?;
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| BeamVizError::msg(format!("colour `{value}` is not #rrggbb")))
        };
        Ok(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// Visual style handed to the renderer. A missing stroke width is filled in
/// from the layout configuration when the primitive is snapshotted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub stroke: Color,
    pub stroke_width: Option<f64>,
    pub fill: Option<Color>,
    pub fill_opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke: Color::WHITE,
            stroke_width: None,
            fill: None,
            fill_opacity: 0.0,
        }
    }
}

impl Style {
    pub fn stroked(color: Color) -> Self {
        Self {
            stroke: color,
            ..Self::default()
        }
    }

    /// Solid glyph style used for text.
    pub fn text() -> Self {
        Self {
            stroke: Color::WHITE,
            stroke_width: Some(0.0),
            fill: Some(Color::WHITE),
            fill_opacity: 1.0,
        }
    }

    pub fn with_fill(mut self, color: Color, opacity: f64) -> Self {
        self.fill = Some(color);
        self.fill_opacity = opacity;
        self
    }

    /// Sets stroke and fill colour together, keeping opacities.
    pub fn with_color(mut self, color: Color) -> Self {
        self.stroke = color;
        if self.fill.is_some() {
            self.fill = Some(color);
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slant {
    #[default]
    Normal,
    Italic,
}

/// Shape geometry in absolute scene coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Circle {
        center: Point,
        radius: f64,
    },
    Line {
        start: Point,
        end: Point,
    },
    Arrow {
        start: Point,
        end: Point,
        tip_length: f64,
    },
    /// Closed outline: rectangles, regular polygons and frame boxes.
    Polygon {
        vertices: Vec<Point>,
    },
    /// Open path, used for line graphs.
    Polyline {
        vertices: Vec<Point>,
    },
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        sweep: f64,
    },
    Text {
        content: String,
        center: Point,
        width: f64,
        height: f64,
        font_size: f64,
        slant: Slant,
        math: bool,
    },
}

/// A single drawable shape with its style and accumulated rotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    pub shape: Shape,
    pub style: Style,
    /// Total rotation applied since construction, in radians.
    pub angle: f64,
}

impl Primitive {
    fn new(shape: Shape, style: Style) -> Self {
        Self {
            shape,
            style,
            angle: 0.0,
        }
    }

    pub fn circle(radius: f64) -> Result<Self> {
        positive("circle radius", radius)?;
        Ok(Self::new(
            Shape::Circle {
                center: Point::ORIGIN,
                radius,
            },
            Style::stroked(Color::WHITE),
        ))
    }

    /// Axis-aligned rectangle centred on the origin.
    pub fn rectangle(width: f64, height: f64) -> Result<Self> {
        positive("rectangle width", width)?;
        positive("rectangle height", height)?;
        let bounds = Rect::from_center_size(Point::ORIGIN, (width, height));
        Ok(Self::new(
            Shape::Polygon {
                vertices: corners(bounds).to_vec(),
            },
            Style::default(),
        ))
    }

    /// Regular polygon inscribed in a circle of `radius`, first vertex straight up.
    pub fn regular_polygon(sides: usize, radius: f64) -> Result<Self> {
        if sides < 3 {
            return Err(BeamVizError::invalid(format!(
                "a polygon needs at least three sides, got {sides}"
            )));
        }
        positive("polygon radius", radius)?;
        let vertices = (0..sides)
            .map(|i| {
                let theta = TAU / 4.0 + TAU * i as f64 / sides as f64;
                Point::ORIGIN + Vec2::from_angle(theta) * radius
            })
            .collect();
        Ok(Self::new(Shape::Polygon { vertices }, Style::default()))
    }

    /// Equilateral triangle of unit circumradius pointing up.
    pub fn triangle() -> Result<Self> {
        Self::regular_polygon(3, 1.0)
    }

    pub fn polygon(vertices: Vec<Point>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(BeamVizError::invalid("a polygon needs at least three vertices"));
        }
        finite_points(&vertices)?;
        Ok(Self::new(Shape::Polygon { vertices }, Style::default()))
    }

    pub fn line(start: Point, end: Point) -> Result<Self> {
        finite_points(&[start, end])?;
        if start.distance(end) <= EPSILON {
            return Err(BeamVizError::invalid("line endpoints coincide"));
        }
        Ok(Self::new(Shape::Line { start, end }, Style::default()))
    }

    /// Arrow from `start` to `end`, pulled in by the configured buffer at both ends.
    pub fn arrow(start: Point, end: Point, config: &LayoutConfig) -> Result<Self> {
        finite_points(&[start, end])?;
        let length = start.distance(end);
        if length <= 2.0 * config.arrow_buff + EPSILON {
            return Err(BeamVizError::invalid(format!(
                "arrow of length {length} is shorter than its buffers"
            )));
        }
        let unit = (end - start) / length;
        Ok(Self::new(
            Shape::Arrow {
                start: start + unit * config.arrow_buff,
                end: end - unit * config.arrow_buff,
                tip_length: config.arrow_tip_length,
            },
            Style::default().with_fill(Color::WHITE, 1.0),
        ))
    }

    pub fn polyline(vertices: Vec<Point>) -> Result<Self> {
        if vertices.len() < 2 {
            return Err(BeamVizError::invalid("a polyline needs at least two vertices"));
        }
        finite_points(&vertices)?;
        Ok(Self::new(Shape::Polyline { vertices }, Style::stroked(Color::YELLOW)))
    }

    /// Arc of `radius` around `center`, sweeping counter-clockwise for positive `sweep`.
    pub fn arc(center: Point, radius: f64, start_angle: f64, sweep: f64) -> Result<Self> {
        finite_points(&[center])?;
        positive("arc radius", radius)?;
        if !start_angle.is_finite() || !sweep.is_finite() || sweep.abs() <= EPSILON {
            return Err(BeamVizError::invalid(format!(
                "arc angles must be finite with a non-zero sweep, got {start_angle}/{sweep}"
            )));
        }
        Ok(Self::new(
            Shape::Arc {
                center,
                radius,
                start_angle,
                sweep,
            },
            Style::default(),
        ))
    }

    pub fn text(
        content: impl Into<String>,
        font_size: f64,
        slant: Slant,
        config: &LayoutConfig,
    ) -> Result<Self> {
        Self::label(content.into(), font_size, slant, false, config)
    }

    /// Typeset formula. Control words such as `\theta` count as one glyph.
    pub fn math(content: impl Into<String>, font_size: f64, config: &LayoutConfig) -> Result<Self> {
        Self::label(content.into(), font_size, Slant::Normal, true, config)
    }

    fn label(
        content: String,
        font_size: f64,
        slant: Slant,
        math: bool,
        config: &LayoutConfig,
    ) -> Result<Self> {
        positive("font size", font_size)?;
        let glyphs = if math {
            math_glyphs(&content)
        } else {
            content.chars().filter(|c| !c.is_control()).count()
        };
        if glyphs == 0 {
            return Err(BeamVizError::invalid("text has no visible glyphs"));
        }
        Ok(Self::new(
            Shape::Text {
                width: glyphs as f64 * config.glyph_width_per_pt * font_size,
                height: config.line_height_per_pt * font_size,
                center: Point::ORIGIN,
                content,
                font_size,
                slant,
                math,
            },
            Style::text(),
        ))
    }

    /// Frame box around `bounds`, padded by `buff`.
    pub fn surrounding(bounds: Rect, buff: f64) -> Result<Self> {
        if !buff.is_finite() {
            return Err(BeamVizError::invalid("surrounding buffer must be finite"));
        }
        let framed = bounds.inflate(buff, buff);
        if framed.width() <= 0.0 || framed.height() <= 0.0 {
            return Err(BeamVizError::invalid("surrounding rectangle collapsed"));
        }
        let mut frame = Self::polygon(corners(framed).to_vec())?;
        frame.style = Style::stroked(Color::YELLOW);
        Ok(frame)
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Points whose axis-aligned hull is the primitive's bounding box.
    pub fn extent_points(&self) -> Vec<Point> {
        match &self.shape {
            Shape::Circle { center, radius } => {
                let r = Vec2::new(*radius, *radius);
                vec![*center - r, *center + r]
            }
            Shape::Line { start, end } | Shape::Arrow { start, end, .. } => vec![*start, *end],
            Shape::Polygon { vertices } | Shape::Polyline { vertices } => vertices.clone(),
            Shape::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => arc_extent_points(*center, *radius, *start_angle, *sweep),
            Shape::Text {
                center,
                width,
                height,
                ..
            } => {
                let turn = Affine::rotate_about(self.angle, *center);
                corners(Rect::from_center_size(*center, (*width, *height)))
                    .into_iter()
                    .map(|corner| turn * corner)
                    .collect()
            }
        }
    }

    pub fn bounds(&self) -> Rect {
        bounds_of(self.extent_points()).unwrap_or_default()
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    pub fn shift(&mut self, vector: Vec2) {
        self.transform(Affine::translate(vector));
    }

    pub fn rotate(&mut self, angle: f64, about: Point) {
        self.transform(Affine::rotate_about(angle, about));
        if let Shape::Arc { start_angle, .. } = &mut self.shape {
            *start_angle = (*start_angle + angle).rem_euclid(TAU);
        }
        self.angle += angle;
    }

    /// Uniform scale about `about`; the factor is validated by the caller.
    pub fn scale(&mut self, factor: f64, about: Point) {
        self.transform(Affine::scale_about(factor, about));
        match &mut self.shape {
            Shape::Circle { radius, .. } | Shape::Arc { radius, .. } => *radius *= factor,
            Shape::Arrow { tip_length, .. } => *tip_length *= factor,
            Shape::Text {
                width,
                height,
                font_size,
                ..
            } => {
                *width *= factor;
                *height *= factor;
                *font_size *= factor;
            }
            Shape::Line { .. } | Shape::Polygon { .. } | Shape::Polyline { .. } => {}
        }
    }

    /// Direction of a line or arrow from start to end, in radians.
    pub fn line_angle(&self) -> Option<f64> {
        match &self.shape {
            Shape::Line { start, end } | Shape::Arrow { start, end, .. } => Some((*end - *start).atan2()),
            _ => None,
        }
    }

    pub fn line_endpoints(&self) -> Option<(Point, Point)> {
        match &self.shape {
            Shape::Line { start, end } | Shape::Arrow { start, end, .. } => Some((*start, *end)),
            _ => None,
        }
    }

    /// Point a fraction `alpha` of the way along the outline.
    pub fn point_from_proportion(&self, alpha: f64) -> Result<Point> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(BeamVizError::invalid(format!(
                "proportion {alpha} is outside [0, 1]"
            )));
        }
        match &self.shape {
            Shape::Line { start, end } | Shape::Arrow { start, end, .. } => Ok(start.lerp(*end, alpha)),
            Shape::Circle { center, radius } => {
                let theta = self.angle + TAU * alpha;
                Ok(*center + Vec2::from_angle(theta) * *radius)
            }
            Shape::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => {
                let theta = start_angle + sweep * alpha;
                Ok(*center + Vec2::from_angle(theta) * *radius)
            }
            Shape::Polyline { vertices } => Ok(along_path(vertices, false, alpha)),
            Shape::Polygon { vertices } => Ok(along_path(vertices, true, alpha)),
            Shape::Text { .. } => Err(BeamVizError::invalid("text has no outline to follow")),
        }
    }

    /// Maps the defining points only. Radii and angles are the caller's job.
    fn transform(&mut self, affine: Affine) {
        match &mut self.shape {
            Shape::Circle { center, .. } | Shape::Arc { center, .. } | Shape::Text { center, .. } => {
                *center = affine * *center
            }
            Shape::Line { start, end } | Shape::Arrow { start, end, .. } => {
                *start = affine * *start;
                *end = affine * *end;
            }
            Shape::Polygon { vertices } | Shape::Polyline { vertices } => {
                for vertex in vertices.iter_mut() {
                    *vertex = affine * *vertex;
                }
            }
        }
    }
}

/// Shape parameters as written in a construction script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeSpec {
    Circle {
        radius: f64,
    },
    Rectangle {
        width: f64,
        height: f64,
    },
    RegularPolygon {
        sides: usize,
        radius: f64,
    },
    Triangle,
    Line {
        start: Point,
        end: Point,
    },
    Arrow {
        start: Point,
        end: Point,
    },
    Polyline {
        vertices: Vec<Point>,
    },
    Text {
        content: String,
        font_size: f64,
        #[serde(default)]
        slant: Slant,
    },
    Math {
        content: String,
        font_size: f64,
    },
}

impl ShapeSpec {
    pub fn build(&self, config: &LayoutConfig) -> Result<Primitive> {
        match self {
            ShapeSpec::Circle { radius } => Primitive::circle(*radius),
            ShapeSpec::Rectangle { width, height } => Primitive::rectangle(*width, *height),
            ShapeSpec::RegularPolygon { sides, radius } => Primitive::regular_polygon(*sides, *radius),
            ShapeSpec::Triangle => Primitive::triangle(),
            ShapeSpec::Line { start, end } => Primitive::line(*start, *end),
            ShapeSpec::Arrow { start, end } => Primitive::arrow(*start, *end, config),
            ShapeSpec::Polyline { vertices } => Primitive::polyline(vertices.clone()),
            ShapeSpec::Text {
                content,
                font_size,
                slant,
            } => Primitive::text(content.clone(), *font_size, *slant, config),
            ShapeSpec::Math { content, font_size } => {
                Primitive::math(content.clone(), *font_size, config)
            }
        }
    }
}

fn positive(what: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(BeamVizError::invalid(format!(
            "{what} must be positive and finite, got {value}"
        )))
    }
}

fn finite_points(points: &[Point]) -> Result<()> {
    match points.iter().find(|p| !p.is_finite()) {
        Some(p) => Err(BeamVizError::invalid(format!("non-finite coordinate {p:?}"))),
        None => Ok(()),
    }
}

fn math_glyphs(source: &str) -> usize {
    let mut count = 0;
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let mut word = false;
                while chars.peek().is_some_and(|n| n.is_ascii_alphabetic()) {
                    chars.next();
                    word = true;
                }
                if !word {
                    // escaped single symbol such as `\,` or `\{`
                    chars.next();
                }
                count += 1;
            }
            '{' | '}' | '_' | '^' => {}
            c if c.is_whitespace() => {}
            _ => count += 1,
        }
    }
    count
}

fn arc_extent_points(center: Point, radius: f64, start: f64, sweep: f64) -> Vec<Point> {
    if sweep.abs() >= TAU {
        let r = Vec2::new(radius, radius);
        return vec![center - r, center + r];
    }
    let at = |theta: f64| center + Vec2::from_angle(theta) * radius;
    let start = start.rem_euclid(TAU);
    let (lo, hi) = if sweep >= 0.0 {
        (start, start + sweep)
    } else {
        (start + sweep, start)
    };
    let mut points = vec![at(lo), at(hi)];
    let quarter = TAU / 4.0;
    let mut k = (lo / quarter).ceil();
    while k * quarter <= hi {
        points.push(at(k * quarter));
        k += 1.0;
    }
    points
}

fn along_path(vertices: &[Point], closed: bool, alpha: f64) -> Point {
    let mut path = vertices.to_vec();
    if closed {
        if let Some(first) = vertices.first() {
            path.push(*first);
        }
    }
    let total: f64 = path.windows(2).map(|w| w[0].distance(w[1])).sum();
    let Some(first) = path.first().copied() else {
        return Point::ORIGIN;
    };
    if total <= EPSILON {
        return first;
    }

    let mut remaining = alpha * total;
    for segment in path.windows(2) {
        let length = segment[0].distance(segment[1]);
        if remaining <= length {
            let t = if length > EPSILON { remaining / length } else { 0.0 };
            return segment[0].lerp(segment[1], t);
        }
        remaining -= length;
    }
    path.last().copied().unwrap_or(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{DEGREES, ORIGIN, RIGHT, UP};

    fn near(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-12
    }

    #[test]
    fn rejects_malformed_parameters() {
        for result in [
            Primitive::circle(-0.06),
            Primitive::circle(f64::NAN),
            Primitive::rectangle(1.0, 0.0),
            Primitive::regular_polygon(2, 1.0),
            Primitive::line(ORIGIN, ORIGIN),
            Primitive::arc(ORIGIN, 1.0, 0.0, 0.0),
        ] {
            assert!(matches!(result, Err(BeamVizError::InvalidGeometry(_))));
        }
    }

    #[test]
    fn triangle_points_up_from_origin() {
        let triangle = Primitive::triangle().unwrap();
        let bounds = triangle.bounds();

        assert!((bounds.y1 - 1.0).abs() < 1e-12);
        assert!((bounds.y0 + 0.5).abs() < 1e-12);
        assert!((bounds.width() - 3.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn arrow_leaves_buffers_at_both_ends() {
        let config = LayoutConfig::default();
        let arrow = Primitive::arrow(ORIGIN + UP * 4.0, ORIGIN, &config).unwrap();

        let (start, end) = arrow.line_endpoints().unwrap();
        assert!(near(start, ORIGIN + UP * 3.75));
        assert!(near(end, ORIGIN + UP * 0.25));
        assert!(Primitive::arrow(ORIGIN, ORIGIN + UP * 0.4, &config).is_err());
    }

    #[test]
    fn rotated_text_grows_its_bounds() {
        let config = LayoutConfig::default();
        let mut text = Primitive::text("Weight of Life", 20.0, Slant::Italic, &config).unwrap();
        let flat = text.bounds();
        text.rotate(90.0 * DEGREES, ORIGIN);
        let upright = text.bounds();

        assert!((flat.width() - upright.height()).abs() < 1e-9);
        assert!((flat.height() - upright.width()).abs() < 1e-9);
    }

    #[test]
    fn math_control_words_count_once() {
        assert_eq!(math_glyphs(r"\theta"), 1);
        assert_eq!(math_glyphs(r"M_{p}2\theta"), 4);
        assert_eq!(math_glyphs(r"W\times\delta"), 3);
    }

    #[test]
    fn arc_bounds_include_crossed_quadrants() {
        let arc = Primitive::arc(ORIGIN, 1.0, -45.0 * DEGREES, 90.0 * DEGREES).unwrap();
        let bounds = arc.bounds();

        assert!((bounds.x1 - 1.0).abs() < 1e-12);
        assert!((bounds.y1 - (45.0 * DEGREES).sin()).abs() < 1e-12);
    }

    #[test]
    fn arc_bounds_survive_huge_angles() {
        let mut arc = Primitive::arc(ORIGIN, 0.5, 0.0, 20.0 * DEGREES).unwrap();
        arc.rotate(1e18, ORIGIN);
        let Shape::Arc { start_angle, .. } = arc.shape else {
            panic!("rotation changed the shape kind");
        };
        assert!((0.0..TAU).contains(&start_angle));
        let bounds = arc.bounds();
        assert!(bounds.width() <= 1.0 + 1e-12 && bounds.height() <= 1.0 + 1e-12);

        let wound = Primitive::arc(ORIGIN, 2.0, 1e20, 1e12).unwrap();
        assert_eq!(wound.bounds(), Rect::new(-2.0, -2.0, 2.0, 2.0));
    }

    #[test]
    fn proportion_walks_polyline_by_length() {
        let corner = ORIGIN + RIGHT;
        let path = Primitive::polyline(vec![ORIGIN, corner, corner + UP]).unwrap();

        assert!(near(path.point_from_proportion(0.25).unwrap(), ORIGIN + RIGHT * 0.5));
        assert!(near(path.point_from_proportion(1.0).unwrap(), corner + UP));
        assert!(path.point_from_proportion(1.5).is_err());
    }

    #[test]
    fn colours_parse_from_hex() {
        let parsed: Color = serde_json::from_str("\"#d147bd\"").unwrap();
        assert_eq!(parsed, Color::PINK);
        assert!(serde_json::from_str::<Color>("\"pink\"").is_err());
        assert_eq!(serde_json::to_string(&Color::YELLOW).unwrap(), "\"#ffff00\"");
    }
}

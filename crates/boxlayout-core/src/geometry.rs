//! Geometry value types used by the layout engine.
//!
//! All coordinates are `f32` pixels. [`Matrix`] follows the 2D affine
//! convention `x' = a*x + c*y + tx`, `y' = b*x + d*y + ty`, and delegates the
//! heavy lifting to [`glam::Affine2`].

use std::fmt;

use crate::math::{Affine2, Vec2};
use serde::{Deserialize, Serialize};
use static_assertions::{assert_eq_size, assert_impl_all};

assert_impl_all!(Point: Copy, Send, Sync);
assert_impl_all!(Rectangle: Copy, Send, Sync);
assert_eq_size!(Matrix, [f32; 6]);

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f32 {
        Vec2::from(*self).distance(Vec2::from(other))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x:{},y:{})", self.x, self.y)
    }
}

impl From<Vec2> for Point {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Self {
        Vec2::new(p.x, p.y)
    }
}

impl From<mint::Point2<f32>> for Point {
    fn from(p: mint::Point2<f32>) -> Self {
        Self::new(p.x, p.y)
    }
}

impl From<Point> for mint::Point2<f32> {
    fn from(p: Point) -> Self {
        mint::Point2 { x: p.x, y: p.y }
    }
}

/// Axis-aligned rectangle. Edges are half-open: the right and bottom edges
/// are not contained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Whether `other` lies completely inside this rectangle.
    pub fn contains_rect(&self, other: &Rectangle) -> bool {
        other.x >= self.x
            && other.x < self.right()
            && other.y >= self.y
            && other.y < self.bottom()
            && other.right() > self.x
            && other.right() <= self.right()
            && other.bottom() > self.y
            && other.bottom() <= self.bottom()
    }

    pub fn intersects(&self, other: &Rectangle) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rectangle::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(x={}, y={}, w={}, h={})",
            self.x, self.y, self.width, self.height
        )
    }
}

/// 2D affine transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Self = Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    pub const fn new(a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn scaling(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `degrees`, clockwise in a y-down coordinate system.
    pub fn rotation(degrees: f32) -> Self {
        Affine2::from_angle(degrees.to_radians()).into()
    }

    pub fn determinant(&self) -> f32 {
        self.a * self.d - self.b * self.c
    }

    /// Returns the transform that applies `self` first and then `next`.
    pub fn concat(&self, next: &Matrix) -> Matrix {
        (Affine2::from(*next) * Affine2::from(*self)).into()
    }

    /// `None` when the matrix is singular.
    pub fn invert(&self) -> Option<Matrix> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        Some(Affine2::from(*self).inverse().into())
    }

    pub fn transform_point(&self, p: Point) -> Point {
        Affine2::from(*self).transform_point2(p.into()).into()
    }

    /// Transforms a vector, ignoring translation.
    pub fn delta_transform_point(&self, p: Point) -> Point {
        Affine2::from(*self).transform_vector2(p.into()).into()
    }

    /// Axis-aligned bounding box of the transformed rectangle.
    pub fn transform_rect(&self, r: &Rectangle) -> Rectangle {
        let corners = [
            self.transform_point(Point::new(r.x, r.y)),
            self.transform_point(Point::new(r.right(), r.y)),
            self.transform_point(Point::new(r.x, r.bottom())),
            self.transform_point(Point::new(r.right(), r.bottom())),
        ];
        let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
        let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for p in corners {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Rectangle::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Parses a CSS `transform` property value such as
    /// `translate(10px, 4px) rotate(90deg) matrix(1, 0, 0, 1, 0, 0)`.
    ///
    /// Functions are composed with CSS semantics: the rightmost function is
    /// applied to a point first. Unknown functions are ignored; malformed
    /// arguments make the whole value invalid. `none` and the empty string
    /// parse to the identity.
    pub fn parse_css_transform(value: &str) -> Option<Matrix> {
        let value = value.trim().to_ascii_lowercase();
        if value.is_empty() || value == "none" {
            return Some(Matrix::IDENTITY);
        }

        let mut functions = Vec::new();
        let mut rest = value.as_str();
        while !rest.trim().is_empty() {
            let open = rest.find('(')?;
            let close = open + rest[open..].find(')')?;
            let name = rest[..open].trim();
            let args = rest[open + 1..close]
                .split(',')
                .map(parse_css_number)
                .collect::<Option<Vec<f32>>>()?;
            functions.push(css_function(name, &args)?);
            rest = &rest[close + 1..];
        }

        Some(
            functions
                .iter()
                .rev()
                .fold(Matrix::IDENTITY, |acc, m| acc.concat(m)),
        )
    }
}

fn parse_css_number(raw: &str) -> Option<f32> {
    let raw = raw.trim();
    let raw = raw
        .strip_suffix("px")
        .or_else(|| raw.strip_suffix("deg"))
        .unwrap_or(raw);
    raw.trim().parse().ok()
}

fn css_function(name: &str, args: &[f32]) -> Option<Matrix> {
    let arg = |i: usize| args.get(i).copied();
    let m = match name {
        "matrix" if args.len() == 6 => Matrix::new(args[0], args[1], args[2], args[3], args[4], args[5]),
        "translate" => Matrix::translation(arg(0)?, arg(1).unwrap_or(0.0)),
        "translatex" => Matrix::translation(arg(0)?, 0.0),
        "translatey" => Matrix::translation(0.0, arg(0)?),
        "scale" => {
            let sx = arg(0)?;
            Matrix::scaling(sx, arg(1).unwrap_or(sx))
        }
        "scalex" => Matrix::scaling(arg(0)?, 1.0),
        "scaley" => Matrix::scaling(1.0, arg(0)?),
        "rotate" => Matrix::rotation(arg(0)?),
        "matrix" => return None,
        _ => {
            tracing::trace!(function = name, "ignoring unsupported css transform function");
            Matrix::IDENTITY
        }
    };
    Some(m)
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "matrix({}, {}, {}, {}, {}, {})",
            self.a, self.b, self.c, self.d, self.tx, self.ty
        )
    }
}

impl From<Matrix> for Affine2 {
    fn from(m: Matrix) -> Self {
        Affine2::from_cols_array(&[m.a, m.b, m.c, m.d, m.tx, m.ty])
    }
}

impl From<Affine2> for Matrix {
    fn from(a: Affine2) -> Self {
        let [a, b, c, d, tx, ty] = a.to_cols_array();
        Matrix::new(a, b, c, d, tx, ty)
    }
}

/// The chain of transforms between a host element and the window, listed
/// from the element itself outwards.
///
/// Each level is typically the element's own CSS transform followed by its
/// offset inside the parent, with the parent's scroll applied in between.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformChain {
    levels: Vec<Matrix>,
}

impl TransformChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, m: Matrix) -> &mut Self {
        self.levels.push(m);
        self
    }

    /// Adds an element level: its transform, then its offset within the parent.
    pub fn push_element(&mut self, offset: Point, transform: Matrix) -> &mut Self {
        self.push(transform.concat(&Matrix::translation(offset.x, offset.y)))
    }

    /// Adds a scrolled parent.
    pub fn push_scroll(&mut self, scroll: Point) -> &mut Self {
        if scroll != Point::ZERO {
            self.push(Matrix::translation(-scroll.x, -scroll.y));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The combined local-to-window matrix.
    pub fn to_window(&self) -> Matrix {
        self.levels
            .iter()
            .fold(Matrix::IDENTITY, |acc, m| acc.concat(m))
    }

    pub fn local_to_global(&self, p: Point) -> Point {
        self.to_window().transform_point(p)
    }

    /// `None` when some level collapses space (zero scale).
    pub fn global_to_local(&self, p: Point) -> Option<Point> {
        self.to_window().invert().map(|m| m.transform_point(p))
    }

    pub fn rect_to_global(&self, r: &Rectangle) -> Rectangle {
        self.to_window().transform_rect(r)
    }
}

//! Diagram-space geometry: translations, anchors and the screen mapping.

use super::types::AnchorSpec;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn offset(self, dx: f64, dy: f64) -> Self {
		Self::new(self.x + dx, self.y + dy)
	}
}

impl std::ops::Sub for Point {
	type Output = Point;

	fn sub(self, other: Point) -> Point {
		Point::new(self.x - other.x, self.y - other.y)
	}
}

/// 2D affine matrix in SVG order: `[a c e; b d f; 0 0 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenMatrix {
	pub a: f64,
	pub b: f64,
	pub c: f64,
	pub d: f64,
	pub e: f64,
	pub f: f64,
}

impl Default for ScreenMatrix {
	fn default() -> Self {
		Self::IDENTITY
	}
}

/// From the single-precision `[a, b, c, d, e, f]` components browsers report.
impl From<[f32; 6]> for ScreenMatrix {
	fn from([a, b, c, d, e, f]: [f32; 6]) -> Self {
		Self {
			a: f64::from(a),
			b: f64::from(b),
			c: f64::from(c),
			d: f64::from(d),
			e: f64::from(e),
			f: f64::from(f),
		}
	}
}

impl ScreenMatrix {
	pub const IDENTITY: ScreenMatrix = ScreenMatrix {
		a: 1.0,
		b: 0.0,
		c: 0.0,
		d: 1.0,
		e: 0.0,
		f: 0.0,
	};

	pub fn apply(&self, p: Point) -> Point {
		Point::new(
			self.a * p.x + self.c * p.y + self.e,
			self.b * p.x + self.d * p.y + self.f,
		)
	}

	/// `None` when the matrix is singular.
	pub fn inverse(&self) -> Option<ScreenMatrix> {
		let det = self.a * self.d - self.b * self.c;
		if det == 0.0 || !det.is_finite() {
			return None;
		}
		Some(ScreenMatrix {
			a: self.d / det,
			b: -self.b / det,
			c: -self.c / det,
			d: self.a / det,
			e: (self.c * self.f - self.d * self.e) / det,
			f: (self.b * self.e - self.a * self.f) / det,
		})
	}

	/// Maps a client-space point through the inverse of this local-to-screen
	/// matrix. Falls back to the identity mapping for singular matrices.
	pub fn screen_to_local(&self, client: Point) -> Point {
		self.inverse()
			.map(|inv| inv.apply(client))
			.unwrap_or(client)
	}
}

/// Reads the translation out of a `translate(x,y)` transform.
///
/// Accepts comma or whitespace separators and a single-argument form
/// (`translate(x)` means `y = 0`). Anything unparseable is `(0, 0)`.
pub fn parse_translate(transform: &str) -> Point {
	let Some(start) = transform.find("translate(") else {
		return Point::ZERO;
	};
	let rest = &transform[start + "translate(".len()..];
	let Some(end) = rest.find(')') else {
		return Point::ZERO;
	};
	let mut parts = rest[..end]
		.split(|c: char| c == ',' || c.is_whitespace())
		.filter(|s| !s.is_empty())
		.map(str::parse::<f64>);

	match (parts.next(), parts.next(), parts.next()) {
		(Some(Ok(x)), Some(Ok(y)), None) if x.is_finite() && y.is_finite() => Point::new(x, y),
		(Some(Ok(x)), None, None) if x.is_finite() => Point::new(x, 0.0),
		_ => Point::ZERO,
	}
}

pub fn format_translate(p: Point) -> String {
	format!("translate({},{})", p.x, p.y)
}

/// Absolute position of anchor `index` for a node translated by
/// `translation`. Out-of-range indices use anchor 0; a node without
/// anchors resolves to its own origin.
pub fn resolve_anchor(translation: Point, anchors: &[AnchorSpec], index: usize) -> Point {
	match anchors.get(index).or_else(|| anchors.first()) {
		Some(anchor) => translation.offset(anchor.cx, anchor.cy),
		None => translation,
	}
}

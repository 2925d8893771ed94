//! Mouse and touch input folded into one pointer shape so the drag state
//! machine only ever sees a kind and a client-space position.

use web_sys::{MouseEvent, TouchEvent};

use super::geometry::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
	Mouse,
	Touch,
}

impl PointerKind {
	/// Document event that drives a drag of this kind.
	pub fn move_event(self) -> &'static str {
		match self {
			Self::Mouse => "mousemove",
			Self::Touch => "touchmove",
		}
	}

	/// Touch drags must be able to cancel page scrolling.
	pub fn blocks_scrolling(self) -> bool {
		matches!(self, Self::Touch)
	}
}

/// Document events that end any drag.
pub const END_EVENTS: [&str; 4] = ["mouseup", "mouseleave", "touchend", "touchcancel"];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerInput {
	pub kind: PointerKind,
	pub client: Point,
}

impl PointerInput {
	pub fn from_mouse(ev: &MouseEvent) -> Self {
		Self {
			kind: PointerKind::Mouse,
			client: Point::new(ev.client_x() as f64, ev.client_y() as f64),
		}
	}

	/// First active touch point; `None` once every finger has lifted.
	pub fn from_touch(ev: &TouchEvent) -> Option<Self> {
		let touch = ev.touches().get(0)?;
		Some(Self {
			kind: PointerKind::Touch,
			client: Point::new(touch.client_x() as f64, touch.client_y() as f64),
		})
	}
}

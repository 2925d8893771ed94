use std::f64::consts::TAU;

use super::geometry::Point;

/// Damped vertical oscillation settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VibrationParams {
	/// Peak displacement in diagram units.
	pub amplitude: f64,
	/// Oscillations per second.
	pub frequency: f64,
	pub duration_ms: f64,
}

impl Default for VibrationParams {
	fn default() -> Self {
		Self {
			amplitude: 5.0,
			frequency: 5.0,
			duration_ms: 600.0,
		}
	}
}

impl VibrationParams {
	/// Decaying amplitude bound at `t_ms`; zero at and after the duration.
	pub fn envelope(&self, t_ms: f64) -> f64 {
		self.amplitude * (1.0 - t_ms / self.duration_ms).max(0.0)
	}

	/// Vertical offset from the resting position at `t_ms`.
	pub fn displacement(&self, t_ms: f64) -> f64 {
		(t_ms / 1000.0 * self.frequency * TAU).sin() * self.envelope(t_ms)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AttentionPhase {
	Pending,
	Running {
		origin: Point,
		started_at: Option<f64>,
	},
	Done,
}

/// What a frame callback should do with the animated node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameStep {
	Move(Point),
	/// Final frame: snap back to the recorded origin.
	Finish(Point),
	Idle,
}

/// One-shot vibration of a single node.
#[derive(Clone, Debug)]
pub struct AttentionAnimator {
	pub node: usize,
	pub params: VibrationParams,
	phase: AttentionPhase,
}

impl AttentionAnimator {
	pub fn new(node: usize, params: VibrationParams) -> Self {
		Self {
			node,
			params,
			phase: AttentionPhase::Pending,
		}
	}

	pub fn phase(&self) -> AttentionPhase {
		self.phase
	}

	pub fn is_running(&self) -> bool {
		matches!(self.phase(), AttentionPhase::Running { .. })
	}

	/// Records `origin` and enters `Running`. Only valid from `Pending`.
	pub fn start(&mut self, origin: Point) -> bool {
		if self.phase != AttentionPhase::Pending {
			return false;
		}
		self.phase = AttentionPhase::Running {
			origin,
			started_at: None,
		};
		true
	}

	/// Stops without snapping back. Returns whether anything was stopped.
	pub fn cancel(&mut self) -> bool {
		let was_active = self.phase != AttentionPhase::Done;
		self.phase = AttentionPhase::Done;
		was_active
	}

	/// Advances to the frame at `timestamp_ms`; the first frame sets `t = 0`.
	pub fn step(&mut self, timestamp_ms: f64) -> FrameStep {
		let AttentionPhase::Running { origin, started_at } = &mut self.phase else {
			return FrameStep::Idle;
		};
		let origin = *origin;
		let start = *started_at.get_or_insert(timestamp_ms);
		let t = (timestamp_ms - start).max(0.0);

		if t < self.params.duration_ms {
			FrameStep::Move(origin.offset(0.0, self.params.displacement(t)))
		} else {
			self.phase = AttentionPhase::Done;
			FrameStep::Finish(origin)
		}
	}
}

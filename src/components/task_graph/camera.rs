/// Zoom bounds shared by wheel zoom and programmatic moves.
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	fn lerp(&self, to: &ViewTransform, t: f64) -> ViewTransform {
		ViewTransform {
			x: self.x + (to.x - self.x) * t,
			y: self.y + (to.y - self.y) * t,
			k: self.k + (to.k - self.k) * t,
		}
	}
}

pub fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

#[derive(Clone, Debug)]
struct Transition {
	from: ViewTransform,
	to: ViewTransform,
	elapsed: f64,
	duration: f64,
}

/// Pan/zoom state with fire-and-forget animated moves. Starting a move while
/// another is running replaces it, starting from wherever the view is now.
#[derive(Clone, Debug, Default)]
pub struct Camera {
	pub transform: ViewTransform,
	transition: Option<Transition>,
}

impl Camera {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			transition: None,
		}
	}

	pub fn is_animating(&self) -> bool {
		self.transition.is_some()
	}

	/// Where the view is headed, or where it is when idle.
	pub fn target(&self) -> ViewTransform {
		self.transition
			.as_ref()
			.map(|t| t.to)
			.unwrap_or(self.transform)
	}

	pub fn graph_to_screen(&self, x: f64, y: f64) -> (f64, f64) {
		let t = &self.transform;
		(x * t.k + t.x, y * t.k + t.y)
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		let t = &self.transform;
		((sx - t.x) / t.k, (sy - t.y) / t.k)
	}

	fn animate_to(&mut self, to: ViewTransform, duration_ms: f64) {
		if duration_ms <= 0.0 {
			self.transform = to;
			self.transition = None;
			return;
		}
		self.transition = Some(Transition {
			from: self.transform,
			to,
			elapsed: 0.0,
			duration: duration_ms / 1000.0,
		});
	}

	/// Puts graph point `(x, y)` at the viewport center, keeping the target zoom.
	pub fn center_at(&mut self, x: f64, y: f64, duration_ms: f64, width: f64, height: f64) {
		let k = self.target().k;
		self.animate_to(
			ViewTransform {
				x: width / 2.0 - x * k,
				y: height / 2.0 - y * k,
				k,
			},
			duration_ms,
		);
	}

	/// Zooms around whatever graph point the target view centers on.
	pub fn zoom(&mut self, k: f64, duration_ms: f64, width: f64, height: f64) {
		let target = self.target();
		let k = k.clamp(MIN_ZOOM, MAX_ZOOM);
		let (cx, cy) = (
			(width / 2.0 - target.x) / target.k,
			(height / 2.0 - target.y) / target.k,
		);
		self.animate_to(
			ViewTransform {
				x: width / 2.0 - cx * k,
				y: height / 2.0 - cy * k,
				k,
			},
			duration_ms,
		);
	}

	/// Frames the graph-space box `(min_x, min_y, max_x, max_y)` with `padding`
	/// screen pixels on every side.
	pub fn zoom_to_fit(
		&mut self,
		bounds: (f64, f64, f64, f64),
		padding: f64,
		duration_ms: f64,
		width: f64,
		height: f64,
	) {
		let (min_x, min_y, max_x, max_y) = bounds;
		let (w, h) = ((max_x - min_x).max(1.0), (max_y - min_y).max(1.0));
		let k = ((width - 2.0 * padding).max(1.0) / w)
			.min((height - 2.0 * padding).max(1.0) / h)
			.clamp(MIN_ZOOM, MAX_ZOOM);
		let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
		self.animate_to(
			ViewTransform {
				x: width / 2.0 - cx * k,
				y: height / 2.0 - cy * k,
				k,
			},
			duration_ms,
		);
	}

	/// Immediate zoom anchored at a screen point; cancels any running move.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		self.transition = None;
		let t = &mut self.transform;
		let new_k = (t.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / t.k;
		t.x = sx - (sx - t.x) * ratio;
		t.y = sy - (sy - t.y) * ratio;
		t.k = new_k;
	}

	/// Immediate pan; cancels any running move.
	pub fn pan_to(&mut self, x: f64, y: f64) {
		self.transition = None;
		self.transform.x = x;
		self.transform.y = y;
	}

	pub fn tick(&mut self, dt: f64) {
		let Some(transition) = self.transition.as_mut() else {
			return;
		};
		transition.elapsed += dt;
		let t = (transition.elapsed / transition.duration).min(1.0);
		self.transform = transition.from.lerp(&transition.to, ease_out_cubic(t));
		if t >= 1.0 {
			self.transition = None;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn screen_and_graph_coordinates_invert() {
		let mut camera = Camera::new(800.0, 600.0);
		camera.zoom_at(100.0, 50.0, 1.1);
		let (sx, sy) = camera.graph_to_screen(12.5, -40.0);
		let (gx, gy) = camera.screen_to_graph(sx, sy);
		assert!(close(gx, 12.5) && close(gy, -40.0));
	}

	#[test]
	fn center_then_zoom_lands_on_point() {
		let mut camera = Camera::new(800.0, 600.0);
		camera.center_at(100.0, 100.0, 800.0, 800.0, 600.0);
		camera.zoom(1.5, 800.0, 800.0, 600.0);
		for _ in 0..100 {
			camera.tick(0.016);
		}
		assert!(!camera.is_animating());
		let (sx, sy) = camera.graph_to_screen(100.0, 100.0);
		assert!(close(sx, 400.0) && close(sy, 300.0));
		assert!(close(camera.transform.k, 1.5));
	}

	#[test]
	fn newer_move_supersedes_running_one() {
		let mut camera = Camera::new(800.0, 600.0);
		camera.center_at(500.0, 0.0, 800.0, 800.0, 600.0);
		camera.tick(0.2);
		camera.center_at(-200.0, 0.0, 800.0, 800.0, 600.0);
		for _ in 0..100 {
			camera.tick(0.016);
		}
		let (sx, _) = camera.graph_to_screen(-200.0, 0.0);
		assert!(close(sx, 400.0));
	}

	#[test]
	fn zoom_to_fit_frames_bounds() {
		let mut camera = Camera::new(800.0, 600.0);
		camera.zoom_to_fit((-100.0, -50.0, 100.0, 50.0), 0.0, 0.0, 800.0, 600.0);
		assert!(close(camera.transform.k, 4.0));
		let (sx, sy) = camera.graph_to_screen(0.0, 0.0);
		assert!(close(sx, 400.0) && close(sy, 300.0));
	}
}

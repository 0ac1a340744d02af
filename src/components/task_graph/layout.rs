//! Force-directed layout over the task graph.
//!
//! The `force_graph` simulation is a projection of the store snapshot: it is
//! rebuilt whenever the snapshot changes shape and its coordinates are copied
//! back out, never treated as the source of truth.

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use super::camera::Camera;
use super::types::GraphData;

/// Below this the simulation is considered at rest and stops stepping.
pub const ALPHA_MIN: f64 = 0.001;
pub const ALPHA_DECAY: f64 = 0.0228;

const NODE_MASS: f32 = 10.0;
const SEED_RADIUS: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceParams {
	pub repulsion: f64,
	pub link_distance: f64,
	pub link_strength: f64,
	pub center_strength: f64,
}

impl ForceParams {
	pub const DEFAULT: ForceParams = ForceParams {
		repulsion: 150.0,
		link_distance: 80.0,
		link_strength: 0.3,
		center_strength: 0.05,
	};

	/// Spreads things out around a focused node.
	pub const FOCUS: ForceParams = ForceParams {
		repulsion: 300.0,
		link_distance: 130.0,
		link_strength: 0.3,
		center_strength: 0.02,
	};

	/// Loose links, strong repulsion and a gentle pull to the middle.
	pub const OVERVIEW: ForceParams = ForceParams {
		repulsion: 400.0,
		link_distance: 100.0,
		link_strength: 0.1,
		center_strength: 0.01,
	};

	fn simulation(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: self.repulsion as f32,
			force_spring: (self.link_strength * 0.1) as f32,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		}
	}
}

impl Default for ForceParams {
	fn default() -> Self {
		Self::DEFAULT
	}
}

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: String,
}

struct Seed {
	id: String,
	x: f64,
	y: f64,
	pinned: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
	pub captured: usize,
	pub restored: usize,
}

pub struct LayoutEngine {
	graph: ForceGraph<NodeInfo, ()>,
	index: HashMap<String, DefaultNodeIdx>,
	links: Vec<(String, String)>,
	edges: Vec<(DefaultNodeIdx, DefaultNodeIdx)>,
	params: ForceParams,
	alpha: f64,
	pub camera: Camera,
	pub width: f64,
	pub height: f64,
}

impl LayoutEngine {
	pub fn new(width: f64, height: f64) -> Self {
		let params = ForceParams::DEFAULT;
		Self {
			graph: ForceGraph::new(params.simulation()),
			index: HashMap::new(),
			links: Vec::new(),
			edges: Vec::new(),
			params,
			alpha: 1.0,
			camera: Camera::new(width, height),
			width,
			height,
		}
	}

	fn build(&mut self, seeds: Vec<Seed>, links: Vec<(String, String)>) {
		let mut graph = ForceGraph::new(self.params.simulation());
		let mut index = HashMap::new();
		for seed in seeds {
			let idx = graph.add_node(NodeData {
				x: seed.x as f32,
				y: seed.y as f32,
				mass: NODE_MASS,
				is_anchor: seed.pinned,
				user_data: NodeInfo {
					id: seed.id.clone(),
				},
			});
			index.insert(seed.id, idx);
		}

		let mut edges = Vec::new();
		for (source, target) in &links {
			if let (Some(&src), Some(&tgt)) = (index.get(source), index.get(target)) {
				graph.add_edge(src, tgt, EdgeData::default());
				edges.push((src, tgt));
			}
		}

		self.graph = graph;
		self.index = index;
		self.links = links;
		self.edges = edges;
	}

	/// Rebuilds the simulation from a snapshot. Pinned nodes stay put, placed
	/// nodes start where they were, the rest are seeded on a circle.
	pub fn install(&mut self, data: &GraphData) {
		let count = data.nodes.len().max(1) as f64;
		let seeds = data
			.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| {
				let (x, y, pinned) = match (node.pinned(), node.position()) {
					(Some((fx, fy)), _) => (fx, fy, true),
					(None, Some((x, y))) => (x, y, false),
					(None, None) => {
						let angle = (i as f64) * 2.0 * PI / count;
						(SEED_RADIUS * angle.cos(), SEED_RADIUS * angle.sin(), false)
					}
				};
				Seed {
					id: node.id.clone(),
					x,
					y,
					pinned,
				}
			})
			.collect();
		let links = data
			.links
			.iter()
			.map(|l| (l.source.clone(), l.target.clone()))
			.collect();
		self.build(seeds, links);
	}

	/// Live coordinates of every node not listed in `affected`.
	pub fn capture(&self, affected: &HashSet<String>) -> HashMap<String, (f64, f64)> {
		let mut captured = HashMap::new();
		self.graph.visit_nodes(|node| {
			let id = &node.data.user_data.id;
			if !affected.contains(id) {
				captured.insert(id.clone(), (node.x() as f64, node.y() as f64));
			}
		});
		captured
	}

	/// Puts captured coordinates back as both live and pinned positions.
	pub fn restore(&mut self, captured: &HashMap<String, (f64, f64)>) -> usize {
		let mut restored = 0;
		self.graph.visit_nodes_mut(|node| {
			if let Some(&(x, y)) = captured.get(&node.data.user_data.id) {
				node.data.x = x as f32;
				node.data.y = y as f32;
				node.data.is_anchor = true;
				restored += 1;
			}
		});
		restored
	}

	/// Capture, install, restore, reheat. In that order, every time.
	pub fn sync(&mut self, data: &GraphData, affected: &HashSet<String>) -> SyncReport {
		let captured = self.capture(affected);
		self.install(data);
		let restored = self.restore(&captured);
		self.reheat();
		debug!(
			"layout sync: {} captured, {} restored, {} nodes",
			captured.len(),
			restored,
			self.index.len()
		);
		SyncReport {
			captured: captured.len(),
			restored,
		}
	}

	pub fn forces(&self) -> ForceParams {
		self.params
	}

	/// Swaps force parameters, keeping every node where it is.
	pub fn set_forces(&mut self, params: ForceParams) {
		if self.params == params {
			return;
		}
		self.params = params;
		let mut seeds = Vec::with_capacity(self.index.len());
		self.graph.visit_nodes(|node| {
			seeds.push(Seed {
				id: node.data.user_data.id.clone(),
				x: node.x() as f64,
				y: node.y() as f64,
				pinned: node.data.is_anchor,
			});
		});
		let links = std::mem::take(&mut self.links);
		self.build(seeds, links);
	}

	pub fn set_repulsion(&mut self, repulsion: f64) {
		self.set_forces(ForceParams {
			repulsion,
			..self.params
		});
	}

	pub fn set_link_distance(&mut self, link_distance: f64) {
		self.set_forces(ForceParams {
			link_distance,
			..self.params
		});
	}

	pub fn set_link_strength(&mut self, link_strength: f64) {
		self.set_forces(ForceParams {
			link_strength,
			..self.params
		});
	}

	pub fn set_center_strength(&mut self, center_strength: f64) {
		self.set_forces(ForceParams {
			center_strength,
			..self.params
		});
	}

	pub fn reheat(&mut self) {
		self.alpha = 1.0;
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn is_settled(&self) -> bool {
		self.alpha < ALPHA_MIN
	}

	pub fn contains(&self, id: &str) -> bool {
		self.index.contains_key(id)
	}

	pub fn len(&self) -> usize {
		self.index.len()
	}

	pub fn is_empty(&self) -> bool {
		self.index.is_empty()
	}

	pub fn position(&self, id: &str) -> Option<(f64, f64)> {
		let idx = *self.index.get(id)?;
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some((node.x() as f64, node.y() as f64));
			}
		});
		found
	}

	pub fn positions(&self) -> Vec<(String, f64, f64)> {
		let mut out = Vec::with_capacity(self.index.len());
		self.graph.visit_nodes(|node| {
			out.push((
				node.data.user_data.id.clone(),
				node.x() as f64,
				node.y() as f64,
			));
		});
		out
	}

	pub fn is_pinned(&self, id: &str) -> bool {
		let Some(&idx) = self.index.get(id) else {
			return false;
		};
		let mut pinned = false;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				pinned = node.data.is_anchor;
			}
		});
		pinned
	}

	pub fn pin(&mut self, id: &str, x: f64, y: f64) {
		let Some(&idx) = self.index.get(id) else {
			return;
		};
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = x as f32;
				node.data.y = y as f32;
				node.data.is_anchor = true;
			}
		});
	}

	pub fn unpin(&mut self, id: &str) {
		let Some(&idx) = self.index.get(id) else {
			return;
		};
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.is_anchor = false;
			}
		});
	}

	pub fn unpin_all(&mut self) {
		self.graph.visit_nodes_mut(|node| node.data.is_anchor = false);
	}

	/// Ids linked to `id` in either direction.
	pub fn neighbors(&self, id: &str) -> Vec<String> {
		self.links
			.iter()
			.filter_map(|(source, target)| {
				if source == id {
					Some(target.clone())
				} else if target == id {
					Some(source.clone())
				} else {
					None
				}
			})
			.collect()
	}

	pub fn graph_to_screen(&self, x: f64, y: f64) -> (f64, f64) {
		self.camera.graph_to_screen(x, y)
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		self.camera.screen_to_graph(sx, sy)
	}

	/// Topmost node whose badge, as sized by `extent`, covers the screen point.
	pub fn node_at_screen<F>(&self, sx: f64, sy: f64, extent: F) -> Option<String>
	where
		F: Fn(&str) -> Option<(f64, f64)>,
	{
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let id = &node.data.user_data.id;
			let Some((w, h)) = extent(id) else {
				return;
			};
			let (dx, dy) = ((node.x() as f64 - gx).abs(), (node.y() as f64 - gy).abs());
			if dx <= w / 2.0 && dy <= h / 2.0 {
				found = Some(id.clone());
			}
		});
		found
	}

	/// `(min_x, min_y, max_x, max_y)` over all node centers.
	pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
		let mut bounds: Option<(f64, f64, f64, f64)> = None;
		self.graph.visit_nodes(|node| {
			let (x, y) = (node.x() as f64, node.y() as f64);
			bounds = Some(match bounds {
				None => (x, y, x, y),
				Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
			});
		});
		bounds
	}

	pub fn visit_links<F: FnMut((f64, f64), (f64, f64))>(&self, mut cb: F) {
		self.graph.visit_edges(|n1, n2, _| {
			cb(
				(n1.x() as f64, n1.y() as f64),
				(n2.x() as f64, n2.y() as f64),
			);
		});
	}

	/// Link-length relaxation and centering, scaled by the current heat.
	/// `force_graph` has springs without rest length and no centering force.
	fn apply_positional_forces(&mut self) {
		let mut live: HashMap<DefaultNodeIdx, (f64, f64, bool)> = HashMap::new();
		self.graph.visit_nodes(|node| {
			live.insert(
				node.index(),
				(node.x() as f64, node.y() as f64, node.data.is_anchor),
			);
		});
		if live.is_empty() {
			return;
		}

		let mut shift: HashMap<DefaultNodeIdx, (f64, f64)> = HashMap::new();
		let strength = self.params.link_strength * self.alpha;
		for &(a, b) in &self.edges {
			let (Some(&(ax, ay, a_pinned)), Some(&(bx, by, b_pinned))) = (live.get(&a), live.get(&b))
			else {
				continue;
			};
			let (dx, dy) = (bx - ax, by - ay);
			let dist = (dx * dx + dy * dy).sqrt().max(1e-3);
			let k = (dist - self.params.link_distance) / dist * strength * 0.5;
			let (mx, my) = (dx * k, dy * k);
			if !a_pinned {
				let e = shift.entry(a).or_default();
				e.0 += mx;
				e.1 += my;
			}
			if !b_pinned {
				let e = shift.entry(b).or_default();
				e.0 -= mx;
				e.1 -= my;
			}
		}

		let n = live.len() as f64;
		let (cx, cy) = live
			.values()
			.fold((0.0, 0.0), |(sx, sy), &(x, y, _)| (sx + x / n, sy + y / n));
		let pull = self.params.center_strength * self.alpha;
		for (&idx, &(_, _, pinned)) in &live {
			if !pinned {
				let e = shift.entry(idx).or_default();
				e.0 -= cx * pull;
				e.1 -= cy * pull;
			}
		}

		self.graph.visit_nodes_mut(|node| {
			if let Some(&(sx, sy)) = shift.get(&node.index()) {
				node.data.x += sx as f32;
				node.data.y += sy as f32;
			}
		});
	}

	pub fn tick(&mut self, dt: f32) {
		self.camera.tick(dt as f64);
		if self.is_settled() {
			return;
		}
		self.graph.update(dt * self.alpha as f32);
		self.apply_positional_forces();
		self.alpha += (0.0 - self.alpha) * ALPHA_DECAY;
	}

	/// Keeps whatever was at the viewport center there.
	pub fn resize(&mut self, width: f64, height: f64) {
		let (dx, dy) = ((width - self.width) / 2.0, (height - self.height) / 2.0);
		let t = self.camera.transform;
		self.camera.pan_to(t.x + dx, t.y + dy);
		self.width = width;
		self.height = height;
	}
}

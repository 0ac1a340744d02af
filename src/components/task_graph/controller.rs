//! Pointer and overlay events in, store commands and layout calls out.
//!
//! Mutations never touch the layout projection directly. They queue a sync
//! which the next animation frame runs before stepping the simulation, so the
//! snapshot it installs is always the committed one.

use std::collections::HashSet;

use log::{debug, info};

use super::badge;
use super::layout::{ForceParams, LayoutEngine};
use super::selection::{EditField, InputField, InteractionState, MenuAction, Selection};
use super::store::{Command, CommandOutcome, GraphStore};
use super::types::GraphData;

pub const FOCUS_TRANSITION_MS: f64 = 800.0;
pub const FOCUS_ZOOM: f64 = 1.5;
/// Screen padding kept around the graph when zooming out to fit.
pub const FIT_PADDING: f64 = 60.0;
/// Pointer travel, in pixels, before a press turns into a drag or pan.
pub const DRAG_THRESHOLD: f64 = 3.0;

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<String>,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

pub struct InteractionController {
	store: GraphStore,
	layout: LayoutEngine,
	selection: Selection,
	drag: DragState,
	pan: PanState,
	pending: Option<HashSet<String>>,
	show_descriptions: bool,
}

impl InteractionController {
	pub fn new(data: GraphData, width: f64, height: f64) -> Self {
		let store = GraphStore::new(data);
		let mut layout = LayoutEngine::new(width, height);
		layout.install(store.graph());
		Self {
			store,
			layout,
			selection: Selection::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			pending: None,
			show_descriptions: false,
		}
	}

	pub fn graph(&self) -> &GraphData {
		self.store.graph()
	}

	pub fn layout(&self) -> &LayoutEngine {
		&self.layout
	}

	pub fn selection(&self) -> &Selection {
		&self.selection
	}

	pub fn state(&self) -> InteractionState {
		self.selection.state()
	}

	pub fn show_descriptions(&self) -> bool {
		self.show_descriptions
	}

	pub fn set_show_descriptions(&mut self, show: bool) {
		self.show_descriptions = show;
	}

	pub fn has_pending_sync(&self) -> bool {
		self.pending.is_some()
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.moved
	}

	/// Current graph with live coordinates folded in, for sending elsewhere.
	pub fn snapshot(&mut self) -> GraphData {
		self.absorb_positions();
		self.store.graph().clone()
	}

	fn absorb_positions(&mut self) {
		self.store.absorb_positions(self.layout.positions());
	}

	fn schedule_sync(&mut self, affected: HashSet<String>) {
		self.pending.get_or_insert_with(HashSet::new).extend(affected);
	}

	fn flush_sync(&mut self) {
		if let Some(affected) = self.pending.take() {
			self.layout.sync(self.store.graph(), &affected);
		}
	}

	pub fn node_at(&self, sx: f64, sy: f64) -> Option<String> {
		let graph = self.store.graph();
		self.layout
			.node_at_screen(sx, sy, |id| graph.node(id).map(badge::estimated_size))
	}

	/// Full replacement from the conversation service.
	pub fn replace_graph(&mut self, data: GraphData) -> HashSet<String> {
		self.absorb_positions();
		let removed = self.store.replace_graph(data);
		if self.selection.forget(&removed) {
			debug!("selected node dropped by graph replacement");
		}
		self.schedule_sync(HashSet::new());
		info!("graph replaced, {} nodes", self.store.graph().nodes.len());
		removed
	}

	pub fn node_click(&mut self, id: &str) {
		let Some((x, y)) = self.layout.position(id) else {
			return;
		};
		if !matches!(
			self.state(),
			InteractionState::Idle | InteractionState::NodeSelected | InteractionState::ActionMenuOpen
		) || !self.selection.select(id)
		{
			return;
		}
		let (w, h) = (self.layout.width, self.layout.height);
		self.layout
			.camera
			.center_at(x, y, FOCUS_TRANSITION_MS, w, h);
		self.layout.camera.zoom(FOCUS_ZOOM, FOCUS_TRANSITION_MS, w, h);
		self.layout.set_forces(ForceParams::FOCUS);
		self.layout.reheat();
	}

	/// Right-click. Returns true when a menu opened on a node.
	pub fn context_menu(&mut self, sx: f64, sy: f64) -> bool {
		let Some(id) = self.node_at(sx, sy) else {
			return false;
		};
		self.open_menu_for(&id)
	}

	pub fn open_menu_for(&mut self, id: &str) -> bool {
		let Some((x, y)) = self.layout.position(id) else {
			return false;
		};
		let at = self.layout.graph_to_screen(x, y);
		self.selection.open_menu(id, at);
		true
	}

	pub fn menu_action(&mut self, action: MenuAction) -> bool {
		let Some(node) = self.selection.menu_node().map(str::to_string) else {
			return false;
		};
		match action {
			MenuAction::AddSubtask => self.selection.begin_add(),
			MenuAction::Delete => {
				let descendants = self.store.descendants(&node);
				self.selection.begin_delete(descendants)
			}
			MenuAction::EditName => {
				let current = self
					.store
					.graph()
					.node(&node)
					.map(|n| n.name.clone())
					.unwrap_or_default();
				self.selection.begin_edit(EditField::Name, &current)
			}
			MenuAction::ChangeStatus => {
				self.selection.close_menu();
				self.change_status(&node)
			}
		}
	}

	/// Cycles status with the node and its neighbors frozen in place.
	fn change_status(&mut self, id: &str) -> bool {
		let mut frozen = self.layout.neighbors(id);
		frozen.push(id.to_string());
		for node in &frozen {
			if let Some((x, y)) = self.layout.position(node) {
				self.layout.pin(node, x, y);
			}
		}
		self.absorb_positions();
		let outcome = self.store.apply(Command::CycleStatus { id: id.to_string() });
		if outcome.is_noop() {
			return false;
		}
		self.schedule_sync(HashSet::new());
		self.layout.reheat();
		true
	}

	pub fn begin_description_edit(&mut self) -> bool {
		let Some(id) = self.selection.selected() else {
			return false;
		};
		let current = self
			.store
			.graph()
			.node(id)
			.map(|n| n.description.clone())
			.unwrap_or_default();
		self.selection.begin_edit(EditField::Description, &current)
	}

	pub fn input(&mut self, field: InputField, value: &str) {
		self.selection.set_input(field, value);
	}

	pub fn can_confirm(&self) -> bool {
		self.selection.can_confirm()
	}

	/// Commits the open editor. The target keeps its pre-edit coordinates and
	/// the layout catches up on the next frame.
	pub fn confirm(&mut self) -> Option<CommandOutcome> {
		let command = self.selection.take_confirmed()?;
		self.absorb_positions();
		let target = command.target().to_string();
		let before = self.layout.position(&target);

		let outcome = self.store.apply(command);
		if self.selection.forget(&outcome.removed) {
			debug!("selection cleared by delete");
		}
		if outcome.is_noop() {
			return Some(outcome);
		}
		if let Some((x, y)) = before.filter(|_| !outcome.removed.contains(&target)) {
			self.layout.pin(&target, x, y);
		}
		self.schedule_sync(outcome.created.iter().cloned().collect());
		Some(outcome)
	}

	pub fn cancel(&mut self) {
		self.selection.cancel();
	}

	/// Empty-canvas click: drop the selection and let everything float in a
	/// wide layout. Ignored while an editor is open.
	pub fn background_click(&mut self) -> bool {
		if !self.selection.background_click_allowed() {
			return false;
		}
		self.flush_sync();
		self.selection.clear();
		self.layout.unpin_all();
		self.store.unpin_all();
		self.layout.set_forces(ForceParams::OVERVIEW);
		if let Some(bounds) = self.layout.bounds() {
			let (w, h) = (self.layout.width, self.layout.height);
			self.layout
				.camera
				.zoom_to_fit(bounds, FIT_PADDING, FOCUS_TRANSITION_MS, w, h);
		}
		self.layout.reheat();
		true
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		if let Some(id) = self.node_at(sx, sy) {
			let (nx, ny) = self.layout.position(&id).unwrap_or_default();
			self.drag = DragState {
				node: Some(id),
				moved: false,
				start_x: sx,
				start_y: sy,
				node_start_x: nx,
				node_start_y: ny,
			};
		} else {
			let transform = self.layout.camera.transform;
			self.pan = PanState {
				active: true,
				moved: false,
				start_x: sx,
				start_y: sy,
				transform_start_x: transform.x,
				transform_start_y: transform.y,
			};
		}
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if let Some(id) = self.drag.node.clone() {
			let (dx, dy) = (sx - self.drag.start_x, sy - self.drag.start_y);
			if !self.drag.moved {
				if dx.hypot(dy) < DRAG_THRESHOLD || !self.selection.drag_allowed() {
					return;
				}
				self.drag.moved = true;
				self.layout.reheat();
			}
			let k = self.layout.camera.transform.k;
			self.layout.pin(
				&id,
				self.drag.node_start_x + dx / k,
				self.drag.node_start_y + dy / k,
			);
		} else if self.pan.active {
			let (dx, dy) = (sx - self.pan.start_x, sy - self.pan.start_y);
			if !self.pan.moved && dx.hypot(dy) < DRAG_THRESHOLD {
				return;
			}
			self.pan.moved = true;
			self.layout.camera.pan_to(
				self.pan.transform_start_x + dx,
				self.pan.transform_start_y + dy,
			);
		}
	}

	/// Release ends a drag or pan; a press that never moved is a click.
	pub fn pointer_up(&mut self) {
		let drag = std::mem::take(&mut self.drag);
		let pan = std::mem::take(&mut self.pan);
		match (drag.node, drag.moved) {
			(Some(id), true) => self.end_drag(&id),
			(Some(id), false) => self.node_click(&id),
			(None, _) if pan.active && !pan.moved => {
				self.background_click();
			}
			(None, _) => {}
		}
	}

	/// Pointer left the canvas: finish a drag where it is, forget the rest.
	pub fn pointer_leave(&mut self) {
		let drag = std::mem::take(&mut self.drag);
		self.pan = PanState::default();
		if let (Some(id), true) = (drag.node, drag.moved) {
			self.end_drag(&id);
		}
	}

	fn end_drag(&mut self, id: &str) {
		let Some((x, y)) = self.layout.position(id) else {
			return;
		};
		let outcome = self.store.apply(Command::Reposition {
			id: id.to_string(),
			x,
			y,
		});
		if !outcome.is_noop() {
			self.schedule_sync(HashSet::from([id.to_string()]));
		}
		self.layout.reheat();
	}

	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		self.layout.camera.zoom_at(sx, sy, factor);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.layout.resize(width, height);
	}

	/// One animation frame: run any queued sync, then step the simulation.
	pub fn tick(&mut self, dt: f32) {
		self.flush_sync();
		self.layout.tick(dt);
	}
}

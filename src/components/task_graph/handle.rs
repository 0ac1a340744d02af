use leptos::prelude::*;
use web_sys::CanvasRenderingContext2d;

use super::controller::InteractionController;
use super::render;
use super::selection::{EditField, Overlay};
use super::types::{GraphData, TaskStatus};

/// Size the controller assumes until the canvas reports its real one.
const INITIAL_SIZE: (f64, f64) = (800.0, 600.0);

#[derive(Clone, Debug, PartialEq)]
pub struct NodeSummary {
	pub id: String,
	pub name: String,
	pub description: String,
	pub status: TaskStatus,
}

/// What the overlay layer needs to draw. Edit buffers are not part of it;
/// the inputs own their text between keystrokes.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum OverlayView {
	#[default]
	None,
	Menu {
		x: f64,
		y: f64,
	},
	EditName {
		initial: String,
	},
	EditDescription {
		initial: String,
	},
	AddSubtask {
		parent_name: String,
	},
	ConfirmDelete {
		name: String,
		descendants: Vec<String>,
	},
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UiState {
	pub overlay: OverlayView,
	pub selected: Option<NodeSummary>,
	pub can_confirm: bool,
}

impl UiState {
	pub fn from_controller(controller: &InteractionController) -> Self {
		let graph = controller.graph();
		let name_of = |id: &str| {
			graph
				.node(id)
				.map(|n| n.name.clone())
				.unwrap_or_else(|| id.to_string())
		};
		let overlay = match controller.selection().overlay() {
			Overlay::None => OverlayView::None,
			Overlay::ActionMenu { at, .. } => OverlayView::Menu { x: at.0, y: at.1 },
			Overlay::Editing { node, field, .. } => {
				let current = graph.node(node);
				match field {
					EditField::Name => OverlayView::EditName {
						initial: current.map(|n| n.name.clone()).unwrap_or_default(),
					},
					EditField::Description => OverlayView::EditDescription {
						initial: current.map(|n| n.description.clone()).unwrap_or_default(),
					},
				}
			}
			Overlay::AddingSubtask { parent, .. } => OverlayView::AddSubtask {
				parent_name: name_of(parent),
			},
			Overlay::ConfirmingDelete { node, descendants } => OverlayView::ConfirmDelete {
				name: name_of(node),
				descendants: descendants.iter().map(|d| name_of(d)).collect(),
			},
		};
		let selected = controller
			.selection()
			.selected()
			.and_then(|id| graph.node(id))
			.map(|n| NodeSummary {
				id: n.id.clone(),
				name: n.name.clone(),
				description: n.description.clone(),
				status: n.effective_status(),
			});
		Self {
			overlay,
			selected,
			can_confirm: controller.can_confirm(),
		}
	}
}

/// Shared access to the controller for event handlers, the frame loop and
/// the chat panel. Every mutation refreshes the reactive [`UiState`].
#[derive(Clone, Copy)]
pub struct GraphHandle {
	controller: StoredValue<InteractionController, LocalStorage>,
	ui: RwSignal<UiState>,
}

impl GraphHandle {
	pub fn new(data: GraphData) -> Self {
		let controller = InteractionController::new(data, INITIAL_SIZE.0, INITIAL_SIZE.1);
		let ui = RwSignal::new(UiState::from_controller(&controller));
		Self {
			controller: StoredValue::new_local(controller),
			ui,
		}
	}

	pub fn ui(&self) -> ReadSignal<UiState> {
		self.ui.read_only()
	}

	pub fn with<R>(&self, f: impl FnOnce(&InteractionController) -> R) -> Option<R> {
		self.controller.try_with_value(f)
	}

	pub fn update<R>(&self, f: impl FnOnce(&mut InteractionController) -> R) -> Option<R> {
		let (out, next) = self.controller.try_update_value(|controller| {
			let out = f(controller);
			(out, UiState::from_controller(controller))
		})?;
		if self.ui.with_untracked(|current| current != &next) {
			self.ui.set(next);
		}
		Some(out)
	}

	pub fn snapshot(&self) -> GraphData {
		self.update(|c| c.snapshot()).unwrap_or_default()
	}

	/// One animation frame: step the simulation and draw. `None` once the
	/// controller has been disposed.
	pub fn frame(&self, dt: f32, ctx: &CanvasRenderingContext2d) -> Option<()> {
		self.controller.try_update_value(|controller| {
			controller.tick(dt);
			render::render(controller, ctx);
		})
	}
}

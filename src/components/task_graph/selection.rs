//! Which node is selected and which single overlay, if any, is open on top of
//! the graph. Every overlay lives in one enum, so opening one closes the rest.

use std::collections::HashSet;

use super::store::Command;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditField {
	Name,
	Description,
}

/// Text inputs an overlay can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputField {
	Name,
	Description,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
	AddSubtask,
	Delete,
	EditName,
	ChangeStatus,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Overlay {
	#[default]
	None,
	ActionMenu {
		node: String,
		at: (f64, f64),
	},
	Editing {
		node: String,
		field: EditField,
		buffer: String,
	},
	AddingSubtask {
		parent: String,
		name: String,
		description: String,
	},
	ConfirmingDelete {
		node: String,
		descendants: Vec<String>,
	},
}

impl Overlay {
	fn node(&self) -> Option<&str> {
		match self {
			Overlay::None => None,
			Overlay::ActionMenu { node, .. }
			| Overlay::Editing { node, .. }
			| Overlay::ConfirmingDelete { node, .. } => Some(node),
			Overlay::AddingSubtask { parent, .. } => Some(parent),
		}
	}

	fn is_modal(&self) -> bool {
		matches!(
			self,
			Overlay::Editing { .. } | Overlay::AddingSubtask { .. } | Overlay::ConfirmingDelete { .. }
		)
	}
}

/// Flattened view of the machine, one variant per interaction state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionState {
	Idle,
	NodeSelected,
	ActionMenuOpen,
	Editing(EditField),
	AddingSubtask,
	ConfirmingDelete,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
	selected: Option<String>,
	overlay: Overlay,
}

impl Selection {
	pub fn state(&self) -> InteractionState {
		match (&self.overlay, &self.selected) {
			(Overlay::None, None) => InteractionState::Idle,
			(Overlay::None, Some(_)) => InteractionState::NodeSelected,
			(Overlay::ActionMenu { .. }, _) => InteractionState::ActionMenuOpen,
			(Overlay::Editing { field, .. }, _) => InteractionState::Editing(*field),
			(Overlay::AddingSubtask { .. }, _) => InteractionState::AddingSubtask,
			(Overlay::ConfirmingDelete { .. }, _) => InteractionState::ConfirmingDelete,
		}
	}

	pub fn selected(&self) -> Option<&str> {
		self.selected.as_deref()
	}

	pub fn overlay(&self) -> &Overlay {
		&self.overlay
	}

	pub fn menu_node(&self) -> Option<&str> {
		match &self.overlay {
			Overlay::ActionMenu { node, .. } => Some(node),
			_ => None,
		}
	}

	/// Left-click selection. Refused while a modal editor is open.
	pub fn select(&mut self, id: &str) -> bool {
		if self.overlay.is_modal() {
			return false;
		}
		self.selected = Some(id.to_string());
		self.overlay = Overlay::None;
		true
	}

	/// Right-click opens the radial menu from any state, discarding open edits.
	pub fn open_menu(&mut self, id: &str, at: (f64, f64)) {
		self.selected = Some(id.to_string());
		self.overlay = Overlay::ActionMenu {
			node: id.to_string(),
			at,
		};
	}

	pub fn close_menu(&mut self) -> Option<String> {
		match std::mem::take(&mut self.overlay) {
			Overlay::ActionMenu { node, .. } => Some(node),
			other => {
				self.overlay = other;
				None
			}
		}
	}

	pub fn begin_add(&mut self) -> bool {
		let Some(parent) = self.close_menu() else {
			return false;
		};
		self.overlay = Overlay::AddingSubtask {
			parent,
			name: String::new(),
			description: String::new(),
		};
		true
	}

	pub fn begin_delete(&mut self, descendants: Vec<String>) -> bool {
		let Some(node) = self.close_menu() else {
			return false;
		};
		self.overlay = Overlay::ConfirmingDelete { node, descendants };
		true
	}

	/// Name edits start from the menu; description edits from a selected node.
	pub fn begin_edit(&mut self, field: EditField, current: &str) -> bool {
		let node = match (field, self.state()) {
			(EditField::Name, InteractionState::ActionMenuOpen) => self.close_menu(),
			(EditField::Description, InteractionState::NodeSelected) => self.selected.clone(),
			(EditField::Description, InteractionState::ActionMenuOpen) => self.close_menu(),
			_ => None,
		};
		let Some(node) = node else {
			return false;
		};
		self.overlay = Overlay::Editing {
			node,
			field,
			buffer: current.to_string(),
		};
		true
	}

	pub fn set_input(&mut self, input: InputField, value: &str) {
		match (&mut self.overlay, input) {
			(Overlay::Editing { buffer, .. }, _) => *buffer = value.to_string(),
			(Overlay::AddingSubtask { name, .. }, InputField::Name) => *name = value.to_string(),
			(Overlay::AddingSubtask { description, .. }, InputField::Description) => {
				*description = value.to_string()
			}
			_ => {}
		}
	}

	pub fn can_confirm(&self) -> bool {
		match &self.overlay {
			Overlay::Editing {
				field: EditField::Name,
				buffer,
				..
			} => !buffer.trim().is_empty(),
			Overlay::Editing { .. } | Overlay::ConfirmingDelete { .. } => true,
			Overlay::AddingSubtask { name, .. } => !name.trim().is_empty(),
			Overlay::None | Overlay::ActionMenu { .. } => false,
		}
	}

	/// Closes the open editor and hands back the edit it describes. Leaves
	/// everything as is when there is nothing confirmable.
	pub fn take_confirmed(&mut self) -> Option<Command> {
		if !self.can_confirm() {
			return None;
		}
		let command = match std::mem::take(&mut self.overlay) {
			Overlay::Editing {
				node,
				field: EditField::Name,
				buffer,
			} => Command::Rename {
				id: node,
				name: buffer.trim().to_string(),
			},
			Overlay::Editing {
				node,
				field: EditField::Description,
				buffer,
			} => Command::SetDescription {
				id: node,
				description: buffer,
			},
			Overlay::AddingSubtask {
				parent,
				name,
				description,
			} => Command::AddSubtask {
				parent,
				name: name.trim().to_string(),
				description,
			},
			Overlay::ConfirmingDelete { node, .. } => Command::DeleteSubtree { root: node },
			Overlay::None | Overlay::ActionMenu { .. } => return None,
		};
		Some(command)
	}

	/// Drops the open editor; the selection stays as it was.
	pub fn cancel(&mut self) {
		self.overlay = Overlay::None;
	}

	pub fn background_click_allowed(&self) -> bool {
		!self.overlay.is_modal()
	}

	pub fn drag_allowed(&self) -> bool {
		!matches!(self.overlay, Overlay::Editing { .. })
	}

	pub fn clear(&mut self) {
		self.selected = None;
		self.overlay = Overlay::None;
	}

	/// Forgets removed nodes. Returns true when the selection was cleared.
	pub fn forget(&mut self, removed: &HashSet<String>) -> bool {
		if self.overlay.node().is_some_and(|id| removed.contains(id)) {
			self.overlay = Overlay::None;
		}
		if self.selected.as_ref().is_some_and(|id| removed.contains(id)) {
			self.selected = None;
			return true;
		}
		false
	}
}

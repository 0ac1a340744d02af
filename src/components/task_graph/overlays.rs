use leptos::ev::KeyboardEvent;
use leptos::prelude::*;

use super::action_menu::ActionMenu;
use super::handle::{GraphHandle, NodeSummary, OverlayView};
use super::selection::InputField;

/// Menu, editors and the selected-node panel drawn over the canvas.
#[component]
pub fn GraphOverlays(handle: GraphHandle) -> impl IntoView {
	let ui = handle.ui();
	let overlay = Memo::new(move |_| ui.with(|u| u.overlay.clone()));
	let selected = Memo::new(move |_| ui.with(|u| u.selected.clone()));
	let can_confirm = Memo::new(move |_| ui.with(|u| u.can_confirm));

	let on_action = Callback::new(move |action| {
		handle.update(|c| c.menu_action(action));
	});

	view! {
		{move || match overlay.get() {
			OverlayView::None => {
				selected
					.get()
					.map(|node| view! { <NodePanel node=node handle=handle /> })
					.into_any()
			}
			OverlayView::Menu { x, y } => view! { <ActionMenu x=x y=y on_action=on_action /> }.into_any(),
			OverlayView::EditName { initial } => {
				view! {
					<EditorDialog title="Rename task" confirm_label="Save" handle=handle can_confirm=can_confirm>
						<TextInput handle=handle field=InputField::Name initial=initial placeholder="Task name" />
					</EditorDialog>
				}
					.into_any()
			}
			OverlayView::EditDescription { initial } => {
				view! {
					<EditorDialog title="Edit description" confirm_label="Save" handle=handle can_confirm=can_confirm>
						<TextInput handle=handle field=InputField::Description initial=initial placeholder="Description" />
					</EditorDialog>
				}
					.into_any()
			}
			OverlayView::AddSubtask { parent_name } => {
				view! {
					<EditorDialog title="Add subtask" confirm_label="Add" handle=handle can_confirm=can_confirm>
						<p class="graph-dialog-note">{format!("Under \"{parent_name}\"")}</p>
						<TextInput handle=handle field=InputField::Name initial=String::new() placeholder="Task name" />
						<TextInput handle=handle field=InputField::Description initial=String::new() placeholder="Description (optional)" />
					</EditorDialog>
				}
					.into_any()
			}
			OverlayView::ConfirmDelete { name, descendants } => {
				let note = match descendants.len() {
					0 => format!("Delete \"{name}\"?"),
					1 => format!("Delete \"{name}\" and its subtask?"),
					n => format!("Delete \"{name}\" and its {n} subtasks?"),
				};
				view! {
					<EditorDialog title="Delete task" confirm_label="Delete" handle=handle can_confirm=can_confirm>
						<p class="graph-dialog-note">{note}</p>
						<ul class="graph-dialog-list">
							{descendants.into_iter().map(|d| view! { <li>{d}</li> }).collect_view()}
						</ul>
					</EditorDialog>
				}
					.into_any()
			}
		}}
	}
}

#[component]
fn NodePanel(node: NodeSummary, handle: GraphHandle) -> impl IntoView {
	let description = if node.description.is_empty() {
		"No description yet.".to_string()
	} else {
		node.description.clone()
	};
	view! {
		<div class="node-panel">
			<h2>{node.name.clone()}</h2>
			<span class="node-status" style=format!("background: {};", node.status.color())>
				{node.status.label()}
			</span>
			<p>{description}</p>
			<button on:click=move |_| {
				handle.update(|c| c.begin_description_edit());
			}>"Edit description"</button>
		</div>
	}
}

#[component]
fn EditorDialog(
	title: &'static str,
	confirm_label: &'static str,
	handle: GraphHandle,
	can_confirm: Memo<bool>,
	children: Children,
) -> impl IntoView {
	view! {
		<div class="graph-dialog-backdrop">
			<div class="graph-dialog" role="dialog">
				<h2>{title}</h2>
				{children()}
				<div class="graph-dialog-actions">
					<button on:click=move |_| {
						handle.update(|c| c.cancel());
					}>"Cancel"</button>
					<button
						class="primary"
						prop:disabled=move || !can_confirm.get()
						on:click=move |_| {
							handle.update(|c| c.confirm());
						}
					>
						{confirm_label}
					</button>
				</div>
			</div>
		</div>
	}
}

/// Enter confirms and Escape cancels, same as the dialog buttons.
#[component]
fn TextInput(
	handle: GraphHandle,
	field: InputField,
	initial: String,
	placeholder: &'static str,
) -> impl IntoView {
	view! {
		<input
			type="text"
			class="graph-dialog-input"
			placeholder=placeholder
			prop:value=initial
			on:input=move |ev| {
				let value = event_target_value(&ev);
				handle.update(|c| c.input(field, &value));
			}
			on:keydown=move |ev: KeyboardEvent| match ev.key().as_str() {
				"Enter" => {
					handle.update(|c| c.confirm());
				}
				"Escape" => {
					handle.update(|c| c.cancel());
				}
				_ => {}
			}
		/>
	}
}

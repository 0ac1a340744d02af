use leptos::prelude::*;

use super::selection::MenuAction;

const RADIUS: f64 = 65.0;
const RING_PADDING: f64 = 15.0;

/// Four buttons around a screen point: add right, rename top, delete left,
/// status bottom.
#[component]
pub fn ActionMenu(x: f64, y: f64, on_action: Callback<MenuAction>) -> impl IntoView {
	let items = [
		(MenuAction::AddSubtask, "+", "Add Task", x + RADIUS, y),
		(MenuAction::EditName, "✎", "Edit Task", x, y - RADIUS),
		(MenuAction::Delete, "🗑", "Delete Task", x - RADIUS, y),
		(MenuAction::ChangeStatus, "↻", "Change Status", x, y + RADIUS),
	];
	let ring = RADIUS * 2.0 + RING_PADDING;

	view! {
		<div class="action-menu" style="position: fixed; inset: 0; pointer-events: none;">
			<div
				class="action-menu-ring"
				style=format!(
					"position: absolute; border-radius: 50%; background: rgba(0, 0, 0, 0.05); width: {ring}px; height: {ring}px; left: {}px; top: {}px;",
					x - ring / 2.0,
					y - ring / 2.0,
				)
			/>
			{items
				.into_iter()
				.map(|(action, icon, label, bx, by)| {
					view! {
						<button
							class="action-menu-item"
							title=label
							style=format!(
								"position: absolute; left: {bx}px; top: {by}px; transform: translate(-50%, -50%); pointer-events: auto;",
							)
							on:click=move |ev| {
								ev.stop_propagation();
								on_action.run(action);
							}
						>
							{icon}
						</button>
					}
				})
				.collect_view()}
		</div>
	}
}

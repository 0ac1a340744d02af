use leptos::prelude::*;

use crate::components::chat_panel::ChatPanel;
use crate::components::description_toggle::DescriptionToggle;
use crate::components::task_graph::{GraphData, GraphHandle, TaskGraphCanvas};

/// Graph editor with the assistant panel docked on the right.
#[component]
pub fn Home() -> impl IntoView {
	let graph = GraphHandle::new(GraphData::default());
	let show_descriptions = RwSignal::new(false);

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<TaskGraphCanvas handle=graph show_descriptions=show_descriptions fullscreen=true />
				<div class="graph-overlay">
					<h1>"Task Graph"</h1>
					<p class="subtitle">
						"Click a task to focus it. Right-click for actions. Click the background to see everything."
					</p>
					<DescriptionToggle show=show_descriptions />
				</div>
				<ChatPanel handle=graph />
			</div>
		</ErrorBoundary>
	}
}

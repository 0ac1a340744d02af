use leptos::prelude::*;

#[component]
pub fn DescriptionToggle(show: RwSignal<bool>) -> impl IntoView {
	view! {
		<label class="description-toggle">
			<input
				type="checkbox"
				role="switch"
				prop:checked=move || show.get()
				on:change=move |ev| show.set(event_target_checked(&ev))
			/>
			<span>"Show Descriptions"</span>
		</label>
	}
}

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{error, info, warn};

use crate::api::{ChatRequest, ConversationClient, Message, MessageKind, StreamEvent};
use crate::components::task_graph::GraphHandle;
use crate::config::AppConfig;
use crate::conversation::{Transcript, local_time};

/// Collapsible side panel: transcript plus the task input that drives the
/// conversation service.
#[component]
pub fn ChatPanel(handle: GraphHandle) -> impl IntoView {
	let config = use_context::<AppConfig>().unwrap_or_default();
	let client = StoredValue::new_local(ConversationClient::new(&config));
	let transcript = RwSignal::new(Transcript::with_greeting());
	let draft = RwSignal::new(String::new());
	let busy = RwSignal::new(false);
	let collapsed = RwSignal::new(true);
	let online = RwSignal::new(None::<bool>);

	spawn_local(async move {
		let status = client.get_value().health_check().await;
		if let Err(err) = &status {
			warn!("conversation service unavailable: {err}");
		}
		online.set(Some(status.is_ok()));
	});

	let submit = move || {
		if busy.get_untracked() {
			return;
		}
		let text = draft.get_untracked();
		if transcript.try_update(|t| t.push_user(&text)).flatten().is_none() {
			return;
		}
		draft.set(String::new());
		let request = ChatRequest {
			chat_history: transcript.with_untracked(|t| t.history()),
			graph: handle.snapshot(),
		};
		let Some(reply_id) = transcript.try_update(|t| t.begin_assistant()) else {
			return;
		};
		busy.set(true);
		let client = client.get_value();
		spawn_local(async move {
			run_conversation(client, request, handle, transcript, reply_id).await;
			busy.set(false);
		});
	};

	view! {
		<button class="chat-toggle" on:click=move |_| collapsed.update(|c| *c = !*c)>
			{move || if collapsed.get() { "‹" } else { "›" }}
		</button>
		<aside class="chat-panel" class:collapsed=move || collapsed.get()>
			<header class="chat-header">
				<h2>"Task assistant"</h2>
				<span
					class="chat-health"
					class:online=move || online.get() == Some(true)
					class:offline=move || online.get() == Some(false)
				/>
			</header>
			<ul class="chat-log">
				<For
					each=move || transcript.with(|t| t.messages().to_vec())
					key=|m| (m.id.clone(), m.content.clone())
					children=move |message: Message| view! { <ChatBubble message=message /> }
				/>
			</ul>
			<form
				class="task-input"
				on:submit=move |ev: SubmitEvent| {
					ev.prevent_default();
					submit();
				}
			>
				<input
					type="text"
					placeholder="Describe a task to break down..."
					prop:value=move || draft.get()
					prop:disabled=move || busy.get()
					on:input=move |ev| draft.set(event_target_value(&ev))
				/>
				<button
					type="submit"
					prop:disabled=move || busy.get() || draft.with(|d| d.trim().is_empty())
				>
					"Send"
				</button>
			</form>
		</aside>
	}
}

#[component]
fn ChatBubble(message: Message) -> impl IntoView {
	let time = local_time(&message);
	let class = match message.kind {
		MessageKind::User => "chat-message user",
		MessageKind::Assistant => "chat-message assistant",
	};
	let content = if message.content.is_empty() {
		"…".to_string()
	} else {
		message.content
	};
	view! {
		<li class=class>
			<p>{content}</p>
			<time>{time}</time>
		</li>
	}
}

/// Streams a reply into `reply_id`. When the stream fails before anything
/// arrived, retries once against the one-shot endpoint.
async fn run_conversation(
	client: ConversationClient,
	request: ChatRequest,
	handle: GraphHandle,
	transcript: RwSignal<Transcript>,
	reply_id: String,
) {
	let mut received = false;
	let streamed = client
		.stream_chat(&request, |event| {
			received = true;
			match event {
				StreamEvent::Token { content } => {
					transcript.update(|t| t.append_token(&reply_id, content));
				}
				StreamEvent::GraphUpdate { graph_data } => {
					handle.update(|c| c.replace_graph(graph_data.clone()));
				}
				StreamEvent::Done => {}
			}
		})
		.await;

	let err = match streamed {
		Ok(reply) => {
			info!(
				"assistant replied ({} chars, graph {})",
				reply.content.len(),
				if reply.graph.is_some() { "replaced" } else { "unchanged" }
			);
			return;
		}
		Err(err) if received => err,
		Err(err) => {
			warn!("streaming failed, falling back to one-shot: {err}");
			match client.send_message(&request).await {
				Ok(response) => {
					transcript.update(|t| t.set_content(&reply_id, &response.message_response));
					handle.update(|c| c.replace_graph(response.graph_data));
					return;
				}
				Err(err) => err,
			}
		}
	};
	error!("error processing task: {err}");
	transcript.update(|t| t.fail(Some(&reply_id)));
}

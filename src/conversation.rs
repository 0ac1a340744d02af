//! Chat transcript and the accumulation of a streamed assistant reply.

use chrono::{DateTime, Local, Utc};

use crate::api::{Message, MessageKind, StreamEvent};
use crate::components::task_graph::GraphData;

pub const GREETING: &str =
	"Hello! I can help you break down your tasks. What would you like to work on?";
pub const FAILURE_REPLY: &str =
	"Sorry, something went wrong while processing your request. Please try again.";

/// Ordered chat log. Message ids are unique within one transcript.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transcript {
	messages: Vec<Message>,
	seq: u64,
}

impl Transcript {
	pub fn with_greeting() -> Self {
		let mut transcript = Self::default();
		transcript.push(MessageKind::Assistant, GREETING.to_string());
		transcript
	}

	fn push(&mut self, kind: MessageKind, content: String) -> String {
		self.seq += 1;
		let now = Utc::now();
		let id = format!("{}-{}", now.timestamp_millis(), self.seq);
		self.messages.push(Message {
			id: id.clone(),
			kind,
			content,
			timestamp: now.to_rfc3339(),
		});
		id
	}

	fn find_mut(&mut self, id: &str) -> Option<&mut Message> {
		self.messages.iter_mut().find(|m| m.id == id)
	}

	/// Blank input never enters the transcript.
	pub fn push_user(&mut self, content: &str) -> Option<String> {
		let content = content.trim();
		if content.is_empty() {
			return None;
		}
		Some(self.push(MessageKind::User, content.to_string()))
	}

	/// Starts an empty assistant message for streamed tokens to land in.
	pub fn begin_assistant(&mut self) -> String {
		self.push(MessageKind::Assistant, String::new())
	}

	pub fn append_token(&mut self, id: &str, token: &str) {
		if let Some(message) = self.find_mut(id) {
			message.content.push_str(token);
		}
	}

	pub fn set_content(&mut self, id: &str, content: &str) {
		if let Some(message) = self.find_mut(id) {
			message.content = content.to_string();
		}
	}

	/// Replaces whatever the in-progress reply holds with one error message.
	pub fn fail(&mut self, id: Option<&str>) {
		match id.and_then(|id| self.find_mut(id)) {
			Some(message) => message.content = FAILURE_REPLY.to_string(),
			None => {
				self.push(MessageKind::Assistant, FAILURE_REPLY.to_string());
			}
		}
	}

	/// What gets sent as `chatHistory`: everything with content.
	pub fn history(&self) -> Vec<Message> {
		self.messages
			.iter()
			.filter(|m| !m.content.is_empty())
			.cloned()
			.collect()
	}

	pub fn messages(&self) -> &[Message] {
		&self.messages
	}

	pub fn len(&self) -> usize {
		self.messages.len()
	}

	pub fn is_empty(&self) -> bool {
		self.messages.is_empty()
	}
}

/// Local wall-clock time of a message, for display.
pub fn local_time(message: &Message) -> String {
	DateTime::parse_from_rfc3339(&message.timestamp)
		.map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
		.unwrap_or_default()
}

/// Folded state of one streamed reply.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StreamReply {
	pub content: String,
	pub graph: Option<GraphData>,
	pub done: bool,
}

impl StreamReply {
	/// Returns `false` once the stream has ended.
	pub fn apply(&mut self, event: StreamEvent) -> bool {
		match event {
			StreamEvent::Token { content } => self.content.push_str(&content),
			StreamEvent::GraphUpdate { graph_data } => self.graph = Some(graph_data),
			StreamEvent::Done => self.done = true,
		}
		!self.done
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::api::sse::SseDecoder;
	use crate::components::task_graph::{GraphLink, GraphNode};

	#[test]
	fn greeting_opens_the_transcript() {
		let transcript = Transcript::with_greeting();
		assert_eq!(transcript.len(), 1);
		assert_eq!(transcript.messages()[0].kind, MessageKind::Assistant);
		assert_eq!(transcript.messages()[0].content, GREETING);
	}

	#[test]
	fn blank_user_input_is_rejected() {
		let mut transcript = Transcript::default();
		assert_eq!(transcript.push_user("   "), None);
		assert!(transcript.is_empty());
		assert!(transcript.push_user(" Plan a trip ").is_some());
		assert_eq!(transcript.messages()[0].content, "Plan a trip");
	}

	#[test]
	fn ids_are_unique() {
		let mut transcript = Transcript::with_greeting();
		let a = transcript.push_user("one");
		let b = transcript.push_user("two");
		let c = transcript.begin_assistant();
		assert_ne!(a, b);
		assert_ne!(b.as_deref(), Some(c.as_str()));
	}

	#[test]
	fn tokens_append_in_order_and_history_skips_empty_reply() {
		let mut transcript = Transcript::with_greeting();
		transcript.push_user("Plan a trip");
		let reply = transcript.begin_assistant();
		assert_eq!(transcript.history().len(), 2);
		transcript.append_token(&reply, "Hel");
		transcript.append_token(&reply, "lo");
		assert_eq!(transcript.messages()[2].content, "Hello");
		assert_eq!(transcript.history().len(), 3);
	}

	#[test]
	fn failure_leaves_a_single_error_message() {
		let mut transcript = Transcript::with_greeting();
		transcript.push_user("Plan a trip");
		let reply = transcript.begin_assistant();
		transcript.append_token(&reply, "partial");
		transcript.fail(Some(&reply));
		assert_eq!(transcript.len(), 3);
		assert_eq!(transcript.messages()[2].content, FAILURE_REPLY);

		transcript.fail(None);
		assert_eq!(transcript.len(), 4);
	}

	#[test]
	fn local_time_formats_or_blanks() {
		let mut transcript = Transcript::default();
		transcript.push_user("x");
		assert_eq!(local_time(&transcript.messages()[0]).len(), 8);
		let mut bad = transcript.messages()[0].clone();
		bad.timestamp = "yesterday".into();
		assert_eq!(local_time(&bad), "");
	}

	#[test]
	fn streamed_reply_builds_message_and_graph() {
		let g2 = GraphData {
			nodes: vec![GraphNode::new("a", "Trip"), GraphNode::new("b", "Book")],
			links: vec![GraphLink::new("a", "b")],
		};
		let body = format!(
			"data: {{\"type\":\"token\",\"content\":\"Hel\"}}\n\n\
			data: {{\"type\":\"token\",\"content\":\"lo\"}}\n\n\
			data: {{\"type\":\"graph_update\",\"graph_data\":{}}}\n\n\
			data: {{\"type\":\"done\"}}\n\n\
			data: {{\"type\":\"token\",\"content\":\"ignored\"}}\n\n",
			serde_json::to_string(&g2).unwrap()
		);

		let mut transcript = Transcript::with_greeting();
		transcript.push_user("Plan a trip");
		let id = transcript.begin_assistant();
		let mut decoder = SseDecoder::new();
		let mut reply = StreamReply::default();

		'stream: for chunk in body.as_bytes().chunks(7) {
			for event in decoder.push(chunk) {
				if let StreamEvent::Token { content } = &event {
					transcript.append_token(&id, content);
				}
				if !reply.apply(event) {
					break 'stream;
				}
			}
		}

		assert!(reply.done);
		assert_eq!(reply.content, "Hello");
		assert_eq!(transcript.messages()[2].content, "Hello");
		assert_eq!(reply.graph, Some(g2));
	}
}

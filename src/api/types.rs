//! Request and response bodies of the conversation service.

use serde::{Deserialize, Serialize};

use crate::components::task_graph::GraphData;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
	User,
	Assistant,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
	pub id: String,
	#[serde(rename = "type")]
	pub kind: MessageKind,
	pub content: String,
	/// RFC 3339.
	pub timestamp: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatRequest {
	#[serde(rename = "chatHistory")]
	pub chat_history: Vec<Message>,
	pub graph: GraphData,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ChatResponse {
	pub message_response: String,
	#[serde(default)]
	pub graph_data: GraphData,
}

/// One `data:` payload of the streaming endpoint.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
	Token { content: String },
	GraphUpdate { graph_data: GraphData },
	Done,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct HealthStatus {
	pub status: String,
	#[serde(default)]
	pub message: String,
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;
	use crate::components::task_graph::{GraphLink, GraphNode, TaskStatus};

	#[test]
	fn request_uses_wire_names() {
		let mut node = GraphNode::new("a", "Plan");
		node.status = Some(TaskStatus::InProgress);
		let request = ChatRequest {
			chat_history: vec![Message {
				id: "1".into(),
				kind: MessageKind::User,
				content: "split it".into(),
				timestamp: "2024-01-01T00:00:00Z".into(),
			}],
			graph: GraphData {
				nodes: vec![node],
				links: vec![],
			},
		};
		let value = serde_json::to_value(&request).unwrap();
		assert_eq!(value["chatHistory"][0]["type"], json!("user"));
		assert_eq!(value["graph"]["nodes"][0]["status"], json!("inProgress"));
		assert!(value.get("chat_history").is_none());
	}

	#[test]
	fn stream_events_parse_by_tag() {
		let token: StreamEvent = serde_json::from_str(r#"{"type":"token","content":"Hel"}"#).unwrap();
		assert_eq!(token, StreamEvent::Token { content: "Hel".into() });

		let done: StreamEvent = serde_json::from_str(r#"{"type":"done"}"#).unwrap();
		assert_eq!(done, StreamEvent::Done);

		let update: StreamEvent = serde_json::from_str(
			r#"{"type":"graph_update","graph_data":{"nodes":[{"id":"a","name":"A","description":""},{"id":"b","name":"B","description":""}],"links":[{"source":"a","target":"b"}]}}"#,
		)
		.unwrap();
		let StreamEvent::GraphUpdate { graph_data } = update else {
			panic!("expected graph update");
		};
		assert_eq!(graph_data.links, vec![GraphLink::new("a", "b")]);
	}

	#[test]
	fn one_shot_response_parses() {
		let response: ChatResponse = serde_json::from_value(json!({
			"message_response": "Done",
			"graph_data": {"nodes": [{"id": "a", "name": "A", "description": "x"}], "links": []}
		}))
		.unwrap();
		assert_eq!(response.message_response, "Done");
		assert_eq!(response.graph_data.nodes[0].description, "x");
	}
}

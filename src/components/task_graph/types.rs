use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

/// Progress of a single task. Drives the badge color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
	#[default]
	NotStarted,
	InProgress,
	Completed,
}

impl TaskStatus {
	pub const ALL: [TaskStatus; 3] = [Self::NotStarted, Self::InProgress, Self::Completed];

	pub fn next(self) -> Self {
		match self {
			Self::NotStarted => Self::InProgress,
			Self::InProgress => Self::Completed,
			Self::Completed => Self::NotStarted,
		}
	}

	pub fn color(self) -> &'static str {
		match self {
			Self::NotStarted => "#94a3b8",
			Self::InProgress => "#f59e0b",
			Self::Completed => "#22c55e",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::NotStarted => "Not started",
			Self::InProgress => "In progress",
			Self::Completed => "Completed",
		}
	}
}

fn default_value() -> u32 {
	1
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub description: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<TaskStatus>,
	#[serde(default = "default_value", rename = "val")]
	pub value: u32,
	/// Legacy direct color; only used when no status is set.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub y: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fx: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fy: Option<f64>,
}

impl GraphNode {
	pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			description: String::new(),
			status: None,
			value: 1,
			color: None,
			x: None,
			y: None,
			fx: None,
			fy: None,
		}
	}

	pub fn effective_status(&self) -> TaskStatus {
		self.status.unwrap_or_default()
	}

	/// Status color wins whenever a status is present.
	pub fn fill_color(&self) -> &str {
		match (self.status, self.color.as_deref()) {
			(Some(status), _) => status.color(),
			(None, Some(color)) => color,
			(None, None) => TaskStatus::NotStarted.color(),
		}
	}

	pub fn position(&self) -> Option<(f64, f64)> {
		Some((self.x?, self.y?))
	}

	pub fn pinned(&self) -> Option<(f64, f64)> {
		Some((self.fx?, self.fy?))
	}

	pub fn pin_at(&mut self, x: f64, y: f64) {
		self.x = Some(x);
		self.y = Some(y);
		self.fx = Some(x);
		self.fy = Some(y);
	}

	pub fn unpin(&mut self) {
		self.fx = None;
		self.fy = None;
	}
}

/// Link endpoints as they may arrive on the wire: a bare id, or a node object
/// that a layout library has substituted for the id.
#[derive(Deserialize)]
#[serde(untagged)]
enum Endpoint {
	Id(String),
	Node { id: String },
}

fn endpoint_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
	Ok(match Endpoint::deserialize(deserializer)? {
		Endpoint::Id(id) | Endpoint::Node { id } => id,
	})
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphLink {
	#[serde(deserialize_with = "endpoint_id")]
	pub source: String,
	#[serde(deserialize_with = "endpoint_id")]
	pub target: String,
}

impl GraphLink {
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	#[serde(default)]
	pub links: Vec<GraphLink>,
}

impl GraphData {
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
		self.nodes.iter_mut().find(|n| n.id == id)
	}

	pub fn contains(&self, id: &str) -> bool {
		self.node(id).is_some()
	}

	pub fn children<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
		self.links
			.iter()
			.filter(move |l| l.source == id)
			.map(|l| l.target.as_str())
	}

	/// Nodes linked to `id` in either direction.
	pub fn neighbors<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
		self.links.iter().filter_map(move |l| {
			if l.source == id {
				Some(l.target.as_str())
			} else if l.target == id {
				Some(l.source.as_str())
			} else {
				None
			}
		})
	}

	/// First node per id wins; links must join two distinct, existing nodes and
	/// appear once. Applying this twice changes nothing.
	pub fn normalized(&self) -> GraphData {
		let mut ids = HashSet::new();
		let nodes: Vec<GraphNode> = self
			.nodes
			.iter()
			.filter(|n| ids.insert(n.id.clone()))
			.map(|n| GraphNode {
				value: n.value.max(1),
				..n.clone()
			})
			.collect();

		let mut pairs = HashSet::new();
		let links = self
			.links
			.iter()
			.filter(|l| {
				l.source != l.target
					&& ids.contains(&l.source)
					&& ids.contains(&l.target)
					&& pairs.insert((l.source.clone(), l.target.clone()))
			})
			.cloned()
			.collect();

		GraphData { nodes, links }
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn status_cycles_through_all_three() {
		let mut status = TaskStatus::NotStarted;
		status = status.next();
		assert_eq!(status, TaskStatus::InProgress);
		status = status.next();
		assert_eq!(status, TaskStatus::Completed);
		status = status.next();
		assert_eq!(status, TaskStatus::NotStarted);
	}

	#[test]
	fn status_color_overrides_legacy_color() {
		let mut node = GraphNode::new("a", "A");
		node.color = Some("#8B5CF6".into());
		assert_eq!(node.fill_color(), "#8B5CF6");
		node.status = Some(TaskStatus::Completed);
		assert_eq!(node.fill_color(), TaskStatus::Completed.color());
		node.color = None;
		node.status = None;
		assert_eq!(node.fill_color(), TaskStatus::NotStarted.color());
	}

	#[test]
	fn wire_node_without_optional_fields() {
		let node: GraphNode =
			serde_json::from_str(r#"{"id":"main","name":"Plan trip","description":""}"#).unwrap();
		assert_eq!(node.status, None);
		assert_eq!(node.value, 1);
		assert_eq!(node.effective_status(), TaskStatus::NotStarted);

		let json = serde_json::to_value(&node).unwrap();
		assert_eq!(
			json,
			serde_json::json!({"id":"main","name":"Plan trip","description":"","val":1})
		);
	}

	#[test]
	fn status_uses_camel_case_on_the_wire() {
		let node: GraphNode = serde_json::from_str(
			r#"{"id":"a","name":"A","description":"d","status":"inProgress"}"#,
		)
		.unwrap();
		assert_eq!(node.status, Some(TaskStatus::InProgress));
	}

	#[test]
	fn object_link_endpoints_collapse_to_ids() {
		let data: GraphData = serde_json::from_str(
			r#"{
				"nodes": [{"id":"a","name":"A"},{"id":"b","name":"B"}],
				"links": [{"source":{"id":"a","x":1.5,"vx":0.2},"target":"b"}]
			}"#,
		)
		.unwrap();
		assert_eq!(data.links, vec![GraphLink::new("a", "b")]);
	}

	#[test]
	fn normalize_drops_dangling_duplicate_and_self_links() {
		let data = GraphData {
			nodes: vec![
				GraphNode::new("a", "A"),
				GraphNode::new("b", "B"),
				GraphNode::new("a", "shadow"),
			],
			links: vec![
				GraphLink::new("a", "b"),
				GraphLink::new("a", "b"),
				GraphLink::new("a", "ghost"),
				GraphLink::new("b", "b"),
			],
		};
		let normalized = data.normalized();
		assert_eq!(normalized.nodes.len(), 2);
		assert_eq!(normalized.node("a").unwrap().name, "A");
		assert_eq!(normalized.links, vec![GraphLink::new("a", "b")]);
	}

	#[test]
	fn neighbors_follow_links_both_ways() {
		let data = GraphData {
			nodes: vec![
				GraphNode::new("a", "A"),
				GraphNode::new("b", "B"),
				GraphNode::new("c", "C"),
			],
			links: vec![GraphLink::new("a", "b"), GraphLink::new("b", "c")],
		};
		let mut around_b: Vec<&str> = data.neighbors("b").collect();
		around_b.sort();
		assert_eq!(around_b, vec!["a", "c"]);
		assert_eq!(data.children("b").collect::<Vec<_>>(), vec!["c"]);
	}
}

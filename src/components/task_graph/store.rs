//! Authoritative task graph snapshot and the command reducer that edits it.
//!
//! Every structural edit builds the next [`GraphData`] from the current one and
//! installs it in a single assignment, bumping the revision so the layout can
//! tell that its projection is stale.

use std::collections::{HashMap, HashSet, VecDeque};

use log::debug;

use super::types::{GraphData, GraphLink, GraphNode, TaskStatus};

/// Distance between a new subtask and its parent, in graph units.
pub const SUBTASK_DISTANCE: f64 = 70.0;
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Offset of a new subtask from its parent. Siblings fan out so that two
/// subtasks added in a row never share a spawn point.
pub fn subtask_offset(siblings: usize) -> (f64, f64) {
	let angle = siblings as f64 * GOLDEN_ANGLE;
	(SUBTASK_DISTANCE * angle.cos(), SUBTASK_DISTANCE * angle.sin())
}

/// Fields to merge into an existing node. `None` leaves the field untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodePatch {
	pub name: Option<String>,
	pub description: Option<String>,
	pub status: Option<TaskStatus>,
	pub value: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
	AddSubtask {
		parent: String,
		name: String,
		description: String,
	},
	DeleteSubtree {
		root: String,
	},
	Rename {
		id: String,
		name: String,
	},
	SetDescription {
		id: String,
		description: String,
	},
	SetStatus {
		id: String,
		status: TaskStatus,
	},
	CycleStatus {
		id: String,
	},
	Reposition {
		id: String,
		x: f64,
		y: f64,
	},
}

impl Command {
	/// The node the command is aimed at (the parent, for `AddSubtask`).
	pub fn target(&self) -> &str {
		match self {
			Command::AddSubtask { parent, .. } => parent,
			Command::DeleteSubtree { root } => root,
			Command::Rename { id, .. }
			| Command::SetDescription { id, .. }
			| Command::SetStatus { id, .. }
			| Command::CycleStatus { id }
			| Command::Reposition { id, .. } => id,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandOutcome {
	pub created: Option<String>,
	pub removed: HashSet<String>,
	pub updated: Option<String>,
}

impl CommandOutcome {
	pub fn is_noop(&self) -> bool {
		self.created.is_none() && self.removed.is_empty() && self.updated.is_none()
	}
}

/// Hands out time-based ids that never repeat within one store.
#[derive(Debug, Default)]
struct IdGenerator {
	last: i64,
}

impl IdGenerator {
	fn next(&mut self, taken: &GraphData) -> String {
		let mut stamp = chrono::Utc::now().timestamp_millis().max(self.last + 1);
		while taken.contains(&format!("node_{stamp}")) {
			stamp += 1;
		}
		self.last = stamp;
		format!("node_{stamp}")
	}
}

#[derive(Debug, Default)]
pub struct GraphStore {
	graph: GraphData,
	ids: IdGenerator,
	revision: u64,
}

impl GraphStore {
	pub fn new(graph: GraphData) -> Self {
		Self {
			graph: graph.normalized(),
			ids: IdGenerator::default(),
			revision: 0,
		}
	}

	pub fn graph(&self) -> &GraphData {
		&self.graph
	}

	/// Bumped on every installed snapshot except coordinate bookkeeping.
	pub fn revision(&self) -> u64 {
		self.revision
	}

	fn install(&mut self, next: GraphData) {
		self.graph = next;
		self.revision += 1;
	}

	/// Swap in a whole new graph, keeping known coordinates of ids that survive.
	/// Returns the ids that disappeared.
	pub fn replace_graph(&mut self, incoming: GraphData) -> HashSet<String> {
		let mut next = incoming.normalized();
		let previous: HashMap<&str, &GraphNode> =
			self.graph.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

		for node in &mut next.nodes {
			if node.position().is_none() {
				if let Some((x, y)) = previous.get(node.id.as_str()).and_then(|n| n.position()) {
					node.x = Some(x);
					node.y = Some(y);
				}
			}
		}

		let kept: HashSet<&str> = next.nodes.iter().map(|n| n.id.as_str()).collect();
		let removed = previous
			.keys()
			.filter(|id| !kept.contains(*id))
			.map(|id| id.to_string())
			.collect();

		debug!(
			"replace graph: {} nodes, {} links",
			next.nodes.len(),
			next.links.len()
		);
		self.install(next);
		removed
	}

	pub fn update_node(&mut self, id: &str, patch: NodePatch) -> bool {
		if !self.graph.contains(id) {
			debug!("update on unknown node {id} ignored");
			return false;
		}
		let mut next = self.graph.clone();
		if let Some(node) = next.node_mut(id) {
			if let Some(name) = patch.name {
				node.name = name;
			}
			if let Some(description) = patch.description {
				node.description = description;
			}
			if let Some(status) = patch.status {
				node.status = Some(status);
				node.color = None;
			}
			if let Some(value) = patch.value {
				node.value = value.max(1);
			}
		}
		self.install(next);
		true
	}

	/// Creates a pinned child next to `parent` and links it. Returns the new id.
	pub fn add_subtask(&mut self, parent: &str, name: &str, description: &str) -> Option<String> {
		let name = name.trim();
		if name.is_empty() {
			return None;
		}
		let Some(parent_node) = self.graph.node(parent) else {
			debug!("add subtask under unknown node {parent} ignored");
			return None;
		};
		let (px, py) = parent_node
			.position()
			.or_else(|| parent_node.pinned())
			.unwrap_or((0.0, 0.0));
		let (ox, oy) = subtask_offset(self.graph.children(parent).count());

		let id = self.ids.next(&self.graph);
		let mut node = GraphNode::new(id.clone(), name);
		node.description = description.trim().to_string();
		node.status = Some(TaskStatus::NotStarted);
		node.pin_at(px + ox, py + oy);

		let mut next = self.graph.clone();
		next.nodes.push(node);
		next.links.push(GraphLink::new(parent, id.clone()));
		debug!("added subtask {id} under {parent}");
		self.install(next);
		Some(id)
	}

	/// Everything reachable from `root` along parent→child links, root excluded.
	pub fn descendants(&self, root: &str) -> Vec<String> {
		let mut seen = HashSet::from([root.to_string()]);
		let mut queue = VecDeque::from([root.to_string()]);
		let mut found = Vec::new();
		while let Some(current) = queue.pop_front() {
			for child in self.graph.children(&current) {
				if seen.insert(child.to_string()) {
					found.push(child.to_string());
					queue.push_back(child.to_string());
				}
			}
		}
		found
	}

	/// Removes `root`, its descendants and every link touching them.
	/// Returns the removed ids (empty when `root` is unknown).
	pub fn delete_subtree(&mut self, root: &str) -> HashSet<String> {
		if !self.graph.contains(root) {
			debug!("delete of unknown node {root} ignored");
			return HashSet::new();
		}
		let mut removed: HashSet<String> = self.descendants(root).into_iter().collect();
		removed.insert(root.to_string());

		let next = GraphData {
			nodes: self
				.graph
				.nodes
				.iter()
				.filter(|n| !removed.contains(&n.id))
				.cloned()
				.collect(),
			links: self
				.graph
				.links
				.iter()
				.filter(|l| !removed.contains(&l.source) && !removed.contains(&l.target))
				.cloned()
				.collect(),
		};
		debug!("deleted {} nodes under {root}", removed.len());
		self.install(next);
		removed
	}

	pub fn cycle_status(&mut self, id: &str) -> Option<TaskStatus> {
		let status = self.graph.node(id)?.effective_status().next();
		self.update_node(
			id,
			NodePatch {
				status: Some(status),
				..NodePatch::default()
			},
		);
		Some(status)
	}

	/// Stores a final resting position and pins the node there.
	pub fn reposition(&mut self, id: &str, x: f64, y: f64) -> bool {
		if !self.graph.contains(id) {
			return false;
		}
		let mut next = self.graph.clone();
		if let Some(node) = next.node_mut(id) {
			node.pin_at(x, y);
		}
		self.install(next);
		true
	}

	/// Copies live layout coordinates back into the snapshot. Not a revision.
	pub fn absorb_positions<I>(&mut self, positions: I)
	where
		I: IntoIterator<Item = (String, f64, f64)>,
	{
		let live: HashMap<String, (f64, f64)> =
			positions.into_iter().map(|(id, x, y)| (id, (x, y))).collect();
		for node in &mut self.graph.nodes {
			if let Some(&(x, y)) = live.get(&node.id) {
				node.x = Some(x);
				node.y = Some(y);
			}
		}
	}

	pub fn unpin_all(&mut self) {
		for node in &mut self.graph.nodes {
			node.unpin();
		}
	}

	/// Single entry point for every edit the interaction layer can request.
	pub fn apply(&mut self, command: Command) -> CommandOutcome {
		let mut outcome = CommandOutcome::default();
		match command {
			Command::AddSubtask {
				parent,
				name,
				description,
			} => {
				outcome.created = self.add_subtask(&parent, &name, &description);
			}
			Command::DeleteSubtree { root } => {
				outcome.removed = self.delete_subtree(&root);
			}
			Command::Rename { id, name } => {
				let name = name.trim().to_string();
				if !name.is_empty()
					&& self.update_node(
						&id,
						NodePatch {
							name: Some(name),
							..NodePatch::default()
						},
					) {
					outcome.updated = Some(id);
				}
			}
			Command::SetDescription { id, description } => {
				if self.update_node(
					&id,
					NodePatch {
						description: Some(description),
						..NodePatch::default()
					},
				) {
					outcome.updated = Some(id);
				}
			}
			Command::SetStatus { id, status } => {
				if self.update_node(
					&id,
					NodePatch {
						status: Some(status),
						..NodePatch::default()
					},
				) {
					outcome.updated = Some(id);
				}
			}
			Command::CycleStatus { id } => {
				if self.cycle_status(&id).is_some() {
					outcome.updated = Some(id);
				}
			}
			Command::Reposition { id, x, y } => {
				if self.reposition(&id, x, y) {
					outcome.updated = Some(id);
				}
			}
		}
		outcome
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use proptest::prelude::*;

	use super::*;

	fn node(id: &str) -> GraphNode {
		GraphNode::new(id, id.to_uppercase())
	}

	fn tree() -> GraphStore {
		// a -> b -> d, a -> c, e stands alone
		GraphStore::new(GraphData {
			nodes: ["a", "b", "c", "d", "e"].into_iter().map(node).collect(),
			links: vec![
				GraphLink::new("a", "b"),
				GraphLink::new("a", "c"),
				GraphLink::new("b", "d"),
			],
		})
	}

	fn ids(store: &GraphStore) -> Vec<&str> {
		store.graph().nodes.iter().map(|n| n.id.as_str()).collect()
	}

	#[test]
	fn add_then_delete_root_empties_graph() {
		let mut store = GraphStore::new(GraphData {
			nodes: vec![node("A")],
			links: vec![],
		});
		let outcome = store.apply(Command::AddSubtask {
			parent: "A".into(),
			name: "Sub".into(),
			description: String::new(),
		});
		let new_id = outcome.created.expect("subtask created");
		assert_eq!(store.graph().nodes.len(), 2);
		assert_eq!(store.graph().links, vec![GraphLink::new("A", new_id)]);

		let outcome = store.apply(Command::DeleteSubtree { root: "A".into() });
		assert_eq!(outcome.removed.len(), 2);
		assert!(store.graph().nodes.is_empty());
		assert!(store.graph().links.is_empty());
	}

	#[test]
	fn add_subtask_spawns_pinned_near_parent() {
		let mut store = tree();
		store.absorb_positions([("a".to_string(), 10.0, -20.0)]);
		let id = store.add_subtask("a", "  Book flights ", "compare prices").unwrap();
		let created = store.graph().node(&id).unwrap();
		assert_eq!(created.name, "Book flights");
		assert_eq!(created.description, "compare prices");
		assert_eq!(created.status, Some(TaskStatus::NotStarted));
		let (ox, oy) = subtask_offset(2);
		let expected = (10.0 + ox, -20.0 + oy);
		assert_eq!(created.position(), Some(expected));
		assert_eq!(created.pinned(), Some(expected));
	}

	#[test]
	fn add_subtask_rejects_blank_name_and_unknown_parent() {
		let mut store = tree();
		let before = store.revision();
		assert_eq!(store.add_subtask("a", "   ", ""), None);
		assert_eq!(store.add_subtask("nope", "Real", ""), None);
		assert_eq!(store.revision(), before);
		assert_eq!(store.graph().nodes.len(), 5);
	}

	#[test]
	fn generated_ids_never_repeat() {
		let mut store = tree();
		let first = store.add_subtask("a", "one", "").unwrap();
		store.delete_subtree(&first);
		let second = store.add_subtask("a", "two", "").unwrap();
		let third = store.add_subtask("a", "three", "").unwrap();
		assert_ne!(first, second);
		assert_ne!(second, third);
		assert_ne!(first, third);
	}

	#[test]
	fn delete_removes_descendants_and_their_links() {
		let mut store = tree();
		let removed = store.delete_subtree("b");
		assert_eq!(
			removed,
			HashSet::from(["b".to_string(), "d".to_string()])
		);
		assert_eq!(ids(&store), vec!["a", "c", "e"]);
		assert_eq!(store.graph().links, vec![GraphLink::new("a", "c")]);
	}

	#[test]
	fn delete_terminates_on_cycles() {
		let mut store = GraphStore::new(GraphData {
			nodes: ["x", "y", "z"].into_iter().map(node).collect(),
			links: vec![
				GraphLink::new("x", "y"),
				GraphLink::new("y", "z"),
				GraphLink::new("z", "x"),
			],
		});
		assert_eq!(store.descendants("y"), vec!["z".to_string(), "x".to_string()]);
		assert_eq!(store.delete_subtree("y").len(), 3);
		assert!(store.graph().nodes.is_empty());
	}

	#[test]
	fn unknown_ids_are_noops() {
		let mut store = tree();
		let before = store.graph().clone();
		let revision = store.revision();
		for command in [
			Command::DeleteSubtree { root: "ghost".into() },
			Command::Rename {
				id: "ghost".into(),
				name: "x".into(),
			},
			Command::CycleStatus { id: "ghost".into() },
			Command::Reposition {
				id: "ghost".into(),
				x: 1.0,
				y: 1.0,
			},
		] {
			assert!(store.apply(command).is_noop());
		}
		assert_eq!(store.graph(), &before);
		assert_eq!(store.revision(), revision);
	}

	#[test]
	fn cycle_status_clears_legacy_color() {
		let mut legacy = node("a");
		legacy.color = Some("#D946EF".into());
		let mut store = GraphStore::new(GraphData {
			nodes: vec![legacy],
			links: vec![],
		});
		assert_eq!(store.cycle_status("a"), Some(TaskStatus::InProgress));
		let updated = store.graph().node("a").unwrap();
		assert_eq!(updated.color, None);
		assert_eq!(updated.fill_color(), TaskStatus::InProgress.color());
		assert_eq!(store.cycle_status("a"), Some(TaskStatus::Completed));
		assert_eq!(store.cycle_status("a"), Some(TaskStatus::NotStarted));
	}

	#[test]
	fn rename_and_describe_merge_fields() {
		let mut store = tree();
		store.apply(Command::Rename {
			id: "c".into(),
			name: "Pack bags".into(),
		});
		store.apply(Command::SetDescription {
			id: "c".into(),
			description: "Two carry-ons".into(),
		});
		let c = store.graph().node("c").unwrap();
		assert_eq!(c.name, "Pack bags");
		assert_eq!(c.description, "Two carry-ons");

		let blank = store.apply(Command::Rename {
			id: "c".into(),
			name: "  ".into(),
		});
		assert!(blank.is_noop());
		assert_eq!(store.graph().node("c").unwrap().name, "Pack bags");
	}

	#[test]
	fn replace_keeps_coordinates_of_surviving_nodes() {
		let mut store = tree();
		store.absorb_positions([("a".to_string(), 3.0, 4.0), ("e".to_string(), 9.0, 9.0)]);
		let removed = store.replace_graph(GraphData {
			nodes: vec![node("a"), node("f")],
			links: vec![GraphLink::new("a", "f"), GraphLink::new("a", "zzz")],
		});
		assert_eq!(removed.len(), 4);
		assert!(removed.contains("e"));
		assert_eq!(store.graph().node("a").unwrap().position(), Some((3.0, 4.0)));
		assert_eq!(store.graph().node("f").unwrap().position(), None);
		assert_eq!(store.graph().links, vec![GraphLink::new("a", "f")]);
	}

	#[test]
	fn reposition_pins_node() {
		let mut store = tree();
		let outcome = store.apply(Command::Reposition {
			id: "d".into(),
			x: 12.0,
			y: 7.5,
		});
		assert_eq!(outcome.updated.as_deref(), Some("d"));
		assert_eq!(store.graph().node("d").unwrap().pinned(), Some((12.0, 7.5)));
		store.unpin_all();
		assert_eq!(store.graph().node("d").unwrap().pinned(), None);
		assert_eq!(store.graph().node("d").unwrap().position(), Some((12.0, 7.5)));
	}

	fn arbitrary_graph() -> impl Strategy<Value = GraphData> {
		(1usize..12).prop_flat_map(|n| {
			prop::collection::vec((0..n + 2, 0..n + 2), 0..n * 2).prop_map(move |pairs| {
				GraphData {
					nodes: (0..n).map(|i| node(&format!("n{i}"))).collect(),
					links: pairs
						.into_iter()
						.map(|(s, t)| GraphLink::new(format!("n{s}"), format!("n{t}")))
						.collect(),
				}
			})
		})
	}

	proptest! {
		#[test]
		fn prop_normalize_is_idempotent(graph in arbitrary_graph()) {
			let once = graph.normalized();
			prop_assert_eq!(once.normalized(), once);
		}

		#[test]
		fn prop_delete_removes_exactly_the_subtree(graph in arbitrary_graph(), pick in 0usize..12) {
			let mut store = GraphStore::new(graph);
			let root = format!("n{}", pick % store.graph().nodes.len().max(1));
			let mut expected: HashSet<String> = store.descendants(&root).into_iter().collect();
			if store.graph().contains(&root) {
				expected.insert(root.clone());
			}
			let before: HashSet<String> = store.graph().nodes.iter().map(|n| n.id.clone()).collect();

			let removed = store.delete_subtree(&root);
			prop_assert_eq!(&removed, &expected);

			let after: HashSet<String> = store.graph().nodes.iter().map(|n| n.id.clone()).collect();
			prop_assert_eq!(after, before.difference(&expected).cloned().collect::<HashSet<_>>());
			for link in &store.graph().links {
				prop_assert!(!removed.contains(&link.source));
				prop_assert!(!removed.contains(&link.target));
			}
		}

		#[test]
		fn prop_no_orphan_links_after_any_edit(
			graph in arbitrary_graph(),
			ops in prop::collection::vec((0u8..4, 0usize..12), 1..10),
		) {
			let mut store = GraphStore::new(graph);
			for (op, pick) in ops {
				let target = format!("n{pick}");
				let command = match op {
					0 => Command::AddSubtask { parent: target, name: "t".into(), description: String::new() },
					1 => Command::DeleteSubtree { root: target },
					2 => Command::CycleStatus { id: target },
					_ => Command::Rename { id: target, name: "renamed".into() },
				};
				store.apply(command);
				let graph = store.graph();
				for link in &graph.links {
					prop_assert!(graph.contains(&link.source));
					prop_assert!(graph.contains(&link.target));
				}
			}
		}

		#[test]
		fn prop_three_cycles_restore_status(start in 0usize..3) {
			let mut seeded = node("a");
			seeded.status = Some(TaskStatus::ALL[start]);
			let mut store = GraphStore::new(GraphData { nodes: vec![seeded], links: vec![] });
			for _ in 0..3 {
				store.apply(Command::CycleStatus { id: "a".into() });
			}
			prop_assert_eq!(store.graph().node("a").unwrap().status, Some(TaskStatus::ALL[start]));
		}

		#[test]
		fn prop_add_subtask_links_exactly_one_new_node(graph in arbitrary_graph(), pick in 0usize..12) {
			let mut store = GraphStore::new(graph);
			let parent = format!("n{}", pick % store.graph().nodes.len().max(1));
			let nodes_before = store.graph().nodes.len();
			let links_before = store.graph().links.clone();

			let id = store.add_subtask(&parent, "X", "Y").unwrap();
			let graph = store.graph();
			prop_assert_eq!(graph.nodes.len(), nodes_before + 1);
			let created = graph.node(&id).unwrap();
			prop_assert_eq!(created.name.as_str(), "X");
			prop_assert_eq!(created.description.as_str(), "Y");
			prop_assert_eq!(created.effective_status(), TaskStatus::NotStarted);

			let new_links: Vec<GraphLink> = graph
				.links
				.iter()
				.filter(|l| !links_before.contains(l))
				.cloned()
				.collect();
			prop_assert_eq!(new_links, vec![GraphLink::new(parent, id.clone())]);
		}
	}
}

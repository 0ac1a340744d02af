//! Canvas editor for a task breakdown graph.

mod action_menu;
pub mod badge;
pub mod camera;
mod component;
pub mod controller;
mod handle;
pub mod layout;
mod overlays;
mod render;
pub mod selection;
pub mod store;
mod types;

pub use component::TaskGraphCanvas;
pub use handle::GraphHandle;
pub use types::{GraphData, GraphLink, GraphNode, TaskStatus};

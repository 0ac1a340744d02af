pub mod chat_panel;
pub mod description_toggle;
pub mod task_graph;

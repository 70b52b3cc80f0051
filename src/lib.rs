// Regina packet workspace
//
// A terminal front end for browsing and editing a tree of Regina packets:
// - packet: the document model (packets, triangulations, listeners)
// - ui: packet panes, viewers, frames and the workspace around them
// - tools: external programs (PDF viewers, Graphviz, GAP)
// - config: preferences file and environment overrides
// - events: typed queues that carry notifications to the UI thread

pub mod config;
pub mod demo;
pub mod error;
pub mod events;
pub mod logging;
pub mod packet;
pub mod tools;
pub mod ui;

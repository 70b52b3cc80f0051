//! Capability traits shared by panes, viewers and widgets
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Workspace                            │
//! │  (routes keys, owns panes and frames, drains event queues)   │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!               ┌───────────────┼────────────────┐
//!               ▼               ▼                ▼
//!         ┌───────────┐   ┌───────────┐   ┌─────────────┐
//!         │ Tree view │   │ PacketPane│   │FloatingFrame│
//!         └───────────┘   └───────────┘   └─────────────┘
//!                               │
//!                               ▼
//!                    Box<dyn PacketViewer>
//!                    (may expose an EditInterface)
//! ```
//!
//! - [`RenderContext`] - what a widget may look at while drawing
//! - [`Handled`] - whether a key was consumed
//! - [`EditInterface`] - cut/copy/paste capability with a state signal

mod component;
mod edit;
mod interactive;

pub use component::RenderContext;
pub use edit::{EditInterface, EditSignal};
pub use interactive::Handled;

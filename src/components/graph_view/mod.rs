//! Force-directed canvas view of a [`crate::graph::GraphStore`].
//!
//! Renders the shared graph on an HTML canvas with:
//! - Physics-based node positioning via force simulation
//! - Pan, zoom, and node dragging interactions
//! - Click selection and label search emphasis from [`crate::selection`]
//! - Light and dark themes
//!
//! # Example
//!
//! ```ignore
//! let graph: SharedGraph = Arc::new(Mutex::new(GraphStore::directed()));
//! let selection = RwSignal::new(SelectionState::new());
//!
//! view! { <GraphCanvas graph selection theme=ThemeMode::Dark wiki="dewiki" fullscreen=true /> }
//! ```

mod component;
mod render;
pub mod scale;
mod state;
pub mod theme;

pub use component::GraphCanvas;
pub use theme::{Theme, ThemeMode};

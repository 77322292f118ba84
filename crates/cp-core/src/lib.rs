pub mod config;
pub mod containment;
pub mod delta;
pub mod derive;
pub mod error;
pub mod id;
pub mod index;
pub mod ingest;
pub mod layout;
pub mod links;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod synthesize;
pub mod sync;

pub use config::{NewFileLocation, Settings};
pub use delta::{EdgeDelta, EdgeDeltaTracker, affected_documents};
pub use derive::derive_properties;
pub use error::{CanvasError, StoreError};
pub use id::NodeId;
pub use index::{ConnectionTargetIndex, pull_properties};
pub use ingest::parse_canvas;
pub use links::{LinkResolver, PathIndex};
pub use merge::{WriteMode, apply_update, merge_results};
pub use model::*;
pub use normalize::build_graph;
pub use synthesize::{canvas_output_path, synthesize_canvas};
pub use sync::{DocumentStore, Notice, Outcome, PullReport, PushReport, SynthesisReport};

//! Deterministic step traces for graph and combinatorial algorithms.
//!
//! Every generator is a pure function from a validated problem instance to a
//! [`Trace`]: a non-empty, ordered sequence of immutable [`Step`] snapshots.
//! Running a generator twice on the same instance yields identical traces.
//!
//! # Algorithms
//!
//! - **Kruskal** and **Prim** minimum spanning trees
//! - **Branch and bound** shortest closed tour
//! - **Bidirectional BFS** word ladder
//! - **DFS cycle detection**, directed and undirected
//!
//! # Example
//!
//! ```
//! use algoviz_trace::{generate, Algorithm, Problem, ValidationLimits};
//!
//! let json = r#"{"vertices":[{"id":1,"x":0,"y":0},{"id":2,"x":1,"y":0}],
//!                "edges":[{"source":1,"target":2,"weight":3}]}"#;
//! let problem = Problem::from_json(Algorithm::Kruskal, json, &ValidationLimits::default())?;
//! let trace = generate(&problem)?;
//! assert!(trace.terminal().description.contains("complete"));
//! # Ok::<(), algoviz_trace::Error>(())
//! ```

pub mod error;
pub mod generators;
pub mod graph;
pub mod presets;
pub mod problem;
pub mod step;
pub mod trace;
pub mod validate;

pub use error::{Error, InvariantError, Result, ValidationError};
pub use generators::{BranchAndBound, DirectedCycle, Kruskal, LadderSearch, Prim, UndirectedCycle};
pub use graph::{Edge, EdgeInput, Graph, GraphInput, Point, Vertex, VertexInput};
pub use problem::{generate, Algorithm, DistanceMatrix, Problem, TraceGenerator, WordLadder};
pub use step::{
    CycleFrame, Direction, EdgeClass, EdgeRole, EdgeView, FrontierEntry, MstFrame, Payload,
    RejectReason, Rejection, SearchFrame, SideView, Step, TourFrame, VertexView, VisitState,
};
pub use trace::{Trace, MAX_TRACE_BYTES};
pub use validate::{LadderInput, RootedGraphInput, TourInput, ValidationLimits};

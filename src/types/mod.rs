//! Core types for the bodygraph kernel.

pub mod body;
pub mod activation;
pub mod precision;
pub mod chart;
pub mod center;
pub mod analysis;
pub mod cross;
pub mod fixing;
pub mod error;

pub use body::Body;
pub use activation::{Activation, Gate, Line};
pub use precision::Precision;
pub use chart::{Chart, ChartSide, Side};
pub use center::{Center, Channel};
pub use analysis::{Authority, BodygraphAnalysis, BodygraphType, Definition, Profile};
pub use cross::{CrossAngle, CrossKey, IncarnationCross};
pub use fixing::{ChartFixing, FixingAnnotation, FixingState};
pub use error::{ConsistencyError, ValidationError};

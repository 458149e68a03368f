pub mod catalog;
mod clean;
pub mod external;
pub mod feedback;
pub mod flags;
pub mod link;
pub mod pipeline;
pub mod scheduler;
pub mod staleness;

pub use catalog::{SourceKind, SourceUnit, discover};
pub use clean::clean;
pub use feedback::FeedbackAnalyzer;
pub use flags::{BuildMode, compile_flags, link_flags};
pub use link::LinkDriver;
pub use pipeline::{BuildOptions, BuildReport, Pipeline, PipelineRun, PipelineState};
pub use scheduler::{CompileScheduler, CompileSummary, ObjectArtifact};
pub use staleness::{ContentHashPolicy, MtimePolicy, StalenessPolicy};

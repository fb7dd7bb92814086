pub mod context;
pub mod control;
pub mod results;
pub mod step;

pub use context::{RequestContext, ResponseHandle};
pub use control::PipelineResult;
pub use results::{Entry, Results, RunMeta};
pub use step::{Handler, StepContext, StepDef, StepResult};

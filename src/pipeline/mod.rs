pub mod registry;
pub mod rasterize;
pub mod extraction;
pub mod matching;
pub mod verdict;
pub mod analysis;
pub mod types;
pub mod orchestrator; // validate → rasterize → extract → compare → verdict

pub use orchestrator::{
    IdGenerator, PipelineRun, SequentialIdGenerator, Submission, SubmissionError, UuidGenerator,
    ValidationError, VerificationPipeline,
};
pub use types::{FieldComparison, UserAssertedData, VerificationResult};

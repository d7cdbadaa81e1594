//! Page and section generation.

pub mod defaults;
pub mod orchestrator;
pub mod phase;
pub mod result;
pub mod section;

pub use defaults::PageOverrides;
pub use orchestrator::{EditOutcome, GenerationSettings, PageOrchestrator, QualityOutcome};
pub use phase::PipelinePhase;
pub use result::{ContentProvenance, SectionFailure, SectionGenerationResult, SectionStatus};
pub use section::{SectionGenerator, SectionOptions};

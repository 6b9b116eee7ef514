pub mod config;
pub mod money;
pub mod pii;

pub use config::{ConfigError, FetchConfig, PipelineConfig, RecognitionConfig, RedactionConfig};
pub use money::Money;
pub use pii::{PiiCategory, PiiFindings};

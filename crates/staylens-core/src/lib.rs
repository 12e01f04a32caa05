pub mod charts;
pub mod cleaning;
pub mod error;
pub mod listings;
pub mod pipeline;
pub mod render;
pub mod sink;
pub mod stats;
pub mod summary;

pub use cleaning::{clean_listings, CleaningReport, CleaningScope, DropReason};
pub use error::{PipelineError, Result};
pub use listings::{CleanedListings, Listing};
pub use pipeline::{render_all, run, ChartArtifact, RunOptions};
pub use render::RenderSettings;
pub use sink::{FileSink, ImageSink, MemorySink, SinkError};
pub use staylens_parser::{load_listings, parse_listings, LoadOptions, LoaderError};
pub use summary::{write_summary, RunSummary};

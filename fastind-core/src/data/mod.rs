//! Bar data sources and the quality gate applied to fetched bars.

pub mod csv_source;
pub mod memory;
pub mod quality;
pub mod source;
pub mod synthetic;

pub use csv_source::{CsvSource, CsvSourceError};
pub use memory::InMemorySource;
pub use quality::BarDataQualityGate;
pub use source::{DataSource, DataSourceFactory, DataSourceRegistry, DataSourceSpec, SourceError};
pub use synthetic::SyntheticSource;

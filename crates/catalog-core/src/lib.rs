pub mod batch;
pub mod error;
pub mod models;
pub mod progress;
pub mod report;
pub mod retry;
pub mod traits;


pub use batch::{BatchConfig, BatchService};
pub use error::{AppError, FailureKind};
pub use models::{BatchOutcome, CharacteristicRow, ProductPage, ProductSummary};
pub use progress::{BatchEvent, ProgressReporter};
pub use report::BatchReport;
pub use retry::{RetryConfig, RetryingFetcher};
pub use traits::{Fetcher, PageExtractor};

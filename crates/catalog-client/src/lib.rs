pub mod extractor;
pub mod fetcher;

pub use extractor::MarkupExtractor;
pub use fetcher::{FetchConfig, ReqwestFetcher};

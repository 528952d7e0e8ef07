pub mod extractor;
pub mod fetcher;
pub mod presets;

pub use extractor::HtmlExtractor;
pub use fetcher::ReqwestFetcher;
pub use presets::{build_sources, preset};

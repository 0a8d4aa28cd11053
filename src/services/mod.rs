pub mod answer_service;
pub mod inference;
pub mod query;
pub mod search;

pub use answer_service::*;
pub use inference::*;
pub use query::*;
pub use search::{ContextRetriever, NewsApiSearch, RetrievedContext, SearchProvider, TavilySearch};

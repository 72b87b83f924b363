pub mod client;
pub mod types;

pub use client::{ApiClient, ApiError};
pub use types::{
    FieldName, MessageDetail, MessageSummary, ResultSet, SearchRequest, SearchResponse,
};

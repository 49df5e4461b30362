pub mod article;
pub mod feed;
pub mod filter;
pub mod retention;

pub use article::Article;
pub use feed::{Feed, FeedUpdate};
pub use filter::{AllowKeyword, Capabilities, FilterRule};
pub use retention::{RetentionCutoff, RetentionStats};

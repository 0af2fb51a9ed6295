mod activity_log;
mod category;
mod post;

pub use activity_log::ActivityLog;
pub use category::{Category, CategorySummary};
pub use post::{Post, PostWithCategory};

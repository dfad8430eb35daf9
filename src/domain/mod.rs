pub mod article;
pub mod category;
pub mod pulse;
pub mod session;
pub mod stats;

pub use article::Article;
pub use category::Category;
pub use pulse::{Pulse, SavedPulse, SavedRelation};
pub use session::Session;
pub use stats::{DashboardStats, StatsOrigin};

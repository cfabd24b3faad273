// Service exports
pub mod cache;
pub mod safety;
pub mod swipe;

pub use cache::{CacheError, CacheKey, CacheManager, CacheStats};
pub use safety::{SafetyServiceClient, SafetyServiceError};
pub use swipe::{SwipeServiceClient, SwipeServiceError, DEFAULT_TRUST_SCORE};

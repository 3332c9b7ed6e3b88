//! Pattern-cascade classifiers that run ahead of retrieval.
pub mod greeting;
pub mod patterns;
pub mod refusal;
pub mod topic;

pub use greeting::{detect_greeting, reply_pool, GreetingRotation};
pub use patterns::PatternSet;
pub use refusal::{classify_refusal, RefusalClassification};
pub use topic::{route_topic, TopicRoute};

pub mod dispatch;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod resolver;
pub mod tokens;

#[cfg(test)]
mod testing;

pub use dispatch::ScrobbleDispatcher;
pub use error::ScrobbleError;
pub use pipeline::ScrobblePipeline;
pub use resolver::MediaResolver;
pub use tokens::TokenLifecycleManager;

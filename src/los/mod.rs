mod cache;
mod pool;
mod worker;

pub use cache::LosCache;
pub use pool::LosPool;
pub use worker::line_of_sight;

// Content sources: the engine talks to remote article providers through this trait.

pub mod http_source;
pub mod traits;

// Engine: fetch phases, result cache, pagination and supersession.

pub mod cache;
pub mod orchestrator;
pub mod paging;
pub mod phase;
pub mod stats;
pub mod token;

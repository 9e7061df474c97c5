// Domain values shared by sources and the engine.

pub mod article;
pub mod category;

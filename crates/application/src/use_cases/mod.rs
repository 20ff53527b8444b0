pub mod dns;

pub use dns::{FollowCnamesUseCase, IterativeQueryUseCase};

mod follow_cnames;
mod iterative_query;

pub use follow_cnames::FollowCnamesUseCase;
pub use iterative_query::IterativeQueryUseCase;

mod repositories;

pub use repositories::{FileJobRepository, InMemoryJobRepository, JobRepositoryFactory};

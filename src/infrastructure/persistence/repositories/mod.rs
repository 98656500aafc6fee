mod file_job_repository;
mod in_memory_job_repository;
mod job_repository_factory;

pub use file_job_repository::FileJobRepository;
pub use in_memory_job_repository::InMemoryJobRepository;
pub use job_repository_factory::JobRepositoryFactory;

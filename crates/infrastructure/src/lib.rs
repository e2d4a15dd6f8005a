pub mod file_history;
pub mod in_memory_history;
pub mod repository_factory;

pub use file_history::FileHistoryRepository;
pub use in_memory_history::InMemoryHistoryRepository;
pub use repository_factory::HistoryRepositoryFactory;

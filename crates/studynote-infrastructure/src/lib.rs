//! Infrastructure layer for Studynote.
//!
//! Gateway transports, file-backed storage, configuration and logging setup.

pub mod bootstrap;
pub mod config_service;
pub mod gateway;
pub mod logging;
pub mod paths;
pub mod save_lock_store;
pub mod storage;
pub mod student_directory;

pub use bootstrap::EditorEnvironment;
pub use config_service::ConfigService;
pub use gateway::{HttpGateway, InMemoryGateway};
pub use logging::init_tracing;
pub use paths::StudynotePaths;
pub use save_lock_store::{FileSaveLockStore, InMemorySaveLockStore};
pub use student_directory::InMemoryStudentDirectory;

// インフラストラクチャ層モジュール
pub mod config;
pub mod logging;
pub mod record_repository;

// 再エクスポート
pub use config::{ConfigError, DynamoDbConfig, TableConfig, DEFAULT_UPDATABLE_FIELD};
pub use logging::init_logging;
pub use record_repository::{DynamoRecordRepository, RecordRepository, RepositoryError, ScanPage};

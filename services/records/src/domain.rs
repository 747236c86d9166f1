// ドメイン層モジュール
pub mod record;
pub mod record_id;
pub mod record_operation;
pub mod record_request;

// 再エクスポート
pub use record::Record;
pub use record_id::RecordId;
pub use record_operation::RecordOperation;
pub use record_request::RecordRequest;

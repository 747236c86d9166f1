// アプリケーション層モジュール
pub mod record_handler;
pub mod request_parser;
pub mod response;

// 再エクスポート
pub use record_handler::{RecordHandler, RecordHandlerError, RecordOutcome};
pub use request_parser::{ParseError, RequestParser};
pub use response::{ApiGatewayResponse, ErrorBody};

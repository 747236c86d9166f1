/// レコードアクセスハンドラー
///
/// 1回の呼び出しイベントを1回のストア操作に変換し、1つのレスポンスを返す。
/// 呼び出し間で状態を持たない。
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::application::{ApiGatewayResponse, ParseError, RequestParser};
use crate::domain::record_operation::ALLOWED_METHODS;
use crate::domain::{Record, RecordId, RecordRequest};
use crate::infrastructure::{RecordRepository, RepositoryError, TableConfig};

/// ハンドラーのエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecordHandlerError {
    /// イベントに必要な値が欠落、またはボディが不正
    #[error("malformed input: {0}")]
    MalformedInput(ParseError),

    /// 未対応のメソッド
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    /// ストアからの読み取りに失敗
    #[error("store read failure: {0}")]
    StoreReadFailure(String),

    /// ストアへの書き込みに失敗
    #[error("store write failure: {0}")]
    StoreWriteFailure(String),
}

impl From<ParseError> for RecordHandlerError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnsupportedMethod(method) => RecordHandlerError::MethodNotAllowed(method),
            other => RecordHandlerError::MalformedInput(other),
        }
    }
}

impl RecordHandlerError {
    fn store_read(err: RepositoryError) -> Self {
        RecordHandlerError::StoreReadFailure(err.to_string())
    }

    fn store_write(err: RepositoryError) -> Self {
        RecordHandlerError::StoreWriteFailure(err.to_string())
    }

    pub fn status_code(&self) -> u16 {
        match self {
            RecordHandlerError::MalformedInput(_) => 400,
            RecordHandlerError::MethodNotAllowed(_) => 405,
            RecordHandlerError::StoreReadFailure(_) | RecordHandlerError::StoreWriteFailure(_) => 500,
        }
    }

    /// レスポンスボディの`error`に入れる種別
    pub fn kind(&self) -> &'static str {
        match self {
            RecordHandlerError::MalformedInput(_) => "malformed_input",
            RecordHandlerError::MethodNotAllowed(_) => "method_not_allowed",
            RecordHandlerError::StoreReadFailure(_) => "store_read_failure",
            RecordHandlerError::StoreWriteFailure(_) => "store_write_failure",
        }
    }

    /// 呼び出し元に返すメッセージ（ストアのエラー詳細は含めない）
    pub fn client_message(&self) -> String {
        match self {
            RecordHandlerError::MalformedInput(err) => err.to_string(),
            RecordHandlerError::MethodNotAllowed(method) => {
                format!("method {} is not supported", method)
            }
            RecordHandlerError::StoreReadFailure(_) => "failed to read records".to_string(),
            RecordHandlerError::StoreWriteFailure(_) => "failed to write record".to_string(),
        }
    }

    pub fn into_response(self) -> ApiGatewayResponse {
        let response =
            ApiGatewayResponse::error(self.status_code(), self.kind(), self.client_message());
        match self {
            RecordHandlerError::MethodNotAllowed(_) => response.with_header("Allow", ALLOWED_METHODS),
            _ => response,
        }
    }
}

/// 成功した操作の結果
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Created(RecordId),
    Listed(Vec<Record>),
    Updated(RecordId),
    Deleted(RecordId),
}

impl RecordOutcome {
    /// 200レスポンスに変換
    ///
    /// 作成・更新・削除はIDのみを返す。更新後の値はボディに含めない。
    pub fn into_response(self) -> ApiGatewayResponse {
        match self {
            RecordOutcome::Created(id) | RecordOutcome::Updated(id) | RecordOutcome::Deleted(id) => {
                ApiGatewayResponse::ok(&json!({ "id": id }))
            }
            RecordOutcome::Listed(records) => {
                let items = records.into_iter().map(Record::into_value).collect();
                ApiGatewayResponse::ok(&Value::Array(items))
            }
        }
    }
}

/// レコードのCRUDを処理するハンドラー
///
/// リポジトリは起動時に構築して注入する。
pub struct RecordHandler<R>
where
    R: RecordRepository,
{
    /// レコードリポジトリ
    repository: R,
    /// テーブル設定
    config: TableConfig,
}

impl<R> RecordHandler<R>
where
    R: RecordRepository,
{
    /// 新しいRecordHandlerを作成
    pub fn new(repository: R, config: TableConfig) -> Self {
        Self { repository, config }
    }

    /// 呼び出しイベントを処理してレスポンスを返す
    ///
    /// すべての失敗は明示的なステータスコードのレスポンスに変換される。
    pub async fn handle(&self, event: &Value) -> ApiGatewayResponse {
        let http_method = event
            .get("httpMethod")
            .and_then(Value::as_str)
            .unwrap_or("unknown");

        info!(http_method = http_method, "リクエスト受信");

        let result = match RequestParser::parse(event, self.config.updatable_field()) {
            Ok(request) => {
                debug!(
                    operation = request.operation().as_str(),
                    record_id = ?request.id().map(RecordId::as_str),
                    "リクエスト検証完了"
                );
                self.execute(request).await
            }
            Err(err) => Err(RecordHandlerError::from(err)),
        };

        match result {
            Ok(outcome) => outcome.into_response(),
            Err(err) => {
                match &err {
                    RecordHandlerError::MalformedInput(_) | RecordHandlerError::MethodNotAllowed(_) => {
                        warn!(http_method = http_method, error = %err, "リクエスト不正");
                    }
                    RecordHandlerError::StoreReadFailure(_) | RecordHandlerError::StoreWriteFailure(_) => {
                        error!(
                            http_method = http_method,
                            table = self.config.table_name(),
                            error = %err,
                            "ストア操作失敗"
                        );
                    }
                }
                err.into_response()
            }
        }
    }

    /// 検証済みリクエストを実行
    ///
    /// ストアへの操作はちょうど1回だけ発行する。
    pub async fn execute(&self, request: RecordRequest) -> Result<RecordOutcome, RecordHandlerError> {
        match request {
            RecordRequest::Create { fields } => {
                let id = RecordId::generate();
                let record = Record::with_primary_key(fields, self.config.primary_key(), &id);

                self.repository
                    .put(&record)
                    .await
                    .map_err(RecordHandlerError::store_write)?;

                info!(record_id = %id, "レコード作成");
                Ok(RecordOutcome::Created(id))
            }
            RecordRequest::Read => {
                let page = self
                    .repository
                    .scan()
                    .await
                    .map_err(RecordHandlerError::store_read)?;

                if page.truncated {
                    // 続きのページは取得しない
                    warn!(
                        table = self.config.table_name(),
                        returned = page.records.len(),
                        "スキャン結果が1ページに収まらず、先頭ページのみ返却"
                    );
                }

                info!(count = page.records.len(), "レコード一覧取得");
                Ok(RecordOutcome::Listed(page.records))
            }
            RecordRequest::Update { id, field, value } => {
                let updated = self
                    .repository
                    .update_field(&id, &field, &value)
                    .await
                    .map_err(RecordHandlerError::store_write)?;

                debug!(record_id = %id, field = %field, updated = ?updated, "更新後の値");
                info!(record_id = %id, field = %field, "レコード更新");
                Ok(RecordOutcome::Updated(id))
            }
            RecordRequest::Delete { id } => {
                self.repository
                    .delete(&id)
                    .await
                    .map_err(RecordHandlerError::store_write)?;

                info!(record_id = %id, "レコード削除");
                Ok(RecordOutcome::Deleted(id))
            }
        }
    }
}

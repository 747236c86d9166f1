/// DynamoDBテーブルのレコードを操作するためのレコードリポジトリ
///
/// 各操作はDynamoDBへのリクエストを1回だけ発行する。
/// リトライ、存在確認、楽観ロックは行わない。
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;
use thiserror::Error;

use crate::domain::{Record, RecordId};
use crate::infrastructure::TableConfig;

/// UpdateItemで使用する更新式
const UPDATE_EXPRESSION: &str = "SET #field = :value";

/// リポジトリ操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepositoryError {
    /// DynamoDBへの書き込みに失敗
    #[error("Write error: {0}")]
    WriteError(String),

    /// DynamoDBからの読み取りに失敗
    #[error("Read error: {0}")]
    ReadError(String),

    /// レコードとAttributeValueの変換に失敗
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// 1回のスキャンで取得したレコード
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanPage {
    /// 取得順のレコード
    pub records: Vec<Record>,
    /// 続きのページが存在する（LastEvaluatedKeyあり）
    pub truncated: bool,
}

/// レコード永続化用トレイト
///
/// 実際のDynamoDBとテスト用モックを差し替えられるように抽象化する。
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// レコードを無条件に書き込む（同じキーが存在すれば上書き）
    async fn put(&self, record: &Record) -> Result<(), RepositoryError>;

    /// テーブルを1ページ分スキャンする
    ///
    /// 続きのページは取得しない。`ScanPage::truncated`で打ち切りを通知する。
    async fn scan(&self) -> Result<ScanPage, RepositoryError>;

    /// 主キーでレコードを削除する
    ///
    /// 存在しないキーの削除も成功として扱う。
    async fn delete(&self, id: &RecordId) -> Result<(), RepositoryError>;

    /// 単一フィールドを書き換え、更新後の値を返す
    ///
    /// # 戻り値
    /// * `Ok(Some(Record))` - 更新された属性のみを含むレコード
    /// * `Ok(None)` - ストアが値を返さなかった
    /// * `Err(RepositoryError)` - 書き込み失敗
    async fn update_field(
        &self,
        id: &RecordId,
        field: &str,
        value: &Value,
    ) -> Result<Option<Record>, RepositoryError>;
}

/// RecordRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoRecordRepository {
    /// DynamoDBクライアント
    client: DynamoDbClient,
    /// テーブル名
    table_name: String,
    /// 主キー属性名
    primary_key: String,
}

impl DynamoRecordRepository {
    /// 新しいDynamoRecordRepositoryを作成
    ///
    /// # 引数
    /// * `client` - DynamoDBクライアント（プロセス内で共有）
    /// * `table` - テーブル名と主キー属性名
    pub fn new(client: DynamoDbClient, table: &TableConfig) -> Self {
        Self {
            client,
            table_name: table.table_name().to_string(),
            primary_key: table.primary_key().to_string(),
        }
    }

    /// 主キー属性のみを持つKeyを作成
    fn key(&self, id: &RecordId) -> (String, AttributeValue) {
        (self.primary_key.clone(), AttributeValue::S(id.as_str().to_string()))
    }

    fn to_item(record: &Record) -> Result<HashMap<String, AttributeValue>, RepositoryError> {
        serde_dynamo::to_item(record).map_err(|e| RepositoryError::SerializationError(e.to_string()))
    }

    /// AttributeValueのマップをレコードに変換
    ///
    /// JSONにバイナリ型はないため、B/BSはBase64文字列として返す。
    fn from_item(item: HashMap<String, AttributeValue>) -> Result<Record, RepositoryError> {
        let item: HashMap<String, AttributeValue> = item
            .into_iter()
            .map(|(name, value)| (name, binary_as_base64(value)))
            .collect();

        serde_dynamo::from_item(item).map_err(|e| RepositoryError::SerializationError(e.to_string()))
    }
}

/// バイナリ属性をBase64文字列に置き換える（L/Mの内側も対象）
fn binary_as_base64(value: AttributeValue) -> AttributeValue {
    match value {
        AttributeValue::B(blob) => AttributeValue::S(BASE64.encode(blob.as_ref())),
        AttributeValue::Bs(blobs) => {
            AttributeValue::Ss(blobs.iter().map(|blob| BASE64.encode(blob.as_ref())).collect())
        }
        AttributeValue::L(values) => {
            AttributeValue::L(values.into_iter().map(binary_as_base64).collect())
        }
        AttributeValue::M(map) => AttributeValue::M(
            map.into_iter()
                .map(|(name, value)| (name, binary_as_base64(value)))
                .collect(),
        ),
        other => other,
    }
}

#[async_trait]
impl RecordRepository for DynamoRecordRepository {
    async fn put(&self, record: &Record) -> Result<(), RepositoryError> {
        let item = Self::to_item(record)?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(e.into_service_error().to_string()))?;

        Ok(())
    }

    async fn scan(&self) -> Result<ScanPage, RepositoryError> {
        let result = self
            .client
            .scan()
            .table_name(&self.table_name)
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(e.into_service_error().to_string()))?;

        let truncated = result
            .last_evaluated_key
            .as_ref()
            .is_some_and(|key| !key.is_empty());

        // 変換できない項目があれば読み取り失敗とする（一部だけ返さない）
        let records = result
            .items
            .unwrap_or_default()
            .into_iter()
            .map(Self::from_item)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ScanPage { records, truncated })
    }

    async fn delete(&self, id: &RecordId) -> Result<(), RepositoryError> {
        let (key_name, key_value) = self.key(id);

        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(key_name, key_value)
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(e.into_service_error().to_string()))?;

        Ok(())
    }

    async fn update_field(
        &self,
        id: &RecordId,
        field: &str,
        value: &Value,
    ) -> Result<Option<Record>, RepositoryError> {
        let (key_name, key_value) = self.key(id);
        let value: AttributeValue = serde_dynamo::to_attribute_value(value)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(key_name, key_value)
            .update_expression(UPDATE_EXPRESSION)
            .expression_attribute_names("#field", field)
            .expression_attribute_values(":value", value)
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(e.into_service_error().to_string()))?;

        result.attributes.map(Self::from_item).transpose()
    }
}

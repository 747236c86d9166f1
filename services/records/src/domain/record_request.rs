/// 検証済みのリクエスト
///
/// 呼び出しイベントは境界で一度だけパースされ、操作ごとの型付きバリアントになる。
use serde_json::{Map, Value};

use super::{RecordId, RecordOperation};

/// 1回の呼び出しで実行するレコード操作
#[derive(Debug, Clone, PartialEq)]
pub enum RecordRequest {
    /// 新規作成（主キーは含まない）
    Create { fields: Map<String, Value> },

    /// 全件取得
    Read,

    /// 単一フィールドの部分更新
    Update {
        id: RecordId,
        field: String,
        value: Value,
    },

    /// 削除
    Delete { id: RecordId },
}

impl RecordRequest {
    pub fn operation(&self) -> RecordOperation {
        match self {
            RecordRequest::Create { .. } => RecordOperation::Create,
            RecordRequest::Read => RecordOperation::Read,
            RecordRequest::Update { .. } => RecordOperation::Update,
            RecordRequest::Delete { .. } => RecordOperation::Delete,
        }
    }

    /// 対象レコードのID（作成と全件取得では`None`）
    pub fn id(&self) -> Option<&RecordId> {
        match self {
            RecordRequest::Update { id, .. } | RecordRequest::Delete { id } => Some(id),
            RecordRequest::Create { .. } | RecordRequest::Read => None,
        }
    }
}

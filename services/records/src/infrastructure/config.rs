/// テーブル設定とDynamoDB接続設定
///
/// プロビジョニング側が環境変数で渡す値をプロセス起動時に一度だけ読み込む。
use aws_sdk_dynamodb::Client as DynamoDbClient;
use thiserror::Error;

/// UPDATABLE_FIELD未設定時に更新対象とするフィールド
pub const DEFAULT_UPDATABLE_FIELD: &str = "name";

/// 設定読み込みのエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Empty environment variable: {0}")]
    EmptyEnvVar(String),

    /// 主キーは更新対象にできない
    #[error("Updatable field must differ from primary key: {0}")]
    UpdatableFieldIsPrimaryKey(String),
}

/// 操作対象テーブルの設定
///
/// 環境変数:
/// - TABLE_NAME: DynamoDBテーブル名（必須）
/// - PRIMARY_KEY: 主キー属性名（必須）
/// - UPDATABLE_FIELD: PUTで書き換えるフィールド名（省略時は`name`）
#[derive(Debug, Clone, PartialEq)]
pub struct TableConfig {
    table_name: String,
    primary_key: String,
    updatable_field: String,
}

impl TableConfig {
    /// 環境変数からテーブル設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        let table_name = required_env("TABLE_NAME")?;
        let primary_key = required_env("PRIMARY_KEY")?;

        let updatable_field = match std::env::var("UPDATABLE_FIELD") {
            Ok(value) if !value.trim().is_empty() => value,
            _ => DEFAULT_UPDATABLE_FIELD.to_string(),
        };

        Self {
            table_name,
            primary_key,
            updatable_field: DEFAULT_UPDATABLE_FIELD.to_string(),
        }
        .with_updatable_field(updatable_field)
    }

    /// 明示的な値でテーブル設定を作成（更新対象はデフォルト）
    pub fn new(table_name: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            primary_key: primary_key.into(),
            updatable_field: DEFAULT_UPDATABLE_FIELD.to_string(),
        }
    }

    /// 更新対象フィールドを差し替える
    ///
    /// 主キーと同名のフィールドはエラー（PUTで主キーを書き換えられるため）。
    pub fn with_updatable_field(mut self, field: impl Into<String>) -> Result<Self, ConfigError> {
        let field = field.into();
        if field == self.primary_key {
            return Err(ConfigError::UpdatableFieldIsPrimaryKey(field));
        }
        self.updatable_field = field;
        Ok(self)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn updatable_field(&self) -> &str {
        &self.updatable_field
    }
}

/// 必須の環境変数を読み込む（空文字列はエラー）
fn required_env(name: &str) -> Result<String, ConfigError> {
    let value = std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyEnvVar(name.to_string()));
    }
    Ok(value)
}

/// DynamoDBクライアントとテーブル設定
///
/// クライアントはプロセス起動時に一度だけ作成し、全呼び出しで共有する。
#[derive(Debug, Clone)]
pub struct DynamoDbConfig {
    /// DynamoDBクライアントインスタンス
    client: DynamoDbClient,
    /// テーブル設定
    table: TableConfig,
}

impl DynamoDbConfig {
    /// 環境からAWS設定とテーブル設定を読み込む
    ///
    /// AWS認証情報とリージョンはaws-configのデフォルトチェーンで解決する。
    pub async fn from_env() -> Result<Self, ConfigError> {
        // テーブル設定が不正なら、AWS設定の読み込みより先に失敗させる
        let table = TableConfig::from_env()?;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = DynamoDbClient::new(&aws_config);

        Ok(Self { client, table })
    }

    /// 明示的な値で作成（テスト用）
    pub fn new(client: DynamoDbClient, table: TableConfig) -> Self {
        Self { client, table }
    }

    pub fn client(&self) -> &DynamoDbClient {
        &self.client
    }

    pub fn table(&self) -> &TableConfig {
        &self.table
    }
}

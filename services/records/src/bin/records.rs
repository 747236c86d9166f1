/// レコードCRUD Lambdaエントリポイント
///
/// API Gatewayプロキシ統合のイベントを受け取り、DynamoDBテーブルに対して
/// 作成・取得・更新・削除のいずれか1操作を実行する。
/// Lambda関数としても、ローカルスクリプトとしても実行可能。
///
/// # 環境変数
/// - TABLE_NAME: DynamoDBテーブル名（必須）
/// - PRIMARY_KEY: 主キー属性名（必須）
/// - UPDATABLE_FIELD: PUTで書き換えるフィールド名（デフォルト: name）
///
/// # ローカル実行
/// ```bash
/// export TABLE_NAME=table-test1231234
/// export PRIMARY_KEY=id
///
/// # ファイルからイベントを読み込む
/// cargo run --bin records -- --event event.json
///
/// # 標準入力から読み込む
/// echo '{"httpMethod":"GET"}' | cargo run --bin records
/// ```
use std::io::Read;
use std::sync::Arc;

use clap::Parser;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use records::application::{ApiGatewayResponse, RecordHandler};
use records::infrastructure::{init_logging, DynamoDbConfig, DynamoRecordRepository, RecordRepository};
use serde_json::Value;
use tracing::{error, info, info_span, Instrument};

/// コマンドライン引数（ローカル実行用）
#[derive(Parser, Debug)]
#[command(name = "records")]
#[command(about = "API Gatewayイベントを1件処理してレスポンスを出力")]
struct CliArgs {
    /// イベントJSONファイルのパス（"-"は標準入力）
    #[arg(long, short = 'e', default_value = "-")]
    event: String,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    // 設定とDynamoDBクライアントは起動時に一度だけ作成し、全呼び出しで共有する
    let config = DynamoDbConfig::from_env().await.map_err(|e| {
        error!(error = %e, "設定読み込み失敗");
        e
    })?;

    info!(
        table = config.table().table_name(),
        primary_key = config.table().primary_key(),
        updatable_field = config.table().updatable_field(),
        "設定読み込み完了"
    );

    let repository = DynamoRecordRepository::new(config.client().clone(), config.table());
    let handler = Arc::new(RecordHandler::new(repository, config.table().clone()));

    if std::env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok() {
        info!("Lambda関数として起動");
        lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
            let handler = Arc::clone(&handler);
            async move { invoke(&handler, event).await }
        }))
        .await?;
    } else {
        info!("ローカルスクリプトとして起動");
        run_local(&handler).await?;
    }

    Ok(())
}

/// Lambda関数のメインハンドラー
///
/// 失敗はすべてステータスコード付きのレスポンスとして返すため、
/// ランタイムにエラーを返すことはない。
async fn invoke<R: RecordRepository>(
    handler: &RecordHandler<R>,
    event: LambdaEvent<Value>,
) -> Result<ApiGatewayResponse, Error> {
    let span = info_span!("invocation", request_id = %event.context.request_id);
    let response = handler.handle(&event.payload).instrument(span.clone()).await;

    span.in_scope(|| info!(status_code = response.status_code, "レスポンス送信"));

    Ok(response)
}

/// ローカル実行用関数
async fn run_local<R: RecordRepository>(handler: &RecordHandler<R>) -> Result<(), Error> {
    let args = CliArgs::parse();

    let raw = if args.event == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(&args.event).map_err(|e| {
            error!(error = %e, path = %args.event, "イベントファイルの読み込みに失敗");
            e
        })?
    };

    let event: Value = serde_json::from_str(&raw).map_err(|e| {
        error!(error = %e, "イベントのJSONパースに失敗");
        Error::from(format!("Invalid event JSON: {}", e))
    })?;

    let response = handler.handle(&event).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}

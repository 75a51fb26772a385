// ==========================================
// 化工设备报表系统 - 命令行入口
// ==========================================
// 子命令: upload / summary / history / data / report / delete / release-user / config / init-db
// 输出: 查询结果以 JSON 写到 stdout，日志写到 stderr
// 身份: --user 显式指定，不做认证
// ==========================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use equipment_report::api::{ApiError, EquipmentApi};
use equipment_report::app::AppState;
use equipment_report::config::AppConfig;
use equipment_report::domain::{Requester, UploadFile};
use equipment_report::logging;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// 化工设备 CSV 上传与报表工具
#[derive(Parser, Debug)]
#[command(name = "equipment-report", version, about = "Chemical equipment CSV upload and reporting")]
struct Cli {
    /// SQLite 数据库路径（默认取 EQUIPMENT_REPORT_DB_PATH 或用户数据目录）
    #[arg(long = "db", global = true)]
    db: Option<String>,

    /// 以 JSON 格式输出日志
    #[arg(long = "log-json", global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 上传 CSV 文件，创建批次
    Upload {
        /// 请求者
        #[arg(long)]
        user: String,
        /// CSV 文件路径
        file: PathBuf,
    },

    /// 批次汇总统计
    Summary {
        #[arg(long)]
        user: String,
        batch_id: String,
    },

    /// 最近的上传批次
    History {
        #[arg(long)]
        user: String,
    },

    /// 批次全部记录
    Data {
        #[arg(long)]
        user: String,
        batch_id: String,
    },

    /// 生成 PDF 报表
    Report {
        #[arg(long)]
        user: String,
        batch_id: String,
        /// 输出文件（默认 report_<批次ID>.pdf）
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// 删除自己的批次
    Delete {
        #[arg(long)]
        user: String,
        batch_id: String,
    },

    /// 移除用户（批次保留，解除归属）
    ReleaseUser { user: String },

    /// 查看或修改运行期配置
    Config {
        /// 配置键（不填则列出全部）
        key: Option<String>,
        /// 新值（不填则只读取）
        value: Option<String>,
    },

    /// 初始化数据库
    InitDb,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    let config = AppConfig::load().with_db_path(cli.db);
    tracing::info!(
        version = equipment_report::VERSION,
        db_path = %config.db_path,
        "{}",
        equipment_report::APP_NAME
    );

    let state = AppState::new(config.db_path.clone())
        .map_err(anyhow::Error::msg)
        .context("应用初始化失败")?;
    let api = state.equipment_api.clone();

    match cli.command {
        Commands::Upload { user, file } => {
            let content = std::fs::read(&file)
                .with_context(|| format!("无法读取文件: {}", file.display()))?;
            let upload = UploadFile::new(file.to_string_lossy(), content);
            let resp = api
                .upload(upload, &Requester::named(user))
                .await
                .map_err(api_error)?;
            print_json(&resp)?;
        }

        Commands::Summary { user, batch_id } => {
            let summary = api
                .summary(&batch_id, &Requester::named(user))
                .await
                .map_err(api_error)?;
            print_json(&summary)?;
        }

        Commands::History { user } => {
            let history = api
                .history(&Requester::named(user))
                .await
                .map_err(api_error)?;
            print_json(&history)?;
        }

        Commands::Data { user, batch_id } => {
            let records = api
                .data(&batch_id, &Requester::named(user))
                .await
                .map_err(api_error)?;
            print_json(&records)?;
        }

        Commands::Report { user, batch_id, out } => {
            write_report(&api, &batch_id, &Requester::named(user), out).await?;
        }

        Commands::Delete { user, batch_id } => {
            let records = api
                .delete_upload(&batch_id, &Requester::named(user))
                .await
                .map_err(api_error)?;
            print_json(&serde_json::json!({ "deleted": batch_id, "records": records }))?;
        }

        Commands::ReleaseUser { user } => {
            let released = api.release_user(&user).await.map_err(api_error)?;
            print_json(&serde_json::json!({ "user": user, "released": released }))?;
        }

        Commands::Config { key, value } => match (key, value) {
            (Some(key), Some(value)) => {
                state
                    .config_manager
                    .set_config_value(&key, &value)
                    .map_err(|e| anyhow::anyhow!("{}", e))?;
                print_json(&BTreeMap::from([(key, Some(value))]))?;
            }
            (Some(key), None) => {
                let value = state
                    .config_manager
                    .get_config_value(&key)
                    .map_err(|e| anyhow::anyhow!("{}", e))?;
                print_json(&BTreeMap::from([(key, value)]))?;
            }
            (None, _) => {
                let all = state
                    .config_manager
                    .list_config()
                    .map_err(|e| anyhow::anyhow!("{}", e))?;
                print_json(&all)?;
            }
        },

        Commands::InitDb => {
            // AppState::new 已完成建表
            print_json(&serde_json::json!({
                "db_path": state.db_path,
                "schema_version": state.schema_version,
            }))?;
        }
    }

    Ok(())
}

async fn write_report(
    api: &EquipmentApi,
    batch_id: &str,
    requester: &Requester,
    out: Option<PathBuf>,
) -> Result<()> {
    // 默认文件名已去除路径字符，始终落在当前目录
    let path = out.unwrap_or_else(|| PathBuf::from(api.report_file_name(batch_id)));
    let file = File::create(&path)
        .with_context(|| format!("无法创建报表文件: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let rendered = api
        .report(batch_id, requester, &mut writer)
        .await
        .map_err(api_error)?;
    writer.flush()?;

    print_json(&serde_json::json!({
        "path": path.display().to_string(),
        "file_name": rendered.file_name,
        "content_type": rendered.content_type,
        "found": rendered.found,
    }))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)?;
    Ok(())
}

fn api_error(err: ApiError) -> anyhow::Error {
    anyhow::anyhow!("[{}] {}", err.status_code(), err)
}

use anyhow::{anyhow, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use terabox_direct_link::{config::Config, terabox, web};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志（输出到 stderr，stdout 只留 JSON 结果）
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "terabox_direct_link=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // 用法：terabox-direct-link <share_url> [config_path]
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        return Err(anyhow!(
            "用法: {} <share_url> [config_path]",
            args.first()
                .map(|s| s.as_str())
                .unwrap_or("terabox-direct-link")
        ));
    }

    let share_url = &args[1];
    let config_path = std::env::var("CONFIG_PATH")
        .ok()
        .or_else(|| args.get(2).cloned())
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path)?;
    if !config.has_cookie() {
        return Err(anyhow!(
            "未配置 TERABOX_COOKIE，请设置环境变量或在 config.toml 中填写 [terabox] cookie"
        ));
    }

    match terabox::resolve_share_link(&config.terabox, share_url, &config.terabox.cookie).await {
        Ok(files) => {
            tracing::info!("✅ 解析成功: {} 个文件", files.len());
            println!("{}", serde_json::to_string_pretty(&files)?);
            Ok(())
        }
        Err(failure) => {
            let detail = web::failure_detail(config.web.diagnostics, &failure);
            eprintln!("{}", serde_json::to_string_pretty(&detail)?);
            Err(failure.into())
        }
    }
}

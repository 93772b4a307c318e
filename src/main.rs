use anyhow::Result;
use pdf_to_excel_batch::utils::logging;
use pdf_to_excel_batch::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let report = App::initialize(config)?.run().await?;

    if report.summary.completed < report.summary.total() {
        std::process::exit(1);
    }
    Ok(())
}

use clap::Parser;
use screen_wiring::utils::logger;
use screen_wiring::{build_screen_as, AppError, CliConfig, Screen, ScreenReport, Variant};

async fn run_screen(screen: &dyn Screen) -> ScreenReport {
    // 對應畫面的 load / appear 生命週期
    let load = screen.load().await;
    let appear = screen.appear().await;
    ScreenReport::collect(screen, load, appear)
}

async fn run(cli: &CliConfig) -> Result<(), AppError> {
    let config = cli.to_app_config()?;

    let variants: Vec<Variant> = if cli.all {
        Variant::ALL.to_vec()
    } else {
        vec![config.variant()]
    };

    let mut reports = Vec::with_capacity(variants.len());
    for variant in variants {
        tracing::info!("🚀 Running {} screen '{}'", variant, config.screen.name);
        let screen = build_screen_as(&config, variant)?;
        reports.push(run_screen(screen.as_ref()).await);
    }

    if cli.all {
        println!("{}", ScreenReport::to_json(&reports)?);
    }

    let failed = reports.iter().filter(|r| r.is_error()).count();
    if failed > 0 {
        tracing::warn!("⚠️ {} screen(s) ended in an error state", failed);
    }
    reports.iter().try_for_each(ScreenReport::check)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    match run(&cli).await {
        Ok(()) => {
            tracing::info!("✅ Done");
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ {}", e);
            eprintln!("❌ {}", e);
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}

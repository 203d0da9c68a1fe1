pub mod toml_config;

pub use toml_config::AppConfig;

#[cfg(feature = "cli")]
use crate::adapters::surface::SurfaceKind;
#[cfg(feature = "cli")]
use crate::core::{guard::BusyPolicy, screen::Variant, viper::MergePolicy};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "screen-wiring")]
#[command(about = "Wire a view, a data source and a mediator as MVC, MVP, MVVM or VIPER")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Architecture variant (mvc, mvp, mvvm, viper)
    #[arg(long)]
    pub variant: Option<Variant>,

    /// HTTP endpoint for the network data source
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Base directory of the local store data source
    #[arg(long)]
    pub store_path: Option<String>,

    #[arg(long, default_value = "payload.json")]
    pub store_key: String,

    /// Parse payloads as JSON and display the value at this pointer
    #[arg(long)]
    pub json_pointer: Option<String>,

    /// What to do when a trigger arrives while a request is in flight (reject, coalesce)
    #[arg(long)]
    pub busy_policy: Option<BusyPolicy>,

    /// VIPER merge policy for refreshes (first_completed, sequence, fallback)
    #[arg(long)]
    pub merge_policy: Option<MergePolicy>,

    #[arg(long, help = "Run every variant against the same sources and print a JSON report")]
    pub all: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 以 TOML 為基礎，命令列參數覆蓋
    pub fn to_app_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                AppConfig::from_file(path)?
            }
            None => AppConfig::default(),
        };

        if let Some(variant) = self.variant {
            config.screen.variant = variant;
        }
        if let Some(policy) = self.busy_policy {
            config.screen.busy_policy = policy;
        }
        if let Some(endpoint) = &self.endpoint {
            let network = config
                .network
                .get_or_insert_with(|| toml_config::NetworkConfig {
                    endpoint: String::new(),
                    method: None,
                    timeout_seconds: None,
                    headers: None,
                });
            network.endpoint = endpoint.clone();
        }
        if let Some(base_path) = &self.store_path {
            config.store = Some(toml_config::StoreConfig {
                base_path: base_path.clone(),
                key: self.store_key.clone(),
            });
        }
        if let Some(pointer) = &self.json_pointer {
            config.parser = toml_config::ParserConfig {
                kind: toml_config::ParserKind::Json,
                text: None,
                pointer: Some(pointer.clone()),
            };
        }
        if let Some(policy) = self.merge_policy {
            config.viper.get_or_insert_with(Default::default).merge_policy = policy;
        }
        // --all 的 JSON 報告獨佔 stdout
        if self.all && config.screen.surface.writes_stdout() {
            config.screen.surface = SurfaceKind::Tracing;
        }

        Ok(config)
    }
}

use crate::adapters::{HttpSource, LocalStoreSource, StubSource};
use crate::config::toml_config::{AppConfig, NetworkConfig, ParserConfig, ParserKind};
use crate::core::guard::BusyPolicy;
use crate::core::mvc::Controller;
use crate::core::mvp::MvpScreen;
use crate::core::mvvm::MvvmScreen;
use crate::core::parse::{ConstantParser, JsonFieldParser, TextParser};
use crate::core::screen::{Screen, Variant};
use crate::core::view::ScreenView;
use crate::core::viper::{Interactor, MergePolicy, Router, ViperScreen};
use crate::domain::model::SourceKind;
use crate::domain::ports::{DataSource, PayloadParser, RenderSurface};
use crate::utils::error::{AppError, Result};
use crate::utils::validation::Validate;
use reqwest::Method;
use std::sync::Arc;

/// 一個畫面所需的兩個資料來源
pub struct Sources {
    pub network: Box<dyn DataSource>,
    pub store: Box<dyn DataSource>,
}

impl Sources {
    /// 原始範例的行為：兩者都是回傳空資料的 stub
    pub fn stubs() -> Self {
        Self {
            network: Box::new(StubSource::new("network").with_kind(SourceKind::Network)),
            store: Box::new(StubSource::new("local_store").with_kind(SourceKind::LocalStore)),
        }
    }
}

/// 組裝參數，與設定檔格式無關
pub struct Wiring {
    pub name: String,
    pub variant: Variant,
    pub parser: Arc<dyn PayloadParser>,
    pub busy_policy: BusyPolicy,
    pub merge_policy: MergePolicy,
}

pub fn build_network(config: &NetworkConfig) -> Result<Box<dyn DataSource>> {
    let method = Method::from_bytes(config.method().to_ascii_uppercase().as_bytes()).map_err(
        |e| AppError::InvalidConfigValueError {
            field: "network.method".to_string(),
            value: config.method().to_string(),
            reason: e.to_string(),
        },
    )?;
    let source = HttpSource::with_options(
        config.endpoint.clone(),
        method,
        config.headers.clone().unwrap_or_default(),
        config.timeout(),
    )?;
    Ok(Box::new(source))
}

pub fn build_sources(config: &AppConfig) -> Result<Sources> {
    let stubs = Sources::stubs();

    let network = match &config.network {
        Some(network) => build_network(network)?,
        None => {
            tracing::debug!("No [network] section, using stub network source");
            stubs.network
        }
    };

    let store: Box<dyn DataSource> = match &config.store {
        Some(store) => Box::new(LocalStoreSource::new(&store.base_path, &store.key)),
        None => {
            tracing::debug!("No [store] section, using stub local store");
            stubs.store
        }
    };

    Ok(Sources { network, store })
}

pub fn build_parser(config: &ParserConfig) -> Result<Arc<dyn PayloadParser>> {
    let parser: Arc<dyn PayloadParser> = match config.kind {
        ParserKind::Constant => match &config.text {
            Some(text) => Arc::new(ConstantParser::new(text.clone())),
            None => Arc::new(ConstantParser::default()),
        },
        ParserKind::Text => Arc::new(TextParser),
        ParserKind::Json => {
            let pointer = config
                .pointer
                .clone()
                .ok_or_else(|| AppError::MissingConfigError {
                    field: "parser.pointer".to_string(),
                })?;
            Arc::new(JsonFieldParser::new(pointer))
        }
    };
    Ok(parser)
}

impl Wiring {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            name: config.screen.name.clone(),
            variant: config.variant(),
            parser: build_parser(&config.parser)?,
            busy_policy: config.screen.busy_policy,
            merge_policy: config.merge_policy(),
        })
    }
}

/// 依照架構把 view、mediator 與資料來源接起來
pub fn assemble(wiring: &Wiring, sources: Sources, surface: Box<dyn RenderSurface>) -> Arc<dyn Screen> {
    let view = Arc::new(ScreenView::new(
        format!("{}:{}", wiring.name, wiring.variant),
        surface,
    ));
    let parser = wiring.parser.clone();
    let policy = wiring.busy_policy;

    tracing::debug!(
        "Assembling {} screen '{}' (busy policy: {})",
        wiring.variant,
        wiring.name,
        policy
    );

    match wiring.variant {
        Variant::Mvc => Controller::assemble(view, sources.network, parser, policy),
        Variant::Mvp => MvpScreen::assemble(view, sources.network, parser, policy),
        Variant::Mvvm => Arc::new(MvvmScreen::assemble(view, sources.network, parser, policy)),
        Variant::Viper => {
            let interactor = Interactor::new(sources.network, sources.store);
            let router = Router::new(wiring.merge_policy);
            Arc::new(ViperScreen::assemble(view, interactor, router, parser, policy))
        }
    }
}

/// 驗證設定並組出畫面
pub fn build_screen(config: &AppConfig) -> Result<Arc<dyn Screen>> {
    config.validate()?;
    let wiring = Wiring::from_config(config)?;
    let sources = build_sources(config)?;
    Ok(assemble(&wiring, sources, config.screen.surface.build()))
}

/// 同一份設定、換成指定的架構
pub fn build_screen_as(config: &AppConfig, variant: Variant) -> Result<Arc<dyn Screen>> {
    let mut config = config.clone();
    config.screen.variant = variant;
    build_screen(&config)
}

use crate::core::view::{ScreenView, ViewState};
use crate::domain::model::TriggerOutcome;
use crate::utils::error::{self, AppError, ScreenError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Mvc,
    Mvp,
    Mvvm,
    Viper,
}

impl Variant {
    pub const ALL: [Variant; 4] = [Variant::Mvc, Variant::Mvp, Variant::Mvvm, Variant::Viper];
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mvc" => Ok(Variant::Mvc),
            "mvp" => Ok(Variant::Mvp),
            "mvvm" => Ok(Variant::Mvvm),
            "viper" => Ok(Variant::Viper),
            other => Err(format!(
                "unknown variant '{}', expected mvc, mvp, mvvm or viper",
                other
            )),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Variant::Mvc => "mvc",
            Variant::Mvp => "mvp",
            Variant::Mvvm => "mvvm",
            Variant::Viper => "viper",
        };
        f.write_str(name)
    }
}

/// 一個畫面：擁有 view 與 mediator
#[async_trait]
pub trait Screen: Send + Sync {
    fn variant(&self) -> Variant;

    fn view(&self) -> &Arc<ScreenView>;

    /// 畫面載入時由 view 發出資料請求
    async fn load(&self) -> TriggerOutcome {
        self.view().request_data().await
    }

    /// 畫面顯示後的額外請求；只有 VIPER 會用到
    async fn appear(&self) -> Option<TriggerOutcome> {
        None
    }
}

/// 畫面執行後的摘要，用於 CLI 輸出
#[derive(Debug, Clone, Serialize)]
pub struct ScreenReport {
    pub variant: Variant,
    pub screen: String,
    pub load: TriggerOutcome,
    pub appear: Option<TriggerOutcome>,
    pub value: Option<String>,
    pub error: Option<String>,
    pub renders: usize,
    pub last_rendered_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    failure: Option<ScreenError>,
}

impl ScreenReport {
    pub fn collect(
        screen: &dyn Screen,
        load: TriggerOutcome,
        appear: Option<TriggerOutcome>,
    ) -> Self {
        let view = screen.view();
        let (value, failure) = match view.state() {
            ViewState::Empty => (None, None),
            ViewState::Showing(value) => (Some(value.into_inner()), None),
            ViewState::Failed(error) => (None, Some(error)),
        };

        Self {
            variant: screen.variant(),
            screen: view.name().to_string(),
            load,
            appear,
            value,
            error: failure.as_ref().map(ToString::to_string),
            renders: view.render_count(),
            last_rendered_at: view.history().last().map(|r| r.at),
            failure,
        }
    }

    /// 畫面停在錯誤狀態時回傳對應的 `AppError::Screen`
    pub fn check(&self) -> error::Result<()> {
        match &self.failure {
            Some(error) => Err(AppError::Screen(error.clone())),
            None => Ok(()),
        }
    }

    pub fn to_json(reports: &[ScreenReport]) -> error::Result<String> {
        Ok(serde_json::to_string_pretty(reports)?)
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

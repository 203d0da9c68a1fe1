use crate::domain::model::{DisplayValue, TriggerOutcome};
use crate::domain::ports::{DataDisplayable, RenderSurface, Triggerable};
use crate::utils::error::ScreenError;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Empty,
    Showing(DisplayValue),
    Failed(ScreenError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Data(DisplayValue),
    Error(ScreenError),
}

/// 一次渲染紀錄
#[derive(Debug, Clone)]
pub struct Rendered {
    pub at: DateTime<Utc>,
    pub frame: Frame,
}

/// View：只知道 trigger 與 display 兩個介面
pub struct ScreenView {
    name: String,
    trigger: Mutex<Option<Weak<dyn Triggerable>>>,
    state: Mutex<ViewState>,
    history: Mutex<Vec<Rendered>>,
    surface: Box<dyn RenderSurface>,
}

impl ScreenView {
    pub fn new(name: impl Into<String>, surface: Box<dyn RenderSurface>) -> Self {
        Self {
            name: name.into(),
            trigger: Mutex::new(None),
            state: Mutex::new(ViewState::Empty),
            history: Mutex::new(Vec::new()),
            surface,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 登記 trigger handler，後登記者覆蓋前者；只保留 weak 參照
    pub fn set_trigger<T: Triggerable + 'static>(&self, handler: &Arc<T>) {
        let weak = Arc::downgrade(handler) as Weak<dyn Triggerable>;
        *self.trigger.lock() = Some(weak);
    }

    pub fn clear_trigger(&self) {
        *self.trigger.lock() = None;
    }

    pub fn has_trigger(&self) -> bool {
        self.trigger.lock().is_some()
    }

    pub async fn request_data(&self) -> TriggerOutcome {
        let registered = self.trigger.lock().clone();
        let Some(weak) = registered else {
            tracing::debug!("{}: no trigger handler registered, ignoring request", self.name);
            return TriggerOutcome::Unhandled;
        };
        let Some(handler) = weak.upgrade() else {
            tracing::warn!("{}: trigger handler was dropped", self.name);
            return TriggerOutcome::Detached;
        };

        tracing::info!("📨 {}: requesting data", self.name);
        self.surface.announce_request(&self.name);
        handler.trigger().await
    }

    pub fn state(&self) -> ViewState {
        self.state.lock().clone()
    }

    pub fn last_value(&self) -> Option<DisplayValue> {
        match &*self.state.lock() {
            ViewState::Showing(value) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn history(&self) -> Vec<Rendered> {
        self.history.lock().clone()
    }

    pub fn render_count(&self) -> usize {
        self.history.lock().len()
    }

    fn record(&self, state: ViewState, frame: Frame) {
        *self.state.lock() = state;
        self.history.lock().push(Rendered {
            at: Utc::now(),
            frame,
        });
    }
}

impl DataDisplayable for ScreenView {
    fn display(&self, value: DisplayValue) {
        tracing::info!("🖥️ {}: showing \"{}\"", self.name, value);
        self.surface.render_data(&self.name, &value);
        self.record(ViewState::Showing(value.clone()), Frame::Data(value));
    }

    fn show_error(&self, error: ScreenError) {
        tracing::warn!("❌ {}: showing error: {}", self.name, error);
        self.surface.render_error(&self.name, &error);
        self.record(ViewState::Failed(error.clone()), Frame::Error(error));
    }
}

impl std::fmt::Debug for ScreenView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenView")
            .field("name", &self.name)
            .field("state", &*self.state.lock())
            .field("renders", &self.render_count())
            .finish()
    }
}

use crate::core::guard::BusyPolicy;
use crate::core::mediator::{fetch_from, Mediator};
use crate::core::mvc::dispatch;
use crate::core::screen::{Screen, Variant};
use crate::core::view::ScreenView;
use crate::domain::model::{Delivery, TriggerOutcome};
use crate::domain::ports::{DataSource, PayloadParser, Triggerable};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// 綁定在 ViewModel 上的結果 callback；回傳 false 代表訂閱者已不存在
pub type Binding = Arc<dyn Fn(Delivery) -> bool + Send + Sync>;

/// MVVM：ViewModel 不認識 view，只透過綁定的 callback 推出結果
pub struct ViewModel {
    network: Box<dyn DataSource>,
    mediator: Mediator,
    binding: Mutex<Option<Binding>>,
}

impl ViewModel {
    pub fn new(
        label: impl Into<String>,
        network: Box<dyn DataSource>,
        parser: Arc<dyn PayloadParser>,
        policy: BusyPolicy,
    ) -> Self {
        Self {
            network,
            mediator: Mediator::new(label, parser, policy),
            binding: Mutex::new(None),
        }
    }

    /// 只保留一個訂閱者，後綁定者覆蓋前者
    pub fn bind<F>(&self, on_result: F)
    where
        F: Fn(Delivery) -> bool + Send + Sync + 'static,
    {
        *self.binding.lock() = Some(Arc::new(on_result));
    }

    pub fn is_bound(&self) -> bool {
        self.binding.lock().is_some()
    }

    pub async fn get_data(&self) -> TriggerOutcome {
        let network = self.network.as_ref();
        let binding = &self.binding;
        self.mediator
            .run(
                || async move { vec![fetch_from(network).await] },
                |delivery| {
                    // 呼叫前先複製出來，callback 內可以重新綁定
                    let current = binding.lock().clone();
                    match current {
                        Some(on_result) => on_result(delivery),
                        None => {
                            tracing::warn!("view model has no binding, result dropped");
                            false
                        }
                    }
                },
            )
            .await
    }
}

#[async_trait]
impl Triggerable for ViewModel {
    async fn trigger(&self) -> TriggerOutcome {
        self.get_data().await
    }
}

pub struct MvvmScreen {
    view: Arc<ScreenView>,
    view_model: Arc<ViewModel>,
}

impl MvvmScreen {
    pub fn assemble(
        view: Arc<ScreenView>,
        network: Box<dyn DataSource>,
        parser: Arc<dyn PayloadParser>,
        policy: BusyPolicy,
    ) -> Self {
        let label = format!("{}/view_model", view.name());
        let view_model = Arc::new(ViewModel::new(label, network, parser, policy));

        view.set_trigger(&view_model);
        let weak_view = Arc::downgrade(&view);
        view_model.bind(move |delivery| match weak_view.upgrade() {
            Some(view) => {
                dispatch(view.as_ref(), delivery);
                true
            }
            None => false,
        });

        Self { view, view_model }
    }

    pub fn view_model(&self) -> &Arc<ViewModel> {
        &self.view_model
    }
}

#[async_trait]
impl Screen for MvvmScreen {
    fn variant(&self) -> Variant {
        Variant::Mvvm
    }

    fn view(&self) -> &Arc<ScreenView> {
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{NullSurface, StubSource};
    use crate::core::parse::ConstantParser;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_rebinding_replaces_subscriber() {
        let view_model = ViewModel::new(
            "vm",
            Box::new(StubSource::new("network")),
            Arc::new(ConstantParser::default()),
            BusyPolicy::Reject,
        );
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let counter = first.clone();
        view_model.bind(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });
        let counter = second.clone();
        view_model.bind(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        assert!(view_model.get_data().await.is_delivered());
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unbound_view_model_reports_detached() {
        let view_model = ViewModel::new(
            "vm",
            Box::new(StubSource::new("network")),
            Arc::new(ConstantParser::default()),
            BusyPolicy::Reject,
        );
        assert!(!view_model.is_bound());
        assert_eq!(view_model.get_data().await, TriggerOutcome::Detached);
    }

    #[tokio::test]
    async fn test_screen_binding_does_not_keep_view_alive() {
        let view = Arc::new(ScreenView::new("third", Box::new(NullSurface)));
        let screen = MvvmScreen::assemble(
            view,
            Box::new(StubSource::new("network")),
            Arc::new(ConstantParser::default()),
            BusyPolicy::Reject,
        );
        assert_eq!(Arc::strong_count(screen.view()), 1);
        assert!(screen.load().await.is_delivered());
    }
}

use crate::core::guard::BusyPolicy;
use crate::core::mediator::{fetch_from, Mediator};
use crate::core::mvc::dispatch;
use crate::core::screen::{Screen, Variant};
use crate::core::view::ScreenView;
use crate::domain::model::{Delivery, TriggerOutcome};
use crate::domain::ports::{DataSource, PayloadParser, Triggerable};
use async_trait::async_trait;
use std::sync::{Arc, Weak};

/// Presenter 回推結果的對象（畫面本身）
pub trait PresenterOutput: Send + Sync {
    fn send_data(&self, delivery: Delivery);
}

/// MVP：Presenter 擁有 network manager，解析後透過 weak 參照回推給畫面
pub struct Presenter {
    network: Box<dyn DataSource>,
    mediator: Mediator,
    output: Weak<dyn PresenterOutput>,
}

impl Presenter {
    pub fn new(
        label: impl Into<String>,
        network: Box<dyn DataSource>,
        parser: Arc<dyn PayloadParser>,
        policy: BusyPolicy,
        output: Weak<dyn PresenterOutput>,
    ) -> Self {
        Self {
            network,
            mediator: Mediator::new(label, parser, policy),
            output,
        }
    }

    pub async fn get_data(&self) -> TriggerOutcome {
        let network = self.network.as_ref();
        let output = &self.output;
        self.mediator
            .run(
                || async move { vec![fetch_from(network).await] },
                |delivery| match output.upgrade() {
                    Some(output) => {
                        output.send_data(delivery);
                        true
                    }
                    None => false,
                },
            )
            .await
    }
}

#[async_trait]
impl Triggerable for Presenter {
    async fn trigger(&self) -> TriggerOutcome {
        self.get_data().await
    }
}

/// MVP 的畫面：持有 view 與 presenter，收到 presenter 的結果後轉交 view
pub struct MvpScreen {
    view: Arc<ScreenView>,
    presenter: Arc<Presenter>,
}

impl MvpScreen {
    pub fn assemble(
        view: Arc<ScreenView>,
        network: Box<dyn DataSource>,
        parser: Arc<dyn PayloadParser>,
        policy: BusyPolicy,
    ) -> Arc<Self> {
        let screen = Arc::new_cyclic(|me: &Weak<MvpScreen>| {
            let output: Weak<dyn PresenterOutput> = me.clone();
            let label = format!("{}/presenter", view.name());
            Self {
                presenter: Arc::new(Presenter::new(label, network, parser, policy, output)),
                view,
            }
        });
        screen.view.set_trigger(&screen.presenter);
        screen
    }

    pub fn presenter(&self) -> &Arc<Presenter> {
        &self.presenter
    }
}

impl PresenterOutput for MvpScreen {
    fn send_data(&self, delivery: Delivery) {
        dispatch(self.view.as_ref(), delivery);
    }
}

#[async_trait]
impl Screen for MvpScreen {
    fn variant(&self) -> Variant {
        Variant::Mvp
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

    fn screen(network: Arc<StubSource>) -> Arc<MvpScreen> {
        MvpScreen::assemble(
            Arc::new(ScreenView::new("second", Box::new(NullSurface))),
            Box::new(network),
            Arc::new(ConstantParser::default()),
            BusyPolicy::Reject,
        )
    }

    #[tokio::test]
    async fn test_presenter_forwards_through_screen() {
        let network = Arc::new(StubSource::new("network"));
        let screen = screen(network.clone());

        assert!(screen.load().await.is_delivered());
        assert_eq!(network.fetch_count(), 1);
        assert_eq!(screen.view().last_value().unwrap(), "parsed");
    }

    #[tokio::test]
    async fn test_presenter_detects_dropped_screen() {
        let network = Arc::new(StubSource::new("network"));
        let screen = screen(network.clone());
        let presenter = screen.presenter().clone();
        let view = screen.view().clone();

        drop(screen);
        assert_eq!(presenter.get_data().await, TriggerOutcome::Detached);
        assert_eq!(network.fetch_count(), 1);
        assert_eq!(view.render_count(), 0);
    }
}

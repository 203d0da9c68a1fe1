use crate::core::guard::BusyPolicy;
use crate::core::mediator::{fetch_from, Mediator};
use crate::core::screen::{Screen, Variant};
use crate::core::view::ScreenView;
use crate::domain::model::{Delivery, TriggerOutcome};
use crate::domain::ports::{DataDisplayable, DataSource, PayloadParser, Triggerable};
use async_trait::async_trait;
use std::sync::Arc;

/// 把 delivery 送進 view 的兩個 sink 之一
pub(crate) fn dispatch(view: &dyn DataDisplayable, delivery: Delivery) {
    match delivery.outcome {
        Ok(value) => view.display(value),
        Err(error) => view.show_error(error),
    }
}

/// MVC：Controller 本身就是畫面，擁有 view 與 model(service)，解析也在這裡做
pub struct Controller {
    view: Arc<ScreenView>,
    service: Box<dyn DataSource>,
    mediator: Mediator,
}

impl Controller {
    /// 組裝並把自己登記為 view 的 trigger handler
    pub fn assemble(
        view: Arc<ScreenView>,
        service: Box<dyn DataSource>,
        parser: Arc<dyn PayloadParser>,
        policy: BusyPolicy,
    ) -> Arc<Self> {
        let controller = Arc::new(Self {
            mediator: Mediator::new(format!("{}/controller", view.name()), parser, policy),
            view,
            service,
        });
        controller.view.set_trigger(&controller);
        controller
    }
}

#[async_trait]
impl Triggerable for Controller {
    async fn trigger(&self) -> TriggerOutcome {
        let service = self.service.as_ref();
        let view = self.view.as_ref();
        self.mediator
            .run(
                || async move { vec![fetch_from(service).await] },
                |delivery| {
                    dispatch(view, delivery);
                    true
                },
            )
            .await
    }
}

#[async_trait]
impl Screen for Controller {
    fn variant(&self) -> Variant {
        Variant::Mvc
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
    use crate::core::view::ViewState;

    #[tokio::test]
    async fn test_controller_fetches_parses_and_displays() {
        let service = Arc::new(StubSource::new("service"));
        let view = Arc::new(ScreenView::new("first", Box::new(NullSurface)));
        let controller = Controller::assemble(
            view.clone(),
            Box::new(service.clone()),
            Arc::new(ConstantParser::default()),
            BusyPolicy::Reject,
        );

        let outcome = controller.load().await;

        assert_eq!(outcome, TriggerOutcome::Delivered { request_id: 1 });
        assert_eq!(service.fetch_count(), 1);
        assert_eq!(view.render_count(), 1);
        assert!(matches!(view.state(), ViewState::Showing(_)));
    }

    #[tokio::test]
    async fn test_view_does_not_keep_controller_alive() {
        let view = Arc::new(ScreenView::new("first", Box::new(NullSurface)));
        let controller = Controller::assemble(
            view.clone(),
            Box::new(StubSource::new("service")),
            Arc::new(ConstantParser::default()),
            BusyPolicy::Reject,
        );
        assert_eq!(Arc::strong_count(&controller), 1);

        drop(controller);
        assert_eq!(view.request_data().await, TriggerOutcome::Detached);
    }
}

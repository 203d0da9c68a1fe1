use crate::core::guard::BusyPolicy;
use crate::core::mediator::{fetch_from, Mediator};
use crate::core::mvc::dispatch;
use crate::core::screen::{Screen, Variant};
use crate::core::view::ScreenView;
use crate::domain::model::{Fetched, TriggerOutcome};
use crate::domain::ports::{DataDisplayable, DataSource, PayloadParser, Triggerable};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Weak};

/// 網路與本地儲存同時被要求時的合併方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// 先完成者勝出，另一個被取消；同時完成時網路優先
    FirstCompleted,
    /// 兩者都送出，順序固定為網路、本地
    #[default]
    Sequence,
    /// 先問網路，失敗才問本地
    Fallback,
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "first_completed" | "first" => Ok(MergePolicy::FirstCompleted),
            "sequence" => Ok(MergePolicy::Sequence),
            "fallback" => Ok(MergePolicy::Fallback),
            other => Err(format!(
                "unknown merge policy '{}', expected first_completed, sequence or fallback",
                other
            )),
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MergePolicy::FirstCompleted => "first_completed",
            MergePolicy::Sequence => "sequence",
            MergePolicy::Fallback => "fallback",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Network,
    LocalStore,
    Merged(MergePolicy),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenEvent {
    DataRequested,
    Appeared,
    Refreshed,
}

/// 把畫面事件對應到資料路徑
#[derive(Debug, Clone, Copy)]
pub struct Router {
    on_request: Route,
    on_appear: Route,
    on_refresh: Route,
}

impl Router {
    pub fn new(merge_policy: MergePolicy) -> Self {
        Self {
            on_request: Route::Network,
            on_appear: Route::LocalStore,
            on_refresh: Route::Merged(merge_policy),
        }
    }

    pub fn with_route(mut self, event: ScreenEvent, route: Route) -> Self {
        match event {
            ScreenEvent::DataRequested => self.on_request = route,
            ScreenEvent::Appeared => self.on_appear = route,
            ScreenEvent::Refreshed => self.on_refresh = route,
        }
        self
    }

    pub fn route(&self, event: ScreenEvent) -> Route {
        match event {
            ScreenEvent::DataRequested => self.on_request,
            ScreenEvent::Appeared => self.on_appear,
            ScreenEvent::Refreshed => self.on_refresh,
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(MergePolicy::default())
    }
}

/// Interactor：彙整網路與本地儲存兩個來源
pub struct Interactor {
    network: Box<dyn DataSource>,
    store: Box<dyn DataSource>,
}

impl Interactor {
    pub fn new(network: Box<dyn DataSource>, store: Box<dyn DataSource>) -> Self {
        Self { network, store }
    }

    pub async fn fetch(&self, route: Route) -> Vec<Fetched> {
        match route {
            Route::Network => vec![fetch_from(self.network.as_ref()).await],
            Route::LocalStore => vec![fetch_from(self.store.as_ref()).await],
            Route::Merged(policy) => self.merge(policy).await,
        }
    }

    async fn merge(&self, policy: MergePolicy) -> Vec<Fetched> {
        let network = fetch_from(self.network.as_ref());
        let store = fetch_from(self.store.as_ref());

        match policy {
            MergePolicy::FirstCompleted => {
                let first = tokio::select! {
                    biased;
                    fetched = network => fetched,
                    fetched = store => fetched,
                };
                tracing::debug!("first completed fetch came from {}", first.source);
                vec![first]
            }
            MergePolicy::Sequence => {
                let (network, store) = tokio::join!(network, store);
                vec![network, store]
            }
            MergePolicy::Fallback => {
                let network = network.await;
                if network.result.is_ok() {
                    return vec![network];
                }
                tracing::info!("🔁 network failed, falling back to local store");
                vec![store.await]
            }
        }
    }
}

/// VIPER 的 presenter：經由 interactor 取資料、解析，再透過 weak 參照推給 view
pub struct ViperPresenter {
    interactor: Interactor,
    router: Router,
    mediator: Mediator,
    view: Weak<dyn DataDisplayable>,
}

impl ViperPresenter {
    pub fn new(
        label: impl Into<String>,
        interactor: Interactor,
        router: Router,
        parser: Arc<dyn PayloadParser>,
        policy: BusyPolicy,
        view: Weak<dyn DataDisplayable>,
    ) -> Self {
        Self {
            interactor,
            router,
            mediator: Mediator::new(label, parser, policy),
            view,
        }
    }

    pub async fn handle(&self, event: ScreenEvent) -> TriggerOutcome {
        let route = self.router.route(event);
        tracing::debug!("{}: {:?} routed to {:?}", self.mediator.label(), event, route);

        let interactor = &self.interactor;
        let view = &self.view;
        self.mediator
            .run(
                move || interactor.fetch(route),
                |delivery| match view.upgrade() {
                    Some(view) => {
                        dispatch(view.as_ref(), delivery);
                        true
                    }
                    None => false,
                },
            )
            .await
    }
}

#[async_trait]
impl Triggerable for ViperPresenter {
    async fn trigger(&self) -> TriggerOutcome {
        self.handle(ScreenEvent::DataRequested).await
    }
}

pub struct ViperScreen {
    view: Arc<ScreenView>,
    presenter: Arc<ViperPresenter>,
}

impl ViperScreen {
    pub fn assemble(
        view: Arc<ScreenView>,
        interactor: Interactor,
        router: Router,
        parser: Arc<dyn PayloadParser>,
        policy: BusyPolicy,
    ) -> Self {
        let weak_view = Arc::downgrade(&view) as Weak<dyn DataDisplayable>;
        let label = format!("{}/presenter", view.name());
        let presenter = Arc::new(ViperPresenter::new(
            label, interactor, router, parser, policy, weak_view,
        ));
        view.set_trigger(&presenter);
        Self { view, presenter }
    }

    pub fn presenter(&self) -> &Arc<ViperPresenter> {
        &self.presenter
    }

    pub async fn refresh(&self) -> TriggerOutcome {
        self.presenter.handle(ScreenEvent::Refreshed).await
    }
}

#[async_trait]
impl Screen for ViperScreen {
    fn variant(&self) -> Variant {
        Variant::Viper
    }

    fn view(&self) -> &Arc<ScreenView> {
        &self.view
    }

    async fn appear(&self) -> Option<TriggerOutcome> {
        Some(self.presenter.handle(ScreenEvent::Appeared).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::StubSource;
    use crate::domain::model::SourceKind;

    fn sources() -> (Arc<StubSource>, Arc<StubSource>) {
        (
            Arc::new(StubSource::new("network").with_kind(SourceKind::Network)),
            Arc::new(StubSource::new("store").with_kind(SourceKind::LocalStore)),
        )
    }

    #[test]
    fn test_router_defaults() {
        let router = Router::new(MergePolicy::Fallback);
        assert_eq!(router.route(ScreenEvent::DataRequested), Route::Network);
        assert_eq!(router.route(ScreenEvent::Appeared), Route::LocalStore);
        assert_eq!(
            router.route(ScreenEvent::Refreshed),
            Route::Merged(MergePolicy::Fallback)
        );

        let router = router.with_route(ScreenEvent::Appeared, Route::Network);
        assert_eq!(router.route(ScreenEvent::Appeared), Route::Network);
    }

    #[tokio::test]
    async fn test_interactor_routes_to_distinct_sources() {
        let (network, store) = sources();
        let interactor = Interactor::new(Box::new(network.clone()), Box::new(store.clone()));

        let fetched = interactor.fetch(Route::LocalStore).await;
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].source, SourceKind::LocalStore);
        assert_eq!(network.fetch_count(), 0);
        assert_eq!(store.fetch_count(), 1);
    }

    #[test]
    fn test_merge_policy_from_str() {
        assert_eq!(
            "first-completed".parse::<MergePolicy>(),
            Ok(MergePolicy::FirstCompleted)
        );
        assert_eq!("fallback".parse::<MergePolicy>(), Ok(MergePolicy::Fallback));
        assert!("race".parse::<MergePolicy>().is_err());
    }
}

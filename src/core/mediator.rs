use crate::core::guard::{Admission, BusyPolicy, RequestGuard, RequestState};
use crate::domain::model::{Delivery, Fetched, TriggerOutcome};
use crate::domain::ports::{DataSource, PayloadParser};
use crate::utils::error::ScreenError;
use std::future::Future;
use std::sync::Arc;

/// 從單一資料來源取一次資料
pub async fn fetch_from(source: &dyn DataSource) -> Fetched {
    tracing::debug!("Fetching from {} ({})", source.name(), source.kind());
    let result = source.fetch().await;
    match &result {
        Ok(raw) => tracing::debug!("{} returned {} bytes", source.name(), raw.len()),
        Err(e) => tracing::warn!("⚠️ {} failed: {}", source.name(), e),
    }
    Fetched {
        source: source.kind(),
        result,
    }
}

/// fetch → parse → deliver，四種架構共用
pub struct Mediator {
    label: String,
    guard: RequestGuard,
    parser: Arc<dyn PayloadParser>,
}

impl Mediator {
    pub fn new(label: impl Into<String>, parser: Arc<dyn PayloadParser>, policy: BusyPolicy) -> Self {
        Self {
            label: label.into(),
            guard: RequestGuard::new(policy),
            parser,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> RequestState {
        self.guard.state()
    }

    pub fn parse(&self, request_id: u64, fetched: Fetched) -> Delivery {
        let outcome = fetched
            .result
            .map_err(ScreenError::from)
            .and_then(|raw| self.parser.parse(&raw).map_err(ScreenError::from));

        if let Err(e) = &outcome {
            tracing::debug!("{} request #{} resolved to error: {}", self.label, request_id, e);
        }

        Delivery {
            request_id,
            source: fetched.source,
            outcome,
        }
    }

    /// `fetch` 回傳本次請求的所有結果，`deliver` 回傳 false 代表接收端已釋放
    pub async fn run<F, Fut, D>(&self, mut fetch: F, mut deliver: D) -> TriggerOutcome
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Vec<Fetched>> + Send,
        D: FnMut(Delivery) -> bool + Send,
    {
        let mut ticket = match self.guard.begin() {
            Admission::Start { request_id } => self.guard.hold(request_id),
            Admission::Rejected => {
                tracing::warn!("🚫 {}: request already in flight, trigger rejected", self.label);
                return TriggerOutcome::Rejected;
            }
            Admission::Coalesced => {
                tracing::info!("⏳ {}: request in flight, trigger queued", self.label);
                return TriggerOutcome::Coalesced;
            }
        };

        loop {
            let request_id = ticket.request_id();
            tracing::debug!("{}: starting request #{}", self.label, request_id);
            let fetched = fetch().await;

            let mut delivered_data = false;
            for item in fetched {
                let delivery = self.parse(request_id, item);
                delivered_data |= delivery.is_data();
                if !deliver(delivery) {
                    tracing::warn!(
                        "{}: receiver dropped before request #{} was delivered",
                        self.label,
                        request_id
                    );
                    ticket.abandon();
                    return TriggerOutcome::Detached;
                }
            }

            let outcome = if delivered_data {
                TriggerOutcome::Delivered { request_id }
            } else {
                TriggerOutcome::Failed { request_id }
            };

            if !ticket.finish() {
                return outcome;
            }
            tracing::debug!("{}: running queued request #{}", self.label, ticket.request_id());
        }
    }
}

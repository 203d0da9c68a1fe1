use crate::domain::model::{RawPayload, SourceKind};
use crate::domain::ports::{DataSource, FetchResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// 不連網的資料來源：預設回傳空 payload
#[derive(Debug)]
pub struct StubSource {
    name: String,
    kind: SourceKind,
    payload: RawPayload,
    delay: Option<Duration>,
    scripted: Mutex<VecDeque<FetchResult>>,
    fetches: AtomicUsize,
}

impl StubSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SourceKind::Stub,
            payload: RawPayload::empty(),
            delay: None,
            scripted: Mutex::new(VecDeque::new()),
            fetches: AtomicUsize::new(0),
        }
    }

    /// 以其他來源種類出現（例如 VIPER 的 network/local store）
    pub fn with_kind(mut self, kind: SourceKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_payload(mut self, payload: impl Into<RawPayload>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// 依序回傳預先排好的結果，用完後回到預設 payload
    pub fn with_script(self, results: impl IntoIterator<Item = FetchResult>) -> Self {
        self.scripted.lock().extend(results);
        self
    }

    pub fn push_result(&self, result: FetchResult) {
        self.scripted.lock().push_back(result);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataSource for StubSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch(&self) -> FetchResult {
        let call = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("{}: stub fetch #{}", self.name, call);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.scripted.lock().pop_front();
        scripted.unwrap_or_else(|| Ok(self.payload.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::FetchError;

    #[tokio::test]
    async fn test_default_stub_yields_empty_payload() {
        let stub = StubSource::new("stub");
        assert_eq!(stub.fetch().await, Ok(RawPayload::empty()));
        assert_eq!(stub.fetch_count(), 1);
        assert_eq!(stub.kind(), SourceKind::Stub);
    }

    #[tokio::test]
    async fn test_script_runs_before_default_payload() {
        let stub = StubSource::new("network")
            .with_kind(SourceKind::Network)
            .with_payload("fallback")
            .with_script([Err(FetchError::Abandoned {
                source_name: "network".to_string(),
            })]);

        assert!(stub.fetch().await.is_err());
        assert_eq!(stub.fetch().await, Ok(RawPayload::from("fallback")));
        assert_eq!(stub.fetch_count(), 2);
    }
}

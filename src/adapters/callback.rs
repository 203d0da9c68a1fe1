use crate::domain::model::SourceKind;
use crate::domain::ports::{DataSource, FetchResult};
use crate::utils::error::FetchError;
use async_trait::async_trait;
use tokio::sync::oneshot;

/// 一次性的 completion；`complete` 會消耗自己，所以不可能被呼叫兩次
#[derive(Debug)]
pub struct Completion {
    sender: oneshot::Sender<FetchResult>,
}

impl Completion {
    pub fn complete(self, result: FetchResult) {
        // 等待端已放棄時直接丟掉結果
        if self.sender.send(result).is_err() {
            tracing::debug!("completion fired after the waiting side went away");
        }
    }
}

/// 把 `fetch(completion)` 風格的 callback API 接到 async DataSource 上
///
/// ```
/// use screen_wiring::adapters::{CallbackSource, Completion};
/// use screen_wiring::core::{DataSource, RawPayload};
///
/// let source = CallbackSource::new("legacy", |done: Completion| {
///     done.complete(Ok(RawPayload::from("hello")));
/// });
/// let payload = tokio_test::block_on(source.fetch()).unwrap();
/// assert_eq!(payload, RawPayload::from("hello"));
/// ```
pub struct CallbackSource<F>
where
    F: Fn(Completion) + Send + Sync,
{
    name: String,
    producer: F,
}

impl<F> CallbackSource<F>
where
    F: Fn(Completion) + Send + Sync,
{
    pub fn new(name: impl Into<String>, producer: F) -> Self {
        Self {
            name: name.into(),
            producer,
        }
    }
}

#[async_trait]
impl<F> DataSource for CallbackSource<F>
where
    F: Fn(Completion) + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Callback
    }

    async fn fetch(&self) -> FetchResult {
        let (sender, receiver) = oneshot::channel();
        (self.producer)(Completion { sender });

        receiver.await.unwrap_or_else(|_| {
            Err(FetchError::Abandoned {
                source_name: self.name.clone(),
            })
        })
    }
}

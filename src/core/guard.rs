use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 每個 mediator 的請求狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    InFlight { request_id: u64 },
    Completed { request_id: u64 },
}

/// 請求進行中時再次觸發的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusyPolicy {
    #[default]
    Reject,
    Coalesce,
}

impl FromStr for BusyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(BusyPolicy::Reject),
            "coalesce" => Ok(BusyPolicy::Coalesce),
            other => Err(format!(
                "unknown busy policy '{}', expected reject or coalesce",
                other
            )),
        }
    }
}

impl fmt::Display for BusyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusyPolicy::Reject => f.write_str("reject"),
            BusyPolicy::Coalesce => f.write_str("coalesce"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Start { request_id: u64 },
    Rejected,
    Coalesced,
}

#[derive(Debug)]
struct GuardInner {
    state: RequestState,
    next_id: u64,
    rerun: bool,
}

impl GuardInner {
    fn start_next(&mut self) -> u64 {
        let request_id = self.next_id;
        self.next_id += 1;
        self.state = RequestState::InFlight { request_id };
        request_id
    }
}

/// 同一時間只允許一個請求在途
#[derive(Debug)]
pub struct RequestGuard {
    policy: BusyPolicy,
    inner: Mutex<GuardInner>,
}

impl RequestGuard {
    pub fn new(policy: BusyPolicy) -> Self {
        Self {
            policy,
            inner: Mutex::new(GuardInner {
                state: RequestState::Idle,
                next_id: 1,
                rerun: false,
            }),
        }
    }

    pub fn policy(&self) -> BusyPolicy {
        self.policy
    }

    pub fn state(&self) -> RequestState {
        self.inner.lock().state
    }

    pub fn begin(&self) -> Admission {
        let mut inner = self.inner.lock();
        match inner.state {
            RequestState::InFlight { .. } => match self.policy {
                BusyPolicy::Reject => Admission::Rejected,
                BusyPolicy::Coalesce => {
                    inner.rerun = true;
                    Admission::Coalesced
                }
            },
            RequestState::Idle | RequestState::Completed { .. } => Admission::Start {
                request_id: inner.start_next(),
            },
        }
    }

    /// 結束目前請求；若有排隊的觸發，回傳下一個請求 id
    pub fn finish(&self, request_id: u64) -> Option<u64> {
        let mut inner = self.inner.lock();
        if inner.state != (RequestState::InFlight { request_id }) {
            return None;
        }
        if inner.rerun {
            inner.rerun = false;
            Some(inner.start_next())
        } else {
            inner.state = RequestState::Completed { request_id };
            None
        }
    }

    /// 接收端已不存在，放棄排隊的觸發
    pub fn abandon(&self, request_id: u64) {
        let mut inner = self.inner.lock();
        if inner.state == (RequestState::InFlight { request_id }) {
            inner.rerun = false;
            inner.state = RequestState::Completed { request_id };
        }
    }
}

impl RequestGuard {
    /// 把已取得的 request id 包成 ticket，drop 時自動釋放
    pub fn hold(&self, request_id: u64) -> InFlightTicket<'_> {
        InFlightTicket {
            guard: self,
            request_id,
            released: false,
        }
    }
}

/// 在途請求的持有權；未結束就被 drop（呼叫端取消、逾時）時等同 abandon
#[derive(Debug)]
pub struct InFlightTicket<'a> {
    guard: &'a RequestGuard,
    request_id: u64,
    released: bool,
}

impl InFlightTicket<'_> {
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// 結束目前請求；有排隊的觸發時換成下一個 id 並回傳 true
    pub fn finish(&mut self) -> bool {
        match self.guard.finish(self.request_id) {
            Some(next) => {
                self.request_id = next;
                true
            }
            None => {
                self.released = true;
                false
            }
        }
    }

    pub fn abandon(mut self) {
        self.guard.abandon(self.request_id);
        self.released = true;
    }
}

impl Drop for InFlightTicket<'_> {
    fn drop(&mut self) {
        if !self.released {
            tracing::debug!("request #{} dropped before completion", self.request_id);
            self.guard.abandon(self.request_id);
        }
    }
}

impl Default for RequestGuard {
    fn default() -> Self {
        Self::new(BusyPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_while_in_flight() {
        let guard = RequestGuard::new(BusyPolicy::Reject);
        assert_eq!(guard.state(), RequestState::Idle);

        assert_eq!(guard.begin(), Admission::Start { request_id: 1 });
        assert_eq!(guard.begin(), Admission::Rejected);
        assert_eq!(guard.finish(1), None);
        assert_eq!(guard.state(), RequestState::Completed { request_id: 1 });

        assert_eq!(guard.begin(), Admission::Start { request_id: 2 });
    }

    #[test]
    fn test_coalesce_queues_one_follow_up() {
        let guard = RequestGuard::new(BusyPolicy::Coalesce);
        assert_eq!(guard.begin(), Admission::Start { request_id: 1 });
        assert_eq!(guard.begin(), Admission::Coalesced);
        assert_eq!(guard.begin(), Admission::Coalesced);

        assert_eq!(guard.finish(1), Some(2));
        assert_eq!(guard.state(), RequestState::InFlight { request_id: 2 });
        assert_eq!(guard.finish(2), None);
    }

    #[test]
    fn test_stale_finish_is_ignored() {
        let guard = RequestGuard::new(BusyPolicy::Coalesce);
        assert_eq!(guard.begin(), Admission::Start { request_id: 1 });
        assert_eq!(guard.finish(7), None);
        assert_eq!(guard.state(), RequestState::InFlight { request_id: 1 });

        guard.begin();
        guard.abandon(1);
        assert_eq!(guard.state(), RequestState::Completed { request_id: 1 });
        assert_eq!(guard.begin(), Admission::Start { request_id: 2 });
    }

    #[test]
    fn test_dropped_ticket_releases_guard() {
        let guard = RequestGuard::new(BusyPolicy::Coalesce);
        let Admission::Start { request_id } = guard.begin() else {
            panic!("expected admission");
        };
        let ticket = guard.hold(request_id);
        assert_eq!(guard.begin(), Admission::Coalesced);

        drop(ticket);

        // 排隊的觸發一併丟棄
        assert_eq!(guard.state(), RequestState::Completed { request_id: 1 });
        assert_eq!(guard.begin(), Admission::Start { request_id: 2 });
    }

    #[test]
    fn test_ticket_follows_queued_request() {
        let guard = RequestGuard::new(BusyPolicy::Coalesce);
        guard.begin();
        let mut ticket = guard.hold(1);
        guard.begin();

        assert!(ticket.finish());
        assert_eq!(ticket.request_id(), 2);
        assert!(!ticket.finish());
        drop(ticket);

        assert_eq!(guard.state(), RequestState::Completed { request_id: 2 });
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Coalesce".parse::<BusyPolicy>(), Ok(BusyPolicy::Coalesce));
        assert!("queue".parse::<BusyPolicy>().is_err());
    }
}

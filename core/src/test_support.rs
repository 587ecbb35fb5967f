//! Scripted transport for unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::error::{ApiError, ApiResult};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;

struct Scripted {
    result: ApiResult<HttpResponse>,
    gate: Option<Rc<Notify>>,
}

/// Replays queued responses in order and records every request it sees.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: RefCell<VecDeque<Scripted>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub(crate) fn push(&self, status: u16, body: &str) {
        self.script.borrow_mut().push_back(Scripted {
            result: Ok(HttpResponse::new(status, body)),
            gate: None,
        });
    }

    pub(crate) fn push_error(&self, error: ApiError) {
        self.script.borrow_mut().push_back(Scripted {
            result: Err(error),
            gate: None,
        });
    }

    /// Queue a response that is held back until the returned `Notify` fires.
    pub(crate) fn push_gated(&self, status: u16, body: &str) -> Rc<Notify> {
        let gate = Rc::new(Notify::new());
        self.script.borrow_mut().push_back(Scripted {
            result: Ok(HttpResponse::new(status, body)),
            gate: Some(gate.clone()),
        });
        gate
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub(crate) fn methods(&self) -> Vec<HttpMethod> {
        self.requests.borrow().iter().map(|req| req.method).collect()
    }
}

#[async_trait(?Send)]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
        self.requests.borrow_mut().push(request);
        let next = self.script.borrow_mut().pop_front();
        let Some(scripted) = next else {
            return Err(ApiError::Network("no scripted response left".to_string()));
        };
        if let Some(gate) = scripted.gate {
            gate.notified().await;
        }
        scripted.result
    }
}

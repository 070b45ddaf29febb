//! Stubs and helpers shared by unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use axum::Router;
use url::Url;

use crate::asana::{AsanaError, NewTask, TaskRecord, TaskService};
use crate::llm::{GenerateResponse, LlmClient, LlmError};

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_router(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub server");
    let addr = listener.local_addr().expect("stub server address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub server");
    });
    Url::parse(&format!("http://{}", addr)).expect("stub server url")
}

/// Language model that answers every prompt the same way.
pub struct StubLlm {
    reply: Result<String, LlmError>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl StubLlm {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: LlmError) -> Self {
        Self {
            reply: Err(error),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// `(model, prompt)` pairs received so far.
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for StubLlm {
    async fn generate(&self, model: &str, prompt: &str) -> Result<GenerateResponse, LlmError> {
        self.prompts
            .lock()
            .unwrap()
            .push((model.to_string(), prompt.to_string()));
        self.reply.clone().map(|text| GenerateResponse {
            text,
            model: Some(model.to_string()),
            usage: None,
        })
    }
}

enum Reply {
    /// Echo the request back under a fresh gid.
    Echo,
    Fixed(TaskRecord),
    Fail(AsanaError),
}

/// Task service that records every request.
pub struct RecordingTaskService {
    reply: Reply,
    requests: Mutex<Vec<NewTask>>,
}

impl RecordingTaskService {
    /// Succeeds with gids `task-1`, `task-2`, ...
    pub fn new() -> Self {
        Self::with_reply(Reply::Echo)
    }

    pub fn returning(record: TaskRecord) -> Self {
        Self::with_reply(Reply::Fixed(record))
    }

    pub fn failing(error: AsanaError) -> Self {
        Self::with_reply(Reply::Fail(error))
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<NewTask> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Default for RecordingTaskService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskService for RecordingTaskService {
    async fn create_task(&self, task: &NewTask) -> Result<TaskRecord, AsanaError> {
        let count = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(task.clone());
            requests.len()
        };
        match &self.reply {
            Reply::Echo => {
                let gid = format!("task-{}", count);
                Ok(TaskRecord {
                    permalink_url: Some(format!("https://app.asana.com/0/{}/{}", task.projects[0], gid)),
                    gid: Some(gid),
                    name: Some(task.name.clone()),
                    notes: Some(task.notes.clone()),
                })
            }
            Reply::Fixed(record) => Ok(record.clone()),
            Reply::Fail(error) => Err(error.clone()),
        }
    }
}

//! Dialog service backed by the HTTP front-end
//!
//! A confirmation is published as the single pending prompt and the caller
//! waits until the front-end answers it, the prompt times out, or the waiting
//! future is dropped (which withdraws the prompt).

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use super::Dialogs;

/// Number of notices kept for `/status`
const NOTICE_LOG_LIMIT: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingPrompt {
    pub id: u64,
    pub title: String,
    pub message: String,
    pub asked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

struct OpenPrompt {
    prompt: PendingPrompt,
    answer_tx: oneshot::Sender<bool>,
}

/// Removes the prompt when the waiting `confirm` call goes away
struct PromptGuard<'a> {
    board: &'a PromptBoard,
    id: u64,
}

impl Drop for PromptGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut open) = self.board.open.lock() {
            if open.as_ref().is_some_and(|p| p.prompt.id == self.id) {
                *open = None;
            }
        }
    }
}

pub struct PromptBoard {
    timeout: Duration,
    next_id: AtomicU64,
    open: Mutex<Option<OpenPrompt>>,
    notices: Mutex<VecDeque<Notice>>,
}

impl PromptBoard {
    /// Unanswered prompts resolve to "no" after `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            next_id: AtomicU64::new(1),
            open: Mutex::new(None),
            notices: Mutex::new(VecDeque::new()),
        }
    }

    /// The prompt currently waiting for an answer, if any
    pub fn pending(&self) -> Option<PendingPrompt> {
        self.open
            .lock()
            .ok()
            .and_then(|open| open.as_ref().map(|p| p.prompt.clone()))
    }

    /// Answer the pending prompt. Returns `false` if `id` is not the open prompt.
    pub fn answer(&self, id: u64, yes: bool) -> bool {
        let open = match self.open.lock() {
            Ok(mut open) => match open.take() {
                Some(p) if p.prompt.id == id => Some(p),
                other => {
                    *open = other;
                    None
                }
            },
            Err(e) => {
                error!("Failed to lock prompt board: {}", e);
                None
            }
        };

        match open {
            Some(p) => {
                info!("Prompt {} answered: {}", id, if yes { "yes" } else { "no" });
                p.answer_tx.send(yes).is_ok()
            }
            None => false,
        }
    }

    /// Most recent notices, oldest first
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|n| n.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn push_notice(&self, level: NoticeLevel, title: &str, message: &str) {
        if let Ok(mut notices) = self.notices.lock() {
            if notices.len() == NOTICE_LOG_LIMIT {
                notices.pop_front();
            }
            notices.push_back(Notice {
                level,
                title: title.to_string(),
                message: message.to_string(),
                at: Utc::now(),
            });
        }
    }
}

#[async_trait]
impl Dialogs for PromptBoard {
    async fn confirm(&self, title: &str, message: &str) -> bool {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (answer_tx, answer_rx) = oneshot::channel();

        {
            let mut open = match self.open.lock() {
                Ok(open) => open,
                Err(e) => {
                    error!("Failed to lock prompt board: {}", e);
                    return false;
                }
            };
            if let Some(previous) = open.take() {
                warn!("Prompt {} superseded by prompt {}", previous.prompt.id, id);
            }
            *open = Some(OpenPrompt {
                prompt: PendingPrompt {
                    id,
                    title: title.to_string(),
                    message: message.to_string(),
                    asked_at: Utc::now(),
                },
                answer_tx,
            });
        }
        let _guard = PromptGuard { board: self, id };

        info!("Prompt {} opened: {}", id, title);
        match tokio::time::timeout(self.timeout, answer_rx).await {
            Ok(Ok(answer)) => answer,
            Ok(Err(_)) => false,
            Err(_) => {
                info!("Prompt {} timed out, treating as no", id);
                false
            }
        }
    }

    async fn notify_info(&self, title: &str, message: &str) {
        info!("{}: {}", title, message);
        self.push_notice(NoticeLevel::Info, title, message);
    }

    async fn notify_error(&self, title: &str, message: &str) {
        error!("{}: {}", title, message);
        self.push_notice(NoticeLevel::Error, title, message);
    }
}

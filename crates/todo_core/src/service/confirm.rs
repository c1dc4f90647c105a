//! Yes/no confirmation capability for destructive actions.
//!
//! # Responsibility
//! - Describe a confirmation prompt independently of how it is shown.
//! - Provide the modal (touch platforms) and native-prompt (web/desktop)
//!   presentations behind one trait.
//!
//! # Invariants
//! - Any failure to obtain an answer counts as "cancel".

use async_trait::async_trait;
use log::debug;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Content of a confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

impl ConfirmRequest {
    /// Prompt shown before removing all completed tasks.
    pub fn clear_completed() -> Self {
        Self {
            title: "Clear completed?".to_string(),
            message: "Remove all done tasks.".to_string(),
            confirm_label: "Clear".to_string(),
            cancel_label: "Cancel".to_string(),
        }
    }

    /// Single-line text for prompts that only accept one message.
    pub fn prompt_text(&self) -> String {
        format!("{} {}", self.title, self.message)
    }
}

/// Asks the user to confirm or cancel an action.
#[async_trait]
pub trait Confirm: Send + Sync {
    /// Returns `true` only when the user explicitly confirmed.
    async fn confirm(&self, request: &ConfirmRequest) -> bool;
}

/// Target environment of the front end hosting the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Ios,
    Android,
    Web,
    Desktop,
}

impl Platform {
    /// Platform of the current compile target.
    pub fn current() -> Self {
        if cfg!(target_os = "ios") {
            Self::Ios
        } else if cfg!(target_os = "android") {
            Self::Android
        } else if cfg!(target_family = "wasm") {
            Self::Web
        } else {
            Self::Desktop
        }
    }

    /// Whether confirmations go through a blocking native prompt instead of
    /// an in-app modal dialog.
    pub fn uses_native_prompt(self) -> bool {
        matches!(self, Self::Web | Self::Desktop)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ios => "ios",
            Self::Android => "android",
            Self::Web => "web",
            Self::Desktop => "desktop",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown platform `{0}`; expected ios|android|web|desktop")]
pub struct ParsePlatformError(String);

impl FromStr for Platform {
    type Err = ParsePlatformError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ios" => Ok(Self::Ios),
            "android" => Ok(Self::Android),
            "web" => Ok(Self::Web),
            "desktop" => Ok(Self::Desktop),
            other => Err(ParsePlatformError(other.to_string())),
        }
    }
}

/// Confirmation request delivered to a modal dialog host.
#[derive(Debug)]
pub struct ModalPrompt {
    pub request: ConfirmRequest,
    reply: oneshot::Sender<bool>,
}

impl ModalPrompt {
    /// Resolves the dialog. Dropping the prompt without answering cancels.
    pub fn answer(self, confirmed: bool) {
        // The asking side may have gone away; nothing to report then.
        let _ = self.reply.send(confirmed);
    }
}

/// Modal-dialog confirmation: hands each request to the UI over a channel
/// and waits for the button the user pressed.
#[derive(Debug, Clone)]
pub struct ModalConfirmer {
    prompts: mpsc::UnboundedSender<ModalPrompt>,
}

impl ModalConfirmer {
    /// Creates the confirmer and the receiver the dialog host reads from.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ModalPrompt>) {
        let (prompts, receiver) = mpsc::unbounded_channel();
        (Self { prompts }, receiver)
    }
}

#[async_trait]
impl Confirm for ModalConfirmer {
    async fn confirm(&self, request: &ConfirmRequest) -> bool {
        let (reply, answer) = oneshot::channel();
        let prompt = ModalPrompt {
            request: request.clone(),
            reply,
        };
        if self.prompts.send(prompt).is_err() {
            debug!("event=confirm module=service status=cancelled mode=modal reason=host_closed");
            return false;
        }

        match answer.await {
            Ok(confirmed) => confirmed,
            Err(_) => {
                debug!("event=confirm module=service status=cancelled mode=modal reason=dismissed");
                false
            }
        }
    }
}

/// Native-prompt confirmation: calls a blocking yes/no prompt function with
/// the single-line prompt text.
pub struct PromptConfirmer<F> {
    prompt: F,
}

impl<F> PromptConfirmer<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    pub fn new(prompt: F) -> Self {
        Self { prompt }
    }
}

#[async_trait]
impl<F> Confirm for PromptConfirmer<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    async fn confirm(&self, request: &ConfirmRequest) -> bool {
        (self.prompt)(&request.prompt_text())
    }
}

/// Confirmation presentation chosen for a platform.
pub enum PlatformConfirmer<F> {
    Modal(ModalConfirmer),
    Prompt(PromptConfirmer<F>),
}

impl<F> PlatformConfirmer<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    /// Picks the native prompt on web and desktop, and a modal dialog on
    /// touch platforms.
    ///
    /// The prompt receiver is returned only for the modal variant; the
    /// caller must hand it to whatever renders the dialog. `prompt` is
    /// unused in that case.
    pub fn select(
        platform: Platform,
        prompt: F,
    ) -> (Self, Option<mpsc::UnboundedReceiver<ModalPrompt>>) {
        debug!(
            "event=confirm_select module=service status=ok platform={} mode={}",
            platform,
            if platform.uses_native_prompt() { "prompt" } else { "modal" }
        );
        if platform.uses_native_prompt() {
            (Self::Prompt(PromptConfirmer::new(prompt)), None)
        } else {
            let (modal, prompts) = ModalConfirmer::channel();
            (Self::Modal(modal), Some(prompts))
        }
    }
}

#[async_trait]
impl<F> Confirm for PlatformConfirmer<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    async fn confirm(&self, request: &ConfirmRequest) -> bool {
        match self {
            Self::Modal(modal) => modal.confirm(request).await,
            Self::Prompt(prompt) => prompt.confirm(request).await,
        }
    }
}

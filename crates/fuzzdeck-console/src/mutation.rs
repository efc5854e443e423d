//! State-changing operations.
//!
//! Every mutation ends in a visible side effect: a card removed, a form
//! closed, or a toast. Deleting an agent is only possible after the operator
//! accepted the confirmation dialog.

use crate::cards::AgentBoard;
use crate::detail::StopControl;
use fuzzdeck_core::Error;
use fuzzdeck_core::agent::{AgentCreateRequest, AgentType};
use fuzzdeck_core::ids::AgentGuid;
use fuzzdeck_core::job::JobSubmission;
use fuzzdeck_core::ports::FleetApi;
use fuzzdeck_notify::{ConfirmDialog, Confirmer, DialogButton, Notifier, Toast};
use std::sync::Arc;
use tracing::{info, warn};

/// A file picked in a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content,
        }
    }
}

/// Values of the create-job form as the operator entered them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDraft {
    pub name: String,
    pub description: String,
    pub agent_type: AgentType,
    pub image: String,
    pub cpus: String,
    pub ram: String,
    pub timeout: String,
    pub target: Option<Upload>,
    pub corpus: Option<Upload>,
    pub crash_auto_analyze: bool,
}

impl Default for JobDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            agent_type: AgentType::Linux,
            image: String::new(),
            cpus: String::new(),
            ram: String::new(),
            timeout: String::new(),
            target: None,
            corpus: None,
            crash_auto_analyze: false,
        }
    }
}

impl JobDraft {
    /// Multipart payload. Empty values are left out; `agent-type` and
    /// `crash-auto-analyze` are always sent and `image` only for agent types
    /// that run container images.
    pub fn to_submission(&self) -> JobSubmission {
        let mut submission = JobSubmission::default();
        non_empty(&mut submission, "name", &self.name);
        non_empty(&mut submission, "description", &self.description);
        submission.text("agent-type", self.agent_type.as_str());
        if self.agent_type.uses_container_image() {
            non_empty(&mut submission, "image", &self.image);
        }
        non_empty(&mut submission, "cpus", &self.cpus);
        non_empty(&mut submission, "ram", &self.ram);
        non_empty(&mut submission, "timeout", &self.timeout);

        for (name, upload) in [("target", &self.target), ("corpus", &self.corpus)] {
            if let Some(upload) = upload {
                submission.file(name, &upload.file_name, upload.content.clone());
            }
        }
        submission.text("crash-auto-analyze", self.crash_auto_analyze.to_string());
        submission
    }
}

fn non_empty(submission: &mut JobSubmission, name: &str, value: &str) {
    if !value.is_empty() {
        submission.text(name, value);
    }
}

/// Values of the add-agent form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDraft {
    pub description: String,
    pub agent_type: AgentType,
    pub endpoint: String,
}

impl AgentDraft {
    pub fn to_request(&self) -> AgentCreateRequest {
        AgentCreateRequest {
            description: self.description.clone(),
            agent_type: self.agent_type,
            endpoint: self.endpoint.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Open,
    Closed,
}

/// A modal form holding a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalForm<D> {
    pub draft: D,
    state: FormState,
}

impl<D> ModalForm<D> {
    pub fn open(draft: D) -> Self {
        Self {
            draft,
            state: FormState::Open,
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == FormState::Open
    }

    pub fn close(&mut self) {
        self.state = FormState::Closed;
    }
}

/// How a mutation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed,
    /// The operator closed the confirmation dialog; nothing was sent.
    Dismissed,
}

pub struct MutationGateway {
    api: Arc<dyn FleetApi>,
    notifier: Arc<dyn Notifier>,
    confirmer: Arc<dyn Confirmer>,
}

impl MutationGateway {
    pub fn new(
        api: Arc<dyn FleetApi>,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        Self {
            api,
            notifier,
            confirmer,
        }
    }

    async fn toast(&self, toast: Toast) {
        if let Err(e) = self.notifier.notify(toast).await {
            warn!(error = %e, "Notification not delivered");
        }
    }

    async fn succeeded(&self, message: String) -> Outcome {
        self.toast(Toast::success(message)).await;
        Outcome::Succeeded
    }

    async fn failed(&self, error: &Error) -> Outcome {
        self.toast(Toast::error(error.status_text(), error.detail()))
            .await;
        Outcome::Failed
    }

    /// Submit the job form. The form closes only on success.
    pub async fn create_job(&self, form: &mut ModalForm<JobDraft>) -> Outcome {
        let submission = form.draft.to_submission();
        match self.api.create_job(submission).await {
            Ok(()) => {
                info!(name = %form.draft.name, "Job created");
                form.close();
                self.succeeded("Job successfully created!".to_string()).await
            }
            Err(e) => {
                warn!(error = %e, "Job creation rejected");
                self.failed(&e).await
            }
        }
    }

    /// Submit the agent form. The form closes as soon as the request is
    /// issued, whatever the answer.
    pub async fn create_agent(&self, form: &mut ModalForm<AgentDraft>) -> Outcome {
        let request = form.draft.to_request();
        form.close();
        match self.api.create_agent(&request).await {
            Ok(()) => {
                info!(endpoint = %request.endpoint, "Agent created");
                self.succeeded("Agent successfully created!".to_string())
                    .await
            }
            Err(e) => {
                warn!(error = %e, "Agent creation rejected");
                self.failed(&e).await
            }
        }
    }

    /// Ask for confirmation, then delete the agent and drop its card.
    pub async fn delete_agent(&self, guid: &AgentGuid, board: &mut AgentBoard) -> Outcome {
        let dialog = ConfirmDialog::new(format!("Agent {} is being deleted!", guid));
        match self.confirmer.confirm(&dialog).await {
            Ok(DialogButton::Ok) => {}
            Ok(DialogButton::Close) => {
                info!(guid = %guid, "Agent deletion dismissed");
                return Outcome::Dismissed;
            }
            Err(e) => {
                warn!(guid = %guid, error = %e, "Confirmation unavailable, agent kept");
                self.toast(Toast::error("Confirmation unavailable", e.to_string()))
                    .await;
                return Outcome::Failed;
            }
        }

        match self.api.delete_agent(guid).await {
            Ok(()) => {
                board.remove(guid);
                info!(guid = %guid, "Agent deleted");
                self.succeeded(format!("Agent {} has been successfully deleted!", guid))
                    .await
            }
            Err(e) => {
                warn!(guid = %guid, error = %e, "Agent deletion failed");
                self.failed(&e).await
            }
        }
    }

    /// Send the stop request. No confirmation is asked.
    pub async fn stop_job(&self, control: &StopControl) -> Outcome {
        let guid = control.guid();
        match self.api.stop_job(guid).await {
            Ok(()) => {
                info!(guid = %guid, "Job stop requested");
                self.succeeded("Job stop request sent!".to_string()).await
            }
            Err(e) => {
                warn!(guid = %guid, error = %e, "Job stop failed");
                self.failed(&e).await
            }
        }
    }
}

//! Deletion requests delivered by mail through the local `sendmail`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::application::ports::{CommandRunner, DeletionRequester};
use crate::domain::{Machine, NotifyError};
use crate::infra::signing::http_date;

/// Mails the provider's support address asking for machines to be removed.
pub struct SendmailRequester<R> {
    runner: R,
    sendmail: String,
    support_address: String,
    account: String,
}

impl<R: CommandRunner> SendmailRequester<R> {
    #[must_use]
    pub fn new(runner: R, sendmail: &str, support_address: &str, account: &str) -> Self {
        Self {
            runner,
            sendmail: sendmail.to_string(),
            support_address: support_address.to_string(),
            account: account.to_string(),
        }
    }
}

/// Compose the RFC 5322 message for a deletion batch.
#[must_use]
pub fn compose_message(
    machines: &[Machine],
    contact: &str,
    support_address: &str,
    account: &str,
    now: DateTime<Utc>,
) -> String {
    let mut message = format!(
        "From: {contact}\r\n\
         To: {support_address}\r\n\
         Cc: {contact}\r\n\
         Date: {date}\r\n\
         Subject: Please delete {count} machine(s) in account {account}\r\n\
         \r\n\
         Hello,\r\n\
         \r\n\
         The following machines in account {account} cannot be deleted through\r\n\
         the API in their current state. Please delete them.\r\n\
         \r\n",
        date = http_date(now).replace("GMT", "+0000"),
        count = machines.len(),
    );
    for machine in machines {
        message.push_str(&format!(
            "  {id}  {name}  {state}  created {created}\r\n",
            id = machine.id,
            name = machine.name.as_deref().unwrap_or("-"),
            state = machine.state,
            created = machine.created.format("%Y-%m-%dT%H:%M:%SZ"),
        ));
    }
    message.push_str(&format!("\r\nThanks,\r\n{contact}\r\n"));
    message
}

impl<R: CommandRunner> DeletionRequester for SendmailRequester<R> {
    async fn request_deletion(&self, machines: &[Machine], contact: &str) -> Result<()> {
        // The contact lands in From:/Cc:, so a CR or LF would add headers.
        if contact.chars().any(char::is_control) {
            return Err(NotifyError::InvalidContact(contact.to_string()).into());
        }
        let message = compose_message(
            machines,
            contact,
            &self.support_address,
            &self.account,
            Utc::now(),
        );
        let output = self
            .runner
            .run_with_stdin(&self.sendmail, &["-t"], message.as_bytes())
            .await
            .with_context(|| format!("running {}", self.sendmail))?;
        if !output.status.success() {
            return Err(NotifyError::Failed {
                count: machines.len(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        tracing::info!(count = machines.len(), to = %self.support_address, "deletion request sent");
        Ok(())
    }
}

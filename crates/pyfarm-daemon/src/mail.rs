//! Job completion e-mail, sent best-effort when a job rolls up to `done`
//! or `failed`. A transport failure is logged and never propagates back
//! into task/job state.

use lettre::{Message, SmtpTransport, Transport};

use pyfarm_core::job::{Job, JobState};
use pyfarm_core::settings::Settings;

fn render(job: &Job, successful: bool) -> String {
    let mut body = format!(
        "Job {} (id {}) has completed {} on {}.\n\n",
        job.title,
        job.id,
        if successful { "successfully" } else { "unsuccessfully" },
        job.time_finished.unwrap_or(0),
    );
    if let Some(link) = &job.output_link {
        body.push_str("See:\n");
        body.push_str(link);
        body.push_str("\n\n");
    }
    body.push_str("Sincerely,\n\tThe PyFarm render manager");
    body
}

/// Send the completion notice for `job`, if it has recipients and mail is
/// configured. A no-op otherwise; any SMTP failure is logged, not raised.
pub fn notify_job_completion(settings: &Settings, job: &Job) {
    let recipients: Vec<&str> = job.notified_users.iter().map(String::as_str).collect();
    if recipients.is_empty() {
        return;
    }
    let (Some(mail_server), Some(from_address)) = (&settings.mail_server, &settings.mail_from_address) else {
        return;
    };

    let successful = job.state == JobState::Done;
    let subject = format!("Job {} completed {}successfully", job.title, if successful { "" } else { "un" });
    let body = render(job, successful);

    let mut builder = Message::builder().subject(subject);
    match from_address.parse() {
        Ok(from) => builder = builder.from(from),
        Err(e) => {
            tracing::warn!(%from_address, error = %e, "invalid PYFARM_FROM_ADDRESS, skipping completion mail");
            return;
        }
    }
    for recipient in &recipients {
        match recipient.parse() {
            Ok(to) => builder = builder.to(to),
            Err(e) => tracing::warn!(%recipient, error = %e, "skipping malformed notified_users address"),
        }
    }

    let message = match builder.body(body) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(job_id = %job.id, error = %e, "could not build completion mail");
            return;
        }
    };

    let transport = match SmtpTransport::relay(mail_server) {
        Ok(transport) => transport.build(),
        Err(e) => {
            tracing::warn!(%mail_server, error = %e, "could not build SMTP transport");
            return;
        }
    };

    match transport.send(&message) {
        Ok(_) => tracing::info!(job_id = %job.id, title = %job.title, to = ?recipients, "sent job completion mail"),
        Err(e) => tracing::warn!(job_id = %job.id, error = %e, "failed to send job completion mail"),
    }
}

#[cfg(test)]
#[path = "mail_tests.rs"]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use modbot_core::{
    Action, Component, Delivery, Envelope, Headers, Payload, QueueError, Queuer, HEADER_TEAM,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::directory::AdminDirectory;
use crate::notices::{admin_notice, author_notice, reporter_notice};

/// Upper bound on a single outbound notification.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlagError {
    #[error("delivery {0} does not carry a message action")]
    NotAnAction(String),

    #[error("there were issues notifying all parties: {}", .0.join(", "))]
    Incomplete(Vec<&'static str>),
}

/// Consumes flagged-message deliveries and fans out notifications.
///
/// A failed notification never stops the others. Nothing is retried.
pub struct FlagWorker {
    outbound: Arc<dyn Queuer>,
    directory: Arc<dyn AdminDirectory>,
    send_timeout: Duration,
}

impl FlagWorker {
    pub fn new(outbound: Arc<dyn Queuer>, directory: Arc<dyn AdminDirectory>) -> Self {
        Self {
            outbound,
            directory,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Notify reporter, author and admins about one flagged message.
    pub async fn flag_message(&self, action: &Action) -> Result<(), FlagError> {
        let team_id = action.team_id();
        let mut failed = Vec::new();

        if let Err(e) = self.send(reporter_notice(action)).await {
            error!(team_id, error = %e, "Unable to notify reporting user");
            failed.push("reporter");
        }

        match author_notice(action) {
            Some(notice) => {
                if let Err(e) = self.send(notice).await {
                    error!(team_id, error = %e, "Unable to notify author");
                    failed.push("author");
                }
            }
            None => debug!(
                team_id,
                author = action.message.author_label(),
                "Flagged message has no human author; skipping author notice"
            ),
        }

        match self.directory.admin_channel(team_id).await {
            Ok(channel) => {
                let author = self.author_name(action).await;
                let permalink = self
                    .directory
                    .permalink(team_id, &action.channel.id, action.message_timestamp.as_str())
                    .await;
                let notice = admin_notice(action, &channel, &author, permalink.as_deref());
                if let Err(e) = self.send(notice).await {
                    error!(team_id, error = %e, "Unable to notify admins");
                    failed.push("admins");
                }
            }
            Err(e) => {
                error!(team_id, error = %e, "Unable to notify admins");
                failed.push("admins");
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(FlagError::Incomplete(failed))
        }
    }

    async fn author_name(&self, action: &Action) -> String {
        match action.message.user_id() {
            Some(user_id) => self
                .directory
                .user_name(action.team_id(), user_id)
                .await
                .unwrap_or_else(|| format!("<@{user_id}>")),
            None if action.message.is_bot() => action.message.author_label().to_string(),
            None => "unknown".to_string(),
        }
    }

    async fn send(&self, envelope: Envelope) -> Result<(), QueueError> {
        let mut headers = Headers::new();
        headers.insert(HEADER_TEAM.to_string(), envelope.destination.team_id.clone());
        let payload = Payload::from(envelope);
        match tokio::time::timeout(self.send_timeout, self.outbound.queue(&headers, &payload)).await
        {
            Ok(result) => result,
            Err(_) => Err(QueueError::Timeout(self.send_timeout.as_millis() as u64)),
        }
    }

    async fn handle(&self, delivery: Delivery) -> Result<(), FlagError> {
        let Payload::Action(action) = &delivery.payload else {
            return Err(FlagError::NotAnAction(delivery.id.to_string()));
        };
        self.flag_message(action).await
    }
}

#[async_trait]
impl Component for FlagWorker {
    fn name(&self) -> &str {
        "flag-worker"
    }

    async fn start(&self, mut rx: mpsc::Receiver<Delivery>) -> Result<()> {
        info!(outbound = self.outbound.name(), "FlagWorker started");
        while let Some(delivery) = rx.recv().await {
            let id = delivery.id;
            let team_id = delivery.payload.team_id().to_string();
            match self.handle(delivery).await {
                Ok(()) => info!(delivery_id = %id, team_id = %team_id, "Message flagged"),
                Err(e @ FlagError::NotAnAction(_)) => {
                    warn!(delivery_id = %id, error = %e, "Discarding delivery")
                }
                Err(e) => error!(delivery_id = %id, team_id = %team_id, error = %e, "Unable to flag message"),
            }
        }
        info!("FlagWorker stopped: queue closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use modbot_core::OutboundMessage;

    use crate::directory::StaticAdminDirectory;
    use crate::notices::{ADMIN_TITLE, AUTHOR_TEXT, REPORTER_TEXT};

    #[derive(Default)]
    struct Outbox {
        sent: Mutex<Vec<(Headers, Envelope)>>,
        fail_user: Option<&'static str>,
        stall_user: Option<&'static str>,
    }

    #[async_trait]
    impl Queuer for Outbox {
        fn name(&self) -> &str {
            "outbox"
        }

        async fn queue(&self, headers: &Headers, payload: &Payload) -> Result<(), QueueError> {
            let Payload::Notification(envelope) = payload else {
                return Err(QueueError::Config("expected a notification".into()));
            };
            if self.fail_user == Some(envelope.destination.user_id.as_str()) {
                return Err(QueueError::Transport("boom".into()));
            }
            if self.stall_user == Some(envelope.destination.user_id.as_str()) {
                std::future::pending::<()>().await;
            }
            self.sent
                .lock()
                .unwrap()
                .push((headers.clone(), envelope.clone()));
            Ok(())
        }
    }

    fn user_action() -> Action {
        serde_json::from_value(serde_json::json!({
            "type": "message_action",
            "callback_id": "flagMessage",
            "team": {"id": "TBLG57ECT", "domain": "buddybotdev"},
            "channel": {"id": "CBLPRTX3P", "name": "general"},
            "user": {"id": "UREPORTER", "name": "bill"},
            "action_ts": "1535885531.310842",
            "message_ts": "1535813905.000100",
            "message": {"type": "message", "user": "UAUTHOR", "text": "hello", "ts": "1535813905.000100"}
        }))
        .unwrap()
    }

    fn bot_action() -> Action {
        serde_json::from_value(serde_json::json!({
            "callback_id": "flagMessage",
            "team": {"id": "TBLG57ECT"},
            "channel": {"id": "CBLPRTX3P", "name": "general"},
            "user": {"id": "UREPORTER", "name": "bill"},
            "action_ts": "1536060699.383687",
            "message_ts": "1533595230.000090",
            "message": {"type": "message", "subtype": "bot_message", "bot_id": "BBL3GSL7K",
                        "username": "buddybot", "text": "Congrats", "ts": "1533595230.000090"}
        }))
        .unwrap()
    }

    fn directory() -> Arc<StaticAdminDirectory> {
        let mut channels = BTreeMap::new();
        channels.insert("TBLG57ECT".to_string(), "CADMIN01".to_string());
        Arc::new(StaticAdminDirectory::new(channels))
    }

    #[tokio::test]
    async fn notifies_reporter_author_and_admins() {
        let outbox = Arc::new(Outbox::default());
        let worker = FlagWorker::new(outbox.clone(), directory());

        worker.flag_message(&user_action()).await.unwrap();

        let sent = outbox.sent.lock().unwrap();
        assert_eq!(sent.len(), 3);
        for (headers, _) in sent.iter() {
            assert_eq!(headers.get(HEADER_TEAM).map(String::as_str), Some("TBLG57ECT"));
        }

        let (_, reporter) = &sent[0];
        assert!(reporter.ephemeral);
        assert_eq!(reporter.destination.user_id, "UREPORTER");
        assert_eq!(reporter.destination.channel_id, "CBLPRTX3P");
        assert_eq!(reporter.message, OutboundMessage::text(REPORTER_TEXT));

        let (_, author) = &sent[1];
        assert!(author.ephemeral);
        assert_eq!(author.destination.user_id, "UAUTHOR");
        assert_eq!(author.message.text, AUTHOR_TEXT);

        let (_, admins) = &sent[2];
        assert!(!admins.ephemeral);
        assert_eq!(admins.destination.channel_id, "CADMIN01");
        let attachment = &admins.message.attachments[0];
        assert_eq!(attachment.title, ADMIN_TITLE);
        let fields: Vec<(&str, &str)> = attachment
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.value.as_str()))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("message", "hello"),
                ("reporter", "bill"),
                ("author", "<@UAUTHOR>"),
                ("channel", "general"),
            ]
        );
        assert!(!attachment.fields[0].short);
        assert!(attachment.fields[1].short);
    }

    #[tokio::test]
    async fn bot_author_is_not_notified() {
        let outbox = Arc::new(Outbox::default());
        let worker = FlagWorker::new(outbox.clone(), directory());

        worker.flag_message(&bot_action()).await.unwrap();

        let sent = outbox.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].1.destination.user_id, "UREPORTER");
        let author_field = &sent[1].1.message.attachments[0].fields[2];
        assert_eq!(author_field.value, "buddybot");
    }

    #[tokio::test]
    async fn missing_admin_channel_still_notifies_users() {
        let outbox = Arc::new(Outbox::default());
        let worker = FlagWorker::new(outbox.clone(), Arc::new(StaticAdminDirectory::default()));

        let err = worker.flag_message(&user_action()).await.unwrap_err();
        assert_eq!(err, FlagError::Incomplete(vec!["admins"]));
        assert_eq!(outbox.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn reporter_failure_does_not_stop_the_rest() {
        let outbox = Arc::new(Outbox {
            fail_user: Some("UREPORTER"),
            ..Default::default()
        });
        let worker = FlagWorker::new(outbox.clone(), directory());

        let err = worker.flag_message(&user_action()).await.unwrap_err();
        assert_eq!(err, FlagError::Incomplete(vec!["reporter"]));
        assert!(err.to_string().contains("reporter"));
        assert_eq!(outbox.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn stalled_outbound_times_out_and_the_rest_still_send() {
        let outbox = Arc::new(Outbox {
            stall_user: Some("UREPORTER"),
            ..Default::default()
        });
        let worker = FlagWorker::new(outbox.clone(), directory())
            .with_send_timeout(Duration::from_millis(20));

        let err = worker.flag_message(&user_action()).await.unwrap_err();
        assert_eq!(err, FlagError::Incomplete(vec!["reporter"]));
        assert_eq!(outbox.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_author_id_is_unknown_to_admins() {
        let mut action = user_action();
        action.message.author = modbot_core::MessageAuthor::default();
        let outbox = Arc::new(Outbox::default());
        let worker = FlagWorker::new(outbox.clone(), directory());

        worker.flag_message(&action).await.unwrap();

        let sent = outbox.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].1.message.attachments[0].fields[2].value, "unknown");
    }

    #[tokio::test]
    async fn worker_drains_queue_until_closed() {
        let outbox = Arc::new(Outbox::default());
        let worker = FlagWorker::new(outbox.clone(), directory());
        let (tx, rx) = mpsc::channel(4);

        let mut headers = Headers::new();
        headers.insert(HEADER_TEAM.to_string(), "TBLG57ECT".to_string());
        tx.send(Delivery::new(headers.clone(), Payload::from(user_action())))
            .await
            .unwrap();
        tx.send(Delivery::new(
            headers,
            Payload::from(reporter_notice(&user_action())),
        ))
        .await
        .unwrap();
        drop(tx);

        worker.start(rx).await.unwrap();
        assert_eq!(outbox.sent.lock().unwrap().len(), 3);
    }
}

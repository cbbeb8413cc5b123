//! Notification envelopes for a flagged message.

use modbot_core::{Action, Address, Attachment, Envelope, Field, OutboundMessage};

pub const REPORTER_TEXT: &str =
    "Thank you for flagging the potential Code of Conduct violation. We will investigate.";

pub const AUTHOR_TEXT: &str = "One of your recent messages has been flagged as it may not comply with the Code of Conduct. One of our admins will investigate the context, but consider an empathetic review of your recent messages in the meantime.";

pub const ADMIN_TITLE: &str = "Message Flagged";

pub const ADMIN_DESCRIPTION: &str =
    "The following message has been flagged for a potential Code of Conduct violation.";

/// Ephemeral receipt for the user who flagged the message.
pub fn reporter_notice(action: &Action) -> Envelope {
    Envelope {
        destination: Address {
            team_id: action.team.id.clone(),
            channel_id: action.channel.id.clone(),
            user_id: action.user.id.clone(),
        },
        ephemeral: true,
        message: OutboundMessage::text(REPORTER_TEXT),
    }
}

/// Ephemeral notice for the author. `None` when a bot wrote the message.
pub fn author_notice(action: &Action) -> Option<Envelope> {
    let author = action.message.user_id()?;
    Some(Envelope {
        destination: Address {
            team_id: action.team.id.clone(),
            channel_id: action.channel.id.clone(),
            user_id: author.to_string(),
        },
        ephemeral: true,
        message: OutboundMessage::text(AUTHOR_TEXT),
    })
}

/// Summary posted to the admin channel.
pub fn admin_notice(
    action: &Action,
    admin_channel: &str,
    author_name: &str,
    permalink: Option<&str>,
) -> Envelope {
    let attachment = Attachment {
        title: ADMIN_TITLE.to_string(),
        title_link: permalink.unwrap_or_default().to_string(),
        description: ADMIN_DESCRIPTION.to_string(),
        fields: vec![
            Field::new("message", action.message.common.text.clone(), false),
            Field::new("reporter", action.user.name.clone(), true),
            Field::new("author", author_name, true),
            Field::new("channel", action.channel.name.clone(), true),
        ],
    };
    Envelope {
        destination: Address {
            team_id: action.team.id.clone(),
            channel_id: admin_channel.to_string(),
            user_id: String::new(),
        },
        ephemeral: false,
        message: OutboundMessage {
            text: String::new(),
            attachments: vec![attachment],
        },
    }
}

//! `modbot-flagging` — downstream worker for the `flagMessage` action.
//!
//! Each flagged message produces up to three notifications on an outbound
//! destination: a receipt to the reporter, a heads-up to the author, and a
//! summary to the workspace's admin channel.

pub mod directory;
pub mod notices;
pub mod worker;

pub use directory::{AdminDirectory, DirectoryError, StaticAdminDirectory};
pub use notices::{admin_notice, author_notice, reporter_notice, AUTHOR_TEXT, REPORTER_TEXT};
pub use worker::{FlagError, FlagWorker};

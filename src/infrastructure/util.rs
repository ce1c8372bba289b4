use std::fmt::Debug;

use poise::CreateReply;
use tracing::trace;

use crate::{Context, Error};

/// Creates a lazily initialized static regex variable with a constant regex expression.
#[macro_export]
macro_rules! lazy_regex {
    ($name:ident, $value:expr) => {
        static $name: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($value).expect("Regex contains body"));
    };
}

/// `CreateReply` does not implement `Debug`, so this wraps the parts worth tracing.
pub struct DebuggableReply(CreateReply);

impl DebuggableReply {
    pub fn new(value: &CreateReply) -> Self {
        Self(value.clone())
    }
}

impl Debug for DebuggableReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateReply")
            .field("content", &self.0.content)
            .field("embeds", &self.0.embeds)
            .field("ephemeral", &self.0.ephemeral)
            .field("allowed_mentions", &self.0.allowed_mentions)
            .finish()
    }
}

/// Sends `reply` to the invoking interaction, tracing its contents first.
pub async fn send_reply(ctx: Context<'_>, reply: CreateReply) -> Result<(), Error> {
    trace!("Sending reply: {:?}", DebuggableReply::new(&reply));
    ctx.send(reply).await?;
    Ok(())
}

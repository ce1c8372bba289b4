/*!

Best-effort direct messages to players affected by a team change.

Delivery failures (closed DMs, users who left the guild) are logged and dropped; the team change
they describe has already happened.

*/

use poise::serenity_prelude::{self as serenity, CreateMessage, UserId, futures::future};
use tracing::{trace, warn};

pub async fn notify(ctx: &serenity::Context, user: UserId, content: &str) {
    let message = CreateMessage::new().content(content);
    match user.direct_message(ctx, message).await {
        Ok(_) => trace!(user = %user, "Delivered team notification"),
        Err(e) => warn!(user = %user, "Failed to deliver team notification: {:?}", e),
    }
}

pub async fn notify_all<I>(ctx: &serenity::Context, users: I, content: &str)
where
    I: IntoIterator<Item = UserId>,
{
    future::join_all(users.into_iter().map(|user| notify(ctx, user, content))).await;
}

// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway event handling.
//!
//! Converts Discord messages into channel-agnostic [`InboundMessage`]s and
//! hands them to the [`MailRouter`]. Messages authored by the bot itself are
//! dropped here.

use std::sync::Arc;

use async_trait::async_trait;
use modmail_core::types::{Attachment, ChannelId, InboundMessage, MessageId, MessageOrigin};
use modmail_relay::MailRouter;
use serenity::all::{Context, EventHandler, Message, Ready};
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::author_of;

/// Serenity event handler feeding the mail router.
///
/// The router is installed after the client is built, since the router's
/// platform needs the client's HTTP handle. Messages arriving earlier are
/// dropped.
#[derive(Clone)]
pub struct ModmailHandler {
    router: Arc<OnceCell<Arc<MailRouter>>>,
}

impl ModmailHandler {
    pub fn new(router: Arc<OnceCell<Arc<MailRouter>>>) -> Self {
        Self { router }
    }
}

#[async_trait]
impl EventHandler for ModmailHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "connected to Discord gateway");
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.id == ctx.cache.current_user().id {
            return;
        }
        let Some(router) = self.router.get() else {
            debug!("router not installed yet, message dropped");
            return;
        };

        let origin = origin_of(&ctx, &msg).await;
        let inbound = to_inbound(&msg, origin);
        if let Err(e) = router.handle(inbound).await {
            error!(channel = %msg.channel_id, error = %e, "failed to handle message");
        }
    }
}

/// Resolves where a message was posted, including the category of guild
/// channels.
async fn origin_of(ctx: &Context, msg: &Message) -> MessageOrigin {
    if msg.guild_id.is_none() {
        return MessageOrigin::Direct;
    }
    let parent = match msg.channel_id.to_channel(ctx).await {
        Ok(channel) => channel
            .guild()
            .and_then(|c| c.parent_id)
            .map(|id| ChannelId(id.get().to_string())),
        Err(e) => {
            debug!(channel = %msg.channel_id, error = %e, "failed to resolve channel parent");
            None
        }
    };
    MessageOrigin::Guild { parent }
}

fn to_inbound(msg: &Message, origin: MessageOrigin) -> InboundMessage {
    InboundMessage {
        id: MessageId(msg.id.get().to_string()),
        author: author_of(&msg.author),
        channel: ChannelId(msg.channel_id.get().to_string()),
        origin,
        content: msg.content.clone(),
        attachments: msg
            .attachments
            .iter()
            .map(|a| Attachment {
                url: a.url.clone(),
                proxy_url: Some(a.proxy_url.clone()),
            })
            .collect(),
    }
}

// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discord platform adapter.
//!
//! [`DiscordPlatform`] implements [`ChatPlatform`] over serenity's HTTP
//! client; [`ModmailHandler`] receives gateway events and feeds them to the
//! mail router.

pub mod handler;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use modmail_config::model::DiscordConfig;
use modmail_core::types::{
    AdapterType, Author, ChannelId, ChannelMeta, HealthStatus, HistoryMessage, MessageId, Notice,
    RelayChannelSpec, UserId, UserProfile,
};
use modmail_core::{ChatPlatform, ModmailError, PluginAdapter};
use serenity::all::{
    ChannelId as DiscordChannelId, ChannelType, Client, CreateActionRow, CreateAttachment,
    CreateButton, CreateChannel, CreateEmbed, CreateEmbedAuthor, CreateMessage, GatewayIntents,
    GetMessages, GuildId, MessageId as DiscordMessageId, PermissionOverwrite,
    PermissionOverwriteType, Permissions, RoleId, Timestamp, User, UserId as DiscordUserId,
};
use serenity::http::{Http, HttpError};
use tracing::{debug, info};

pub use handler::ModmailHandler;

/// Discord's page size for message history requests.
const HISTORY_PAGE_SIZE: usize = 100;

/// Gateway intents the relay needs: guild channels, guild and direct
/// messages, and message content.
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
}

/// Builds a gateway client that delivers events to `handler`.
pub async fn build_client(
    config: &DiscordConfig,
    handler: ModmailHandler,
) -> Result<Client, ModmailError> {
    let token = config
        .token
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ModmailError::Config("discord.token is required".into()))?;

    Client::builder(token, intents())
        .event_handler(handler)
        .await
        .map_err(|e| ModmailError::channel("failed to build Discord client", e))
}

/// Parses a Discord snowflake id.
pub fn parse_snowflake(raw: &str, key: &str) -> Result<u64, ModmailError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .ok_or_else(|| ModmailError::Config(format!("{key} is not a valid Discord id: {raw:?}")))
}

fn channel_id(id: &ChannelId) -> Result<DiscordChannelId, ModmailError> {
    parse_snowflake(&id.0, "channel id").map(DiscordChannelId::new)
}

fn user_id(id: &UserId) -> Result<DiscordUserId, ModmailError> {
    parse_snowflake(&id.0, "user id").map(DiscordUserId::new)
}

fn message_id(id: &MessageId) -> Result<DiscordMessageId, ModmailError> {
    parse_snowflake(&id.0, "message id").map(DiscordMessageId::new)
}

/// Converts a Discord user into a message author.
pub fn author_of(user: &User) -> Author {
    Author {
        id: UserId(user.id.get().to_string()),
        tag: user.tag(),
        avatar_url: Some(user.face()),
    }
}

fn is_not_found(error: &serenity::Error) -> bool {
    matches!(
        error,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 404
    )
}

/// Size of the next history page when `collected` of `limit` messages are in.
fn next_page_size(limit: usize, collected: usize) -> usize {
    limit.saturating_sub(collected).min(HISTORY_PAGE_SIZE)
}

/// Discord implementation of [`ChatPlatform`] for one guild.
pub struct DiscordPlatform {
    http: Arc<Http>,
    guild: GuildId,
}

impl DiscordPlatform {
    pub fn new(http: Arc<Http>, config: &DiscordConfig) -> Result<Self, ModmailError> {
        let guild = config
            .guild_id
            .as_deref()
            .ok_or_else(|| ModmailError::Config("discord.guild_id is required".into()))?;
        let guild = GuildId::new(parse_snowflake(guild, "discord.guild_id")?);
        debug!(guild = %guild, "Discord platform created");
        Ok(Self { http, guild })
    }

    fn http(&self) -> &Http {
        &self.http
    }
}

#[async_trait]
impl PluginAdapter for DiscordPlatform {
    fn name(&self) -> &str {
        "discord"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Platform
    }

    async fn health_check(&self) -> Result<HealthStatus, ModmailError> {
        match self.http.get_current_user().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("Discord API unreachable: {e}"))),
        }
    }

    async fn shutdown(&self) -> Result<(), ModmailError> {
        info!("Discord platform shutting down");
        Ok(())
    }
}

#[async_trait]
impl ChatPlatform for DiscordPlatform {
    async fn guild_name(&self) -> Result<String, ModmailError> {
        let guild = self
            .guild
            .to_partial_guild(self.http())
            .await
            .map_err(|e| ModmailError::channel("failed to fetch guild", e))?;
        Ok(guild.name)
    }

    async fn send_dm(&self, user: &UserId, content: &str) -> Result<MessageId, ModmailError> {
        let sent = user_id(user)?
            .direct_message(self.http(), CreateMessage::new().content(content))
            .await
            .map_err(|e| ModmailError::channel(format!("failed to message user {user}"), e))?;
        Ok(MessageId(sent.id.get().to_string()))
    }

    async fn send_to_channel(
        &self,
        channel: &ChannelId,
        content: &str,
    ) -> Result<MessageId, ModmailError> {
        let sent = channel_id(channel)?
            .say(self.http(), content)
            .await
            .map_err(|e| ModmailError::channel(format!("failed to send to channel {channel}"), e))?;
        Ok(MessageId(sent.id.get().to_string()))
    }

    async fn create_relay_channel(
        &self,
        spec: &RelayChannelSpec,
    ) -> Result<ChannelId, ModmailError> {
        // The @everyone role shares the guild's id.
        let mut permissions = vec![PermissionOverwrite {
            allow: Permissions::empty(),
            deny: Permissions::VIEW_CHANNEL,
            kind: PermissionOverwriteType::Role(RoleId::new(self.guild.get())),
        }];
        if let Some(role) = &spec.staff_role {
            permissions.push(PermissionOverwrite {
                allow: Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES,
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Role(RoleId::new(parse_snowflake(
                    role,
                    "discord.staff_role_id",
                )?)),
            });
        }

        let builder = CreateChannel::new(spec.name.as_str())
            .kind(ChannelType::Text)
            .category(channel_id(&spec.category)?)
            .permissions(permissions);
        let created = self
            .guild
            .create_channel(self.http(), builder)
            .await
            .map_err(|e| ModmailError::channel("failed to create relay channel", e))?;

        debug!(channel = %created.id, name = %created.name, "relay channel created");
        Ok(ChannelId(created.id.get().to_string()))
    }

    async fn pin_message(
        &self,
        channel: &ChannelId,
        message: &MessageId,
    ) -> Result<(), ModmailError> {
        channel_id(channel)?
            .pin(self.http(), message_id(message)?)
            .await
            .map_err(|e| ModmailError::channel("failed to pin message", e))
    }

    async fn channel_exists(&self, channel: &ChannelId) -> Result<bool, ModmailError> {
        match self.http.get_channel(channel_id(channel)?).await {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(ModmailError::channel(
                format!("failed to look up channel {channel}"),
                e,
            )),
        }
    }

    async fn delete_channel(&self, channel: &ChannelId) -> Result<(), ModmailError> {
        channel_id(channel)?
            .delete(self.http())
            .await
            .map_err(|e| ModmailError::channel(format!("failed to delete channel {channel}"), e))?;
        Ok(())
    }

    async fn fetch_user(&self, user: &UserId) -> Result<UserProfile, ModmailError> {
        let fetched = user_id(user)?
            .to_user(self.http())
            .await
            .map_err(|e| ModmailError::channel(format!("failed to fetch user {user}"), e))?;
        Ok(UserProfile {
            id: user.clone(),
            name: fetched.name.clone(),
            tag: fetched.tag(),
            avatar_url: Some(fetched.face()),
        })
    }

    async fn send_notice(
        &self,
        channel: &ChannelId,
        notice: &Notice,
    ) -> Result<MessageId, ModmailError> {
        let mut author = CreateEmbedAuthor::new(notice.author_name.as_str());
        if let Some(icon) = &notice.author_icon {
            author = author.icon_url(icon.as_str());
        }
        let embed = CreateEmbed::new()
            .author(author)
            .colour(notice.color)
            .description(notice.description.as_str())
            .timestamp(Timestamp::now());

        let mut message = CreateMessage::new().embed(embed);
        if let Some(link) = &notice.link {
            message = message.components(vec![CreateActionRow::Buttons(vec![
                CreateButton::new_link(link.url.as_str()).label(link.label.as_str()),
            ])]);
        }

        let sent = channel_id(channel)?
            .send_message(self.http(), message)
            .await
            .map_err(|e| ModmailError::channel("failed to send notice", e))?;
        Ok(MessageId(sent.id.get().to_string()))
    }

    async fn fetch_history(
        &self,
        channel: &ChannelId,
        limit: usize,
    ) -> Result<Vec<HistoryMessage>, ModmailError> {
        let target = channel_id(channel)?;
        let mut collected = Vec::new();
        let mut before: Option<DiscordMessageId> = None;

        loop {
            let page_size = next_page_size(limit, collected.len());
            if page_size == 0 {
                break;
            }
            // Page size is at most HISTORY_PAGE_SIZE.
            let mut request = GetMessages::new().limit(page_size as u8);
            if let Some(id) = before {
                request = request.before(id);
            }
            let page = target
                .messages(self.http(), request)
                .await
                .map_err(|e| ModmailError::channel("failed to fetch channel history", e))?;

            let exhausted = page.len() < page_size;
            before = page.last().map(|m| m.id);
            collected.extend(page);
            if exhausted || before.is_none() {
                break;
            }
        }

        // Discord returns newest first.
        collected.reverse();
        Ok(collected
            .into_iter()
            .map(|m| HistoryMessage {
                author: author_of(&m.author),
                created_at: DateTime::<Utc>::from_timestamp(m.timestamp.unix_timestamp(), 0)
                    .unwrap_or_default(),
                content: m.content,
            })
            .collect())
    }

    async fn channel_meta(&self, channel: &ChannelId) -> Result<ChannelMeta, ModmailError> {
        let guild = self
            .guild
            .to_partial_guild(self.http())
            .await
            .map_err(|e| ModmailError::channel("failed to fetch guild", e))?;
        let fetched = self
            .http
            .get_channel(channel_id(channel)?)
            .await
            .map_err(|e| ModmailError::channel(format!("failed to fetch channel {channel}"), e))?;
        let channel_name = fetched
            .guild()
            .map(|c| c.name)
            .unwrap_or_else(|| channel.to_string());

        Ok(ChannelMeta {
            guild_icon_url: guild.icon_url(),
            guild_name: guild.name,
            channel_name,
        })
    }

    async fn send_file(
        &self,
        channel: &ChannelId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<MessageId, ModmailError> {
        let message = CreateMessage::new().add_file(CreateAttachment::bytes(bytes, file_name));
        let sent = channel_id(channel)?
            .send_message(self.http(), message)
            .await
            .map_err(|e| ModmailError::channel("failed to upload file", e))?;
        Ok(MessageId(sent.id.get().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_snowflake_accepts_ids() {
        assert_eq!(
            parse_snowflake(" 123456789012345678 ", "discord.guild_id").unwrap(),
            123456789012345678
        );
    }

    #[test]
    fn parse_snowflake_rejects_garbage() {
        assert!(parse_snowflake("abc", "discord.guild_id").is_err());
        assert!(parse_snowflake("0", "discord.guild_id").is_err());
        let err = parse_snowflake("-5", "discord.category_id").unwrap_err();
        assert!(err.to_string().contains("discord.category_id"));
    }

    #[test]
    fn history_pages_are_capped() {
        assert_eq!(next_page_size(250, 0), 100);
        assert_eq!(next_page_size(250, 200), 50);
        assert_eq!(next_page_size(250, 250), 0);
        assert_eq!(next_page_size(20, 0), 20);
    }

    #[test]
    fn intents_include_message_content() {
        assert!(intents().contains(GatewayIntents::MESSAGE_CONTENT));
        assert!(intents().contains(GatewayIntents::DIRECT_MESSAGES));
    }

    #[test]
    fn platform_requires_guild() {
        let http = Arc::new(Http::new("token"));
        let err = DiscordPlatform::new(http.clone(), &DiscordConfig::default()).err().unwrap();
        assert!(matches!(err, ModmailError::Config(_)));

        let config = DiscordConfig {
            guild_id: Some("42".into()),
            ..DiscordConfig::default()
        };
        let platform = DiscordPlatform::new(http, &config).unwrap();
        assert_eq!(platform.name(), "discord");
        assert_eq!(platform.adapter_type(), AdapterType::Platform);
    }
}

// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound message routing between user DMs and staff relay channels.

use std::sync::Arc;

use modmail_core::types::{InboundMessage, RelayChannelSpec};
use modmail_core::{
    ChannelId, ChatPlatform, Conversation, ConversationStore, ModmailError, PasteService, UserId,
};
use modmail_transcript::TranscriptRenderer;
use tracing::{debug, info, warn};

use crate::closer::{CloseOutcome, SessionCloser};
use crate::commands::{self, StaffCommand};
use crate::format::{self, Customizer, TemplateCustomizer, TemplateVars};
use crate::index::ConversationIndex;
use crate::reconcile::Reconciler;
use crate::writer::WriteQueue;
use crate::RelaySettings;

/// Posted in a relay-category channel that has no open conversation.
pub const USER_NOT_FOUND: &str = "an error occured, user is not found please delete this channel!";

/// Where relayed content is delivered.
enum Destination<'a> {
    User(&'a UserId),
    Channel(&'a ChannelId),
}

/// Routes inbound messages and owns the index of open conversations.
pub struct MailRouter {
    platform: Arc<dyn ChatPlatform>,
    store: Arc<dyn ConversationStore>,
    customizer: Arc<dyn Customizer>,
    renderer: TranscriptRenderer,
    index: Arc<ConversationIndex>,
    writer: WriteQueue,
    closer: SessionCloser,
    reconciler: Reconciler,
    settings: Arc<RelaySettings>,
}

impl MailRouter {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        store: Arc<dyn ConversationStore>,
        paste: Arc<dyn PasteService>,
        writer: WriteQueue,
        renderer: TranscriptRenderer,
        settings: RelaySettings,
    ) -> Self {
        let settings = Arc::new(settings);
        let index = Arc::new(ConversationIndex::new());
        let closer = SessionCloser::new(
            Arc::clone(&platform),
            Arc::clone(&store),
            paste,
            Arc::clone(&index),
            writer.clone(),
            Arc::clone(&settings),
        );
        let reconciler = Reconciler::new(Arc::clone(&platform), Arc::clone(&store), Arc::clone(&index));

        Self {
            platform,
            store,
            customizer: Arc::new(TemplateCustomizer::default()),
            renderer,
            index,
            writer,
            closer,
            reconciler,
            settings,
        }
    }

    /// Replaces the default greeting, intro and saved-line formatting.
    pub fn with_customizer(mut self, customizer: Arc<dyn Customizer>) -> Self {
        self.customizer = customizer;
        self
    }

    pub fn index(&self) -> &ConversationIndex {
        &self.index
    }

    pub fn closer(&self) -> &SessionCloser {
        &self.closer
    }

    pub fn reconciler(&self) -> Reconciler {
        self.reconciler.clone()
    }

    /// Loads stored conversations into the index and drops the ones whose
    /// relay channel is gone.
    pub async fn ready(&self) -> Result<(), ModmailError> {
        let loaded = self.index.load(self.store.list_conversations().await?);
        let removed = self.reconciler.reconcile_all().await;
        info!(loaded, removed, "conversation index ready");
        Ok(())
    }

    /// Handles one inbound message.
    pub async fn handle(&self, message: InboundMessage) -> Result<(), ModmailError> {
        if message.is_direct() {
            self.handle_direct(&message).await
        } else if message.is_under(&self.settings.category) {
            self.handle_staff(&message).await
        } else {
            Ok(())
        }
    }

    async fn handle_direct(&self, message: &InboundMessage) -> Result<(), ModmailError> {
        let Some(conversation) = self.index.by_user(&message.author.id) else {
            return self.open_conversation(message).await;
        };
        if !self.reconciler.reconcile_one(&conversation).await {
            return Ok(());
        }
        self.relay(message, &conversation.user, Destination::Channel(&conversation.channel))
            .await;
        Ok(())
    }

    async fn handle_staff(&self, message: &InboundMessage) -> Result<(), ModmailError> {
        if let Some(command) = commands::parse(&message.content, &self.settings.prefix) {
            return self.run_command(command, &message.channel).await;
        }

        match self.index.by_channel(&message.channel) {
            Some(conversation) => {
                self.relay(message, &conversation.user, Destination::User(&conversation.user))
                    .await;
            }
            None => self.post_user_not_found(&message.channel).await,
        }
        Ok(())
    }

    /// Opens a conversation for the author of a first DM.
    ///
    /// The first message is stored as the record's first history line and
    /// forwarded to the new relay channel.
    async fn open_conversation(&self, message: &InboundMessage) -> Result<(), ModmailError> {
        let author = &message.author;
        let Some(_creation) = self.index.begin_creation(&author.id) else {
            debug!(user = %author.id, "conversation creation already in flight, message dropped");
            return Ok(());
        };
        if let Some(conversation) = self.index.by_user(&author.id) {
            self.relay(message, &conversation.user, Destination::Channel(&conversation.channel))
                .await;
            return Ok(());
        }

        let guild = self.platform.guild_name().await?;
        let content = format::relay_content(&message.content, &message.attachments);
        let vars = TemplateVars {
            guild: &guild,
            author,
            role: self.settings.staff_role.as_deref(),
            content: &content,
        };

        if let Err(e) = self
            .platform
            .send_dm(&author.id, &self.customizer.greeting(&vars))
            .await
        {
            warn!(user = %author.id, error = %e, "failed to send greeting");
        }

        let channel = self
            .platform
            .create_relay_channel(&RelayChannelSpec {
                name: format::channel_name(author),
                category: self.settings.category.clone(),
                staff_role: self.settings.staff_role.clone(),
            })
            .await?;

        match self
            .platform
            .send_to_channel(&channel, &self.customizer.intro(&vars))
            .await
        {
            Ok(intro) => {
                if let Err(e) = self.platform.pin_message(&channel, &intro).await {
                    warn!(channel = %channel, error = %e, "failed to pin intro");
                }
            }
            Err(e) => warn!(channel = %channel, error = %e, "failed to post intro"),
        }

        let conversation = Conversation::new(
            author.id.clone(),
            channel.clone(),
            self.customizer.saved_line(&vars),
        );
        if let Err(e) = self.store.create_conversation(&conversation).await {
            if let Err(cleanup) = self.platform.delete_channel(&channel).await {
                warn!(
                    channel = %channel,
                    error = %cleanup,
                    "failed to remove relay channel of unsaved conversation"
                );
            }
            return Err(e);
        }
        self.index.insert(conversation);
        info!(user = %author.id, channel = %channel, "conversation opened");

        self.forward(Destination::Channel(&channel), &content).await;
        Ok(())
    }

    /// Saves a message to `user`'s history and forwards it.
    async fn relay(&self, message: &InboundMessage, user: &UserId, to: Destination<'_>) {
        let content = format::relay_content(&message.content, &message.attachments);
        if content.is_empty() {
            debug!(message = %message.id.0, "nothing to relay");
            return;
        }

        let line = self.customizer.saved_line(&TemplateVars {
            guild: "",
            author: &message.author,
            role: self.settings.staff_role.as_deref(),
            content: &content,
        });
        self.writer.enqueue(user, line);
        self.forward(to, &content).await;
    }

    async fn forward(&self, to: Destination<'_>, content: &str) {
        let result = match to {
            Destination::User(user) => self.platform.send_dm(user, content).await,
            Destination::Channel(channel) => self.platform.send_to_channel(channel, content).await,
        };
        if let Err(e) = result {
            warn!(error = %e, "failed to forward message");
        }
    }

    async fn post_user_not_found(&self, channel: &ChannelId) {
        if let Err(e) = self.platform.send_to_channel(channel, USER_NOT_FOUND).await {
            warn!(channel = %channel, error = %e, "failed to post lookup error");
        }
    }

    async fn run_command(
        &self,
        command: StaffCommand,
        channel: &ChannelId,
    ) -> Result<(), ModmailError> {
        match command {
            StaffCommand::Close { reason } => {
                let outcome = self.closer.close(channel, reason.as_deref()).await?;
                if outcome == CloseOutcome::NotFound {
                    self.post_user_not_found(channel).await;
                }
                Ok(())
            }
            StaffCommand::Transcript => self.post_transcript(channel).await,
        }
    }

    /// Renders the channel's recent history and posts it as an HTML file.
    async fn post_transcript(&self, channel: &ChannelId) -> Result<(), ModmailError> {
        let meta = self.platform.channel_meta(channel).await?;
        let history = self
            .platform
            .fetch_history(channel, self.settings.history_limit)
            .await?;
        let bytes = self.renderer.render(&meta, &history).await?;
        let file_name = format!("transcript-{}.html", meta.channel_name);
        self.platform.send_file(channel, &file_name, bytes).await?;
        info!(channel = %channel, messages = history.len(), "transcript posted");
        Ok(())
    }
}

// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message formatting and customization.

use modmail_config::model::MessagesConfig;
use modmail_core::types::{Attachment, Author};

const DEFAULT_GREETING: &str =
    "Hi by dming me you are creating a modmail with **{guild}** staff team!";
const DEFAULT_INTRO: &str = "**{user_tag}** ({user_id}) has created a new ticket";
const DEFAULT_SAVE_FORMAT: &str = "{user_tag} :: {content}";

/// Values available to message templates.
#[derive(Debug, Clone, Copy)]
pub struct TemplateVars<'a> {
    pub guild: &'a str,
    pub author: &'a Author,
    pub role: Option<&'a str>,
    pub content: &'a str,
}

impl TemplateVars<'_> {
    /// The author's name without a discriminator.
    pub fn username(&self) -> &str {
        username(&self.author.tag)
    }
}

/// Produces the user-facing and staff-facing texts of a conversation.
pub trait Customizer: Send + Sync {
    /// Sent to the user when their conversation opens.
    fn greeting(&self, vars: &TemplateVars<'_>) -> String;

    /// Posted and pinned in a new relay channel.
    fn intro(&self, vars: &TemplateVars<'_>) -> String;

    /// A history line for a relayed message.
    fn saved_line(&self, vars: &TemplateVars<'_>) -> String;
}

/// [`Customizer`] driven by configured templates.
///
/// Placeholders: `{guild}`, `{user}`, `{user_tag}`, `{user_id}`, `{role}`,
/// `{content}`.
#[derive(Debug, Clone, Default)]
pub struct TemplateCustomizer {
    greeting: Option<String>,
    intro: Option<String>,
    save_format: Option<String>,
}

impl TemplateCustomizer {
    pub fn new(config: &MessagesConfig) -> Self {
        Self {
            greeting: config.greeting.clone(),
            intro: config.intro.clone(),
            save_format: config.save_format.clone(),
        }
    }
}

impl Customizer for TemplateCustomizer {
    fn greeting(&self, vars: &TemplateVars<'_>) -> String {
        fill(self.greeting.as_deref().unwrap_or(DEFAULT_GREETING), vars)
    }

    fn intro(&self, vars: &TemplateVars<'_>) -> String {
        if let Some(template) = &self.intro {
            return fill(template, vars);
        }
        let intro = fill(DEFAULT_INTRO, vars);
        match vars.role {
            Some(role) => format!("<@&{role}>\n{intro}"),
            None => intro,
        }
    }

    fn saved_line(&self, vars: &TemplateVars<'_>) -> String {
        fill(self.save_format.as_deref().unwrap_or(DEFAULT_SAVE_FORMAT), vars)
    }
}

fn fill(template: &str, vars: &TemplateVars<'_>) -> String {
    template
        .replace("{guild}", vars.guild)
        .replace("{user_tag}", &vars.author.tag)
        .replace("{user_id}", &vars.author.id.0)
        .replace("{user}", vars.username())
        .replace("{role}", vars.role.unwrap_or_default())
        .replace("{content}", vars.content)
}

/// Text forwarded for a message: its content and first attachment, joined by
/// two spaces.
pub fn relay_content(content: &str, attachments: &[Attachment]) -> String {
    let mut parts = Vec::with_capacity(2);
    if !content.is_empty() {
        parts.push(content.to_string());
    }
    if let Some(attachment) = attachments.first() {
        parts.push(format!("[{}]", attachment.link()));
    }
    parts.join("  ")
}

/// Name of the relay channel created for a user.
pub fn channel_name(author: &Author) -> String {
    username(&author.tag).to_lowercase()
}

fn username(tag: &str) -> &str {
    match tag.rsplit_once('#') {
        Some((name, _)) if !name.is_empty() => name,
        _ => tag,
    }
}

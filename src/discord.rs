use crate::{
    config::Config,
    error::{RelayError, Result},
    models::ReplyMessage,
    router::{CommandRouter, Invocation},
    sink::ResponseSink,
};
use serenity::async_trait;
use serenity::http::Http;
use serenity::model::channel::Message;
use serenity::model::gateway::{GatewayIntents, Ready};
use serenity::model::id::ChannelId;
use serenity::prelude::*;
use serenity::Client;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Generate(String),
    Help,
}

pub fn parse_command(content: &str, prefix: &str) -> Option<ChatCommand> {
    let rest = content.trim_start().strip_prefix(prefix)?;
    let (name, args) = match rest.find(char::is_whitespace) {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };

    match name {
        "generate" => Some(ChatCommand::Generate(args.trim().to_string())),
        "help" => Some(ChatCommand::Help),
        _ => None,
    }
}

pub struct DiscordSink {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl DiscordSink {
    pub fn new(http: Arc<Http>, channel_id: ChannelId) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait]
impl ResponseSink for DiscordSink {
    async fn reply(&self, message: ReplyMessage) {
        if let Err(e) = self.channel_id.say(&self.http, message.into_string()).await {
            log::warn!(
                "Could not deliver reply to channel {}: {}",
                self.channel_id,
                e
            );
        }
    }
}

pub struct Bot {
    router: Arc<CommandRouter>,
}

impl Bot {
    pub fn new(router: Arc<CommandRouter>) -> Self {
        Self { router }
    }
}

#[async_trait]
impl EventHandler for Bot {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let prefix = self.router.command_prefix();
        let Some(command) = parse_command(&msg.content, prefix) else {
            return;
        };

        let sink = DiscordSink::new(Arc::clone(&ctx.http), msg.channel_id);
        match command {
            ChatCommand::Help => sink.reply(ReplyMessage::help(prefix)).await,
            ChatCommand::Generate(prompt) => {
                let invocation = Invocation {
                    requester_id: msg.author.id.to_string(),
                    sink: &sink,
                };
                self.router.handle(invocation, &prompt).await;
            }
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        log::info!("{} has connected to Discord!", ready.user.name);
    }
}

// serenity dispatches every event on its own task.
pub async fn run(config: &Config, router: Arc<CommandRouter>) -> Result<()> {
    let token = config
        .discord
        .token
        .as_deref()
        .ok_or_else(|| RelayError::Configuration("Discord token is required".into()))?;

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(token, intents)
        .event_handler(Bot::new(router))
        .await
        .map_err(|e| RelayError::Configuration(format!("Failed to create Discord client: {}", e)))?;

    client
        .start()
        .await
        .map_err(|e| RelayError::Network(format!("Discord client stopped: {}", e)))
}

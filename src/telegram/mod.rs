//! Telegram transport
//!
//! Long-polls `getUpdates`, parses slash commands and forwards them to the
//! dispatcher over an mpsc channel. Replies go out through `sendMessage`
//! in HTML parse mode.

pub mod handler;

pub use handler::CommandHandler;

use crate::config::TelegramConfig;
use crate::error::{BotError, Result};
use crate::notify::MessageSink;
use crate::social::LeaderboardMetric;
use crate::types::{ChatId, Direction, PowerUp, Symbol, UserId};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};

/// Who sent a command, and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatContext {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub display_name: String,
}

/// Commands understood by the game
#[derive(Debug, Clone, PartialEq)]
pub enum BotCommand {
    /// Register and show the welcome card
    Start,
    /// Open a round; random symbol when omitted
    Predict {
        symbol: Option<Symbol>,
        direction: Direction,
        whale: bool,
    },
    Profile,
    Leaderboard(LeaderboardMetric),
    /// Show the shop, or buy an item
    Shop(Option<PowerUp>),
    /// Claim the airdrop and show the daily challenge
    Daily,
    Results,
    Check,
    Challenge,
    TestApi,
    Help,
}

const PREDICT_USAGE: &str = "Usage: /predict [coin] up|down [whale]\nExample: /predict btc up";

/// Parse a message into a command.
///
/// `Ok(None)` for anything that is not a slash command, and for commands
/// addressed to a bot other than `me` (`/start@OtherBot`).
pub fn parse_command(text: &str, me: Option<&str>) -> Result<Option<BotCommand>> {
    let text = text.trim();
    let Some(body) = text.strip_prefix('/') else {
        return Ok(None);
    };

    let mut parts = body.split_whitespace();
    let head = parts.next().unwrap_or_default();
    let (cmd, target) = match head.split_once('@') {
        Some((cmd, target)) => (cmd, Some(target)),
        None => (head, None),
    };
    if let (Some(target), Some(me)) = (target, me) {
        if !target.eq_ignore_ascii_case(me) {
            return Ok(None);
        }
    }
    let cmd = cmd.to_lowercase();
    let args: Vec<&str> = parts.collect();

    let command = match cmd.as_str() {
        "start" => BotCommand::Start,
        "help" => BotCommand::Help,
        "predict" | "p" => parse_predict(&args)?,
        "profile" | "stats" => BotCommand::Profile,
        "leaderboard" | "top" => {
            BotCommand::Leaderboard(args.first().copied().unwrap_or_default().parse()?)
        }
        "shop" => match args.first() {
            Some(item) => BotCommand::Shop(Some(item.parse()?)),
            None => BotCommand::Shop(None),
        },
        "daily" | "airdrop" => BotCommand::Daily,
        "results" | "history" => BotCommand::Results,
        "check" => BotCommand::Check,
        "challenge" => BotCommand::Challenge,
        "test_api" => BotCommand::TestApi,
        other => {
            return Err(BotError::InvalidCommand(format!(
                "Unknown command: /{}\nUse /help for available commands",
                other
            )))
        }
    };
    Ok(Some(command))
}

fn parse_predict(args: &[&str]) -> Result<BotCommand> {
    let mut symbol = None;
    let mut direction = None;
    let mut whale = false;

    for arg in args {
        if matches!(arg.to_lowercase().as_str(), "whale" | "🐋") {
            whale = true;
        } else if let Ok(d) = arg.parse::<Direction>() {
            direction = Some(d);
        } else if let Ok(s) = arg.parse::<Symbol>() {
            symbol = Some(s);
        } else if symbol.is_some() {
            return Err(BotError::InvalidCommand(PREDICT_USAGE.to_string()));
        } else {
            return Err(BotError::UnknownSymbol(arg.to_string()));
        }
    }

    let direction = direction.ok_or_else(|| BotError::InvalidCommand(PREDICT_USAGE.to_string()))?;
    Ok(BotCommand::Predict { symbol, direction, whale })
}

#[derive(Debug, Deserialize)]
struct TelegramUpdate {
    update_id: i64,
    message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    from: Option<TelegramUser>,
    chat: TelegramChat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramUser {
    id: i64,
    #[serde(default)]
    is_bot: bool,
    first_name: String,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramChat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: ChatId,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

fn normalize_username(name: &str) -> Option<String> {
    let name = name.trim().trim_start_matches('@');
    (!name.is_empty()).then(|| name.to_string())
}

impl TelegramMessage {
    /// Context and text of a human-sent text message
    fn into_command_source(self) -> Option<(ChatContext, String)> {
        let from = self.from.filter(|u| !u.is_bot)?;
        let text = self.text?;
        let display_name = if from.first_name.trim().is_empty() {
            from.username.unwrap_or_else(|| "anon".to_string())
        } else {
            from.first_name
        };
        Some((
            ChatContext {
                chat_id: self.chat.id,
                user_id: from.id,
                display_name,
            },
            text,
        ))
    }
}

/// Telegram bot: command listener and message sink
pub struct TelegramBot {
    http: Client,
    base_url: String,
    poll_timeout_secs: u64,
    username: RwLock<Option<String>>,
    last_update_id: RwLock<i64>,
    command_tx: mpsc::Sender<(ChatContext, BotCommand)>,
}

impl TelegramBot {
    pub fn new(
        config: &TelegramConfig,
        command_tx: mpsc::Sender<(ChatContext, BotCommand)>,
    ) -> Result<Self> {
        // Client timeout must outlast the long poll
        let http = Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs + 10))
            .build()?;
        Ok(Self {
            http,
            base_url: format!("{}/bot{}", config.api_url.trim_end_matches('/'), config.bot_token),
            poll_timeout_secs: config.poll_timeout_secs,
            username: RwLock::new(config.bot_username.as_deref().and_then(normalize_username)),
            last_update_id: RwLock::new(0),
            command_tx,
        })
    }

    /// Poll for updates until the command channel closes
    pub async fn start_polling(self: Arc<Self>) {
        tracing::info!("Starting Telegram command listener...");

        if self.username.read().await.is_none() {
            match self.get_me().await {
                Ok(Some(name)) => {
                    tracing::info!("Listening as @{}", name);
                    *self.username.write().await = Some(name);
                }
                Ok(None) => tracing::warn!("getMe returned no username"),
                Err(e) => tracing::warn!("getMe failed, accepting commands for any bot: {}", e),
            }
        }

        loop {
            match self.poll_updates().await {
                Ok(updates) => {
                    for update in updates {
                        {
                            let mut last_id = self.last_update_id.write().await;
                            *last_id = update.update_id + 1;
                        }
                        let Some((ctx, text)) = update.message.and_then(TelegramMessage::into_command_source)
                        else {
                            continue;
                        };
                        if !self.handle_message(ctx, &text).await {
                            tracing::info!("Command channel closed, stopping Telegram listener");
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to poll Telegram updates: {}", e);
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    }

    async fn get_me(&self) -> Result<Option<String>> {
        let response: ApiResponse<TelegramUser> = self
            .http
            .get(format!("{}/getMe", self.base_url))
            .send()
            .await?
            .json()
            .await?;
        if !response.ok {
            return Err(BotError::Telegram(
                response.description.unwrap_or_else(|| "getMe failed".to_string()),
            ));
        }
        Ok(response.result.and_then(|u| u.username).as_deref().and_then(normalize_username))
    }

    async fn poll_updates(&self) -> Result<Vec<TelegramUpdate>> {
        let offset = *self.last_update_id.read().await;
        let url = format!(
            "{}/getUpdates?offset={}&timeout={}",
            self.base_url, offset, self.poll_timeout_secs
        );

        let response: ApiResponse<Vec<TelegramUpdate>> = self.http.get(&url).send().await?.json().await?;
        if !response.ok {
            return Err(BotError::Telegram(
                response.description.unwrap_or_else(|| "getUpdates failed".to_string()),
            ));
        }
        Ok(response.result.unwrap_or_default())
    }

    /// Returns false once the dispatcher is gone
    async fn handle_message(&self, ctx: ChatContext, text: &str) -> bool {
        let me = self.username.read().await.clone();
        match parse_command(text, me.as_deref()) {
            Ok(Some(cmd)) => {
                tracing::info!("Received {:?} from user {} in chat {}", cmd, ctx.user_id, ctx.chat_id);
                self.command_tx.send((ctx, cmd)).await.is_ok()
            }
            Ok(None) => true,
            Err(e) => {
                tracing::debug!("Rejected command {:?}: {}", text, e);
                if let Some(reply) = e.user_message() {
                    if let Err(e) = self.send_message(ctx.chat_id, &reply).await {
                        tracing::error!("Failed to send Telegram reply: {}", e);
                    }
                }
                true
            }
        }
    }
}

#[async_trait]
impl MessageSink for TelegramBot {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<()> {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let response: ApiResponse<serde_json::Value> = self
            .http
            .post(format!("{}/sendMessage", self.base_url))
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            return Err(BotError::Telegram(
                response.description.unwrap_or_else(|| "sendMessage failed".to_string()),
            ));
        }
        Ok(())
    }
}

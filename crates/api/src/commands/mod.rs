//! Command handlers behind the `emo` binary
//!
//! Every handler returns the API response as JSON; `listen` prints events as
//! they arrive and returns nothing.

mod listen;
mod room;

use anyhow::{Context, Result};
use emo_domain::{AccountInfo, BroadcastMsg, PlatformConfig, WebHook};
use emo_infra::{config, AsyncClient, ClientBuilder};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::cli::{
    AccountCommand, BroadcastCommand, Cli, Command, ConnectionArgs, RoomsCommand, WebhookCommand,
};

/// Run one parsed command line.
///
/// # Errors
///
/// Returns the configuration, credential or API error that stopped the
/// command.
pub async fn run(cli: Cli) -> Result<Option<Value>> {
    let config = cli.connection.resolve_config(|key| std::env::var(key).ok())?;
    let client = cli.connection.client_builder(config.clone()).build_async()?;
    debug!(plan = %client.plan(), "Client ready");

    match cli.command {
        Command::Account(action) => account(&client, action).await,
        Command::Rooms(RoomsCommand::List) => to_json(client.get_rooms_list().await?),
        Command::Rooms(RoomsCommand::Ids) => to_json(client.get_rooms_id().await?),
        Command::Stamps => to_json(client.get_stamps_list().await?),
        Command::Motions => to_json(client.get_motions_list().await?),
        Command::Webhook(action) => webhook(&client, action).await,
        Command::Room(args) => room::run(&client, args).await,
        Command::Broadcast(action) => broadcast(&client, action).await,
        Command::Listen(args) => {
            listen::run(&client, &config, args).await?;
            Ok(None)
        }
    }
}

impl ConnectionArgs {
    /// Load the configuration file, apply environment overrides through
    /// `lookup`, then apply the command-line flags.
    ///
    /// Validation is left to the client builder so that flags can supply
    /// values the file or environment lack.
    ///
    /// # Errors
    ///
    /// Returns `Config` when a file cannot be parsed or an override is
    /// invalid.
    pub fn resolve_config<F>(&self, lookup: F) -> emo_domain::Result<PlatformConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = self.config.clone().or_else(config::probe_config_paths);
        let base = match path {
            Some(path) => config::load_from_file(Some(path))?,
            None => PlatformConfig::default(),
        };
        let mut config = config::apply_env_overrides(base, lookup)?;

        if let Some(plan) = self.plan {
            config.plan = plan;
        }
        if let Some(key) = &self.api_key {
            config.api_key = Some(key.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint_url.clone_from(endpoint);
        }
        if let Some(dir) = &self.token_dir {
            config.token_dir.clone_from(dir);
        }
        Ok(config)
    }

    /// Client builder for `config` with the refresh token flag applied.
    pub fn client_builder(&self, config: PlatformConfig) -> ClientBuilder {
        let builder = ClientBuilder::from_config(config).user_agent(concat!(
            "emo-cli/",
            env!("CARGO_PKG_VERSION")
        ));
        match &self.refresh_token {
            Some(token) => builder.refresh_token(token.clone()),
            None => builder,
        }
    }
}

fn to_json<T: Serialize>(value: T) -> Result<Option<Value>> {
    let value = serde_json::to_value(value).context("failed to encode response")?;
    Ok(Some(value))
}

async fn account(client: &AsyncClient, action: AccountCommand) -> Result<Option<Value>> {
    match action {
        AccountCommand::Get => to_json(client.get_account_info().await?),
        AccountCommand::Delete => to_json(client.delete_account_info().await?),
        AccountCommand::Change(args) => {
            let info = AccountInfo {
                name: args.name,
                name_furigana: args.name_furigana,
                organization_name: args.organization_name,
                organization_unit_name: args.organization_unit_name,
                phone_number: args.phone_number,
            };
            to_json(client.change_account_info(&info).await?)
        }
    }
}

async fn webhook(client: &AsyncClient, action: WebhookCommand) -> Result<Option<Value>> {
    match action {
        WebhookCommand::Get => to_json(client.get_webhook_setting().await?),
        WebhookCommand::Create(args) => {
            let hook = WebHook::new(args.url).with_description(args.description);
            to_json(client.create_webhook_setting(&hook).await?)
        }
        WebhookCommand::Change(args) => {
            let hook = WebHook::new(args.url).with_description(args.description);
            to_json(client.change_webhook_setting(&hook).await?)
        }
        WebhookCommand::Delete => to_json(client.delete_webhook_setting().await?),
        WebhookCommand::Events { events } => to_json(client.register_webhook_event(&events).await?),
    }
}

async fn broadcast(client: &AsyncClient, action: BroadcastCommand) -> Result<Option<Value>> {
    match action {
        BroadcastCommand::List => to_json(client.get_broadcast_msgs_list().await?),
        BroadcastCommand::Get { message_id } => {
            to_json(client.get_broadcast_msg_details(message_id).await?)
        }
        BroadcastCommand::Create { title, text, executed_at, immediate } => {
            let message =
                BroadcastMsg { title, text, executed_at: executed_at.unwrap_or_default(), immediate };
            Ok(Some(client.create_broadcast_msg(&message).await?))
        }
    }
}

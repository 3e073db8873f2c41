use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use notion_splitter::dispatch::{NOTION_API_BASE, NotionClient};
use notion_splitter::{ItemOutput, ItemParams, Operation, Runner};
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "notion-splitter")]
#[command(about = "Split rich text into Notion blocks under the 2,000 character limit")]
#[command(version)]
struct Cli {
    /// Record a failed item and go on with the next one instead of stopping
    #[arg(long, global = true)]
    continue_on_fail: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Append rich text to a page, splitting it into as many blocks as needed
    Append {
        #[command(flatten)]
        input: InputArgs,

        /// Page (or block) to append to: id or page URL
        #[arg(long)]
        page_id: Option<String>,

        /// Blocks per API request (Notion accepts at most 100)
        #[arg(long, allow_negative_numbers = true)]
        batch_size: Option<i64>,

        /// Insert the blocks after this block id
        #[arg(long)]
        after: Option<String>,

        /// Pause between batch requests, in milliseconds (0 or less: none)
        #[arg(long, allow_negative_numbers = true)]
        delay_ms: Option<i64>,

        /// Notion integration token
        #[arg(long, env = "NOTION_API_KEY", hide_env_values = true)]
        token: String,

        #[arg(long, env = "NOTION_API_BASE", default_value = NOTION_API_BASE)]
        base_url: String,

        /// HTTP timeout per request, in seconds
        #[arg(long, default_value = "60")]
        timeout_secs: u64,
    },
    /// Split rich text into blocks and print a preview without calling Notion
    Split {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Rich text array as JSON, for a single item
    #[arg(long, conflicts_with = "items")]
    rich_text: Option<String>,

    /// JSON file holding one item object or an array of items
    /// (`-` reads stdin). Item fields override the flags below.
    #[arg(long)]
    items: Option<PathBuf>,

    /// Maximum characters per block
    #[arg(long, allow_negative_numbers = true)]
    max_chars: Option<i64>,

    /// paragraph, heading_1, heading_2, heading_3, quote or callout
    #[arg(long)]
    block_type: Option<String>,
}

impl InputArgs {
    fn defaults(&self) -> ItemParams {
        ItemParams {
            rich_text: self.rich_text.clone().map(Value::String),
            max_chars: self.max_chars,
            block_type: self.block_type.clone(),
            ..ItemParams::default()
        }
    }

    /// Items to process, each with unset fields taken from the flags
    fn load_items(&self, defaults: &ItemParams) -> Result<Vec<ItemParams>> {
        let Some(path) = &self.items else {
            if defaults.rich_text.is_none() {
                bail!("pass --rich-text or --items");
            }
            return Ok(vec![defaults.clone()]);
        };

        let raw = if path.as_os_str() == "-" {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read items from stdin")?;
            buf
        } else {
            std::fs::read_to_string(path)
                .context(format!("Failed to read items file {}", path.display()))?
        };

        let value: Value = serde_json::from_str(&raw).context("Items file is not valid JSON")?;
        let items: Vec<ItemParams> = match value {
            Value::Array(_) => serde_json::from_value(value),
            other => serde_json::from_value(other).map(|item| vec![item]),
        }
        .context("Items file does not match the item format")?;

        Ok(items.iter().map(|item| item.or_defaults(defaults)).collect())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    let outputs = match &cli.command {
        Command::Append {
            input,
            page_id,
            batch_size,
            after,
            delay_ms,
            token,
            base_url,
            timeout_secs,
        } => {
            let defaults = ItemParams {
                page_id: page_id.clone(),
                batch_size: *batch_size,
                after: after.clone(),
                delay_ms: *delay_ms,
                ..input.defaults()
            };
            let items = input.load_items(&defaults)?;

            let client = NotionClient::with_base_url(
                token.as_str(),
                base_url.as_str(),
                Duration::from_secs(*timeout_secs),
            )
            .context("Failed to build HTTP client")?;

            info!(items = items.len(), base_url = %base_url, "appending rich text");
            run(Operation::AppendRichText(&client), &items, cli.continue_on_fail).await?
        }
        Command::Split { input } => {
            let items = input.load_items(&input.defaults())?;
            run(Operation::SplitOnly, &items, cli.continue_on_fail).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&outputs)?);
    Ok(())
}

async fn run(
    operation: Operation<'_>,
    items: &[ItemParams],
    continue_on_fail: bool,
) -> Result<Vec<ItemOutput>> {
    Runner::new(operation)
        .continue_on_fail(continue_on_fail)
        .run(items)
        .await
        .map_err(|err| {
            let item = err.item();
            anyhow::Error::new(err).context(format!("Item {item} failed"))
        })
}

use std::path::PathBuf;
use bucket_store::config::{Backend, Config};
use bucket_store::engine::DurableStore;
use bucket_store::Store;
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Overrides BUCKET_STORE_DATA_DIR.
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Read and print values as hex instead of UTF-8 text.
    #[arg(long)]
    hex: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    Get { bucket: String, key: String },
    Put { bucket: String, key: String, value: String },
    Del { bucket: String, key: String },
    List {
        bucket: String,
        #[arg(short, long, default_value = "")]
        prefix: String,
    },
    Buckets,
}

#[derive(Serialize)]
struct Row<'a> {
    key: &'a str,
    value: String,
}

fn render(value: &[u8], as_hex: bool) -> String {
    if as_hex {
        hex::encode(value)
    } else {
        String::from_utf8_lossy(value).into_owned()
    }
}

fn run(store: &dyn Store, cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Get { bucket, key } => {
            let val = store.get(&bucket, &key)?;
            println!("{}", render(&val, cli.hex));
        }
        Commands::Put { bucket, key, value } => {
            let bytes = if cli.hex { hex::decode(&value)? } else { value.into_bytes() };
            store.put(&bucket, &key, &bytes)?;
            println!("OK");
        }
        Commands::Del { bucket, key } => {
            store.delete(&bucket, &key)?;
            println!("OK");
        }
        Commands::List { bucket, prefix } => {
            let entries = store.list(&bucket, &prefix)?;
            let rows: Vec<Row> = entries
                .iter()
                .map(|e| Row {
                    key: &e.key,
                    value: render(&e.value, cli.hex),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Commands::Buckets => {
            let list = store.buckets()?;
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let mut cli = Cli::parse();

    let config = Config::from_env()?.with_overrides(cli.data_dir.take(), Some(Backend::Durable))?;

    env_logger::Builder::new()
        .filter_level(config.log_level)
        .parse_default_env()
        .init();

    let store = DurableStore::open(&config.data_dir)?;

    let result = run(&store, cli);
    store.close()?;
    result
}

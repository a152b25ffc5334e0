// archive_main.rs
//
// archive_main store <traffic|accident> <file> [config.json]
// archive_main retrieve <traffic|accident> <cid> [config.json]
use hazard_broadcast::config::RunConfig;
use hazard_broadcast::monitoring::archive::{ArchiveKind, IpfsArchive};
use hazard_broadcast::monitoring::event_log::to_pretty_json;
use hazard_broadcast::{Error, Result};
use std::path::Path;

const USAGE: &str = "usage: archive_main <store|retrieve> <traffic|accident> <file|cid> [config.json]";

#[tokio::main]
async fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }
    if let Err(e) = run(&args).await {
        eprintln!("Archive error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: &[String]) -> Result<()> {
    let config = match args.get(3) {
        Some(path) => RunConfig::load(Path::new(path))?,
        None => RunConfig::default(),
    };
    let archive = IpfsArchive::from(&config.archive);
    let kind: ArchiveKind = args[1].parse()?;

    match args[0].as_str() {
        "store" => {
            let cid = archive.store_file(kind, Path::new(&args[2])).await?;
            println!("Stored {} data with CID: {}", kind, cid);
            println!("CID recorded in '{}'.", archive.ledger_path().display());
        }
        "retrieve" => {
            let content = archive.retrieve(kind, &args[2]).await?;
            println!("Retrieved {} content:", kind);
            println!("{}", String::from_utf8_lossy(&to_pretty_json(&content)?));
        }
        other => {
            return Err(Error::Archive(format!("unknown action `{}`; {}", other, USAGE)));
        }
    }
    Ok(())
}

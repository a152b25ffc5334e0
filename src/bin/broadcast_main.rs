// broadcast_main.rs
use hazard_broadcast::config::RunConfig;
use hazard_broadcast::monitoring::archive::{ArchiveKind, IpfsArchive};
use hazard_broadcast::monitoring::event_log::{verify_json_file, Verification};
use hazard_broadcast::monitoring::publisher::publish_records_async;
use hazard_broadcast::simulation_engine::broadcast::{run_rng, BroadcastSettings, EventBroadcastLoop};
use hazard_broadcast::simulation_engine::driver::SimulationDriver;
use hazard_broadcast::traci::launch;
use hazard_broadcast::Result;

#[tokio::main]
async fn main() {
    env_logger::init();
    println!("Starting hazard broadcast run...");
    if let Err(e) = run().await {
        eprintln!("Broadcast run error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = RunConfig::from_args()?;
    let mut sim = launch(&config).await?;

    let mut event_loop =
        EventBroadcastLoop::new(BroadcastSettings::from(&config), run_rng(config.seed));
    let log = event_loop.run(&mut sim).await?;

    let path = &config.output_path;
    log.write_json(path)?;
    println!(
        "Saved {} events from {} steps to '{}'.",
        log.len(),
        event_loop.ticks(),
        path.display()
    );

    if config.verify_output {
        match verify_json_file(path)? {
            Verification::Loaded { pretty, .. } => {
                println!("The file '{}' exists. Reading contents...", path.display());
                println!("Data successfully loaded:");
                println!("{}", pretty);
            }
            Verification::Invalid(reason) => {
                println!("Error: The file is not a valid JSON ({}).", reason);
            }
            Verification::Missing => {
                println!("The file '{}' does not exist.", path.display());
            }
        }
    }

    sim.close().await?;

    if config.archive.enabled {
        let cid = IpfsArchive::from(&config.archive)
            .store_file(ArchiveKind::Accident, path)
            .await?;
        println!("Stored accident data with CID: {}", cid);
    }

    if let Some(url) = &config.publish.amqp_url {
        publish_records_async(url.clone(), config.publish.queue.clone(), log.into_records())
            .await?;
    }
    Ok(())
}

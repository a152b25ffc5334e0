// snapshot_main.rs
use hazard_broadcast::config::{RunConfig, SnapshotLayout};
use hazard_broadcast::global_variables::QUEUE_TRAFFIC_DATA;
use hazard_broadcast::monitoring::archive::{ArchiveKind, IpfsArchive};
use hazard_broadcast::monitoring::publisher::publish_records_async;
use hazard_broadcast::simulation_engine::driver::SimulationDriver;
use hazard_broadcast::simulation_engine::snapshot::SnapshotRecorder;
use hazard_broadcast::traci::launch;
use hazard_broadcast::Result;
use log::warn;

#[tokio::main]
async fn main() {
    env_logger::init();
    println!("Starting traffic snapshot recording...");
    if let Err(e) = run().await {
        eprintln!("Snapshot run error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = RunConfig::from_args()?;
    let mut sim = launch(&config).await?;

    let output = config.snapshot.resolved_output();
    let recorder = SnapshotRecorder::from(&config.snapshot);
    let snapshots = recorder.run(&mut sim).await?;
    sim.close().await?;

    println!(
        "Traffic data for {} steps saved to '{}'.",
        snapshots.len(),
        output.display()
    );

    if config.archive.enabled {
        if config.snapshot.layout == SnapshotLayout::Aggregated {
            let cid = IpfsArchive::from(&config.archive)
                .store_file(ArchiveKind::Traffic, &output)
                .await?;
            println!("Stored traffic data with CID: {}", cid);
        } else {
            warn!(
                "Archiving needs the aggregated JSON layout, {:?} output is not archived.",
                config.snapshot.layout
            );
        }
    }

    if let Some(url) = &config.publish.amqp_url {
        publish_records_async(url.clone(), QUEUE_TRAFFIC_DATA.to_string(), snapshots).await?;
    }
    Ok(())
}

//! Prints the simulator's attraction catalog.

use wayward_gps::{GpsSimulator, LocationProvider};

pub(crate) async fn run() -> anyhow::Result<()> {
    let gps = GpsSimulator::without_latency();
    let catalog = gps.attractions().await?;

    println!("{} attractions", catalog.len());
    for attraction in catalog {
        println!(
            "{:>11.6} {:>12.6}  {} ({}, {})",
            attraction.location.latitude,
            attraction.location.longitude,
            attraction.name,
            attraction.city,
            attraction.state
        );
    }
    Ok(())
}

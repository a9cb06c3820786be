//! Quickstart: execute commands against a client's aggregate and read it
//! back.
//!
//! Demonstrates:
//! - Parsing client ids at the boundary
//! - Idempotent commands (a repeated `MakeItSo` appends nothing)
//! - Rolling snapshots written alongside decided events
//!
//! Run with: `cargo run --example quickstart`

use decider::{
    ClientId, JsonCodec, Repository, StreamOptions,
    aggregate::{Command, Service, stream_name},
    snapshot::SnapshotPolicy,
    store::inmemory,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let options = StreamOptions::default().with_snapshots(SnapshotPolicy::Always);
    let repository = Repository::new(inmemory::Store::new(JsonCodec)).with_options(options)?;
    let service = Service::new(repository);

    // 1. Malformed ids never reach a stream
    let rejected = service.read_raw("not-a-guid").await;
    println!("1. Reading `not-a-guid`: {}", rejected.unwrap_err());

    // 2. First command decides one event
    let id: ClientId = "6b8f2a3c-1d4e-4f5a-9b0c-7d6e5f4a3b2c".parse()?;
    println!("2. Before: {:?}", service.read(&id).await?);
    service.execute(&id, Command::MakeItSo).await?;
    println!("   After MakeItSo: {:?}", service.read(&id).await?);

    // 3. Repeating it is a no-op
    service.execute(&id, Command::MakeItSo).await?;

    println!("3. Stream `{}`:", stream_name(&id));
    for event in service
        .repository()
        .event_store()
        .events(&stream_name(&id))
    {
        println!(
            "   #{} {} {}",
            event.index,
            event.kind,
            String::from_utf8_lossy(&event.data)
        );
    }

    Ok(())
}

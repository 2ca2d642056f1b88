//! Bloom filter usage example for bloomkit
//!
//! This example demonstrates the three backends:
//! - An in-memory filter for de-duplicating a stream
//! - A file-backed filter that survives restarts
//! - Two remote filters sharing one list store
//!
//! Set `BLOOMKIT_REDIS_URL` and build with `--features redis` to run the
//! remote part against a real server instead of the in-process store.

use anyhow::Context;
use bloomkit::{BloomFilter, CompressionType, MemoryListStore, Options};

fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    println!("=== bloomkit Filter Example ===\n");

    example_memory()?;
    example_file()?;
    example_remote()?;

    println!("\n=== Example completed successfully ===");
    Ok(())
}

fn example_memory() -> anyhow::Result<()> {
    println!("--- In-memory filter ---");

    let mut filter = BloomFilter::in_memory(1 << 20, 5)?;
    let stream = ["alpha", "beta", "alpha", "gamma", "beta", "delta"];

    for item in stream {
        if filter.has_str(item)? {
            println!("  {} (duplicate, skipped)", item);
        } else {
            filter.put_str(item)?;
            println!("  {}", item);
        }
    }

    println!(
        "  {} bits set, estimated false positive rate {:.6}",
        filter.bits_set()?,
        filter.estimated_false_positive_rate(4)
    );
    filter.close()?;
    Ok(())
}

fn example_file() -> anyhow::Result<()> {
    println!("\n--- File-backed filter ---");

    let dir = std::env::temp_dir().join("bloomkit_demo");
    std::fs::create_dir_all(&dir).context("creating demo directory")?;
    let path = dir.join("seen.bloom");

    let options = Options::new()
        .capacity(8 << 20)
        .rounds(5)
        .compression(CompressionType::default());

    let mut filter = BloomFilter::open_file_with_options(&path, &options)?;
    let already = filter.bits_set()?;
    println!("  Opened {} with {} bits already set", path.display(), already);

    for i in 0..1000 {
        filter.put_str(&format!("https://example.com/page/{}", i))?;
    }
    filter.close()?;

    let size = std::fs::metadata(&path)?.len();
    println!("  Snapshot written: {} bytes", size);

    let reopened = BloomFilter::open_file_with_options(&path, &options)?;
    println!(
        "  After reopen, page 42 seen: {}",
        reopened.has_str("https://example.com/page/42")?
    );
    reopened.close()?;
    Ok(())
}

#[cfg(feature = "redis")]
fn example_remote() -> anyhow::Result<()> {
    use bloomkit::RedisListStore;

    match std::env::var("BLOOMKIT_REDIS_URL") {
        Ok(url) => {
            println!("\n--- Remote filter on {} ---", url);
            let store = RedisListStore::connect(&url)?;
            remote_pair(&store)
        }
        Err(_) => remote_in_process(),
    }
}

#[cfg(not(feature = "redis"))]
fn example_remote() -> anyhow::Result<()> {
    remote_in_process()
}

fn remote_in_process() -> anyhow::Result<()> {
    println!("\n--- Remote filter on an in-process store ---");
    let store = MemoryListStore::new();
    remote_pair(&store)
}

fn remote_pair<L: bloomkit::ListStore + Copy>(store: L) -> anyhow::Result<()> {
    // Same parameters, same key: the two filters share their bits
    let mut producer = BloomFilter::remote(store, 2000, 5)?;
    let consumer = BloomFilter::remote(store, 2000, 5)?;

    producer.put_str("job-17")?;
    println!("  Consumer sees job-17: {}", consumer.has_str("job-17")?);
    println!("  Consumer sees job-18: {}", consumer.has_str("job-18")?);
    println!("  Shared key: {}", producer.sink().key());

    producer.close()?;
    consumer.close()?;
    Ok(())
}

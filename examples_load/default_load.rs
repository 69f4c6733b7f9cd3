use std::time::{Duration, Instant};

use daily_log_sink::init::init_tracing;
use daily_log_sink::log_error;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Files go under ./logs/{info,error} unless DAILY_LOG_* says otherwise.
    let logger = init_tracing()?;

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        log_error!("default load test error {}", i);
    }

    let elapsed = start.elapsed();
    println!("default config: queued {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    // Give the flusher a little time to drain the queue
    std::thread::sleep(Duration::from_secs(2));
    println!("written: {}", logger.stats().written.load(std::sync::atomic::Ordering::Relaxed));
    Ok(())
}

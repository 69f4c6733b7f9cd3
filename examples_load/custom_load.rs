use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use daily_log_sink::clock::SystemClock;
use daily_log_sink::noop_sink::NoopSink;
use daily_log_sink::{log_info, Logger, LoggerConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = LoggerConfig {
        idle_pause: Duration::from_millis(50),
        ..LoggerConfig::default()
    };
    let logger = Arc::new(Logger::start_with_sink(&config, Arc::new(NoopSink), Arc::new(SystemClock))?);

    let threads: u64 = 8;
    let per_thread: u64 = 25_000;
    let start = Instant::now();

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..per_thread {
                    log_info!(logger: logger, "producer {} iteration {}", t, i);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("producer thread");
    }

    let n = threads * per_thread;
    let elapsed = start.elapsed();
    println!("custom config: {} producers queued {} events in {:?} (~{:.0} ev/s)",
        threads,
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    while logger.stats().written.load(Ordering::Relaxed) < n {
        thread::sleep(Duration::from_millis(10));
    }
    println!("flusher drained everything after {:?}", start.elapsed());
    Ok(())
}

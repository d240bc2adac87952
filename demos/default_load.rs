use std::sync::Arc;
use std::time::Instant;

use tracing::info;
use tracing_elastic_hook::init::{init_tracing_with_config, LayerConfig};
use tracing_elastic_hook::noop::NoopClient;
use tracing_elastic_hook::{ElasticHook, HookRegistry, Severity};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let hook = Arc::new(ElasticHook::new(Arc::new(NoopClient), "load-test", Severity::Info, "load")?);

    let mut hooks = HookRegistry::new();
    hooks.register("elastic", hook.clone());
    init_tracing_with_config(hooks, LayerConfig { enable_stdout: false })?;

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        info!(iteration = i, "load test event");
    }

    let elapsed = start.elapsed();
    println!("sent {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    hook.shutdown();
    Ok(())
}

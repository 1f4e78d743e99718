use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::process;

use schedsim::cli::{self, CliOptions};
use schedsim::snapshot::WriterSink;
use schedsim::{parse_workload, Machine, RunArtifact, SimError};

fn main() {
    let opts = cli::parse_args();

    tracing_subscriber::fmt()
        .with_max_level(opts.log.as_tracing())
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run(&opts) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(opts: &CliOptions) -> Result<(), SimError> {
    opts.config.validate()?;

    let table = match &opts.input {
        Some(path) => parse_workload(BufReader::new(File::open(path)?), opts.config.interval)?,
        None => parse_workload(io::stdin().lock(), opts.config.interval)?,
    };

    tracing::info!(
        cpus = opts.config.cpus as u64,
        algo = opts.config.algo.as_str(),
        procs = table.len() as u64,
        "starting simulation"
    );

    let mut sink = WriterSink::new(BufWriter::new(File::create(&opts.output)?));
    let mut machine = Machine::with_config(&opts.config, table, &mut sink);
    machine.run()?;
    let (total_ticks, table) = machine.finish();
    sink.finish()?;

    let stats = schedsim::stats::collect(&table);
    let mut stats_out = BufWriter::new(File::create(&opts.proc_stats)?);
    schedsim::stats::write_table(&mut stats_out, &stats)?;
    stats_out.flush()?;

    if let Some(path) = &opts.stats_json {
        let artifact = RunArtifact::new(&opts.config, total_ticks, &stats);
        let mut json_out = BufWriter::new(File::create(path)?);
        schedsim::stats::write_artifact(&mut json_out, &artifact)?;
        json_out.flush()?;
    }

    tracing::info!(total_ticks, "simulation complete");
    Ok(())
}

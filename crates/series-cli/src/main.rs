use std::future::Future;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser as _;
use series_core::{JsonCatalogStore, JsonStatsSink, RunReport, SeriesScraper};

mod cli;
mod logging;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    logging::init(cli.verbose).context("init logging")?;
    tracing::debug!(?cli, "parsed cli");

    let config = cli.scraper_config();
    tracing::info!(
        listing = %config.listing_url,
        start_page = config.start_page,
        end_page = config.end_page,
        "starting run"
    );

    let scraper = SeriesScraper::with_client_config(config, cli.client_config())
        .context("build http client")?;
    let store = JsonCatalogStore::new(&cli.data_file);
    let stats = JsonStatsSink::new(&cli.stats_file);

    // Only extraction and the in-memory merge can be aborted; once saving
    // starts the run is finished.
    let prepared = tokio::select! {
        result = with_deadline(scraper.prepare(&store), cli.run_timeout_secs) => result?,
        signal = tokio::signal::ctrl_c() => {
            signal.context("listen for interrupt")?;
            anyhow::bail!("interrupted; catalog left untouched");
        }
    };

    let report = prepared
        .commit(&store, &stats)
        .await
        .with_context(|| format!("save catalog: {}", cli.data_file.display()))?;

    print_summary(&report);
    Ok(())
}

async fn with_deadline<F>(work: F, timeout_secs: Option<u64>) -> anyhow::Result<F::Output>
where
    F: Future,
{
    match timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), work)
            .await
            .map_err(|_| anyhow::anyhow!("run timed out after {secs}s; catalog left untouched")),
        None => Ok(work.await),
    }
}

fn print_summary(report: &RunReport) {
    println!(
        "new series: {}, new episodes: {}",
        report.summary.series_added, report.summary.episodes_added
    );
    println!(
        "total series: {}, total episodes: {}, with watch url: {}",
        report.stats.total_series, report.stats.total_episodes, report.stats.episodes_with_watch_url
    );
}

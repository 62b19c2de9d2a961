//! mangaview: simulate a windowed reading session, list a catalog, or serve
//! a synthetic catalog.

use clap::Parser;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use mangaview_rs::config::{Command, ListArgs};
use mangaview_rs::session::{build_resolver, simulate_reading};
use mangaview_rs::{
    Args, CatalogConfig, CatalogServer, ChapterResolver, ContentSource, ReadConfig, SyntheticConfig,
    WindowEvent, WindowPresenter,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Parse command-line arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug {
        Level::DEBUG
    } else if args.silent {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Some(Command::Serve(serve)) => {
            let server = CatalogServer::new(CatalogConfig::from(serve));
            println!("Catalog service listening at {}", server.base_url());
            server.run().await
        }
        Some(Command::Read(read)) => read_series(ReadConfig::from(read)).await,
        Some(Command::List(list)) => list_series(list).await,
        None => read_series(ReadConfig::default()).await,
    }
}

async fn read_series(config: ReadConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let resolver = build_resolver(config.remote.as_deref(), &config.synthetic)?;
    let source = Arc::new(ContentSource::new(resolver));
    let presenter = WindowPresenter::new(source, config.window.clone())?;

    let mut events = presenter.subscribe();
    let watcher = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(WindowEvent::Extended { direction, added, evicted }) => debug!(
                    "Window grew {} by {} pages, evicted {}",
                    direction,
                    added.len(),
                    evicted.len()
                ),
                Ok(event) => debug!("{:?}", event),
                Err(RecvError::Lagged(skipped)) => debug!("Skipped {} window events", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let summary = simulate_reading(&presenter, &config).await?;
    drop(presenter);
    if let Err(err) = watcher.await {
        warn!("Window event logger stopped abnormally: {}", err);
    }

    info!(
        "Read {} pages of '{}', ending at {}; {} prefetches ({} failed), peak window {}, {} placeholders",
        summary.pages_read,
        config.series,
        summary
            .last_page
            .map(|p| p.to_string())
            .unwrap_or_else(|| "nothing".to_string()),
        summary.prefetches,
        summary.failed_prefetches,
        summary.peak_window,
        summary.placeholders
    );
    Ok(())
}

async fn list_series(args: ListArgs) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let synthetic = SyntheticConfig::from(args.synthetic);
    let resolver = build_resolver(args.remote.as_deref(), &synthetic)?;

    let series = resolver.popular_series().await?;
    info!("Found {} series", series.len());
    for entry in series {
        match entry.description {
            Some(description) => println!("{}\t{}\t{}", entry.id, entry.name, description),
            None => println!("{}\t{}", entry.id, entry.name),
        }
    }
    Ok(())
}

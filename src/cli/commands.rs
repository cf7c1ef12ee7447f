use std::path::{Path, PathBuf};

use tracing::warn;

use crate::app::{HarvestError, Result};
use crate::cli::ScrapeArgs;
use crate::config::Config;
use crate::scraper::{spawn_session, ChromeLauncher, RunOptions, SessionOutcome, SessionReport};
use crate::store::DedupIndex;

/// Join folder and file name, appending ".csv" when missing, and create the folder.
pub fn resolve_output(dir: &Path, file_name: &str) -> Result<PathBuf> {
    let file_name = file_name.trim();
    if dir.as_os_str().is_empty() || file_name.is_empty() {
        return Err(HarvestError::InvalidOptions(
            "Output folder path and filename cannot be empty.".into(),
        ));
    }

    let file_name = if file_name.to_lowercase().ends_with(".csv") {
        file_name.to_string()
    } else {
        format!("{}.csv", file_name)
    };

    std::fs::create_dir_all(dir)?;
    Ok(dir.join(file_name))
}

/// Load known addresses from an existing output file, falling back to an empty index.
pub fn preload_index(path: &Path) -> DedupIndex {
    if !path.exists() {
        return DedupIndex::new();
    }

    println!(
        "File exists. Will append new unique leads to: {}",
        path.display()
    );
    let index = DedupIndex::load(path).unwrap_or_else(|e| {
        warn!("Could not load previous file {}: {}", path.display(), e);
        println!("-> Could not load previous file '{}'. Error: {}", path.display(), e);
        DedupIndex::new()
    });
    println!("Loaded {} previously scraped addresses.", index.len());
    index
}

pub async fn scrape(config: &Config, args: ScrapeArgs) -> Result<SessionReport> {
    let dir = args
        .output_dir
        .unwrap_or_else(|| config.output.directory.clone());
    let file_name = args
        .file_name
        .unwrap_or_else(|| config.output.file_name.clone());
    let output = resolve_output(&dir, &file_name)?;

    let known = preload_index(&output);
    let options = RunOptions {
        keyword: args.keyword,
        location: args.location,
        country: args.country,
        target: args.leads,
        headless: config.scraper.headless && !args.show_browser,
        output,
        known,
    };

    let launcher = ChromeLauncher::new(config.scraper.clone());
    let mut handle = spawn_session(launcher, config.scraper.clone(), options);

    let cancel = handle.cancel_flag();
    let stop_listener = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("--- STOP SIGNAL SENT ---");
            cancel.cancel();
        }
    });

    while let Some(line) = handle.next_line().await {
        println!("{}", line);
    }

    let report = handle.finish().await;
    stop_listener.abort();
    let report = report?;

    let elapsed = report.finished_at - report.started_at;
    println!(
        "{}: {} new leads, {} duplicates, {} skipped in {}s",
        describe(&report.outcome),
        report.accepted,
        report.duplicates,
        report.skipped,
        elapsed.num_seconds()
    );

    Ok(report)
}

pub fn inspect(path: &Path) -> Result<()> {
    if !path.exists() {
        println!("No such file: {}", path.display());
        return Ok(());
    }

    let index = DedupIndex::load(path)?;
    println!(
        "{}: {} unique business addresses",
        path.display(),
        index.len()
    );
    Ok(())
}

fn describe(outcome: &SessionOutcome) -> String {
    match outcome {
        SessionOutcome::TargetReached => "Target reached".to_string(),
        SessionOutcome::Exhausted => "Search results exhausted".to_string(),
        SessionOutcome::Cancelled => "Stopped".to_string(),
        SessionOutcome::Failed(reason) => format!("Failed ({})", reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_output_appends_extension() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");

        let path = resolve_output(&out, "spas").unwrap();
        assert_eq!(path, out.join("spas.csv"));
        assert!(out.is_dir());
    }

    #[test]
    fn test_resolve_output_keeps_extension_any_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = resolve_output(dir.path(), "Leads.CSV").unwrap();
        assert_eq!(path, dir.path().join("Leads.CSV"));
    }

    #[test]
    fn test_resolve_output_rejects_empty_names() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            resolve_output(dir.path(), "  "),
            Err(HarvestError::InvalidOptions(_))
        ));
        assert!(matches!(
            resolve_output(Path::new(""), "leads"),
            Err(HarvestError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_preload_index_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(preload_index(&dir.path().join("new.csv")).is_empty());
    }

    #[test]
    fn test_preload_index_survives_bad_row() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Business Name,Full Business Address").unwrap();
        writeln!(file, "Cafe One,1 Main St").unwrap();
        writeln!(file, "Cafe Two,2 Oak Ave").unwrap();
        file.write_all(b"Caf\xe9,3 \xe9lm St\n").unwrap();
        drop(file);

        let index = preload_index(&path);
        assert_eq!(index.len(), 3);
        assert!(index.contains_key("1 Main St"));
        assert!(index.contains_key("2 Oak Ave"));
    }

    #[test]
    fn test_describe_outcomes() {
        assert_eq!(describe(&SessionOutcome::Cancelled), "Stopped");
        assert_eq!(
            describe(&SessionOutcome::Failed("no feed".into())),
            "Failed (no feed)"
        );
    }
}

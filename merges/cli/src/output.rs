//! Terminal rendering for records, team counts and changelog entries.

use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets};
use merges_lib::{
    BatchSnapshot, ChangelogEntry, ChangelogSide, MergeRecord, RetrievalError, TeamCount,
};
use owo_colors::{OwoColorize, Stream};

pub fn records_table(records: &[MergeRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Package",
            "Class",
            "Ubuntu",
            "Debian",
            "Age",
            "Teams",
            "Submitter",
        ]);

    for record in records {
        table.add_row(vec![
            Cell::new(&record.name),
            Cell::new(record.classification),
            Cell::new(&record.primary_version),
            Cell::new(&record.reference_version),
            Cell::new(format!("{}d", record.age_days)).set_alignment(CellAlignment::Right),
            Cell::new(record.groups.join(", ")),
            Cell::new(&record.submitter),
        ]);
    }

    table
}

pub fn teams_table(summary: &[TeamCount]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_header(vec!["Team", "Merges"]);

    for entry in summary {
        table.add_row(vec![
            Cell::new(&entry.team),
            Cell::new(entry.count).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

/// Notes on stderr which classifications are missing from a partial snapshot.
pub fn warn_failed_batches(snapshot: &BatchSnapshot) {
    for (classification, error) in &snapshot.failures {
        eprintln!(
            "{} {} report unavailable: {}",
            "warning:".if_supports_color(Stream::Stderr, |text| text.yellow()),
            classification,
            error
        );
    }
}

/// Prints one side's entry, or where to look instead when it is unavailable.
pub fn print_changelog_side(
    record: &MergeRecord,
    side: ChangelogSide,
    result: &Result<ChangelogEntry, RetrievalError>,
) {
    let version = side.version_of(record);
    let heading = format!(
        "{} {} ({})",
        side.distribution(),
        record.name,
        version
    );
    println!("{}", heading.if_supports_color(Stream::Stdout, |text| text.bold()));

    match result {
        Ok(entry) => {
            if entry.is_fallback() {
                println!(
                    "{}",
                    format!("No entry for {version}; showing the latest entry instead.")
                        .if_supports_color(Stream::Stdout, |text| text.yellow())
                );
                println!("Versions in this changelog: {}", entry.versions.join(", "));
                println!();
            }
            println!("{}", entry.text);
        }
        Err(error) => {
            tracing::debug!(error = %error, attempts = error.attempt_count(), "changelog unavailable");
            println!(
                "{}",
                "Changelog unavailable.".if_supports_color(Stream::Stdout, |text| text.red())
            );
            if let Some(link) = error.external_link() {
                println!(
                    "View it at {}",
                    link.if_supports_color(Stream::Stdout, |text| text.cyan())
                );
            }
        }
    }
}

pub fn print_error(error: &dyn std::error::Error) {
    eprintln!(
        "{} {}",
        "error:".if_supports_color(Stream::Stderr, |text| text.red()),
        error
    );
    let mut source = error.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}

use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use datsmith_core::Statistics;

use super::RunContext;
use crate::error::CliError;

/// Format a byte count as a human-readable string (e.g., "512 KB", "4 MB").
pub(crate) fn format_bytes(bytes: u64) -> String {
    if bytes >= 1024 * 1024 && bytes.is_multiple_of(1024 * 1024) {
        format!("{} MB", bytes / (1024 * 1024))
    } else if bytes >= 1024 && bytes.is_multiple_of(1024) {
        format!("{} KB", bytes / 1024)
    } else {
        format!("{} bytes", bytes)
    }
}

pub(crate) async fn run_stats(
    ctx: &RunContext,
    inputs: &[PathBuf],
    json: bool,
) -> Result<(), CliError> {
    let report = datsmith_lib::run_stats(inputs, ctx.parallelism).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for input in &report.inputs {
        log::info!(
            "{} [{}]",
            input.name.if_supports_color(Stdout, |t| t.bold()),
            input.path.display().if_supports_color(Stdout, |t| t.cyan()),
        );
        print_stats(&input.stats);
        log::info!("");
    }

    if report.inputs.len() > 1 {
        log::info!("{}", "Total".if_supports_color(Stdout, |t| t.bold()));
        print_stats(&report.total);
    }
    Ok(())
}

fn print_stats(stats: &Statistics) {
    log::info!(
        "  Items: {} ({} roms, {} disks, {} samples, {} biossets, {} releases, {} archives)",
        stats.item_count,
        stats.rom_count,
        stats.disk_count,
        stats.sample_count,
        stats.biosset_count,
        stats.release_count,
        stats.archive_count,
    );
    log::info!("  Total size: {}", format_bytes(stats.total_size));
    log::info!(
        "  Hashes: {} crc, {} md5, {} sha1, {} sha256, {} sha384, {} sha512",
        stats.crc_count,
        stats.md5_count,
        stats.sha1_count,
        stats.sha256_count,
        stats.sha384_count,
        stats.sha512_count,
    );

    let nodump = if stats.nodump_count > 0 {
        format!(
            "{} nodump",
            stats.nodump_count.if_supports_color(Stdout, |t| t.yellow())
        )
    } else {
        "0 nodump".to_string()
    };
    log::info!(
        "  Status: {} good, {} baddump, {}, {} verified",
        stats.good_count,
        stats.baddump_count,
        nodump,
        stats.verified_count,
    );
}

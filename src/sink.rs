//! Result Sink
//!
//! Serializes each channel's latency series to a text artifact in the output
//! directory, one unsigned nanosecond value per line in sample order, no
//! header and no trailing metadata. Artifact names encode the channel, block
//! size and parallelism of the run:
//! `<outputDir>/<channelName>_el<blockSize>_par<parallelism>.txt`.
//!
//! The sink runs strictly after the coordinator has joined every sampler
//! thread, so all writes are single-threaded. Any I/O failure aborts the
//! remaining sweep.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::BenchConfig;
use crate::coordinator::RunResult;
use crate::error::{BenchError, BenchResult};

/// File name of the run metadata artifact.
pub const METADATA_FILE: &str = "_metadata.txt";

/// Artifact file name for one channel of one sweep step.
pub fn artifact_name(channel: &str, block_size: usize, parallelism: usize) -> String {
    format!("{channel}_el{block_size}_par{parallelism}.txt")
}

/// Full artifact path for one channel of one sweep step.
pub fn artifact_path(
    dir: &Path,
    channel: &str,
    block_size: usize,
    parallelism: usize,
) -> PathBuf {
    dir.join(artifact_name(channel, block_size, parallelism))
}

/// Create the output directory tree.
pub fn prepare_output_dir(dir: &Path) -> BenchResult<()> {
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Write one artifact per channel of `result`.
pub fn write_run(
    dir: &Path,
    result: &RunResult,
    block_size: usize,
    parallelism: usize,
) -> BenchResult<()> {
    for (channel, series) in result {
        let path = artifact_path(dir, channel, block_size, parallelism);

        let mut body = String::with_capacity(series.len() * 8);
        for sample in series {
            // writing to a String cannot fail
            let _ = writeln!(body, "{sample}");
        }
        fs::write(&path, body)?;

        info!(
            path = %path.display(),
            samples = series.len(),
            "wrote latency series"
        );
    }
    Ok(())
}

/// Write the `_metadata.txt` artifact describing the run environment and the
/// resolved configuration.
pub fn write_metadata(dir: &Path, config: &BenchConfig) -> BenchResult<()> {
    let host = hostname::get()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string());
    let rendered_config = toml::to_string_pretty(config)
        .map_err(|err| BenchError::Configuration(format!("cannot render configuration: {err}")))?;

    let body = format!(
        "timestamp: {}\nhost: {}\nos: {} ({})\n\n[configuration]\n{}",
        chrono::Utc::now().to_rfc3339(),
        host,
        std::env::consts::OS,
        std::env::consts::ARCH,
        rendered_config,
    );
    fs::write(dir.join(METADATA_FILE), body)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn artifact_names_encode_channel_block_and_parallelism() {
        assert_eq!(artifact_name("FIFO_I32", 16, 4), "FIFO_I32_el16_par4.txt");
        assert_eq!(artifact_name("FIFO_U64", 1024, 1), "FIFO_U64_el1024_par1.txt");
    }

    #[test]
    fn series_are_written_one_value_per_line_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut result = RunResult::new();
        result.insert("FIFO_I32".to_string(), vec![300, 100, 200]);

        write_run(dir.path(), &result, 16, 2).unwrap();

        let body = fs::read_to_string(dir.path().join("FIFO_I32_el16_par2.txt")).unwrap();
        assert_eq!(body, "300\n100\n200\n");
    }

    #[test]
    fn every_channel_gets_its_own_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let result: RunResult = BTreeMap::from([
            ("a".to_string(), vec![1]),
            ("b".to_string(), vec![2]),
            ("c".to_string(), vec![3]),
        ]);

        write_run(dir.path(), &result, 8, 1).unwrap();

        for name in ["a", "b", "c"] {
            assert!(artifact_path(dir.path(), name, 8, 1).exists());
        }
    }

    #[test]
    fn prepare_creates_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("sweep").join("long");
        prepare_output_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn unwritable_artifact_path_raises_io() {
        let dir = tempfile::tempdir().unwrap();
        // occupy the artifact path with a directory so the write must fail
        fs::create_dir(dir.path().join("x_el4_par1.txt")).unwrap();

        let result: RunResult = BTreeMap::from([("x".to_string(), vec![1, 2])]);
        assert!(matches!(
            write_run(dir.path(), &result, 4, 1),
            Err(BenchError::Io(_))
        ));
    }

    #[test]
    fn metadata_records_host_and_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let config = BenchConfig::default();
        write_metadata(dir.path(), &config).unwrap();

        let body = fs::read_to_string(dir.path().join(METADATA_FILE)).unwrap();
        assert!(body.contains("host: "));
        assert!(body.contains("[configuration]"));
        assert!(body.contains("resource"));
    }
}

use std::path::{Path, PathBuf};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio::fs;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::document::{NormalizeReport, Normalizer};
use crate::error::{Result, SubnormError};

const SUBTITLE_EXTENSIONS: [&str; 2] = ["ass", "ssa"];

/// Outcome of a directory run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub files_processed: usize,
    pub files_failed: usize,
    pub report: NormalizeReport,
}

pub struct Workflow {
    config: Config,
    normalizer: Normalizer,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let normalizer = Normalizer::new(&config.normalize);

        Ok(Self { config, normalizer })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Caption texts one event text would be turned into
    pub fn preview(&self, text: &str) -> Vec<String> {
        self.normalizer.retimer().chunks(text)
    }

    /// Normalize a single subtitle file, rewriting it in place when no output is given
    pub async fn process_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Option<Q>,
    ) -> Result<NormalizeReport> {
        let input_path = input_path.as_ref();
        info!("Processing subtitle file: {}", input_path.display());

        if !input_path.exists() {
            return Err(SubnormError::FileNotFound(input_path.display().to_string()));
        }

        let output_path = match output_path {
            Some(path) => path.as_ref().to_path_buf(),
            None => input_path.to_path_buf(),
        };

        let content = decode_script(&fs::read(input_path).await?)?;
        let normalized = self.normalizer.normalize(&content);

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        fs::write(&output_path, normalized.content).await?;

        let report = normalized.report;
        info!(
            "Wrote {}: {} events in, {} events out, {} split, {} malformed",
            output_path.display(),
            report.events_read,
            report.events_written,
            report.events_split,
            report.malformed_lines
        );
        Ok(report)
    }

    /// Normalize every .ass/.ssa file under a directory
    pub async fn process_directory<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_dir: P,
        output_dir: Option<Q>,
    ) -> Result<BatchSummary> {
        let input_dir = input_dir.as_ref();
        info!("Processing directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(SubnormError::Config("Input path is not a directory".to_string()));
        }

        // Determine output directory
        let output_dir = match output_dir {
            Some(dir) => dir.as_ref().to_path_buf(),
            None => input_dir.to_path_buf(),
        };

        // Create output directory if it doesn't exist
        fs::create_dir_all(&output_dir).await?;

        let subtitle_files = find_subtitle_files(input_dir);
        info!("Found {} subtitle files to process", subtitle_files.len());

        let pb = ProgressBar::new(subtitle_files.len() as u64);
        pb.set_style(ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"));

        let mut summary = BatchSummary::default();
        for subtitle_path in subtitle_files {
            let relative = pathdiff::diff_paths(&subtitle_path, input_dir)
                .unwrap_or_else(|| PathBuf::from(subtitle_path.file_name().unwrap_or_default()));
            let output_path = output_dir.join(&relative);
            pb.set_message(relative.display().to_string());

            match self.process_file(&subtitle_path, Some(&output_path)).await {
                Ok(report) => {
                    summary.files_processed += 1;
                    summary.report.absorb(&report);
                }
                Err(e) => {
                    summary.files_failed += 1;
                    warn!("Failed to process {}: {}", subtitle_path.display(), e);
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        info!(
            "Batch finished: {} files processed, {} failed",
            summary.files_processed, summary.files_failed
        );
        Ok(summary)
    }
}

/// Decode script bytes by their byte order mark; UTF-16 scripts are written back as UTF-8
fn decode_script(bytes: &[u8]) -> Result<String> {
    let (body, big_endian) = match bytes {
        [0xFF, 0xFE, rest @ ..] => (rest, false),
        [0xFE, 0xFF, rest @ ..] => (rest, true),
        _ => {
            return String::from_utf8(bytes.to_vec())
                .map_err(|e| SubnormError::Encoding(format!("invalid UTF-8: {}", e)));
        }
    };

    if body.len() % 2 != 0 {
        return Err(SubnormError::Encoding("truncated UTF-16 data".to_string()));
    }
    let units = body.chunks_exact(2).map(|pair| {
        if big_endian {
            u16::from_be_bytes([pair[0], pair[1]])
        } else {
            u16::from_le_bytes([pair[0], pair[1]])
        }
    });

    // Byte order mark carries over as UTF-8
    let mut content = String::from('\u{FEFF}');
    for unit in char::decode_utf16(units) {
        let ch = unit.map_err(|e| SubnormError::Encoding(format!("invalid UTF-16: {}", e)))?;
        content.push(ch);
    }
    Ok(content)
}

fn find_subtitle_files(input_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(input_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| SUBTITLE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        })
        .map(|entry| entry.path().to_path_buf())
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = "[Events]\n\
Dialogue: 0,0:00:00.00,0:00:04.00,Default,,0,0,0,,alpha bravo delta gamma omega sigma kappa theta lemon mango\n";

    fn workflow() -> Workflow {
        let mut config = Config::default();
        config.normalize.max_symbols = 42;
        Workflow::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_process_file_to_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("episode.ass");
        let output = dir.path().join("out").join("episode.ass");
        std::fs::write(&input, SCRIPT).unwrap();

        let report = workflow().process_file(&input, Some(&output)).await.unwrap();
        assert_eq!(report.events_read, 1);
        assert_eq!(report.events_written, 1);

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            written,
            "[Events]\nDialogue: 0,0:00:00.000,0:00:04.000,Default,,0,0,0,,alpha bravo delta gamma omega\\Nsigma kappa theta lemon mango\n"
        );
        // Input is left alone when an output path is given
        assert_eq!(std::fs::read_to_string(&input).unwrap(), SCRIPT);
    }

    #[tokio::test]
    async fn test_process_file_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("episode.ass");
        std::fs::write(&input, SCRIPT).unwrap();

        workflow().process_file(&input, None::<&Path>).await.unwrap();
        let written = std::fs::read_to_string(&input).unwrap();
        assert!(written.contains("0:00:04.000"));
    }

    fn utf16le(text: &str) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
        bytes
    }

    #[tokio::test]
    async fn test_process_utf16_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("episode.ass");
        let output = dir.path().join("episode.out.ass");
        std::fs::write(&input, utf16le(SCRIPT)).unwrap();

        let report = workflow().process_file(&input, Some(&output)).await.unwrap();
        assert_eq!(report.events_read, 1);
        assert_eq!(report.malformed_lines, 0);

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            written,
            "\u{FEFF}[Events]\nDialogue: 0,0:00:00.000,0:00:04.000,Default,,0,0,0,,alpha bravo delta gamma omega\\Nsigma kappa theta lemon mango\n"
        );
    }

    #[test]
    fn test_decode_script() {
        assert_eq!(decode_script(b"[Events]\n").unwrap(), "[Events]\n");
        // UTF-8 mark is kept as is
        assert_eq!(decode_script(b"\xEF\xBB\xBF[Events]").unwrap(), "\u{FEFF}[Events]");

        let big_endian: Vec<u8> = [0xFE, 0xFF]
            .into_iter()
            .chain("Привет".encode_utf16().flat_map(u16::to_be_bytes))
            .collect();
        assert_eq!(decode_script(&big_endian).unwrap(), "\u{FEFF}Привет");

        assert!(matches!(decode_script(&[0xFF, 0xFE, 0x41]), Err(SubnormError::Encoding(_))));
        assert!(matches!(decode_script(&[0xFF, 0xFE, 0x00, 0xD8]), Err(SubnormError::Encoding(_))));
        assert!(matches!(decode_script(&[0x80, 0x41]), Err(SubnormError::Encoding(_))));
    }

    #[tokio::test]
    async fn test_process_missing_file() {
        let result = workflow().process_file("does/not/exist.ass", None::<&Path>).await;
        assert!(matches!(result, Err(SubnormError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_process_directory_keeps_layout() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(input.path().join("season1")).unwrap();
        std::fs::write(input.path().join("season1").join("e01.ass"), SCRIPT).unwrap();
        std::fs::write(input.path().join("e02.SSA"), SCRIPT).unwrap();
        std::fs::write(input.path().join("notes.txt"), "not a subtitle").unwrap();

        let summary = workflow()
            .process_directory(input.path(), Some(output.path()))
            .await
            .unwrap();

        assert_eq!(summary.files_processed, 2);
        assert_eq!(summary.files_failed, 0);
        assert_eq!(summary.report.events_read, 2);
        assert!(output.path().join("season1").join("e01.ass").exists());
        assert!(output.path().join("e02.SSA").exists());
        assert!(!output.path().join("notes.txt").exists());
    }

    #[test]
    fn test_preview() {
        let chunks = workflow().preview("Hello there\\NGeneral Kenobi");
        assert_eq!(chunks, vec!["Hello there\\NGeneral Kenobi"]);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = Config::default();
        config.normalize.max_symbols = 0;
        assert!(Workflow::new(config).is_err());
    }
}

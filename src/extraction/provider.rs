//! Extractor implementations
//!
//! `CommandExtractor` hands the request to an external program;
//! `ResponseFileExtractor` replays a response saved on disk.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, warn};

use crate::error::{TallyError, TallyResult};

use super::{ExtractionRequest, RawExtraction, ReceiptExtractor};

/// Runs an external command that reads the request JSON on stdin and prints
/// the response JSON on stdout
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    program: String,
    args: Vec<String>,
}

impl CommandExtractor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a whitespace-separated command line such as `receipt-bridge --json`
    pub fn from_command_line(command: &str) -> TallyResult<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| TallyError::Config("Extractor command is empty".into()))?;
        Ok(Self::new(program, parts.collect()))
    }
}

impl ReceiptExtractor for CommandExtractor {
    fn extract(&self, request: &ExtractionRequest) -> TallyResult<RawExtraction> {
        let payload = request.to_json()?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                TallyError::Extraction(format!("Failed to start '{}': {}", self.program, e))
            })?;

        // Feed stdin from its own thread so a chatty child cannot block us
        let stdin = child.stdin.take();
        let writer = thread::spawn(move || -> std::io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(payload.as_bytes())?;
            }
            Ok(())
        });

        let output = child
            .wait_with_output()
            .map_err(|e| TallyError::Extraction(format!("Extractor failed: {}", e)))?;

        match writer.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "extractor closed stdin early"),
            Err(_) => warn!("stdin writer thread panicked"),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TallyError::Extraction(format!(
                "Extractor exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        debug!(bytes = output.stdout.len(), "extractor responded");
        let stdout = String::from_utf8_lossy(&output.stdout);
        RawExtraction::from_json(&stdout)
    }
}

/// Reads a previously saved extractor response
#[derive(Debug, Clone)]
pub struct ResponseFileExtractor {
    path: PathBuf,
}

impl ResponseFileExtractor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReceiptExtractor for ResponseFileExtractor {
    fn extract(&self, _request: &ExtractionRequest) -> TallyResult<RawExtraction> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            TallyError::Extraction(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        RawExtraction::from_json(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn request() -> ExtractionRequest {
        ExtractionRequest {
            image: vec![1, 2, 3],
            mime_type: "image/jpeg".into(),
            categories: Vec::new(),
        }
    }

    #[test]
    fn test_from_command_line() {
        let extractor = CommandExtractor::from_command_line("bridge --json  -v").unwrap();
        assert_eq!(extractor.program, "bridge");
        assert_eq!(extractor.args, vec!["--json", "-v"]);
        assert!(CommandExtractor::from_command_line("   ").is_err());
    }

    #[test]
    fn test_response_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("response.json");
        std::fs::write(&path, r#"{"date": "2024-03-05T10:00:00Z", "items": [{"amount": 4.5}]}"#)
            .unwrap();

        let raw = ResponseFileExtractor::new(&path).extract(&request()).unwrap();
        assert_eq!(raw.items.unwrap().len(), 1);

        let missing = ResponseFileExtractor::new(temp_dir.path().join("nope.json"));
        assert!(matches!(
            missing.extract(&request()),
            Err(TallyError::Extraction(_))
        ));
    }

    #[test]
    fn test_missing_program_is_an_extraction_error() {
        let extractor = CommandExtractor::new("tally-no-such-extractor-binary", Vec::new());
        assert!(matches!(
            extractor.extract(&request()),
            Err(TallyError::Extraction(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_round_trip() {
        let extractor = CommandExtractor::new(
            "sh",
            vec![
                "-c".into(),
                r#"cat > /dev/null; echo '{"date":"2024-03-05","items":[{"amount":3,"note":"Tea","categoryId":"3"}]}'"#.into(),
            ],
        );
        let raw = extractor.extract(&request()).unwrap();
        assert_eq!(raw.date.as_deref(), Some("2024-03-05"));
        assert_eq!(raw.items.unwrap()[0].note.as_deref(), Some("Tea"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_command_reports_stderr() {
        let extractor = CommandExtractor::new(
            "sh",
            vec!["-c".into(), "cat > /dev/null; echo quota exceeded >&2; exit 3".into()],
        );
        let err = extractor.extract(&request()).unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }
}

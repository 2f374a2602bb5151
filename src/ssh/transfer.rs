// ABOUTME: Classifies file transfer arguments into an upload or download
// ABOUTME: A leading ':' marks a path on the remote host

use thiserror::Error;

const REMOTE_MARKER: char = ':';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Upload,
    Download,
}

/// Sources and destination with remote markers stripped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferIntent {
    pub direction: Direction,
    pub sources: Vec<String>,
    pub destination: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransferError {
    #[error("SCP requires at least a source and destination")]
    MissingOperands,

    #[error("download paths must start with ':' (got {path})")]
    LocalSourceInDownload { path: String },

    #[error("local destination path must not start with ':' (got {path})")]
    RemoteDestinationInDownload { path: String },

    #[error("local source paths should not contain ':' (got {path})")]
    RemoteSourceInUpload { path: String },

    #[error("remote destination path must start with ':' (got {path})")]
    LocalDestinationInUpload { path: String },
}

fn is_remote(path: &str) -> bool {
    path.starts_with(REMOTE_MARKER)
}

fn strip_marker(path: &str) -> String {
    path.strip_prefix(REMOTE_MARKER).unwrap_or(path).to_string()
}

pub fn classify<S: AsRef<str>>(files: &[S]) -> Result<TransferIntent, TransferError> {
    let Some((destination, sources)) = files.split_last() else {
        return Err(TransferError::MissingOperands);
    };
    if sources.is_empty() {
        return Err(TransferError::MissingOperands);
    }

    let destination = destination.as_ref();
    let direction = if is_remote(sources[0].as_ref()) {
        Direction::Download
    } else {
        Direction::Upload
    };

    match direction {
        Direction::Download => {
            if let Some(path) = sources.iter().map(|s| s.as_ref()).find(|p| !is_remote(p)) {
                return Err(TransferError::LocalSourceInDownload {
                    path: path.to_string(),
                });
            }
            if is_remote(destination) {
                return Err(TransferError::RemoteDestinationInDownload {
                    path: destination.to_string(),
                });
            }
        }
        Direction::Upload => {
            if let Some(path) = sources.iter().map(|s| s.as_ref()).find(|p| is_remote(p)) {
                return Err(TransferError::RemoteSourceInUpload {
                    path: path.to_string(),
                });
            }
            if !is_remote(destination) {
                return Err(TransferError::LocalDestinationInUpload {
                    path: destination.to_string(),
                });
            }
        }
    }

    Ok(TransferIntent {
        direction,
        sources: sources.iter().map(|s| strip_marker(s.as_ref())).collect(),
        destination: strip_marker(destination),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_source_and_destination() {
        let empty: [&str; 0] = [];
        assert_eq!(classify(&empty), Err(TransferError::MissingOperands));
        assert_eq!(classify(&["only.txt"]), Err(TransferError::MissingOperands));
        assert_eq!(
            classify(&["only.txt"]).unwrap_err().to_string(),
            "SCP requires at least a source and destination"
        );
    }

    #[test]
    fn test_single_upload() {
        let intent = classify(&["a.txt", ":dst"]).unwrap();

        assert_eq!(intent.direction, Direction::Upload);
        assert_eq!(intent.sources, ["a.txt"]);
        assert_eq!(intent.destination, "dst");
    }

    #[test]
    fn test_single_download() {
        let intent = classify(&[":a.txt", "local"]).unwrap();

        assert_eq!(intent.direction, Direction::Download);
        assert_eq!(intent.sources, ["a.txt"]);
        assert_eq!(intent.destination, "local");
    }

    #[test]
    fn test_multiple_files() {
        let upload = classify(&["local1.txt", "local2.txt", ":remote/path"]).unwrap();
        assert_eq!(upload.direction, Direction::Upload);
        assert_eq!(upload.sources, ["local1.txt", "local2.txt"]);
        assert_eq!(upload.destination, "remote/path");

        let download = classify(&[":remote1.txt", ":remote2.txt", "local/path"]).unwrap();
        assert_eq!(download.direction, Direction::Download);
        assert_eq!(download.sources, ["remote1.txt", "remote2.txt"]);
        assert_eq!(download.destination, "local/path");
    }

    #[test]
    fn test_upload_destination_must_be_remote() {
        let err = classify(&["local.txt", "remote/path"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "remote destination path must start with ':' (got remote/path)"
        );

        // Without a marker on the first path this is read as an upload.
        let err = classify(&["remote.txt", "local/path"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "remote destination path must start with ':' (got local/path)"
        );
    }

    #[test]
    fn test_mixed_upload_sources_rejected() {
        let err = classify(&["local1.txt", ":remote1.txt", ":remote/path"]).unwrap_err();

        assert_eq!(
            err,
            TransferError::RemoteSourceInUpload {
                path: ":remote1.txt".to_string()
            }
        );
        assert_eq!(
            err.to_string(),
            "local source paths should not contain ':' (got :remote1.txt)"
        );
    }

    #[test]
    fn test_mixed_download_sources_rejected() {
        let err = classify(&[":remote1.txt", "local1.txt", "dest"]).unwrap_err();

        assert_eq!(
            err.to_string(),
            "download paths must start with ':' (got local1.txt)"
        );
    }

    #[test]
    fn test_download_destination_must_be_local() {
        let err = classify(&[":remote.txt", ":elsewhere"]).unwrap_err();

        assert_eq!(
            err,
            TransferError::RemoteDestinationInDownload {
                path: ":elsewhere".to_string()
            }
        );
    }

    #[test]
    fn test_classify_is_total() {
        let inputs: Vec<Vec<&str>> = vec![
            vec![],
            vec![":"],
            vec![":", ""],
            vec!["", ":"],
            vec!["a", "b", "c"],
            vec![":a", ":b", ":c"],
            vec!["a", "b", ":c"],
            vec![":a", ":b", "c"],
            vec![":a", "b", ":c"],
            vec!["a", ":b", "c"],
        ];

        for files in inputs {
            match classify(&files) {
                Ok(intent) => assert_eq!(intent.sources.len() + 1, files.len(), "{files:?}"),
                Err(_) => {}
            }
        }
    }

    #[test]
    fn test_accepts_owned_strings() {
        let files = vec![":logs/app.log".to_string(), ".".to_string()];
        let intent = classify(&files).unwrap();

        assert_eq!(intent.sources, ["logs/app.log"]);
        assert_eq!(intent.destination, ".");
    }
}

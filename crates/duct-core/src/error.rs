#[derive(thiserror::Error, Debug)]
pub enum DuctError {
    #[error("--report-interval ({report_interval}) must be >= --sample-interval ({sample_interval})")]
    IntervalOrder {
        sample_interval: f64,
        report_interval: f64,
    },

    #[error("conflicting output files:\n{}", .0.join("\n"))]
    PathConflict(Vec<String>),

    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error("failed to spawn child process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {what} to JSON: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, DuctError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_order_message() {
        let err = DuctError::IntervalOrder {
            sample_interval: 1.0,
            report_interval: 0.5,
        };
        assert_eq!(
            err.to_string(),
            "--report-interval (0.5) must be >= --sample-interval (1)"
        );
    }

    #[test]
    fn path_conflict_lists_all_paths() {
        let err = DuctError::PathConflict(vec!["a.stdout".into(), "b.info.json".into()]);
        let msg = err.to_string();
        assert!(msg.contains("a.stdout"));
        assert!(msg.contains("b.info.json"));
    }

    #[test]
    fn command_not_found_message() {
        let err = DuctError::CommandNotFound("xyzzy".into());
        assert_eq!(err.to_string(), "command not found: xyzzy");
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DuctError>();
    }
}

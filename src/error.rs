pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("unknown hardware class: {0}")]
    UnknownHardwareClass(String),

    #[error("unknown region: {0}")]
    UnknownRegion(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("carbon intensity unavailable for {region}: {reason}")]
    IntensityUnavailable { region: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    pub fn intensity_unavailable<R: Into<String>, S: Into<String>>(region: R, reason: S) -> Self {
        Error::IntensityUnavailable {
            region: region.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error reports a caller contract violation rather than
    /// missing data or an I/O problem.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument(_)
                | Error::UnknownStrategy(_)
                | Error::UnknownHardwareClass(_)
                | Error::UnknownRegion(_)
                | Error::Config(_)
        )
    }
}

/// Reject negative or non-finite inputs with an `InvalidArgument` naming the field.
pub(crate) fn ensure_non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::invalid(format!("{name} must be finite, got {value}")));
    }
    if value < 0.0 {
        return Err(Error::invalid(format!("{name} must be >= 0, got {value}")));
    }
    Ok(())
}

pub(crate) fn ensure_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::invalid(format!("{name} must be > 0, got {value}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_classification() {
        assert!(Error::invalid("x").is_invalid_argument());
        assert!(Error::UnknownStrategy("greedy".into()).is_invalid_argument());
        assert!(!Error::intensity_unavailable("Northern", "timeout").is_invalid_argument());
    }

    #[test]
    fn test_guards() {
        assert!(ensure_non_negative("age_years", 0.0).is_ok());
        assert!(ensure_non_negative("age_years", -0.1).is_err());
        assert!(ensure_non_negative("age_years", f64::NAN).is_err());
        assert!(ensure_positive("lifetime", 0.0).is_err());
        assert!(ensure_positive("lifetime", 5.0).is_ok());
    }

    #[test]
    fn test_messages_name_the_offender() {
        let err = Error::UnknownStrategy("greedy".into());
        assert_eq!(err.to_string(), "unknown strategy: greedy");

        let err = Error::intensity_unavailable("Eastern", "no reading");
        assert!(err.to_string().contains("Eastern"));
    }
}

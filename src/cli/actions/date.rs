use crate::cli::actions::print_json;
use crate::dates;
use anyhow::{bail, Result};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    DateTime,
    Date,
    Quiz,
    Ago,
}

impl Format {
    /// # Errors
    /// Returns an error for names the CLI does not offer.
    pub fn parse(name: &str) -> Result<Self> {
        Ok(match name {
            "date-time" => Self::DateTime,
            "date" => Self::Date,
            "quiz" => Self::Quiz,
            "ago" => Self::Ago,
            other => bail!("unknown date format: {other}"),
        })
    }

    #[must_use]
    pub fn render(self, value: &str) -> String {
        match self {
            Self::DateTime => dates::format_date_time(value),
            Self::Date => dates::format_date(value),
            Self::Quiz => dates::format_quiz_date_time(value),
            Self::Ago => dates::format_time_ago(value),
        }
    }
}

#[derive(Debug)]
pub struct Args {
    pub value: String,
    pub format: Format,
}

/// # Errors
/// Returns an error if the value is not a recognised timestamp.
pub fn execute(args: &Args) -> Result<()> {
    let formatted = args.format.render(&args.value);
    if formatted.is_empty() {
        bail!("unrecognised timestamp: {:?}", args.value);
    }
    print_json(&json!({ "input": args.value, "formatted": formatted }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_by_name() -> Result<()> {
        let value = "2024-01-05T09:05:00Z";
        assert_eq!(
            Format::parse("date")?.render(value),
            "Jan 5, 2024 GMT (Jan 5, 2024 IST)"
        );
        assert_eq!(
            Format::parse("quiz")?.render(value),
            "Fri, Jan 5, 09:05 AM GMT (Fri, Jan 5, 02:35 PM IST)"
        );
        assert!(Format::parse("iso").is_err());
        Ok(())
    }

    #[test]
    fn rejects_garbage() {
        let args = Args {
            value: "soon".to_string(),
            format: Format::DateTime,
        };
        assert!(execute(&args).is_err());
    }
}

use clap::{CommandFactory, Parser};

#[derive(Debug, Default, Parser)]
#[command(name = "firecast", version, about = "Emergency-call demand forecast dashboard")]
pub struct CliArgs {
    /// Fetch once, print the cluster table and exit
    #[arg(long)]
    pub headless: bool,

    /// Print headless output as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Send train and predict requests before fetching in headless mode
    #[arg(long)]
    pub prime: bool,

    /// Override the forecast backend URL
    #[arg(long = "api-url", value_name = "URL")]
    pub api_url: Option<String>,

    /// First forecast date (YYYY-MM-DD)
    #[arg(long = "start-date", value_name = "DATE")]
    pub start_date: Option<String>,

    /// Last forecast date (YYYY-MM-DD), at most 7 days after the start
    #[arg(long = "end-date", value_name = "DATE")]
    pub end_date: Option<String>,

    /// Refresh interval in minutes
    #[arg(long, value_name = "MINUTES")]
    pub interval: Option<u64>,

    /// Override the log file used while the dashboard is open
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<String>,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        for (key, value) in self.env_overrides() {
            std::env::set_var(key, value);
        }
    }

    fn env_overrides(&self) -> Vec<(&'static str, String)> {
        let mut overrides = Vec::new();
        if let Some(url) = &self.api_url {
            overrides.push(("FIRECAST_API_URL", url.clone()));
        }
        if let Some(date) = &self.start_date {
            overrides.push(("FIRECAST_START_DATE", date.clone()));
        }
        if let Some(date) = &self.end_date {
            overrides.push(("FIRECAST_END_DATE", date.clone()));
        }
        if let Some(minutes) = self.interval {
            overrides.push(("FIRECAST_REFRESH_MINUTES", minutes.to_string()));
        }
        if let Some(path) = &self.log_file {
            overrides.push(("FIRECAST_LOG_FILE", path.clone()));
        }
        if self.debug {
            overrides.push(("DEBUG", "1".to_string()));
        }
        overrides
    }

    pub fn help_text() -> String {
        let mut command = Self::command();
        let mut buffer = Vec::new();
        command.write_help(&mut buffer).ok();
        String::from_utf8_lossy(&buffer).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_to_environment() {
        let args = CliArgs::parse_from([
            "firecast",
            "--api-url",
            "http://forecast.local",
            "--start-date",
            "2025-03-09",
            "--interval",
            "5",
            "--debug",
        ]);
        let overrides = args.env_overrides();
        assert!(overrides.contains(&("FIRECAST_API_URL", "http://forecast.local".to_string())));
        assert!(overrides.contains(&("FIRECAST_START_DATE", "2025-03-09".to_string())));
        assert!(overrides.contains(&("FIRECAST_REFRESH_MINUTES", "5".to_string())));
        assert!(overrides.contains(&("DEBUG", "1".to_string())));
        assert_eq!(overrides.len(), 4);
    }

    #[test]
    fn no_flags_means_no_overrides() {
        let args = CliArgs::parse_from(["firecast"]);
        assert!(args.env_overrides().is_empty());
        assert!(!args.headless && !args.json && !args.prime);
    }

    #[test]
    fn help_lists_flags() {
        let help = CliArgs::help_text();
        assert!(help.contains("--headless"));
        assert!(help.contains("--api-url"));
    }
}

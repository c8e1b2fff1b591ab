use scrapemd_crawler::{CrawlerConfig, DEFAULT_USER_AGENTS, RenderConfig};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub cors_origins: Vec<String>,
    pub scraper_delay_secs: u64,
    pub scraper_random_delay_ms: u64,
    pub scraper_user_agents: Vec<String>,
    pub scraper_request_timeout_secs: u64,
    pub scraper_timeout_secs: u64,
    pub scraper_ignore_robots: bool,
    pub render_timeout_secs: u64,
    pub render_settle_ms: u64,
    pub chrome_executable: Option<PathBuf>,
    pub chrome_no_sandbox: bool,
}

#[derive(Debug, Clone)]
pub enum LogFormat {
    Text,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "scrapemd_web_api=debug,scrapemd_crawler=debug,tower_http=debug".to_string(),
            log_format: LogFormat::Json,
            cors_origins: vec!["*".to_string()],
            scraper_delay_secs: 2,
            scraper_random_delay_ms: 1000,
            scraper_user_agents: DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
            scraper_request_timeout_secs: 30,
            scraper_timeout_secs: 30,
            scraper_ignore_robots: false,
            render_timeout_secs: 10,
            render_settle_ms: 2000,
            chrome_executable: None,
            chrome_no_sandbox: false,
        }
    }
}

fn parse_env<T>(name: &str, target: &mut T)
where
    T: FromStr + std::fmt::Display,
{
    if let Ok(value) = env::var(name) {
        match value.trim().parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(_) => eprintln!(
                "Warning: Invalid {} value '{}', using default {}",
                name, value, target
            ),
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = env::var("HOST") {
            config.host = host;
        }

        parse_env("PORT", &mut config.port);

        if let Ok(log_level) = env::var("RUST_LOG") {
            config.log_level = log_level;
        } else if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.log_level = log_level;
        }

        if let Ok(log_format) = env::var("LOG_FORMAT") {
            config.log_format = match log_format.to_lowercase().as_str() {
                "text" | "plain" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => {
                    eprintln!(
                        "Warning: Invalid LOG_FORMAT value '{}', using default JSON",
                        log_format
                    );
                    LogFormat::Json
                }
            };
        }

        if let Ok(cors_origins) = env::var("CORS_ORIGINS") {
            config.cors_origins = split_list(&cors_origins);
        }

        parse_env("SCRAPER_DELAY_S", &mut config.scraper_delay_secs);
        parse_env("SCRAPER_RANDOM_DELAY_MS", &mut config.scraper_random_delay_ms);
        parse_env("SCRAPER_REQUEST_TIMEOUT_S", &mut config.scraper_request_timeout_secs);
        parse_env("SCRAPER_TIMEOUT_S", &mut config.scraper_timeout_secs);
        parse_env("SCRAPER_IGNORE_ROBOTS", &mut config.scraper_ignore_robots);
        parse_env("RENDER_TIMEOUT_S", &mut config.render_timeout_secs);
        parse_env("RENDER_SETTLE_MS", &mut config.render_settle_ms);
        parse_env("CHROME_NO_SANDBOX", &mut config.chrome_no_sandbox);

        if let Ok(user_agents) = env::var("SCRAPER_USER_AGENTS") {
            let user_agents = split_list(&user_agents);
            if user_agents.is_empty() {
                eprintln!("Warning: Empty SCRAPER_USER_AGENTS, using default user agents");
            } else {
                config.scraper_user_agents = user_agents;
            }
        }

        if let Ok(path) = env::var("CHROME_EXECUTABLE") {
            if !path.trim().is_empty() {
                config.chrome_executable = Some(PathBuf::from(path));
            }
        }

        config
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn server_url(&self) -> String {
        if self.port == 80 {
            format!("http://{}", self.host)
        } else if self.port == 443 {
            format!("https://{}", self.host)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }

    pub fn scrape_timeout(&self) -> Duration {
        Duration::from_secs(self.scraper_timeout_secs)
    }

    pub fn crawler_config(&self) -> CrawlerConfig {
        CrawlerConfig {
            delay: Duration::from_secs(self.scraper_delay_secs),
            random_delay: Duration::from_millis(self.scraper_random_delay_ms),
            user_agents: self.scraper_user_agents.clone(),
            request_timeout: Duration::from_secs(self.scraper_request_timeout_secs),
            ignore_robots_txt: self.scraper_ignore_robots,
        }
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            timeout: Duration::from_secs(self.render_timeout_secs),
            settle: Duration::from_millis(self.render_settle_ms),
            user_agent: self
                .scraper_user_agents
                .first()
                .cloned()
                .unwrap_or_else(|| DEFAULT_USER_AGENTS[0].to_string()),
            chrome_executable: self.chrome_executable.clone(),
            no_sandbox: self.chrome_no_sandbox,
        }
    }
}

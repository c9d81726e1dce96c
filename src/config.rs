use rust_decimal::Decimal;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Longest window or horizon accepted, in days
pub const MAX_DAYS: u32 = 3650;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
}

/// One point of the horizon -> confidence curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceAnchor {
    pub horizon_days: u32,
    /// Percentage, 0..=100
    pub confidence: f64,
}

/// Thresholds and windows used by the cash-flow pipeline
#[derive(Debug, Clone)]
pub struct CashFlowConfig {
    /// Balance above which liquidity is considered healthy
    pub healthy_threshold: Decimal,
    /// Balance below which a low-balance alert is raised
    pub low_balance_floor: Decimal,
    /// Days of realized history used to estimate velocity
    pub trailing_window_days: u32,
    /// Days ahead scanned for upcoming payables
    pub upcoming_window_days: u32,
    /// Projection horizons in days, ascending
    pub horizons: Vec<u32>,
    /// Variation (percent of opening balance) above which a projection is positive
    pub positive_variation_pct: Decimal,
    /// Maximum category buckets per side of a projection breakdown
    pub max_breakdown_buckets: usize,
    pub confidence_anchors: Vec<ConfidenceAnchor>,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub cash_flow: CashFlowConfig,
    pub log_level: String,
    pub environment: String,
    pub audit_log_dir: Option<PathBuf>,
}

impl DatabaseConfig {
    /// Create database config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable is required")?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(10);

        let acquire_timeout_secs = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_secs = env::var("DATABASE_IDLE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(600); // 10 minutes

        let max_lifetime_secs = env::var("DATABASE_MAX_LIFETIME_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1800); // 30 minutes

        let test_before_acquire = env::var("DATABASE_TEST_BEFORE_ACQUIRE")
            .ok()
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(true);

        if max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }

        if acquire_timeout_secs == 0 {
            return Err("DATABASE_ACQUIRE_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            url,
            max_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
            test_before_acquire,
        })
    }

    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Get max lifetime as Duration
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/fluxo_caixa".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            test_before_acquire: true,
        }
    }
}

impl CashFlowConfig {
    /// Create cash-flow config from environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let healthy_threshold = match lookup("CASHFLOW_HEALTHY_THRESHOLD") {
            Some(raw) => parse_decimal("CASHFLOW_HEALTHY_THRESHOLD", &raw)?,
            None => defaults.healthy_threshold,
        };

        let low_balance_floor = match lookup("CASHFLOW_LOW_BALANCE_FLOOR") {
            Some(raw) => parse_decimal("CASHFLOW_LOW_BALANCE_FLOOR", &raw)?,
            None => defaults.low_balance_floor,
        };

        let trailing_window_days = match lookup("CASHFLOW_TRAILING_WINDOW_DAYS") {
            Some(raw) => parse_number("CASHFLOW_TRAILING_WINDOW_DAYS", &raw)?,
            None => defaults.trailing_window_days,
        };

        let upcoming_window_days = match lookup("CASHFLOW_UPCOMING_WINDOW_DAYS") {
            Some(raw) => parse_number("CASHFLOW_UPCOMING_WINDOW_DAYS", &raw)?,
            None => defaults.upcoming_window_days,
        };

        let horizons = match lookup("CASHFLOW_HORIZONS") {
            Some(raw) => parse_horizons(&raw)?,
            None => defaults.horizons,
        };

        let positive_variation_pct = match lookup("CASHFLOW_POSITIVE_VARIATION_PCT") {
            Some(raw) => parse_decimal("CASHFLOW_POSITIVE_VARIATION_PCT", &raw)?,
            None => defaults.positive_variation_pct,
        };

        let max_breakdown_buckets = match lookup("CASHFLOW_MAX_BREAKDOWN_BUCKETS") {
            Some(raw) => parse_number("CASHFLOW_MAX_BREAKDOWN_BUCKETS", &raw)?,
            None => defaults.max_breakdown_buckets,
        };

        let confidence_anchors = match lookup("CASHFLOW_CONFIDENCE_ANCHORS") {
            Some(raw) => parse_confidence_anchors(&raw)?,
            None => defaults.confidence_anchors,
        };

        let config = Self {
            healthy_threshold,
            low_balance_floor,
            trailing_window_days,
            upcoming_window_days,
            horizons,
            positive_variation_pct,
            max_breakdown_buckets,
            confidence_anchors,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the pipeline relies on
    pub fn validate(&self) -> Result<(), String> {
        if self.trailing_window_days == 0 || self.trailing_window_days > MAX_DAYS {
            return Err(format!(
                "CASHFLOW_TRAILING_WINDOW_DAYS must be between 1 and {}",
                MAX_DAYS
            ));
        }

        if self.upcoming_window_days > MAX_DAYS {
            return Err(format!("CASHFLOW_UPCOMING_WINDOW_DAYS must be at most {}", MAX_DAYS));
        }

        if self.healthy_threshold < Decimal::ZERO {
            return Err("CASHFLOW_HEALTHY_THRESHOLD must not be negative".to_string());
        }

        if self.horizons.is_empty() {
            return Err("CASHFLOW_HORIZONS must name at least one horizon".to_string());
        }

        if self.horizons.iter().any(|h| *h == 0 || *h > MAX_DAYS) {
            return Err(format!("CASHFLOW_HORIZONS must be between 1 and {}", MAX_DAYS));
        }

        if self.horizons.windows(2).any(|w| w[0] >= w[1]) {
            return Err("CASHFLOW_HORIZONS must be strictly ascending".to_string());
        }

        if self.max_breakdown_buckets == 0 {
            return Err("CASHFLOW_MAX_BREAKDOWN_BUCKETS must be greater than 0".to_string());
        }

        if self.confidence_anchors.is_empty() {
            return Err("CASHFLOW_CONFIDENCE_ANCHORS must name at least one anchor".to_string());
        }

        for anchor in &self.confidence_anchors {
            if !(0.0..=100.0).contains(&anchor.confidence) {
                return Err(format!(
                    "Confidence {} for {} days is outside 0..=100",
                    anchor.confidence, anchor.horizon_days
                ));
            }
        }

        // The curve has to be monotonic non-increasing
        for pair in self.confidence_anchors.windows(2) {
            if pair[0].horizon_days >= pair[1].horizon_days {
                return Err("Confidence anchors must have strictly ascending horizons".to_string());
            }
            if pair[0].confidence < pair[1].confidence {
                return Err(format!(
                    "Confidence must not increase with horizon ({}d={} < {}d={})",
                    pair[0].horizon_days,
                    pair[0].confidence,
                    pair[1].horizon_days,
                    pair[1].confidence
                ));
            }
        }

        Ok(())
    }
}

impl Default for CashFlowConfig {
    fn default() -> Self {
        Self {
            healthy_threshold: Decimal::new(50_000, 0),
            low_balance_floor: Decimal::new(20_000, 0),
            trailing_window_days: 30,
            upcoming_window_days: 7,
            horizons: vec![7, 15, 30, 90],
            positive_variation_pct: Decimal::new(10, 0),
            max_breakdown_buckets: 5,
            confidence_anchors: vec![
                ConfidenceAnchor { horizon_days: 7, confidence: 85.0 },
                ConfidenceAnchor { horizon_days: 30, confidence: 75.0 },
                ConfidenceAnchor { horizon_days: 90, confidence: 60.0 },
            ],
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let database = DatabaseConfig::from_env()?;
        let cash_flow = CashFlowConfig::from_env()?;

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let audit_log_dir = env::var("AUDIT_LOG_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        // Validate environment
        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&environment.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                environment, valid_environments
            ));
        }

        Ok(Self {
            database,
            cash_flow,
            log_level: log_level.to_lowercase(),
            environment: environment.to_lowercase(),
            audit_log_dir,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            cash_flow: CashFlowConfig::default(),
            log_level: "info".to_string(),
            environment: "development".to_string(),
            audit_log_dir: None,
        }
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T, String> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| format!("Invalid {}: {}", key, raw))
}

fn parse_decimal(key: &str, raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw.trim()).map_err(|e| format!("Invalid {}: {} ({})", key, raw, e))
}

/// Parse a comma separated horizon list such as `7,15,30,90`
pub fn parse_horizons(raw: &str) -> Result<Vec<u32>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .map_err(|_| format!("Invalid CASHFLOW_HORIZONS entry: {}", s))
        })
        .collect()
}

/// Parse `days:percent` pairs such as `7:85,30:75,90:60`
pub fn parse_confidence_anchors(raw: &str) -> Result<Vec<ConfidenceAnchor>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|pair| {
            let (days, confidence) = pair
                .split_once(':')
                .ok_or_else(|| format!("Invalid confidence anchor (expected days:percent): {}", pair))?;
            let horizon_days = days
                .trim()
                .parse::<u32>()
                .map_err(|_| format!("Invalid anchor horizon: {}", days))?;
            let confidence = confidence
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("Invalid anchor confidence: {}", confidence))?;
            Ok(ConfidenceAnchor {
                horizon_days,
                confidence,
            })
        })
        .collect()
}

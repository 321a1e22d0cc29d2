use crate::core::{AppError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub pdf: PdfConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    /// `text` or `json`
    pub log_format: String,
}

/// PDF endpoint settings
#[derive(Debug, Clone)]
pub struct PdfConfig {
    /// Requests allowed per window on the PDF endpoints
    pub rate_limit_max: u32,
    pub rate_limit_window_secs: u64,
    /// Sales tax applied when a payload carries no explicit tax
    pub default_tax_rate: Decimal,
    pub company: CompanyProfile,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            rate_limit_max: 100,
            rate_limit_window_secs: 15 * 60,
            default_tax_rate: Decimal::new(8, 2),
            company: CompanyProfile::default(),
        }
    }
}

/// Issuing company printed in the sender block of every quotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub email: String,
}

impl Default for CompanyProfile {
    fn default() -> Self {
        Self {
            name: "WIF Japan Sdn Bhd".to_string(),
            address: "No 6, Lorong Kiri 10".to_string(),
            city: "Kampung Datuk Keramat".to_string(),
            state: "Kuala Lumpur".to_string(),
            postal_code: "54000".to_string(),
            country: "Malaysia".to_string(),
            email: "admin@wiftravel.com".to_string(),
        }
    }
}

impl CompanyProfile {
    fn from_env() -> Self {
        let defaults = Self::default();
        let var = |key: &str, fallback: String| env::var(key).unwrap_or(fallback);

        Self {
            name: var("COMPANY_NAME", defaults.name),
            address: var("COMPANY_ADDRESS", defaults.address),
            city: var("COMPANY_CITY", defaults.city),
            state: var("COMPANY_STATE", defaults.state),
            postal_code: var("COMPANY_POSTAL_CODE", defaults.postal_code),
            country: var("COMPANY_COUNTRY", defaults.country),
            email: var("COMPANY_EMAIL", defaults.email),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let defaults = PdfConfig::default();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            pdf: PdfConfig {
                rate_limit_max: env::var("PDF_RATE_LIMIT_MAX")
                    .unwrap_or_else(|_| defaults.rate_limit_max.to_string())
                    .parse()
                    .map_err(|_| AppError::Configuration("Invalid PDF_RATE_LIMIT_MAX".to_string()))?,
                rate_limit_window_secs: env::var("PDF_RATE_LIMIT_WINDOW_SECS")
                    .unwrap_or_else(|_| defaults.rate_limit_window_secs.to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid PDF_RATE_LIMIT_WINDOW_SECS".to_string())
                    })?,
                default_tax_rate: match env::var("DEFAULT_TAX_RATE") {
                    Ok(rate) => Decimal::from_str(&rate)
                        .map_err(|_| AppError::Configuration("Invalid DEFAULT_TAX_RATE".to_string()))?,
                    Err(_) => defaults.default_tax_rate,
                },
                company: CompanyProfile::from_env(),
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.pdf.rate_limit_max == 0 {
            return Err(AppError::Configuration(
                "PDF rate limit must be greater than 0".to_string(),
            ));
        }

        if self.pdf.rate_limit_window_secs == 0 {
            return Err(AppError::Configuration(
                "PDF rate limit window must be greater than 0".to_string(),
            ));
        }

        if self.pdf.default_tax_rate < Decimal::ZERO || self.pdf.default_tax_rate > Decimal::ONE {
            return Err(AppError::Configuration(
                "Default tax rate must be between 0 and 1".to_string(),
            ));
        }

        if !matches!(self.app.log_format.as_str(), "text" | "json") {
            return Err(AppError::Configuration(
                "LOG_FORMAT must be 'text' or 'json'".to_string(),
            ));
        }

        Ok(())
    }
}

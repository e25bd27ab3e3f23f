//! Configuration management for Tagboard.
//!
//! Settings come from command-line arguments via clap, with environment
//! variable fallbacks and defaults for everything.
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use tagboard::config::Config;
//!
//! let config = Config::parse();
//! println!("Listening on {}", config.bind_address());
//! ```
//!
//! # Environment Variables
//!
//! - `TAGBOARD_HOST` - Server bind address (default: 0.0.0.0)
//! - `PORT` - Server port (default: 3000)
//! - `TAGBOARD_ADMIN_USERNAME` - Seeded admin account name (default: admin)
//! - `TAGBOARD_ADMIN_PASSWORD` - Seeded admin password (default: password)
//! - `TAGBOARD_CLIENT_DIR` - Directory holding `client.html` and `style.css`
//! - `TAGBOARD_CORS_ORIGINS` - Allowed CORS origins, comma-separated

use std::path::PathBuf;

use clap::Parser;

use crate::server::DEFAULT_MAX_BODY_BYTES;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default seeded admin account.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Default seeded admin password.
pub const DEFAULT_ADMIN_PASSWORD: &str = "password";

/// Default timeout for probing an uploaded image URL, in seconds.
pub const DEFAULT_VALIDATOR_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Tagboard - a small multi-user image board.
///
/// Users register, log in, and share image links tagged with keywords.
/// All state lives in memory and is lost on restart.
#[derive(Parser, Debug, Clone)]
#[command(name = "tagboard")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "TAGBOARD_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "PORT")]
    pub port: u16,

    /// Largest accepted request body in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Directory containing `client.html` and `style.css`.
    ///
    /// If not specified, the client compiled into the binary is served.
    #[arg(long, env = "TAGBOARD_CLIENT_DIR")]
    pub client_dir: Option<PathBuf>,

    // =========================================================================
    // Seed Data
    // =========================================================================
    /// Name of the admin account created at startup.
    #[arg(long, default_value = DEFAULT_ADMIN_USERNAME, env = "TAGBOARD_ADMIN_USERNAME")]
    pub admin_username: String,

    /// Password of the admin account created at startup.
    #[arg(long, default_value = DEFAULT_ADMIN_PASSWORD, env = "TAGBOARD_ADMIN_PASSWORD")]
    pub admin_password: String,

    /// Start with no admin account and no sample images.
    #[arg(long, default_value_t = false)]
    pub no_seed: bool,

    // =========================================================================
    // Image URL Validation
    // =========================================================================
    /// Timeout for the HEAD request probing an uploaded image URL.
    #[arg(long, default_value_t = DEFAULT_VALIDATOR_TIMEOUT_SECS)]
    pub validator_timeout_secs: u64,

    /// Accept every image URL without probing it.
    ///
    /// WARNING: Only use this for offline development.
    #[arg(long, default_value_t = false)]
    pub skip_url_validation: bool,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "TAGBOARD_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_body_bytes == 0 {
            return Err("max_body_bytes must be greater than 0".to_string());
        }

        if self.validator_timeout_secs == 0 && !self.skip_url_validation {
            return Err("validator_timeout_secs must be greater than 0".to_string());
        }

        if !self.no_seed && self.admin_username.is_empty() {
            return Err(
                "Admin username must not be empty. \
                 Set --admin-username or TAGBOARD_ADMIN_USERNAME, or disable seeding with --no-seed"
                    .to_string(),
            );
        }

        if !self.no_seed && self.admin_password.is_empty() {
            return Err("Admin password must not be empty".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Tests
// =============================================================================

use anyhow::{Context, Result};
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::service::geo_service::{DEFAULT_GEO_API_URL, DEFAULT_PUBLIC_IP_URL};
use crate::service::ResolverConfig;

#[derive(Parser, Debug, Clone)]
#[command(name = "vpn-detect")]
#[command(version = "0.1.0")]
#[command(about = "Detect VPN usage from IP geolocation vs client timezone", long_about = None)]
pub struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, env = "VPN_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short = 'p', long, env = "VPN_PORT", default_value = "8000")]
    pub port: u16,

    /// Directory with index.html and static assets
    #[arg(long, env = "VPN_STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Service returning the caller's public IP as {"ip": "..."}
    #[arg(long, env = "VPN_PUBLIC_IP_URL", default_value = DEFAULT_PUBLIC_IP_URL)]
    pub public_ip_url: String,

    /// Base URL of the ip-api compatible geolocation service
    #[arg(long, env = "VPN_GEO_API_URL", default_value = DEFAULT_GEO_API_URL)]
    pub geo_api_url: String,

    /// Timeout for each outbound request in seconds
    #[arg(short = 't', long, env = "VPN_TIMEOUT", default_value = "5")]
    pub timeout_secs: u64,

    /// Replace private/loopback client IPs with this host's public IP before lookup
    #[arg(long, env = "VPN_SUBSTITUTE_LOCAL", default_value = "true", action = clap::ArgAction::Set)]
    pub substitute_local: bool,

    /// Verbose output
    #[arg(short = 'v', long, env = "VPN_VERBOSE")]
    pub verbose: bool,

    /// TOML config file; command line and environment take precedence
    #[arg(short = 'c', long, env = "VPN_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Settings accepted from the config file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    host: Option<String>,
    port: Option<u16>,
    static_dir: Option<PathBuf>,
    public_ip_url: Option<String>,
    geo_api_url: Option<String>,
    timeout_secs: Option<u64>,
    substitute_local: Option<bool>,
    verbose: Option<bool>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

impl Args {
    /// Parse the process arguments and apply the config file, if any
    pub fn load() -> Result<Self> {
        let matches = Self::command().get_matches();
        Self::from_matches(&matches)
    }

    /// Parse `itr` without consulting `VPN_*` environment variables
    #[cfg(test)]
    fn load_from<I, T>(itr: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = Self::command()
            .mut_args(|arg| arg.env(None::<&str>))
            .try_get_matches_from(itr)?;
        Self::from_matches(&matches)
    }

    fn from_matches(matches: &ArgMatches) -> Result<Self> {
        Self::from_arg_matches(matches)?.merge_with_config(matches)
    }

    /// Fill every option left at its built-in default from the config file
    fn merge_with_config(mut self, matches: &ArgMatches) -> Result<Self> {
        let Some(path) = self.config.clone() else {
            return Ok(self);
        };
        let file = FileConfig::load(&path)?;
        let defaulted = |id: &str| {
            matches!(matches.value_source(id), Some(ValueSource::DefaultValue) | None)
        };

        if let Some(v) = file.host.filter(|_| defaulted("host")) {
            self.host = v;
        }
        if let Some(v) = file.port.filter(|_| defaulted("port")) {
            self.port = v;
        }
        if let Some(v) = file.static_dir.filter(|_| defaulted("static_dir")) {
            self.static_dir = v;
        }
        if let Some(v) = file.public_ip_url.filter(|_| defaulted("public_ip_url")) {
            self.public_ip_url = v;
        }
        if let Some(v) = file.geo_api_url.filter(|_| defaulted("geo_api_url")) {
            self.geo_api_url = v;
        }
        if let Some(v) = file.timeout_secs.filter(|_| defaulted("timeout_secs")) {
            self.timeout_secs = v;
        }
        if let Some(v) = file.substitute_local.filter(|_| defaulted("substitute_local")) {
            self.substitute_local = v;
        }
        if let Some(v) = file.verbose.filter(|_| defaulted("verbose")) {
            self.verbose = v;
        }

        Ok(self)
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            public_ip_url: self.public_ip_url.clone(),
            geo_api_url: self.geo_api_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            substitute_local_with_public: self.substitute_local,
        }
    }
}

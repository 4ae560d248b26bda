use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::core::TransportKind;

// Build version with backend info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Video:  ", crate::decoder::BACKEND_NAME, "\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Transport for scheme-less IPv4 sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BareIp {
    /// Decode as an RTSP stream (rtsp://<ip>/)
    Stream,
    /// Show as an HTTP source (http://<ip>/)
    Embeddable,
}

impl From<BareIp> for TransportKind {
    fn from(value: BareIp) -> Self {
        match value {
            BareIp::Stream => TransportKind::Stream,
            BareIp::Embeddable => TransportKind::Embeddable,
        }
    }
}

/// Local IP TV: live camera wall
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Replace the camera list with the JSON array in this file at startup
    #[arg(long = "import", value_name = "FILE")]
    pub import: Option<PathBuf>,

    /// Start in fullscreen window mode
    #[arg(short = 'F', long = "fullscreen")]
    pub fullscreen: bool,

    /// Health endpoint port
    #[arg(long = "port", value_name = "PORT", env = "IPWALL_PORT")]
    pub port: Option<u16>,

    /// Do not start the health endpoint
    #[arg(long = "no-server")]
    pub no_server: bool,

    /// Transport used for bare IPv4 sources (overrides saved setting)
    #[arg(long = "bare-ip", value_enum, value_name = "KIND")]
    pub bare_ip: Option<BareIp>,

    /// Enable logging to file (default: ipwall.log in the data directory)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["ipwall"]).unwrap();
        assert!(args.import.is_none());
        assert!(!args.no_server);
        assert_eq!(args.verbosity, 0);
        assert!(args.log_file.is_none());
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from([
            "ipwall", "-vv", "--bare-ip", "embeddable", "--port", "8080", "-l", "--no-server",
        ])
        .unwrap();
        assert_eq!(args.verbosity, 2);
        assert_eq!(args.bare_ip, Some(BareIp::Embeddable));
        assert_eq!(args.port, Some(8080));
        assert_eq!(args.log_file, Some(None));
        assert!(args.no_server);
        assert_eq!(TransportKind::from(BareIp::Stream), TransportKind::Stream);
    }
}

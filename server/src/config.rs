use std::convert::TryFrom;
use std::env;
use std::ops::RangeInclusive;

use thiserror::Error;

use crate::session_state::RosterPolicy;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 6000;
pub const PORT_RANGE: RangeInclusive<u16> = 1024..=65535;
/// Large enough for a `LoadImage` frame carrying a full 700x600 canvas.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 4 * 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid port number format: {0}")]
    InvalidPortFormat(String),

    #[error("port {0} is outside the valid range [1024, 65535]")]
    PortOutOfRange(u16),

    #[error("invalid value for {0}: {1}")]
    InvalidFlag(&'static str, String),

    #[error("usage: whiteboard-server [<serverIPAddress> <serverPort>]")]
    Usage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub roster_policy: RosterPolicy,
    /// Largest inbound websocket frame, in bytes.
    pub max_frame_size: usize,
}

impl std::default::Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            roster_policy: RosterPolicy::default(),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl ServerConfig {
    /// Defaults, then the `WB_*` environment variables, then the
    /// positional `<serverIPAddress> <serverPort>` arguments.
    pub fn load(args: impl IntoIterator<Item = String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|key| env::var(key).ok())?;
        config.apply_args(args)?;
        Ok(config)
    }

    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup("WB_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("WB_PORT") {
            self.port = parse_port(&port)?;
        }
        if let Some(flag) = lookup("WB_UNIQUE_ROSTER") {
            self.roster_policy = match flag.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => RosterPolicy::Unique,
                "0" | "false" | "no" => RosterPolicy::AllowDuplicates,
                _ => return Err(ConfigError::InvalidFlag("WB_UNIQUE_ROSTER", flag)),
            };
        }
        if let Some(size) = lookup("WB_MAX_FRAME_SIZE") {
            self.max_frame_size = match size.trim().parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => return Err(ConfigError::InvalidFlag("WB_MAX_FRAME_SIZE", size)),
            };
        }
        Ok(())
    }

    pub fn apply_args(&mut self, args: impl IntoIterator<Item = String>) -> Result<(), ConfigError> {
        let args: Vec<String> = args.into_iter().collect();
        match args.as_slice() {
            [] => Ok(()),
            [host, port] => {
                self.port = parse_port(port)?;
                self.host = host.clone();
                Ok(())
            }
            _ => Err(ConfigError::Usage),
        }
    }
}

pub fn parse_port(port: &str) -> Result<u16, ConfigError> {
    let value: u32 = port
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidPortFormat(port.to_owned()))?;
    match u16::try_from(value) {
        Ok(port) if PORT_RANGE.contains(&port) => Ok(port),
        Ok(port) => Err(ConfigError::PortOutOfRange(port)),
        Err(_) => Err(ConfigError::InvalidPortFormat(port.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use system::{
        bincode, BincodeRasterCodec, CommandId, IdentifiableCommand, Raster, RasterCodec,
        WhiteboardCommand,
    };

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn it_accepts_ports_in_range() {
        assert_eq!(parse_port("1024"), Ok(1024));
        assert_eq!(parse_port("65535"), Ok(65535));
        assert_eq!(parse_port("80"), Err(ConfigError::PortOutOfRange(80)));
        assert!(matches!(
            parse_port("70000"),
            Err(ConfigError::InvalidPortFormat(_))
        ));
        assert!(matches!(
            parse_port("abc"),
            Err(ConfigError::InvalidPortFormat(_))
        ));
    }

    #[test]
    fn it_lets_args_override_env() {
        let env: HashMap<&str, &str> = [("WB_HOST", "0.0.0.0"), ("WB_PORT", "7000")]
            .iter()
            .cloned()
            .collect();
        let mut config = ServerConfig::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .expect("");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 7000);

        config.apply_args(args(&["10.0.0.1", "8000"])).expect("");
        assert_eq!(config.host, "10.0.0.1");
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn it_reads_roster_policy_flag() {
        let mut config = ServerConfig::default();
        assert_eq!(config.roster_policy, RosterPolicy::AllowDuplicates);
        config
            .apply_env(|key| (key == "WB_UNIQUE_ROSTER").then(|| "true".to_owned()))
            .expect("");
        assert_eq!(config.roster_policy, RosterPolicy::Unique);
        assert!(config
            .apply_env(|key| (key == "WB_UNIQUE_ROSTER").then(|| "maybe".to_owned()))
            .is_err());
    }

    #[test]
    fn it_fits_a_full_canvas_in_the_default_frame() {
        let frame = bincode::serialize(&IdentifiableCommand {
            command_id: CommandId::MAX,
            command: WhiteboardCommand::LoadImage(BincodeRasterCodec.encode(&Raster::default())),
        })
        .expect("");
        assert!(frame.len() > 65_536);
        assert!(frame.len() <= ServerConfig::default().max_frame_size);
    }

    #[test]
    fn it_reads_max_frame_size() {
        let mut config = ServerConfig::default();
        config
            .apply_env(|key| (key == "WB_MAX_FRAME_SIZE").then(|| "8388608".to_owned()))
            .expect("");
        assert_eq!(config.max_frame_size, 8 * 1024 * 1024);
        assert!(config
            .apply_env(|key| (key == "WB_MAX_FRAME_SIZE").then(|| "0".to_owned()))
            .is_err());
    }

    #[test]
    fn it_rejects_a_lone_argument() {
        let mut config = ServerConfig::default();
        assert_eq!(config.apply_args(args(&["host"])), Err(ConfigError::Usage));
        assert_eq!(config, ServerConfig::default());
    }
}

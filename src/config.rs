use std::net::SocketAddr;

/// Process-wide settings read once at startup from the environment.
/// Missing vars fall back to sane local-dev defaults rather than failing
/// startup; malformed values do fail startup, since that's a deploy-time
/// mistake worth catching immediately.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub tick_rate_hz: u32,
    pub broadcast_rate_hz: u32,
    pub max_rooms: usize,
    pub max_players_per_room: usize,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port: u16 = env_or("PORT", "8080")?;
        let bind_ip = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());
        let bind_addr: SocketAddr = format!("{bind_ip}:{port}")
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid BIND_ADDR/PORT: {e}"))?;

        Ok(Self {
            bind_addr,
            tick_rate_hz: env_or("TICK_RATE", "60")?,
            broadcast_rate_hz: env_or("BROADCAST_RATE", "20")?,
            max_rooms: env_or("MAX_ROOMS", "64")?,
            max_players_per_room: env_or("MAX_PLAYERS", "10")?,
        })
    }

    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_rate_hz as f32
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("invalid {key}={raw}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_well_formed() {
        // Clear any vars a previous test run set, so this reflects the
        // documented local-dev defaults.
        for k in ["PORT", "BIND_ADDR", "TICK_RATE", "BROADCAST_RATE", "MAX_ROOMS", "MAX_PLAYERS"] {
            unsafe {
                std::env::remove_var(k);
            }
        }
        let cfg = ServerConfig::from_env().unwrap();
        assert_eq!(cfg.tick_rate_hz, 60);
        assert_eq!(cfg.max_rooms, 64);
    }
}

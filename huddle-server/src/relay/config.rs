use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// How often empty rooms are dropped and unresponsive connections are
    /// terminated.
    pub sweep_interval: Duration,
    /// Capacity of the relay's command channel.
    pub command_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(15 * 60),
            command_capacity: 256,
        }
    }
}

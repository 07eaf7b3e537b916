use serde::{Deserialize, Serialize};

pub const DEFAULT_COMMISSION_RATE: f64 = 0.13;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_commission_rate")]
    pub commission_rate: f64,
    #[serde(default)]
    pub admin_phone: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            commission_rate: DEFAULT_COMMISSION_RATE,
            admin_phone: None,
        }
    }
}

fn default_commission_rate() -> f64 {
    DEFAULT_COMMISSION_RATE
}

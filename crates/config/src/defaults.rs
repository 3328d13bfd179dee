pub fn default_universe_name() -> String {
    "default".to_string()
}

pub fn default_data_path() -> String {
    "ticks.json".to_string()
}

pub fn default_surface_field() -> String {
    "implied_volatility".to_string()
}

pub fn default_log_format() -> String {
    "compact".to_string()
}

pub struct Config {
    pub api_base_url: &'static str,
    pub votes_storage_key: &'static str,
    pub voter_session_key: &'static str,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            api_base_url: "/api",
            votes_storage_key: shared::STORAGE_KEY,
            voter_session_key: "agw-voter",
        }
    }
}

pub const CONFIG: Config = Config::new();

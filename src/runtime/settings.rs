use crate::config::Settings;

/// Effective settings: the loaded config when it parses and validates,
/// otherwise struct defaults together with the reason they were used.
pub fn load_settings() -> (Settings, Option<String>) {
    let loaded = Settings::load()
        .map_err(|e| format!("failed to load config: {e}"))
        .and_then(|s| match s.validate() {
            Ok(()) => Ok(s),
            Err(msg) => Err(format!("invalid config: {msg}")),
        });

    match loaded {
        Ok(s) => (s, None),
        Err(reason) => (Settings::default(), Some(reason)),
    }
}

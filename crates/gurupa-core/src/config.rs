use std::{
    env,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use crate::{errors::Error, Result};

const DEFAULT_NICKNAMES: &[&str] = &[
    "Anteater", "Badger", "Cheetah", "Dolphin", "Eagle", "Ferret", "Gecko", "Heron",
    "Ibis", "Jaguar", "Kiwi", "Lemur", "Manatee", "Narwhal", "Ocelot", "Puffin", "Quokka",
    "Raccoon", "Sloth", "Tapir", "Urchin", "Vulture", "Walrus", "Yak",
];

const DEFAULT_GREETINGS: &str =
    "Welcome to Gurupa! Everything you write here is relayed to everyone else, under a nickname that changes every day.";
const DEFAULT_HELP: &str = "Commands:\n/start - join the group\n/stop - leave the group\n/help - show this message\n\nAny other message or photo is forwarded to the group.";
const DEFAULT_FAREWELL: &str = "We are sorry to see you go, we will miss you in Gurupa!";
const DEFAULT_WEBHOOK_ADDR: &str = "0.0.0.0:8443";

/// Command tokens recognised by the router.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandTokens {
    pub join: String,
    pub leave: String,
    pub help: String,
    pub debug_prefix: String,
}

impl Default for CommandTokens {
    fn default() -> Self {
        Self {
            join: "/start".to_string(),
            leave: "/stop".to_string(),
            help: "/help".to_string(),
            debug_prefix: "/debug".to_string(),
        }
    }
}

/// Canned replies sent to a single chat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BotTexts {
    pub greetings: String,
    pub help: String,
    pub farewell: String,
}

impl Default for BotTexts {
    fn default() -> Self {
        Self {
            greetings: DEFAULT_GREETINGS.to_string(),
            help: DEFAULT_HELP.to_string(),
            farewell: DEFAULT_FAREWELL.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookConfig {
    pub url: String,
    pub listen_addr: SocketAddr,
}

/// Typed configuration, loaded from the environment.
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,
    pub registry_path: PathBuf,
    pub nicknames: Vec<String>,
    pub commands: CommandTokens,
    pub texts: BotTexts,
    pub webhook: Option<WebhookConfig>,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the process env in
    /// production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        let telegram_bot_token = get("TELEGRAM_BOT_TOKEN").ok_or_else(|| {
            Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
        })?;

        let registry_path = PathBuf::from(
            get("REGISTRY_PATH").unwrap_or("/tmp/gurupa-registry.json".to_string()),
        );

        let nicknames = match get("NICKNAMES") {
            Some(raw) => parse_csv(&raw),
            None => DEFAULT_NICKNAMES.iter().map(|s| s.to_string()).collect(),
        };
        if nicknames.is_empty() {
            return Err(Error::Config(
                "NICKNAMES must contain at least one name".to_string(),
            ));
        }

        let defaults = CommandTokens::default();
        let commands = CommandTokens {
            join: get("JOIN_COMMAND").unwrap_or(defaults.join),
            leave: get("LEAVE_COMMAND").unwrap_or(defaults.leave),
            help: get("HELP_COMMAND").unwrap_or(defaults.help),
            debug_prefix: get("DEBUG_PREFIX").unwrap_or(defaults.debug_prefix),
        };

        let defaults = BotTexts::default();
        let texts = BotTexts {
            greetings: get("GREETINGS_TEXT").unwrap_or(defaults.greetings),
            help: get("HELP_TEXT").unwrap_or(defaults.help),
            farewell: get("FAREWELL_TEXT").unwrap_or(defaults.farewell),
        };

        let webhook = match get("WEBHOOK_URL") {
            Some(url) => {
                let raw_addr =
                    get("WEBHOOK_LISTEN_ADDR").unwrap_or(DEFAULT_WEBHOOK_ADDR.to_string());
                let listen_addr = raw_addr.trim().parse::<SocketAddr>().map_err(|e| {
                    Error::Config(format!("invalid WEBHOOK_LISTEN_ADDR {raw_addr}: {e}"))
                })?;
                Some(WebhookConfig { url, listen_addr })
            }
            None => None,
        };

        Ok(Self {
            telegram_bot_token,
            registry_path,
            nicknames,
            commands,
            texts,
            webhook,
        })
    }
}

/// Load `path` into the process env, never overriding variables that are
/// already set. A missing file is fine.
fn load_dotenv_if_present(path: &Path) {
    match dotenvy::from_path(path) {
        Ok(()) => {}
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("ignoring {}: {e}", path.display()),
    }
}

fn parse_csv(v: &str) -> Vec<String> {
    v.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn token_is_required() {
        assert!(matches!(load(&[]), Err(Error::Config(_))));
        assert!(matches!(
            load(&[("TELEGRAM_BOT_TOKEN", "  ")]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn defaults_apply() {
        let cfg = load(&[("TELEGRAM_BOT_TOKEN", "x")]).unwrap();
        assert_eq!(cfg.commands, CommandTokens::default());
        assert_eq!(cfg.nicknames.len(), DEFAULT_NICKNAMES.len());
        assert_eq!(cfg.registry_path, PathBuf::from("/tmp/gurupa-registry.json"));
        assert!(cfg.webhook.is_none());
    }

    #[test]
    fn nicknames_from_csv() {
        let cfg = load(&[("TELEGRAM_BOT_TOKEN", "x"), ("NICKNAMES", " a, b ,,c ")]).unwrap();
        assert_eq!(cfg.nicknames, vec!["a", "b", "c"]);

        let err = load(&[("TELEGRAM_BOT_TOKEN", "x"), ("NICKNAMES", " , ,")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn webhook_needs_valid_addr() {
        let cfg = load(&[
            ("TELEGRAM_BOT_TOKEN", "x"),
            ("WEBHOOK_URL", "https://bot.example.org/hook"),
        ])
        .unwrap();
        let hook = cfg.webhook.unwrap();
        assert_eq!(hook.listen_addr.port(), 8443);

        let err = load(&[
            ("TELEGRAM_BOT_TOKEN", "x"),
            ("WEBHOOK_URL", "https://bot.example.org/hook"),
            ("WEBHOOK_LISTEN_ADDR", "nowhere"),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn dotenv_file_fills_gaps_without_overriding() {
        let pid = std::process::id();
        let dir = PathBuf::from(format!("/tmp/gurupa-dotenv-{pid}"));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(".env");
        let set_key = format!("GURUPA_DOTENV_SET_{pid}");
        let new_key = format!("GURUPA_DOTENV_NEW_{pid}");
        std::fs::write(
            &path,
            format!("# comment\n{set_key}=from-file\n{new_key}=\"two words\"\n"),
        )
        .unwrap();

        env::set_var(&set_key, "from-env");
        load_dotenv_if_present(&path);
        assert_eq!(env::var(&set_key).unwrap(), "from-env");
        assert_eq!(env::var(&new_key).unwrap(), "two words");

        load_dotenv_if_present(&dir.join("missing.env"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}

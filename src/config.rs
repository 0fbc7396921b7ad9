use std::path::PathBuf;

use clap::Parser;

use crate::key::KeyType;

/// Startup options of the interactive shell.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(version, about = "In-memory keyed table store", long_about = None)]
pub struct Config {
    /// Primary-key type shared by every table.
    #[arg(short, long, value_enum, default_value_t = KeyType::Int)]
    pub key_type: KeyType,

    /// Command file to replay before reading from stdin.
    #[arg(short, long)]
    pub script: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["minidb"]).unwrap();
        assert_eq!(config.key_type, KeyType::Int);
        assert_eq!(config.script, None);
    }

    #[test]
    fn test_text_key_and_script() {
        let config =
            Config::try_parse_from(["minidb", "--key-type", "text", "-s", "init.txt"]).unwrap();
        assert_eq!(config.key_type, KeyType::Text);
        assert_eq!(config.script, Some(PathBuf::from("init.txt")));
    }

    #[test]
    fn test_unknown_key_type_rejected() {
        assert!(Config::try_parse_from(["minidb", "-k", "uuid"]).is_err());
    }
}

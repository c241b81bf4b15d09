use std::collections::HashMap;

use secrecy::SecretString;

/// Version written into the backup preamble.
pub const BACKUP_FORMAT_VERSION: &str = "1";

/// Armored backup plus the code needed to open it.
#[derive(Debug)]
pub struct PrivateKeyBackup {
    pub backup_code: SecretString,
    pub message: String,
}

/// A private key recovered from a backup, with its passphrase.
#[derive(Debug)]
pub struct RestoredBackup<K> {
    pub key: K,
    pub password: SecretString,
}

/// Build the literal-data preamble that precedes the key packets.
pub fn preamble(key_pwd: &str) -> String {
    format!("Version: {BACKUP_FORMAT_VERSION}\nPwd: {key_pwd}\n")
}

/// Parse `Key: Value` lines of a preamble.
///
/// Each line is split at its first colon followed by whitespace; carriage
/// returns are dropped and empty lines skipped. Lines without a separator
/// are ignored.
pub fn parse_meta_info(text: &str) -> HashMap<String, String> {
    text.replace('\r', "")
        .split('\n')
        .filter(|row| !row.is_empty())
        .filter_map(split_meta_line)
        .collect()
}

fn split_meta_line(row: &str) -> Option<(String, String)> {
    let (idx, sep) = row
        .char_indices()
        .zip(row.chars().skip(1))
        .find(|((_, c), next)| *c == ':' && next.is_whitespace())
        .map(|((idx, _), next)| (idx, next))?;
    let value_start = idx + 1 + sep.len_utf8();
    Some((row[..idx].to_string(), row[value_start..].to_string()))
}

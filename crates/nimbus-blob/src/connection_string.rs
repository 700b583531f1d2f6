//! Parser for storage connection strings.
//!
//! A connection string is a `;`-separated list of `Key=Value` settings, for
//! example:
//!
//! ```text
//! DefaultEndpointsProtocol=https;AccountName=acct;AccountKey=a2V5;EndpointSuffix=core.windows.net
//! ```
//!
//! Keys are matched case-insensitively and values are kept verbatim. The
//! value is everything after the first `=`, so base64 keys with padding
//! survive intact.

use std::collections::BTreeMap;
use std::fmt;

use derive_more::Display;
use strum::{AsRefStr, EnumIter, IntoEnumIterator};

use crate::error::{Error, Result};

/// Settings recognised inside a connection string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(AsRefStr, Display, EnumIter)]
pub enum Setting {
    /// `http` or `https`.
    DefaultEndpointsProtocol,
    /// Storage account name.
    AccountName,
    /// Base64 shared key.
    AccountKey,
    /// Shared access signature token.
    SharedAccessSignature,
    /// Explicit blob service endpoint.
    BlobEndpoint,
    /// Explicit secondary blob service endpoint.
    BlobSecondaryEndpoint,
    /// Explicit queue service endpoint.
    QueueEndpoint,
    /// Explicit table service endpoint.
    TableEndpoint,
    /// Explicit file service endpoint.
    FileEndpoint,
    /// DNS suffix used to derive endpoints.
    EndpointSuffix,
    /// Selects the local storage emulator.
    UseDevelopmentStorage,
    /// Proxy URI for the local storage emulator.
    DevelopmentStorageProxyUri,
}

impl Setting {
    /// Looks up a setting by key, ignoring ASCII case.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::iter().find(|setting| setting.as_ref().eq_ignore_ascii_case(key))
    }
}

/// A parsed connection string.
///
/// This is purely syntactic; semantic checks such as endpoint URIs and key
/// encoding happen in [`StorageAccount::parse`](crate::StorageAccount::parse).
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    settings: BTreeMap<Setting, String>,
}

impl ConnectionString {
    /// Parses `input` into its settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedConnectionString`] when the input is blank,
    /// a segment lacks `=`, a key is empty or unknown, or a key repeats.
    pub fn parse(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Err(Error::malformed("connection string is empty"));
        }

        let mut settings = BTreeMap::new();
        for segment in input.split(';') {
            if segment.trim().is_empty() {
                continue;
            }

            let Some((key, value)) = segment.split_once('=') else {
                return Err(Error::malformed(format!(
                    "segment '{}' is not a Key=Value pair",
                    redact_segment(segment)
                )));
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(Error::malformed("setting with an empty key"));
            }

            let Some(setting) = Setting::from_key(key) else {
                return Err(Error::malformed(format!("unknown setting '{key}'")));
            };

            if settings.insert(setting, value.trim().to_owned()).is_some() {
                return Err(Error::malformed(format!(
                    "setting '{setting}' is specified more than once"
                )));
            }
        }

        if settings.is_empty() {
            return Err(Error::malformed("connection string has no settings"));
        }

        Ok(Self { settings })
    }

    /// Returns the value of `setting`, if present.
    pub fn get(&self, setting: Setting) -> Option<&str> {
        self.settings.get(&setting).map(String::as_str)
    }

    /// Returns whether `setting` is present.
    pub fn contains(&self, setting: Setting) -> bool {
        self.settings.contains_key(&setting)
    }

    /// Iterates the settings in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (Setting, &str)> {
        self.settings.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (setting, value) in self.iter() {
            match setting {
                Setting::AccountKey | Setting::SharedAccessSignature => {
                    map.entry(&setting, &"***");
                }
                _ => {
                    map.entry(&setting, &value);
                }
            }
        }
        map.finish()
    }
}

/// Keeps secrets out of error messages for segments that failed to parse.
fn redact_segment(segment: &str) -> String {
    let segment = segment.trim();
    if segment.len() <= 8 {
        segment.to_owned()
    } else {
        let cut = segment
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(segment.len());
        format!("{}...", &segment[..cut])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_standard_string() {
        let cs = ConnectionString::parse(
            "DefaultEndpointsProtocol=https;AccountName=acct;AccountKey=a2V5==;EndpointSuffix=core.windows.net",
        )
        .unwrap();

        assert_eq!(cs.get(Setting::DefaultEndpointsProtocol), Some("https"));
        assert_eq!(cs.get(Setting::AccountName), Some("acct"));
        assert_eq!(cs.get(Setting::AccountKey), Some("a2V5=="));
        assert_eq!(cs.get(Setting::EndpointSuffix), Some("core.windows.net"));
        assert!(!cs.contains(Setting::BlobEndpoint));
    }

    #[test]
    fn keys_are_case_insensitive() {
        let cs = ConnectionString::parse("accountname=Acct;ACCOUNTKEY=a2V5").unwrap();
        assert_eq!(cs.get(Setting::AccountName), Some("Acct"));
        assert_eq!(cs.get(Setting::AccountKey), Some("a2V5"));
        assert_eq!(Setting::from_key("blobendpoint"), Some(Setting::BlobEndpoint));
        assert_eq!(Setting::BlobEndpoint.to_string(), "BlobEndpoint");
    }

    #[test]
    fn empty_segments_are_ignored() {
        let cs = ConnectionString::parse("AccountName=acct;;AccountKey=a2V5;").unwrap();
        assert_eq!(cs.iter().count(), 2);
    }

    #[test]
    fn blank_string_is_malformed() {
        for input in ["", "   ", ";;"] {
            let err = ConnectionString::parse(input).unwrap_err();
            assert!(matches!(err, Error::MalformedConnectionString(_)), "{input:?}");
        }
    }

    #[test]
    fn segment_without_equals_is_malformed() {
        let err = ConnectionString::parse("AccountName=acct;garbage").unwrap_err();
        assert!(matches!(err, Error::MalformedConnectionString(_)));
    }

    #[test]
    fn unknown_and_duplicate_keys_are_malformed() {
        let err = ConnectionString::parse("AccountName=acct;Colour=blue").unwrap_err();
        assert!(err.to_string().contains("Colour"));

        let err = ConnectionString::parse("AccountName=a;accountName=b").unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn debug_masks_secrets() {
        let cs = ConnectionString::parse(
            "AccountName=acct;AccountKey=c2VjcmV0;SharedAccessSignature=sig=abc",
        )
        .unwrap();
        let debug = format!("{cs:?}");
        assert!(debug.contains("acct"));
        assert!(!debug.contains("c2VjcmV0"));
        assert!(!debug.contains("sig=abc"));
    }
}

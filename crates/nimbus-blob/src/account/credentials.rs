//! Credentials carried by a storage account handle.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, Result};

/// Base64-encoded shared key of a storage account.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountKey(String);

impl AccountKey {
    /// Validates `encoded` as a standard base64 shared key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredentials`] when the key is empty, is not
    /// valid base64, or decodes to zero bytes.
    pub fn decode(encoded: &str) -> Result<Self> {
        if encoded.is_empty() {
            return Err(Error::invalid_credentials("AccountKey is empty"));
        }

        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| Error::invalid_credentials(format!("AccountKey is not valid base64: {e}")))?;

        if bytes.is_empty() {
            return Err(Error::invalid_credentials("AccountKey decodes to an empty key"));
        }

        Ok(Self(encoded.to_owned()))
    }

    /// Returns the key in its base64 form.
    #[inline]
    pub fn as_base64(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccountKey(***)")
    }
}

/// Shared access signature token, kept as decoded query pairs.
#[derive(Clone, PartialEq, Eq)]
pub struct SasToken {
    pairs: Vec<(String, String)>,
}

impl SasToken {
    /// Parses a SAS token with or without its leading `?`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedConnectionString`] when the token is empty.
    pub fn parse(token: &str) -> Result<Self> {
        let token = token.trim_start_matches('?');
        let pairs: Vec<(String, String)> = url::form_urlencoded::parse(token.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .filter(|(k, _)| !k.is_empty())
            .collect();

        if pairs.is_empty() {
            return Err(Error::malformed("SharedAccessSignature is empty"));
        }

        Ok(Self { pairs })
    }

    /// Returns the decoded query pairs.
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

impl fmt::Debug for SasToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.pairs.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("SasToken").field("params", &keys).finish()
    }
}

/// How requests against the account are authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCredentials {
    /// Account name plus shared key.
    SharedKey(AccountKey),
    /// Shared access signature.
    SasToken(SasToken),
}

impl StorageCredentials {
    /// Short name of the credential kind, safe to log.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SharedKey(_) => "shared_key",
            Self::SasToken(_) => "sas_token",
        }
    }
}

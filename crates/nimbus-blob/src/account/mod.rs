//! Storage account handles derived from connection strings.
//!
//! [`StorageAccount::parse`] turns a connection string into an account name,
//! credentials and a blob service endpoint. Failures fall into two kinds:
//!
//! - [`Error::MalformedConnectionString`]: the string or one of its endpoint
//!   URIs is not syntactically valid.
//! - [`Error::InvalidCredentials`]: the string is valid but its account key
//!   cannot be decoded.

mod credentials;

pub use credentials::{AccountKey, SasToken, StorageCredentials};
use url::Url;

use crate::backend::{AzureBackend, BlobBackend};
use crate::client::BlobServiceClient;
use crate::connection_string::{ConnectionString, Setting};
use crate::error::{Error, Result};

/// DNS suffix used when the connection string does not set one.
pub const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

/// Account name of the local storage emulator.
pub const DEVELOPMENT_ACCOUNT_NAME: &str = "devstoreaccount1";

/// Published shared key of the local storage emulator.
pub const DEVELOPMENT_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";

const DEVELOPMENT_BLOB_PORT: u16 = 10000;
const DEVELOPMENT_PROXY_URI: &str = "http://127.0.0.1";

/// Settings that must not accompany `UseDevelopmentStorage`.
const ACCOUNT_SETTINGS: [Setting; 10] = [
    Setting::DefaultEndpointsProtocol,
    Setting::AccountName,
    Setting::AccountKey,
    Setting::SharedAccessSignature,
    Setting::BlobEndpoint,
    Setting::BlobSecondaryEndpoint,
    Setting::QueueEndpoint,
    Setting::TableEndpoint,
    Setting::FileEndpoint,
    Setting::EndpointSuffix,
];

/// Authenticated storage account, the result of parsing a connection string.
///
/// Handles are cheap to build and are never cached by the service: each
/// resolution produces a fresh, independent value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageAccount {
    account_name: String,
    credentials: StorageCredentials,
    blob_endpoint: Url,
    emulator: bool,
}

impl StorageAccount {
    /// Parses a connection string into an account handle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedConnectionString`] for syntax or URI
    /// problems and [`Error::InvalidCredentials`] for an undecodable key.
    pub fn parse(connection_string: &str) -> Result<Self> {
        let settings = ConnectionString::parse(connection_string)?;

        if let Some(flag) = settings.get(Setting::UseDevelopmentStorage) {
            return Self::development(&settings, flag);
        }

        let protocol = match settings.get(Setting::DefaultEndpointsProtocol) {
            None => "https",
            Some(p) if p.eq_ignore_ascii_case("https") => "https",
            Some(p) if p.eq_ignore_ascii_case("http") => "http",
            Some(p) => {
                return Err(Error::malformed(format!(
                    "DefaultEndpointsProtocol '{p}' must be 'http' or 'https'"
                )));
            }
        };

        let account_name = match settings.get(Setting::AccountName) {
            Some("") => return Err(Error::malformed("AccountName is empty")),
            other => other,
        };

        for setting in [
            Setting::BlobSecondaryEndpoint,
            Setting::QueueEndpoint,
            Setting::TableEndpoint,
            Setting::FileEndpoint,
        ] {
            if let Some(raw) = settings.get(setting) {
                parse_endpoint(setting, raw)?;
            }
        }

        let blob_endpoint = match (settings.get(Setting::BlobEndpoint), account_name) {
            (Some(raw), _) => parse_endpoint(Setting::BlobEndpoint, raw)?,
            (None, Some(name)) => {
                let suffix = settings
                    .get(Setting::EndpointSuffix)
                    .unwrap_or(DEFAULT_ENDPOINT_SUFFIX);
                let raw = format!("{protocol}://{name}.blob.{suffix}");
                parse_endpoint(Setting::BlobEndpoint, &raw)?
            }
            (None, None) => {
                return Err(Error::malformed(
                    "either AccountName or BlobEndpoint must be specified",
                ));
            }
        };

        let account_name = match account_name {
            Some(name) => name.to_owned(),
            None => account_name_from_endpoint(&blob_endpoint)?,
        };

        let credentials = match (
            settings.get(Setting::AccountKey),
            settings.get(Setting::SharedAccessSignature),
        ) {
            (Some(_), Some(_)) => {
                return Err(Error::malformed(
                    "AccountKey and SharedAccessSignature cannot both be specified",
                ));
            }
            (Some(_), None) if !settings.contains(Setting::AccountName) => {
                return Err(Error::malformed("AccountKey requires AccountName"));
            }
            (Some(key), None) => StorageCredentials::SharedKey(AccountKey::decode(key)?),
            (None, Some(sas)) => StorageCredentials::SasToken(SasToken::parse(sas)?),
            (None, None) => {
                return Err(Error::malformed(
                    "no credentials: expected AccountKey or SharedAccessSignature",
                ));
            }
        };

        Ok(Self {
            account_name,
            credentials,
            blob_endpoint,
            emulator: false,
        })
    }

    /// Builds the well-known emulator account.
    fn development(settings: &ConnectionString, flag: &str) -> Result<Self> {
        if !flag.eq_ignore_ascii_case("true") {
            return Err(Error::malformed(format!(
                "UseDevelopmentStorage must be 'true', got '{flag}'"
            )));
        }

        if let Some(setting) = ACCOUNT_SETTINGS.into_iter().find(|s| settings.contains(*s)) {
            return Err(Error::malformed(format!(
                "UseDevelopmentStorage cannot be combined with {setting}"
            )));
        }

        let proxy = settings
            .get(Setting::DevelopmentStorageProxyUri)
            .unwrap_or(DEVELOPMENT_PROXY_URI);
        let mut blob_endpoint = parse_endpoint(Setting::DevelopmentStorageProxyUri, proxy)?;
        blob_endpoint
            .set_port(Some(DEVELOPMENT_BLOB_PORT))
            .map_err(|()| Error::malformed("DevelopmentStorageProxyUri cannot carry a port"))?;
        blob_endpoint.set_path(DEVELOPMENT_ACCOUNT_NAME);

        Ok(Self {
            account_name: DEVELOPMENT_ACCOUNT_NAME.to_owned(),
            credentials: StorageCredentials::SharedKey(AccountKey::decode(
                DEVELOPMENT_ACCOUNT_KEY,
            )?),
            blob_endpoint,
            emulator: true,
        })
    }

    /// Returns the storage account name.
    #[inline]
    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    /// Returns the credentials used to authorize requests.
    #[inline]
    pub fn credentials(&self) -> &StorageCredentials {
        &self.credentials
    }

    /// Returns the blob service endpoint.
    #[inline]
    pub fn blob_endpoint(&self) -> &Url {
        &self.blob_endpoint
    }

    /// Returns whether this account targets the local storage emulator.
    #[inline]
    pub fn is_emulator(&self) -> bool {
        self.emulator
    }

    /// Returns the URI of `container` under this account's blob endpoint.
    pub fn container_uri(&self, container: &str) -> Url {
        let mut uri = self.blob_endpoint.clone();
        let base = uri.path().trim_end_matches('/').to_owned();
        uri.set_path(&format!("{base}/{container}"));
        uri
    }

    /// Creates a client for the blob service of this account.
    pub fn create_blob_client(&self) -> BlobServiceClient<AzureBackend> {
        self.create_blob_client_with(AzureBackend)
    }

    /// Creates a blob service client that talks through `backend`.
    pub fn create_blob_client_with<B: BlobBackend>(&self, backend: B) -> BlobServiceClient<B> {
        BlobServiceClient::new(self.clone(), backend)
    }
}

/// Parses an explicit endpoint, accepting only absolute `http(s)` URLs.
fn parse_endpoint(setting: Setting, raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| Error::malformed(format!("{setting} '{raw}' is not a valid URI: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::malformed(format!(
            "{setting} '{raw}' must use http or https"
        )));
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::malformed(format!("{setting} '{raw}' has no host")));
    }

    Ok(url)
}

/// Infers the account name from a SAS-only endpoint.
///
/// Service hosts carry it as the first label (`acct.blob.core.windows.net`).
/// Any other host, such as an emulator or proxy, carries it as the first path
/// segment (`azurite:10000/acct`), falling back to the first host label.
fn account_name_from_endpoint(endpoint: &Url) -> Result<String> {
    let path_name = endpoint
        .path_segments()
        .and_then(|mut segments| segments.next())
        .filter(|segment| !segment.is_empty());

    let name = match endpoint.host() {
        Some(url::Host::Domain(domain)) => {
            let mut labels = domain.split('.');
            let first = labels.next();
            if labels.next() == Some("blob") {
                first
            } else {
                path_name.or(first)
            }
        }
        _ => path_name,
    };

    match name {
        Some(name) if !name.is_empty() => Ok(name.to_owned()),
        _ => Err(Error::malformed(format!(
            "cannot infer AccountName from BlobEndpoint '{endpoint}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "c2VjcmV0LWtleQ==";

    #[test]
    fn parse_default_endpoints() {
        let account = StorageAccount::parse(&format!(
            "DefaultEndpointsProtocol=https;AccountName=acct;AccountKey={KEY};EndpointSuffix=core.windows.net"
        ))
        .unwrap();

        assert_eq!(account.account_name(), "acct");
        assert_eq!(
            account.blob_endpoint().as_str(),
            "https://acct.blob.core.windows.net/"
        );
        assert_eq!(account.credentials().kind(), "shared_key");
        assert!(!account.is_emulator());
    }

    #[test]
    fn parse_defaults_protocol_and_suffix() {
        let account = StorageAccount::parse(&format!("AccountName=acct;AccountKey={KEY}")).unwrap();
        assert_eq!(
            account.blob_endpoint().as_str(),
            "https://acct.blob.core.windows.net/"
        );

        let account = StorageAccount::parse(&format!(
            "DefaultEndpointsProtocol=http;AccountName=acct;AccountKey={KEY};EndpointSuffix=core.chinacloudapi.cn"
        ))
        .unwrap();
        assert_eq!(
            account.blob_endpoint().as_str(),
            "http://acct.blob.core.chinacloudapi.cn/"
        );
    }

    #[test]
    fn parse_explicit_blob_endpoint() {
        let account = StorageAccount::parse(&format!(
            "AccountName=acct;AccountKey={KEY};BlobEndpoint=https://acct.blob.core.windows.net/"
        ))
        .unwrap();
        assert_eq!(account.container_uri("logs").as_str(), "https://acct.blob.core.windows.net/logs");
    }

    #[test]
    fn parse_sas_only_infers_account() {
        let account = StorageAccount::parse(
            "BlobEndpoint=https://sasacct.blob.core.windows.net;SharedAccessSignature=sv=2022-11-02&sig=abc",
        )
        .unwrap();
        assert_eq!(account.account_name(), "sasacct");
        assert_eq!(account.credentials().kind(), "sas_token");
    }

    #[test]
    fn parse_sas_only_emulator_endpoint_uses_path() {
        let cases = [
            ("http://azurite:10000/devstoreaccount1", "devstoreaccount1"),
            ("http://127.0.0.1:10000/devstoreaccount1/", "devstoreaccount1"),
            ("https://blobs.example.com", "blobs"),
        ];

        for (endpoint, expected) in cases {
            let account = StorageAccount::parse(&format!(
                "BlobEndpoint={endpoint};SharedAccessSignature=sv=2022-11-02&sig=abc"
            ))
            .unwrap();
            assert_eq!(account.account_name(), expected, "{endpoint}");
        }

        let err = StorageAccount::parse(
            "BlobEndpoint=http://127.0.0.1:10000;SharedAccessSignature=sig=abc",
        )
        .unwrap_err();
        assert!(matches!(err, Error::MalformedConnectionString(_)));
    }

    #[test]
    fn parse_development_storage() {
        let account = StorageAccount::parse("UseDevelopmentStorage=true").unwrap();
        assert!(account.is_emulator());
        assert_eq!(account.account_name(), DEVELOPMENT_ACCOUNT_NAME);
        assert_eq!(
            account.blob_endpoint().as_str(),
            "http://127.0.0.1:10000/devstoreaccount1"
        );
        assert_eq!(
            account.container_uri("c1").as_str(),
            "http://127.0.0.1:10000/devstoreaccount1/c1"
        );

        let account = StorageAccount::parse(
            "UseDevelopmentStorage=true;DevelopmentStorageProxyUri=http://azurite",
        )
        .unwrap();
        assert_eq!(
            account.blob_endpoint().as_str(),
            "http://azurite:10000/devstoreaccount1"
        );
    }

    #[test]
    fn development_storage_rejects_account_settings() {
        let err = StorageAccount::parse("UseDevelopmentStorage=true;AccountName=acct").unwrap_err();
        assert!(matches!(err, Error::MalformedConnectionString(_)));

        let err = StorageAccount::parse("UseDevelopmentStorage=false").unwrap_err();
        assert!(matches!(err, Error::MalformedConnectionString(_)));
    }

    #[test]
    fn invalid_uri_is_malformed() {
        let cases = [
            format!("AccountName=acct;AccountKey={KEY};BlobEndpoint=not a uri"),
            format!("AccountName=acct;AccountKey={KEY};BlobEndpoint=ftp://acct.example.com"),
            format!("AccountName=my account;AccountKey={KEY}"),
            format!("AccountName=acct;AccountKey={KEY};QueueEndpoint=::"),
            format!("DefaultEndpointsProtocol=gopher;AccountName=acct;AccountKey={KEY}"),
        ];

        for input in cases {
            let err = StorageAccount::parse(&input).unwrap_err();
            assert!(
                matches!(err, Error::MalformedConnectionString(_)),
                "{input}: {err}"
            );
        }
    }

    #[test]
    fn missing_pieces_are_malformed() {
        let cases = [
            "AccountKey=c2VjcmV0;BlobEndpoint=https://acct.blob.core.windows.net",
            "AccountName=acct",
            "AccountName=acct;AccountKey=c2VjcmV0;SharedAccessSignature=sig=abc",
            "EndpointSuffix=core.windows.net;AccountKey=c2VjcmV0",
            "AccountName=;AccountKey=c2VjcmV0",
        ];

        for input in cases {
            let err = StorageAccount::parse(input).unwrap_err();
            assert!(
                matches!(err, Error::MalformedConnectionString(_)),
                "{input}: {err}"
            );
        }
    }

    #[test]
    fn bad_key_is_invalid_credentials() {
        let err = StorageAccount::parse("AccountName=acct;AccountKey=%%%not-base64%%%").unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials(_)));

        let err = StorageAccount::parse("AccountName=acct;AccountKey=").unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials(_)));
    }

    #[test]
    fn repeated_parses_are_independent_and_equal() {
        let input = format!("AccountName=acct;AccountKey={KEY}");
        let first = StorageAccount::parse(&input).unwrap();
        let second = StorageAccount::parse(&input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn debug_hides_key() {
        let account = StorageAccount::parse(&format!("AccountName=acct;AccountKey={KEY}")).unwrap();
        assert!(!format!("{account:?}").contains(KEY));
    }
}

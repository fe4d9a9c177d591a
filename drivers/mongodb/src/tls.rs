use dbsh_driver::Error::InvalidUrl;
use dbsh_driver::Result;
use mongodb::options::{ClientOptions, Tls, TlsOptions};
use std::path::PathBuf;
use url::form_urlencoded;

/// TLS settings taken from the query parameters of a connection string
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct TlsSettings {
    pub(crate) enabled: Option<bool>,
    pub(crate) ca_file: Option<PathBuf>,
    pub(crate) cert_key_file: Option<PathBuf>,
    pub(crate) allow_invalid_certificates: Option<bool>,
}

impl TlsSettings {
    /// Returns true when the connection string named any TLS option
    pub(crate) fn is_configured(&self) -> bool {
        self.enabled.is_some()
            || self.ca_file.is_some()
            || self.cert_key_file.is_some()
            || self.allow_invalid_certificates.is_some()
    }

    /// Set the TLS options on the client options.  Naming a certificate file enables TLS.
    pub(crate) fn apply(&self, options: &mut ClientOptions) {
        if !self.is_configured() {
            return;
        }
        if self.enabled == Some(false) {
            options.tls = Some(Tls::Disabled);
            return;
        }

        let mut tls_options = TlsOptions::default();
        tls_options.ca_file_path.clone_from(&self.ca_file);
        tls_options.cert_key_file_path.clone_from(&self.cert_key_file);
        tls_options.allow_invalid_certificates = self.allow_invalid_certificates;
        options.tls = Some(Tls::Enabled(tls_options));
    }
}

/// Remove the TLS query parameters (`tls`/`ssl`, `tlsCAFile`/`sslCA`,
/// `tlsCertificateKeyFile`/`sslPEMKeyFile` and `tlsAllowInvalidCertificates`) from the
/// connection string; other parameters are kept verbatim.  Parameter names are matched without
/// regard to case.
pub(crate) fn extract(url: &str) -> Result<(String, TlsSettings)> {
    let mut settings = TlsSettings::default();
    let Some((base, query)) = url.split_once('?') else {
        return Ok((url.to_string(), settings));
    };

    let mut retained = Vec::new();
    for parameter in query.split('&').filter(|parameter| !parameter.is_empty()) {
        let Some((key, value)) = form_urlencoded::parse(parameter.as_bytes()).next() else {
            continue;
        };
        match key.to_lowercase().as_str() {
            "tls" | "ssl" => settings.enabled = Some(parse_bool(&key, &value)?),
            "tlscafile" | "sslca" => settings.ca_file = Some(PathBuf::from(value.into_owned())),
            "tlscertificatekeyfile" | "sslpemkeyfile" => {
                settings.cert_key_file = Some(PathBuf::from(value.into_owned()));
            }
            "tlsallowinvalidcertificates" | "sslallowinvalidcertificates" => {
                settings.allow_invalid_certificates = Some(parse_bool(&key, &value)?);
            }
            _ => retained.push(parameter),
        }
    }

    let url = if retained.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{}", retained.join("&"))
    };
    Ok((url, settings))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(InvalidUrl(format!(
            "invalid value [{value}] for [{key}]; expected true or false"
        ))),
    }
}

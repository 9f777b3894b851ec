//! `smtp://` and `smtps://` connection URLs

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use url::Url;

use super::{
    ClientId, SmtpConfigBuilder, Tls, TlsParameters, SMTP_PORT, SUBMISSIONS_PORT, SUBMISSION_PORT,
};
use crate::{error, Error};

/// Transport security named by the scheme and the `tls` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Security {
    Plain,
    StartTls { required: bool },
    Implicit,
}

impl Security {
    fn of(url: &Url) -> Result<Self, Error> {
        let tls = url
            .query_pairs()
            .find_map(|(key, value)| (key == "tls").then_some(value));

        match (url.scheme(), tls.as_deref()) {
            ("smtp", None) => Ok(Security::Plain),
            ("smtp", Some("required")) => Ok(Security::StartTls { required: true }),
            ("smtp", Some("opportunistic")) => Ok(Security::StartTls { required: false }),
            ("smtps", None) => Ok(Security::Implicit),
            (scheme, Some(tls)) => Err(error::connection(format!(
                "unsupported `tls={tls}` for scheme `{scheme}`"
            ))),
            (scheme, None) => Err(error::connection(format!("unsupported scheme `{scheme}`"))),
        }
    }

    fn default_port(self) -> u16 {
        match self {
            Security::Plain => SMTP_PORT,
            Security::StartTls { .. } => SUBMISSION_PORT,
            Security::Implicit => SUBMISSIONS_PORT,
        }
    }

    fn tls(self, host: &str) -> Result<Tls, Error> {
        if self == Security::Plain {
            return Ok(Tls::None);
        }

        let parameters = TlsParameters::new(host.to_owned()).map_err(error::connection)?;
        Ok(match self {
            Security::StartTls { required: true } => Tls::Required(parameters),
            Security::StartTls { required: false } => Tls::Opportunistic(parameters),
            _ => Tls::Wrapper(parameters),
        })
    }
}

fn decode(component: &str) -> Result<String, Error> {
    percent_decode_str(component)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(error::connection)
}

pub(super) fn parse(connection_url: &str) -> Result<SmtpConfigBuilder, Error> {
    let url = Url::parse(connection_url).map_err(error::connection)?;
    let host = url
        .host_str()
        .ok_or_else(|| error::connection("no relay host in the connection URL"))?;
    let security = Security::of(&url)?;

    let mut builder = SmtpConfigBuilder::new(host)
        .port(url.port().unwrap_or(security.default_port()))
        .tls(security.tls(host)?);

    let hello_name = url.path().trim_matches('/');
    if !hello_name.is_empty() {
        builder = builder.hello_name(ClientId::Domain(hello_name.to_owned()));
    }

    if let Some(password) = url.password() {
        builder = builder.credentials(decode(url.username())?, decode(password)?);
    }

    Ok(builder)
}

use lettre::transport::smtp::{
    commands::{Data, Mail, Rcpt},
    extension::{Extension, MailBodyParameter, MailParameter},
};

use super::{Error, Response, SmtpConnection};
use crate::{
    transport::{MailOptions, Transport},
    Address,
};

impl Transport for SmtpConnection {
    type Ok = Response;
    type Error = Error;

    fn mail(&mut self, sender: &Address, options: MailOptions) -> Result<(), Error> {
        let mut parameters = Vec::new();

        // RFC 6531, a relay without the extension refuses the command
        if options.smtp_utf8() {
            parameters.push(MailParameter::SmtpUtfEight);
        }
        // RFC 6152
        if options.eight_bit() && self.server_info().supports_feature(Extension::EightBitMime) {
            parameters.push(MailParameter::Body(MailBodyParameter::EightBitMime));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(">> MAIL FROM:<{sender}> ({} parameter(s))", parameters.len());
        self.command(Mail::new(Some(sender.as_lettre().clone()), parameters))?;
        Ok(())
    }

    fn rcpt(&mut self, recipient: &Address) -> Result<(), Error> {
        #[cfg(feature = "tracing")]
        tracing::debug!(">> RCPT TO:<{recipient}>");
        self.command(Rcpt::new(recipient.as_lettre().clone(), Vec::new()))?;
        Ok(())
    }

    fn data(&mut self, message: &[u8]) -> Result<Response, Error> {
        self.command(Data)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(">> {} bytes of content", message.len());
        let response = self.message(message)?;

        #[cfg(feature = "tracing")]
        tracing::debug!("<< {}", response.first_line().unwrap_or_default());
        Ok(response)
    }

    fn close(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::debug!("closing the relay connection");
        self.abort();
    }
}

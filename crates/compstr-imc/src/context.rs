// InputContext: one client's settings plus its current composition string.

use compstr_codec::{CompositionString, ConversionRequest, QueryError, get_comp_str};
use compstr_core::{CodePage, Encoding};

use crate::ImcError;
use crate::config::{ClientConfig, ImcConfig};

/// State of one input context.
#[derive(Debug, Clone)]
pub struct InputContext {
    client: ClientConfig,
    /// `client.code_page` with `CP_ACP` resolved.
    code_page: CodePage,
    /// Record blob in the client's encoding, validated on attach.
    comp_str: Option<Vec<u8>>,
}

impl InputContext {
    pub fn new(client: ClientConfig, config: &ImcConfig) -> Result<Self, ImcError> {
        let code_page = CodePage::resolve(client.code_page, config.default_ansi_code_page)?;
        Ok(Self {
            client,
            code_page,
            comp_str: None,
        })
    }

    pub fn client(&self) -> ClientConfig {
        self.client
    }

    pub fn code_page(&self) -> &CodePage {
        &self.code_page
    }

    /// Encoding the attached record is stored in.
    pub fn stored_encoding(&self) -> Encoding {
        self.client.encoding()
    }

    /// Switch client settings.
    ///
    /// A record stored in the previous encoding cannot be read in the new one,
    /// so it is dropped when the wide flag changes.
    pub fn set_client(&mut self, client: ClientConfig, config: &ImcConfig) -> Result<(), ImcError> {
        let code_page = CodePage::resolve(client.code_page, config.default_ansi_code_page)?;
        if client.wide != self.client.wide && self.comp_str.take().is_some() {
            tracing::debug!(wide = client.wide, "encoding changed, composition string dropped");
        }
        self.client = client;
        self.code_page = code_page;
        Ok(())
    }

    /// Install a record blob, replacing any previous one.
    ///
    /// The blob must be stored in this context's encoding and pass
    /// [`CompositionString::validate`].
    pub fn attach(&mut self, data: Vec<u8>) -> Result<(), ImcError> {
        CompositionString::new(&data)?.validate(self.stored_encoding())?;
        self.comp_str = Some(data);
        Ok(())
    }

    /// Remove and return the attached record.
    pub fn detach(&mut self) -> Option<Vec<u8>> {
        self.comp_str.take()
    }

    pub fn has_composition_string(&self) -> bool {
        self.comp_str.is_some()
    }

    /// View of the attached record.
    pub fn composition_string(&self) -> Option<CompositionString<'_>> {
        let data = self.comp_str.as_deref()?;
        CompositionString::new(data).ok()
    }

    /// Materialize one field in `requested` encoding.
    ///
    /// `None` when no record is attached.
    pub fn query(
        &self,
        index: u32,
        requested: Encoding,
        out: &mut [u8],
    ) -> Option<Result<usize, QueryError>> {
        let record = self.composition_string()?;
        let request = ConversionRequest {
            index,
            requested,
            stored: self.stored_encoding(),
            code_page: self.code_page,
        };
        Some(get_comp_str(&record, &request, out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compstr_codec::CompositionStringBuilder;
    use compstr_core::CompStrIndex;
    use compstr_core::enums::{GCS_COMPSTR, GCS_CURSORPOS};

    fn record(encoding: Encoding, code_page: u32, text: &str) -> Vec<u8> {
        CompositionStringBuilder::new(encoding, CodePage::new(code_page).unwrap())
            .text(CompStrIndex::CompStr, text)
            .cursor_pos(1)
            .build()
    }

    #[test]
    fn acp_resolves_through_table_config() {
        let config = ImcConfig::default().with_default_ansi_code_page(932);
        let ctx = InputContext::new(ClientConfig::default(), &config).unwrap();
        assert_eq!(ctx.code_page().id(), 932);
        assert_eq!(ctx.stored_encoding(), Encoding::Narrow);
    }

    #[test]
    fn unsupported_code_page_rejected() {
        let err = InputContext::new(ClientConfig::narrow(4242), &ImcConfig::default()).unwrap_err();
        assert!(matches!(err, ImcError::CodePage(_)));
    }

    #[test]
    fn query_without_record_is_none() {
        let ctx = InputContext::new(ClientConfig::wide(932), &ImcConfig::default()).unwrap();
        let mut out = [0u8; 4];
        assert!(ctx.query(GCS_COMPSTR, Encoding::Narrow, &mut out).is_none());
    }

    #[test]
    fn query_uses_client_encoding_as_stored() {
        let mut ctx = InputContext::new(ClientConfig::wide(932), &ImcConfig::default()).unwrap();
        ctx.attach(record(Encoding::Wide, 932, "あい")).unwrap();
        let mut probe: [u8; 0] = [];
        assert_eq!(ctx.query(GCS_COMPSTR, Encoding::Narrow, &mut probe), Some(Ok(4)));
        assert_eq!(ctx.query(GCS_COMPSTR, Encoding::Wide, &mut probe), Some(Ok(4)));
        assert_eq!(ctx.query(GCS_CURSORPOS, Encoding::Narrow, &mut probe), Some(Ok(2)));
    }

    #[test]
    fn attach_rejects_record_in_wrong_encoding() {
        let mut ctx = InputContext::new(ClientConfig::wide(1252), &ImcConfig::default()).unwrap();
        // three narrow bytes read as three wide units run past the blob
        let err = ctx.attach(record(Encoding::Narrow, 1252, "abc")).unwrap_err();
        assert!(matches!(err, ImcError::Format(_)));
        assert!(!ctx.has_composition_string());
    }

    #[test]
    fn attach_rejects_short_blob() {
        let mut ctx = InputContext::new(ClientConfig::default(), &ImcConfig::default()).unwrap();
        assert!(matches!(ctx.attach(vec![0; 10]), Err(ImcError::Format(_))));
    }

    #[test]
    fn encoding_switch_drops_record() {
        let config = ImcConfig::default();
        let mut ctx = InputContext::new(ClientConfig::narrow(1252), &config).unwrap();
        ctx.attach(record(Encoding::Narrow, 1252, "ab")).unwrap();
        ctx.set_client(ClientConfig::narrow(1251), &config).unwrap();
        assert!(ctx.has_composition_string());
        ctx.set_client(ClientConfig::wide(1251), &config).unwrap();
        assert!(!ctx.has_composition_string());
        assert_eq!(ctx.code_page().id(), 1251);
    }

    #[test]
    fn detach_returns_blob() {
        let mut ctx = InputContext::new(ClientConfig::default(), &ImcConfig::default()).unwrap();
        let blob = record(Encoding::Narrow, 1252, "x");
        ctx.attach(blob.clone()).unwrap();
        assert_eq!(ctx.detach(), Some(blob));
        assert!(ctx.composition_string().is_none());
    }
}

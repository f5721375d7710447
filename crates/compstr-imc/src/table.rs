// ImcTable: handle-keyed input contexts and the query entry points.

use std::fmt;

use compstr_core::Encoding;
use compstr_core::enums::IMM_ERROR_GENERAL;
use hashbrown::HashMap;

use crate::ImcError;
use crate::config::{ClientConfig, ImcConfig};
use crate::context::InputContext;

/// Opaque input-context handle. Zero is never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Himc(pub u32);

impl Himc {
    pub const NULL: Himc = Himc(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Himc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Every input context of a process.
#[derive(Debug, Default)]
pub struct ImcTable {
    config: ImcConfig,
    contexts: HashMap<Himc, InputContext>,
    /// Last handle issued.
    last_handle: u32,
}

impl ImcTable {
    pub fn new(config: ImcConfig) -> Self {
        Self {
            config,
            contexts: HashMap::new(),
            last_handle: 0,
        }
    }

    pub fn config(&self) -> &ImcConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn contains(&self, himc: Himc) -> bool {
        self.contexts.contains_key(&himc)
    }

    pub fn context(&self, himc: Himc) -> Option<&InputContext> {
        self.contexts.get(&himc)
    }

    // -- Lifecycle --

    /// Create an input context for a client and return its handle.
    pub fn create_context(&mut self, client: ClientConfig) -> Result<Himc, ImcError> {
        let context = InputContext::new(client, &self.config)?;
        let himc = self.next_handle()?;
        self.contexts.insert(himc, context);
        tracing::debug!(
            himc = %himc,
            wide = client.wide,
            code_page = client.code_page,
            "input context created"
        );
        Ok(himc)
    }

    /// Destroy an input context. Returns `false` for unknown handles.
    pub fn destroy_context(&mut self, himc: Himc) -> bool {
        let removed = self.contexts.remove(&himc).is_some();
        if removed {
            tracing::debug!(himc = %himc, "input context destroyed");
        }
        removed
    }

    /// Change the client settings of an existing context.
    pub fn set_client(&mut self, himc: Himc, client: ClientConfig) -> Result<(), ImcError> {
        let context = self
            .contexts
            .get_mut(&himc)
            .ok_or(ImcError::UnknownContext(himc))?;
        context.set_client(client, &self.config)
    }

    /// Install a complete record blob on a context.
    ///
    /// The blob must be stored in the client's encoding; malformed records
    /// are rejected and the previous record is kept.
    pub fn attach_composition_string(&mut self, himc: Himc, data: Vec<u8>) -> Result<(), ImcError> {
        let context = self
            .contexts
            .get_mut(&himc)
            .ok_or(ImcError::UnknownContext(himc))?;
        let len = data.len();
        context.attach(data).inspect_err(|e| {
            tracing::warn!(himc = %himc, len, error = %e, "composition string rejected");
        })?;
        tracing::debug!(himc = %himc, len, "composition string attached");
        Ok(())
    }

    /// Remove a context's record, returning it.
    pub fn detach_composition_string(&mut self, himc: Himc) -> Result<Vec<u8>, ImcError> {
        let context = self
            .contexts
            .get_mut(&himc)
            .ok_or(ImcError::UnknownContext(himc))?;
        context.detach().ok_or(ImcError::NoCompositionString(himc))
    }

    // -- Query path --

    /// Read a field as narrow text.
    ///
    /// An empty `buf` is a size probe. Returns the byte count written or
    /// required, the value itself for the cursor and delta-start fields,
    /// `IMM_ERROR_GENERAL` for an unknown field, and 0 when the handle is
    /// unknown or has no composition string.
    pub fn get_composition_string_a(&self, himc: Himc, index: u32, buf: &mut [u8]) -> i32 {
        tracing::trace!(himc = %himc, index, buf_len = buf.len(), "get_composition_string_a");
        self.get_composition_string(himc, index, Encoding::Narrow, buf)
    }

    /// Read a field as wide (UTF-16LE) text. See
    /// [`get_composition_string_a`](Self::get_composition_string_a).
    pub fn get_composition_string_w(&self, himc: Himc, index: u32, buf: &mut [u8]) -> i32 {
        tracing::trace!(himc = %himc, index, buf_len = buf.len(), "get_composition_string_w");
        self.get_composition_string(himc, index, Encoding::Wide, buf)
    }

    fn get_composition_string(
        &self,
        himc: Himc,
        index: u32,
        requested: Encoding,
        buf: &mut [u8],
    ) -> i32 {
        let result = self
            .contexts
            .get(&himc)
            .ok_or(ImcError::UnknownContext(himc))
            .and_then(|ctx| {
                ctx.query(index, requested, buf)
                    .ok_or(ImcError::NoCompositionString(himc))
            });
        match result {
            Ok(Ok(n)) => i32::try_from(n).unwrap_or(i32::MAX),
            Ok(Err(e)) => {
                tracing::debug!(himc = %himc, error = %e, "query failed");
                e.code()
            }
            Err(e) => {
                tracing::debug!(error = %e, "nothing to query");
                0
            }
        }
    }

    /// Write path for narrow clients. Not supported; always `false`.
    pub fn set_composition_string_a(
        &mut self,
        himc: Himc,
        index: u32,
        comp: &[u8],
        read: &[u8],
    ) -> bool {
        tracing::trace!(
            himc = %himc,
            index,
            comp_len = comp.len(),
            read_len = read.len(),
            "set_composition_string_a"
        );
        false
    }

    /// Write path for wide clients. Not supported; always `false`.
    pub fn set_composition_string_w(
        &mut self,
        himc: Himc,
        index: u32,
        comp: &[u8],
        read: &[u8],
    ) -> bool {
        tracing::trace!(
            himc = %himc,
            index,
            comp_len = comp.len(),
            read_len = read.len(),
            "set_composition_string_w"
        );
        false
    }

    fn next_handle(&mut self) -> Result<Himc, ImcError> {
        for _ in 0..u32::MAX {
            self.last_handle = self.last_handle.wrapping_add(1);
            let himc = Himc(self.last_handle);
            if !himc.is_null() && !self.contexts.contains_key(&himc) {
                return Ok(himc);
            }
        }
        Err(ImcError::Exhausted)
    }
}

//! Source connectors — one adapter per external job-listing provider.
//!
//! The contract every connector honors: `fetch` never fails loudly. Missing
//! credentials, transport errors, provider rejections, and undecodable
//! payloads are logged and absorbed into an empty result, so one broken
//! provider can only ever shrink a run, never abort it. Each connector maps
//! its raw payload into `CanonicalJob` before returning — nothing upstream
//! of this module sees provider-specific shapes.

pub mod adzuna;
pub mod aggregate;
pub mod france_travail;
pub mod jooble;

use async_trait::async_trait;

use crate::models::job::{CanonicalJob, ContractType};

/// The query every connector receives, derived once per run from the
/// candidate profile (first preferred title, first location, mapped
/// contract type).
#[derive(Debug, Clone)]
pub struct SourceQuery {
    pub title: Option<String>,
    pub location: Option<String>,
    pub contract: Option<ContractType>,
    /// Requested result count; each provider caps it at its own maximum.
    pub limit: u32,
}

#[async_trait]
pub trait JobSourceConnector: Send + Sync {
    fn name(&self) -> &'static str;

    /// Best-effort fetch: returns normalized listings, or an empty vec on
    /// any failure.
    async fn fetch(&self, query: &SourceQuery) -> Vec<CanonicalJob>;
}
